//! Scramble generation and the 4.1 password hash.
//!
//! The server greets with a random 20-byte scramble; the client answers with
//! `SHA1(password) XOR SHA1(scramble || SHA1(SHA1(password)))`. Only the hash is
//! computed here; deciding when to send it belongs to the connection layer.

use crate::config::SCRAMBLE_SIZE;
use rand::RngCore;
use sha1::{Digest, Sha1};

/// The 20-byte challenge carried in the server greeting
pub type Scramble = [u8; SCRAMBLE_SIZE];

/// Fill a fresh scramble from the thread-local RNG
pub fn generate_scramble() -> Scramble {
    let mut scramble = [0u8; SCRAMBLE_SIZE];
    rand::rng().fill_bytes(&mut scramble);
    scramble
}

fn sha1(parts: &[&[u8]]) -> [u8; SCRAMBLE_SIZE] {
    let mut hasher = Sha1::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Hash `password` against the server's scramble.
///
/// Returns `None` for an empty password, which is sent as a zero-length
/// scramble.
pub fn native_password_scramble(password: &[u8], scramble: &Scramble) -> Option<Scramble> {
    if password.is_empty() {
        return None;
    }

    let stage1 = sha1(&[password]);
    let stage2 = sha1(&[&stage1]);
    let mut token = sha1(&[scramble, &stage2]);
    for (byte, mask) in token.iter_mut().zip(stage1.iter()) {
        *byte ^= mask;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_password_has_no_scramble() {
        assert_eq!(native_password_scramble(b"", &[7u8; SCRAMBLE_SIZE]), None);
    }

    #[test]
    fn test_token_unmasks_to_stage1() {
        // XOR-ing the token with SHA1(scramble || stage2) must give back SHA1(password),
        // which is what the server checks against its stored double hash.
        let scramble = [0x3Au8; SCRAMBLE_SIZE];
        let token = native_password_scramble(b"secret", &scramble).unwrap();

        let stage1 = sha1(&[b"secret"]);
        let stage2 = sha1(&[&stage1]);
        let mask = sha1(&[&scramble, &stage2]);
        let recovered: Vec<u8> = token.iter().zip(mask.iter()).map(|(a, b)| a ^ b).collect();
        assert_eq!(recovered, stage1);
        assert_eq!(sha1(&[&recovered]), stage2);
    }

    #[test]
    fn test_token_depends_on_scramble() {
        let a = native_password_scramble(b"pw", &[1u8; SCRAMBLE_SIZE]);
        let b = native_password_scramble(b"pw", &[2u8; SCRAMBLE_SIZE]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_generated_scrambles_differ() {
        assert_ne!(generate_scramble(), generate_scramble());
    }
}
