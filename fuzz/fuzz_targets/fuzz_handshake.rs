#![no_main]

use libfuzzer_sys::fuzz_target;
use mysql_wire_codec::protocol::{ClientHandshake, Encode, ServerHandshake};

fuzz_target!(|data: &[u8]| {
    if let Ok((greeting, consumed)) = ServerHandshake::decode(data) {
        // The greeting has no variable tail, so re-encoding is byte exact
        let bytes = greeting.to_bytes().unwrap_or_default();
        assert_eq!(bytes, data[..consumed]);
    }

    if let Ok((response, _)) = ClientHandshake::decode(data) {
        let _ = response.to_bytes();
    }
});
