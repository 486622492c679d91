#![no_main]

use libfuzzer_sys::fuzz_target;
use mysql_wire_codec::protocol::{create_result, Encode, ProtocolVersion};
use mysql_wire_codec::Packet;

fuzz_target!(|data: &[u8]| {
    // Frame parsing must never panic
    if let Ok((packet, _)) = Packet::from_bytes(data) {
        for version in [ProtocolVersion::Protocol40, ProtocolVersion::Protocol41] {
            // Anything that classifies as a result re-encodes without error
            if let Ok((message, _)) = create_result(&packet.payload, version) {
                assert!(message.to_bytes().is_ok());
            }
        }
    }
});
