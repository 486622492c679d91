#![no_main]

use libfuzzer_sys::fuzz_target;
use mysql_wire_codec::core::varlen::decode_row;
use mysql_wire_codec::protocol::Column;

fuzz_target!(|data: &[u8]| {
    let Some((&width, rest)) = data.split_first() else {
        return;
    };
    if let Ok((row, consumed)) = decode_row(usize::from(width), rest) {
        assert_eq!(row.len(), usize::from(width));
        assert!(consumed <= rest.len());
    }

    let _ = Column::decode(data);
});
