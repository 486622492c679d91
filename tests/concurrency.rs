#![allow(clippy::unwrap_used, clippy::expect_used)]

use bytes::BytesMut;
use mysql_wire_codec::core::bitfield::ServerStatus;
use mysql_wire_codec::core::codec::PacketCodec;
use mysql_wire_codec::core::packet::Packet;
use mysql_wire_codec::protocol::result::OkResult;
use mysql_wire_codec::protocol::{create_result, Encode, ProtocolVersion, ResultMessage};
use tokio_util::codec::{Decoder, Encoder};

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_encode_decode_heavy() {
    use tokio::task::JoinSet;

    let iterations = 5_000usize;
    let payload_sizes = [0usize, 64, 512, 4096, 65536];

    let mut tasks = JoinSet::new();
    for &size in &payload_sizes {
        tasks.spawn(async move {
            let mut codec = PacketCodec::default();
            let mut buf = BytesMut::new();
            for i in 0..iterations {
                let payload = vec![((i + size) & 0xFF) as u8; size];
                codec.encode(Packet::new(i as u8, payload), &mut buf).unwrap();
                let decoded = codec.decode(&mut buf).unwrap().unwrap();
                assert_eq!(decoded.sequence, i as u8);
                assert_eq!(decoded.payload.len(), size);
                assert!(buf.is_empty());
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_result_decoding() {
    use tokio::task::JoinSet;

    let mut tasks = JoinSet::new();
    for worker in 0..16u64 {
        tasks.spawn(async move {
            for rows in 0..1_000u64 {
                let affected = worker * 1_000_000 + rows;
                let ok = OkResult::new(
                    affected,
                    rows,
                    ServerStatus::new(2),
                    ProtocolVersion::Protocol41,
                );
                let bytes = ok.to_bytes().unwrap();
                match create_result(&bytes, ProtocolVersion::Protocol41).unwrap().0 {
                    ResultMessage::Ok(decoded) => assert_eq!(decoded.affected_rows, affected),
                    other => panic!("expected OK, got {other:?}"),
                }
            }
        });
    }

    while let Some(res) = tasks.join_next().await {
        res.unwrap();
    }
}
