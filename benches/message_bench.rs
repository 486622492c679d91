use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use mysql_wire_codec::core::bitfield::ServerStatus;
use mysql_wire_codec::protocol::result::OkResult;
use mysql_wire_codec::protocol::{
    create_result, ClientHandshake, Column, ColumnType, Encode, ErrorResult, ProtocolVersion,
    ServerHandshake,
};

#[allow(clippy::unwrap_used)]
fn bench_result_messages(c: &mut Criterion) {
    let mut group = c.benchmark_group("result_messages");
    let version = ProtocolVersion::Protocol41;
    let messages = vec![
        OkResult::new(1, 42, ServerStatus::new(2), version).to_bytes().unwrap(),
        ErrorResult::new(1064, "You have an error in your SQL syntax", version)
            .to_bytes()
            .unwrap(),
        vec![254, 0, 0, 2, 0],
        vec![12],
    ];

    group.bench_function("classify", |b| {
        b.iter(|| {
            for payload in &messages {
                let _ = create_result(payload, version).unwrap();
            }
        })
    });

    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_column_definition(c: &mut Criterion) {
    let mut group = c.benchmark_group("column_definition");
    let column = Column::new("inventory", "products", "description", ColumnType::VarString);

    group.bench_function("encode", |b| {
        b.iter_batched(
            || column.clone(),
            |column| column.to_bytes().unwrap(),
            BatchSize::SmallInput,
        )
    });

    let blob = column.to_bytes().unwrap();
    group.bench_function("decode", |b| {
        b.iter(|| {
            let _ = Column::decode(&blob).unwrap();
        })
    });

    group.finish();
}

#[allow(clippy::unwrap_used)]
fn bench_handshake(c: &mut Criterion) {
    let mut group = c.benchmark_group("handshake");
    let greeting = ServerHandshake::new(7, "8.0.36", [0x5A; 20]);
    let greeting_bytes = greeting.to_bytes().unwrap();

    group.bench_function("decode_greeting", |b| {
        b.iter(|| {
            let _ = ServerHandshake::decode(&greeting_bytes).unwrap();
        })
    });

    group.bench_function("hash_password", |b| {
        b.iter(|| ClientHandshake::with_password(&greeting, "app", b"secret", None))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_result_messages,
    bench_column_definition,
    bench_handshake
);
criterion_main!(benches);
