//! Engine benchmarks: statement parsing, insert throughput, predicate
//! selects.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use tessera_bench::{bench_engine, populate};
use tessera_engine::Parser;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("create_table", |b| {
        b.iter(|| {
            Parser::parse(black_box(
                "create table users ({key, autoincrement} id: int32, \
                 {unique} login: string[32], password_hash: bytes[8], is_admin: bool = false)",
            ))
            .unwrap()
        })
    });

    group.bench_function("select_with_predicate", |b| {
        b.iter(|| {
            Parser::parse(black_box(
                "select login, balance from accounts \
                 where balance >= 100 && active = true || id = 1 + 1",
            ))
            .unwrap()
        })
    });

    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    group.sample_size(20);

    group.bench_function("insert_100_rows", |b| {
        b.iter_batched(
            bench_engine,
            |engine| populate(&engine, 100),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

fn bench_select(c: &mut Criterion) {
    let engine = bench_engine();
    populate(&engine, 1000);

    let mut group = c.benchmark_group("select");

    group.bench_function("full_scan", |b| {
        b.iter(|| engine.execute(black_box("select * from accounts")).unwrap())
    });

    group.bench_function("predicate_scan", |b| {
        b.iter(|| {
            engine
                .execute(black_box(
                    "select login from accounts where balance < 10 && active = true",
                ))
                .unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_insert, bench_select);
criterion_main!(benches);
