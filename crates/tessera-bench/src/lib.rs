//! Shared helpers for the TesseraDB benchmarks.

#![warn(clippy::all)]

use tessera_engine::Engine;

/// Creates an engine with the benchmark `accounts` table installed.
pub fn bench_engine() -> Engine {
    let engine = Engine::new();
    engine
        .execute(
            "create table accounts ({key, autoincrement} id: int32, \
             {unique} login: string[32], balance: int32 = 0, active: bool = true)",
        )
        .expect("benchmark schema should parse");
    engine
}

/// Fills the benchmark table with `rows` generated accounts.
pub fn populate(engine: &Engine, rows: usize) {
    for i in 0..rows {
        let statement = format!(
            "insert (login = \"user_{}\", balance = {}) to accounts",
            i,
            i % 1000
        );
        engine.execute(&statement).expect("insert should succeed");
    }
}
