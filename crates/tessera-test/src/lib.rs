//! Shared helpers for the TesseraDB integration tests.

#![warn(clippy::all)]

use tessera_engine::{Engine, Value, View};

/// The schema used by the end-to-end scenarios.
pub const USERS_SCHEMA: &str = "create table users ({key, autoincrement} id: int32, \
     {unique} login: string[32], password_hash: bytes[8], is_admin: bool = false)";

/// Creates an engine with the `users` table installed.
pub fn engine_with_users() -> Engine {
    let engine = Engine::new();
    engine.execute(USERS_SCHEMA).expect("schema should parse");
    engine
}

/// Inserts one user row through the statement language.
pub fn insert_user(engine: &Engine, login: &str, hash_hex: &str, is_admin: bool) {
    let statement = format!(
        "insert (login = \"{}\", password_hash = {}, is_admin = {}) to users",
        login, hash_hex, is_admin
    );
    engine.execute(&statement).expect("insert should succeed");
}

/// Runs a select and returns the view.
pub fn select(engine: &Engine, statement: &str) -> View {
    engine
        .execute(statement)
        .expect("select should succeed")
        .expect("select should return a view")
}

/// Collects one projected column of a view into owned values.
pub fn column_values(view: &View, name: &str) -> Vec<Value> {
    (0..view.len())
        .map(|row| view.value(row, name).expect("column should exist").clone())
        .collect()
}
