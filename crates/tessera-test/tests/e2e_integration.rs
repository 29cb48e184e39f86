//! End-to-end integration tests for TesseraDB.
//!
//! Each test drives a fresh engine through the statement language only,
//! the way an embedder would.

use tessera_common::TesseraError;
use tessera_engine::{Engine, Value};
use tessera_test::{column_values, engine_with_users, insert_user, select};

/// Schema, two inserts, full select.
#[test]
fn test_schema_and_two_inserts() {
    let engine = engine_with_users();
    insert_user(&engine, "a", "0xdead", true);
    insert_user(&engine, "b", "0xbeef", false);

    let view = select(&engine, "select * from users");
    assert_eq!(view.len(), 2);
    assert_eq!(
        view.column_names(),
        vec!["id", "login", "password_hash", "is_admin"]
    );
    assert_eq!(
        column_values(&view, "id"),
        vec![Value::Int(0), Value::Int(1)]
    );
    assert_eq!(
        column_values(&view, "login"),
        vec![Value::string("a"), Value::string("b")]
    );
    assert_eq!(
        column_values(&view, "password_hash"),
        vec![Value::bytes(vec![0xDE, 0xAD]), Value::bytes(vec![0xBE, 0xEF])]
    );
    assert_eq!(
        column_values(&view, "is_admin"),
        vec![Value::Bool(true), Value::Bool(false)]
    );
}

/// Arithmetic on the right-hand side of a WHERE comparison is folded.
#[test]
fn test_arithmetic_in_predicate() {
    let engine = engine_with_users();
    insert_user(&engine, "a", "0xdead", true);
    insert_user(&engine, "b", "0xbeef", false);

    let view = select(&engine, "select * from users where id = 1 + 1");
    assert_eq!(view.len(), 0);

    let view = select(&engine, "select * from users where id = 2 - 1");
    assert_eq!(view.len(), 1);
    assert_eq!(column_values(&view, "login"), vec![Value::string("b")]);
}

/// Update through a predicate, then read the column back.
#[test]
fn test_update_with_where() {
    let engine = engine_with_users();
    insert_user(&engine, "a", "0xdead", true);
    insert_user(&engine, "b", "0xbeef", false);

    engine
        .execute("update users set is_admin = true where id = 1")
        .unwrap();

    let view = select(&engine, "select is_admin from users where id = 1");
    assert_eq!(view.len(), 1);
    assert_eq!(view.column_names(), vec!["is_admin"]);
    assert_eq!(column_values(&view, "is_admin"), vec![Value::Bool(true)]);
}

/// A unique violation fails the insert and changes nothing.
#[test]
fn test_unique_violation() {
    let engine = engine_with_users();
    insert_user(&engine, "a", "0xdead", true);
    insert_user(&engine, "b", "0xbeef", false);

    let err = engine
        .execute("insert (login = \"a\", password_hash = 0x00, is_admin = false) to users")
        .unwrap_err();
    assert!(matches!(err, TesseraError::Constraint(_)));

    let view = select(&engine, "select * from users");
    assert_eq!(view.len(), 2);
}

/// Deleting and reinserting never reuses an auto-increment value.
#[test]
fn test_delete_then_reinsert() {
    let engine = engine_with_users();
    insert_user(&engine, "a", "0xdead", true);
    insert_user(&engine, "b", "0xbeef", false);

    insert_user(&engine, "c", "0x01", false);
    engine.execute("delete users where login = \"c\"").unwrap();
    insert_user(&engine, "c", "0x02", false);

    let view = select(&engine, "select * from users");
    assert_eq!(
        column_values(&view, "login"),
        vec![Value::string("a"), Value::string("b"), Value::string("c")]
    );
    // The first "c" consumed id 2; the reinserted row gets a fresh id.
    assert_eq!(
        column_values(&view, "id"),
        vec![Value::Int(0), Value::Int(1), Value::Int(3)]
    );
}

/// Dump, clear, restore: the same view comes back.
#[test]
fn test_dump_load_round_trip() {
    let engine = engine_with_users();
    insert_user(&engine, "a", "0xdead", true);
    insert_user(&engine, "b", "0xbeef", false);

    let before = select(&engine, "select * from users");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.db");
    engine.dump_table("users", &path).unwrap();

    engine.catalog().clear();
    assert!(engine.execute("select * from users").is_err());

    engine.load_table(&path).unwrap();
    let after = select(&engine, "select * from users");

    assert_eq!(after.len(), before.len());
    for name in ["id", "login", "password_hash", "is_admin"] {
        assert_eq!(column_values(&after, name), column_values(&before, name));
    }

    // The restored counter keeps issuing fresh identifiers.
    insert_user(&engine, "c", "0x01", false);
    let view = select(&engine, "select id from users where login = \"c\"");
    assert_eq!(column_values(&view, "id"), vec![Value::Int(2)]);
}

/// `0x` with zero digits is a lexical failure.
#[test]
fn test_empty_hex_literal_fails() {
    let engine = engine_with_users();
    let err = engine
        .execute("insert (login = \"x\", password_hash = 0x) to users")
        .unwrap_err();
    assert!(matches!(err, TesseraError::Lex(_)));
}

/// Zero-length string and bytes columns are rejected at schema time.
#[test]
fn test_zero_max_len_rejected() {
    let engine = Engine::new();
    let err = engine
        .execute("create table t (s: string[0])")
        .unwrap_err();
    assert!(matches!(err, TesseraError::Schema(_)));

    let err = engine.execute("create table t (b: bytes[0])").unwrap_err();
    assert!(matches!(err, TesseraError::Schema(_)));
}

/// Writing an auto-increment column is a constraint error.
#[test]
fn test_insert_into_auto_increment_fails() {
    let engine = engine_with_users();
    let err = engine
        .execute("insert (id = 7, login = \"x\") to users")
        .unwrap_err();
    assert!(matches!(err, TesseraError::Constraint(_)));
}

/// `select *` on an empty table yields no rows but the full column list.
#[test]
fn test_select_star_on_empty_table() {
    let engine = engine_with_users();
    let view = select(&engine, "select * from users");
    assert_eq!(view.len(), 0);
    assert_eq!(
        view.column_names(),
        vec!["id", "login", "password_hash", "is_admin"]
    );
}

/// A table without any unique column gets the synthesized `id` key.
#[test]
fn test_synthesized_id_column() {
    let engine = Engine::new();
    engine
        .execute("create table notes (body: string[64])")
        .unwrap();
    engine.execute("insert (body = \"first\") to notes").unwrap();
    engine
        .execute("insert (body = \"second\") to notes")
        .unwrap();

    let view = select(&engine, "select * from notes");
    assert_eq!(view.column_names(), vec!["body", "id"]);
    assert_eq!(
        column_values(&view, "id"),
        vec![Value::Int(0), Value::Int(1)]
    );
}

/// Compound predicates combine comparisons with &&, || and !.
#[test]
fn test_compound_predicates() {
    let engine = engine_with_users();
    insert_user(&engine, "a", "0x01", true);
    insert_user(&engine, "b", "0x02", false);
    insert_user(&engine, "c", "0x03", true);

    let view = select(
        &engine,
        "select login from users where is_admin = true && id > 0",
    );
    assert_eq!(column_values(&view, "login"), vec![Value::string("c")]);

    let view = select(
        &engine,
        "select login from users where login = \"a\" || login = \"b\"",
    );
    assert_eq!(view.len(), 2);

    let view = select(&engine, "select login from users where !is_admin = true");
    assert_eq!(column_values(&view, "login"), vec![Value::string("b")]);
}

/// Comparing a column against a literal of another kind is a type error.
#[test]
fn test_cross_kind_comparison_fails() {
    let engine = engine_with_users();
    insert_user(&engine, "a", "0x01", true);

    let err = engine
        .execute("select * from users where id = \"1\"")
        .unwrap_err();
    assert!(matches!(err, TesseraError::Type(_)));
}

/// Several engines hold fully independent catalogs.
#[test]
fn test_engines_are_independent() {
    let first = engine_with_users();
    let second = Engine::new();

    insert_user(&first, "a", "0x01", false);
    assert!(second.execute("select * from users").is_err());
}
