//! Nested transactions with savepoints
//!
//! Run with: cargo run --example nested_transactions -p sqlchain
//!
//! Demonstrates:
//! - an inner level rolled back without losing the outer level's work
//! - the closure form committing on `Ok` and rolling back on `Err`

use sqlchain::{ChainError, DbConfig, Fetch, Insert, Session, SqliteConnection};

fn count(db: &mut Session<SqliteConnection>) -> Result<i64, ChainError> {
    let row = db.table("ledger").count("*", Some("n")).get(db)?;
    match row {
        Some(row) => row.get("n"),
        None => Ok(0),
    }
}

fn main() -> Result<(), ChainError> {
    tracing_subscriber::fmt()
        .with_env_filter("sqlchain=debug")
        .init();

    let mut db = Session::open(&DbConfig::sqlite(":memory:"))?;
    db.query(
        "CREATE TABLE ledger (id INTEGER PRIMARY KEY, entry TEXT NOT NULL)",
        Fetch::All,
    )?;

    // ============================================
    // Manual begin / commit / rollback
    // ============================================
    println!("=== Manual levels ===");

    db.begin()?;
    db.table("ledger").insert(&mut db, &Insert::row([("entry", "outer")]))?;

    db.begin()?;
    println!("depth: {}", db.transaction_depth());
    db.table("ledger").insert(&mut db, &Insert::row([("entry", "inner")]))?;
    db.rollback()?; // undoes "inner" only

    db.commit()?;
    println!("rows after commit: {}", count(&mut db)?);

    // ============================================
    // Closure form
    // ============================================
    println!("\n=== Closure form ===");

    let result = db.transaction(|db| {
        db.table("ledger").insert(db, &Insert::row([("entry", "kept")]))?;

        let failed: Result<(), ChainError> = db.transaction(|db| {
            db.table("ledger").insert(db, &Insert::row([("entry", "discarded")]))?;
            Err(ChainError::Other("simulated failure".into()))
        });
        println!("inner level failed: {}", failed.is_err());
        Ok(())
    });
    println!("outer level ok: {}", result.is_ok());
    println!("rows: {}", count(&mut db)?);

    for row in db.table("ledger").order_by("id").get_all(&mut db)? {
        println!("  {}", row.get::<String>("entry")?);
    }

    // Unbalanced calls are reported rather than ignored
    if let Err(e) = db.commit() {
        println!("\nextra commit: {e}");
    }

    Ok(())
}
