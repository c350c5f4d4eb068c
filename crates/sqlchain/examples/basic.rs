//! Basic usage example for sqlchain
//!
//! Run with: cargo run --example basic -p sqlchain
//!
//! Uses a throwaway SQLite file under the system temp directory.

use sqlchain::{
    ChainError, DbConfig, Fetch, FromRow, Insert, Op, Row, Session, StatsMonitor, TracingMonitor,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug)]
#[allow(dead_code)]
struct User {
    id: i64,
    name: String,
    email: Option<String>,
    age: i64,
}

impl FromRow for User {
    fn from_row(row: &Row) -> Result<Self, ChainError> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            age: row.get("age")?,
        })
    }
}

fn main() -> Result<(), ChainError> {
    tracing_subscriber::fmt()
        .with_env_filter("sqlchain=debug")
        .init();

    let dir = std::env::temp_dir().join("sqlchain-basic");
    std::fs::create_dir_all(&dir)?;
    let config = DbConfig::sqlite(dir.join("basic.db").to_string_lossy())
        .prefix("demo_")
        .cache_dir(dir.join("cache"));

    let stats = Arc::new(StatsMonitor::new());
    let mut db = Session::open(&config)?
        .with_monitor(TracingMonitor::new())
        .with_shared_monitor(stats.clone());

    db.query("DROP TABLE IF EXISTS demo_users", Fetch::All)?;
    db.query(
        "CREATE TABLE demo_users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT,
            age INTEGER NOT NULL
        )",
        Fetch::All,
    )?;

    // ============================================
    // Insert
    // ============================================
    println!("=== Insert ===");

    let id = db.table("users").insert(
        &mut db,
        &Insert::row::<_, sqlchain::Value, _>([
            ("name", "alice".into()),
            ("email", "alice@example.com".into()),
            ("age", 31.into()),
        ]),
    )?;
    println!("inserted alice as {id:?}");

    db.table("users").insert(
        &mut db,
        &Insert::rows::<_, _, sqlchain::Value, _>([
            [("name", "bob".into()), ("email", None::<String>.into()), ("age", 17.into())],
            [("name", "carol".into()), ("email", "carol@example.com".into()), ("age", 45.into())],
        ]),
    )?;
    println!("inserted {} more rows", db.num_rows());

    // ============================================
    // Select
    // ============================================
    println!("\n=== Select ===");

    let adults: Vec<User> = db
        .table("users")
        .where_(("age", Op::Ge, 18))
        .order_by_dir("age", "desc")
        .get_all_as(&mut db)?;
    println!("adults: {adults:?}");

    let first = db.table("users").where_(("name", "bob")).get_assoc(&mut db)?;
    println!("bob as a map: {first:?}");

    let oldest = db
        .table("users")
        .max("age", Some("oldest"))
        .get(&mut db)?
        .map(|row| row.get::<i64>("oldest"))
        .transpose()?;
    println!("oldest age: {oldest:?}");

    // ============================================
    // Cached reads
    // ============================================
    println!("\n=== Cached reads ===");

    for _ in 0..3 {
        let rows = db
            .table("users")
            .like("email", "%@example.com")
            .cache(Duration::from_secs(30))
            .get_all(&mut db)?;
        println!("{} users with an example.com address", rows.len());
    }

    // ============================================
    // Update / Delete
    // ============================================
    println!("\n=== Update / Delete ===");

    let updated = db
        .table("users")
        .where_(("name", "bob"))
        .update(&mut db, &[("age", 18.into())])?;
    println!("updated {updated} row(s)");

    let deleted = db.table("users").where_(("age", Op::Gt, 40)).delete(&mut db)?;
    println!("deleted {deleted} row(s)");

    // ============================================
    // Prepared statements
    // ============================================
    println!("\n=== Prepared ===");

    let rows = db
        .prepare("SELECT name FROM demo_users WHERE age >= ? AND name <> ?", &[18.into(), "alice".into()])
        .fetch_all(&mut db)?;
    for row in &rows {
        println!("  {}", row.get::<String>("name")?);
    }

    println!("\nlast query: {:?}", db.last_query());
    println!("statements run: {}", db.query_count());

    let s = stats.stats();
    println!(
        "stats: total={} selects={} cache_hits={} cache_misses={}",
        s.total_queries, s.select_count, s.cache_hits, s.cache_misses
    );

    Ok(())
}
