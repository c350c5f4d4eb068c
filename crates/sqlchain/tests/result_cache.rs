#![cfg(feature = "sqlite")]

use sqlchain::{
    ChainError, DbConfig, Fetch, FileCacheStore, FromRow, Insert, Row, Session, SqliteConnection,
    StatsMonitor, Value,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct Name(String);

impl FromRow for Name {
    fn from_row(row: &Row) -> Result<Self, ChainError> {
        Ok(Self(row.get("name")?))
    }
}

fn session(dir: &TempDir) -> (Session<SqliteConnection>, Arc<StatsMonitor>) {
    let stats = Arc::new(StatsMonitor::new());
    let config = DbConfig::sqlite(":memory:").cache_dir(dir.path().join("cache"));
    let mut db = Session::open(&config).unwrap().with_shared_monitor(stats.clone());
    db.query("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT)", Fetch::All)
        .unwrap();
    db.table("items")
        .insert(
            &mut db,
            &Insert::rows([[("name", Value::from("a"))], [("name", Value::from("b"))]]),
        )
        .unwrap();
    stats.reset();
    (db, stats)
}

const TTL: Duration = Duration::from_secs(60);

#[test]
fn second_read_is_served_from_cache() {
    let dir = TempDir::new().unwrap();
    let (mut db, stats) = session(&dir);

    let first = db.table("items").order_by("id").cache(TTL).get_all(&mut db).unwrap();
    assert_eq!(first.len(), 2);

    // change the table behind the cache's back
    db.query("DELETE FROM items WHERE id = 1", Fetch::All).unwrap();

    let second = db.table("items").order_by("id").cache(TTL).get_all(&mut db).unwrap();
    assert_eq!(second, first);
    assert_eq!(db.num_rows(), 2);

    let s = stats.stats();
    assert_eq!(s.cache_misses, 1);
    assert_eq!(s.cache_hits, 1);
    assert_eq!(db.query_count(), 5);
}

#[test]
fn cache_files_land_in_cache_dir() {
    let dir = TempDir::new().unwrap();
    let (mut db, _) = session(&dir);

    db.table("items").cache(TTL).get_all(&mut db).unwrap();

    let store = FileCacheStore::new(dir.path().join("cache")).unwrap();
    let path = store.path_for(db.last_query().unwrap());
    assert!(path.exists(), "missing {}", path.display());
}

#[test]
fn cache_is_opt_in_per_statement() {
    let dir = TempDir::new().unwrap();
    let (mut db, stats) = session(&dir);

    db.table("items").cache(TTL).get_all(&mut db).unwrap();
    db.query("DELETE FROM items", Fetch::All).unwrap();

    // same SQL without .cache() goes to the database
    let rows = db.table("items").get_all(&mut db).unwrap();
    assert!(rows.is_empty());
    assert_eq!(stats.stats().cache_hits, 0);
}

#[test]
fn typed_reads_bypass_cache() {
    let dir = TempDir::new().unwrap();
    let (mut db, stats) = session(&dir);

    let names: Vec<Name> = db.table("items").cache(TTL).get_all_as(&mut db).unwrap();
    assert_eq!(names.len(), 2);
    let names: Vec<Name> = db.table("items").cache(TTL).get_all_as(&mut db).unwrap();
    assert_eq!(names[1].0, "b");

    let s = stats.stats();
    assert_eq!(s.cache_hits, 0);
    assert_eq!(s.cache_misses, 0);
    assert!(!dir.path().join("cache").exists());
}

#[test]
fn assoc_reads_share_entries_with_row_reads() {
    let dir = TempDir::new().unwrap();
    let (mut db, stats) = session(&dir);

    db.table("items").where_(("id", 2)).cache(TTL).get(&mut db).unwrap();
    let map = db
        .table("items")
        .where_(("id", 2))
        .cache(TTL)
        .get_assoc(&mut db)
        .unwrap()
        .unwrap();
    assert_eq!(map["name"], serde_json::json!("b"));
    assert_eq!(stats.stats().cache_hits, 1);
}

#[test]
fn expired_entries_are_refetched() {
    let dir = TempDir::new().unwrap();
    let (mut db, stats) = session(&dir);

    db.table("items").cache(Duration::ZERO).get_all(&mut db).unwrap();
    std::thread::sleep(Duration::from_millis(1100));
    db.query("DELETE FROM items", Fetch::All).unwrap();

    let rows = db.table("items").cache(Duration::ZERO).get_all(&mut db).unwrap();
    assert!(rows.is_empty());
    assert_eq!(stats.stats().cache_hits, 0);
}

#[test]
fn writes_never_touch_cache() {
    let dir = TempDir::new().unwrap();
    let (mut db, stats) = session(&dir);

    db.table("items")
        .where_(("id", 1))
        .cache(TTL)
        .update(&mut db, &[("name", Value::from("z"))])
        .unwrap();

    let s = stats.stats();
    assert_eq!(s.update_count, 1);
    assert_eq!(s.cache_misses, 0);
    assert!(!dir.path().join("cache").exists());
}

#[test]
fn raw_reads_can_opt_in() {
    let dir = TempDir::new().unwrap();
    let (mut db, stats) = session(&dir);

    let sql = "SELECT name FROM items ORDER BY id";
    db.query_cached(sql, Fetch::All, TTL).unwrap();
    let out = db.query_cached(sql, Fetch::All, TTL).unwrap();
    assert_eq!(out.rows().len(), 2);
    assert_eq!(stats.stats().cache_hits, 1);
}

#[test]
fn single_row_fetch_from_cache_returns_one_row() {
    let dir = TempDir::new().unwrap();
    let (mut db, stats) = session(&dir);

    let sql = "SELECT name FROM items ORDER BY id";
    let all = db.query_cached(sql, Fetch::All, TTL).unwrap();
    assert_eq!(all.rows().len(), 2);

    let one = db.query_cached(sql, Fetch::One, TTL).unwrap();
    assert_eq!(stats.stats().cache_hits, 1);
    assert_eq!(one.rows().len(), 1);
    assert_eq!(one.rows()[0].get::<String>("name").unwrap(), "a");
    assert_eq!(db.num_rows(), 1);
}
