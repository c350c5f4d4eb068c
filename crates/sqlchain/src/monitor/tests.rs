use super::*;
use crate::sql::StatementKind;
use std::time::Duration;

#[test]
fn test_query_type_detection() {
    assert_eq!(QueryType::from_sql("SELECT * FROM users"), QueryType::Select);
    assert_eq!(QueryType::from_sql("  select * FROM users"), QueryType::Select);
    assert_eq!(
        QueryType::from_sql("INSERT INTO users (name) VALUES ('a')"),
        QueryType::Insert
    );
    assert_eq!(QueryType::from_sql("UPDATE users SET a=1"), QueryType::Update);
    assert_eq!(QueryType::from_sql("DELETE FROM users"), QueryType::Delete);
    assert_eq!(QueryType::from_sql("TRUNCATE TABLE users"), QueryType::Delete);
    assert_eq!(QueryType::from_sql("CHECKSUM TABLE users"), QueryType::Maintenance);
    assert_eq!(QueryType::from_sql("SAVEPOINT trans2"), QueryType::Other);
}

#[test]
fn test_context_classifies_kind() {
    let ctx = QueryContext::new("OPTIMIZE TABLE t").with_tag("nightly");
    assert_eq!(ctx.kind, StatementKind::Read);
    assert_eq!(ctx.query_type, QueryType::Maintenance);
    assert_eq!(ctx.tag.as_deref(), Some("nightly"));
    assert!(!ctx.cache_consulted);
}

#[test]
fn test_query_result_error_truncation() {
    let long = "x".repeat(2000);
    match QueryResult::error(long) {
        QueryResult::Error(msg) => {
            assert_eq!(msg.len(), 512 + 3);
            assert!(msg.ends_with("..."));
        }
        other => panic!("unexpected {other:?}"),
    }

    // multi-byte characters are cut on a char boundary
    let wide = "é".repeat(400);
    assert!(matches!(QueryResult::error(wide), QueryResult::Error(ref m) if m.ends_with("...")));
}

#[test]
fn test_query_result_display() {
    assert_eq!(QueryResult::Rows(3).to_string(), "3 rows");
    assert_eq!(QueryResult::Affected(1).to_string(), "1 affected");
    assert_eq!(QueryResult::Cached(2).to_string(), "2 rows (cached)");
    assert_eq!(QueryResult::error("boom").to_string(), "error: boom");
}

#[test]
fn test_stats_monitor_counts() {
    let monitor = StatsMonitor::new();
    let select = QueryContext::new("SELECT * FROM t");
    let cached_select = QueryContext::new("SELECT * FROM t").with_cache(true);

    monitor.on_query_complete(&select, Duration::from_millis(5), &QueryResult::Rows(2));
    monitor.on_query_complete(&cached_select, Duration::from_millis(1), &QueryResult::Rows(2));
    monitor.on_query_complete(&cached_select, Duration::from_micros(10), &QueryResult::Cached(2));
    monitor.on_query_complete(
        &QueryContext::new("INSERT INTO t VALUES (1)"),
        Duration::from_millis(20),
        &QueryResult::Affected(1),
    );
    monitor.on_query_complete(
        &QueryContext::new("DELETE FROM missing"),
        Duration::from_millis(2),
        &QueryResult::error("no such table"),
    );

    let stats = monitor.stats();
    assert_eq!(stats.total_queries, 5);
    assert_eq!(stats.select_count, 3);
    assert_eq!(stats.insert_count, 1);
    assert_eq!(stats.delete_count, 1);
    assert_eq!(stats.failed_queries, 1);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.cache_misses, 1);
    assert_eq!(stats.max_duration, Duration::from_millis(20));
    assert_eq!(stats.slowest_query.as_deref(), Some("INSERT INTO t VALUES (1)"));

    monitor.reset();
    assert_eq!(monitor.stats(), QueryStats::default());
}

#[test]
fn test_tracing_monitor_truncates() {
    let monitor = TracingMonitor::new().max_sql_length(10);
    assert_eq!(monitor.truncate_sql("SELECT * FROM users"), "SELECT * F...");
    assert_eq!(monitor.clone().no_truncate().truncate_sql("SELECT 1"), "SELECT 1");

    // emitting without a subscriber is a no-op
    monitor.on_query_complete(
        &QueryContext::new("SELECT 1"),
        Duration::from_millis(1),
        &QueryResult::Rows(1),
    );
}

#[test]
fn test_noop_monitor() {
    NoopMonitor.on_query_complete(
        &QueryContext::new("SELECT 1"),
        Duration::ZERO,
        &QueryResult::Rows(0),
    );
}
