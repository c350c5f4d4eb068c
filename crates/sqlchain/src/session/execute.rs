//! Execution dispatcher and the executing terminals of [`Query`].

use super::Session;
use crate::cache::CachedRows;
use crate::connection::Connection;
use crate::error::ChainResult;
use crate::monitor::{QueryContext, QueryResult};
use crate::qb::{Insert, Maintenance, Query};
use crate::row::{FromRow, Representation, Row};
use crate::sql::{normalize_sql, StatementKind};
use crate::value::Value;
use serde_json::{Map, Value as JsonValue};
use std::time::{Duration, Instant};

/// How many rows a read keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fetch {
    /// First row only.
    One,
    #[default]
    All,
}

/// Result of a dispatched statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// A read: the fetched (or cached) rows.
    Rows(Vec<Row>),
    /// A write: affected row count.
    Affected(u64),
}

impl Outcome {
    pub fn rows(&self) -> &[Row] {
        match self {
            Outcome::Rows(rows) => rows,
            Outcome::Affected(_) => &[],
        }
    }

    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Outcome::Rows(rows) => rows,
            Outcome::Affected(_) => Vec::new(),
        }
    }

    pub fn affected(&self) -> u64 {
        match self {
            Outcome::Rows(_) => 0,
            Outcome::Affected(n) => *n,
        }
    }
}

/// Options for one dispatch.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Dispatch {
    pub kind: StatementKind,
    pub fetch: Fetch,
    pub repr: Representation,
    pub ttl: Option<Duration>,
}

impl<C: Connection> Session<C> {
    /// Run raw SQL. Reads (`SELECT`, table maintenance) return rows, anything else is
    /// executed as a write.
    ///
    /// ```ignore
    /// let out = session.query("SELECT COUNT(*) AS n FROM users", Fetch::One)?;
    /// let n: i64 = out.rows()[0].get("n")?;
    /// ```
    pub fn query(&mut self, sql: &str, fetch: Fetch) -> ChainResult<Outcome> {
        let kind = StatementKind::classify(sql);
        self.dispatch(sql, Dispatch { kind, fetch, repr: Representation::Object, ttl: None })
    }

    /// [`query`](Self::query) with a one-shot result cache for reads.
    pub fn query_cached(&mut self, sql: &str, fetch: Fetch, ttl: Duration) -> ChainResult<Outcome> {
        let kind = StatementKind::classify(sql);
        self.dispatch(sql, Dispatch { kind, fetch, repr: Representation::Object, ttl: Some(ttl) })
    }

    pub(crate) fn dispatch(&mut self, sql: &str, opts: Dispatch) -> ChainResult<Outcome> {
        let sql = normalize_sql(sql, self.dialect);
        self.last_query = Some(sql.clone());
        self.num_rows = 0;

        let consult = opts.kind.is_read() && opts.repr.is_cacheable() && opts.ttl.is_some();
        let ctx = QueryContext::new(&sql).with_cache(consult);
        self.notify_start(&ctx);
        let started = Instant::now();

        let gate = match opts.ttl {
            Some(ttl) if consult => match self.cache_gate(ttl) {
                Ok(gate) => Some(gate),
                Err(err) => {
                    tracing::warn!(target: "sqlchain.cache", error = %err, "result cache unavailable");
                    None
                }
            },
            _ => None,
        };

        if let Some(gate) = &gate {
            match gate.try_get(&sql) {
                Ok(Some(cached)) => {
                    let mut rows = cached.into_rows();
                    if opts.fetch == Fetch::One {
                        rows.truncate(1);
                    }
                    tracing::trace!(target: "sqlchain.cache", rows = rows.len(), sql = %sql, "cache hit");
                    self.num_rows = rows.len();
                    self.query_count += 1;
                    self.notify_complete(&ctx, started.elapsed(), &QueryResult::Cached(rows.len()));
                    return Ok(Outcome::Rows(rows));
                }
                Ok(None) => {
                    tracing::trace!(target: "sqlchain.cache", sql = %sql, "cache miss");
                }
                Err(err) => {
                    tracing::warn!(target: "sqlchain.cache", error = %err, "unreadable cache entry");
                }
            }
        }

        tracing::debug!(target: "sqlchain.sql", kind = ?opts.kind, sql = %sql, "executing");
        let executed = if opts.kind.is_read() {
            self.conn.query(&sql).map(|mut rows| {
                if opts.fetch == Fetch::One {
                    rows.truncate(1);
                }
                Outcome::Rows(rows)
            })
        } else {
            self.conn.execute(&sql).map(Outcome::Affected)
        };
        self.query_count += 1;

        match executed {
            Ok(outcome) => {
                let result = match &outcome {
                    Outcome::Rows(rows) => {
                        self.num_rows = rows.len();
                        if let Some(gate) = &gate {
                            if let Err(err) = gate.put(&sql, CachedRows::from_rows(rows)) {
                                tracing::warn!(target: "sqlchain.cache", error = %err, "failed to store cache entry");
                            }
                        }
                        QueryResult::Rows(rows.len())
                    }
                    Outcome::Affected(n) => {
                        self.num_rows = usize::try_from(*n).unwrap_or(usize::MAX);
                        QueryResult::Affected(*n)
                    }
                };
                self.notify_complete(&ctx, started.elapsed(), &result);
                Ok(outcome)
            }
            Err(err) => {
                self.notify_complete(&ctx, started.elapsed(), &QueryResult::error(err.to_string()));
                self.fail(err, &sql)
            }
        }
    }

    fn read(&mut self, query: &Query, sql: &str, fetch: Fetch, repr: Representation) -> ChainResult<Vec<Row>> {
        let opts = Dispatch {
            kind: StatementKind::Read,
            fetch,
            repr,
            ttl: query.cache_ttl,
        };
        Ok(self.dispatch(sql, opts)?.into_rows())
    }

    fn write(&mut self, sql: &str) -> ChainResult<u64> {
        let opts = Dispatch {
            kind: StatementKind::Write,
            fetch: Fetch::All,
            repr: Representation::Object,
            ttl: None,
        };
        Ok(self.dispatch(sql, opts)?.affected())
    }
}

fn hydrate<T: FromRow>(rows: Vec<Row>) -> ChainResult<Vec<T>> {
    rows.iter().map(T::from_row).collect()
}

impl Query {
    /// First matching row (`LIMIT 1`).
    pub fn get(self, session: &mut Session<impl Connection>) -> ChainResult<Option<Row>> {
        let sql = self.to_first_sql()?;
        let rows = session.read(&self, &sql, Fetch::One, Representation::Object)?;
        Ok(rows.into_iter().next())
    }

    /// First matching row as a column-name keyed map.
    pub fn get_assoc(self, session: &mut Session<impl Connection>) -> ChainResult<Option<Map<String, JsonValue>>> {
        let sql = self.to_first_sql()?;
        let rows = session.read(&self, &sql, Fetch::One, Representation::Assoc)?;
        Ok(rows.first().map(Row::to_map))
    }

    /// First matching row hydrated into `T`. Never served from the cache.
    pub fn get_as<T: FromRow>(self, session: &mut Session<impl Connection>) -> ChainResult<Option<T>> {
        let sql = self.to_first_sql()?;
        let rows = session.read(&self, &sql, Fetch::One, Representation::Typed)?;
        Ok(hydrate(rows)?.into_iter().next())
    }

    /// All matching rows.
    pub fn get_all(self, session: &mut Session<impl Connection>) -> ChainResult<Vec<Row>> {
        let sql = self.to_select_sql()?;
        session.read(&self, &sql, Fetch::All, Representation::Object)
    }

    pub fn get_all_assoc(self, session: &mut Session<impl Connection>) -> ChainResult<Vec<Map<String, JsonValue>>> {
        let sql = self.to_select_sql()?;
        let rows = session.read(&self, &sql, Fetch::All, Representation::Assoc)?;
        Ok(rows.iter().map(Row::to_map).collect())
    }

    /// All matching rows hydrated into `T`. Never served from the cache.
    pub fn get_all_as<T: FromRow>(self, session: &mut Session<impl Connection>) -> ChainResult<Vec<T>> {
        let sql = self.to_select_sql()?;
        let rows = session.read(&self, &sql, Fetch::All, Representation::Typed)?;
        hydrate(rows)
    }

    /// Insert one or more rows; returns the generated identifier, if any.
    pub fn insert(self, session: &mut Session<impl Connection>, insert: &Insert) -> ChainResult<Option<String>> {
        let sql = self.to_insert_sql(insert)?;
        session.write(&sql)?;
        session.insert_id = session.conn.last_insert_id();
        Ok(session.insert_id.clone())
    }

    /// Update matching rows; returns the affected count.
    pub fn update<K: AsRef<str>>(self, session: &mut Session<impl Connection>, set: &[(K, Value)]) -> ChainResult<u64> {
        let sql = self.to_update_sql(set)?;
        session.write(&sql)
    }

    /// Delete matching rows (`TRUNCATE TABLE` when unconditioned).
    pub fn delete(self, session: &mut Session<impl Connection>) -> ChainResult<u64> {
        let sql = self.to_delete_sql()?;
        session.write(&sql)
    }

    fn maintenance(self, session: &mut Session<impl Connection>, op: Maintenance) -> ChainResult<Vec<Row>> {
        let sql = self.to_maintenance_sql(op)?;
        session.read(&self, &sql, Fetch::All, Representation::Object)
    }

    pub fn analyze(self, session: &mut Session<impl Connection>) -> ChainResult<Vec<Row>> {
        self.maintenance(session, Maintenance::Analyze)
    }

    pub fn check(self, session: &mut Session<impl Connection>) -> ChainResult<Vec<Row>> {
        self.maintenance(session, Maintenance::Check)
    }

    pub fn checksum(self, session: &mut Session<impl Connection>) -> ChainResult<Vec<Row>> {
        self.maintenance(session, Maintenance::Checksum)
    }

    pub fn optimize(self, session: &mut Session<impl Connection>) -> ChainResult<Vec<Row>> {
        self.maintenance(session, Maintenance::Optimize)
    }

    pub fn repair(self, session: &mut Session<impl Connection>) -> ChainResult<Vec<Row>> {
        self.maintenance(session, Maintenance::Repair)
    }
}
