#![cfg(feature = "sqlite")]

use sqlchain::{
    ChainError, DbConfig, Fetch, FromRow, Insert, Op, Row, Session, SqliteConnection, Value,
};

#[derive(Debug, PartialEq)]
struct User {
    id: i64,
    name: String,
    age: i64,
}

impl FromRow for User {
    fn from_row(row: &Row) -> Result<Self, ChainError> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            age: row.get("age")?,
        })
    }
}

fn session() -> Session<SqliteConnection> {
    let mut db = Session::open(&DbConfig::sqlite(":memory:").prefix("t_")).unwrap();
    db.query(
        "CREATE TABLE t_users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER NOT NULL, email TEXT)",
        Fetch::All,
    )
    .unwrap();
    db
}

fn seed(db: &mut Session<SqliteConnection>) {
    db.table("users")
        .insert(
            db,
            &Insert::rows([
                [("name", Value::from("ada")), ("age", Value::from(36))],
                [("name", Value::from("bob")), ("age", Value::from(17))],
                [("name", Value::from("cy")), ("age", Value::from(52))],
            ]),
        )
        .unwrap();
}

#[test]
fn insert_reports_generated_id() {
    let mut db = session();
    let id = db
        .table("users")
        .insert(&mut db, &Insert::row([("name", Value::from("ada")), ("age", Value::from(36))]))
        .unwrap();
    assert_eq!(id.as_deref(), Some("1"));
    assert_eq!(db.insert_id(), Some("1"));
    assert_eq!(db.num_rows(), 1);
}

#[test]
fn multi_row_insert_counts_affected() {
    let mut db = session();
    seed(&mut db);
    assert_eq!(db.num_rows(), 3);
    assert_eq!(db.insert_id(), Some("3"));
}

#[test]
fn reads_in_every_representation() {
    let mut db = session();
    seed(&mut db);

    let first = db.table("users").order_by("age").get(&mut db).unwrap().unwrap();
    assert_eq!(first.get::<String>("name").unwrap(), "bob");
    assert_eq!(db.last_query(), Some("SELECT * FROM t_users ORDER BY age ASC LIMIT 1"));

    let all = db.table("users").get_all(&mut db).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(db.num_rows(), 3);

    let map = db
        .table("users")
        .where_(("name", "cy"))
        .get_assoc(&mut db)
        .unwrap()
        .unwrap();
    assert_eq!(map["age"], serde_json::json!(52));
    assert_eq!(map["email"], serde_json::Value::Null);

    let adults: Vec<User> = db
        .table("users")
        .where_(("age", Op::Ge, 18))
        .order_by("id")
        .get_all_as(&mut db)
        .unwrap();
    assert_eq!(
        adults,
        vec![
            User { id: 1, name: "ada".into(), age: 36 },
            User { id: 3, name: "cy".into(), age: 52 },
        ]
    );

    let none = db.table("users").where_(("age", Op::Gt, 100)).get_as::<User>(&mut db).unwrap();
    assert!(none.is_none());
    assert_eq!(db.num_rows(), 0);
}

#[test]
fn filters_compose_against_real_rows() {
    let mut db = session();
    seed(&mut db);

    let names = |rows: Vec<Row>| -> Vec<String> {
        rows.iter().map(|r| r.get::<String>("name").unwrap()).collect()
    };

    let rows = db
        .table("users")
        .where_in("name", ["ada", "cy", "zed"])
        .order_by("id")
        .get_all(&mut db)
        .unwrap();
    assert_eq!(names(rows), ["ada", "cy"]);

    let rows = db
        .table("users")
        .between("age", 18, 40)
        .or_where(("name", "bob"))
        .order_by("id")
        .get_all(&mut db)
        .unwrap();
    assert_eq!(names(rows), ["ada", "bob"]);

    let rows = db
        .table("users")
        .where_null("email")
        .group(|q| q.where_(("age", Op::Lt, 20)).or_like("name", "c%"))
        .order_by("id")
        .get_all(&mut db)
        .unwrap();
    assert_eq!(names(rows), ["bob", "cy"]);

    let rows = db.table("users").where_in("id", Vec::<i64>::new()).get_all(&mut db).unwrap();
    assert!(rows.is_empty());
}

#[test]
fn aggregates_and_pagination() {
    let mut db = session();
    seed(&mut db);

    let row = db
        .table("users")
        .count("*", Some("n"))
        .avg("age", Some("mean"))
        .get(&mut db)
        .unwrap()
        .unwrap();
    assert_eq!(row.get::<i64>("n").unwrap(), 3);
    assert_eq!(row.get::<f64>("mean").unwrap(), 35.0);

    let page = db.table("users").order_by("id").pagination(2, 2).get_all(&mut db).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].get::<i64>("id").unwrap(), 3);
}

#[test]
fn update_and_delete_report_affected_rows() {
    let mut db = session();
    seed(&mut db);

    let updated = db
        .table("users")
        .where_(("age", Op::Lt, 18))
        .update(&mut db, &[("age", Value::from(18)), ("email", Value::from("b@x.io"))])
        .unwrap();
    assert_eq!(updated, 1);
    assert_eq!(
        db.last_query(),
        Some("UPDATE t_users SET age=18, email='b@x.io' WHERE age < 18")
    );

    let deleted = db.table("users").where_(("age", Op::Gt, 30)).delete(&mut db).unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(db.num_rows(), 2);

    let left = db.table("users").get_all(&mut db).unwrap();
    assert_eq!(left.len(), 1);
}

#[test]
fn counters_track_every_statement() {
    let mut db = session();
    // the CREATE TABLE in `session()`
    assert_eq!(db.query_count(), 1);
    seed(&mut db);
    db.table("users").get_all(&mut db).unwrap();
    assert_eq!(db.query_count(), 3);

    let _ = db.table("missing").get_all(&mut db);
    assert_eq!(db.query_count(), 4);
}

#[test]
fn driver_error_carries_sql_and_is_remembered() {
    let mut db = session();
    let err = db.table("missing").where_(("id", 1)).get_all(&mut db).unwrap_err();

    assert!(err.is_statement());
    assert_eq!(err.sql(), Some("SELECT * FROM t_missing WHERE id = 1"));
    assert!(err.to_string().contains("no such table"));
    assert!(db.last_error().unwrap().contains("no such table"));

    // a later success keeps the last error around
    db.table("users").get_all(&mut db).unwrap();
    assert!(db.last_error().is_some());
}

#[test]
#[should_panic(expected = "Query: SELECT * FROM nowhere")]
fn debug_mode_panics_with_statement() {
    let mut db = Session::open(&DbConfig::sqlite(":memory:").debug(true)).unwrap();
    let _ = db.table("nowhere").get_all(&mut db);
}

#[test]
fn validation_errors_never_reach_the_driver() {
    let mut db = session();
    let err = db.table("users").group(|q| q).get_all(&mut db).unwrap_err();
    assert!(matches!(err, ChainError::Validation(_)));
    assert_eq!(db.query_count(), 1);
}

#[test]
fn prepared_statements_fill_markers() {
    let mut db = session();
    seed(&mut db);

    let stmt = db.prepare("SELECT name FROM t_users WHERE age > ? AND name <> ?", &[20.into(), "o'neil".into()]);
    assert_eq!(stmt.sql(), "SELECT name FROM t_users WHERE age > 20 AND name <> 'o''neil'");
    assert_eq!(db.last_query(), Some(stmt.sql()));

    let rows = stmt.fetch_all(&mut db).unwrap();
    assert_eq!(rows.len(), 2);

    let one = stmt.fetch(&mut db).unwrap().unwrap();
    assert_eq!(one.columns(), ["name"]);

    let affected = db
        .prepare("UPDATE t_users SET age = age + ? WHERE name = ?", &[1.into(), "ada".into()])
        .exec(&mut db)
        .unwrap();
    assert_eq!(affected, 1);
}

#[test]
fn raw_query_dispatches_by_statement_kind() {
    let mut db = session();
    seed(&mut db);

    let out = db.query("  select   name from t_users\n where id = 2", Fetch::One).unwrap();
    assert_eq!(out.rows()[0].get::<String>("name").unwrap(), "bob");
    assert_eq!(db.last_query(), Some("select name from t_users where id = 2"));

    let out = db.query("DELETE FROM t_users WHERE id = 2", Fetch::All).unwrap();
    assert_eq!(out.affected(), 1);
    assert!(out.rows().is_empty());
}

#[test]
fn whitespace_inside_values_survives_execution() {
    let mut db = session();
    let stored = ["line1\nline2", "a  b", "tab\there", " padded ", "it's\r\n  quoted"];

    for (age, name) in (1..).zip(stored) {
        db.table("users")
            .insert(&mut db, &Insert::row([("name", Value::from(name)), ("age", Value::from(age))]))
            .unwrap();
    }

    let names: Vec<String> = db
        .table("users")
        .order_by("id")
        .get_all(&mut db)
        .unwrap()
        .iter()
        .map(|r| r.get("name").unwrap())
        .collect();
    assert_eq!(names, stored);

    // the literal in a filter keeps its whitespace too
    let row = db.table("users").where_(("name", "a  b")).get(&mut db).unwrap().unwrap();
    assert_eq!(row.get::<i64>("age").unwrap(), 2);
    assert!(db.last_query().unwrap().ends_with("WHERE name = 'a  b' LIMIT 1"));

    let affected = db
        .table("users")
        .where_(("name", "line1\nline2"))
        .update(&mut db, &[("email", Value::from("x\ty"))])
        .unwrap();
    assert_eq!(affected, 1);
    let email: String = db
        .table("users")
        .where_(("age", 1))
        .get(&mut db)
        .unwrap()
        .unwrap()
        .get("email")
        .unwrap();
    assert_eq!(email, "x\ty");
}

#[test]
fn escape_uses_connection_dialect() {
    let db = session();
    assert_eq!(db.escape("it's"), "'it''s'");
    assert_eq!(db.escape(true), "'1'");
    assert_eq!(db.escape(Option::<i64>::None), "NULL");
}

#[test]
fn open_rejects_other_drivers() {
    let config = DbConfig::new().database("app");
    let err = match Session::open(&config) {
        Ok(_) => panic!("mysql has no built-in connection"),
        Err(err) => err,
    };
    assert!(err.is_connection());
}
