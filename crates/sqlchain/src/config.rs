//! Connection and session configuration.

use crate::error::{ChainError, ChainResult};
use crate::value::Dialect;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Database driver kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    #[default]
    Mysql,
    Pgsql,
    Sqlite,
    Oracle,
}

impl Driver {
    /// The quoting dialect used for literals on this driver.
    pub fn dialect(self) -> Dialect {
        match self {
            Driver::Mysql => Dialect::MySql,
            Driver::Pgsql => Dialect::Postgres,
            Driver::Sqlite => Dialect::Sqlite,
            Driver::Oracle => Dialect::Oracle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Driver::Mysql => "mysql",
            Driver::Pgsql => "pgsql",
            Driver::Sqlite => "sqlite",
            Driver::Oracle => "oracle",
        }
    }

    /// MySQL-family drivers get charset/collation statements after connecting.
    pub fn is_mysql_family(self) -> bool {
        matches!(self, Driver::Mysql)
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Driver {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "mysql" => Ok(Driver::Mysql),
            "pgsql" | "postgres" | "postgresql" => Ok(Driver::Pgsql),
            "sqlite" => Ok(Driver::Sqlite),
            "oracle" | "oci" => Ok(Driver::Oracle),
            other => Err(ChainError::Config(format!("unknown driver: {other}"))),
        }
    }
}

/// How statement failures are surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Render the failing SQL and driver message, then halt (panic).
    Debug,
    /// Return `ChainError::Statement` to the caller.
    #[default]
    Strict,
}

/// Configuration consumed when a session is constructed.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Driver kind.
    pub driver: Driver,
    /// Host name; may embed a port as `host:port`.
    pub host: String,
    /// Explicit port. Takes precedence over a port embedded in `host`.
    pub port: Option<u16>,
    /// Database name (file path for SQLite).
    pub database: String,
    pub user: String,
    pub password: String,
    /// Connection charset (MySQL family).
    pub charset: String,
    /// Connection collation (MySQL family).
    pub collation: String,
    /// Prefix applied to every table and join reference.
    pub prefix: String,
    /// Debug error surfacing (see [`ErrorMode`]). Off by default, so driver errors come back as `Err`.
    pub debug: bool,
    /// Directory for the result cache files.
    pub cache_dir: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            driver: Driver::default(),
            host: "localhost".to_string(),
            port: None,
            database: String::new(),
            user: String::new(),
            password: String::new(),
            charset: "utf8mb4".to_string(),
            collation: "utf8mb4_general_ci".to_string(),
            prefix: String::new(),
            debug: false,
            cache_dir: PathBuf::from("cache"),
        }
    }
}

impl DbConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// SQLite configuration for the given database path (`:memory:` for an in-memory db).
    pub fn sqlite(database: impl Into<String>) -> Self {
        Self {
            driver: Driver::Sqlite,
            database: database.into(),
            ..Self::default()
        }
    }

    /// Load from a TOML document. Missing keys fall back to defaults.
    ///
    /// ```ignore
    /// let config = DbConfig::from_toml_str(r#"
    ///     driver = "pgsql"
    ///     host = "db.internal:5433"
    ///     database = "app"
    ///     prefix = "app_"
    /// "#)?;
    /// ```
    pub fn from_toml_str(source: &str) -> ChainResult<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn driver(mut self, driver: Driver) -> Self {
        self.driver = driver;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    pub fn charset(mut self, charset: impl Into<String>, collation: impl Into<String>) -> Self {
        self.charset = charset.into();
        self.collation = collation.into();
        self
    }

    /// Set the table-name prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Enable debug error surfacing.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn error_mode(&self) -> ErrorMode {
        if self.debug {
            ErrorMode::Debug
        } else {
            ErrorMode::Strict
        }
    }

    /// Host without any embedded port, and the effective port.
    pub fn host_and_port(&self) -> (&str, Option<String>) {
        let (bare, embedded) = match self.host.split_once(':') {
            Some((bare, port)) => (bare, Some(port.to_string())),
            None => (self.host.as_str(), None),
        };
        let port = self.port.map(|p| p.to_string()).or(embedded);
        (bare, port)
    }

    /// Data source name for the configured driver.
    pub fn dsn(&self) -> String {
        match self.driver {
            Driver::Mysql | Driver::Pgsql => {
                let (host, port) = self.host_and_port();
                let mut dsn = format!("{}:host={};", self.driver, host);
                if let Some(port) = port {
                    dsn.push_str(&format!("port={port};"));
                }
                dsn.push_str(&format!("dbname={}", self.database));
                dsn
            }
            Driver::Sqlite => format!("sqlite:{}", self.database),
            Driver::Oracle => format!("oci:dbname={}/{}", self.host, self.database),
        }
    }

    /// Statements issued right after connecting.
    pub fn init_statements(&self) -> Vec<String> {
        if !self.driver.is_mysql_family() {
            return Vec::new();
        }
        vec![
            format!(
                "SET NAMES '{}' COLLATE '{}'",
                self.charset, self.collation
            ),
            format!("SET CHARACTER SET '{}'", self.charset),
        ]
    }
}
