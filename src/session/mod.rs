//! Database sessions over a system catalog.
//!
//! Search code never talks to a driver directly. It hands a [`CatalogQuery`]
//! to a [`CatalogSession`] and receives rows one at a time through a visitor,
//! which can stop the scan early.
//!
//! ```text
//! ┌──────────────────────┐   CatalogQuery    ┌──────────────────────┐
//! │  StructureAssistant  │ ────────────────▶ │    CatalogSession    │
//! │                      │ ◀──────────────── │  (SqliteSession, …)  │
//! └──────────────────────┘  CatalogRow, …    └──────────────────────┘
//! ```

mod sqlite;

pub use sqlite::{SqliteCatalog, SqliteSession};

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Default number of rows a driver should fetch per round trip.
pub const METADATA_FETCH_SIZE: u32 = 1000;

/// Errors raised by a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session lock poisoned")]
    LockPoisoned,

    #[error("result set has no column '{0}'")]
    MissingColumn(String),

    #[error("column '{column}' is NULL")]
    NullValue { column: String },

    #[error("invalid value '{value}' in column '{column}'")]
    InvalidValue { column: String, value: String },
}

pub type SessionResult<T> = Result<T, SessionError>;

/// SQL flavour spoken by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// IBM DB2 for LUW.
    Db2,
    /// SQLite hosting an emulated catalog.
    Sqlite,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Db2 => "db2",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Isolation clause appended to read-only catalog statements.
    pub fn read_isolation(&self) -> Option<&'static str> {
        match self {
            Dialect::Db2 => Some("WITH UR"),
            Dialect::Sqlite => None,
        }
    }

    /// Append the dialect's isolation clause, if any.
    pub fn finish(&self, mut sql: String) -> String {
        if let Some(clause) = self.read_isolation() {
            sql.push('\n');
            sql.push_str(clause);
        }
        sql
    }
}

/// A parameterised, read-only statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub sql: String,
    /// Positional `?` parameters, in order.
    pub params: Vec<String>,
    /// Rows per fetch. Drivers may ignore it.
    pub fetch_size: u32,
}

impl CatalogQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            fetch_size: METADATA_FETCH_SIZE,
        }
    }

    pub fn bind(mut self, value: impl Into<String>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn with_fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = fetch_size;
        self
    }
}

/// One fetched row. Every value is carried as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    columns: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl CatalogRow {
    pub fn new(columns: Arc<[String]>, values: Vec<Option<String>>) -> Self {
        Self { columns, values }
    }

    fn index_of(&self, column: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index_of(column).is_some()
    }

    /// The value of `column`, or `None` when absent or NULL.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.index_of(column)
            .and_then(|i| self.values.get(i))
            .and_then(|v| v.as_deref())
    }

    /// The value of `column`; absent columns and NULLs are errors.
    pub fn require(&self, column: &str) -> SessionResult<&str> {
        let index = self
            .index_of(column)
            .ok_or_else(|| SessionError::MissingColumn(column.to_string()))?;
        self.values
            .get(index)
            .and_then(|v| v.as_deref())
            .ok_or_else(|| SessionError::NullValue {
                column: column.to_string(),
            })
    }

    /// Like [`require`](Self::require) with trailing `CHAR` padding removed.
    pub fn require_trimmed(&self, column: &str) -> SessionResult<&str> {
        self.require(column).map(str::trim_end)
    }
}

/// Cooperative cancellation flag shared between a caller and its session.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// An open session against a catalog.
pub trait CatalogSession {
    /// Name of the data source, for error context.
    fn data_source(&self) -> &str;

    fn dialect(&self) -> Dialect;

    /// Schema used when a search names none.
    fn default_schema(&self) -> Option<&str>;

    fn is_cancelled(&self) -> bool;

    /// Execute `query`, passing each row to `visit` until it breaks or rows
    /// run out.
    fn query(
        &self,
        query: &CatalogQuery,
        visit: &mut dyn FnMut(CatalogRow) -> ControlFlow<()>,
    ) -> SessionResult<()>;
}

/// Something that can open catalog sessions.
///
/// Sessions release their resources when dropped.
pub trait SessionSource: Send + Sync {
    type Session<'a>: CatalogSession
    where
        Self: 'a;

    fn data_source_name(&self) -> &str;

    fn open_session(&self, purpose: &str) -> SessionResult<Self::Session<'_>>;
}
