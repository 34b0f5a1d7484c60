//! SQLite-hosted catalog.
//!
//! The DB2 catalog views are emulated with two attached SQLite databases,
//! `SYSCAT` and `SYSIBM`, so the search queries run unchanged apart from the
//! isolation clause. `LIKE` is switched to case-sensitive matching to follow
//! DB2 semantics.

use std::ops::ControlFlow;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::types::ValueRef;
use rusqlite::{params, params_from_iter, Connection};

use super::{
    CancelToken, CatalogQuery, CatalogRow, CatalogSession, Dialect, SessionError, SessionResult,
    SessionSource,
};

const CATALOG_DDL: &str = "
    PRAGMA case_sensitive_like = ON;

    CREATE TABLE IF NOT EXISTS SYSCAT.SCHEMATA (
        SCHEMANAME TEXT NOT NULL PRIMARY KEY,
        OWNER TEXT
    );

    CREATE TABLE IF NOT EXISTS SYSCAT.TABLES (
        TABSCHEMA TEXT NOT NULL,
        TABNAME TEXT NOT NULL,
        TYPE TEXT NOT NULL,
        PRIMARY KEY (TABSCHEMA, TABNAME)
    );

    CREATE TABLE IF NOT EXISTS SYSCAT.COLUMNS (
        TABSCHEMA TEXT NOT NULL,
        TABNAME TEXT NOT NULL,
        COLNAME TEXT NOT NULL,
        COLNO INTEGER NOT NULL,
        TYPENAME TEXT NOT NULL,
        NULLS TEXT NOT NULL DEFAULT 'Y',
        PRIMARY KEY (TABSCHEMA, TABNAME, COLNAME)
    );

    CREATE TABLE IF NOT EXISTS SYSCAT.ROUTINES (
        ROUTINESCHEMA TEXT NOT NULL,
        ROUTINENAME TEXT NOT NULL,
        SPECIFICNAME TEXT NOT NULL,
        TEXT TEXT,
        PRIMARY KEY (ROUTINESCHEMA, SPECIFICNAME)
    );

    CREATE TABLE IF NOT EXISTS SYSIBM.SYSVIEWS (
        CREATOR TEXT NOT NULL,
        NAME TEXT NOT NULL,
        TEXT TEXT,
        PRIMARY KEY (CREATOR, NAME)
    );
";

/// A catalog stored in SQLite.
///
/// One session may be open at a time; opening a session holds the connection
/// until the session is dropped. The seeding helpers lock the connection too,
/// so they must not be called while a session is alive on the same thread.
pub struct SqliteCatalog {
    name: String,
    conn: Mutex<Connection>,
    default_schema: Option<String>,
    cancel: CancelToken,
}

impl SqliteCatalog {
    /// Open a throwaway catalog held in memory.
    pub fn open_in_memory(name: impl Into<String>) -> SessionResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(
            "ATTACH DATABASE ':memory:' AS SYSCAT;
             ATTACH DATABASE ':memory:' AS SYSIBM;",
        )?;
        Self::init(name.into(), conn)
    }

    /// Open (or create) a catalog stored as `syscat.db` and `sysibm.db`
    /// under `dir`.
    pub fn open(dir: impl AsRef<Path>, name: impl Into<String>) -> SessionResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let conn = Connection::open_in_memory()?;
        for (file, alias) in [("syscat.db", "SYSCAT"), ("sysibm.db", "SYSIBM")] {
            let path = dir.join(file).to_string_lossy().into_owned();
            conn.execute(&format!("ATTACH DATABASE ?1 AS {}", alias), params![path])?;
        }
        Self::init(name.into(), conn)
    }

    fn init(name: String, conn: Connection) -> SessionResult<Self> {
        conn.execute_batch(CATALOG_DDL)?;
        Ok(Self {
            name,
            conn: Mutex::new(conn),
            default_schema: None,
            cancel: CancelToken::new(),
        })
    }

    pub fn with_default_schema(mut self, schema: impl Into<String>) -> Self {
        self.default_schema = Some(schema.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token observed by every session of this catalog.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn lock(&self) -> SessionResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| SessionError::LockPoisoned)
    }

    /// Run raw SQL against the catalog databases.
    pub fn execute_batch(&self, sql: &str) -> SessionResult<()> {
        self.lock()?.execute_batch(sql)?;
        Ok(())
    }

    pub fn add_schema(&self, schema: &str) -> SessionResult<()> {
        self.lock()?.execute(
            "INSERT OR IGNORE INTO SYSCAT.SCHEMATA (SCHEMANAME) VALUES (?1)",
            params![schema],
        )?;
        Ok(())
    }

    /// Register a `SYSCAT.TABLES` row. The schema is created if needed.
    pub fn add_table(&self, schema: &str, name: &str, type_code: char) -> SessionResult<()> {
        self.add_schema(schema)?;
        self.lock()?.execute(
            "INSERT OR REPLACE INTO SYSCAT.TABLES (TABSCHEMA, TABNAME, TYPE) VALUES (?1, ?2, ?3)",
            params![schema, name, type_code.to_string()],
        )?;
        Ok(())
    }

    /// Register a view together with its definition text.
    pub fn add_view(&self, schema: &str, name: &str, text: &str) -> SessionResult<()> {
        self.add_table(schema, name, 'V')?;
        self.lock()?.execute(
            "INSERT OR REPLACE INTO SYSIBM.SYSVIEWS (CREATOR, NAME, TEXT) VALUES (?1, ?2, ?3)",
            params![schema, name, text],
        )?;
        Ok(())
    }

    pub fn add_column(
        &self,
        schema: &str,
        table: &str,
        name: &str,
        ordinal: u32,
        type_name: &str,
        nullable: bool,
    ) -> SessionResult<()> {
        self.lock()?.execute(
            "INSERT OR REPLACE INTO SYSCAT.COLUMNS (TABSCHEMA, TABNAME, COLNAME, COLNO, TYPENAME, NULLS)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                schema,
                table,
                name,
                ordinal,
                type_name,
                if nullable { "Y" } else { "N" }
            ],
        )?;
        Ok(())
    }

    pub fn add_routine(
        &self,
        schema: &str,
        name: &str,
        specific_name: &str,
        text: Option<&str>,
    ) -> SessionResult<()> {
        self.add_schema(schema)?;
        self.lock()?.execute(
            "INSERT OR REPLACE INTO SYSCAT.ROUTINES (ROUTINESCHEMA, ROUTINENAME, SPECIFICNAME, TEXT)
             VALUES (?1, ?2, ?3, ?4)",
            params![schema, name, specific_name, text],
        )?;
        Ok(())
    }
}

impl SessionSource for SqliteCatalog {
    type Session<'a> = SqliteSession<'a>;

    fn data_source_name(&self) -> &str {
        &self.name
    }

    fn open_session(&self, purpose: &str) -> SessionResult<SqliteSession<'_>> {
        let conn = self.lock()?;
        tracing::debug!(data_source = %self.name, purpose, "opened catalog session");
        Ok(SqliteSession {
            catalog: self,
            conn,
            purpose: purpose.to_string(),
        })
    }
}

/// A session holding the catalog's connection.
pub struct SqliteSession<'a> {
    catalog: &'a SqliteCatalog,
    conn: MutexGuard<'a, Connection>,
    purpose: String,
}

impl CatalogSession for SqliteSession<'_> {
    fn data_source(&self) -> &str {
        &self.catalog.name
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn default_schema(&self) -> Option<&str> {
        self.catalog.default_schema.as_deref()
    }

    fn is_cancelled(&self) -> bool {
        self.catalog.cancel.is_cancelled()
    }

    fn query(
        &self,
        query: &CatalogQuery,
        visit: &mut dyn FnMut(CatalogRow) -> ControlFlow<()>,
    ) -> SessionResult<()> {
        // SQLite steps one row at a time; the fetch size has nothing to tune.
        tracing::trace!(
            sql = %query.sql,
            params = ?query.params,
            fetch_size = query.fetch_size,
            "executing catalog query"
        );

        let mut stmt = self.conn.prepare(&query.sql)?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.query(params_from_iter(query.params.iter()))?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                values.push(text_value(row.get_ref(index)?));
            }
            if visit(CatalogRow::new(Arc::clone(&columns), values)).is_break() {
                break;
            }
        }
        Ok(())
    }
}

impl Drop for SqliteSession<'_> {
    fn drop(&mut self) {
        tracing::debug!(
            data_source = %self.catalog.name,
            purpose = %self.purpose,
            "closed catalog session"
        );
    }
}

fn text_value(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}
