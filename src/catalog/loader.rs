//! Populate a [`InMemorySchemaCache`] from the system catalog.
//!
//! The loader reads `SYSCAT.SCHEMATA`, `SYSCAT.TABLES` (joined with
//! `SYSIBM.SYSVIEWS` for view text), `SYSCAT.COLUMNS` and `SYSCAT.ROUTINES`,
//! keeping only schemas accepted by a [`SchemaFilter`].

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use regex::Regex;

use super::model::{CachedSchema, Column, InMemorySchemaCache, Relation};
use super::type_code::{type_codes, TypeCodeError};
use crate::session::{
    CatalogQuery, CatalogRow, CatalogSession, SessionError, SessionResult, METADATA_FETCH_SIZE,
};

/// Errors raised while loading the cache.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("catalog query failed: {0}")]
    Session(#[from] SessionError),

    #[error("invalid schema pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error(transparent)]
    TypeCodes(#[from] TypeCodeError),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// Include/exclude rules over schema names.
///
/// Patterns use `LIKE` wildcards (`%` and `_`) and match case-insensitively.
/// An empty include list accepts every schema not excluded.
#[derive(Debug, Clone, Default)]
pub struct SchemaFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl SchemaFilter {
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> LoadResult<Self> {
        let compile = |patterns: &[S]| -> Result<Vec<Regex>, regex::Error> {
            patterns
                .iter()
                .map(|p| Regex::new(&like_to_regex(p.as_ref())))
                .collect()
        };
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    pub fn accepts(&self, schema: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|r| r.is_match(schema));
        included && !self.exclude.iter().any(|r| r.is_match(schema))
    }
}

fn like_to_regex(pattern: &str) -> String {
    let mut out = String::from("(?i)^");
    for c in pattern.chars() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}

const SQL_SCHEMAS: &str = "SELECT SCHEMANAME FROM SYSCAT.SCHEMATA ORDER BY SCHEMANAME";

const SQL_RELATIONS: &str = "SELECT t.TABSCHEMA, t.TABNAME, t.TYPE, v.TEXT
FROM SYSCAT.TABLES t
LEFT OUTER JOIN SYSIBM.SYSVIEWS v ON v.CREATOR = t.TABSCHEMA AND v.NAME = t.TABNAME
ORDER BY t.TABSCHEMA, t.TABNAME";

const SQL_COLUMNS: &str = "SELECT TABSCHEMA, TABNAME, COLNAME, COLNO, TYPENAME, NULLS
FROM SYSCAT.COLUMNS
ORDER BY TABSCHEMA, TABNAME, COLNO";

const SQL_ROUTINES: &str = "SELECT ROUTINESCHEMA, ROUTINENAME, SPECIFICNAME, TEXT
FROM SYSCAT.ROUTINES
ORDER BY ROUTINESCHEMA, ROUTINENAME, SPECIFICNAME";

/// Reads the catalog into a schema cache.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    fetch_size: u32,
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self {
            fetch_size: METADATA_FETCH_SIZE,
        }
    }
}

impl CatalogLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = fetch_size;
        self
    }

    /// Load every schema accepted by `filter`.
    pub fn load(
        &self,
        session: &dyn CatalogSession,
        filter: &SchemaFilter,
    ) -> LoadResult<InMemorySchemaCache> {
        let codes = type_codes()?;
        let mut schemas: BTreeMap<String, CachedSchema> = BTreeMap::new();

        self.scan(session, SQL_SCHEMAS, |row| {
            let name = row.require_trimmed("SCHEMANAME")?;
            if filter.accepts(name) {
                schemas.insert(name.to_string(), CachedSchema::new(name));
            }
            Ok(())
        })?;

        self.scan(session, SQL_RELATIONS, |row| {
            let schema = row.require_trimmed("TABSCHEMA")?;
            let Some(cached) = schemas.get_mut(schema) else {
                return Ok(());
            };
            let name = row.require("TABNAME")?;
            let raw_type = row.require("TYPE")?;
            let Some(category) = codes.category_for(raw_type) else {
                tracing::debug!(schema, name, raw_type, "skipping object with unknown type code");
                return Ok(());
            };
            let type_code = raw_type.trim().chars().next().unwrap_or_default();
            let mut relation = Relation::new(name, category, type_code);
            relation.definition = row.get("TEXT").map(str::to_string);
            cached.add_relation(relation);
            Ok(())
        })?;

        self.scan(session, SQL_COLUMNS, |row| {
            let schema = row.require_trimmed("TABSCHEMA")?;
            let owner = row.require("TABNAME")?;
            let Some(relation) = schemas
                .get_mut(schema)
                .and_then(|s| s.relation_mut(owner))
            else {
                return Ok(());
            };
            let raw_ordinal = row.require("COLNO")?;
            let ordinal = raw_ordinal
                .parse::<u32>()
                .map_err(|_| SessionError::InvalidValue {
                    column: "COLNO".to_string(),
                    value: raw_ordinal.to_string(),
                })?;
            relation.columns.push(Column {
                name: row.require("COLNAME")?.to_string(),
                ordinal,
                data_type: row.require_trimmed("TYPENAME")?.to_string(),
                nullable: row.get("NULLS").map_or(true, |n| n.trim() == "Y"),
            });
            Ok(())
        })?;

        self.scan(session, SQL_ROUTINES, |row| {
            let schema = row.require_trimmed("ROUTINESCHEMA")?;
            if let Some(cached) = schemas.get_mut(schema) {
                cached.add_routine(
                    row.require("ROUTINENAME")?,
                    row.require("SPECIFICNAME")?,
                    row.get("TEXT").map(str::to_string),
                );
            }
            Ok(())
        })?;

        let mut cache = InMemorySchemaCache::new();
        for schema in schemas.into_values() {
            cache.insert(schema);
        }
        tracing::info!(
            data_source = session.data_source(),
            schemas = cache.len(),
            objects = cache.object_count(),
            "loaded catalog cache"
        );
        Ok(cache)
    }

    fn scan(
        &self,
        session: &dyn CatalogSession,
        sql: &str,
        mut on_row: impl FnMut(&CatalogRow) -> SessionResult<()>,
    ) -> SessionResult<()> {
        let query = CatalogQuery::new(session.dialect().finish(sql.to_string()))
            .with_fetch_size(self.fetch_size);
        let mut failure = None;
        session.query(&query, &mut |row| match on_row(&row) {
            Ok(()) => ControlFlow::Continue(()),
            Err(err) => {
                failure = Some(err);
                ControlFlow::Break(())
            }
        })?;
        failure.map_or(Ok(()), Err)
    }
}
