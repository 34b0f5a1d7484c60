//! Query groups.
//!
//! Requested categories are served by three catalog queries, always run in
//! the order of [`QUERY_GROUPS`]. Each group is described by data: the
//! categories it serves, the result columns it needs, how to build its SQL
//! and how to turn a row into a reference.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::reference::{ContainerRef, ObjectReference};
use crate::catalog::{CachedSchema, ObjectCategory, SchemaCache, TypeCodeTable};
use crate::session::{CatalogQuery, CatalogRow, Dialect, SessionResult};

/// One of the catalog queries a search may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryGroup {
    /// Aliases, tables, views, MQTs and nicknames from `SYSCAT.TABLES`.
    TableLike,
    Columns,
    Routines,
}

impl QueryGroup {
    /// The group serving `category`.
    pub fn of(category: ObjectCategory) -> QueryGroup {
        match category {
            ObjectCategory::Column => QueryGroup::Columns,
            ObjectCategory::Routine => QueryGroup::Routines,
            _ => QueryGroup::TableLike,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryGroup::TableLike => "table_like",
            QueryGroup::Columns => "columns",
            QueryGroup::Routines => "routines",
        }
    }
}

impl fmt::Display for QueryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs shared by every group's SQL builder.
pub(crate) struct PlanInput<'a> {
    pub schema: Option<&'a str>,
    pub mask: &'a str,
    pub categories: &'a BTreeSet<ObjectCategory>,
    pub search_in_definitions: bool,
    pub dialect: Dialect,
    pub fetch_size: u32,
    pub codes: &'a TypeCodeTable,
}

/// What a row tagger can see.
pub(crate) struct TagContext<'a> {
    pub cache: &'a dyn SchemaCache,
    pub codes: &'a TypeCodeTable,
}

type BuildFn = fn(&PlanInput<'_>) -> CatalogQuery;
type TagFn = fn(&CatalogRow, &TagContext<'_>) -> SessionResult<Option<ObjectReference>>;

pub(crate) struct QueryGroupDescriptor {
    pub group: QueryGroup,
    pub categories: &'static [ObjectCategory],
    /// Result columns the tagger reads.
    pub columns: &'static [&'static str],
    pub build: BuildFn,
    pub tag: TagFn,
}

impl QueryGroupDescriptor {
    pub fn serves_any(&self, categories: &BTreeSet<ObjectCategory>) -> bool {
        self.categories.iter().any(|c| categories.contains(c))
    }
}

pub(crate) static QUERY_GROUPS: [QueryGroupDescriptor; 3] = [
    QueryGroupDescriptor {
        group: QueryGroup::TableLike,
        categories: &[
            ObjectCategory::Alias,
            ObjectCategory::Table,
            ObjectCategory::View,
            ObjectCategory::MaterializedView,
            ObjectCategory::Nickname,
        ],
        columns: &["TABSCHEMA", "TABNAME", "TYPE"],
        build: table_like_query,
        tag: tag_table_like,
    },
    QueryGroupDescriptor {
        group: QueryGroup::Columns,
        categories: &[ObjectCategory::Column],
        columns: &["TABSCHEMA", "TABNAME", "COLNAME"],
        build: columns_query,
        tag: tag_column,
    },
    QueryGroupDescriptor {
        group: QueryGroup::Routines,
        categories: &[ObjectCategory::Routine],
        columns: &["ROUTINESCHEMA", "ROUTINENAME"],
        build: routines_query,
        tag: tag_routine,
    },
];

fn type_list(input: &PlanInput<'_>) -> String {
    input
        .codes
        .codes_for_all(input.categories.iter())
        .iter()
        .map(|code| format!("'{}'", code))
        .collect::<Vec<_>>()
        .join(", ")
}

fn table_like_query(input: &PlanInput<'_>) -> CatalogQuery {
    let types = type_list(input);
    let mut params = Vec::new();

    let mut sql = String::from("SELECT TABSCHEMA, TABNAME, TYPE\nFROM SYSCAT.TABLES\nWHERE ");
    if let Some(schema) = input.schema {
        sql.push_str("TABSCHEMA = ? AND ");
        params.push(schema);
    }
    sql.push_str(&format!("TABNAME LIKE ? AND TYPE IN ({})", types));
    params.push(input.mask);

    if input.search_in_definitions {
        sql.push_str(
            "\nUNION\nSELECT t.TABSCHEMA, t.TABNAME, t.TYPE\nFROM SYSIBM.SYSVIEWS v\n\
             INNER JOIN SYSCAT.TABLES t ON v.CREATOR = t.TABSCHEMA AND v.NAME = t.TABNAME\n",
        );
        sql.push_str(&format!("WHERE v.TEXT LIKE ? AND t.TYPE IN ({})", types));
        params.push(input.mask);
        if let Some(schema) = input.schema {
            sql.push_str(" AND t.TABSCHEMA = ?");
            params.push(schema);
        }
    }
    sql.push_str("\nORDER BY 1, 2");

    finish(input, sql, params)
}

fn columns_query(input: &PlanInput<'_>) -> CatalogQuery {
    let mut params = Vec::new();

    let mut sql = String::from("SELECT TABSCHEMA, TABNAME, COLNAME\nFROM SYSCAT.COLUMNS\nWHERE ");
    if let Some(schema) = input.schema {
        sql.push_str("TABSCHEMA = ? AND ");
        params.push(schema);
    }
    sql.push_str("COLNAME LIKE ?\nORDER BY TABSCHEMA, TABNAME, COLNO");
    params.push(input.mask);

    finish(input, sql, params)
}

fn routines_query(input: &PlanInput<'_>) -> CatalogQuery {
    let mut params = Vec::new();

    let mut sql =
        String::from("SELECT DISTINCT ROUTINESCHEMA, ROUTINENAME\nFROM SYSCAT.ROUTINES\nWHERE ");
    if let Some(schema) = input.schema {
        sql.push_str("ROUTINESCHEMA = ? AND ");
        params.push(schema);
    }
    if input.search_in_definitions {
        sql.push_str("(TEXT LIKE ? OR ROUTINENAME LIKE ?)");
        params.push(input.mask);
    } else {
        sql.push_str("ROUTINENAME LIKE ?");
    }
    params.push(input.mask);
    sql.push_str("\nORDER BY ROUTINESCHEMA, ROUTINENAME");

    finish(input, sql, params)
}

fn finish(input: &PlanInput<'_>, sql: String, params: Vec<&str>) -> CatalogQuery {
    params.into_iter().fold(
        CatalogQuery::new(input.dialect.finish(sql)).with_fetch_size(input.fetch_size),
        |query, value| query.bind(value),
    )
}

/// The cached schema named by a row, or `None` (logged) when the cache does
/// not know it.
fn cached_schema(ctx: &TagContext<'_>, schema: &str) -> Option<Arc<CachedSchema>> {
    let cached = ctx.cache.schema(schema);
    if cached.is_none() {
        tracing::debug!("Schema '{}' not found. Probably was filtered", schema);
    }
    cached
}

fn tag_table_like(
    row: &CatalogRow,
    ctx: &TagContext<'_>,
) -> SessionResult<Option<ObjectReference>> {
    let schema = row.require_trimmed("TABSCHEMA")?;
    let name = row.require("TABNAME")?;
    let raw_type = row.require("TYPE")?;

    let Some(category) = ctx.codes.category_for(raw_type) else {
        tracing::debug!(schema, name, raw_type, "skipping object with unknown type code");
        return Ok(None);
    };
    if cached_schema(ctx, schema).is_none() {
        return Ok(None);
    }
    Ok(Some(ObjectReference::new(
        name,
        ContainerRef::schema(schema),
        category,
    )))
}

fn tag_column(row: &CatalogRow, ctx: &TagContext<'_>) -> SessionResult<Option<ObjectReference>> {
    let schema = row.require_trimmed("TABSCHEMA")?;
    let owner = row.require("TABNAME")?;
    let column = row.require("COLNAME")?;

    let Some(cached) = cached_schema(ctx, schema) else {
        return Ok(None);
    };
    // Tables first, then views.
    let container = if cached.table(owner).is_some() {
        ContainerRef::table(schema, owner)
    } else if cached.view(owner).is_some() {
        ContainerRef::view(schema, owner)
    } else {
        tracing::debug!(schema, owner, column, "column owner is neither a table nor a view");
        return Ok(None);
    };
    Ok(Some(ObjectReference::new(
        column,
        container,
        ObjectCategory::Column,
    )))
}

fn tag_routine(row: &CatalogRow, ctx: &TagContext<'_>) -> SessionResult<Option<ObjectReference>> {
    let schema = row.require_trimmed("ROUTINESCHEMA")?;
    let name = row.require("ROUTINENAME")?;

    if cached_schema(ctx, schema).is_none() {
        return Ok(None);
    }
    Ok(Some(ObjectReference::new(
        name,
        ContainerRef::schema(schema),
        ObjectCategory::Routine,
    )))
}
