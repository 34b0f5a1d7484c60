//! Lazily resolved object references.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{SearchError, SearchResult};
use crate::catalog::{CatalogObject, ObjectCategory, SchemaCache};

/// The object a reference lives in.
///
/// A container is a lookup key into the schema cache, not a handle: it stays
/// valid across cache reloads and resolves against whatever the cache holds
/// at resolution time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContainerRef {
    Schema { schema: String },
    Table { schema: String, table: String },
    View { schema: String, view: String },
}

impl ContainerRef {
    pub fn schema(name: impl Into<String>) -> Self {
        ContainerRef::Schema {
            schema: name.into(),
        }
    }

    pub fn table(schema: impl Into<String>, table: impl Into<String>) -> Self {
        ContainerRef::Table {
            schema: schema.into(),
            table: table.into(),
        }
    }

    pub fn view(schema: impl Into<String>, view: impl Into<String>) -> Self {
        ContainerRef::View {
            schema: schema.into(),
            view: view.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ContainerRef::Schema { .. } => "schema",
            ContainerRef::Table { .. } => "table",
            ContainerRef::View { .. } => "view",
        }
    }

    /// Name of the container itself.
    pub fn name(&self) -> &str {
        match self {
            ContainerRef::Schema { schema } => schema,
            ContainerRef::Table { table, .. } => table,
            ContainerRef::View { view, .. } => view,
        }
    }

    pub fn schema_name(&self) -> &str {
        match self {
            ContainerRef::Schema { schema }
            | ContainerRef::Table { schema, .. }
            | ContainerRef::View { schema, .. } => schema,
        }
    }

    /// Find the child `name` of `category` inside this container.
    fn find_child(
        &self,
        cache: &dyn SchemaCache,
        category: ObjectCategory,
        name: &str,
    ) -> Option<CatalogObject> {
        let schema = cache.schema(self.schema_name())?;
        match self {
            ContainerRef::Schema { .. } => schema.find_object(category, name),
            ContainerRef::Table { table: owner, .. } | ContainerRef::View { view: owner, .. } => {
                if category != ObjectCategory::Column {
                    return None;
                }
                let relation = match self {
                    ContainerRef::Table { .. } => schema.table(owner),
                    _ => schema.view(owner),
                }?;
                relation
                    .column(name)
                    .map(|column| CatalogObject::Column {
                        schema: schema.name.clone(),
                        owner: relation.name.clone(),
                        column: column.clone(),
                    })
            }
        }
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerRef::Schema { schema } => f.write_str(schema),
            ContainerRef::Table { schema, table } => write!(f, "{}.{}", schema, table),
            ContainerRef::View { schema, view } => write!(f, "{}.{}", schema, view),
        }
    }
}

/// A search hit: enough to name an object and resolve it later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectReference {
    name: String,
    container: ContainerRef,
    category: ObjectCategory,
}

impl ObjectReference {
    pub fn new(name: impl Into<String>, container: ContainerRef, category: ObjectCategory) -> Self {
        Self {
            name: name.into(),
            container,
            category,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container(&self) -> &ContainerRef {
        &self.container
    }

    pub fn category(&self) -> ObjectCategory {
        self.category
    }

    /// Dotted name, e.g. `SALES.CUSTOMERS` or `SALES.CUSTOMERS.ID`.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.container, self.name)
    }

    /// Resolve against the data source's cache.
    ///
    /// Fails with [`SearchError::NotFound`] when the container or the object
    /// is missing, or when the object found has another category.
    pub fn resolve(&self, cache: &dyn SchemaCache) -> SearchResult<CatalogObject> {
        self.container
            .find_child(cache, self.category, &self.name)
            .filter(|object| object.category() == self.category)
            .ok_or_else(|| SearchError::NotFound {
                category: self.category,
                name: self.name.clone(),
                container_kind: self.container.kind(),
                container: self.container.name().to_string(),
            })
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.category, self.qualified_name())
    }
}
