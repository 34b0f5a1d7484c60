//! Cached catalog model.
//!
//! A data source keeps a snapshot of its schemas, relations and routines.
//! Search results point into this snapshot by name; [`SchemaCache`] is the
//! lookup seam the search and resolution code depend on.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::category::ObjectCategory;

/// A column of a table or view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    /// Zero-based position (`SYSCAT.COLUMNS.COLNO`).
    pub ordinal: u32,
    pub data_type: String,
    pub nullable: bool,
}

/// A row of `SYSCAT.TABLES`: table, view, alias, MQT or nickname.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    pub category: ObjectCategory,
    pub type_code: char,
    #[serde(default)]
    pub columns: Vec<Column>,
    /// View text, when the catalog has one.
    #[serde(default)]
    pub definition: Option<String>,
}

impl Relation {
    pub fn new(name: impl Into<String>, category: ObjectCategory, type_code: char) -> Self {
        Self {
            name: name.into(),
            category,
            type_code,
            columns: Vec::new(),
            definition: None,
        }
    }

    pub fn with_definition(mut self, text: impl Into<String>) -> Self {
        self.definition = Some(text.into());
        self
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A routine and its overloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    pub name: String,
    /// One specific name per overload.
    #[serde(default)]
    pub specific_names: Vec<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// One schema of the cached catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSchema {
    pub name: String,
    relations: BTreeMap<String, Relation>,
    routines: BTreeMap<String, Routine>,
}

impl CachedSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_relation(&mut self, relation: Relation) {
        self.relations.insert(relation.name.clone(), relation);
    }

    /// Builder form of [`add_relation`](Self::add_relation).
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.add_relation(relation);
        self
    }

    /// Add a routine overload. Overloads share one entry per name.
    pub fn add_routine(
        &mut self,
        name: impl Into<String>,
        specific_name: impl Into<String>,
        text: Option<String>,
    ) {
        let name = name.into();
        let routine = self.routines.entry(name.clone()).or_insert_with(|| Routine {
            name,
            specific_names: Vec::new(),
            text: None,
        });
        routine.specific_names.push(specific_name.into());
        if routine.text.is_none() {
            routine.text = text;
        }
    }

    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    pub fn relation_mut(&mut self, name: &str) -> Option<&mut Relation> {
        self.relations.get_mut(name)
    }

    /// A relation that owns stored rows: a table or an MQT.
    pub fn table(&self, name: &str) -> Option<&Relation> {
        self.relation(name).filter(|r| {
            matches!(
                r.category,
                ObjectCategory::Table | ObjectCategory::MaterializedView
            )
        })
    }

    pub fn view(&self, name: &str) -> Option<&Relation> {
        self.relation(name)
            .filter(|r| r.category == ObjectCategory::View)
    }

    pub fn routine(&self, name: &str) -> Option<&Routine> {
        self.routines.get(name)
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    pub fn routines(&self) -> impl Iterator<Item = &Routine> {
        self.routines.values()
    }

    /// Look up a direct child of this schema by category.
    ///
    /// Columns are not direct children of a schema and never match here.
    pub fn find_object(&self, category: ObjectCategory, name: &str) -> Option<CatalogObject> {
        match category {
            ObjectCategory::Column => None,
            ObjectCategory::Routine => self.routine(name).map(|routine| CatalogObject::Routine {
                schema: self.name.clone(),
                routine: routine.clone(),
            }),
            _ => self
                .relation(name)
                .filter(|r| r.category == category)
                .map(|relation| CatalogObject::Relation {
                    schema: self.name.clone(),
                    relation: relation.clone(),
                }),
        }
    }
}

/// A live catalog object, produced by resolving a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogObject {
    Relation {
        schema: String,
        relation: Relation,
    },
    Column {
        schema: String,
        owner: String,
        column: Column,
    },
    Routine {
        schema: String,
        routine: Routine,
    },
}

impl CatalogObject {
    pub fn category(&self) -> ObjectCategory {
        match self {
            CatalogObject::Relation { relation, .. } => relation.category,
            CatalogObject::Column { .. } => ObjectCategory::Column,
            CatalogObject::Routine { .. } => ObjectCategory::Routine,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CatalogObject::Relation { relation, .. } => &relation.name,
            CatalogObject::Column { column, .. } => &column.name,
            CatalogObject::Routine { routine, .. } => &routine.name,
        }
    }

    pub fn schema(&self) -> &str {
        match self {
            CatalogObject::Relation { schema, .. }
            | CatalogObject::Column { schema, .. }
            | CatalogObject::Routine { schema, .. } => schema,
        }
    }
}

/// Lookup seam over a data source's cached schemas.
///
/// Unknown schemas yield `None`; a schema can be missing from the cache
/// because a filter excluded it or because the snapshot predates it.
pub trait SchemaCache: Send + Sync {
    fn schema(&self, name: &str) -> Option<Arc<CachedSchema>>;

    fn schema_names(&self) -> Vec<String>;
}

/// A [`SchemaCache`] held entirely in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemorySchemaCache {
    schemas: BTreeMap<String, Arc<CachedSchema>>,
}

impl InMemorySchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, schema: CachedSchema) {
        self.schemas.insert(schema.name.clone(), Arc::new(schema));
    }

    pub fn with_schema(mut self, schema: CachedSchema) -> Self {
        self.insert(schema);
        self
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Number of relations and routines across all schemas.
    pub fn object_count(&self) -> usize {
        self.schemas
            .values()
            .map(|s| s.relations.len() + s.routines.len())
            .sum()
    }
}

impl SchemaCache for InMemorySchemaCache {
    fn schema(&self, name: &str) -> Option<Arc<CachedSchema>> {
        self.schemas.get(name).cloned()
    }

    fn schema_names(&self) -> Vec<String> {
        self.schemas.keys().cloned().collect()
    }
}
