//! Object type categories.
//!
//! [`ObjectCategory`] is the closed set of object kinds the catalog search
//! understands. [`RequestedType`] is the wider relational vocabulary a caller
//! may ask for; only some of it maps onto a category.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Object kinds stored in a DB2-style catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectCategory {
    Alias,
    Table,
    View,
    /// Materialized query table (MQT).
    MaterializedView,
    Nickname,
    Column,
    Routine,
}

impl ObjectCategory {
    /// Every category, in dispatch order.
    pub const ALL: [ObjectCategory; 7] = [
        ObjectCategory::Alias,
        ObjectCategory::Table,
        ObjectCategory::View,
        ObjectCategory::MaterializedView,
        ObjectCategory::Nickname,
        ObjectCategory::Column,
        ObjectCategory::Routine,
    ];

    /// Display name, as DB2 tooling labels these objects.
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectCategory::Alias => "Alias",
            ObjectCategory::Table => "Table",
            ObjectCategory::View => "View",
            ObjectCategory::MaterializedView => "MQT",
            ObjectCategory::Nickname => "Nickname",
            ObjectCategory::Column => "Column",
            ObjectCategory::Routine => "Routine",
        }
    }

    /// Whether objects of this category are rows of `SYSCAT.TABLES`.
    pub fn is_table_like(&self) -> bool {
        matches!(
            self,
            ObjectCategory::Alias
                | ObjectCategory::Table
                | ObjectCategory::View
                | ObjectCategory::MaterializedView
                | ObjectCategory::Nickname
        )
    }
}

impl fmt::Display for ObjectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an object type name is not recognised at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown object type: {0}")]
pub struct ParseObjectTypeError(pub String);

/// An object type as requested by a caller.
///
/// Requests outside the catalog's categories are legal; they are dropped when
/// a search is planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedType {
    Category(ObjectCategory),
    /// Generic relational procedure; served by the routine search.
    Procedure,
    Function,
    Index,
    Sequence,
    Trigger,
    Package,
}

impl RequestedType {
    /// The catalog category that serves this request, if any.
    pub fn category(&self) -> Option<ObjectCategory> {
        match self {
            RequestedType::Category(category) => Some(*category),
            RequestedType::Procedure => Some(ObjectCategory::Routine),
            RequestedType::Function
            | RequestedType::Index
            | RequestedType::Sequence
            | RequestedType::Trigger
            | RequestedType::Package => None,
        }
    }
}

impl From<ObjectCategory> for RequestedType {
    fn from(category: ObjectCategory) -> Self {
        RequestedType::Category(category)
    }
}

impl FromStr for RequestedType {
    type Err = ParseObjectTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let requested = match s.trim().to_lowercase().as_str() {
            "alias" => ObjectCategory::Alias.into(),
            "table" => ObjectCategory::Table.into(),
            "view" => ObjectCategory::View.into(),
            "mqt" | "materialized_view" | "materialized-view" => {
                ObjectCategory::MaterializedView.into()
            }
            "nickname" => ObjectCategory::Nickname.into(),
            "column" => ObjectCategory::Column.into(),
            "routine" => ObjectCategory::Routine.into(),
            "procedure" => RequestedType::Procedure,
            "function" => RequestedType::Function,
            "index" => RequestedType::Index,
            "sequence" => RequestedType::Sequence,
            "trigger" => RequestedType::Trigger,
            "package" => RequestedType::Package,
            other => return Err(ParseObjectTypeError(other.to_string())),
        };
        Ok(requested)
    }
}
