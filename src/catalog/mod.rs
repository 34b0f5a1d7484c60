//! Catalog model: object categories, DB2 type codes and the cached schema
//! registry that search results resolve against.

mod category;
mod loader;
mod model;
mod type_code;

pub use category::{ObjectCategory, ParseObjectTypeError, RequestedType};
pub use loader::{CatalogLoader, LoadError, LoadResult, SchemaFilter};
pub use model::{
    CachedSchema, CatalogObject, Column, InMemorySchemaCache, Relation, Routine, SchemaCache,
};
pub use type_code::{type_codes, TypeCodeError, TypeCodeTable};
