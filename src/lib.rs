//! # catalog-search
//!
//! Name-mask search over the DB2 system catalog, returning lazily resolvable
//! object references.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           SYSCAT / SYSIBM catalog (CatalogSession)       │
//! └─────────────────────────────────────────────────────────┘
//!              │                              │
//!              ▼ [catalog::CatalogLoader]     │
//! ┌──────────────────────────────┐            │
//! │  SchemaCache (CachedSchema)  │◀── snapshot::SnapshotStore
//! └──────────────────────────────┘            │
//!              │                              ▼ [search queries]
//!              │            ┌──────────────────────────────────┐
//!              └───────────▶│  search::StructureAssistant      │
//!                           │  SearchParams -> ObjectReference │
//!                           └──────────────────────────────────┘
//!                                          │
//!                                          ▼ [ObjectReference::resolve]
//!                                    CatalogObject
//! ```

pub mod catalog;
pub mod config;
pub mod search;
pub mod session;
pub mod snapshot;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{
        CachedSchema, CatalogLoader, CatalogObject, InMemorySchemaCache, ObjectCategory,
        RequestedType, SchemaCache, SchemaFilter,
    };
    pub use crate::search::{
        ContainerRef, ObjectReference, SearchError, SearchParams, SearchResult,
        StructureAssistant,
    };
    pub use crate::session::{
        CancelToken, CatalogSession, Dialect, SessionSource, SqliteCatalog,
    };
}
