//! Catalog structure search.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      StructureAssistant                         │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │  SearchParams ──▶ requested categories ──▶ query groups   │  │
//! │  │                                                           │  │
//! │  │  1. table-like  (SYSCAT.TABLES [+ SYSIBM.SYSVIEWS])       │  │
//! │  │  2. columns     (SYSCAT.COLUMNS)                          │  │
//! │  │  3. routines    (SYSCAT.ROUTINES)                         │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │         │ CatalogQuery                   ▲ ObjectReference      │
//! │         ▼                                │                      │
//! │   CatalogSession (rows) ──▶ tagger ──▶ SchemaCache lookup       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Groups run strictly in order against one session. The result cap is
//! shared by all groups; once it is reached no further rows are fetched and
//! no further groups run. References are resolved later, on demand, through
//! [`ObjectReference::resolve`].

mod assistant;
mod error;
mod groups;
mod params;
mod reference;

pub use assistant::{PlannedQuery, StructureAssistant};
pub use error::{SearchError, SearchResult};
pub use groups::QueryGroup;
pub use params::{SearchParams, DEFAULT_MAX_RESULTS};
pub use reference::{ContainerRef, ObjectReference};
