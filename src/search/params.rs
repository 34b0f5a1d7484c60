//! Search parameters.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::error::{SearchError, SearchResult};
use crate::catalog::{ObjectCategory, RequestedType};

/// Result cap used when the caller does not pick one.
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// What to look for, and where.
///
/// ```ignore
/// let params = SearchParams::new("CUST%")
///     .object_type(ObjectCategory::Table)
///     .scope("SALES")
///     .max_results(10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Name mask in `LIKE` syntax.
    pub mask: String,
    pub case_sensitive: bool,
    pub object_types: Vec<RequestedType>,
    /// Schema to search in.
    pub scope: Option<String>,
    /// Search every schema when no scope is given, instead of the default one.
    pub global_search: bool,
    /// Also match view and routine text against the mask.
    pub search_in_definitions: bool,
    pub max_results: usize,
}

impl SearchParams {
    pub fn new(mask: impl Into<String>) -> Self {
        Self {
            mask: mask.into(),
            case_sensitive: false,
            object_types: Vec::new(),
            scope: None,
            global_search: false,
            search_in_definitions: false,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn object_type(mut self, object_type: impl Into<RequestedType>) -> Self {
        self.object_types.push(object_type.into());
        self
    }

    pub fn object_types<T: Into<RequestedType>>(
        mut self,
        object_types: impl IntoIterator<Item = T>,
    ) -> Self {
        self.object_types
            .extend(object_types.into_iter().map(Into::into));
        self
    }

    pub fn scope(mut self, schema: impl Into<String>) -> Self {
        self.scope = Some(schema.into());
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn global(mut self, global_search: bool) -> Self {
        self.global_search = global_search;
        self
    }

    pub fn search_in_definitions(mut self, enabled: bool) -> Self {
        self.search_in_definitions = enabled;
        self
    }

    pub fn max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn validate(&self) -> SearchResult<()> {
        if self.mask.is_empty() {
            return Err(SearchError::InvalidParameters(
                "name mask must not be empty".to_string(),
            ));
        }
        if self.object_types.is_empty() {
            return Err(SearchError::InvalidParameters(
                "at least one object type must be requested".to_string(),
            ));
        }
        if self.max_results == 0 {
            return Err(SearchError::InvalidParameters(
                "maximum result count must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// The mask as sent to the catalog. DB2 stores unquoted names in upper
    /// case, so case-insensitive searches fold the mask. A mask without a
    /// `%` wildcard is a prefix.
    pub fn effective_mask(&self) -> String {
        let mut mask = if self.case_sensitive {
            self.mask.clone()
        } else {
            self.mask.to_uppercase()
        };
        if !mask.contains('%') {
            mask.push('%');
        }
        mask
    }

    /// Requested types that the catalog can serve.
    pub fn requested_categories(&self) -> BTreeSet<ObjectCategory> {
        self.object_types
            .iter()
            .filter_map(RequestedType::category)
            .collect()
    }
}
