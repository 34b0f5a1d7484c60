//! The structure assistant: name-mask search over the system catalog.

use std::ops::ControlFlow;
use std::sync::Arc;

use super::error::{SearchError, SearchResult};
use super::groups::{PlanInput, QueryGroup, QueryGroupDescriptor, TagContext, QUERY_GROUPS};
use super::params::SearchParams;
use super::reference::ObjectReference;
use crate::catalog::{type_codes, CatalogObject, ObjectCategory, SchemaCache, TypeCodeTable};
use crate::session::{
    CatalogQuery, CatalogSession, Dialect, SessionError, SessionSource, METADATA_FETCH_SIZE,
};

/// Categories offered for hyperlinks and autocompletion. Columns are left out
/// because they are only meaningful next to their owner.
const NAVIGABLE_TYPES: [ObjectCategory; 6] = [
    ObjectCategory::Alias,
    ObjectCategory::Table,
    ObjectCategory::View,
    ObjectCategory::MaterializedView,
    ObjectCategory::Nickname,
    ObjectCategory::Routine,
];

/// A catalog query a search would run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedQuery {
    pub group: QueryGroup,
    pub query: CatalogQuery,
}

/// Finds catalog objects by name mask and resolves the references it returns.
///
/// The assistant holds no per-search state; one instance can serve
/// concurrent searches as long as each brings its own session.
///
/// # Example
///
/// ```ignore
/// let assistant = StructureAssistant::new(Arc::new(cache))?;
/// let params = SearchParams::new("CUST%")
///     .object_type(ObjectCategory::Table)
///     .scope("SALES");
/// for reference in assistant.find_objects_by_mask(&catalog, &params)? {
///     let object = assistant.resolve(&reference)?;
/// }
/// ```
pub struct StructureAssistant {
    cache: Arc<dyn SchemaCache>,
    codes: &'static TypeCodeTable,
    fetch_size: u32,
}

impl StructureAssistant {
    /// Create an assistant over a data source's schema cache.
    ///
    /// Fails if the built-in type code table is inconsistent.
    pub fn new(cache: Arc<dyn SchemaCache>) -> SearchResult<Self> {
        Ok(Self {
            cache,
            codes: type_codes()?,
            fetch_size: METADATA_FETCH_SIZE,
        })
    }

    pub fn with_fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = fetch_size;
        self
    }

    pub fn cache(&self) -> &Arc<dyn SchemaCache> {
        &self.cache
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    pub fn supported_object_types(&self) -> &'static [ObjectCategory] {
        &ObjectCategory::ALL
    }

    pub fn search_object_types(&self) -> &'static [ObjectCategory] {
        self.supported_object_types()
    }

    pub fn hyperlink_object_types(&self) -> &'static [ObjectCategory] {
        &NAVIGABLE_TYPES
    }

    pub fn autocomplete_object_types(&self) -> &'static [ObjectCategory] {
        &NAVIGABLE_TYPES
    }

    /// Whether definition text is searched for `category`.
    pub fn supports_search_in_definitions_for(&self, category: ObjectCategory) -> bool {
        category == ObjectCategory::Routine || category.is_table_like()
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Open a session on `source`, search, and close the session.
    pub fn find_objects_by_mask<S: SessionSource>(
        &self,
        source: &S,
        params: &SearchParams,
    ) -> SearchResult<Vec<ObjectReference>> {
        params.validate()?;
        let session = source
            .open_session("Find objects by name")
            .map_err(|e| SearchError::data_access(source.data_source_name(), e))?;
        self.search(&session, params)
    }

    /// Search using an already open session.
    ///
    /// Groups run in order and stop as soon as `max_results` references have
    /// been collected. Cancellation yields the references found so far.
    pub fn search(
        &self,
        session: &dyn CatalogSession,
        params: &SearchParams,
    ) -> SearchResult<Vec<ObjectReference>> {
        params.validate()?;

        let categories = params.requested_categories();
        let mut results = Vec::new();
        if categories.is_empty() {
            return Ok(results);
        }

        let mask = params.effective_mask();
        let input = PlanInput {
            schema: search_scope(params, session.default_schema()),
            mask: &mask,
            categories: &categories,
            search_in_definitions: params.search_in_definitions,
            dialect: session.dialect(),
            fetch_size: self.fetch_size,
            codes: self.codes,
        };
        let ctx = TagContext {
            cache: self.cache.as_ref(),
            codes: self.codes,
        };

        for descriptor in QUERY_GROUPS.iter().filter(|d| d.serves_any(&categories)) {
            if results.len() >= params.max_results {
                break;
            }
            if session.is_cancelled() {
                tracing::debug!(group = %descriptor.group, "search cancelled");
                break;
            }
            let query = (descriptor.build)(&input);
            self.run_group(session, descriptor, &query, &ctx, params.max_results, &mut results)?;
        }

        Ok(results)
    }

    /// The queries a search would run, in order, without running them.
    pub fn plan(
        &self,
        dialect: Dialect,
        default_schema: Option<&str>,
        params: &SearchParams,
    ) -> SearchResult<Vec<PlannedQuery>> {
        params.validate()?;

        let categories = params.requested_categories();
        let mask = params.effective_mask();
        let input = PlanInput {
            schema: search_scope(params, default_schema),
            mask: &mask,
            categories: &categories,
            search_in_definitions: params.search_in_definitions,
            dialect,
            fetch_size: self.fetch_size,
            codes: self.codes,
        };

        Ok(QUERY_GROUPS
            .iter()
            .filter(|d| d.serves_any(&categories))
            .map(|d| PlannedQuery {
                group: d.group,
                query: (d.build)(&input),
            })
            .collect())
    }

    fn run_group(
        &self,
        session: &dyn CatalogSession,
        descriptor: &QueryGroupDescriptor,
        query: &CatalogQuery,
        ctx: &TagContext<'_>,
        max_results: usize,
        results: &mut Vec<ObjectReference>,
    ) -> SearchResult<()> {
        let before = results.len();
        let mut checked_columns = false;
        let mut failure: Option<SessionError> = None;

        session
            .query(query, &mut |row| {
                if session.is_cancelled() {
                    return ControlFlow::Break(());
                }
                if !checked_columns {
                    checked_columns = true;
                    if let Some(missing) = descriptor
                        .columns
                        .iter()
                        .copied()
                        .find(|c| !row.has_column(c))
                    {
                        failure = Some(SessionError::MissingColumn(missing.to_string()));
                        return ControlFlow::Break(());
                    }
                }
                match (descriptor.tag)(&row, ctx) {
                    Ok(Some(reference)) => {
                        results.push(reference);
                        if results.len() >= max_results {
                            return ControlFlow::Break(());
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        failure = Some(err);
                        return ControlFlow::Break(());
                    }
                }
                ControlFlow::Continue(())
            })
            .map_err(|e| SearchError::data_access(session.data_source(), e))?;

        if let Some(err) = failure {
            return Err(SearchError::data_access(session.data_source(), err));
        }

        tracing::debug!(
            group = %descriptor.group,
            found = results.len() - before,
            "query group finished"
        );
        Ok(())
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    /// Resolve a reference against this assistant's cache.
    pub fn resolve(&self, reference: &ObjectReference) -> SearchResult<CatalogObject> {
        reference.resolve(self.cache.as_ref())
    }
}

/// The schema to filter on: the explicit scope, else the session default
/// unless the search is global.
fn search_scope<'a>(params: &'a SearchParams, default_schema: Option<&'a str>) -> Option<&'a str> {
    match (&params.scope, params.global_search) {
        (Some(scope), _) => Some(scope.as_str()),
        (None, false) => default_schema,
        (None, true) => None,
    }
}
