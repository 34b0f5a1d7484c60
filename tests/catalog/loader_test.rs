//! Loading the schema cache from the catalog views.

#[path = "../support/mod.rs"]
mod support;

#[cfg(test)]
mod tests {
    use super::support::{load_cache, no_system_schemas, sales_catalog, seed, DATA_SOURCE};
    use catalog_search::catalog::{
        CatalogLoader, LoadError, ObjectCategory, SchemaCache, SchemaFilter,
    };
    use catalog_search::session::{SessionSource, SqliteCatalog};

    #[test]
    fn test_load_reads_every_accepted_schema() {
        let catalog = sales_catalog();
        let cache = load_cache(&catalog, &SchemaFilter::accept_all());

        assert_eq!(cache.schema_names(), vec!["HR", "SALES", "SYSTOOLS"]);
        // 5 SALES relations, 1 HR table, 1 HR routine, 1 SYSTOOLS table.
        assert_eq!(cache.object_count(), 8);
    }

    #[test]
    fn test_filter_excludes_schemas() {
        let catalog = sales_catalog();
        let cache = load_cache(&catalog, &no_system_schemas());

        assert!(cache.schema("SYSTOOLS").is_none());
        assert!(cache.schema("SALES").is_some());

        let only_hr = SchemaFilter::new(&["hr"], &[] as &[&str]).unwrap();
        let cache = load_cache(&catalog, &only_hr);
        assert_eq!(cache.schema_names(), vec!["HR"]);
    }

    #[test]
    fn test_relations_carry_category_and_columns() {
        let catalog = sales_catalog();
        let cache = load_cache(&catalog, &no_system_schemas());
        let sales = cache.schema("SALES").unwrap();

        let customers = sales.table("CUSTOMERS").unwrap();
        assert_eq!(customers.category, ObjectCategory::Table);
        let columns: Vec<_> = customers.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, vec!["ID", "NAME", "RANK"]);
        assert!(!customers.column("ID").unwrap().nullable);
        assert!(customers.definition.is_none());

        assert_eq!(
            sales.relation("CUSTOMER_LOG").unwrap().category,
            ObjectCategory::Alias
        );
        assert_eq!(
            sales.table("SALES_SUMMARY").unwrap().category,
            ObjectCategory::MaterializedView
        );
        assert!(sales
            .view("V_TOP_CUSTOMERS")
            .unwrap()
            .definition
            .as_deref()
            .is_some_and(|text| text.starts_with("CREATE VIEW")));
    }

    #[test]
    fn test_routine_overloads_merge() {
        let catalog = sales_catalog();
        let cache = load_cache(&catalog, &no_system_schemas());
        let hr = cache.schema("HR").unwrap();

        let routine = hr.routine("RAISE_SALARY").unwrap();
        assert_eq!(routine.specific_names.len(), 2);
        assert!(routine.text.as_deref().is_some_and(|t| t.contains("* 1.1")));
    }

    #[test]
    fn test_unknown_type_codes_are_skipped() {
        let catalog = sales_catalog();
        catalog.add_table("SALES", "ODD", 'X').unwrap();

        let cache = load_cache(&catalog, &no_system_schemas());

        assert!(cache.schema("SALES").unwrap().relation("ODD").is_none());
    }

    #[test]
    fn test_schema_names_are_trimmed() {
        let catalog = SqliteCatalog::open_in_memory(DATA_SOURCE).unwrap();
        catalog.add_table("APP     ", "ACCOUNTS", 'T').unwrap();

        let cache = load_cache(&catalog, &SchemaFilter::accept_all());

        let app = cache.schema("APP").unwrap();
        assert!(app.table("ACCOUNTS").is_some());
    }

    #[test]
    fn test_missing_catalog_view_fails() {
        let catalog = sales_catalog();
        catalog.execute_batch("DROP TABLE SYSCAT.ROUTINES").unwrap();
        let session = catalog.open_session("Load test cache").unwrap();

        let result = CatalogLoader::new().load(&session, &SchemaFilter::accept_all());

        assert!(matches!(result, Err(LoadError::Session(_))));
    }

    #[test]
    fn test_file_backed_catalog_persists() {
        let dir = tempfile::tempdir().unwrap();
        {
            let catalog = SqliteCatalog::open(dir.path(), DATA_SOURCE).unwrap();
            seed(&catalog);
        }

        let reopened = SqliteCatalog::open(dir.path(), DATA_SOURCE).unwrap();
        let cache = load_cache(&reopened, &no_system_schemas());

        assert_eq!(cache.schema_names(), vec!["HR", "SALES"]);
        assert!(cache.schema("SALES").unwrap().view("V_TOP_CUSTOMERS").is_some());
    }
}
