//! Name-mask search against an SQLite-hosted catalog.

#[path = "../support/mod.rs"]
mod support;

#[cfg(test)]
mod tests {
    use super::support::{assistant, no_system_schemas, sales_catalog, DATA_SOURCE};
    use catalog_search::catalog::{ObjectCategory, RequestedType, SchemaFilter};
    use catalog_search::search::{ContainerRef, ObjectReference, SearchError, SearchParams};

    fn names(results: &[ObjectReference]) -> Vec<String> {
        results.iter().map(|r| r.qualified_name()).collect()
    }

    #[test]
    fn test_cust_mask_yields_only_the_table() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let params = SearchParams::new("CUST%")
            .object_type(ObjectCategory::Table)
            .scope("SALES")
            .max_results(10);

        let results = assistant.find_objects_by_mask(&catalog, &params).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name(), "CUSTOMERS");
        assert_eq!(results[0].category(), ObjectCategory::Table);
        assert_eq!(results[0].container(), &ContainerRef::schema("SALES"));
    }

    #[test]
    fn test_case_insensitive_mask_is_folded() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let params = SearchParams::new("emp")
            .object_type(ObjectCategory::Table)
            .global(true);

        let results = assistant.find_objects_by_mask(&catalog, &params).unwrap();

        assert_eq!(names(&results), vec!["HR.EMPLOYEE"]);
    }

    #[test]
    fn test_case_sensitive_mask_is_kept() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let lower = SearchParams::new("cust%")
            .object_type(ObjectCategory::Table)
            .case_sensitive(true);
        let upper = SearchParams::new("CUST%")
            .object_type(ObjectCategory::Table)
            .case_sensitive(true);

        assert!(assistant
            .find_objects_by_mask(&catalog, &lower)
            .unwrap()
            .is_empty());
        assert_eq!(
            names(&assistant.find_objects_by_mask(&catalog, &upper).unwrap()),
            vec!["SALES.CUSTOMERS"]
        );
    }

    #[test]
    fn test_rows_from_schemas_missing_in_cache_are_skipped() {
        let catalog = sales_catalog();
        let params = SearchParams::new("EMP%")
            .object_type(ObjectCategory::Table)
            .global(true);

        let filtered = assistant(&catalog, &no_system_schemas());
        assert_eq!(
            names(&filtered.find_objects_by_mask(&catalog, &params).unwrap()),
            vec!["HR.EMPLOYEE"]
        );

        let unfiltered = assistant(&catalog, &SchemaFilter::accept_all());
        assert_eq!(
            names(&unfiltered.find_objects_by_mask(&catalog, &params).unwrap()),
            vec!["HR.EMPLOYEE", "SYSTOOLS.EMPLOYEE_AUDIT"]
        );
    }

    #[test]
    fn test_cap_stops_within_first_group() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let params = SearchParams::new("%")
            .object_types(ObjectCategory::ALL)
            .global(true)
            .max_results(2);

        let results = assistant.find_objects_by_mask(&catalog, &params).unwrap();

        assert_eq!(names(&results), vec!["HR.EMPLOYEE", "SALES.CUSTOMERS"]);
        assert!(results.iter().all(|r| r.category().is_table_like()));
    }

    #[test]
    fn test_cap_is_shared_across_groups() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let params = SearchParams::new("%")
            .object_types([ObjectCategory::Table, ObjectCategory::Column])
            .scope("SALES")
            .max_results(4);

        let results = assistant.find_objects_by_mask(&catalog, &params).unwrap();

        assert_eq!(
            names(&results),
            vec![
                "SALES.CUSTOMERS",
                "SALES.ORDERS",
                "SALES.CUSTOMERS.ID",
                "SALES.CUSTOMERS.NAME",
            ]
        );
        assert_eq!(results[2].category(), ObjectCategory::Column);
    }

    #[test]
    fn test_column_search_tags_owner_kind() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let params = SearchParams::new("ID")
            .object_type(ObjectCategory::Column)
            .scope("SALES");

        let results = assistant.find_objects_by_mask(&catalog, &params).unwrap();

        assert!(results.iter().all(|r| r.category() == ObjectCategory::Column));
        let containers: Vec<_> = results.iter().map(|r| r.container().clone()).collect();
        assert_eq!(
            containers,
            vec![
                ContainerRef::table("SALES", "CUSTOMERS"),
                ContainerRef::table("SALES", "ORDERS"),
                ContainerRef::view("SALES", "V_TOP_CUSTOMERS"),
            ]
        );
    }

    #[test]
    fn test_mqt_columns_belong_to_a_table() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let params = SearchParams::new("TOTAL").object_type(ObjectCategory::Column);

        let results = assistant.find_objects_by_mask(&catalog, &params).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].container(),
            &ContainerRef::table("SALES", "SALES_SUMMARY")
        );
    }

    #[test]
    fn test_type_codes_select_categories() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let params = SearchParams::new("%").object_types([
            ObjectCategory::Alias,
            ObjectCategory::MaterializedView,
            ObjectCategory::View,
        ]);

        let results = assistant.find_objects_by_mask(&catalog, &params).unwrap();

        let tagged: Vec<_> = results
            .iter()
            .map(|r| (r.name().to_string(), r.category()))
            .collect();
        assert_eq!(
            tagged,
            vec![
                ("CUSTOMER_LOG".to_string(), ObjectCategory::Alias),
                ("SALES_SUMMARY".to_string(), ObjectCategory::MaterializedView),
                ("V_TOP_CUSTOMERS".to_string(), ObjectCategory::View),
            ]
        );
    }

    #[test]
    fn test_view_found_by_definition_text() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let by_name = SearchParams::new("%RANK%")
            .object_type(ObjectCategory::View)
            .scope("SALES");
        let by_text = by_name.clone().search_in_definitions(true);

        assert!(assistant
            .find_objects_by_mask(&catalog, &by_name)
            .unwrap()
            .is_empty());

        let results = assistant.find_objects_by_mask(&catalog, &by_text).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name(), "V_TOP_CUSTOMERS");
        assert_eq!(results[0].category(), ObjectCategory::View);
    }

    #[test]
    fn test_routine_overloads_collapse() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let params = SearchParams::new("raise")
            .object_type(ObjectCategory::Routine)
            .global(true);

        let results = assistant.find_objects_by_mask(&catalog, &params).unwrap();

        assert_eq!(names(&results), vec!["HR.RAISE_SALARY"]);
        assert_eq!(results[0].category(), ObjectCategory::Routine);
    }

    #[test]
    fn test_routine_found_by_definition_text() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let params = SearchParams::new("%P_AMOUNT%")
            .object_type(RequestedType::Procedure)
            .scope("HR")
            .search_in_definitions(true);

        let results = assistant.find_objects_by_mask(&catalog, &params).unwrap();

        assert_eq!(names(&results), vec!["HR.RAISE_SALARY"]);
    }

    #[test]
    fn test_default_schema_applies_unless_global() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let scoped = SearchParams::new("%").object_type(ObjectCategory::Table);
        let global = scoped.clone().global(true);

        assert_eq!(
            names(&assistant.find_objects_by_mask(&catalog, &scoped).unwrap()),
            vec!["SALES.CUSTOMERS", "SALES.ORDERS"]
        );
        assert_eq!(
            names(&assistant.find_objects_by_mask(&catalog, &global).unwrap()),
            vec!["HR.EMPLOYEE", "SALES.CUSTOMERS", "SALES.ORDERS"]
        );
    }

    #[test]
    fn test_explicit_scope_wins_over_default() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let params = SearchParams::new("%")
            .object_type(ObjectCategory::Table)
            .scope("HR");

        assert_eq!(
            names(&assistant.find_objects_by_mask(&catalog, &params).unwrap()),
            vec!["HR.EMPLOYEE"]
        );
    }

    #[test]
    fn test_unsupported_types_only_yield_nothing() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let params = SearchParams::new("%")
            .object_types([RequestedType::Index, RequestedType::Trigger]);

        let results = assistant.find_objects_by_mask(&catalog, &params).unwrap();

        assert!(results.is_empty());
    }

    #[test]
    fn test_cancelled_search_returns_empty() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let params = SearchParams::new("%").object_types(ObjectCategory::ALL);
        let token = catalog.cancel_token();

        token.cancel();
        assert!(assistant
            .find_objects_by_mask(&catalog, &params)
            .unwrap()
            .is_empty());

        token.reset();
        assert!(!assistant
            .find_objects_by_mask(&catalog, &params)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_query_failure_is_data_access_error() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        catalog.execute_batch("DROP TABLE SYSCAT.COLUMNS").unwrap();
        let params = SearchParams::new("ID").object_type(ObjectCategory::Column);

        let err = assistant
            .find_objects_by_mask(&catalog, &params)
            .unwrap_err();

        match &err {
            SearchError::DataAccess { data_source, .. } => assert_eq!(data_source, DATA_SOURCE),
            other => panic!("expected data access error, got {other:?}"),
        }
        assert!(err.to_string().contains(DATA_SOURCE));
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());

        let empty_mask = SearchParams::new("").object_type(ObjectCategory::Table);
        assert!(matches!(
            assistant.find_objects_by_mask(&catalog, &empty_mask),
            Err(SearchError::InvalidParameters(_))
        ));

        let no_types = SearchParams::new("%");
        assert!(matches!(
            assistant.find_objects_by_mask(&catalog, &no_types),
            Err(SearchError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_concurrent_searches_share_one_assistant() {
        let catalog = sales_catalog();
        let assistant = assistant(&catalog, &no_system_schemas());
        let tables = SearchParams::new("%").object_type(ObjectCategory::Table);
        let columns = SearchParams::new("ID").object_type(ObjectCategory::Column);

        let (table_hits, column_hits) = std::thread::scope(|s| {
            let a = s.spawn(|| assistant.find_objects_by_mask(&catalog, &tables).unwrap());
            let b = s.spawn(|| assistant.find_objects_by_mask(&catalog, &columns).unwrap());
            (a.join().unwrap(), b.join().unwrap())
        });

        assert_eq!(table_hits.len(), 2);
        assert_eq!(column_hits.len(), 3);
    }
}
