//! Shared catalog fixture for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use catalog_search::catalog::{CatalogLoader, InMemorySchemaCache, SchemaFilter};
use catalog_search::search::StructureAssistant;
use catalog_search::session::{SessionSource, SqliteCatalog};

pub const DATA_SOURCE: &str = "DB2TEST";

/// Populate `catalog` with the SALES/HR/SYSTOOLS fixture.
///
/// SALES: CUSTOMERS (T), ORDERS (T), CUSTOMER_LOG (alias), SALES_SUMMARY
/// (MQT), V_TOP_CUSTOMERS (view).
/// HR: EMPLOYEE (T) and the RAISE_SALARY routine with two overloads.
/// SYSTOOLS: EMPLOYEE_AUDIT (T).
pub fn seed(catalog: &SqliteCatalog) {
    catalog.add_table("SALES", "CUSTOMERS", 'T').unwrap();
    catalog.add_table("SALES", "ORDERS", 'T').unwrap();
    catalog.add_table("SALES", "CUSTOMER_LOG", 'A').unwrap();
    catalog.add_table("SALES", "SALES_SUMMARY", 'S').unwrap();
    catalog
        .add_view(
            "SALES",
            "V_TOP_CUSTOMERS",
            "CREATE VIEW SALES.V_TOP_CUSTOMERS AS SELECT ID, NAME FROM SALES.CUSTOMERS WHERE RANK < 10",
        )
        .unwrap();

    catalog.add_column("SALES", "CUSTOMERS", "ID", 0, "INTEGER", false).unwrap();
    catalog.add_column("SALES", "CUSTOMERS", "NAME", 1, "VARCHAR", true).unwrap();
    catalog.add_column("SALES", "CUSTOMERS", "RANK", 2, "SMALLINT", true).unwrap();
    catalog.add_column("SALES", "ORDERS", "ID", 0, "INTEGER", false).unwrap();
    catalog.add_column("SALES", "ORDERS", "CUSTOMER_ID", 1, "INTEGER", false).unwrap();
    catalog.add_column("SALES", "SALES_SUMMARY", "TOTAL", 0, "DECIMAL", true).unwrap();
    catalog.add_column("SALES", "V_TOP_CUSTOMERS", "ID", 0, "INTEGER", false).unwrap();
    catalog.add_column("SALES", "V_TOP_CUSTOMERS", "NAME", 1, "VARCHAR", true).unwrap();

    catalog.add_table("HR", "EMPLOYEE", 'T').unwrap();
    catalog.add_column("HR", "EMPLOYEE", "EMP_ID", 0, "INTEGER", false).unwrap();
    catalog.add_column("HR", "EMPLOYEE", "SALARY", 1, "DECIMAL", true).unwrap();
    catalog
        .add_routine(
            "HR",
            "RAISE_SALARY",
            "SQL240101",
            Some("UPDATE HR.EMPLOYEE SET SALARY = SALARY * 1.1"),
        )
        .unwrap();
    catalog
        .add_routine(
            "HR",
            "RAISE_SALARY",
            "SQL240102",
            Some("UPDATE HR.EMPLOYEE SET SALARY = SALARY + P_AMOUNT"),
        )
        .unwrap();

    catalog.add_table("SYSTOOLS", "EMPLOYEE_AUDIT", 'T').unwrap();
}

/// An in-memory catalog with the fixture and `SALES` as default schema.
pub fn sales_catalog() -> SqliteCatalog {
    let catalog = SqliteCatalog::open_in_memory(DATA_SOURCE)
        .unwrap()
        .with_default_schema("SALES");
    seed(&catalog);
    catalog
}

/// Filter used by most tests: system schemas are left out of the cache.
pub fn no_system_schemas() -> SchemaFilter {
    SchemaFilter::new(&[] as &[&str], &["SYS%"]).unwrap()
}

pub fn load_cache(catalog: &SqliteCatalog, filter: &SchemaFilter) -> InMemorySchemaCache {
    let session = catalog.open_session("Load test cache").unwrap();
    CatalogLoader::new().load(&session, filter).unwrap()
}

pub fn assistant(catalog: &SqliteCatalog, filter: &SchemaFilter) -> StructureAssistant {
    StructureAssistant::new(Arc::new(load_cache(catalog, filter))).unwrap()
}
