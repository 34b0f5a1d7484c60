//! Catalog snapshots: save, reload and search from a stored cache.

#[path = "../support/mod.rs"]
mod support;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::support::{load_cache, no_system_schemas, sales_catalog};
    use catalog_search::catalog::{ObjectCategory, SchemaCache};
    use catalog_search::config::Settings;
    use catalog_search::search::{SearchParams, StructureAssistant};
    use catalog_search::snapshot::{fingerprint, SnapshotStore};

    const CONFIG: &str = r#"
[connections.warehouse]
path = "./catalogs/warehouse"
default_schema = "SALES"

[connections.dev]
path = "./catalogs/dev"

[filters]
exclude_schemas = ["SYS%"]
"#;

    #[test]
    fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("snapshots.db");
        let catalog = sales_catalog();
        let cache = load_cache(&catalog, &no_system_schemas());

        SnapshotStore::open(&path).unwrap().save("warehouse", &cache).unwrap();

        let store = SnapshotStore::open(&path).unwrap();
        let restored = store.load("warehouse").unwrap().unwrap();
        assert_eq!(restored.schema_names(), cache.schema_names());
        assert_eq!(restored.object_count(), cache.object_count());
        assert_eq!(
            restored.schema("SALES").unwrap(),
            cache.schema("SALES").unwrap()
        );
    }

    #[test]
    fn test_search_runs_against_restored_cache() {
        let catalog = sales_catalog();
        let store = SnapshotStore::open_in_memory().unwrap();
        store
            .save("warehouse", &load_cache(&catalog, &no_system_schemas()))
            .unwrap();

        let restored = store.load("warehouse").unwrap().unwrap();
        let assistant = StructureAssistant::new(Arc::new(restored)).unwrap();
        let params = SearchParams::new("ID").object_type(ObjectCategory::Column);
        let results = assistant.find_objects_by_mask(&catalog, &params).unwrap();

        assert_eq!(results.len(), 3);
        for reference in &results {
            assert!(assistant.resolve(reference).is_ok());
        }
    }

    #[test]
    fn test_connection_fingerprints_are_distinct() {
        let settings = Settings::from_toml(CONFIG).unwrap();
        let warehouse = fingerprint(settings.get_connection("warehouse").unwrap()).unwrap();
        let dev = fingerprint(settings.get_connection("dev").unwrap()).unwrap();

        assert_ne!(warehouse, dev);
        assert_eq!(
            warehouse,
            fingerprint(settings.get_connection("warehouse").unwrap()).unwrap()
        );
    }

    #[test]
    fn test_snapshots_are_kept_per_connection() {
        let settings = Settings::from_toml(CONFIG).unwrap();
        let catalog = sales_catalog();
        let filter = settings.filters.schema_filter().unwrap();
        let cache = load_cache(&catalog, &filter);
        assert!(cache.schema("SYSTOOLS").is_none());

        let store = SnapshotStore::open_in_memory().unwrap();
        let warehouse = fingerprint(settings.get_connection("warehouse").unwrap()).unwrap();
        let dev = fingerprint(settings.get_connection("dev").unwrap()).unwrap();
        store.save(&warehouse, &cache).unwrap();

        assert!(store.load(&dev).unwrap().is_none());
        let stats = store.stats().unwrap();
        assert_eq!(stats.snapshot_count, 1);
        assert!(stats.total_size_bytes > 0);

        store.clear_all().unwrap();
        assert!(store.load(&warehouse).unwrap().is_none());
        assert_eq!(store.stats().unwrap().snapshot_count, 0);
    }
}
