//! Configuration for catalog-search.
//!
//! Handles named catalog connections, search defaults, schema filters and
//! the snapshot store location.

mod settings;

pub use settings::{
    expand_env_vars, ConnectionSettings, FilterSettings, SearchSettings, Settings, SettingsError,
    SnapshotSettings, CONFIG_ENV_VAR,
};
