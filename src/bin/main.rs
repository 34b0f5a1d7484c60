//! catalog-search CLI - find catalog objects by name mask
//!
//! Usage:
//!   catalog-search search <mask> [--type <type>]... [--schema <schema>]
//!   catalog-search resolve <name> --type <type> [--schema <schema>] [--table <t> | --view <v>]
//!   catalog-search types
//!   catalog-search snapshot <save|clear|stats>
//!
//! Examples:
//!   catalog-search search 'CUST%' --type table --schema SALES
//!   catalog-search search emp --type column --global --output json
//!   catalog-search search 'SELECT%' --type view --definitions --explain
//!   catalog-search resolve ID --type column --schema SALES --table CUSTOMERS

use catalog_search::catalog::{
    CatalogLoader, InMemorySchemaCache, LoadError, ObjectCategory, RequestedType,
};
use catalog_search::config::{ConnectionSettings, FilterSettings, Settings, SettingsError};
use catalog_search::search::{
    ContainerRef, ObjectReference, SearchError, SearchParams, StructureAssistant,
};
use catalog_search::session::{Dialect, SessionError, SessionSource, SqliteCatalog};
use catalog_search::snapshot::{fingerprint, SnapshotError, SnapshotStore};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV_VAR: &str = "CATALOG_SEARCH_LOG";

#[derive(Parser)]
#[command(name = "catalog-search")]
#[command(about = "catalog-search - Find objects in a DB2 system catalog by name mask")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the usual search locations)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Named connection from the config file
    #[arg(short, long, global = true)]
    connection: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search catalog objects by name mask
    Search {
        /// Name mask with LIKE wildcards (% and _)
        mask: String,

        /// Object types to search (all types if not specified)
        #[arg(short = 't', long = "type")]
        types: Vec<RequestedType>,

        /// Schema to search in (defaults to the connection's default schema)
        #[arg(short, long)]
        schema: Option<String>,

        /// Search every schema
        #[arg(long)]
        global: bool,

        /// Match the mask case-sensitively
        #[arg(long)]
        case_sensitive: bool,

        /// Also match view and routine text
        #[arg(long)]
        definitions: bool,

        /// Maximum number of results
        #[arg(short, long)]
        max: Option<usize>,

        /// Reload the catalog instead of using the snapshot
        #[arg(long)]
        refresh: bool,

        /// Print the catalog queries instead of running them
        #[arg(long)]
        explain: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Resolve an object reference to its cached definition
    Resolve {
        /// Object name
        name: String,

        /// Object type
        #[arg(short = 't', long = "type")]
        object_type: RequestedType,

        /// Schema holding the object (or its owner)
        #[arg(short, long)]
        schema: Option<String>,

        /// Owning table, for columns
        #[arg(long, conflicts_with = "view")]
        table: Option<String>,

        /// Owning view, for columns
        #[arg(long)]
        view: Option<String>,

        /// Reload the catalog instead of using the snapshot
        #[arg(long)]
        refresh: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// List object types and their capabilities
    Types,

    /// Manage catalog snapshots
    Snapshot {
        #[command(subcommand)]
        action: SnapshotAction,
    },
}

#[derive(Subcommand)]
enum SnapshotAction {
    /// Load the catalog and store a fresh snapshot
    Save,
    /// Delete snapshots
    Clear {
        /// Delete snapshots of every connection
        #[arg(long)]
        all: bool,
    },
    /// Show store statistics
    Stats,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One line per object
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Failed to open catalog: {0}")]
    Session(#[from] SessionError),

    #[error("Failed to load catalog: {0}")]
    Load(#[from] LoadError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Usage(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::load()?,
    };

    match cli.command {
        Commands::Search {
            mask,
            types,
            schema,
            global,
            case_sensitive,
            definitions,
            max,
            refresh,
            explain,
            output,
        } => {
            let types: Vec<RequestedType> = if types.is_empty() {
                ObjectCategory::ALL.iter().copied().map(RequestedType::from).collect()
            } else {
                types
            };
            let mut params = SearchParams::new(mask)
                .object_types(types)
                .case_sensitive(case_sensitive || settings.search.case_sensitive)
                .global(global)
                .search_in_definitions(definitions)
                .max_results(max.unwrap_or(settings.search.max_results));
            if let Some(schema) = schema {
                params = params.scope(schema);
            }

            let target = Target::open(&settings, cli.connection.as_deref())?;
            if explain {
                return cmd_explain(&settings, &target, &params);
            }
            let assistant = target.assistant(&settings, refresh)?;
            let references = assistant.find_objects_by_mask(&target.catalog, &params)?;
            print_references(&references, output)
        }
        Commands::Resolve {
            name,
            object_type,
            schema,
            table,
            view,
            refresh,
            output,
        } => {
            let category = object_type.category().ok_or_else(|| {
                CliError::Usage(format!(
                    "{:?} objects are not kept in the catalog cache",
                    object_type
                ))
            })?;
            let target = Target::open(&settings, cli.connection.as_deref())?;
            let schema = schema
                .or_else(|| target.connection.default_schema.clone())
                .ok_or_else(|| {
                    CliError::Usage("--schema is required without a default schema".to_string())
                })?;
            let container = match (table, view) {
                (Some(table), _) => ContainerRef::table(schema, table),
                (None, Some(view)) => ContainerRef::view(schema, view),
                (None, None) => ContainerRef::schema(schema),
            };

            let assistant = target.assistant(&settings, refresh)?;
            let object = assistant.resolve(&ObjectReference::new(name, container, category))?;
            match output {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&object)?),
                OutputFormat::Text => println!("{}", serde_json::to_string(&object)?),
            }
            Ok(())
        }
        Commands::Types => cmd_types(),
        Commands::Snapshot { action } => cmd_snapshot(&settings, cli.connection.as_deref(), action),
    }
}

/// The catalog a command runs against.
struct Target<'a> {
    name: String,
    connection: &'a ConnectionSettings,
    catalog: SqliteCatalog,
}

/// What a snapshot was built from. Changing either invalidates it.
#[derive(Serialize)]
struct SnapshotIdentity<'a> {
    connection: &'a ConnectionSettings,
    filters: &'a FilterSettings,
}

impl<'a> Target<'a> {
    fn open(settings: &'a Settings, name: Option<&str>) -> Result<Self, CliError> {
        let (name, connection) = settings.connection(name)?;
        let mut catalog = SqliteCatalog::open(
            connection.resolved_path()?,
            connection.data_source_name(&name),
        )?;
        if let Some(schema) = &connection.default_schema {
            catalog = catalog.with_default_schema(schema.clone());
        }
        Ok(Self {
            name,
            connection,
            catalog,
        })
    }

    fn snapshot_key(&self, settings: &Settings) -> Result<String, CliError> {
        Ok(fingerprint(&SnapshotIdentity {
            connection: self.connection,
            filters: &settings.filters,
        })?)
    }

    fn load(&self, settings: &Settings) -> Result<InMemorySchemaCache, CliError> {
        let session = self.catalog.open_session("Load catalog")?;
        let cache = CatalogLoader::new()
            .with_fetch_size(settings.search.fetch_size)
            .load(&session, &settings.filters.schema_filter()?)?;
        Ok(cache)
    }

    /// The schema cache, from the snapshot store when possible.
    fn cache(&self, settings: &Settings, refresh: bool) -> Result<InMemorySchemaCache, CliError> {
        if !settings.snapshot.enabled {
            return self.load(settings);
        }

        let store = open_store(settings)?;
        let key = self.snapshot_key(settings)?;
        if !refresh {
            if let Some(cache) = store.load(&key)? {
                tracing::debug!(connection = %self.name, "using catalog snapshot");
                return Ok(cache);
            }
        }

        let cache = self.load(settings)?;
        store.save(&key, &cache)?;
        Ok(cache)
    }

    fn assistant(
        &self,
        settings: &Settings,
        refresh: bool,
    ) -> Result<StructureAssistant, CliError> {
        let cache = self.cache(settings, refresh)?;
        Ok(StructureAssistant::new(Arc::new(cache))?.with_fetch_size(settings.search.fetch_size))
    }
}

fn open_store(settings: &Settings) -> Result<SnapshotStore, CliError> {
    let store = match settings.snapshot.resolved_path()? {
        Some(path) => SnapshotStore::open(path)?,
        None => SnapshotStore::open_default()?,
    };
    Ok(store)
}

fn print_references(references: &[ObjectReference], output: OutputFormat) -> Result<(), CliError> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(references)?),
        OutputFormat::Text => {
            if references.is_empty() {
                println!("No objects found.");
            }
            for reference in references {
                println!("{}", reference);
            }
        }
    }
    Ok(())
}

fn cmd_explain(
    settings: &Settings,
    target: &Target<'_>,
    params: &SearchParams,
) -> Result<(), CliError> {
    // Planning only needs the type codes, not the cached catalog.
    let assistant = StructureAssistant::new(Arc::new(InMemorySchemaCache::new()))?
        .with_fetch_size(settings.search.fetch_size);
    let planned = assistant.plan(
        Dialect::Db2,
        target.connection.default_schema.as_deref(),
        params,
    )?;

    if planned.is_empty() {
        println!("-- No supported object types requested");
    }
    for step in planned {
        println!("-- Group: {}", step.group);
        if !step.query.params.is_empty() {
            println!("-- Parameters: {}", step.query.params.join(", "));
        }
        println!("{}", step.query.sql);
        println!();
    }
    Ok(())
}

fn cmd_types() -> Result<(), CliError> {
    let assistant = StructureAssistant::new(Arc::new(InMemorySchemaCache::new()))?;
    let codes = catalog_search::catalog::type_codes().map_err(SearchError::from)?;

    println!(
        "{:<10} {:<12} {:<10} {:<13} {}",
        "TYPE", "CODES", "HYPERLINK", "AUTOCOMPLETE", "DEFINITIONS"
    );
    for category in assistant.search_object_types() {
        let code_list: String = codes.codes_for(*category).iter().collect();
        println!(
            "{:<10} {:<12} {:<10} {:<13} {}",
            category.as_str(),
            if code_list.is_empty() { "-".to_string() } else { code_list },
            yes_no(assistant.hyperlink_object_types().contains(category)),
            yes_no(assistant.autocomplete_object_types().contains(category)),
            yes_no(assistant.supports_search_in_definitions_for(*category)),
        );
    }
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn cmd_snapshot(
    settings: &Settings,
    connection: Option<&str>,
    action: SnapshotAction,
) -> Result<(), CliError> {
    let store = open_store(settings)?;
    match action {
        SnapshotAction::Save => {
            let target = Target::open(settings, connection)?;
            let cache = target.load(settings)?;
            store.save(&target.snapshot_key(settings)?, &cache)?;
            println!(
                "Saved snapshot for '{}': {} schemas, {} objects",
                target.name,
                cache.len(),
                cache.object_count()
            );
        }
        SnapshotAction::Clear { all: true } => {
            store.clear_all()?;
            println!("Cleared all snapshots");
        }
        SnapshotAction::Clear { all: false } => {
            let target = Target::open(settings, connection)?;
            let removed = store.delete(&target.snapshot_key(settings)?)?;
            println!("Cleared {} entries for '{}'", removed, target.name);
        }
        SnapshotAction::Stats => {
            let stats = store.stats()?;
            println!("Snapshots: {}", stats.snapshot_count);
            println!("Total size: {} bytes", stats.total_size_bytes);
        }
    }
    Ok(())
}
