//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Administrative CLI for quoting and catalog maintenance."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use solcot_common::{init_tracing, AppConfig, CatalogConfig};
use solcot_config::CatalogStore;
use tracing::debug;

mod batch;
mod catalog;
mod quote;

const DEFAULT_CONFIG_CANDIDATES: [&str; 2] = ["configs/solcot.toml", "configs/solcot.example.toml"];

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "SolCot solar quoting and catalog utility",
    long_about = None
)]
struct Cli {
    /// Application config file (TOML). `SOLCOT_CONFIG` takes precedence.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Catalog file overriding `catalog.path` from the config.
    #[arg(long, global = true, value_name = "FILE")]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Compute a single quote")]
    Quote(quote::QuoteArgs),
    #[command(about = "Quote every input of a JSON Lines file")]
    Batch(batch::BatchArgs),
    #[command(subcommand, about = "Inspect and check the product catalog")]
    Catalog(catalog::CatalogCommand),
}

/// Settings shared by every subcommand.
pub struct Context {
    pub config: AppConfig,
    catalog_override: Option<PathBuf>,
}

impl Context {
    pub fn catalog_config(&self) -> CatalogConfig {
        let mut catalog = self.config.catalog.clone();
        if let Some(path) = &self.catalog_override {
            catalog.path = path.clone();
        }
        catalog
    }

    /// Build a store and load the configured catalog into it.
    pub fn catalog_store(&self) -> Result<CatalogStore> {
        let store = CatalogStore::from_config(&self.catalog_config());
        store.refresh()?;
        Ok(store)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match load_config(cli.config.as_deref())? {
        Some(config) => {
            init_tracing("solcotctl", &config.logging)?;
            config
        }
        None => {
            solcot_logging::init();
            debug!("no configuration file found; using defaults");
            AppConfig::default()
        }
    };
    let ctx = Context {
        config,
        catalog_override: cli.catalog,
    };

    match cli.command {
        Commands::Quote(args) => quote::run(&ctx, args),
        Commands::Batch(args) => batch::run(&ctx, args),
        Commands::Catalog(cmd) => catalog::run(&ctx, cmd),
    }
}

/// An explicit `--config` or `SOLCOT_CONFIG` must load; the default locations are optional.
fn load_config(explicit: Option<&Path>) -> Result<Option<AppConfig>> {
    let env_set = std::env::var(AppConfig::ENV_CONFIG_PATH)
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false);
    if let Some(path) = explicit {
        return Ok(Some(AppConfig::load(&[path])?));
    }
    let candidates: Vec<PathBuf> = DEFAULT_CONFIG_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .collect();
    if env_set || candidates.iter().any(|path| path.exists()) {
        return Ok(Some(AppConfig::load(&candidates)?));
    }
    Ok(None)
}
