//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared configuration and tracing setup for SolCot tooling."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Shared primitives for the SolCot workspace: application configuration and
//! tracing initialisation.

pub mod config;
pub mod logging;

pub use config::{
    AppConfig, CatalogConfig, LoadedAppConfig, LoggingConfig, QuoteDefaults, ReportsConfig,
};
pub use logging::{init_tracing, LogFormat};
