//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared configuration and tracing setup for SolCot tooling."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use solcot_engine::{Department, PhaseType, Sector};
use tracing::debug;

use crate::logging::LogFormat;

fn default_catalog_path() -> PathBuf {
    PathBuf::from("configs/catalog.example.toml")
}

fn default_logging_directory() -> PathBuf {
    PathBuf::from("target/logs")
}

fn default_log_format() -> LogFormat {
    LogFormat::StructuredJson
}

fn default_reports_directory() -> PathBuf {
    PathBuf::from("target/quotes")
}

fn default_sector() -> Sector {
    Sector::Residential
}

fn default_phase() -> PhaseType {
    PhaseType::P1
}

/// Configuration shared by the SolCot tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
    #[serde(default)]
    pub defaults: QuoteDefaults,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: PathBuf,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "SOLCOT_CONFIG";

    /// Load configuration from disk, respecting the `SOLCOT_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        Ok(Self::load_with_source(candidates)?.config)
    }

    /// Load configuration from disk together with the effective source path.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: path,
                });
            }
        }

        Err(anyhow!(
            "no configuration files found. inspected: {}",
            candidates
                .iter()
                .map(|p| p.as_ref().display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        contents
            .parse()
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;
        if self.reports.directory.as_os_str().is_empty() {
            return Err(anyhow!("reports.directory must not be empty"));
        }
        Ok(())
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
    /// Expected SHA-256 of the catalog content; loading fails on mismatch.
    #[serde(default)]
    pub pinned_sha256: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            pinned_sha256: None,
        }
    }
}

impl CatalogConfig {
    pub fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(anyhow!("catalog.path must not be empty"));
        }
        if let Some(pin) = &self.pinned_sha256 {
            let bytes = hex::decode(pin)
                .with_context(|| format!("catalog.pinned_sha256 '{pin}' is not hex"))?;
            if bytes.len() != 32 {
                return Err(anyhow!(
                    "catalog.pinned_sha256 must be 64 hex characters, got {}",
                    pin.len()
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_log_format")]
    pub format: LogFormat,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: default_logging_directory(),
            format: default_log_format(),
            file_prefix: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_reports_directory")]
    pub directory: PathBuf,
    /// Write reports for every quote even without `--export`.
    #[serde(default)]
    pub always_export: bool,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            directory: default_reports_directory(),
            always_export: false,
        }
    }
}

/// Values used by the CLI when a quote flag is omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteDefaults {
    #[serde(default)]
    pub department: Option<Department>,
    #[serde(default = "default_sector")]
    pub sector: Sector,
    #[serde(default = "default_phase")]
    pub phase: PhaseType,
    #[serde(default)]
    pub include_battery: bool,
}

impl Default for QuoteDefaults {
    fn default() -> Self {
        Self {
            department: None,
            sector: default_sector(),
            phase: default_phase(),
            include_battery: false,
        }
    }
}
