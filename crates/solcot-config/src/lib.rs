//! ---
//! ems_section: "04-configuration-orchestration"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Catalog loading, hashing and snapshot ownership."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
//! Owner of the active product and pricing catalog.
//!
//! Quotes never read catalog files directly; they ask a [`CatalogStore`] for the
//! current immutable [`CatalogSnapshot`]. A refresh replaces the snapshot as a
//! whole so in-flight quotes keep the one they started with.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use solcot_common::config::CatalogConfig;
use solcot_engine::{
    io::load_catalog_from_file, CalcEngineError, CatalogSnapshot, QuoteInput, QuoteSummary,
};
use tracing::{info, warn};

/// Describes the snapshot currently held by a [`CatalogStore`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogMetadata {
    /// File the snapshot was read from, or `None` for in-memory snapshots.
    pub source: Option<PathBuf>,
    /// SHA-256 of the canonical JSON form of the snapshot.
    pub sha256: String,
    pub version: Option<String>,
    pub loaded_at: DateTime<Utc>,
    pub panels: usize,
    pub inverters: usize,
    pub batteries: usize,
}

#[derive(Debug)]
struct LoadedCatalog {
    snapshot: Arc<CatalogSnapshot>,
    metadata: CatalogMetadata,
}

#[derive(Debug)]
pub struct CatalogStore {
    path: Option<PathBuf>,
    pinned_sha256: Option<String>,
    current: RwLock<Option<LoadedCatalog>>,
}

impl CatalogStore {
    /// Create an empty store bound to `path`. Nothing is read until [`refresh`](Self::refresh).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            pinned_sha256: None,
            current: RwLock::new(None),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(&config.path).with_pin(config.pinned_sha256.clone())
    }

    /// Require the catalog hash to equal `pin` on every load.
    pub fn with_pin(mut self, pin: Option<String>) -> Self {
        self.pinned_sha256 = pin.map(|p| p.to_ascii_lowercase());
        self
    }

    /// Create a store and load it immediately.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(path);
        store.refresh()?;
        Ok(store)
    }

    /// Wrap an already-built snapshot. [`refresh`](Self::refresh) is unavailable.
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self> {
        let store = Self {
            path: None,
            pinned_sha256: None,
            current: RwLock::new(None),
        };
        store.install(snapshot, None)?;
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Re-read the catalog file and swap it in.
    ///
    /// The file must parse, validate and match the pin, otherwise the previous
    /// snapshot stays active and the error is returned.
    pub fn refresh(&self) -> Result<CatalogMetadata> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| anyhow!("catalog store has no backing file to refresh from"))?;
        let result = load_catalog_from_file(&path)
            .with_context(|| format!("failed to load catalog {}", path.display()))
            .and_then(|snapshot| self.install(snapshot, Some(path.clone())));

        if let Err(err) = &result {
            if self.is_loaded() {
                warn!(
                    catalog = %path.display(),
                    error = %format!("{err:#}"),
                    "catalog refresh failed; keeping previous snapshot"
                );
            }
        }
        result
    }

    fn install(&self, snapshot: CatalogSnapshot, source: Option<PathBuf>) -> Result<CatalogMetadata> {
        snapshot.validate().with_context(|| match &source {
            Some(path) => format!("catalog {} is incomplete", path.display()),
            None => "catalog is incomplete".to_owned(),
        })?;
        let sha256 = hash_catalog(&snapshot)?;
        if let Some(pin) = &self.pinned_sha256 {
            if *pin != sha256 {
                return Err(anyhow!(
                    "catalog hash {sha256} does not match pinned {pin}"
                ));
            }
        }

        let metadata = CatalogMetadata {
            source,
            sha256,
            version: snapshot.version.clone(),
            loaded_at: Utc::now(),
            panels: snapshot.panels.len(),
            inverters: snapshot.inverters.len(),
            batteries: snapshot.batteries.len(),
        };
        info!(
            sha256 = %metadata.sha256,
            version = metadata.version.as_deref().unwrap_or("unversioned"),
            panels = metadata.panels,
            inverters = metadata.inverters,
            batteries = metadata.batteries,
            "catalog snapshot installed"
        );

        *self.current.write() = Some(LoadedCatalog {
            snapshot: Arc::new(snapshot),
            metadata: metadata.clone(),
        });
        Ok(metadata)
    }

    /// The active snapshot. Fails before the first successful load.
    pub fn snapshot(&self) -> solcot_engine::Result<Arc<CatalogSnapshot>> {
        self.current
            .read()
            .as_ref()
            .map(|loaded| Arc::clone(&loaded.snapshot))
            .ok_or_else(|| {
                CalcEngineError::Configuration("catalog has not been loaded".to_owned())
            })
    }

    pub fn metadata(&self) -> Option<CatalogMetadata> {
        self.current
            .read()
            .as_ref()
            .map(|loaded| loaded.metadata.clone())
    }

    pub fn is_loaded(&self) -> bool {
        self.current.read().is_some()
    }

    /// Quote against the active snapshot.
    pub fn quote(&self, input: &QuoteInput) -> solcot_engine::Result<QuoteSummary> {
        let snapshot = self.snapshot()?;
        solcot_engine::quote(&snapshot, input)
    }
}

/// SHA-256 over the canonical JSON form, so the same catalog hashes equally
/// whether it was written as TOML, YAML or JSON.
pub fn hash_catalog(snapshot: &CatalogSnapshot) -> Result<String> {
    let canonical =
        serde_json::to_vec(snapshot).with_context(|| "failed to serialise catalog for hashing")?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}
