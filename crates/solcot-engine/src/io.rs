//! ---
//! ems_section: "02-quote-engine"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Solar sizing and cost-estimation routines."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::{fs, io::BufRead, path::Path};

use crate::{
    catalog::CatalogSnapshot,
    errors::{CalcEngineError, Result},
    input::QuoteInput,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Toml,
    Yaml,
}

impl CatalogFormat {
    /// JSON when the document opens with `{`, TOML for `.toml` files, YAML otherwise.
    pub fn detect(path: Option<&Path>, content: &str) -> Self {
        if content.trim_start().starts_with('{') {
            return CatalogFormat::Json;
        }
        let is_toml = path
            .and_then(|p| p.extension())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        if is_toml {
            CatalogFormat::Toml
        } else {
            CatalogFormat::Yaml
        }
    }
}

pub fn parse_catalog(content: &str, format: CatalogFormat) -> Result<CatalogSnapshot> {
    let catalog = match format {
        CatalogFormat::Json => serde_json::from_str(content)?,
        CatalogFormat::Toml => toml::from_str(content)?,
        CatalogFormat::Yaml => {
            serde_yaml::from_str(content).map_err(CalcEngineError::YamlSerializationFailed)?
        }
    };
    Ok(catalog)
}

/// Read a catalog file without validating it.
pub fn load_catalog_from_file(path: impl AsRef<Path>) -> Result<CatalogSnapshot> {
    let path = path.as_ref();
    let data = fs::read_to_string(path)?;
    parse_catalog(&data, CatalogFormat::detect(Some(path), &data))
}

pub fn load_inputs_from_jsonl(path: impl AsRef<Path>) -> Result<Vec<QuoteInput>> {
    let file = fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut inputs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        inputs.push(serde_json::from_str(&line)?);
    }
    Ok(inputs)
}
