//! ---
//! ems_section: "02-quote-engine"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Solar sizing and cost-estimation routines."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CalcEngineError>;

#[derive(Debug, Error)]
pub enum CalcEngineError {
    /// The quote input is malformed (e.g. non-positive consumption).
    #[error("invalid quote input: {0}")]
    Validation(String),
    /// The catalog snapshot lacks data required to finish a step.
    #[error("catalog configuration error: {0}")]
    Configuration(String),
    /// The product line has no suitable entry for the requested combination.
    #[error("no catalog match: {0}")]
    NoMatch(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    SerializationFailed(#[from] serde_json::Error),
    #[error("yaml serialization error: {0}")]
    YamlSerializationFailed(#[from] serde_yaml::Error),
    #[error("toml deserialization error: {0}")]
    TomlDeserializationFailed(#[from] toml::de::Error),
}

impl CalcEngineError {
    pub(crate) fn missing(what: &str, key: impl std::fmt::Display) -> Self {
        CalcEngineError::Configuration(format!("{what} has no entry for '{key}'"))
    }

    /// Short machine-readable label used in structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CalcEngineError::Validation(_) => "validation",
            CalcEngineError::Configuration(_) => "configuration",
            CalcEngineError::NoMatch(_) => "no_match",
            CalcEngineError::Io(_) => "io",
            CalcEngineError::SerializationFailed(_)
            | CalcEngineError::YamlSerializationFailed(_)
            | CalcEngineError::TomlDeserializationFailed(_) => "serialization",
        }
    }
}
