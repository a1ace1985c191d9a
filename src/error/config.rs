use std::path::PathBuf;

use thiserror::Error;

use super::ValidationError;

/// Problems with the config file or with values it supplies.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {}: {source}", path.display())]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config file {} is not valid TOML: {source}", path.display())]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Config file {} is not valid JSON: {source}", path.display())]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Config files ending in '.{ext}' are not supported; use .toml or .json.")]
    UnsupportedExtension { ext: String },
    #[error("Config file needs a .toml or .json extension.")]
    MissingExtension,
    #[error("Config value '{field}' must be at least 1: {source}")]
    FieldMustBePositive {
        field: String,
        #[source]
        source: ValidationError,
    },
    #[error("Config value '{field}' is not a valid duration: {source}")]
    InvalidDuration {
        field: &'static str,
        #[source]
        source: ValidationError,
    },
    #[error("Auth mode '{mode}' needs '{field}' to be set.")]
    AuthMissingCredential {
        mode: &'static str,
        field: &'static str,
    },
}
