//! Shared error types for experiment configuration

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse experiment YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Unsupported {field} '{kind}'")]
    UnsupportedKind { field: String, kind: String },
}

impl ConfigError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Dotted path of the offending field, when the error concerns one
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field } | Self::InvalidField { field, .. } | Self::UnsupportedKind { field, .. } => {
                Some(field)
            }
            Self::Io { .. } | Self::Parse(_) => None,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
