//! Errors from loading a config file
//!
//! Validation errors name the TOML section, the writer id and the offending
//! key, so a message points straight at the line to fix.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read at all
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Not valid TOML, or a key has the wrong shape
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A required key is absent
    #[error("[{section}] of '{id}' needs `{field}`")]
    Missing {
        section: &'static str,
        id: String,
        field: &'static str,
    },

    /// A key is present but unusable
    #[error("[{section}] of '{id}': `{field}` {reason}")]
    Invalid {
        section: &'static str,
        id: String,
        field: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub fn missing(section: &'static str, id: impl Into<String>, field: &'static str) -> Self {
        Self::Missing {
            section,
            id: id.into(),
            field,
        }
    }

    pub fn invalid(
        section: &'static str,
        id: impl Into<String>,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            section,
            id: id.into(),
            field,
            reason: reason.into(),
        }
    }

    /// Key a validation error is about
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Missing { field, .. } | Self::Invalid { field, .. } => Some(*field),
            Self::Read { .. } | Self::Parse(_) => None,
        }
    }
}
