//! Roller Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only the output path is required.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use roller_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[writer]\npath = \"out/\"").unwrap();
//! ```
//!
//! # Example Minimal Config
//!
//! ```toml
//! [writer]
//! path = "out/"
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "debug"
//!
//! [writer]
//! id = "events"
//! path = "out/"
//! prefix = "events-"
//! extension = ".csv"
//! layout = "hourly"
//! field_delimiter = "|"
//! queue_size = 5000
//!
//! [writer.sync]
//! count = 500
//!
//! [writer.rotation]
//! type = "timed"
//! interval = "15m"
//!
//! [[writer.actions]]
//! type = "move"
//! dest = "done/"
//! ```

mod error;
mod logging;
mod validation;
mod writer;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use logging::{LogConfig, LogLevel};
pub use writer::{
    ActionConfig, DEFAULT_BUFFER_SIZE, DEFAULT_QUEUE_SIZE, DEFAULT_SYNC_COUNT, DEFAULT_WRITER_ID,
    Layout, RotationConfig, SizeUnit, SyncConfig, WriterSection,
};

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults, but `writer.path` must
/// be set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging configuration
    pub log: LogConfig,

    /// Rotating writer
    pub writer: WriterSection,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_minimal_config() {
        let config = Config::from_str("[writer]\npath = \"out/\"").unwrap();
        assert_eq!(config.log.level, LogLevel::Info);
        assert_eq!(config.writer.path, "out/");
        assert_eq!(config.writer.id, DEFAULT_WRITER_ID);
        assert_eq!(config.writer.sync.count, Some(DEFAULT_SYNC_COUNT));
    }

    #[test]
    fn test_empty_config_needs_path() {
        let err = Config::from_str("").unwrap_err();
        assert!(matches!(err, ConfigError::Missing { field: "path", .. }));
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[log]
level = "debug"

[writer]
id = "events"
path = "out/"
prefix = "events-"
extension = ".csv"
layout = "daily"
field_delimiter = "|"
record_delimiter = "\r\n"
fields = [2, 0]
queue_size = 5000
buffer_size = 0
max_rotation_failures = 3

[writer.sync]
interval = "250ms"

[writer.rotation]
type = "timed"
interval = "15m"

[[writer.actions]]
type = "move"
dest = "done/"
"#;
        let config = Config::from_str(toml).unwrap();

        assert_eq!(config.log.level, LogLevel::Debug);
        let writer = &config.writer;
        assert_eq!(writer.id, "events");
        assert_eq!(writer.prefix, "events-");
        assert_eq!(writer.extension, ".csv");
        assert_eq!(writer.layout, Layout::Daily);
        assert_eq!(writer.field_delimiter, "|");
        assert_eq!(writer.record_delimiter, "\r\n");
        assert_eq!(writer.fields, Some(vec![2, 0]));
        assert_eq!(writer.queue_size, 5000);
        assert_eq!(writer.buffer_size, 0);
        assert_eq!(writer.max_rotation_failures, Some(3));
        assert_eq!(writer.sync.interval, Some(Duration::from_millis(250)));
        assert_eq!(
            writer.rotation,
            RotationConfig::Timed {
                interval: Duration::from_secs(900)
            }
        );
        assert_eq!(writer.actions.len(), 1);
    }

    #[test]
    fn test_shipped_example_config() {
        let config = Config::from_str(include_str!("../../../configs/roller.toml")).unwrap();
        assert_eq!(config.writer.path, "out/");
        assert_eq!(config.writer.actions.len(), 1);
        assert_eq!(config.writer.rotation.type_name(), "size");
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_str("invalid { toml");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[writer]\npath = \"out/\"\n\n[writer.rotation]\ntype = \"count\"\ncount = 3").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.writer.rotation, RotationConfig::Count { count: 3 });
    }

    #[test]
    fn test_from_missing_file() {
        let err = Config::from_file("/nonexistent/roller.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
