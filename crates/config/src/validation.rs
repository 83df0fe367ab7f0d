//! Configuration validation
//!
//! Validates writer settings before anything is opened:
//! - Output path is present
//! - Exactly one sync trigger is set
//! - Sync and rotation thresholds are positive
//! - Move actions name a destination
//! - A rotation failure limit, when set, is positive

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::writer::{ActionConfig, RotationConfig, SyncConfig, WriterSection};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_writer(&config.writer)
}

fn validate_writer(writer: &WriterSection) -> Result<()> {
    if writer.id.is_empty() {
        return Err(ConfigError::invalid(
            "writer",
            "",
            "id",
            "must not be empty",
        ));
    }
    let name = writer.id.as_str();

    if writer.path.is_empty() {
        return Err(ConfigError::missing("writer", name, "path"));
    }

    if writer.queue_size == 0 {
        return Err(ConfigError::invalid(
            "writer",
            name,
            "queue_size",
            "must be positive",
        ));
    }

    if writer.max_rotation_failures == Some(0) {
        return Err(ConfigError::invalid(
            "writer",
            name,
            "max_rotation_failures",
            "must be positive when set",
        ));
    }

    validate_sync(name, &writer.sync)?;
    validate_rotation(name, &writer.rotation)?;

    for action in &writer.actions {
        match action {
            ActionConfig::Move { dest } => {
                if dest.is_empty() {
                    return Err(ConfigError::missing("writer.actions", name, "dest"));
                }
            }
        }
    }

    Ok(())
}

fn validate_sync(name: &str, sync: &SyncConfig) -> Result<()> {
    match (sync.count, sync.interval) {
        (Some(_), Some(_)) => Err(ConfigError::invalid(
            "writer",
            name,
            "sync",
            "count and interval are mutually exclusive",
        )),
        (None, None) => Err(ConfigError::missing("writer", name, "sync")),
        (Some(0), None) => Err(ConfigError::invalid(
            "writer",
            name,
            "sync.count",
            "must be positive",
        )),
        (None, Some(interval)) if interval.is_zero() => Err(ConfigError::invalid(
            "writer",
            name,
            "sync.interval",
            "must be positive",
        )),
        _ => Ok(()),
    }
}

fn validate_rotation(name: &str, rotation: &RotationConfig) -> Result<()> {
    match rotation {
        RotationConfig::Size { size, .. } => {
            if !size.is_finite() || *size <= 0.0 {
                return Err(ConfigError::invalid(
                    "writer",
                    name,
                    "rotation.size",
                    format!("must be a positive number, got {size}"),
                ));
            }
        }
        RotationConfig::Count { count } => {
            if *count == 0 {
                return Err(ConfigError::invalid(
                    "writer",
                    name,
                    "rotation.count",
                    "must be positive",
                ));
            }
        }
        RotationConfig::Timed { interval } => {
            if interval.is_zero() {
                return Err(ConfigError::invalid(
                    "writer",
                    name,
                    "rotation.interval",
                    "must be positive",
                ));
            }
        }
    }
    Ok(())
}
