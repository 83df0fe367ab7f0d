//! `[log]` section
//!
//! Verbosity of the binary's own diagnostics. The level is handed to
//! `tracing_subscriber::EnvFilter` as a directive; `--log-level` on the
//! command line takes precedence.

use std::fmt;

use serde::Deserialize;

/// Diagnostic verbosity, ordered from most to least verbose
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        Self::Trace,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
    ];

    /// `EnvFilter` directive for this level
    pub fn directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.directive())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
}

impl LogConfig {
    /// Directive to install, preferring a command-line override
    pub fn filter<'a>(&self, cli_override: Option<&'a str>) -> &'a str {
        cli_override.unwrap_or(self.level.directive())
    }
}
