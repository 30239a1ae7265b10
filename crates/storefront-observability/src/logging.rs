//! Structured logging configuration.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// Crates whose events are governed by [`LoggingConfig::level`].
const STOREFRONT_TARGETS: &[&str] = &[
    "storefront_commerce",
    "storefront_data",
    "storefront_cache",
];

/// Log level for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
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
    pub fn as_str(&self) -> &'static str {
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
        f.write_str(self.as_str())
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines (for log aggregation).
    Json,
    /// Human-readable format (for development).
    #[default]
    Human,
}

/// The `[logging]` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Minimum level for storefront crates.
    #[serde(default)]
    pub level: LogLevel,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
    /// Extra filter directives appended verbatim, e.g. `"reqwest=debug"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directives: Option<String>,
}

impl LoggingConfig {
    /// Render the filter directive string for this configuration.
    ///
    /// Storefront crates log at `level`; everything else is held at `warn`.
    pub fn directive_string(&self) -> String {
        let mut parts: Vec<String> = vec!["warn".to_string()];
        parts.extend(
            STOREFRONT_TARGETS
                .iter()
                .map(|target| format!("{}={}", target, self.level)),
        );
        if let Some(extra) = self.directives.as_deref().map(str::trim) {
            if !extra.is_empty() {
                parts.push(extra.to_string());
            }
        }
        parts.join(",")
    }
}

/// Errors raised while installing the global subscriber.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(String),

    #[error("global subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Build the filter, letting `RUST_LOG` override the configured one.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(config.directive_string()).map_err(|e| LoggingError::Filter(e.to_string()))
}

/// Install the global `tracing` subscriber.
///
/// Call once from the composition root; a second call returns
/// [`LoggingError::AlreadyInstalled`].
pub fn init(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Human => builder.try_init(),
    };
    result.map_err(|e| LoggingError::AlreadyInstalled(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives() {
        let config = LoggingConfig::default();
        assert_eq!(
            config.directive_string(),
            "warn,storefront_commerce=info,storefront_data=info,storefront_cache=info"
        );
    }

    #[test]
    fn test_extra_directives_appended() {
        let config = LoggingConfig {
            level: LogLevel::Debug,
            format: LogFormat::Json,
            directives: Some(" reqwest=debug ".to_string()),
        };
        let directives = config.directive_string();
        assert!(directives.contains("storefront_commerce=debug"));
        assert!(directives.ends_with(",reqwest=debug"));
    }

    #[test]
    fn test_directives_parse_as_filter() {
        let config = LoggingConfig {
            level: LogLevel::Trace,
            ..Default::default()
        };
        assert!(EnvFilter::try_new(config.directive_string()).is_ok());
    }

    #[test]
    fn test_config_deserializes_lowercase() {
        let config: LoggingConfig =
            serde_json::from_str(r#"{"level":"warn","format":"json"}"#).unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.directives.is_none());
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
        assert!(LogLevel::Debug < LogLevel::Error);
    }
}
