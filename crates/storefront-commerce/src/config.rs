//! Storefront configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use storefront_observability::LoggingConfig;

use crate::checkout::{DEFAULT_LATENCY, DEFAULT_SUCCESS_RATE};
use crate::error::CommerceError;
use crate::search::EngineSettings;

/// Top-level configuration file. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Catalog API and paging.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Where the cart and favorites are kept.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Simulated payment behaviour.
    #[serde(default)]
    pub checkout: CheckoutConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Load config from a file, TOML unless the extension is `.json`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
        };

        config
            .validate()
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// Save config to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Reject values the storefront cannot run with.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.catalog.base_url.trim().is_empty() {
            return Err(CommerceError::Config("catalog.base_url is empty".to_string()));
        }
        if self.catalog.page_size == 0 {
            return Err(CommerceError::Config(
                "catalog.page_size must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.checkout.success_rate) {
            return Err(CommerceError::Config(format!(
                "checkout.success_rate must be between 0 and 1, got {}",
                self.checkout.success_rate
            )));
        }
        if self.storage.backend == StorageBackend::File && self.storage.path.as_os_str().is_empty() {
            return Err(CommerceError::Config(
                "storage.path is required for the file backend".to_string(),
            ));
        }
        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

/// Catalog API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Products per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,

    /// Rows from the end of the list that trigger the next page.
    #[serde(default = "default_prefetch_window")]
    pub prefetch_window: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            prefetch_window: default_prefetch_window(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings::default()
            .with_page_size(self.page_size)
            .with_prefetch_window(self.prefetch_window)
    }
}

fn default_base_url() -> String {
    "https://dummyjson.com".to_string()
}

fn default_page_size() -> u64 {
    EngineSettings::default().page_size
}

fn default_prefetch_window() -> usize {
    EngineSettings::default().prefetch_window
}

fn default_timeout_secs() -> u64 {
    15
}

/// Storage backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Lost when the process exits.
    #[default]
    Memory,
    /// One file per key under `path`.
    File,
}

/// Local persistence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the file backend.
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".storefront")
}

/// Simulated payment settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Share of charges that succeed, 0–1.
    #[serde(default = "default_success_rate")]
    pub success_rate: f64,

    /// Processing delay in milliseconds.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            success_rate: default_success_rate(),
            latency_ms: default_latency_ms(),
        }
    }
}

impl CheckoutConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

fn default_success_rate() -> f64 {
    DEFAULT_SUCCESS_RATE
}

fn default_latency_ms() -> u64 {
    DEFAULT_LATENCY.as_millis() as u64
}
