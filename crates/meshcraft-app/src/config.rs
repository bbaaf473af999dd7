/*
[INPUT]:  YAML configuration file
[OUTPUT]: Parsed client configuration (API, image proxy, polling, storage, logging)
[POS]:    Configuration layer - runtime setup
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, anyhow};
use meshcraft_adapter::http::DEFAULT_BASE_URL;
use meshcraft_adapter::proxy::{DEFAULT_PROXIED_DOMAINS, DEFAULT_PROXY_PATH};
use meshcraft_adapter::{ClientConfig, ImageProxy};
use serde::{Deserialize, Serialize};

use crate::gallery_store::DEFAULT_PAGE_SIZE;
use crate::printer_store::{IDLE_POLL_INTERVAL, PRINTING_POLL_INTERVAL, PollingPolicy};

/// Top-level configuration for the client
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub image_proxy: ImageProxyConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Image proxy settings; `base_url` defaults to the API's proxy endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageProxyConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_proxied_domains")]
    pub domains: Vec<String>,
}

impl Default for ImageProxyConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            domains: default_proxied_domains(),
        }
    }
}

/// Printer poll intervals in milliseconds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollingConfig {
    #[serde(default = "default_printing_ms")]
    pub printing_ms: u64,
    #[serde(default = "default_idle_ms")]
    pub idle_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            printing_ms: default_printing_ms(),
            idle_ms: default_idle_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GalleryConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// Where persisted snapshots live; `None` means `dirs::data_dir()/meshcraft`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Directory for a daily rolling log file, in addition to stderr
    #[serde(default)]
    pub file_dir: Option<PathBuf>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_proxied_domains() -> Vec<String> {
    DEFAULT_PROXIED_DOMAINS.iter().map(|d| d.to_string()).collect()
}

fn default_printing_ms() -> u64 {
    PRINTING_POLL_INTERVAL.as_millis() as u64
}

fn default_idle_ms() -> u64 {
    IDLE_POLL_INTERVAL.as_millis() as u64
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl AppConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(anyhow!("api.base_url cannot be empty"));
        }
        if self.polling.printing_ms == 0 || self.polling.idle_ms == 0 {
            return Err(anyhow!("poll intervals must be greater than zero"));
        }
        if self.gallery.page_size == 0 {
            return Err(anyhow!("gallery.page_size must be greater than zero"));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            timeout: Duration::from_secs(self.api.timeout_secs),
            connect_timeout: Duration::from_secs(self.api.connect_timeout_secs),
        }
    }

    pub fn image_proxy(&self) -> ImageProxy {
        let base = match &self.image_proxy.base_url {
            Some(base) => base.clone(),
            None => format!(
                "{}{}",
                self.api.base_url.trim_end_matches('/'),
                DEFAULT_PROXY_PATH
            ),
        };
        ImageProxy::new(base, &self.image_proxy.domains)
    }

    pub fn polling_policy(&self) -> PollingPolicy {
        PollingPolicy {
            printing: Duration::from_millis(self.polling.printing_ms),
            idle: Duration::from_millis(self.polling.idle_ms),
        }
    }
}
