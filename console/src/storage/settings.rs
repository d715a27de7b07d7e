//! Settings file management

use serde::{Deserialize, Serialize};

use crate::logs::LogLevel;
use crate::stream::connection::DedupPolicy;

/// Console settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Backend configuration
    #[serde(default)]
    pub backend: BackendSettings,

    /// Identity-provider configuration
    #[serde(default)]
    pub identity: IdentitySettings,

    /// Deployment log viewer configuration
    #[serde(default)]
    pub viewer: ViewerSettings,
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL for the backend API (includes `/api/v1`)
    #[serde(default = "default_backend_url")]
    pub base_url: String,
}

pub fn default_backend_url() -> String {
    "http://localhost:8080/api/v1".to_string()
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
        }
    }
}

/// Identity-provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentitySettings {
    /// Publishable key of the identity-provider instance
    #[serde(default)]
    pub publishable_key: Option<String>,
}

/// Log viewer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerSettings {
    /// Deployment status polling interval in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Use the live log stream while a deployment is in progress
    #[serde(default = "default_true")]
    pub streaming: bool,

    /// Delays of the scroll-to-bottom attempts after a source switch
    #[serde(default = "default_scroll_retry_delays_ms")]
    pub scroll_retry_delays_ms: Vec<u64>,

    /// Duplicate detection for live log lines
    #[serde(default)]
    pub dedup: DedupPolicy,
}

fn default_true() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_scroll_retry_delays_ms() -> Vec<u64> {
    vec![100, 300, 500]
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            streaming: true,
            scroll_retry_delays_ms: default_scroll_retry_delays_ms(),
            dedup: DedupPolicy::default(),
        }
    }
}
