//! Application configuration options

use std::time::Duration;

use crate::authn::publishable_key::PublishableKey;
use crate::errors::ConsoleError;
use crate::storage::layout::StorageLayout;
use crate::storage::settings::Settings;
use crate::stream::connection::DedupPolicy;
use crate::viewer::session;

/// Environment variable overriding the API base URL
pub const API_URL_ENV_VAR: &str = "SNAPDEPLOY_API_URL";

/// Environment variable holding the identity-provider publishable key
pub const PUBLISHABLE_KEY_ENV_VAR: &str = "SNAPDEPLOY_PUBLISHABLE_KEY";

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Backend API base URL
    pub api_url: String,

    /// Identity-provider key, when configured
    pub publishable_key: Option<PublishableKey>,

    /// Print machine-readable JSON instead of tables
    pub json: bool,

    /// Storage layout paths
    pub layout: StorageLayout,

    /// Log viewer defaults
    pub viewer: ViewerOptions,
}

/// Log viewer defaults from settings
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub poll_interval: Duration,
    pub streaming: bool,
    pub scroll_retry_delays: Vec<Duration>,
    pub dedup: DedupPolicy,
}

impl ViewerOptions {
    /// Session options with command-line overrides applied
    pub fn session(&self, follow: bool, no_stream: bool, poll_ms: Option<u64>) -> session::Options {
        session::Options {
            poll_interval: poll_ms.map(Duration::from_millis).unwrap_or(self.poll_interval),
            streaming: self.streaming && !no_stream,
            follow,
            scroll_retry_delays: self.scroll_retry_delays.clone(),
        }
    }
}

impl AppOptions {
    /// Merge settings with overrides; flags and environment are applied by
    /// the caller and win over the settings file
    pub fn resolve(
        settings: &Settings,
        layout: StorageLayout,
        api_url: Option<String>,
        publishable_key: Option<String>,
        json: bool,
    ) -> Result<Self, ConsoleError> {
        let api_url = api_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| settings.backend.base_url.clone());

        let publishable_key = publishable_key
            .or_else(|| settings.identity.publishable_key.clone())
            .filter(|key| !key.trim().is_empty())
            .map(|key| PublishableKey::parse(&key))
            .transpose()?;

        if settings.viewer.poll_interval_ms == 0 {
            return Err(ConsoleError::ConfigError(
                "viewer.poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            publishable_key,
            json,
            layout,
            viewer: ViewerOptions {
                poll_interval: Duration::from_millis(settings.viewer.poll_interval_ms),
                streaming: settings.viewer.streaming,
                scroll_retry_delays: settings
                    .viewer
                    .scroll_retry_delays_ms
                    .iter()
                    .copied()
                    .map(Duration::from_millis)
                    .collect(),
                dedup: settings.viewer.dedup,
            },
        })
    }
}

/// Read `settings.json`, defaulting every field when the file is absent
pub async fn load_settings(layout: &StorageLayout) -> Result<Settings, ConsoleError> {
    let file = layout.settings_file();
    Ok(file.read_json_opt::<Settings>().await?.unwrap_or_default())
}
