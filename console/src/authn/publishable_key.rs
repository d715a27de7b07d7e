//! Identity-provider publishable key parsing
//!
//! Keys look like `pk_test_<base64>` / `pk_live_<base64>`, where the payload
//! decodes to the provider's frontend API host followed by a `$` sentinel.

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;

use crate::errors::ConsoleError;

/// Identity-provider instance kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Development,
    Production,
}

/// A parsed publishable key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishableKey {
    raw: String,
    instance: InstanceKind,
    frontend_api: String,
}

impl PublishableKey {
    pub fn parse(raw: &str) -> Result<Self, ConsoleError> {
        let raw = raw.trim();
        let (instance, payload) = if let Some(rest) = raw.strip_prefix("pk_test_") {
            (InstanceKind::Development, rest)
        } else if let Some(rest) = raw.strip_prefix("pk_live_") {
            (InstanceKind::Production, rest)
        } else {
            return Err(ConsoleError::ConfigError(
                "publishable key must start with pk_test_ or pk_live_".to_string(),
            ));
        };

        let payload = payload.trim_end_matches('=');
        let decoded = STANDARD_NO_PAD
            .decode(payload)
            .or_else(|_| URL_SAFE_NO_PAD.decode(payload))
            .map_err(|e| ConsoleError::ConfigError(format!("invalid publishable key: {}", e)))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|_| ConsoleError::ConfigError("invalid publishable key encoding".to_string()))?;

        let frontend_api = decoded
            .strip_suffix('$')
            .filter(|host| !host.is_empty() && !host.contains('/'))
            .ok_or_else(|| {
                ConsoleError::ConfigError("publishable key does not name a frontend API host".to_string())
            })?;

        Ok(Self {
            raw: raw.to_string(),
            instance,
            frontend_api: frontend_api.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn instance(&self) -> InstanceKind {
        self.instance
    }

    /// Frontend API host, e.g. `clerk.snapdeploy.app`
    pub fn frontend_api(&self) -> &str {
        &self.frontend_api
    }

    /// Hosted sign-in page for this instance
    pub fn sign_in_url(&self) -> String {
        format!("https://{}/sign-in", self.frontend_api)
    }
}
