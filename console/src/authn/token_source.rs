//! Where session tokens come from

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::authn::session_token::SessionToken;
use crate::errors::ConsoleError;
use crate::filesys::file::File;

/// Environment variable holding a session token
pub const TOKEN_ENV_VAR: &str = "SNAPDEPLOY_TOKEN";

/// Token source trait for testability
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Current token, `None` when signed out
    async fn token(&self) -> Result<Option<SessionToken>, ConsoleError>;

    /// Short description for diagnostics
    fn describe(&self) -> String;
}

/// A fixed token (or none)
pub struct StaticTokenSource {
    token: Option<SessionToken>,
}

impl StaticTokenSource {
    pub fn new(token: Option<SessionToken>) -> Self {
        Self { token }
    }

    pub fn anonymous() -> Self {
        Self { token: None }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn token(&self) -> Result<Option<SessionToken>, ConsoleError> {
        Ok(self.token.clone())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}

/// Token read from an environment variable on every request
pub struct EnvTokenSource {
    var: String,
}

impl EnvTokenSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenSource {
    fn default() -> Self {
        Self::new(TOKEN_ENV_VAR)
    }
}

#[async_trait]
impl TokenSource for EnvTokenSource {
    async fn token(&self) -> Result<Option<SessionToken>, ConsoleError> {
        match std::env::var(&self.var) {
            Ok(raw) if !raw.trim().is_empty() => SessionToken::from_raw(raw).map(Some),
            _ => Ok(None),
        }
    }

    fn describe(&self) -> String {
        format!("environment ({})", self.var)
    }
}

/// Token persisted by `auth login`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub token: String,

    /// Unix epoch seconds
    pub saved_at: i64,
}

/// Token stored in a file under the config directory
pub struct FileTokenSource {
    file: File,
}

impl FileTokenSource {
    pub fn new(file: File) -> Self {
        Self { file }
    }

    pub fn file(&self) -> &File {
        &self.file
    }

    /// Persist a token with owner-only permissions
    pub async fn save(&self, token: &SessionToken) -> Result<(), ConsoleError> {
        let stored = StoredToken {
            token: token.expose().to_string(),
            saved_at: chrono::Utc::now().timestamp(),
        };
        self.file.write_json(&stored).await?;
        self.file.set_permissions_600().await?;
        debug!("Saved session token to {}", self.file.path().display());
        Ok(())
    }

    /// Forget the stored token
    pub async fn clear(&self) -> Result<(), ConsoleError> {
        self.file.delete().await
    }
}

#[async_trait]
impl TokenSource for FileTokenSource {
    async fn token(&self) -> Result<Option<SessionToken>, ConsoleError> {
        let Some(stored) = self.file.read_json_opt::<StoredToken>().await? else {
            return Ok(None);
        };
        SessionToken::from_raw(stored.token).map(Some)
    }

    fn describe(&self) -> String {
        format!("token file ({})", self.file.path().display())
    }
}

/// First source that yields a token wins
pub struct ChainedTokenSource {
    sources: Vec<Box<dyn TokenSource>>,
}

impl ChainedTokenSource {
    pub fn new(sources: Vec<Box<dyn TokenSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl TokenSource for ChainedTokenSource {
    async fn token(&self) -> Result<Option<SessionToken>, ConsoleError> {
        for source in &self.sources {
            if let Some(token) = source.token().await? {
                if token.is_expired() {
                    warn!(
                        "Session token from {} has expired; requests may be rejected",
                        source.describe()
                    );
                }
                return Ok(Some(token));
            }
        }
        Ok(None)
    }

    fn describe(&self) -> String {
        self.sources
            .iter()
            .map(|s| s.describe())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Describe which source currently provides a token
pub async fn active_source(sources: &[&dyn TokenSource]) -> Result<Option<String>, ConsoleError> {
    for source in sources {
        if source.token().await?.is_some() {
            return Ok(Some(source.describe()));
        }
    }
    Ok(None)
}
