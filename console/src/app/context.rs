//! Shared state of one command invocation

use std::sync::Arc;

use openapi_client::models::User;
use serde::Serialize;

use crate::app::options::AppOptions;
use crate::authn::session_token::SessionToken;
use crate::authn::token_source::{ChainedTokenSource, EnvTokenSource, FileTokenSource, TokenSource};
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

/// Clients and credentials for the command being run
pub struct AppContext {
    pub options: AppOptions,
    pub client: Arc<HttpClient>,
    /// Environment first, then the token file
    pub tokens: Arc<dyn TokenSource>,
    /// Token file written by `auth login`
    pub token_file: FileTokenSource,
}

impl AppContext {
    pub fn new(options: AppOptions) -> Result<Self, ConsoleError> {
        let client = Arc::new(HttpClient::new(&options.api_url)?);
        let tokens: Arc<dyn TokenSource> = Arc::new(ChainedTokenSource::new(vec![
            Box::new(EnvTokenSource::default()),
            Box::new(FileTokenSource::new(options.layout.token_file())),
        ]));
        let token_file = FileTokenSource::new(options.layout.token_file());

        Ok(Self {
            options,
            client,
            tokens,
            token_file,
        })
    }

    /// Session token for the next request, if any
    pub async fn token(&self) -> Result<Option<SessionToken>, ConsoleError> {
        self.tokens.token().await
    }

    /// The signed-in user
    pub async fn current_user(&self, auth: Option<&SessionToken>) -> Result<User, ConsoleError> {
        self.client.get_current_user(auth).await
    }

    /// Print `value` as JSON in `--json` mode, otherwise run `human`
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<(), ConsoleError> {
        if self.options.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}
