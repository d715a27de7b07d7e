//! Repository API client

use openapi_client::models::{RepositoryListResponse, SyncRepositoriesResponse};
use serde::Serialize;

use crate::authn::session_token::SessionToken;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

/// Repository listing parameters
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for RepositoryQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 20,
            search: None,
        }
    }
}

impl HttpClient {
    /// Repositories visible to a user
    pub async fn list_user_repositories(
        &self,
        user_id: &str,
        query: &RepositoryQuery,
        auth: Option<&SessionToken>,
    ) -> Result<RepositoryListResponse, ConsoleError> {
        let path = format!("/users/{}/repositories", user_id);
        self.get_with_query(&path, query, auth).await
    }

    /// Re-import repositories from the user's GitHub account
    pub async fn sync_user_repositories(
        &self,
        user_id: &str,
        auth: Option<&SessionToken>,
    ) -> Result<SyncRepositoriesResponse, ConsoleError> {
        let path = format!("/users/{}/repositories/sync", user_id);
        let response: Option<SyncRepositoriesResponse> = self.post_empty(&path, auth).await?;
        Ok(response.unwrap_or_default())
    }
}
