//! Deployment API client

use async_trait::async_trait;
use openapi_client::models::{
    AppendDeploymentLogRequest, CreateDeploymentRequest, Deployment, DeploymentListResponse,
    UpdateDeploymentStatusRequest,
};
use std::sync::Arc;

use crate::authn::session_token::SessionToken;
use crate::authn::token_source::TokenSource;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;
use crate::http::PageQuery;

impl HttpClient {
    /// Trigger a deployment
    pub async fn create_deployment(
        &self,
        request: &CreateDeploymentRequest,
        auth: Option<&SessionToken>,
    ) -> Result<Deployment, ConsoleError> {
        self.post("/deployments", auth, request).await
    }

    /// Get a deployment, including its persisted log text
    pub async fn get_deployment(
        &self,
        deployment_id: &str,
        auth: Option<&SessionToken>,
    ) -> Result<Deployment, ConsoleError> {
        let path = format!("/deployments/{}", deployment_id);
        self.get(&path, auth).await
    }

    /// Update deployment status
    pub async fn update_deployment_status(
        &self,
        deployment_id: &str,
        request: &UpdateDeploymentStatusRequest,
        auth: Option<&SessionToken>,
    ) -> Result<Deployment, ConsoleError> {
        let path = format!("/deployments/{}/status", deployment_id);
        self.patch(&path, auth, request).await
    }

    /// Append a line to the persisted deployment log
    pub async fn append_deployment_log(
        &self,
        deployment_id: &str,
        request: &AppendDeploymentLogRequest,
        auth: Option<&SessionToken>,
    ) -> Result<Deployment, ConsoleError> {
        let path = format!("/deployments/{}/logs", deployment_id);
        self.post(&path, auth, request).await
    }

    pub async fn delete_deployment(
        &self,
        deployment_id: &str,
        auth: Option<&SessionToken>,
    ) -> Result<(), ConsoleError> {
        let path = format!("/deployments/{}", deployment_id);
        self.delete(&path, auth).await
    }

    pub async fn list_project_deployments(
        &self,
        project_id: &str,
        page: &PageQuery,
        auth: Option<&SessionToken>,
    ) -> Result<DeploymentListResponse, ConsoleError> {
        let path = format!("/projects/{}/deployments", project_id);
        self.get_with_query(&path, page, auth).await
    }

    /// Latest deployment of a project, `None` when it was never deployed
    pub async fn latest_project_deployment(
        &self,
        project_id: &str,
        auth: Option<&SessionToken>,
    ) -> Result<Option<Deployment>, ConsoleError> {
        let path = format!("/projects/{}/deployments/latest", project_id);
        match self.get(&path, auth).await {
            Ok(deployment) => Ok(Some(deployment)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn list_user_deployments(
        &self,
        user_id: &str,
        page: &PageQuery,
        auth: Option<&SessionToken>,
    ) -> Result<DeploymentListResponse, ConsoleError> {
        let path = format!("/users/{}/deployments", user_id);
        self.get_with_query(&path, page, auth).await
    }
}

/// Source of deployment snapshots for the log viewer
#[async_trait]
pub trait DeploymentSource: Send + Sync {
    async fn fetch_deployment(&self, deployment_id: &str) -> Result<Deployment, ConsoleError>;
}

/// Deployment fetches with a token resolved per request
pub struct HttpDeploymentSource {
    client: Arc<HttpClient>,
    tokens: Arc<dyn TokenSource>,
}

impl HttpDeploymentSource {
    pub fn new(client: Arc<HttpClient>, tokens: Arc<dyn TokenSource>) -> Self {
        Self { client, tokens }
    }
}

#[async_trait]
impl DeploymentSource for HttpDeploymentSource {
    async fn fetch_deployment(&self, deployment_id: &str) -> Result<Deployment, ConsoleError> {
        let token = self.tokens.token().await?;
        self.client.get_deployment(deployment_id, token.as_ref()).await
    }
}
