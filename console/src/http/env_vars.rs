//! Project environment variable API client

use openapi_client::models::{EnvironmentVariable, EnvironmentVariableListResponse, SetEnvironmentVariableRequest};

use crate::authn::session_token::SessionToken;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

impl HttpClient {
    pub async fn list_env_vars(
        &self,
        project_id: &str,
        auth: Option<&SessionToken>,
    ) -> Result<Vec<EnvironmentVariable>, ConsoleError> {
        let path = format!("/projects/{}/env", project_id);
        let response: EnvironmentVariableListResponse = self.get(&path, auth).await?;
        Ok(response.environment_variables)
    }

    /// Create or overwrite a variable
    pub async fn set_env_var(
        &self,
        project_id: &str,
        request: &SetEnvironmentVariableRequest,
        auth: Option<&SessionToken>,
    ) -> Result<(), ConsoleError> {
        let path = format!("/projects/{}/env", project_id);
        let _: serde_json::Value = self.post(&path, auth, request).await?;
        Ok(())
    }

    pub async fn delete_env_var(
        &self,
        project_id: &str,
        key: &str,
        auth: Option<&SessionToken>,
    ) -> Result<(), ConsoleError> {
        let path = format!("/projects/{}/env/{}", project_id, key);
        self.delete(&path, auth).await
    }
}
