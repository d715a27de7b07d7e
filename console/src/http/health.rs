//! Health check API

use openapi_client::models::HealthResponse;

use crate::authn::session_token::SessionToken;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// Backend liveness
    pub async fn get_health(&self, auth: Option<&SessionToken>) -> Result<HealthResponse, ConsoleError> {
        self.get("/health", auth).await
    }
}
