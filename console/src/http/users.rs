//! User API client

use openapi_client::models::User;

use crate::authn::session_token::SessionToken;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// The user the token belongs to
    pub async fn get_current_user(&self, auth: Option<&SessionToken>) -> Result<User, ConsoleError> {
        self.get("/auth/me", auth).await
    }
}
