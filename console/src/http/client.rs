//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};
use url::Url;

use crate::authn::session_token::SessionToken;
use crate::errors::ConsoleError;
use crate::utils::generate_uuid;

/// Request correlation header
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// HTTP client for backend communication.
///
/// Holds no credentials; every call receives its token explicitly.
pub struct HttpClient {
    client: Client,
    stream_client: Client,
    base_url: String,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(base_url: &str) -> Result<Self, ConsoleError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ConsoleError::ConfigError(format!("invalid API base URL {}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConsoleError::ConfigError(format!(
                "API base URL must be http(s): {}",
                base_url
            )));
        }

        let user_agent = format!("snapdeploy/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent.clone())
            .build()?;

        // Event streams stay open for the whole deployment, so only the
        // connect phase is bounded.
        let stream_client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            stream_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str, auth: Option<&SessionToken>) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let request = self
            .client
            .request(method, &url)
            .header(header::ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, generate_uuid());
        with_auth(request, auth)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        auth: Option<&SessionToken>,
    ) -> Result<T, ConsoleError> {
        let response = self.request(Method::GET, path, auth).send().await?;
        read_json(Method::GET, response).await
    }

    /// Make a GET request with query parameters
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
        auth: Option<&SessionToken>,
    ) -> Result<T, ConsoleError> {
        let response = self
            .request(Method::GET, path, auth)
            .query(query)
            .send()
            .await?;
        read_json(Method::GET, response).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        auth: Option<&SessionToken>,
        body: &B,
    ) -> Result<T, ConsoleError> {
        let response = self.request(Method::POST, path, auth).json(body).send().await?;
        read_json(Method::POST, response).await
    }

    /// Make a POST request without a body
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        auth: Option<&SessionToken>,
    ) -> Result<T, ConsoleError> {
        let response = self.request(Method::POST, path, auth).send().await?;
        read_json(Method::POST, response).await
    }

    /// Make a PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        auth: Option<&SessionToken>,
        body: &B,
    ) -> Result<T, ConsoleError> {
        let response = self.request(Method::PUT, path, auth).json(body).send().await?;
        read_json(Method::PUT, response).await
    }

    /// Make a PATCH request
    pub async fn patch<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        auth: Option<&SessionToken>,
        body: &B,
    ) -> Result<T, ConsoleError> {
        let response = self.request(Method::PATCH, path, auth).json(body).send().await?;
        read_json(Method::PATCH, response).await
    }

    /// Make a DELETE request, ignoring any response body
    pub async fn delete(&self, path: &str, auth: Option<&SessionToken>) -> Result<(), ConsoleError> {
        let response = self.request(Method::DELETE, path, auth).send().await?;
        check_status(Method::DELETE, response).await?;
        Ok(())
    }

    /// Open a long-lived `text/event-stream` response
    pub async fn open_event_stream(
        &self,
        path: &str,
        auth: Option<&SessionToken>,
    ) -> Result<Response, ConsoleError> {
        let url = self.url(path);
        debug!("GET {} (event stream)", url);

        let request = self
            .stream_client
            .get(&url)
            .header(header::ACCEPT, "text/event-stream")
            .header(header::CACHE_CONTROL, "no-cache")
            .header(REQUEST_ID_HEADER, generate_uuid());
        let response = with_auth(request, auth).send().await?;
        check_status(Method::GET, response).await
    }
}

fn with_auth(request: RequestBuilder, auth: Option<&SessionToken>) -> RequestBuilder {
    match auth {
        Some(token) => request.bearer_auth(token.expose()),
        None => request,
    }
}

async fn check_status(method: Method, response: Response) -> Result<Response, ConsoleError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    error!("HTTP {} {} failed: {} - {}", method, url, status, body);
    Err(ConsoleError::api(status, body))
}

async fn read_json<T: DeserializeOwned>(method: Method, response: Response) -> Result<T, ConsoleError> {
    let response = check_status(method, response).await?;
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}
