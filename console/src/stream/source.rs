//! Live log event sources

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::debug;

use crate::authn::token_source::TokenSource;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;
use crate::http::sse::SseEvent;

/// Event name of a log line
pub const LOG_EVENT: &str = "log";

/// Event name of a liveness ping
pub const HEARTBEAT_EVENT: &str = "heartbeat";

/// An event of the deployment log stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// One line of log output, with the server's event ID when sent
    Log { line: String, id: Option<String> },

    /// Liveness only
    Heartbeat,

    /// Any other named event
    Other(String),
}

impl From<SseEvent> for StreamEvent {
    fn from(event: SseEvent) -> Self {
        match event.event.as_str() {
            LOG_EVENT => StreamEvent::Log {
                line: event.data,
                id: event.id,
            },
            HEARTBEAT_EVENT => StreamEvent::Heartbeat,
            _ => StreamEvent::Other(event.event),
        }
    }
}

/// Events of one open subscription; dropping it closes the connection
pub type EventStream = futures::stream::BoxStream<'static, Result<StreamEvent, ConsoleError>>;

/// Opens live log subscriptions, one per call
#[async_trait]
pub trait LogStreamSource: Send + Sync {
    async fn open(&self, deployment_id: &str) -> Result<EventStream, ConsoleError>;
}

/// Live logs over the backend's SSE endpoint
pub struct HttpLogStreamSource {
    client: Arc<HttpClient>,
    tokens: Arc<dyn TokenSource>,
}

impl HttpLogStreamSource {
    pub fn new(client: Arc<HttpClient>, tokens: Arc<dyn TokenSource>) -> Self {
        Self { client, tokens }
    }
}

#[async_trait]
impl LogStreamSource for HttpLogStreamSource {
    async fn open(&self, deployment_id: &str) -> Result<EventStream, ConsoleError> {
        let token = self.tokens.token().await?;
        debug!(
            "Opening log stream for deployment {} (token present: {})",
            deployment_id,
            token.is_some()
        );
        let events = self
            .client
            .stream_deployment_logs(deployment_id, token.as_ref())
            .await?;
        Ok(events.map(|event| event.map(StreamEvent::from)).boxed())
    }
}
