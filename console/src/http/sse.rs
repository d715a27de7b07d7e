//! Server-sent events: incremental parser and the deployment log stream

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::authn::session_token::SessionToken;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;

/// Event name used when a message has no `event:` field
pub const DEFAULT_EVENT: &str = "message";

/// One dispatched server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
    pub retry_ms: Option<u64>,
}

/// Decoded events of an open stream
pub type SseStream = BoxStream<'static, Result<SseEvent, ConsoleError>>;

#[derive(Debug, Default)]
struct PendingEvent {
    event: Option<String>,
    data: Vec<String>,
    id: Option<String>,
    retry_ms: Option<u64>,
}

impl PendingEvent {
    fn is_empty(&self) -> bool {
        self.event.is_none() && self.data.is_empty()
    }
}

/// Incremental `text/event-stream` parser.
///
/// Chunks may split lines, CRLF pairs and UTF-8 sequences anywhere.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: Vec<u8>,
    pending: PendingEvent,
    skip_lf: bool,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every event completed by them
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        let mut out = Vec::new();
        for &byte in chunk {
            if self.skip_lf {
                self.skip_lf = false;
                if byte == b'\n' {
                    continue;
                }
            }
            match byte {
                b'\n' => self.end_line(&mut out),
                b'\r' => {
                    self.skip_lf = true;
                    self.end_line(&mut out);
                }
                _ => self.buffer.push(byte),
            }
        }
        out
    }

    fn end_line(&mut self, out: &mut Vec<SseEvent>) {
        let line = String::from_utf8_lossy(&self.buffer).into_owned();
        self.buffer.clear();

        if line.is_empty() {
            if let Some(event) = self.dispatch() {
                out.push(event);
            }
            return;
        }
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line.as_str(), ""),
        };

        match field {
            "event" => self.pending.event = Some(value.to_string()),
            "data" => self.pending.data.push(value.to_string()),
            "id" if !value.contains('\0') => self.pending.id = Some(value.to_string()),
            "retry" => {
                if let Ok(ms) = value.parse() {
                    self.pending.retry_ms = Some(ms);
                }
            }
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return None;
        }
        Some(SseEvent {
            event: pending
                .event
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
            data: pending.data.join("\n"),
            id: pending.id,
            retry_ms: pending.retry_ms,
        })
    }
}

/// Turn a byte stream into a stream of parsed events
pub fn decode_stream<S>(bytes: S) -> SseStream
where
    S: futures::Stream<Item = Result<Bytes, ConsoleError>> + Send + 'static,
{
    bytes
        .scan(SseParser::new(), |parser, chunk| {
            let events: Vec<Result<SseEvent, ConsoleError>> = match chunk {
                Ok(chunk) => parser.push_chunk(&chunk).into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            futures::future::ready(Some(stream::iter(events)))
        })
        .flatten()
        .boxed()
}

impl HttpClient {
    /// Live log stream of one deployment
    pub async fn stream_deployment_logs(
        &self,
        deployment_id: &str,
        auth: Option<&SessionToken>,
    ) -> Result<SseStream, ConsoleError> {
        let path = format!("/deployments/{}/logs/stream", deployment_id);
        let response = self.open_event_stream(&path, auth).await?;
        Ok(decode_stream(response.bytes_stream().map_err(ConsoleError::from)))
    }
}
