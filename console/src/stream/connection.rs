//! Live log stream connection: one subscription, ordered and deduplicated lines

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, trace, warn};

use crate::errors::ConsoleError;
use crate::stream::source::{EventStream, LogStreamSource, StreamEvent};

/// How repeated log lines are recognized
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupPolicy {
    /// Key on the trimmed line text. Identical lines emitted at different
    /// times collapse into one.
    #[default]
    Content,

    /// Key on the SSE event ID when the server sends one, else on content
    EventId,
}

impl std::str::FromStr for DedupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "content" => Ok(DedupPolicy::Content),
            "event-id" | "event_id" | "id" => Ok(DedupPolicy::EventId),
            _ => Err(format!("Invalid dedup policy: {}", s)),
        }
    }
}

type DedupKey = [u8; 32];

fn dedup_key(policy: DedupPolicy, line: &str, id: Option<&str>) -> DedupKey {
    let mut hasher = Sha256::new();
    match (policy, id.filter(|id| !id.is_empty())) {
        (DedupPolicy::EventId, Some(id)) => {
            hasher.update(b"id\0");
            hasher.update(id.as_bytes());
        }
        _ => {
            hasher.update(b"line\0");
            hasher.update(line.trim().as_bytes());
        }
    }
    hasher.finalize().into()
}

/// What a connection update did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionUpdate {
    /// The subscription is established
    Opened,

    /// A new line was appended; carries the line count
    Appended(usize),

    /// A line was dropped as already seen
    Duplicate,

    Heartbeat,

    /// Unhandled named event
    Ignored(String),

    /// The connection failed or ended and was closed; no retry follows
    Failed(String),
}

enum Link {
    Idle,
    Connecting(BoxFuture<'static, Result<EventStream, ConsoleError>>),
    Open(EventStream),
    Failed,
}

/// A single live log subscription scoped to one deployment.
///
/// The connection is held from `open` until `close`, including after a
/// failure, so repeated `open` calls never create a second subscription.
pub struct LogStreamConnection {
    source: Arc<dyn LogStreamSource>,
    policy: DedupPolicy,
    deployment_id: Option<String>,
    link: Link,
    lines: Vec<String>,
    seen: HashSet<DedupKey>,
    connected: bool,
    error: Option<String>,
    duplicates: usize,
}

impl LogStreamConnection {
    pub fn new(source: Arc<dyn LogStreamSource>, policy: DedupPolicy) -> Self {
        Self {
            source,
            policy,
            deployment_id: None,
            link: Link::Idle,
            lines: Vec::new(),
            seen: HashSet::new(),
            connected: false,
            error: None,
            duplicates: 0,
        }
    }

    /// Start a subscription. A no-op returning `false` while one is held.
    pub fn open(&mut self, deployment_id: &str) -> bool {
        if let Some(current) = &self.deployment_id {
            debug!(
                "Log stream for deployment {} already connecting or connected, skipping",
                current
            );
            return false;
        }

        info!("Connecting to log stream for deployment {}", deployment_id);
        self.lines.clear();
        self.seen.clear();
        self.duplicates = 0;
        self.error = None;
        self.connected = false;
        self.deployment_id = Some(deployment_id.to_string());

        let source = self.source.clone();
        let id = deployment_id.to_string();
        self.link = Link::Connecting(Box::pin(async move { source.open(&id).await }));
        true
    }

    /// Hold exactly one subscription for `deployment_id` while `enabled`.
    ///
    /// Returns `true` when a new subscription was started.
    pub fn ensure_connected(&mut self, deployment_id: &str, enabled: bool) -> bool {
        if !enabled {
            if self.is_held() {
                self.close();
            }
            return false;
        }
        if self
            .deployment_id
            .as_deref()
            .is_some_and(|current| current != deployment_id)
        {
            self.close();
        }
        self.open(deployment_id)
    }

    /// Close the subscription and forget its lines and dedup state
    pub fn close(&mut self) {
        if let Some(id) = self.deployment_id.take() {
            debug!("Closing log stream for deployment {}", id);
        }
        self.link = Link::Idle;
        self.lines.clear();
        self.seen.clear();
        self.connected = false;
    }

    /// Wait for the next change. Pending forever while nothing is open.
    ///
    /// Cancel-safe: an interrupted wait loses no event.
    pub async fn next_update(&mut self) -> ConnectionUpdate {
        match &mut self.link {
            Link::Connecting(opening) => match opening.await {
                Ok(events) => {
                    info!("Log stream connected");
                    self.link = Link::Open(events);
                    self.connected = true;
                    self.error = None;
                    ConnectionUpdate::Opened
                }
                Err(e) => self.fail(e.to_string()),
            },
            Link::Open(events) => match events.next().await {
                Some(Ok(event)) => self.ingest(event),
                Some(Err(e)) => self.fail(e.to_string()),
                None => self.fail("log stream closed by server".to_string()),
            },
            Link::Idle | Link::Failed => futures::future::pending().await,
        }
    }

    /// Apply one stream event
    pub fn ingest(&mut self, event: StreamEvent) -> ConnectionUpdate {
        match event {
            StreamEvent::Log { line, id } => {
                let key = dedup_key(self.policy, &line, id.as_deref());
                if !self.seen.insert(key) {
                    self.duplicates += 1;
                    trace!("Skipping duplicate log line: {}", line.trim());
                    return ConnectionUpdate::Duplicate;
                }
                self.lines.push(line);
                ConnectionUpdate::Appended(self.lines.len())
            }
            StreamEvent::Heartbeat => {
                trace!("Heartbeat received");
                ConnectionUpdate::Heartbeat
            }
            StreamEvent::Other(name) => {
                debug!("Ignoring stream event {:?}", name);
                ConnectionUpdate::Ignored(name)
            }
        }
    }

    fn fail(&mut self, message: String) -> ConnectionUpdate {
        warn!("Log stream error: {}", message);
        self.link = Link::Failed;
        self.connected = false;
        self.error = Some(message.clone());
        ConnectionUpdate::Failed(message)
    }

    /// Lines in first-seen order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines joined for display
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether a subscription is pending, open or failed-but-unclosed
    pub fn is_held(&self) -> bool {
        self.deployment_id.is_some()
    }

    /// Whether the underlying transport is pending or open
    pub fn has_transport(&self) -> bool {
        matches!(self.link, Link::Connecting(_) | Link::Open(_))
    }

    pub fn deployment_id(&self) -> Option<&str> {
        self.deployment_id.as_deref()
    }

    /// Last connection error, cleared by the next `open`
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Lines dropped as duplicates since the last `open`
    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }
}

impl Drop for LogStreamConnection {
    fn drop(&mut self) {
        self.close();
    }
}
