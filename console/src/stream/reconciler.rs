//! Chooses the authoritative log source and decides when to scroll

use openapi_client::models::DeploymentStatus;
use serde::Serialize;

use crate::models::deployment::{is_in_progress, is_terminal};

/// Where the displayed text came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    /// Persisted log text fetched over REST
    Snapshot,
    /// Lines received on the live stream
    Live,
}

/// Live stream indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Not shown: the deployment is not in progress
    Hidden,
    Live,
    /// Connection pending, or lost and awaiting a new subscription
    Connecting,
}

/// Everything the reconciler looks at in one evaluation
#[derive(Debug, Clone, Copy)]
pub struct ReconcileInput<'a> {
    pub status: Option<DeploymentStatus>,
    pub streaming_enabled: bool,
    pub connected: bool,
    pub stream_lines: &'a [String],
    pub snapshot: Option<&'a str>,
}

/// What the viewer displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFrame {
    pub text: String,
    pub source: LogSource,
    pub connectivity: Connectivity,
    pub status: Option<DeploymentStatus>,
}

/// Result of one evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub frame: LogFrame,
    /// Ask the view to scroll to the bottom
    pub scroll_to_bottom: bool,
}

/// Pick exactly one source; the two are never concatenated
pub fn select_source(input: &ReconcileInput<'_>) -> LogSource {
    if is_terminal(input.status) || !input.streaming_enabled {
        return LogSource::Snapshot;
    }
    if is_in_progress(input.status) && input.connected && !input.stream_lines.is_empty() {
        return LogSource::Live;
    }
    LogSource::Snapshot
}

/// Shown only while a live subscription is wanted for an in-progress deployment
pub fn connectivity(input: &ReconcileInput<'_>) -> Connectivity {
    if !input.streaming_enabled {
        return Connectivity::Hidden;
    }
    match (is_in_progress(input.status), input.connected) {
        (false, _) => Connectivity::Hidden,
        (true, true) => Connectivity::Live,
        (true, false) => Connectivity::Connecting,
    }
}

/// Build the frame for one evaluation, without scroll tracking
pub fn frame(input: &ReconcileInput<'_>) -> LogFrame {
    let source = select_source(input);
    let text = match source {
        LogSource::Live => input.stream_lines.join("\n"),
        LogSource::Snapshot => input.snapshot.unwrap_or_default().to_string(),
    };
    LogFrame {
        text,
        source,
        connectivity: connectivity(input),
        status: input.status,
    }
}

/// Stateful reconciler remembering the previous evaluation
#[derive(Debug, Default)]
pub struct LogReconciler {
    previous_in_progress: Option<bool>,
    previous_len: usize,
}

impl LogReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, input: &ReconcileInput<'_>) -> Reconciled {
        let frame = frame(input);
        let in_progress = is_in_progress(input.status);
        let was_in_progress = self.previous_in_progress.unwrap_or(false);

        let finalized = was_in_progress && !in_progress;
        let loaded = !was_in_progress && !in_progress && frame.text.len() > self.previous_len;
        let scroll_to_bottom = (finalized || loaded) && !frame.text.is_empty();

        self.previous_in_progress = Some(in_progress);
        self.previous_len = frame.text.len();

        Reconciled {
            frame,
            scroll_to_bottom,
        }
    }
}
