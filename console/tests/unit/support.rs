//! Test doubles for the REST and live log collaborators

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::{Stream, StreamExt};
use openapi_client::models::{Deployment, DeploymentStatus};

use snapdeploy::errors::ConsoleError;
use snapdeploy::http::deployments::DeploymentSource;
use snapdeploy::notify::Notice;
use snapdeploy::stream::reconciler::LogFrame;
use snapdeploy::stream::source::{EventStream, LogStreamSource, StreamEvent};
use snapdeploy::viewer::view::{LogView, ScrollOutcome};

pub fn deployment(id: &str, status: DeploymentStatus, logs: &str) -> Deployment {
    Deployment {
        id: id.to_string(),
        project_id: "proj-1".to_string(),
        user_id: None,
        status,
        commit_hash: None,
        branch: Some("main".to_string()),
        logs: Some(logs.to_string()),
        error_message: None,
        created_at: None,
        updated_at: None,
    }
}

pub fn log(line: &str) -> StreamEvent {
    StreamEvent::Log {
        line: line.to_string(),
        id: None,
    }
}

/// Poll `condition` until it holds
pub async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met in time");
}

type Sender = mpsc::UnboundedSender<Result<StreamEvent, ConsoleError>>;

struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

struct Tracked {
    inner: mpsc::UnboundedReceiver<Result<StreamEvent, ConsoleError>>,
    _guard: LiveGuard,
}

impl Stream for Tracked {
    type Item = Result<StreamEvent, ConsoleError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

/// Live log source fed by the test. Counts opened and still-open streams.
#[derive(Default)]
pub struct ScriptedStreams {
    opens: AtomicUsize,
    live: Arc<AtomicUsize>,
    fail_next: Mutex<Option<ConsoleError>>,
    sender: Mutex<Option<Sender>>,
}

impl ScriptedStreams {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Streams not yet dropped by their consumer
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn fail_next_open(&self, err: ConsoleError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    /// Push an event to the most recently opened stream
    pub fn send(&self, event: StreamEvent) {
        if let Some(sender) = self.sender.lock().unwrap().as_ref() {
            let _ = sender.unbounded_send(Ok(event));
        }
    }

    pub fn send_error(&self, err: ConsoleError) {
        if let Some(sender) = self.sender.lock().unwrap().as_ref() {
            let _ = sender.unbounded_send(Err(err));
        }
    }

    /// End the current stream as if the server closed it
    pub fn end(&self) {
        self.sender.lock().unwrap().take();
    }
}

#[async_trait]
impl LogStreamSource for ScriptedStreams {
    async fn open(&self, _deployment_id: &str) -> Result<EventStream, ConsoleError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_next.lock().unwrap().take() {
            return Err(err);
        }

        let (tx, rx) = mpsc::unbounded();
        *self.sender.lock().unwrap() = Some(tx);
        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Tracked {
            inner: rx,
            _guard: LiveGuard(self.live.clone()),
        }
        .boxed())
    }
}

/// Deployment source returning the current value, with one-shot failures
pub struct ScriptedDeployments {
    current: Mutex<Deployment>,
    failures: Mutex<VecDeque<ConsoleError>>,
    fetches: AtomicUsize,
}

impl ScriptedDeployments {
    pub fn new(deployment: Deployment) -> Arc<Self> {
        Arc::new(Self {
            current: Mutex::new(deployment),
            failures: Mutex::new(VecDeque::new()),
            fetches: AtomicUsize::new(0),
        })
    }

    pub fn set(&self, deployment: Deployment) {
        *self.current.lock().unwrap() = deployment;
    }

    pub fn fail_next(&self, err: ConsoleError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeploymentSource for ScriptedDeployments {
    async fn fetch_deployment(&self, _deployment_id: &str) -> Result<Deployment, ConsoleError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        Ok(self.current.lock().unwrap().clone())
    }
}

/// View recording every call
#[derive(Default)]
pub struct RecordingView {
    pub frames: Vec<LogFrame>,
    pub notices: Vec<Notice>,
    pub scroll_attempts: usize,
}

impl LogView for RecordingView {
    fn render(&mut self, frame: &LogFrame) -> Result<(), ConsoleError> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn scroll_to_bottom(&mut self) -> ScrollOutcome {
        self.scroll_attempts += 1;
        match self.frames.last() {
            Some(frame) if !frame.text.is_empty() => ScrollOutcome::Scrolled,
            _ => ScrollOutcome::NotReady,
        }
    }

    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}
