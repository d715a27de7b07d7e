//! Log viewer session: polls the deployment, follows the live stream and
//! keeps one reconciled view on screen

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use openapi_client::models::{Deployment, DeploymentStatus};
use serde::Serialize;
use tokio::time::{MissedTickBehavior, Sleep};
use tracing::{debug, info, warn};

use crate::errors::ConsoleError;
use crate::http::deployments::DeploymentSource;
use crate::models::deployment::StatusExt;
use crate::notify::Notice;
use crate::stream::connection::{ConnectionUpdate, LogStreamConnection};
use crate::stream::reconciler::{LogFrame, LogReconciler, LogSource, ReconcileInput};
use crate::viewer::view::{LogView, ScrollOutcome};

/// Viewer session options
#[derive(Debug, Clone)]
pub struct Options {
    /// Status and snapshot refresh interval
    pub poll_interval: Duration,

    /// Follow the live stream while the deployment is in progress
    pub streaming: bool,

    /// Keep running until the deployment is terminal
    pub follow: bool,

    /// Delays of the scroll-to-bottom attempts
    pub scroll_retry_delays: Vec<Duration>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            streaming: true,
            follow: true,
            scroll_retry_delays: vec![
                Duration::from_millis(100),
                Duration::from_millis(300),
                Duration::from_millis(500),
            ],
        }
    }
}

/// Outcome of a finished session
#[derive(Debug, Clone, Serialize)]
pub struct ViewerSummary {
    pub deployment_id: String,
    pub status: DeploymentStatus,
    pub source: LogSource,
    /// Text displayed last
    pub text: String,
    pub lines_streamed: usize,
    pub duplicates_dropped: usize,
    pub polls: u64,
    pub scrolled: bool,
}

/// Run a viewer until the deployment settles or the shutdown signal fires.
///
/// The connection is closed on every exit path.
pub async fn run(
    options: &Options,
    deployment_id: &str,
    deployments: &dyn DeploymentSource,
    connection: &mut LogStreamConnection,
    view: &mut dyn LogView,
    shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) -> Result<ViewerSummary, ConsoleError> {
    let result = drive(
        options,
        deployment_id,
        deployments,
        &mut *connection,
        view,
        shutdown_signal,
    )
    .await;
    connection.close();
    result
}

async fn drive(
    options: &Options,
    deployment_id: &str,
    deployments: &dyn DeploymentSource,
    connection: &mut LogStreamConnection,
    view: &mut dyn LogView,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) -> Result<ViewerSummary, ConsoleError> {
    info!("Opening log viewer for deployment {}", deployment_id);

    let deployment = deployments.fetch_deployment(deployment_id).await?;
    let mut session = Session {
        options,
        deployment_id,
        connection,
        view,
        deployment,
        reconciler: LogReconciler::new(),
        last_frame: None,
        scrolls: FuturesUnordered::new(),
        scrolled: false,
        polls: 1,
        lines_streamed: 0,
    };
    session.sync_connection();
    session.refresh()?;

    let mut ticker = tokio::time::interval(options.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        let finished = session.finished();
        if finished && session.scrolls.is_empty() {
            break;
        }

        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Log viewer shutting down...");
                break;
            }
            _ = ticker.tick(), if !finished => {
                session.poll(deployments).await?;
            }
            update = session.connection.next_update() => {
                session.on_update(update)?;
            }
            Some(()) = session.scrolls.next(), if !session.scrolls.is_empty() => {
                session.on_scroll_timer();
            }
        }
    }

    Ok(session.summary())
}

struct Session<'a> {
    options: &'a Options,
    deployment_id: &'a str,
    connection: &'a mut LogStreamConnection,
    view: &'a mut dyn LogView,
    deployment: Deployment,
    reconciler: LogReconciler,
    last_frame: Option<LogFrame>,
    scrolls: FuturesUnordered<Sleep>,
    scrolled: bool,
    polls: u64,
    lines_streamed: usize,
}

impl Session<'_> {
    fn finished(&self) -> bool {
        !self.options.follow || self.deployment.status.is_terminal()
    }

    fn streaming_enabled(&self) -> bool {
        self.options.streaming && self.options.follow
    }

    fn sync_connection(&mut self) {
        let enabled = self.streaming_enabled() && self.deployment.status.is_in_progress();
        self.connection.ensure_connected(self.deployment_id, enabled);
    }

    async fn poll(&mut self, deployments: &dyn DeploymentSource) -> Result<(), ConsoleError> {
        debug!("Refreshing deployment {}", self.deployment_id);
        match deployments.fetch_deployment(self.deployment_id).await {
            Ok(deployment) => {
                if deployment.status != self.deployment.status {
                    info!(
                        "Deployment {} is now {}",
                        self.deployment_id, deployment.status
                    );
                }
                self.deployment = deployment;
                self.polls += 1;
                self.sync_connection();
                self.refresh()
            }
            Err(e) => {
                warn!("Failed to refresh deployment {}: {}", self.deployment_id, e);
                self.view
                    .notify(&Notice::from_error("Failed to refresh deployment", &e));
                Ok(())
            }
        }
    }

    fn on_update(&mut self, update: ConnectionUpdate) -> Result<(), ConsoleError> {
        match update {
            ConnectionUpdate::Opened => self.refresh(),
            ConnectionUpdate::Appended(_) => {
                self.lines_streamed += 1;
                self.refresh()
            }
            ConnectionUpdate::Failed(message) => {
                self.view.notify(
                    &Notice::warning("Live log stream disconnected").with_description(message),
                );
                self.refresh()
            }
            ConnectionUpdate::Duplicate
            | ConnectionUpdate::Heartbeat
            | ConnectionUpdate::Ignored(_) => Ok(()),
        }
    }

    fn on_scroll_timer(&mut self) {
        match self.view.scroll_to_bottom() {
            ScrollOutcome::Scrolled => self.scrolled = true,
            ScrollOutcome::NotReady => debug!("Log view not ready to scroll"),
        }
    }

    /// Reconcile and render when the frame changed
    fn refresh(&mut self) -> Result<(), ConsoleError> {
        let input = ReconcileInput {
            status: Some(self.deployment.status),
            streaming_enabled: self.streaming_enabled(),
            connected: self.connection.is_connected(),
            stream_lines: self.connection.lines(),
            snapshot: self.deployment.logs.as_deref(),
        };
        let reconciled = self.reconciler.tick(&input);

        if reconciled.scroll_to_bottom {
            for delay in &self.options.scroll_retry_delays {
                self.scrolls.push(tokio::time::sleep(*delay));
            }
        }

        if self.last_frame.as_ref() != Some(&reconciled.frame) {
            self.view.render(&reconciled.frame)?;
            self.last_frame = Some(reconciled.frame);
        }
        Ok(())
    }

    fn summary(&self) -> ViewerSummary {
        let (source, text) = match &self.last_frame {
            Some(frame) => (frame.source, frame.text.clone()),
            None => (LogSource::Snapshot, String::new()),
        };
        ViewerSummary {
            deployment_id: self.deployment_id.to_string(),
            status: self.deployment.status,
            source,
            text,
            lines_streamed: self.lines_streamed,
            duplicates_dropped: self.connection.duplicates_dropped(),
            polls: self.polls,
            scrolled: self.scrolled,
        }
    }
}
