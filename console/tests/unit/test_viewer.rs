//! Viewer session tests

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use openapi_client::models::DeploymentStatus;
use tokio::sync::oneshot;

use snapdeploy::errors::ConsoleError;
use snapdeploy::notify::Severity;
use snapdeploy::stream::connection::{DedupPolicy, LogStreamConnection};
use snapdeploy::stream::reconciler::{Connectivity, LogSource};
use snapdeploy::viewer::session::{self, Options};

use crate::support::{deployment, log, wait_for, RecordingView, ScriptedDeployments, ScriptedStreams};

fn options() -> Options {
    Options {
        poll_interval: Duration::from_millis(10),
        streaming: true,
        follow: true,
        scroll_retry_delays: vec![
            Duration::from_millis(1),
            Duration::from_millis(3),
            Duration::from_millis(5),
        ],
    }
}

fn never() -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(std::future::pending())
}

async fn within<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("viewer did not finish in time")
}

#[tokio::test]
async fn test_follows_stream_then_switches_to_snapshot() {
    let deployments = ScriptedDeployments::new(deployment("dep-1", DeploymentStatus::Building, ""));
    let streams = ScriptedStreams::new();
    let mut connection = LogStreamConnection::new(streams.clone(), DedupPolicy::Content);
    let mut view = RecordingView::default();
    let options = options();

    let driver = async {
        wait_for(|| streams.opens() == 1).await;
        streams.send(log("Step 1"));
        streams.send(log("Step 1"));
        streams.send(log("Step 2"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        deployments.set(deployment(
            "dep-1",
            DeploymentStatus::Deployed,
            "Step 1\nStep 2\nDone",
        ));
    };
    let viewer = session::run(
        &options,
        "dep-1",
        deployments.as_ref(),
        &mut connection,
        &mut view,
        never(),
    );

    let (summary, ()) = within(async { tokio::join!(viewer, driver) }).await;
    let summary = summary.unwrap();

    assert_eq!(summary.status, DeploymentStatus::Deployed);
    assert_eq!(summary.source, LogSource::Snapshot);
    assert_eq!(summary.text, "Step 1\nStep 2\nDone");
    assert_eq!(summary.lines_streamed, 2);
    assert_eq!(summary.duplicates_dropped, 1);
    assert!(summary.scrolled);

    assert!(view
        .frames
        .iter()
        .any(|f| f.source == LogSource::Live && f.text == "Step 1\nStep 2"));
    assert!(view.frames.iter().any(|f| f.connectivity == Connectivity::Connecting));
    let last = view.frames.last().unwrap();
    assert_eq!(last.connectivity, Connectivity::Hidden);
    assert!(view.scroll_attempts >= 3);

    assert!(!connection.is_held());
    assert_eq!(streams.live(), 0);
    assert_eq!(streams.opens(), 1);
}

#[tokio::test]
async fn test_streaming_disabled_only_polls() {
    let deployments =
        ScriptedDeployments::new(deployment("dep-1", DeploymentStatus::Building, "Cloning..."));
    let streams = ScriptedStreams::new();
    let mut connection = LogStreamConnection::new(streams.clone(), DedupPolicy::Content);
    let mut view = RecordingView::default();
    let options = Options {
        streaming: false,
        ..options()
    };

    let driver = async {
        wait_for(|| deployments.fetches() >= 3).await;
        deployments.set(deployment(
            "dep-1",
            DeploymentStatus::Failed,
            "Cloning...\nnpm ERR! missing script: build",
        ));
    };
    let viewer = session::run(
        &options,
        "dep-1",
        deployments.as_ref(),
        &mut connection,
        &mut view,
        never(),
    );

    let (summary, ()) = within(async { tokio::join!(viewer, driver) }).await;
    let summary = summary.unwrap();

    assert_eq!(streams.opens(), 0);
    assert!(view.frames.iter().all(|f| f.source == LogSource::Snapshot));
    assert!(view.frames.iter().all(|f| f.connectivity == Connectivity::Hidden));
    assert_eq!(summary.status, DeploymentStatus::Failed);
    assert_eq!(summary.text, "Cloning...\nnpm ERR! missing script: build");
}

#[tokio::test]
async fn test_shutdown_closes_the_stream() {
    let deployments = ScriptedDeployments::new(deployment("dep-1", DeploymentStatus::Deploying, ""));
    let streams = ScriptedStreams::new();
    let mut connection = LogStreamConnection::new(streams.clone(), DedupPolicy::Content);
    let mut view = RecordingView::default();
    let options = options();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let driver = async {
        wait_for(|| streams.opens() == 1).await;
        streams.send(log("Starting container"));
        tokio::time::sleep(Duration::from_millis(30)).await;
        let _ = shutdown_tx.send(());
    };
    let viewer = session::run(
        &options,
        "dep-1",
        deployments.as_ref(),
        &mut connection,
        &mut view,
        Box::pin(async move {
            let _ = shutdown_rx.await;
        }),
    );

    let (summary, ()) = within(async { tokio::join!(viewer, driver) }).await;
    let summary = summary.unwrap();

    assert_eq!(summary.status, DeploymentStatus::Deploying);
    assert_eq!(summary.source, LogSource::Live);
    assert_eq!(summary.text, "Starting container");
    assert!(!connection.is_held());
    assert_eq!(streams.live(), 0);
}

#[tokio::test]
async fn test_without_follow_prints_snapshot_once() {
    let deployments =
        ScriptedDeployments::new(deployment("dep-1", DeploymentStatus::Building, "Cloning..."));
    let streams = ScriptedStreams::new();
    let mut connection = LogStreamConnection::new(streams.clone(), DedupPolicy::Content);
    let mut view = RecordingView::default();
    let options = Options {
        follow: false,
        ..options()
    };

    let summary = within(session::run(
        &options,
        "dep-1",
        deployments.as_ref(),
        &mut connection,
        &mut view,
        never(),
    ))
    .await
    .unwrap();

    assert_eq!(summary.text, "Cloning...");
    assert_eq!(summary.polls, 1);
    assert_eq!(deployments.fetches(), 1);
    assert_eq!(streams.opens(), 0);
    assert_eq!(view.frames.len(), 1);
}

#[tokio::test]
async fn test_first_fetch_failure_ends_the_session() {
    let deployments = ScriptedDeployments::new(deployment("dep-1", DeploymentStatus::Building, ""));
    deployments.fail_next(ConsoleError::NotFound("deployment dep-1".to_string()));
    let streams = ScriptedStreams::new();
    let mut connection = LogStreamConnection::new(streams.clone(), DedupPolicy::Content);
    let mut view = RecordingView::default();

    let result = within(session::run(
        &options(),
        "dep-1",
        deployments.as_ref(),
        &mut connection,
        &mut view,
        never(),
    ))
    .await;

    assert!(matches!(result, Err(ConsoleError::NotFound(_))));
    assert!(view.frames.is_empty());
    assert_eq!(streams.opens(), 0);
}

#[tokio::test]
async fn test_later_fetch_failures_become_notices() {
    let deployments = ScriptedDeployments::new(deployment("dep-1", DeploymentStatus::Pending, ""));
    let streams = ScriptedStreams::new();
    let mut connection = LogStreamConnection::new(streams.clone(), DedupPolicy::Content);
    let mut view = RecordingView::default();
    let options = Options {
        streaming: false,
        ..options()
    };

    let driver = async {
        wait_for(|| deployments.fetches() >= 1).await;
        deployments.fail_next(ConsoleError::StreamError("timeout".to_string()));
        wait_for(|| deployments.fetches() >= 4).await;
        deployments.set(deployment("dep-1", DeploymentStatus::RolledBack, "rolled back"));
    };
    let viewer = session::run(
        &options,
        "dep-1",
        deployments.as_ref(),
        &mut connection,
        &mut view,
        never(),
    );

    let (summary, ()) = within(async { tokio::join!(viewer, driver) }).await;
    let summary = summary.unwrap();

    assert_eq!(summary.status, DeploymentStatus::RolledBack);
    assert_eq!(view.notices.len(), 1);
    assert_eq!(view.notices[0].title, "Failed to refresh deployment");
}

#[tokio::test]
async fn test_stream_failure_falls_back_without_reconnecting() {
    let deployments =
        ScriptedDeployments::new(deployment("dep-1", DeploymentStatus::Building, "persisted"));
    let streams = ScriptedStreams::new();
    let mut connection = LogStreamConnection::new(streams.clone(), DedupPolicy::Content);
    let mut view = RecordingView::default();
    let options = options();

    let driver = async {
        wait_for(|| streams.opens() == 1).await;
        streams.send(log("Step 1"));
        tokio::time::sleep(Duration::from_millis(20)).await;
        streams.end();
        // Several polls while still building
        let polled = deployments.fetches();
        wait_for(|| deployments.fetches() >= polled + 3).await;
        deployments.set(deployment("dep-1", DeploymentStatus::Deployed, "persisted\ndone"));
    };
    let viewer = session::run(
        &options,
        "dep-1",
        deployments.as_ref(),
        &mut connection,
        &mut view,
        never(),
    );

    let (summary, ()) = within(async { tokio::join!(viewer, driver) }).await;
    summary.unwrap();

    assert_eq!(streams.opens(), 1);
    assert!(view
        .notices
        .iter()
        .any(|n| n.severity == Severity::Warning && n.title == "Live log stream disconnected"));
    assert!(view.frames.iter().any(|f| f.source == LogSource::Snapshot
        && f.text == "persisted"
        && f.connectivity == Connectivity::Connecting));
}
