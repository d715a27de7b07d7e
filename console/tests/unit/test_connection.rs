//! Live log connection tests

use std::time::Duration;

use snapdeploy::errors::ConsoleError;
use snapdeploy::stream::connection::{ConnectionUpdate, DedupPolicy, LogStreamConnection};
use snapdeploy::stream::source::StreamEvent;

use crate::support::{log, ScriptedStreams};

async fn opened(streams: &std::sync::Arc<ScriptedStreams>) -> LogStreamConnection {
    let mut connection = LogStreamConnection::new(streams.clone(), DedupPolicy::Content);
    assert!(connection.open("dep-1"));
    assert_eq!(connection.next_update().await, ConnectionUpdate::Opened);
    assert!(connection.is_connected());
    connection
}

#[tokio::test]
async fn test_duplicate_lines_are_kept_once_in_order() {
    let streams = ScriptedStreams::new();
    let mut connection = opened(&streams).await;

    streams.send(log("Installing deps..."));
    streams.send(log("Installing deps..."));
    streams.send(log("  Installing deps...  "));
    streams.send(log("Build complete"));

    assert_eq!(connection.next_update().await, ConnectionUpdate::Appended(1));
    assert_eq!(connection.next_update().await, ConnectionUpdate::Duplicate);
    assert_eq!(connection.next_update().await, ConnectionUpdate::Duplicate);
    assert_eq!(connection.next_update().await, ConnectionUpdate::Appended(2));

    assert_eq!(connection.lines(), ["Installing deps...", "Build complete"]);
    assert_eq!(connection.text(), "Installing deps...\nBuild complete");
    assert_eq!(connection.duplicates_dropped(), 2);
}

#[tokio::test]
async fn test_heartbeat_and_other_events_change_nothing() {
    let streams = ScriptedStreams::new();
    let mut connection = opened(&streams).await;

    streams.send(StreamEvent::Heartbeat);
    streams.send(StreamEvent::Other("message".to_string()));

    assert_eq!(connection.next_update().await, ConnectionUpdate::Heartbeat);
    assert_eq!(
        connection.next_update().await,
        ConnectionUpdate::Ignored("message".to_string())
    );
    assert!(connection.lines().is_empty());
    assert!(connection.is_connected());
}

#[tokio::test]
async fn test_second_open_is_a_no_op() {
    let streams = ScriptedStreams::new();
    let mut connection = LogStreamConnection::new(streams.clone(), DedupPolicy::Content);

    assert!(connection.open("dep-1"));
    // Still pending
    assert!(!connection.open("dep-1"));
    assert_eq!(connection.next_update().await, ConnectionUpdate::Opened);
    // Active
    assert!(!connection.open("dep-1"));
    assert!(!connection.ensure_connected("dep-1", true));

    assert_eq!(streams.opens(), 1);
    assert_eq!(streams.live(), 1);
}

#[tokio::test]
async fn test_failed_open_is_not_retried() {
    let streams = ScriptedStreams::new();
    streams.fail_next_open(ConsoleError::StreamError("connection refused".to_string()));

    let mut connection = LogStreamConnection::new(streams.clone(), DedupPolicy::Content);
    assert!(connection.open("dep-1"));
    let update = connection.next_update().await;
    assert!(matches!(update, ConnectionUpdate::Failed(ref m) if m.contains("connection refused")));

    assert!(!connection.is_connected());
    assert!(connection.error().is_some());
    assert!(!connection.has_transport());

    // Held until closed: no reconnect
    assert!(!connection.ensure_connected("dep-1", true));
    let idle = tokio::time::timeout(Duration::from_millis(30), connection.next_update()).await;
    assert!(idle.is_err());
    assert_eq!(streams.opens(), 1);

    connection.close();
    assert!(connection.open("dep-1"));
    assert_eq!(connection.next_update().await, ConnectionUpdate::Opened);
    assert!(connection.error().is_none());
    assert_eq!(streams.opens(), 2);
}

#[tokio::test]
async fn test_stream_error_closes_the_transport() {
    let streams = ScriptedStreams::new();
    let mut connection = opened(&streams).await;

    streams.send(log("Step 1"));
    streams.send_error(ConsoleError::StreamError("reset by peer".to_string()));

    assert_eq!(connection.next_update().await, ConnectionUpdate::Appended(1));
    assert!(matches!(connection.next_update().await, ConnectionUpdate::Failed(_)));
    assert!(!connection.is_connected());
    assert_eq!(streams.live(), 0);
    // Lines stay until close
    assert_eq!(connection.lines(), ["Step 1"]);
}

#[tokio::test]
async fn test_server_ending_the_stream_is_an_error() {
    let streams = ScriptedStreams::new();
    let mut connection = opened(&streams).await;

    streams.end();
    let update = connection.next_update().await;
    assert_eq!(
        update,
        ConnectionUpdate::Failed("log stream closed by server".to_string())
    );
    assert!(!connection.is_connected());
    assert_eq!(streams.live(), 0);
}

#[tokio::test]
async fn test_close_clears_lines_and_dedup_state() {
    let streams = ScriptedStreams::new();
    let mut connection = opened(&streams).await;

    streams.send(log("Step 1"));
    assert_eq!(connection.next_update().await, ConnectionUpdate::Appended(1));

    connection.close();
    assert!(connection.lines().is_empty());
    assert!(!connection.is_connected());
    assert!(!connection.is_held());
    assert_eq!(streams.live(), 0);

    assert!(connection.open("dep-1"));
    assert_eq!(connection.next_update().await, ConnectionUpdate::Opened);
    streams.send(log("Step 1"));
    assert_eq!(connection.next_update().await, ConnectionUpdate::Appended(1));
}

#[tokio::test]
async fn test_repeated_mount_cycles_leak_nothing() {
    let streams = ScriptedStreams::new();

    for cycle in 1..=5 {
        let mut connection = LogStreamConnection::new(streams.clone(), DedupPolicy::Content);
        assert!(connection.ensure_connected("dep-1", true));
        assert_eq!(connection.next_update().await, ConnectionUpdate::Opened);
        assert_eq!(streams.live(), 1);

        if cycle % 2 == 0 {
            // Disabled
            connection.ensure_connected("dep-1", false);
            assert!(!connection.is_held());
        } else {
            // Unmounted
            drop(connection);
        }
        assert_eq!(streams.live(), 0);
    }
    assert_eq!(streams.opens(), 5);
}

#[tokio::test]
async fn test_switching_deployment_replaces_the_subscription() {
    let streams = ScriptedStreams::new();
    let mut connection = opened(&streams).await;
    streams.send(log("from dep-1"));
    assert_eq!(connection.next_update().await, ConnectionUpdate::Appended(1));

    assert!(connection.ensure_connected("dep-2", true));
    assert_eq!(connection.deployment_id(), Some("dep-2"));
    assert!(connection.lines().is_empty());
    assert_eq!(connection.next_update().await, ConnectionUpdate::Opened);
    assert_eq!(streams.opens(), 2);
    assert_eq!(streams.live(), 1);
}

#[tokio::test]
async fn test_event_id_policy_keeps_repeated_lines() {
    let streams = ScriptedStreams::new();
    let mut connection = LogStreamConnection::new(streams.clone(), DedupPolicy::EventId);
    assert!(connection.open("dep-1"));
    assert_eq!(connection.next_update().await, ConnectionUpdate::Opened);

    for id in ["1", "2", "2"] {
        streams.send(StreamEvent::Log {
            line: "Retrying...".to_string(),
            id: Some(id.to_string()),
        });
    }
    assert_eq!(connection.next_update().await, ConnectionUpdate::Appended(1));
    assert_eq!(connection.next_update().await, ConnectionUpdate::Appended(2));
    assert_eq!(connection.next_update().await, ConnectionUpdate::Duplicate);
    assert_eq!(connection.policy(), DedupPolicy::EventId);
}

#[test]
fn test_idle_connection_never_yields() {
    let streams = ScriptedStreams::new();
    let mut connection = LogStreamConnection::new(streams.clone(), DedupPolicy::Content);
    {
        let mut update = tokio_test::task::spawn(connection.next_update());
        tokio_test::assert_pending!(update.poll());
        tokio_test::assert_pending!(update.poll());
    }
    assert!(!connection.is_held());
    assert_eq!(streams.opens(), 0);
}
