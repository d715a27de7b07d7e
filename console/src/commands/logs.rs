//! `snapdeploy logs ID`

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use clap::Args;

use crate::app::context::AppContext;
use crate::errors::ConsoleError;
use crate::filesys::file::File;
use crate::http::deployments::HttpDeploymentSource;
use crate::notify::Notice;
use crate::stream::connection::{DedupPolicy, LogStreamConnection};
use crate::stream::source::HttpLogStreamSource;
use crate::viewer::session;
use crate::viewer::view::TerminalView;

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Deployment ID
    pub id: String,

    /// Keep watching until the deployment finishes
    #[arg(short, long)]
    pub follow: bool,

    /// Only poll the saved log, never open the live stream
    #[arg(long)]
    pub no_stream: bool,

    /// Write the final log to PATH (default `deployment-<ID>-logs.txt`)
    #[arg(long, value_name = "PATH")]
    pub save: Option<Option<PathBuf>>,

    /// Status polling interval in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(100..))]
    pub poll_ms: Option<u64>,

    /// Duplicate line detection: content or event-id
    #[arg(long)]
    pub dedup: Option<DedupPolicy>,
}

/// File name used by `--save` without a path
pub fn default_save_path(deployment_id: &str) -> PathBuf {
    PathBuf::from(format!("deployment-{}-logs.txt", deployment_id))
}

pub async fn run(
    ctx: &AppContext,
    args: LogsArgs,
    shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) -> Result<(), ConsoleError> {
    let options = ctx
        .options
        .viewer
        .session(args.follow, args.no_stream, args.poll_ms);
    let policy = args.dedup.unwrap_or(ctx.options.viewer.dedup);

    let deployments = HttpDeploymentSource::new(ctx.client.clone(), ctx.tokens.clone());
    let streams = Arc::new(HttpLogStreamSource::new(ctx.client.clone(), ctx.tokens.clone()));
    let mut connection = LogStreamConnection::new(streams, policy);

    // JSON mode prints only the summary
    let summary = if ctx.options.json {
        let mut view = TerminalView::new(std::io::sink());
        session::run(&options, &args.id, &deployments, &mut connection, &mut view, shutdown_signal).await?
    } else {
        let mut view = TerminalView::new(std::io::stdout());
        session::run(&options, &args.id, &deployments, &mut connection, &mut view, shutdown_signal).await?
    };

    if let Some(path) = args.save {
        let path = path.unwrap_or_else(|| default_save_path(&args.id));
        save(&path, &summary.text).await?;
        Notice::success("Logs saved")
            .with_description(path.display().to_string())
            .show();
    }

    if ctx.options.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else if summary.duplicates_dropped > 0 {
        tracing::info!("{} duplicate log lines dropped", summary.duplicates_dropped);
    }
    Ok(())
}

async fn save(path: &Path, text: &str) -> Result<(), ConsoleError> {
    if text.is_empty() {
        return Err(ConsoleError::ValidationError("No logs to save".to_string()));
    }
    File::new(path).write_string(text).await
}
