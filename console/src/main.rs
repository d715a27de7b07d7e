//! SnapDeploy console - Entry Point
//!
//! Manage projects and deployments and follow deployment logs from the
//! terminal.

use clap::Parser;
use tracing::{error, info, warn};

use snapdeploy::app::options::load_settings;
use snapdeploy::app::run::run;
use snapdeploy::cli::Cli;
use snapdeploy::logs::{init_logging, LogOptions};
use snapdeploy::notify::Notice;
use snapdeploy::storage::layout::StorageLayout;

#[tokio::main]
async fn main() {
    // .env values become defaults for the flags below
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let layout = StorageLayout::from_env();
    let settings = match load_settings(&layout).await {
        Ok(settings) => settings,
        Err(e) => {
            Notice::from_error("Unable to read settings file", &e).show();
            std::process::exit(1);
        }
    };

    let log_options = LogOptions {
        log_level: settings.log_level.more_verbose(cli.verbose),
        file: cli.log_file,
        log_dir: layout.logs_dir(),
        ..Default::default()
    };
    let guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };
    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let failure_title = cli.command.failure_title();
    if let Err(e) = run(cli, settings, layout, await_shutdown_signal()).await {
        error!("Command failed: {e}");
        Notice::from_error(failure_title, &e).show();
        drop(guard);
        std::process::exit(1);
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("SIGTERM received, shutting down...");
                    }
                    _ = tokio::signal::ctrl_c() => {
                        info!("Ctrl+C received, shutting down...");
                    }
                }
            }
            Err(e) => {
                warn!("Unable to listen for SIGTERM: {e}");
                let _ = tokio::signal::ctrl_c().await;
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Ctrl+C received, shutting down...");
    }
}
