//! Command dispatch

use std::future::Future;
use std::pin::Pin;

use tracing::{debug, info};

use crate::app::context::AppContext;
use crate::app::options::AppOptions;
use crate::cli::{Cli, Command};
use crate::commands;
use crate::errors::ConsoleError;
use crate::storage::layout::StorageLayout;
use crate::storage::settings::Settings;

/// Run one console command until it completes or the shutdown signal fires
pub async fn run(
    cli: Cli,
    settings: Settings,
    layout: StorageLayout,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ConsoleError> {
    let options = AppOptions::resolve(
        &settings,
        layout,
        cli.api_url,
        cli.publishable_key,
        cli.json,
    )?;
    debug!("Resolved options: {:?}", options);
    let ctx = AppContext::new(options)?;

    let mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>> = Box::pin(shutdown_signal);

    match cli.command {
        // The viewer owns the signal so it can close its stream on the way out
        Command::Logs(args) => commands::logs::run(&ctx, args, shutdown_signal).await,
        command => {
            tokio::select! {
                result = dispatch(&ctx, command) => result,
                _ = &mut shutdown_signal => {
                    info!("Shutdown signal received, aborting command...");
                    Err(ConsoleError::Internal("interrupted".to_string()))
                }
            }
        }
    }
}

async fn dispatch(ctx: &AppContext, command: Command) -> Result<(), ConsoleError> {
    match command {
        Command::Health => commands::health::run(ctx).await,
        Command::Whoami => commands::auth::whoami(ctx).await,
        Command::Auth { command } => commands::auth::run(ctx, command).await,
        Command::Repos { command } => commands::repos::run(ctx, command).await,
        Command::Projects { command } => commands::projects::run(ctx, command).await,
        Command::Deployments { command } => commands::deployments::run(ctx, command).await,
        Command::Env { command } => commands::env::run(ctx, command).await,
        Command::Logs(_) => Err(ConsoleError::Internal(
            "logs is dispatched with the shutdown signal".to_string(),
        )),
    }
}
