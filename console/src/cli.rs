//! Command-line interface

use clap::{ArgAction, Parser, Subcommand};

use crate::app::options::{API_URL_ENV_VAR, PUBLISHABLE_KEY_ENV_VAR};
use crate::commands::auth::AuthCommand;
use crate::commands::deployments::DeploymentCommand;
use crate::commands::env::EnvCommand;
use crate::commands::logs::LogsArgs;
use crate::commands::projects::ProjectCommand;
use crate::commands::repos::RepoCommand;

#[derive(Debug, Parser)]
#[command(
    name = "snapdeploy",
    version,
    about = "Projects, deployments and live deployment logs from the terminal"
)]
pub struct Cli {
    /// Backend API base URL
    #[arg(long, global = true, env = API_URL_ENV_VAR)]
    pub api_url: Option<String>,

    /// Identity-provider publishable key
    #[arg(long, global = true, env = PUBLISHABLE_KEY_ENV_VAR)]
    pub publishable_key: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Also write logs to a daily file under the config directory
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the API is reachable
    Health,
    /// Show the signed-in user
    Whoami,
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },
    Repos {
        #[command(subcommand)]
        command: RepoCommand,
    },
    Projects {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    Deployments {
        #[command(subcommand)]
        command: DeploymentCommand,
    },
    Env {
        #[command(subcommand)]
        command: EnvCommand,
    },
    /// Show deployment logs, following the live stream while it runs
    Logs(LogsArgs),
}

impl Command {
    /// Notice title when the command fails for a generic reason
    pub fn failure_title(&self) -> &'static str {
        match self {
            Command::Health => "API health check failed",
            Command::Whoami => "Failed to load user",
            Command::Auth { command } => command.failure_title(),
            Command::Repos { command } => command.failure_title(),
            Command::Projects { command } => command.failure_title(),
            Command::Deployments { command } => command.failure_title(),
            Command::Env { command } => command.failure_title(),
            Command::Logs(_) => "Failed to load deployment logs",
        }
    }
}
