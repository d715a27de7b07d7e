//! `snapdeploy env …`

use clap::Subcommand;
use openapi_client::models::SetEnvironmentVariableRequest;

use crate::app::context::AppContext;
use crate::commands::{format_time, print_table};
use crate::errors::ConsoleError;
use crate::notify::Notice;

#[derive(Debug, Subcommand)]
pub enum EnvCommand {
    /// List variables of a project
    List { project: String },
    /// Create or overwrite a variable
    Set {
        project: String,
        /// KEY=VALUE
        assignment: String,
    },
    /// Remove a variable
    Unset { project: String, key: String },
}

impl EnvCommand {
    pub fn failure_title(&self) -> &'static str {
        match self {
            EnvCommand::List { .. } => "Failed to load environment variables",
            EnvCommand::Set { .. } => "Failed to save environment variable",
            EnvCommand::Unset { .. } => "Failed to delete environment variable",
        }
    }
}

/// Split `KEY=VALUE`; the value may itself contain `=`
pub fn parse_assignment(assignment: &str) -> Result<SetEnvironmentVariableRequest, ConsoleError> {
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| ConsoleError::ValidationError(format!("Expected KEY=VALUE, got {}", assignment)))?;
    let key = key.trim();
    if key.is_empty() || key.chars().any(char::is_whitespace) {
        return Err(ConsoleError::ValidationError(format!("Invalid variable name: {:?}", key)));
    }
    Ok(SetEnvironmentVariableRequest {
        key: key.to_string(),
        value: value.to_string(),
    })
}

pub async fn run(ctx: &AppContext, command: EnvCommand) -> Result<(), ConsoleError> {
    let token = ctx.token().await?;
    let auth = token.as_ref();

    match command {
        EnvCommand::List { project } => {
            let variables = ctx.client.list_env_vars(&project, auth).await?;
            ctx.emit(&variables, |variables| {
                if variables.is_empty() {
                    println!("No environment variables set.");
                    return;
                }
                let rows: Vec<Vec<String>> = variables
                    .iter()
                    .map(|var| {
                        vec![
                            var.key.clone(),
                            var.value.clone().unwrap_or_else(|| "••••••".to_string()),
                            format_time(var.updated_at.or(var.created_at)),
                        ]
                    })
                    .collect();
                print_table(&["KEY", "VALUE", "UPDATED"], &rows);
            })
        }
        EnvCommand::Set {
            project,
            assignment,
        } => {
            let request = parse_assignment(&assignment)?;
            ctx.client.set_env_var(&project, &request, auth).await?;
            Notice::success("Environment variable saved")
                .with_description(request.key)
                .show();
            Ok(())
        }
        EnvCommand::Unset { project, key } => {
            ctx.client.delete_env_var(&project, &key, auth).await?;
            Notice::success("Environment variable deleted")
                .with_description(key)
                .show();
            Ok(())
        }
    }
}
