//! `snapdeploy deployments …`

use clap::{Args, Subcommand};
use openapi_client::models::{
    AppendDeploymentLogRequest, CreateDeploymentRequest, Deployment, DeploymentStatus,
    UpdateDeploymentStatusRequest,
};

use crate::app::context::AppContext;
use crate::commands::projects::PageArgs;
use crate::commands::{format_time, or_dash, print_field, print_table};
use crate::errors::ConsoleError;
use crate::models::deployment::{short_commit, StatusExt};
use crate::notify::Notice;

#[derive(Debug, Subcommand)]
pub enum DeploymentCommand {
    /// Trigger a deployment of a project
    Create(CreateArgs),
    Show { id: String },
    List(ListArgs),
    /// Latest deployment of a project
    Latest {
        #[arg(long)]
        project: String,
    },
    /// Set the status of a deployment
    SetStatus {
        id: String,
        /// PENDING, BUILDING, DEPLOYING, DEPLOYED, FAILED or ROLLED_BACK
        status: DeploymentStatus,
        #[arg(long)]
        error: Option<String>,
    },
    /// Append a line to the persisted log
    AppendLog { id: String, line: String },
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub project: String,
    #[arg(long, default_value = "main")]
    pub branch: String,
    #[arg(long)]
    pub commit: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub scope: ListScope,
    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct ListScope {
    /// Deployments of one project
    #[arg(long)]
    pub project: Option<String>,
    /// All deployments of the signed-in user
    #[arg(long)]
    pub mine: bool,
}

impl DeploymentCommand {
    pub fn failure_title(&self) -> &'static str {
        match self {
            DeploymentCommand::Create(_) => "Failed to create deployment",
            DeploymentCommand::Show { .. } => "Failed to load deployment",
            DeploymentCommand::List(_) => "Failed to load deployments",
            DeploymentCommand::Latest { .. } => "Failed to load latest deployment",
            DeploymentCommand::SetStatus { .. } => "Failed to update deployment status",
            DeploymentCommand::AppendLog { .. } => "Failed to append deployment log",
            DeploymentCommand::Delete { .. } => "Failed to delete deployment",
        }
    }
}

pub async fn run(ctx: &AppContext, command: DeploymentCommand) -> Result<(), ConsoleError> {
    let token = ctx.token().await?;
    let auth = token.as_ref();

    match command {
        DeploymentCommand::Create(args) => {
            let request = CreateDeploymentRequest {
                project_id: args.project,
                commit_hash: args.commit.filter(|c| !c.trim().is_empty()),
                branch: Some(args.branch),
            };
            let deployment = ctx.client.create_deployment(&request, auth).await?;
            Notice::success("Deployment triggered")
                .with_description(format!(
                    "Follow it with `snapdeploy logs {} --follow`",
                    deployment.id
                ))
                .show();
            ctx.emit(&deployment, print_deployment)
        }
        DeploymentCommand::Show { id } => {
            let deployment = ctx.client.get_deployment(&id, auth).await?;
            ctx.emit(&deployment, print_deployment)
        }
        DeploymentCommand::List(args) => {
            let page = args.page.query();
            let response = match args.scope.project {
                Some(project_id) => {
                    ctx.client
                        .list_project_deployments(&project_id, &page, auth)
                        .await?
                }
                None => {
                    let user = ctx.current_user(auth).await?;
                    ctx.client.list_user_deployments(&user.id, &page, auth).await?
                }
            };
            ctx.emit(&response, |response| {
                if response.deployments.is_empty() {
                    println!("No deployments yet.");
                    return;
                }
                let rows: Vec<Vec<String>> = response
                    .deployments
                    .iter()
                    .map(|deployment| {
                        vec![
                            deployment.id.clone(),
                            deployment.project_id.clone(),
                            deployment.status.badge().to_string(),
                            or_dash(deployment.branch.as_deref()),
                            or_dash(deployment.commit_hash.as_deref().map(short_commit)),
                            format_time(deployment.created_at),
                        ]
                    })
                    .collect();
                print_table(&["ID", "PROJECT", "STATUS", "BRANCH", "COMMIT", "CREATED"], &rows);
            })
        }
        DeploymentCommand::Latest { project } => {
            match ctx.client.latest_project_deployment(&project, auth).await? {
                Some(deployment) => ctx.emit(&deployment, print_deployment),
                None => {
                    if ctx.options.json {
                        println!("null");
                    } else {
                        println!("Project {} has not been deployed yet.", project);
                    }
                    Ok(())
                }
            }
        }
        DeploymentCommand::SetStatus { id, status, error } => {
            if status == DeploymentStatus::Unknown {
                return Err(ConsoleError::ValidationError("Unknown deployment status".to_string()));
            }
            let request = UpdateDeploymentStatusRequest {
                status,
                error_message: error,
            };
            let deployment = ctx
                .client
                .update_deployment_status(&id, &request, auth)
                .await?;
            Notice::success("Deployment status updated")
                .with_description(deployment.status.label())
                .show();
            ctx.emit(&deployment, print_deployment)
        }
        DeploymentCommand::AppendLog { id, line } => {
            let request = AppendDeploymentLogRequest { log: line };
            ctx.client.append_deployment_log(&id, &request, auth).await?;
            Notice::success("Log line appended").show();
            Ok(())
        }
        DeploymentCommand::Delete { id } => {
            ctx.client.delete_deployment(&id, auth).await?;
            Notice::success("Deployment deleted").with_description(id).show();
            Ok(())
        }
    }
}

fn print_deployment(deployment: &Deployment) {
    print_field("ID", &deployment.id);
    print_field("Project", &deployment.project_id);
    print_field("Status", deployment.status.badge());
    print_field("Branch", or_dash(deployment.branch.as_deref()));
    print_field(
        "Commit",
        or_dash(deployment.commit_hash.as_deref().map(short_commit)),
    );
    if let Some(message) = deployment.error_message.as_deref().filter(|m| !m.is_empty()) {
        print_field("Error", message);
    }
    print_field("Created", format_time(deployment.created_at));
    print_field("Updated", format_time(deployment.updated_at));
}
