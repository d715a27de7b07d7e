//! `snapdeploy repos …`

use clap::{Args, Subcommand};

use crate::app::context::AppContext;
use crate::commands::{format_time, or_dash, print_table};
use crate::errors::ConsoleError;
use crate::http::repositories::RepositoryQuery;
use crate::models::project::detect_language;
use crate::notify::Notice;

#[derive(Debug, Subcommand)]
pub enum RepoCommand {
    /// List repositories of the signed-in user
    List(ListArgs),
    /// Re-import repositories from GitHub
    Sync,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = 20)]
    pub limit: u32,
    /// Filter by name
    #[arg(long)]
    pub search: Option<String>,
}

impl RepoCommand {
    pub fn failure_title(&self) -> &'static str {
        match self {
            RepoCommand::List(_) => "Failed to load repositories",
            RepoCommand::Sync => "Failed to sync repositories",
        }
    }
}

pub async fn run(ctx: &AppContext, command: RepoCommand) -> Result<(), ConsoleError> {
    let token = ctx.token().await?;
    let user = ctx.current_user(token.as_ref()).await?;

    match command {
        RepoCommand::List(args) => {
            let query = RepositoryQuery {
                page: args.page,
                limit: args.limit,
                search: args.search,
            };
            let response = ctx
                .client
                .list_user_repositories(&user.id, &query, token.as_ref())
                .await?;
            ctx.emit(&response, |response| {
                if response.repositories.is_empty() {
                    println!("No repositories found. Run `snapdeploy repos sync` to import them.");
                    return;
                }
                let rows: Vec<Vec<String>> = response
                    .repositories
                    .iter()
                    .map(|repo| {
                        vec![
                            repo.full_name.clone().unwrap_or_else(|| repo.name.clone()),
                            or_dash(repo.language.as_deref()),
                            repo.language
                                .as_deref()
                                .and_then(detect_language)
                                .map(|l| l.to_string())
                                .unwrap_or_else(|| "-".to_string()),
                            if repo.private { "private" } else { "public" }.to_string(),
                            format_time(repo.updated_at),
                            or_dash(repo.clone_url()),
                        ]
                    })
                    .collect();
                print_table(&["NAME", "LANGUAGE", "PRESET", "VISIBILITY", "UPDATED", "URL"], &rows);
                if let Some(p) = &response.pagination {
                    println!("Page {} of {} ({} total)", p.page, p.total_pages.max(1), p.total);
                }
            })
        }
        RepoCommand::Sync => {
            let response = ctx
                .client
                .sync_user_repositories(&user.id, token.as_ref())
                .await?;
            if ctx.options.json {
                return ctx.emit(&response, |_| {});
            }
            let description = match (&response.message, response.synced_count) {
                (Some(message), _) => message.clone(),
                (None, Some(count)) => format!("{} repositories imported", count),
                (None, None) => "Repositories are up to date".to_string(),
            };
            Notice::success("Repositories synced")
                .with_description(description)
                .show();
            Ok(())
        }
    }
}
