//! `snapdeploy projects …`

use clap::{Args, Subcommand};
use openapi_client::models::{CreateProjectRequest, Language, Project, UpdateProjectRequest};

use crate::app::context::AppContext;
use crate::commands::{format_time, or_dash, print_field, print_table};
use crate::errors::ConsoleError;
use crate::http::PageQuery;
use crate::models::project::{project_domain, repository_name, LanguagePreset};
use crate::notify::Notice;

#[derive(Debug, Subcommand)]
pub enum ProjectCommand {
    /// List projects of the signed-in user
    List(PageArgs),
    Show { id: String },
    /// Create a project from a repository
    Create(CreateArgs),
    /// Change project settings
    Update(UpdateArgs),
    Delete { id: String },
}

#[derive(Debug, Args)]
pub struct PageArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = 20)]
    pub limit: u32,
}

impl PageArgs {
    pub fn query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Repository URL
    #[arg(long)]
    pub repo: String,
    /// NODE, NODE_TS, NEXTJS, GO or PYTHON
    #[arg(long)]
    pub language: Language,
    /// Defaults to the language preset
    #[arg(long)]
    pub install: Option<String>,
    /// Defaults to the language preset
    #[arg(long)]
    pub build: Option<String>,
    /// Defaults to the language preset
    #[arg(long)]
    pub run: Option<String>,
    /// Subdomain under snapdeploy.app
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long)]
    pub require_db: bool,
    #[arg(long)]
    pub migration: Option<String>,
}

impl CreateArgs {
    /// Request with missing commands taken from the language preset
    pub fn into_request(self) -> Result<CreateProjectRequest, ConsoleError> {
        let repository_url = self.repo.trim().to_string();
        if repository_url.is_empty() {
            return Err(ConsoleError::ValidationError("--repo must not be empty".to_string()));
        }
        let preset = LanguagePreset::for_language(self.language);
        let command = |value: Option<String>, default: &str| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(CreateProjectRequest {
            repository_url,
            install_command: command(self.install, preset.install_command),
            build_command: Some(command(self.build, preset.build_command)),
            run_command: command(self.run, preset.run_command),
            language: self.language,
            custom_domain: self.domain.filter(|d| !d.trim().is_empty()),
            require_db: self.require_db,
            migration_command: self.migration.filter(|m| !m.trim().is_empty()),
        })
    }
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub id: String,
    #[arg(long)]
    pub repo: Option<String>,
    #[arg(long)]
    pub language: Option<Language>,
    #[arg(long)]
    pub install: Option<String>,
    #[arg(long)]
    pub build: Option<String>,
    #[arg(long)]
    pub run: Option<String>,
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long)]
    pub require_db: Option<bool>,
    #[arg(long)]
    pub migration: Option<String>,
}

impl UpdateArgs {
    fn request(&self) -> UpdateProjectRequest {
        UpdateProjectRequest {
            repository_url: self.repo.clone(),
            install_command: self.install.clone(),
            build_command: self.build.clone(),
            run_command: self.run.clone(),
            language: self.language,
            custom_domain: self.domain.clone(),
            require_db: self.require_db,
            migration_command: self.migration.clone(),
        }
    }
}

impl ProjectCommand {
    pub fn failure_title(&self) -> &'static str {
        match self {
            ProjectCommand::List(_) => "Failed to load projects",
            ProjectCommand::Show { .. } => "Failed to load project",
            ProjectCommand::Create(_) => "Failed to create project",
            ProjectCommand::Update(_) => "Failed to update project",
            ProjectCommand::Delete { .. } => "Failed to delete project",
        }
    }
}

pub async fn run(ctx: &AppContext, command: ProjectCommand) -> Result<(), ConsoleError> {
    let token = ctx.token().await?;
    let auth = token.as_ref();

    match command {
        ProjectCommand::List(args) => {
            let user = ctx.current_user(auth).await?;
            let response = ctx
                .client
                .list_user_projects(&user.id, &args.query(), auth)
                .await?;
            ctx.emit(&response, |response| {
                if response.projects.is_empty() {
                    println!("No projects yet. Create one with `snapdeploy projects create`.");
                    return;
                }
                let rows: Vec<Vec<String>> = response
                    .projects
                    .iter()
                    .map(|project| {
                        vec![
                            project.id.clone(),
                            repository_name(&project.repository_url).to_string(),
                            project.language.to_string(),
                            project_domain(project).unwrap_or_else(|| "-".to_string()),
                            format_time(project.updated_at.or(project.created_at)),
                        ]
                    })
                    .collect();
                print_table(&["ID", "REPOSITORY", "LANGUAGE", "DOMAIN", "UPDATED"], &rows);
            })
        }
        ProjectCommand::Show { id } => {
            let project = ctx.client.get_project(&id, auth).await?;
            ctx.emit(&project, print_project)
        }
        ProjectCommand::Create(args) => {
            let request = args.into_request()?;
            let user = ctx.current_user(auth).await?;
            let project = ctx.client.create_project(&user.id, &request, auth).await?;
            Notice::success("Project created")
                .with_description(project.id.clone())
                .show();
            ctx.emit(&project, print_project)
        }
        ProjectCommand::Update(args) => {
            let request = args.request();
            if request.is_empty() {
                return Err(ConsoleError::ValidationError("Nothing to update".to_string()));
            }
            let project = ctx.client.update_project(&args.id, &request, auth).await?;
            Notice::success("Project updated").show();
            ctx.emit(&project, print_project)
        }
        ProjectCommand::Delete { id } => {
            ctx.client.delete_project(&id, auth).await?;
            Notice::success("Project deleted").with_description(id).show();
            Ok(())
        }
    }
}

fn print_project(project: &Project) {
    print_field("ID", &project.id);
    print_field("Repository", &project.repository_url);
    print_field("Language", project.language);
    print_field("Install", &project.install_command);
    print_field("Build", or_dash(project.build_command.as_deref()));
    print_field("Run", &project.run_command);
    print_field(
        "Domain",
        project_domain(project).unwrap_or_else(|| "-".to_string()),
    );
    print_field("Database", if project.require_db { "required" } else { "no" });
    if project.require_db {
        print_field("Migrations", or_dash(project.migration_command.as_deref()));
    }
    print_field("Created", format_time(project.created_at));
}
