//! `snapdeploy auth …` and `snapdeploy whoami`

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::app::context::AppContext;
use crate::authn::publishable_key::InstanceKind;
use crate::authn::session_token::SessionToken;
use crate::authn::token_source::{active_source, EnvTokenSource, TokenSource, TOKEN_ENV_VAR};
use crate::commands::{or_dash, print_field};
use crate::errors::ConsoleError;
use crate::notify::Notice;
use crate::utils::fingerprint;

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Store a session token for later commands
    Login(LoginArgs),
    /// Forget the stored session token
    Logout,
    /// Show where the current token comes from
    Status,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Session token copied from the dashboard
    #[arg(long)]
    pub token: Option<String>,
}

impl AuthCommand {
    pub fn failure_title(&self) -> &'static str {
        match self {
            AuthCommand::Login(_) => "Failed to sign in",
            AuthCommand::Logout => "Failed to sign out",
            AuthCommand::Status => "Failed to read session",
        }
    }
}

pub async fn run(ctx: &AppContext, command: AuthCommand) -> Result<(), ConsoleError> {
    match command {
        AuthCommand::Login(args) => login(ctx, args).await,
        AuthCommand::Logout => logout(ctx).await,
        AuthCommand::Status => status(ctx).await,
    }
}

async fn login(ctx: &AppContext, args: LoginArgs) -> Result<(), ConsoleError> {
    let Some(raw) = args.token else {
        let hint = match &ctx.options.publishable_key {
            Some(key) => format!(
                "Sign in at {} and run `snapdeploy auth login --token <TOKEN>`",
                key.sign_in_url()
            ),
            None => "Pass a session token with `--token <TOKEN>`".to_string(),
        };
        return Err(ConsoleError::ValidationError(hint));
    };

    let token = SessionToken::from_raw(raw)?;
    if token.is_expired() {
        return Err(ConsoleError::TokenError("the session token has already expired".to_string()));
    }
    ctx.token_file.save(&token).await?;

    match ctx.current_user(Some(&token)).await {
        Ok(user) => Notice::success("Signed in")
            .with_description(format!("as {}", user.email))
            .show(),
        Err(e) => Notice::warning("Token saved but could not be verified")
            .with_description(e.description())
            .show(),
    }
    Ok(())
}

async fn logout(ctx: &AppContext) -> Result<(), ConsoleError> {
    ctx.token_file.clear().await?;
    Notice::success("Signed out").show();
    if EnvTokenSource::default().token().await?.is_some() {
        Notice::info(format!("{} is still set and will be used", TOKEN_ENV_VAR)).show();
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct AuthStatus {
    signed_in: bool,
    source: Option<String>,
    subject: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    expired: bool,
    fingerprint: Option<String>,
    identity_instance: Option<&'static str>,
}

async fn status(ctx: &AppContext) -> Result<(), ConsoleError> {
    let env_source = EnvTokenSource::default();
    let source = active_source(&[&env_source as &dyn TokenSource, &ctx.token_file]).await?;
    let token = ctx.token().await?;

    let report = AuthStatus {
        signed_in: token.is_some(),
        source,
        subject: token.as_ref().and_then(|t| t.subject()).map(str::to_string),
        expires_at: token.as_ref().and_then(|t| t.expires_at()),
        expired: token.as_ref().is_some_and(|t| t.is_expired()),
        fingerprint: token.as_ref().map(|t| fingerprint(t.expose())),
        identity_instance: ctx.options.publishable_key.as_ref().map(|key| match key.instance() {
            InstanceKind::Development => "development",
            InstanceKind::Production => "production",
        }),
    };

    ctx.emit(&report, |report| {
        if !report.signed_in {
            println!("Not signed in.");
            return;
        }
        print_field("Source", or_dash(report.source.as_deref()));
        print_field("Subject", or_dash(report.subject.as_deref()));
        let expiry = match report.expires_at {
            Some(at) if report.expired => format!("{} (expired)", at),
            Some(at) => at.to_string(),
            None => "unknown".to_string(),
        };
        print_field("Expires", expiry);
        print_field("Fingerprint", or_dash(report.fingerprint.as_deref()));
        if let Some(instance) = report.identity_instance {
            print_field("Identity", instance);
        }
    })
}

pub async fn whoami(ctx: &AppContext) -> Result<(), ConsoleError> {
    let token = ctx.token().await?;
    let user = ctx.current_user(token.as_ref()).await?;
    ctx.emit(&user, |user| {
        let name = [user.first_name.as_deref(), user.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        print_field("ID", &user.id);
        print_field("Email", &user.email);
        print_field("Name", or_dash(Some(name.as_str())));
        print_field("GitHub", or_dash(user.github_username.as_deref()));
    })
}
