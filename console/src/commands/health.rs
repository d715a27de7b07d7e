//! `snapdeploy health`

use colored::Colorize;
use openapi_client::models::HealthResponse;
use serde::Serialize;

use crate::app::context::AppContext;
use crate::commands::print_field;
use crate::errors::ConsoleError;
use crate::utils::{version_info, VersionInfo};

#[derive(Debug, Serialize)]
struct HealthReport<'a> {
    api_url: &'a str,
    api: HealthResponse,
    console: VersionInfo,
}

pub async fn run(ctx: &AppContext) -> Result<(), ConsoleError> {
    let token = ctx.token().await?;
    let api = ctx.client.get_health(token.as_ref()).await?;

    let report = HealthReport {
        api_url: ctx.client.base_url(),
        api,
        console: version_info(),
    };
    ctx.emit(&report, |report| {
        let status = if report.api.status.eq_ignore_ascii_case("ok")
            || report.api.status.eq_ignore_ascii_case("healthy")
        {
            report.api.status.green()
        } else {
            report.api.status.yellow()
        };
        print_field("API", report.api_url);
        print_field("Status", status);
        if let Some(version) = &report.api.version {
            print_field("API version", version);
        }
        print_field(
            "Console",
            format!(
                "{} ({}, built {})",
                report.console.version, report.console.git_hash, report.console.build_time
            ),
        );
    })
}
