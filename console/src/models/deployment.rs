//! Deployment status presentation and lifecycle helpers

use colored::{ColoredString, Colorize};
use openapi_client::models::DeploymentStatus;

/// Lifecycle and display helpers for [`DeploymentStatus`]
pub trait StatusExt {
    /// Pending, building or deploying
    fn is_in_progress(&self) -> bool;

    /// Deployed, failed or rolled back
    fn is_terminal(&self) -> bool;

    fn label(&self) -> &'static str;

    fn icon(&self) -> &'static str;

    /// Icon and label coloured for the terminal
    fn badge(&self) -> ColoredString;
}

impl StatusExt for DeploymentStatus {
    fn is_in_progress(&self) -> bool {
        matches!(
            self,
            DeploymentStatus::Pending | DeploymentStatus::Building | DeploymentStatus::Deploying
        )
    }

    fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeploymentStatus::Deployed | DeploymentStatus::Failed | DeploymentStatus::RolledBack
        )
    }

    fn label(&self) -> &'static str {
        match self {
            DeploymentStatus::Pending => "Pending",
            DeploymentStatus::Building => "Building",
            DeploymentStatus::Deploying => "Deploying",
            DeploymentStatus::Deployed => "Deployed",
            DeploymentStatus::Failed => "Failed",
            DeploymentStatus::RolledBack => "Rolled Back",
            DeploymentStatus::Unknown => "Unknown",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            DeploymentStatus::Pending => "⏳",
            DeploymentStatus::Building => "🔨",
            DeploymentStatus::Deploying => "🚀",
            DeploymentStatus::Deployed => "✅",
            DeploymentStatus::Failed => "❌",
            DeploymentStatus::RolledBack => "↩️",
            DeploymentStatus::Unknown => "•",
        }
    }

    fn badge(&self) -> ColoredString {
        let text = format!("{} {}", self.icon(), self.label());
        match self {
            DeploymentStatus::Pending => text.yellow(),
            DeploymentStatus::Building | DeploymentStatus::Deploying => text.blue(),
            DeploymentStatus::Deployed => text.green(),
            DeploymentStatus::Failed => text.red(),
            DeploymentStatus::RolledBack => text.dimmed(),
            DeploymentStatus::Unknown => text.normal(),
        }
    }
}

/// In-progress check over an optional status; absent counts as not in progress
pub fn is_in_progress(status: Option<DeploymentStatus>) -> bool {
    status.is_some_and(|s| s.is_in_progress())
}

pub fn is_terminal(status: Option<DeploymentStatus>) -> bool {
    status.is_some_and(|s| s.is_terminal())
}

/// Short form of a commit hash
pub fn short_commit(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}
