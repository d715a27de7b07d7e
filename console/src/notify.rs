//! User-facing notices for command results and failures

use colored::Colorize;
use http::StatusCode;

use crate::errors::ConsoleError;

/// Notice severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// A short message shown to the user after an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub description: Option<String>,
}

/// How a failure is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Authentication,
    PermissionDenied,
    NotFound,
    GithubNotConnected,
    Generic,
}

impl ErrorClass {
    pub fn of(err: &ConsoleError) -> Self {
        let description = err.description();
        let status = err.status();

        if description.contains("github_not_connected")
            || description.contains("GitHub account not connected")
            || err.api_code() == Some("github_not_connected")
        {
            return ErrorClass::GithubNotConnected;
        }

        match status {
            Some(StatusCode::UNAUTHORIZED) => return ErrorClass::Authentication,
            Some(StatusCode::FORBIDDEN) => return ErrorClass::PermissionDenied,
            Some(StatusCode::NOT_FOUND) => return ErrorClass::NotFound,
            _ => {}
        }

        match err {
            ConsoleError::AuthError(_) | ConsoleError::TokenError(_) => ErrorClass::Authentication,
            ConsoleError::NotFound(_) => ErrorClass::NotFound,
            _ if description.contains("unauthorized") || description.contains("401") => {
                ErrorClass::Authentication
            }
            _ if description.contains("403") => ErrorClass::PermissionDenied,
            _ if description.contains("404") => ErrorClass::NotFound,
            _ => ErrorClass::Generic,
        }
    }
}

impl Notice {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            title: title.into(),
            description: None,
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            title: title.into(),
            description: None,
        }
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Notice for a failed operation; `title` is used for generic failures
    pub fn from_error(title: &str, err: &ConsoleError) -> Self {
        let (severity, title, description) = match ErrorClass::of(err) {
            ErrorClass::GithubNotConnected => (
                Severity::Warning,
                "GitHub account not connected".to_string(),
                "Please connect your GitHub account in your profile settings first.".to_string(),
            ),
            ErrorClass::Authentication => (
                Severity::Error,
                "Authentication error".to_string(),
                "Please sign in again.".to_string(),
            ),
            ErrorClass::PermissionDenied => (
                Severity::Error,
                "Permission denied".to_string(),
                "You don't have permission to perform this action.".to_string(),
            ),
            ErrorClass::NotFound => (
                Severity::Error,
                "Not found".to_string(),
                "The requested resource was not found.".to_string(),
            ),
            ErrorClass::Generic => (Severity::Error, title.to_string(), err.description()),
        };

        Self {
            severity,
            title,
            description: Some(description),
        }
    }

    /// Render as a single terminal line
    pub fn render(&self) -> String {
        let badge = match self.severity {
            Severity::Success => "✔".green().bold(),
            Severity::Info => "ℹ".cyan().bold(),
            Severity::Warning => "!".yellow().bold(),
            Severity::Error => "✖".red().bold(),
        };
        match &self.description {
            Some(description) => format!("{} {}: {}", badge, self.title.bold(), description),
            None => format!("{} {}", badge, self.title.bold()),
        }
    }

    /// Print to stderr
    pub fn show(&self) {
        eprintln!("{}", self.render());
    }
}
