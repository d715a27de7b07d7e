//! Project language presets and display helpers

use openapi_client::models::{Language, Project};

/// Suffix of the hosted domain of a project
pub const DOMAIN_SUFFIX: &str = "snapdeploy.app";

/// Default commands for a language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguagePreset {
    pub install_command: &'static str,
    pub build_command: &'static str,
    pub run_command: &'static str,
}

impl LanguagePreset {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Node | Language::NodeTs | Language::Nextjs => LanguagePreset {
                install_command: "npm install",
                build_command: "npm run build",
                run_command: "npm start",
            },
            Language::Go => LanguagePreset {
                install_command: "go mod download",
                build_command: "go build -o app",
                run_command: "./app",
            },
            Language::Python => LanguagePreset {
                install_command: "pip install -r requirements.txt",
                build_command: "python -m build",
                run_command: "python main.py",
            },
        }
    }
}

/// Guess the project language from a repository's primary language
pub fn detect_language(repository_language: &str) -> Option<Language> {
    match repository_language {
        "JavaScript" | "TypeScript" => Some(Language::NodeTs),
        "Go" => Some(Language::Go),
        "Python" => Some(Language::Python),
        _ => None,
    }
}

/// Hosted domain of a custom subdomain
pub fn display_domain(custom_domain: &str) -> String {
    format!("{}.{}", custom_domain, DOMAIN_SUFFIX)
}

/// Repository name from its URL, e.g. `owner/repo`
pub fn repository_name(repository_url: &str) -> &str {
    let trimmed = repository_url.trim_end_matches('/').trim_end_matches(".git");
    let path = trimmed
        .split_once("://")
        .map(|(_, rest)| rest.split_once('/').map_or("", |(_, path)| path))
        .unwrap_or(trimmed);
    if path.is_empty() {
        repository_url
    } else {
        path
    }
}

/// Hosted domain of a project, when it has one
pub fn project_domain(project: &Project) -> Option<String> {
    project
        .custom_domain
        .as_deref()
        .filter(|domain| !domain.is_empty())
        .map(display_domain)
}
