//! Project API client

use openapi_client::models::{CreateProjectRequest, Project, ProjectListResponse, UpdateProjectRequest};

use crate::authn::session_token::SessionToken;
use crate::errors::ConsoleError;
use crate::http::client::HttpClient;
use crate::http::PageQuery;

impl HttpClient {
    /// Projects owned by a user
    pub async fn list_user_projects(
        &self,
        user_id: &str,
        page: &PageQuery,
        auth: Option<&SessionToken>,
    ) -> Result<ProjectListResponse, ConsoleError> {
        let path = format!("/users/{}/projects", user_id);
        self.get_with_query(&path, page, auth).await
    }

    pub async fn get_project(
        &self,
        project_id: &str,
        auth: Option<&SessionToken>,
    ) -> Result<Project, ConsoleError> {
        let path = format!("/projects/{}", project_id);
        self.get(&path, auth).await
    }

    pub async fn create_project(
        &self,
        user_id: &str,
        request: &CreateProjectRequest,
        auth: Option<&SessionToken>,
    ) -> Result<Project, ConsoleError> {
        let path = format!("/users/{}/projects", user_id);
        self.post(&path, auth, request).await
    }

    pub async fn update_project(
        &self,
        project_id: &str,
        request: &UpdateProjectRequest,
        auth: Option<&SessionToken>,
    ) -> Result<Project, ConsoleError> {
        let path = format!("/projects/{}", project_id);
        self.put(&path, auth, request).await
    }

    pub async fn delete_project(
        &self,
        project_id: &str,
        auth: Option<&SessionToken>,
    ) -> Result<(), ConsoleError> {
        let path = format!("/projects/{}", project_id);
        self.delete(&path, auth).await
    }
}
