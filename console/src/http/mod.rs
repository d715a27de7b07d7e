//! REST and event-stream access to the SnapDeploy backend

pub mod client;
pub mod deployments;
pub mod env_vars;
pub mod health;
pub mod projects;
pub mod repositories;
pub mod sse;
pub mod users;

use serde::Serialize;

/// `page` / `limit` query parameters of list endpoints
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1, limit: 20 }
    }
}
