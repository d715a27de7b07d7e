//! Wire models for the SnapDeploy REST API

pub mod models;
