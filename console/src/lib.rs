//! SnapDeploy console library
//!
//! REST client, live deployment log streaming and the terminal log viewer
//! behind the `snapdeploy` binary.

pub mod app;
pub mod authn;
pub mod cli;
pub mod commands;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod notify;
pub mod storage;
pub mod stream;
pub mod utils;
pub mod viewer;
