pub mod deployment;
pub mod project;
