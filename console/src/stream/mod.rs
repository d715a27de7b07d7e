pub mod connection;
pub mod reconciler;
pub mod source;
