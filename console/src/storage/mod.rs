//! Local storage: config directory layout and settings

pub mod layout;
pub mod settings;
