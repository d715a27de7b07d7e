//! Authentication: session tokens and where they come from

pub mod publishable_key;
pub mod session_token;
pub mod token_source;
