//! CLI command implementations

pub mod config;
pub mod debounce;
pub mod limit;
