//! Lull CLI library
//!
//! Command implementations and configuration handling for the `lull` binary.

pub mod cmd;
pub mod system_config;
