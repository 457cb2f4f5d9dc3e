//! CLI command implementations

pub mod completions;
pub mod config;
pub mod init;
pub mod item;
pub mod loc;
pub mod log;
