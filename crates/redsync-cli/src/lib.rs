//! CLI components for redsync.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod operator;
pub mod progress;
pub mod summary;
