//! CLI command handlers

pub mod commands;

pub use commands::{inspect, run, show_config, RunOptions};
