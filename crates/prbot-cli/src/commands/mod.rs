//! CLI commands

pub mod config;
pub mod supervise;
pub mod tasks;
