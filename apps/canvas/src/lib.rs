//! # canvas
//!
//! Library half of the `canvas` binary: command-line parsing, command
//! implementations and the optional TOML configuration.

pub mod cli;
pub mod config;
