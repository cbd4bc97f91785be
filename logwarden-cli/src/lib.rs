//! logwarden CLI library
//!
//! Argument parsing, configuration overrides, logging setup and output
//! rendering for the `logwarden` binary. Exposed as a library so command
//! handlers can be driven from integration tests.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod plugin;
