//! Command-line front end for the repcount engine.
//!
//! This crate provides:
//! - Argument parsing for the `analyze`, `replay` and `schema` commands
//! - Environment configuration
//! - Tracing setup with pretty or JSON output on stderr
//! - A deadline-bounded runner around the synchronous engine

pub mod cli;
pub mod config;
pub mod logging;
pub mod runner;

pub use cli::{Cli, Commands};
pub use config::{CliConfig, LogFormat};
pub use logging::{init_tracing, RunLogger};
pub use runner::{execute, run_with_deadline, AnalysisRequest, InputSource};
