//! td-query - a command-line client for a hosted analytics query engine.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod query;
pub mod runner;
