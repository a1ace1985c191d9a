//! Core library for the `apistress` CLI.
//!
//! This crate provides the building blocks used by the binary: CLI argument
//! types, configuration parsing, request execution, result aggregation, the
//! paced scheduler, criteria evaluation, and test-data cleanup. The primary
//! user-facing interface is the `apistress` command-line application.
pub mod args;
pub mod cleanup;
pub mod config;
pub mod criteria;
pub mod error;
pub mod http;
pub mod metrics;
pub mod scheduler;
pub mod shutdown;

#[cfg(test)]
pub(crate) mod test_server;
