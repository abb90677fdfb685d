//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads and writes the client's TOML configuration
//! and supplies defaults when the file does not exist yet.

pub mod config;
