//! MediTrack command-line front end.
//!
//! Owns configuration, logging setup and the mapping from subcommands to core
//! operations. Every command prints a `{ success, data?, message? }` envelope.

pub mod commands;
pub mod config;
pub mod logging;

pub use commands::*;
pub use config::*;
