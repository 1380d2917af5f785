//! dossier - an interactive notebook for rings, subjects and their associations.
//!
//! This library exposes the core modules for use by the binary and integration tests.

pub mod commands;
pub mod config;
pub mod error;
pub mod external;
pub mod logging;
pub mod persistence;
pub mod repl;
pub mod session;
