//! Integration tests for dossier.

pub mod persistence_test;
pub mod pipeline_test;
