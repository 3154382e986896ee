//! Common test utilities for integration tests.
//!
//! This module provides in-memory collaborators and forest validation
//! shared across integration test files.

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod fakes;
pub mod forest_validator;

// Re-export commonly used items
pub use fakes::{entries, url, FakeCatalog, FakeEdges};
pub use forest_validator::{
    assert_valid, keys, validate_all, validate_coverage, validate_root_set, validate_roots,
    ForestValidationResult,
};
