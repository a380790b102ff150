//! # npq-core
//!
//! Core types and utilities shared across all npq crates.
//!
//! This crate provides:
//! - NpqError enum and ErrorKind for unified error handling
//! - npm package name checkers (permissive and strict)
//! - Hashing helpers used to derive cache keys
//!
//! ## Architecture
//!
//! The crate is organized into modules:
//! - `error`: Error types and result aliases
//! - `name`: Package name validation
//! - `utils`: Utility functions and helpers

pub mod error;
pub mod name;
pub mod utils;

// Re-export commonly used types
pub use error::{ErrorKind, NpqError, NpqResult};
pub use name::{is_scoped, validate_package_name, validate_strict_package_name};
