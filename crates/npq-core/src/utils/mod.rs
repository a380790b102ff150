//! Utility functions and helpers.
//!
//! Common functionality used across multiple npq crates.

pub mod hash;

// Re-export commonly used utilities
pub use hash::sha256_hex;
