//! npq benchmarking suite
//!
//! Benchmarks for cache key derivation, storage drivers, response
//! validation and package name checking.

pub mod common;

pub use common::*;
