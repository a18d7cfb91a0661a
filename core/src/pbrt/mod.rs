//! Common numeric types, constants and functions.

mod common;

// Re-export
pub use common::*;
