//! Sampling

mod alias_table;
mod common;

// Re-export
pub use alias_table::*;
pub use common::*;
