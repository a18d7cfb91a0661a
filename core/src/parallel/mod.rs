//! Parallel rendering support.

mod atomic_float;
mod scheduler;
mod tiles;

// Re-export
pub use atomic_float::*;
pub use scheduler::*;
pub use tiles::*;
