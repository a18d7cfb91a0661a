//! Integrators

#[macro_use]
extern crate log;

mod bdpt;
mod mlt;
mod path;

// Re-export.
pub use bdpt::*;
pub use mlt::*;
pub use path::*;
