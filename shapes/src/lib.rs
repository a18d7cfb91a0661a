//! Geometry

#[macro_use]
extern crate log;

mod disk;
mod quad;
mod sphere;

// Re-export
pub use disk::*;
pub use quad::*;
pub use sphere::*;
