//! Geometry

mod bounds;
mod matrix4x4;
mod ray;
mod shape;
mod vector2;
mod vector3;

// Re-export
pub use bounds::*;
pub use matrix4x4::*;
pub use ray::*;
pub use shape::*;
pub use vector2::*;
pub use vector3::*;
