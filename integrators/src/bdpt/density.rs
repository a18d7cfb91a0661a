//! Density Conversion

use super::vertex::Vertex;
use lucent_core::pbrt::*;

/// Converts a solid angle density of sampling `to` from `from` into an area
/// density at `to`. Vertices on infinite lights have no position so their
/// directional density is returned unchanged.
///
/// * `pdf`  - Solid angle density at `from`.
/// * `from` - The vertex the direction was sampled at.
/// * `to`   - The vertex the density is measured at.
pub fn to_area_density(pdf: Float, from: &Vertex, to: &Vertex) -> Float {
    if to.is_infinite_light() {
        return pdf;
    }
    let w = to.p() - from.p();
    let dist2 = w.length_squared();
    if dist2 == 0.0 {
        return 0.0;
    }
    let inv_dist2 = 1.0 / dist2;
    let mut pdf = pdf * inv_dist2;
    if to.is_on_surface() {
        pdf *= to.ng().abs_dot(&(w * inv_dist2.sqrt()));
    }
    pdf
}

/// Converts an area density at `to` back into the solid angle density of
/// sampling the direction from `from` towards `to`. Returns 0 when the
/// conversion is undefined, i.e. for coincident vertices or a surface seen
/// exactly edge-on.
///
/// * `pdf`  - Area density at `to`.
/// * `from` - The vertex the direction is sampled at.
/// * `to`   - The vertex the density is measured at.
pub fn to_solid_angle_density(pdf: Float, from: &Vertex, to: &Vertex) -> Float {
    if to.is_infinite_light() {
        return pdf;
    }
    let w = to.p() - from.p();
    let dist2 = w.length_squared();
    if dist2 == 0.0 {
        return 0.0;
    }
    let mut pdf = pdf * dist2;
    if to.is_on_surface() {
        let cos_theta = to.ng().abs_dot(&(w / dist2.sqrt()));
        if cos_theta == 0.0 {
            return 0.0;
        }
        pdf /= cos_theta;
    }
    pdf
}
