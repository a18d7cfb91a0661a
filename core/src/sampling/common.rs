//! Common sampling functions.

use crate::geometry::*;
use crate::pbrt::*;
use clap::ValueEnum;

/// Uniformly sample a direction on a hemisphere.
///
/// * `u` - The random sample point.
pub fn uniform_sample_hemisphere(u: &Point2f) -> Vector3f {
    let z = u[0];
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = TWO_PI * u[1];
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for uniformly sampling a direction from a hemisphere.
#[inline]
pub fn uniform_hemisphere_pdf() -> Float {
    INV_TWO_PI
}

/// Uniformly sample a direction from a sphere.
///
/// * `u` - The random sample point.
pub fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u[0];
    let r = (1.0 - z * z).max(0.0).sqrt();
    let phi = TWO_PI * u[1];
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for uniformly sampling a direction from a sphere.
#[inline]
pub fn uniform_sphere_pdf() -> Float {
    INV_FOUR_PI
}

/// Sample a point on a unit disk by mapping concentric squares in [-1, 1]^2
/// to concentric circles.
///
/// * `u` - The random sample point.
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    let u_offset = Point2f::new(2.0 * u.x - 1.0, 2.0 * u.y - 1.0);

    if u_offset.x == 0.0 && u_offset.y == 0.0 {
        return Point2f::default();
    }

    let (r, theta) = if u_offset.x.abs() > u_offset.y.abs() {
        (u_offset.x, PI_OVER_FOUR * (u_offset.y / u_offset.x))
    } else {
        (
            u_offset.y,
            PI_OVER_TWO - PI_OVER_FOUR * (u_offset.x / u_offset.y),
        )
    };

    Point2f::new(r * theta.cos(), r * theta.sin())
}

/// Uniformly sample a direction from a cone of directions about the `(0, 0, 1)`
/// axis. Returns the cosine and sine of the polar angle and the azimuth.
///
/// * `u`             - The random sample point.
/// * `cos_theta_max` - Cosine of the cone's half angle.
pub fn uniform_sample_cone(u: &Point2f, cos_theta_max: Float) -> (Float, Float, Float) {
    let cos_theta = lerp(u[0], 1.0, cos_theta_max);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    (cos_theta, sin_theta, u[1] * TWO_PI)
}

/// Returns the PDF for sampling a direction from a cone of directions.
///
/// * `cos_theta_max` - Cosine of the cone's half angle.
#[inline]
pub fn uniform_cone_pdf(cos_theta_max: Float) -> Float {
    1.0 / (TWO_PI * (1.0 - cos_theta_max))
}

/// Sample a direction on a hemisphere using cosine-weighted sampling.
///
/// * `u` - The random sample point.
#[inline]
pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let d = concentric_sample_disk(u);
    let z = (1.0 - d.x * d.x - d.y * d.y).max(0.0).sqrt();
    Vector3f::new(d.x, d.y, z)
}

/// Returns the PDF for cosine-weighted sampling a direction from a hemisphere.
///
/// * `cos_theta` - Cosine term of incident radiance.
#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

/// Heuristics for weighting multiple sampling strategies.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum MISHeuristic {
    /// Weight proportional to each strategy's density.
    #[default]
    Balance,

    /// Equal weight for every strategy that can produce the path.
    Uniform,
}

/// Weight samples using the balance heuristic.
///
/// * `nf`    - Number of samples taken from `f_pdf`.
/// * `f_pdf` - First sampling distribution.
/// * `ng`    - Number of samples taken from `g_pdf`.
/// * `g_pdf` - Second sampling distribution.
#[inline]
pub fn balance_heuristic(nf: u32, f_pdf: Float, ng: u32, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    if f == 0.0 && g == 0.0 {
        return 0.0;
    }
    f / (f + g)
}

/// Weight samples using the power heuristic.
///
/// * `nf`    - Number of samples taken from `f_pdf`.
/// * `f_pdf` - First sampling distribution.
/// * `ng`    - Number of samples taken from `g_pdf`.
/// * `g_pdf` - Second sampling distribution.
#[inline]
pub fn power_heuristic(nf: u32, f_pdf: Float, ng: u32, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    if f == 0.0 && g == 0.0 {
        return 0.0;
    }
    (f * f) / (f * f + g * g)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn concentric_disk_stays_inside_unit_circle(x in 0.0..1.0f32, y in 0.0..1.0f32) {
            let p = concentric_sample_disk(&Point2f::new(x, y));
            prop_assert!(p.x * p.x + p.y * p.y <= 1.0 + 1e-5);
        }

        #[test]
        fn cosine_hemisphere_is_unit_and_upper(x in 0.0..1.0f32, y in 0.0..1.0f32) {
            let w = cosine_sample_hemisphere(&Point2f::new(x, y));
            prop_assert!(w.z >= 0.0);
            prop_assert!(approx_eq!(Float, w.length(), 1.0, epsilon = 1e-4));
        }

        #[test]
        fn uniform_hemisphere_is_unit_and_upper(x in 0.0..1.0f32, y in 0.0..1.0f32) {
            let w = uniform_sample_hemisphere(&Point2f::new(x, y));
            prop_assert!(w.z >= 0.0);
            prop_assert!(approx_eq!(Float, w.length(), 1.0, epsilon = 1e-4));
            prop_assert!(approx_eq!(Float, uniform_hemisphere_pdf(), 0.5 * INV_PI, epsilon = 1e-6));
        }

        #[test]
        fn cone_directions_lie_inside_cone(
            x in 0.0..1.0f32,
            y in 0.0..1.0f32,
            cos_max in 0.0..0.99f32,
        ) {
            let (cos_theta, sin_theta, _) = uniform_sample_cone(&Point2f::new(x, y), cos_max);
            prop_assert!(cos_theta >= cos_max - 1e-5);
            let norm = cos_theta * cos_theta + sin_theta * sin_theta;
            prop_assert!(approx_eq!(Float, norm, 1.0, epsilon = 1e-4));
        }
    }

    #[test]
    fn power_heuristic_weights_sum_to_one() {
        let a = power_heuristic(1, 0.3, 1, 0.7);
        let b = power_heuristic(1, 0.7, 1, 0.3);
        assert!(approx_eq!(Float, a + b, 1.0, epsilon = 1e-6));
        assert_eq!(power_heuristic(1, 0.0, 1, 0.0), 0.0);
    }

    #[test]
    fn balance_heuristic_is_proportional() {
        assert!(approx_eq!(Float, balance_heuristic(1, 0.25, 1, 0.75), 0.25, epsilon = 1e-6));
        assert!(approx_eq!(Float, balance_heuristic(2, 0.5, 1, 1.0), 0.5, epsilon = 1e-6));
        assert_eq!(balance_heuristic(1, 0.0, 1, 0.0), 0.0);
    }
}
