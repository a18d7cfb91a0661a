//! Scene helpers shared by the scenario tests.

use cameras::*;
use lucent_core::camera::Camera;
use lucent_core::geometry::*;
use lucent_core::integrator::*;
use lucent_core::material::*;
use lucent_core::pbrt::*;
use lucent_core::primitives::*;
use lucent_core::scene::*;
use lucent_core::spectrum::*;
use shapes::*;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Returns a matte quad facing `e1 x e2`.
pub fn matte_quad(p0: Point3f, e1: Vector3f, e2: Vector3f, kd: Float) -> ArcPrimitive {
    Arc::new(GeometricPrimitive::new(
        Arc::new(Quad::new(p0, e1, e2, false)),
        Some(Arc::new(Material::matte(Spectrum::new(kd)))),
        None,
    ))
}

/// Returns a black material for emitters. Bidirectional walks pass through
/// surfaces without a material, so lights need one to be hit.
pub fn emitter_material() -> Option<Arc<Material>> {
    Some(Arc::new(Material::matte(Spectrum::ZERO)))
}

/// Returns a camera at `pos` looking at `look` with +y up.
pub fn camera(pos: Point3f, look: Point3f, fov: Float) -> PerspectiveCamera {
    PerspectiveCamera::new(pos, look, Vector3f::new(0.0, 1.0, 0.0), fov).unwrap()
}

/// Renders an image and returns its pixels in scanline order.
pub fn render(
    scene: &Scene,
    camera: &dyn Camera,
    width: usize,
    height: usize,
    integrator: Box<dyn Integrator>,
) -> Vec<Spectrum> {
    let mut renderer = Renderer::new(camera, width, height, integrator, 4, 8).unwrap();
    let pixels = Mutex::new(vec![Spectrum::ZERO; width * height]);
    renderer
        .render(
            scene,
            |x, y, v| pixels.lock().unwrap()[y * width + x] = v,
            |_| {},
            Duration::from_millis(50),
        )
        .unwrap();
    pixels.into_inner().unwrap()
}

/// Returns the mean luminance of the pixels.
#[allow(dead_code)]
pub fn mean_luminance(pixels: &[Spectrum]) -> Float {
    pixels.iter().map(|p| p.y()).sum::<Float>() / pixels.len() as Float
}
