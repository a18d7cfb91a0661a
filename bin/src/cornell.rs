//! Cornell Box

use cameras::*;
use lights::*;
use lucent_core::geometry::*;
use lucent_core::integrator::RenderError;
use lucent_core::light::*;
use lucent_core::material::*;
use lucent_core::primitives::*;
use lucent_core::scene::*;
use lucent_core::spectrum::*;
use shapes::*;
use std::sync::Arc;

/// Returns a matte wall spanned by two edges from a corner. Walls face
/// `e1 x e2`.
fn wall(p0: Point3f, e1: Vector3f, e2: Vector3f, material: &Arc<Material>) -> ArcPrimitive {
    Arc::new(GeometricPrimitive::new(
        Arc::new(Quad::new(p0, e1, e2, false)),
        Some(Arc::clone(material)),
        None,
    ))
}

/// Builds a Cornell box spanning [-1, 1] x [0, 2] x [-1, 1] that is open
/// towards +z, with a square light under the ceiling.
///
/// * `mirror` - Add a mirror sphere.
pub fn scene(mirror: bool) -> Scene {
    let white = Arc::new(Material::matte(Spectrum::rgb(0.73, 0.73, 0.73)));
    let red = Arc::new(Material::matte(Spectrum::rgb(0.65, 0.05, 0.05)));
    let green = Arc::new(Material::matte(Spectrum::rgb(0.12, 0.45, 0.15)));

    let x = Vector3f::new(2.0, 0.0, 0.0);
    let y = Vector3f::new(0.0, 2.0, 0.0);
    let z = Vector3f::new(0.0, 0.0, 2.0);
    let mut primitives = vec![
        // Floor, ceiling and back.
        wall(Point3f::new(-1.0, 0.0, -1.0), z, x, &white),
        wall(Point3f::new(-1.0, 2.0, -1.0), x, z, &white),
        wall(Point3f::new(-1.0, 0.0, -1.0), x, y, &white),
        // Left and right.
        wall(Point3f::new(-1.0, 0.0, -1.0), y, z, &red),
        wall(Point3f::new(1.0, 0.0, -1.0), z, y, &green),
    ];

    // Emitter facing down, just below the ceiling.
    let light_shape: ArcShape = Arc::new(Quad::new(
        Point3f::new(-0.25, 1.98, -0.25),
        Vector3f::new(0.5, 0.0, 0.0),
        Vector3f::new(0.0, 0.0, 0.5),
        false,
    ));
    let area_light: ArcLight = Arc::new(DiffuseAreaLight::new(
        Spectrum::rgb(17.0, 12.0, 4.0),
        Arc::clone(&light_shape),
        false,
    ));
    primitives.push(Arc::new(GeometricPrimitive::new(
        light_shape,
        Some(Arc::clone(&white)),
        Some(Arc::clone(&area_light)),
    )));

    primitives.push(Arc::new(GeometricPrimitive::new(
        Arc::new(Sphere::new(Point3f::new(-0.45, 0.4, -0.3), 0.4, false)),
        Some(Arc::clone(&white)),
        None,
    )));
    if mirror {
        primitives.push(Arc::new(GeometricPrimitive::new(
            Arc::new(Sphere::new(Point3f::new(0.45, 0.35, 0.25), 0.35, false)),
            Some(Arc::new(Material::mirror(Spectrum::new(0.95)))),
            None,
        )));
    }

    debug!("Cornell box with {} primitives", primitives.len());
    Scene::new(Arc::new(PrimitiveList::new(primitives)), vec![area_light])
}

/// Returns a camera looking into the open side of the box.
pub fn camera() -> Result<PerspectiveCamera, RenderError> {
    PerspectiveCamera::new(
        Point3f::new(0.0, 1.0, 3.9),
        Point3f::new(0.0, 1.0, 0.0),
        Vector3f::new(0.0, 1.0, 0.0),
        38.0,
    )
}
