mod common;

use common::*;
use integrators::*;
use lights::*;
use lucent_core::geometry::*;
use lucent_core::light::*;
use lucent_core::primitives::*;
use lucent_core::scene::*;
use lucent_core::sampling::MISHeuristic;
use lucent_core::spectrum::*;
use shapes::*;
use std::sync::Arc;

/// A closed diffuse cube spanning [-1, 1] on every axis with a square light
/// under the ceiling.
fn closed_box() -> Scene {
    let x = Vector3f::new(2.0, 0.0, 0.0);
    let y = Vector3f::new(0.0, 2.0, 0.0);
    let z = Vector3f::new(0.0, 0.0, 2.0);
    let lo = Point3f::new(-1.0, -1.0, -1.0);
    let mut primitives = vec![
        matte_quad(lo, z, x, 0.5),
        matte_quad(Point3f::new(-1.0, 1.0, -1.0), x, z, 0.5),
        matte_quad(lo, x, y, 0.5),
        matte_quad(Point3f::new(-1.0, -1.0, 1.0), y, x, 0.5),
        matte_quad(lo, y, z, 0.5),
        matte_quad(Point3f::new(1.0, -1.0, -1.0), z, y, 0.5),
    ];

    let shape: ArcShape = Arc::new(Quad::new(
        Point3f::new(-0.3, 0.99, -0.3),
        Vector3f::new(0.6, 0.0, 0.0),
        Vector3f::new(0.0, 0.0, 0.6),
        false,
    ));
    let light: ArcLight =
        Arc::new(DiffuseAreaLight::new(Spectrum::new(4.0), Arc::clone(&shape), false));
    primitives.push(Arc::new(GeometricPrimitive::new(
        shape,
        emitter_material(),
        Some(Arc::clone(&light)),
    )));
    Scene::new(Arc::new(PrimitiveList::new(primitives)), vec![light])
}

#[test]
fn path_and_bidirectional_estimates_agree() {
    let scene = closed_box();
    let camera = camera(Point3f::new(0.0, 0.0, 0.9), Point3f::new(0.0, 0.0, -1.0), 70.0);
    let (width, height) = (8, 8);

    let path = PathIntegrator::new(PathConfig {
        samples_per_pixel: 256,
        seed: 1,
        ..Default::default()
    })
    .unwrap();
    let bdpt = BDPTIntegrator::new(BDPTConfig {
        samples_per_pixel: 256,
        seed: 2,
        ..Default::default()
    })
    .unwrap();

    let l_path = mean_luminance(&render(&scene, &camera, width, height, Box::new(path)));
    let l_bdpt = mean_luminance(&render(&scene, &camera, width, height, Box::new(bdpt)));

    assert!(l_path > 0.0);
    let relative = (l_path - l_bdpt).abs() / l_path;
    assert!(relative < 0.05, "path {} vs bdpt {}", l_path, l_bdpt);
}

#[test]
fn uniform_mis_matches_balance_heuristic() {
    let scene = closed_box();
    let camera = camera(Point3f::new(0.0, 0.0, 0.9), Point3f::new(0.0, 0.0, -1.0), 70.0);
    let (width, height) = (4, 4);

    let render_with = |mis: MISHeuristic| {
        let bdpt = BDPTIntegrator::new(BDPTConfig {
            samples_per_pixel: 256,
            mis,
            ..Default::default()
        })
        .unwrap();
        mean_luminance(&render(&scene, &camera, width, height, Box::new(bdpt)))
    };

    let balance = render_with(MISHeuristic::Balance);
    let uniform = render_with(MISHeuristic::Uniform);
    let relative = (balance - uniform).abs() / balance;
    assert!(relative < 0.1, "balance {} vs uniform {}", balance, uniform);
}
