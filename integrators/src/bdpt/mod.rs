//! Bidirectional Path Tracing (BDPT)

mod density;
mod mis;
mod vertex;

use lucent_core::camera::*;
use lucent_core::geometry::*;
use lucent_core::integrator::*;
use lucent_core::interaction::*;
use lucent_core::light::*;
use lucent_core::pbrt::*;
use lucent_core::reflection::*;
use lucent_core::sampler::*;
use lucent_core::sampling::*;
use lucent_core::scene::*;
use lucent_core::spectrum::*;
use std::sync::Arc;

// Re-export.
pub use density::*;
pub use mis::*;
pub use vertex::*;

/// Settings for the bidirectional path tracer.
#[derive(Copy, Clone, Debug)]
pub struct BDPTConfig {
    /// Maximum number of bounces.
    pub max_depth: usize,

    /// Samples taken per pixel.
    pub samples_per_pixel: usize,

    /// Seed for the per-worker random streams.
    pub seed: u64,

    /// How connection strategies are weighted.
    pub mis: MISHeuristic,

    /// How lights are chosen for light subpaths and direct connections.
    pub light_strategy: LightSampleStrategy,
}

impl Default for BDPTConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            samples_per_pixel: 16,
            seed: 0,
            mis: MISHeuristic::Balance,
            light_strategy: LightSampleStrategy::Uniform,
        }
    }
}

/// Implements bidirectional path tracing. Every sample traces one camera
/// and one light subpath and combines all ways of joining them with
/// multiple importance sampling.
pub struct BDPTIntegrator {
    /// Common data for sampler integrators.
    pub data: SamplerIntegratorData,

    /// How connection strategies are weighted.
    mis: MISHeuristic,

    /// Light sampling strategy.
    light_strategy: LightSampleStrategy,

    /// Light distribution. Set in `preprocess()`.
    light_distribution: LightDistribution,
}

impl BDPTIntegrator {
    /// Create a new `BDPTIntegrator`.
    ///
    /// * `config` - The settings.
    pub fn new(config: BDPTConfig) -> Result<Self, RenderError> {
        Ok(Self {
            data: SamplerIntegratorData::new(
                config.max_depth,
                config.samples_per_pixel,
                config.seed,
            )?,
            mis: config.mis,
            light_strategy: config.light_strategy,
            light_distribution: LightDistribution::new(config.light_strategy, &[]),
        })
    }
}

impl Integrator for BDPTIntegrator {
    fn name(&self) -> &'static str {
        "bdpt"
    }

    /// Builds the light distribution. Light subpaths need a light to start
    /// from so scenes without lights are rejected.
    ///
    /// * `scene` - The scene.
    fn preprocess(&mut self, scene: &Scene) -> Result<(), RenderError> {
        if scene.lights.is_empty() {
            error!("Bidirectional path tracing needs at least one light");
            return Err(RenderError::NoLights);
        }
        self.light_distribution = LightDistribution::new(self.light_strategy, &scene.lights);
        Ok(())
    }

    fn render(&self, scene: &Scene, ctx: &mut RenderContext) -> Result<(), RenderError> {
        self.render_tiles(scene, ctx)
    }
}

impl SamplerIntegrator for BDPTIntegrator {
    fn get_data(&self) -> &SamplerIntegratorData {
        &self.data
    }

    /// Returns the radiance arriving at the camera through a raster position
    /// summed over every connection strategy.
    ///
    /// * `p_raster` - Raster position of the sample.
    /// * `scene`    - The scene.
    /// * `camera`   - The camera.
    /// * `sampler`  - The sampler.
    fn li(
        &self,
        p_raster: &Point2f,
        scene: &Scene,
        camera: &RasterCamera,
        sampler: &mut dyn Sampler,
    ) -> Spectrum {
        let max_depth = self.data.max_depth;

        // Trace the camera and light subpaths.
        let camera_path = generate_camera_subpath(scene, camera, sampler, max_depth + 2, p_raster);
        let light_path =
            generate_light_subpath(scene, sampler, max_depth + 1, &self.light_distribution);

        // Execute all strategies. At least two camera vertices are needed
        // since contributions always land on the sample's own pixel. Direct
        // lighting (`t = 1`) does not depend on the light subpath.
        let mut l = Spectrum::ZERO;
        for s in 2..=camera_path.len() {
            for t in 0..=light_path.len().max(1) {
                if s + t - 2 > max_depth {
                    continue;
                }
                let l_path = connect(
                    scene,
                    &camera_path,
                    &light_path,
                    s,
                    t,
                    &self.light_distribution,
                    self.mis,
                    sampler,
                );
                trace!("Connect s: {s}, t: {t}, L: {l_path:?}");
                l += l_path;
            }
        }
        l
    }
}

/// Direction of a subpath walk.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TransportMode {
    /// The walk starts at the camera.
    Radiance,

    /// The walk starts at a light.
    Importance,
}

/// Generates a camera subpath with at most `max_vertices` vertices through
/// a raster position.
///
/// * `scene`        - The scene.
/// * `camera`       - The camera.
/// * `sampler`      - The sampler.
/// * `max_vertices` - Maximum number of vertices.
/// * `p_raster`     - Raster position.
pub(crate) fn generate_camera_subpath(
    scene: &Scene,
    camera: &RasterCamera,
    sampler: &mut dyn Sampler,
    max_vertices: usize,
    p_raster: &Point2f,
) -> Vec<Vertex> {
    let mut path = Vec::with_capacity(max_vertices);
    if max_vertices == 0 {
        return path;
    }

    // Sample initial ray for camera subpath.
    let ray = camera.generate_ray_differential(p_raster);
    let (_pdf_pos, pdf_dir) = camera.pdf_we(&ray);

    // Generate first vertex on camera subpath and start random walk.
    path.push(Vertex::camera(camera.origin()));
    random_walk(
        scene,
        ray,
        sampler,
        Spectrum::ONE,
        pdf_dir,
        max_vertices - 1,
        TransportMode::Radiance,
        &mut path,
    );
    path
}

/// Generates a light subpath with at most `max_vertices` vertices starting
/// at a light chosen from `distrib`.
///
/// * `scene`        - The scene.
/// * `sampler`      - The sampler.
/// * `max_vertices` - Maximum number of vertices.
/// * `distrib`      - Distribution used to choose the light.
pub(crate) fn generate_light_subpath(
    scene: &Scene,
    sampler: &mut dyn Sampler,
    max_vertices: usize,
    distrib: &LightDistribution,
) -> Vec<Vertex> {
    let mut path = Vec::with_capacity(max_vertices);
    if max_vertices == 0 {
        return path;
    }

    // Sample initial ray for light subpath.
    let (light_num, light_pdf) = match distrib.sample(sampler.get_1d()) {
        Some(s) => s,
        None => return path,
    };
    let light = &scene.lights[light_num];
    let u1 = sampler.get_2d();
    let u2 = sampler.get_2d();
    let Le {
        ray,
        n_light,
        pdf_pos,
        pdf_dir,
        value: le,
    } = light.sample_le(&u1, &u2);
    if light_pdf == 0.0 || pdf_pos == 0.0 || pdf_dir == 0.0 || le.is_black() {
        return path;
    }

    // Generate first vertex on light subpath and start random walk.
    path.push(Vertex::light(
        Arc::clone(light),
        &ray,
        n_light,
        le,
        pdf_pos * light_pdf,
    ));
    let beta = le * n_light.abs_dot(&ray.d) / (light_pdf * pdf_pos * pdf_dir);
    let d = ray.d;
    random_walk(
        scene,
        ray,
        sampler,
        beta,
        pdf_dir,
        max_vertices - 1,
        TransportMode::Importance,
        &mut path,
    );

    // Correct subpath sampling densities for infinite area lights.
    if path[0].is_infinite_light() {
        if let Some(v) = path.get_mut(1) {
            v.pdf_fwd = pdf_pos;
            if v.is_on_surface() {
                v.pdf_fwd *= d.abs_dot(&v.ng());
            }
        }
        path[0].pdf_fwd = infinite_light_density(scene, distrib, &d);
    }
    path
}

/// Extends a subpath by sampling BSDFs until it leaves the scene, is
/// absorbed or holds `max_vertices` more vertices. Each new vertex records
/// its forward density and sets the reverse density of its predecessor.
///
/// * `scene`        - The scene.
/// * `ray`          - The ray leaving the last vertex of `path`.
/// * `sampler`      - The sampler.
/// * `beta`         - Throughput of the subpath so far.
/// * `pdf`          - Solid angle density of `ray.d`.
/// * `max_vertices` - Maximum number of vertices to add.
/// * `mode`         - Which end the walk started from.
/// * `path`         - The subpath, holding at least its first vertex.
#[allow(clippy::too_many_arguments)]
fn random_walk(
    scene: &Scene,
    mut ray: Ray,
    sampler: &mut dyn Sampler,
    mut beta: Spectrum,
    pdf: Float,
    max_vertices: usize,
    mode: TransportMode,
    path: &mut Vec<Vertex>,
) {
    if max_vertices == 0 {
        return;
    }

    let mut bounces = 0;
    let mut pdf_fwd = pdf;
    loop {
        trace!("Random walk. Bounces {bounces}, beta {beta:?}, pdf_fwd {pdf_fwd}");
        let prev = path.len() - 1;

        let mut si = match scene.intersect(&mut ray) {
            Some(si) => si,
            None => {
                // Capture escaped rays when tracing from the camera.
                if mode == TransportMode::Radiance {
                    path.push(Vertex::escaped(&ray, beta, pdf_fwd));
                }
                break;
            }
        };

        // Compute scattering functions and pass through surfaces without a
        // material.
        si.compute_scattering_functions();
        if si.bsdf.is_none() {
            ray = si.hit.spawn_ray(&ray.d);
            continue;
        }

        let vertex = Vertex::surface(si, beta, pdf_fwd, &path[prev]);
        path.push(vertex);
        bounces += 1;
        if bounces >= max_vertices {
            break;
        }

        // Sample BSDF at current vertex and compute reverse probability.
        let current = &path[prev + 1];
        let bsdf = match current.bsdf.as_ref() {
            Some(bsdf) => bsdf,
            None => break,
        };
        let wo = current.hit.wo;
        let BxDFSample {
            f,
            pdf,
            wi,
            bxdf_type,
        } = bsdf.sample_f(&wo, &sampler.get_2d(), BxDFType::BSDF_ALL);
        if f.is_black() || pdf == 0.0 {
            break;
        }
        pdf_fwd = pdf;
        beta *= f * wi.abs_dot(&current.ns) / pdf;
        let mut pdf_rev = bsdf.pdf(&wi, &wo, BxDFType::BSDF_ALL);
        ray = current.hit.spawn_ray(&wi);

        if bxdf_type.contains(BxDFType::BSDF_SPECULAR) {
            path[prev + 1].delta = true;
            pdf_rev = 0.0;
            pdf_fwd = 0.0;
        }

        // Compute reverse area density at preceding vertex.
        path[prev].pdf_rev = to_area_density(pdf_rev, &path[prev + 1], &path[prev]);
    }
}

/// Returns the geometry term between two vertices, or zero if they cannot
/// see each other.
///
/// * `scene` - The scene.
/// * `v0`    - First vertex.
/// * `v1`    - Second vertex.
fn g(scene: &Scene, v0: &Vertex, v1: &Vertex) -> Float {
    let d = v0.p() - v1.p();
    let dist2 = d.length_squared();
    if dist2 == 0.0 {
        return 0.0;
    }
    let mut g = 1.0 / dist2;
    let d = d * g.sqrt();
    if v0.is_on_surface() {
        g *= v0.ns.abs_dot(&d);
    }
    if v1.is_on_surface() {
        g *= v1.ns.abs_dot(&d);
    }
    if VisibilityTester::new(v0.hit, v1.hit).unoccluded(scene) {
        g
    } else {
        0.0
    }
}

/// Samples a point on a light as seen from `pt`. Returns the light vertex,
/// the direction towards it and the shadow ray endpoints.
///
/// * `scene`   - The scene.
/// * `pt`      - The receiving camera subpath vertex.
/// * `distrib` - Distribution used to choose the light.
/// * `sampler` - The sampler.
fn sample_light_vertex(
    scene: &Scene,
    pt: &Vertex,
    distrib: &LightDistribution,
    sampler: &mut dyn Sampler,
) -> Option<(Vertex, Vector3f, Option<VisibilityTester>)> {
    let (light_num, light_pmf) = distrib.sample(sampler.get_1d())?;
    let light = &scene.lights[light_num];
    let Li {
        wi,
        pdf,
        visibility,
        value,
    } = light.sample_li(&pt.hit, &sampler.get_2d());
    if pdf == 0.0 || light_pmf == 0.0 || value.is_black() {
        return None;
    }

    let p_light = visibility.map_or_else(|| Hit::new_minimal(pt.p() + wi), |vis| vis.p1);
    let mut sampled = Vertex::light_from_hit(Arc::clone(light), p_light, value / (pdf * light_pmf));
    sampled.pdf_fwd = sampled.pdf_light_origin(scene, pt, distrib);
    Some((sampled, wi, visibility))
}

/// Joins the first `s` vertices of the camera subpath with the first `t`
/// vertices of the light subpath and returns the weighted contribution.
/// `s` must be at least 2.
///
/// * `scene`       - The scene.
/// * `camera_path` - The camera subpath.
/// * `light_path`  - The light subpath.
/// * `s`           - Number of camera subpath vertices.
/// * `t`           - Number of light subpath vertices.
/// * `distrib`     - Distribution used to choose lights.
/// * `heuristic`   - How strategies are weighted.
/// * `sampler`     - The sampler.
#[allow(clippy::too_many_arguments)]
pub(crate) fn connect(
    scene: &Scene,
    camera_path: &[Vertex],
    light_path: &[Vertex],
    s: usize,
    t: usize,
    distrib: &LightDistribution,
    heuristic: MISHeuristic,
    sampler: &mut dyn Sampler,
) -> Spectrum {
    // The `t = 1` strategy samples its own light vertex.
    assert!(s >= 2 && s <= camera_path.len() && (t == 1 || t <= light_path.len()));
    let pt = &camera_path[s - 1];
    let pt_prev = &camera_path[s - 2];

    // Escaped camera rays can only be completed by themselves.
    if t > 0 && pt.kind == VertexKind::Light {
        return Spectrum::ZERO;
    }

    // Perform connection and compute the unweighted contribution.
    let mut sampled: Option<Vertex> = None;
    let l = match t {
        0 => {
            // Interpret the camera subpath as a complete path.
            if pt.is_light() {
                pt.le(scene, pt_prev) * pt.beta
            } else {
                Spectrum::ZERO
            }
        }
        1 => {
            // Sample a point on a light and connect it to the camera subpath.
            if !pt.is_connectible() {
                return Spectrum::ZERO;
            }
            match sample_light_vertex(scene, pt, distrib, sampler) {
                Some((v, wi, visibility)) => {
                    let mut l = pt.beta * pt.f(&v) * v.beta;
                    if pt.is_on_surface() {
                        l *= wi.abs_dot(&pt.ns);
                    }
                    // Only check visibility if the path would carry radiance.
                    if !l.is_black() && !visibility.map_or(true, |vis| vis.unoccluded(scene)) {
                        l = Spectrum::ZERO;
                    }
                    sampled = Some(v);
                    l
                }
                None => Spectrum::ZERO,
            }
        }
        _ => {
            // Handle all other bidirectional connection cases.
            let qs = &light_path[t - 1];
            if qs.is_connectible() && pt.is_connectible() {
                let l = qs.beta * qs.f(pt) * pt.f(qs) * pt.beta;
                if l.is_black() {
                    l
                } else {
                    l * g(scene, qs, pt)
                }
            } else {
                Spectrum::ZERO
            }
        }
    };
    debug_assert!(!l.has_nans());
    if l.is_black() {
        return Spectrum::ZERO;
    }

    // Lookup connection vertices and their predecessors on the light side.
    let qs: Option<&Vertex> = match t {
        0 => None,
        1 => sampled.as_ref(),
        _ => Some(&light_path[t - 1]),
    };
    let qs_prev = if t >= 2 { Some(&light_path[t - 2]) } else { None };

    // Densities of the joined path. The subpaths are left untouched.
    let mut camera_d: Vec<Densities> = camera_path[..s].iter().map(Vertex::densities).collect();
    let mut light_d: Vec<Densities> = match t {
        1 => qs.iter().map(|v| v.densities()).collect(),
        _ => light_path[..t].iter().map(Vertex::densities).collect(),
    };

    camera_d[s - 1].delta = false;
    camera_d[s - 1].pdf_rev = match qs {
        Some(qs) => qs.pdf(scene, qs_prev, pt),
        None => pt.pdf_light_origin(scene, pt_prev, distrib),
    };
    camera_d[s - 2].pdf_rev = match qs {
        Some(qs) => pt.pdf(scene, Some(qs), pt_prev),
        None => pt.pdf_light(scene, pt_prev),
    };
    if let Some(qs) = qs {
        light_d[t - 1].delta = false;
        light_d[t - 1].pdf_rev = pt.pdf(scene, Some(pt_prev), qs);
        if let Some(qs_prev) = qs_prev {
            light_d[t - 2].pdf_rev = qs.pdf(scene, Some(pt), qs_prev);
        }
    }

    let light_origin_delta = match t {
        0 => false,
        1 => qs.map_or(false, Vertex::is_delta_light),
        _ => light_path[0].is_delta_light(),
    };

    let mis_wt = mis_weight(&camera_d, &light_d, light_origin_delta, heuristic);
    debug_assert!(!mis_wt.is_nan());
    l * mis_wt
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use lights::*;
    use lucent_core::material::*;
    use lucent_core::primitives::*;
    use shapes::*;

    /// A white floor at z = 0 under a point light, seen from above.
    fn floor_scene() -> Scene {
        let floor: ArcPrimitive = Arc::new(GeometricPrimitive::new(
            Arc::new(Quad::new(
                Point3f::new(-5.0, -5.0, 0.0),
                Vector3f::new(10.0, 0.0, 0.0),
                Vector3f::new(0.0, 10.0, 0.0),
                false,
            )),
            Some(Arc::new(Material::matte(Spectrum::new(0.5)))),
            None,
        ));
        let light: ArcLight = Arc::new(PointLight::new(Point3f::new(0.0, 0.0, 2.0), Spectrum::ONE));
        Scene::new(Arc::new(PrimitiveList::new(vec![floor])), vec![light])
    }

    struct Fixed(Float);

    impl Sampler for Fixed {
        fn get_1d(&mut self) -> Float {
            self.0
        }
    }

    #[test]
    fn camera_subpath_records_densities() {
        let scene = floor_scene();
        let camera_vertex = Vertex::camera(Point3f::new(0.0, 0.0, 1.0));
        let mut path = vec![camera_vertex];
        let ray = Ray::new(Point3f::new(0.0, 0.0, 1.0), Vector3f::new(0.0, 0.0, -1.0), INFINITY);
        let mut sampler = Fixed(0.5);
        random_walk(
            &scene,
            ray,
            &mut sampler,
            Spectrum::ONE,
            2.0,
            3,
            TransportMode::Radiance,
            &mut path,
        );

        // Floor, then a bounce straight up that escapes.
        assert_eq!(path.len(), 3);
        assert_eq!(path[1].kind, VertexKind::Surface);
        assert!(approx_eq!(Float, path[1].pdf_fwd, 2.0, epsilon = 1e-4));
        assert_eq!(path[2].kind, VertexKind::Light);
        assert!(path[2].is_infinite_light());

        // Reverse density of the camera vertex: cosine density straight up,
        // no cosine at the pinhole.
        assert!(approx_eq!(Float, path[0].pdf_rev, INV_PI, epsilon = 1e-4));
    }

    #[test]
    fn light_subpath_starts_on_the_light() {
        let scene = floor_scene();
        let distrib = LightDistribution::new(LightSampleStrategy::Uniform, &scene.lights);
        let mut sampler = Fixed(0.75);
        let path = generate_light_subpath(&scene, &mut sampler, 1, &distrib);
        assert_eq!(path.len(), 1);
        assert!(path[0].is_delta_light());
        assert_eq!(path[0].pdf_fwd, 1.0);
    }

    #[test]
    fn direct_connection_matches_closed_form() {
        let scene = floor_scene();
        let distrib = LightDistribution::new(LightSampleStrategy::Uniform, &scene.lights);
        let camera_vertex = Vertex::camera(Point3f::new(0.0, 0.0, 1.0));
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let dpdu = Vector3f::new(1.0, 0.0, 0.0);
        let mut si = SurfaceInteraction::new(Point3f::ZERO, Point2f::default(), n, n, dpdu);
        si.material = Some(Arc::new(Material::matte(Spectrum::new(0.5))));
        si.compute_scattering_functions();
        let surface = Vertex::surface(si, Spectrum::ONE, 1.0, &camera_vertex);
        let camera_path = vec![camera_vertex, surface];

        let mut sampler = Fixed(0.5);
        let mis = MISHeuristic::Balance;
        let l = connect(&scene, &camera_path, &[], 2, 1, &distrib, mis, &mut sampler);

        // Only direct lighting can reach a point light: (0.5 / π) · 1 / 4.
        let expected = 0.5 * INV_PI / 4.0;
        assert!(approx_eq!(Float, l[0], expected, epsilon = 1e-5));
    }

    #[test]
    fn scenes_without_lights_are_rejected() {
        let mut integrator = BDPTIntegrator::new(BDPTConfig::default()).unwrap();
        let scene = Scene::new(Arc::new(PrimitiveList::new(vec![])), vec![]);
        assert_eq!(integrator.preprocess(&scene), Err(RenderError::NoLights));
    }
}
