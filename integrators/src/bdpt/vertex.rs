//! Path Vertex

use super::density::*;
use super::mis::Densities;
use lucent_core::geometry::*;
use lucent_core::interaction::*;
use lucent_core::light::*;
use lucent_core::pbrt::*;
use lucent_core::reflection::*;
use lucent_core::scene::*;
use lucent_core::spectrum::*;

/// The kind of point a path vertex represents.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VertexKind {
    /// The camera pinhole.
    Camera,

    /// A scattering point on a surface.
    Surface,

    /// A point on a light source, or the end of a ray that escaped the scene.
    Light,
}

/// One point along a camera or light subpath.
#[derive(Clone)]
pub struct Vertex {
    /// Vertex kind.
    pub kind: VertexKind,

    /// Position, geometric normal and outgoing direction. The normal is zero
    /// for points that are not on a surface.
    pub hit: Hit,

    /// Shading normal.
    pub ns: Normal3f,

    /// Throughput of the subpath up to and including this vertex.
    pub beta: Spectrum,

    /// Area density of sampling this vertex from its predecessor.
    pub pdf_fwd: Float,

    /// Area density of sampling this vertex from its successor when the
    /// walk runs the other way.
    pub pdf_rev: Float,

    /// Reached by sampling a Dirac delta distribution.
    pub delta: bool,

    /// The BSDF for surface vertices.
    pub bsdf: Option<BSDF>,

    /// The light for light vertices, or the area light of an emitting
    /// surface. `None` for rays escaping the scene.
    pub light: Option<ArcLight>,
}

impl Vertex {
    fn new(kind: VertexKind, hit: Hit, beta: Spectrum) -> Self {
        Self {
            kind,
            hit,
            ns: hit.n,
            beta,
            pdf_fwd: 0.0,
            pdf_rev: 0.0,
            delta: false,
            bsdf: None,
            light: None,
        }
    }

    /// Returns the vertex at the camera pinhole.
    ///
    /// * `origin` - Position of the pinhole.
    pub fn camera(origin: Point3f) -> Self {
        Self::new(VertexKind::Camera, Hit::new_minimal(origin), Spectrum::ONE)
    }

    /// Returns the first vertex of a light subpath.
    ///
    /// * `light`   - The light.
    /// * `ray`     - The ray leaving the light.
    /// * `n_light` - Normal at the ray origin.
    /// * `le`      - Emitted radiance.
    /// * `pdf`     - Area density of the origin including the light choice.
    pub fn light(light: ArcLight, ray: &Ray, n_light: Normal3f, le: Spectrum, pdf: Float) -> Self {
        let mut v = Self::new(
            VertexKind::Light,
            Hit::new(ray.o, Vector3f::ZERO, n_light),
            le,
        );
        v.light = Some(light);
        v.pdf_fwd = pdf;
        v
    }

    /// Returns a light vertex at a point sampled on a light. The forward
    /// density is filled in by the caller.
    ///
    /// * `light` - The light.
    /// * `hit`   - The sampled point.
    /// * `beta`  - Weight of the sample.
    pub fn light_from_hit(light: ArcLight, hit: Hit, beta: Spectrum) -> Self {
        let mut v = Self::new(VertexKind::Light, hit, beta);
        v.light = Some(light);
        v
    }

    /// Returns the vertex for a ray that left the scene. It stands for every
    /// infinite light at once.
    ///
    /// * `ray`     - The escaping ray.
    /// * `beta`    - Throughput.
    /// * `pdf_fwd` - Directional density of the ray.
    pub fn escaped(ray: &Ray, beta: Spectrum, pdf_fwd: Float) -> Self {
        let mut v = Self::new(
            VertexKind::Light,
            Hit::new(ray.at(1.0), Vector3f::ZERO, -ray.d),
            beta,
        );
        v.pdf_fwd = pdf_fwd;
        v
    }

    /// Returns a surface vertex. The forward density is converted from the
    /// solid angle density at `prev`.
    ///
    /// * `si`   - The surface interaction with scattering functions computed.
    /// * `beta` - Throughput.
    /// * `pdf`  - Solid angle density of the direction sampled at `prev`.
    /// * `prev` - The preceding vertex.
    pub fn surface(si: SurfaceInteraction, beta: Spectrum, pdf: Float, prev: &Vertex) -> Self {
        let mut v = Self::new(VertexKind::Surface, si.hit, beta);
        v.ns = si.shading.n;
        v.bsdf = si.bsdf;
        v.light = si.area_light;
        v.pdf_fwd = to_area_density(pdf, prev, &v);
        v
    }

    /// Returns the position.
    pub fn p(&self) -> Point3f {
        self.hit.p
    }

    /// Returns the geometric normal.
    pub fn ng(&self) -> Normal3f {
        self.hit.n
    }

    /// Returns true if the vertex has a surface normal.
    pub fn is_on_surface(&self) -> bool {
        self.ng() != Normal3f::ZERO
    }

    /// Returns the densities used for multiple importance sampling.
    pub fn densities(&self) -> Densities {
        Densities {
            pdf_fwd: self.pdf_fwd,
            pdf_rev: self.pdf_rev,
            delta: self.delta,
        }
    }

    /// Returns true if the vertex emits light.
    pub fn is_light(&self) -> bool {
        match self.kind {
            VertexKind::Light => true,
            VertexKind::Surface => self.light.is_some(),
            VertexKind::Camera => false,
        }
    }

    /// Returns true for vertices on delta position or delta direction lights.
    pub fn is_delta_light(&self) -> bool {
        self.kind == VertexKind::Light && self.light.as_ref().map_or(false, |l| l.is_delta_light())
    }

    /// Returns true for vertices on lights without a finite position:
    /// infinite lights, distant lights and escaped rays.
    pub fn is_infinite_light(&self) -> bool {
        self.kind == VertexKind::Light
            && self.light.as_ref().map_or(true, |l| {
                let t = l.get_type();
                t.intersects(LightType::INFINITE_LIGHT | LightType::DELTA_DIRECTION_LIGHT)
            })
    }

    /// Returns true if a subpath may be joined to this vertex by a
    /// deterministic connection.
    pub fn is_connectible(&self) -> bool {
        match self.kind {
            VertexKind::Camera => true,
            VertexKind::Light => self
                .light
                .as_ref()
                .map_or(false, |l| !l.get_type().contains(LightType::DELTA_DIRECTION_LIGHT)),
            VertexKind::Surface => self.bsdf.as_ref().map_or(false, |b| {
                b.num_components(BxDFType::BSDF_ALL & !BxDFType::BSDF_SPECULAR) > 0
            }),
        }
    }

    /// Returns the BSDF value for scattering from this vertex's outgoing
    /// direction towards `next`.
    ///
    /// * `next` - The vertex light is scattered to or from.
    pub fn f(&self, next: &Vertex) -> Spectrum {
        let wi = match direction(self, next) {
            Some(wi) => wi,
            None => return Spectrum::ZERO,
        };
        match (self.kind, self.bsdf.as_ref()) {
            (VertexKind::Surface, Some(bsdf)) => bsdf.f(&self.hit.wo, &wi, BxDFType::BSDF_ALL),
            _ => Spectrum::ZERO,
        }
    }

    /// Returns the area density at `next` of continuing a walk that arrived
    /// here from `prev`. Camera vertices return zero since no subpath is
    /// ever connected through the lens.
    ///
    /// * `scene` - The scene.
    /// * `prev`  - The vertex the walk arrived from.
    /// * `next`  - The vertex the density is measured at.
    pub fn pdf(&self, scene: &Scene, prev: Option<&Vertex>, next: &Vertex) -> Float {
        if self.kind == VertexKind::Light {
            return self.pdf_light(scene, next);
        }

        let wn = match direction(self, next) {
            Some(wn) => wn,
            None => return 0.0,
        };
        let pdf = match (self.kind, self.bsdf.as_ref(), prev.and_then(|p| direction(self, p))) {
            (VertexKind::Surface, Some(bsdf), Some(wp)) => bsdf.pdf(&wp, &wn, BxDFType::BSDF_ALL),
            _ => 0.0,
        };
        to_area_density(pdf, self, next)
    }

    /// Returns the area density at `v` of leaving this light vertex towards it.
    ///
    /// * `scene` - The scene.
    /// * `v`     - The vertex the density is measured at.
    pub fn pdf_light(&self, scene: &Scene, v: &Vertex) -> Float {
        let w = v.p() - self.p();
        let dist2 = w.length_squared();
        if dist2 == 0.0 {
            return 0.0;
        }
        let w = w / dist2.sqrt();

        let mut pdf = if self.is_infinite_light() {
            // Rays leave infinite lights through a disk bounding the scene.
            let radius = scene.world_radius();
            if radius > 0.0 {
                1.0 / (PI * radius * radius)
            } else {
                0.0
            }
        } else {
            match self.light.as_ref() {
                Some(light) => {
                    let ray = Ray::new(self.p(), w, INFINITY);
                    light.pdf_le(&ray, &self.ng()).pdf_dir / dist2
                }
                None => 0.0,
            }
        };
        if v.is_on_surface() {
            pdf *= v.ng().abs_dot(&w);
        }
        pdf
    }

    /// Returns the area density of choosing this vertex as the origin of a
    /// light subpath heading towards `v`, including the light choice.
    ///
    /// * `scene`   - The scene.
    /// * `v`       - The next vertex on the light subpath.
    /// * `distrib` - Distribution used to choose lights.
    pub fn pdf_light_origin(
        &self,
        scene: &Scene,
        v: &Vertex,
        distrib: &LightDistribution,
    ) -> Float {
        let w = match direction(self, v) {
            Some(w) => w,
            None => return 0.0,
        };
        if self.is_infinite_light() {
            return infinite_light_density(scene, distrib, &w);
        }
        match self.light.as_ref() {
            Some(light) => {
                let pdf_choice = scene.light_index(light).map_or(0.0, |i| distrib.pmf(i));
                let ray = Ray::new(self.p(), w, INFINITY);
                light.pdf_le(&ray, &self.ng()).pdf_pos * pdf_choice
            }
            None => 0.0,
        }
    }

    /// Returns the radiance emitted from this vertex towards `v`.
    ///
    /// * `scene` - The scene.
    /// * `v`     - The receiving vertex.
    pub fn le(&self, scene: &Scene, v: &Vertex) -> Spectrum {
        if !self.is_light() {
            return Spectrum::ZERO;
        }
        let w = match direction(self, v) {
            Some(w) => w,
            None => return Spectrum::ZERO,
        };
        if self.is_infinite_light() {
            let ray = Ray::new(self.p(), -w, INFINITY);
            scene
                .infinite_lights
                .iter()
                .fold(Spectrum::ZERO, |acc, light| acc + light.le(&ray))
        } else {
            self.light
                .as_ref()
                .map_or(Spectrum::ZERO, |light| light.l(&self.hit, &w))
        }
    }
}

/// Returns the unit direction from one vertex to another, or `None` if they
/// coincide.
fn direction(from: &Vertex, to: &Vertex) -> Option<Vector3f> {
    let w = to.p() - from.p();
    let dist2 = w.length_squared();
    if dist2 == 0.0 {
        None
    } else {
        Some(w / dist2.sqrt())
    }
}

/// Returns the density of light subpath origins on infinite lights for
/// rays leaving in direction `w`, summed over all infinite lights and
/// weighted by the probability of choosing each.
///
/// * `scene`   - The scene.
/// * `distrib` - Distribution used to choose lights.
/// * `w`       - Direction the light subpath travels in.
pub fn infinite_light_density(scene: &Scene, distrib: &LightDistribution, w: &Vector3f) -> Float {
    let hit = Hit::default();
    scene
        .infinite_lights
        .iter()
        .map(|light| {
            let pmf = scene.light_index(light).map_or(0.0, |i| distrib.pmf(i));
            light.pdf_li(&hit, &(-*w)) * pmf
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use lights::*;
    use lucent_core::material::*;
    use lucent_core::primitives::*;
    use shapes::*;
    use std::sync::Arc;

    fn empty_scene(lights: Vec<ArcLight>) -> Scene {
        Scene::new(Arc::new(PrimitiveList::new(vec![])), lights)
    }

    fn surface(material: Material, p: Point3f, n: Normal3f) -> SurfaceInteraction {
        let mut si = SurfaceInteraction::new(p, Point2f::default(), n, n, coordinate_system(&n).0);
        si.material = Some(Arc::new(material));
        si.compute_scattering_functions();
        si
    }

    #[test]
    fn mirror_vertices_are_not_connectible() {
        let camera = Vertex::camera(Point3f::new(0.0, 0.0, 5.0));
        let n = Normal3f::new(0.0, 0.0, 1.0);
        let matte_si = surface(Material::matte(Spectrum::new(0.5)), Point3f::ZERO, n);
        let matte = Vertex::surface(matte_si, Spectrum::ONE, 1.0, &camera);
        let mirror_si = surface(Material::mirror(Spectrum::ONE), Point3f::ZERO, n);
        let mirror = Vertex::surface(mirror_si, Spectrum::ONE, 1.0, &camera);
        assert!(matte.is_connectible());
        assert!(!mirror.is_connectible());
        assert!(camera.is_connectible());
    }

    #[test]
    fn escaped_vertex_is_an_infinite_light() {
        let ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 1.0, 0.0), INFINITY);
        let v = Vertex::escaped(&ray, Spectrum::ONE, 0.5);
        assert!(v.is_light());
        assert!(v.is_infinite_light());
        assert!(!v.is_delta_light());
        assert!(!v.is_connectible());
        assert_eq!(v.pdf_fwd, 0.5);
    }

    #[test]
    fn escaped_vertex_returns_infinite_light_radiance() {
        let sky: ArcLight = Arc::new(UniformInfiniteLight::new(Spectrum::new(2.0)));
        let scene = empty_scene(vec![sky]);
        let camera = Vertex::camera(Point3f::ZERO);
        let ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), INFINITY);
        let v = Vertex::escaped(&ray, Spectrum::ONE, 1.0);
        assert_eq!(v.le(&scene, &camera), Spectrum::new(2.0));
    }

    #[test]
    fn point_light_vertex_densities() {
        let light: ArcLight = Arc::new(PointLight::new(Point3f::ZERO, Spectrum::ONE));
        let scene = empty_scene(vec![Arc::clone(&light)]);
        let distrib = LightDistribution::new(LightSampleStrategy::Uniform, &scene.lights);
        let ray = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), INFINITY);
        let v = Vertex::light(light, &ray, ray.d, Spectrum::ONE, 1.0);
        assert!(v.is_delta_light());

        let n = Normal3f::new(0.0, 0.0, -1.0);
        let target = Vertex::surface(
            surface(Material::matte(Spectrum::new(0.5)), Point3f::new(0.0, 0.0, 2.0), n),
            Spectrum::ONE,
            1.0,
            &v,
        );
        // Uniform sphere density over distance squared, normal faces the light.
        let expected = INV_FOUR_PI / 4.0;
        assert!(approx_eq!(Float, v.pdf_light(&scene, &target), expected, epsilon = 1e-6));
        assert!(approx_eq!(Float, target.pdf_fwd, 0.25, epsilon = 1e-6));
        assert_eq!(v.pdf_light_origin(&scene, &target, &distrib), 0.0);
    }

    #[test]
    fn area_light_vertex_emits_towards_front() {
        let shape: ArcShape = Arc::new(Disk::new(
            Point3f::ZERO,
            Normal3f::new(0.0, 0.0, 1.0),
            1.0,
            false,
        ));
        let light: ArcLight = Arc::new(DiffuseAreaLight::new(Spectrum::new(3.0), shape, false));
        let scene = empty_scene(vec![Arc::clone(&light)]);
        let distrib = LightDistribution::new(LightSampleStrategy::Uniform, &scene.lights);

        let hit = Hit::new(Point3f::ZERO, Vector3f::ZERO, Normal3f::new(0.0, 0.0, 1.0));
        let v = Vertex::light_from_hit(light, hit, Spectrum::ONE);
        let above = Vertex::camera(Point3f::new(0.0, 0.0, 1.0));
        let below = Vertex::camera(Point3f::new(0.0, 0.0, -1.0));
        assert_eq!(v.le(&scene, &above), Spectrum::new(3.0));
        assert!(v.le(&scene, &below).is_black());
        assert!(approx_eq!(
            Float,
            v.pdf_light_origin(&scene, &above, &distrib),
            1.0 / PI,
            epsilon = 1e-6
        ));
    }
}
