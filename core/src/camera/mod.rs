//! Camera

use crate::geometry::*;
use crate::integrator::RenderError;
use crate::pbrt::*;

/// Camera trait provides the view and projection used to generate rays.
pub trait Camera {
    /// Returns the world to camera space transformation. Camera space has
    /// +z forward, +y up and +x right.
    fn view(&self) -> Matrix4x4;

    /// Returns the camera to normalized device coordinates transformation.
    /// The visible image spans [-1, 1] on x and y and the near plane maps to
    /// z = 0.
    ///
    /// * `aspect` - Image width divided by height.
    fn projection(&self, aspect: Float) -> Matrix4x4;
}

/// A camera bound to a raster resolution. It is built once per render from
/// a `Camera`'s view and projection and generates primary rays for raster
/// positions.
#[derive(Copy, Clone, Debug)]
pub struct RasterCamera {
    /// Raster to world space transformation.
    raster_to_world: Matrix4x4,

    /// World to raster space transformation.
    world_to_raster: Matrix4x4,

    /// Position of the pinhole in world space.
    origin: Point3f,

    /// Viewing direction in world space.
    forward: Vector3f,

    /// Area covered by the image plane bounds at z=1 in camera space.
    a: Float,

    /// Image width.
    width: usize,

    /// Image height.
    height: usize,
}

impl RasterCamera {
    /// Create a new raster camera.
    ///
    /// * `camera` - The camera.
    /// * `width`  - Image width in pixels.
    /// * `height` - Image height in pixels.
    pub fn new(camera: &dyn Camera, width: usize, height: usize) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage { width, height });
        }

        let view = camera.view();
        let projection = camera.projection(width as Float / height as Float);
        let camera_to_world = view.inverse().ok_or(RenderError::SingularCamera)?;
        let ndc_to_camera = projection.inverse().ok_or(RenderError::SingularCamera)?;

        let (w, h) = (width as Float, height as Float);
        let raster_to_ndc = Matrix4x4 {
            m: [
                [2.0 / w, 0.0, 0.0, -1.0],
                [0.0, -2.0 / h, 0.0, 1.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        };
        let raster_to_world = camera_to_world * ndc_to_camera * raster_to_ndc;
        let world_to_raster = raster_to_world.inverse().ok_or(RenderError::SingularCamera)?;

        // Compute the image plane bounds at z=1.
        let mut p_min = ndc_to_camera.transform_point(&Point3f::new(-1.0, -1.0, 0.0));
        let mut p_max = ndc_to_camera.transform_point(&Point3f::new(1.0, 1.0, 0.0));
        p_min /= p_min.z;
        p_max /= p_max.z;
        let a = ((p_max.x - p_min.x) * (p_max.y - p_min.y)).abs();

        Ok(Self {
            raster_to_world,
            world_to_raster,
            origin: camera_to_world.transform_point(&Point3f::ZERO),
            forward: camera_to_world
                .transform_vector(&Vector3f::new(0.0, 0.0, 1.0))
                .normalize(),
            a,
            width,
            height,
        })
    }

    /// Returns the image width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the pinhole position.
    pub fn origin(&self) -> Point3f {
        self.origin
    }

    /// Returns a ray leaving the pinhole through a raster position.
    ///
    /// * `p_raster` - The raster position.
    pub fn generate_ray(&self, p_raster: &Point2f) -> Ray {
        Ray::new(self.origin, self.direction(p_raster), INFINITY)
    }

    /// Returns a ray through a raster position with differentials for rays
    /// shifted one pixel in x and y.
    ///
    /// * `p_raster` - The raster position.
    pub fn generate_ray_differential(&self, p_raster: &Point2f) -> Ray {
        let mut ray = self.generate_ray(p_raster);
        ray.differentials = Some(RayDifferential::new(
            self.origin,
            self.origin,
            self.direction(&Point2f::new(p_raster.x + 1.0, p_raster.y)),
            self.direction(&Point2f::new(p_raster.x, p_raster.y + 1.0)),
        ));
        ray
    }

    /// Return the spatial and directional PDFs, as a tuple, for sampling a
    /// particular ray leaving the camera. Rays that miss the image have zero
    /// density.
    ///
    /// * `ray` - The ray.
    pub fn pdf_we(&self, ray: &Ray) -> (Float, Float) {
        let cos_theta = ray.d.normalize().dot(&self.forward);
        if cos_theta <= 0.0 || self.raster_of(&ray.d).is_none() {
            return (0.0, 0.0);
        }
        (1.0, 1.0 / (self.a * cos_theta * cos_theta * cos_theta))
    }

    /// Returns the raster position a direction leaving the pinhole passes
    /// through, or `None` if it misses the image.
    ///
    /// * `d` - The direction.
    pub fn raster_of(&self, d: &Vector3f) -> Option<Point2f> {
        if d.dot(&self.forward) <= 0.0 {
            return None;
        }
        let p = self.world_to_raster.transform_point(&(self.origin + *d));
        let inside = p.x >= 0.0
            && p.y >= 0.0
            && p.x < self.width as Float
            && p.y < self.height as Float;
        if inside {
            Some(Point2f::new(p.x, p.y))
        } else {
            None
        }
    }

    fn direction(&self, p_raster: &Point2f) -> Vector3f {
        let p = self
            .raster_to_world
            .transform_point(&Point3f::new(p_raster.x, p_raster.y, 0.0));
        (p - self.origin).normalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    struct LookDownZ;

    impl Camera for LookDownZ {
        fn view(&self) -> Matrix4x4 {
            Matrix4x4::IDENTITY
        }

        fn projection(&self, aspect: Float) -> Matrix4x4 {
            Matrix4x4::perspective(90.0, aspect, 0.01, 1000.0)
        }
    }

    #[test]
    fn center_ray_looks_forward() {
        let camera = RasterCamera::new(&LookDownZ, 64, 64).unwrap();
        let ray = camera.generate_ray(&Point2f::new(32.0, 32.0));
        assert!(approx_eq!(f32, ray.d.z, 1.0, epsilon = 1e-5));
        assert_eq!(ray.o, Point3f::ZERO);
    }

    #[test]
    fn raster_y_points_down() {
        let camera = RasterCamera::new(&LookDownZ, 64, 64).unwrap();
        let top = camera.generate_ray(&Point2f::new(32.0, 0.0));
        assert!(top.d.y > 0.0);
        let left = camera.generate_ray(&Point2f::new(0.0, 32.0));
        assert!(left.d.x < 0.0);
    }

    #[test]
    fn raster_of_inverts_generate_ray() {
        let camera = RasterCamera::new(&LookDownZ, 80, 60).unwrap();
        let p = Point2f::new(13.25, 47.5);
        let ray = camera.generate_ray(&p);
        let back = camera.raster_of(&ray.d).unwrap();
        assert!(approx_eq!(f32, back.x, p.x, epsilon = 1e-2));
        assert!(approx_eq!(f32, back.y, p.y, epsilon = 1e-2));
        assert!(camera.raster_of(&Vector3f::new(0.0, 0.0, -1.0)).is_none());
    }

    #[test]
    fn pdf_we_matches_film_area() {
        // 90 degree fov spans [-1, 1] at z = 1.
        let camera = RasterCamera::new(&LookDownZ, 32, 32).unwrap();
        let (pdf_pos, pdf_dir) = camera.pdf_we(&Ray::new(
            Point3f::ZERO,
            Vector3f::new(0.0, 0.0, 1.0),
            INFINITY,
        ));
        assert_eq!(pdf_pos, 1.0);
        assert!(approx_eq!(f32, pdf_dir, 0.25, epsilon = 1e-4));

        let behind = Ray::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, -1.0), INFINITY);
        assert_eq!(camera.pdf_we(&behind), (0.0, 0.0));
    }

    #[test]
    fn empty_image_is_rejected() {
        assert!(RasterCamera::new(&LookDownZ, 0, 10).is_err());
    }
}
