//! Perspective Camera

use lucent_core::camera::*;
use lucent_core::geometry::*;
use lucent_core::integrator::RenderError;
use lucent_core::pbrt::*;

/// Distance to the near clipping plane.
const NEAR: Float = 1e-2;

/// Distance to the far clipping plane.
const FAR: Float = 1000.0;

/// Perspective pinhole camera.
#[derive(Copy, Clone, Debug)]
pub struct PerspectiveCamera {
    /// World to camera space transformation.
    world_to_camera: Matrix4x4,

    /// The field-of-view angle in degrees along the shorter image axis.
    pub fov: Float,
}

impl PerspectiveCamera {
    /// Create a new perspective camera.
    ///
    /// * `pos`  - Camera position.
    /// * `look` - Point the camera looks at.
    /// * `up`   - Up vector.
    /// * `fov`  - The field-of-view angle in degrees.
    pub fn new(pos: Point3f, look: Point3f, up: Vector3f, fov: Float) -> Result<Self, RenderError> {
        if !(fov > 0.0 && fov < 180.0) {
            return Err(RenderError::invalid(
                "fov",
                format!("{} is not in (0, 180) degrees", fov),
            ));
        }

        let world_to_camera = Matrix4x4::look_at(&pos, &look, &up).ok_or_else(|| {
            error!("Camera at {:?} looking at {:?} has a degenerate up vector", pos, look);
            RenderError::SingularCamera
        })?;

        Ok(Self {
            world_to_camera,
            fov,
        })
    }
}

impl Camera for PerspectiveCamera {
    fn view(&self) -> Matrix4x4 {
        self.world_to_camera
    }

    fn projection(&self, aspect: Float) -> Matrix4x4 {
        Matrix4x4::perspective(self.fov, aspect, NEAR, FAR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(
            Point3f::new(0.0, 1.0, -3.0),
            Point3f::new(0.0, 1.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            60.0,
        )
        .unwrap()
    }

    #[test]
    fn center_ray_goes_towards_look_point() {
        let raster = RasterCamera::new(&camera(), 40, 20).unwrap();
        let ray = raster.generate_ray(&Point2f::new(20.0, 10.0));
        assert!(approx_eq!(f32, ray.o.z, -3.0, epsilon = 1e-5));
        assert!(approx_eq!(f32, ray.d.z, 1.0, epsilon = 1e-5));
    }

    #[test]
    fn raster_y_points_down_and_x_points_right() {
        let raster = RasterCamera::new(&camera(), 40, 40).unwrap();
        let top_left = raster.generate_ray(&Point2f::new(0.0, 0.0));
        assert!(top_left.d.y > 0.0);
        assert!(top_left.d.x < 0.0);

        // The shorter axis spans the field of view.
        let half_angle = top_left.d.y.atan2(top_left.d.z).to_degrees();
        assert!(approx_eq!(f32, half_angle, 30.0, epsilon = 1e-2));
    }

    #[test]
    fn raster_of_inverts_generate_ray() {
        let raster = RasterCamera::new(&camera(), 32, 24).unwrap();
        let p = Point2f::new(7.25, 19.5);
        let ray = raster.generate_ray(&p);
        let q = raster.raster_of(&ray.d).unwrap();
        assert!(approx_eq!(f32, q.x, p.x, epsilon = 1e-3));
        assert!(approx_eq!(f32, q.y, p.y, epsilon = 1e-3));
    }

    #[test]
    fn rejects_bad_settings() {
        let pos = Point3f::ZERO;
        let up = Vector3f::new(0.0, 1.0, 0.0);
        assert!(PerspectiveCamera::new(pos, Point3f::new(0.0, 0.0, 1.0), up, 0.0).is_err());
        assert!(matches!(
            PerspectiveCamera::new(pos, Point3f::new(0.0, 1.0, 0.0), up, 45.0),
            Err(RenderError::SingularCamera)
        ));
    }
}
