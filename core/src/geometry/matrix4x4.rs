//! 4x4 Matrix

use super::{Point3f, Vector3f};
use crate::pbrt::*;
use std::ops::Mul;

/// A 4x4 matrix containing `Float` values in row-major order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Matrix4x4 {
    /// Stores a 2-D array of Float
    pub m: [[Float; 4]; 4],
}

impl Default for Matrix4x4 {
    /// Returns the default as identity matrix.
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4x4 {
    /// Identity matrix.
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Returns the transpose of the matrix.
    pub fn transpose(&self) -> Self {
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = self.m[j][i];
            }
        }
        Self { m }
    }

    /// Returns the inverse of the matrix using Gauss-Jordan elimination with
    /// full pivoting, or `None` if the matrix is singular.
    pub fn inverse(&self) -> Option<Self> {
        let mut indxc = [0; 4];
        let mut indxr = [0; 4];
        let mut ipiv = [0; 4];
        let mut minv = self.m;

        for i in 0..4 {
            let mut irow = 0;
            let mut icol = 0;
            let mut big: Float = 0.0;

            for j in 0..4 {
                if ipiv[j] == 1 {
                    continue;
                }
                for k in 0..4 {
                    match ipiv[k] {
                        0 if minv[j][k].abs() >= big => {
                            big = minv[j][k].abs();
                            irow = j;
                            icol = k;
                        }
                        n if n > 1 => return None,
                        _ => {}
                    }
                }
            }
            ipiv[icol] += 1;

            if irow != icol {
                minv.swap(irow, icol);
            }
            indxr[i] = irow;
            indxc[i] = icol;
            if minv[icol][icol] == 0.0 {
                return None;
            }

            let pivinv = 1.0 / minv[icol][icol];
            minv[icol][icol] = 1.0;
            for v in minv[icol].iter_mut() {
                *v *= pivinv;
            }

            for j in 0..4 {
                if j != icol {
                    let save = minv[j][icol];
                    minv[j][icol] = 0.0;
                    for k in 0..4 {
                        minv[j][k] -= minv[icol][k] * save;
                    }
                }
            }
        }

        for j in (0..4).rev() {
            if indxr[j] != indxc[j] {
                for row in minv.iter_mut() {
                    row.swap(indxr[j], indxc[j]);
                }
            }
        }

        Some(Self { m: minv })
    }

    /// Returns a world-to-camera matrix for a camera at `pos` looking at
    /// `look`. Camera space has +z forward, +y up and +x right.
    ///
    /// * `pos`  - Camera position.
    /// * `look` - Point the camera looks at.
    /// * `up`   - Up vector.
    pub fn look_at(pos: &Point3f, look: &Point3f, up: &Vector3f) -> Option<Self> {
        let dir = (*look - *pos).normalize();
        let right = up.normalize().cross(&dir);
        if right.length() == 0.0 {
            return None;
        }
        let right = right.normalize();
        let new_up = dir.cross(&right);

        let camera_to_world = Self {
            m: [
                [right.x, new_up.x, dir.x, pos.x],
                [right.y, new_up.y, dir.y, pos.y],
                [right.z, new_up.z, dir.z, pos.z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        };
        camera_to_world.inverse()
    }

    /// Returns a perspective projection from camera space to normalized
    /// device coordinates where the visible image spans [-1, 1] on both axes.
    ///
    /// * `fov`    - Field of view in degrees along the shorter image axis.
    /// * `aspect` - Image width divided by height.
    /// * `near`   - Near plane distance.
    /// * `far`    - Far plane distance.
    pub fn perspective(fov: Float, aspect: Float, near: Float, far: Float) -> Self {
        let inv_tan = 1.0 / (fov.to_radians() / 2.0).tan();
        let (sx, sy) = if aspect >= 1.0 {
            (inv_tan / aspect, inv_tan)
        } else {
            (inv_tan, inv_tan * aspect)
        };
        Self {
            m: [
                [sx, 0.0, 0.0, 0.0],
                [0.0, sy, 0.0, 0.0],
                [0.0, 0.0, far / (far - near), -far * near / (far - near)],
                [0.0, 0.0, 1.0, 0.0],
            ],
        }
    }

    /// Transform a point, including the homogeneous divide.
    ///
    /// * `p` - The point.
    pub fn transform_point(&self, p: &Point3f) -> Point3f {
        let m = &self.m;
        let x = m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3];
        let y = m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3];
        let z = m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3];
        let w = m[3][0] * p.x + m[3][1] * p.y + m[3][2] * p.z + m[3][3];
        if w == 1.0 {
            Point3f::new(x, y, z)
        } else {
            Point3f::new(x, y, z) / w
        }
    }

    /// Transform a direction vector. Translation is ignored.
    ///
    /// * `v` - The vector.
    pub fn transform_vector(&self, v: &Vector3f) -> Vector3f {
        let m = &self.m;
        Vector3f::new(
            m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
            m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
            m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
        )
    }
}

impl Mul<Matrix4x4> for Matrix4x4 {
    type Output = Matrix4x4;

    /// Post-multiply the given matrix.
    ///
    /// * `other` - The other matrix
    fn mul(self, other: Matrix4x4) -> Self::Output {
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (0..4).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        Matrix4x4 { m }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    fn assert_identity(m: &Matrix4x4) {
        for i in 0..4 {
            for j in 0..4 {
                assert!(approx_eq!(
                    Float,
                    m.m[i][j],
                    Matrix4x4::IDENTITY.m[i][j],
                    epsilon = 0.0001
                ));
            }
        }
    }

    #[test]
    fn inverse_of_zero_is_none() {
        assert!(Matrix4x4 { m: [[0.0; 4]; 4] }.inverse().is_none());
    }

    #[test]
    fn inverse_of_identity_is_identity() {
        assert_eq!(Matrix4x4::IDENTITY.inverse(), Some(Matrix4x4::IDENTITY));
    }

    #[test]
    fn look_at_maps_eye_to_origin_and_target_to_plus_z() {
        let pos = Point3f::new(1.0, 2.0, 3.0);
        let look = Point3f::new(1.0, 2.0, 10.0);
        let view = Matrix4x4::look_at(&pos, &look, &Vector3f::new(0.0, 1.0, 0.0)).unwrap();
        let o = view.transform_point(&pos);
        assert!(o.length() < 1e-5);
        let t = view.transform_point(&look);
        assert!(approx_eq!(Float, t.z, 7.0, epsilon = 1e-5));
    }

    proptest! {
        #[test]
        fn inverse_of_projection_round_trips(
            fov in 10.0..120.0f32,
            aspect in 0.5..2.0f32,
        ) {
            let p = Matrix4x4::perspective(fov, aspect, 0.01, 1000.0);
            let inv = p.inverse().unwrap();
            assert_identity(&(p * inv));
        }

        #[test]
        fn inverse_of_scale(
            a in 0.001..10.0f32, b in 0.001..10.0f32, c in 0.001..10.0f32,
        ) {
            let m = Matrix4x4 {
                m: [
                    [  a, 0.0, 0.0, 1.0],
                    [0.0,   b, 0.0, 2.0],
                    [0.0, 0.0,   c, 3.0],
                    [0.0, 0.0, 0.0, 1.0],
                ],
            };
            let inv = m.inverse().unwrap();
            assert_identity(&(m * inv));
            assert_identity(&(inv * m));
        }
    }
}
