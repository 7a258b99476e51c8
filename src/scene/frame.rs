//! Position / rotation / scale frames and the matrix helpers built on them

use crate::float_types::Real;
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Translation3, UnitQuaternion, Vector3};

/// A rigid placement with scale, composed as translate · rotate · scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub position: Vector3<Real>,
    pub rotation: UnitQuaternion<Real>,
    pub scale: Vector3<Real>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::identity()
    }
}

impl Frame {
    pub fn identity() -> Self {
        Frame {
            position: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }

    pub fn from_position(x: Real, y: Real, z: Real) -> Self {
        Frame {
            position: Vector3::new(x, y, z),
            ..Self::identity()
        }
    }

    /// Replace the rotation with one built from Euler angles in degrees,
    /// applied X first, then Y, then Z.
    pub fn with_rotation_degrees(mut self, x_deg: Real, y_deg: Real, z_deg: Real) -> Self {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), x_deg.to_radians());
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), y_deg.to_radians());
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), z_deg.to_radians());
        self.rotation = UnitQuaternion::from_rotation_matrix(&(rz * ry * rx));
        self
    }

    pub fn with_scale(mut self, sx: Real, sy: Real, sz: Real) -> Self {
        self.scale = Vector3::new(sx, sy, sz);
        self
    }

    /// Homogeneous matrix mapping frame-local points into the parent space.
    pub fn to_matrix(&self) -> Matrix4<Real> {
        Translation3::from(self.position).to_homogeneous()
            * self.rotation.to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    pub fn transform_point(&self, point: &Point3<Real>) -> Point3<Real> {
        self.to_matrix().transform_point(point)
    }

    /// Parent-space point back into this frame; `None` for zero scale.
    pub fn inverse_transform_point(&self, point: &Point3<Real>) -> Option<Point3<Real>> {
        Some(self.to_matrix().try_inverse()?.transform_point(point))
    }

    /// The frame's local +X axis in parent space (rotation only, unit length).
    pub fn right(&self) -> Vector3<Real> {
        self.rotation * Vector3::x()
    }
}

/// Upper-left 3×3 block of an affine matrix.
#[inline]
pub fn linear_part(matrix: &Matrix4<Real>) -> Matrix3<Real> {
    matrix.fixed_view::<3, 3>(0, 0).clone_owned()
}

/// Carry a plane normal through an affine map.
///
/// `inverse` is the inverse of the map taking points from the normal's space
/// to the target space. Returns a unit vector, or `None` if the result collapses.
pub fn transform_plane_normal(inverse: &Matrix4<Real>, normal: &Vector3<Real>) -> Option<Vector3<Real>> {
    let mapped = linear_part(inverse).transpose() * normal;
    let len = mapped.norm();
    if len > 0.0 && len.is_finite() {
        Some(mapped / len)
    } else {
        None
    }
}
