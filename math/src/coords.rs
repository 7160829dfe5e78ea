use glam::{Affine3A, Mat3, Mat3A, Vec3, Vec3A};

use crate::Rotator;

/// A coordinate frame: an origin and three axes. Transforming a point by a
/// frame expresses it relative to the origin along each axis, so a camera
/// frame maps world space into camera space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coords {
    pub origin: Vec3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
}

impl Default for Coords {
    fn default() -> Self {
        Self::UNIT
    }
}

impl Coords {
    pub const UNIT: Coords = Coords {
        origin: Vec3::ZERO,
        x_axis: Vec3::X,
        y_axis: Vec3::Y,
        z_axis: Vec3::Z,
    };

    pub const fn new(origin: Vec3, x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Self {
        Self {
            origin,
            x_axis,
            y_axis,
            z_axis,
        }
    }

    /// Camera frame for a viewer at `location` looking along `rotation`.
    /// Camera space has X to the right of the screen, Y down the screen and
    /// Z into the screen.
    pub fn view(location: Vec3, rotation: Rotator) -> Self {
        let basis = rotation.matrix();
        Self {
            origin: location,
            x_axis: basis.y_axis,
            y_axis: -basis.z_axis,
            z_axis: basis.x_axis,
        }
    }

    #[inline]
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        let p = point - self.origin;
        Vec3::new(p.dot(self.x_axis), p.dot(self.y_axis), p.dot(self.z_axis))
    }

    #[inline]
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        Vec3::new(v.dot(self.x_axis), v.dot(self.y_axis), v.dot(self.z_axis))
    }

    pub fn to_affine(&self) -> Affine3A {
        let m = Mat3::from_cols(self.x_axis, self.y_axis, self.z_axis).transpose();
        Affine3A::from_mat3_translation(m, -(m * self.origin))
    }

    pub fn from_affine(affine: &Affine3A) -> Self {
        let m = Mat3::from(affine.matrix3).transpose();
        let translation = Vec3::from(affine.translation);
        let origin = -(Mat3::from(affine.matrix3).inverse() * translation);
        Self {
            origin,
            x_axis: m.x_axis,
            y_axis: m.y_axis,
            z_axis: m.z_axis,
        }
    }

    /// The frame undoing this one. Valid for any non-degenerate frame, not
    /// only orthonormal ones.
    pub fn inverse(&self) -> Self {
        Self::from_affine(&self.to_affine().inverse())
    }

    /// Frame equivalent to transforming by `self` and then by `outer`.
    pub fn then(&self, outer: &Coords) -> Self {
        Self::from_affine(&(outer.to_affine() * self.to_affine()))
    }

    /// Frame mapping an object's local space into the space this frame maps
    /// world space to: scale, rotate by `basis`, then translate to
    /// `location`.
    pub fn object_to(&self, location: Vec3, basis: Mat3, scale: Vec3) -> Self {
        let local_to_world = Affine3A {
            matrix3: Mat3A::from(basis) * Mat3A::from_diagonal(scale),
            translation: Vec3A::from(location),
        };
        Self::from_affine(&(self.to_affine() * local_to_world))
    }
}
