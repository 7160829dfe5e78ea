use glam::Vec3;

/// A plane `normal . p = w`. Points with a positive [`Plane::plane_dot`]
/// are on the front side.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub w: f32,
}

impl Plane {
    pub const NONE: Plane = Plane {
        normal: Vec3::ZERO,
        w: 0.0,
    };

    pub const fn new(normal: Vec3, w: f32) -> Self {
        Self { normal, w }
    }

    #[inline]
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        Self {
            normal,
            w: point.dot(normal),
        }
    }

    #[inline]
    pub fn plane_dot(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.w
    }

    #[inline]
    pub fn flip(&self) -> Self {
        Self {
            normal: -self.normal,
            w: -self.w,
        }
    }
}
