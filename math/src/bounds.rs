use glam::Vec3;
use std::ops::Add;

use crate::Coords;

/// Axis aligned bounding box. An empty box is `is_valid == false` and acts
/// as the identity for [`BoundingBox::union`].
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
    pub is_valid: bool,
}

impl BoundingBox {
    pub const fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min,
            max,
            is_valid: true,
        }
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().fold(Self::default(), |b, p| b.with_point(*p))
    }

    #[inline]
    pub fn with_point(self, p: Vec3) -> Self {
        if self.is_valid {
            Self::new(self.min.min(p), self.max.max(p))
        } else {
            Self::new(p, p)
        }
    }

    pub fn union(self, other: BoundingBox) -> Self {
        match (self.is_valid, other.is_valid) {
            (true, true) => Self::new(self.min.min(other.min), self.max.max(other.max)),
            (true, false) => self,
            _ => other,
        }
    }

    pub fn expand_by(self, w: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(w),
            max: self.max + Vec3::splat(w),
            is_valid: self.is_valid,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Box enclosing this box's corners after transforming them by `coords`.
    pub fn transform_by(&self, coords: &Coords) -> Self {
        if !self.is_valid {
            return *self;
        }
        self.corners()
            .iter()
            .fold(Self::default(), |b, c| b.with_point(coords.transform_point(*c)))
    }

    pub fn contains(&self, p: Vec3) -> bool {
        self.is_valid && p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

impl Add for BoundingBox {
    type Output = BoundingBox;

    fn add(self, other: BoundingBox) -> BoundingBox {
        self.union(other)
    }
}
