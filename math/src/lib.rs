//! Geometry primitives shared by the scene and mesh renderers.

mod angle;
mod bounds;
mod coords;
mod plane;

pub use angle::{Angle, Rotator};
pub use bounds::BoundingBox;
pub use coords::Coords;
pub use plane::Plane;

use glam::Vec3;

#[inline]
pub const fn square(f: f32) -> f32 {
    f * f
}

/// Approximate `1 / sqrt(x)`, one Newton step after the bit trick. Relative
/// error stays below 0.2% for normal positive inputs.
#[inline]
pub fn div_sqrt_approx(x: f32) -> f32 {
    let half = 0.5 * x;
    let y = f32::from_bits(0x5f37_59df - (x.to_bits() >> 1));
    y * (1.5 - half * y * y)
}

/// Approximate `sqrt(x)`, zero for `x <= 0`.
#[inline]
pub fn sqrt_approx(x: f32) -> f32 {
    if x <= 0.0 { 0.0 } else { x * div_sqrt_approx(x) }
}

/// Scalar triple product `a . (b x c)`.
#[inline]
pub fn triple(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    a.dot(b.cross(c))
}

#[inline]
pub fn dist_squared(a: Vec3, b: Vec3) -> f32 {
    (a - b).length_squared()
}

/// Reflect `v` about the plane whose normal is `normal`.
#[inline]
pub fn mirror_by_vector(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * (2.0 * v.dot(normal))
}

/// Normalise without guarding against zero length.
#[inline]
pub fn unsafe_normal(v: Vec3) -> Vec3 {
    v * (1.0 / v.length())
}

/// Normalise, returning zero for a zero-length vector.
#[inline]
pub fn safe_normal(v: Vec3) -> Vec3 {
    v.normalize_or_zero()
}

/// Clamp into `[0, max]`.
#[inline]
pub fn clip_from_zero(value: f32, max: f32) -> f32 {
    value.clamp(0.0, max)
}
