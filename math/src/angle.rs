use glam::{Mat3, Vec3};
use std::f32::consts::TAU;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Angle(f32);

impl Angle {
    /// Will always wrap < 0 to > PI
    #[inline]
    pub const fn new(mut radians: f32) -> Self {
        radians = radians % TAU;
        if radians < 0.0 {
            radians += TAU;
        }
        Angle(radians)
    }

    #[inline]
    pub fn from_degrees(degrees: f32) -> Self {
        Angle::new(degrees.to_radians())
    }

    #[inline]
    const fn inner_wrap(&mut self) {
        self.0 = self.0 % TAU;
        if self.0 < 0.0 {
            self.0 += TAU;
        }
    }

    #[inline]
    pub const fn rad(&self) -> f32 {
        self.0
    }

    #[inline]
    pub fn sin(&self) -> f32 {
        self.0.sin()
    }

    #[inline]
    pub fn cos(&self) -> f32 {
        self.0.cos()
    }

    #[inline]
    pub fn tan(&self) -> f32 {
        self.0.tan()
    }

    #[inline]
    pub fn sin_cos(&self) -> (f32, f32) {
        self.0.sin_cos()
    }
}

impl Add for Angle {
    type Output = Angle;
    #[inline]
    fn add(self, other: Angle) -> Angle {
        Angle::new(self.0 + other.0)
    }
}

impl Add<f32> for Angle {
    type Output = Angle;
    #[inline]
    fn add(self, other: f32) -> Angle {
        Angle::new(self.0 + other)
    }
}

impl AddAssign for Angle {
    #[inline]
    fn add_assign(&mut self, other: Angle) {
        self.0 += other.0;
        self.inner_wrap();
    }
}

impl AddAssign<f32> for Angle {
    #[inline]
    fn add_assign(&mut self, other: f32) {
        self.0 += other;
        self.inner_wrap();
    }
}

impl Sub for Angle {
    type Output = Angle;
    #[inline]
    fn sub(self, other: Angle) -> Angle {
        Angle::new(self.0 - other.0)
    }
}

impl SubAssign for Angle {
    #[inline]
    fn sub_assign(&mut self, other: Angle) {
        self.0 -= other.0;
        self.inner_wrap();
    }
}

impl Mul<f32> for Angle {
    type Output = Angle;
    #[inline]
    fn mul(self, other: f32) -> Angle {
        Angle::new(self.0 * other)
    }
}

impl Neg for Angle {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self::Output {
        Angle::new(-self.0)
    }
}

/// Orientation of an object or camera in a Z-up world where an unrotated
/// object faces +X with +Y to its right.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rotator {
    /// Positive looks up.
    pub pitch: Angle,
    /// Positive turns from +X toward +Y.
    pub yaw: Angle,
    /// Positive banks the right side down.
    pub roll: Angle,
}

impl Rotator {
    pub const ZERO: Rotator = Rotator {
        pitch: Angle::new(0.0),
        yaw: Angle::new(0.0),
        roll: Angle::new(0.0),
    };

    pub const fn new(pitch: Angle, yaw: Angle, roll: Angle) -> Self {
        Self { pitch, yaw, roll }
    }

    /// Column basis of the rotation: forward, right and up in world space.
    pub fn matrix(&self) -> Mat3 {
        Mat3::from_rotation_z(self.yaw.rad())
            * Mat3::from_rotation_y(-self.pitch.rad())
            * Mat3::from_rotation_x(self.roll.rad())
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.matrix() * Vec3::X
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        self.matrix() * Vec3::Y
    }

    #[inline]
    pub fn up(&self) -> Vec3 {
        self.matrix() * Vec3::Z
    }
}
