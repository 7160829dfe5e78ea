//! Points on their way from camera space to the screen.
//!
//! [`Transform`] carries the camera space point, its outcode and (once
//! projected) screen position. [`TransSample`] adds the shading inputs and
//! [`TransTexture`] the texture coordinates. The arithmetic operators on each
//! level interpolate every attribute of that level together, which is what
//! the clipper and the subdivider rely on. Derived state (outcode flags and
//! screen position) is never interpolated and must be recomputed with
//! [`Transform::compute_outcode`] and [`Transform::project`].

use glam::{Vec3, Vec4};
use std::ops::{Add, Deref, DerefMut, Mul, Sub};

use crate::{Outcode, SceneNode};

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Transform {
    pub point: Vec3,
    /// Bitwise or of [`Outcode`]
    pub flags: u8,
    pub screen_x: f32,
    pub screen_y: f32,
    pub int_y: i32,
    /// Reciprocal depth scaled by the focal length
    pub rz: f32,
}

impl Transform {
    pub const fn new(point: Vec3) -> Self {
        Self {
            point,
            flags: 0,
            screen_x: 0.0,
            screen_y: 0.0,
            int_y: 0,
            rz: 0.0,
        }
    }

    /// Perspective project into screen space. `point.z` must be positive,
    /// anything at or behind the eye has to be clipped away first.
    #[inline]
    pub fn project(&mut self, frame: &SceneNode) {
        self.rz = frame.proj.z / self.point.z;
        self.screen_x = self.point.x * self.rz + frame.fx15;
        self.screen_y = self.point.y * self.rz + frame.fy15;
        self.int_y = self.screen_y.floor() as i32;
    }

    /// Side plane tests done in camera space, without a divide.
    #[inline]
    pub fn compute_outcode(&mut self, frame: &SceneNode) {
        let p = self.point;
        let clip_xm = frame.prj_xm * p.z + p.x;
        let clip_xp = frame.prj_xp * p.z - p.x;
        let clip_ym = frame.prj_ym * p.z + p.y;
        let clip_yp = frame.prj_yp * p.z - p.y;
        self.flags = (u8::from(clip_xm < 0.0) * Outcode::XMin as u8)
            | (u8::from(clip_xp < 0.0) * Outcode::XMax as u8)
            | (u8::from(clip_ym < 0.0) * Outcode::YMin as u8)
            | (u8::from(clip_yp < 0.0) * Outcode::YMax as u8);
    }
}

impl Add for Transform {
    type Output = Transform;
    #[inline]
    fn add(self, other: Transform) -> Transform {
        Transform::new(self.point + other.point)
    }
}

impl Sub for Transform {
    type Output = Transform;
    #[inline]
    fn sub(self, other: Transform) -> Transform {
        Transform::new(self.point - other.point)
    }
}

impl Mul<f32> for Transform {
    type Output = Transform;
    #[inline]
    fn mul(self, scale: f32) -> Transform {
        Transform::new(self.point * scale)
    }
}

/// A transformed point with shading inputs.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct TransSample {
    pub transform: Transform,
    pub normal: Vec3,
    pub light: Vec3,
    /// RGB plus fog amount in `w`
    pub fog: Vec4,
}

impl Deref for TransSample {
    type Target = Transform;
    #[inline]
    fn deref(&self) -> &Transform {
        &self.transform
    }
}

impl DerefMut for TransSample {
    #[inline]
    fn deref_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }
}

impl Add for TransSample {
    type Output = TransSample;
    #[inline]
    fn add(self, o: TransSample) -> TransSample {
        TransSample {
            transform: self.transform + o.transform,
            normal: self.normal + o.normal,
            light: self.light + o.light,
            fog: self.fog + o.fog,
        }
    }
}

impl Sub for TransSample {
    type Output = TransSample;
    #[inline]
    fn sub(self, o: TransSample) -> TransSample {
        TransSample {
            transform: self.transform - o.transform,
            normal: self.normal - o.normal,
            light: self.light - o.light,
            fog: self.fog - o.fog,
        }
    }
}

impl Mul<f32> for TransSample {
    type Output = TransSample;
    #[inline]
    fn mul(self, scale: f32) -> TransSample {
        TransSample {
            transform: self.transform * scale,
            normal: self.normal * scale,
            light: self.light * scale,
            fog: self.fog * scale,
        }
    }
}

/// A transformed, shaded and texture mapped point. This is what the render
/// device receives.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct TransTexture {
    pub sample: TransSample,
    pub u: f32,
    pub v: f32,
}

impl TransTexture {
    pub fn new(point: Vec3) -> Self {
        Self {
            sample: TransSample {
                transform: Transform::new(point),
                ..Default::default()
            },
            u: 0.0,
            v: 0.0,
        }
    }

    /// `a + (b - a) * t`
    #[inline]
    pub fn lerp(a: &TransTexture, b: &TransTexture, t: f32) -> TransTexture {
        *a + (*b - *a) * t
    }
}

impl Deref for TransTexture {
    type Target = TransSample;
    #[inline]
    fn deref(&self) -> &TransSample {
        &self.sample
    }
}

impl DerefMut for TransTexture {
    #[inline]
    fn deref_mut(&mut self) -> &mut TransSample {
        &mut self.sample
    }
}

impl Add for TransTexture {
    type Output = TransTexture;
    #[inline]
    fn add(self, o: TransTexture) -> TransTexture {
        TransTexture {
            sample: self.sample + o.sample,
            u: self.u + o.u,
            v: self.v + o.v,
        }
    }
}

impl Sub for TransTexture {
    type Output = TransTexture;
    #[inline]
    fn sub(self, o: TransTexture) -> TransTexture {
        TransTexture {
            sample: self.sample - o.sample,
            u: self.u - o.u,
            v: self.v - o.v,
        }
    }
}

impl Mul<f32> for TransTexture {
    type Output = TransTexture;
    #[inline]
    fn mul(self, scale: f32) -> TransTexture {
        TransTexture {
            sample: self.sample * scale,
            u: self.u * scale,
            v: self.v * scale,
        }
    }
}
