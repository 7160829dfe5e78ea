#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::Vec3;
use render_trait::{MAX_POLY_POINTS, Outcode, SceneNode, TransTexture};

use crate::arena::{FrameArena, VertId};

/// A convex polygon as handles into the frame arena. Never owns the points.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointList {
    pts: [VertId; MAX_POLY_POINTS],
    len: usize,
}

impl PointList {
    pub fn new() -> Self {
        Self {
            pts: [VertId::ZERO; MAX_POLY_POINTS],
            len: 0,
        }
    }

    pub fn from_slice(pts: &[VertId]) -> Self {
        let mut list = Self::new();
        for p in pts {
            list.push(*p);
        }
        list
    }

    /// Points past the bound are dropped. A convex input can not produce
    /// them, only degenerate float input can.
    #[inline]
    pub fn push(&mut self, id: VertId) {
        debug_assert!(self.len < MAX_POLY_POINTS, "clip point list overflow");
        if self.len < MAX_POLY_POINTS {
            self.pts[self.len] = id;
            self.len += 1;
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[VertId] {
        &self.pts[..self.len]
    }
}

impl Default for PointList {
    fn default() -> Self {
        Self::new()
    }
}

/// Clip `src` against one half-space given each point's signed distance in
/// `dots`, keeping the non-negative side. New points are interpolated across
/// every attribute, projected and allocated from `arena`. An empty result
/// means the polygon is entirely on the negative side.
pub fn clip(
    frame: &SceneNode,
    arena: &mut FrameArena,
    src: &PointList,
    dots: &[f32],
) -> PointList {
    #[cfg(feature = "hprof")]
    profile!("clip");
    let src = src.as_slice();
    let mut dest = PointList::new();
    let n = src.len();
    if n == 0 {
        return dest;
    }
    let mut j = n - 1;
    for i in 0..n {
        if dots[j] >= 0.0 {
            dest.push(src[j]);
        }
        if dots[j] * dots[i] < 0.0 {
            let t = dots[j] / (dots[j] - dots[i]);
            let mut p = TransTexture::lerp(&arena[src[j]], &arena[src[i]], t);
            p.project(frame);
            dest.push(arena.alloc(p));
        }
        j = i;
    }
    dest
}

/// Signed distance of a camera space point from one frustum side, positive
/// inside. The same expressions the outcode is built from.
#[inline]
pub fn side_dot(frame: &SceneNode, side: Outcode, p: Vec3) -> f32 {
    match side {
        Outcode::XMin => frame.prj_xm * p.z + p.x,
        Outcode::XMax => frame.prj_xp * p.z - p.x,
        Outcode::YMin => frame.prj_ym * p.z + p.y,
        Outcode::YMax => frame.prj_yp * p.z - p.y,
    }
}

/// Clip `poly` against every frustum side present in `all_codes`, then
/// against the frame's near clip plane if it has one. Each pass works on
/// the output of the previous one. `None` when nothing is left.
pub fn clip_to_frame(
    frame: &SceneNode,
    arena: &mut FrameArena,
    mut poly: PointList,
    all_codes: u8,
) -> Option<PointList> {
    const SIDES: [Outcode; 4] = [Outcode::XMin, Outcode::XMax, Outcode::YMin, Outcode::YMax];
    let mut dots = [0.0f32; MAX_POLY_POINTS];

    for side in SIDES {
        if all_codes & side as u8 == 0 {
            continue;
        }
        for (d, p) in dots.iter_mut().zip(poly.as_slice()) {
            *d = side_dot(frame, side, arena[*p].point);
        }
        poly = clip(frame, arena, &poly, &dots[..poly.len()]);
        if poly.is_empty() {
            return None;
        }
    }

    if frame.near_clip.w != 0.0 {
        let mut clipped = false;
        for (d, p) in dots.iter_mut().zip(poly.as_slice()) {
            *d = frame.near_clip.plane_dot(arena[*p].point);
            clipped |= *d < 0.0;
        }
        if clipped {
            poly = clip(frame, arena, &poly, &dots[..poly.len()]);
            if poly.is_empty() {
                return None;
            }
        }
    }
    Some(poly)
}
