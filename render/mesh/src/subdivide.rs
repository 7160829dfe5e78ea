//! Curvature driven triangle subdivision.
//!
//! Each edge of a triangle gets a midpoint when its length times the bend
//! between its end normals is large on screen. The midpoints are pushed out
//! along their normal and relit, so silhouettes and highlights of a low poly
//! mesh round out as it gets closer. Depth is capped at [`MAX_SUBDIVISION`],
//! so one input triangle never produces more than 64 leaves.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::Vec3;
use math::{
    clip_from_zero, dist_squared, div_sqrt_approx, mirror_by_vector, sqrt_approx, square, triple,
    unsafe_normal,
};
use render_trait::{
    LightManager, MAX_POLY_POINTS, PolyFlags, RenderDevice, SceneNode, TextureInfo, TransTexture,
};

use crate::arena::{FrameArena, VertId};
use crate::clip::{PointList, clip_to_frame};

pub const MAX_SUBDIVISION: u32 = 3;

/// Terminates a row of [`CUT_TABLE`].
pub const CUT_END: u8 = 9;

/// Sub-triangles for each cut mask. Bit `j` of the mask means the edge from
/// vertex `j` to vertex `(j + 1) % 3` was split, its midpoint is vertex
/// `j + 3`. Rows end at the first [`CUT_END`].
pub const CUT_TABLE: [[[u8; 3]; 4]; 8] = [
    [[0, 1, 2], [9, 9, 9], [9, 9, 9], [9, 9, 9]],
    [[0, 3, 2], [2, 3, 1], [9, 9, 9], [9, 9, 9]],
    [[0, 1, 4], [4, 2, 0], [9, 9, 9], [9, 9, 9]],
    [[0, 3, 2], [2, 3, 4], [4, 3, 1], [9, 9, 9]],
    [[0, 1, 5], [5, 1, 2], [9, 9, 9], [9, 9, 9]],
    [[0, 3, 5], [5, 3, 1], [1, 2, 5], [9, 9, 9]],
    [[0, 1, 4], [4, 2, 5], [5, 0, 4], [9, 9, 9]],
    [[0, 3, 5], [3, 1, 4], [5, 4, 2], [3, 4, 5]],
];

/// Sub-triangles of one cut mask.
pub fn cut_triangles(mask: usize) -> impl Iterator<Item = &'static [u8; 3]> {
    CUT_TABLE[mask & 7].iter().take_while(|t| t[0] != CUT_END)
}

/// State shared by every triangle of one mesh draw.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct DrawContext {
    pub unlit_color: Vec3,
    /// Texture scale of the triangle being drawn, `u_scale * u_size / 256`
    pub u_scale: f32,
    pub v_scale: f32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SubsurfaceStats {
    /// Polygons handed to the device
    pub polygons: usize,
    /// Triangles that reached the clip stage, drawn or not
    pub leaves: usize,
    /// Triangles split into smaller ones
    pub subdivided: usize,
    pub deepest: u32,
}

/// Everything a subdivision walk needs besides the arena and the triangle.
pub struct SubsurfacePass<'a, D: RenderDevice, L: LightManager> {
    pub frame: &'a SceneNode,
    pub device: &'a mut D,
    pub lights: &'a mut L,
    pub texture: TextureInfo,
    pub span: Option<&'a D::SpanBuffer>,
    pub ctx: DrawContext,
    pub stats: SubsurfaceStats,
}

impl<'a, D: RenderDevice, L: LightManager> SubsurfacePass<'a, D, L> {
    pub fn new(
        frame: &'a SceneNode,
        device: &'a mut D,
        lights: &'a mut L,
        span: Option<&'a D::SpanBuffer>,
        ctx: DrawContext,
    ) -> Self {
        Self {
            frame,
            device,
            lights,
            texture: TextureInfo::default(),
            span,
            ctx,
            stats: SubsurfaceStats::default(),
        }
    }
}

/// Texture coordinates from the camera space reflection vector, mapped onto
/// a 256 texel sphere map and scaled by the current texture.
#[inline]
pub fn enviro_map(frame: &SceneNode, ctx: &DrawContext, p: &mut TransTexture) {
    let t = frame
        .uncoords
        .transform_vector(mirror_by_vector(unsafe_normal(p.point), p.normal));
    p.u = (t.x + 1.0) * 0.5 * 256.0 * ctx.u_scale;
    p.v = (t.y + 1.0) * 0.5 * 256.0 * ctx.v_scale;
}

/// How far an edge wants to be split, positive means split. Tuned constants,
/// keep the arithmetic as is.
#[inline]
fn edge_alpha(frame: &SceneNode, a: &TransTexture, b: &TransTexture) -> f32 {
    let dist = dist_squared(a.point, b.point);
    let curvy = a.normal.cross(b.normal).length_squared();
    let thresh = 50.0 * frame.fx * sqrt_approx(dist * curvy) / (a.point.z + b.point.z).max(1.0);
    (thresh / square(32.0) - 1.0).min(1.0)
}

fn midpoint<D: RenderDevice, L: LightManager>(
    pass: &mut SubsurfacePass<'_, D, L>,
    a: &TransTexture,
    b: &TransTexture,
    alpha: f32,
    poly_flags: u32,
) -> TransTexture {
    let mut mid = (*a + *b) * 0.5;

    let n = a.normal + b.normal;
    mid.normal = n * div_sqrt_approx(n.length_squared());

    if PolyFlags::Environment.is_set(poly_flags) {
        let (u, v) = (mid.u, mid.v);
        enviro_map(pass.frame, &pass.ctx, &mut mid);
        mid.u = u + (mid.u - u) * alpha;
        mid.v = v + (mid.v - v) * alpha;
    }

    let lit = pass.lights.light(&mid, poly_flags);
    let prev = mid.light;
    mid.light = prev + (lit - prev) * alpha;

    let bulge = 0.15
        * alpha
        * sqrt_approx(
            (a.point - b.point).length_squared() * b.normal.cross(a.normal).length_squared(),
        );
    let normal = mid.normal;
    mid.point += normal * bulge;

    mid.compute_outcode(pass.frame);
    mid.project(pass.frame);
    mid
}

/// Render one triangle, splitting it first where curvature calls for it.
///
/// The three points are shaded in place for environment mapping and unlit
/// polygons, so callers hand in per-triangle copies. Everything allocated
/// below this call is released before it returns.
pub fn render_subsurface<D: RenderDevice, L: LightManager>(
    pass: &mut SubsurfacePass<'_, D, L>,
    arena: &mut FrameArena,
    pts: [VertId; 3],
    poly_flags: u32,
    sub_count: u32,
) {
    #[cfg(feature = "hprof")]
    profile!("render_subsurface");
    pass.stats.deepest = pass.stats.deepest.max(sub_count);

    if poly_flags & (PolyFlags::Environment as u32 | PolyFlags::Unlit as u32) != 0 {
        if PolyFlags::Environment.is_set(poly_flags) {
            for p in pts {
                enviro_map(pass.frame, &pass.ctx, &mut arena[p]);
            }
        }
        if PolyFlags::Unlit.is_set(poly_flags) {
            for p in pts {
                arena[p].light = pass.ctx.unlit_color;
            }
        }
    }

    if sub_count < MAX_SUBDIVISION && !PolyFlags::Flat.is_set(poly_flags) {
        let mut alpha = [0.0f32; 3];
        let mut cuts = 0usize;
        let mut j = 2;
        for i in 0..3 {
            alpha[j] = edge_alpha(pass.frame, &arena[pts[j]], &arena[pts[i]]);
            if alpha[j] > 0.0 {
                cuts |= 1 << j;
            }
            j = i;
        }

        if cuts != 0 {
            pass.stats.subdivided += 1;
            let mut level = arena.mark();
            let mut slots = [pts[0], pts[1], pts[2], pts[0], pts[1], pts[2]];
            let mut j = 2;
            for i in 0..3 {
                if cuts & (1 << j) != 0 {
                    let (a, b) = (level[pts[j]], level[pts[i]]);
                    let mid = midpoint(pass, &a, &b, alpha[j], poly_flags);
                    slots[j + 3] = level.alloc(mid);
                }
                j = i;
            }
            for tri in cut_triangles(cuts) {
                let sub = [
                    slots[tri[0] as usize],
                    slots[tri[1] as usize],
                    slots[tri[2] as usize],
                ];
                render_subsurface(pass, &mut level, sub, poly_flags, sub_count + 1);
            }
            return;
        }
    }

    pass.stats.leaves += 1;
    draw_clipped(pass, arena, pts, poly_flags);
}

fn draw_clipped<D: RenderDevice, L: LightManager>(
    pass: &mut SubsurfacePass<'_, D, L>,
    arena: &mut FrameArena,
    pts: [VertId; 3],
    poly_flags: u32,
) {
    let [mut p0, p1, mut p2] = pts;
    let (f0, f1, f2) = (arena[p0].flags, arena[p1].flags, arena[p2].flags);
    if f0 & f1 & f2 != 0 {
        return;
    }

    if triple(arena[p0].point, arena[p1].point, arena[p2].point) <= 0.0 {
        if !PolyFlags::TwoSided.is_set(poly_flags) {
            return;
        }
        std::mem::swap(&mut p0, &mut p2);
    }

    let frame = pass.frame;
    let mut leaf = arena.mark();
    let Some(poly) = clip_to_frame(frame, &mut leaf, PointList::from_slice(&[p0, p1, p2]), f0 | f1 | f2)
    else {
        return;
    };

    // Clamp copies, the arena points may be shared with neighbours.
    let mut out = [TransTexture::default(); MAX_POLY_POINTS];
    for (o, id) in out.iter_mut().zip(poly.as_slice()) {
        *o = leaf[*id];
        o.screen_x = clip_from_zero(o.screen_x, frame.fx);
        o.screen_y = clip_from_zero(o.screen_y, frame.fy);
    }
    pass.device.draw_gouraud_polygon(
        frame,
        &pass.texture,
        &out[..poly.len()],
        poly_flags,
        pass.span,
    );
    pass.stats.polygons += 1;
}
