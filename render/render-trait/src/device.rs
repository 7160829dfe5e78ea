use glam::{Vec3, Vec4};

use crate::{LineFlags, SceneNode, TextureInfo, TransTexture};

/// The most points a polygon can have after clipping a triangle against the
/// four frustum sides and the near clip plane.
pub const MAX_POLY_POINTS: usize = 8;

/// A camera facing sprite, in screen space.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct IconDraw {
    pub x: f32,
    pub y: f32,
    pub x_size: f32,
    pub y_size: f32,
    /// Camera space depth
    pub z: f32,
    pub color: Vec3,
    pub fog: Vec4,
    pub poly_flags: u32,
}

/// A rasterising backend.
///
/// Polygons arrive camera space transformed, projected and fully clipped,
/// convex, with at most [`MAX_POLY_POINTS`] points and light, fog and texture
/// coordinates resolved. A device may triangulate or hand them to a GPU as it
/// likes, but must not clip them again.
pub trait RenderDevice {
    /// Occlusion structure used by span rasterisers. Opaque to the callers,
    /// which only pass it through.
    type SpanBuffer;

    /// Span based devices need polygons submitted back to front.
    fn span_based(&self) -> bool;

    fn draw_gouraud_polygon(
        &mut self,
        frame: &SceneNode,
        texture: &TextureInfo,
        pts: &[TransTexture],
        poly_flags: u32,
        span: Option<&Self::SpanBuffer>,
    );

    /// `p1` and `p2` are in the space the caller transformed the mesh into,
    /// world space for wireframe views.
    fn draw_3d_line(
        &mut self,
        frame: &SceneNode,
        color: Vec3,
        line_flags: LineFlags,
        p1: Vec3,
        p2: Vec3,
    );

    fn draw_icon(
        &mut self,
        frame: &SceneNode,
        texture: &TextureInfo,
        icon: &IconDraw,
        span: Option<&Self::SpanBuffer>,
    );
}
