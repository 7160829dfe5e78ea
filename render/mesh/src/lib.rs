//! Animated mesh rendering: posing, lighting, curvature subdivision and
//! clipping of mesh actors, down to convex polygons for a [`RenderDevice`].
//!
//! All transient vertices of a draw live in a [`FrameArena`] owned by the
//! [`MeshRenderer`] and are released when the draw returns.
//!
//! [`RenderDevice`]: render_trait::RenderDevice

mod actor;
mod arena;
mod clip;
mod draw;
mod lights;
mod mesh;
mod subdivide;

#[cfg(test)]
mod tests;

pub use actor::{ActorPose, MeshActor, NEUTRAL_FATNESS};
pub use arena::{ArenaMark, DEFAULT_ARENA_VERTS, FrameArena, VertId};
pub use clip::{PointList, clip, clip_to_frame, side_dot};
pub use draw::{MeshDrawStats, MeshRenderer, MeshTriSort, RenderOptions};
pub use lights::{DistanceFog, PointLight, PointLightManager};
pub use mesh::{AnimSeq, MAX_MESH_TEXTURES, Mesh, MeshError, MeshTri, MeshUV, TweenCache, VertConnect};
pub use subdivide::{
    CUT_END, CUT_TABLE, DrawContext, MAX_SUBDIVISION, SubsurfacePass, SubsurfaceStats, cut_triangles,
    enviro_map, render_subsurface,
};
