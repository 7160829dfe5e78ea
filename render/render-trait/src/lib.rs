//! Contracts between the scene renderer core and the things it drives or is
//! driven by: the scene node and transformed points the core produces, and
//! the render device, light manager and textures it consumes.

mod device;
mod flags;
mod lighting;
mod scene;
mod texture;
mod transform;

pub use device::{IconDraw, MAX_POLY_POINTS, RenderDevice};
pub use flags::{LineFlags, OUTCODE_REJECT, Outcode, PolyFlags};
pub use lighting::{ActorLighting, LightManager};
pub use scene::{
    MAX_SCENE_RECURSION, RenderMode, SceneError, SceneNode, SceneNodeId, SceneTree, Viewport,
};
pub use texture::{StaticTexture, Texture, TextureInfo};
pub use transform::{TransSample, TransTexture, Transform};

pub use glam;
pub use log;
pub use math;
