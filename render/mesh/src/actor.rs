use glam::Vec3;
use math::{Coords, Rotator};
use render_trait::{ActorLighting, Texture};
use std::rc::Rc;

use crate::mesh::{Mesh, MeshError, TweenCache};

/// Fatness that leaves the mesh untouched.
pub const NEUTRAL_FATNESS: u8 = 128;

/// The parts of an actor that decide where its mesh vertices end up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ActorPose {
    pub location: Vec3,
    pub rotation: Rotator,
    pub pre_pivot: Vec3,
    pub draw_scale: f32,
    pub particles: bool,
    pub anim_sequence: Option<usize>,
    /// Fraction of the sequence, negative while tweening into it
    pub anim_frame: f32,
}

impl Default for ActorPose {
    fn default() -> Self {
        Self {
            location: Vec3::ZERO,
            rotation: Rotator::ZERO,
            pre_pivot: Vec3::ZERO,
            draw_scale: 1.0,
            particles: false,
            anim_sequence: None,
            anim_frame: 0.0,
        }
    }
}

/// A mesh placed in the world, with everything the mesh renderer reads
/// from it.
#[derive(Debug, Clone)]
pub struct MeshActor {
    pub mesh: Rc<Mesh>,
    pub location: Vec3,
    pub rotation: Rotator,
    pub pre_pivot: Vec3,
    pub draw_scale: f32,
    pub scale_glow: f32,
    pub ambient_glow: u8,
    /// Vertices move out along their normal by `fatness / 16 - 8`
    pub fatness: u8,
    /// Draw each vertex as a sprite of `texture` instead of triangles
    pub particles: bool,
    pub selected: bool,
    pub unlit: bool,
    /// Owned by the actor the scene is viewed from, a held weapon
    pub owned_by_viewer: bool,
    pub texture: Option<Rc<dyn Texture>>,
    pub skins: Vec<Option<Rc<dyn Texture>>>,
    pub zone_env_map: Option<Rc<dyn Texture>>,
    pub level_env_map: Option<Rc<dyn Texture>>,
    pub anim_sequence: Option<usize>,
    pub anim_frame: f32,
    pub tween: TweenCache,
}

impl MeshActor {
    pub fn new(mesh: Rc<Mesh>) -> Self {
        Self {
            mesh,
            location: Vec3::ZERO,
            rotation: Rotator::ZERO,
            pre_pivot: Vec3::ZERO,
            draw_scale: 1.0,
            scale_glow: 1.0,
            ambient_glow: 0,
            fatness: NEUTRAL_FATNESS,
            particles: false,
            selected: false,
            unlit: false,
            owned_by_viewer: false,
            texture: None,
            skins: Vec::new(),
            zone_env_map: None,
            level_env_map: None,
            anim_sequence: None,
            anim_frame: 0.0,
            tween: TweenCache::default(),
        }
    }

    /// Switch to the named sequence at `frame`.
    pub fn play(&mut self, name: &str, frame: f32) -> Result<(), MeshError> {
        let seq = self
            .mesh
            .anim_seq_index(name)
            .ok_or_else(|| MeshError::UnknownSequence(name.to_string()))?;
        self.anim_sequence = Some(seq);
        self.anim_frame = frame;
        Ok(())
    }

    /// Swap the mesh, dropping any cached pose of the old one.
    pub fn set_mesh(&mut self, mesh: Rc<Mesh>) {
        self.mesh = mesh;
        self.anim_sequence = None;
        self.tween.clear();
    }

    pub fn pose(&self) -> ActorPose {
        ActorPose {
            location: self.location,
            rotation: self.rotation,
            pre_pivot: self.pre_pivot,
            draw_scale: self.draw_scale,
            particles: self.particles,
            anim_sequence: self.anim_sequence,
            anim_frame: self.anim_frame,
        }
    }

    /// Lighting description for an actor drawn through `coords`.
    pub fn lighting(&self, coords: &Coords) -> ActorLighting {
        ActorLighting {
            coords: *coords,
            location: coords.transform_point(self.location),
            ambient_glow: self.ambient_glow as f32,
            scale_glow: self.scale_glow,
            unlit: self.unlit,
        }
    }

    /// Flat colour for unlit polygons and particles.
    pub fn unlit_level(&self) -> f32 {
        (self.scale_glow * 0.5 + self.ambient_glow as f32 / 256.0).clamp(0.0, 1.0)
    }
}
