use glam::{Vec3, Vec4};
use math::Coords;

use crate::{SceneNode, TransSample};

/// What the light manager is told about the actor being lit.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct ActorLighting {
    /// Into the space the actor's vertices are lit in, the same transform
    /// the mesh was drawn with. Lights must be moved by it too.
    pub coords: Coords,
    /// In `coords` space
    pub location: Vec3,
    pub ambient_glow: f32,
    pub scale_glow: f32,
    pub unlit: bool,
}

/// Evaluates lighting and fog for vertices of one actor at a time.
///
/// `setup_for_actor` gathers the lights touching the actor and returns extra
/// poly flags for all of its polygons; `light` and `fog` are then called per
/// vertex with camera space samples; `finish_actor` releases the set.
pub trait LightManager {
    fn setup_for_actor(&mut self, frame: &SceneNode, actor: &ActorLighting) -> u32;

    fn light(&mut self, vertex: &TransSample, poly_flags: u32) -> Vec3;

    fn fog(&mut self, vertex: &TransSample, poly_flags: u32) -> Vec4;

    fn finish_actor(&mut self);
}
