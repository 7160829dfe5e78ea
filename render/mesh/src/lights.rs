//! A small point light model, enough to shade meshes without a level.

use glam::{Vec3, Vec4};
use log::trace;
use render_trait::{ActorLighting, LightManager, PolyFlags, SceneNode, TransSample};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointLight {
    /// World space
    pub position: Vec3,
    pub color: Vec3,
    pub radius: f32,
}

/// Fog ramping linearly in with camera depth.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DistanceFog {
    pub color: Vec3,
    pub start: f32,
    pub end: f32,
}

impl DistanceFog {
    fn amount(&self, z: f32) -> f32 {
        if self.end <= self.start {
            return if z >= self.end { 1.0 } else { 0.0 };
        }
        ((z - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Default, Clone)]
pub struct PointLightManager {
    pub ambient: Vec3,
    pub lights: Vec<PointLight>,
    pub fog: Option<DistanceFog>,
    /// Added to the flags of every actor lit
    pub extra_flags: u32,
    /// Camera space position, colour and radius of the lights on the
    /// current actor
    active: Vec<(Vec3, Vec3, f32)>,
    glow: f32,
    actors_lit: usize,
}

impl PointLightManager {
    pub fn new(ambient: Vec3) -> Self {
        Self {
            ambient,
            ..Self::default()
        }
    }

    pub fn with_light(mut self, position: Vec3, color: Vec3, radius: f32) -> Self {
        self.lights.push(PointLight {
            position,
            color,
            radius,
        });
        self
    }

    pub fn with_fog(mut self, fog: DistanceFog) -> Self {
        self.fog = Some(fog);
        self
    }

    pub fn active_lights(&self) -> usize {
        self.active.len()
    }

    pub fn actors_lit(&self) -> usize {
        self.actors_lit
    }
}

impl LightManager for PointLightManager {
    fn setup_for_actor(&mut self, frame: &SceneNode, actor: &ActorLighting) -> u32 {
        self.active.clear();
        self.active.extend(
            self.lights
                .iter()
                .filter(|l| l.radius > 0.0)
                .map(|l| (actor.coords.transform_point(l.position), l.color, l.radius)),
        );
        self.glow = actor.ambient_glow / 256.0;
        trace!("Lighting actor at {:?} with {} lights", actor.location, self.active.len());
        if actor.unlit {
            self.extra_flags | PolyFlags::Unlit as u32
        } else {
            self.extra_flags
        }
    }

    fn light(&mut self, vertex: &TransSample, _poly_flags: u32) -> Vec3 {
        let mut color = self.ambient + Vec3::splat(self.glow);
        for (position, light_color, radius) in &self.active {
            let to_light = *position - vertex.point;
            let dist_sq = to_light.length_squared();
            if dist_sq >= radius * radius || dist_sq == 0.0 {
                continue;
            }
            let dist = dist_sq.sqrt();
            let lambert = vertex.normal.dot(to_light / dist).max(0.0);
            color += *light_color * lambert * (1.0 - dist / radius);
        }
        color.min(Vec3::ONE)
    }

    fn fog(&mut self, vertex: &TransSample, _poly_flags: u32) -> Vec4 {
        match &self.fog {
            Some(fog) => fog.color.extend(fog.amount(vertex.point.z)),
            None => Vec4::ZERO,
        }
    }

    fn finish_actor(&mut self) {
        self.active.clear();
        self.actors_lit += 1;
    }
}
