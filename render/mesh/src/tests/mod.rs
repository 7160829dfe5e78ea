//! Test doubles shared by the unit and scenario tests.

use glam::{Vec3, Vec4};
use math::Rotator;
use render_trait::{
    ActorLighting, IconDraw, LightManager, LineFlags, RenderDevice, SceneNode, TextureInfo,
    TransSample, TransTexture, Viewport,
};

mod draw_mesh_tests;

/// 640x480, 90 degree FOV, at the origin looking down +X.
pub fn test_frame() -> SceneNode {
    SceneNode::new_master(Viewport::new(640, 480, 90.0), Vec3::ZERO, Rotator::ZERO).unwrap()
}

#[derive(Debug, Clone)]
pub struct RecordedPolygon {
    pub texture: TextureInfo,
    pub pts: Vec<TransTexture>,
    pub poly_flags: u32,
}

#[derive(Debug, Clone)]
pub struct RecordedLine {
    pub color: Vec3,
    pub flags: LineFlags,
    pub p1: Vec3,
    pub p2: Vec3,
}

/// Keeps everything it is asked to draw.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    pub span_based: bool,
    pub polygons: Vec<RecordedPolygon>,
    pub lines: Vec<RecordedLine>,
    pub icons: Vec<IconDraw>,
}

impl RenderDevice for RecordingDevice {
    type SpanBuffer = ();

    fn span_based(&self) -> bool {
        self.span_based
    }

    fn draw_gouraud_polygon(
        &mut self,
        _: &SceneNode,
        texture: &TextureInfo,
        pts: &[TransTexture],
        poly_flags: u32,
        _: Option<&()>,
    ) {
        self.polygons.push(RecordedPolygon {
            texture: *texture,
            pts: pts.to_vec(),
            poly_flags,
        });
    }

    fn draw_3d_line(&mut self, _: &SceneNode, color: Vec3, flags: LineFlags, p1: Vec3, p2: Vec3) {
        self.lines.push(RecordedLine {
            color,
            flags,
            p1,
            p2,
        });
    }

    fn draw_icon(&mut self, _: &SceneNode, _: &TextureInfo, icon: &IconDraw, _: Option<&()>) {
        self.icons.push(*icon);
    }
}

/// White light everywhere, no fog. Counts vertex evaluations.
#[derive(Debug, Default)]
pub struct FlatLights {
    pub extra_flags: u32,
    pub setups: usize,
    pub light_calls: usize,
    pub finished: usize,
}

impl LightManager for FlatLights {
    fn setup_for_actor(&mut self, _: &SceneNode, _: &ActorLighting) -> u32 {
        self.setups += 1;
        self.extra_flags
    }

    fn light(&mut self, _: &TransSample, _: u32) -> Vec3 {
        self.light_calls += 1;
        Vec3::ONE
    }

    fn fog(&mut self, _: &TransSample, _: u32) -> Vec4 {
        Vec4::ZERO
    }

    fn finish_actor(&mut self) {
        self.finished += 1;
    }
}
