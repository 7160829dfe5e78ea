use std::fmt::Debug;

/// What a render device needs to know about a texture for one draw.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct TextureInfo {
    /// Device cache key
    pub id: u64,
    pub u_size: u32,
    pub v_size: u32,
    pub u_scale: f32,
    pub v_scale: f32,
    pub poly_flags: u32,
}

pub trait Texture: Debug {
    fn u_size(&self) -> u32;

    fn v_size(&self) -> u32;

    /// Flags the texture contributes to every polygon using it
    fn poly_flags(&self) -> u32 {
        0
    }

    /// Snapshot for drawing at `current_time`, animated textures pick their
    /// frame from it.
    fn info(&self, current_time: f64) -> TextureInfo;
}

/// A texture that never changes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StaticTexture {
    pub id: u64,
    pub u_size: u32,
    pub v_size: u32,
    pub u_scale: f32,
    pub v_scale: f32,
    pub poly_flags: u32,
}

impl StaticTexture {
    pub fn new(id: u64, u_size: u32, v_size: u32) -> Self {
        Self {
            id,
            u_size,
            v_size,
            u_scale: 1.0,
            v_scale: 1.0,
            poly_flags: 0,
        }
    }
}

impl Texture for StaticTexture {
    fn u_size(&self) -> u32 {
        self.u_size
    }

    fn v_size(&self) -> u32 {
        self.v_size
    }

    fn poly_flags(&self) -> u32 {
        self.poly_flags
    }

    fn info(&self, _: f64) -> TextureInfo {
        TextureInfo {
            id: self.id,
            u_size: self.u_size,
            v_size: self.v_size,
            u_scale: self.u_scale,
            v_scale: self.v_scale,
            poly_flags: self.poly_flags,
        }
    }
}
