/// Per-polygon rendering flags. Stored as a raw `u32` on triangles and passed
/// through to the render device, test with `flags & PolyFlags::X as u32`.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PolyFlags {
    /// Not drawn. Mesh triangles with this flag only feed the special
    /// coordinate system.
    Invisible = 1,
    /// Colour index 0 is transparent.
    Masked = 1 << 1,
    Translucent = 1 << 2,
    /// Texture coordinates are generated from the reflection vector.
    Environment = 1 << 4,
    Modulated = 1 << 6,
    /// Never backface culled, the winding is flipped instead.
    TwoSided = 1 << 8,
    NoSmooth = 1 << 11,
    /// No curvature subdivision.
    Flat = 1 << 14,
    Gouraud = 1 << 21,
    /// Lit with the actor's ambient glow only.
    Unlit = 1 << 22,
    /// Editor selection highlight.
    Selected = 1 << 25,
}

impl PolyFlags {
    #[inline]
    pub const fn is_set(self, flags: u32) -> bool {
        flags & self as u32 != 0
    }
}

/// Frustum side violations of a transformed point. Zero means inside all
/// four side planes.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcode {
    XMin = 1,
    XMax = 1 << 1,
    YMin = 1 << 2,
    YMax = 1 << 3,
}

/// All four sides.
pub const OUTCODE_REJECT: u8 = Outcode::XMin as u8
    | Outcode::XMax as u8
    | Outcode::YMin as u8
    | Outcode::YMax as u8;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum LineFlags {
    #[default]
    None,
    Transparent,
    DepthCued,
}
