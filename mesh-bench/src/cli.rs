use argh::FromArgs;

use crate::config::MeshKind;

/// CLI options for mesh-bench
#[derive(Debug, Clone, FromArgs)]
pub struct CLIOptions {
    /// verbose level: off, error, warn, info, debug, trace
    #[argh(option)]
    pub verbose: Option<log::LevelFilter>,
    /// viewport width in pixels
    #[argh(option, default = "0")]
    pub width: u32,
    /// viewport height in pixels
    #[argh(option, default = "0")]
    pub height: u32,
    /// horizontal field of view in degrees
    #[argh(option)]
    pub fov: Option<f32>,
    /// number of frames to render while orbiting the mesh
    #[argh(option, default = "0")]
    pub frames: u32,
    /// mesh to draw: sphere, torus
    #[argh(option)]
    pub mesh: Option<MeshKind>,
    /// rings and segments of the generated mesh
    #[argh(option, default = "0")]
    pub detail: u32,
    /// draw every triangle flat, no curvature subdivision
    #[argh(option)]
    pub flat: Option<bool>,
    /// wireframe view
    #[argh(option, default = "false")]
    pub wire: bool,
    /// submit polygons back to front as a span buffer device wants
    #[argh(option)]
    pub span_based: Option<bool>,
    /// environment map the mesh instead of texturing it
    #[argh(option, default = "false")]
    pub chrome: bool,
}
