//! Orbits a camera around a procedural mesh actor and pushes every frame
//! through the mesh renderer into a counting device. Useful for profiling the
//! subdivision and clipping paths with `--features hprof`.

mod cli;
mod config;
mod procgen;
mod stats_device;

use cli::*;
use config::{MeshKind, UserConfig};
use glam::Vec3;
use log::{debug, info};
use math::{Angle, Rotator};
use render_mesh::{
    DistanceFog, MeshActor, MeshDrawStats, MeshRenderer, PointLightManager, RenderOptions,
};
use render_trait::{PolyFlags, RenderMode, SceneNode, StaticTexture, Texture, Viewport};
use simplelog::TermLogger;
use stats_device::StatsDevice;
use std::error::Error;
use std::rc::Rc;
use std::time::Instant;

const BASE_DIR: &str = "mesh-bench/";

const MESH_RADIUS: f32 = 64.0;
const ORBIT_DISTANCE: f32 = MESH_RADIUS * 3.5;
/// Breathing cycles per orbit
const BREATHS_PER_ORBIT: f32 = 4.0;
const TICS_PER_SECOND: f64 = 35.0;

fn main() -> Result<(), Box<dyn Error>> {
    let mut options: CLIOptions = argh::from_env();

    TermLogger::init(
        options.verbose.unwrap_or(log::LevelFilter::Info),
        simplelog::ConfigBuilder::default()
            .set_time_level(log::LevelFilter::Trace)
            .build(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let mut user_config = UserConfig::load()?;
    user_config.sync_cli(&mut options);
    user_config.write()?;

    let skin: Rc<dyn Texture> = Rc::new(StaticTexture::new(1, 256, 256));
    let chrome: Rc<dyn Texture> = Rc::new(StaticTexture::new(2, 128, 128));
    let poly_flags = if options.chrome {
        PolyFlags::Environment as u32
    } else {
        0
    };

    let mesh = match options.mesh.unwrap_or_default() {
        MeshKind::Sphere => procgen::sphere(MESH_RADIUS, options.detail, poly_flags, skin)?,
        MeshKind::Torus => procgen::torus(
            MESH_RADIUS * 0.75,
            MESH_RADIUS * 0.25,
            options.detail,
            poly_flags,
            skin,
        )?,
    };
    info!(
        "Mesh: {:?}, {} verts, {} tris, {} frames",
        options.mesh.unwrap_or_default(),
        mesh.frame_verts(),
        mesh.tris().len(),
        mesh.anim_frames()
    );

    let mut actor = MeshActor::new(Rc::new(mesh));
    actor.level_env_map = Some(chrome);
    actor.play(procgen::BREATHE, 0.0)?;

    let mut lights = PointLightManager::new(Vec3::splat(0.1))
        .with_light(
            Vec3::new(MESH_RADIUS * 2.0, -MESH_RADIUS * 3.0, MESH_RADIUS * 2.0),
            Vec3::new(1.0, 0.9, 0.75),
            ORBIT_DISTANCE * 2.0,
        )
        .with_light(
            Vec3::new(-MESH_RADIUS * 2.0, MESH_RADIUS, -MESH_RADIUS),
            Vec3::new(0.2, 0.3, 0.6),
            ORBIT_DISTANCE,
        )
        .with_fog(DistanceFog {
            color: Vec3::new(0.1, 0.1, 0.15),
            start: ORBIT_DISTANCE,
            end: ORBIT_DISTANCE * 4.0,
        });

    let mut viewport = Viewport::new(
        options.width,
        options.height,
        options.fov.unwrap_or(90.0),
    );
    if options.wire {
        viewport.mode = RenderMode::Wireframe;
    }

    let mut renderer = MeshRenderer::new(RenderOptions {
        curved_surfaces: !options.flat.unwrap_or(false),
        editor: false,
    });
    let mut device = StatsDevice::new(options.span_based.unwrap_or(false));
    let mut totals = MeshDrawStats::default();

    let frames = options.frames.max(1);
    let pitch = Angle::from_degrees(-20.0);
    let start = Instant::now();
    for i in 0..frames {
        let t = i as f32 / frames as f32;
        let rotation = Rotator::new(pitch, Angle::new(t * std::f32::consts::TAU), Angle::default());
        let location = -rotation.forward() * ORBIT_DISTANCE;
        viewport.current_time = i as f64 / TICS_PER_SECOND;

        let frame = SceneNode::new_master(viewport, location, rotation)?;
        actor.anim_frame = (t * BREATHS_PER_ORBIT).fract();
        let stats = renderer.draw_mesh(
            &frame,
            &mut actor,
            &mut device,
            &mut lights,
            None,
            &frame.coords,
            0,
        );
        debug!("frame {i}: {stats:?}");
        totals += stats;
    }
    let elapsed = start.elapsed();

    info!(
        "{} frames in {:.2?}, {:.3}ms per frame",
        frames,
        elapsed,
        elapsed.as_secs_f64() * 1000.0 / frames as f64
    );
    info!(
        "Drew {} vertices, {} visible tris, {} polygons, {} leaves, {} subdivided",
        totals.vertices, totals.visible_tris, totals.polygons, totals.leaves, totals.subdivided
    );
    info!("Arena high water: {} verts", renderer.arena().high_water());
    info!("Lit {} actors\n{}", lights.actors_lit(), device);

    #[cfg(feature = "hprof")]
    coarse_prof::write(&mut std::io::stdout())?;
    Ok(())
}
