use glam::Vec3;
use math::Plane;
use render_trait::{LineFlags, PolyFlags, RenderMode, SceneNode, StaticTexture, Texture};
use std::rc::Rc;

use super::{FlatLights, RecordingDevice, test_frame};
use crate::actor::MeshActor;
use crate::arena::FrameArena;
use crate::draw::{MeshDrawStats, MeshRenderer, RenderOptions};
use crate::mesh::{Mesh, MeshTri, MeshUV};

/// Camera space of [`test_frame`] back to world space.
fn world(c: Vec3) -> Vec3 {
    Vec3::new(c.z, c.x, -c.y)
}

fn texture(id: u64, size: u32) -> Rc<dyn Texture> {
    Rc::new(StaticTexture::new(id, size, size))
}

const UV: [MeshUV; 3] = [MeshUV::new(0, 0), MeshUV::new(255, 0), MeshUV::new(0, 255)];

/// Mesh from camera space positions, one keyframe.
fn mesh(camera_pts: &[Vec3], tris: Vec<MeshTri>, with_texture: bool) -> Rc<Mesh> {
    let verts = camera_pts.iter().map(|c| world(*c)).collect();
    let mut mesh = Mesh::new(vec![verts], tris).unwrap();
    if with_texture {
        mesh = mesh.with_textures(vec![Some(texture(7, 256))]).unwrap();
    }
    Rc::new(mesh)
}

fn facing_tri(depth: f32, flags: u32) -> (Vec<Vec3>, Vec<MeshTri>) {
    (
        vec![
            Vec3::new(0.0, 0.0, depth),
            Vec3::new(1.0, 0.0, depth),
            Vec3::new(0.0, 1.0, depth),
        ],
        vec![MeshTri::new([0, 1, 2], UV, flags)],
    )
}

fn actor(mesh: Rc<Mesh>) -> MeshActor {
    let mut actor = MeshActor::new(mesh);
    actor.texture = Some(texture(9, 128));
    actor
}

fn renderer(curved: bool) -> MeshRenderer {
    MeshRenderer::with_arena(
        RenderOptions {
            curved_surfaces: curved,
            editor: false,
        },
        FrameArena::with_capacity(4096),
    )
}

fn draw(
    renderer: &mut MeshRenderer,
    frame: &SceneNode,
    actor: &mut MeshActor,
    device: &mut RecordingDevice,
    lights: &mut FlatLights,
    extra_flags: u32,
) -> MeshDrawStats {
    renderer.draw_mesh(frame, actor, device, lights, None, &frame.coords, extra_flags)
}

#[test]
fn test_flat_triangle_draws_one_polygon() {
    let frame = test_frame();
    let (pts, tris) = facing_tri(10.0, 0);
    let mut actor = actor(mesh(&pts, tris, true));
    let mut renderer = renderer(false);
    let mut device = RecordingDevice::default();
    let mut lights = FlatLights::default();

    let stats = draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert_eq!(stats.visible_tris, 1);
    assert_eq!(stats.polygons, 1);
    assert_eq!(stats.subdivided, 0);
    assert_eq!(device.polygons.len(), 1);

    let poly = &device.polygons[0];
    assert_eq!(poly.texture.id, 7);
    assert!(PolyFlags::Flat.is_set(poly.poly_flags));
    assert_eq!(poly.pts.len(), 3);
    for (p, want) in poly.pts.iter().zip(&pts) {
        assert!((p.point - *want).length() < 1e-4);
        assert_eq!(p.light, Vec3::ONE);
    }
    assert_eq!(poly.pts[1].u, 255.0);
    assert_eq!(poly.pts[2].v, 255.0);
    assert!(renderer.arena().is_empty());
    assert_eq!(lights.setups, 1);
    assert_eq!(lights.finished, 1);
}

#[test]
fn test_mesh_outside_one_side_is_rejected() {
    let frame = test_frame();
    // Far off to the left of the screen, all vertices past the same side.
    let pts = [
        Vec3::new(-300.0, 0.0, 10.0),
        Vec3::new(-299.0, 0.0, 10.0),
        Vec3::new(-300.0, 1.0, 10.0),
    ];
    let tris = vec![MeshTri::new([0, 1, 2], UV, 0)];
    // No textures anywhere: reaching texture resolution would panic.
    let mut actor = MeshActor::new(mesh(&pts, tris, false));
    let mut renderer = renderer(true);
    let mut device = RecordingDevice::default();
    let mut lights = FlatLights::default();

    let stats = draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert_eq!(stats.visible_tris, 0);
    assert_eq!(stats.polygons, 0);
    assert!(device.polygons.is_empty());
    assert_eq!(lights.setups, 0);
    assert_eq!(lights.light_calls, 0);
}

#[test]
fn test_environment_flag_uses_environment_map() {
    let frame = test_frame();
    let (pts, tris) = facing_tri(10.0, PolyFlags::Environment as u32);
    let mut actor = actor(mesh(&pts, tris, true));
    let mut renderer = renderer(false);
    let mut device = RecordingDevice::default();
    let mut lights = FlatLights::default();

    draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert_eq!(device.polygons[0].texture.id, 9);
}

#[test]
fn test_environment_map_fallback_order() {
    let frame = test_frame();
    let (pts, tris) = facing_tri(10.0, PolyFlags::Environment as u32);
    let mut actor = MeshActor::new(mesh(&pts, tris, true));
    actor.zone_env_map = Some(texture(11, 64));
    actor.level_env_map = Some(texture(12, 64));
    let mut renderer = renderer(false);
    let mut lights = FlatLights::default();

    let mut env_id = |actor: &mut MeshActor| {
        let mut device = RecordingDevice::default();
        draw(&mut renderer, &frame, actor, &mut device, &mut lights, 0);
        device.polygons[0].texture.id
    };
    assert_eq!(env_id(&mut actor), 11);
    actor.zone_env_map = None;
    assert_eq!(env_id(&mut actor), 12);
    actor.level_env_map = None;
    // Last resolved mesh texture.
    assert_eq!(env_id(&mut actor), 7);
}

#[test]
#[should_panic(expected = "has no environment map")]
fn test_missing_environment_map_panics() {
    let frame = test_frame();
    let (pts, tris) = facing_tri(10.0, 0);
    let mut actor = MeshActor::new(mesh(&pts, tris, false));
    let mut renderer = renderer(false);
    let mut device = RecordingDevice::default();
    let mut lights = FlatLights::default();
    draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
}

#[test]
fn test_vertex_lighting_is_cached() {
    let frame = test_frame();
    let pts = [
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::new(1.0, 0.0, 10.0),
        Vec3::new(1.0, 1.0, 10.0),
        Vec3::new(0.0, 1.0, 10.0),
    ];
    let tris = vec![
        MeshTri::new([0, 1, 2], UV, 0),
        MeshTri::new([0, 2, 3], UV, 0),
    ];
    let mut actor = actor(mesh(&pts, tris, true));
    let mut renderer = renderer(false);
    let mut device = RecordingDevice::default();
    let mut lights = FlatLights::default();

    let stats = draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert_eq!(stats.polygons, 2);
    // Shared vertices are lit once.
    assert_eq!(lights.light_calls, 4);
}

#[test]
fn test_invisible_triangle_sets_special_coords() {
    let frame = test_frame();
    let pts = [
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::new(1.0, 0.0, 10.0),
        Vec3::new(0.0, 1.0, 10.0),
        Vec3::new(2.0, 0.0, 12.0),
        Vec3::new(3.0, 1.0, 12.0),
        Vec3::new(2.0, 2.0, 12.0),
    ];
    let tris = vec![
        MeshTri::new([0, 1, 2], UV, 0),
        MeshTri::new([3, 4, 5], UV, PolyFlags::Invisible as u32),
    ];
    let mut actor = actor(mesh(&pts, tris, true));
    let mut renderer = renderer(false);
    let mut device = RecordingDevice::default();
    let mut lights = FlatLights::default();

    let stats = draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert_eq!(stats.visible_tris, 2);
    assert_eq!(device.polygons.len(), 1);
    let coords = stats.special_coords.unwrap();
    let mid = (pts[3] + pts[5]) * 0.5;
    assert!((coords.origin - mid).length() < 1e-4);
    // X points from the mid point at the odd vertex.
    let x = (pts[4] - mid).normalize();
    assert!((coords.x_axis - x).length() < 1e-4);
    assert!(coords.x_axis.dot(coords.y_axis).abs() < 1e-4);
    assert!((coords.z_axis - coords.y_axis.cross(coords.x_axis)).length() < 1e-6);
}

#[test]
fn test_wireframe_draws_shared_edges_once() {
    let mut frame = test_frame();
    frame.viewport.mode = RenderMode::Wireframe;
    // Wireframe works in world space, these are world positions.
    let square = [
        Vec3::new(10.0, 0.0, 0.0),
        Vec3::new(11.0, 0.0, 0.0),
        Vec3::new(11.0, 1.0, 0.0),
        Vec3::new(10.0, 1.0, 0.0),
    ];
    let verts = square.to_vec();
    let tris = vec![
        MeshTri::new([0, 1, 2], UV, 0),
        MeshTri::new([0, 2, 3], UV, 0),
    ];
    let mut actor = MeshActor::new(Rc::new(Mesh::new(vec![verts], tris).unwrap()));
    let mut renderer = renderer(true);
    let mut device = RecordingDevice::default();
    let mut lights = FlatLights::default();

    let stats = draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert_eq!(stats.lines, device.lines.len());
    assert!(device.polygons.is_empty());
    assert_eq!(lights.setups, 0);

    let diagonal = |l: &&super::RecordedLine| {
        (l.p1 == square[0] && l.p2 == square[2]) || (l.p1 == square[2] && l.p2 == square[0])
    };
    assert_eq!(device.lines.iter().filter(diagonal).count(), 1);
    for line in &device.lines {
        assert_eq!(line.flags, LineFlags::DepthCued);
        assert_eq!(line.color, Vec3::new(0.6, 0.4, 0.1));
        assert!(line.p1.x >= line.p2.x);
    }

    actor.selected = true;
    let mut device = RecordingDevice::default();
    draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert!(device.lines.iter().all(|l| l.color == Vec3::new(0.2, 0.8, 0.1)));
}

#[test]
fn test_particles_draw_sorted_icons() {
    let frame = test_frame();
    let pts = [
        Vec3::new(0.0, 0.0, 10.0),
        Vec3::new(1.0, 0.0, 30.0),
        Vec3::new(0.0, 1.0, 20.0),
        // Too close to the eye.
        Vec3::new(0.0, 0.0, 0.5),
        // Off screen.
        Vec3::new(500.0, 0.0, 10.0),
    ];
    let mut actor = MeshActor::new(mesh(&pts, Vec::new(), false));
    actor.particles = true;
    actor.texture = Some(texture(5, 16));
    let mut renderer = renderer(true);
    let mut device = RecordingDevice {
        span_based: true,
        ..RecordingDevice::default()
    };
    let mut lights = FlatLights::default();

    let stats = draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert_eq!(stats.icons, 3);
    let depths: Vec<f32> = device.icons.iter().map(|i| i.z).collect();
    assert_eq!(depths.len(), 3);
    assert!((depths[0] - 30.0).abs() < 1e-3);
    assert!((depths[1] - 20.0).abs() < 1e-3);
    assert!((depths[2] - 10.0).abs() < 1e-3);

    let far = &device.icons[0];
    let size = frame.proj.z / 30.0 * 16.0;
    assert!((far.x_size - size).abs() < 1e-3);
    assert!((far.y_size - size).abs() < 1e-3);
    assert!(PolyFlags::TwoSided.is_set(far.poly_flags));
    // Centred on the projected point.
    let centre_x = (1.0 * frame.proj.z / 30.0) + frame.fx15;
    assert!((far.x + far.x_size / 2.0 - centre_x).abs() < 1e-2);
    assert_eq!(far.color, Vec3::splat(0.5));
}

#[test]
#[should_panic(expected = "has no texture")]
fn test_particles_without_texture_panic() {
    let frame = test_frame();
    let (pts, _) = facing_tri(10.0, 0);
    let mut actor = MeshActor::new(mesh(&pts, Vec::new(), false));
    actor.particles = true;
    let mut renderer = renderer(true);
    let mut device = RecordingDevice::default();
    let mut lights = FlatLights::default();
    draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
}

fn near_and_far() -> (Vec<Vec3>, Vec<MeshTri>) {
    let pts = vec![
        Vec3::new(-4.0, 0.0, 10.0),
        Vec3::new(-3.0, 0.0, 10.0),
        Vec3::new(-4.0, 1.0, 10.0),
        Vec3::new(4.0, 0.0, 20.0),
        Vec3::new(5.0, 0.0, 20.0),
        Vec3::new(4.0, 1.0, 20.0),
    ];
    let tris = vec![
        MeshTri::new([0, 1, 2], UV, 0),
        MeshTri::new([3, 4, 5], UV, 0),
    ];
    (pts, tris)
}

#[test]
fn test_span_based_devices_get_far_first() {
    let frame = test_frame();
    let (pts, tris) = near_and_far();
    let mut actor = actor(mesh(&pts, tris, true));
    let mut renderer = renderer(false);
    let mut lights = FlatLights::default();

    let mut device = RecordingDevice::default();
    draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert!((device.polygons[0].pts[0].point.z - 10.0).abs() < 1e-3);

    let mut device = RecordingDevice {
        span_based: true,
        ..RecordingDevice::default()
    };
    draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert!((device.polygons[0].pts[0].point.z - 20.0).abs() < 1e-3);

    // The held weapon key sorts the same two far first as well.
    actor.owned_by_viewer = true;
    let mut device = RecordingDevice {
        span_based: true,
        ..RecordingDevice::default()
    };
    draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert!((device.polygons[0].pts[0].point.z - 20.0).abs() < 1e-3);
}

#[test]
fn test_weapon_key_overrides_depth_order() {
    let frame = test_frame();
    // A small triangle far away on the view axis, and a huge one close up
    // whose corners sit far out to the sides. Depth puts the small one
    // first, distance from below the eye puts the huge one first.
    let pts = vec![
        Vec3::new(0.0, 0.0, 30.0),
        Vec3::new(1.0, 0.0, 30.0),
        Vec3::new(0.0, 1.0, 30.0),
        Vec3::new(-100.0, 0.0, 10.0),
        Vec3::new(100.0, 0.0, 10.0),
        Vec3::new(0.0, 100.0, 10.0),
    ];
    let tris = vec![
        MeshTri::new([0, 1, 2], UV, 0),
        MeshTri::new([3, 4, 5], UV, 0),
    ];
    let mut actor = actor(mesh(&pts, tris, true));
    let mut renderer = renderer(false);
    let mut lights = FlatLights::default();

    let mut device = RecordingDevice {
        span_based: true,
        ..RecordingDevice::default()
    };
    draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert_eq!(device.polygons.len(), 2);
    assert!((device.polygons[0].pts[0].point.z - 30.0).abs() < 1e-3);

    actor.owned_by_viewer = true;
    let mut device = RecordingDevice {
        span_based: true,
        ..RecordingDevice::default()
    };
    draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert_eq!(device.polygons.len(), 2);
    assert!((device.polygons[0].pts[0].point.z - 10.0).abs() < 1e-3);
}

/// A child of [`test_frame`] seen through a mirror: camera X flipped.
fn mirrored_frame(mirror: f32) -> SceneNode {
    let parent = test_frame();
    let mut coords = parent.coords;
    coords.x_axis = -coords.x_axis;
    SceneNode::new_child(&parent, mirror, Plane::NONE, coords).unwrap()
}

#[test]
fn test_mirror_frame_restores_winding() {
    let (pts, tris) = facing_tri(10.0, 0);
    let mut actor = actor(mesh(&pts, tris, true));
    let mut renderer = renderer(false);
    let mut lights = FlatLights::default();

    // Flipping X reverses the winding on screen, a mirror frame expects it.
    let frame = mirrored_frame(-1.0);
    let mut device = RecordingDevice::default();
    let stats = draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert_eq!(stats.visible_tris, 1);
    assert_eq!(device.polygons.len(), 1);
    // Submitted with the first and last corners swapped.
    let poly = &device.polygons[0];
    assert!((poly.pts[0].point - Vec3::new(0.0, 1.0, 10.0)).length() < 1e-4);
    assert!((poly.pts[2].point - Vec3::new(0.0, 0.0, 10.0)).length() < 1e-4);

    // The same flipped view without the mirror flag faces away.
    let frame = mirrored_frame(1.0);
    let mut device = RecordingDevice::default();
    let stats = draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    assert_eq!(stats.visible_tris, 0);
    assert!(device.polygons.is_empty());
}

#[test]
fn test_editor_selection_tint() {
    let frame = test_frame();
    let (pts, tris) = facing_tri(10.0, PolyFlags::Unlit as u32);
    let mut actor = actor(mesh(&pts, tris, true));
    let mut renderer = MeshRenderer::with_arena(
        RenderOptions {
            curved_surfaces: false,
            editor: true,
        },
        FrameArena::with_capacity(256),
    );
    let mut device = RecordingDevice::default();
    let mut lights = FlatLights::default();

    draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    let plain = device.polygons[0].pts[0].light;
    assert!((plain - Vec3::splat(0.5)).length() < 1e-6);

    let mut device = RecordingDevice::default();
    let selected = PolyFlags::Selected as u32;
    draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, selected);
    let tinted = device.polygons[0].pts[0].light;
    assert!((tinted - Vec3::new(0.2, 0.8, 0.2)).length() < 1e-6);
}

#[test]
fn test_fatness_moves_vertices_along_normal() {
    let frame = test_frame();
    let (pts, tris) = facing_tri(10.0, 0);
    let mut actor = actor(mesh(&pts, tris, true));
    // One unit out, toward the camera for a facing triangle.
    actor.fatness = 144;
    let mut renderer = renderer(false);
    let mut device = RecordingDevice::default();
    let mut lights = FlatLights::default();

    draw(&mut renderer, &frame, &mut actor, &mut device, &mut lights, 0);
    for p in &device.polygons[0].pts {
        assert!((p.point.z - 9.0).abs() < 0.01, "{}", p.point.z);
    }
}

#[test]
fn test_curved_surfaces_subdivide_bent_mesh() {
    let frame = test_frame();
    // A pyramid pointing at the camera.
    let pts = [
        Vec3::new(0.0, 0.0, 8.0),
        Vec3::new(-4.0, -4.0, 12.0),
        Vec3::new(4.0, -4.0, 12.0),
        Vec3::new(4.0, 4.0, 12.0),
        Vec3::new(-4.0, 4.0, 12.0),
    ];
    let tris = (0..4)
        .map(|i| MeshTri::new([0, 1 + i, 1 + (i + 1) % 4], UV, 0))
        .collect();
    let mut actor = actor(mesh(&pts, tris, true));
    let mut lights = FlatLights::default();

    let mut flat = renderer(false);
    let mut device = RecordingDevice::default();
    let stats = draw(&mut flat, &frame, &mut actor, &mut device, &mut lights, 0);
    assert_eq!(stats.polygons, 4);
    assert_eq!(stats.subdivided, 0);

    let mut curved = renderer(true);
    let mut device = RecordingDevice::default();
    let stats = draw(&mut curved, &frame, &mut actor, &mut device, &mut lights, 0);
    assert!(stats.subdivided > 0);
    assert!(stats.polygons > 4);
    assert!(stats.leaves <= 4 * 64);
    assert_eq!(stats.polygons, device.polygons.len());
    assert!(curved.arena().is_empty());
}
