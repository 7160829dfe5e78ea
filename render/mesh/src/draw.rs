//! Per actor mesh drawing.

#[cfg(feature = "hprof")]
use coarse_prof::profile;
use glam::{Vec3, Vec4};
use log::{trace, warn};
use math::{Coords, dist_squared, div_sqrt_approx, safe_normal, triple};
use render_trait::{
    IconDraw, LightManager, LineFlags, OUTCODE_REJECT, PolyFlags, RenderDevice, SceneNode,
    TextureInfo, Texture,
};
use std::ops::AddAssign;
use std::rc::Rc;

use crate::actor::{MeshActor, NEUTRAL_FATNESS};
use crate::arena::{FrameArena, VertId};
use crate::mesh::{MAX_MESH_TEXTURES, Mesh};
use crate::subdivide::{DrawContext, SubsurfacePass, render_subsurface};

/// Marks a vertex whose light has not been computed this draw.
const LIGHT_PENDING: f32 = -1.0;

/// Held weapons sort by distance from just below the eye, plain depth sorts
/// them badly that close to the camera.
const WEAPON_SORT_ORIGIN: Vec3 = Vec3::new(0.0, -8.0, 0.0);

const WIRE_COLOR: Vec3 = Vec3::new(0.6, 0.4, 0.1);
const WIRE_SELECTED_COLOR: Vec3 = Vec3::new(0.2, 0.8, 0.1);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Off draws every triangle flat, without subdivision
    pub curved_surfaces: bool,
    /// Tint selected actors
    pub editor: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            curved_surfaces: true,
            editor: false,
        }
    }
}

/// What one or more mesh draws did.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct MeshDrawStats {
    pub vertices: usize,
    /// Triangles past the frustum and early backface tests
    pub visible_tris: usize,
    pub polygons: usize,
    /// Triangles, split or not, that reached clipping
    pub leaves: usize,
    pub subdivided: usize,
    pub lines: usize,
    pub icons: usize,
    /// Frame of the last invisible triangle, for attaching effects
    pub special_coords: Option<Coords>,
}

impl AddAssign for MeshDrawStats {
    fn add_assign(&mut self, other: MeshDrawStats) {
        self.vertices += other.vertices;
        self.visible_tris += other.visible_tris;
        self.polygons += other.polygons;
        self.leaves += other.leaves;
        self.subdivided += other.subdivided;
        self.lines += other.lines;
        self.icons += other.icons;
        if other.special_coords.is_some() {
            self.special_coords = other.special_coords;
        }
    }
}

/// A visible triangle and its depth sort key, larger is further.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MeshTriSort {
    pub tri: u32,
    pub key: f32,
}

/// Draws mesh actors. Owns the frame arena and the scratch lists reused by
/// every draw, so drawing does not allocate once they have grown.
#[derive(Debug)]
pub struct MeshRenderer {
    pub options: RenderOptions,
    arena: FrameArena,
    tri_pool: Vec<MeshTriSort>,
    tri_normals: Vec<Vec3>,
    sorted_pts: Vec<VertId>,
    textures: [Option<TextureInfo>; MAX_MESH_TEXTURES],
}

impl Default for MeshRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}

impl MeshRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self::with_arena(options, FrameArena::default())
    }

    pub fn with_arena(options: RenderOptions, arena: FrameArena) -> Self {
        Self {
            options,
            arena,
            tri_pool: Vec::new(),
            tri_normals: Vec::new(),
            sorted_pts: Vec::new(),
            textures: [None; MAX_MESH_TEXTURES],
        }
    }

    pub fn arena(&self) -> &FrameArena {
        &self.arena
    }

    /// Draw `actor` into `frame`. `coords` maps world space into camera
    /// space, usually `frame.coords`. Everything taken from the arena is
    /// given back before returning.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_mesh<D: RenderDevice, L: LightManager>(
        &mut self,
        frame: &SceneNode,
        actor: &mut MeshActor,
        device: &mut D,
        lights: &mut L,
        span: Option<&D::SpanBuffer>,
        coords: &Coords,
        extra_flags: u32,
    ) -> MeshDrawStats {
        #[cfg(feature = "hprof")]
        profile!("draw_mesh");
        let Self {
            options,
            arena,
            tri_pool,
            tri_normals,
            sorted_pts,
            textures,
        } = self;

        let mesh = Rc::clone(&actor.mesh);
        let mut extra_flags = extra_flags;
        if !options.curved_surfaces {
            extra_flags |= PolyFlags::Flat as u32;
        }
        let mut stats = MeshDrawStats::default();

        let mut mark = arena.mark();
        let n = mesh.frame_verts();
        let samples = mark.alloc_n(n);
        let wire = frame.is_wire();
        let pose = actor.pose();
        let space = if wire { &Coords::UNIT } else { coords };
        mesh.get_frame(mark.slice_mut(samples, n), space, &pose, &mut actor.tween);

        let mut outcode = OUTCODE_REJECT;
        for s in mark.slice_mut(samples, n) {
            s.light.x = LIGHT_PENDING;
            s.compute_outcode(frame);
            outcode &= s.flags;
        }
        stats.vertices = n;

        if wire {
            draw_wire(frame, &mark, samples, &mesh, actor.selected, device, &mut stats);
            return stats;
        }

        let mut unlit_color = Vec3::splat(actor.unlit_level());
        if options.editor && PolyFlags::Selected.is_set(extra_flags) {
            unlit_color = unlit_color * 0.4 + Vec3::new(0.0, 0.6, 0.0);
        }

        if actor.particles {
            let Some(texture) = actor
                .texture
                .as_ref()
                .or(actor.zone_env_map.as_ref())
                .or(actor.level_env_map.as_ref())
            else {
                panic!("particle mesh {} has no texture", mesh.id());
            };
            let info = texture.info(frame.viewport.current_time);
            sorted_pts.clear();
            for k in 0..n {
                let id = samples.offset(k);
                let s = &mut mark[id];
                if s.flags == 0 && s.point.z > 1.0 {
                    s.project(frame);
                    sorted_pts.push(id);
                }
            }
            if device.span_based() {
                sorted_pts.sort_by(|a, b| mark[*b].point.z.total_cmp(&mark[*a].point.z));
            }
            for id in sorted_pts.iter() {
                let p = &mark[*id];
                let x_size = p.rz * info.u_size as f32 * actor.draw_scale;
                let y_size = p.rz * info.v_size as f32 * actor.draw_scale;
                let icon = IconDraw {
                    x: p.screen_x - x_size / 2.0,
                    y: p.screen_y - y_size / 2.0,
                    x_size,
                    y_size,
                    z: p.point.z,
                    color: unlit_color,
                    fog: Vec4::ZERO,
                    poly_flags: extra_flags | PolyFlags::TwoSided as u32 | info.poly_flags,
                };
                device.draw_icon(frame, &info, &icon, span);
                stats.icons += 1;
            }
            return stats;
        }

        tri_pool.clear();
        tri_normals.clear();
        if outcode == 0 {
            let weapon = actor.owned_by_viewer;
            for (i, tri) in mesh.tris().iter().enumerate() {
                let [v1, v2, v3] = tri.vertex.map(|v| &mark[samples.offset(v as usize)]);
                let poly_flags = extra_flags | tri.poly_flags;

                let normal = (v1.point - v2.point).cross(v3.point - v1.point);
                tri_normals.push(normal * div_sqrt_approx(normal.length_squared() + 0.001));

                if v1.flags & v2.flags & v3.flags != 0 {
                    continue;
                }
                let face = poly_flags
                    & (PolyFlags::TwoSided as u32 | PolyFlags::Flat as u32 | PolyFlags::Invisible as u32);
                if face != PolyFlags::Flat as u32
                    || frame.mirror * triple(v1.point, v2.point, v3.point) > 0.0
                {
                    let key = if weapon {
                        dist_squared(v1.point, WEAPON_SORT_ORIGIN)
                            * dist_squared(v2.point, WEAPON_SORT_ORIGIN)
                            * dist_squared(v3.point, WEAPON_SORT_ORIGIN)
                    } else {
                        v1.point.z + v2.point.z + v3.point.z
                    };
                    tri_pool.push(MeshTriSort { tri: i as u32, key });
                }
            }
        }
        stats.visible_tris = tri_pool.len();
        if tri_pool.is_empty() {
            trace!("Mesh {}: nothing visible", mesh.id());
            return stats;
        }

        if device.span_based() {
            tri_pool.sort_by(|a, b| b.key.total_cmp(&a.key));
        }

        let current_time = frame.viewport.current_time;
        let env_info = resolve_textures(textures, &mesh, actor, current_time);

        extra_flags |= lights.setup_for_actor(frame, &actor.lighting(coords));

        let fatten = actor.fatness != NEUTRAL_FATNESS;
        let fatness = actor.fatness as f32 / 16.0 - 8.0;
        for sort in tri_pool.iter() {
            for v in mesh.tris()[sort.tri as usize].vertex {
                let id = samples.offset(v as usize);
                if mark[id].light.x != LIGHT_PENDING {
                    continue;
                }
                let norm: Vec3 = mesh
                    .vert_tris(v as usize)
                    .iter()
                    .map(|t| tri_normals[*t as usize])
                    .sum();
                let vert = &mut mark[id];
                vert.normal = norm * div_sqrt_approx(norm.length_squared());
                if fatten {
                    let offset = vert.normal * fatness;
                    vert.point += offset;
                    vert.compute_outcode(frame);
                }
                let light = lights.light(&vert.sample, extra_flags);
                let fog = lights.fog(&vert.sample, extra_flags);
                vert.light = light;
                vert.fog = fog;
                if vert.flags == 0 {
                    vert.project(frame);
                }
            }
        }

        {
            let mut pass = SubsurfacePass::new(
                frame,
                device,
                lights,
                span,
                DrawContext {
                    unlit_color,
                    ..DrawContext::default()
                },
            );
            for sort in tri_pool.iter() {
                let tri = &mesh.tris()[sort.tri as usize];
                let [i0, i1, i2] = tri.vertex.map(|v| samples.offset(v as usize));
                if PolyFlags::Invisible.is_set(tri.poly_flags) {
                    let (p0, p1, p2) = (mark[i0].point, mark[i1].point, mark[i2].point);
                    let mid = 0.5 * (p0 + p2);
                    let x = safe_normal(p1 - mid);
                    let y = safe_normal(x.cross(p0 - p2));
                    stats.special_coords = Some(Coords::new(mid, x, y, y.cross(x)));
                    continue;
                }

                let poly_flags = tri.poly_flags | extra_flags;
                let info = match textures.get(tri.texture_index).copied().flatten() {
                    Some(info) if !PolyFlags::Environment.is_set(poly_flags) => info,
                    _ => env_info,
                };
                pass.texture = info;
                pass.ctx.u_scale = info.u_scale * info.u_size as f32 / 256.0;
                pass.ctx.v_scale = info.v_scale * info.v_size as f32 / 256.0;

                // Per triangle copies, shading below writes into them.
                let mut tri_mark = mark.mark();
                let mut pts = [VertId::ZERO; 3];
                for (j, id) in [i0, i1, i2].into_iter().enumerate() {
                    let mut p = tri_mark[id];
                    p.u = tri.tex[j].u as f32 * pass.ctx.u_scale;
                    p.v = tri.tex[j].v as f32 * pass.ctx.v_scale;
                    pts[j] = tri_mark.alloc(p);
                }
                if frame.mirror == -1.0 {
                    pts.swap(0, 2);
                }
                render_subsurface(&mut pass, &mut tri_mark, pts, poly_flags, 0);
            }
            stats.polygons = pass.stats.polygons;
            stats.leaves = pass.stats.leaves;
            stats.subdivided = pass.stats.subdivided;
        }
        lights.finish_actor();

        trace!(
            "Mesh {}: {} visible tris, {} polygons, {} split",
            mesh.id(),
            stats.visible_tris,
            stats.polygons,
            stats.subdivided
        );
        stats
    }
}

/// Fill `textures` with the mesh's slots and pick the environment map: the
/// actor's own texture, the zone's map, the level's map, then the last mesh
/// texture found. Having none at all is a content error.
fn resolve_textures(
    textures: &mut [Option<TextureInfo>; MAX_MESH_TEXTURES],
    mesh: &Mesh,
    actor: &MeshActor,
    current_time: f64,
) -> TextureInfo {
    let mut last: Option<&Rc<dyn Texture>> = None;
    for (slot, info) in textures.iter_mut().enumerate() {
        *info = None;
        if slot >= mesh.texture_slots() {
            continue;
        }
        match mesh.texture(slot, &actor.skins) {
            Some(texture) => {
                *info = Some(texture.info(current_time));
                last = Some(texture);
            }
            None => warn!("Mesh {} texture slot {slot} is empty", mesh.id()),
        }
    }

    let Some(env) = actor
        .texture
        .as_ref()
        .or(actor.zone_env_map.as_ref())
        .or(actor.level_env_map.as_ref())
        .or(last)
    else {
        panic!("mesh {} has no environment map", mesh.id());
    };
    env.info(current_time)
}

fn draw_wire<D: RenderDevice>(
    frame: &SceneNode,
    arena: &FrameArena,
    samples: VertId,
    mesh: &Mesh,
    selected: bool,
    device: &mut D,
    stats: &mut MeshDrawStats,
) {
    let color = if selected {
        WIRE_SELECTED_COLOR
    } else {
        WIRE_COLOR
    };
    for tri in mesh.tris() {
        let two_sided = PolyFlags::TwoSided.is_set(tri.poly_flags);
        let mut p1 = arena[samples.offset(tri.vertex[2] as usize)].point;
        for v in tri.vertex {
            let p2 = arena[samples.offset(v as usize)].point;
            // Shared edges come once from each side, keep one of them.
            if two_sided || p1.x >= p2.x {
                device.draw_3d_line(frame, color, LineFlags::DepthCued, p1, p2);
                stats.lines += 1;
            }
            p1 = p2;
        }
    }
}
