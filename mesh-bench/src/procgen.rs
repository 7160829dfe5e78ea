//! Procedural test meshes. Each has two keyframes, the second inflated, and a
//! `breathe` sequence running between them.

use glam::Vec3;
use render_mesh::{AnimSeq, Mesh, MeshError, MeshTri, MeshUV};
use render_trait::Texture;
use std::f32::consts::{PI, TAU};
use std::rc::Rc;

pub const BREATHE: &str = "breathe";
const BREATHE_SCALE: f32 = 1.1;

fn uv(s: f32, t: f32) -> MeshUV {
    MeshUV::new((s * 255.0) as u8, (t * 255.0) as u8)
}

/// Builds triangles wound so that `(b - a) x (c - a)` points away from the
/// surface centre, which is what the renderer treats as front facing.
struct TriBuilder<'a> {
    verts: &'a [Vec3],
    uvs: &'a [MeshUV],
    poly_flags: u32,
    tris: Vec<MeshTri>,
}

impl<'a> TriBuilder<'a> {
    fn push(&mut self, mut idx: [u32; 3], outward: impl Fn(Vec3) -> Vec3) {
        let [a, b, c] = idx.map(|i| self.verts[i as usize]);
        let centroid = (a + b + c) / 3.0;
        if (b - a).cross(c - a).dot(outward(centroid)) < 0.0 {
            idx.swap(1, 2);
        }
        let tex = idx.map(|i| self.uvs[i as usize]);
        self.tris.push(MeshTri::new(idx, tex, self.poly_flags));
    }
}

fn finish(
    base: Vec<Vec3>,
    tris: Vec<MeshTri>,
    skin: Rc<dyn Texture>,
) -> Result<Mesh, MeshError> {
    let inflated = base.iter().map(|v| *v * BREATHE_SCALE).collect();
    Mesh::new(vec![base, inflated], tris)?
        .with_textures(vec![Some(skin)])?
        .with_anim_seq(AnimSeq::new(BREATHE, 0, 2))
}

/// A UV sphere of `radius` around the origin. `detail` is the number of
/// latitude bands, at least 2.
pub fn sphere(
    radius: f32,
    detail: u32,
    poly_flags: u32,
    skin: Rc<dyn Texture>,
) -> Result<Mesh, MeshError> {
    let rings = detail.max(2);
    let segments = rings * 2;

    let mut verts = vec![Vec3::new(0.0, 0.0, radius)];
    let mut uvs = vec![uv(0.5, 0.0)];
    for i in 1..rings {
        let t = i as f32 / rings as f32;
        let (st, ct) = (t * PI).sin_cos();
        for j in 0..segments {
            let s = j as f32 / segments as f32;
            let (sp, cp) = (s * TAU).sin_cos();
            verts.push(Vec3::new(st * cp, st * sp, ct) * radius);
            uvs.push(uv(s, t));
        }
    }
    verts.push(Vec3::new(0.0, 0.0, -radius));
    uvs.push(uv(0.5, 1.0));

    let top = 0;
    let bottom = verts.len() as u32 - 1;
    let ring = |i: u32, j: u32| 1 + (i - 1) * segments + j % segments;

    let mut builder = TriBuilder {
        verts: &verts,
        uvs: &uvs,
        poly_flags,
        tris: Vec::new(),
    };
    let outward = |c: Vec3| c;
    for j in 0..segments {
        builder.push([top, ring(1, j), ring(1, j + 1)], outward);
        for i in 1..rings - 1 {
            let (a, b) = (ring(i, j), ring(i, j + 1));
            let (c, d) = (ring(i + 1, j + 1), ring(i + 1, j));
            builder.push([a, b, c], outward);
            builder.push([a, c, d], outward);
        }
        builder.push([bottom, ring(rings - 1, j + 1), ring(rings - 1, j)], outward);
    }
    let tris = builder.tris;
    finish(verts, tris, skin)
}

/// A torus in the XY plane. `detail` is the number of segments around the
/// tube, twice as many go around the ring.
pub fn torus(
    major: f32,
    minor: f32,
    detail: u32,
    poly_flags: u32,
    skin: Rc<dyn Texture>,
) -> Result<Mesh, MeshError> {
    let sides = detail.max(3);
    let segments = sides * 2;

    let mut verts = Vec::with_capacity((sides * segments) as usize);
    let mut uvs = Vec::with_capacity(verts.capacity());
    for j in 0..segments {
        let s = j as f32 / segments as f32;
        let (su, cu) = (s * TAU).sin_cos();
        for i in 0..sides {
            let t = i as f32 / sides as f32;
            let (sv, cv) = (t * TAU).sin_cos();
            let r = major + minor * cv;
            verts.push(Vec3::new(r * cu, r * su, minor * sv));
            uvs.push(uv(s, t));
        }
    }
    let at = |j: u32, i: u32| (j % segments) * sides + i % sides;

    let mut builder = TriBuilder {
        verts: &verts,
        uvs: &uvs,
        poly_flags,
        tris: Vec::new(),
    };
    let outward = |c: Vec3| {
        let ring = Vec3::new(c.x, c.y, 0.0).normalize_or_zero() * major;
        c - ring
    };
    for j in 0..segments {
        for i in 0..sides {
            let (a, b) = (at(j, i), at(j + 1, i));
            let (c, d) = (at(j + 1, i + 1), at(j, i + 1));
            builder.push([a, b, c], outward);
            builder.push([a, c, d], outward);
        }
    }
    let tris = builder.tris;
    finish(verts, tris, skin)
}
