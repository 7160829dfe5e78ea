//! Vertex animated meshes.

use glam::Vec3;
use math::{BoundingBox, Coords, Rotator};
use render_trait::{Texture, TransTexture};
use std::error::Error;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::actor::ActorPose;

/// Texture slots one mesh may reference.
pub const MAX_MESH_TEXTURES: usize = 16;

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    NoFrames,
    FrameSizeMismatch {
        frame: usize,
        expected: usize,
        got: usize,
    },
    VertexOutOfRange {
        tri: usize,
        vertex: u32,
    },
    TextureSlotOutOfRange {
        tri: usize,
        slot: usize,
    },
    TooManyTextures(usize),
    EmptySequence(String),
    SequenceOutOfRange(String),
    UnknownSequence(String),
}

impl Error for MeshError {}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshError::NoFrames => write!(f, "mesh has no animation frames"),
            MeshError::FrameSizeMismatch {
                frame,
                expected,
                got,
            } => write!(f, "frame {frame} has {got} vertices, expected {expected}"),
            MeshError::VertexOutOfRange { tri, vertex } => {
                write!(f, "triangle {tri} references missing vertex {vertex}")
            }
            MeshError::TextureSlotOutOfRange { tri, slot } => {
                write!(f, "triangle {tri} uses texture slot {slot} which does not exist")
            }
            MeshError::TooManyTextures(n) => {
                write!(f, "{n} texture slots, at most {MAX_MESH_TEXTURES} allowed")
            }
            MeshError::EmptySequence(name) => write!(f, "animation {name} has no frames"),
            MeshError::SequenceOutOfRange(name) => {
                write!(f, "animation {name} runs past the last frame")
            }
            MeshError::UnknownSequence(name) => write!(f, "no animation named {name}"),
        }
    }
}

/// Texture coordinate in texels of a 256 wide map.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct MeshUV {
    pub u: u8,
    pub v: u8,
}

impl MeshUV {
    pub const fn new(u: u8, v: u8) -> Self {
        Self { u, v }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct MeshTri {
    pub vertex: [u32; 3],
    pub tex: [MeshUV; 3],
    pub texture_index: usize,
    pub poly_flags: u32,
}

impl MeshTri {
    pub fn new(vertex: [u32; 3], tex: [MeshUV; 3], poly_flags: u32) -> Self {
        Self {
            vertex,
            tex,
            texture_index: 0,
            poly_flags,
        }
    }
}

/// The triangles touching one vertex, as a run in [`Mesh::vert_links`].
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct VertConnect {
    pub num_tris: u32,
    pub tri_offset: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimSeq {
    pub name: String,
    pub start_frame: usize,
    pub num_frames: usize,
}

impl AnimSeq {
    pub fn new(name: &str, start_frame: usize, num_frames: usize) -> Self {
        Self {
            name: name.to_string(),
            start_frame,
            num_frames,
        }
    }

    /// Mesh frames on either side of sequence frame `i_frame`, wrapping.
    /// Saturated frame numbers from runaway animation still land in range.
    fn keyframes(&self, i_frame: usize) -> (usize, usize) {
        let first = i_frame % self.num_frames;
        let second = (first + 1) % self.num_frames;
        (self.start_frame + first, self.start_frame + second)
    }
}

/// Last pose handed out for one actor, the starting point of tweens into a
/// new animation.
#[derive(Debug, Default, Clone)]
pub struct TweenCache {
    mesh_id: Option<u64>,
    frame: f32,
    sequence: Option<usize>,
    verts: Vec<Vec3>,
}

impl TweenCache {
    pub fn is_for(&self, mesh: &Mesh) -> bool {
        self.mesh_id == Some(mesh.id) && self.verts.len() == mesh.frame_verts
    }

    pub fn clear(&mut self) {
        self.mesh_id = None;
        self.verts.clear();
    }
}

#[derive(Debug)]
pub struct Mesh {
    id: u64,
    frame_verts: usize,
    anim_frames: usize,
    /// All frames back to back
    verts: Vec<Vec3>,
    tris: Vec<MeshTri>,
    connects: Vec<VertConnect>,
    vert_links: Vec<u32>,
    anim_seqs: Vec<AnimSeq>,
    textures: Vec<Option<Rc<dyn Texture>>>,
    bounding_box: BoundingBox,
    bounding_boxes: Vec<BoundingBox>,
    pub scale: Vec3,
    pub origin: Vec3,
    pub rot_origin: Rotator,
}

impl Mesh {
    /// Build a mesh from keyframes of equal size and triangles indexing into
    /// them. Connectivity and bounds are derived here.
    pub fn new(frames: Vec<Vec<Vec3>>, tris: Vec<MeshTri>) -> Result<Self, MeshError> {
        let frame_verts = frames.first().map_or(0, Vec::len);
        if frame_verts == 0 {
            return Err(MeshError::NoFrames);
        }
        for (frame, verts) in frames.iter().enumerate() {
            if verts.len() != frame_verts {
                return Err(MeshError::FrameSizeMismatch {
                    frame,
                    expected: frame_verts,
                    got: verts.len(),
                });
            }
        }
        for (i, tri) in tris.iter().enumerate() {
            if let Some(v) = tri.vertex.iter().find(|v| **v as usize >= frame_verts) {
                return Err(MeshError::VertexOutOfRange { tri: i, vertex: *v });
            }
            if tri.texture_index >= MAX_MESH_TEXTURES {
                return Err(MeshError::TextureSlotOutOfRange {
                    tri: i,
                    slot: tri.texture_index,
                });
            }
        }

        let bounding_boxes: Vec<_> = frames.iter().map(|f| BoundingBox::from_points(f)).collect();
        let bounding_box = bounding_boxes
            .iter()
            .fold(BoundingBox::default(), |b, f| b + *f);
        let (connects, vert_links) = build_connects(frame_verts, &tris);

        Ok(Self {
            id: NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed),
            frame_verts,
            anim_frames: frames.len(),
            verts: frames.into_iter().flatten().collect(),
            tris,
            connects,
            vert_links,
            anim_seqs: Vec::new(),
            textures: Vec::new(),
            bounding_box,
            bounding_boxes,
            scale: Vec3::ONE,
            origin: Vec3::ZERO,
            rot_origin: Rotator::ZERO,
        })
    }

    pub fn with_textures(mut self, textures: Vec<Option<Rc<dyn Texture>>>) -> Result<Self, MeshError> {
        if textures.len() > MAX_MESH_TEXTURES {
            return Err(MeshError::TooManyTextures(textures.len()));
        }
        if let Some((i, tri)) = self
            .tris
            .iter()
            .enumerate()
            .find(|(_, t)| t.texture_index >= textures.len())
        {
            return Err(MeshError::TextureSlotOutOfRange {
                tri: i,
                slot: tri.texture_index,
            });
        }
        self.textures = textures;
        Ok(self)
    }

    pub fn with_anim_seq(mut self, seq: AnimSeq) -> Result<Self, MeshError> {
        if seq.num_frames == 0 {
            return Err(MeshError::EmptySequence(seq.name));
        }
        if seq.start_frame + seq.num_frames > self.anim_frames {
            return Err(MeshError::SequenceOutOfRange(seq.name));
        }
        self.anim_seqs.push(seq);
        Ok(self)
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_rot_origin(mut self, rot_origin: Rotator) -> Self {
        self.rot_origin = rot_origin;
        self
    }

    /// Unique per mesh, keys the per-actor tween caches.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn frame_verts(&self) -> usize {
        self.frame_verts
    }

    pub fn anim_frames(&self) -> usize {
        self.anim_frames
    }

    pub fn tris(&self) -> &[MeshTri] {
        &self.tris
    }

    pub fn connects(&self) -> &[VertConnect] {
        &self.connects
    }

    pub fn vert_links(&self) -> &[u32] {
        &self.vert_links
    }

    /// Indices of the triangles touching vertex `v`.
    pub fn vert_tris(&self, v: usize) -> &[u32] {
        let c = self.connects[v];
        let start = c.tri_offset as usize;
        &self.vert_links[start..start + c.num_tris as usize]
    }

    pub fn frame(&self, frame: usize) -> &[Vec3] {
        let start = frame * self.frame_verts;
        &self.verts[start..start + self.frame_verts]
    }

    pub fn anim_seqs(&self) -> &[AnimSeq] {
        &self.anim_seqs
    }

    pub fn anim_seq_index(&self, name: &str) -> Option<usize> {
        self.anim_seqs.iter().position(|s| s.name == name)
    }

    pub fn texture_slots(&self) -> usize {
        self.textures.len()
    }

    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Texture for `slot`: the actor's skin for the slot if it has one,
    /// otherwise the mesh's own.
    pub fn texture<'a>(
        &'a self,
        slot: usize,
        skins: &'a [Option<Rc<dyn Texture>>],
    ) -> Option<&'a Rc<dyn Texture>> {
        skins
            .get(slot)
            .and_then(Option::as_ref)
            .or_else(|| self.textures.get(slot).and_then(Option::as_ref))
    }

    /// Fill the points of `out` with this mesh posed as `pose` and
    /// transformed by `coords`.
    ///
    /// A non-negative animation frame interpolates between the two
    /// keyframes around it. A negative one tweens from the last pose handed
    /// out for this actor toward the first frame of its sequence, reaching
    /// it as the frame counts up to zero.
    pub fn get_frame(
        &self,
        out: &mut [TransTexture],
        coords: &Coords,
        pose: &ActorPose,
        tween: &mut TweenCache,
    ) {
        debug_assert!(out.len() >= self.frame_verts);
        let was_cached = tween.is_for(self);
        if !was_cached {
            tween.mesh_id = Some(self.id);
            tween.sequence = None;
            tween.frame = 0.0;
            tween.verts.clear();
            tween.verts.resize(self.frame_verts, Vec3::ZERO);
        }

        let draw_scale = if pose.particles { 1.0 } else { pose.draw_scale };
        let coords = coords.object_to(
            pose.location + pose.pre_pivot,
            pose.rotation.matrix() * self.rot_origin.matrix(),
            self.scale * draw_scale,
        );
        let seq = pose.anim_sequence.and_then(|s| self.anim_seqs.get(s));

        if pose.anim_frame >= 0.0 || !was_cached {
            let mut alpha = 0.0;
            let (mut first, mut second) = (0, 0);
            if let Some(seq) = seq {
                let frame = pose.anim_frame.max(0.0) * seq.num_frames as f32;
                let i_frame = frame.floor();
                alpha = frame - i_frame;
                (first, second) = seq.keyframes(i_frame as usize);
            }
            let (a, b) = (self.frame(first), self.frame(second));
            for (i, p) in out.iter_mut().take(self.frame_verts).enumerate() {
                let v = a[i] + (b[i] - a[i]) * alpha;
                tween.verts[i] = v;
                p.point = coords.transform_point(v - self.origin);
            }
        } else {
            let start_frame = seq.map_or(0.0, |s| -1.0 / s.num_frames as f32);
            let target = self.frame(seq.map_or(0, |s| s.start_frame));
            let mut alpha = 1.0 - pose.anim_frame / tween.frame;
            if tween.sequence != pose.anim_sequence || !(0.0..=1.0).contains(&alpha) {
                tween.sequence = pose.anim_sequence;
                tween.frame = start_frame;
                alpha = 0.0;
            }
            for (i, p) in out.iter_mut().take(self.frame_verts).enumerate() {
                let v = &mut tween.verts[i];
                *v += (target[i] - *v) * alpha;
                p.point = coords.transform_point(*v - self.origin);
            }
            tween.frame = pose.anim_frame;
        }
    }

    /// World space bound of the mesh as `pose` is drawn. While animating
    /// this covers the current pair of keyframes, otherwise the whole mesh.
    pub fn render_bounding_box(&self, pose: &ActorPose) -> BoundingBox {
        let seq = pose.anim_sequence.and_then(|s| self.anim_seqs.get(s));
        let bound = match seq {
            Some(seq) if pose.anim_frame >= 0.0 => {
                let i_frame = ((pose.anim_frame + 1.0) * seq.num_frames as f32).floor() as usize;
                let (first, second) = seq.keyframes(i_frame);
                self.bounding_boxes[first] + self.bounding_boxes[second]
            }
            _ => self.bounding_box,
        };

        let draw_scale = if pose.particles { 1.5 } else { pose.draw_scale };
        let scale = self.scale * draw_scale;
        let local = BoundingBox::from_points(&[
            scale * (bound.min - self.origin),
            scale * (bound.max - self.origin),
        ])
        .expand_by(1.0);
        let to_world = Coords::UNIT.object_to(
            pose.location + pose.pre_pivot,
            pose.rotation.matrix() * self.rot_origin.matrix(),
            Vec3::ONE,
        );
        local.transform_by(&to_world)
    }
}

fn build_connects(frame_verts: usize, tris: &[MeshTri]) -> (Vec<VertConnect>, Vec<u32>) {
    let mut connects = vec![VertConnect::default(); frame_verts];
    for tri in tris {
        for v in tri.vertex {
            connects[v as usize].num_tris += 1;
        }
    }
    let mut offset = 0;
    for c in connects.iter_mut() {
        c.tri_offset = offset;
        offset += c.num_tris;
    }

    let mut links = vec![0u32; offset as usize];
    let mut filled = vec![0u32; frame_verts];
    for (t, tri) in tris.iter().enumerate() {
        for v in tri.vertex {
            let v = v as usize;
            links[(connects[v].tri_offset + filled[v]) as usize] = t as u32;
            filled[v] += 1;
        }
    }
    (connects, links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use math::Angle;
    use render_trait::StaticTexture;

    fn quad_frames() -> Vec<Vec<Vec3>> {
        let base = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let raised = base.iter().map(|v| *v + Vec3::Z * 2.0).collect();
        vec![base, raised]
    }

    fn quad_tris() -> Vec<MeshTri> {
        let uv = [MeshUV::default(); 3];
        vec![MeshTri::new([0, 1, 2], uv, 0), MeshTri::new([0, 2, 3], uv, 0)]
    }

    fn quad() -> Mesh {
        Mesh::new(quad_frames(), quad_tris())
            .unwrap()
            .with_anim_seq(AnimSeq::new("rise", 0, 2))
            .unwrap()
    }

    fn pose(frame: f32) -> ActorPose {
        ActorPose {
            anim_sequence: Some(0),
            anim_frame: frame,
            ..ActorPose::default()
        }
    }

    fn points(mesh: &Mesh, pose: &ActorPose, tween: &mut TweenCache) -> Vec<Vec3> {
        let mut out = vec![TransTexture::default(); mesh.frame_verts()];
        mesh.get_frame(&mut out, &Coords::UNIT, pose, tween);
        out.iter().map(|p| p.point).collect()
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Mesh::new(vec![], quad_tris()).unwrap_err(), MeshError::NoFrames);
        let mut frames = quad_frames();
        frames[1].pop();
        assert!(matches!(
            Mesh::new(frames, quad_tris()),
            Err(MeshError::FrameSizeMismatch { frame: 1, .. })
        ));
        let mut tris = quad_tris();
        tris[1].vertex[2] = 4;
        assert_eq!(
            Mesh::new(quad_frames(), tris).unwrap_err(),
            MeshError::VertexOutOfRange { tri: 1, vertex: 4 }
        );
        let mesh = Mesh::new(quad_frames(), quad_tris()).unwrap();
        assert!(matches!(
            mesh.with_anim_seq(AnimSeq::new("long", 1, 2)),
            Err(MeshError::SequenceOutOfRange(_))
        ));
    }

    #[test]
    fn texture_slots_validated() {
        let mesh = Mesh::new(quad_frames(), quad_tris()).unwrap();
        assert!(matches!(
            mesh.with_textures(Vec::new()),
            Err(MeshError::TextureSlotOutOfRange { tri: 0, slot: 0 })
        ));
        let mesh = Mesh::new(quad_frames(), quad_tris()).unwrap();
        let many: Vec<Option<Rc<dyn Texture>>> = (0..17).map(|_| None).collect();
        assert_eq!(mesh.with_textures(many).unwrap_err(), MeshError::TooManyTextures(17));
    }

    #[test]
    fn connectivity() {
        let mesh = quad();
        assert_eq!(mesh.vert_tris(0), &[0, 1]);
        assert_eq!(mesh.vert_tris(1), &[0]);
        assert_eq!(mesh.vert_tris(2), &[0, 1]);
        assert_eq!(mesh.vert_tris(3), &[1]);
        assert_eq!(mesh.vert_links().len(), 6);
    }

    #[test]
    fn skins_override_mesh_textures() {
        let own: Rc<dyn Texture> = Rc::new(StaticTexture::new(1, 64, 64));
        let skin: Rc<dyn Texture> = Rc::new(StaticTexture::new(2, 32, 32));
        let mesh = quad().with_textures(vec![Some(own)]).unwrap();
        assert_eq!(mesh.texture(0, &[]).map(|t| t.u_size()), Some(64));
        assert_eq!(mesh.texture(0, &[None]).map(|t| t.u_size()), Some(64));
        assert_eq!(mesh.texture(0, &[Some(skin)]).map(|t| t.u_size()), Some(32));
        assert!(mesh.texture(3, &[]).is_none());
    }

    #[test]
    fn interpolates_keyframes() {
        let mesh = quad();
        let mut tween = TweenCache::default();
        let half = points(&mesh, &pose(0.25), &mut tween);
        // 0.25 of a two frame sequence is halfway from frame 0 to frame 1.
        assert!((half[0].z - 1.0).abs() < 1e-5);
        let wrap = points(&mesh, &pose(0.75), &mut tween);
        // Past the last frame it heads back to the first.
        assert!((wrap[0].z - 1.0).abs() < 1e-5);
        assert!(tween.is_for(&mesh));
    }

    #[test]
    fn runaway_anim_frame_stays_in_range() {
        let mesh = quad();
        let mut tween = TweenCache::default();
        for frame in [f32::INFINITY, f32::MAX, 1.0e30] {
            let p = pose(frame);
            let pts = points(&mesh, &p, &mut tween);
            assert_eq!(pts.len(), 4);
            // Saturates to the last index, bounds still cover a real frame.
            let bound = mesh.render_bounding_box(&p);
            assert!(bound.min.z <= 0.0 && bound.max.z >= 2.0);
        }
    }

    #[test]
    fn tweens_into_sequence() {
        let mesh = quad();
        let mut tween = TweenCache::default();
        // Settle on frame 1 (z = 2).
        points(&mesh, &pose(0.5), &mut tween);

        // First tween frame resets and holds the cached pose.
        let start = points(&mesh, &pose(-0.5), &mut tween);
        assert!((start[0].z - 2.0).abs() < 1e-5);
        // Counting up toward zero moves toward frame 0 (z = 0).
        let mid = points(&mesh, &pose(-0.25), &mut tween);
        assert!(mid[0].z < 2.0 && mid[0].z > 0.0);
        let end = points(&mesh, &pose(0.0), &mut tween);
        assert!(end[0].z.abs() < 1e-5);
    }

    #[test]
    fn pose_transform_applies() {
        let mesh = quad().with_origin(Vec3::new(0.5, 0.5, 0.0));
        let mut tween = TweenCache::default();
        let p = ActorPose {
            location: Vec3::new(10.0, 0.0, 0.0),
            rotation: Rotator::new(Angle::default(), Angle::new(std::f32::consts::FRAC_PI_2), Angle::default()),
            draw_scale: 2.0,
            ..pose(0.0)
        };
        let pts = points(&mesh, &p, &mut tween);
        // Vertex 1 sits at (0.5, -0.5) from the origin, doubled then yawed
        // a quarter turn.
        assert!((pts[1] - Vec3::new(11.0, 1.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn bounding_box_covers_pose() {
        let mesh = quad();
        let p = ActorPose {
            location: Vec3::new(100.0, 0.0, 0.0),
            ..pose(-1.0)
        };
        let b = mesh.render_bounding_box(&p);
        assert!(b.contains(Vec3::new(100.5, 0.5, 1.0)));
        assert!((b.min.x - 99.0).abs() < 1e-4);
        assert!((b.max.z - 3.0).abs() < 1e-4);
        let particles = ActorPose {
            particles: true,
            ..p
        };
        let b = mesh.render_bounding_box(&particles);
        assert!((b.max.z - 4.0).abs() < 1e-4);
    }
}
