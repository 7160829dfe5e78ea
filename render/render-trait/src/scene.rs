use glam::Vec3;
use math::{Coords, Plane, Rotator};
use std::error::Error;
use std::fmt;

/// Deepest portal/mirror nesting a scene tree may reach. The master node is
/// depth 0.
pub const MAX_SCENE_RECURSION: usize = 4;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum RenderMode {
    #[default]
    Textured,
    Wireframe,
    Ortho,
}

/// The output surface a scene is rendered into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Offset of the active area inside the output surface
    pub x_offset: u32,
    pub y_offset: u32,
    /// Horizontal field of view in degrees
    pub fov: f32,
    pub ortho_zoom: f32,
    pub mode: RenderMode,
    /// Seconds, fed to animated textures
    pub current_time: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, fov: f32) -> Self {
        Self {
            width,
            height,
            x_offset: 0,
            y_offset: 0,
            fov,
            ortho_zoom: 10000.0,
            mode: RenderMode::Textured,
            current_time: 0.0,
        }
    }

    #[inline]
    pub fn is_ortho(&self) -> bool {
        self.mode == RenderMode::Ortho
    }

    #[inline]
    pub fn is_wire(&self) -> bool {
        self.mode != RenderMode::Textured
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneError {
    ZeroSizedViewport,
    RecursionLimit(usize),
    UnknownNode(usize),
}

impl Error for SceneError {}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::ZeroSizedViewport => write!(f, "viewport has zero width or height"),
            SceneError::RecursionLimit(d) => {
                write!(f, "scene recursion depth {d} exceeds {MAX_SCENE_RECURSION}")
            }
            SceneError::UnknownNode(id) => write!(f, "no scene node with id {id}"),
        }
    }
}

/// Per render pass camera, frustum and projection state.
///
/// Every downstream stage reads the precomputed constants here instead of
/// rebuilding a projection matrix: `proj.z` is the focal length in pixels,
/// the `prj_*` slopes bound the frustum sides in camera space.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub viewport: Viewport,
    /// Nesting depth, 0 for the master node
    pub recursion: usize,
    /// 1.0, or -1.0 when seen through an odd number of mirrors
    pub mirror: f32,
    /// Extra clipping plane in camera space, inactive when `w == 0`
    pub near_clip: Plane,
    /// World to camera
    pub coords: Coords,
    /// Camera to world
    pub uncoords: Coords,

    pub x: i32,
    pub y: i32,
    pub xb: i32,
    pub yb: i32,
    pub fx: f32,
    pub fy: f32,
    /// `(fx + 1.0001) / 2`
    pub fx15: f32,
    pub fy15: f32,
    pub fx1: f32,
    pub fy1: f32,
    pub fx2: f32,
    pub fy2: f32,
    pub zoom: f32,
    pub rzoom: f32,
    pub proj: Vec3,
    pub rproj: Vec3,
    pub prj_xm: f32,
    pub prj_ym: f32,
    pub prj_xp: f32,
    pub prj_yp: f32,
    /// Unit vectors along the four frustum edges, world space
    pub view_sides: [Vec3; 4],
    /// Frustum side planes through the eye, normals pointing inward
    pub view_planes: [Plane; 4],
}

impl SceneNode {
    pub fn new_master(
        viewport: Viewport,
        location: Vec3,
        rotation: Rotator,
    ) -> Result<Self, SceneError> {
        if viewport.width == 0 || viewport.height == 0 {
            return Err(SceneError::ZeroSizedViewport);
        }
        let coords = Coords::view(location, rotation);
        let mut node = Self::blank(viewport, coords);
        node.compute_render_size();
        Ok(node)
    }

    /// A node for a view through a portal or mirror of `parent`.
    pub fn new_child(
        parent: &SceneNode,
        mirror: f32,
        near_clip: Plane,
        coords: Coords,
    ) -> Result<Self, SceneError> {
        let recursion = parent.recursion + 1;
        if recursion > MAX_SCENE_RECURSION {
            return Err(SceneError::RecursionLimit(recursion));
        }
        let mut node = Self::blank(parent.viewport, coords);
        node.recursion = recursion;
        node.mirror = parent.mirror * mirror;
        node.near_clip = near_clip;
        node.compute_render_size();
        Ok(node)
    }

    fn blank(viewport: Viewport, coords: Coords) -> Self {
        Self {
            viewport,
            recursion: 0,
            mirror: 1.0,
            near_clip: Plane::NONE,
            coords,
            uncoords: coords.inverse(),
            x: viewport.width as i32,
            y: viewport.height as i32,
            xb: viewport.x_offset as i32,
            yb: viewport.y_offset as i32,
            fx: 0.0,
            fy: 0.0,
            fx15: 0.0,
            fy15: 0.0,
            fx1: 0.0,
            fy1: 0.0,
            fx2: 0.0,
            fy2: 0.0,
            zoom: 0.0,
            rzoom: 0.0,
            proj: Vec3::ZERO,
            rproj: Vec3::ZERO,
            prj_xm: 0.0,
            prj_ym: 0.0,
            prj_xp: 0.0,
            prj_yp: 0.0,
            view_sides: [Vec3::ZERO; 4],
            view_planes: [Plane::NONE; 4],
        }
    }

    /// Precompute the projection constants from the frame size and FOV.
    pub fn compute_render_size(&mut self) {
        self.fx = self.x as f32;
        self.fy = self.y as f32;
        self.fx2 = self.fx * 0.5;
        self.fy2 = self.fy * 0.5;
        self.fx15 = (self.fx + 1.0001) * 0.5;
        self.fy15 = (self.fy + 1.0001) * 0.5;
        self.fx1 = self.fx - 1.0;
        self.fy1 = self.fy - 1.0;

        let half_fov = (self.viewport.fov * 0.5).to_radians();
        self.proj = Vec3::new(0.5 - self.fx2, 0.5 - self.fy2, self.fx2 / half_fov.tan());
        self.rproj = Vec3::new(1.0 / self.proj.x, 1.0 / self.proj.y, 1.0 / self.proj.z);
        self.zoom = self.viewport.ortho_zoom / (self.fx * 15.0);
        self.rzoom = 1.0 / self.zoom;

        self.prj_xm = (0.0 - self.fx2) * (-self.rproj.z);
        self.prj_xp = (self.fx - self.fx2) * self.rproj.z;
        self.prj_ym = (0.0 - self.fy2) * (-self.rproj.z);
        self.prj_yp = (self.fy - self.fy2) * self.rproj.z;

        self.compute_view_sides();
    }

    fn compute_view_sides(&mut self) {
        const SIGNS: [f32; 2] = [-1.0, 1.0];
        for (i, sx) in SIGNS.iter().enumerate() {
            for (j, sy) in SIGNS.iter().enumerate() {
                let side = Vec3::new(sx * self.fx2, sy * self.fy2, self.proj.z).normalize();
                self.view_sides[i * 2 + j] = self.uncoords.transform_vector(side);
            }
        }

        let eye = self.coords.origin;
        let forward = self.uncoords.transform_vector(Vec3::Z);
        // Left, right, top, bottom edges as pairs of side vectors.
        let pairs = [(0, 1), (2, 3), (0, 2), (1, 3)];
        for (plane, (a, b)) in self.view_planes.iter_mut().zip(pairs) {
            let mut normal = self.view_sides[a].cross(self.view_sides[b]).normalize_or_zero();
            if normal.dot(forward) < 0.0 {
                normal = -normal;
            }
            *plane = Plane::from_point_normal(eye, normal);
        }
    }

    #[inline]
    pub fn is_ortho(&self) -> bool {
        self.viewport.is_ortho()
    }

    /// Wireframe and ortho views draw mesh edges rather than polygons.
    #[inline]
    pub fn is_wire(&self) -> bool {
        self.viewport.is_wire()
    }

    /// World space direction of the ray through screen pixel `(x, y)`.
    pub fn deproject(&self, screen_x: f32, screen_y: f32) -> Vec3 {
        self.coords.z_axis
            + self.coords.x_axis * (screen_x - self.fx2) * self.rproj.z
            + self.coords.y_axis * (screen_y - self.fy2) * self.rproj.z
    }

    /// True when the world space point lies inside all four frustum side
    /// planes.
    pub fn point_in_frustum(&self, point: Vec3) -> bool {
        self.view_planes.iter().all(|p| p.plane_dot(point) >= 0.0)
    }
}

/// Handle into a [`SceneTree`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SceneNodeId(usize);

impl SceneNodeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct SceneLinks {
    parent: Option<SceneNodeId>,
    sibling: Option<SceneNodeId>,
    child: Option<SceneNodeId>,
}

/// The nodes created for one frame: the master view plus every portal and
/// mirror view recursed into from it. Cleared at the end of the frame.
#[derive(Debug, Default, Clone)]
pub struct SceneTree {
    nodes: Vec<SceneNode>,
    links: Vec<SceneLinks>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn create_master(
        &mut self,
        viewport: Viewport,
        location: Vec3,
        rotation: Rotator,
    ) -> Result<SceneNodeId, SceneError> {
        let node = SceneNode::new_master(viewport, location, rotation)?;
        Ok(self.push(node, None))
    }

    pub fn create_child(
        &mut self,
        parent: SceneNodeId,
        mirror: f32,
        near_clip: Plane,
        coords: Coords,
    ) -> Result<SceneNodeId, SceneError> {
        let parent_node = self
            .nodes
            .get(parent.0)
            .ok_or(SceneError::UnknownNode(parent.0))?;
        let node = SceneNode::new_child(parent_node, mirror, near_clip, coords)?;
        let id = self.push(node, Some(parent));
        // Newest child goes to the head of the parent's child list.
        self.links[id.0].sibling = self.links[parent.0].child;
        self.links[parent.0].child = Some(id);
        Ok(id)
    }

    fn push(&mut self, node: SceneNode, parent: Option<SceneNodeId>) -> SceneNodeId {
        self.nodes.push(node);
        self.links.push(SceneLinks {
            parent,
            sibling: None,
            child: None,
        });
        SceneNodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn parent(&self, id: SceneNodeId) -> Option<SceneNodeId> {
        self.links.get(id.0).and_then(|l| l.parent)
    }

    /// Children of `id`, newest first.
    pub fn children(&self, id: SceneNodeId) -> impl Iterator<Item = SceneNodeId> + '_ {
        let first = self.links.get(id.0).and_then(|l| l.child);
        std::iter::successors(first, move |c| self.links[c.0].sibling)
    }
}
