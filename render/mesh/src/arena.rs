use render_trait::TransTexture;
use std::ops::{Deref, DerefMut, Index, IndexMut};

/// Verts a default arena can hold: a few thousand mesh vertices plus the
/// subdivision midpoints and clip points alive at any one time.
pub const DEFAULT_ARENA_VERTS: usize = 1 << 16;

/// Handle to a vertex in a [`FrameArena`]. Only valid until the mark it was
/// allocated under is released.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertId(u32);

impl VertId {
    pub const ZERO: VertId = VertId(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn offset(self, by: usize) -> VertId {
        VertId(self.0 + by as u32)
    }
}

/// Stack discipline scratch storage for transformed vertices.
///
/// The backing storage is reserved once and never grows, so nothing on the
/// per-frame path touches the allocator. Running out of room is a sizing bug
/// and panics.
#[derive(Debug)]
pub struct FrameArena {
    verts: Vec<TransTexture>,
    capacity: usize,
    high_water: usize,
}

impl Default for FrameArena {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_ARENA_VERTS)
    }
}

impl FrameArena {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            verts: Vec::with_capacity(capacity),
            capacity,
            high_water: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.verts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most vertices ever live at once.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    #[inline]
    fn reserve_slots(&mut self, n: usize) {
        let wanted = self.verts.len() + n;
        assert!(
            wanted <= self.capacity,
            "frame arena exhausted: {wanted} verts wanted, {} available",
            self.capacity
        );
        self.high_water = self.high_water.max(wanted);
    }

    #[inline]
    pub fn alloc(&mut self, vert: TransTexture) -> VertId {
        self.reserve_slots(1);
        let id = VertId(self.verts.len() as u32);
        self.verts.push(vert);
        id
    }

    /// Allocate `n` default vertices, returning the first. They are
    /// contiguous, so the rest are `first.offset(1..n)`.
    pub fn alloc_n(&mut self, n: usize) -> VertId {
        self.reserve_slots(n);
        let id = VertId(self.verts.len() as u32);
        self.verts.resize(self.verts.len() + n, TransTexture::default());
        id
    }

    pub fn slice_mut(&mut self, first: VertId, n: usize) -> &mut [TransTexture] {
        &mut self.verts[first.index()..first.index() + n]
    }

    pub fn slice(&self, first: VertId, n: usize) -> &[TransTexture] {
        &self.verts[first.index()..first.index() + n]
    }

    /// Checkpoint the arena. Everything allocated through the returned guard
    /// is released when it drops, on every exit path.
    #[inline]
    pub fn mark(&mut self) -> ArenaMark<'_> {
        let top = self.verts.len();
        ArenaMark { arena: self, top }
    }
}

impl Index<VertId> for FrameArena {
    type Output = TransTexture;
    #[inline]
    fn index(&self, id: VertId) -> &TransTexture {
        &self.verts[id.index()]
    }
}

impl IndexMut<VertId> for FrameArena {
    #[inline]
    fn index_mut(&mut self, id: VertId) -> &mut TransTexture {
        &mut self.verts[id.index()]
    }
}

/// Scope guard returned by [`FrameArena::mark`].
pub struct ArenaMark<'a> {
    arena: &'a mut FrameArena,
    top: usize,
}

impl ArenaMark<'_> {
    /// Release everything allocated since the mark without ending the scope.
    pub fn pop(&mut self) {
        self.arena.verts.truncate(self.top);
    }
}

impl Deref for ArenaMark<'_> {
    type Target = FrameArena;
    #[inline]
    fn deref(&self) -> &FrameArena {
        self.arena
    }
}

impl DerefMut for ArenaMark<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut FrameArena {
        self.arena
    }
}

impl Drop for ArenaMark<'_> {
    fn drop(&mut self) {
        self.arena.verts.truncate(self.top);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn marks_nest_and_release() {
        let mut arena = FrameArena::with_capacity(16);
        let a = arena.alloc(TransTexture::new(Vec3::X));
        {
            let mut outer = arena.mark();
            outer.alloc_n(4);
            {
                let mut inner = outer.mark();
                inner.alloc(TransTexture::new(Vec3::Y));
                assert_eq!(inner.len(), 6);
            }
            assert_eq!(outer.len(), 5);
        }
        assert_eq!(arena.len(), 1);
        assert_eq!(arena[a].point, Vec3::X);
        assert_eq!(arena.high_water(), 6);
    }

    #[test]
    fn pop_keeps_scope_open() {
        let mut arena = FrameArena::with_capacity(8);
        let mut mark = arena.mark();
        mark.alloc_n(3);
        mark.pop();
        assert!(mark.is_empty());
        mark.alloc_n(2);
        drop(mark);
        assert!(arena.is_empty());
    }

    #[test]
    fn contiguous_block() {
        let mut arena = FrameArena::with_capacity(8);
        let first = arena.alloc_n(3);
        arena.slice_mut(first, 3)[2].u = 7.0;
        assert_eq!(arena[first.offset(2)].u, 7.0);
        assert_eq!(arena.slice(first, 3).len(), 3);
    }

    #[test]
    #[should_panic(expected = "frame arena exhausted")]
    fn overflow_is_fatal() {
        let mut arena = FrameArena::with_capacity(2);
        arena.alloc_n(3);
    }
}
