use crate::coords::Vec2;
use crate::paint::Rgba8;

use super::{DrawCmd, DrawVertex};

/// Recorded host draw stream for a frame.
///
/// Geometry is appended through [`prim_reserve`](Self::prim_reserve) followed by
/// primitive writes. Consecutive geometry merges into a single
/// [`DrawCmd::Elements`]; any callback closes the current run so later geometry
/// starts a new one.
///
/// ```
/// # use ember_engine::coords::Vec2;
/// # use ember_engine::paint::Rgba8;
/// # use ember_engine::scene::DrawList;
/// let mut list: DrawList<u32> = DrawList::new();
/// list.push_callback(7);
/// list.prim_reserve(6, 4);
/// list.prim_rect_uv(Vec2::zero(), Vec2::new(10.0, 10.0), Vec2::zero(), Vec2::one(), Rgba8::WHITE);
/// list.push_reset_render_state();
/// assert_eq!(list.commands().len(), 3);
/// ```
#[derive(Debug)]
pub struct DrawList<C> {
    commands: Vec<DrawCmd<C>>,
    vertices: Vec<DrawVertex>,
    indices: Vec<u32>,

    /// Vertex index where the next primitive write lands.
    vtx_write: usize,
    /// Index-buffer position where the next primitive write lands.
    idx_write: usize,
}

impl<C> Default for DrawList<C> {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            vertices: Vec::new(),
            indices: Vec::new(),
            vtx_write: 0,
            idx_write: 0,
        }
    }
}

impl<C> DrawList<C> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears recorded commands and geometry. Keeps allocated capacity for reuse.
    #[inline]
    pub fn clear(&mut self) {
        self.commands.clear();
        self.vertices.clear();
        self.indices.clear();
        self.vtx_write = 0;
        self.idx_write = 0;
    }

    /// Returns commands in playback order.
    #[inline]
    pub fn commands(&self) -> &[DrawCmd<C>] {
        &self.commands
    }

    #[inline]
    pub fn vertices(&self) -> &[DrawVertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of non-geometry commands (callbacks and render-state resets).
    pub fn callback_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_callback()).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Enqueues a deferred callback payload.
    #[inline]
    pub fn push_callback(&mut self, callback: C) {
        self.commands.push(DrawCmd::Callback(callback));
    }

    /// Enqueues the host's "restore default render state" sentinel.
    #[inline]
    pub fn push_reset_render_state(&mut self) {
        self.commands.push(DrawCmd::ResetRenderState);
    }

    /// Reserves room for `idx_count` indices and `vtx_count` vertices and extends
    /// the current elements run (or opens a new one) to cover them.
    ///
    /// Reserved slots must be filled by primitive writes before playback.
    pub fn prim_reserve(&mut self, idx_count: usize, vtx_count: usize) {
        let first_index = self.indices.len() as u32;
        match self.commands.last_mut() {
            Some(DrawCmd::Elements { first_index: start, index_count })
                if *start + *index_count == first_index =>
            {
                *index_count += idx_count as u32;
            }
            _ => self.commands.push(DrawCmd::Elements {
                first_index,
                index_count: idx_count as u32,
            }),
        }

        self.vtx_write = self.vertices.len();
        self.idx_write = self.indices.len();
        self.vertices.resize(self.vertices.len() + vtx_count, DrawVertex::default());
        self.indices.resize(self.indices.len() + idx_count, 0);
    }

    /// Writes an axis-aligned textured rectangle into previously reserved slots
    /// (4 vertices, 6 indices).
    ///
    /// # Panics
    /// Panics if fewer than 4 vertices / 6 indices remain reserved.
    pub fn prim_rect_uv(&mut self, a: Vec2, c: Vec2, uv_a: Vec2, uv_c: Vec2, color: Rgba8) {
        let b = Vec2::new(c.x, a.y);
        let d = Vec2::new(a.x, c.y);
        let uv_b = Vec2::new(uv_c.x, uv_a.y);
        let uv_d = Vec2::new(uv_a.x, uv_c.y);

        let v = self.vtx_write;
        let base = v as u32;
        self.vertices[v] = DrawVertex::new(a, uv_a, color);
        self.vertices[v + 1] = DrawVertex::new(b, uv_b, color);
        self.vertices[v + 2] = DrawVertex::new(c, uv_c, color);
        self.vertices[v + 3] = DrawVertex::new(d, uv_d, color);

        let i = self.idx_write;
        self.indices[i..i + 6].copy_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);

        self.vtx_write += 4;
        self.idx_write += 6;
    }

    /// Reserves and writes a solid rectangle in one step.
    pub fn add_rect_filled(&mut self, min: Vec2, max: Vec2, color: Rgba8) {
        self.prim_reserve(6, 4);
        self.prim_rect_uv(min, max, Vec2::zero(), Vec2::one(), color);
    }
}
