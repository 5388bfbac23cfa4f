use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Rgba8;

/// Host command stream entry.
///
/// Commands are executed strictly in the order they were recorded. Callbacks are
/// not run at record time; the backend hands each `Callback` payload back to its
/// owner during playback.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd<C> {
    /// Draw `index_count` indices starting at `first_index` with the currently
    /// bound render state.
    Elements { first_index: u32, index_count: u32 },
    /// Deferred user action.
    Callback(C),
    /// Restore the host's default render state.
    ResetRenderState,
}

impl<C> DrawCmd<C> {
    /// `true` for every command that is not geometry.
    #[inline]
    pub fn is_callback(&self) -> bool {
        !matches!(self, DrawCmd::Elements { .. })
    }
}

/// Host vertex: position (logical px), texture coordinate and packed color.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct DrawVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    pub color: u32,
}

impl DrawVertex {
    #[inline]
    pub fn new(pos: Vec2, uv: Vec2, color: Rgba8) -> Self {
        Self {
            pos: pos.to_array(),
            uv: uv.to_array(),
            color: color.0,
        }
    }
}
