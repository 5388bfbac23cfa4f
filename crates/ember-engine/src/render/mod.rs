//! wgpu rendering backend.
//!
//! `WgpuGraphics` implements the `gfx::GraphicsApi` surface on wgpu and acts as
//! the host backend: it plays a `scene::DrawList` back into a render pass,
//! routing callback payloads to their owner as it goes.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Vertex shaders convert to clip space with the host projection.

mod common;
mod ctx;
mod graphics;

pub use ctx::{RenderCtx, RenderTarget};
pub use graphics::WgpuGraphics;
