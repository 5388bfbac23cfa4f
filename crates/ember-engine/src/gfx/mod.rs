//! Graphics API surface consumed by the heatmap renderer.
//!
//! The renderer never talks to wgpu directly. It drives a [`GraphicsApi`]:
//! - texture create/upload/delete
//! - program compile/use/delete
//! - texture-unit binding and uniform writes
//! - a query for the projection the host's active pipeline uses
//!
//! `render::WgpuGraphics` is the GPU implementation; [`RecordingApi`] records
//! calls and texel contents without a device.

mod api;
mod recording;

pub use api::{
    FilterMode, GraphicsApi, GridTexels, HeatmapUniforms, ProgramHandle, ShaderSource,
    TextureHandle, TextureUnit,
};
pub use recording::{GfxCall, RecordingApi};
