//! Shared GPU types and utilities of the wgpu backend.

use bytemuck::{Pod, Zeroable};

use crate::coords::Mat4;
use crate::gfx::HeatmapUniforms;
use crate::scene::DrawVertex;

// ── blend ─────────────────────────────────────────────────────────────────

pub(super) fn premul_alpha_blend() -> wgpu::BlendState {
    wgpu::BlendState {
        color: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
        alpha: wgpu::BlendComponent {
            src_factor: wgpu::BlendFactor::One,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        },
    }
}

// ── uniforms ──────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct HostUniform {
    pub proj_mtx: Mat4,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct HeatmapUniformBlock {
    pub proj_mtx: Mat4,
    pub min_val: f32,
    pub max_val: f32,
    pub _pad: [f32; 2], // 16-byte alignment
}

impl From<&HeatmapUniforms> for HeatmapUniformBlock {
    fn from(u: &HeatmapUniforms) -> Self {
        Self {
            proj_mtx: u.projection,
            min_val: u.min_value,
            max_val: u.max_value,
            _pad: [0.0; 2],
        }
    }
}

/// Minimum binding size of a uniform block type.
///
/// Both uniform types are non-empty by construction.
pub(super) fn ubo_min_binding_size<T>() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<T>() as u64)
}

// ── host vertex ───────────────────────────────────────────────────────────

const DRAW_VERTEX_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x2, // pos
    1 => Float32x2, // uv
    2 => Unorm8x4   // color
];

pub(super) fn draw_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<DrawVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &DRAW_VERTEX_ATTRS,
    }
}

pub(super) fn triangle_list() -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: None,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

pub(super) fn uniform_entry(binding: u32, min: Option<std::num::NonZeroU64>) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: min,
        },
        count: None,
    }
}
