use core::num::NonZeroU32;

use crate::coords::Mat4;
use crate::paint::Rgba8;

/// Opaque texture name issued by a [`GraphicsApi`]. Never zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub NonZeroU32);

/// Opaque shader program name issued by a [`GraphicsApi`]. Never zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub NonZeroU32);

/// Texture sampling filter.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Nearest,
    Linear,
}

/// Texture units the heatmap program samples from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureUnit {
    /// 2-D single-channel data grid (unit 0).
    Grid = 0,
    /// Colormap lookup row (unit 1).
    Colormap = 1,
}

impl TextureUnit {
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Source texels for a grid upload, tagged with their element type.
///
/// Every variant ends up as one 32-bit float channel on the GPU; integer data is
/// converted value-for-value (not normalized).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GridTexels<'a> {
    I8(&'a [i8]),
    U8(&'a [u8]),
    I16(&'a [i16]),
    U16(&'a [u16]),
    I32(&'a [i32]),
    U32(&'a [u32]),
    F32(&'a [f32]),
}

impl GridTexels<'_> {
    pub fn len(&self) -> usize {
        match self {
            GridTexels::I8(v) => v.len(),
            GridTexels::U8(v) => v.len(),
            GridTexels::I16(v) => v.len(),
            GridTexels::U16(v) => v.len(),
            GridTexels::I32(v) => v.len(),
            GridTexels::U32(v) => v.len(),
            GridTexels::F32(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expands the texels to the `f32` layout the grid texture stores.
    pub fn to_f32(&self) -> Vec<f32> {
        match *self {
            GridTexels::I8(v) => v.iter().map(|&x| x as f32).collect(),
            GridTexels::U8(v) => v.iter().map(|&x| x as f32).collect(),
            GridTexels::I16(v) => v.iter().map(|&x| x as f32).collect(),
            GridTexels::U16(v) => v.iter().map(|&x| x as f32).collect(),
            GridTexels::I32(v) => v.iter().map(|&x| x as f32).collect(),
            GridTexels::U32(v) => v.iter().map(|&x| x as f32).collect(),
            GridTexels::F32(v) => v.to_vec(),
        }
    }
}

/// Shader text handed to [`GraphicsApi::compile_program`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    pub label: &'static str,
    /// WGSL module with `vs_main` / `fs_main` entry points.
    pub wgsl: &'static str,
}

/// Per-draw uniform block of the heatmap program.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HeatmapUniforms {
    pub projection: Mat4,
    pub min_value: f32,
    pub max_value: f32,
}

/// Graphics operations the heatmap renderer issues.
///
/// All calls happen on the thread that owns the graphics context. Handles are
/// only meaningful to the implementation that issued them.
pub trait GraphicsApi {
    /// Creates and fills an RGBA8 lookup texture of `colors.len() x 1` texels
    /// (clamp-to-edge). `colors.len()` never exceeds
    /// [`max_texture_dimension`](Self::max_texture_dimension).
    fn create_colormap_texture(&mut self, colors: &[Rgba8], filter: FilterMode) -> TextureHandle;

    /// Allocates a 2-D grid texture name with nearest filtering and no storage yet.
    fn create_grid_texture(&mut self) -> TextureHandle;

    /// (Re)specifies grid storage as `cols x rows` single-channel floats.
    ///
    /// The handle stays valid across size changes. Neither side exceeds
    /// [`max_texture_dimension`](Self::max_texture_dimension).
    fn upload_grid(&mut self, texture: TextureHandle, rows: u32, cols: u32, texels: GridTexels<'_>);

    fn delete_texture(&mut self, texture: TextureHandle);

    /// Largest width or height a colormap or grid texture may have.
    fn max_texture_dimension(&self) -> u32;

    /// Projection matrix of the host's currently bound pipeline.
    fn host_projection(&mut self) -> Mat4;

    /// Compiles and links a program whose vertex input matches the host vertex
    /// layout. Samplers are bound to [`TextureUnit::Grid`] / [`TextureUnit::Colormap`].
    fn compile_program(&mut self, source: &ShaderSource) -> ProgramHandle;

    fn delete_program(&mut self, program: ProgramHandle);

    fn use_program(&mut self, program: ProgramHandle);

    /// Binds `texture` to `unit`; `None` unbinds.
    fn bind_texture(&mut self, unit: TextureUnit, texture: Option<TextureHandle>);

    /// Writes the uniform block of the program currently in use.
    fn set_heatmap_uniforms(&mut self, uniforms: &HeatmapUniforms);
}
