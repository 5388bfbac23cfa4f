use std::collections::{HashMap, HashSet};
use core::num::NonZeroU32;

use crate::coords::{Mat4, Viewport};
use crate::paint::Rgba8;

use super::{
    FilterMode, GraphicsApi, GridTexels, HeatmapUniforms, ProgramHandle, ShaderSource,
    TextureHandle, TextureUnit,
};

/// One recorded [`GraphicsApi`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum GfxCall {
    CreateColormapTexture { texture: TextureHandle, len: usize, filter: FilterMode },
    CreateGridTexture { texture: TextureHandle },
    UploadGrid { texture: TextureHandle, rows: u32, cols: u32 },
    DeleteTexture { texture: TextureHandle },
    HostProjection,
    CompileProgram { program: ProgramHandle, label: &'static str },
    DeleteProgram { program: ProgramHandle },
    UseProgram { program: ProgramHandle },
    BindTexture { unit: TextureUnit, texture: Option<TextureHandle> },
    SetHeatmapUniforms(HeatmapUniforms),
}

#[derive(Debug, Clone, PartialEq)]
enum TextureData {
    Colormap { colors: Vec<Rgba8>, filter: FilterMode },
    Grid { rows: u32, cols: u32, texels: Vec<f32> },
}

/// Device-free [`GraphicsApi`] that records every call.
///
/// Keeps live texture contents so uploads can be inspected, and reports the
/// projection of a fixed host viewport. The texture size limit defaults to
/// [`RecordingApi::DEFAULT_MAX_TEXTURE_DIMENSION`].
#[derive(Debug)]
pub struct RecordingApi {
    calls: Vec<GfxCall>,
    textures: HashMap<TextureHandle, TextureData>,
    programs: HashSet<ProgramHandle>,
    next_name: u32,

    host_projection: Mat4,
    max_texture_dimension: u32,
    current_program: Option<ProgramHandle>,
    bound: [Option<TextureHandle>; 2],
    uniforms: Option<HeatmapUniforms>,
}

impl Default for RecordingApi {
    fn default() -> Self {
        Self::new(Viewport::new(1.0, 1.0))
    }
}

impl RecordingApi {
    /// wgpu's default `max_texture_dimension_2d`.
    pub const DEFAULT_MAX_TEXTURE_DIMENSION: u32 = 8192;

    pub fn new(host_viewport: Viewport) -> Self {
        Self {
            calls: Vec::new(),
            textures: HashMap::new(),
            programs: HashSet::new(),
            next_name: 0,
            host_projection: host_viewport.ortho_projection(),
            max_texture_dimension: Self::DEFAULT_MAX_TEXTURE_DIMENSION,
            current_program: None,
            bound: [None; 2],
            uniforms: None,
        }
    }

    /// Reports `max` as the device texture size limit.
    pub fn with_max_texture_dimension(mut self, max: u32) -> Self {
        self.max_texture_dimension = max;
        self
    }

    #[inline]
    pub fn calls(&self) -> &[GfxCall] {
        &self.calls
    }

    /// Drains the call log, leaving resource state intact.
    pub fn take_calls(&mut self) -> Vec<GfxCall> {
        std::mem::take(&mut self.calls)
    }

    /// Number of live (created and not deleted) textures.
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn is_live(&self, texture: TextureHandle) -> bool {
        self.textures.contains_key(&texture)
    }

    /// Grid contents as `(rows, cols, texels)`, `None` until the first upload.
    pub fn grid(&self, texture: TextureHandle) -> Option<(u32, u32, &[f32])> {
        match self.textures.get(&texture)? {
            TextureData::Grid { rows, cols, texels } if !texels.is_empty() => {
                Some((*rows, *cols, texels.as_slice()))
            }
            _ => None,
        }
    }

    pub fn colormap(&self, texture: TextureHandle) -> Option<(&[Rgba8], FilterMode)> {
        match self.textures.get(&texture)? {
            TextureData::Colormap { colors, filter } => Some((colors.as_slice(), *filter)),
            TextureData::Grid { .. } => None,
        }
    }

    #[inline]
    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    #[inline]
    pub fn bound_texture(&self, unit: TextureUnit) -> Option<TextureHandle> {
        self.bound[unit.index()]
    }

    #[inline]
    pub fn uniforms(&self) -> Option<&HeatmapUniforms> {
        self.uniforms.as_ref()
    }

    /// Mirrors the host restoring its default state after a reset sentinel.
    pub fn reset_render_state(&mut self) {
        self.current_program = None;
        self.bound = [None; 2];
        self.uniforms = None;
    }

    fn next_name(&mut self) -> NonZeroU32 {
        self.next_name += 1;
        NonZeroU32::new(self.next_name).unwrap_or(NonZeroU32::MIN)
    }
}

impl GraphicsApi for RecordingApi {
    fn create_colormap_texture(&mut self, colors: &[Rgba8], filter: FilterMode) -> TextureHandle {
        let texture = TextureHandle(self.next_name());
        self.textures.insert(
            texture,
            TextureData::Colormap { colors: colors.to_vec(), filter },
        );
        self.calls.push(GfxCall::CreateColormapTexture { texture, len: colors.len(), filter });
        texture
    }

    fn create_grid_texture(&mut self) -> TextureHandle {
        let texture = TextureHandle(self.next_name());
        self.textures.insert(
            texture,
            TextureData::Grid { rows: 0, cols: 0, texels: Vec::new() },
        );
        self.calls.push(GfxCall::CreateGridTexture { texture });
        texture
    }

    fn upload_grid(&mut self, texture: TextureHandle, rows: u32, cols: u32, texels: GridTexels<'_>) {
        self.calls.push(GfxCall::UploadGrid { texture, rows, cols });
        match self.textures.get_mut(&texture) {
            Some(TextureData::Grid { rows: r, cols: c, texels: t }) => {
                *r = rows;
                *c = cols;
                *t = texels.to_f32();
            }
            _ => log::warn!("upload to unknown grid texture {texture:?} ignored"),
        }
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.calls.push(GfxCall::DeleteTexture { texture });
        self.textures.remove(&texture);
        for slot in &mut self.bound {
            if *slot == Some(texture) {
                *slot = None;
            }
        }
    }

    fn host_projection(&mut self) -> Mat4 {
        self.calls.push(GfxCall::HostProjection);
        self.host_projection
    }

    fn max_texture_dimension(&self) -> u32 {
        self.max_texture_dimension
    }

    fn compile_program(&mut self, source: &ShaderSource) -> ProgramHandle {
        let program = ProgramHandle(self.next_name());
        self.programs.insert(program);
        self.calls.push(GfxCall::CompileProgram { program, label: source.label });
        program
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.calls.push(GfxCall::DeleteProgram { program });
        self.programs.remove(&program);
        if self.current_program == Some(program) {
            self.current_program = None;
        }
    }

    fn use_program(&mut self, program: ProgramHandle) {
        self.calls.push(GfxCall::UseProgram { program });
        self.current_program = Some(program);
    }

    fn bind_texture(&mut self, unit: TextureUnit, texture: Option<TextureHandle>) {
        self.calls.push(GfxCall::BindTexture { unit, texture });
        self.bound[unit.index()] = texture;
    }

    fn set_heatmap_uniforms(&mut self, uniforms: &HeatmapUniforms) {
        self.calls.push(GfxCall::SetHeatmapUniforms(*uniforms));
        self.uniforms = Some(*uniforms);
    }
}
