use std::collections::HashMap;

use crate::coords::Vec2;
use crate::gfx::{
    FilterMode, GraphicsApi, HeatmapUniforms, ProgramHandle, ShaderSource, TextureHandle,
    TextureUnit,
};
use crate::paint::Rgba8;
use crate::scene::DrawList;

use super::grid::GridValue;
use super::{ColormapId, HeatmapError};

/// Shared heatmap program, compiled on first playback.
pub const HEATMAP_SHADER: ShaderSource = ShaderSource {
    label: "ember heatmap shader",
    wgsl: include_str!("heatmap.wgsl"),
};

/// Caller-assigned key of one logical heatmap, stable across frames.
///
/// Hosts with signed ids map them bit-for-bit (`id as u32`); only equality
/// matters, so negative ids stay distinct.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlotId(pub u32);

/// Deferred actions the renderer records into a host draw list.
///
/// Payloads carry only the plot id. Everything else is looked up again when the
/// host plays the list back, so state changes between record and playback are
/// observed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HeatmapCallback {
    /// Compile the shared program if it does not exist yet.
    CompileShader,
    /// Use the program, bind the plot's textures and write its uniforms.
    Bind { plot_id: PlotId },
    /// Unbind the grid texture unit.
    UnbindTexture,
}

/// Per-draw parameters of [`HeatmapRenderer::render_heatmap`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HeatmapDraw {
    /// Top-left corner of the quad, logical px.
    pub bounds_min: Vec2,
    /// Bottom-right corner of the quad, logical px.
    pub bounds_max: Vec2,
    /// Grid value mapped to the first colormap entry.
    pub scale_min: f32,
    /// Grid value mapped to the last colormap entry.
    pub scale_max: f32,
    pub colormap: ColormapId,
}

/// Grid texture owned by a heatmap entry.
///
/// Not `Clone` and not released on drop: the texture lives until the cache is
/// cleared, which hands it back to the graphics API explicitly.
#[derive(Debug, PartialEq, Eq)]
struct GridTexture(TextureHandle);

impl GridTexture {
    #[inline]
    fn handle(&self) -> TextureHandle {
        self.0
    }

    fn release(self, api: &mut impl GraphicsApi) {
        api.delete_texture(self.0);
    }
}

/// State kept per plot id.
#[derive(Debug, PartialEq)]
pub struct HeatmapEntry {
    grid: GridTexture,
    colormap_texture: TextureHandle,
    min_value: f32,
    max_value: f32,
}

impl HeatmapEntry {
    #[inline]
    pub fn grid_texture(&self) -> TextureHandle {
        self.grid.handle()
    }

    #[inline]
    pub fn colormap_texture(&self) -> TextureHandle {
        self.colormap_texture
    }

    #[inline]
    pub fn min_value(&self) -> f32 {
        self.min_value
    }

    #[inline]
    pub fn max_value(&self) -> f32 {
        self.max_value
    }
}

/// Heatmap renderer state for one graphics context.
///
/// Owns:
/// - colormap lookup textures (session scoped)
/// - the shared heatmap program (session scoped)
/// - one grid texture per plot id (cache scoped, see [`clear_cache`](Self::clear_cache))
///
/// Every method takes the graphics API of the owning context. Calls must come
/// from the thread that owns that context.
#[derive(Debug, Default)]
pub struct HeatmapRenderer {
    program: Option<ProgramHandle>,
    colormaps: Vec<TextureHandle>,
    entries: Vec<HeatmapEntry>,
    plot_index: HashMap<PlotId, usize>,
}

impl HeatmapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads `colors` as a lookup texture and returns its index.
    ///
    /// Filter polarity: `high_quality == true` selects nearest filtering (hard
    /// steps between entries), `false` selects linear filtering. Colormaps longer
    /// than the API's texture size limit are rejected.
    pub fn register_colormap(
        &mut self,
        api: &mut impl GraphicsApi,
        colors: &[Rgba8],
        high_quality: bool,
    ) -> Result<ColormapId, HeatmapError> {
        if colors.is_empty() {
            return Err(HeatmapError::EmptyColormap);
        }
        let max = api.max_texture_dimension();
        if colors.len() > max as usize {
            return Err(HeatmapError::ColormapTooLarge { len: colors.len(), max });
        }

        let filter = if high_quality { FilterMode::Nearest } else { FilterMode::Linear };
        let texture = api.create_colormap_texture(colors, filter);

        let id = ColormapId(self.colormaps.len());
        self.colormaps.push(texture);
        log::debug!(
            "registered colormap {} ({} entries, {:?} filter)",
            id.0,
            colors.len(),
            filter
        );
        Ok(id)
    }

    /// Replaces the grid contents of `plot_id` with `values` (`rows * cols`,
    /// row-major).
    ///
    /// 64-bit element types are narrowed to 32 bits before upload; see
    /// [`GridValue`]. The plot must have been rendered at least once since the
    /// last cache clear, and neither side may exceed the API's texture size
    /// limit.
    pub fn set_grid_data<T: GridValue>(
        &self,
        api: &mut impl GraphicsApi,
        plot_id: PlotId,
        values: &[T],
        rows: u32,
        cols: u32,
    ) -> Result<(), HeatmapError> {
        let entry = self.entry(plot_id).ok_or(HeatmapError::InvalidPlotId(plot_id))?;

        if rows == 0 || cols == 0 {
            return Err(HeatmapError::EmptyGrid { rows, cols });
        }
        let expected = rows as usize * cols as usize;
        if values.len() != expected {
            return Err(HeatmapError::GridSizeMismatch {
                rows,
                cols,
                expected,
                actual: values.len(),
            });
        }
        let max = api.max_texture_dimension();
        if rows > max || cols > max {
            return Err(HeatmapError::GridTooLarge { rows, cols, max });
        }

        let texture = entry.grid_texture();
        T::with_texels(values, |texels| api.upload_grid(texture, rows, cols, texels));
        Ok(())
    }

    /// Creates or updates the entry for `plot_id` and records its draw into
    /// `draw_list`.
    ///
    /// Recorded in order:
    /// 1. [`HeatmapCallback::CompileShader`], only while no program exists
    /// 2. [`HeatmapCallback::Bind`]
    /// 3. a quad over `bounds_min..bounds_max` with UVs `(0,0)..(1,1)`
    /// 4. [`HeatmapCallback::UnbindTexture`]
    /// 5. the host's render-state reset
    ///
    /// Nothing is drawn until the host plays the list back and routes each
    /// callback to [`execute`](Self::execute).
    pub fn render_heatmap<C>(
        &mut self,
        api: &mut impl GraphicsApi,
        draw_list: &mut DrawList<C>,
        plot_id: PlotId,
        draw: HeatmapDraw,
    ) -> Result<(), HeatmapError>
    where
        C: From<HeatmapCallback>,
    {
        let colormap_texture = self.colormap_texture(draw.colormap)?;

        match self.plot_index.get(&plot_id) {
            Some(&idx) => {
                let entry = &mut self.entries[idx];
                entry.colormap_texture = colormap_texture;
                entry.min_value = draw.scale_min;
                entry.max_value = draw.scale_max;
            }
            None => {
                let grid = GridTexture(api.create_grid_texture());
                log::debug!("allocated grid texture {:?} for plot {}", grid.handle(), plot_id.0);

                self.plot_index.insert(plot_id, self.entries.len());
                self.entries.push(HeatmapEntry {
                    grid,
                    colormap_texture,
                    min_value: draw.scale_min,
                    max_value: draw.scale_max,
                });
            }
        }

        if self.program.is_none() {
            draw_list.push_callback(HeatmapCallback::CompileShader.into());
        }
        draw_list.push_callback(HeatmapCallback::Bind { plot_id }.into());
        draw_list.prim_reserve(6, 4);
        draw_list.prim_rect_uv(
            draw.bounds_min,
            draw.bounds_max,
            Vec2::zero(),
            Vec2::one(),
            Rgba8::TRANSPARENT,
        );
        draw_list.push_callback(HeatmapCallback::UnbindTexture.into());
        draw_list.push_reset_render_state();
        Ok(())
    }

    /// Runs a recorded callback. Hosts call this during draw-list playback.
    pub fn execute(&mut self, api: &mut impl GraphicsApi, callback: &HeatmapCallback) {
        match *callback {
            HeatmapCallback::CompileShader => self.compile_shader(api),
            HeatmapCallback::Bind { plot_id } => self.bind(api, plot_id),
            HeatmapCallback::UnbindTexture => api.bind_texture(TextureUnit::Grid, None),
        }
    }

    /// Releases every grid texture and forgets all plot ids.
    ///
    /// Colormaps and the shader program are kept. Call before tearing down the
    /// graphics context or after anything that invalidates recorded plot ids.
    pub fn clear_cache(&mut self, api: &mut impl GraphicsApi) {
        let released = self.entries.len();
        for entry in self.entries.drain(..) {
            entry.grid.release(api);
        }
        self.plot_index.clear();
        log::debug!("heatmap cache cleared ({released} grid textures released)");
    }

    /// Clears the cache, then deletes every registered colormap.
    ///
    /// Previously returned [`ColormapId`]s become invalid.
    pub fn reset_colormaps(&mut self, api: &mut impl GraphicsApi) {
        self.clear_cache(api);
        for texture in self.colormaps.drain(..) {
            api.delete_texture(texture);
        }
        log::debug!("colormaps reset");
    }

    /// Releases every GPU resource the renderer owns.
    pub fn shutdown(&mut self, api: &mut impl GraphicsApi) {
        self.reset_colormaps(api);
        if let Some(program) = self.program.take() {
            api.delete_program(program);
        }
    }

    #[inline]
    pub fn entry(&self, plot_id: PlotId) -> Option<&HeatmapEntry> {
        self.plot_index.get(&plot_id).map(|&idx| &self.entries[idx])
    }

    #[inline]
    pub fn heatmap_count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn colormap_count(&self) -> usize {
        self.colormaps.len()
    }

    #[inline]
    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }

    fn colormap_texture(&self, colormap: ColormapId) -> Result<TextureHandle, HeatmapError> {
        self.colormaps
            .get(colormap.0)
            .copied()
            .ok_or(HeatmapError::InvalidColormap {
                index: colormap,
                registered: self.colormaps.len(),
            })
    }

    fn compile_shader(&mut self, api: &mut impl GraphicsApi) {
        // Several compile callbacks can be queued before the first playback.
        if self.program.is_some() {
            return;
        }
        let program = api.compile_program(&HEATMAP_SHADER);
        log::debug!("compiled heatmap program {program:?}");
        self.program = Some(program);
    }

    fn bind(&self, api: &mut impl GraphicsApi, plot_id: PlotId) {
        let Some(entry) = self.entry(plot_id) else {
            log::warn!("heatmap bind for unknown plot {}; skipped", plot_id.0);
            return;
        };
        let Some(program) = self.program else {
            log::warn!("heatmap bind before program compile; skipped");
            return;
        };

        // Read while the host pipeline is still current.
        let projection = api.host_projection();

        api.use_program(program);
        api.bind_texture(TextureUnit::Grid, Some(entry.grid_texture()));
        api.bind_texture(TextureUnit::Colormap, Some(entry.colormap_texture));
        api.set_heatmap_uniforms(&HeatmapUniforms {
            projection,
            min_value: entry.min_value,
            max_value: entry.max_value,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Viewport;
    use crate::gfx::{GfxCall, RecordingApi};
    use crate::scene::DrawCmd;

    fn draw(colormap: usize, scale_min: f32, scale_max: f32) -> HeatmapDraw {
        HeatmapDraw {
            bounds_min: Vec2::new(10.0, 10.0),
            bounds_max: Vec2::new(110.0, 60.0),
            scale_min,
            scale_max,
            colormap: ColormapId(colormap),
        }
    }

    /// Plays back `list` the way a host backend would.
    fn play(renderer: &mut HeatmapRenderer, api: &mut RecordingApi, list: &DrawList<HeatmapCallback>) {
        for cmd in list.commands() {
            match cmd {
                DrawCmd::Callback(cb) => renderer.execute(api, cb),
                DrawCmd::ResetRenderState => api.reset_render_state(),
                DrawCmd::Elements { .. } => {}
            }
        }
    }

    fn setup() -> (HeatmapRenderer, RecordingApi, DrawList<HeatmapCallback>) {
        let mut renderer = HeatmapRenderer::new();
        let mut api = RecordingApi::new(Viewport::new(200.0, 100.0));
        renderer
            .register_colormap(&mut api, &[Rgba8::BLACK, Rgba8::WHITE], false)
            .unwrap();
        (renderer, api, DrawList::new())
    }

    #[test]
    fn black_white_scenario() {
        let (mut renderer, mut api, mut list) = setup();
        let plot = PlotId(7);

        renderer.render_heatmap(&mut api, &mut list, plot, draw(0, 0.0, 3.0)).unwrap();
        renderer.set_grid_data(&mut api, plot, &[0.0f32, 1.0, 2.0, 3.0], 2, 2).unwrap();

        let grid = renderer.entry(plot).unwrap().grid_texture();
        assert_eq!(api.grid(grid), Some((2, 2, &[0.0f32, 1.0, 2.0, 3.0][..])));

        assert_eq!(list.callback_count(), 4);
        assert_eq!(
            list.commands(),
            &[
                DrawCmd::Callback(HeatmapCallback::CompileShader),
                DrawCmd::Callback(HeatmapCallback::Bind { plot_id: plot }),
                DrawCmd::Elements { first_index: 0, index_count: 6 },
                DrawCmd::Callback(HeatmapCallback::UnbindTexture),
                DrawCmd::ResetRenderState,
            ]
        );
        assert_eq!(list.vertices()[0].pos, [10.0, 10.0]);
        assert_eq!(list.vertices()[2].pos, [110.0, 60.0]);
        assert_eq!(list.vertices()[2].uv, [1.0, 1.0]);
    }

    #[test]
    fn playback_binds_program_textures_and_uniforms() {
        let (mut renderer, mut api, mut list) = setup();
        let plot = PlotId(7);
        renderer.render_heatmap(&mut api, &mut list, plot, draw(0, 0.0, 3.0)).unwrap();
        let entry_grid = renderer.entry(plot).unwrap().grid_texture();
        let entry_cmap = renderer.entry(plot).unwrap().colormap_texture();
        api.take_calls();

        // Stop before the unbind/reset so bound state is observable.
        for cmd in &list.commands()[..2] {
            if let DrawCmd::Callback(cb) = cmd {
                renderer.execute(&mut api, cb);
            }
        }

        let program = renderer.program().unwrap();
        assert_eq!(api.current_program(), Some(program));
        assert_eq!(api.bound_texture(TextureUnit::Grid), Some(entry_grid));
        assert_eq!(api.bound_texture(TextureUnit::Colormap), Some(entry_cmap));

        let uniforms = api.uniforms().unwrap();
        assert_eq!(uniforms.min_value, 0.0);
        assert_eq!(uniforms.max_value, 3.0);
        assert_eq!(uniforms.projection, Viewport::new(200.0, 100.0).ortho_projection());

        // Projection is read from the host before the heatmap program is bound.
        let calls = api.calls();
        let proj_at = calls.iter().position(|c| *c == GfxCall::HostProjection).unwrap();
        let use_at = calls
            .iter()
            .position(|c| matches!(c, GfxCall::UseProgram { .. }))
            .unwrap();
        assert!(proj_at < use_at);
    }

    #[test]
    fn full_playback_leaves_grid_unit_unbound() {
        let (mut renderer, mut api, mut list) = setup();
        renderer.render_heatmap(&mut api, &mut list, PlotId(1), draw(0, 0.0, 1.0)).unwrap();
        play(&mut renderer, &mut api, &list);

        assert_eq!(api.bound_texture(TextureUnit::Grid), None);
        assert_eq!(api.current_program(), None);
    }

    #[test]
    fn rerender_reuses_texture_and_updates_scale() {
        let (mut renderer, mut api, mut list) = setup();
        renderer
            .register_colormap(&mut api, &[Rgba8::WHITE, Rgba8::BLACK], true)
            .unwrap();
        let plot = PlotId(3);

        renderer.render_heatmap(&mut api, &mut list, plot, draw(0, 0.0, 1.0)).unwrap();
        let first = renderer.entry(plot).unwrap().grid_texture();
        let live = api.live_textures();

        renderer.render_heatmap(&mut api, &mut list, plot, draw(1, -5.0, 5.0)).unwrap();
        let entry = renderer.entry(plot).unwrap();

        assert_eq!(entry.grid_texture(), first);
        assert_eq!(api.live_textures(), live);
        assert_eq!(renderer.heatmap_count(), 1);
        assert_eq!((entry.min_value(), entry.max_value()), (-5.0, 5.0));
        assert_eq!(
            api.colormap(entry.colormap_texture()).map(|(_, f)| f),
            Some(FilterMode::Nearest)
        );
    }

    #[test]
    fn data_survives_rerender_and_resize_keeps_handle() {
        let (mut renderer, mut api, mut list) = setup();
        let plot = PlotId(2);
        renderer.render_heatmap(&mut api, &mut list, plot, draw(0, 0.0, 1.0)).unwrap();
        renderer.set_grid_data(&mut api, plot, &[1u8, 2, 3, 4], 2, 2).unwrap();
        let grid = renderer.entry(plot).unwrap().grid_texture();

        renderer.set_grid_data(&mut api, plot, &[9i16, 8, 7], 1, 3).unwrap();
        assert_eq!(api.grid(grid), Some((1, 3, &[9.0f32, 8.0, 7.0][..])));
        assert_eq!(renderer.entry(plot).unwrap().grid_texture(), grid);
    }

    #[test]
    fn clear_cache_releases_grids_and_allocates_fresh_handles() {
        let (mut renderer, mut api, mut list) = setup();
        let plot = PlotId(7);
        renderer.render_heatmap(&mut api, &mut list, plot, draw(0, 0.0, 1.0)).unwrap();
        renderer.render_heatmap(&mut api, &mut list, PlotId(8), draw(0, 0.0, 1.0)).unwrap();
        let old = renderer.entry(plot).unwrap().grid_texture();
        play(&mut renderer, &mut api, &list);
        let program = renderer.program();

        renderer.clear_cache(&mut api);
        assert!(!api.is_live(old));
        assert_eq!(renderer.heatmap_count(), 0);
        assert!(renderer.entry(plot).is_none());
        assert_eq!(renderer.colormap_count(), 1);
        assert_eq!(renderer.program(), program);
        assert_eq!(api.live_textures(), 1);

        renderer.render_heatmap(&mut api, &mut list, plot, draw(0, 2.0, 4.0)).unwrap();
        let fresh = renderer.entry(plot).unwrap();
        assert_ne!(fresh.grid_texture(), old);
        assert_eq!(api.grid(fresh.grid_texture()), None);
        assert_eq!((fresh.min_value(), fresh.max_value()), (2.0, 4.0));
    }

    #[test]
    fn shader_compiles_once() {
        let (mut renderer, mut api, mut list) = setup();

        // Two plots recorded before any playback both request a compile.
        renderer.render_heatmap(&mut api, &mut list, PlotId(1), draw(0, 0.0, 1.0)).unwrap();
        renderer.render_heatmap(&mut api, &mut list, PlotId(2), draw(0, 0.0, 1.0)).unwrap();
        play(&mut renderer, &mut api, &list);

        // Later frames no longer record the compile callback.
        list.clear();
        for id in 0..5 {
            renderer.render_heatmap(&mut api, &mut list, PlotId(id), draw(0, 0.0, 1.0)).unwrap();
        }
        assert!(!list
            .commands()
            .contains(&DrawCmd::Callback(HeatmapCallback::CompileShader)));
        play(&mut renderer, &mut api, &list);

        let compiles = api
            .calls()
            .iter()
            .filter(|c| matches!(c, GfxCall::CompileProgram { .. }))
            .count();
        assert_eq!(compiles, 1);
        assert_eq!(api.live_programs(), 1);
    }

    #[test]
    fn colormap_filter_polarity() {
        let mut renderer = HeatmapRenderer::new();
        let mut api = RecordingApi::default();
        renderer.register_colormap(&mut api, &[Rgba8::BLACK], true).unwrap();
        renderer.register_colormap(&mut api, &[Rgba8::BLACK], false).unwrap();

        assert!(matches!(
            api.calls(),
            [
                GfxCall::CreateColormapTexture { filter: FilterMode::Nearest, .. },
                GfxCall::CreateColormapTexture { filter: FilterMode::Linear, .. },
            ]
        ));
    }

    #[test]
    fn every_element_type_uploads_as_f32() {
        let (mut renderer, mut api, mut list) = setup();
        let plot = PlotId(0);
        renderer.render_heatmap(&mut api, &mut list, plot, draw(0, 0.0, 1.0)).unwrap();
        let grid = renderer.entry(plot).unwrap().grid_texture();
        let expect = [-1.0f32, 0.0, 1.0, 100.0];

        // Texels equal the input narrowed to its 32-bit upload type, then cast.
        macro_rules! check {
            ($($ty:ty => $narrow:ty),*) => {$(
                let values: Vec<$ty> = [-1i8 as $ty, 0 as $ty, 1 as $ty, 100 as $ty].to_vec();
                renderer.set_grid_data(&mut api, plot, &values, 2, 2).unwrap();
                let (_, _, texels) = api.grid(grid).unwrap();
                let want: Vec<f32> = values.iter().map(|&v| v as $narrow as f32).collect();
                assert_eq!(texels, want.as_slice(), "{}", stringify!($ty));
            )*};
        }
        check!(
            i8 => i8, u8 => u8, i16 => i16, u16 => u16, i32 => i32, u32 => u32,
            i64 => i32, u64 => u32, f32 => f32, f64 => f32
        );

        // -1 as u64 is u64::MAX; it narrows to u32::MAX, not to u64::MAX as f32.
        renderer.set_grid_data(&mut api, plot, &[u64::MAX, 0, 1, 100], 2, 2).unwrap();
        assert_eq!(api.grid(grid).unwrap().2, &[u32::MAX as f32, 0.0, 1.0, 100.0]);

        renderer.set_grid_data(&mut api, plot, &[-1.0f64, 0.0, 1.0, 100.0], 2, 2).unwrap();
        assert_eq!(api.grid(grid).unwrap().2, &expect);
    }

    #[test]
    fn set_data_before_render_is_rejected() {
        let (renderer, mut api, _) = setup();
        assert_eq!(
            renderer.set_grid_data(&mut api, PlotId(42), &[1.0f32], 1, 1),
            Err(HeatmapError::InvalidPlotId(PlotId(42)))
        );
    }

    #[test]
    fn grid_shape_is_validated() {
        let (mut renderer, mut api, mut list) = setup();
        let plot = PlotId(1);
        renderer.render_heatmap(&mut api, &mut list, plot, draw(0, 0.0, 1.0)).unwrap();

        assert_eq!(
            renderer.set_grid_data(&mut api, plot, &[1u32, 2, 3], 2, 2),
            Err(HeatmapError::GridSizeMismatch { rows: 2, cols: 2, expected: 4, actual: 3 })
        );
        assert_eq!(
            renderer.set_grid_data(&mut api, plot, &[0u32; 0], 0, 4),
            Err(HeatmapError::EmptyGrid { rows: 0, cols: 4 })
        );
    }

    #[test]
    fn grid_beyond_texture_limit_is_rejected() {
        let mut renderer = HeatmapRenderer::new();
        let mut api = RecordingApi::default().with_max_texture_dimension(16);
        let mut list = DrawList::<HeatmapCallback>::new();
        renderer.register_colormap(&mut api, &[Rgba8::BLACK, Rgba8::WHITE], false).unwrap();
        let plot = PlotId(1);
        renderer.render_heatmap(&mut api, &mut list, plot, draw(0, 0.0, 1.0)).unwrap();
        api.take_calls();

        assert_eq!(
            renderer.set_grid_data(&mut api, plot, &[0.5f32; 17], 1, 17),
            Err(HeatmapError::GridTooLarge { rows: 1, cols: 17, max: 16 })
        );
        assert_eq!(
            renderer.set_grid_data(&mut api, plot, &[0.5f32; 17], 17, 1),
            Err(HeatmapError::GridTooLarge { rows: 17, cols: 1, max: 16 })
        );
        assert!(api.calls().is_empty());

        // Exactly at the limit is accepted.
        renderer.set_grid_data(&mut api, plot, &[0.5f32; 16], 1, 16).unwrap();
        let grid = renderer.entry(plot).unwrap().grid_texture();
        assert_eq!(api.grid(grid).map(|(r, c, _)| (r, c)), Some((1, 16)));
    }

    #[test]
    fn colormap_beyond_texture_limit_is_rejected() {
        let mut renderer = HeatmapRenderer::new();
        let mut api = RecordingApi::default().with_max_texture_dimension(4);

        assert_eq!(
            renderer.register_colormap(&mut api, &[Rgba8::WHITE; 5], false),
            Err(HeatmapError::ColormapTooLarge { len: 5, max: 4 })
        );
        assert_eq!(api.live_textures(), 0);
        assert_eq!(renderer.colormap_count(), 0);
        assert!(renderer.register_colormap(&mut api, &[Rgba8::WHITE; 4], false).is_ok());
    }

    #[test]
    fn unknown_colormap_is_rejected_without_side_effects() {
        let (mut renderer, mut api, mut list) = setup();
        let err = renderer
            .render_heatmap(&mut api, &mut list, PlotId(1), draw(5, 0.0, 1.0))
            .unwrap_err();
        assert_eq!(err, HeatmapError::InvalidColormap { index: ColormapId(5), registered: 1 });
        assert_eq!(renderer.heatmap_count(), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn empty_colormap_is_rejected() {
        let mut renderer = HeatmapRenderer::new();
        let mut api = RecordingApi::default();
        assert_eq!(
            renderer.register_colormap(&mut api, &[], false),
            Err(HeatmapError::EmptyColormap)
        );
        assert_eq!(api.live_textures(), 0);
    }

    #[test]
    fn stale_bind_after_clear_is_skipped() {
        let (mut renderer, mut api, mut list) = setup();
        renderer.render_heatmap(&mut api, &mut list, PlotId(9), draw(0, 0.0, 1.0)).unwrap();
        renderer.clear_cache(&mut api);
        api.take_calls();

        renderer.execute(&mut api, &HeatmapCallback::CompileShader);
        renderer.execute(&mut api, &HeatmapCallback::Bind { plot_id: PlotId(9) });

        assert!(!api.calls().iter().any(|c| matches!(c, GfxCall::UseProgram { .. })));
    }

    #[test]
    fn playback_resolves_state_at_execution_time() {
        let (mut renderer, mut api, mut list) = setup();
        let plot = PlotId(4);
        renderer.render_heatmap(&mut api, &mut list, plot, draw(0, 0.0, 1.0)).unwrap();

        // Updated after the callback was recorded, before playback.
        let mut other = DrawList::<HeatmapCallback>::new();
        renderer.render_heatmap(&mut api, &mut other, plot, draw(0, 10.0, 20.0)).unwrap();

        for cmd in &list.commands()[..2] {
            if let DrawCmd::Callback(cb) = cmd {
                renderer.execute(&mut api, cb);
            }
        }
        let uniforms = api.uniforms().unwrap();
        assert_eq!((uniforms.min_value, uniforms.max_value), (10.0, 20.0));
    }

    #[test]
    fn reset_colormaps_and_shutdown_release_everything() {
        let (mut renderer, mut api, mut list) = setup();
        renderer.render_heatmap(&mut api, &mut list, PlotId(1), draw(0, 0.0, 1.0)).unwrap();
        play(&mut renderer, &mut api, &list);

        renderer.reset_colormaps(&mut api);
        assert_eq!(renderer.colormap_count(), 0);
        assert_eq!(api.live_textures(), 0);
        assert!(renderer.program().is_some());
        assert!(matches!(
            renderer.render_heatmap(&mut api, &mut list, PlotId(1), draw(0, 0.0, 1.0)),
            Err(HeatmapError::InvalidColormap { .. })
        ));

        renderer.shutdown(&mut api);
        assert!(renderer.program().is_none());
        assert_eq!(api.live_programs(), 0);
    }
}
