mod config;

use anyhow::{Context, Result};

use ember_engine::coords::{Vec2, Viewport};
use ember_engine::device::{Gpu, GpuInit, OffscreenTarget};
use ember_engine::heatmap::{
    keys, sample_table, ColormapId, HeatmapCallback, HeatmapDraw, HeatmapRenderer, PlotId,
};
use ember_engine::logging::{init_logging, LoggingConfig};
use ember_engine::paint::{Color, Rgba8};
use ember_engine::render::{RenderCtx, RenderTarget, WgpuGraphics};
use ember_engine::scene::DrawList;

use config::StudioConfig;

/// Entries per continuous colormap table.
const COLORMAP_SIZE: usize = 256;

const MARGIN: f32 = 16.0;

fn main() -> Result<()> {
    let config = StudioConfig::from_args(std::env::args().skip(1))?;

    init_logging(LoggingConfig {
        env_filter: config.log_filter.clone(),
        ..Default::default()
    });

    let gpu = Gpu::new_blocking(GpuInit {
        allow_fallback_adapter: config.software,
        ..Default::default()
    })?;

    let target = OffscreenTarget::new(&gpu, config.width, config.height)?;
    let viewport = Viewport::new(config.width as f32, config.height as f32);
    let ctx = RenderCtx::new(gpu.device(), gpu.queue(), OffscreenTarget::FORMAT, viewport);
    let mut graphics = WgpuGraphics::new(&ctx);

    let mut renderer = HeatmapRenderer::new();
    let colormaps = [
        renderer.register_colormap(&mut graphics, &sample_table(&keys::VIRIDIS, COLORMAP_SIZE), false)?,
        renderer.register_colormap(&mut graphics, &sample_table(&keys::PLASMA, COLORMAP_SIZE), false)?,
        // Nearest filtering: visible bands.
        renderer.register_colormap(&mut graphics, &keys::HOT, true)?,
        renderer.register_colormap(&mut graphics, &keys::GREYS, false)?,
    ];

    let mut draw_list: DrawList<HeatmapCallback> = DrawList::new();
    draw_list.add_rect_filled(Vec2::zero(), Vec2::new(viewport.width, viewport.height), Rgba8::opaque(24, 24, 32));

    let n = config.grid_size;
    let cells = cell_rects(viewport);
    for (i, (min, max)) in cells.iter().copied().enumerate() {
        let plot_id = PlotId(i as u32);
        let kind = DemoGrid::ALL[i % DemoGrid::ALL.len()];
        let (scale_min, scale_max) = kind.range();
        renderer.render_heatmap(
            &mut graphics,
            &mut draw_list,
            plot_id,
            HeatmapDraw {
                bounds_min: min,
                bounds_max: max,
                scale_min,
                scale_max,
                colormap: colormaps[i % colormaps.len()],
            },
        )?;
        // Drawing happens at playback, so uploading after recording is fine.
        kind.upload(&renderer, &mut graphics, plot_id, n)?;
    }

    // Re-render plot 0 with another colormap and range. Both recorded draws
    // resolve to this state at playback.
    renderer.render_heatmap(
        &mut graphics,
        &mut draw_list,
        PlotId(0),
        HeatmapDraw {
            bounds_min: cells[0].0,
            bounds_max: cells[0].1,
            scale_min: -0.5,
            scale_max: 0.5,
            colormap: ColormapId(3),
        },
    )?;

    let mut encoder = gpu.create_encoder("ember studio encoder");
    {
        let mut rt = RenderTarget::new(&mut encoder, target.view())
            .with_clear(Color::from_srgb_u8(0, 0, 0, 255).to_wgpu());
        graphics.render_draw_list(&mut rt, &draw_list, |api, cb| renderer.execute(api, cb));
    }
    gpu.submit(encoder);

    let pixels = target.read_rgba8(&gpu)?;
    let (w, h) = target.size();
    image::save_buffer(&config.output, &pixels, w, h, image::ExtendedColorType::Rgba8)
        .with_context(|| format!("failed to write {}", config.output.display()))?;
    log::info!(
        "rendered {} heatmaps into {} ({}x{})",
        renderer.heatmap_count(),
        config.output.display(),
        w,
        h
    );

    renderer.shutdown(&mut graphics);
    Ok(())
}

/// Splits the viewport into a 2x2 layout of plot areas.
fn cell_rects(viewport: Viewport) -> [(Vec2, Vec2); 4] {
    let w = (viewport.width - 3.0 * MARGIN) / 2.0;
    let h = (viewport.height - 3.0 * MARGIN) / 2.0;
    let at = |col: f32, row: f32| {
        let min = Vec2::new(MARGIN + col * (w + MARGIN), MARGIN + row * (h + MARGIN));
        (min, min + Vec2::new(w, h))
    };
    [at(0.0, 0.0), at(1.0, 0.0), at(0.0, 1.0), at(1.0, 1.0)]
}

/// Demo data sets; each uses a different element type to exercise the upload paths.
#[derive(Debug, Copy, Clone)]
enum DemoGrid {
    /// `f64` (narrowed to `f32` on upload).
    Waves,
    /// `u8`.
    Ramp,
    /// `i16`.
    Checker,
    /// `f32`.
    Gaussian,
}

impl DemoGrid {
    const ALL: [DemoGrid; 4] = [DemoGrid::Waves, DemoGrid::Ramp, DemoGrid::Checker, DemoGrid::Gaussian];

    fn range(self) -> (f32, f32) {
        match self {
            DemoGrid::Waves => (-1.0, 1.0),
            DemoGrid::Ramp => (0.0, 255.0),
            DemoGrid::Checker => (0.0, 3.0),
            DemoGrid::Gaussian => (0.0, 1.0),
        }
    }

    fn upload(
        self,
        renderer: &HeatmapRenderer,
        graphics: &mut WgpuGraphics<'_>,
        plot_id: PlotId,
        n: u32,
    ) -> Result<()> {
        let side = n as usize;
        let len = side * side;
        // Cell origin in [0, 1)^2, row-major.
        let at = |i: usize| ((i % side) as f64 / side as f64, (i / side) as f64 / side as f64);

        match self {
            DemoGrid::Waves => {
                let values: Vec<f64> = (0..len)
                    .map(|i| {
                        let (x, y) = at(i);
                        (x * std::f64::consts::TAU).sin() * (y * std::f64::consts::TAU).cos()
                    })
                    .collect();
                renderer.set_grid_data(graphics, plot_id, &values, n, n)?;
            }
            DemoGrid::Ramp => {
                let values: Vec<u8> = (0..len)
                    .map(|i| {
                        let (x, y) = at(i);
                        ((x + y) * 127.5) as u8
                    })
                    .collect();
                renderer.set_grid_data(graphics, plot_id, &values, n, n)?;
            }
            DemoGrid::Checker => {
                let values: Vec<i16> = (0..len)
                    .map(|i| {
                        let (x, y) = at(i);
                        ((x * 8.0) as i16 + (y * 8.0) as i16) % 4
                    })
                    .collect();
                renderer.set_grid_data(graphics, plot_id, &values, n, n)?;
            }
            DemoGrid::Gaussian => {
                let values: Vec<f32> = (0..len)
                    .map(|i| {
                        let (x, y) = at(i);
                        let (dx, dy) = (x - 0.5, y - 0.5);
                        (-(dx * dx + dy * dy) * 12.0).exp() as f32
                    })
                    .collect();
                renderer.set_grid_data(graphics, plot_id, &values, n, n)?;
            }
        }
        Ok(())
    }
}
