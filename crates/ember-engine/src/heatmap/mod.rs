//! GPU heatmap rendering for plotting hosts.
//!
//! Flow per frame:
//! 1. `render_heatmap` upserts the plot's entry and records callbacks plus a
//!    quad into the host draw list
//! 2. `set_grid_data` (whenever the data changes) uploads the grid texture
//! 3. the host plays its draw list back and routes each callback payload to
//!    `execute`, which binds the shared program and the plot's textures
//!
//! Grid textures live until `clear_cache`. Colormaps and the program live until
//! `reset_colormaps` / `shutdown`.

mod colormap;
mod error;
mod grid;
mod renderer;

pub use colormap::{keys, sample_table, ColormapId};
pub use error::HeatmapError;
pub use grid::GridValue;
pub use renderer::{
    HeatmapCallback, HeatmapDraw, HeatmapEntry, HeatmapRenderer, PlotId, HEATMAP_SHADER,
};
