use super::{ColormapId, PlotId};

/// Caller errors reported by [`HeatmapRenderer`](super::HeatmapRenderer).
///
/// GPU-side failures (shader compile, out-of-memory) are not represented here;
/// they surface through the backend's own error reporting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeatmapError {
    #[error("plot {0:?} has no heatmap entry; render it before setting data")]
    InvalidPlotId(PlotId),

    #[error("colormap {index:?} is not registered ({registered} available)")]
    InvalidColormap { index: ColormapId, registered: usize },

    #[error("colormap must contain at least one color")]
    EmptyColormap,

    #[error("colormap of {len} entries exceeds the texture limit of {max}")]
    ColormapTooLarge { len: usize, max: u32 },

    #[error("grid of {rows}x{cols} has no cells")]
    EmptyGrid { rows: u32, cols: u32 },

    #[error("grid of {rows}x{cols} needs {expected} values, got {actual}")]
    GridSizeMismatch { rows: u32, cols: u32, expected: usize, actual: usize },

    #[error("grid of {rows}x{cols} exceeds the texture limit of {max}")]
    GridTooLarge { rows: u32, cols: u32, max: u32 },
}
