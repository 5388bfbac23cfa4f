//! GPU device management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a window
//! - allocating offscreen color targets and reading them back to the CPU

mod gpu;
mod offscreen;

pub use gpu::{Gpu, GpuInit};
pub use offscreen::OffscreenTarget;
