//! Color model shared between the host draw list, colormaps and render targets.
//!
//! - `Rgba8`: packed straight-alpha bytes, the layout colormap textures and host
//!   vertices use
//! - `Color`: linear premultiplied floats, used for clear colors

pub mod color;

pub use color::{Color, Rgba8};
