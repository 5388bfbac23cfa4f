//! Ember engine crate.
//!
//! GPU heatmap rendering for immediate-mode plotting hosts: a renderer state
//! machine (`heatmap`), the graphics surface it drives (`gfx`), a wgpu
//! implementation of that surface (`render`) and the host draw list it records
//! into (`scene`).

pub mod coords;
pub mod device;
pub mod gfx;
pub mod heatmap;
pub mod logging;
pub mod paint;
pub mod render;
pub mod scene;
