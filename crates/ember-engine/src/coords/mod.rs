//! Coordinate types shared by the host draw list and the renderers.
//!
//! Canonical CPU space:
//! - Logical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Shaders convert to clip space through the host's orthographic projection.

mod vec2;
mod viewport;

pub use vec2::Vec2;
pub use viewport::{Mat4, Viewport};
