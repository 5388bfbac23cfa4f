//! Host draw list (command stream) types.
//!
//! Responsibilities:
//! - store vertex/index primitives in logical pixels
//! - interleave them with deferred callbacks in enqueue order
//! - stay agnostic of what a callback means; the payload type `C` is chosen by
//!   whoever records into the list

mod cmd;
mod list;

pub use cmd::{DrawCmd, DrawVertex};
pub use list::DrawList;
