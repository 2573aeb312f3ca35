//! Rendering module
//!
//! `frame` turns a session into an ordered draw list; a `Renderer` is the sink
//! that puts it on a surface. The simulation never reads anything back.

pub mod frame;
pub mod terminal;

pub use frame::{DrawCmd, Frame, Layer, build_frame};
pub use terminal::TerminalRenderer;

use crate::hud::HudSnapshot;

/// A drawing surface that consumes one frame per tick
pub trait Renderer {
    fn present(&mut self, frame: &Frame, hud: &HudSnapshot) -> std::io::Result<()>;
}
