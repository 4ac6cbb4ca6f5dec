//! Tabletop Render Library
//!
//! Renderer abstraction for the battle map. [`FrameRenderer`] turns a scene
//! and view state into a backend-neutral [`Frame`] that UI backends paint.

mod frame;
mod frame_renderer;
mod palette;
mod renderer;
mod scheduler;

pub use frame::{DrawCommand, Frame, Layer, StrokeStyle};
pub use frame_renderer::{FrameRenderer, map_rect, token_rect};
pub use palette::{Palette, color_or, parse_css_color};
pub use renderer::{RenderContext, RenderResult, Renderer, RendererError, check_viewport};
pub use scheduler::RenderScheduler;
