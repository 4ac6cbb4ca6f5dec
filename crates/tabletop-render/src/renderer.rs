//! Renderer trait abstraction.

use crate::frame::StrokeStyle;
use crate::palette::{Palette, parse_css_color};
use kurbo::Size;
use peniko::Color;
use tabletop_core::tools::{DrawStyle, Preview};
use tabletop_core::{Camera, Scene, ViewState};
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The scene to render; `None` renders an empty viewport.
    pub scene: Option<&'a Scene>,
    pub camera: &'a Camera,
    /// Grid and fog visibility.
    pub view: ViewState,
    /// In-progress drawing.
    pub preview: Option<Preview<'a>>,
    pub preview_stroke: StrokeStyle,
    /// Selected token id.
    pub selected: Option<&'a str>,
    /// Viewport size in logical pixels.
    pub viewport_size: Size,
    pub palette: Palette,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(scene: Option<&'a Scene>, camera: &'a Camera, viewport_size: Size) -> Self {
        let style = DrawStyle::default();
        let palette = Palette::default();
        Self {
            scene,
            camera,
            view: ViewState::default(),
            preview: None,
            preview_stroke: preview_stroke(&style, palette.fallback),
            selected: None,
            viewport_size,
            palette,
        }
    }

    pub fn with_view(mut self, view: ViewState) -> Self {
        self.view = view;
        self
    }

    /// Set the in-progress drawing and the style it will be committed with.
    pub fn with_preview(mut self, preview: Option<Preview<'a>>, style: &DrawStyle) -> Self {
        self.preview = preview;
        self.preview_stroke = preview_stroke(style, self.palette.fallback);
        self
    }

    pub fn with_selected(mut self, selected: Option<&'a str>) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }
}

/// Reject viewports no frame can be built for.
pub fn check_viewport(size: Size) -> RenderResult<()> {
    if !size.width.is_finite() || !size.height.is_finite() || size.width < 0.0 || size.height < 0.0 {
        return Err(RendererError::InvalidViewport(format!("{}x{}", size.width, size.height)));
    }
    Ok(())
}

fn preview_stroke(style: &DrawStyle, fallback: Color) -> StrokeStyle {
    StrokeStyle::solid(parse_css_color(&style.color).unwrap_or(fallback), style.line_width)
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the command buffer for a frame.
    ///
    /// Called whenever something visible changed; should prepare all drawing commands.
    fn build_frame(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.palette.clear
    }
}
