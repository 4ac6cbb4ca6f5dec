//! Backend-neutral display list.

use kurbo::{Point, Rect, Size};
use peniko::Color;

/// Render layers, in paint order. Later layers occlude earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Background,
    Image,
    Grid,
    Drawings,
    Preview,
    Tokens,
    Fog,
}

/// Stroke parameters, in screen pixels.
#[derive(Debug, Clone, Copy)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f64,
    pub dashed: bool,
}

impl StrokeStyle {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dashed: false,
        }
    }

    pub fn dashed(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dashed: true,
        }
    }
}

/// A single drawing primitive in screen coordinates.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Clear(Color),
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, stroke: StrokeStyle },
    /// Image loaded by the backend from `uri`, stretched to `rect`.
    Image { uri: String, rect: Rect },
    Line { from: Point, to: Point, stroke: StrokeStyle },
    Polyline { points: Vec<Point>, stroke: StrokeStyle },
    FillCircle { center: Point, radius: f64, color: Color },
    StrokeCircle { center: Point, radius: f64, stroke: StrokeStyle },
    /// Text centered on `position`.
    Text { position: Point, text: String, size: f64, color: Color },
}

/// One rendered frame.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    size: Size,
    commands: Vec<(Layer, DrawCommand)>,
}

impl Frame {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    /// Drop all commands and resize.
    pub fn reset(&mut self, size: Size) {
        self.size = size;
        self.commands.clear();
    }

    pub fn push(&mut self, layer: Layer, command: DrawCommand) {
        self.commands.push((layer, command));
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// All commands in paint order.
    pub fn commands(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().map(|(_, command)| command)
    }

    pub fn layered(&self) -> &[(Layer, DrawCommand)] {
        &self.commands
    }

    /// Commands belonging to one layer.
    pub fn layer(&self, layer: Layer) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(move |(l, _)| *l == layer)
            .map(|(_, command)| command)
    }
}
