//! Display-list renderer.
//!
//! Produces a [`Frame`] in fixed layer order: background, image, grid,
//! drawings, preview, tokens, fog.

use crate::frame::{DrawCommand, Frame, Layer, StrokeStyle};
use crate::palette::{Palette, color_or};
use crate::renderer::{RenderContext, Renderer};
use kurbo::{Point, Rect};
use tabletop_core::scene::{Cell, Drawing, DrawingKind, GridType, Scene, Token};
use tabletop_core::tools::Preview;
use tabletop_core::{Camera, PrecisePoint};

/// Width of grid lines in pixels.
const GRID_LINE_WIDTH: f64 = 1.0;
/// Width of the selection ring in pixels.
const SELECTION_RING_WIDTH: f64 = 3.0;
/// Dashed preview outline width.
const PREVIEW_DASH_WIDTH: f64 = 2.0;

/// Screen rectangle covered by a token's footprint.
pub fn token_rect(camera: &Camera, token: &Token) -> Rect {
    let size = token.size as i32;
    Rect::from_points(
        camera.cell_to_screen(Cell::new(token.x, token.y)),
        camera.cell_to_screen(Cell::new(token.x + size, token.y + size)),
    )
}

/// Screen rectangle covered by the whole map.
pub fn map_rect(camera: &Camera, scene: &Scene) -> Rect {
    Rect::from_points(
        camera.cell_to_screen(Cell::new(0, 0)),
        camera.cell_to_screen(Cell::new(scene.width as i32, scene.height as i32)),
    )
}

/// Renderer producing a backend-neutral [`Frame`].
#[derive(Debug, Default)]
pub struct FrameRenderer {
    frame: Frame,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently built frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    fn push(&mut self, layer: Layer, command: DrawCommand) {
        self.frame.push(layer, command);
    }

    fn render_background(&mut self, scene: &Scene, camera: &Camera, palette: &Palette) {
        let rect = map_rect(camera, scene);
        let color = color_or(&scene.background_color, palette.fallback);
        self.push(Layer::Background, DrawCommand::FillRect { rect, color });

        if let Some(uri) = scene.background_image.as_deref().filter(|uri| !uri.is_empty()) {
            self.push(
                Layer::Image,
                DrawCommand::Image {
                    uri: uri.to_string(),
                    rect,
                },
            );
        }
    }

    fn render_grid(&mut self, scene: &Scene, camera: &Camera, palette: &Palette) {
        if scene.grid_type == GridType::None {
            return;
        }
        let bounds = map_rect(camera, scene);
        let stroke = StrokeStyle::solid(palette.grid, GRID_LINE_WIDTH);

        for col in 0..=scene.width as i32 {
            let x = camera.cell_to_screen(Cell::new(col, 0)).x;
            self.push(
                Layer::Grid,
                DrawCommand::Line {
                    from: Point::new(x, bounds.y0),
                    to: Point::new(x, bounds.y1),
                    stroke,
                },
            );
        }
        for row in 0..=scene.height as i32 {
            let y = camera.cell_to_screen(Cell::new(0, row)).y;
            self.push(
                Layer::Grid,
                DrawCommand::Line {
                    from: Point::new(bounds.x0, y),
                    to: Point::new(bounds.x1, y),
                    stroke,
                },
            );
        }
    }

    fn render_drawing(&mut self, drawing: &Drawing, camera: &Camera, palette: &Palette) {
        let stroke = StrokeStyle::solid(color_or(&drawing.color, palette.fallback), drawing.line_width);
        match (drawing.kind, drawing.points.as_slice()) {
            (DrawingKind::Freehand, points) if points.len() >= 2 => {
                let points = points.iter().map(|p| camera.precise_to_screen(*p)).collect();
                self.push(Layer::Drawings, DrawCommand::Polyline { points, stroke });
            }
            (DrawingKind::Rectangle, [a, b]) => {
                let rect = Rect::from_points(camera.precise_to_screen(*a), camera.precise_to_screen(*b));
                self.push(Layer::Drawings, DrawCommand::StrokeRect { rect, stroke });
            }
            (DrawingKind::Circle, [center, edge]) => {
                let (center, edge) = (camera.precise_to_screen(*center), camera.precise_to_screen(*edge));
                self.push(
                    Layer::Drawings,
                    DrawCommand::StrokeCircle {
                        center,
                        radius: center.distance(edge),
                        stroke,
                    },
                );
            }
            _ => log::debug!("skipping malformed drawing {}", drawing.id),
        }
    }

    fn render_preview(&mut self, preview: Preview<'_>, camera: &Camera, stroke: StrokeStyle) {
        let dashed = StrokeStyle::dashed(stroke.color, PREVIEW_DASH_WIDTH);
        let screen = |p: &PrecisePoint| camera.precise_to_screen(*p);
        match preview {
            Preview::Rectangle { anchor, current } => {
                let rect = Rect::from_points(screen(&anchor), screen(&current));
                self.push(Layer::Preview, DrawCommand::StrokeRect { rect, stroke: dashed });
            }
            Preview::Circle { center, edge } => {
                let (center, edge) = (screen(&center), screen(&edge));
                self.push(
                    Layer::Preview,
                    DrawCommand::StrokeCircle {
                        center,
                        radius: center.distance(edge),
                        stroke: dashed,
                    },
                );
            }
            Preview::Freehand(points) => {
                let points = points.iter().map(screen).collect();
                self.push(Layer::Preview, DrawCommand::Polyline { points, stroke });
            }
        }
    }

    fn render_token(&mut self, token: &Token, selected: bool, camera: &Camera, palette: &Palette) {
        let rect = token_rect(camera, token);
        let center = rect.center();
        let radius = (rect.width() / 2.0 - 2.0 * camera.zoom).max(1.0);

        self.push(
            Layer::Tokens,
            DrawCommand::FillCircle {
                center,
                radius,
                color: color_or(&token.color, palette.fallback),
            },
        );

        if selected {
            self.push(
                Layer::Tokens,
                DrawCommand::StrokeCircle {
                    center,
                    radius: radius + SELECTION_RING_WIDTH,
                    stroke: StrokeStyle::solid(palette.selection, SELECTION_RING_WIDTH),
                },
            );
        }

        let label = token.display_label();
        if !label.is_empty() {
            self.push(
                Layer::Tokens,
                DrawCommand::Text {
                    position: center,
                    text: label,
                    size: (rect.width() * 0.35).max(6.0),
                    color: palette.label,
                },
            );
        }

        if let Some(hp) = token.hp {
            let height = (rect.height() * 0.1).max(3.0);
            let track = Rect::new(rect.x0, rect.y1 - height, rect.x1, rect.y1);
            let ratio = hp.ratio();
            self.push(
                Layer::Tokens,
                DrawCommand::FillRect {
                    rect: track,
                    color: palette.hp_track,
                },
            );
            if ratio > 0.0 {
                self.push(
                    Layer::Tokens,
                    DrawCommand::FillRect {
                        rect: Rect::new(track.x0, track.y0, track.x0 + track.width() * ratio, track.y1),
                        color: palette.hp_color(ratio),
                    },
                );
            }
        }

        if !token.conditions.is_empty() {
            let badge_radius = (rect.width() * 0.18).max(5.0);
            let badge_center = Point::new(rect.x1 - badge_radius, rect.y0 + badge_radius);
            self.push(
                Layer::Tokens,
                DrawCommand::FillCircle {
                    center: badge_center,
                    radius: badge_radius,
                    color: palette.badge,
                },
            );
            self.push(
                Layer::Tokens,
                DrawCommand::Text {
                    position: badge_center,
                    text: token.conditions.len().to_string(),
                    size: badge_radius * 1.4,
                    color: palette.badge_text,
                },
            );
        }
    }

    fn render_fog(&mut self, scene: &Scene, camera: &Camera, palette: &Palette) {
        for row in 0..scene.height {
            for col in 0..scene.width {
                if scene.is_revealed(row, col) {
                    continue;
                }
                let (x, y) = (col as i32, row as i32);
                let rect = Rect::from_points(
                    camera.cell_to_screen(Cell::new(x, y)),
                    camera.cell_to_screen(Cell::new(x + 1, y + 1)),
                );
                self.push(
                    Layer::Fog,
                    DrawCommand::FillRect {
                        rect,
                        color: palette.fog,
                    },
                );
            }
        }
    }
}

impl Renderer for FrameRenderer {
    fn build_frame(&mut self, ctx: &RenderContext) {
        self.frame.reset(ctx.viewport_size);
        let palette = ctx.palette;
        self.push(Layer::Background, DrawCommand::Clear(self.background_color(ctx)));

        let Some(scene) = ctx.scene else {
            return;
        };
        let camera = ctx.camera;

        self.render_background(scene, camera, &palette);

        if ctx.view.show_grid {
            self.render_grid(scene, camera, &palette);
        }

        for drawing in &scene.drawings {
            self.render_drawing(drawing, camera, &palette);
        }

        if let Some(preview) = ctx.preview {
            self.render_preview(preview, camera, ctx.preview_stroke);
        }

        for token in scene.tokens.iter().filter(|t| !t.hidden) {
            let selected = ctx.selected == Some(token.id.as_str());
            self.render_token(token, selected, camera, &palette);
        }

        if ctx.view.show_fog {
            self.render_fog(scene, camera, &palette);
        }
    }
}
