//! Paint a [`Frame`] with egui's painter.

use egui::load::{SizeHint, TexturePoll};
use egui::{Align2, Color32, CornerRadius, FontId, Painter, Pos2, Shape, Stroke, StrokeKind, TextureOptions, Vec2, pos2};
use std::f64::consts::TAU;
use tabletop_render::{DrawCommand, Frame, StrokeStyle};

const DASH: f32 = 6.0;
const GAP: f32 = 4.0;
const CIRCLE_SEGMENTS: usize = 64;

/// Convert a peniko color to egui.
pub fn to_color32(color: peniko::Color) -> Color32 {
    let c = color.to_rgba8();
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

fn to_pos(point: kurbo::Point, origin: Pos2) -> Pos2 {
    pos2(origin.x + point.x as f32, origin.y + point.y as f32)
}

fn to_rect(rect: kurbo::Rect, origin: Pos2) -> egui::Rect {
    egui::Rect::from_min_max(
        to_pos(rect.origin(), origin),
        to_pos(kurbo::Point::new(rect.x1, rect.y1), origin),
    )
}

fn to_stroke(stroke: &StrokeStyle) -> Stroke {
    Stroke::new(stroke.width as f32, to_color32(stroke.color))
}

/// Points approximating a circle outline, closed (first point repeated).
pub fn circle_points(center: Pos2, radius: f32, segments: usize) -> Vec<Pos2> {
    (0..=segments)
        .map(|i| {
            let angle = TAU * i as f64 / segments as f64;
            center + Vec2::new(radius * angle.cos() as f32, radius * angle.sin() as f32)
        })
        .collect()
}

fn path(painter: &Painter, points: Vec<Pos2>, stroke: &StrokeStyle) {
    if points.len() < 2 {
        return;
    }
    let egui_stroke = to_stroke(stroke);
    if stroke.dashed {
        painter.extend(Shape::dashed_line(&points, egui_stroke, DASH, GAP));
    } else {
        painter.add(Shape::line(points, egui_stroke));
    }
}

/// Paint every command of `frame`, in layer order, with its origin at `origin`.
pub fn paint_frame(painter: &Painter, frame: &Frame, origin: Pos2) {
    let mut commands: Vec<_> = frame.layered().iter().collect();
    commands.sort_by_key(|(layer, _)| *layer);

    for (_, command) in commands {
        match command {
            DrawCommand::Clear(color) => {
                painter.rect_filled(painter.clip_rect(), CornerRadius::ZERO, to_color32(*color));
            }
            DrawCommand::FillRect { rect, color } => {
                painter.rect_filled(to_rect(*rect, origin), CornerRadius::ZERO, to_color32(*color));
            }
            DrawCommand::StrokeRect { rect, stroke } => {
                let r = to_rect(*rect, origin);
                if stroke.dashed {
                    let corners = vec![r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom(), r.left_top()];
                    path(painter, corners, stroke);
                } else {
                    painter.rect_stroke(r, CornerRadius::ZERO, to_stroke(stroke), StrokeKind::Middle);
                }
            }
            DrawCommand::Image { uri, rect } => {
                paint_image(painter, uri, to_rect(*rect, origin));
            }
            DrawCommand::Line { from, to, stroke } => {
                path(painter, vec![to_pos(*from, origin), to_pos(*to, origin)], stroke);
            }
            DrawCommand::Polyline { points, stroke } => {
                path(painter, points.iter().map(|p| to_pos(*p, origin)).collect(), stroke);
            }
            DrawCommand::FillCircle { center, radius, color } => {
                painter.circle_filled(to_pos(*center, origin), *radius as f32, to_color32(*color));
            }
            DrawCommand::StrokeCircle { center, radius, stroke } => {
                let center = to_pos(*center, origin);
                if stroke.dashed {
                    path(painter, circle_points(center, *radius as f32, CIRCLE_SEGMENTS), stroke);
                } else {
                    painter.circle_stroke(center, *radius as f32, to_stroke(stroke));
                }
            }
            DrawCommand::Text {
                position,
                text,
                size,
                color,
            } => {
                painter.text(
                    to_pos(*position, origin),
                    Align2::CENTER_CENTER,
                    text,
                    FontId::proportional(*size as f32),
                    to_color32(*color),
                );
            }
        }
    }
}

/// Background images load asynchronously through the installed loaders;
/// nothing is drawn until the texture is ready.
fn paint_image(painter: &Painter, uri: &str, rect: egui::Rect) {
    match painter
        .ctx()
        .try_load_texture(uri, TextureOptions::LINEAR, SizeHint::default())
    {
        Ok(TexturePoll::Ready { texture }) => {
            let uv = egui::Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
            painter.image(texture.id, rect, uv, Color32::WHITE);
        }
        Ok(TexturePoll::Pending { .. }) => {}
        Err(e) => log::debug!("background image {} unavailable: {}", uri, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversion() {
        let color = to_color32(peniko::Color::from_rgba8(250, 204, 21, 255));
        assert_eq!(color, Color32::from_rgb(250, 204, 21));
    }

    #[test]
    fn test_circle_points_closed() {
        let points = circle_points(pos2(10.0, 10.0), 5.0, 16);
        assert_eq!(points.len(), 17);
        assert!((points[0] - pos2(15.0, 10.0)).length() < 1e-4);
        assert!((points[16] - points[0]).length() < 1e-4);
        assert!((points[4] - pos2(10.0, 15.0)).length() < 1e-4);
    }

    #[test]
    fn test_rect_offset_by_origin() {
        let rect = to_rect(kurbo::Rect::new(80.0, 80.0, 200.0, 160.0), pos2(10.0, 20.0));
        assert_eq!(rect.min, pos2(90.0, 100.0));
        assert_eq!(rect.size(), Vec2::new(120.0, 80.0));
    }
}
