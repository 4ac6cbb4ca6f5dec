//! Token color palette and swatches.

use egui::{Color32, CursorIcon, Rect, Sense, Stroke, Ui, vec2};

use crate::{sizing, theme};

/// A named color offered for tokens and drawings.
#[derive(Clone, Copy)]
pub struct SwatchColor {
    pub name: &'static str,
    /// Value stored on the scene record.
    pub hex: &'static str,
    pub color: Color32,
}

const fn swatch(name: &'static str, hex: &'static str, r: u8, g: u8, b: u8) -> SwatchColor {
    SwatchColor {
        name,
        hex,
        color: Color32::from_rgb(r, g, b),
    }
}

/// Quick selection colors (Tailwind 500 shades plus white and black).
pub const TOKEN_COLORS: &[SwatchColor] = &[
    swatch("Red", "#ef4444", 239, 68, 68),
    swatch("Orange", "#f97316", 249, 115, 22),
    swatch("Yellow", "#facc15", 250, 204, 21),
    swatch("Green", "#22c55e", 34, 197, 94),
    swatch("Teal", "#14b8a6", 20, 184, 166),
    swatch("Blue", "#3b82f6", 59, 130, 246),
    swatch("Purple", "#a855f7", 168, 85, 247),
    swatch("Pink", "#ec4899", 236, 72, 153),
    swatch("White", "#ffffff", 255, 255, 255),
    swatch("Black", "#111827", 17, 24, 39),
];

/// A clickable circular color swatch.
pub struct ColorSwatch<'a> {
    color: Color32,
    tooltip: &'a str,
    selected: bool,
}

impl<'a> ColorSwatch<'a> {
    pub fn new(color: Color32, tooltip: &'a str) -> Self {
        Self {
            color,
            tooltip,
            selected: false,
        }
    }

    /// Set whether this swatch is selected.
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Show the swatch and return (clicked, rect).
    pub fn show(self, ui: &mut Ui) -> (bool, Rect) {
        let (rect, response) = ui.allocate_exact_size(vec2(sizing::SMALL, sizing::SMALL), Sense::click());

        if ui.is_rect_visible(rect) {
            let center = rect.center();
            let radius = rect.width().min(rect.height()) / 2.0;
            ui.painter().circle_filled(center, radius, self.color);
            if self.selected {
                // Inner offset ring
                ui.painter()
                    .circle_stroke(center, radius - 3.0, Stroke::new(2.0, Color32::from_gray(30)));
                ui.painter().circle_stroke(center, radius, Stroke::new(1.0, theme::ACCENT));
            }
        }

        let clicked = response.clicked();
        response.on_hover_text(self.tooltip).on_hover_cursor(CursorIcon::PointingHand);
        (clicked, rect)
    }
}
