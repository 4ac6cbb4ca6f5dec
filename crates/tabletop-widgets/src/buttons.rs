//! Button components: tool buttons, toggle buttons, text buttons.

use egui::{Align2, Color32, CornerRadius, CursorIcon, Sense, Ui, vec2};

use crate::{sizing, theme};

/// A palette button showing a label, with the shortcut in its tooltip.
/// Solid accent background when selected.
pub struct ToolButton<'a> {
    label: &'a str,
    tooltip: &'a str,
    shortcut: Option<&'a str>,
    selected: bool,
    width: f32,
}

impl<'a> ToolButton<'a> {
    pub fn new(label: &'a str, tooltip: &'a str) -> Self {
        Self {
            label,
            tooltip,
            shortcut: None,
            selected: false,
            width: 72.0,
        }
    }

    /// Set whether the button is selected/active.
    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// Set keyboard shortcut (shown in hover tooltip).
    pub fn shortcut(mut self, shortcut: &'a str) -> Self {
        self.shortcut = Some(shortcut);
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    /// Show the button and return true if clicked.
    pub fn show(self, ui: &mut Ui) -> bool {
        let (rect, response) = ui.allocate_exact_size(vec2(self.width, sizing::MEDIUM), Sense::click());

        if ui.is_rect_visible(rect) {
            let bg_color = if self.selected {
                theme::ACCENT
            } else if response.hovered() {
                theme::HOVER_BG
            } else {
                theme::BUTTON_BG
            };
            ui.painter().rect_filled(rect, CornerRadius::same(6), bg_color);

            let text_color = if self.selected { Color32::WHITE } else { theme::TEXT };
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                self.label,
                egui::FontId::proportional(12.0),
                text_color,
            );
        }

        let clicked = response.clicked();
        if let Some(shortcut) = self.shortcut {
            response.clone().on_hover_ui(|ui| {
                ui.horizontal(|ui| {
                    ui.label(self.tooltip);
                    ui.label(
                        egui::RichText::new(format!("({})", shortcut))
                            .color(theme::TEXT_MUTED)
                            .small(),
                    );
                });
            });
        } else {
            response.clone().on_hover_text(self.tooltip);
        }
        response.on_hover_cursor(CursorIcon::PointingHand);
        clicked
    }
}

/// A toggle button with text label.
pub struct ToggleButton<'a> {
    label: &'a str,
    selected: bool,
    min_width: Option<f32>,
    height: f32,
    font_size: f32,
}

impl<'a> ToggleButton<'a> {
    /// Create a new toggle button.
    pub fn new(label: &'a str, selected: bool) -> Self {
        Self {
            label,
            selected,
            min_width: None,
            height: 24.0,
            font_size: 11.0,
        }
    }

    /// Set minimum width.
    pub fn min_width(mut self, width: f32) -> Self {
        self.min_width = Some(width);
        self
    }

    /// Show the button and return true if clicked.
    pub fn show(self, ui: &mut Ui) -> bool {
        let font_id = egui::FontId::proportional(self.font_size);
        let galley = ui
            .painter()
            .layout_no_wrap(self.label.to_string(), font_id.clone(), Color32::PLACEHOLDER);
        let text_width = galley.size().x;
        let width = self.min_width.unwrap_or(0.0).max(text_width + 16.0);

        let (rect, response) = ui.allocate_exact_size(vec2(width, self.height), Sense::click());

        if ui.is_rect_visible(rect) {
            let bg_color = if self.selected {
                theme::ACCENT
            } else if response.hovered() {
                theme::HOVER_BG
            } else {
                theme::BUTTON_BG
            };
            let text_color = if self.selected { Color32::WHITE } else { theme::TEXT_MUTED };

            ui.painter()
                .rect_filled(rect, CornerRadius::same(sizing::CORNER_RADIUS), bg_color);
            ui.painter()
                .text(rect.center(), Align2::CENTER_CENTER, self.label, font_id, text_color);
        }

        let clicked = response.clicked();
        response.on_hover_cursor(CursorIcon::PointingHand);
        clicked
    }
}

/// A small square button with a text glyph (e.g. "+", "−").
pub struct TextButton<'a> {
    text: &'a str,
    tooltip: &'a str,
    enabled: bool,
}

impl<'a> TextButton<'a> {
    pub fn new(text: &'a str, tooltip: &'a str) -> Self {
        Self {
            text,
            tooltip,
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Show the button and return true if clicked while enabled.
    pub fn show(self, ui: &mut Ui) -> bool {
        let sense = if self.enabled { Sense::click() } else { Sense::hover() };
        let (rect, response) = ui.allocate_exact_size(vec2(sizing::MEDIUM, sizing::MEDIUM), sense);

        if ui.is_rect_visible(rect) {
            let bg_color = if self.enabled && response.hovered() {
                theme::HOVER_BG
            } else {
                Color32::TRANSPARENT
            };
            let text_color = if self.enabled { theme::TEXT } else { theme::BORDER };
            ui.painter()
                .rect_filled(rect, CornerRadius::same(sizing::CORNER_RADIUS), bg_color);
            ui.painter().text(
                rect.center(),
                Align2::CENTER_CENTER,
                self.text,
                egui::FontId::proportional(16.0),
                text_color,
            );
        }

        let clicked = self.enabled && response.clicked();
        response.on_hover_text(self.tooltip);
        clicked
    }
}
