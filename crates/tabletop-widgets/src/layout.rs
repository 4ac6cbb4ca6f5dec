//! Layout helpers: separators, section labels, HP bars.

use egui::{CornerRadius, Rect, Sense, Stroke, Ui, vec2};

use crate::theme;

/// Draw a horizontal separator line.
pub fn separator(ui: &mut Ui) {
    let rect = ui.available_rect_before_wrap();
    let y = rect.top() + 4.0;
    ui.painter().line_segment(
        [egui::Pos2::new(rect.left(), y), egui::Pos2::new(rect.right(), y)],
        Stroke::new(1.0, theme::BORDER),
    );
    ui.add_space(8.0);
}

/// Draw a section label (small, muted text).
pub fn section_label(ui: &mut Ui, text: &str) {
    ui.label(egui::RichText::new(text).size(10.0).color(theme::TEXT_MUTED));
}

/// Horizontal HP bar filled to `ratio`, colored like the map overlay.
pub fn hp_bar(ui: &mut Ui, ratio: f32) {
    let ratio = ratio.clamp(0.0, 1.0);
    let (rect, _) = ui.allocate_exact_size(vec2(ui.available_width(), 6.0), Sense::hover());
    if !ui.is_rect_visible(rect) {
        return;
    }
    let radius = CornerRadius::same(3);
    ui.painter().rect_filled(rect, radius, theme::BUTTON_BG);
    let color = if ratio > 0.5 {
        theme::SUCCESS
    } else if ratio > 0.25 {
        theme::WARNING
    } else {
        theme::DANGER
    };
    let filled = Rect::from_min_size(rect.min, vec2(rect.width() * ratio, rect.height()));
    ui.painter().rect_filled(filled, radius, color);
}
