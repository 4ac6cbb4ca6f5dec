//! Reusable egui widget components for the tabletop app.
//!
//! - **Buttons**: tool buttons, toggle buttons, small text buttons
//! - **Colors**: token color palette and swatches
//! - **Panels**: panel frames, list rows, toast frames
//! - **Layout**: section labels, separators, HP bars

pub mod buttons;
pub mod colors;
pub mod layout;
pub mod panels;

pub use buttons::{TextButton, ToggleButton, ToolButton};
pub use colors::{ColorSwatch, SwatchColor, TOKEN_COLORS};
pub use layout::{hp_bar, section_label, separator};
pub use panels::{ToastKind, list_row, panel_frame, toast_frame, toolbar_frame};

/// Standard sizing constants used across widgets.
pub mod sizing {
    /// Small button size (color swatches)
    pub const SMALL: f32 = 20.0;
    /// Medium button size (toolbar buttons)
    pub const MEDIUM: f32 = 28.0;
    /// Standard corner radius
    pub const CORNER_RADIUS: u8 = 4;
    /// Panel corner radius
    pub const PANEL_RADIUS: u8 = 8;
}

/// Standard colors used across widgets (dark table theme).
pub mod theme {
    use egui::Color32;

    /// Primary text
    pub const TEXT: Color32 = Color32::from_rgb(229, 231, 235);
    /// Muted text
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(156, 163, 175);
    /// Border color
    pub const BORDER: Color32 = Color32::from_rgb(55, 65, 81);
    /// Selection/active color (blue)
    pub const ACCENT: Color32 = Color32::from_rgb(59, 130, 246);
    /// Hover background
    pub const HOVER_BG: Color32 = Color32::from_rgb(55, 65, 81);
    /// Idle button background
    pub const BUTTON_BG: Color32 = Color32::from_rgb(31, 41, 55);
    /// Panel background
    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(17, 24, 39, 245);
    /// Healthy / informational
    pub const SUCCESS: Color32 = Color32::from_rgb(34, 197, 94);
    /// Bloodied
    pub const WARNING: Color32 = Color32::from_rgb(245, 158, 11);
    /// Critical / errors
    pub const DANGER: Color32 = Color32::from_rgb(239, 68, 68);
}
