//! Keyboard shortcut registry and dispatch.

use crate::ui::UiAction;
use egui::Key;
use tabletop_core::ToolKind;

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, description: &'static str) -> Self {
        Self { key, description }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        let mut shortcuts: Vec<Shortcut> = ToolKind::ALL
            .iter()
            .map(|tool| Shortcut::new(tool.shortcut(), tool.label()))
            .collect();
        shortcuts.extend([
            Shortcut::new("+", "Zoom in"),
            Shortcut::new("-", "Zoom out"),
            Shortcut::new("0", "Reset view"),
            Shortcut::new("G", "Toggle grid"),
            Shortcut::new("F", "Toggle fog"),
            Shortcut::new("Escape", "Clear selection"),
        ]);
        shortcuts
    }

    /// Print all shortcuts to the log.
    pub fn log_all() {
        for shortcut in Self::all() {
            log::info!("  {:8} {}", shortcut.key, shortcut.description);
        }
    }

    /// Action bound to `key`, if any.
    pub fn action_for(key: Key) -> Option<UiAction> {
        let tool = match key {
            Key::Num1 => Some(ToolKind::Select),
            Key::Num2 => Some(ToolKind::Pan),
            Key::Num3 => Some(ToolKind::Rectangle),
            Key::Num4 => Some(ToolKind::Circle),
            Key::Num5 => Some(ToolKind::Freehand),
            Key::Num6 => Some(ToolKind::Fog),
            Key::Num7 => Some(ToolKind::Erase),
            _ => None,
        };
        if let Some(tool) = tool {
            return Some(UiAction::SetTool(tool));
        }
        match key {
            Key::Plus | Key::Equals => Some(UiAction::ZoomIn),
            Key::Minus => Some(UiAction::ZoomOut),
            Key::Num0 => Some(UiAction::ResetView),
            Key::G => Some(UiAction::ToggleGrid),
            Key::F => Some(UiAction::ToggleFog),
            Key::Escape => Some(UiAction::SelectToken(None)),
            _ => None,
        }
    }

    /// Actions for the keys pressed this frame. Ignored while a text field
    /// has focus.
    pub fn collect(ctx: &egui::Context) -> Vec<UiAction> {
        if ctx.wants_keyboard_input() {
            return Vec::new();
        }
        ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        repeat: false,
                        modifiers,
                        ..
                    } if modifiers.is_none() || *modifiers == egui::Modifiers::SHIFT => Self::action_for(*key),
                    _ => None,
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_keys_select_tools_in_palette_order() {
        let keys = [Key::Num1, Key::Num2, Key::Num3, Key::Num4, Key::Num5, Key::Num6, Key::Num7];
        for (key, tool) in keys.into_iter().zip(ToolKind::ALL) {
            assert_eq!(ShortcutRegistry::action_for(key), Some(UiAction::SetTool(tool)));
        }
    }

    #[test]
    fn test_registry_lists_tool_shortcuts() {
        let all = ShortcutRegistry::all();
        assert_eq!(all[0].key, "1");
        assert_eq!(all[6].key, "7");
        assert_eq!(all[6].description, "Erase");
    }

    #[test]
    fn test_unbound_key() {
        assert_eq!(ShortcutRegistry::action_for(Key::Q), None);
    }
}
