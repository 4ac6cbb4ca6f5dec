//! Pointer input events for the battle map.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Pointer event in canvas-local screen pixels.
///
/// An interaction is always `Down -> Move* -> (Up | Leave)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, button: MouseButton },
    Move { position: Point },
    Up { position: Point },
    /// The pointer left the canvas; ends the interaction like `Up`.
    Leave,
    /// Wheel scroll; only ever adjusts zoom.
    Wheel { delta_y: f64 },
}

impl PointerEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self::Down {
            position: Point::new(x, y),
            button: MouseButton::Left,
        }
    }

    pub fn middle_down(x: f64, y: f64) -> Self {
        Self::Down {
            position: Point::new(x, y),
            button: MouseButton::Middle,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::Move {
            position: Point::new(x, y),
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::Up {
            position: Point::new(x, y),
        }
    }

    /// Screen position carried by the event, if any.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Down { position, .. } | Self::Move { position } | Self::Up { position } => Some(*position),
            Self::Leave | Self::Wheel { .. } => None,
        }
    }

    /// Whether this event ends the current interaction.
    pub fn ends_interaction(&self) -> bool {
        matches!(self, Self::Up { .. } | Self::Leave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions() {
        assert_eq!(PointerEvent::down(1.0, 2.0).position(), Some(Point::new(1.0, 2.0)));
        assert_eq!(PointerEvent::Leave.position(), None);
        assert_eq!(PointerEvent::Wheel { delta_y: 3.0 }.position(), None);
    }

    #[test]
    fn test_ends_interaction() {
        assert!(PointerEvent::up(0.0, 0.0).ends_interaction());
        assert!(PointerEvent::Leave.ends_interaction());
        assert!(!PointerEvent::moved(0.0, 0.0).ends_interaction());
    }
}
