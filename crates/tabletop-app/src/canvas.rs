//! Translate egui pointer input into canvas-local [`PointerEvent`]s.

use egui::{Event, PointerButton, Pos2, Rect};
use kurbo::Point;
use tabletop_core::{MouseButton, PointerEvent};

/// Tracks whether the pointer is over the canvas between frames, so leaving
/// it can be reported once.
#[derive(Debug, Default)]
pub struct CanvasInput {
    inside: bool,
}

impl CanvasInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map one frame's raw events. `over_canvas` is false while an overlay
    /// window or panel covers the pointer; presses there are not forwarded.
    pub fn translate(&mut self, events: &[Event], canvas: Rect, over_canvas: bool) -> Vec<PointerEvent> {
        let mut out = Vec::new();
        for event in events {
            match event {
                Event::PointerMoved(pos) => {
                    if canvas.contains(*pos) {
                        self.inside = true;
                        out.push(PointerEvent::Move {
                            position: local(*pos, canvas),
                        });
                    } else if self.inside {
                        self.inside = false;
                        out.push(PointerEvent::Leave);
                    }
                }
                Event::PointerButton {
                    pos, button, pressed, ..
                } => {
                    if *pressed {
                        let Some(button) = map_button(*button) else {
                            continue;
                        };
                        if over_canvas && canvas.contains(*pos) {
                            self.inside = true;
                            out.push(PointerEvent::Down {
                                position: local(*pos, canvas),
                                button,
                            });
                        }
                    } else if self.inside {
                        out.push(PointerEvent::Up {
                            position: local(*pos, canvas),
                        });
                    }
                }
                Event::PointerGone => {
                    if self.inside {
                        self.inside = false;
                        out.push(PointerEvent::Leave);
                    }
                }
                _ => {}
            }
        }
        out
    }
}

/// Wheel input in DOM convention (positive scrolls down, zooming out).
pub fn wheel_event(scroll_delta: egui::Vec2, over_canvas: bool) -> Option<PointerEvent> {
    if !over_canvas || scroll_delta.y == 0.0 {
        return None;
    }
    Some(PointerEvent::Wheel {
        delta_y: -f64::from(scroll_delta.y),
    })
}

fn local(pos: Pos2, canvas: Rect) -> Point {
    Point::new(f64::from(pos.x - canvas.min.x), f64::from(pos.y - canvas.min.y))
}

fn map_button(button: PointerButton) -> Option<MouseButton> {
    match button {
        PointerButton::Primary => Some(MouseButton::Left),
        PointerButton::Secondary => Some(MouseButton::Right),
        PointerButton::Middle => Some(MouseButton::Middle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Modifiers, pos2, vec2};

    fn canvas() -> Rect {
        Rect::from_min_size(pos2(100.0, 50.0), vec2(800.0, 600.0))
    }

    fn button(x: f32, y: f32, pressed: bool) -> Event {
        Event::PointerButton {
            pos: pos2(x, y),
            button: PointerButton::Primary,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn test_positions_are_canvas_local() {
        let mut input = CanvasInput::new();
        let events = input.translate(&[button(180.0, 130.0, true)], canvas(), true);
        assert_eq!(events, vec![PointerEvent::down(80.0, 80.0)]);
    }

    #[test]
    fn test_press_over_overlay_ignored() {
        let mut input = CanvasInput::new();
        assert!(input.translate(&[button(180.0, 130.0, true)], canvas(), false).is_empty());
    }

    #[test]
    fn test_leaving_canvas_reports_leave_once() {
        let mut input = CanvasInput::new();
        let events = input.translate(
            &[
                Event::PointerMoved(pos2(200.0, 100.0)),
                Event::PointerMoved(pos2(10.0, 10.0)),
                Event::PointerMoved(pos2(5.0, 10.0)),
            ],
            canvas(),
            true,
        );
        assert_eq!(events, vec![PointerEvent::moved(100.0, 50.0), PointerEvent::Leave]);
    }

    #[test]
    fn test_release_outside_after_leave_not_forwarded() {
        let mut input = CanvasInput::new();
        let events = input.translate(
            &[
                button(150.0, 100.0, true),
                Event::PointerMoved(pos2(10.0, 10.0)),
                button(10.0, 10.0, false),
            ],
            canvas(),
            true,
        );
        assert_eq!(events, vec![PointerEvent::down(50.0, 50.0), PointerEvent::Leave]);
    }

    #[test]
    fn test_wheel_direction() {
        assert_eq!(
            wheel_event(vec2(0.0, -100.0), true),
            Some(PointerEvent::Wheel { delta_y: 100.0 })
        );
        assert_eq!(wheel_event(vec2(0.0, 40.0), false), None);
        assert_eq!(wheel_event(vec2(10.0, 0.0), true), None);
    }
}
