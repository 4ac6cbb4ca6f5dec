//! Tool system for the battle map.
//!
//! Interaction is modelled as a single [`InteractionState`] and a pure
//! [`transition`] function: `(state, event) -> (state, effects)`. The
//! controller owns the state and applies the returned [`Effect`]s.

mod simplify;

pub use simplify::{simplify, simplify_to_fit};

use crate::camera::Camera;
use crate::input::{MouseButton, PointerEvent};
use crate::scene::{Cell, Drawing, DrawingId, DrawingKind, PrecisePoint, Scene, TokenId};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Default tolerance (cells) used when only a point cap is configured.
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.05;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Rectangle,
    Circle,
    Freehand,
    Fog,
    Erase,
}

impl ToolKind {
    /// Palette order.
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Select,
        ToolKind::Pan,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Freehand,
        ToolKind::Fog,
        ToolKind::Erase,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Pan => "Move",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Freehand => "Draw",
            ToolKind::Fog => "Reveal fog",
            ToolKind::Erase => "Erase",
        }
    }

    /// Keyboard shortcut shown in the palette.
    pub fn shortcut(self) -> &'static str {
        match self {
            ToolKind::Select => "1",
            ToolKind::Pan => "2",
            ToolKind::Rectangle => "3",
            ToolKind::Circle => "4",
            ToolKind::Freehand => "5",
            ToolKind::Fog => "6",
            ToolKind::Erase => "7",
        }
    }

    /// Drawing kind produced by this tool, if it draws.
    pub fn drawing_kind(self) -> Option<DrawingKind> {
        match self {
            ToolKind::Rectangle => Some(DrawingKind::Rectangle),
            ToolKind::Circle => Some(DrawingKind::Circle),
            ToolKind::Freehand => Some(DrawingKind::Freehand),
            ToolKind::Select | ToolKind::Pan | ToolKind::Fog | ToolKind::Erase => None,
        }
    }
}

/// Style applied to new drawings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawStyle {
    pub color: String,
    pub line_width: f64,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            color: "#facc15".to_string(),
            line_width: 3.0,
        }
    }
}

/// Limits applied to freehand strokes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FreehandLimits {
    /// Simplify the in-progress stroke once it holds more points than this.
    pub max_points: Option<usize>,
    /// Simplify committed strokes with this tolerance (cells).
    pub tolerance: Option<f64>,
}

/// Transient state of the current pointer interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    /// `anchor` is cursor minus pan offset at press time.
    Panning { anchor: Vec2 },
    DraggingToken {
        token_id: TokenId,
        origin: Cell,
        current: Cell,
    },
    /// For rectangles and circles `points` is `[anchor]` or `[anchor, current]`.
    Drawing {
        kind: DrawingKind,
        points: Vec<PrecisePoint>,
    },
}

/// Live preview of an in-progress drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preview<'a> {
    Rectangle { anchor: PrecisePoint, current: PrecisePoint },
    Circle { center: PrecisePoint, edge: PrecisePoint },
    Freehand(&'a [PrecisePoint]),
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Preview to draw for the current state, if any.
    pub fn preview(&self) -> Option<Preview<'_>> {
        let InteractionState::Drawing { kind, points } = self else {
            return None;
        };
        match (kind, points.as_slice()) {
            (DrawingKind::Rectangle, [anchor, current]) => Some(Preview::Rectangle {
                anchor: *anchor,
                current: *current,
            }),
            (DrawingKind::Circle, [center, edge]) => Some(Preview::Circle {
                center: *center,
                edge: *edge,
            }),
            (DrawingKind::Freehand, points) if !points.is_empty() => Some(Preview::Freehand(points)),
            _ => None,
        }
    }
}

/// What the controller must do as a result of a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Change the selected token (`None` clears it).
    Select(Option<TokenId>),
    /// Move a token locally for drag feedback; not persisted.
    MoveTokenLocal { token_id: TokenId, cell: Cell },
    /// Persist the final position of a dragged token.
    CommitTokenMove { token_id: TokenId, cell: Cell },
    /// Set the pan offset (visual only).
    SetPan(Vec2),
    AddDrawing(Drawing),
    RevealCell(Cell),
    EraseDrawing(DrawingId),
}

/// Read-only inputs of a transition.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
    pub tool: ToolKind,
    pub camera: &'a Camera,
    pub scene: Option<&'a Scene>,
    pub style: &'a DrawStyle,
    /// Erase hits drawings with a point closer than this (cells).
    pub erase_radius: f64,
    pub freehand: FreehandLimits,
}

/// Advance the interaction by one pointer event.
pub fn transition(
    state: InteractionState,
    event: &PointerEvent,
    ctx: &ToolContext<'_>,
) -> (InteractionState, Vec<Effect>) {
    match event {
        PointerEvent::Down { position, button } => {
            if !state.is_idle() {
                return (state, Vec::new());
            }
            begin(*position, *button, ctx)
        }
        PointerEvent::Move { position } => update(state, *position, ctx),
        PointerEvent::Up { .. } | PointerEvent::Leave => (InteractionState::Idle, commit(state, ctx)),
        PointerEvent::Wheel { .. } => (state, Vec::new()),
    }
}

fn pan_anchor(position: Point, camera: &Camera) -> InteractionState {
    InteractionState::Panning {
        anchor: position.to_vec2() - camera.offset,
    }
}

fn begin(position: Point, button: MouseButton, ctx: &ToolContext<'_>) -> (InteractionState, Vec<Effect>) {
    match button {
        MouseButton::Middle => return (pan_anchor(position, ctx.camera), Vec::new()),
        MouseButton::Right => return (InteractionState::Idle, Vec::new()),
        MouseButton::Left => {}
    }

    if ctx.tool == ToolKind::Pan {
        return (pan_anchor(position, ctx.camera), Vec::new());
    }

    let Some(scene) = ctx.scene else {
        return (InteractionState::Idle, Vec::new());
    };

    match ctx.tool {
        ToolKind::Select => {
            let cell = ctx.camera.screen_to_cell(position);
            match scene.token_at(cell) {
                Some(token) => {
                    let origin = Cell::new(token.x, token.y);
                    (
                        InteractionState::DraggingToken {
                            token_id: token.id.clone(),
                            origin,
                            current: origin,
                        },
                        vec![Effect::Select(Some(token.id.clone()))],
                    )
                }
                None => (InteractionState::Idle, vec![Effect::Select(None)]),
            }
        }
        ToolKind::Rectangle | ToolKind::Circle | ToolKind::Freehand => {
            let kind = ctx.tool.drawing_kind().unwrap_or(DrawingKind::Freehand);
            let anchor = ctx.camera.screen_to_precise(position);
            (
                InteractionState::Drawing {
                    kind,
                    points: vec![anchor],
                },
                Vec::new(),
            )
        }
        ToolKind::Fog => {
            let cell = ctx.camera.screen_to_cell(position);
            (InteractionState::Idle, vec![Effect::RevealCell(cell)])
        }
        ToolKind::Erase => {
            let point = ctx.camera.screen_to_precise(position);
            let effects = nearest_drawing(&scene.drawings, point)
                .filter(|(_, distance)| *distance < ctx.erase_radius)
                .map(|(index, _)| vec![Effect::EraseDrawing(scene.drawings[index].id.clone())])
                .unwrap_or_default();
            (InteractionState::Idle, effects)
        }
        ToolKind::Pan => (pan_anchor(position, ctx.camera), Vec::new()),
    }
}

fn update(state: InteractionState, position: Point, ctx: &ToolContext<'_>) -> (InteractionState, Vec<Effect>) {
    match state {
        InteractionState::Idle => (InteractionState::Idle, Vec::new()),
        InteractionState::Panning { anchor } => {
            let offset = position.to_vec2() - anchor;
            (InteractionState::Panning { anchor }, vec![Effect::SetPan(offset)])
        }
        InteractionState::DraggingToken {
            token_id,
            origin,
            current,
        } => {
            let cell = ctx.camera.screen_to_cell(position);
            let effects = if cell != current {
                vec![Effect::MoveTokenLocal {
                    token_id: token_id.clone(),
                    cell,
                }]
            } else {
                Vec::new()
            };
            (
                InteractionState::DraggingToken {
                    token_id,
                    origin,
                    current: cell,
                },
                effects,
            )
        }
        InteractionState::Drawing { kind, mut points } => {
            let point = ctx.camera.screen_to_precise(position);
            match kind {
                DrawingKind::Rectangle | DrawingKind::Circle => {
                    points.truncate(1);
                    points.push(point);
                }
                DrawingKind::Freehand => {
                    points.push(point);
                    if let Some(max) = ctx.freehand.max_points {
                        if points.len() > max {
                            let tolerance = ctx.freehand.tolerance.unwrap_or(DEFAULT_SIMPLIFY_TOLERANCE);
                            points = simplify_to_fit(&points, tolerance, max);
                        }
                    }
                }
            }
            (InteractionState::Drawing { kind, points }, Vec::new())
        }
    }
}

fn commit(state: InteractionState, ctx: &ToolContext<'_>) -> Vec<Effect> {
    match state {
        InteractionState::Idle | InteractionState::Panning { .. } => Vec::new(),
        InteractionState::DraggingToken {
            token_id,
            origin,
            current,
        } => {
            if current == origin {
                return Vec::new();
            }
            vec![Effect::CommitTokenMove { token_id, cell: current }]
        }
        InteractionState::Drawing { kind, mut points } => {
            if kind == DrawingKind::Freehand {
                if let Some(tolerance) = ctx.freehand.tolerance {
                    points = simplify(&points, tolerance);
                }
            }
            let drawing = Drawing::new(kind, points, ctx.style.color.clone(), ctx.style.line_width);
            if drawing.is_persistable() {
                vec![Effect::AddDrawing(drawing)]
            } else {
                Vec::new()
            }
        }
    }
}

/// Index of the drawing with the point nearest to `point`, and that distance.
/// Ties go to the drawing encountered first.
pub fn nearest_drawing(drawings: &[Drawing], point: PrecisePoint) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (index, drawing) in drawings.iter().enumerate() {
        let Some(distance) = drawing.nearest_distance(point) else {
            continue;
        };
        if best.is_none_or(|(_, d)| distance < d) {
            best = Some((index, distance));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{SceneInit, Token, TokenInit};

    fn scene_with_goblin() -> Scene {
        let mut scene = Scene::new("s".into(), "c", SceneInit::new("Map", 10, 10));
        scene
            .tokens
            .push(Token::from_init("goblin".into(), TokenInit::new("Goblin", 5, 5)));
        scene
    }

    fn run(
        tool: ToolKind,
        scene: &Scene,
        camera: &Camera,
        events: &[PointerEvent],
    ) -> (InteractionState, Vec<Effect>) {
        let style = DrawStyle::default();
        let ctx = ToolContext {
            tool,
            camera,
            scene: Some(scene),
            style: &style,
            erase_radius: 3.0,
            freehand: FreehandLimits::default(),
        };
        let mut state = InteractionState::Idle;
        let mut all = Vec::new();
        for event in events {
            let (next, effects) = transition(state, event, &ctx);
            state = next;
            all.extend(effects);
        }
        (state, all)
    }

    #[test]
    fn test_select_hit_starts_drag() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        let (state, effects) = run(ToolKind::Select, &scene, &camera, &[PointerEvent::down(200.0, 200.0)]);
        assert_eq!(effects, vec![Effect::Select(Some("goblin".into()))]);
        assert!(matches!(state, InteractionState::DraggingToken { .. }));
    }

    #[test]
    fn test_select_one_cell_outside_misses() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        for (x, y) in [(160.0, 200.0), (240.0, 200.0), (200.0, 160.0), (200.0, 240.0)] {
            let (state, effects) = run(ToolKind::Select, &scene, &camera, &[PointerEvent::down(x, y)]);
            assert_eq!(effects, vec![Effect::Select(None)]);
            assert!(state.is_idle());
        }
    }

    #[test]
    fn test_drag_snaps_and_commits() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        let (state, effects) = run(
            ToolKind::Select,
            &scene,
            &camera,
            &[
                PointerEvent::down(210.0, 210.0),
                PointerEvent::moved(250.0, 215.0),
                PointerEvent::moved(255.0, 219.0),
                PointerEvent::moved(290.0, 300.0),
                PointerEvent::up(290.0, 300.0),
            ],
        );
        assert!(state.is_idle());
        assert_eq!(
            effects,
            vec![
                Effect::Select(Some("goblin".into())),
                Effect::MoveTokenLocal {
                    token_id: "goblin".into(),
                    cell: Cell::new(6, 5)
                },
                Effect::MoveTokenLocal {
                    token_id: "goblin".into(),
                    cell: Cell::new(7, 7)
                },
                Effect::CommitTokenMove {
                    token_id: "goblin".into(),
                    cell: Cell::new(7, 7)
                },
            ]
        );
    }

    #[test]
    fn test_click_without_move_does_not_commit() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        let (_, effects) = run(
            ToolKind::Select,
            &scene,
            &camera,
            &[PointerEvent::down(210.0, 210.0), PointerEvent::up(210.0, 210.0)],
        );
        assert_eq!(effects, vec![Effect::Select(Some("goblin".into()))]);
    }

    #[test]
    fn test_pan_follows_cursor() {
        let scene = scene_with_goblin();
        let mut camera = Camera::new();
        camera.offset = Vec2::new(10.0, 10.0);
        let (state, effects) = run(
            ToolKind::Pan,
            &scene,
            &camera,
            &[PointerEvent::down(100.0, 100.0), PointerEvent::moved(130.0, 80.0)],
        );
        assert_eq!(effects, vec![Effect::SetPan(Vec2::new(40.0, -10.0))]);
        assert!(matches!(state, InteractionState::Panning { .. }));
    }

    #[test]
    fn test_middle_button_pans_with_any_tool() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        let (_, effects) = run(
            ToolKind::Freehand,
            &scene,
            &camera,
            &[
                PointerEvent::middle_down(0.0, 0.0),
                PointerEvent::moved(5.0, 6.0),
                PointerEvent::up(5.0, 6.0),
            ],
        );
        assert_eq!(effects, vec![Effect::SetPan(Vec2::new(5.0, 6.0))]);
    }

    #[test]
    fn test_rectangle_commit() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        let (_, effects) = run(
            ToolKind::Rectangle,
            &scene,
            &camera,
            &[
                PointerEvent::down(80.0, 80.0),
                PointerEvent::moved(150.0, 140.0),
                PointerEvent::moved(200.0, 160.0),
                PointerEvent::up(200.0, 160.0),
            ],
        );
        let [Effect::AddDrawing(drawing)] = effects.as_slice() else {
            panic!("expected one drawing, got {effects:?}");
        };
        assert_eq!(drawing.kind, DrawingKind::Rectangle);
        assert_eq!(drawing.points, vec![PrecisePoint::new(2.0, 2.0), PrecisePoint::new(5.0, 4.0)]);
    }

    #[test]
    fn test_shape_without_move_is_dropped() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        for tool in [ToolKind::Rectangle, ToolKind::Circle] {
            let (_, effects) = run(
                tool,
                &scene,
                &camera,
                &[PointerEvent::down(80.0, 80.0), PointerEvent::up(80.0, 80.0)],
            );
            assert!(effects.is_empty(), "{tool:?} persisted a degenerate shape");
        }
    }

    #[test]
    fn test_circle_commit_radius_in_cells() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        let (state, effects) = run(
            ToolKind::Circle,
            &scene,
            &camera,
            &[
                PointerEvent::down(0.0, 0.0),
                PointerEvent::moved(120.0, 0.0),
                PointerEvent::up(120.0, 0.0),
            ],
        );
        assert!(state.is_idle());
        let [Effect::AddDrawing(drawing)] = effects.as_slice() else {
            panic!("expected one drawing, got {effects:?}");
        };
        assert_eq!(drawing.kind, DrawingKind::Circle);
        assert_eq!(drawing.points, vec![PrecisePoint::new(0.0, 0.0), PrecisePoint::new(3.0, 0.0)]);
        assert_eq!(drawing.radius(), Some(3.0));
    }

    #[test]
    fn test_preview_tracks_current_point() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        let (state, _) = run(
            ToolKind::Circle,
            &scene,
            &camera,
            &[PointerEvent::down(0.0, 0.0), PointerEvent::moved(120.0, 0.0)],
        );
        assert_eq!(
            state.preview(),
            Some(Preview::Circle {
                center: PrecisePoint::new(0.0, 0.0),
                edge: PrecisePoint::new(3.0, 0.0)
            })
        );
    }

    #[test]
    fn test_freehand_accumulates_every_move() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        let mut events = vec![PointerEvent::down(0.0, 0.0)];
        events.extend((1..=10).map(|i| PointerEvent::moved(i as f64, 0.0)));
        events.push(PointerEvent::Leave);
        let (state, effects) = run(ToolKind::Freehand, &scene, &camera, &events);
        assert!(state.is_idle());
        let [Effect::AddDrawing(drawing)] = effects.as_slice() else {
            panic!("expected one drawing, got {effects:?}");
        };
        assert_eq!(drawing.kind, DrawingKind::Freehand);
        assert_eq!(drawing.points.len(), 11);
    }

    #[test]
    fn test_freehand_single_point_not_persisted() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        let (_, effects) = run(
            ToolKind::Freehand,
            &scene,
            &camera,
            &[PointerEvent::down(0.0, 0.0), PointerEvent::up(0.0, 0.0)],
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn test_freehand_point_cap_simplifies() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        let style = DrawStyle::default();
        let ctx = ToolContext {
            tool: ToolKind::Freehand,
            camera: &camera,
            scene: Some(&scene),
            style: &style,
            erase_radius: 3.0,
            freehand: FreehandLimits {
                max_points: Some(16),
                tolerance: None,
            },
        };
        let (mut state, _) = transition(InteractionState::Idle, &PointerEvent::down(0.0, 0.0), &ctx);
        for i in 1..200 {
            state = transition(state, &PointerEvent::moved(i as f64, 0.0), &ctx).0;
        }
        let InteractionState::Drawing { points, .. } = &state else {
            panic!("expected drawing state");
        };
        assert!(points.len() <= 16);
    }

    #[test]
    fn test_freehand_point_cap_bounds_zigzag() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        let style = DrawStyle::default();
        let ctx = ToolContext {
            tool: ToolKind::Freehand,
            camera: &camera,
            scene: Some(&scene),
            style: &style,
            erase_radius: 3.0,
            freehand: FreehandLimits {
                max_points: Some(16),
                tolerance: None,
            },
        };
        let (mut state, _) = transition(InteractionState::Idle, &PointerEvent::down(0.0, 0.0), &ctx);
        for i in 1..=400 {
            let y = if i % 2 == 0 { 0.0 } else { 40.0 };
            state = transition(state, &PointerEvent::moved(i as f64, y), &ctx).0;
            let InteractionState::Drawing { points, .. } = &state else {
                panic!("expected drawing state");
            };
            assert!(points.len() <= 16, "{} points after move {i}", points.len());
        }
    }

    #[test]
    fn test_fog_reveals_clicked_cell() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        let (state, effects) = run(ToolKind::Fog, &scene, &camera, &[PointerEvent::down(85.0, 130.0)]);
        assert_eq!(effects, vec![Effect::RevealCell(Cell::new(2, 3))]);
        assert!(state.is_idle());
    }

    #[test]
    fn test_erase_respects_radius() {
        let mut scene = scene_with_goblin();
        let far = Drawing::new(
            DrawingKind::Freehand,
            vec![PrecisePoint::new(3.0, 0.0), PrecisePoint::new(4.0, 0.0)],
            "#fff",
            2.0,
        );
        scene.drawings.push(far.clone());
        let camera = Camera::new();

        // Nearest point is exactly 3 cells away.
        let (_, effects) = run(ToolKind::Erase, &scene, &camera, &[PointerEvent::down(0.0, 0.0)]);
        assert!(effects.is_empty());

        // 2.9 cells away.
        let (_, effects) = run(ToolKind::Erase, &scene, &camera, &[PointerEvent::down(4.0, 0.0)]);
        assert_eq!(effects, vec![Effect::EraseDrawing(far.id)]);
    }

    #[test]
    fn test_erase_tie_goes_to_first_drawing() {
        let mut scene = scene_with_goblin();
        let points = vec![PrecisePoint::new(1.0, 1.0), PrecisePoint::new(2.0, 2.0)];
        let first = Drawing::new(DrawingKind::Freehand, points.clone(), "#fff", 2.0);
        let second = Drawing::new(DrawingKind::Freehand, points, "#000", 2.0);
        scene.drawings.push(first.clone());
        scene.drawings.push(second);
        assert_eq!(nearest_drawing(&scene.drawings, PrecisePoint::new(1.0, 1.5)).map(|(i, _)| i), Some(0));
        let camera = Camera::new();
        let (_, effects) = run(ToolKind::Erase, &scene, &camera, &[PointerEvent::down(40.0, 60.0)]);
        assert_eq!(effects, vec![Effect::EraseDrawing(first.id)]);
    }

    #[test]
    fn test_leave_clears_any_state() {
        let scene = scene_with_goblin();
        let camera = Camera::new();
        for tool in ToolKind::ALL {
            let (state, _) = run(
                tool,
                &scene,
                &camera,
                &[PointerEvent::down(210.0, 210.0), PointerEvent::moved(300.0, 300.0), PointerEvent::Leave],
            );
            assert!(state.is_idle(), "{tool:?} left state behind");
        }
    }
}
