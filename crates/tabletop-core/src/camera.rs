//! Camera module: pan/zoom transform between screen pixels and grid cells.

use crate::scene::{Cell, PrecisePoint};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Smallest zoom reachable from the wheel or buttons.
pub const MIN_ZOOM: f64 = 0.25;
/// Largest zoom reachable from the wheel or buttons.
pub const MAX_ZOOM: f64 = 3.0;
/// Zoom change per unit of wheel delta.
pub const WHEEL_ZOOM_FACTOR: f64 = 0.001;

/// Guards floor() against values like 4.999999999 produced by the
/// cell -> screen -> cell round trip.
const FLOOR_EPSILON: f64 = 1e-9;

/// Camera manages the view transform for the battle map.
///
/// Screen pixels map to cells through `cell_px = grid_size * zoom` and the
/// pan `offset`, which is expressed in screen pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom level.
    pub zoom: f64,
    /// Base cell size in pixels at zoom 1.
    pub grid_size: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            grid_size: crate::scene::DEFAULT_GRID_SIZE,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Camera for a given grid size, pan and zoom.
    pub fn with_view(grid_size: f64, offset: Vec2, zoom: f64) -> Self {
        Self {
            offset,
            zoom,
            grid_size,
            ..Self::default()
        }
    }

    /// Side length of one cell in screen pixels.
    pub fn cell_px(&self) -> f64 {
        self.grid_size * self.zoom
    }

    /// Integer cell under a screen point.
    pub fn screen_to_cell(&self, screen: Point) -> Cell {
        let precise = self.screen_to_precise(screen);
        Cell::new(
            (precise.x + FLOOR_EPSILON).floor() as i32,
            (precise.y + FLOOR_EPSILON).floor() as i32,
        )
    }

    /// Fractional cell position under a screen point.
    pub fn screen_to_precise(&self, screen: Point) -> PrecisePoint {
        let cell_px = self.cell_px();
        PrecisePoint::new(
            (screen.x - self.offset.x) / cell_px,
            (screen.y - self.offset.y) / cell_px,
        )
    }

    /// Screen position of a cell corner.
    pub fn cell_to_screen(&self, cell: Cell) -> Point {
        self.precise_to_screen(PrecisePoint::new(cell.x as f64, cell.y as f64))
    }

    /// Screen position of a fractional cell coordinate.
    pub fn precise_to_screen(&self, point: PrecisePoint) -> Point {
        let cell_px = self.cell_px();
        Point::new(
            point.x * cell_px + self.offset.x,
            point.y * cell_px + self.offset.y,
        )
    }

    /// Set the zoom, clamped to the allowed range.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    /// Apply a wheel delta: scrolling down zooms out.
    pub fn zoom_by_wheel(&mut self, delta_y: f64, factor: f64) {
        self.set_zoom(self.zoom - delta_y * factor);
    }

    /// Step the zoom by a fixed amount (positive zooms in).
    pub fn zoom_step(&mut self, step: f64) {
        self.set_zoom(self.zoom + step);
    }

    /// Set the pan offset in screen pixels.
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// Zoom as a whole percentage for the UI readout.
    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    /// Reset pan and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
        assert!((camera.cell_px() - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_cell_floors() {
        let camera = Camera::with_view(40.0, Vec2::new(10.0, 20.0), 1.0);
        assert_eq!(camera.screen_to_cell(Point::new(10.0, 20.0)), Cell::new(0, 0));
        assert_eq!(camera.screen_to_cell(Point::new(49.9, 59.9)), Cell::new(0, 0));
        assert_eq!(camera.screen_to_cell(Point::new(50.0, 60.0)), Cell::new(1, 1));
        assert_eq!(camera.screen_to_cell(Point::new(5.0, 0.0)), Cell::new(-1, -1));
    }

    #[test]
    fn test_screen_to_precise() {
        let camera = Camera::with_view(40.0, Vec2::ZERO, 2.0);
        let p = camera.screen_to_precise(Point::new(100.0, 40.0));
        assert!((p.x - 1.25).abs() < 1e-12);
        assert!((p.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cell_round_trip_across_zoom_and_pan() {
        let zooms = [0.25, 0.3, 0.5, 0.77, 1.0, 1.1, 1.5, 2.33, 3.0];
        let offsets = [
            Vec2::ZERO,
            Vec2::new(13.7, -42.1),
            Vec2::new(-250.3, 99.9),
            Vec2::new(0.1, 0.2),
        ];
        for &zoom in &zooms {
            for &offset in &offsets {
                let camera = Camera::with_view(40.0, offset, zoom);
                for x in -5..25 {
                    for y in -5..25 {
                        let cell = Cell::new(x, y);
                        assert_eq!(camera.screen_to_cell(camera.cell_to_screen(cell)), cell);
                    }
                }
            }
        }
    }

    #[test]
    fn test_token_corner_scenario() {
        let camera = Camera::with_view(40.0, Vec2::ZERO, 1.0);
        assert_eq!(camera.cell_to_screen(Cell::new(5, 5)), Point::new(200.0, 200.0));
    }

    #[test]
    fn test_wheel_zoom_clamped() {
        let mut camera = Camera::new();
        camera.zoom_by_wheel(100.0, WHEEL_ZOOM_FACTOR);
        assert!((camera.zoom - 0.9).abs() < 1e-12);

        camera.zoom_by_wheel(10_000.0, WHEEL_ZOOM_FACTOR);
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);

        camera.zoom_by_wheel(-10_000.0, WHEEL_ZOOM_FACTOR);
        assert!((camera.zoom - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_percent() {
        let mut camera = Camera::new();
        camera.zoom_step(0.5);
        assert_eq!(camera.zoom_percent(), 150);
    }
}
