//! Path simplification for long freehand strokes.

use crate::scene::PrecisePoint;

/// Ramer-Douglas-Peucker line simplification.
///
/// Endpoints are always kept; `tolerance` is in cell units.
pub fn simplify(points: &[PrecisePoint], tolerance: f64) -> Vec<PrecisePoint> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let first = points[0];
    let last = points[points.len() - 1];

    let mut max_dist = 0.0;
    let mut max_index = 0;

    for (i, point) in points.iter().enumerate().skip(1).take(points.len() - 2) {
        let dist = perpendicular_distance(*point, first, last);
        if dist > max_dist {
            max_dist = dist;
            max_index = i;
        }
    }

    if max_dist > tolerance {
        let mut left = simplify(&points[..=max_index], tolerance);
        let right = simplify(&points[max_index..], tolerance);

        // The split point appears at the end of `left` and the start of `right`.
        left.pop();
        left.extend(right);
        left
    } else {
        vec![first, last]
    }
}

/// Simplify until at most `max` points remain.
///
/// The tolerance doubles on every pass that leaves too many points; a
/// stroke that still does not fit is decimated evenly, keeping both ends.
pub fn simplify_to_fit(points: &[PrecisePoint], tolerance: f64, max: usize) -> Vec<PrecisePoint> {
    let max = max.max(2);
    let mut tolerance = tolerance.max(f64::EPSILON);
    let mut simplified = simplify(points, tolerance);
    for _ in 0..MAX_PASSES {
        if simplified.len() <= max {
            return simplified;
        }
        tolerance *= 2.0;
        simplified = simplify(&simplified, tolerance);
    }
    if simplified.len() <= max {
        simplified
    } else {
        decimate(&simplified, max)
    }
}

const MAX_PASSES: usize = 32;

/// Pick `max` evenly spaced points, first and last included.
fn decimate(points: &[PrecisePoint], max: usize) -> Vec<PrecisePoint> {
    let last = points.len() - 1;
    (0..max).map(|i| points[i * last / (max - 1)]).collect()
}

/// Distance from `point` to the infinite line through `start` and `end`.
fn perpendicular_distance(point: PrecisePoint, start: PrecisePoint, end: PrecisePoint) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;

    let len_sq = dx * dx + dy * dy;
    if len_sq < f64::EPSILON {
        return point.distance(start);
    }

    let area2 = ((point.x - start.x) * dy - (point.y - start.y) * dx).abs();
    area2 / len_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> PrecisePoint {
        PrecisePoint::new(x, y)
    }

    #[test]
    fn test_collinear_points_collapse() {
        let points: Vec<_> = (0..50).map(|i| p(i as f64 * 0.1, 0.0)).collect();
        let simplified = simplify(&points, 0.01);
        assert_eq!(simplified, vec![points[0], points[49]]);
    }

    #[test]
    fn test_corner_is_kept() {
        let points = vec![p(0.0, 0.0), p(1.0, 0.0), p(2.0, 0.0), p(2.0, 1.0), p(2.0, 2.0)];
        let simplified = simplify(&points, 0.1);
        assert_eq!(simplified, vec![p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0)]);
    }

    #[test]
    fn test_fit_bounds_zigzag() {
        let points: Vec<_> = (0..400).map(|i| p(i as f64 * 0.025, if i % 2 == 0 { 0.0 } else { 1.0 })).collect();
        let fitted = simplify_to_fit(&points, 0.05, 16);
        assert!(fitted.len() <= 16, "{} points", fitted.len());
        assert_eq!(fitted.first(), points.first());
        assert_eq!(fitted.last(), points.last());
    }

    #[test]
    fn test_decimate_keeps_ends() {
        let points: Vec<_> = (0..10).map(|i| p(i as f64, 0.0)).collect();
        assert_eq!(decimate(&points, 4), vec![p(0.0, 0.0), p(3.0, 0.0), p(6.0, 0.0), p(9.0, 0.0)]);
    }

    #[test]
    fn test_short_paths_untouched() {
        let points = vec![p(0.0, 0.0), p(1.0, 1.0)];
        assert_eq!(simplify(&points, 10.0), points);
    }
}
