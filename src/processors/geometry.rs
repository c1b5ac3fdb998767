//! Geometric utilities for text region processing.
//!
//! This module provides the 2D primitives the region decoder and rectifier
//! operate on: floating-point points, oriented rectangles (center, size,
//! rotation angle) with corner extraction in a fixed traversal order, point
//! clamping to image bounds for reporting, and minimum-area enclosing
//! rectangle fitting over a pixel set via convex hull and rotating calipers.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// A 2D point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X-coordinate of the point.
    pub x: f32,
    /// Y-coordinate of the point.
    pub y: f32,
}

impl Point {
    /// Creates a new point with the given coordinates.
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Clamps the point to integer image coordinates in
    /// `[0, width - 1] x [0, height - 1]`.
    pub fn clamp_to_image(&self, width: u32, height: u32) -> (i32, i32) {
        let max_x = width.saturating_sub(1) as i32;
        let max_y = height.saturating_sub(1) as i32;
        (
            (self.x as i32).clamp(0, max_x),
            (self.y as i32).clamp(0, max_y),
        )
    }
}

/// An oriented rectangle: center, width, height, and rotation angle in
/// degrees.
///
/// Regions produced by the decoder are expressed in original-image pixel
/// coordinates. A zero-size rectangle is the sentinel for "treat the whole
/// frame as one candidate"; callers must special-case zero-area regions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrientedRect {
    /// The center point of the rectangle.
    pub center: Point,
    /// The width of the rectangle.
    pub width: f32,
    /// The height of the rectangle.
    pub height: f32,
    /// The rotation angle of the rectangle in degrees.
    pub angle: f32,
}

impl OrientedRect {
    /// Creates a new oriented rectangle.
    pub fn new(center: Point, width: f32, height: f32, angle: f32) -> Self {
        Self {
            center,
            width,
            height,
            angle,
        }
    }

    /// The zero-size whole-frame sentinel used when no detector is active.
    pub fn sentinel() -> Self {
        Self::new(Point::new(0.0, 0.0), 0.0, 0.0, 0.0)
    }

    /// The area of the rectangle.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Returns true if the rectangle collapses to zero area.
    pub fn is_degenerate(&self) -> bool {
        self.area() <= f32::EPSILON
    }

    /// The 4 corner points in fixed traversal order: the rectangle's local
    /// top-left, top-right, bottom-right, bottom-left corners, rotated by the
    /// rectangle angle. For positive-area rectangles the corners are distinct
    /// and form a non-degenerate quadrilateral.
    pub fn corner_points(&self) -> [Point; 4] {
        let cos_a = (self.angle * PI / 180.0).cos();
        let sin_a = (self.angle * PI / 180.0).sin();

        let w_2 = self.width / 2.0;
        let h_2 = self.height / 2.0;

        let local = [(-w_2, -h_2), (w_2, -h_2), (w_2, h_2), (-w_2, h_2)];

        local.map(|(x, y)| {
            Point::new(
                x * cos_a - y * sin_a + self.center.x,
                x * sin_a + y * cos_a + self.center.y,
            )
        })
    }

    /// Computes the minimum-area oriented rectangle enclosing the given
    /// points, using rotating calipers over the convex hull.
    ///
    /// A hull that collapses to a point or a segment yields a zero-area
    /// rectangle along it, which the decoder drops as degenerate.
    pub fn enclosing(points: &[Point]) -> Self {
        let hull = convex_hull(points);
        if hull.len() < 3 {
            return Self::segment_bounds(&hull);
        }

        let mut min_area = f32::MAX;
        let mut min_rect = Self::new(Point::new(0.0, 0.0), 0.0, 0.0, 0.0);

        let n = hull.len();
        for i in 0..n {
            let j = (i + 1) % n;

            let edge_x = hull[j].x - hull[i].x;
            let edge_y = hull[j].y - hull[i].y;
            let edge_length = (edge_x * edge_x + edge_y * edge_y).sqrt();
            if edge_length < f32::EPSILON {
                continue;
            }

            // Edge direction and its perpendicular.
            let nx = edge_x / edge_length;
            let ny = edge_y / edge_length;
            let px = -ny;
            let py = nx;

            let mut min_n = f32::MAX;
            let mut max_n = f32::MIN;
            let mut min_p = f32::MAX;
            let mut max_p = f32::MIN;

            for point in &hull {
                let proj_n = nx * (point.x - hull[i].x) + ny * (point.y - hull[i].y);
                min_n = min_n.min(proj_n);
                max_n = max_n.max(proj_n);

                let proj_p = px * (point.x - hull[i].x) + py * (point.y - hull[i].y);
                min_p = min_p.min(proj_p);
                max_p = max_p.max(proj_p);
            }

            let width = max_n - min_n;
            let height = max_p - min_p;
            let area = width * height;

            if area < min_area {
                min_area = area;

                let center_n = (min_n + max_n) / 2.0;
                let center_p = (min_p + max_p) / 2.0;

                min_rect = Self::new(
                    Point::new(
                        hull[i].x + center_n * nx + center_p * px,
                        hull[i].y + center_n * ny + center_p * py,
                    ),
                    width,
                    height,
                    f32::atan2(ny, nx) * 180.0 / PI,
                );
            }
        }

        min_rect
    }

    /// Zero-area fit for a degenerate hull (at most 2 points): the segment
    /// between the extreme points, with zero height.
    fn segment_bounds(hull: &[Point]) -> Self {
        let Some((first, rest)) = hull.split_first() else {
            return Self::new(Point::new(0.0, 0.0), 0.0, 0.0, 0.0);
        };
        let last = rest.last().unwrap_or(first);

        let dx = last.x - first.x;
        let dy = last.y - first.y;

        Self::new(
            Point::new((first.x + last.x) / 2.0, (first.y + last.y) / 2.0),
            (dx * dx + dy * dy).sqrt(),
            0.0,
            f32::atan2(dy, dx) * 180.0 / PI,
        )
    }
}

/// Cross product of the vectors `p1 -> p2` and `p1 -> p3`. Positive for a
/// counter-clockwise turn, negative for clockwise, zero for collinear.
fn cross_product(p1: &Point, p2: &Point, p3: &Point) -> f32 {
    (p2.x - p1.x) * (p3.y - p1.y) - (p2.y - p1.y) * (p3.x - p1.x)
}

/// Computes the convex hull of a point set using Graham's scan.
fn convex_hull(points: &[Point]) -> Vec<Point> {
    if points.len() < 3 {
        return points.to_vec();
    }

    let mut points = points.to_vec();

    // Start from the lowest point, leftmost on ties.
    let mut start_idx = 0;
    for i in 1..points.len() {
        if points[i].y < points[start_idx].y
            || (points[i].y == points[start_idx].y && points[i].x < points[start_idx].x)
        {
            start_idx = i;
        }
    }
    points.swap(0, start_idx);
    let start_point = points[0];

    points[1..].sort_by(|a, b| {
        let cross = cross_product(&start_point, a, b);
        if cross == 0.0 {
            // Collinear: closer to the start point first.
            let dist_a = (a.x - start_point.x).powi(2) + (a.y - start_point.y).powi(2);
            let dist_b = (b.x - start_point.x).powi(2) + (b.y - start_point.y).powi(2);
            dist_a
                .partial_cmp(&dist_b)
                .unwrap_or(std::cmp::Ordering::Equal)
        } else if cross > 0.0 {
            std::cmp::Ordering::Less
        } else {
            std::cmp::Ordering::Greater
        }
    });

    let mut hull: Vec<Point> = Vec::new();
    for point in points {
        while hull.len() > 1
            && cross_product(&hull[hull.len() - 2], &hull[hull.len() - 1], &point) <= 0.0
        {
            hull.pop();
        }
        hull.push(point);
    }

    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f32, b: f32) {
        assert!((a - b).abs() < 1e-3, "{a} != {b}");
    }

    #[test]
    fn test_corner_points_axis_aligned() {
        let rect = OrientedRect::new(Point::new(5.0, 3.0), 8.0, 4.0, 0.0);
        let corners = rect.corner_points();

        assert_close(corners[0].x, 1.0);
        assert_close(corners[0].y, 1.0);
        assert_close(corners[1].x, 9.0);
        assert_close(corners[1].y, 1.0);
        assert_close(corners[2].x, 9.0);
        assert_close(corners[2].y, 5.0);
        assert_close(corners[3].x, 1.0);
        assert_close(corners[3].y, 5.0);
    }

    #[test]
    fn test_corner_points_rotated_are_distinct() {
        let rect = OrientedRect::new(Point::new(0.0, 0.0), 10.0, 2.0, 30.0);
        let corners = rect.corner_points();
        for i in 0..4 {
            for j in (i + 1)..4 {
                assert!(corners[i] != corners[j]);
            }
        }
    }

    #[test]
    fn test_enclosing_axis_aligned_pixels() {
        let points: Vec<Point> = (0..4)
            .flat_map(|y| (0..10).map(move |x| Point::new(x as f32, y as f32)))
            .collect();

        let rect = OrientedRect::enclosing(&points);
        assert_close(rect.area(), 27.0);
        assert_close(rect.center.x, 4.5);
        assert_close(rect.center.y, 1.5);
    }

    #[test]
    fn test_enclosing_diagonal_line_is_degenerate() {
        let points: Vec<Point> = (0..5).map(|i| Point::new(i as f32, i as f32)).collect();
        let rect = OrientedRect::enclosing(&points);
        assert!(rect.is_degenerate());
    }

    #[test]
    fn test_enclosing_rotated_rectangle() {
        // Corners of a 45-degree square with diagonal 2 around the origin.
        let points = [
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(-1.0, 0.0),
            Point::new(0.0, -1.0),
        ];
        let rect = OrientedRect::enclosing(&points);
        assert_close(rect.area(), 2.0);
        assert_close(rect.center.x, 0.0);
        assert_close(rect.center.y, 0.0);
    }

    #[test]
    fn test_clamp_to_image() {
        assert_eq!(Point::new(-3.0, 7.5).clamp_to_image(10, 5), (0, 4));
        assert_eq!(Point::new(12.0, 2.0).clamp_to_image(10, 5), (9, 2));
        assert_eq!(Point::new(4.0, 4.0).clamp_to_image(10, 5), (4, 4));
    }

    #[test]
    fn test_sentinel_is_degenerate() {
        assert!(OrientedRect::sentinel().is_degenerate());
    }
}
