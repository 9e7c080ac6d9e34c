//! Core geometry types.
//!
//! All coordinates are scene coordinates (canvas pixels before the viewport
//! transform is applied).

use serde::{Deserialize, Serialize};

/// A 2D point in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Return this point moved by `(dx, dy)`.
    pub fn offset(&self, dx: f32, dy: f32) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Top-left corner X coordinate
    pub x: f32,
    /// Top-left corner Y coordinate
    pub y: f32,
    /// Width of the box
    pub width: f32,
    /// Height of the box
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a bounding box from two corner points.
    pub fn from_corners(p1: Point, p2: Point) -> Self {
        let x = p1.x.min(p2.x);
        let y = p1.y.min(p2.y);
        let width = (p1.x - p2.x).abs();
        let height = (p1.y - p2.y).abs();
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest box containing all points, or `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut min_x = first.x;
        let mut min_y = first.y;
        let mut max_x = first.x;
        let mut max_y = first.y;

        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Check if a point is inside the box (edges included).
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Check whether two boxes overlap (touching edges count).
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }

    /// Get the area of the box.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Grow the box by `margin` on every side.
    pub fn expand(&self, margin: f32) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    pub fn translate(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Get the top-left corner.
    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Get the bottom-right corner.
    pub fn bottom_right(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Corners in clockwise order starting at the top-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x, self.y),
            Point::new(self.x + self.width, self.y),
            Point::new(self.x + self.width, self.y + self.height),
            Point::new(self.x, self.y + self.height),
        ]
    }

    /// COCO-style `[x, y, width, height]` array.
    pub fn to_xywh(&self) -> [f32; 4] {
        [self.x, self.y, self.width, self.height]
    }
}

/// Calculate the area of a polygon using the shoelace formula.
pub fn polygon_area(vertices: &[Point]) -> f32 {
    if vertices.len() < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    let n = vertices.len();
    for i in 0..n {
        let j = (i + 1) % n;
        area += vertices[i].x * vertices[j].y;
        area -= vertices[j].x * vertices[i].y;
    }
    (area / 2.0).abs()
}

/// Bounding box of a polygon's vertices. `None` for fewer than 3 vertices.
pub fn polygon_bbox(vertices: &[Point]) -> Option<BoundingBox> {
    if vertices.len() < 3 {
        return None;
    }
    BoundingBox::from_points(vertices)
}

/// Check if a point is inside a closed polygon (ray casting algorithm).
pub fn point_in_polygon(vertices: &[Point], point: &Point) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let n = vertices.len();

    let mut j = n - 1;
    for i in 0..n {
        let vi = &vertices[i];
        let vj = &vertices[j];

        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Shortest distance from `point` to the segment `a`-`b`.
pub fn distance_to_segment(point: &Point, a: &Point, b: &Point) -> f32 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len_sq = abx * abx + aby * aby;
    if len_sq == 0.0 {
        return point.distance_to(a);
    }

    let t = (((point.x - a.x) * abx + (point.y - a.y) * aby) / len_sq).clamp(0.0, 1.0);
    point.distance_to(&Point::new(a.x + t * abx, a.y + t * aby))
}

/// Shortest distance from `point` to an open polyline.
///
/// A single-point polyline degenerates to the distance to that point.
pub fn distance_to_polyline(point: &Point, polyline: &[Point]) -> Option<f32> {
    match polyline {
        [] => None,
        [only] => Some(point.distance_to(only)),
        _ => polyline
            .windows(2)
            .map(|w| distance_to_segment(point, &w[0], &w[1]))
            .reduce(f32::min),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_bbox() {
        let triangle = [
            Point::new(10.0, 10.0),
            Point::new(60.0, 10.0),
            Point::new(35.0, 50.0),
        ];
        assert_eq!(
            polygon_bbox(&triangle),
            Some(BoundingBox::new(10.0, 10.0, 50.0, 40.0))
        );
        assert_eq!(polygon_bbox(&triangle[..2]), None);
    }

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance_to(&p2) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_bounding_box_from_corners() {
        let bbox = BoundingBox::from_corners(Point::new(10.0, 20.0), Point::new(50.0, 80.0));
        assert_eq!(bbox, BoundingBox::new(10.0, 20.0, 40.0, 60.0));

        // Dragging up and to the left yields the same box
        let bbox2 = BoundingBox::from_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        assert_eq!(bbox, bbox2);
    }

    #[test]
    fn test_bounding_box_from_points() {
        let points = [
            Point::new(100.0, 150.0),
            Point::new(300.0, 150.0),
            Point::new(350.0, 250.0),
            Point::new(50.0, 400.0),
        ];
        let bbox = BoundingBox::from_points(&points).unwrap();
        assert_eq!(bbox.to_xywh(), [50.0, 150.0, 300.0, 250.0]);
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounding_box_intersects() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&BoundingBox::new(5.0, 5.0, 10.0, 10.0)));
        assert!(a.intersects(&BoundingBox::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&BoundingBox::new(11.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_polygon_area() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        assert!((polygon_area(&square) - 1.0).abs() < 0.001);

        let triangle = [
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(1.0, 2.0),
        ];
        assert!((polygon_area(&triangle) - 2.0).abs() < 0.001);
        assert_eq!(polygon_area(&triangle[..2]), 0.0);
    }

    #[test]
    fn test_point_in_polygon() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 100.0),
            Point::new(0.0, 100.0),
        ];
        assert!(point_in_polygon(&square, &Point::new(50.0, 50.0)));
        assert!(!point_in_polygon(&square, &Point::new(150.0, 50.0)));
    }

    #[test]
    fn test_distance_to_polyline() {
        let line = [Point::new(0.0, 0.0), Point::new(10.0, 0.0)];
        let d = distance_to_polyline(&Point::new(5.0, 3.0), &line).unwrap();
        assert!((d - 3.0).abs() < 0.001);

        // Past the end of the segment the distance is to the endpoint
        let d = distance_to_polyline(&Point::new(13.0, 4.0), &line).unwrap();
        assert!((d - 5.0).abs() < 0.001);

        assert!(distance_to_polyline(&Point::new(0.0, 0.0), &[]).is_none());
    }
}
