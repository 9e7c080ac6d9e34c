//! Committed canvas objects.

use serde::{Deserialize, Serialize};

use crate::geometry::{
    BoundingBox, Point, distance_to_polyline, point_in_polygon, polygon_area,
};
use crate::model::ImageLayer;

/// Unique identifier for a canvas object.
pub type ObjectId = u64;

/// Minimum number of vertices required for a valid polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Minimum width and height for a committed rectangle.
pub const MIN_RECT_SIZE: f32 = 1.0;

/// Shape geometry of a canvas object (in scene coordinates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectShape {
    /// Freehand stroke along a centerline.
    Brush { points: Vec<Point>, width: f32 },
    /// Closed polygon.
    Polygon { vertices: Vec<Point> },
    /// Axis-aligned rectangle.
    Rectangle { bounds: BoundingBox },
    /// Freehand stroke that removes content drawn before it.
    Eraser { points: Vec<Point>, width: f32 },
    /// Raster image placed with its top-left corner at `(x, y)`.
    Image { layer: ImageLayer, x: f32, y: f32 },
}

impl ObjectShape {
    /// Category tag of the shape (`"brush"`, `"polygon"`, ...).
    pub fn category(&self) -> &'static str {
        match self {
            ObjectShape::Brush { .. } => "brush",
            ObjectShape::Polygon { .. } => "polygon",
            ObjectShape::Rectangle { .. } => "rectangle",
            ObjectShape::Eraser { .. } => "eraser",
            ObjectShape::Image { .. } => "image",
        }
    }

    /// Bounding box of the shape, including the stroke of freehand paths.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        match self {
            ObjectShape::Brush { points, width } | ObjectShape::Eraser { points, width } => {
                BoundingBox::from_points(points).map(|b| b.expand(width / 2.0))
            }
            ObjectShape::Polygon { vertices } => BoundingBox::from_points(vertices),
            ObjectShape::Rectangle { bounds } => Some(*bounds),
            ObjectShape::Image { layer, x, y } => Some(BoundingBox::new(
                *x,
                *y,
                layer.width as f32,
                layer.height as f32,
            )),
        }
    }

    /// Area covered by the shape, as reported in COCO exports.
    pub fn area(&self) -> f32 {
        match self {
            ObjectShape::Polygon { vertices } => polygon_area(vertices),
            other => other.bounding_box().map(|b| b.area()).unwrap_or(0.0),
        }
    }

    /// Move the shape by `(dx, dy)`.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            ObjectShape::Brush { points, .. } | ObjectShape::Eraser { points, .. } => {
                for p in points.iter_mut() {
                    *p = p.offset(dx, dy);
                }
            }
            ObjectShape::Polygon { vertices } => {
                for v in vertices.iter_mut() {
                    *v = v.offset(dx, dy);
                }
            }
            ObjectShape::Rectangle { bounds } => *bounds = bounds.translate(dx, dy),
            ObjectShape::Image { x, y, .. } => {
                *x += dx;
                *y += dy;
            }
        }
    }
}

/// A committed, class-labeled object on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasObject {
    pub id: ObjectId,
    pub shape: ObjectShape,
    /// Name of the class this object was drawn with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// `#rrggbb` stroke color
    pub stroke_color: String,
    pub stroke_width: f32,
    /// Whether closed shapes are filled with the stroke color at reduced alpha
    #[serde(default)]
    pub filled: bool,
}

impl CanvasObject {
    pub fn new(id: ObjectId, shape: ObjectShape, stroke_color: &str, stroke_width: f32) -> Self {
        Self {
            id,
            shape,
            class_name: None,
            stroke_color: stroke_color.to_string(),
            stroke_width,
            filled: false,
        }
    }

    pub fn with_class(mut self, class_name: Option<String>) -> Self {
        self.class_name = class_name;
        self
    }

    pub fn with_fill(mut self, filled: bool) -> Self {
        self.filled = filled;
        self
    }

    pub fn category(&self) -> &'static str {
        self.shape.category()
    }

    /// Tag combining category and id, e.g. `rectangle-3`.
    pub fn object_id(&self) -> String {
        format!("{}-{}", self.category(), self.id)
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.shape.bounding_box()
    }

    /// Whether the object is an eraser stroke.
    pub fn is_eraser(&self) -> bool {
        matches!(self.shape, ObjectShape::Eraser { .. })
    }

    /// Check if `point` picks this object. Eraser strokes are never picked.
    pub fn hit_test(&self, point: &Point, tolerance: f32) -> bool {
        match &self.shape {
            ObjectShape::Brush { points, width } => distance_to_polyline(point, points)
                .is_some_and(|d| d <= width / 2.0 + tolerance),
            ObjectShape::Polygon { vertices } => {
                point_in_polygon(vertices, point)
                    || BoundingBox::from_points(vertices).is_some_and(|b| {
                        // Pick the outline as well as the interior
                        b.expand(tolerance).contains(point)
                            && edges_distance(vertices, point) <= tolerance
                    })
            }
            ObjectShape::Rectangle { bounds } => bounds.expand(tolerance).contains(point),
            ObjectShape::Image { .. } => self
                .bounding_box()
                .is_some_and(|b| b.contains(point)),
            ObjectShape::Eraser { .. } => false,
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.shape.translate(dx, dy);
    }
}

/// Distance from `point` to the closed outline of a polygon.
fn edges_distance(vertices: &[Point], point: &Point) -> f32 {
    let mut closed = vertices.to_vec();
    if let Some(first) = vertices.first() {
        closed.push(*first);
    }
    distance_to_polyline(point, &closed).unwrap_or(f32::INFINITY)
}
