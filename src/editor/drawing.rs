//! Draw-mode gestures: freehand strokes, rectangles and polygons.

use serde::Serialize;

use crate::constants::POLYGON_STROKE_WIDTH;
use crate::geometry::{BoundingBox, Point};
use crate::model::{
    CanvasObject, DrawTool, MIN_POLYGON_VERTICES, MIN_RECT_SIZE, ObjectShape, ToolMode,
};

use super::Editor;

/// Pointer gesture in progress.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DrawingState {
    #[default]
    Idle,
    /// Brush or eraser stroke being drawn
    Stroke { tool: DrawTool, points: Vec<Point> },
    /// Rectangle being dragged out from `start`
    Rectangle { start: Point, current: Point },
    /// Viewport drag; `last` is in screen coordinates
    Panning { last: Point },
    /// Selection drag; `total` is the offset applied so far
    MovingSelection { last: Point, total: Point },
    /// Rubber-band selection
    Marquee {
        start: Point,
        current: Point,
        additive: bool,
    },
}

/// Geometry in progress, for a front end to draw on top of the objects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Preview {
    Stroke {
        tool: DrawTool,
        points: Vec<Point>,
        width: f32,
        color: String,
    },
    Rectangle {
        bounds: BoundingBox,
        width: f32,
        color: String,
    },
    /// Pending polygon plus the rubber-band edge to the pointer
    Polygon {
        vertices: Vec<Point>,
        hover: Option<Point>,
        /// Whether a click at `hover` would close the polygon
        closes: bool,
        color: String,
    },
    Marquee { bounds: BoundingBox },
}

impl Editor {
    pub(super) fn draw_down(&mut self, scene: Point) -> bool {
        match self.draw_tool {
            DrawTool::Brush | DrawTool::Eraser => {
                self.state = DrawingState::Stroke {
                    tool: self.draw_tool,
                    points: vec![scene],
                };
            }
            DrawTool::Rectangle => {
                self.state = DrawingState::Rectangle {
                    start: scene,
                    current: scene,
                };
            }
            DrawTool::Polygon => self.polygon_click(scene),
        }
        true
    }

    pub(super) fn draw_move(&mut self, scene: Point) -> bool {
        match &mut self.state {
            DrawingState::Stroke { points, .. } => {
                if points.last() != Some(&scene) {
                    points.push(scene);
                }
                true
            }
            DrawingState::Rectangle { current, .. } => {
                *current = scene;
                true
            }
            _ => false,
        }
    }

    pub(super) fn draw_up(&mut self, state: DrawingState, scene: Point) -> bool {
        match state {
            DrawingState::Stroke { tool, mut points } => {
                if points.last() != Some(&scene) {
                    points.push(scene);
                }
                self.commit_stroke(tool, points);
                true
            }
            DrawingState::Rectangle { start, .. } => {
                // Releasing always hands over to select mode
                self.mode = ToolMode::Select;
                let bounds = BoundingBox::from_corners(start, scene);
                if bounds.width < MIN_RECT_SIZE || bounds.height < MIN_RECT_SIZE {
                    log::debug!(
                        "Discarded degenerate rectangle {:.1}x{:.1}",
                        bounds.width,
                        bounds.height
                    );
                    return true;
                }
                let object = CanvasObject::new(
                    self.allocate_id(),
                    ObjectShape::Rectangle { bounds },
                    self.stroke_color(),
                    self.brush_size,
                )
                .with_class(self.selected_class_name())
                .with_fill(self.fill_shapes);
                self.commit_object(object);
                true
            }
            _ => false,
        }
    }

    fn commit_stroke(&mut self, tool: DrawTool, points: Vec<Point>) {
        let width = self.brush_size;
        let (shape, class_name) = match tool {
            DrawTool::Eraser => (ObjectShape::Eraser { points, width }, None),
            _ => (
                ObjectShape::Brush { points, width },
                self.selected_class_name(),
            ),
        };
        let object = CanvasObject::new(self.allocate_id(), shape, self.stroke_color(), width)
            .with_class(class_name);
        self.commit_object(object);
    }

    /// Add a vertex, or close the polygon when clicking near its first vertex.
    fn polygon_click(&mut self, scene: Point) {
        if self.closes_polygon(&scene) {
            let vertices = std::mem::take(&mut self.pending_polygon);
            let object = CanvasObject::new(
                self.allocate_id(),
                ObjectShape::Polygon { vertices },
                self.stroke_color(),
                POLYGON_STROKE_WIDTH,
            )
            .with_class(self.selected_class_name())
            .with_fill(true);
            self.commit_object(object);
            self.mode = ToolMode::Select;
            return;
        }

        self.pending_polygon.push(scene);
        log::debug!(
            "✏️ Added polygon point at ({:.1}, {:.1}), total: {}",
            scene.x,
            scene.y,
            self.pending_polygon.len()
        );
    }

    fn closes_polygon(&self, scene: &Point) -> bool {
        self.pending_polygon.len() >= MIN_POLYGON_VERTICES
            && self
                .pending_polygon
                .first()
                .is_some_and(|first| first.distance_to(scene) < self.close_threshold)
    }

    /// Shape in progress, if any.
    pub fn preview(&self) -> Option<Preview> {
        match &self.state {
            DrawingState::Stroke { tool, points } => Some(Preview::Stroke {
                tool: *tool,
                points: points.clone(),
                width: self.brush_size,
                color: self.stroke_color().to_string(),
            }),
            DrawingState::Rectangle { start, current } => Some(Preview::Rectangle {
                bounds: BoundingBox::from_corners(*start, *current),
                width: self.brush_size,
                color: self.stroke_color().to_string(),
            }),
            DrawingState::Marquee { start, current, .. } => Some(Preview::Marquee {
                bounds: BoundingBox::from_corners(*start, *current),
            }),
            _ if !self.pending_polygon.is_empty() => Some(Preview::Polygon {
                vertices: self.pending_polygon.clone(),
                hover: self.hover,
                closes: self.hover.is_some_and(|h| self.closes_polygon(&h)),
                color: self.stroke_color().to_string(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::Editor;
    use super::super::tests::{click, drag};
    use super::*;
    use crate::input::PointerEvent;

    fn polygon_editor() -> Editor {
        let mut editor = Editor::default();
        editor.set_draw_tool(DrawTool::Polygon);
        editor
    }

    #[test]
    fn test_brush_stroke_commits_on_release() {
        let mut editor = Editor::default();
        editor.handle_pointer(PointerEvent::down(10.0, 10.0));
        editor.handle_pointer(PointerEvent::moved(20.0, 10.0));
        editor.handle_pointer(PointerEvent::moved(20.0, 10.0));
        editor.handle_pointer(PointerEvent::moved(30.0, 15.0));
        assert!(editor.objects().is_empty());
        assert!(matches!(editor.preview(), Some(Preview::Stroke { .. })));

        editor.handle_pointer(PointerEvent::up(30.0, 15.0));
        assert_eq!(editor.objects().len(), 1);
        let obj = &editor.objects()[0];
        assert_eq!(obj.category(), "brush");
        assert_eq!(obj.stroke_width, 10.0);
        match &obj.shape {
            ObjectShape::Brush { points, .. } => assert_eq!(points.len(), 3),
            other => panic!("unexpected shape {:?}", other),
        }
        assert_eq!(editor.mode(), ToolMode::Draw);
        assert_eq!(editor.preview(), None);
    }

    #[test]
    fn test_click_makes_dot() {
        let mut editor = Editor::default();
        click(&mut editor, 5.0, 5.0);
        match &editor.objects()[0].shape {
            ObjectShape::Brush { points, .. } => assert_eq!(points, &vec![Point::new(5.0, 5.0)]),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_eraser_stroke_has_no_class() {
        let mut editor = Editor::default();
        editor.add_class("road", "#ff0000").unwrap();
        editor.select_class("road");
        editor.set_draw_tool(DrawTool::Eraser);
        drag(&mut editor, (0.0, 0.0), (50.0, 0.0));
        let obj = &editor.objects()[0];
        assert!(obj.is_eraser());
        assert_eq!(obj.class_name, None);
    }

    #[test]
    fn test_rectangle_commit_switches_to_select() {
        let mut editor = Editor::default();
        editor.add_class("car", "#00ff00").unwrap();
        editor.select_class("car");
        editor.set_fill_shapes(true);
        editor.set_draw_tool(DrawTool::Rectangle);

        drag(&mut editor, (100.0, 80.0), (40.0, 20.0));
        assert_eq!(editor.objects().len(), 1);
        let obj = &editor.objects()[0];
        assert_eq!(obj.bounding_box().unwrap().to_xywh(), [40.0, 20.0, 60.0, 60.0]);
        assert_eq!(obj.class_name.as_deref(), Some("car"));
        assert_eq!(obj.stroke_color, "#00ff00");
        assert!(obj.filled);
        assert_eq!(editor.mode(), ToolMode::Select);
    }

    #[test]
    fn test_degenerate_rectangle_discarded() {
        let mut editor = Editor::default();
        editor.set_draw_tool(DrawTool::Rectangle);
        drag(&mut editor, (10.0, 10.0), (10.5, 60.0));
        assert!(editor.objects().is_empty());
        assert!(!editor.can_undo());
        assert_eq!(editor.mode(), ToolMode::Select);
    }

    #[test]
    fn test_polygon_closes_near_first_vertex() {
        let mut editor = polygon_editor();
        click(&mut editor, 0.0, 0.0);
        click(&mut editor, 100.0, 0.0);
        click(&mut editor, 100.0, 100.0);
        assert_eq!(editor.pending_polygon().len(), 3);
        assert!(editor.objects().is_empty());

        click(&mut editor, 4.0, 3.0);
        assert!(editor.pending_polygon().is_empty());
        assert_eq!(editor.mode(), ToolMode::Select);

        let obj = &editor.objects()[0];
        assert_eq!(obj.category(), "polygon");
        assert_eq!(obj.stroke_width, POLYGON_STROKE_WIDTH);
        assert!(obj.filled);
        match &obj.shape {
            ObjectShape::Polygon { vertices } => assert_eq!(vertices.len(), 3),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_polygon_needs_three_vertices_to_close() {
        let mut editor = polygon_editor();
        click(&mut editor, 0.0, 0.0);
        click(&mut editor, 50.0, 0.0);
        // Near the first vertex but only two placed: adds a vertex instead
        click(&mut editor, 2.0, 2.0);
        assert_eq!(editor.pending_polygon().len(), 3);
        assert!(editor.objects().is_empty());
    }

    #[test]
    fn test_polygon_click_just_outside_threshold() {
        let mut editor = polygon_editor();
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)] {
            click(&mut editor, x, y);
        }
        click(&mut editor, 10.0, 0.0);
        assert_eq!(editor.pending_polygon().len(), 4);
        assert!(editor.objects().is_empty());
    }

    #[test]
    fn test_polygon_preview_tracks_hover() {
        let mut editor = polygon_editor();
        for (x, y) in [(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)] {
            click(&mut editor, x, y);
        }
        editor.handle_pointer(PointerEvent::moved(3.0, 3.0));
        match editor.preview() {
            Some(Preview::Polygon {
                vertices,
                hover,
                closes,
                ..
            }) => {
                assert_eq!(vertices.len(), 3);
                assert_eq!(hover, Some(Point::new(3.0, 3.0)));
                assert!(closes);
            }
            other => panic!("unexpected preview {:?}", other),
        }
    }

    #[test]
    fn test_pending_polygon_survives_pan() {
        let mut editor = polygon_editor();
        click(&mut editor, 0.0, 0.0);
        click(&mut editor, 100.0, 0.0);

        editor.set_mode(ToolMode::Pan);
        drag(&mut editor, (0.0, 0.0), (50.0, 50.0));
        assert_eq!(editor.pending_polygon().len(), 2);

        editor.set_mode(ToolMode::Draw);
        // Screen (150, 150) is scene (100, 100) after the pan
        click(&mut editor, 150.0, 150.0);
        click(&mut editor, 52.0, 51.0);
        assert_eq!(editor.objects().len(), 1);
        assert_eq!(editor.viewport().pan_x, 50.0);
    }

    #[test]
    fn test_switching_tool_discards_polygon() {
        let mut editor = polygon_editor();
        click(&mut editor, 0.0, 0.0);
        click(&mut editor, 100.0, 0.0);
        editor.set_draw_tool(DrawTool::Rectangle);
        assert!(editor.pending_polygon().is_empty());

        let mut editor = polygon_editor();
        click(&mut editor, 0.0, 0.0);
        editor.set_mode(ToolMode::Select);
        assert!(editor.pending_polygon().is_empty());
    }

    #[test]
    fn test_mode_switch_drops_unfinished_stroke() {
        let mut editor = Editor::default();
        editor.handle_pointer(PointerEvent::down(0.0, 0.0));
        editor.handle_pointer(PointerEvent::moved(40.0, 0.0));
        editor.set_mode(ToolMode::Pan);
        editor.handle_pointer(PointerEvent::up(40.0, 0.0));
        assert!(editor.objects().is_empty());
        assert_eq!(editor.state(), &DrawingState::Idle);
    }
}
