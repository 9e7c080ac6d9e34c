//! Select mode: picking, dragging and marquee selection.

use crate::constants::HIT_TOLERANCE;
use crate::geometry::{BoundingBox, Point};
use crate::model::{MIN_RECT_SIZE, ObjectId};
use crate::undo::Command;

use super::{DrawingState, Editor};

impl Editor {
    /// Top-most object under a scene point. The pick tolerance is a fixed
    /// number of screen pixels, so it shrinks in scene units as zoom grows.
    pub fn hit_test(&self, scene: &Point) -> Option<ObjectId> {
        let tolerance = HIT_TOLERANCE / self.viewport.zoom;
        self.objects
            .iter()
            .rev()
            .find(|o| o.hit_test(scene, tolerance))
            .map(|o| o.id)
    }

    pub fn is_selected(&self, id: ObjectId) -> bool {
        self.selection.contains(&id)
    }

    /// Replace the selection. Unknown ids and eraser strokes are ignored.
    pub fn set_selection(&mut self, ids: &[ObjectId]) {
        self.end_gesture();
        self.selection = self
            .objects
            .iter()
            .filter(|o| !o.is_eraser() && ids.contains(&o.id))
            .map(|o| o.id)
            .collect();
    }

    /// Select every selectable object. Returns the number selected.
    pub fn select_all(&mut self) -> usize {
        self.end_gesture();
        self.selection = self
            .objects
            .iter()
            .filter(|o| !o.is_eraser())
            .map(|o| o.id)
            .collect();
        log::debug!("🔍 Selected all {} objects", self.selection.len());
        self.selection.len()
    }

    pub fn deselect_all(&mut self) {
        self.end_gesture();
        self.selection.clear();
    }

    pub(super) fn select_down(&mut self, scene: Point, shift: bool) -> bool {
        match self.hit_test(&scene) {
            Some(id) if shift && self.is_selected(id) => {
                self.selection.retain(|s| *s != id);
                log::debug!("🔍 Deselected object {}", id);
            }
            Some(id) => {
                if shift {
                    self.selection.push(id);
                } else if !self.is_selected(id) {
                    self.selection = vec![id];
                }
                log::debug!("🔍 Selected object {}", id);
                self.state = DrawingState::MovingSelection {
                    last: scene,
                    total: Point::new(0.0, 0.0),
                };
            }
            None => {
                if !shift {
                    self.selection.clear();
                }
                self.state = DrawingState::Marquee {
                    start: scene,
                    current: scene,
                    additive: shift,
                };
            }
        }
        true
    }

    pub(super) fn select_move(&mut self, scene: Point) -> bool {
        match &mut self.state {
            DrawingState::MovingSelection { last, total } => {
                let (dx, dy) = (scene.x - last.x, scene.y - last.y);
                *last = scene;
                *total = total.offset(dx, dy);
                self.translate_selection(dx, dy);
                true
            }
            DrawingState::Marquee { current, .. } => {
                *current = scene;
                true
            }
            _ => false,
        }
    }

    pub(super) fn select_up(&mut self, state: DrawingState, scene: Point) -> bool {
        match state {
            DrawingState::MovingSelection { last, total } => {
                let total = total.offset(scene.x - last.x, scene.y - last.y);
                self.translate_selection(scene.x - last.x, scene.y - last.y);
                self.record_move(total);
                true
            }
            DrawingState::Marquee {
                start, additive, ..
            } => {
                let area = BoundingBox::from_corners(start, scene);
                if area.width < MIN_RECT_SIZE && area.height < MIN_RECT_SIZE {
                    return true;
                }
                let hits: Vec<ObjectId> = self
                    .objects
                    .iter()
                    .filter(|o| !o.is_eraser())
                    .filter(|o| o.bounding_box().is_some_and(|b| b.intersects(&area)))
                    .map(|o| o.id)
                    .collect();
                if !additive {
                    self.selection.clear();
                }
                for id in hits {
                    if !self.selection.contains(&id) {
                        self.selection.push(id);
                    }
                }
                log::debug!("🔍 Marquee selected {} objects", self.selection.len());
                true
            }
            _ => false,
        }
    }

    pub(super) fn translate_selection(&mut self, dx: f32, dy: f32) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let selection = &self.selection;
        for object in self
            .objects
            .iter_mut()
            .filter(|o| selection.contains(&o.id))
        {
            object.translate(dx, dy);
        }
    }

    /// Record a finished select-drag as one undoable move.
    pub(super) fn record_move(&mut self, total: Point) {
        if (total.x == 0.0 && total.y == 0.0) || self.selection.is_empty() {
            return;
        }
        self.undo_stack.push(Command::MoveObjects {
            ids: self.selection.clone(),
            dx: total.x,
            dy: total.y,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{click, drag};
    use super::*;
    use crate::input::{Modifiers, PointerEvent};
    use crate::model::{DrawTool, ToolMode};

    /// Editor in select mode with two rectangles: ids 1 at (0,0) and 2 at (100,0).
    fn two_rects() -> Editor {
        let mut editor = Editor::default();
        editor.set_draw_tool(DrawTool::Rectangle);
        drag(&mut editor, (0.0, 0.0), (50.0, 50.0));
        editor.set_draw_tool(DrawTool::Rectangle);
        drag(&mut editor, (100.0, 0.0), (150.0, 50.0));
        assert_eq!(editor.mode(), ToolMode::Select);
        editor
    }

    fn shift_click(editor: &mut Editor, x: f32, y: f32) {
        editor.handle_pointer(PointerEvent::down(x, y).with_modifiers(Modifiers::shift()));
        editor.handle_pointer(PointerEvent::up(x, y).with_modifiers(Modifiers::shift()));
    }

    #[test]
    fn test_click_selects_top_most() {
        let mut editor = two_rects();
        click(&mut editor, 25.0, 25.0);
        assert_eq!(editor.selection(), &[1]);
        click(&mut editor, 125.0, 25.0);
        assert_eq!(editor.selection(), &[2]);
    }

    #[test]
    fn test_shift_toggles_selection() {
        let mut editor = two_rects();
        shift_click(&mut editor, 25.0, 25.0);
        shift_click(&mut editor, 125.0, 25.0);
        assert_eq!(editor.selection(), &[1, 2]);
        shift_click(&mut editor, 25.0, 25.0);
        assert_eq!(editor.selection(), &[2]);
    }

    #[test]
    fn test_click_on_empty_space_deselects() {
        let mut editor = two_rects();
        editor.select_all();
        click(&mut editor, 300.0, 300.0);
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_drag_moves_selection_with_single_undo() {
        let mut editor = two_rects();
        let before = editor.undo_stack().undo_count();

        editor.handle_pointer(PointerEvent::down(25.0, 25.0));
        editor.handle_pointer(PointerEvent::moved(30.0, 30.0));
        editor.handle_pointer(PointerEvent::moved(35.0, 45.0));
        editor.handle_pointer(PointerEvent::up(35.0, 45.0));

        let moved = editor.object(1).unwrap().bounding_box().unwrap();
        assert_eq!(moved.top_left(), Point::new(10.0, 20.0));
        assert_eq!(editor.undo_stack().undo_count(), before + 1);

        editor.undo();
        let back = editor.object(1).unwrap().bounding_box().unwrap();
        assert_eq!(back.top_left(), Point::new(0.0, 0.0));
    }

    #[test]
    fn test_click_without_drag_records_nothing() {
        let mut editor = two_rects();
        let before = editor.undo_stack().undo_count();
        click(&mut editor, 25.0, 25.0);
        assert_eq!(editor.undo_stack().undo_count(), before);
    }

    #[test]
    fn test_marquee_selects_intersecting() {
        let mut editor = two_rects();
        drag(&mut editor, (40.0, 60.0), (110.0, 40.0));
        assert_eq!(editor.selection(), &[1, 2]);

        drag(&mut editor, (-10.0, -10.0), (10.0, 10.0));
        assert_eq!(editor.selection(), &[1]);
    }

    #[test]
    fn test_hit_tolerance_scales_with_zoom() {
        let mut editor = two_rects();
        // 3 scene units outside rect 1
        assert_eq!(editor.hit_test(&Point::new(53.0, 25.0)), Some(1));
        editor.set_zoom(2.0);
        assert_eq!(editor.hit_test(&Point::new(53.0, 25.0)), None);
    }

    #[test]
    fn test_select_all_skips_erasers() {
        let mut editor = two_rects();
        editor.set_draw_tool(DrawTool::Eraser);
        drag(&mut editor, (0.0, 0.0), (20.0, 20.0));
        assert_eq!(editor.select_all(), 2);
    }
}
