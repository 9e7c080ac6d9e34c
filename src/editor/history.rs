//! Undo/redo on the editor.

use crate::model::{DrawTool, ToolMode};
use crate::undo::{redo_command, undo_command};

use super::Editor;

impl Editor {
    /// Whether undo would remove a pending polygon vertex rather than
    /// reverse a command.
    fn undo_pops_vertex(&self) -> bool {
        self.mode == ToolMode::Draw
            && self.draw_tool == DrawTool::Polygon
            && !self.pending_polygon.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.undo_pops_vertex() || self.undo_stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_stack.can_redo()
    }

    /// Undo the last step. While a polygon is being built this removes its
    /// last vertex; otherwise the last command is reversed.
    pub fn undo(&mut self) -> bool {
        if self.undo_pops_vertex() {
            self.pending_polygon.pop();
            log::debug!(
                "⏪ Removed polygon vertex, {} left",
                self.pending_polygon.len()
            );
            return true;
        }

        self.end_gesture();
        let done = undo_command(
            &mut self.undo_stack,
            &mut self.objects,
            &mut self.background_color,
        );
        self.prune_selection();
        done
    }

    /// Redo the last undone command.
    pub fn redo(&mut self) -> bool {
        self.end_gesture();
        let done = redo_command(
            &mut self.undo_stack,
            &mut self.objects,
            &mut self.background_color,
        );
        self.prune_selection();
        done
    }
}
