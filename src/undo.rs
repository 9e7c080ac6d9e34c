//! Undo/Redo system for canvas operations.
//!
//! This module implements the Command pattern to enable undo/redo functionality
//! for canvas edits. Each undoable action is represented as a Command that
//! stores enough information to reverse itself against the object list.

use crate::constants::{DEFAULT_BACKGROUND_COLOR, DEFAULT_MAX_HISTORY};
use crate::model::{CanvasObject, ObjectId};

// ============================================================================
// Command Types
// ============================================================================

/// A command that can be undone and redone.
#[derive(Debug, Clone)]
pub enum Command {
    /// Objects were inserted (draw commit, paste, duplicate, image placement)
    AddObjects {
        /// Z-order index and object, in ascending index order
        entries: Vec<(usize, CanvasObject)>,
    },
    /// Objects were removed (delete, cut)
    RemoveObjects {
        /// Z-order index each object had before removal, ascending
        entries: Vec<(usize, CanvasObject)>,
    },
    /// Objects were translated by a select-drag
    MoveObjects {
        ids: Vec<ObjectId>,
        dx: f32,
        dy: f32,
    },
    /// Objects were assigned a different class
    Relabel { changes: Vec<LabelChange> },
    /// The canvas was cleared
    Clear {
        /// Every object on the canvas before clearing
        objects: Vec<CanvasObject>,
        /// Background color before clearing
        background_color: String,
    },
}

/// Class and stroke color of one object before and after a relabel.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelChange {
    pub id: ObjectId,
    pub old_class: Option<String>,
    pub new_class: Option<String>,
    pub old_color: String,
    pub new_color: String,
}

impl Command {
    /// Get a human-readable description of this command
    pub fn description(&self) -> String {
        match self {
            Command::AddObjects { entries } if entries.len() == 1 => {
                format!("Add {}", entries[0].1.category())
            }
            Command::AddObjects { entries } => format!("Add {} objects", entries.len()),
            Command::RemoveObjects { entries } => format!("Delete {} objects", entries.len()),
            Command::MoveObjects { ids, .. } => format!("Move {} objects", ids.len()),
            Command::Relabel { changes } => format!("Change class of {} objects", changes.len()),
            Command::Clear { objects, .. } => format!("Clear {} objects", objects.len()),
        }
    }
}

// ============================================================================
// Undo Stack
// ============================================================================

/// Configuration for the undo stack
#[derive(Debug, Clone)]
pub struct UndoConfig {
    /// Maximum number of commands to keep in history
    pub max_history: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

/// The undo/redo history stack.
///
/// Maintains two stacks:
/// - `undo_stack`: Commands that can be undone (most recent at the end)
/// - `redo_stack`: Commands that can be redone (most recent at the end)
///
/// When a new command is recorded, it's pushed to undo_stack and redo_stack is cleared.
/// When undo is called, the command is moved from undo_stack to redo_stack.
/// When redo is called, the command is moved from redo_stack to undo_stack.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    undo_stack: Vec<Command>,
    redo_stack: Vec<Command>,
    config: UndoConfig,
}

impl UndoStack {
    /// Create a new empty undo stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: UndoConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Push a command to the undo stack.
    /// This clears the redo stack (can't redo after a new action).
    pub fn push(&mut self, command: Command) {
        log::debug!("📝 Undo: pushed '{}'", command.description());
        self.undo_stack.push(command);
        self.redo_stack.clear();

        // Limit history size
        while self.undo_stack.len() > self.config.max_history {
            self.undo_stack.remove(0);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Pop a command from the undo stack for undoing.
    /// The command is moved to the redo stack.
    pub fn pop_undo(&mut self) -> Option<Command> {
        let cmd = self.undo_stack.pop()?;
        log::debug!("⏪ Undo: '{}'", cmd.description());
        self.redo_stack.push(cmd.clone());
        Some(cmd)
    }

    /// Pop a command from the redo stack for redoing.
    /// The command is moved back to the undo stack.
    pub fn pop_redo(&mut self) -> Option<Command> {
        let cmd = self.redo_stack.pop()?;
        log::debug!("⏩ Redo: '{}'", cmd.description());
        self.undo_stack.push(cmd.clone());
        Some(cmd)
    }

    /// Get the description of the command that would be undone
    pub fn undo_description(&self) -> Option<String> {
        self.undo_stack.last().map(|c| c.description())
    }

    /// Get the description of the command that would be redone
    pub fn redo_description(&self) -> Option<String> {
        self.redo_stack.last().map(|c| c.description())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("🗑️ Undo history cleared");
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ============================================================================
// Undo/Redo Execution
// ============================================================================

/// Undo the most recent command against the canvas objects.
/// Returns false if there was nothing to undo.
pub fn undo_command(
    stack: &mut UndoStack,
    objects: &mut Vec<CanvasObject>,
    background_color: &mut String,
) -> bool {
    let Some(cmd) = stack.pop_undo() else {
        return false;
    };

    apply_undo(&cmd, objects, background_color);
    true
}

/// Redo the most recently undone command.
/// Returns false if there was nothing to redo.
pub fn redo_command(
    stack: &mut UndoStack,
    objects: &mut Vec<CanvasObject>,
    background_color: &mut String,
) -> bool {
    let Some(cmd) = stack.pop_redo() else {
        return false;
    };

    apply_redo(&cmd, objects, background_color);
    true
}

fn apply_undo(cmd: &Command, objects: &mut Vec<CanvasObject>, background_color: &mut String) {
    match cmd {
        Command::AddObjects { entries } => {
            remove_entries(objects, entries);
            log::debug!("⏪ Undid add of {} objects", entries.len());
        }
        Command::RemoveObjects { entries } => {
            insert_entries(objects, entries);
            log::debug!("⏪ Undid delete, restored {} objects", entries.len());
        }
        Command::MoveObjects { ids, dx, dy } => {
            translate_ids(objects, ids, -dx, -dy);
        }
        Command::Relabel { changes } => {
            for change in changes {
                set_label(objects, change.id, &change.old_class, &change.old_color);
            }
        }
        Command::Clear {
            objects: cleared,
            background_color: old_color,
        } => {
            *objects = cleared.clone();
            *background_color = old_color.clone();
            log::debug!("⏪ Undid clear, restored {} objects", cleared.len());
        }
    }
}

fn apply_redo(cmd: &Command, objects: &mut Vec<CanvasObject>, background_color: &mut String) {
    match cmd {
        Command::AddObjects { entries } => {
            insert_entries(objects, entries);
            log::debug!("⏩ Redid add of {} objects", entries.len());
        }
        Command::RemoveObjects { entries } => {
            remove_entries(objects, entries);
            log::debug!("⏩ Redid delete of {} objects", entries.len());
        }
        Command::MoveObjects { ids, dx, dy } => {
            translate_ids(objects, ids, *dx, *dy);
        }
        Command::Relabel { changes } => {
            for change in changes {
                set_label(objects, change.id, &change.new_class, &change.new_color);
            }
        }
        Command::Clear { .. } => {
            objects.clear();
            *background_color = DEFAULT_BACKGROUND_COLOR.to_string();
            log::debug!("⏩ Redid clear");
        }
    }
}

/// Re-insert objects at their recorded z-order positions, keeping their ids.
fn insert_entries(objects: &mut Vec<CanvasObject>, entries: &[(usize, CanvasObject)]) {
    for (index, object) in entries {
        let index = (*index).min(objects.len());
        objects.insert(index, object.clone());
    }
}

fn remove_entries(objects: &mut Vec<CanvasObject>, entries: &[(usize, CanvasObject)]) {
    objects.retain(|o| !entries.iter().any(|(_, e)| e.id == o.id));
}

fn translate_ids(objects: &mut [CanvasObject], ids: &[ObjectId], dx: f32, dy: f32) {
    for object in objects.iter_mut().filter(|o| ids.contains(&o.id)) {
        object.translate(dx, dy);
    }
}

fn set_label(
    objects: &mut [CanvasObject],
    id: ObjectId,
    class_name: &Option<String>,
    color: &str,
) {
    if let Some(object) = objects.iter_mut().find(|o| o.id == id) {
        object.class_name = class_name.clone();
        object.stroke_color = color.to_string();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Point};
    use crate::model::ObjectShape;

    fn rect(id: ObjectId, x: f32) -> CanvasObject {
        CanvasObject::new(
            id,
            ObjectShape::Rectangle {
                bounds: BoundingBox::new(x, 0.0, 10.0, 10.0),
            },
            "#ff0000",
            2.0,
        )
    }

    fn add(id: ObjectId) -> Command {
        Command::AddObjects {
            entries: vec![(0, rect(id, 0.0))],
        }
    }

    #[test]
    fn test_undo_stack_basic() {
        let mut stack = UndoStack::new();
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());

        stack.push(add(1));
        assert!(stack.can_undo());
        assert!(!stack.can_redo());
        assert_eq!(stack.undo_description().as_deref(), Some("Add rectangle"));

        assert!(stack.pop_undo().is_some());
        assert!(!stack.can_undo());
        assert!(stack.can_redo());
        assert_eq!(stack.undo_description(), None);
        assert_eq!(stack.redo_description().as_deref(), Some("Add rectangle"));

        assert!(stack.pop_redo().is_some());
        assert!(stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut stack = UndoStack::new();
        stack.push(add(1));
        stack.pop_undo();
        assert!(stack.can_redo());

        stack.push(add(2));
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_max_history() {
        let mut stack = UndoStack::with_config(UndoConfig { max_history: 3 });
        for i in 0..5 {
            stack.push(add(i));
        }
        assert_eq!(stack.undo_count(), 3);
    }

    #[test]
    fn test_command_descriptions() {
        assert_eq!(add(1).description(), "Add rectangle");
        let clear = Command::Clear {
            objects: vec![rect(1, 0.0), rect(2, 0.0)],
            background_color: "#000000".into(),
        };
        assert_eq!(clear.description(), "Clear 2 objects");
    }

    #[test]
    fn test_remove_restores_z_order() {
        let mut objects = vec![rect(1, 0.0), rect(2, 10.0), rect(3, 20.0)];
        let mut bg = DEFAULT_BACKGROUND_COLOR.to_string();
        let mut stack = UndoStack::new();

        let removed = vec![(0, objects[0].clone()), (2, objects[2].clone())];
        objects.retain(|o| o.id == 2);
        stack.push(Command::RemoveObjects { entries: removed });

        assert!(undo_command(&mut stack, &mut objects, &mut bg));
        let ids: Vec<_> = objects.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        assert!(redo_command(&mut stack, &mut objects, &mut bg));
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].id, 2);
    }

    #[test]
    fn test_move_undo_redo() {
        let mut objects = vec![rect(1, 0.0)];
        let mut bg = DEFAULT_BACKGROUND_COLOR.to_string();
        let mut stack = UndoStack::new();

        objects[0].translate(5.0, 5.0);
        stack.push(Command::MoveObjects {
            ids: vec![1],
            dx: 5.0,
            dy: 5.0,
        });

        undo_command(&mut stack, &mut objects, &mut bg);
        assert_eq!(
            objects[0].bounding_box().map(|b| b.top_left()),
            Some(Point::new(0.0, 0.0))
        );
        redo_command(&mut stack, &mut objects, &mut bg);
        assert_eq!(
            objects[0].bounding_box().map(|b| b.top_left()),
            Some(Point::new(5.0, 5.0))
        );
    }

    #[test]
    fn test_clear_restores_background() {
        let mut objects = vec![rect(1, 0.0)];
        let mut bg = "#123456".to_string();
        let mut stack = UndoStack::new();

        stack.push(Command::Clear {
            objects: objects.clone(),
            background_color: bg.clone(),
        });
        objects.clear();
        bg = DEFAULT_BACKGROUND_COLOR.to_string();

        undo_command(&mut stack, &mut objects, &mut bg);
        assert_eq!(objects.len(), 1);
        assert_eq!(bg, "#123456");

        redo_command(&mut stack, &mut objects, &mut bg);
        assert!(objects.is_empty());
        assert_eq!(bg, DEFAULT_BACKGROUND_COLOR);
    }

    #[test]
    fn test_relabel_roundtrip() {
        let mut objects = vec![rect(7, 0.0).with_class(Some("road".into()))];
        let mut bg = DEFAULT_BACKGROUND_COLOR.to_string();
        let mut stack = UndoStack::new();

        objects[0].class_name = Some("car".into());
        objects[0].stroke_color = "#00ff00".into();
        stack.push(Command::Relabel {
            changes: vec![LabelChange {
                id: 7,
                old_class: Some("road".into()),
                new_class: Some("car".into()),
                old_color: "#ff0000".into(),
                new_color: "#00ff00".into(),
            }],
        });

        undo_command(&mut stack, &mut objects, &mut bg);
        assert_eq!(objects[0].class_name.as_deref(), Some("road"));
        assert_eq!(objects[0].stroke_color, "#ff0000");
        redo_command(&mut stack, &mut objects, &mut bg);
        assert_eq!(objects[0].class_name.as_deref(), Some("car"));
        assert_eq!(objects[0].stroke_color, "#00ff00");
    }

    #[test]
    fn test_nothing_to_undo() {
        let mut stack = UndoStack::new();
        let mut objects = Vec::new();
        let mut bg = String::new();
        assert!(!undo_command(&mut stack, &mut objects, &mut bg));
        assert!(!redo_command(&mut stack, &mut objects, &mut bg));
    }
}
