//! Clipboard and bulk edits on the selection.

use std::mem;

use crate::constants::{DEFAULT_BACKGROUND_COLOR, PASTE_OFFSET};
use crate::model::{CanvasObject, ObjectId};
use crate::undo::{Command, LabelChange};

use super::{Editor, EditorError};

impl Editor {
    /// Selected objects in z-order, paired with their index.
    fn selected_entries(&self) -> Vec<(usize, CanvasObject)> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, o)| self.selection.contains(&o.id))
            .map(|(i, o)| (i, o.clone()))
            .collect()
    }

    /// Remove the selected objects. Returns the number removed.
    pub fn delete_selection(&mut self) -> usize {
        self.end_gesture();
        let entries = self.selected_entries();
        if entries.is_empty() {
            return 0;
        }
        let selection = mem::take(&mut self.selection);
        self.objects.retain(|o| !selection.contains(&o.id));

        let count = entries.len();
        log::info!("🗑️ Deleted {} objects", count);
        self.undo_stack.push(Command::RemoveObjects { entries });
        count
    }

    /// Copy the selection to the clipboard. Returns the number copied.
    pub fn copy(&mut self) -> usize {
        self.end_gesture();
        let copied: Vec<CanvasObject> = self
            .selected_entries()
            .into_iter()
            .map(|(_, o)| o)
            .collect();
        if copied.is_empty() {
            return 0;
        }
        self.clipboard = copied;
        self.paste_count = 0;
        log::debug!("📋 Copied {} objects", self.clipboard.len());
        self.clipboard.len()
    }

    /// Copy the selection, then delete it.
    pub fn cut(&mut self) -> usize {
        if self.copy() == 0 {
            return 0;
        }
        self.delete_selection()
    }

    /// Insert clones of the clipboard with fresh ids. Each paste is offset
    /// a further step from the originals. The pasted objects become the
    /// selection. Returns their ids.
    pub fn paste(&mut self) -> Vec<ObjectId> {
        self.end_gesture();
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        self.paste_count += 1;
        let offset = PASTE_OFFSET * self.paste_count as f32;
        let objects = self.clipboard.clone();
        let ids = self.insert_clones(objects, offset);
        log::info!("📋 Pasted {} objects", ids.len());
        ids
    }

    /// Clone the selection in place, offset by one step. The clipboard is
    /// left untouched. Returns the ids of the clones.
    pub fn duplicate(&mut self) -> Vec<ObjectId> {
        self.end_gesture();
        let originals: Vec<CanvasObject> = self
            .selected_entries()
            .into_iter()
            .map(|(_, o)| o)
            .collect();
        if originals.is_empty() {
            return Vec::new();
        }
        let ids = self.insert_clones(originals, PASTE_OFFSET);
        log::info!("📋 Duplicated {} objects", ids.len());
        ids
    }

    fn insert_clones(&mut self, objects: Vec<CanvasObject>, offset: f32) -> Vec<ObjectId> {
        let mut entries = Vec::with_capacity(objects.len());
        for mut object in objects {
            object.id = self.allocate_id();
            object.translate(offset, offset);
            entries.push((self.objects.len(), object.clone()));
            self.objects.push(object);
        }

        let ids: Vec<ObjectId> = entries.iter().map(|(_, o)| o.id).collect();
        self.selection = ids.clone();
        self.undo_stack.push(Command::AddObjects { entries });
        ids
    }

    /// Label every selected object with a class and recolor it to the class
    /// color. Returns the number of objects changed.
    pub fn assign_class_to_selection(&mut self, class_name: &str) -> Result<usize, EditorError> {
        let class = self
            .classes
            .find(class_name)
            .cloned()
            .ok_or_else(|| EditorError::UnknownClass(class_name.to_string()))?;
        self.end_gesture();

        let mut changes = Vec::new();
        for object in self
            .objects
            .iter_mut()
            .filter(|o| !o.is_eraser() && self.selection.contains(&o.id))
        {
            if object.class_name.as_deref() == Some(class.name.as_str())
                && object.stroke_color == class.color
            {
                continue;
            }
            changes.push(LabelChange {
                id: object.id,
                old_class: object.class_name.replace(class.name.clone()),
                new_class: Some(class.name.clone()),
                old_color: mem::replace(&mut object.stroke_color, class.color.clone()),
                new_color: class.color.clone(),
            });
        }

        let count = changes.len();
        if count > 0 {
            log::info!("🏷️ Assigned class '{}' to {} objects", class.name, count);
            self.undo_stack.push(Command::Relabel { changes });
        }
        Ok(count)
    }

    /// Remove every object and reset the background color. Undoable.
    ///
    /// The pending polygon is discarded and a select-drag in progress is
    /// recorded first; the background image and classes are kept.
    pub fn clear(&mut self) {
        self.end_gesture();
        self.pending_polygon.clear();
        self.selection.clear();

        let objects = mem::take(&mut self.objects);
        let background_color = mem::replace(
            &mut self.background_color,
            DEFAULT_BACKGROUND_COLOR.to_string(),
        );
        log::info!("🗑️ Cleared canvas ({} objects)", objects.len());
        self.undo_stack.push(Command::Clear {
            objects,
            background_color,
        });
    }
}
