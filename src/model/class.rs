//! Annotation classes: user-defined labels, each with a unique color.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color_utils::{distinct_color, normalize_hex, to_hex};

/// A class label with its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassLabel {
    /// Unique display name of the class
    pub name: String,
    /// Normalized `#rrggbb` color, unique among classes
    pub color: String,
}

impl ClassLabel {
    /// Create a new class label. The color is expected to be normalized already.
    pub fn new(name: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// Errors returned when adding a class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassError {
    #[error("class name must not be empty")]
    EmptyName,

    #[error("a class with the name {0} already exists")]
    DuplicateName(String),

    #[error("a class with the color {0} already exists")]
    DuplicateColor(String),

    #[error("invalid color '{0}', expected #rrggbb")]
    InvalidColor(String),
}

/// Ordered set of classes plus the currently selected one.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: Vec<ClassLabel>,
    selected: Option<usize>,
    /// Position in the distinct color sequence used for suggestions
    color_cursor: u32,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class. Names and colors must both be unique.
    pub fn add(&mut self, name: &str, color: &str) -> Result<&ClassLabel, ClassError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClassError::EmptyName);
        }
        let color = normalize_hex(color).ok_or_else(|| ClassError::InvalidColor(color.into()))?;

        if self.find(name).is_some() {
            return Err(ClassError::DuplicateName(name.to_string()));
        }
        if self.color_in_use(&color) {
            return Err(ClassError::DuplicateColor(color));
        }

        log::debug!("Added class '{}' ({})", name, color);
        self.classes.push(ClassLabel::new(name, &color));
        self.color_cursor += 1;

        let index = self.classes.len() - 1;
        Ok(&self.classes[index])
    }

    /// Remove a class by name, freeing its color. Always clears the selection.
    pub fn remove(&mut self, name: &str) -> Option<ClassLabel> {
        self.selected = None;
        let index = self.index_of(name)?;
        let removed = self.classes.remove(index);
        log::debug!("Removed class '{}'", removed.name);
        Some(removed)
    }

    /// Select a class by name. Unknown names clear the selection.
    pub fn select(&mut self, name: &str) -> Option<&ClassLabel> {
        self.selected = self.index_of(name);
        self.selected()
    }

    /// Select the class at `index` in insertion order.
    pub fn select_index(&mut self, index: usize) -> Option<&ClassLabel> {
        if index < self.classes.len() {
            self.selected = Some(index);
        }
        self.selected()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// The currently selected class, if any.
    pub fn selected(&self) -> Option<&ClassLabel> {
        self.selected.and_then(|i| self.classes.get(i))
    }

    pub fn find(&self, name: &str) -> Option<&ClassLabel> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.classes.iter().position(|c| c.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&ClassLabel> {
        self.classes.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassLabel> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Check whether a (normalized) color is used by any class.
    pub fn color_in_use(&self, color: &str) -> bool {
        self.classes.iter().any(|c| c.color.eq_ignore_ascii_case(color))
    }

    /// Suggest a color for the next class that no existing class uses.
    pub fn suggested_color(&self) -> String {
        let mut index = self.color_cursor;
        loop {
            let candidate = to_hex(distinct_color(index));
            if !self.color_in_use(&candidate) {
                return candidate;
            }
            index += 1;
        }
    }
}
