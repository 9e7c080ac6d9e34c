//! Customizable keybindings for the annotation canvas.
//!
//! This module defines hotkeys for draw tools, interaction modes and class
//! selection. Editing shortcuts (copy, undo, zoom, ...) are fixed and handled
//! directly by the editor.

use serde::{Deserialize, Serialize};

use crate::input::Key;
use crate::model::{DrawTool, ToolMode};

/// Target of a hotkey - what pressing it activates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeybindTarget {
    /// Switch to draw mode with this tool
    Tool(DrawTool),
    /// Switch to a non-draw mode (select or pan)
    Mode(ToolMode),
    /// Select the class at this index (0-based)
    Class(usize),
}

/// Maximum number of classes that can have hotkeys (0-9 keys).
pub const MAX_CLASS_HOTKEYS: usize = 10;

/// Keybinding configuration for the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub tool_brush: Key,
    pub tool_polygon: Key,
    pub tool_rectangle: Key,
    pub tool_eraser: Key,
    /// Hotkey for select mode
    pub mode_select: Key,
    /// Hotkey for pan mode
    pub mode_pan: Key,

    /// Hotkeys for class selection (indices 0-9 map to classes 1-10)
    /// None means no hotkey assigned for that slot
    pub class_hotkeys: [Option<Key>; MAX_CLASS_HOTKEYS],
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            tool_brush: Key::Letter('B'),
            tool_polygon: Key::Letter('P'),
            tool_rectangle: Key::Letter('R'),
            tool_eraser: Key::Letter('E'),
            mode_select: Key::Letter('V'),
            mode_pan: Key::Letter('H'),

            // 1-9, then 0 for the tenth class
            class_hotkeys: [
                Some(Key::Digit(1)),
                Some(Key::Digit(2)),
                Some(Key::Digit(3)),
                Some(Key::Digit(4)),
                Some(Key::Digit(5)),
                Some(Key::Digit(6)),
                Some(Key::Digit(7)),
                Some(Key::Digit(8)),
                Some(Key::Digit(9)),
                Some(Key::Digit(0)),
            ],
        }
    }
}

impl KeyBindings {
    /// Create new keybindings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a key press to its target, if any binding uses it.
    pub fn target_for_key(&self, key: Key) -> Option<KeybindTarget> {
        if let Some(tool) = self.tool_for_key(key) {
            return Some(KeybindTarget::Tool(tool));
        }
        if key == self.mode_select {
            return Some(KeybindTarget::Mode(ToolMode::Select));
        }
        if key == self.mode_pan {
            return Some(KeybindTarget::Mode(ToolMode::Pan));
        }
        self.class_index_for_key(key).map(KeybindTarget::Class)
    }

    /// Get the draw tool that corresponds to a key press, if any.
    pub fn tool_for_key(&self, key: Key) -> Option<DrawTool> {
        DrawTool::all()
            .iter()
            .copied()
            .find(|tool| self.key_for_tool(*tool) == key)
    }

    /// Get the class index (0-based) that corresponds to a key press, if any.
    pub fn class_index_for_key(&self, key: Key) -> Option<usize> {
        self.class_hotkeys
            .iter()
            .position(|hotkey| *hotkey == Some(key))
    }

    /// Get the hotkey for a specific tool.
    pub fn key_for_tool(&self, tool: DrawTool) -> Key {
        match tool {
            DrawTool::Brush => self.tool_brush,
            DrawTool::Polygon => self.tool_polygon,
            DrawTool::Rectangle => self.tool_rectangle,
            DrawTool::Eraser => self.tool_eraser,
        }
    }

    /// Get the hotkey for a mode. Draw mode has no hotkey of its own.
    pub fn key_for_mode(&self, mode: ToolMode) -> Option<Key> {
        match mode {
            ToolMode::Select => Some(self.mode_select),
            ToolMode::Pan => Some(self.mode_pan),
            ToolMode::Draw => None,
        }
    }

    /// Get the hotkey for a class at a specific index, if any.
    pub fn key_for_class_index(&self, index: usize) -> Option<Key> {
        self.class_hotkeys.get(index).copied().flatten()
    }

    /// Set the hotkey for a tool.
    pub fn set_tool_key(&mut self, tool: DrawTool, key: Key) {
        match tool {
            DrawTool::Brush => self.tool_brush = key,
            DrawTool::Polygon => self.tool_polygon = key,
            DrawTool::Rectangle => self.tool_rectangle = key,
            DrawTool::Eraser => self.tool_eraser = key,
        }
    }

    /// Set the hotkey for select or pan mode. Draw mode is ignored.
    pub fn set_mode_key(&mut self, mode: ToolMode, key: Key) {
        match mode {
            ToolMode::Select => self.mode_select = key,
            ToolMode::Pan => self.mode_pan = key,
            ToolMode::Draw => {}
        }
    }

    /// Set the hotkey for a class index.
    pub fn set_class_key(&mut self, index: usize, key: Option<Key>) {
        if index < MAX_CLASS_HOTKEYS {
            self.class_hotkeys[index] = key;
        }
    }

    /// Check if a key is already used by any binding other than `exclude`.
    /// Returns a description of what it's used for, if anything.
    pub fn key_conflict(&self, key: Key, exclude: Option<KeybindTarget>) -> Option<String> {
        for tool in DrawTool::all() {
            if exclude != Some(KeybindTarget::Tool(*tool)) && self.key_for_tool(*tool) == key {
                return Some(format!("{} tool", tool.name()));
            }
        }
        for mode in [ToolMode::Select, ToolMode::Pan] {
            if exclude != Some(KeybindTarget::Mode(mode)) && self.key_for_mode(mode) == Some(key)
            {
                return Some(format!("{} mode", mode.name()));
            }
        }
        for (i, hotkey) in self.class_hotkeys.iter().enumerate() {
            if exclude != Some(KeybindTarget::Class(i)) && *hotkey == Some(key) {
                return Some(format!("Class {}", i + 1));
            }
        }

        None
    }
}

/// Convert an optional key to a display string.
pub fn optional_key_to_string(key: Option<Key>) -> String {
    match key {
        Some(k) => k.name(),
        None => "-".to_string(),
    }
}
