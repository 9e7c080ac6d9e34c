//! Keyboard dispatch: fixed editing shortcuts and configurable hotkeys.

use crate::constants::zoom;
use crate::input::{Key, KeyEvent};
use crate::keybindings::KeybindTarget;

use super::Editor;

impl Editor {
    /// Feed a key press. Returns true when the key was handled.
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        let mods = event.modifiers;

        if mods.ctrl {
            return match event.key {
                Key::Letter('Z') if mods.shift => self.redo(),
                Key::Letter('Z') => self.undo(),
                Key::Letter('Y') => self.redo(),
                Key::Letter('C') => self.copy() > 0,
                Key::Letter('X') => self.cut() > 0,
                Key::Letter('V') => !self.paste().is_empty(),
                Key::Letter('D') => !self.duplicate().is_empty(),
                Key::Digit(0) => {
                    self.reset_zoom();
                    true
                }
                Key::Equal => {
                    let center = self.canvas_center();
                    self.viewport.zoom_in(zoom::STEP_FACTOR, center);
                    true
                }
                Key::Minus => {
                    let center = self.canvas_center();
                    self.viewport.zoom_out(zoom::STEP_FACTOR, center);
                    true
                }
                _ => false,
            };
        }

        match event.key {
            Key::Delete | Key::Backspace => self.delete_selection() > 0,
            Key::Escape => {
                self.cancel();
                true
            }
            key if mods.alt => {
                log::trace!("Ignoring Alt+{}", key);
                false
            }
            key => match self.keybindings.target_for_key(key) {
                Some(KeybindTarget::Tool(tool)) => {
                    self.set_draw_tool(tool);
                    true
                }
                Some(KeybindTarget::Mode(mode)) => {
                    self.set_mode(mode);
                    true
                }
                Some(KeybindTarget::Class(index)) if index < self.classes.len() => {
                    if let Some(class) = self.select_class_index(index) {
                        log::debug!("🏷️ Class: {}", class.name);
                    }
                    true
                }
                Some(KeybindTarget::Class(_)) => false,
                None => false,
            },
        }
    }
}
