//! Replayable editing sessions.
//!
//! A script describes a canvas, its classes and an optional background image,
//! followed by a list of input actions. Replaying a script drives an
//! [`Editor`] exactly as a front end would, which makes annotation sessions
//! reproducible from the command line and in tests.
//!
//! ```json
//! {
//!   "canvas": { "width": 640, "height": 480 },
//!   "classes": [{ "name": "road", "color": "#ff0000" }],
//!   "actions": [
//!     { "action": "select_class", "name": "road" },
//!     { "action": "set_tool", "tool": "rectangle" },
//!     { "action": "drag", "from": [10, 10], "to": [120, 80] }
//!   ]
//! }
//! ```
//!
//! Pointer coordinates are screen coordinates, so zoom and pan actions affect
//! where later strokes land. Relative image paths are resolved against the
//! directory passed to [`Script::build_editor`] and [`Script::replay`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AppConfig;
use crate::editor::{Editor, EditorError};
use crate::input::{Key, KeyEvent, Modifiers, PointerEvent, WheelEvent};
use crate::model::{DrawTool, ImageLayer, ToolMode};

/// Errors raised while loading or replaying a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),

    /// Setting up the canvas, classes or background failed
    #[error("Invalid script setup: {0}")]
    Setup(#[from] EditorError),

    /// An action could not be applied
    #[error("Action {index} ({action}) failed: {source}")]
    Action {
        index: usize,
        action: &'static str,
        #[source]
        source: EditorError,
    },
}

/// Canvas settings of a script. Missing values fall back to the configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

/// A class to create before replaying. Without a color the next distinct
/// color is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// One recorded input or command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    PointerDown {
        x: f32,
        y: f32,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerMove {
        x: f32,
        y: f32,
        #[serde(default)]
        modifiers: Modifiers,
    },
    PointerUp {
        x: f32,
        y: f32,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Press at `from`, move in `steps` equal increments, release at `to`.
    Drag {
        from: [f32; 2],
        to: [f32; 2],
        #[serde(default = "default_drag_steps")]
        steps: usize,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Click {
        x: f32,
        y: f32,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Wheel {
        delta_y: f32,
        x: f32,
        y: f32,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Key {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    SetMode {
        mode: ToolMode,
    },
    SetTool {
        tool: DrawTool,
    },
    /// Select a class by name; `null` clears the selection.
    SelectClass {
        name: Option<String>,
    },
    AddClass {
        name: String,
        #[serde(default)]
        color: Option<String>,
    },
    BrushSize {
        size: f32,
    },
    FillShapes {
        fill: bool,
    },
    Undo,
    Redo,
    Clear,
    Zoom {
        level: f32,
    },
    ResetZoom,
    SelectAll,
    AssignClass {
        name: String,
    },
    AddImage {
        path: String,
        #[serde(default)]
        x: f32,
        #[serde(default)]
        y: f32,
    },
    SetBackground {
        path: String,
    },
    RemoveBackground,
}

fn default_drag_steps() -> usize {
    1
}

impl Action {
    /// Snake-case tag of the action, as written in scripts.
    pub fn name(&self) -> &'static str {
        match self {
            Action::PointerDown { .. } => "pointer_down",
            Action::PointerMove { .. } => "pointer_move",
            Action::PointerUp { .. } => "pointer_up",
            Action::Drag { .. } => "drag",
            Action::Click { .. } => "click",
            Action::Wheel { .. } => "wheel",
            Action::Key { .. } => "key",
            Action::SetMode { .. } => "set_mode",
            Action::SetTool { .. } => "set_tool",
            Action::SelectClass { .. } => "select_class",
            Action::AddClass { .. } => "add_class",
            Action::BrushSize { .. } => "brush_size",
            Action::FillShapes { .. } => "fill_shapes",
            Action::Undo => "undo",
            Action::Redo => "redo",
            Action::Clear => "clear",
            Action::Zoom { .. } => "zoom",
            Action::ResetZoom => "reset_zoom",
            Action::SelectAll => "select_all",
            Action::AssignClass { .. } => "assign_class",
            Action::AddImage { .. } => "add_image",
            Action::SetBackground { .. } => "set_background",
            Action::RemoveBackground => "remove_background",
        }
    }
}

/// A canvas setup plus the actions to replay on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub canvas: CanvasSpec,
    #[serde(default)]
    pub classes: Vec<ClassSpec>,
    /// Background image path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayReport {
    /// Actions applied
    pub applied: usize,
    /// Actions the editor ignored in its current state (e.g. undo with an
    /// empty history)
    pub ignored: usize,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a script file.
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path)?;
        let script = Self::from_json(&json)?;
        log::info!(
            "Loaded script {:?} with {} actions",
            path,
            script.actions.len()
        );
        Ok(script)
    }

    /// Create an editor from `config` and apply the script's canvas, classes
    /// and background.
    pub fn build_editor(&self, config: &AppConfig, base_dir: &Path) -> Result<Editor, ScriptError> {
        let mut editor = Editor::from_config(config);

        let width = self.canvas.width.unwrap_or(editor.width());
        let height = self.canvas.height.unwrap_or(editor.height());
        editor.set_canvas_size(width, height)?;
        if let Some(color) = &self.canvas.background_color {
            editor.set_background_color(color)?;
        }

        for class in &self.classes {
            let color = class
                .color
                .clone()
                .unwrap_or_else(|| editor.classes().suggested_color());
            editor.add_class(&class.name, &color)?;
        }

        if let Some(background) = &self.background {
            editor.set_background_from_path(&base_dir.join(background))?;
        }

        Ok(editor)
    }

    /// Apply every action in order, stopping at the first failure.
    pub fn replay(&self, editor: &mut Editor, base_dir: &Path) -> Result<ReplayReport, ScriptError> {
        let mut report = ReplayReport::default();

        for (index, action) in self.actions.iter().enumerate() {
            let applied = apply(editor, action, base_dir).map_err(|source| ScriptError::Action {
                index,
                action: action.name(),
                source,
            })?;
            if applied {
                report.applied += 1;
            } else {
                log::debug!("Action {} ({}) had no effect", index, action.name());
                report.ignored += 1;
            }
        }

        log::info!(
            "Replayed {} actions ({} ignored), {} objects on canvas",
            report.applied + report.ignored,
            report.ignored,
            editor.objects().len()
        );
        Ok(report)
    }
}

/// Apply one action. Returns whether the editor reacted to it.
fn apply(editor: &mut Editor, action: &Action, base_dir: &Path) -> Result<bool, EditorError> {
    let handled = match action {
        Action::PointerDown { x, y, modifiers } => {
            editor.handle_pointer(PointerEvent::down(*x, *y).with_modifiers(*modifiers))
        }
        Action::PointerMove { x, y, modifiers } => {
            editor.handle_pointer(PointerEvent::moved(*x, *y).with_modifiers(*modifiers))
        }
        Action::PointerUp { x, y, modifiers } => {
            editor.handle_pointer(PointerEvent::up(*x, *y).with_modifiers(*modifiers))
        }
        Action::Drag {
            from,
            to,
            steps,
            modifiers,
        } => {
            let mut handled =
                editor.handle_pointer(PointerEvent::down(from[0], from[1]).with_modifiers(*modifiers));
            let steps = (*steps).max(1);
            for i in 1..=steps {
                let t = i as f32 / steps as f32;
                let x = from[0] + (to[0] - from[0]) * t;
                let y = from[1] + (to[1] - from[1]) * t;
                handled |= editor.handle_pointer(PointerEvent::moved(x, y).with_modifiers(*modifiers));
            }
            handled |= editor.handle_pointer(PointerEvent::up(to[0], to[1]).with_modifiers(*modifiers));
            handled
        }
        Action::Click { x, y, modifiers } => {
            let down = editor.handle_pointer(PointerEvent::down(*x, *y).with_modifiers(*modifiers));
            let up = editor.handle_pointer(PointerEvent::up(*x, *y).with_modifiers(*modifiers));
            down || up
        }
        Action::Wheel {
            delta_y,
            x,
            y,
            modifiers,
        } => editor.handle_wheel(WheelEvent {
            delta_y: *delta_y,
            x: *x,
            y: *y,
            modifiers: *modifiers,
        }),
        Action::Key { key, modifiers } => editor.handle_key(KeyEvent::new(*key, *modifiers)),
        Action::SetMode { mode } => {
            editor.set_mode(*mode);
            true
        }
        Action::SetTool { tool } => {
            editor.set_draw_tool(*tool);
            true
        }
        Action::SelectClass { name: Some(name) } => {
            if editor.classes().find(name).is_none() {
                return Err(EditorError::UnknownClass(name.clone()));
            }
            editor.select_class(name);
            true
        }
        Action::SelectClass { name: None } => {
            editor.clear_class_selection();
            true
        }
        Action::AddClass { name, color } => {
            let color = color
                .clone()
                .unwrap_or_else(|| editor.classes().suggested_color());
            editor.add_class(name, &color)?;
            true
        }
        Action::BrushSize { size } => {
            editor.set_brush_size(*size);
            true
        }
        Action::FillShapes { fill } => {
            editor.set_fill_shapes(*fill);
            true
        }
        Action::Undo => editor.undo(),
        Action::Redo => editor.redo(),
        Action::Clear => {
            editor.clear();
            true
        }
        Action::Zoom { level } => {
            editor.set_zoom(*level);
            true
        }
        Action::ResetZoom => {
            editor.reset_zoom();
            true
        }
        Action::SelectAll => editor.select_all() > 0,
        Action::AssignClass { name } => editor.assign_class_to_selection(name)? > 0,
        Action::AddImage { path, x, y } => {
            let layer = ImageLayer::open(&base_dir.join(path))?;
            editor.add_image_object(layer, *x, *y);
            true
        }
        Action::SetBackground { path } => {
            editor.set_background_from_path(&base_dir.join(path))?;
            true
        }
        Action::RemoveBackground => editor.remove_background().is_some(),
    };
    Ok(handled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ObjectShape;

    fn run(json: &str) -> (Editor, ReplayReport) {
        let script = Script::from_json(json).unwrap();
        let mut editor = script.build_editor(&AppConfig::default(), Path::new(".")).unwrap();
        let report = script.replay(&mut editor, Path::new(".")).unwrap();
        (editor, report)
    }

    #[test]
    fn test_parse_tagged_actions() {
        let script = Script::from_json(
            r#"{
                "actions": [
                    { "action": "set_tool", "tool": "polygon" },
                    { "action": "key", "key": "Z", "modifiers": { "ctrl": true } },
                    { "action": "select_class", "name": null },
                    { "action": "reset_zoom" }
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            script.actions,
            vec![
                Action::SetTool {
                    tool: DrawTool::Polygon
                },
                Action::Key {
                    key: Key::Letter('Z'),
                    modifiers: Modifiers::ctrl()
                },
                Action::SelectClass { name: None },
                Action::ResetZoom,
            ]
        );
        assert_eq!(script.canvas, CanvasSpec::default());
    }

    #[test]
    fn test_unknown_action_rejected() {
        assert!(matches!(
            Script::from_json(r#"{ "actions": [{ "action": "teleport" }] }"#),
            Err(ScriptError::Parse(_))
        ));
    }

    #[test]
    fn test_canvas_and_classes() {
        let (editor, _) = run(
            r##"{
                "canvas": { "width": 320, "height": 240, "background_color": "#000000" },
                "classes": [{ "name": "road", "color": "#ff0000" }, { "name": "car" }]
            }"##,
        );

        assert_eq!((editor.width(), editor.height()), (320, 240));
        assert_eq!(editor.background_color(), "#000000");
        assert_eq!(editor.classes().len(), 2);
        assert_ne!(editor.classes().get(1).unwrap().color, "#ff0000");
    }

    #[test]
    fn test_labeled_rectangle() {
        let (editor, report) = run(
            r##"{
                "classes": [{ "name": "road", "color": "#ff0000" }],
                "actions": [
                    { "action": "select_class", "name": "road" },
                    { "action": "set_tool", "tool": "rectangle" },
                    { "action": "drag", "from": [10, 10], "to": [110, 60], "steps": 4 }
                ]
            }"##,
        );

        assert_eq!(report.ignored, 0);
        let object = &editor.objects()[0];
        assert_eq!(object.class_name.as_deref(), Some("road"));
        assert_eq!(object.stroke_color, "#ff0000");
        assert!(matches!(object.shape, ObjectShape::Rectangle { .. }));
    }

    #[test]
    fn test_polygon_by_clicks_then_undo() {
        let (editor, _) = run(
            r#"{
                "actions": [
                    { "action": "set_tool", "tool": "polygon" },
                    { "action": "click", "x": 10, "y": 10 },
                    { "action": "click", "x": 100, "y": 10 },
                    { "action": "click", "x": 50, "y": 80 },
                    { "action": "click", "x": 11, "y": 11 },
                    { "action": "undo" },
                    { "action": "redo" }
                ]
            }"#,
        );

        assert_eq!(editor.objects().len(), 1);
        assert_eq!(editor.objects()[0].category(), "polygon");
    }

    #[test]
    fn test_undo_on_empty_history_is_ignored() {
        let (_, report) = run(r#"{ "actions": [{ "action": "undo" }] }"#);
        assert_eq!(report, ReplayReport { applied: 0, ignored: 1 });
    }

    #[test]
    fn test_unknown_class_reports_action_index() {
        let script = Script::from_json(
            r#"{ "actions": [
                { "action": "reset_zoom" },
                { "action": "select_class", "name": "ghost" }
            ] }"#,
        )
        .unwrap();
        let mut editor = Editor::new(100, 100);

        let err = script.replay(&mut editor, Path::new(".")).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Action { index: 1, action: "select_class", .. }
        ));
    }

    #[test]
    fn test_zoom_affects_stroke_position() {
        let (editor, _) = run(
            r#"{
                "actions": [
                    { "action": "zoom", "level": 2.0 },
                    { "action": "drag", "from": [20, 20], "to": [40, 20] }
                ]
            }"#,
        );

        let bounds = editor.objects()[0].bounding_box().unwrap();
        assert!(bounds.x < 10.0 && bounds.x + bounds.width > 20.0);
        assert!(bounds.x + bounds.width < 30.0);
    }

    #[test]
    fn test_add_image_from_file() {
        let dir = std::env::temp_dir().join(format!("polygon-script-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        image::RgbaImage::new(8, 4).save(dir.join("stamp.png")).unwrap();

        let script = Script::from_json(
            r#"{ "actions": [{ "action": "add_image", "path": "stamp.png", "x": 5, "y": 6 }] }"#,
        )
        .unwrap();
        let mut editor = script.build_editor(&AppConfig::default(), &dir).unwrap();
        script.replay(&mut editor, &dir).unwrap();

        let bounds = editor.objects()[0].bounding_box().unwrap();
        assert_eq!(bounds.to_xywh(), [5.0, 6.0, 8.0, 4.0]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_set_and_remove_background() {
        let dir = std::env::temp_dir().join(format!("polygon-script-bg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        image::RgbaImage::new(6, 3).save(dir.join("bg.png")).unwrap();

        let script = Script::from_json(
            r#"{ "actions": [
                { "action": "set_background", "path": "bg.png" },
                { "action": "remove_background" },
                { "action": "remove_background" }
            ] }"#,
        )
        .unwrap();
        let mut editor = script.build_editor(&AppConfig::default(), &dir).unwrap();
        let report = script.replay(&mut editor, &dir).unwrap();

        assert!(editor.background().is_none());
        assert_eq!(report, ReplayReport { applied: 2, ignored: 1 });

        let _ = std::fs::remove_dir_all(&dir);
    }
}
