//! JavaScript bindings.
//!
//! The host page owns the `<canvas>` element and forwards its DOM events to a
//! [`WasmCanvas`]. After every handled event it redraws from
//! [`WasmCanvas::scene_json`] and [`WasmCanvas::preview_json`], using
//! [`WasmCanvas::view_transform`] as the 2D context transform.

use wasm_bindgen::prelude::*;

use crate::config::AppConfig;
use crate::editor::Editor;
use crate::format::{ExportOptions, FormatRegistry};
use crate::input::{Key, KeyEvent, Modifiers, PointerEvent, WheelEvent};
use crate::model::{DrawTool, ImageLayer, ToolMode};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second start() keeps the existing logger
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Polygon annotator WASM ready");
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn modifiers(ctrl: bool, shift: bool, alt: bool) -> Modifiers {
    Modifiers { ctrl, shift, alt }
}

/// Annotation canvas driven from JavaScript.
#[wasm_bindgen]
pub struct WasmCanvas {
    editor: Editor,
    registry: FormatRegistry,
}

#[wasm_bindgen]
impl WasmCanvas {
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Result<WasmCanvas, JsValue> {
        let mut editor = Editor::new(width, height);
        editor.set_canvas_size(width, height).map_err(js_error)?;
        Ok(Self {
            editor,
            registry: FormatRegistry::new(),
        })
    }

    /// Create a canvas from a JSON configuration (as written by `polygon-cli config init`).
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(json: &str) -> Result<WasmCanvas, JsValue> {
        let config = AppConfig::from_json(json).map_err(js_error)?;
        Ok(Self {
            editor: Editor::from_config(&config),
            registry: FormatRegistry::new(),
        })
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f32, y: f32, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.editor
            .handle_pointer(PointerEvent::down(x, y).with_modifiers(modifiers(ctrl, shift, alt)))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f32, y: f32, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.editor
            .handle_pointer(PointerEvent::moved(x, y).with_modifiers(modifiers(ctrl, shift, alt)))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, x: f32, y: f32, ctrl: bool, shift: bool, alt: bool) -> bool {
        self.editor
            .handle_pointer(PointerEvent::up(x, y).with_modifiers(modifiers(ctrl, shift, alt)))
    }

    pub fn wheel(&mut self, delta_y: f32, x: f32, y: f32, ctrl: bool) -> bool {
        self.editor.handle_wheel(WheelEvent {
            delta_y,
            x,
            y,
            modifiers: modifiers(ctrl, false, false),
        })
    }

    /// Handle a `KeyboardEvent.key` value. Unknown keys return `false`.
    pub fn key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool) -> bool {
        match Key::parse(key) {
            Some(key) => self
                .editor
                .handle_key(KeyEvent::new(key, modifiers(ctrl, shift, alt))),
            None => false,
        }
    }

    #[wasm_bindgen(js_name = setMode)]
    pub fn set_mode(&mut self, mode: &str) -> Result<(), JsValue> {
        let mode = ToolMode::parse(mode).ok_or_else(|| js_error(format!("unknown mode '{}'", mode)))?;
        self.editor.set_mode(mode);
        Ok(())
    }

    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, tool: &str) -> Result<(), JsValue> {
        let tool = DrawTool::parse(tool).ok_or_else(|| js_error(format!("unknown tool '{}'", tool)))?;
        self.editor.set_draw_tool(tool);
        Ok(())
    }

    #[wasm_bindgen(js_name = setBrushSize)]
    pub fn set_brush_size(&mut self, size: f32) {
        self.editor.set_brush_size(size);
    }

    #[wasm_bindgen(js_name = setFillShapes)]
    pub fn set_fill_shapes(&mut self, fill: bool) {
        self.editor.set_fill_shapes(fill);
    }

    #[wasm_bindgen(js_name = setBackgroundColor)]
    pub fn set_background_color(&mut self, color: &str) -> Result<(), JsValue> {
        self.editor.set_background_color(color).map_err(js_error)
    }

    /// Decode an encoded image (PNG, JPEG, ...) and use it as the background.
    #[wasm_bindgen(js_name = setBackgroundImage)]
    pub fn set_background_image(&mut self, source: &str, bytes: &[u8]) -> Result<(), JsValue> {
        let layer = ImageLayer::from_bytes(source, bytes).map_err(js_error)?;
        self.editor.set_background(layer);
        Ok(())
    }

    #[wasm_bindgen(js_name = removeBackground)]
    pub fn remove_background(&mut self) -> bool {
        self.editor.remove_background().is_some()
    }

    #[wasm_bindgen(js_name = addImage)]
    pub fn add_image(&mut self, source: &str, bytes: &[u8], x: f32, y: f32) -> Result<u64, JsValue> {
        let layer = ImageLayer::from_bytes(source, bytes).map_err(js_error)?;
        Ok(self.editor.add_image_object(layer, x, y))
    }

    /// Add a class; an empty color picks the next distinct one.
    #[wasm_bindgen(js_name = addClass)]
    pub fn add_class(&mut self, name: &str, color: &str) -> Result<String, JsValue> {
        let color = if color.is_empty() {
            self.editor.classes().suggested_color()
        } else {
            color.to_string()
        };
        let class = self.editor.add_class(name, &color).map_err(js_error)?;
        Ok(class.color)
    }

    #[wasm_bindgen(js_name = removeClass)]
    pub fn remove_class(&mut self, name: &str) -> bool {
        self.editor.remove_class(name).is_some()
    }

    /// Select a class by name; an empty name clears the selection.
    #[wasm_bindgen(js_name = selectClass)]
    pub fn select_class(&mut self, name: &str) -> bool {
        if name.is_empty() {
            self.editor.clear_class_selection();
            return true;
        }
        self.editor.select_class(name).is_some()
    }

    #[wasm_bindgen(js_name = assignClass)]
    pub fn assign_class(&mut self, name: &str) -> Result<usize, JsValue> {
        self.editor.assign_class_to_selection(name).map_err(js_error)
    }

    pub fn undo(&mut self) -> bool {
        self.editor.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editor.redo()
    }

    pub fn clear(&mut self) {
        self.editor.clear();
    }

    #[wasm_bindgen(js_name = selectAll)]
    pub fn select_all(&mut self) -> usize {
        self.editor.select_all()
    }

    #[wasm_bindgen(js_name = deleteSelection)]
    pub fn delete_selection(&mut self) -> usize {
        self.editor.delete_selection()
    }

    #[wasm_bindgen(js_name = setZoom)]
    pub fn set_zoom(&mut self, level: f32) {
        self.editor.set_zoom(level);
    }

    #[wasm_bindgen(js_name = resetZoom)]
    pub fn reset_zoom(&mut self) {
        self.editor.reset_zoom();
    }

    #[wasm_bindgen(js_name = zoomPercent)]
    pub fn zoom_percent(&self) -> f32 {
        self.editor.viewport().zoom_percent()
    }

    /// `[a, b, c, d, e, f]` for `CanvasRenderingContext2D.setTransform`.
    #[wasm_bindgen(js_name = viewTransform)]
    pub fn view_transform(&self) -> Vec<f32> {
        self.editor.viewport().matrix().to_vec()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.editor.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.editor.can_redo()
    }

    /// Label of the step `undo` would reverse, e.g. for a button tooltip.
    #[wasm_bindgen(js_name = undoDescription)]
    pub fn undo_description(&self) -> Option<String> {
        self.editor.undo_stack().undo_description()
    }

    #[wasm_bindgen(js_name = redoDescription)]
    pub fn redo_description(&self) -> Option<String> {
        self.editor.undo_stack().redo_description()
    }

    /// Committed scene as native JSON.
    #[wasm_bindgen(js_name = sceneJson)]
    pub fn scene_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.editor.snapshot()).map_err(js_error)
    }

    /// Geometry in progress as JSON, or `null`.
    #[wasm_bindgen(js_name = previewJson)]
    pub fn preview_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.editor.preview()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = selectionJson)]
    pub fn selection_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.editor.selection()).map_err(js_error)
    }

    /// Render the scene with a registered format (`svg`, `png`, `coco`,
    /// `json`, `bundle`).
    pub fn export(&self, format: &str, include_background: bool) -> Result<Vec<u8>, JsValue> {
        let format = self.registry.require(format).map_err(js_error)?;
        let options = ExportOptions::new().include_background(include_background);
        let (bytes, result) = format
            .export_to_bytes(&self.editor.snapshot(), &options)
            .map_err(js_error)?;
        for warning in &result.warnings {
            log::warn!("{}: {}", format.id(), warning.message);
        }
        Ok(bytes)
    }

    #[wasm_bindgen(js_name = exportFilename)]
    pub fn export_filename(&self, format: &str) -> Result<String, JsValue> {
        let format = self.registry.require(format).map_err(js_error)?;
        Ok(format.default_filename().to_string())
    }

    /// Replace the scene with a native JSON export.
    #[wasm_bindgen(js_name = loadScene)]
    pub fn load_scene(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        let scene = self
            .registry
            .require("json")
            .and_then(|f| f.import(bytes))
            .map_err(js_error)?;
        self.editor.load_snapshot(scene).map_err(js_error)
    }
}
