//! The drawing/editing state machine.
//!
//! [`Editor`] consumes pointer, wheel and keyboard events, accumulates the
//! geometry of the shape in progress and commits finished shapes as
//! class-labeled, undoable [`CanvasObject`]s. It is the whole "canvas" of the
//! application: front ends only forward events and draw [`Editor::objects`]
//! plus [`Editor::preview`].
//!
//! The implementation is split by concern:
//! - `drawing`: brush, eraser, rectangle and polygon gestures
//! - `selection`: hit testing, select-drag and marquee selection
//! - `clipboard`: copy/cut/paste/duplicate/delete/clear
//! - `history`: undo/redo
//! - `shortcuts`: keyboard dispatch

mod clipboard;
mod drawing;
mod history;
mod selection;
mod shortcuts;

pub use drawing::{DrawingState, Preview};

use std::mem;
use std::path::Path;

use thiserror::Error;

use crate::config::AppConfig;
use crate::constants::{
    DEFAULT_BACKGROUND_COLOR, DEFAULT_BRUSH_SIZE, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH,
    DEFAULT_STROKE_COLOR, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE, POLYGON_CLOSE_THRESHOLD,
};
use crate::format::{SCENE_VERSION, SceneSnapshot};
use crate::geometry::Point;
use crate::input::{PointerEvent, PointerKind, WheelEvent};
use crate::keybindings::KeyBindings;
use crate::model::{
    CanvasObject, ClassError, ClassLabel, ClassRegistry, DrawTool, ImageLayer, ObjectId,
    ObjectShape, ToolMode,
};
use crate::undo::{Command, UndoStack};
use crate::viewport::Viewport;

/// Errors returned by editor operations that take external input.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("class error: {0}")]
    Class(#[from] ClassError),

    #[error("unknown class '{0}'")]
    UnknownClass(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid canvas size {width}x{height}")]
    InvalidCanvasSize { width: u32, height: u32 },

    #[error("invalid color '{0}'")]
    InvalidColor(String),
}

/// Headless annotation canvas.
#[derive(Debug, Clone)]
pub struct Editor {
    width: u32,
    height: u32,
    /// Committed objects in z-order (last is top-most)
    objects: Vec<CanvasObject>,
    classes: ClassRegistry,
    viewport: Viewport,
    mode: ToolMode,
    draw_tool: DrawTool,
    brush_size: f32,
    fill_shapes: bool,
    state: DrawingState,
    /// Vertices of the polygon being built; survives a switch to pan mode
    pending_polygon: Vec<Point>,
    /// Last pointer position in scene coordinates
    hover: Option<Point>,
    selection: Vec<ObjectId>,
    clipboard: Vec<CanvasObject>,
    paste_count: u32,
    undo_stack: UndoStack,
    background_color: String,
    background: Option<ImageLayer>,
    keybindings: KeyBindings,
    default_stroke_color: String,
    close_threshold: f32,
    next_id: ObjectId,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT)
    }
}

impl Editor {
    /// Create an empty canvas of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            objects: Vec::new(),
            classes: ClassRegistry::new(),
            viewport: Viewport::identity(),
            mode: ToolMode::default(),
            draw_tool: DrawTool::default(),
            brush_size: DEFAULT_BRUSH_SIZE,
            fill_shapes: false,
            state: DrawingState::Idle,
            pending_polygon: Vec::new(),
            hover: None,
            selection: Vec::new(),
            clipboard: Vec::new(),
            paste_count: 0,
            undo_stack: UndoStack::new(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            background: None,
            keybindings: KeyBindings::default(),
            default_stroke_color: DEFAULT_STROKE_COLOR.to_string(),
            close_threshold: POLYGON_CLOSE_THRESHOLD,
            next_id: 1,
        }
    }

    /// Create an editor with the preferences, key bindings and classes of a
    /// configuration. Invalid configured classes are skipped with a warning.
    pub fn from_config(config: &AppConfig) -> Self {
        let prefs = &config.preferences;
        let mut editor = Self::new(prefs.canvas_width, prefs.canvas_height);
        editor.set_brush_size(prefs.default_brush_size);
        editor.fill_shapes = prefs.fill_shapes;
        editor.close_threshold = prefs.polygon_close_threshold.max(0.0);
        editor.keybindings = config.keybindings.clone();
        match crate::color_utils::normalize_hex(&prefs.default_stroke_color) {
            Some(color) => editor.default_stroke_color = color,
            None => log::warn!(
                "Ignoring invalid default stroke color '{}'",
                prefs.default_stroke_color
            ),
        }
        for class in &config.classes {
            if let Err(e) = editor.classes.add(&class.name, &class.color) {
                log::warn!("Skipping configured class '{}': {}", class.name, e);
            }
        }
        editor
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Committed objects in z-order.
    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    pub fn object(&self, id: ObjectId) -> Option<&CanvasObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn draw_tool(&self) -> DrawTool {
        self.draw_tool
    }

    pub fn brush_size(&self) -> f32 {
        self.brush_size
    }

    pub fn fill_shapes(&self) -> bool {
        self.fill_shapes
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    /// Vertices placed so far for the polygon in progress.
    pub fn pending_polygon(&self) -> &[Point] {
        &self.pending_polygon
    }

    /// Ids of the selected objects.
    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    pub fn clipboard(&self) -> &[CanvasObject] {
        &self.clipboard
    }

    pub fn background_color(&self) -> &str {
        &self.background_color
    }

    pub fn background(&self) -> Option<&ImageLayer> {
        self.background.as_ref()
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    pub fn undo_stack(&self) -> &UndoStack {
        &self.undo_stack
    }

    /// Color applied to new shapes: the selected class color, else the default.
    pub fn stroke_color(&self) -> &str {
        self.classes
            .selected()
            .map(|c| c.color.as_str())
            .unwrap_or(&self.default_stroke_color)
    }

    // ------------------------------------------------------------------
    // Tools and settings
    // ------------------------------------------------------------------

    /// Switch the interaction mode.
    ///
    /// Any drag in progress is ended. The pending polygon survives a switch to
    /// pan mode and is discarded by a switch to select mode.
    pub fn set_mode(&mut self, mode: ToolMode) {
        self.end_gesture();
        if mode == ToolMode::Select {
            self.discard_pending_polygon();
        }
        if self.mode != mode {
            log::debug!("🖱️ Mode: {} -> {}", self.mode.name(), mode.name());
        }
        self.mode = mode;
    }

    /// Switch the draw tool and enter draw mode.
    ///
    /// Picking a different tool discards the pending polygon.
    pub fn set_draw_tool(&mut self, tool: DrawTool) {
        self.end_gesture();
        if tool != self.draw_tool {
            self.discard_pending_polygon();
            log::debug!("🖌️ Draw tool: {}", tool.name());
        }
        self.draw_tool = tool;
        self.mode = ToolMode::Draw;
    }

    /// Set the brush size, clamped to the supported range.
    pub fn set_brush_size(&mut self, size: f32) {
        self.brush_size = if size.is_nan() {
            DEFAULT_BRUSH_SIZE
        } else {
            size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
        };
    }

    pub fn set_fill_shapes(&mut self, fill: bool) {
        self.fill_shapes = fill;
    }

    /// Resize the canvas. Objects keep their scene coordinates.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> Result<(), EditorError> {
        if width == 0 || height == 0 {
            return Err(EditorError::InvalidCanvasSize { width, height });
        }
        self.width = width;
        self.height = height;
        log::debug!("Canvas resized to {}x{}", width, height);
        Ok(())
    }

    pub fn set_background_color(&mut self, color: &str) -> Result<(), EditorError> {
        let color = crate::color_utils::normalize_hex(color)
            .ok_or_else(|| EditorError::InvalidColor(color.to_string()))?;
        self.background_color = color;
        Ok(())
    }

    /// Set (or replace) the background image.
    pub fn set_background(&mut self, layer: ImageLayer) {
        log::info!(
            "🖼️ Background image '{}' ({}x{})",
            layer.source,
            layer.width,
            layer.height
        );
        self.background = Some(layer);
    }

    /// Load the background image from a file.
    pub fn set_background_from_path(&mut self, path: &Path) -> Result<(), EditorError> {
        let layer = ImageLayer::open(path)?;
        self.set_background(layer);
        Ok(())
    }

    /// Remove the background image, returning it.
    pub fn remove_background(&mut self) -> Option<ImageLayer> {
        let layer = self.background.take()?;
        log::info!("🖼️ Removed background image '{}'", layer.source);
        Some(layer)
    }

    /// Place an image as a movable object with its top-left corner at `(x, y)`.
    pub fn add_image_object(&mut self, layer: ImageLayer, x: f32, y: f32) -> ObjectId {
        let width = layer.width as f32;
        let shape = ObjectShape::Image { layer, x, y };
        let object = CanvasObject::new(self.allocate_id(), shape, self.stroke_color(), 0.0)
            .with_class(self.selected_class_name());
        log::debug!("🖼️ Placed image object ({} px wide)", width);
        self.commit_object(object)
    }

    // ------------------------------------------------------------------
    // Classes
    // ------------------------------------------------------------------

    pub fn add_class(&mut self, name: &str, color: &str) -> Result<ClassLabel, EditorError> {
        Ok(self.classes.add(name, color)?.clone())
    }

    /// Remove a class. Objects labeled with it keep the (now unknown) name.
    pub fn remove_class(&mut self, name: &str) -> Option<ClassLabel> {
        self.classes.remove(name)
    }

    /// Select the class new shapes are labeled with. Unknown names clear it.
    pub fn select_class(&mut self, name: &str) -> Option<&ClassLabel> {
        self.classes.select(name)
    }

    pub fn select_class_index(&mut self, index: usize) -> Option<&ClassLabel> {
        self.classes.select_index(index)
    }

    pub fn clear_class_selection(&mut self) {
        self.classes.clear_selection();
    }

    fn selected_class_name(&self) -> Option<String> {
        self.classes.selected().map(|c| c.name.clone())
    }

    // ------------------------------------------------------------------
    // Viewport
    // ------------------------------------------------------------------

    pub fn set_zoom(&mut self, level: f32) {
        self.viewport.set_zoom(level);
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset();
        log::debug!("🔍 Zoom reset");
    }

    fn canvas_center(&self) -> Point {
        Point::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    // ------------------------------------------------------------------
    // Event dispatch
    // ------------------------------------------------------------------

    /// Feed a pointer event. Returns true when the event changed editor state.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> bool {
        let screen = Point::new(event.x, event.y);
        let scene = self.viewport.screen_to_scene(screen);

        match event.kind {
            PointerKind::Down => self.pointer_down(screen, scene, event.modifiers.shift),
            PointerKind::Move => self.pointer_move(screen, scene),
            PointerKind::Up => self.pointer_up(scene),
        }
    }

    fn pointer_down(&mut self, screen: Point, scene: Point, shift: bool) -> bool {
        // A down without a matching up ends the previous gesture first
        self.end_gesture();

        match self.mode {
            ToolMode::Pan => {
                self.state = DrawingState::Panning { last: screen };
                true
            }
            ToolMode::Select => self.select_down(scene, shift),
            ToolMode::Draw => self.draw_down(scene),
        }
    }

    fn pointer_move(&mut self, screen: Point, scene: Point) -> bool {
        self.hover = Some(scene);

        if let DrawingState::Panning { last } = &mut self.state {
            let (dx, dy) = (screen.x - last.x, screen.y - last.y);
            *last = screen;
            self.viewport.pan_by(dx, dy);
            return true;
        }

        match self.state {
            DrawingState::Idle | DrawingState::Panning { .. } => {
                self.mode == ToolMode::Draw && !self.pending_polygon.is_empty()
            }
            DrawingState::MovingSelection { .. } | DrawingState::Marquee { .. } => {
                self.select_move(scene)
            }
            DrawingState::Stroke { .. } | DrawingState::Rectangle { .. } => self.draw_move(scene),
        }
    }

    fn pointer_up(&mut self, scene: Point) -> bool {
        match mem::replace(&mut self.state, DrawingState::Idle) {
            DrawingState::Idle => false,
            DrawingState::Panning { .. } => true,
            state @ (DrawingState::MovingSelection { .. } | DrawingState::Marquee { .. }) => {
                self.select_up(state, scene)
            }
            state @ (DrawingState::Stroke { .. } | DrawingState::Rectangle { .. }) => {
                self.draw_up(state, scene)
            }
        }
    }

    /// Feed a wheel event. Ctrl+wheel zooms around the pointer; plain wheel
    /// events are left to the host.
    pub fn handle_wheel(&mut self, event: WheelEvent) -> bool {
        if !event.modifiers.ctrl {
            return false;
        }
        self.viewport
            .wheel_zoom(event.delta_y, Point::new(event.x, event.y));
        log::debug!("🔍 Zoom {:.0}%", self.viewport.zoom_percent());
        true
    }

    /// End the drag in progress, if any. A select-drag that already moved
    /// objects is recorded; other partial gestures are dropped.
    fn end_gesture(&mut self) {
        match mem::replace(&mut self.state, DrawingState::Idle) {
            DrawingState::MovingSelection { total, .. } => self.record_move(total),
            DrawingState::Stroke { .. } | DrawingState::Rectangle { .. } => {
                log::debug!("Dropped unfinished {} gesture", self.draw_tool.name());
            }
            _ => {}
        }
    }

    /// Abort the gesture in progress and reset the pending polygon and the
    /// selection. Live select-drag offsets are rolled back.
    pub fn cancel(&mut self) {
        if let DrawingState::MovingSelection { total, .. } =
            mem::replace(&mut self.state, DrawingState::Idle)
        {
            self.translate_selection(-total.x, -total.y);
        }
        self.discard_pending_polygon();
        self.selection.clear();
    }

    fn discard_pending_polygon(&mut self) {
        if !self.pending_polygon.is_empty() {
            log::debug!(
                "Discarded pending polygon with {} vertices",
                self.pending_polygon.len()
            );
            self.pending_polygon.clear();
        }
    }

    // ------------------------------------------------------------------
    // Object bookkeeping
    // ------------------------------------------------------------------

    fn allocate_id(&mut self) -> ObjectId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append an object on top and record it for undo.
    fn commit_object(&mut self, object: CanvasObject) -> ObjectId {
        let id = object.id;
        let index = self.objects.len();
        log::info!("✅ Committed {}", object.object_id());
        self.objects.push(object.clone());
        self.undo_stack.push(Command::AddObjects {
            entries: vec![(index, object)],
        });
        id
    }

    /// Drop selected ids that no longer refer to an object.
    fn prune_selection(&mut self) {
        let objects = &self.objects;
        self.selection.retain(|id| objects.iter().any(|o| o.id == *id));
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    /// Export model of the current scene. Pending geometry is not included.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            version: SCENE_VERSION.to_string(),
            width: self.width,
            height: self.height,
            background_color: self.background_color.clone(),
            background: self.background.clone(),
            classes: self.classes.iter().cloned().collect(),
            objects: self.objects.clone(),
        }
    }

    /// Replace the scene with a saved snapshot.
    ///
    /// History, selection, clipboard and the gesture in progress are reset;
    /// tool, brush and viewport settings are kept.
    /// The editor is left untouched when the snapshot is rejected.
    pub fn load_snapshot(&mut self, snapshot: SceneSnapshot) -> Result<(), EditorError> {
        let (width, height) = (snapshot.width, snapshot.height);
        if width == 0 || height == 0 {
            return Err(EditorError::InvalidCanvasSize { width, height });
        }
        let mut classes = ClassRegistry::new();
        for class in &snapshot.classes {
            classes.add(&class.name, &class.color)?;
        }

        self.width = width;
        self.height = height;
        self.background_color = crate::color_utils::normalize_hex(&snapshot.background_color)
            .unwrap_or_else(|| DEFAULT_BACKGROUND_COLOR.to_string());
        self.background = snapshot.background;
        self.classes = classes;
        self.next_id = snapshot.objects.iter().map(|o| o.id).max().unwrap_or(0) + 1;
        self.objects = snapshot.objects;
        self.state = DrawingState::Idle;
        self.pending_polygon.clear();
        self.selection.clear();
        self.clipboard.clear();
        self.paste_count = 0;
        self.undo_stack.clear();

        log::info!(
            "📂 Loaded scene {}x{} with {} objects",
            self.width,
            self.height,
            self.objects.len()
        );
        Ok(())
    }
}
