//! Global constants for the annotation canvas.

/// Default brush size (stroke width) for freehand and rectangle tools.
pub const DEFAULT_BRUSH_SIZE: f32 = 10.0;

/// Smallest and largest brush size accepted by the editor.
pub const MIN_BRUSH_SIZE: f32 = 1.0;
pub const MAX_BRUSH_SIZE: f32 = 100.0;

/// Stroke color used when no class is selected.
pub const DEFAULT_STROKE_COLOR: &str = "#532ee3";

/// Canvas background color after a reset or clear.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#ffffff";

/// Default canvas width
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;

/// Default canvas height
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// Alpha applied to the class color when filling polygons and rectangles.
pub const FILL_ALPHA: f32 = 0.3;

/// Stroke width of a closed polygon outline.
pub const POLYGON_STROKE_WIDTH: f32 = 2.0;

/// A polygon click closer than this (scene units) to the first vertex closes it.
pub const POLYGON_CLOSE_THRESHOLD: f32 = 10.0;

/// Offset applied to pasted and duplicated objects.
pub const PASTE_OFFSET: f32 = 10.0;

/// Pick tolerance around strokes, in screen pixels.
pub const HIT_TOLERANCE: f32 = 4.0;

/// Maximum number of commands kept in the undo history.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Viewport zoom limits and step factors.
pub mod zoom {
    /// Minimum zoom level (1%)
    pub const MIN: f32 = 0.01;
    /// Maximum zoom level (2000%)
    pub const MAX: f32 = 20.0;
    /// Base of the exponential wheel zoom (`zoom *= BASE ^ delta_y`)
    pub const WHEEL_BASE: f32 = 0.9999;
    /// Factor used by the keyboard zoom in/out shortcuts
    pub const STEP_FACTOR: f32 = 1.2;
}
