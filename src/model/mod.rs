//! Data models for the annotation canvas.

mod class;
mod image_layer;
mod object;
mod tool;

pub use class::{ClassError, ClassLabel, ClassRegistry};
pub use image_layer::ImageLayer;
pub use object::{CanvasObject, MIN_POLYGON_VERTICES, MIN_RECT_SIZE, ObjectId, ObjectShape};
pub use tool::{DrawTool, ToolMode};
