//! Polygon Annotator - semantic segmentation annotation canvas
//!
//! A headless annotation editor: brush, polygon, rectangle and eraser tools on
//! a pannable, zoomable canvas, with class labels, selection, clipboard and
//! undo/redo. Scenes export to SVG, PNG, COCO JSON, a native JSON snapshot
//! and a ZIP bundle.
//!
//! Front ends translate their native input into [`input`] events and feed
//! them to an [`Editor`]. The `polygon-cli` binary replays recorded
//! [`script`]s; the wasm build exposes the editor to JavaScript.

pub mod color_utils;
pub mod config;
pub mod constants;
pub mod editor;
pub mod format;
pub mod geometry;
pub mod input;
pub mod keybindings;
pub mod model;
pub mod script;
pub mod undo;
pub mod viewport;

pub use config::AppConfig;
pub use editor::{Editor, EditorError};
pub use format::{ExportFormat, ExportOptions, FormatRegistry, SceneSnapshot};
pub use script::Script;

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
