//! Scene export/import system.
//!
//! This module provides a trait-based system for exporting the canvas in
//! various formats. New formats are added by implementing the
//! [`ExportFormat`] trait and registering them with a [`FormatRegistry`].
//!
//! ## Supported Formats
//!
//! - **SVG**: Vector image; every object tagged with its id, category and class
//! - **PNG**: Raster image at canvas size
//! - **COCO JSON**: Industry standard for object detection/segmentation
//! - **Native JSON**: Full-fidelity scene snapshot, importable
//! - **Bundle**: ZIP archive with the SVG, PNG and COCO exports
//!
//! All exports use scene coordinates; the viewport (pan/zoom) never affects
//! the output.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use polygon_annotator::format::{ExportOptions, FormatRegistry};
//!
//! let registry = FormatRegistry::new();
//! let coco = registry.get("coco").unwrap();
//! let (bytes, result) = coco.export_to_bytes(&editor.snapshot(), &ExportOptions::default())?;
//! ```

mod error;
pub mod formats;
mod registry;
mod scene;
mod traits;

pub use error::FormatError;
pub use registry::FormatRegistry;
pub use scene::{SCENE_VERSION, SceneSnapshot};
pub use traits::{ExportFormat, ExportOptions, ExportResult, FormatWarning, WarningSeverity};
