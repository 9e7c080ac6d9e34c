//! Trait definitions for export format implementations.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::format::error::FormatError;
use crate::format::scene::SceneSnapshot;

/// Trait for scene export (and optional import) implementations.
///
/// Each format (SVG, PNG, COCO, native JSON, ZIP bundle) implements this
/// trait to convert a [`SceneSnapshot`] into the bytes of one file.
pub trait ExportFormat: Send + Sync {
    /// Unique identifier for this format (e.g., "svg", "png", "coco").
    fn id(&self) -> &'static str;

    /// Human-readable name for display.
    fn display_name(&self) -> &'static str;

    /// File extension without the dot (e.g., "json" for COCO).
    fn extension(&self) -> &'static str;

    fn mime_type(&self) -> &'static str;

    /// File name used when the caller does not pick one.
    fn default_filename(&self) -> &'static str;

    /// Render the scene into the bytes of a file.
    fn export_to_bytes(
        &self,
        scene: &SceneSnapshot,
        options: &ExportOptions,
    ) -> Result<(Vec<u8>, ExportResult), FormatError>;

    /// Export the scene to `path`.
    fn export(
        &self,
        scene: &SceneSnapshot,
        path: &Path,
        options: &ExportOptions,
    ) -> Result<ExportResult, FormatError> {
        let (bytes, mut result) = self.export_to_bytes(scene, options)?;
        std::fs::write(path, bytes)?;
        log::info!(
            "💾 Exported {} objects as {} to {:?}",
            result.objects_exported,
            self.display_name(),
            path
        );
        result.files_created.push(path.display().to_string());
        Ok(result)
    }

    /// Parse a file produced by this format back into a scene.
    fn import(&self, _bytes: &[u8]) -> Result<SceneSnapshot, FormatError> {
        Err(FormatError::UnsupportedOperation(format!(
            "{} cannot be imported",
            self.display_name()
        )))
    }

    fn supports_import(&self) -> bool {
        false
    }
}

/// Options for export operations.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Timestamp written into formats that record one; `None` uses the
    /// current time.
    pub timestamp: Option<DateTime<Utc>>,

    /// Whether the background image is rendered/referenced.
    pub include_background: bool,

    /// Whether the PNG export paints the background color (otherwise the
    /// canvas is transparent where nothing is drawn).
    pub png_background: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            timestamp: None,
            include_background: true,
            png_background: true,
        }
    }
}

impl ExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed timestamp.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn include_background(mut self, include: bool) -> Self {
        self.include_background = include;
        self
    }

    pub fn png_background(mut self, paint: bool) -> Self {
        self.png_background = paint;
        self
    }

    /// The configured timestamp, or now.
    pub fn resolved_timestamp(&self) -> DateTime<Utc> {
        self.timestamp.unwrap_or_else(Utc::now)
    }
}

/// Result of an export operation.
#[derive(Debug, Default)]
pub struct ExportResult {
    /// Number of canvas objects written.
    pub objects_exported: usize,

    /// Warnings generated during export (e.g., skipped shapes).
    pub warnings: Vec<FormatWarning>,

    /// Files created during export.
    pub files_created: Vec<String>,
}

impl ExportResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, warning: FormatWarning) {
        self.warnings.push(warning);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check if there were any errors (severe warnings).
    pub fn has_errors(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w.severity, WarningSeverity::Error))
    }

    /// Fold another result (e.g. a bundle member) into this one.
    pub fn merge(&mut self, other: ExportResult) {
        self.warnings.extend(other.warnings);
        self.files_created.extend(other.files_created);
    }
}

/// Warning generated during format conversion.
#[derive(Debug, Clone)]
pub struct FormatWarning {
    /// Tag of the object this warning relates to (if applicable).
    pub object_id: Option<String>,

    /// Human-readable warning message.
    pub message: String,

    pub severity: WarningSeverity,
}

impl FormatWarning {
    pub fn new(message: impl Into<String>, severity: WarningSeverity) -> Self {
        Self {
            object_id: None,
            message: message.into(),
            severity,
        }
    }

    /// Create an info-level warning.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, WarningSeverity::Info)
    }

    /// Create a warning-level warning.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, WarningSeverity::Warning)
    }

    /// Create an error-level warning.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, WarningSeverity::Error)
    }

    /// Set the object this warning relates to.
    pub fn with_object(mut self, object_id: impl Into<String>) -> Self {
        self.object_id = Some(object_id.into());
        self
    }
}

/// Severity level for format warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    /// Informational message, not a problem.
    Info,
    /// Warning that something was skipped or modified.
    Warning,
    /// Error that may affect data integrity.
    Error,
}
