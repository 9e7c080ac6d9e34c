//! Native scene JSON format.
//!
//! Full-fidelity dump of the [`SceneSnapshot`]: every object with its class,
//! color and geometry, the class list and the canvas settings. This is the
//! only format that can be loaded back into the editor.
//!
//! Image pixels are not embedded; layers are restored unloaded and keep their
//! `source` so they can be decoded again.

use crate::format::error::FormatError;
use crate::format::scene::{SCENE_VERSION, SceneSnapshot};
use crate::format::traits::{ExportFormat, ExportOptions, ExportResult};

/// Native scene JSON.
pub struct NativeJsonFormat;

impl ExportFormat for NativeJsonFormat {
    fn id(&self) -> &'static str {
        "json"
    }

    fn display_name(&self) -> &'static str {
        "Native JSON"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn default_filename(&self) -> &'static str {
        "canvas_export.polygon.json"
    }

    fn export_to_bytes(
        &self,
        scene: &SceneSnapshot,
        _options: &ExportOptions,
    ) -> Result<(Vec<u8>, ExportResult), FormatError> {
        let json = serde_json::to_string_pretty(scene)?;

        log::info!(
            "Serialized scene with {} objects and {} classes",
            scene.objects.len(),
            scene.classes.len()
        );

        Ok((
            json.into_bytes(),
            ExportResult {
                objects_exported: scene.objects.len(),
                ..ExportResult::default()
            },
        ))
    }

    fn import(&self, bytes: &[u8]) -> Result<SceneSnapshot, FormatError> {
        let scene: SceneSnapshot = serde_json::from_slice(bytes)?;

        if !SceneSnapshot::is_version_compatible(&scene.version) {
            return Err(FormatError::version_mismatch(SCENE_VERSION, scene.version));
        }

        log::info!(
            "Imported scene {}x{} with {} objects (format version {})",
            scene.width,
            scene.height,
            scene.objects.len(),
            scene.version
        );

        Ok(scene)
    }

    fn supports_import(&self) -> bool {
        true
    }
}
