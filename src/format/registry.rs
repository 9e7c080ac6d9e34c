//! Format registry for discovering and accessing export formats.

use std::collections::BTreeMap;

use crate::format::error::FormatError;
use crate::format::formats::{BundleFormat, CocoFormat, NativeJsonFormat, PngFormat, SvgFormat};
use crate::format::traits::ExportFormat;

/// Registry of available export formats.
///
/// All built-in formats are registered automatically on creation.
pub struct FormatRegistry {
    formats: BTreeMap<&'static str, Box<dyn ExportFormat>>,
}

impl FormatRegistry {
    /// Create a new registry with all built-in formats registered.
    pub fn new() -> Self {
        let mut registry = Self {
            formats: BTreeMap::new(),
        };

        registry.register(Box::new(SvgFormat));
        registry.register(Box::new(PngFormat));
        registry.register(Box::new(CocoFormat));
        registry.register(Box::new(NativeJsonFormat));
        registry.register(Box::new(BundleFormat));

        registry
    }

    /// Register a format implementation, replacing any with the same id.
    pub fn register(&mut self, format: Box<dyn ExportFormat>) {
        self.formats.insert(format.id(), format);
    }

    /// Get a format by its ID.
    pub fn get(&self, id: &str) -> Option<&dyn ExportFormat> {
        self.formats.get(id).map(|f| f.as_ref())
    }

    /// Get a format by its ID, as a `Result`.
    pub fn require(&self, id: &str) -> Result<&dyn ExportFormat, FormatError> {
        self.get(id)
            .ok_or_else(|| FormatError::UnknownFormat(id.to_string()))
    }

    /// Find formats by file extension (with or without the leading dot).
    pub fn by_extension(&self, ext: &str) -> Vec<&dyn ExportFormat> {
        let ext = ext.trim_start_matches('.');
        self.formats
            .values()
            .filter(|f| f.extension().eq_ignore_ascii_case(ext))
            .map(|f| f.as_ref())
            .collect()
    }

    /// Get all registered formats, ordered by id.
    pub fn all(&self) -> Vec<&dyn ExportFormat> {
        self.formats.values().map(|f| f.as_ref()).collect()
    }

    /// Get all format IDs, sorted.
    pub fn ids(&self) -> Vec<&'static str> {
        self.formats.keys().copied().collect()
    }

    /// Formats that can read their own output back.
    pub fn importable(&self) -> Vec<&dyn ExportFormat> {
        self.all()
            .into_iter()
            .filter(|f| f.supports_import())
            .collect()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_formats() {
        let registry = FormatRegistry::new();
        assert_eq!(registry.ids(), vec!["bundle", "coco", "json", "png", "svg"]);
        assert!(registry.get("coco").is_some());
        assert!(registry.get("voc").is_none());
    }

    #[test]
    fn test_by_extension() {
        let registry = FormatRegistry::new();
        let json: Vec<_> = registry
            .by_extension(".json")
            .iter()
            .map(|f| f.id())
            .collect();
        assert_eq!(json, vec!["coco", "json"]);
        assert_eq!(registry.by_extension("PNG")[0].id(), "png");
    }

    #[test]
    fn test_require_unknown() {
        let registry = FormatRegistry::new();
        assert!(matches!(
            registry.require("tiff"),
            Err(FormatError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_importable_formats() {
        let registry = FormatRegistry::new();
        let ids: Vec<_> = registry.importable().iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec!["json"]);
    }
}
