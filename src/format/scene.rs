//! Scene snapshot used as the intermediate representation by every format.
//!
//! # Versioning
//!
//! The native scene format uses semantic versioning (MAJOR.MINOR.PATCH):
//!
//! - **Version 0.x.x**: Unstable development versions. The format may change
//!   in breaking ways between any 0.x releases.
//!
//! - **Version 1.x.x** (future): Breaking changes only in major version bumps.

use serde::{Deserialize, Serialize};

use crate::model::{CanvasObject, ClassLabel, ImageLayer};

/// Current version of the native scene format.
pub const SCENE_VERSION: &str = "0.1.0";

/// Everything an export needs: canvas, classes and committed objects in
/// z-order. All coordinates are scene coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Format version for compatibility checking.
    pub version: String,

    pub width: u32,
    pub height: u32,

    /// `#rrggbb` canvas background color.
    pub background_color: String,

    /// Background image, drawn at its natural size from the top-left corner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<ImageLayer>,

    /// Classes in registry order.
    #[serde(default)]
    pub classes: Vec<ClassLabel>,

    pub objects: Vec<CanvasObject>,
}

impl SceneSnapshot {
    /// Major and minor version numbers for compatibility checking.
    pub const VERSION_MAJOR: u32 = 0;
    pub const VERSION_MINOR: u32 = 1;

    /// Create an empty scene of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            version: SCENE_VERSION.to_string(),
            width,
            height,
            background_color: crate::constants::DEFAULT_BACKGROUND_COLOR.to_string(),
            background: None,
            classes: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Parse a version string into (major, minor, patch) components.
    ///
    /// Returns None if the version string is invalid.
    pub fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
        let parts: Vec<&str> = version.split('.').collect();
        if parts.len() != 3 {
            return None;
        }
        let major = parts[0].parse().ok()?;
        let minor = parts[1].parse().ok()?;
        let patch = parts[2].parse().ok()?;
        Some((major, minor, patch))
    }

    /// Check if a version is compatible with the current version.
    ///
    /// For version 0.x.x (unstable), only exact minor version matches are compatible.
    /// For version 1.x.x+, any file with the same major version is compatible.
    pub fn is_version_compatible(file_version: &str) -> bool {
        let Some((file_major, file_minor, _)) = Self::parse_version(file_version) else {
            return false;
        };

        if Self::VERSION_MAJOR == 0 {
            file_major == 0 && file_minor == Self::VERSION_MINOR
        } else {
            file_major == Self::VERSION_MAJOR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(SceneSnapshot::parse_version("0.1.0"), Some((0, 1, 0)));
        assert_eq!(SceneSnapshot::parse_version("1.2"), None);
        assert_eq!(SceneSnapshot::parse_version("a.b.c"), None);
    }

    #[test]
    fn test_version_compatibility() {
        assert!(SceneSnapshot::is_version_compatible(SCENE_VERSION));
        assert!(SceneSnapshot::is_version_compatible("0.1.7"));
        assert!(!SceneSnapshot::is_version_compatible("0.2.0"));
        assert!(!SceneSnapshot::is_version_compatible("1.0.0"));
        assert!(!SceneSnapshot::is_version_compatible("garbage"));
    }
}
