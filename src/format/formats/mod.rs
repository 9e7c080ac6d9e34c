//! Export format implementations.

mod bundle;
mod coco;
mod native_json;
mod png;
mod svg;

#[cfg(test)]
mod tests;

pub use bundle::BundleFormat;
pub use coco::{CocoFormat, DEFAULT_IMAGE_FILE_NAME, FALLBACK_CATEGORY};
pub use native_json::NativeJsonFormat;
pub use png::PngFormat;
pub use svg::SvgFormat;
