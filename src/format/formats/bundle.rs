//! ZIP bundle holding the SVG, PNG and COCO exports of one scene.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::format::error::FormatError;
use crate::format::formats::{CocoFormat, PngFormat, SvgFormat};
use crate::format::scene::SceneSnapshot;
use crate::format::traits::{ExportFormat, ExportOptions, ExportResult};

/// ZIP archive of the other exports, each under its default file name.
pub struct BundleFormat;

impl BundleFormat {
    /// Formats written into the archive, in entry order.
    pub fn members() -> [&'static dyn ExportFormat; 3] {
        [&SvgFormat, &PngFormat, &CocoFormat]
    }
}

impl ExportFormat for BundleFormat {
    fn id(&self) -> &'static str {
        "bundle"
    }

    fn display_name(&self) -> &'static str {
        "ZIP bundle"
    }

    fn extension(&self) -> &'static str {
        "zip"
    }

    fn mime_type(&self) -> &'static str {
        "application/zip"
    }

    fn default_filename(&self) -> &'static str {
        "canvas_export.zip"
    }

    fn export_to_bytes(
        &self,
        scene: &SceneSnapshot,
        options: &ExportOptions,
    ) -> Result<(Vec<u8>, ExportResult), FormatError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let file_options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut result = ExportResult::new();

        for member in Self::members() {
            let (bytes, member_result) = member.export_to_bytes(scene, options)?;
            zip.start_file(member.default_filename(), file_options)?;
            zip.write_all(&bytes)?;

            log::debug!(
                "Added {} ({} bytes) to bundle",
                member.default_filename(),
                bytes.len()
            );
            result.objects_exported = result.objects_exported.max(member_result.objects_exported);
            result.merge(member_result);
        }

        let bytes = zip.finish()?.into_inner();
        log::info!("Bundled {} exports ({} bytes)", Self::members().len(), bytes.len());
        Ok((bytes, result))
    }
}
