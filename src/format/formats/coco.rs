//! COCO JSON format implementation.
//!
//! Implements the COCO (Common Objects in Context) annotation format,
//! which is widely used for object detection and segmentation tasks. The
//! canvas is written as a single image.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::format::error::FormatError;
use crate::format::scene::SceneSnapshot;
use crate::format::traits::{ExportFormat, ExportOptions, ExportResult, FormatWarning};
use crate::model::{CanvasObject, ObjectShape};

/// File name used for the image entry when there is no background image.
pub const DEFAULT_IMAGE_FILE_NAME: &str = "canvas_export.png";

/// Name and supercategory of the category used for unlabeled objects.
pub const FALLBACK_CATEGORY: &str = "shape";

/// COCO JSON format.
///
/// Supports:
/// - Polygons (segmentation + bbox + shoelace area)
/// - Rectangles (4-corner segmentation)
/// - Brush strokes (bbox only, empty segmentation)
/// - One category per class, plus a fallback for unlabeled objects
///
/// Does not support:
/// - Eraser strokes and placed images (skipped with a warning)
pub struct CocoFormat;

impl ExportFormat for CocoFormat {
    fn id(&self) -> &'static str {
        "coco"
    }

    fn display_name(&self) -> &'static str {
        "COCO (JSON)"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn mime_type(&self) -> &'static str {
        "application/json"
    }

    fn default_filename(&self) -> &'static str {
        "coco_export.json"
    }

    fn export_to_bytes(
        &self,
        scene: &SceneSnapshot,
        options: &ExportOptions,
    ) -> Result<(Vec<u8>, ExportResult), FormatError> {
        let timestamp = options.resolved_timestamp();
        let date = timestamp.to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let mut result = ExportResult::new();

        let file_name = scene
            .background
            .as_ref()
            .filter(|_| options.include_background)
            .map(|layer| layer.file_name())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_IMAGE_FILE_NAME.to_string());

        let mut coco = CocoDataset {
            info: CocoInfo {
                description: "Canvas Export".into(),
                url: String::new(),
                version: "1.0".into(),
                year: timestamp.year(),
                contributor: String::new(),
                date_created: date.clone(),
            },
            licenses: vec![CocoLicense {
                url: "http://creativecommons.org/licenses/by-nc-sa/2.0/".into(),
                id: 1,
                name: "Attribution-NonCommercial-ShareAlike License".into(),
            }],
            images: vec![CocoImage {
                license: 1,
                file_name,
                coco_url: String::new(),
                height: scene.height,
                width: scene.width,
                date_captured: date,
                flickr_url: String::new(),
                id: 1,
            }],
            annotations: Vec::new(),
            categories: scene
                .classes
                .iter()
                .enumerate()
                .map(|(i, class)| CocoCategory {
                    supercategory: "class".into(),
                    id: i as u32 + 1,
                    name: class.name.clone(),
                })
                .collect(),
        };

        let fallback_id = scene.classes.len() as u32 + 1;
        let mut needs_fallback = false;

        for object in &scene.objects {
            let Some(segmentation) = segmentation(object) else {
                result.add_warning(
                    FormatWarning::info(format!(
                        "{} objects are not exported to COCO",
                        object.category()
                    ))
                    .with_object(object.object_id()),
                );
                continue;
            };
            let Some(bounds) = object.bounding_box() else {
                continue;
            };

            let category_id = match object
                .class_name
                .as_deref()
                .and_then(|name| scene.classes.iter().position(|c| c.name == name))
            {
                Some(index) => index as u32 + 1,
                None => {
                    needs_fallback = true;
                    fallback_id
                }
            };

            coco.annotations.push(CocoAnnotation {
                segmentation,
                area: object.shape.area(),
                iscrowd: 0,
                image_id: 1,
                bbox: bounds.to_xywh(),
                category_id,
                id: coco.annotations.len() as u64 + 1,
            });
        }

        if needs_fallback {
            coco.categories.push(CocoCategory {
                supercategory: FALLBACK_CATEGORY.into(),
                id: fallback_id,
                name: fallback_name(scene),
            });
        }

        result.objects_exported = coco.annotations.len();
        let json = serde_json::to_string_pretty(&coco)?;

        log::info!(
            "Exported {} COCO annotations in {} categories ({} warnings)",
            coco.annotations.len(),
            coco.categories.len(),
            result.warnings.len()
        );

        Ok((json.into_bytes(), result))
    }
}

/// Name of the fallback category, suffixed when a class already uses it.
fn fallback_name(scene: &SceneSnapshot) -> String {
    let taken = |name: &str| scene.classes.iter().any(|c| c.name == name);
    if !taken(FALLBACK_CATEGORY) {
        return FALLBACK_CATEGORY.to_string();
    }
    (2..)
        .map(|n| format!("{}_{}", FALLBACK_CATEGORY, n))
        .find(|name| !taken(name))
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
}

/// Flattened `[x1, y1, x2, y2, ...]` outlines, or `None` for objects COCO
/// cannot represent. Brush strokes have no outline.
fn segmentation(object: &CanvasObject) -> Option<Vec<Vec<f32>>> {
    match &object.shape {
        ObjectShape::Polygon { vertices } => Some(vec![
            vertices.iter().flat_map(|p| [p.x, p.y]).collect(),
        ]),
        ObjectShape::Rectangle { bounds } => Some(vec![
            bounds.corners().iter().flat_map(|p| [p.x, p.y]).collect(),
        ]),
        ObjectShape::Brush { .. } => Some(Vec::new()),
        ObjectShape::Eraser { .. } | ObjectShape::Image { .. } => None,
    }
}

// COCO format structures

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CocoDataset {
    pub info: CocoInfo,
    pub licenses: Vec<CocoLicense>,
    pub images: Vec<CocoImage>,
    pub annotations: Vec<CocoAnnotation>,
    pub categories: Vec<CocoCategory>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CocoInfo {
    pub description: String,
    pub url: String,
    pub version: String,
    pub year: i32,
    pub contributor: String,
    pub date_created: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CocoLicense {
    pub url: String,
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CocoImage {
    pub license: u32,
    pub file_name: String,
    pub coco_url: String,
    pub height: u32,
    pub width: u32,
    pub date_captured: String,
    pub flickr_url: String,
    pub id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CocoAnnotation {
    pub segmentation: Vec<Vec<f32>>,
    pub area: f32,
    pub iscrowd: u8,
    pub image_id: u64,
    pub bbox: [f32; 4],
    pub category_id: u32,
    pub id: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct CocoCategory {
    pub supercategory: String,
    pub id: u32,
    pub name: String,
}
