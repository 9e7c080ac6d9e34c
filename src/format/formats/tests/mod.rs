//! Tests for the export formats.
//!
//! Every format renders the same small scene so the outputs can be compared
//! against known geometry.

mod coco_tests;
mod svg_tests;

use chrono::{TimeZone, Utc};
use image::{Rgba, RgbaImage};

use crate::format::{ExportOptions, SceneSnapshot};
use crate::geometry::{BoundingBox, Point};
use crate::model::{CanvasObject, ClassLabel, ImageLayer, ObjectShape};

/// 200x100 canvas with a labeled polygon, a labeled rectangle and an
/// unlabeled brush stroke.
pub(super) fn sample_scene() -> SceneSnapshot {
    let mut scene = SceneSnapshot::new(200, 100);
    scene.classes = vec![
        ClassLabel::new("road", "#ff0000"),
        ClassLabel::new("car", "#00ff00"),
    ];
    scene.objects = vec![
        CanvasObject::new(
            1,
            ObjectShape::Polygon {
                vertices: vec![
                    Point::new(10.0, 10.0),
                    Point::new(60.0, 10.0),
                    Point::new(35.0, 50.0),
                ],
            },
            "#ff0000",
            2.0,
        )
        .with_class(Some("road".into()))
        .with_fill(true),
        CanvasObject::new(
            2,
            ObjectShape::Rectangle {
                bounds: BoundingBox::new(100.0, 20.0, 50.0, 30.0),
            },
            "#00ff00",
            4.0,
        )
        .with_class(Some("car".into())),
        CanvasObject::new(
            3,
            ObjectShape::Brush {
                points: vec![Point::new(5.0, 80.0), Point::new(50.0, 80.0)],
                width: 6.0,
            },
            "#532ee3",
            6.0,
        ),
    ];
    scene
}

/// Horizontal eraser stroke across the canvas at `y`.
pub(super) fn eraser(id: u64, y: f32) -> CanvasObject {
    CanvasObject::new(
        id,
        ObjectShape::Eraser {
            points: vec![Point::new(0.0, y), Point::new(200.0, y)],
            width: 10.0,
        },
        "#000000",
        10.0,
    )
}

/// Fill of the image placed by [`image_object`].
pub(super) const STAMP: Rgba<u8> = Rgba([0, 128, 0, 255]);

/// A loaded 20x10 image object with its top-left corner at `(x, y)`.
pub(super) fn image_object(id: u64, x: f32, y: f32) -> CanvasObject {
    let layer = ImageLayer::from_rgba("stamp.png", RgbaImage::from_pixel(20, 10, STAMP));
    CanvasObject::new(id, ObjectShape::Image { layer, x, y }, "#532ee3", 0.0)
}

/// Options with a fixed timestamp so outputs are reproducible.
pub(super) fn fixed_options() -> ExportOptions {
    ExportOptions::new().timestamp(Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap())
}
