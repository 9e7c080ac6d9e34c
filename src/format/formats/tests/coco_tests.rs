//! Tests for the COCO JSON export.

use serde_json::Value;

use super::{eraser, fixed_options, image_object, sample_scene};
use crate::format::formats::{CocoFormat, DEFAULT_IMAGE_FILE_NAME, FALLBACK_CATEGORY};
use crate::format::{ExportFormat, ExportOptions, SceneSnapshot, WarningSeverity};
use crate::model::{ClassLabel, ImageLayer};

fn export(scene: &SceneSnapshot, options: &ExportOptions) -> Value {
    let (bytes, _) = CocoFormat.export_to_bytes(scene, options).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn floats(value: &Value) -> Vec<f64> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect()
}

#[test]
fn test_coco_structure() {
    let coco = export(&sample_scene(), &fixed_options());

    assert_eq!(coco["images"].as_array().unwrap().len(), 1);
    assert_eq!(coco["annotations"].as_array().unwrap().len(), 3);
    assert_eq!(coco["licenses"][0]["id"], 1);
    assert_eq!(coco["info"]["description"], "Canvas Export");
}

#[test]
fn test_coco_image_entry() {
    let coco = export(&sample_scene(), &fixed_options());
    let image = &coco["images"][0];

    assert_eq!(image["id"], 1);
    assert_eq!(image["width"], 200);
    assert_eq!(image["height"], 100);
    assert_eq!(image["file_name"], DEFAULT_IMAGE_FILE_NAME);
    assert_eq!(image["date_captured"], "2024-03-05T12:00:00.000Z");
}

#[test]
fn test_coco_timestamp() {
    let coco = export(&sample_scene(), &fixed_options());

    assert_eq!(coco["info"]["year"], 2024);
    assert_eq!(coco["info"]["date_created"], "2024-03-05T12:00:00.000Z");
}

#[test]
fn test_coco_background_file_name() {
    let mut scene = sample_scene();
    scene.background = Some(ImageLayer::unloaded("photos/street.jpg", 200, 100));

    let coco = export(&scene, &fixed_options());
    assert_eq!(coco["images"][0]["file_name"], "street.jpg");

    let coco = export(&scene, &fixed_options().include_background(false));
    assert_eq!(coco["images"][0]["file_name"], DEFAULT_IMAGE_FILE_NAME);
}

#[test]
fn test_coco_categories_follow_classes() {
    let coco = export(&sample_scene(), &fixed_options());
    let categories = coco["categories"].as_array().unwrap();

    assert_eq!(categories.len(), 3);
    assert_eq!(categories[0]["name"], "road");
    assert_eq!(categories[0]["id"], 1);
    assert_eq!(categories[0]["supercategory"], "class");
    assert_eq!(categories[1]["name"], "car");
    assert_eq!(categories[2]["name"], FALLBACK_CATEGORY);
    assert_eq!(categories[2]["id"], 3);
}

#[test]
fn test_coco_no_fallback_when_all_labeled() {
    let mut scene = sample_scene();
    scene.objects.pop();

    let coco = export(&scene, &fixed_options());
    assert_eq!(coco["categories"].as_array().unwrap().len(), 2);
}

#[test]
fn test_coco_deleted_class_uses_fallback() {
    let mut scene = sample_scene();
    scene.classes.remove(1);

    let coco = export(&scene, &fixed_options());
    let rect = &coco["annotations"][1];
    assert_eq!(rect["category_id"], 2);
    assert_eq!(coco["categories"][1]["name"], FALLBACK_CATEGORY);
}

#[test]
fn test_coco_polygon_annotation() {
    let coco = export(&sample_scene(), &fixed_options());
    let polygon = &coco["annotations"][0];

    assert_eq!(polygon["id"], 1);
    assert_eq!(polygon["image_id"], 1);
    assert_eq!(polygon["category_id"], 1);
    assert_eq!(polygon["iscrowd"], 0);
    assert_eq!(
        floats(&polygon["segmentation"][0]),
        vec![10.0, 10.0, 60.0, 10.0, 35.0, 50.0]
    );
    assert_eq!(floats(&polygon["bbox"]), vec![10.0, 10.0, 50.0, 40.0]);
    assert_eq!(polygon["area"].as_f64().unwrap(), 1000.0);
}

#[test]
fn test_coco_rectangle_annotation() {
    let coco = export(&sample_scene(), &fixed_options());
    let rect = &coco["annotations"][1];

    assert_eq!(rect["category_id"], 2);
    assert_eq!(
        floats(&rect["segmentation"][0]),
        vec![100.0, 20.0, 150.0, 20.0, 150.0, 50.0, 100.0, 50.0]
    );
    assert_eq!(floats(&rect["bbox"]), vec![100.0, 20.0, 50.0, 30.0]);
    assert_eq!(rect["area"].as_f64().unwrap(), 1500.0);
}

#[test]
fn test_coco_brush_annotation() {
    let coco = export(&sample_scene(), &fixed_options());
    let brush = &coco["annotations"][2];

    assert!(brush["segmentation"].as_array().unwrap().is_empty());
    assert_eq!(floats(&brush["bbox"]), vec![2.0, 77.0, 51.0, 6.0]);
    assert_eq!(brush["category_id"], 3);
}

#[test]
fn test_coco_skips_erasers() {
    let mut scene = sample_scene();
    scene.objects.push(eraser(4, 30.0));

    let (bytes, result) = CocoFormat
        .export_to_bytes(&scene, &fixed_options())
        .unwrap();
    let coco: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(coco["annotations"].as_array().unwrap().len(), 3);
    assert_eq!(result.objects_exported, 3);
    let warning = &result.warnings[0];
    assert_eq!(warning.severity, WarningSeverity::Info);
    assert_eq!(warning.object_id.as_deref(), Some("eraser-4"));
}

#[test]
fn test_coco_empty_scene() {
    let coco = export(&SceneSnapshot::new(10, 10), &fixed_options());

    assert!(coco["annotations"].as_array().unwrap().is_empty());
    assert!(coco["categories"].as_array().unwrap().is_empty());
}

#[test]
fn test_coco_skips_image_objects() {
    let mut scene = sample_scene();
    scene.objects.push(image_object(4, 120.0, 60.0));

    let (bytes, result) = CocoFormat
        .export_to_bytes(&scene, &fixed_options())
        .unwrap();
    let coco: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(coco["annotations"].as_array().unwrap().len(), 3);
    assert_eq!(result.objects_exported, 3);
    assert_eq!(result.warnings[0].severity, WarningSeverity::Info);
    assert_eq!(result.warnings[0].object_id.as_deref(), Some("image-4"));
}

#[test]
fn test_coco_fallback_renamed_when_class_uses_its_name() {
    let mut scene = sample_scene();
    scene.classes.push(ClassLabel::new(FALLBACK_CATEGORY, "#0000ff"));

    let coco = export(&scene, &fixed_options());
    let categories = coco["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 4);
    assert_eq!(categories[2]["name"], FALLBACK_CATEGORY);
    assert_eq!(categories[3]["name"], format!("{}_2", FALLBACK_CATEGORY));
    assert_eq!(coco["annotations"][2]["category_id"], 4);
}
