//! Tests for the SVG export.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::{eraser, fixed_options, image_object, sample_scene};
use crate::format::formats::SvgFormat;
use crate::format::{ExportFormat, ExportOptions, SceneSnapshot};
use crate::model::ImageLayer;

fn export(scene: &SceneSnapshot, options: &ExportOptions) -> String {
    let (bytes, _) = SvgFormat.export_to_bytes(scene, options).unwrap();
    String::from_utf8(bytes).unwrap()
}

/// Count start and empty elements, failing on malformed XML.
fn count_elements(svg: &str) -> usize {
    let mut reader = Reader::from_str(svg);
    let mut count = 0;
    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Start(_)) | Ok(Event::Empty(_)) => count += 1,
            Ok(_) => {}
            Err(e) => panic!("malformed SVG: {}", e),
        }
    }
    count
}

#[test]
fn test_svg_root_uses_canvas_size() {
    let svg = export(&sample_scene(), &fixed_options());

    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains(r#"width="200""#));
    assert!(svg.contains(r#"height="100""#));
    assert!(svg.contains(r#"viewBox="0 0 200 100""#));
    assert!(svg.contains(r##"fill="#ffffff""##));
}

#[test]
fn test_svg_objects_carry_labels() {
    let svg = export(&sample_scene(), &fixed_options());

    assert!(svg.contains(r#"id="polygon-1" data-category="polygon" data-class="road""#));
    assert!(svg.contains(r#"id="rectangle-2" data-category="rectangle" data-class="car""#));
    assert!(svg.contains(r#"id="brush-3" data-category="brush" data-class="""#));
}

#[test]
fn test_svg_fill_only_for_filled_shapes() {
    let svg = export(&sample_scene(), &fixed_options());

    let polygon = svg.lines().find(|l| l.contains("<polygon")).unwrap();
    assert!(polygon.contains(r##"fill="#ff0000""##));
    assert!(polygon.contains(r#"fill-opacity="0.3""#));
    assert!(polygon.contains(r#"points="10,10 60,10 35,50""#));

    let rect = svg.lines().find(|l| l.contains(r#"id="rectangle-2""#)).unwrap();
    assert!(rect.contains(r#"fill="none""#));
    assert!(rect.contains(r#"stroke-width="4""#));
}

#[test]
fn test_svg_brush_is_round_path() {
    let svg = export(&sample_scene(), &fixed_options());

    let path = svg.lines().find(|l| l.contains("<path")).unwrap();
    assert!(path.contains(r#"d="M 5 80 L 50 80""#));
    assert!(path.contains(r#"stroke-linecap="round""#));
    assert!(path.contains(r#"stroke-width="6""#));
}

#[test]
fn test_svg_eraser_masks_only_earlier_objects() {
    let mut scene = sample_scene();
    scene.objects.insert(1, eraser(4, 30.0));

    let svg = export(&scene, &fixed_options());
    count_elements(&svg);

    assert!(svg.contains(r#"<mask id="eraser-0""#));
    assert_eq!(svg.matches(r#"mask="url(#eraser-0)""#).count(), 1);

    let group = svg.find(r#"mask="url(#eraser-0)""#).unwrap();
    let polygon = svg.find(r#"id="polygon-1""#).unwrap();
    let close = svg[polygon..].find("</g>").unwrap() + polygon;
    let rect = svg.find(r#"id="rectangle-2""#).unwrap();
    assert!(group < polygon && polygon < close && close < rect);
}

#[test]
fn test_svg_nested_eraser_groups() {
    let mut scene = sample_scene();
    scene.objects.insert(1, eraser(4, 30.0));
    scene.objects.push(eraser(5, 60.0));

    let svg = export(&scene, &fixed_options());

    // The group of the last eraser encloses the group of the first
    let outer = svg.find(r#"mask="url(#eraser-1)""#).unwrap();
    let inner = svg.find(r#"mask="url(#eraser-0)""#).unwrap();
    assert!(outer < inner);
    assert_eq!(svg.matches("<g ").count(), 2);
    assert_eq!(svg.matches("</g>").count(), 2);
}

#[test]
fn test_svg_is_well_formed() {
    let mut scene = sample_scene();
    scene.objects.push(eraser(4, 30.0));

    // svg, defs, mask, mask rect, mask path, background rect, group, 3 objects
    assert_eq!(count_elements(&export(&scene, &fixed_options())), 10);
}

#[test]
fn test_svg_escapes_class_names() {
    let mut scene = sample_scene();
    scene.objects[0].class_name = Some("cars & <trucks>".into());

    let svg = export(&scene, &fixed_options());
    assert!(svg.contains("cars &amp; &lt;trucks&gt;"));
    count_elements(&svg);
}

#[test]
fn test_svg_background_image() {
    let mut scene = sample_scene();
    scene.background = Some(ImageLayer::unloaded("street.jpg", 200, 100));

    let svg = export(&scene, &fixed_options());
    assert!(svg.contains(r#"href="street.jpg""#));

    let svg = export(&scene, &fixed_options().include_background(false));
    assert!(!svg.contains("street.jpg"));
}

#[test]
fn test_svg_counts_drawn_objects() {
    let mut scene = sample_scene();
    scene.objects.push(eraser(4, 30.0));

    let (_, result) = SvgFormat
        .export_to_bytes(&scene, &fixed_options())
        .unwrap();
    assert_eq!(result.objects_exported, 3);
}

#[test]
fn test_svg_image_object() {
    let mut scene = sample_scene();
    scene.objects.push(image_object(4, 120.0, 60.0));

    let (bytes, result) = SvgFormat
        .export_to_bytes(&scene, &fixed_options())
        .unwrap();
    let svg = String::from_utf8(bytes).unwrap();
    count_elements(&svg);

    let image = svg.lines().find(|l| l.contains("<image")).unwrap();
    assert!(image.contains(r#"id="image-4" data-category="image" data-class="""#));
    assert!(image.contains(r#"x="120" y="60" width="20" height="10""#));
    assert!(image.contains(r#"href="stamp.png""#));
    assert_eq!(result.objects_exported, 4);
}
