//! SVG export.
//!
//! Objects are written in z-order. Every element carries `id` (the object
//! tag, e.g. `polygon-3`), `data-category` and `data-class` attributes so
//! the labels survive in the vector file.
//!
//! Eraser strokes only remove content drawn before them. Each eraser becomes
//! a `<mask>` and the objects preceding it are wrapped in a group using that
//! mask. Groups nest, so an object drawn before several erasers is masked by
//! all of them.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, Event};

use crate::constants::FILL_ALPHA;
use crate::format::error::FormatError;
use crate::format::scene::SceneSnapshot;
use crate::format::traits::{ExportFormat, ExportOptions, ExportResult, FormatWarning};
use crate::geometry::Point;
use crate::model::{CanvasObject, ObjectShape};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// SVG vector export.
pub struct SvgFormat;

impl ExportFormat for SvgFormat {
    fn id(&self) -> &'static str {
        "svg"
    }

    fn display_name(&self) -> &'static str {
        "SVG"
    }

    fn extension(&self) -> &'static str {
        "svg"
    }

    fn mime_type(&self) -> &'static str {
        "image/svg+xml"
    }

    fn default_filename(&self) -> &'static str {
        "canvas_export.svg"
    }

    fn export_to_bytes(
        &self,
        scene: &SceneSnapshot,
        options: &ExportOptions,
    ) -> Result<(Vec<u8>, ExportResult), FormatError> {
        let mut result = ExportResult::new();
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

        writer
            .write_event(Event::Decl(quick_xml::events::BytesDecl::new(
                "1.0",
                Some("UTF-8"),
                None,
            )))
            .map_err(|e| FormatError::Xml(e.into()))?;

        let (w, h) = (scene.width.to_string(), scene.height.to_string());
        let view_box = format!("0 0 {} {}", scene.width, scene.height);
        write_start(
            &mut writer,
            "svg",
            &[
                ("xmlns", SVG_NS.into()),
                ("xmlns:xlink", XLINK_NS.into()),
                ("version", "1.1".into()),
                ("width", w.clone()),
                ("height", h.clone()),
                ("viewBox", view_box),
            ],
        )?;

        let erasers: Vec<&CanvasObject> = scene.objects.iter().filter(|o| o.is_eraser()).collect();
        if !erasers.is_empty() {
            write_start(&mut writer, "defs", &[])?;
            for (k, eraser) in erasers.iter().enumerate() {
                write_mask(&mut writer, scene, k, eraser)?;
            }
            write_end(&mut writer, "defs")?;
        }

        write_empty(
            &mut writer,
            "rect",
            &[
                ("x", "0".into()),
                ("y", "0".into()),
                ("width", w),
                ("height", h),
                ("fill", scene.background_color.clone()),
            ],
        )?;

        if let Some(layer) = scene.background.as_ref().filter(|_| options.include_background) {
            write_empty(
                &mut writer,
                "image",
                &[
                    ("x", "0".into()),
                    ("y", "0".into()),
                    ("width", layer.width.to_string()),
                    ("height", layer.height.to_string()),
                    ("xlink:href", layer.source.clone()),
                    ("href", layer.source.clone()),
                ],
            )?;
        }

        // Outermost group belongs to the last eraser
        for k in (0..erasers.len()).rev() {
            write_start(&mut writer, "g", &[("mask", mask_url(k))])?;
        }

        for object in &scene.objects {
            if object.is_eraser() {
                write_end(&mut writer, "g")?;
                continue;
            }
            write_object(&mut writer, object)?;
            result.objects_exported += 1;
        }

        write_end(&mut writer, "svg")?;

        if !erasers.is_empty() {
            result.add_warning(FormatWarning::info(format!(
                "{} eraser strokes written as masks",
                erasers.len()
            )));
        }

        log::info!(
            "Exported {} objects to SVG ({} erasers)",
            result.objects_exported,
            erasers.len()
        );
        Ok((writer.into_inner(), result))
    }
}

fn mask_id(k: usize) -> String {
    format!("eraser-{}", k)
}

fn mask_url(k: usize) -> String {
    format!("url(#{})", mask_id(k))
}

/// `<mask>` that is opaque everywhere except along the eraser stroke.
fn write_mask<W: Write>(
    writer: &mut Writer<W>,
    scene: &SceneSnapshot,
    k: usize,
    eraser: &CanvasObject,
) -> Result<(), FormatError> {
    let (w, h) = (scene.width.to_string(), scene.height.to_string());
    write_start(
        writer,
        "mask",
        &[
            ("id", mask_id(k)),
            ("maskUnits", "userSpaceOnUse".into()),
            ("x", "0".into()),
            ("y", "0".into()),
            ("width", w.clone()),
            ("height", h.clone()),
        ],
    )?;
    write_empty(
        writer,
        "rect",
        &[
            ("x", "0".into()),
            ("y", "0".into()),
            ("width", w),
            ("height", h),
            ("fill", "white".into()),
        ],
    )?;
    if let ObjectShape::Eraser { points, width } = &eraser.shape {
        write_stroke(writer, points, *width, "black", &[("id", eraser.object_id())])?;
    }
    write_end(writer, "mask")
}

fn write_object<W: Write>(writer: &mut Writer<W>, object: &CanvasObject) -> Result<(), FormatError> {
    let mut attrs = vec![
        ("id", object.object_id()),
        ("data-category", object.category().to_string()),
        ("data-class", object.class_name.clone().unwrap_or_default()),
    ];
    let color = object.stroke_color.clone();

    match &object.shape {
        ObjectShape::Brush { points, width } => {
            write_stroke(writer, points, *width, &color, &attrs)?;
        }
        ObjectShape::Polygon { vertices } => {
            attrs.push(("points", points_attr(vertices)));
            attrs.extend(outline_attrs(object));
            write_empty(writer, "polygon", &attrs)?;
        }
        ObjectShape::Rectangle { bounds } => {
            attrs.extend([
                ("x", bounds.x.to_string()),
                ("y", bounds.y.to_string()),
                ("width", bounds.width.to_string()),
                ("height", bounds.height.to_string()),
            ]);
            attrs.extend(outline_attrs(object));
            write_empty(writer, "rect", &attrs)?;
        }
        ObjectShape::Image { layer, x, y } => {
            attrs.extend([
                ("x", x.to_string()),
                ("y", y.to_string()),
                ("width", layer.width.to_string()),
                ("height", layer.height.to_string()),
                ("xlink:href", layer.source.clone()),
                ("href", layer.source.clone()),
            ]);
            write_empty(writer, "image", &attrs)?;
        }
        ObjectShape::Eraser { .. } => {}
    }
    Ok(())
}

/// Stroke and fill attributes of closed shapes.
fn outline_attrs(object: &CanvasObject) -> Vec<(&'static str, String)> {
    let mut attrs = vec![
        ("stroke", object.stroke_color.clone()),
        ("stroke-width", object.stroke_width.to_string()),
    ];
    if object.filled {
        attrs.push(("fill", object.stroke_color.clone()));
        attrs.push(("fill-opacity", FILL_ALPHA.to_string()));
    } else {
        attrs.push(("fill", "none".into()));
    }
    attrs
}

/// Round-capped freehand stroke; a single point becomes a dot.
fn write_stroke<W: Write>(
    writer: &mut Writer<W>,
    points: &[Point],
    width: f32,
    color: &str,
    extra: &[(&str, String)],
) -> Result<(), FormatError> {
    let mut attrs: Vec<(&str, String)> = extra.to_vec();

    if let [p] = points {
        attrs.extend([
            ("cx", p.x.to_string()),
            ("cy", p.y.to_string()),
            ("r", (width / 2.0).to_string()),
            ("fill", color.to_string()),
        ]);
        return write_empty(writer, "circle", &attrs);
    }

    attrs.extend([
        ("d", path_data(points)),
        ("fill", "none".into()),
        ("stroke", color.to_string()),
        ("stroke-width", width.to_string()),
        ("stroke-linecap", "round".into()),
        ("stroke-linejoin", "round".into()),
    ]);
    write_empty(writer, "path", &attrs)
}

fn path_data(points: &[Point]) -> String {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{} {} {}", if i == 0 { "M" } else { "L" }, p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn tag<'a>(name: &'a str, attrs: &[(&str, String)]) -> BytesStart<'a> {
    let mut start = BytesStart::new(name);
    for (key, value) in attrs {
        start.push_attribute((*key, value.as_str()));
    }
    start
}

fn write_start<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attrs: &[(&str, String)],
) -> Result<(), FormatError> {
    writer
        .write_event(Event::Start(tag(name, attrs)))
        .map_err(|e| FormatError::Xml(e.into()))
}

fn write_empty<W: Write>(
    writer: &mut Writer<W>,
    name: &str,
    attrs: &[(&str, String)],
) -> Result<(), FormatError> {
    writer
        .write_event(Event::Empty(tag(name, attrs)))
        .map_err(|e| FormatError::Xml(e.into()))
}

fn write_end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<(), FormatError> {
    writer
        .write_event(Event::End(BytesEnd::new(name)))
        .map_err(|e| FormatError::Xml(e.into()))
}
