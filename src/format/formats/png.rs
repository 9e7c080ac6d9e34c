//! PNG raster export.
//!
//! The canvas is rendered at its scene size. Layers from bottom to top:
//! background color, background image, then the objects. Objects are drawn
//! onto their own transparent layer so eraser strokes can cut through them
//! without touching the background.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage, imageops};
use imageproc::drawing::{Blend, draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut};
use imageproc::rect::Rect;

use crate::color_utils::{alpha_to_u8, parse_hex};
use crate::constants::FILL_ALPHA;
use crate::format::error::FormatError;
use crate::format::scene::SceneSnapshot;
use crate::format::traits::{ExportFormat, ExportOptions, ExportResult, FormatWarning};
use crate::geometry::Point;
use crate::model::{CanvasObject, ObjectShape};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// PNG raster export.
pub struct PngFormat;

impl ExportFormat for PngFormat {
    fn id(&self) -> &'static str {
        "png"
    }

    fn display_name(&self) -> &'static str {
        "PNG"
    }

    fn extension(&self) -> &'static str {
        "png"
    }

    fn mime_type(&self) -> &'static str {
        "image/png"
    }

    fn default_filename(&self) -> &'static str {
        "canvas_export.png"
    }

    fn export_to_bytes(
        &self,
        scene: &SceneSnapshot,
        options: &ExportOptions,
    ) -> Result<(Vec<u8>, ExportResult), FormatError> {
        let mut result = ExportResult::new();
        let canvas = render(scene, options, &mut result)?;

        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

        log::info!(
            "Rendered {} objects to a {}x{} PNG",
            result.objects_exported,
            scene.width,
            scene.height
        );
        Ok((bytes, result))
    }
}

/// Rasterize the scene.
pub fn render(
    scene: &SceneSnapshot,
    options: &ExportOptions,
    result: &mut ExportResult,
) -> Result<RgbaImage, FormatError> {
    if scene.width == 0 || scene.height == 0 {
        return Err(FormatError::invalid_format(format!(
            "cannot render a {}x{} canvas",
            scene.width, scene.height
        )));
    }

    let base_color = if options.png_background {
        match parse_hex(&scene.background_color) {
            Some([r, g, b]) => Rgba([r, g, b, 255]),
            None => {
                result.add_warning(FormatWarning::warning(format!(
                    "invalid background color {:?}, using white",
                    scene.background_color
                )));
                WHITE
            }
        }
    } else {
        TRANSPARENT
    };
    let mut canvas = RgbaImage::from_pixel(scene.width, scene.height, base_color);

    if let Some(layer) = scene.background.as_ref().filter(|_| options.include_background) {
        match layer.pixels() {
            Some(pixels) => imageops::overlay(&mut canvas, pixels, 0, 0),
            None => result.add_warning(FormatWarning::warning(format!(
                "background image {} is not loaded",
                layer.source
            ))),
        }
    }

    let mut layer = Blend(RgbaImage::new(scene.width, scene.height));
    for object in &scene.objects {
        draw_object(&mut layer, object, result);
    }
    imageops::overlay(&mut canvas, &layer.0, 0, 0);

    Ok(canvas)
}

fn draw_object(layer: &mut Blend<RgbaImage>, object: &CanvasObject, result: &mut ExportResult) {
    let color = object_color(object, result);

    match &object.shape {
        ObjectShape::Brush { points, width } => {
            stamp_polyline(&mut layer.0, points, *width, color, false);
        }
        ObjectShape::Eraser { points, width } => {
            stamp_polyline(&mut layer.0, points, *width, TRANSPARENT, false);
            return;
        }
        ObjectShape::Polygon { vertices } => {
            if object.filled {
                fill_polygon(layer, vertices, with_fill_alpha(color));
            }
            stamp_polyline(&mut layer.0, vertices, object.stroke_width, color, true);
        }
        ObjectShape::Rectangle { bounds } => {
            if object.filled && bounds.width >= 1.0 && bounds.height >= 1.0 {
                let rect = Rect::at(bounds.x.round() as i32, bounds.y.round() as i32)
                    .of_size(bounds.width.round() as u32, bounds.height.round() as u32);
                draw_filled_rect_mut(layer, rect, with_fill_alpha(color));
            }
            stamp_polyline(&mut layer.0, &bounds.corners(), object.stroke_width, color, true);
        }
        ObjectShape::Image { layer: image, x, y } => match image.pixels() {
            Some(pixels) => {
                imageops::overlay(&mut layer.0, pixels, x.round() as i64, y.round() as i64)
            }
            None => {
                result.add_warning(
                    FormatWarning::warning(format!("image {} is not loaded", image.source))
                        .with_object(object.object_id()),
                );
                return;
            }
        },
    }
    result.objects_exported += 1;
}

fn object_color(object: &CanvasObject, result: &mut ExportResult) -> Rgba<u8> {
    match parse_hex(&object.stroke_color) {
        Some([r, g, b]) => Rgba([r, g, b, 255]),
        None => {
            result.add_warning(
                FormatWarning::warning(format!("invalid color {:?}", object.stroke_color))
                    .with_object(object.object_id()),
            );
            Rgba([0, 0, 0, 255])
        }
    }
}

fn with_fill_alpha(color: Rgba<u8>) -> Rgba<u8> {
    let [r, g, b, _] = color.0;
    Rgba([r, g, b, alpha_to_u8(FILL_ALPHA)])
}

/// Fill a polygon with a translucent color. Degenerate outlines are skipped.
fn fill_polygon(layer: &mut Blend<RgbaImage>, vertices: &[Point], color: Rgba<u8>) {
    let mut points: Vec<imageproc::point::Point<i32>> = Vec::with_capacity(vertices.len());
    for v in vertices {
        let p = imageproc::point::Point::new(v.x.round() as i32, v.y.round() as i32);
        if points.last() != Some(&p) {
            points.push(p);
        }
    }
    // The outline must not repeat its first point
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() >= 3 {
        draw_polygon_mut(layer, &points, color);
    }
}

/// Draw a round-capped stroke by stamping discs along each segment.
///
/// Segments are clipped to the image grown by the stamp radius, so the work
/// is bounded by the image size. Segments with non-finite ends are skipped.
fn stamp_polyline(image: &mut RgbaImage, points: &[Point], width: f32, color: Rgba<u8>, closed: bool) {
    let radius = (width / 2.0).max(0.5);
    let step = (radius / 2.0).max(1.0);
    let stamp = |image: &mut RgbaImage, p: Point| {
        draw_filled_circle_mut(
            image,
            (p.x.round() as i32, p.y.round() as i32),
            radius.round() as i32,
            color,
        );
    };

    let Some(&first) = points.first() else {
        return;
    };
    let margin = f64::from(radius) + 1.0;
    let min = (-margin, -margin);
    let max = (
        f64::from(image.width()) + margin,
        f64::from(image.height()) + margin,
    );
    if let Some((p, _)) = clip_segment(first, first, min, max) {
        stamp(image, p);
    }

    let closing = if closed && points.len() > 2 {
        Some((points[points.len() - 1], first))
    } else {
        None
    };
    let segments = points.windows(2).map(|pair| (pair[0], pair[1])).chain(closing);

    for (from, to) in segments {
        let Some((from, to)) = clip_segment(from, to, min, max) else {
            continue;
        };
        let length = from.distance_to(&to);
        let steps = (length / step).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            stamp(
                image,
                Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t),
            );
        }
    }
}

/// Liang-Barsky clip of a segment to an axis-aligned box. Returns `None` when
/// the segment misses the box or has a non-finite end.
fn clip_segment(from: Point, to: Point, min: (f64, f64), max: (f64, f64)) -> Option<(Point, Point)> {
    let (x0, y0) = (f64::from(from.x), f64::from(from.y));
    let (x1, y1) = (f64::from(to.x), f64::from(to.y));
    if ![x0, y0, x1, y1].iter().all(|v| v.is_finite()) {
        return None;
    }
    let (dx, dy) = (x1 - x0, y1 - y0);

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, x0 - min.0),
        (dx, max.0 - x0),
        (-dy, y0 - min.1),
        (dy, max.1 - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return None;
        }
    }

    // t is imprecise on very long segments
    let at = |t: f64| {
        Point::new(
            (x0 + dx * t).clamp(min.0, max.0) as f32,
            (y0 + dy * t).clamp(min.1, max.1) as f32,
        )
    };
    Some((at(t0), at(t1)))
}
