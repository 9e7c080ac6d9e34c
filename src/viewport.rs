//! Viewport (pan/zoom) transform.
//!
//! The viewport maps scene coordinates to screen coordinates with the affine
//! matrix `[zoom, 0, 0, zoom, pan_x, pan_y]`, i.e. `screen = scene * zoom + pan`.
//! Pan is measured in screen pixels from the canvas' top-left corner.

use serde::{Deserialize, Serialize};

use crate::constants::zoom;
use crate::geometry::Point;

/// Pan/zoom transform state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f32,
    pub pan_x: f32,
    pub pan_y: f32,
}

impl Viewport {
    /// Create a new transform with the given zoom and pan.
    pub fn new(zoom: f32, pan_x: f32, pan_y: f32) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    /// Create an identity transform (zoom=1, no pan).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Clamp a zoom level to the supported range.
    pub fn clamp_zoom(level: f32) -> f32 {
        if level.is_nan() {
            return 1.0;
        }
        level.clamp(zoom::MIN, zoom::MAX)
    }

    /// Affine matrix in `[a, b, c, d, e, f]` order.
    pub fn matrix(&self) -> [f32; 6] {
        [self.zoom, 0.0, 0.0, self.zoom, self.pan_x, self.pan_y]
    }

    /// Convert a screen-space point into scene coordinates.
    pub fn screen_to_scene(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan_x) / self.zoom,
            (screen.y - self.pan_y) / self.zoom,
        )
    }

    /// Convert a scene point into screen coordinates.
    pub fn scene_to_screen(&self, scene: Point) -> Point {
        Point::new(
            scene.x * self.zoom + self.pan_x,
            scene.y * self.zoom + self.pan_y,
        )
    }

    /// Zoom to `new_zoom` keeping the scene point under `screen` fixed.
    pub fn zoom_to_point(&mut self, new_zoom: f32, screen: Point) {
        let new_zoom = Self::clamp_zoom(new_zoom);
        let anchor = self.screen_to_scene(screen);
        self.zoom = new_zoom;
        self.pan_x = screen.x - anchor.x * new_zoom;
        self.pan_y = screen.y - anchor.y * new_zoom;
    }

    /// Exponential wheel zoom around the cursor (`zoom * 0.9999^delta_y`).
    pub fn wheel_zoom(&mut self, delta_y: f32, screen: Point) {
        let new_zoom = self.zoom * zoom::WHEEL_BASE.powf(delta_y);
        self.zoom_to_point(new_zoom, screen);
    }

    /// Set an absolute zoom level and reset the translation.
    pub fn set_zoom(&mut self, level: f32) {
        self.zoom = Self::clamp_zoom(level);
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    /// Zoom in by a factor around a screen point.
    pub fn zoom_in(&mut self, factor: f32, screen: Point) {
        self.zoom_to_point(self.zoom * factor, screen);
    }

    /// Zoom out by a factor around a screen point.
    pub fn zoom_out(&mut self, factor: f32, screen: Point) {
        self.zoom_to_point(self.zoom / factor, screen);
    }

    /// Apply a pan delta in screen pixels.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    pub fn reset(&mut self) {
        *self = Self::identity();
    }

    /// Zoom as a percentage (100 = no zoom).
    pub fn zoom_percent(&self) -> f32 {
        self.zoom * 100.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity()
    }
}
