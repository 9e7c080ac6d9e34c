//! Tool mode and draw tool types.

use serde::{Deserialize, Serialize};

/// Top-level interaction mode of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    /// Pointer input creates geometry with the active draw tool
    #[default]
    Draw,
    /// Pointer drags translate the viewport
    Pan,
    /// Pointer input selects and moves existing objects
    Select,
}

impl ToolMode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            ToolMode::Draw => "Draw",
            ToolMode::Pan => "Pan",
            ToolMode::Select => "Select",
        }
    }

    /// Get all available modes.
    pub fn all() -> &'static [ToolMode] {
        &[ToolMode::Draw, ToolMode::Pan, ToolMode::Select]
    }

    /// Parse a lowercase mode name. Unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draw" => Some(ToolMode::Draw),
            "pan" => Some(ToolMode::Pan),
            "select" => Some(ToolMode::Select),
            _ => None,
        }
    }
}

/// Sub-tool used while in [`ToolMode::Draw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawTool {
    /// Freehand stroke
    #[default]
    Brush,
    /// Click-by-click polygon, closed by clicking near the first vertex
    Polygon,
    /// Drag out an axis-aligned rectangle
    Rectangle,
    /// Freehand stroke that erases content drawn before it
    Eraser,
}

impl DrawTool {
    /// Get the display name for this tool.
    pub fn name(&self) -> &'static str {
        match self {
            DrawTool::Brush => "Brush",
            DrawTool::Polygon => "Polygon",
            DrawTool::Rectangle => "Rectangle",
            DrawTool::Eraser => "Eraser",
        }
    }

    /// Get all available draw tools.
    pub fn all() -> &'static [DrawTool] {
        &[
            DrawTool::Brush,
            DrawTool::Polygon,
            DrawTool::Rectangle,
            DrawTool::Eraser,
        ]
    }

    /// Parse a lowercase tool name. Unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "brush" => Some(DrawTool::Brush),
            "polygon" => Some(DrawTool::Polygon),
            "rectangle" | "rect" => Some(DrawTool::Rectangle),
            "eraser" => Some(DrawTool::Eraser),
            _ => None,
        }
    }

    /// Whether the tool records a freehand path.
    pub fn is_freehand(&self) -> bool {
        matches!(self, DrawTool::Brush | DrawTool::Eraser)
    }
}
