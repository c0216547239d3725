use serde::{Deserialize, Serialize};

use crate::map::{Id, Shape, ShapeKind};
use crate::render::color::{Rgb, Rgba};

/// Rendered figure size used by the dashboard.
pub const CHART_SIZE: u32 = 1800;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FigureStyle {
    /// Square figure edge in pixels.
    pub size: u32,
    pub line_color: Rgb,
    pub highlight_color: Rgb,
    pub fill_color: Rgba,
    pub line_width: f32,
}

impl Default for FigureStyle {
    fn default() -> Self {
        Self {
            size: CHART_SIZE,
            line_color: Rgb::BLUE,
            highlight_color: Rgb::RED,
            fill_color: Rgba::SKY,
            line_width: 1.0,
        }
    }
}

impl FigureStyle {
    pub fn with_size(size: u32) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }
}

/// Axis-aligned range in map coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Viewport {
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Grows the shorter axis around its centre so both axes share one scale.
    pub fn squared(&self) -> Viewport {
        let span = self.width().max(self.height());
        let span = if span > 0.0 { span } else { 1.0 };
        let cx = (self.x_min + self.x_max) / 2.0;
        let cy = (self.y_min + self.y_max) / 2.0;
        Viewport {
            x_min: cx - span / 2.0,
            x_max: cx + span / 2.0,
            y_min: cy - span / 2.0,
            y_max: cy + span / 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub id: Id,
    pub name: String,
    pub kind: ShapeKind,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub line_color: Rgb,
    pub fill_color: Rgba,
    pub line_width: f32,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub width: u32,
    pub height: u32,
    /// Bounding box over every coordinate, `None` when nothing is drawable.
    pub bounds: Option<Viewport>,
    /// `bounds` squared to equal axis scale.
    pub viewport: Option<Viewport>,
    pub traces: Vec<Trace>,
}

impl Figure {
    pub fn highlighted_ids(&self) -> Vec<Id> {
        self.traces
            .iter()
            .filter(|t| t.highlighted)
            .map(|t| t.id)
            .collect()
    }
}

fn bounding_box(shapes: &[Shape]) -> Option<Viewport> {
    shapes
        .iter()
        .flat_map(|s| s.points.iter())
        .fold(None, |acc: Option<Viewport>, p| {
            Some(match acc {
                None => Viewport {
                    x_min: p[0],
                    x_max: p[0],
                    y_min: p[1],
                    y_max: p[1],
                },
                Some(v) => Viewport {
                    x_min: v.x_min.min(p[0]),
                    x_max: v.x_max.max(p[0]),
                    y_min: v.y_min.min(p[1]),
                    y_max: v.y_max.max(p[1]),
                },
            })
        })
}

/// Draws every non-empty shape; shapes matching `selected` take the highlight colour.
pub fn render(shapes: &[Shape], selected: Option<&str>, style: &FigureStyle) -> Figure {
    let selected = selected.map(str::trim).filter(|s| !s.is_empty());
    let bounds = bounding_box(shapes);

    let traces = shapes
        .iter()
        .filter(|shape| !shape.points.is_empty())
        .map(|shape| {
            let highlighted = selected.is_some_and(|id| shape.matches_id(id));
            Trace {
                id: shape.id,
                name: format!("id: {}", shape.id),
                kind: shape.kind,
                x: shape.xs(),
                y: shape.ys(),
                line_color: if highlighted {
                    style.highlight_color
                } else {
                    style.line_color
                },
                fill_color: style.fill_color,
                line_width: style.line_width,
                highlighted,
            }
        })
        .collect();

    Figure {
        width: style.size,
        height: style.size,
        bounds,
        viewport: bounds.map(|b| b.squared()),
        traces,
    }
}
