//! Standalone SVG export of a rendered figure.

use std::fmt::Write;

use crate::prelude::CoreResult;
use crate::render::figure::{Figure, Trace, Viewport};

/// Pixel mapping for a viewport; the y axis is flipped so north points up.
struct PixelTransform {
    viewport: Viewport,
    scale: f64,
    height: f64,
}

impl PixelTransform {
    fn new(viewport: Viewport, width: f64, height: f64) -> Self {
        let scale = (width / viewport.width()).min(height / viewport.height());
        Self {
            viewport,
            scale,
            height,
        }
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.viewport.x_min) * self.scale,
            self.height - (y - self.viewport.y_min) * self.scale,
        )
    }
}

impl Figure {
    pub fn to_svg(&self) -> CoreResult<String> {
        let mut out = String::new();
        write_svg_header(&mut out, self.width, self.height)?;

        if let Some(viewport) = self.viewport {
            let transform =
                PixelTransform::new(viewport, f64::from(self.width), f64::from(self.height));
            // Highlighted traces last so they stay on top.
            for trace in self.traces.iter().filter(|t| !t.highlighted) {
                write_trace(&mut out, trace, &transform)?;
            }
            for trace in self.traces.iter().filter(|t| t.highlighted) {
                write_trace(&mut out, trace, &transform)?;
            }
        }

        writeln!(out, "</svg>")?;
        Ok(out)
    }
}

fn write_svg_header<W: Write>(out: &mut W, width: u32, height: u32) -> CoreResult<()> {
    writeln!(out, r##"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"##)?;
    writeln!(
        out,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"##
    )?;
    writeln!(out, r##"<rect width="100%" height="100%" fill="#ffffff"/>"##)?;
    Ok(())
}

fn write_trace<W: Write>(out: &mut W, trace: &Trace, transform: &PixelTransform) -> CoreResult<()> {
    let fill = trace.fill_color;
    if trace.x.len() == 1 {
        let (cx, cy) = transform.apply(trace.x[0], trace.y[0]);
        writeln!(
            out,
            r##"<circle cx="{cx:.2}" cy="{cy:.2}" r="4" fill="{}" fill-opacity="{}" stroke="{}" stroke-width="{}"><title>{}</title></circle>"##,
            fill.rgb(),
            fill.opacity(),
            trace.line_color,
            trace.line_width,
            trace.name
        )?;
        return Ok(());
    }

    let mut d = String::new();
    for (i, (x, y)) in trace.x.iter().zip(&trace.y).enumerate() {
        let (px, py) = transform.apply(*x, *y);
        write!(d, "{}{px:.2},{py:.2} ", if i == 0 { "M" } else { "L" })?;
    }
    writeln!(
        out,
        r##"<path d="{}" fill="{}" fill-opacity="{}" stroke="{}" stroke-width="{}" data-id="{}"><title>{}</title></path>"##,
        d.trim_end(),
        fill.rgb(),
        fill.opacity(),
        trace.line_color,
        trace.line_width,
        trace.id,
        trace.name
    )?;
    Ok(())
}
