pub mod color;
pub mod figure;
pub mod svg;

pub use color::{Rgb, Rgba};
pub use figure::{render, Figure, FigureStyle, Trace, Viewport, CHART_SIZE};
