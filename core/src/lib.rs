//! Core logic for the Lanelet2 map validation dashboard.
//!
//! The modules turn an uploaded `.osm` map into drawable shapes, flatten the
//! external validator's nested report into selectable rows, resolve a selected
//! row back to a map primitive and render the highlighted figure.

pub mod map;
pub mod prelude;
pub mod render;
pub mod report;
pub mod selection;
pub mod telemetry;
pub mod tool;

pub use map::{extract_shapes, Shape, ShapeKind};
pub use prelude::{CoreError, CoreResult, MapConfig, Origin, ProjectionMode};
pub use render::{render, Figure, FigureStyle};
pub use report::{merge, FlatRow, MergedTable, RequirementLookup, ValidationReport};
pub use selection::resolve_target;
