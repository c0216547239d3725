pub mod extract;
pub mod model;
pub mod osm;
pub mod projection;

#[cfg(test)]
pub(crate) mod fixtures;

pub use extract::{extract_shapes, shapes_from_map, Shape, ShapeKind};
pub use model::{
    Area, Attributes, Id, Lanelet, LaneletMap, LineString3d, Point3d, RegulatoryElement,
    RegulatoryKind,
};
pub use osm::{parse_osm, read_map};
pub use projection::{projector_for, GeoPoint, LocalProjector, MgrsProjector, UtmProjector};
