use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::map::model::{Id, LaneletMap, Point3d, RegulatoryKind};
use crate::map::osm::read_map;
use crate::prelude::{CoreResult, MapConfig};
use crate::telemetry::log::LogManager;

/// What a drawable shape was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "subtype", rename_all = "snake_case")]
pub enum ShapeKind {
    Lane,
    Area,
    LineString,
    Regulatory(RegulatoryKind),
}

impl ShapeKind {
    /// Lanes and areas outline a surface; every other kind is a line or a point.
    pub fn is_polygon(&self) -> bool {
        matches!(self, ShapeKind::Lane | ShapeKind::Area)
    }
}

/// One drawable map primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub kind: ShapeKind,
    pub id: Id,
    /// `subtype`/`type` attribute of the primitive, or the regulatory sub-kind.
    pub label: String,
    pub points: Vec<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left_bound_id: Option<Id>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right_bound_id: Option<Id>,
}

impl Shape {
    fn new(kind: ShapeKind, id: Id, label: impl Into<String>, points: &[Point3d]) -> Self {
        Self {
            kind,
            id,
            label: label.into(),
            points: points.iter().map(|p| [p.x, p.y, p.z]).collect(),
            left_bound_id: None,
            right_bound_id: None,
        }
    }

    /// True when the shape textually carries `selected` as its own or a bound id.
    pub fn matches_id(&self, selected: &str) -> bool {
        let selected = selected.trim();
        [Some(self.id), self.left_bound_id, self.right_bound_id]
            .into_iter()
            .flatten()
            .any(|id| id.to_string() == selected)
    }

    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[0]).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p[1]).collect()
    }
}

/// Reads the map at `path` and flattens it into shapes.
pub fn extract_shapes(path: &Path, config: &MapConfig) -> CoreResult<Vec<Shape>> {
    let map = read_map(path, config)?;
    let shapes = shapes_from_map(&map);
    LogManager::new("extract").record(&format!(
        "{} -> {} shapes ({} lanelets, {} areas, {} linestrings, {} regulatory elements)",
        path.display(),
        shapes.len(),
        map.lanelets.len(),
        map.areas.len(),
        map.linestrings.len(),
        map.regulatory_elements.len()
    ));
    Ok(shapes)
}

/// Lanes, then areas, then linestrings, then regulatory elements.
pub fn shapes_from_map(map: &LaneletMap) -> Vec<Shape> {
    let logger = LogManager::new("extract");
    let mut shapes = Vec::with_capacity(
        map.lanelets.len() + map.areas.len() + map.linestrings.len() + map.regulatory_elements.len(),
    );

    for lanelet in &map.lanelets {
        let mut polygon = lanelet.polygon3d();
        if let Some(first) = polygon.first().copied() {
            polygon.push(first);
        }
        let label = lanelet.attributes.get("subtype").cloned().unwrap_or_default();
        let mut shape = Shape::new(ShapeKind::Lane, lanelet.id, label, &polygon);
        shape.left_bound_id = Some(lanelet.left.id);
        shape.right_bound_id = Some(lanelet.right.id);
        shapes.push(shape);
    }

    for area in &map.areas {
        let rings = area.outer_bound_polygons();
        let Some(ring) = rings.first() else {
            logger.warn(&format!("area {} has no outer boundary; skipped", area.id));
            continue;
        };
        let label = area.attributes.get("subtype").cloned().unwrap_or_default();
        shapes.push(Shape::new(ShapeKind::Area, area.id, label, ring));
    }

    for linestring in &map.linestrings {
        let label = linestring.attribute("type").unwrap_or_default();
        shapes.push(Shape::new(
            ShapeKind::LineString,
            linestring.id,
            label,
            &linestring.points,
        ));
    }

    for element in &map.regulatory_elements {
        let anchor: Vec<Point3d> = element.anchor.into_iter().collect();
        shapes.push(Shape::new(
            ShapeKind::Regulatory(element.kind),
            element.id,
            element.kind.label(),
            &anchor,
        ));
    }

    shapes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::fixtures::{REGULATORY_OSM, SAMPLE_OSM};
    use crate::map::model::{Area, Attributes, Lanelet, LineString3d};
    use crate::map::osm::parse_osm;
    use crate::map::projection::LocalProjector;
    use crate::prelude::{CoreError, ProjectionMode};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_shapes() -> Vec<Shape> {
        shapes_from_map(&parse_osm(SAMPLE_OSM, &LocalProjector).unwrap())
    }

    #[test]
    fn shapes_follow_layer_order() {
        let shapes = sample_shapes();
        let order: Vec<(ShapeKind, Id)> = shapes.iter().map(|s| (s.kind, s.id)).collect();
        assert_eq!(order.len(), 2 + 1 + 7 + 3);
        assert_eq!(order[0], (ShapeKind::Lane, 1));
        assert_eq!(order[1], (ShapeKind::Lane, 2));
        assert_eq!(order[2], (ShapeKind::Area, 30));
        assert_eq!(order[3], (ShapeKind::LineString, 11));
        assert_eq!(
            order[10],
            (ShapeKind::Regulatory(RegulatoryKind::TrafficLight), 3)
        );
    }

    #[test]
    fn lane_polygons_are_closed_and_tagged_with_bounds() {
        let shapes = sample_shapes();
        let lane = &shapes[0];
        assert_eq!(lane.points.len(), 5);
        assert_eq!(lane.points.first(), lane.points.last());
        assert_eq!(lane.points[0], [0.0, 0.0, 1.5]);
        assert_eq!(lane.left_bound_id, Some(11));
        assert_eq!(lane.right_bound_id, Some(12));
        assert_eq!(lane.label, "road");
    }

    #[test]
    fn areas_and_linestrings_are_not_closed() {
        let shapes = sample_shapes();
        let area = &shapes[2];
        assert_eq!(area.points.len(), 4);
        assert_ne!(area.points.first(), area.points.last());
        for shape in shapes.iter().filter(|s| s.kind == ShapeKind::LineString) {
            assert_eq!(shape.points.len(), if shape.id == 18 || shape.id == 19 { 3 } else { 2 });
        }
    }

    #[test]
    fn regulatory_shapes_hold_one_point_or_none() {
        let shapes = sample_shapes();
        let regulatory: Vec<&Shape> = shapes
            .iter()
            .filter(|s| matches!(s.kind, ShapeKind::Regulatory(_)))
            .collect();
        assert_eq!(regulatory[0].label, "traffic_light");
        assert_eq!(regulatory[0].points, vec![[12.0, 8.0, 0.0]]);
        assert_eq!(regulatory[1].label, "stop_line");
        assert_eq!(regulatory[2].label, "");
        assert!(regulatory[2].points.is_empty());
    }

    #[test]
    fn sign_and_crosswalk_shapes_carry_their_anchor() {
        let shapes = shapes_from_map(&parse_osm(REGULATORY_OSM, &LocalProjector).unwrap());
        let regulatory: Vec<(Id, ShapeKind, &str, &[[f64; 3]])> = shapes
            .iter()
            .filter(|s| matches!(s.kind, ShapeKind::Regulatory(_)))
            .map(|s| (s.id, s.kind, s.label.as_str(), s.points.as_slice()))
            .collect();
        assert_eq!(regulatory.len(), 3);
        assert_eq!(
            regulatory[0],
            (
                7,
                ShapeKind::Regulatory(RegulatoryKind::RefLine),
                "ref_line",
                &[[1.0, 2.0, 0.0]][..]
            )
        );
        assert_eq!(
            regulatory[1],
            (
                8,
                ShapeKind::Regulatory(RegulatoryKind::StopLine),
                "stop_line",
                &[[3.0, 7.0, 0.0]][..]
            )
        );
        assert_eq!(regulatory[2].2, "ref_line");
        assert!(regulatory[2].3.is_empty());
    }

    #[test]
    fn only_lanes_and_areas_are_polygons() {
        assert!(ShapeKind::Lane.is_polygon());
        assert!(ShapeKind::Area.is_polygon());
        assert!(!ShapeKind::LineString.is_polygon());
        assert!(!ShapeKind::Regulatory(RegulatoryKind::StopLine).is_polygon());
    }

    #[test]
    fn empty_lane_stays_empty_and_area_without_ring_is_skipped() {
        let map = LaneletMap {
            lanelets: vec![Lanelet {
                id: 1,
                left: LineString3d::new(2, Vec::new()),
                right: LineString3d::new(3, Vec::new()),
                attributes: Attributes::new(),
            }],
            areas: vec![Area {
                id: 4,
                outer: Vec::new(),
                attributes: Attributes::new(),
            }],
            ..Default::default()
        };
        let shapes = shapes_from_map(&map);
        assert_eq!(shapes.len(), 1);
        assert!(shapes[0].points.is_empty());
    }

    #[test]
    fn matches_own_and_bound_ids() {
        let lane = &sample_shapes()[0];
        assert!(lane.matches_id("1"));
        assert!(lane.matches_id("11"));
        assert!(lane.matches_id("12"));
        assert!(!lane.matches_id("2"));
        assert!(!lane.matches_id(""));
    }

    #[test]
    fn extract_reads_file_from_disk() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_OSM.as_bytes()).unwrap();
        let config = MapConfig {
            projection: ProjectionMode::Local,
            ..Default::default()
        };
        let shapes = extract_shapes(file.path(), &config).unwrap();
        assert_eq!(shapes.len(), 13);
    }

    #[test]
    fn extract_propagates_missing_file() {
        let err = extract_shapes(Path::new("/nonexistent/map.osm"), &MapConfig::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }
}
