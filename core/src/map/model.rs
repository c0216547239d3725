use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier shared by every Lanelet2 primitive.
pub type Id = i64;

/// Free-form `k`/`v` tags carried by a primitive.
pub type Attributes = BTreeMap<String, String>;

/// Projected map point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3d {
    pub id: Id,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3d {
    pub fn new(id: Id, x: f64, y: f64, z: f64) -> Self {
        Self { id, x, y, z }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineString3d {
    pub id: Id,
    pub points: Vec<Point3d>,
    pub attributes: Attributes,
}

impl LineString3d {
    pub fn new(id: Id, points: Vec<Point3d>) -> Self {
        Self {
            id,
            points,
            attributes: Attributes::new(),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn front_id(&self) -> Option<Id> {
        self.points.first().map(|p| p.id)
    }

    fn back_id(&self) -> Option<Id> {
        self.points.last().map(|p| p.id)
    }
}

/// Atomic lane segment bounded by a left and a right linestring.
#[derive(Debug, Clone, PartialEq)]
pub struct Lanelet {
    pub id: Id,
    pub left: LineString3d,
    pub right: LineString3d,
    pub attributes: Attributes,
}

impl Lanelet {
    /// Outline of the lane: the left bound followed by the reversed right bound.
    pub fn polygon3d(&self) -> Vec<Point3d> {
        self.left
            .points
            .iter()
            .chain(self.right.points.iter().rev())
            .copied()
            .collect()
    }
}

/// Surface primitive described by outer (and possibly inner) boundary ways.
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub id: Id,
    pub outer: Vec<LineString3d>,
    pub attributes: Attributes,
}

impl Area {
    /// Rings assembled from the outer ways. The closing point is not repeated.
    pub fn outer_bound_polygons(&self) -> Vec<Vec<Point3d>> {
        assemble_rings(&self.outer)
    }
}

/// Chains ways sharing end points into rings, reversing ways where needed.
fn assemble_rings(ways: &[LineString3d]) -> Vec<Vec<Point3d>> {
    let mut remaining: Vec<&LineString3d> = ways.iter().filter(|w| !w.points.is_empty()).collect();
    let mut rings = Vec::new();

    while !remaining.is_empty() {
        let first = remaining.remove(0);
        let mut ring = first.points.clone();
        loop {
            let head_id = ring[0].id;
            let tail_id = ring[ring.len() - 1].id;
            if ring.len() > 1 && head_id == tail_id {
                ring.pop();
                break;
            }
            let Some(pos) = remaining
                .iter()
                .position(|w| w.front_id() == Some(tail_id) || w.back_id() == Some(tail_id))
            else {
                break;
            };
            let next = remaining.remove(pos);
            if next.front_id() == Some(tail_id) {
                ring.extend(next.points.iter().skip(1).copied());
            } else {
                ring.extend(next.points.iter().rev().skip(1).copied());
            }
        }
        rings.push(ring);
    }

    rings
}

/// Capability a regulatory element was classified under while reading the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegulatoryKind {
    TrafficLight,
    RefLine,
    StopLine,
    Unknown,
}

impl RegulatoryKind {
    pub fn label(&self) -> &'static str {
        match self {
            RegulatoryKind::TrafficLight => "traffic_light",
            RegulatoryKind::RefLine => "ref_line",
            RegulatoryKind::StopLine => "stop_line",
            RegulatoryKind::Unknown => "",
        }
    }
}

/// Rule-bearing map object with its representative point already extracted.
#[derive(Debug, Clone, PartialEq)]
pub struct RegulatoryElement {
    pub id: Id,
    pub subtype: String,
    pub kind: RegulatoryKind,
    pub anchor: Option<Point3d>,
}

/// Parsed map with its four primitive layers, each ordered by identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaneletMap {
    pub lanelets: Vec<Lanelet>,
    pub areas: Vec<Area>,
    pub linestrings: Vec<LineString3d>,
    pub regulatory_elements: Vec<RegulatoryElement>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn way(id: Id, ids: &[Id]) -> LineString3d {
        LineString3d::new(
            id,
            ids.iter()
                .map(|&i| Point3d::new(i, i as f64, 0.0, 0.0))
                .collect(),
        )
    }

    #[test]
    fn lanelet_polygon_reverses_right_bound() {
        let lanelet = Lanelet {
            id: 10,
            left: way(1, &[1, 2]),
            right: way(2, &[3, 4]),
            attributes: Attributes::new(),
        };
        let ids: Vec<Id> = lanelet.polygon3d().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 4, 3]);
    }

    #[test]
    fn ring_assembly_joins_reversed_ways_without_closing_point() {
        let area = Area {
            id: 5,
            outer: vec![way(1, &[1, 2, 3]), way(2, &[1, 4, 3])],
            attributes: Attributes::new(),
        };
        let rings = area.outer_bound_polygons();
        assert_eq!(rings.len(), 1);
        let ids: Vec<Id> = rings[0].iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn closed_single_way_drops_repeated_point() {
        let area = Area {
            id: 6,
            outer: vec![way(1, &[1, 2, 3, 1])],
            attributes: Attributes::new(),
        };
        assert_eq!(area.outer_bound_polygons()[0].len(), 3);
    }
}
