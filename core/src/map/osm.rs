//! Reader for Lanelet2-flavoured OSM XML.
//!
//! Nodes become projected points, ways become linestrings and relations become
//! lanelets, areas or regulatory elements depending on their `type` tag.

use roxmltree::{Document, Node};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use crate::map::model::{
    Area, Attributes, Id, Lanelet, LaneletMap, LineString3d, Point3d, RegulatoryElement,
    RegulatoryKind,
};
use crate::map::projection::{projector_for, GeoPoint};
use crate::prelude::{CoreError, CoreResult, MapConfig, Projector};

/// Loads and projects the map at `path`.
pub fn read_map(path: &Path, config: &MapConfig) -> CoreResult<LaneletMap> {
    let text = fs::read_to_string(path).map_err(|source| CoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let projector = projector_for(config)?;
    parse_osm(&text, projector.as_ref())
}

pub fn parse_osm(text: &str, projector: &dyn Projector) -> CoreResult<LaneletMap> {
    let doc = Document::parse(text).map_err(|e| CoreError::MapParse(e.to_string()))?;
    let root = doc.root_element();
    if !root.has_tag_name("osm") {
        return Err(CoreError::MapParse(format!(
            "root element is <{}>, expected <osm>",
            root.tag_name().name()
        )));
    }

    let elements = |name: &'static str| {
        root.children()
            .filter(move |n| n.is_element() && n.has_tag_name(name))
    };

    let mut points = HashMap::new();
    for node in elements("node") {
        let point = read_point(&node, projector)?;
        points.insert(point.id, point);
    }

    let mut ways = BTreeMap::new();
    for node in elements("way") {
        let way = read_way(&node, &points)?;
        ways.insert(way.id, way);
    }

    let mut map = LaneletMap::default();
    for node in elements("relation") {
        let id = id_attr(&node, "id")?;
        let tags = read_tags(&node)?;
        let members = read_members(&node)?;
        match tags.get("type").map(String::as_str) {
            Some("lanelet") => map.lanelets.push(read_lanelet(id, tags, &members, &ways)?),
            Some("multipolygon") => map.areas.push(read_area(id, tags, &members, &ways)?),
            Some("regulatory_element") => {
                map.regulatory_elements
                    .push(read_regulatory_element(id, &tags, &members, &ways, &points)?)
            }
            _ => {}
        }
    }

    map.lanelets.sort_by_key(|l| l.id);
    map.areas.sort_by_key(|a| a.id);
    map.regulatory_elements.sort_by_key(|r| r.id);
    map.linestrings = ways
        .into_values()
        .filter(|w| w.attribute("area") != Some("yes"))
        .collect();

    Ok(map)
}

struct Member {
    kind: String,
    id: Id,
    role: String,
}

fn id_attr(node: &Node, name: &str) -> CoreResult<Id> {
    let raw = node.attribute(name).ok_or_else(|| {
        CoreError::MapParse(format!(
            "<{}> without `{name}` attribute",
            node.tag_name().name()
        ))
    })?;
    raw.parse()
        .map_err(|_| CoreError::MapParse(format!("invalid {name} `{raw}`")))
}

fn parse_f64(raw: &str, what: &str, id: Id) -> CoreResult<f64> {
    raw.parse()
        .map_err(|_| CoreError::MapParse(format!("node {id}: invalid {what} `{raw}`")))
}

fn read_tags(node: &Node) -> CoreResult<Attributes> {
    let mut tags = Attributes::new();
    for tag in node.children().filter(|n| n.has_tag_name("tag")) {
        match (tag.attribute("k"), tag.attribute("v")) {
            (Some(k), Some(v)) => {
                tags.insert(k.to_string(), v.to_string());
            }
            _ => return Err(CoreError::MapParse("<tag> without k/v".into())),
        }
    }
    Ok(tags)
}

fn read_members(node: &Node) -> CoreResult<Vec<Member>> {
    node.children()
        .filter(|n| n.has_tag_name("member"))
        .map(|member| {
            Ok(Member {
                kind: member.attribute("type").unwrap_or_default().to_string(),
                id: id_attr(&member, "ref")?,
                role: member.attribute("role").unwrap_or_default().to_string(),
            })
        })
        .collect()
}

fn read_point(node: &Node, projector: &dyn Projector) -> CoreResult<Point3d> {
    let id = id_attr(node, "id")?;
    let tags = read_tags(node)?;
    let coord = |name: &str| -> CoreResult<f64> {
        let raw = node
            .attribute(name)
            .ok_or_else(|| CoreError::MapParse(format!("node {id} without `{name}`")))?;
        parse_f64(raw, name, id)
    };
    let tag = |name: &str| -> CoreResult<Option<f64>> {
        tags.get(name)
            .map(|raw| parse_f64(raw, name, id))
            .transpose()
    };

    let geo = GeoPoint {
        lat: coord("lat")?,
        lon: coord("lon")?,
        ele: tag("ele")?.unwrap_or(0.0),
        local_x: tag("local_x")?,
        local_y: tag("local_y")?,
    };
    let [x, y, z] = projector.forward(&geo)?;
    Ok(Point3d::new(id, x, y, z))
}

fn read_way(node: &Node, points: &HashMap<Id, Point3d>) -> CoreResult<LineString3d> {
    let id = id_attr(node, "id")?;
    let mut way_points = Vec::new();
    for nd in node.children().filter(|n| n.has_tag_name("nd")) {
        let target_id = id_attr(&nd, "ref")?;
        let point = points.get(&target_id).ok_or(CoreError::MissingReference {
            kind: "way",
            id,
            target: "node",
            target_id,
        })?;
        way_points.push(*point);
    }
    Ok(LineString3d {
        id,
        points: way_points,
        attributes: read_tags(node)?,
    })
}

fn member_way(
    kind: &'static str,
    id: Id,
    member: &Member,
    ways: &BTreeMap<Id, LineString3d>,
) -> CoreResult<LineString3d> {
    ways.get(&member.id)
        .cloned()
        .ok_or(CoreError::MissingReference {
            kind,
            id,
            target: "way",
            target_id: member.id,
        })
}

fn read_lanelet(
    id: Id,
    attributes: Attributes,
    members: &[Member],
    ways: &BTreeMap<Id, LineString3d>,
) -> CoreResult<Lanelet> {
    let bound = |role: &str| -> CoreResult<LineString3d> {
        let member = members
            .iter()
            .find(|m| m.role == role && m.kind == "way")
            .ok_or_else(|| CoreError::MalformedPrimitive {
                id,
                reason: format!("lanelet has no {role} bound"),
            })?;
        member_way("lanelet", id, member, ways)
    };

    Ok(Lanelet {
        id,
        left: bound("left")?,
        right: bound("right")?,
        attributes,
    })
}

fn read_area(
    id: Id,
    attributes: Attributes,
    members: &[Member],
    ways: &BTreeMap<Id, LineString3d>,
) -> CoreResult<Area> {
    let outer = members
        .iter()
        .filter(|m| m.role == "outer" && m.kind == "way")
        .map(|m| member_way("area", id, m, ways))
        .collect::<CoreResult<Vec<_>>>()?;
    Ok(Area {
        id,
        outer,
        attributes,
    })
}

fn read_regulatory_element(
    id: Id,
    tags: &Attributes,
    members: &[Member],
    ways: &BTreeMap<Id, LineString3d>,
    points: &HashMap<Id, Point3d>,
) -> CoreResult<RegulatoryElement> {
    let mut parameters: BTreeMap<String, Vec<LineString3d>> = BTreeMap::new();
    for member in members {
        let line = match member.kind.as_str() {
            "way" => member_way("regulatory element", id, member, ways)?,
            "node" => {
                let point = points.get(&member.id).ok_or(CoreError::MissingReference {
                    kind: "regulatory element",
                    id,
                    target: "node",
                    target_id: member.id,
                })?;
                LineString3d::new(point.id, vec![*point])
            }
            _ => continue,
        };
        parameters.entry(member.role.clone()).or_default().push(line);
    }

    let subtype = tags.get("subtype").cloned().unwrap_or_default();
    let (kind, anchor) = classify(&subtype, &parameters);
    Ok(RegulatoryElement {
        id,
        subtype,
        kind,
        anchor,
    })
}

type Parameters = BTreeMap<String, Vec<LineString3d>>;

fn role<'a>(parameters: &'a Parameters, name: &str) -> &'a [LineString3d] {
    parameters.get(name).map(Vec::as_slice).unwrap_or_default()
}

fn traffic_lights<'a>(subtype: &str, parameters: &'a Parameters) -> Option<&'a [LineString3d]> {
    (subtype == "traffic_light").then(|| role(parameters, "refers"))
}

fn ref_lines<'a>(subtype: &str, parameters: &'a Parameters) -> Option<&'a [LineString3d]> {
    matches!(subtype, "traffic_sign" | "speed_limit").then(|| role(parameters, "ref_line"))
}

fn stop_line<'a>(subtype: &str, parameters: &'a Parameters) -> Option<&'a [LineString3d]> {
    match subtype {
        "right_of_way" => Some(role(parameters, "ref_line")),
        "detection_area" | "no_stopping_area" | "crosswalk" => {
            Some(role(parameters, "stop_line"))
        }
        _ => None,
    }
}

/// Probes capabilities in fixed priority; the first one present wins.
fn classify(subtype: &str, parameters: &Parameters) -> (RegulatoryKind, Option<Point3d>) {
    let probes = [
        (RegulatoryKind::TrafficLight, traffic_lights(subtype, parameters)),
        (RegulatoryKind::RefLine, ref_lines(subtype, parameters)),
        (RegulatoryKind::StopLine, stop_line(subtype, parameters)),
    ];
    probes
        .into_iter()
        .find_map(|(kind, lines)| {
            lines.map(|lines| {
                let anchor = lines.first().and_then(|line| line.points.first().copied());
                (kind, anchor)
            })
        })
        .unwrap_or((RegulatoryKind::Unknown, None))
}
