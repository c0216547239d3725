//! Fixtures shared by the dashboard tests: a two-lane map and a fake validator.

use crate::workflow::config::DashboardConfig;
use mapvalcore::prelude::ProjectionMode;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Lanes 1 (bounds 11/12) and 2 (bounds 12/13) plus traffic light 3.
pub const TWO_LANE_MAP: &str = r#"<osm version="0.6">
  <node id="101" lat="35.0" lon="139.0"><tag k="local_x" v="0"/><tag k="local_y" v="0"/></node>
  <node id="102" lat="35.0" lon="139.0"><tag k="local_x" v="10"/><tag k="local_y" v="0"/></node>
  <node id="103" lat="35.0" lon="139.0"><tag k="local_x" v="0"/><tag k="local_y" v="4"/></node>
  <node id="104" lat="35.0" lon="139.0"><tag k="local_x" v="10"/><tag k="local_y" v="4"/></node>
  <node id="105" lat="35.0" lon="139.0"><tag k="local_x" v="0"/><tag k="local_y" v="8"/></node>
  <node id="106" lat="35.0" lon="139.0"><tag k="local_x" v="10"/><tag k="local_y" v="8"/></node>
  <node id="107" lat="35.0" lon="139.0"><tag k="local_x" v="12"/><tag k="local_y" v="8"/></node>
  <node id="108" lat="35.0" lon="139.0"><tag k="local_x" v="12"/><tag k="local_y" v="9"/></node>
  <way id="11"><nd ref="101"/><nd ref="102"/></way>
  <way id="12"><nd ref="103"/><nd ref="104"/></way>
  <way id="13"><nd ref="105"/><nd ref="106"/></way>
  <way id="15"><nd ref="107"/><nd ref="108"/><tag k="type" v="traffic_light"/></way>
  <relation id="1"><member type="way" ref="11" role="left"/><member type="way" ref="12" role="right"/><tag k="type" v="lanelet"/></relation>
  <relation id="2"><member type="way" ref="12" role="left"/><member type="way" ref="13" role="right"/><tag k="type" v="lanelet"/></relation>
  <relation id="3"><member type="way" ref="15" role="refers"/><tag k="type" v="regulatory_element"/><tag k="subtype" v="traffic_light"/></relation>
</osm>
"#;

/// Lane 1 fails with a message naming lane 2; the traffic light requirement passes.
pub const TWO_LANE_REPORT: &str = r#"{"version":"1.0","requirements":[{"id":"vm-01-01","passed":false,"validators":[{"name":"mapping.lane.boundary","passed":false,"issues":[{"id":1,"issue_code":"Lane.Boundary-001","message":"boundary 2 invalid","primitive":"lanelet","severity":"Error"}]}]},{"id":"vm-02-01","passed":true,"validators":[{"name":"mapping.traffic_light.correct_facing","passed":true}]}]}"#;

pub const LOOKUP_TABLE: &str =
    "ID,Category,Requirement,URL\nvm-01-01,Lanelet,Lane boundaries are valid,https://example.com/vm-01-01\n";

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Script that writes `report` into the directory passed after `-o`.
pub fn fake_validator(dir: &Path, report: &str) -> PathBuf {
    write_script(
        dir,
        "validator.sh",
        &format!(
            "while [ $# -gt 0 ]; do if [ \"$1\" = \"-o\" ]; then out=\"$2\"; fi; shift; done\n\
             echo '{report}' > \"$out/lanelet2_validation_results.json\""
        ),
    )
}

pub fn failing_validator(dir: &Path) -> PathBuf {
    write_script(
        dir,
        "failing.sh",
        "echo loading map; echo projection error >&2; exit 2",
    )
}

/// Config rooted in `dir` using local projection and the given validator.
pub fn config_in(dir: &Path, validator: PathBuf) -> DashboardConfig {
    fs::write(dir.join("table.csv"), LOOKUP_TABLE).unwrap();
    DashboardConfig {
        validator_program: validator,
        requirements: dir.join("rules.json"),
        projection: ProjectionMode::Local,
        upload_dir: dir.join("uploads"),
        output_dir: dir.join("out"),
        lookup_table: dir.join("table.csv"),
        chart_size: 400,
        ..Default::default()
    }
}
