//! Small hand-written map shared by the map, render and selection tests.
//!
//! Lanelets 1 and 2 share way 12; regulatory element 3 is a traffic light.

pub(crate) const SAMPLE_OSM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="fixture">
  <node id="101" lat="35.0" lon="139.0"><tag k="local_x" v="0"/><tag k="local_y" v="0"/><tag k="ele" v="1.5"/></node>
  <node id="102" lat="35.0" lon="139.0"><tag k="local_x" v="10"/><tag k="local_y" v="0"/></node>
  <node id="103" lat="35.0" lon="139.0"><tag k="local_x" v="0"/><tag k="local_y" v="4"/></node>
  <node id="104" lat="35.0" lon="139.0"><tag k="local_x" v="10"/><tag k="local_y" v="4"/></node>
  <node id="105" lat="35.0" lon="139.0"><tag k="local_x" v="0"/><tag k="local_y" v="8"/></node>
  <node id="106" lat="35.0" lon="139.0"><tag k="local_x" v="10"/><tag k="local_y" v="8"/></node>
  <node id="107" lat="35.0" lon="139.0"><tag k="local_x" v="12"/><tag k="local_y" v="8"/></node>
  <node id="108" lat="35.0" lon="139.0"><tag k="local_x" v="12"/><tag k="local_y" v="9"/></node>
  <node id="120" lat="35.0" lon="139.0"><tag k="local_x" v="20"/><tag k="local_y" v="0"/></node>
  <node id="121" lat="35.0" lon="139.0"><tag k="local_x" v="30"/><tag k="local_y" v="0"/></node>
  <node id="122" lat="35.0" lon="139.0"><tag k="local_x" v="30"/><tag k="local_y" v="10"/></node>
  <node id="123" lat="35.0" lon="139.0"><tag k="local_x" v="20"/><tag k="local_y" v="10"/></node>
  <way id="11"><nd ref="101"/><nd ref="102"/><tag k="type" v="line_thin"/><tag k="subtype" v="solid"/></way>
  <way id="12"><nd ref="103"/><nd ref="104"/><tag k="type" v="line_thin"/><tag k="subtype" v="dashed"/></way>
  <way id="13"><nd ref="105"/><nd ref="106"/><tag k="type" v="line_thin"/><tag k="subtype" v="solid"/></way>
  <way id="15"><nd ref="107"/><nd ref="108"/><tag k="type" v="traffic_light"/></way>
  <way id="17"><nd ref="104"/><nd ref="106"/><tag k="type" v="stop_line"/></way>
  <way id="18"><nd ref="120"/><nd ref="121"/><nd ref="122"/></way>
  <way id="19"><nd ref="120"/><nd ref="123"/><nd ref="122"/></way>
  <relation id="1">
    <member type="way" ref="11" role="left"/>
    <member type="way" ref="12" role="right"/>
    <member type="relation" ref="3" role="regulatory_element"/>
    <tag k="type" v="lanelet"/><tag k="subtype" v="road"/>
  </relation>
  <relation id="2">
    <member type="way" ref="12" role="left"/>
    <member type="way" ref="13" role="right"/>
    <tag k="type" v="lanelet"/><tag k="subtype" v="road"/>
  </relation>
  <relation id="3">
    <member type="way" ref="15" role="refers"/>
    <member type="way" ref="17" role="ref_line"/>
    <tag k="type" v="regulatory_element"/><tag k="subtype" v="traffic_light"/>
  </relation>
  <relation id="5">
    <member type="way" ref="17" role="ref_line"/>
    <member type="relation" ref="1" role="right_of_way"/>
    <member type="relation" ref="2" role="yield"/>
    <tag k="type" v="regulatory_element"/><tag k="subtype" v="right_of_way"/>
  </relation>
  <relation id="6">
    <member type="way" ref="13" role="refers"/>
    <tag k="type" v="regulatory_element"/><tag k="subtype" v="bus_stop"/>
  </relation>
  <relation id="30">
    <member type="way" ref="18" role="outer"/>
    <member type="way" ref="19" role="outer"/>
    <tag k="type" v="multipolygon"/><tag k="subtype" v="parking"/>
  </relation>
</osm>
"#;

/// Sign, speed limit and crosswalk elements exercising the ref-line and
/// stop-line probes.
pub(crate) const REGULATORY_OSM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="fixture">
  <node id="201" lat="35.0" lon="139.0"><tag k="local_x" v="5"/><tag k="local_y" v="5"/></node>
  <node id="202" lat="35.0" lon="139.0"><tag k="local_x" v="5"/><tag k="local_y" v="6"/></node>
  <node id="203" lat="35.0" lon="139.0"><tag k="local_x" v="1"/><tag k="local_y" v="2"/></node>
  <node id="204" lat="35.0" lon="139.0"><tag k="local_x" v="9"/><tag k="local_y" v="2"/></node>
  <node id="205" lat="35.0" lon="139.0"><tag k="local_x" v="3"/><tag k="local_y" v="7"/></node>
  <node id="206" lat="35.0" lon="139.0"><tag k="local_x" v="7"/><tag k="local_y" v="7"/></node>
  <way id="40"><nd ref="201"/><nd ref="202"/><tag k="type" v="traffic_sign"/></way>
  <way id="41"><nd ref="203"/><nd ref="204"/><tag k="type" v="stop_line"/></way>
  <way id="42"><nd ref="205"/><nd ref="206"/><tag k="type" v="stop_line"/></way>
  <relation id="7">
    <member type="way" ref="40" role="refers"/>
    <member type="way" ref="41" role="ref_line"/>
    <tag k="type" v="regulatory_element"/><tag k="subtype" v="traffic_sign"/>
  </relation>
  <relation id="8">
    <member type="way" ref="42" role="stop_line"/>
    <tag k="type" v="regulatory_element"/><tag k="subtype" v="crosswalk"/>
  </relation>
  <relation id="9">
    <member type="way" ref="40" role="refers"/>
    <tag k="type" v="regulatory_element"/><tag k="subtype" v="speed_limit"/>
  </relation>
</osm>
"#;
