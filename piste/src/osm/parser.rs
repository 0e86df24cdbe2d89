use super::{
    xml::{attr, closes, opens, self_closing},
    Coord, OsmId, ParsedMap, Way, WayTags,
};
use crate::PisteError;
use log::debug;
use std::{
    collections::HashSet,
    io::BufRead,
};

/// Parses an extract from `rdr`.
///
/// `on_progress` is called with the byte length of every line read.
pub fn parse<R: BufRead>(
    mut rdr: R,
    blacklist: &HashSet<OsmId>,
    mut on_progress: impl FnMut(u64),
) -> Result<ParsedMap, PisteError> {
    let mut parser = WayParser::new(blacklist);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = rdr.read_until(b'\n', &mut buf)?;
        if n == 0 {
            break;
        }
        parser.feed(&String::from_utf8_lossy(&buf));
        on_progress(n as u64);
    }
    Ok(parser.finish())
}

enum State {
    OutsideWay,
    /// `None` while skipping a blacklisted way.
    InsideWay(Option<WayAccumulator>),
}

/// Everything known about the way currently being read.
struct WayAccumulator {
    id: OsmId,
    name: String,
    node_ids: Vec<OsmId>,
    tags: WayTags,
}

impl WayAccumulator {
    fn new(id: OsmId) -> Self {
        Self {
            id,
            name: String::new(),
            node_ids: Vec::new(),
            tags: WayTags::default(),
        }
    }

    fn node_ref(&mut self, line: &str) {
        if let Some(id) = attr(line, "ref").and_then(|r| r.parse().ok()) {
            self.node_ids.push(id);
        }
    }

    fn tag(&mut self, line: &str) {
        let (Some(key), Some(value)) = (attr(line, "k"), attr(line, "v")) else {
            return;
        };
        let (key, value) = (&*key, &*value);
        match key {
            "name" => self.name = value.to_owned(),
            "piste:difficulty" => self.tags.is_trail = true,
            "piste:type"
                if ["backcountry", "nordic", "skitour"]
                    .iter()
                    .any(|kind| value.contains(kind)) =>
            {
                self.tags.is_backcountry = true;
            }
            "aerialway" => self.tags.is_lift = true,
            "leaf_type" => self.tags.is_area = true,
            "area" if value == "yes" => self.tags.is_area = true,
            "natural" if value == "wood" => self.tags.is_area = true,
            _ => (),
        }
        if is_glade_signal(key, value) {
            self.tags.mark_glade();
        }
    }
}

/// Any of these mark gladed or wooded terrain.
fn is_glade_signal(key: &str, value: &str) -> bool {
    let key = key.to_lowercase();
    let value = value.to_lowercase();
    (key.contains("glade") && value != "no")
        || key == "leaf_type"
        || value.contains("glade")
        || value.contains("tree skiing")
}

/// Hands out table-unique names.
///
/// One counter is shared between tables so every synthesized name in
/// a parse is distinct.
#[derive(Default)]
struct Names {
    counter: usize,
    trails: HashSet<String>,
    lifts: HashSet<String>,
}

#[derive(Clone, Copy)]
enum Table {
    Trails,
    Lifts,
}

impl Names {
    fn claim(&mut self, raw: &str, table: Table) -> String {
        let Self {
            counter,
            trails,
            lifts,
        } = self;
        let taken = match table {
            Table::Trails => trails,
            Table::Lifts => lifts,
        };
        let mut name = raw.to_owned();
        while name.is_empty() || taken.contains(&name) {
            name = format!("{raw}_{counter}");
            *counter += 1;
        }
        taken.insert(name.clone());
        name
    }
}

/// Line oriented state machine recovering ways and nodes from an
/// extract.
pub struct WayParser<'a> {
    blacklist: &'a HashSet<OsmId>,
    state: State,
    names: Names,
    map: ParsedMap,
}

impl<'a> WayParser<'a> {
    pub fn new(blacklist: &'a HashSet<OsmId>) -> Self {
        Self {
            blacklist,
            state: State::OutsideWay,
            names: Names::default(),
            map: ParsedMap::default(),
        }
    }

    /// Consumes one line of the extract.
    pub fn feed(&mut self, line: &str) {
        let line = line.trim();
        self.state = match std::mem::replace(&mut self.state, State::OutsideWay) {
            State::OutsideWay => self.outside_way(line),
            State::InsideWay(way) => self.inside_way(way, line),
        };
    }

    /// Returns everything parsed so far.
    ///
    /// A way still open at end of input is discarded.
    pub fn finish(self) -> ParsedMap {
        if let State::InsideWay(Some(way)) = &self.state {
            debug!("discarding unterminated way {}", way.id);
        }
        debug!(
            "parsed; nodes: {}, trails: {}, lifts: {}",
            self.map.nodes.len(),
            self.map.trails.len(),
            self.map.lifts.len()
        );
        self.map
    }
}

/// Private API.
impl<'a> WayParser<'a> {
    fn outside_way(&mut self, line: &str) -> State {
        if opens(line, "way") {
            self.start_way(line)
        } else {
            if opens(line, "node") {
                self.node(line);
            }
            State::OutsideWay
        }
    }

    fn inside_way(&mut self, way: Option<WayAccumulator>, line: &str) -> State {
        if closes(line, "way") {
            if let Some(way) = way {
                self.finish_way(way);
            }
            return State::OutsideWay;
        }
        if opens(line, "way") {
            if let Some(way) = way {
                debug!("way {} never closed, dropping it", way.id);
            }
            return self.start_way(line);
        }
        let Some(mut way) = way else {
            return State::InsideWay(None);
        };
        if opens(line, "nd") {
            way.node_ref(line);
        } else if opens(line, "tag") {
            way.tag(line);
        }
        State::InsideWay(Some(way))
    }

    fn start_way(&mut self, line: &str) -> State {
        if self_closing(line) {
            return State::OutsideWay;
        }
        match attr(line, "id").and_then(|id| id.parse::<OsmId>().ok()) {
            Some(id) if self.blacklist.contains(&id) => {
                debug!("skipping blacklisted way {id}");
                State::InsideWay(None)
            }
            Some(id) => State::InsideWay(Some(WayAccumulator::new(id))),
            None => State::InsideWay(None),
        }
    }

    fn node(&mut self, line: &str) {
        let Some(id) = attr(line, "id").and_then(|id| id.parse::<OsmId>().ok()) else {
            return;
        };
        let lat = attr(line, "lat").and_then(|lat| lat.parse::<f64>().ok());
        let lon = attr(line, "lon").and_then(|lon| lon.parse::<f64>().ok());
        let last = self.map.nodes.last();
        let y = lat.or(last.map(|c| c.y));
        let x = lon.or(last.map(|c| c.x));
        if let (Some(x), Some(y)) = (x, y) {
            self.map.nodes.insert(id, Coord { x, y });
        }
    }

    fn finish_way(&mut self, way: WayAccumulator) {
        let WayAccumulator {
            id,
            name,
            node_ids,
            tags,
        } = way;

        if node_ids.is_empty() {
            debug!("way {id} has no nodes, dropping it");
            return;
        }

        let mut listed_as = None;

        if tags.accepted_as_trail() {
            let name = self.names.claim(&name, Table::Trails);
            self.map.trails.push(Way {
                id,
                name: name.clone(),
                node_ids: node_ids.clone(),
                tags,
            });
            listed_as = Some(name);
        }

        if tags.is_lift {
            // A way that is also a trail keeps its trail name when free.
            let base = listed_as.as_deref().unwrap_or(&name);
            let name = self.names.claim(base, Table::Lifts);
            self.map.lifts.push(Way {
                id,
                name: name.clone(),
                node_ids,
                tags,
            });
            listed_as.get_or_insert(name);
        }

        if let Some(name) = listed_as {
            self.map.way_ids.push((name, id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, OsmId, ParsedMap, WayParser};
    use std::collections::HashSet;

    fn parse_str(osm: &str, blacklist: &[OsmId]) -> ParsedMap {
        let blacklist: HashSet<OsmId> = blacklist.iter().copied().collect();
        parse(osm.as_bytes(), &blacklist, |_| ()).unwrap()
    }

    fn nodes() -> &'static str {
        r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="osmium/1.14.0">
  <node id="1" version="1" lat="44.2700000" lon="-71.3000000"/>
  <node id="2" version="1" lat="44.2701000" lon="-71.3000000"/>
  <node id="3" version="1" lat="44.2702000" lon="-71.3000000"/>
  <node id="4" version="1" lat="44.2702000" lon="-71.2999000"/>
"#
    }

    #[test]
    fn test_trail_and_lift() {
        let osm = format!(
            r#"{}
  <way id="100" version="2">
    <nd ref="1"/>
    <nd ref="2"/>
    <nd ref="3"/>
    <tag k="name" v="Lower Lynx"/>
    <tag k="piste:difficulty" v="intermediate"/>
    <tag k="piste:type" v="downhill"/>
  </way>
  <way id="200" version="1">
    <nd ref="3"/>
    <nd ref="1"/>
    <tag k="aerialway" v="chair_lift"/>
    <tag k="name" v="Summit Quad"/>
  </way>
</osm>"#,
            nodes()
        );
        let map = parse_str(&osm, &[]);
        assert_eq!(map.nodes.len(), 4);
        assert_eq!(map.total_trail_count(), 1);
        assert_eq!(map.trails[0].name, "Lower Lynx");
        assert_eq!(map.trails[0].node_ids, vec![1, 2, 3]);
        assert_eq!(map.trails[0].tags.difficulty_modifier, 0);
        assert_eq!(map.lifts.len(), 1);
        assert_eq!(map.lifts[0].node_ids, vec![3, 1]);
        assert_eq!(
            map.way_ids,
            vec![("Lower Lynx".to_string(), 100), ("Summit Quad".to_string(), 200)]
        );
    }

    #[test]
    fn test_glade_counted_once() {
        let osm = format!(
            r#"{}
  <way id="7">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="leaf_type" v="broadleaved"/>
    <tag k="gladed" v="yes"/>
    <tag k="name" v="Hemlock Glade"/>
    <tag k="note" v="Tree Skiing"/>
    <tag k="piste:difficulty" v="advanced"/>
  </way>
</osm>"#,
            nodes()
        );
        let map = parse_str(&osm, &[]);
        let tags = map.trails[0].tags;
        assert!(tags.is_glade);
        assert!(tags.is_area);
        assert_eq!(tags.difficulty_modifier, 1);
        let meta: Vec<_> = map.trail_meta().collect();
        assert_eq!(meta[0].difficulty_modifier, 1);
        assert!(meta[0].is_area);
    }

    #[test]
    fn test_gladed_no_is_not_a_glade() {
        let osm = r#"<way id="8">
<nd ref="1"/>
<tag k="gladed" v="no"/>
<tag k="piste:difficulty" v="easy"/>
</way>"#;
        let map = parse_str(osm, &[]);
        assert_eq!(map.trails[0].tags.difficulty_modifier, 0);
    }

    #[test]
    fn test_glade_keys() {
        for (value, modifier) in [("yes", 1), ("No", 0)] {
            let osm = format!(
                r#"<way id="8">
<nd ref="1"/>
<tag k="piste:gladed" v="{value}"/>
<tag k="piste:difficulty" v="advanced"/>
</way>"#
            );
            let map = parse_str(&osm, &[]);
            assert_eq!(map.trails[0].tags.difficulty_modifier, modifier);
            assert_eq!(map.trails[0].tags.is_glade, modifier == 1);
        }
    }

    #[test]
    fn test_backcountry_excluded() {
        for kind in ["backcountry", "nordic", "skitour"] {
            let osm = format!(
                r#"<way id="9">
<nd ref="1"/>
<nd ref="2"/>
<tag k="piste:difficulty" v="expert"/>
<tag k="piste:type" v="{kind}"/>
<tag k="gladed" v="yes"/>
<tag k="name" v="Out of Bounds"/>
</way>"#
            );
            let map = parse_str(&osm, &[]);
            assert_eq!(map.total_trail_count(), 0);
            assert!(map.way_ids.is_empty());
        }
    }

    #[test]
    fn test_blacklist() {
        let osm = format!(
            r#"{}
  <way id="100">
    <nd ref="1"/>
    <nd ref="2"/>
    <tag k="piste:difficulty" v="easy"/>
    <tag k="aerialway" v="t-bar"/>
    <tag k="name" v="Service Road"/>
  </way>
  <way id="101">
    <nd ref="2"/>
    <nd ref="3"/>
    <tag k="piste:difficulty" v="easy"/>
    <tag k="name" v="Easy Street"/>
  </way>
</osm>"#,
            nodes()
        );
        let map = parse_str(&osm, &[100]);
        assert_eq!(map.total_trail_count(), 1);
        assert_eq!(map.trails[0].id, 101);
        assert!(map.lifts.is_empty());
        assert_eq!(map.way_ids, vec![("Easy Street".to_string(), 101)]);
    }

    #[test]
    fn test_name_disambiguation() {
        let way = |id: i64, name: Option<&str>| {
            let name_tag = name
                .map(|n| format!(r#"<tag k="name" v="{n}"/>"#))
                .unwrap_or_default();
            format!(
                "<way id=\"{id}\">\n<nd ref=\"1\"/>\n{name_tag}\n<tag k=\"piste:difficulty\" v=\"easy\"/>\n</way>\n"
            )
        };
        let osm = [
            way(1, None),
            way(2, None),
            way(3, Some("Bunny")),
            way(4, Some("Bunny")),
        ]
        .concat();
        let map = parse_str(&osm, &[]);
        let names: Vec<&str> = map.trails.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["_0", "_1", "Bunny", "Bunny_2"]);
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn test_last_name_wins() {
        let osm = r#"<way id="1">
<tag k="name" v="First"/>
<nd ref="1"/>
<tag k="name" v="Second"/>
<tag k="piste:difficulty" v="novice"/>
</way>"#;
        assert_eq!(parse_str(osm, &[]).trails[0].name, "Second");
    }

    #[test]
    fn test_trail_and_lift_same_way() {
        let osm = r#"<way id="5">
<nd ref="1"/>
<nd ref="2"/>
<tag k="aerialway" v="magic_carpet"/>
<tag k="piste:difficulty" v="novice"/>
</way>"#;
        let map = parse_str(osm, &[]);
        assert_eq!(map.trails.len(), 1);
        assert_eq!(map.lifts.len(), 1);
        assert_eq!(map.trails[0].node_ids, map.lifts[0].node_ids);
        assert_eq!(map.trails[0].name, "_0");
        assert_eq!(map.lifts[0].name, "_0");
        assert_eq!(map.way_ids, vec![("_0".to_string(), 5)]);
    }

    #[test]
    fn test_trail_name_reused_for_lift_unless_taken() {
        let osm = r#"<way id="6">
<nd ref="1"/>
<tag k="aerialway" v="magic_carpet"/>
<tag k="name" v="Carpet"/>
</way>
<way id="7">
<nd ref="2"/>
<tag k="aerialway" v="magic_carpet"/>
<tag k="piste:difficulty" v="novice"/>
<tag k="name" v="Carpet"/>
</way>"#;
        let map = parse_str(osm, &[]);
        assert_eq!(map.trails[0].name, "Carpet");
        let lifts: Vec<&str> = map.lifts.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(lifts, vec!["Carpet", "Carpet_0"]);
        assert_eq!(
            map.way_ids,
            vec![("Carpet".to_string(), 6), ("Carpet".to_string(), 7)]
        );
    }

    #[test]
    fn test_malformed_lines_are_tolerated() {
        let osm = r#"<node id="1" lat="44.27" lon="-71.3"/>
<node id="2" lat="bogus" lon="-71.2"/>
<node lat="1.0" lon="1.0"/>
<way id="x">
<nd ref="1"/>
<tag k="piste:difficulty" v="easy"/>
</way>
<way id="3">
<nd ref="nope"/>
<nd ref="2"/>
<tag k="piste:difficulty"/>
<tag v="orphan"/>
</way>
<way id="4"/>"#;
        let map = parse_str(osm, &[]);
        // Node 2 falls back to the previous latitude.
        assert_eq!(map.nodes.len(), 2);
        assert_eq!(map.nodes.get(2).map(|c| c.y), Some(44.27));
        // Way "x" has no usable id; way 3 has no usable tags.
        assert_eq!(map.total_trail_count(), 0);
    }

    #[test]
    fn test_feed_directly() {
        let blacklist = HashSet::new();
        let mut parser = WayParser::new(&blacklist);
        for line in [
            "<way id='12'>",
            "<nd ref='1' />",
            "<tag k='piste:difficulty' v='easy' />",
            "</way>",
            "<way id='13'>",
            "<nd ref='1' />",
        ] {
            parser.feed(line);
        }
        let map = parser.finish();
        assert_eq!(map.total_trail_count(), 1);
        assert_eq!(map.trails[0].id, 12);
    }
}
