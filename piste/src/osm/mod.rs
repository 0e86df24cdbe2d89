//! OpenStreetMap extract parsing.
//!
//! Extracts are read line by line; every element of interest is
//! expected on its own line, which is how osmium, Overpass and JOSM
//! write `.osm` files.

mod parser;
mod xml;

pub use parser::{parse, WayParser};

use crate::PisteError;
use geo::geometry::Coord;
use serde::Deserialize;
use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

/// OSM element identifier.
pub type OsmId = i64;

/// Node id → coordinate lookup, populated once per parse.
#[derive(Debug, Clone, Default)]
pub struct CoordinateStore {
    coords: HashMap<OsmId, Coord<f64>>,

    /// Most recently inserted coordinate.
    last: Option<Coord<f64>>,
}

impl CoordinateStore {
    pub fn insert(&mut self, id: OsmId, coord: Coord<f64>) {
        self.coords.insert(id, coord);
        self.last = Some(coord);
    }

    pub fn get(&self, id: OsmId) -> Option<Coord<f64>> {
        self.coords.get(&id).copied()
    }

    pub fn last(&self) -> Option<Coord<f64>> {
        self.last
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

/// Classification gathered from a way's tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WayTags {
    /// Has a `piste:difficulty` tag.
    pub is_trail: bool,

    /// Has an `aerialway` tag.
    pub is_lift: bool,

    /// Closed polygon, e.g. a glade boundary or a patch of woods.
    pub is_area: bool,

    /// Backcountry, nordic or touring piste. Never a trail.
    pub is_backcountry: bool,

    /// Gladed or wooded terrain.
    pub is_glade: bool,

    /// Bonus added to the way's base difficulty.
    pub difficulty_modifier: u32,
}

impl WayTags {
    /// Marks the way as gladed. Only the first call bumps the
    /// difficulty modifier.
    pub fn mark_glade(&mut self) {
        if !self.is_glade {
            self.is_glade = true;
            self.difficulty_modifier += 1;
        }
    }

    /// Trails are pistes that are not backcountry.
    pub fn accepted_as_trail(&self) -> bool {
        self.is_trail && !self.is_backcountry
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Way {
    pub id: OsmId,

    /// Unique within the table (trails or lifts) the way belongs to.
    pub name: String,

    /// Node references in path order.
    pub node_ids: Vec<OsmId>,

    pub tags: WayTags,
}

/// Per-trail metadata handed to rendering and rating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailMeta {
    pub name: String,
    pub difficulty_modifier: u32,
    pub is_area: bool,
}

/// Everything recovered from one extract.
#[derive(Debug, Clone, Default)]
pub struct ParsedMap {
    pub nodes: CoordinateStore,

    /// Accepted trails, in file order.
    pub trails: Vec<Way>,

    /// Lifts, in file order. A way may be both a trail and a lift.
    pub lifts: Vec<Way>,

    /// (name, id) of every accepted way.
    pub way_ids: Vec<(String, OsmId)>,
}

impl ParsedMap {
    pub fn total_trail_count(&self) -> usize {
        self.trails.len()
    }

    pub fn trail_meta(&self) -> impl Iterator<Item = TrailMeta> + '_ {
        self.trails.iter().map(|way| TrailMeta {
            name: way.name.clone(),
            difficulty_modifier: way.tags.difficulty_modifier,
            is_area: way.tags.is_area,
        })
    }
}

/// Reads a set of way ids to ignore from a CSV file with an `id`
/// column.
pub fn load_blacklist<P: AsRef<Path>>(path: P) -> Result<HashSet<OsmId>, PisteError> {
    #[derive(Deserialize)]
    struct Row {
        id: OsmId,
    }

    let path = path.as_ref();
    if !path.exists() {
        return Err(PisteError::MissingInput(path.to_owned()));
    }
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    rdr.deserialize::<Row>()
        .map(|row| row.map(|row| row.id).map_err(PisteError::from))
        .collect()
}
