//! Joining ways against the coordinate store.

use crate::{
    geometry::fill_gaps,
    osm::{CoordinateStore, Way},
};
use geo::geometry::Coord;
use log::debug;

/// Returns the coordinates of `way`'s nodes, in path order.
///
/// Node ids missing from `nodes` are dropped.
pub fn resolve(way: &Way, nodes: &CoordinateStore) -> Vec<Coord<f64>> {
    let coords: Vec<Coord<f64>> = way
        .node_ids
        .iter()
        .filter_map(|id| nodes.get(*id))
        .collect();
    let dropped = way.node_ids.len() - coords.len();
    if dropped > 0 {
        debug!("way {} ({}); {dropped} unknown nodes", way.id, way.name);
    }
    coords
}

/// [`resolve`] followed by gap filling at `max_gap_m`.
pub fn resolve_filled(way: &Way, nodes: &CoordinateStore, max_gap_m: f64) -> Vec<Coord<f64>> {
    fill_gaps(&resolve(way, nodes), max_gap_m)
}
