//! Pure functions over ordered point sequences.

use crate::{
    constants::GAP_TOLERANCE_M,
    math::{linspace, GreatCircle},
};
use geo::{
    geometry::{Coord, Point},
    HaversineDistance,
};
use itertools::Itertools;

/// Haversine distance between two coordinates, in meters.
pub fn distance_m(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Point::from(a).haversine_distance(&Point::from(b))
}

/// Inserts great circle points between consecutive coordinates more
/// than `max_gap_m` apart.
///
/// Original coordinates are kept exactly. Running this on its own
/// output changes nothing.
pub fn fill_gaps(points: &[Coord<f64>], max_gap_m: f64) -> Vec<Coord<f64>> {
    let mut filled = Vec::with_capacity(points.len());
    if let Some(first) = points.first() {
        filled.push(*first);
    }
    for (start, end) in points.iter().copied().tuple_windows() {
        if distance_m(start, end) > max_gap_m + GAP_TOLERANCE_M {
            filled.extend(GreatCircle::new(start, end).interior(max_gap_m));
        }
        filled.push(end);
    }
    filled
}

/// Same as [`fill_gaps`], additionally interpolating elevation
/// linearly for the inserted points.
pub fn fill_gaps_with_elevation(
    points: &[Coord<f64>],
    elevation_m: &[f64],
    max_gap_m: f64,
) -> (Vec<Coord<f64>>, Vec<f64>) {
    debug_assert_eq!(points.len(), elevation_m.len());
    let mut filled_points = Vec::with_capacity(points.len());
    let mut filled_elev = Vec::with_capacity(points.len());
    if let (Some(point), Some(elev)) = (points.first(), elevation_m.first()) {
        filled_points.push(*point);
        filled_elev.push(*elev);
    }
    for ((start, end), (start_elev, end_elev)) in points
        .iter()
        .copied()
        .tuple_windows()
        .zip(elevation_m.iter().copied().tuple_windows())
    {
        if distance_m(start, end) > max_gap_m + GAP_TOLERANCE_M {
            let arc = GreatCircle::new(start, end);
            let segments = arc.segments(max_gap_m);
            filled_points.extend(arc.interior(max_gap_m));
            filled_elev.extend(
                linspace(start_elev, end_elev, segments + 1)
                    .skip(1)
                    .take(segments - 1),
            );
        }
        filled_points.push(end);
        filled_elev.push(end_elev);
    }
    (filled_points, filled_elev)
}

/// Returns the boundary path of a closed polygon.
///
/// A ring whose last point differs from its first is closed, and the
/// closing segment is gap filled with `max_gap_m`. Fewer than three
/// points cannot describe an area and are returned as is.
pub fn area_to_line(ring: &[Coord<f64>], max_gap_m: f64) -> Vec<Coord<f64>> {
    let mut line = ring.to_vec();
    if let [first, .., last] = ring {
        if ring.len() >= 3 && first != last {
            line.extend(GreatCircle::new(*last, *first).interior(max_gap_m));
            line.push(*first);
        }
    }
    line
}

/// Distance from the previous point to each point; 0 for the first.
pub fn distances(points: &[Coord<f64>]) -> Vec<f64> {
    std::iter::once(0.0)
        .take(points.len())
        .chain(
            points
                .iter()
                .tuple_windows()
                .map(|(a, b)| distance_m(*a, *b)),
        )
        .collect()
}

/// Elevation delta from the previous point to each point; 0 for the
/// first.
pub fn elevation_changes(elevation_m: &[f64]) -> Vec<f64> {
    std::iter::once(0.0)
        .take(elevation_m.len())
        .chain(elevation_m.iter().tuple_windows().map(|(a, b)| b - a))
        .collect()
}

/// Rise over run for each point.
///
/// Zero-length steps have a slope of 0.
pub fn slopes(elevation_change_m: &[f64], distance_m: &[f64]) -> Vec<f64> {
    elevation_change_m
        .iter()
        .zip(distance_m)
        .map(|(rise, run)| if *run == 0.0 { 0.0 } else { rise / run })
        .collect()
}
