//! Resort level aggregation.
//!
//! Each trail is rated by the length-weighted mean difficulty class
//! of its points, plus its difficulty modifier. Trails are then
//! ranked, and the hardest and easiest quarters (at least one trail
//! each) summarize the resort:
//!
//! - `difficulty`: length-weighted mean rating of the hardest quarter.
//! - `ease`: [`MAX_POINT_DIFFICULTY`] minus the length-weighted mean
//!   rating of the easiest quarter, so larger means gentler beginner
//!   terrain.

use crate::{
    constants::MAX_POINT_DIFFICULTY,
    osm::OsmId,
    profile::Profile,
    trail::{Lift, Trail},
};
use log::info;
use serde::Serialize;

/// Every trail and lift of one ski area.
#[derive(Debug, Clone, Default)]
pub struct Mountain {
    pub trails: Vec<Trail>,
    pub lifts: Vec<Lift>,

    /// (name, id) of every way the parser accepted.
    pub way_ids: Vec<(String, OsmId)>,
}

impl Mountain {
    /// Derives slope and difficulty for every trail.
    pub fn analyze(&mut self) {
        for trail in &mut self.trails {
            trail.analyze();
        }
    }

    pub fn summary(&self) -> Option<MountainSummary> {
        summarize(&self.trails)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MountainSummary {
    /// How hard the hardest terrain is.
    pub difficulty: f64,

    /// How gentle the easiest terrain is.
    pub ease: f64,

    /// Highest minus lowest trail elevation, in meters.
    pub vertical_m: u32,

    /// Trails that contributed to the ratings.
    pub trail_count: usize,
}

/// A trail's rating and the length it is weighted by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailRating {
    pub rating: f64,
    pub length_m: f64,
}

/// Rates an analyzed profile.
///
/// Returns `None` for profiles with no length, including ones that
/// were never analyzed.
pub fn rate(profile: &Profile, difficulty_modifier: u32) -> Option<TrailRating> {
    let length_m = profile.length_m();
    if length_m <= 0.0 {
        return None;
    }
    let weighted: f64 = profile
        .difficulty
        .iter()
        .zip(&profile.distance_m)
        .map(|(class, distance)| f64::from(*class) * distance)
        .sum();
    let mean = weighted / length_m;
    let rating = if mean > 0.0 {
        mean + f64::from(difficulty_modifier)
    } else {
        mean
    };
    Some(TrailRating { rating, length_m })
}

/// Reduces analyzed trails to resort level metrics.
///
/// Returns `None` when no trail has any length to rate.
pub fn summarize(trails: &[Trail]) -> Option<MountainSummary> {
    let mut ratings: Vec<TrailRating> = trails
        .iter()
        .filter_map(|trail| rate(trail.rated(), trail.difficulty_modifier))
        .collect();
    if ratings.is_empty() {
        return None;
    }
    ratings.sort_by(|a, b| a.rating.total_cmp(&b.rating));

    let quarter = ((ratings.len() + 3) / 4).max(1);
    let easiest = weighted_mean(&ratings[..quarter]);
    let hardest = weighted_mean(&ratings[ratings.len() - quarter..]);

    let vertical_m = trails
        .iter()
        .filter_map(|trail| trail.rated().elevation_range())
        .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)))
        .map_or(0.0, |(lo, hi)| (hi - lo).round());

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let summary = MountainSummary {
        difficulty: round2(hardest),
        ease: round2(f64::from(MAX_POINT_DIFFICULTY) - easiest),
        vertical_m: vertical_m as u32,
        trail_count: ratings.len(),
    };
    info!("{summary:?}");
    Some(summary)
}

fn weighted_mean(ratings: &[TrailRating]) -> f64 {
    let (sum, length) = ratings.iter().fold((0.0, 0.0), |(sum, length), r| {
        (sum + r.rating * r.length_m, length + r.length_m)
    });
    sum / length
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{rate, summarize, Mountain, MountainSummary};
    use crate::{
        profile::Profile,
        trail::{Trail, TrailGeometry},
    };
    use approx::assert_relative_eq;
    use geo::coord;

    /// A straight run of `steps` ~11.1m steps, dropping `drop_per_step`
    /// meters each.
    fn run(name: &str, top: f64, drop_per_step: f64, steps: u32, modifier: u32) -> Trail {
        let points = (0..=steps)
            .map(|i| coord!(x: -71.3, y: 44.27 + f64::from(i) * 0.0001))
            .collect();
        let elevation = (0..=steps)
            .map(|i| top - drop_per_step * f64::from(i))
            .collect();
        Trail {
            id: 0,
            name: name.to_string(),
            difficulty_modifier: modifier,
            geometry: TrailGeometry::Line(Profile::new(points, elevation)),
        }
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(summarize(&[]), None);
        assert_eq!(Mountain::default().summary(), None);
    }

    #[test]
    fn test_unanalyzed_is_none() {
        assert_eq!(summarize(&[run("Raw", 1000.0, 3.0, 10, 0)]), None);
    }

    #[test]
    fn test_rate_flat_ignores_modifier() {
        let mut trail = run("Flat", 900.0, 0.0, 10, 2);
        trail.analyze();
        let rating = rate(trail.rated(), trail.difficulty_modifier).unwrap();
        assert_relative_eq!(rating.rating, 0.0);
        assert_relative_eq!(rating.length_m, 111.2, epsilon = 0.1);
    }

    #[test]
    fn test_summary() {
        let mut mountain = Mountain {
            trails: vec![
                run("Bunny", 1000.0, 1.5, 30, 0),
                run("Cruiser", 1100.0, 3.5, 30, 0),
                run("Chute", 1300.0, 8.0, 30, 0),
                run("Woods", 1250.0, 5.0, 30, 1),
            ],
            ..Mountain::default()
        };
        mountain.analyze();
        let MountainSummary {
            difficulty,
            ease,
            vertical_m,
            trail_count,
        } = mountain.summary().unwrap();
        assert_eq!(trail_count, 4);
        assert!(difficulty > 3.0 && difficulty <= 5.0, "{difficulty}");
        assert!(ease > 2.5 && ease <= 4.0, "{ease}");
        // Chute tops out near 1300, Bunny bottoms out near 955, less
        // what smoothing shaves off the ends.
        assert!((335..=345).contains(&vertical_m), "{vertical_m}");
    }

    #[test]
    fn test_modifier_raises_difficulty() {
        let analyzed = |modifier| {
            let mut trail = run("Glade", 1200.0, 4.0, 20, modifier);
            trail.analyze();
            summarize(&[trail]).unwrap()
        };
        let plain = analyzed(0);
        let gladed = analyzed(1);
        assert_relative_eq!(gladed.difficulty - plain.difficulty, 1.0, epsilon = 0.011);
        assert_eq!(plain.vertical_m, gladed.vertical_m);
    }
}
