use crate::{
    constants::FULL_SMOOTHING_WINDOW,
    difficulty::point_difficulties,
    geometry::{distances, elevation_changes, slopes},
    math::moving_average,
};
use geo::geometry::Coord;
use log::debug;

/// An ordered point sequence with elevation and the columns derived
/// from it.
///
/// Derived columns are empty until [`Profile::analyze`] runs, after
/// which every column has one entry per point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    /// Location of each point.
    pub points: Vec<Coord<f64>>,

    /// Elevation at each point, in meters.
    pub elevation_m: Vec<f64>,

    /// Distance from the previous point, in meters.
    pub distance_m: Vec<f64>,

    /// Elevation delta from the previous point, in meters.
    pub elevation_change_m: Vec<f64>,

    /// Rise over run from the previous point.
    pub slope: Vec<f64>,

    /// Difficulty class of each point.
    pub difficulty: Vec<u8>,
}

impl Profile {
    pub fn new(points: Vec<Coord<f64>>, elevation_m: Vec<f64>) -> Self {
        debug_assert_eq!(points.len(), elevation_m.len());
        Self {
            points,
            elevation_m,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Applies a moving average of `window` samples to the elevation
    /// column.
    pub fn smooth(&mut self, window: usize) {
        self.elevation_m = moving_average(&self.elevation_m, window);
    }

    /// Smooths elevation and fills in every derived column.
    pub fn analyze(&mut self) {
        self.smooth(FULL_SMOOTHING_WINDOW);
        self.distance_m = distances(&self.points);
        self.elevation_change_m = elevation_changes(&self.elevation_m);
        self.slope = slopes(&self.elevation_change_m, &self.distance_m);
        self.difficulty = point_difficulties(&self.slope);
        debug!(
            "profile; len: {}, length: {:.0}m, drop: {:?}",
            self.len(),
            self.length_m(),
            self.elevation_range().map(|(lo, hi)| hi - lo)
        );
    }

    /// Total path length in meters.
    ///
    /// 0 until the profile has been analyzed.
    pub fn length_m(&self) -> f64 {
        self.distance_m.iter().sum()
    }

    /// Returns (lowest, highest) elevation, if there are any samples.
    pub fn elevation_range(&self) -> Option<(f64, f64)> {
        self.elevation_m.iter().fold(None, |range, elev| match range {
            None => Some((*elev, *elev)),
            Some((lo, hi)) => Some((lo.min(*elev), hi.max(*elev))),
        })
    }
}
