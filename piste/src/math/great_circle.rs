//! Great circle interpolation between two coordinates.
//!
//! The parameterization follows `geo`'s `HaversineIntermediate`,
//! reworked to hand out only the points strictly between the
//! endpoints so callers can splice them into an existing sequence
//! without duplicating the originals.

use crate::constants::MEAN_EARTH_RADIUS;
use geo::geometry::Coord;

#[allow(clippy::many_single_char_names)]
#[derive(Debug, Clone, Copy)]
pub struct GreatCircle {
    /// Central angle between the endpoints, in radians.
    d: f64,
    n: f64,
    o: f64,
    p: f64,
    q: f64,
    r: f64,
    s: f64,
}

impl GreatCircle {
    pub fn new(start: Coord<f64>, end: Coord<f64>) -> Self {
        let lat1 = start.y.to_radians();
        let lon1 = start.x.to_radians();
        let lat2 = end.y.to_radians();
        let lon2 = end.x.to_radians();

        let (lat1_sin, lat1_cos) = lat1.sin_cos();
        let (lat2_sin, lat2_cos) = lat2.sin_cos();
        let (lon1_sin, lon1_cos) = lon1.sin_cos();
        let (lon2_sin, lon2_cos) = lon2.sin_cos();

        let m = lat1_cos * lat2_cos;
        let k = (((lat1 - lat2) / 2.0).sin().powi(2) + m * ((lon1 - lon2) / 2.0).sin().powi(2))
            .sqrt();

        Self {
            d: 2.0 * k.asin(),
            n: lat1_cos * lon1_cos,
            o: lat2_cos * lon2_cos,
            p: lat1_cos * lon1_sin,
            q: lat2_cos * lon2_sin,
            r: lat1_sin,
            s: lat2_sin,
        }
    }

    /// Length of the arc in meters.
    pub fn distance_m(&self) -> f64 {
        self.d * MEAN_EARTH_RADIUS
    }

    /// Returns the point at fraction `f` (0..=1) along the arc.
    pub fn point_at(&self, f: f64) -> Coord<f64> {
        let Self {
            d,
            n,
            o,
            p,
            q,
            r,
            s,
        } = *self;

        let a = ((1.0 - f) * d).sin() / d.sin();
        let b = (f * d).sin() / d.sin();

        let x = a * n + b * o;
        let y = a * p + b * q;
        let z = a * r + b * s;

        Coord {
            x: y.atan2(x).to_degrees(),
            y: z.atan2(x.hypot(y)).to_degrees(),
        }
    }

    /// Number of equal segments needed so none exceeds `max_step_m`.
    ///
    /// Always at least 1.
    pub fn segments(&self, max_step_m: f64) -> usize {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let segments = (self.distance_m() / max_step_m).ceil() as usize;
        segments.max(1)
    }

    /// Points strictly between the endpoints, spaced so that no step
    /// exceeds `max_step_m`.
    #[allow(clippy::cast_precision_loss)]
    pub fn interior(&self, max_step_m: f64) -> impl Iterator<Item = Coord<f64>> + '_ {
        let segments = self.segments(max_step_m);
        let inverse = 1.0 / segments as f64;
        (1..segments).map(move |step| self.point_at(step as f64 * inverse))
    }
}

#[cfg(test)]
mod tests {
    use super::GreatCircle;
    use approx::assert_relative_eq;
    use geo::{coord, HaversineDistance, Point};

    #[test]
    fn test_distance_matches_geo() {
        let start = coord!(x: -71.30830716441369, y: 44.28309806603165);
        let end = coord!(x: -71.2972073283768, y: 44.25628098424278);
        let arc = GreatCircle::new(start, end);
        let expected = Point::from(start).haversine_distance(&Point::from(end));
        assert_relative_eq!(arc.distance_m(), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_interior_spacing() {
        let start = coord!(x: -0.5, y: -0.5);
        let end = coord!(x: 0.5, y: 0.5);
        let step_size_m = 17_480.0;
        let arc = GreatCircle::new(start, end);
        let interior: Vec<_> = arc.interior(step_size_m).collect();
        assert_eq!(interior.len(), 8);
        assert_relative_eq!(interior[0].x, -0.388_884_988_799_152_34, epsilon = 1e-9);
        assert_relative_eq!(interior[0].y, -0.388_890_838_895_255_3, epsilon = 1e-9);
        assert_relative_eq!(interior[7].x, 0.388_884_988_799_152_3, epsilon = 1e-9);
    }

    #[test]
    fn test_short_arc_has_no_interior() {
        let start = coord!(x: 10.0, y: 45.0);
        let end = coord!(x: 10.0001, y: 45.0);
        let arc = GreatCircle::new(start, end);
        assert!(arc.distance_m() < 15.0);
        assert_eq!(arc.interior(15.0).count(), 0);
    }
}
