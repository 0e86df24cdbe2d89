/// Mean earth radius in meters, as used by `geo`'s haversine
/// routines.
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

/// Maximum spacing between consecutive trail points, in meters.
pub const TRAIL_MAX_GAP_M: f64 = 15.0;

/// Maximum spacing between consecutive lift points, in meters.
pub const LIFT_MAX_GAP_M: f64 = 50.0;

/// Maximum spacing between consecutive GPX track points, in meters.
pub const GPX_MAX_GAP_M: f64 = 15.0;

/// Slack allowed when comparing a segment length against a gap
/// threshold.
pub const GAP_TOLERANCE_M: f64 = 1e-6;

/// Moving average window for the smoothing pass applied when a
/// trail is assembled.
pub const LIGHT_SMOOTHING_WINDOW: usize = 3;

/// Moving average window for the smoothing pass applied before a
/// trail is rated.
pub const FULL_SMOOTHING_WINDOW: usize = 5;

/// Highest class returned by point difficulty scoring.
pub const MAX_POINT_DIFFICULTY: u8 = 4;
