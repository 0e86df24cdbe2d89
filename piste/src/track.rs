//! Single track analysis.
//!
//! A recorded run is scored with the same chain as mountain trails,
//! so a track and a trail with the same shape get the same rating.

use crate::{
    constants::GPX_MAX_GAP_M,
    geometry::fill_gaps_with_elevation,
    mountain::{rate, TrailRating},
    profile::Profile,
    PisteError,
};
use geo::geometry::Coord;
use log::{debug, info};
use serde::Serialize;
use std::{fs::File, io::BufReader, io::Read, path::Path};

/// Reads every track point with an elevation from a GPX document.
pub fn read_track<R: Read>(rdr: R) -> Result<Profile, PisteError> {
    let doc = gpx::read(rdr)?;
    let mut points = Vec::new();
    let mut elevation_m = Vec::new();
    let mut skipped = 0_usize;
    for waypoint in doc
        .tracks
        .iter()
        .flat_map(|track| &track.segments)
        .flat_map(|segment| &segment.points)
    {
        match waypoint.elevation {
            Some(elev) => {
                let point = waypoint.point();
                points.push(Coord {
                    x: point.x(),
                    y: point.y(),
                });
                elevation_m.push(elev);
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!("skipped {skipped} track points without elevation");
    }
    Ok(Profile::new(points, elevation_m))
}

/// Reads and analyzes the GPX file at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Profile, PisteError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(PisteError::MissingInput(path.to_owned()));
    }
    let track = read_track(BufReader::new(File::open(path)?))?;
    info!("read {} track points from {path:?}", track.len());
    Ok(analyze(track))
}

/// Gap fills the track, then smooths and scores it.
pub fn analyze(track: Profile) -> Profile {
    let (points, elevation_m) =
        fill_gaps_with_elevation(&track.points, &track.elevation_m, GPX_MAX_GAP_M);
    let mut profile = Profile::new(points, elevation_m);
    profile.analyze();
    profile
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackSummary {
    pub length_m: f64,
    pub drop_m: f64,
    pub rating: f64,
    pub max_difficulty: u8,
}

/// Summarizes an analyzed track; `None` if it has no length.
pub fn summarize(profile: &Profile) -> Option<TrackSummary> {
    let TrailRating { rating, length_m } = rate(profile, 0)?;
    let drop_m = profile
        .elevation_range()
        .map_or(0.0, |(lo, hi)| hi - lo);
    Some(TrackSummary {
        length_m,
        drop_m,
        rating,
        max_difficulty: profile.difficulty.iter().copied().max().unwrap_or(0),
    })
}
