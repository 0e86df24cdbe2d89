//! Turning an extract into a [`Mountain`].

use crate::{
    constants::{LIFT_MAX_GAP_M, LIGHT_SMOOTHING_WINDOW, TRAIL_MAX_GAP_M},
    elevation::{reconcile, ElevationCache, ElevationSource},
    geometry::area_to_line,
    mountain::Mountain,
    osm::{self, ParsedMap},
    profile::Profile,
    resolve::resolve_filled,
    trail::{Lift, Trail, TrailGeometry},
    PisteError,
};
use geo::geometry::Coord;
use log::{debug, info, warn};
use std::{
    collections::HashSet,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

pub struct Loader {
    /// OSM extract to read.
    osm: PathBuf,

    /// Optional CSV of way ids to ignore.
    blacklist: Option<PathBuf>,

    /// Maximum spacing between trail points (meters).
    trail_gap_m: f64,

    /// Maximum spacing between lift points (meters).
    lift_gap_m: f64,
}

impl Loader {
    pub fn builder() -> LoaderBuilder {
        LoaderBuilder {
            osm: None,
            blacklist: None,
            trail_gap_m: TRAIL_MAX_GAP_M,
            lift_gap_m: LIFT_MAX_GAP_M,
        }
    }

    /// Parses the extract.
    ///
    /// `on_progress` receives the byte length of each line read.
    pub fn parse(&self, on_progress: impl FnMut(u64)) -> Result<ParsedMap, PisteError> {
        if !self.osm.exists() {
            return Err(PisteError::MissingInput(self.osm.clone()));
        }
        let blacklist = match &self.blacklist {
            Some(path) => osm::load_blacklist(path)?,
            None => HashSet::new(),
        };
        info!("parsing {:?}", self.osm);
        let rdr = BufReader::new(File::open(&self.osm)?);
        let map = osm::parse(rdr, &blacklist, on_progress)?;
        if map.total_trail_count() == 0 {
            return Err(PisteError::NoTrails);
        }
        info!(
            "found {} trails and {} lifts",
            map.total_trail_count(),
            map.lifts.len()
        );
        Ok(map)
    }

    /// Resolves every parsed way and attaches elevation to trails.
    ///
    /// `on_trail` is called after each trail is assembled.
    pub fn assemble<S: ElevationSource + ?Sized>(
        &self,
        map: ParsedMap,
        cache: &mut ElevationCache,
        source: &mut S,
        mut on_trail: impl FnMut(&Trail),
    ) -> Result<Mountain, PisteError> {
        let mut trails = Vec::with_capacity(map.trails.len());
        for way in &map.trails {
            let points = resolve_filled(way, &map.nodes, self.trail_gap_m);
            if points.is_empty() {
                warn!("trail {} ({}) has no known nodes", way.name, way.id);
                continue;
            }
            let outline = profile_of(points, cache, source)?;
            let geometry = if way.tags.is_area {
                let boundary = area_to_line(&outline.points, self.trail_gap_m);
                TrailGeometry::Area {
                    boundary: profile_of(boundary, cache, source)?,
                    polygon: outline,
                }
            } else {
                TrailGeometry::Line(outline)
            };
            let trail = Trail {
                id: way.id,
                name: way.name.clone(),
                difficulty_modifier: way.tags.difficulty_modifier,
                geometry,
            };
            on_trail(&trail);
            trails.push(trail);
        }
        if trails.is_empty() {
            return Err(PisteError::NoTrails);
        }

        let lifts = map
            .lifts
            .iter()
            .map(|way| Lift {
                id: way.id,
                name: way.name.clone(),
                points: resolve_filled(way, &map.nodes, self.lift_gap_m),
            })
            .filter(|lift| !lift.points.is_empty())
            .collect();

        Ok(Mountain {
            trails,
            lifts,
            way_ids: map.way_ids,
        })
    }

    /// [`Loader::parse`] then [`Loader::assemble`], without progress
    /// reporting.
    pub fn load<S: ElevationSource + ?Sized>(
        &self,
        cache: &mut ElevationCache,
        source: &mut S,
    ) -> Result<Mountain, PisteError> {
        let map = self.parse(|_| ())?;
        self.assemble(map, cache, source, |_| ())
    }
}

/// Looks up elevation for `points` and applies the light smoothing
/// pass.
fn profile_of<S: ElevationSource + ?Sized>(
    points: Vec<Coord<f64>>,
    cache: &mut ElevationCache,
    source: &mut S,
) -> Result<Profile, PisteError> {
    let elevation = reconcile(&points, cache, source)?;
    let mut profile = Profile::new(points, elevation);
    profile.smooth(LIGHT_SMOOTHING_WINDOW);
    debug!("assembled profile of {} points", profile.len());
    Ok(profile)
}

pub struct LoaderBuilder {
    osm: Option<PathBuf>,
    blacklist: Option<PathBuf>,
    trail_gap_m: f64,
    lift_gap_m: f64,
}

impl LoaderBuilder {
    pub fn osm<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.osm = Some(path.as_ref().to_owned());
        self
    }

    pub fn blacklist<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        self.blacklist = path.map(|p| p.as_ref().to_owned());
        self
    }

    pub fn trail_gap(mut self, meters: f64) -> Self {
        self.trail_gap_m = meters;
        self
    }

    pub fn lift_gap(mut self, meters: f64) -> Self {
        self.lift_gap_m = meters;
        self
    }

    pub fn build(self) -> Result<Loader, PisteError> {
        let osm = self.osm.ok_or(PisteError::Builder("osm"))?;
        if self.trail_gap_m <= 0.0 {
            return Err(PisteError::Builder("trail_gap"));
        }
        if self.lift_gap_m <= 0.0 {
            return Err(PisteError::Builder("lift_gap"));
        }
        Ok(Loader {
            osm,
            blacklist: self.blacklist,
            trail_gap_m: self.trail_gap_m,
            lift_gap_m: self.lift_gap_m,
        })
    }
}
