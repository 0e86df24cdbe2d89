//! Elevation lookup, caching and reconciliation.

mod cache;
pub mod opentopo;

pub use self::{cache::ElevationCache, opentopo::OpenTopoData};

use crate::PisteError;
use geo::geometry::Coord;
use log::{debug, warn};
use std::{
    thread,
    time::{Duration, Instant},
};

/// Something that can look up ground elevation.
pub trait ElevationSource {
    /// Returns one elevation, in meters, per coordinate in `coords`,
    /// in the same order.
    fn elevations(&mut self, coords: &[Coord<f64>]) -> Result<Vec<f64>, PisteError>;
}

impl<S: ElevationSource + ?Sized> ElevationSource for &mut S {
    fn elevations(&mut self, coords: &[Coord<f64>]) -> Result<Vec<f64>, PisteError> {
        (**self).elevations(coords)
    }
}

impl<S: ElevationSource + ?Sized> ElevationSource for Box<S> {
    fn elevations(&mut self, coords: &[Coord<f64>]) -> Result<Vec<f64>, PisteError> {
        (**self).elevations(coords)
    }
}

/// A source for cache-only runs; every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl ElevationSource for Offline {
    fn elevations(&mut self, coords: &[Coord<f64>]) -> Result<Vec<f64>, PisteError> {
        Err(PisteError::Elevation(format!(
            "{} points missing from cache while offline",
            coords.len()
        )))
    }
}

/// Wraps a source so consecutive calls are at least `min_interval`
/// apart.
pub struct RateLimited<S> {
    inner: S,
    min_interval: Duration,
    last_call: Option<Instant>,
    calls: usize,
}

impl<S> RateLimited<S> {
    pub fn new(inner: S, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_call: None,
            calls: 0,
        }
    }

    /// Number of calls passed through to the wrapped source.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl<S: ElevationSource> ElevationSource for RateLimited<S> {
    fn elevations(&mut self, coords: &[Coord<f64>]) -> Result<Vec<f64>, PisteError> {
        if let Some(last_call) = self.last_call {
            let elapsed = last_call.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("rate limited; sleeping {wait:?}");
                thread::sleep(wait);
            }
        }
        self.last_call = Some(Instant::now());
        self.calls += 1;
        self.inner.elevations(coords)
    }
}

/// Splits lookups into requests of at most `batch_size` points.
pub struct Batched<S> {
    inner: S,
    batch_size: usize,
}

impl<S> Batched<S> {
    pub fn new(inner: S, batch_size: usize) -> Self {
        Self {
            inner,
            batch_size: batch_size.max(1),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: ElevationSource> ElevationSource for Batched<S> {
    fn elevations(&mut self, coords: &[Coord<f64>]) -> Result<Vec<f64>, PisteError> {
        let mut elevations = Vec::with_capacity(coords.len());
        for chunk in coords.chunks(self.batch_size) {
            elevations.extend(self.inner.elevations(chunk)?);
        }
        Ok(elevations)
    }
}

/// Returns an elevation for every point in `points`.
///
/// When `cache` covers every point no lookup is made. Otherwise the
/// whole sequence is fetched from `source`, so cached and fresh
/// samples are never mixed, and the results are recorded in `cache`.
pub fn reconcile<S: ElevationSource + ?Sized>(
    points: &[Coord<f64>],
    cache: &mut ElevationCache,
    source: &mut S,
) -> Result<Vec<f64>, PisteError> {
    if let Some(elevations) = cache.get_all(points) {
        return Ok(elevations);
    }
    warn!(
        "elevation cache missing {} of {} points, fetching",
        cache.missing(points),
        points.len()
    );
    let elevations = source.elevations(points)?;
    if elevations.len() != points.len() {
        return Err(PisteError::Elevation(format!(
            "asked for {} elevations, got {}",
            points.len(),
            elevations.len()
        )));
    }
    for (point, elevation) in points.iter().zip(&elevations) {
        cache.insert(*point, *elevation);
    }
    Ok(elevations)
}
