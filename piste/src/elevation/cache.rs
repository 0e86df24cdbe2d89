use crate::PisteError;
use geo::geometry::Coord;
use log::info;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};

/// Coordinates are keyed at 1e-7° (about 1cm), the precision OSM
/// stores them at.
const KEY_SCALE: f64 = 1e7;

type Key = (i64, i64);

#[allow(clippy::cast_possible_truncation)]
fn key(Coord { x, y }: Coord<f64>) -> Key {
    ((y * KEY_SCALE).round() as i64, (x * KEY_SCALE).round() as i64)
}

#[derive(Debug, Serialize, Deserialize)]
struct Row {
    latitude: f64,
    longitude: f64,
    elevation: f64,
}

/// Previously fetched coordinate → elevation pairs.
#[derive(Debug, Clone, Default)]
pub struct ElevationCache {
    samples: HashMap<Key, f64>,
}

impl ElevationCache {
    /// Reads the cache at `path`.
    ///
    /// A missing file yields an empty cache. Duplicate coordinates
    /// collapse to the last row read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PisteError> {
        let path = path.as_ref();
        if !path.exists() {
            info!("no elevation cache at {path:?}, starting empty");
            return Ok(Self::default());
        }
        let mut cache = Self::default();
        let mut rdr = csv::Reader::from_path(path)?;
        for row in rdr.deserialize::<Row>() {
            let Row {
                latitude,
                longitude,
                elevation,
            } = row?;
            cache.insert(
                Coord {
                    x: longitude,
                    y: latitude,
                },
                elevation,
            );
        }
        info!("loaded {} cached elevations from {path:?}", cache.len());
        Ok(cache)
    }

    /// Rewrites the cache at `path` with every known pair.
    #[allow(clippy::cast_precision_loss)]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PisteError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut entries: Vec<(&Key, &f64)> = self.samples.iter().collect();
        entries.sort_unstable_by_key(|(key, _)| **key);
        let mut wtr = csv::Writer::from_path(path)?;
        for ((lat, lon), elevation) in entries {
            wtr.serialize(Row {
                latitude: *lat as f64 / KEY_SCALE,
                longitude: *lon as f64 / KEY_SCALE,
                elevation: *elevation,
            })?;
        }
        wtr.flush()?;
        info!("saved {} elevations to {path:?}", self.len());
        Ok(())
    }

    pub fn get(&self, coord: Coord<f64>) -> Option<f64> {
        self.samples.get(&key(coord)).copied()
    }

    pub fn insert(&mut self, coord: Coord<f64>, elevation_m: f64) {
        self.samples.insert(key(coord), elevation_m);
    }

    /// Returns elevations for all of `points`, or `None` if any is
    /// missing.
    pub fn get_all(&self, points: &[Coord<f64>]) -> Option<Vec<f64>> {
        points.iter().map(|point| self.get(*point)).collect()
    }

    /// Number of `points` without a cached elevation.
    pub fn missing(&self, points: &[Coord<f64>]) -> usize {
        points
            .iter()
            .filter(|point| self.get(**point).is_none())
            .count()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
