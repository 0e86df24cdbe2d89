//! # Piste
//!
//! `piste` recovers a ski area's trails and lifts from an
//! OpenStreetMap extract, attaches elevation, and rates how steep the
//! resort is.
//!
//! ```no_run
//! use piste::{elevation::{ElevationCache, Offline}, Loader};
//!
//! # fn main() -> Result<(), piste::PisteError> {
//! let loader = Loader::builder().osm("osm/wildcat.osm").build()?;
//! let mut cache = ElevationCache::load("cached/elevation/wildcat.csv")?;
//! let mut mountain = loader.load(&mut cache, &mut Offline)?;
//! mountain.analyze();
//! println!("{:?}", mountain.summary());
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod difficulty;
pub mod elevation;
mod error;
pub mod geometry;
mod loader;
mod math;
pub mod mountain;
pub mod osm;
mod profile;
pub mod resolve;
pub mod track;
mod trail;

pub use crate::{
    error::PisteError,
    loader::{Loader, LoaderBuilder},
    mountain::{Mountain, MountainSummary},
    profile::Profile,
    trail::{Lift, Trail, TrailGeometry},
};
pub use geo;
