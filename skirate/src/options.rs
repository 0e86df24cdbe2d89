use anyhow::{anyhow, Error as AnyError};
use clap::{Args, Parser, Subcommand};
use piste::elevation::opentopo;
use std::{path::PathBuf, str::FromStr};

/// Rate ski areas by how steep their trails are.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Rate every trail in `<osm-dir>/<mountain>.osm`.
    Osm(Osm),

    /// Score a single recorded run.
    Gpx(Gpx),
}

#[derive(Debug, Clone, Args)]
pub struct Osm {
    /// Mountain name, also the extract and cache file stem.
    pub mountain: String,

    /// Directory of OSM extracts.
    #[arg(long, default_value = "osm")]
    pub osm_dir: PathBuf,

    /// Directory of elevation caches.
    #[arg(long, default_value = "cached/elevation")]
    pub cache_dir: PathBuf,

    /// CSV of way ids to ignore, with an `id` column.
    #[arg(short, long)]
    pub blacklist: Option<PathBuf>,

    /// Never query the elevation service. Uncached points are an
    /// error.
    #[arg(long, default_value_t = false)]
    pub offline: bool,

    /// Elevation service base URL.
    #[arg(long, default_value = opentopo::DEFAULT_URL)]
    pub elevation_url: String,

    /// Elevation service dataset.
    #[arg(long, default_value = opentopo::DEFAULT_DATASET)]
    pub dataset: String,

    /// Side of the resort the map is drawn from: n, e, s or w.
    #[arg(short, long, default_value = "n")]
    pub direction: Direction,

    /// Write an SVG trail map.
    #[arg(long)]
    pub svg: Option<PathBuf>,

    /// Write a `name,id` CSV of every accepted way.
    #[arg(long)]
    pub ids: Option<PathBuf>,

    /// Print the summary as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct Gpx {
    /// Recorded track.
    pub path: PathBuf,

    /// Plot elevation over distance to the terminal.
    #[arg(short, long, default_value_t = false)]
    pub plot: bool,

    /// Print every scored point as CSV.
    #[arg(long, default_value_t = false)]
    pub csv: bool,

    /// Print the summary as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

/// Cardinal direction a resort is viewed from.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl FromStr for Direction {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        match s.to_ascii_lowercase().as_str() {
            "n" | "north" => Ok(Self::North),
            "e" | "east" => Ok(Self::East),
            "s" | "south" => Ok(Self::South),
            "w" | "west" => Ok(Self::West),
            _ => Err(anyhow!("not a valid direction {s:?}, expected n, e, s or w")),
        }
    }
}
