mod export;
mod gpx;
mod options;
mod osm;
mod progress;
mod svg;

use anyhow::Result;
use clap::Parser;
use options::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::init();
    match cli.cmd {
        Command::Osm(osm) => osm.run(),
        Command::Gpx(gpx) => gpx.run(),
    }
}
