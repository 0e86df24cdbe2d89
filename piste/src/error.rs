use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PisteError {
    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    Gpx(#[from] gpx::errors::GpxError),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("missing input file {0}")]
    MissingInput(PathBuf),

    #[error("no trails found")]
    NoTrails,

    #[error("elevation lookup failed, {0}")]
    Elevation(String),
}
