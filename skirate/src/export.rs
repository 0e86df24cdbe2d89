use anyhow::Result;
use piste::osm::OsmId;
use std::{fs, path::Path};

/// Writes `(name, id)` pairs as a `name,id` CSV.
pub fn write_ids(path: &Path, way_ids: &[(String, OsmId)]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["name", "id"])?;
    for row in way_ids {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}
