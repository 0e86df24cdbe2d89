use crate::{export, options::Osm, progress, svg};
use anyhow::{anyhow, Result};
use log::{debug, info};
use piste::{
    elevation::{opentopo, Batched, ElevationCache, ElevationSource, Offline, OpenTopoData, RateLimited},
    osm::ParsedMap,
    Loader, Mountain, MountainSummary, PisteError,
};
use std::{fs, path::PathBuf};

impl Osm {
    pub fn run(&self) -> Result<()> {
        let osm_path = self.osm_path();
        let cache_path = self.cache_path();

        let loader = Loader::builder()
            .osm(&osm_path)
            .blacklist(self.blacklist.as_ref())
            .build()?;

        let osm_len = fs::metadata(&osm_path).map_or(0, |meta| meta.len());
        let pb = progress::byte_bar(format!("Parsing {}", self.mountain), osm_len);
        let map = loader.parse(|bytes| pb.inc(bytes));
        pb.finish_and_clear();
        let map = map?;
        for meta in map.trail_meta().filter(|meta| meta.is_area || meta.difficulty_modifier > 0) {
            debug!(
                "{}: modifier {}, area {}",
                meta.name, meta.difficulty_modifier, meta.is_area
            );
        }

        if let Some(ids_path) = &self.ids {
            export::write_ids(ids_path, &map.way_ids)?;
            info!("wrote {} way ids to {ids_path:?}", map.way_ids.len());
        }

        let mut cache = ElevationCache::load(&cache_path)?;
        let (assembled, requests) = if self.offline {
            (assemble(&loader, map, &mut cache, &mut Offline), 0)
        } else {
            let service = OpenTopoData::new(&self.elevation_url, &self.dataset)?;
            let mut source = Batched::new(
                RateLimited::new(service, opentopo::MIN_INTERVAL),
                opentopo::MAX_LOCATIONS,
            );
            let assembled = assemble(&loader, map, &mut cache, &mut source);
            (assembled, source.inner().calls())
        };
        info!("{requests} elevation requests made");

        // Keep whatever was fetched, even if a later lookup failed.
        cache.save(&cache_path)?;

        let mut mountain = assembled?;
        mountain.analyze();

        if let Some(svg_path) = &self.svg {
            fs::write(svg_path, svg::render(&mountain, &self.mountain, self.direction))?;
            info!("wrote trail map to {svg_path:?}");
        }

        let summary = mountain
            .summary()
            .ok_or_else(|| anyhow!("no trail in {} could be rated", self.mountain))?;
        if self.json {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            print_summary(&self.mountain, &summary, mountain.lifts.len(), requests);
        }
        Ok(())
    }

    fn osm_path(&self) -> PathBuf {
        self.osm_dir.join(format!("{}.osm", self.mountain))
    }

    fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(format!("{}.csv", self.mountain))
    }
}

fn assemble<S: ElevationSource>(
    loader: &Loader,
    map: ParsedMap,
    cache: &mut ElevationCache,
    source: &mut S,
) -> Result<Mountain, PisteError> {
    let pb = progress::bar("Loading trails".to_string(), map.total_trail_count() as u64);
    let assembled = loader.assemble(map, cache, source, |_| pb.inc(1));
    pb.finish_and_clear();
    assembled
}

fn print_summary(name: &str, summary: &MountainSummary, lifts: usize, requests: usize) {
    println!("{name}");
    println!("  difficulty: {:.2}", summary.difficulty);
    println!("  ease:       {:.2}", summary.ease);
    println!("  vertical:   {} m", summary.vertical_m);
    println!("  trails:     {}", summary.trail_count);
    println!("  lifts:      {lifts}");
    println!("  requests:   {requests}");
}
