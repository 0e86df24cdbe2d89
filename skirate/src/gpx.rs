use crate::options::Gpx;
use anyhow::{anyhow, Result};
use piste::{track, Profile};
use std::io::Write;
use textplots::{Chart, Plot, Shape};

impl Gpx {
    pub fn run(&self) -> Result<()> {
        let profile = track::load(&self.path)?;
        if self.csv {
            print_csv(&profile)?;
        }
        if self.plot {
            plot_ascii(&profile);
        }
        let summary = track::summarize(&profile)
            .ok_or_else(|| anyhow!("{:?} has no usable track points", self.path))?;
        if self.json {
            println!("{}", serde_json::to_string(&summary)?);
        } else {
            println!("{}", self.path.display());
            println!("  length:         {:.0} m", summary.length_m);
            println!("  drop:           {:.0} m", summary.drop_m);
            println!("  rating:         {:.2}", summary.rating);
            println!("  max difficulty: {}", summary.max_difficulty);
        }
        Ok(())
    }
}

/// Cumulative distance along the profile, in meters.
fn cumulative_m(profile: &Profile) -> Vec<f64> {
    profile
        .distance_m
        .iter()
        .scan(0.0, |total, step| {
            *total += step;
            Some(*total)
        })
        .collect()
}

fn print_csv(profile: &Profile) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Distance,Longitude,Latitude,Elevation,Slope,Difficulty")?;
    for ((((distance, point), elevation), slope), difficulty) in cumulative_m(profile)
        .iter()
        .zip(&profile.points)
        .zip(&profile.elevation_m)
        .zip(&profile.slope)
        .zip(&profile.difficulty)
    {
        let longitude = point.x;
        let latitude = point.y;
        writeln!(
            stdout,
            "{distance},{longitude},{latitude},{elevation},{slope},{difficulty}"
        )?;
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn plot_ascii(profile: &Profile) {
    let plot_data: Vec<(f32, f32)> = cumulative_m(profile)
        .iter()
        .zip(&profile.elevation_m)
        .map(|(distance, elevation)| (*distance as f32, *elevation as f32))
        .collect();
    let max_x = plot_data.last().map_or(1.0, |(x, _)| x.max(1.0));
    Chart::new(300, 150, 0.0, max_x)
        .lineplot(&Shape::Lines(&plot_data))
        .display();
}
