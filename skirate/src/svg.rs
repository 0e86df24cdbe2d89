//! Trail map rendering.
//!
//! Coordinates are projected onto a plane with longitude scaled by
//! the cosine of the mean latitude, then rotated so the chosen side
//! of the resort faces the viewer: the viewing direction ends up at
//! the bottom of the picture.

use crate::options::Direction;
use piste::{geo::geometry::Coord, Lift, Mountain, Trail};

/// Width of the drawing, in pixels.
const WIDTH_PX: f64 = 1000.0;

/// Blank border around the drawing, in pixels.
const MARGIN_PX: f64 = 40.0;

const AREA_FILL: &str = "#00000088";
const LIFT_STROKE: &str = "#888888";

/// Maps geographic coordinates to pixels.
struct Projection {
    direction: Direction,
    lon_scale: f64,
    min: (f64, f64),
    px_per_unit: f64,
}

impl Projection {
    fn new<'a>(direction: Direction, coords: impl Iterator<Item = &'a Coord<f64>> + Clone) -> Self {
        let (lat_sum, count) = coords
            .clone()
            .fold((0.0, 0_usize), |(sum, n), c| (sum + c.y, n + 1));
        let lon_scale = if count == 0 {
            1.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let mean_lat = lat_sum / count as f64;
            mean_lat.to_radians().cos()
        };
        let mut proj = Self {
            direction,
            lon_scale,
            min: (0.0, 0.0),
            px_per_unit: 1.0,
        };
        let mut lo = (f64::INFINITY, f64::INFINITY);
        let mut hi = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for c in coords {
            let (x, y) = proj.view(*c);
            lo = (lo.0.min(x), lo.1.min(y));
            hi = (hi.0.max(x), hi.1.max(y));
        }
        if lo.0.is_finite() {
            let span = (hi.0 - lo.0).max(hi.1 - lo.1);
            proj.min = lo;
            if span > 0.0 {
                proj.px_per_unit = (WIDTH_PX - 2.0 * MARGIN_PX) / span;
            }
        }
        proj
    }

    /// Rotates a coordinate into (right, down) viewing axes.
    fn view(&self, c: Coord<f64>) -> (f64, f64) {
        let (east, north) = (c.x * self.lon_scale, c.y);
        match self.direction {
            Direction::North => (-east, north),
            Direction::South => (east, -north),
            Direction::East => (north, east),
            Direction::West => (-north, -east),
        }
    }

    fn pixel(&self, c: Coord<f64>) -> (f64, f64) {
        let (x, y) = self.view(c);
        (
            MARGIN_PX + (x - self.min.0) * self.px_per_unit,
            MARGIN_PX + (y - self.min.1) * self.px_per_unit,
        )
    }

    fn path(&self, coords: &[Coord<f64>], closed: bool) -> String {
        let mut steps: Vec<String> = coords
            .iter()
            .enumerate()
            .map(|(idx, c)| {
                let (x, y) = self.pixel(*c);
                let cmd = if idx == 0 { 'M' } else { 'L' };
                format!("{cmd}{x:.1},{y:.1}")
            })
            .collect();
        if closed {
            steps.push("Z".to_string());
        }
        steps.join(" ")
    }
}

/// Renders every trail and lift as an SVG document.
pub fn render(mountain: &Mountain, name: &str, direction: Direction) -> String {
    let coords = mountain
        .trails
        .iter()
        .flat_map(Trail::outline)
        .chain(mountain.lifts.iter().flat_map(|lift| &lift.points));
    let proj = Projection::new(direction, coords.clone());

    let height_px = coords
        .map(|c| proj.pixel(*c).1)
        .fold(MARGIN_PX, f64::max)
        + MARGIN_PX;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH_PX:.0}" height="{height_px:.0}" viewBox="0 0 {WIDTH_PX:.0} {height_px:.0}">"#
    );
    svg.push('\n');
    svg.push_str(&format!(
        "<text x=\"{:.0}\" y=\"{:.0}\" font-family=\"sans-serif\" font-size=\"20\">{}</text>\n",
        MARGIN_PX,
        MARGIN_PX / 2.0,
        escape(name)
    ));
    for trail in &mountain.trails {
        if trail.outline().is_empty() {
            continue;
        }
        svg.push_str(&trail_element(&proj, trail));
    }
    for lift in &mountain.lifts {
        if lift.points.len() < 2 {
            continue;
        }
        svg.push_str(&lift_element(&proj, lift));
    }
    svg.push_str("</svg>\n");
    svg
}

fn trail_element(proj: &Projection, trail: &Trail) -> String {
    let title = escape(&trail.name);
    if trail.is_area() {
        format!(
            "<path d=\"{}\" fill=\"{AREA_FILL}\" stroke=\"none\"><title>{title}</title></path>\n",
            proj.path(trail.outline(), true)
        )
    } else {
        let dash = if trail.difficulty_modifier > 0 {
            " stroke-dasharray=\"4 2\""
        } else {
            ""
        };
        format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"black\" stroke-width=\"1\"{dash}><title>{title}</title></path>\n",
            proj.path(trail.outline(), false)
        )
    }
}

fn lift_element(proj: &Projection, lift: &Lift) -> String {
    format!(
        "<path d=\"{}\" fill=\"none\" stroke=\"{LIFT_STROKE}\" stroke-width=\"0.5\"><title>{}</title></path>\n",
        proj.path(&lift.points, false),
        escape(&lift.name)
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{render, Projection};
    use crate::options::Direction;
    use piste::{
        geo::{coord, geometry::Coord},
        Lift, Mountain, Profile, Trail, TrailGeometry,
    };

    fn line(name: &str, difficulty_modifier: u32, points: Vec<Coord<f64>>) -> Trail {
        let elevation = vec![1000.0; points.len()];
        Trail {
            id: 1,
            name: name.to_string(),
            difficulty_modifier,
            geometry: TrailGeometry::Line(Profile::new(points, elevation)),
        }
    }

    fn mountain() -> Mountain {
        let polygon = vec![
            coord!(x: -71.2010, y: 44.2600),
            coord!(x: -71.2000, y: 44.2600),
            coord!(x: -71.2000, y: 44.2610),
        ];
        let elevation = vec![900.0; polygon.len()];
        let area = Trail {
            id: 2,
            name: "Glades".to_string(),
            difficulty_modifier: 1,
            geometry: TrailGeometry::Area {
                boundary: Profile::new(polygon.clone(), elevation.clone()),
                polygon: Profile::new(polygon, elevation),
            },
        };
        Mountain {
            trails: vec![
                line(
                    "Lynx",
                    0,
                    vec![coord!(x: -71.2020, y: 44.2620), coord!(x: -71.2020, y: 44.2600)],
                ),
                line(
                    "Black & Tan",
                    1,
                    vec![coord!(x: -71.2030, y: 44.2620), coord!(x: -71.2025, y: 44.2600)],
                ),
                area,
            ],
            lifts: vec![Lift {
                id: 3,
                name: "Quad".to_string(),
                points: vec![coord!(x: -71.2040, y: 44.2600), coord!(x: -71.2040, y: 44.2620)],
            }],
            way_ids: Vec::new(),
        }
    }

    #[test]
    fn test_render_styles() {
        let svg = render(&mountain(), "Wildcat <NH>", Direction::South);
        assert!(svg.starts_with("<svg "));
        let mut lines = svg.lines();
        assert!(lines.next().unwrap().ends_with('>'));
        assert!(lines.next().unwrap().starts_with("<text "));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains("Wildcat &lt;NH&gt;"));
        assert_eq!(svg.matches("stroke=\"black\"").count(), 2);
        assert_eq!(svg.matches("stroke-dasharray").count(), 1);
        assert!(svg.contains("<title>Black &amp; Tan</title>"));
        assert!(svg.contains("fill=\"#00000088\""));
        assert!(svg.contains(" Z\""));
        assert!(svg.contains("stroke=\"#888888\""));
    }

    #[test]
    fn test_path_data() {
        // A due north line fills the drawing height.
        let a = coord!(x: -71.21, y: 44.26);
        let b = coord!(x: -71.21, y: 44.27);
        let proj = Projection::new(Direction::South, [a, b].iter());
        assert_eq!(proj.path(&[a, b], false), "M40.0,960.0 L40.0,40.0");
        assert_eq!(proj.path(&[a, b], true), "M40.0,960.0 L40.0,40.0 Z");
        assert_eq!(proj.path(&[], false), "");
    }

    #[test]
    fn test_direction_mirrors() {
        let west = coord!(x: -71.21, y: 44.26);
        let east = coord!(x: -71.20, y: 44.26);
        let north = coord!(x: -71.21, y: 44.27);
        let coords = [west, east, north];

        // Seen from the south, east is right and north is up.
        let proj = Projection::new(Direction::South, coords.iter());
        assert!(proj.pixel(east).0 > proj.pixel(west).0);
        assert!(proj.pixel(north).1 < proj.pixel(west).1);

        // Seen from the north, both axes flip.
        let proj = Projection::new(Direction::North, coords.iter());
        assert!(proj.pixel(east).0 < proj.pixel(west).0);
        assert!(proj.pixel(north).1 > proj.pixel(west).1);

        // Seen from the east, east is at the bottom and north is right.
        let proj = Projection::new(Direction::East, coords.iter());
        assert!(proj.pixel(east).1 > proj.pixel(west).1);
        assert!(proj.pixel(north).0 > proj.pixel(west).0);

        // Seen from the west, west is at the bottom and north is left.
        let proj = Projection::new(Direction::West, coords.iter());
        assert!(proj.pixel(west).1 > proj.pixel(east).1);
        assert!(proj.pixel(north).0 < proj.pixel(west).0);
    }

    #[test]
    fn test_render_empty() {
        let svg = render(&Mountain::default(), "Nowhere", Direction::North);
        assert!(svg.contains("Nowhere"));
        assert!(!svg.contains("<path"));
    }
}
