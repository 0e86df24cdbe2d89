use crate::{osm::OsmId, profile::Profile};
use geo::geometry::Coord;

/// Shape of a trail.
#[derive(Debug, Clone, PartialEq)]
pub enum TrailGeometry {
    /// A run drawn as a path.
    Line(Profile),

    /// A closed polygon, such as a glade.
    Area {
        /// The polygon as mapped, used for fill.
        polygon: Profile,

        /// The closed boundary path, used for rating.
        boundary: Profile,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    pub id: OsmId,
    pub name: String,
    pub difficulty_modifier: u32,
    pub geometry: TrailGeometry,
}

impl Trail {
    pub fn is_area(&self) -> bool {
        matches!(self.geometry, TrailGeometry::Area { .. })
    }

    /// The profile difficulty is computed from.
    pub fn rated(&self) -> &Profile {
        match &self.geometry {
            TrailGeometry::Line(line) => line,
            TrailGeometry::Area { boundary, .. } => boundary,
        }
    }

    /// The points to draw.
    pub fn outline(&self) -> &[Coord<f64>] {
        match &self.geometry {
            TrailGeometry::Line(line) => &line.points,
            TrailGeometry::Area { polygon, .. } => &polygon.points,
        }
    }

    /// Fills in slope and difficulty for the rated profile, in way
    /// order.
    pub fn analyze(&mut self) {
        match &mut self.geometry {
            TrailGeometry::Line(line) => line.analyze(),
            TrailGeometry::Area { boundary, .. } => boundary.analyze(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lift {
    pub id: OsmId,
    pub name: String,
    pub points: Vec<Coord<f64>>,
}
