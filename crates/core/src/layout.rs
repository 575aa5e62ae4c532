//! Layout data model and its persisted form.
//!
//! A [`Layout`] is the product of one optimization call: the lot boundary, the
//! selected parking spaces with sequential ids and generated labels, and the
//! carved lanes. With the `serde` feature it round-trips through the JSON
//! record
//!
//! ```text
//! { name, created, description,
//!   lot: { width, length, boundary: [[x, y], ...] },
//!   spaces: [{ id, type, x, y, length, width, rotation, label }, ...],
//!   lanes: [{ id, type, width, path: [[x, y], ...] }, ...] }
//! ```
//!
//! preserving space and lane order exactly.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{bounds, OrientedRect, Point};
use crate::vehicle::VehicleCatalog;

/// Lane direction, which fixes its nominal width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LaneType {
    /// Single direction of travel.
    #[default]
    OneWay,
    /// Two directions of travel.
    TwoWay,
}

impl LaneType {
    /// Canonical lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneWay => "oneway",
            Self::TwoWay => "twoway",
        }
    }
}

impl std::str::FromStr for LaneType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oneway" => Ok(Self::OneWay),
            "twoway" => Ok(Self::TwoWay),
            other => Err(format!("unknown lane type: {}", other)),
        }
    }
}

/// A materialized parking space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParkingSpace {
    /// Sequential id, unique within a layout.
    pub id: u32,
    /// Vehicle type key.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub space_type: String,
    /// Reference corner x before rotation.
    pub x: f64,
    /// Reference corner y before rotation.
    pub y: f64,
    /// Length.
    pub length: f64,
    /// Width.
    pub width: f64,
    /// Counter-clockwise rotation in degrees.
    #[cfg_attr(feature = "serde", serde(default))]
    pub rotation: f64,
    /// Display label such as `T-3`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub label: String,
}

impl ParkingSpace {
    /// Creates a space from a footprint, labelling it `<prefix>-<id>`.
    pub fn new(id: u32, space_type: impl Into<String>, rect: OrientedRect, prefix: &str) -> Self {
        Self {
            id,
            space_type: space_type.into(),
            x: rect.x,
            y: rect.y,
            length: rect.length,
            width: rect.width,
            rotation: rect.rotation,
            label: format!("{}-{}", prefix, id),
        }
    }

    /// Footprint of the space.
    pub fn rect(&self) -> OrientedRect {
        OrientedRect::new(self.x, self.y, self.length, self.width).with_rotation(self.rotation)
    }

    /// Center of the footprint.
    pub fn center(&self) -> Point {
        self.rect().center()
    }
}

/// A driving lane.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Lane {
    /// Lane identifier.
    pub id: String,
    /// Direction type.
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub lane_type: LaneType,
    /// Drivable width.
    pub width: f64,
    /// Centerline, at least two points.
    pub path: Vec<Point>,
}

impl Lane {
    /// Creates a lane.
    pub fn new(id: impl Into<String>, lane_type: LaneType, width: f64, path: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            lane_type,
            width,
            path,
        }
    }

    /// Length of the centerline.
    pub fn length(&self) -> f64 {
        self.path
            .windows(2)
            .map(|w| crate::geometry::distance(w[0], w[1]))
            .sum()
    }
}

/// A complete parking lot layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "record::LayoutRecord", into = "record::LayoutRecord"))]
pub struct Layout {
    /// Layout name.
    pub name: String,
    /// Creation date `YYYY-MM-DD`.
    pub created: String,
    /// Free-form description.
    pub description: String,
    /// Horizontal extent of the boundary.
    pub lot_width: f64,
    /// Vertical extent of the boundary.
    pub lot_length: f64,
    /// Lot boundary ring (open).
    pub boundary: Vec<Point>,
    /// Spaces in insertion order.
    pub spaces: Vec<ParkingSpace>,
    /// Lanes in insertion order.
    pub lanes: Vec<Lane>,
}

impl Layout {
    /// Creates an empty layout dated today.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            created: today(),
            description: String::new(),
            lot_width: 0.0,
            lot_length: 0.0,
            boundary: Vec::new(),
            spaces: Vec::new(),
            lanes: Vec::new(),
        }
    }

    /// Sets the boundary and derives the lot extents from it.
    pub fn with_boundary(mut self, boundary: Vec<Point>) -> Self {
        if let Some([min_x, min_y, max_x, max_y]) = bounds(&boundary) {
            self.lot_width = max_x - min_x;
            self.lot_length = max_y - min_y;
        }
        self.boundary = boundary;
        self
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Appends a space.
    pub fn add_space(&mut self, space: ParkingSpace) {
        self.spaces.push(space);
    }

    /// Removes the space with `id`, returning true if one was removed.
    pub fn remove_space(&mut self, id: u32) -> bool {
        match self.spaces.iter().position(|s| s.id == id) {
            Some(i) => {
                self.spaces.remove(i);
                true
            }
            None => false,
        }
    }

    /// Looks up a space by id.
    pub fn space_by_id(&self, id: u32) -> Option<&ParkingSpace> {
        self.spaces.iter().find(|s| s.id == id)
    }

    /// Next unused id (one past the current maximum).
    pub fn next_id(&self) -> u32 {
        self.spaces.iter().map(|s| s.id).max().map_or(1, |m| m + 1)
    }

    /// Number of spaces per type key.
    pub fn count_by_type(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for space in &self.spaces {
            *counts.entry(space.space_type.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of spaces of one type.
    pub fn count_of(&self, space_type: &str) -> usize {
        self.spaces
            .iter()
            .filter(|s| s.space_type == space_type)
            .count()
    }

    /// Reassigns ids `1..=n` in list order and regenerates labels.
    pub fn renumber(&mut self, catalog: &VehicleCatalog) {
        for (i, space) in self.spaces.iter_mut().enumerate() {
            space.id = i as u32 + 1;
            space.label = format!("{}-{}", catalog.label_prefix(&space.space_type), space.id);
        }
    }

    /// Total footprint area of all spaces.
    pub fn parking_area(&self) -> f64 {
        self.spaces.iter().map(|s| s.length * s.width).sum()
    }

    /// Serializes to pretty JSON.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses from JSON.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A layout with the occupancy assumption used to value it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Layout being evaluated.
    pub layout: Layout,
    /// Fraction of time spaces are rented.
    #[cfg_attr(feature = "serde", serde(default = "default_occupancy"))]
    pub occupancy_rate: f64,
    /// Free-form notes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub notes: String,
}

#[cfg(feature = "serde")]
fn default_occupancy() -> f64 {
    0.75
}

impl Scenario {
    /// Creates a scenario at the default occupancy of 75%.
    pub fn new(name: impl Into<String>, layout: Layout) -> Self {
        Self {
            name: name.into(),
            layout,
            occupancy_rate: 0.75,
            notes: String::new(),
        }
    }

    /// Sets the occupancy rate, clamped to `[0, 1]`.
    pub fn with_occupancy(mut self, rate: f64) -> Self {
        self.occupancy_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Serializes to pretty JSON.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parses from JSON.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(feature = "serde")]
mod record {
    use super::{today, Lane, Layout, ParkingSpace};
    use crate::geometry::Point;
    use crate::vehicle::VehicleCatalog;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    pub(super) struct LayoutRecord {
        #[serde(default = "unnamed")]
        name: String,
        #[serde(default)]
        created: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        lot: LotRecord,
        #[serde(default)]
        spaces: Vec<ParkingSpace>,
        #[serde(default)]
        lanes: Vec<Lane>,
    }

    #[derive(Default, Serialize, Deserialize)]
    struct LotRecord {
        #[serde(default)]
        width: f64,
        #[serde(default)]
        length: f64,
        #[serde(default)]
        boundary: Vec<Point>,
    }

    fn unnamed() -> String {
        "Unnamed".to_string()
    }

    impl From<LayoutRecord> for Layout {
        fn from(r: LayoutRecord) -> Self {
            let catalog = VehicleCatalog::default();
            let mut spaces = r.spaces;
            for space in spaces.iter_mut().filter(|s| s.label.is_empty()) {
                space.label = format!("{}-{}", catalog.label_prefix(&space.space_type), space.id);
            }
            Layout {
                name: r.name,
                created: if r.created.is_empty() { today() } else { r.created },
                description: r.description,
                lot_width: r.lot.width,
                lot_length: r.lot.length,
                boundary: r.lot.boundary,
                spaces,
                lanes: r.lanes,
            }
        }
    }

    impl From<Layout> for LayoutRecord {
        fn from(l: Layout) -> Self {
            LayoutRecord {
                name: l.name,
                created: l.created,
                description: l.description,
                lot: LotRecord {
                    width: l.lot_width,
                    length: l.lot_length,
                    boundary: l.boundary,
                },
                spaces: l.spaces,
                lanes: l.lanes,
            }
        }
    }
}
