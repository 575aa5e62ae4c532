//! Vehicle type specifications.
//!
//! Each parking space type has a default footprint used for candidate
//! placement, a minimum footprint used as the compliance floor, a turning
//! radius used for lane reachability, and pricing/priority weights.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Immutable specification of one vehicle (space) type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleTypeSpec {
    /// Lookup key, e.g. `"truck"`.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Footprint length used for placement.
    pub default_length: f64,
    /// Footprint width used for placement.
    pub default_width: f64,
    /// Minimum compliant length.
    pub min_length: f64,
    /// Minimum compliant width.
    pub min_width: f64,
    /// Turning radius used for lane reachability.
    pub turning_radius: f64,
    /// Multiplier on the base annual price.
    pub revenue_multiplier: f64,
    /// Weight under the priority-weighted objective.
    pub priority_weight: f64,
    /// Prefix of generated space labels.
    pub label_prefix: String,
}

impl VehicleTypeSpec {
    /// Creates a spec whose minimum footprint equals its default footprint.
    pub fn new(key: impl Into<String>, default_length: f64, default_width: f64) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            label_prefix: "S".to_string(),
            key,
            default_length,
            default_width,
            min_length: default_length,
            min_width: default_width,
            turning_radius: default_length,
            revenue_multiplier: 1.0,
            priority_weight: 1.0,
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the minimum compliant footprint.
    pub fn with_min_size(mut self, length: f64, width: f64) -> Self {
        self.min_length = length;
        self.min_width = width;
        self
    }

    /// Sets the turning radius.
    pub fn with_turning_radius(mut self, radius: f64) -> Self {
        self.turning_radius = radius;
        self
    }

    /// Sets the revenue multiplier.
    pub fn with_revenue_multiplier(mut self, multiplier: f64) -> Self {
        self.revenue_multiplier = multiplier;
        self
    }

    /// Sets the priority weight.
    pub fn with_priority_weight(mut self, weight: f64) -> Self {
        self.priority_weight = weight;
        self
    }

    /// Sets the label prefix.
    pub fn with_label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.label_prefix = prefix.into();
        self
    }

    /// Maximum center-to-lane distance at which a space is still reachable.
    #[inline]
    pub fn reach(&self) -> f64 {
        self.turning_radius + self.default_length
    }
}

/// Ordered collection of vehicle type specifications.
///
/// Iteration order is insertion order and drives candidate generation order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VehicleCatalog {
    specs: Vec<VehicleTypeSpec>,
}

impl Default for VehicleCatalog {
    fn default() -> Self {
        Self {
            specs: vec![
                VehicleTypeSpec::new("truck", 18.5, 3.5)
                    .with_name("Truck (LZV)")
                    .with_min_size(16.5, 3.0)
                    .with_turning_radius(12.5)
                    .with_revenue_multiplier(1.0)
                    .with_priority_weight(10.0)
                    .with_label_prefix("T"),
                VehicleTypeSpec::new("tractor", 8.5, 3.5)
                    .with_name("Tractor unit")
                    .with_min_size(7.5, 3.0)
                    .with_turning_radius(10.0)
                    .with_revenue_multiplier(0.7)
                    .with_priority_weight(5.0)
                    .with_label_prefix("TR"),
                VehicleTypeSpec::new("trailer", 14.0, 3.5)
                    .with_name("Trailer")
                    .with_min_size(13.6, 3.0)
                    .with_turning_radius(12.0)
                    .with_revenue_multiplier(0.6)
                    .with_priority_weight(4.0)
                    .with_label_prefix("TL"),
                VehicleTypeSpec::new("ev", 18.5, 4.0)
                    .with_name("EV truck (charging)")
                    .with_min_size(16.5, 3.5)
                    .with_turning_radius(12.5)
                    .with_revenue_multiplier(1.3)
                    .with_priority_weight(9.0)
                    .with_label_prefix("EV"),
                VehicleTypeSpec::new("van", 7.0, 3.0)
                    .with_name("Van")
                    .with_min_size(6.0, 2.5)
                    .with_turning_radius(7.0)
                    .with_revenue_multiplier(0.5)
                    .with_priority_weight(2.0)
                    .with_label_prefix("V"),
            ],
        }
    }
}

impl VehicleCatalog {
    /// Creates an empty catalog.
    pub fn empty() -> Self {
        Self { specs: Vec::new() }
    }

    /// Adds a spec, replacing any existing spec with the same key in place.
    pub fn with_spec(mut self, spec: VehicleTypeSpec) -> Self {
        self.insert(spec);
        self
    }

    /// Inserts or replaces a spec.
    pub fn insert(&mut self, spec: VehicleTypeSpec) {
        match self.specs.iter_mut().find(|s| s.key == spec.key) {
            Some(slot) => *slot = spec,
            None => self.specs.push(spec),
        }
    }

    /// Looks up a spec by key.
    pub fn get(&self, key: &str) -> Option<&VehicleTypeSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    /// Mutable lookup by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut VehicleTypeSpec> {
        self.specs.iter_mut().find(|s| s.key == key)
    }

    /// Looks up a spec by key, failing for unknown keys.
    pub fn require(&self, key: &str) -> Result<&VehicleTypeSpec> {
        self.get(key)
            .ok_or_else(|| Error::UnknownVehicleType(key.to_string()))
    }

    /// Returns true if the key is known.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates specs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &VehicleTypeSpec> {
        self.specs.iter()
    }

    /// Position of a key in catalog order.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.key == key)
    }

    /// Number of specs.
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true if the catalog has no specs.
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Label prefix for a type, `"S"` for unknown types.
    pub fn label_prefix(&self, key: &str) -> &str {
        self.get(key).map_or("S", |s| s.label_prefix.as_str())
    }
}
