use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Vehicle;

/// Failure to take a unit out of the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// No units of the named vehicle remain.
    #[error("vehicle {0} is not available")]
    VehicleUnavailable(String),
}

/// Remaining units per vehicle type.
///
/// Every operation returns a new snapshot. Names that were never stocked
/// report zero remaining units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryTracker {
    counts: BTreeMap<String, u32>,
}

impl InventoryTracker {
    /// Stock each vehicle type with its full fleet.
    pub fn from_vehicles(vehicles: &[Vehicle]) -> Self {
        let counts = vehicles
            .iter()
            .map(|vehicle| (vehicle.name.clone(), vehicle.total_count))
            .collect();
        Self { counts }
    }

    /// Units left for the named vehicle, zero when unknown.
    pub fn remaining(&self, vehicle_name: &str) -> u32 {
        self.counts.get(vehicle_name).copied().unwrap_or(0)
    }

    /// Whether at least one unit of the named vehicle is left.
    pub fn is_available(&self, vehicle_name: &str) -> bool {
        self.remaining(vehicle_name) > 0
    }

    /// Return a snapshot with one fewer unit of the named vehicle.
    pub fn decrement(&self, vehicle_name: &str) -> Result<Self, InventoryError> {
        let remaining = self.remaining(vehicle_name);
        if remaining == 0 {
            return Err(InventoryError::VehicleUnavailable(vehicle_name.to_string()));
        }
        let mut counts = self.counts.clone();
        counts.insert(vehicle_name.to_string(), remaining - 1);
        Ok(Self { counts })
    }

    /// Iterate over `(name, remaining)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }
}
