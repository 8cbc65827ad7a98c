use serde::{Deserialize, Serialize};

use crate::models::{Selection, Vehicle};

use super::inventory::InventoryTracker;

/// Number of selections a game needs before a search may be issued.
pub const REQUIRED_SELECTIONS: usize = 4;

/// Immutable snapshot of a game in progress.
///
/// Only [`SelectionEngine`](super::SelectionEngine) produces successor
/// states, so `total_time` always equals the summed travel time of
/// `selections` and `step` always equals their count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    selections: Vec<Selection>,
    available_vehicles: InventoryTracker,
    total_time: u64,
    step: usize,
}

impl GameState {
    /// Fresh state with every vehicle fully stocked.
    pub fn new(vehicles: &[Vehicle]) -> Self {
        Self {
            selections: Vec::new(),
            available_vehicles: InventoryTracker::from_vehicles(vehicles),
            total_time: 0,
            step: 0,
        }
    }

    pub(super) fn advance(
        &self,
        selection: Selection,
        available_vehicles: InventoryTracker,
    ) -> Self {
        let total_time = self.total_time + selection.time_taken();
        let mut selections = self.selections.clone();
        selections.push(selection);
        let step = selections.len();
        Self {
            selections,
            available_vehicles,
            total_time,
            step,
        }
    }

    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    pub fn available_vehicles(&self) -> &InventoryTracker {
        &self.available_vehicles
    }

    /// Units left for the named vehicle, zero when unknown.
    pub fn available_count(&self, vehicle_name: &str) -> u32 {
        self.available_vehicles.remaining(vehicle_name)
    }

    /// Summed travel time of all selections.
    pub fn total_time(&self) -> u64 {
        self.total_time
    }

    /// Step counter; equals the number of selections made.
    pub fn step(&self) -> usize {
        self.step
    }

    pub fn is_complete(&self) -> bool {
        self.selections.len() == REQUIRED_SELECTIONS
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Whether the named destination already has a vehicle assigned.
    pub fn has_destination(&self, destination_name: &str) -> bool {
        self.selections
            .iter()
            .any(|selection| selection.destination.name == destination_name)
    }
}
