use thiserror::Error;
use tracing::debug;

use crate::models::{Destination, Selection, Vehicle};

use super::{inventory::InventoryError, state::GameState};

/// Reasons a selection is refused. The prior state is never modified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("All destinations are already selected")]
    GameAlreadyComplete,
    #[error("Vehicle {vehicle} is not available")]
    VehicleUnavailable { vehicle: String },
    #[error("Vehicle {vehicle} cannot reach {destination}")]
    RangeExceeded {
        vehicle: String,
        destination: String,
    },
    #[error("Destination {destination} is already selected")]
    DuplicateDestination { destination: String },
}

impl From<InventoryError> for SelectionError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::VehicleUnavailable(vehicle) => Self::VehicleUnavailable { vehicle },
        }
    }
}

/// Validates and records one destination/vehicle pairing.
pub struct SelectionEngine;

impl SelectionEngine {
    /// Apply a selection to `state`, returning the successor state.
    ///
    /// Checks run in order and the first failure wins: game complete,
    /// vehicle exhausted, destination out of range, destination taken.
    pub fn select(
        state: &GameState,
        destination: &Destination,
        vehicle: &Vehicle,
    ) -> Result<GameState, SelectionError> {
        if state.is_complete() {
            return Err(SelectionError::GameAlreadyComplete);
        }
        if !state.available_vehicles().is_available(&vehicle.name) {
            return Err(SelectionError::VehicleUnavailable {
                vehicle: vehicle.name.clone(),
            });
        }
        if !vehicle.can_reach(destination) {
            return Err(SelectionError::RangeExceeded {
                vehicle: vehicle.name.clone(),
                destination: destination.name.clone(),
            });
        }
        if state.has_destination(&destination.name) {
            return Err(SelectionError::DuplicateDestination {
                destination: destination.name.clone(),
            });
        }

        let inventory = state.available_vehicles().decrement(&vehicle.name)?;
        let selection = Selection {
            destination: destination.clone(),
            vehicle: vehicle.clone(),
        };
        let next = state.advance(selection, inventory);
        debug!(
            destination = %destination.name,
            vehicle = %vehicle.name,
            step = next.step(),
            total_time = next.total_time(),
            "Selection recorded"
        );
        Ok(next)
    }
}
