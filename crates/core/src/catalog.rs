//! Destinations and vehicles available to a session.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    game::GameState,
    models::{Destination, Vehicle},
    remote::{PlanetProvider, VehicleProvider},
};

/// Catalog loaded once at session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Every destination, in provider order.
    pub destinations: Vec<Destination>,
    /// Every vehicle, in provider order.
    pub vehicles: Vec<Vehicle>,
    /// When the catalog was assembled.
    pub loaded_at: DateTime<Utc>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl Catalog {
    /// Assemble a catalog from already-fetched entities.
    pub fn new(destinations: Vec<Destination>, vehicles: Vec<Vehicle>) -> Self {
        Self {
            destinations,
            vehicles,
            loaded_at: Utc::now(),
        }
    }

    /// Fetch destinations then vehicles from the providers.
    pub async fn load(
        planets: &dyn PlanetProvider,
        vehicles: &dyn VehicleProvider,
    ) -> Result<Self> {
        let destinations = planets.list().await.context("failed to load planets")?;
        let vehicles = vehicles.list().await.context("failed to load vehicles")?;
        info!(
            destinations = destinations.len(),
            vehicles = vehicles.len(),
            "Catalog loaded"
        );
        Ok(Self::new(destinations, vehicles))
    }

    /// Look up a destination by name.
    pub fn destination(&self, name: &str) -> Option<&Destination> {
        self.destinations
            .iter()
            .find(|destination| destination.name == name)
    }

    /// Look up a vehicle by name.
    pub fn vehicle(&self, name: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|vehicle| vehicle.name == name)
    }

    /// Destinations that have not been assigned a vehicle yet.
    pub fn open_destinations<'a>(
        &'a self,
        state: &'a GameState,
    ) -> impl Iterator<Item = &'a Destination> + 'a {
        self.destinations
            .iter()
            .filter(move |destination| !state.has_destination(&destination.name))
    }

    /// Vehicles with stock left that can reach `destination`.
    pub fn usable_vehicles<'a>(
        &'a self,
        state: &'a GameState,
        destination: &'a Destination,
    ) -> impl Iterator<Item = &'a Vehicle> + 'a {
        self.vehicles.iter().filter(move |vehicle| {
            state.available_count(&vehicle.name) > 0 && vehicle.can_reach(destination)
        })
    }
}
