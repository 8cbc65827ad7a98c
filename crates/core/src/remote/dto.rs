//! Wire payloads exchanged with the Falcone web service.

use serde::{Deserialize, Serialize};

use crate::models::{CatalogError, Destination, Selection, Vehicle};

use super::{RawOutcome, Token};

#[derive(Debug, Deserialize)]
pub(crate) struct PlanetDto {
    name: String,
    distance: u32,
}

impl PlanetDto {
    pub(crate) fn into_domain(self) -> Destination {
        Destination::new(self.name, self.distance)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct VehicleDto {
    name: String,
    total_no: u32,
    max_distance: u32,
    speed: u32,
}

impl VehicleDto {
    pub(crate) fn into_domain(self) -> Result<Vehicle, CatalogError> {
        Vehicle::new(self.name, self.total_no, self.max_distance, self.speed)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenDto {
    token: String,
}

impl TokenDto {
    pub(crate) fn into_domain(self) -> Token {
        Token::new(self.token)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FindRequest<'a> {
    token: &'a str,
    planet_names: Vec<&'a str>,
    vehicle_names: Vec<&'a str>,
}

impl<'a> FindRequest<'a> {
    pub(crate) fn new(token: &'a Token, selections: &'a [Selection]) -> Self {
        Self {
            token: token.as_str(),
            planet_names: selections
                .iter()
                .map(|selection| selection.destination.name.as_str())
                .collect(),
            vehicle_names: selections
                .iter()
                .map(|selection| selection.vehicle.name.as_str())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FindResponse {
    #[serde(default)]
    planet_name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl FindResponse {
    pub(crate) fn into_error(self) -> Option<String> {
        self.error.filter(|message| !message.trim().is_empty())
    }

    pub(crate) fn into_domain(self) -> RawOutcome {
        RawOutcome {
            destination_name: self.planet_name,
            status: self.status,
            error: self.error,
        }
    }
}
