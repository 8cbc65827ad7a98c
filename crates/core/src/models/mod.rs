//! Shared domain models.

use std::{fmt, num::NonZeroU32};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejections raised while building catalog entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Vehicle speed must be positive so travel time is defined.
    #[error("vehicle {vehicle} has zero speed")]
    ZeroSpeed {
        /// Name of the offending vehicle.
        vehicle: String,
    },
}

/// A selectable location with a distance from home.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    /// Unique destination name.
    pub name: String,
    /// Distance in megamiles.
    pub distance: u32,
}

impl Destination {
    /// Build a destination from its name and distance.
    pub fn new(name: impl Into<String>, distance: u32) -> Self {
        Self {
            name: name.into(),
            distance,
        }
    }
}

/// A transport type with a finite fleet.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vehicle {
    /// Unique vehicle name.
    pub name: String,
    /// Number of units in the fleet at session start.
    pub total_count: u32,
    /// Furthest distance the vehicle can travel.
    pub max_range: u32,
    /// Megamiles covered per unit of time.
    pub speed: NonZeroU32,
}

impl Vehicle {
    /// Build a vehicle, rejecting a zero speed.
    pub fn new(
        name: impl Into<String>,
        total_count: u32,
        max_range: u32,
        speed: u32,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        let speed = NonZeroU32::new(speed).ok_or_else(|| CatalogError::ZeroSpeed {
            vehicle: name.clone(),
        })?;
        Ok(Self {
            name,
            total_count,
            max_range,
            speed,
        })
    }

    /// Whether the vehicle's range covers the destination.
    pub fn can_reach(&self, destination: &Destination) -> bool {
        destination.distance <= self.max_range
    }

    /// Travel time to the destination, truncated toward zero.
    pub fn travel_time(&self, destination: &Destination) -> u64 {
        u64::from(destination.distance / self.speed.get())
    }
}

/// One committed destination/vehicle pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Where the vehicle is sent.
    pub destination: Destination,
    /// What is sent there.
    pub vehicle: Vehicle,
}

impl Selection {
    /// Time this pairing contributes to the running total.
    pub fn time_taken(&self) -> u64 {
        self.vehicle.travel_time(&self.destination)
    }
}

/// Outcome category of a completed search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    /// The target was found.
    Success,
    /// The service reported the target was not at any selected destination.
    NotFound,
    /// The service answered without a verdict.
    Error,
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::NotFound => "not found",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Tri-state result of a search.
///
/// The constructors keep the fields consistent: only `Success` carries a
/// destination name and only `Error` carries a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingResult {
    /// Destination where the target was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_name: Option<String>,
    /// Outcome category.
    pub status: FindingStatus,
    /// Human-readable failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl FindingResult {
    /// The target was found at the named destination.
    pub fn success(destination_name: impl Into<String>) -> Self {
        Self {
            destination_name: Some(destination_name.into()),
            status: FindingStatus::Success,
            error_message: None,
        }
    }

    /// None of the searched destinations held the target.
    pub fn not_found() -> Self {
        Self {
            destination_name: None,
            status: FindingStatus::NotFound,
            error_message: None,
        }
    }

    /// The service answered with something other than a verdict.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            destination_name: None,
            status: FindingStatus::Error,
            error_message: Some(message.into()),
        }
    }

    /// Whether the search located the target.
    pub fn is_success(&self) -> bool {
        self.status == FindingStatus::Success
    }
}
