//! Collaborators that supply catalog data and resolve searches.

/// HTTP implementation backed by the Falcone web service.
pub mod client;
mod dto;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Destination, Selection, Vehicle};

pub use client::FalconeClient;

/// Opaque credential required by the search executor.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    /// Wrap a raw token string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(..)")
    }
}

/// Unmapped search answer as reported by the executor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutcome {
    /// Destination named by the service, if any.
    pub destination_name: Option<String>,
    /// Status string, e.g. `success` or `false`.
    pub status: Option<String>,
    /// Error text returned in place of a verdict.
    pub error: Option<String>,
}

/// Supplies the list of selectable destinations.
#[async_trait]
pub trait PlanetProvider: Send + Sync {
    /// Fetch every destination.
    async fn list(&self) -> Result<Vec<Destination>>;
}

/// Supplies the list of vehicles and their fleet sizes.
#[async_trait]
pub trait VehicleProvider: Send + Sync {
    /// Fetch every vehicle.
    async fn list(&self) -> Result<Vec<Vehicle>>;
}

/// Issues a fresh token for each search attempt.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Request a new token.
    async fn acquire(&self) -> Result<Token>;
}

/// Resolves a set of selections to a raw outcome.
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    /// Submit the selections under the given token.
    async fn execute(&self, token: &Token, selections: &[Selection]) -> Result<RawOutcome>;
}
