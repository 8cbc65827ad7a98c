#![warn(clippy::all, missing_docs)]

//! Core domain logic for the Falcone search game.
//!
//! This crate hosts the selection rules and inventory bookkeeping, the
//! token-then-search workflow, the session state container, and the
//! HTTP collaborators and configuration used by the command-line front end.

pub mod catalog;
pub mod config;
pub mod game;
pub mod models;
pub mod remote;
pub mod store;
pub mod workflow;

pub use catalog::Catalog;
pub use config::AppConfig;
pub use game::{GameState, InventoryTracker, SelectionEngine, SelectionError};
pub use models::{Destination, FindingResult, FindingStatus, Selection, Vehicle};
pub use remote::FalconeClient;
pub use store::{GameStore, Phase, StoreError, StoreSnapshot};
pub use workflow::{SearchWorkflow, WorkflowError};
