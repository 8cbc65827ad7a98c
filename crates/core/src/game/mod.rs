#![allow(missing_docs)]

//! Selection rules and the bookkeeping they mutate.

mod engine;
mod inventory;
mod state;

pub use engine::{SelectionEngine, SelectionError};
pub use inventory::{InventoryError, InventoryTracker};
pub use state::{GameState, REQUIRED_SELECTIONS};
