//! Plain-text rendering of catalog listings and search outcomes.

use falcone_core::{Catalog, FindingResult, FindingStatus, GameState};

pub fn catalog(catalog: &Catalog) -> String {
    let mut out = String::from("Destinations:\n");
    for destination in &catalog.destinations {
        out.push_str(&format!(
            "  {:<12} {:>5} megamiles\n",
            destination.name, destination.distance
        ));
    }
    out.push_str("Vehicles:\n");
    for vehicle in &catalog.vehicles {
        out.push_str(&format!(
            "  {:<14} x{:<2} range {:>4}  speed {:>3}\n",
            vehicle.name, vehicle.total_count, vehicle.max_range, vehicle.speed
        ));
    }
    out
}

pub fn outcome(result: &FindingResult, state: &GameState) -> String {
    let mut out = String::new();
    for selection in state.selections() {
        out.push_str(&format!(
            "  {} -> {} ({} time)\n",
            selection.vehicle.name,
            selection.destination.name,
            selection.time_taken()
        ));
    }
    let fleet: Vec<String> = state
        .available_vehicles()
        .iter()
        .filter(|(_, remaining)| *remaining > 0)
        .map(|(name, remaining)| format!("{name} x{remaining}"))
        .collect();
    if !fleet.is_empty() {
        out.push_str(&format!("Unused vehicles: {}\n", fleet.join(", ")));
    }

    match result.status {
        FindingStatus::Success => {
            out.push_str(
                "Success! Congratulations on finding Falcone. King Shan is mighty pleased.\n",
            );
            out.push_str(&format!("Time taken: {}\n", state.total_time()));
            out.push_str(&format!(
                "Planet found: {}\n",
                result.destination_name.as_deref().unwrap_or("?")
            ));
        }
        FindingStatus::NotFound => {
            out.push_str("Falcone was not found on any of the searched planets.\n");
            out.push_str(&format!("Time taken: {}\n", state.total_time()));
        }
        FindingStatus::Error => {
            out.push_str(&format!(
                "The search could not be completed: {}\n",
                result.error_message.as_deref().unwrap_or("unknown error")
            ));
        }
    }
    out
}
