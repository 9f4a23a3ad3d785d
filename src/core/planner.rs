use serde::Serialize;

use crate::core::graph::build_graph;
use crate::core::matcher::MatchingEngine;
use crate::error::PairingError;
use crate::models::{Matching, PairingHistory, Roster, Week};

/// Pairings chosen for the next week
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundPlan {
    /// Week the pairings will be recorded under
    pub week: Week,
    /// Week horizon used for the weights
    pub horizon: Week,
    pub matching: Matching,
}

/// Plan the round after `latest_week`
///
/// The weight horizon is one past the latest recorded week, so a pair from the
/// latest week still scores 1 and never-paired combinations score
/// `horizon * (horizon + 1)`.
pub fn plan_round(
    roster: &Roster,
    history: &PairingHistory,
    latest_week: Week,
) -> Result<RoundPlan, PairingError> {
    let horizon = latest_week.checked_add(1).ok_or_else(|| {
        PairingError::invalid(format!("week {} is the last representable week", latest_week))
    })?;

    let graph = build_graph(roster, history, horizon)?;
    let matching = MatchingEngine::new().solve(&graph)?;

    tracing::info!(
        "Planned week {}: {} pairs, total weight {}",
        horizon,
        matching.len(),
        matching.total_weight()
    );

    Ok(RoundPlan {
        week: horizon,
        horizon,
        matching,
    })
}
