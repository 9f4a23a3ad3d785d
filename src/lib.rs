//! Pair Rotation - weekly partner pairing that favours fresh pairs
//!
//! Each week the roster is split into pairs by a maximum-weight perfect
//! matching. Pairs that have never met weigh the most; pairs that met long ago
//! weigh more than pairs that met recently.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use self::core::{build_graph, plan_round, MatchingEngine, RoundPlan, WeightedGraph};
pub use error::{DataWarning, PairingError, StoreError};
pub use models::{Matching, PairKey, PairingHistory, Participant, Roster, Week};
pub use services::{HistoryStore, LoadedHistory, ResultWriter};
