// Core algorithm exports
pub mod blossom;
pub mod graph;
pub mod matcher;
pub mod planner;
pub mod weight;

pub use blossom::max_weight_matching;
pub use graph::{build_graph, EdgeWeight, WeightedGraph};
pub use matcher::MatchingEngine;
pub use planner::{plan_round, RoundPlan};
pub use weight::{calculate_pair_weight, elapsed_weight, sentinel_weight};
