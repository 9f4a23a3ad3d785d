// Model exports
pub mod domain;
pub mod records;

pub use domain::{Matching, PairKey, PairingHistory, Participant, Roster, ScoredPair, Week};
pub use records::{Assignment, Record, RosterRecord, WeekRecord};
