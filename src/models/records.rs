use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::Week;

/// One line of the persisted pairing record
///
/// The record is JSON Lines, one object per line, tagged by `kind`:
/// ```json
/// {"kind":"roster","participants":["Sam","Riki","Ohi","Joe"]}
/// {"kind":"week","week":1,"assignments":[{"participant":"sam","partner":"joe"}]}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    Roster(RosterRecord),
    Week(WeekRecord),
}

/// Roster declaration; the last one in the record is the current roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterRecord {
    pub participants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Pairings made in one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct WeekRecord {
    #[validate(range(min = 1))]
    pub week: Week,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unpaired: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// A participant and the partner they were given
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Assignment {
    #[validate(length(min = 1))]
    pub participant: String,
    #[validate(length(min = 1))]
    pub partner: String,
}

impl Assignment {
    pub fn new(participant: impl Into<String>, partner: impl Into<String>) -> Self {
        Self {
            participant: participant.into(),
            partner: partner.into(),
        }
    }
}
