use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{DataWarning, StoreError};
use crate::models::{PairingHistory, Participant, Record, Roster, Week};

/// Everything one round needs from the pairing record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedHistory {
    pub roster: Roster,
    pub history: PairingHistory,
    /// Highest recorded week, 0 when nothing has been recorded
    pub latest_week: Week,
    pub warnings: Vec<DataWarning>,
}

/// Reader for the append-only pairing record
///
/// A missing file reads as an empty record so a new rotation can start from
/// a roster alone.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and validate every record in the file
    pub fn read_records(&self) -> Result<Vec<Record>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("{} does not exist yet", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        parse_records(&content)
    }

    /// Load the current roster and pairing history
    pub fn load(&self) -> Result<LoadedHistory, StoreError> {
        self.load_with(Vec::new())
    }

    /// Load as if `pending` records had been appended to the file
    pub fn load_with(&self, pending: Vec<Record>) -> Result<LoadedHistory, StoreError> {
        let mut records = self.read_records()?;
        records.extend(pending);
        if !records.iter().any(|r| matches!(r, Record::Roster(_))) {
            return Err(StoreError::MissingRoster(self.path.clone()));
        }

        let loaded = LoadedHistory::from_records(&records)?;
        for warning in &loaded.warnings {
            tracing::warn!("{}", warning);
        }

        tracing::info!(
            "Loaded {} participants and {} recorded pairs up to week {} from {}",
            loaded.roster.len(),
            loaded.history.len(),
            loaded.latest_week,
            self.path.display()
        );

        Ok(loaded)
    }
}

impl LoadedHistory {
    /// Rebuild roster and history from records in file order
    ///
    /// The last roster record wins. For each pair only the most recent week is
    /// kept, whatever order the weeks were written in.
    pub fn from_records(records: &[Record]) -> Result<Self, StoreError> {
        let mut roster = Roster::default();
        let mut history = PairingHistory::new();
        let mut latest_week = 0;
        let mut warnings = Vec::new();
        let mut seen_weeks = BTreeSet::new();
        let mut mentioned: BTreeSet<Participant> = BTreeSet::new();
        let mut week_partners: BTreeMap<Week, BTreeMap<Participant, Participant>> = BTreeMap::new();

        for record in records {
            match record {
                Record::Roster(roster_record) => {
                    let members = roster_record
                        .participants
                        .iter()
                        .map(|name| normalize(name))
                        .collect::<Result<Vec<_>, _>>()?;
                    roster = Roster::new(members);
                }
                Record::Week(week_record) => {
                    let week = week_record.week;
                    latest_week = latest_week.max(week);
                    if !seen_weeks.insert(week) {
                        warnings.push(DataWarning::DuplicateWeek { week });
                    }

                    let partners = week_partners.entry(week).or_default();
                    for assignment in &week_record.assignments {
                        let participant = normalize(&assignment.participant)?;
                        let partner = normalize(&assignment.partner)?;
                        mentioned.insert(participant.clone());
                        mentioned.insert(partner.clone());

                        if participant == partner {
                            warnings.push(DataWarning::SelfPairing {
                                week,
                                name: participant.to_string(),
                            });
                            continue;
                        }

                        check_assignment(week, &participant, &partner, partners, &mut warnings);
                        history.record(&participant, &partner, week);
                    }

                    if let Some(unpaired) = week_record.unpaired.as_deref().and_then(Participant::new) {
                        mentioned.insert(unpaired);
                    }
                }
            }
        }

        for name in &mentioned {
            if !roster.contains(name) {
                warnings.push(DataWarning::UnknownParticipant {
                    name: name.to_string(),
                });
            }
        }

        if latest_week > 0 {
            let paired = history.participants();
            let members: BTreeSet<&Participant> = roster.members().iter().collect();
            for member in members {
                if !paired.contains(member) {
                    warnings.push(DataWarning::NeverPaired {
                        name: member.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            roster,
            history,
            latest_week,
            warnings,
        })
    }
}

/// Parse JSON Lines content, skipping blank lines
pub fn parse_records(content: &str) -> Result<Vec<Record>, StoreError> {
    let mut records = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record: Record = serde_json::from_str(trimmed).map_err(|e| StoreError::Malformed {
            line: line_number,
            reason: e.to_string(),
        })?;

        if let Record::Week(week) = &record {
            let malformed = |reason: String| StoreError::Malformed {
                line: line_number,
                reason,
            };
            week.validate().map_err(|e| malformed(e.to_string()))?;
            for assignment in &week.assignments {
                assignment.validate().map_err(|e| malformed(e.to_string()))?;
            }
        }

        records.push(record);
    }

    Ok(records)
}

fn normalize(raw: &str) -> Result<Participant, StoreError> {
    Participant::new(raw).ok_or_else(|| StoreError::InvalidParticipant(raw.to_string()))
}

/// Record `participant <-> partner` for the week, warning when either side
/// already has a different partner that week
fn check_assignment(
    week: Week,
    participant: &Participant,
    partner: &Participant,
    partners: &mut BTreeMap<Participant, Participant>,
    warnings: &mut Vec<DataWarning>,
) {
    for (name, other) in [(participant, partner), (partner, participant)] {
        match partners.get(name) {
            Some(existing) if existing != other => {
                warnings.push(DataWarning::AsymmetricAssignment {
                    week,
                    name: name.to_string(),
                    first: existing.to_string(),
                    second: other.to_string(),
                });
            }
            Some(_) => {}
            None => {
                partners.insert(name.clone(), other.clone());
            }
        }
    }
}
