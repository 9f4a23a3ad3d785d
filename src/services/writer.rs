use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::core::RoundPlan;
use crate::error::StoreError;
use crate::models::{Assignment, Record, RosterRecord, WeekRecord};

/// Appends records to the pairing record
///
/// Each call is one buffered write followed by `sync_all`. Serializing
/// concurrent writers is left to the caller.
#[derive(Debug, Clone)]
pub struct ResultWriter {
    path: PathBuf,
}

impl ResultWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a new roster; it replaces the previous one for future rounds
    pub fn append_roster<S: AsRef<str>>(&self, names: &[S]) -> Result<RosterRecord, StoreError> {
        let record = roster_record(names);
        self.append(&[Record::Roster(record.clone())])?;

        tracing::info!(
            "Recorded roster of {} participants in {}",
            record.participants.len(),
            self.path.display()
        );
        Ok(record)
    }

    /// Record the pairings of a planned round under its week number
    pub fn append_plan(&self, plan: &RoundPlan) -> Result<WeekRecord, StoreError> {
        let record = week_record(plan);
        self.append(&[Record::Week(record.clone())])?;

        tracing::info!(
            "Recorded week {} ({} pairs) in {}",
            record.week,
            record.assignments.len(),
            self.path.display()
        );
        Ok(record)
    }

    /// Append records as JSON lines
    pub fn append(&self, records: &[Record]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut buffer = String::new();
        if self.needs_leading_newline()? {
            buffer.push('\n');
        }
        for record in records {
            buffer.push_str(&serde_json::to_string(record)?);
            buffer.push('\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.write_all(buffer.as_bytes())
            .map_err(|e| StoreError::io(&self.path, e))?;
        file.sync_all().map_err(|e| StoreError::io(&self.path, e))?;

        Ok(())
    }

    /// A hand-edited file may lack a trailing newline
    fn needs_leading_newline(&self) -> Result<bool, StoreError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        let len = file
            .metadata()
            .map_err(|e| StoreError::io(&self.path, e))?
            .len();
        if len == 0 {
            return Ok(false);
        }

        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))
            .and_then(|_| file.read_exact(&mut last))
            .map_err(|e| StoreError::io(&self.path, e))?;
        Ok(last[0] != b'\n')
    }
}

/// Roster row for the given names, trimmed but otherwise as typed
pub fn roster_record<S: AsRef<str>>(names: &[S]) -> RosterRecord {
    RosterRecord {
        participants: names.iter().map(|n| n.as_ref().trim().to_string()).collect(),
        recorded_at: Some(Utc::now()),
    }
}

/// Persisted form of a planned round, one assignment per pair
pub fn week_record(plan: &RoundPlan) -> WeekRecord {
    WeekRecord {
        week: plan.week,
        assignments: plan
            .matching
            .pairs()
            .iter()
            .map(|scored| Assignment::new(scored.pair.first().as_str(), scored.pair.second().as_str()))
            .collect(),
        unpaired: plan.matching.unmatched().map(|p| p.to_string()),
        recorded_at: Some(Utc::now()),
    }
}
