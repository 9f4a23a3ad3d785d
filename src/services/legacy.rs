//! One-time migration from the person-keyed legacy table.
//!
//! The legacy table has one row per participant and one column per week:
//!
//! ```text
//! name,1,2,3
//! Sam,Joe,Ohi,Riki
//! Joe,Sam,,Ohi
//! ```
//!
//! An empty cell means the participant was not paired that week.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::StoreError;
use crate::models::{Assignment, Record, RosterRecord, Week, WeekRecord};
use crate::services::history::HistoryStore;
use crate::services::writer::ResultWriter;

/// Convert a legacy table into a roster record followed by one record per week
pub fn parse_legacy_table(input: &str) -> Result<Vec<Record>, StoreError> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line))
        .filter(|(_, line)| !line.trim().is_empty());

    let Some((header_line, header)) = lines.next() else {
        return Err(legacy_error(1, "table is empty"));
    };

    let mut weeks: Vec<Week> = Vec::new();
    let mut seen = BTreeSet::new();
    for cell in header.split(',').skip(1).map(str::trim) {
        let week = cell
            .parse::<Week>()
            .ok()
            .filter(|week| *week >= 1)
            .ok_or_else(|| {
                legacy_error(header_line, format!("week column {:?} is not a positive number", cell))
            })?;
        if !seen.insert(week) {
            return Err(legacy_error(header_line, format!("week {} appears twice", week)));
        }
        weeks.push(week);
    }

    let mut names = Vec::new();
    let mut columns: Vec<Vec<Assignment>> = vec![Vec::new(); weeks.len()];
    for (line_number, line) in lines {
        let mut cells = line.split(',').map(str::trim);
        let name = cells.next().unwrap_or_default();
        if name.is_empty() {
            return Err(legacy_error(line_number, "row has no participant name"));
        }

        let partners: Vec<&str> = cells.collect();
        if partners.len() > weeks.len() {
            return Err(legacy_error(
                line_number,
                format!(
                    "row has {} week cells but the header has {}",
                    partners.len(),
                    weeks.len()
                ),
            ));
        }

        for (column, partner) in partners.iter().enumerate() {
            if !partner.is_empty() {
                columns[column].push(Assignment::new(name, *partner));
            }
        }
        names.push(name.to_string());
    }

    let mut by_week: Vec<(Week, Vec<Assignment>)> = weeks.into_iter().zip(columns).collect();
    by_week.sort_by_key(|(week, _)| *week);

    let mut records = vec![Record::Roster(RosterRecord {
        participants: names,
        recorded_at: None,
    })];
    records.extend(by_week.into_iter().map(|(week, assignments)| {
        Record::Week(WeekRecord {
            week,
            assignments,
            unpaired: None,
            recorded_at: None,
        })
    }));

    Ok(records)
}

/// Import a legacy table into an empty pairing record. Returns the number of
/// records written.
pub fn import_legacy(
    source: &Path,
    store: &HistoryStore,
    writer: &ResultWriter,
) -> Result<usize, StoreError> {
    if !store.read_records()?.is_empty() {
        return Err(StoreError::AlreadyInitialized(store.path().to_path_buf()));
    }

    let content = fs::read_to_string(source).map_err(|e| StoreError::io(source, e))?;
    let records = parse_legacy_table(&content)?;
    writer.append(&records)?;

    tracing::info!(
        "Imported {} records from legacy table {}",
        records.len(),
        source.display()
    );
    Ok(records.len())
}

fn legacy_error(line: usize, reason: impl Into<String>) -> StoreError {
    StoreError::LegacyFormat {
        line,
        reason: reason.into(),
    }
}
