use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building the pairing graph or computing a matching
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Matching infeasible: {0}")]
    MatchingInfeasible(String),
}

impl PairingError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub(crate) fn infeasible(message: impl Into<String>) -> Self {
        Self::MatchingInfeasible(message.into())
    }
}

/// Errors that can occur when reading or appending the pairing record
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed record on line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("No roster recorded in {0}")]
    MissingRoster(PathBuf),

    #[error("Invalid participant name: {0:?}")]
    InvalidParticipant(String),

    #[error("Legacy table error on line {line}: {reason}")]
    LegacyFormat { line: usize, reason: String },

    #[error("Refusing to import into {0}: it already contains records")]
    AlreadyInitialized(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Non-fatal problems found while loading the pairing record.
///
/// These never block a round; they are returned with the loaded data and logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataWarning {
    #[error("{name} appears in the pairing history but not in the roster")]
    UnknownParticipant { name: String },

    #[error("{name} is on the roster but has never been paired")]
    NeverPaired { name: String },

    #[error("week {week}: {name} is assigned to themself, ignored")]
    SelfPairing { week: u32, name: String },

    #[error("week {week}: {name} is assigned to both {first} and {second}")]
    AsymmetricAssignment {
        week: u32,
        name: String,
        first: String,
        second: String,
    },

    #[error("week {week} is recorded more than once, entries merged")]
    DuplicateWeek { week: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failed_invariant() {
        let err = PairingError::invalid("roster contains duplicate entries: sam");
        assert_eq!(
            err.to_string(),
            "Invalid input: roster contains duplicate entries: sam"
        );

        let warning = DataWarning::UnknownParticipant {
            name: "kim".to_string(),
        };
        assert!(warning.to_string().contains("not in the roster"));
    }
}
