// Service exports
pub mod history;
pub mod legacy;
pub mod writer;

pub use history::{parse_records, HistoryStore, LoadedHistory};
pub use legacy::{import_legacy, parse_legacy_table};
pub use writer::{roster_record, week_record, ResultWriter};
