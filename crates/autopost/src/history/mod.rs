//! Append-only history of published posts.
//!
//! The history file is the deduplication signal for topic discovery and the
//! audit trail of every run. It is read in full once per run and appended to
//! exactly once at the end.

mod entry;
mod store;

pub use entry::{History, HistoryEntry, RunFailure, TIMESTAMP_FORMAT};
pub use store::{HistoryStore, HEADER};
