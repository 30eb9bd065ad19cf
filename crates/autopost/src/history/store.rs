//! CSV-backed history store.

use std::fs::OpenOptions;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};

use crate::errors::AutopostResult;

use super::entry::HistoryEntry;

/// Column names, in file order.
pub const HEADER: [&str; 4] = ["timestamp", "posted_text", "published_url", "topic"];

/// Append-only history file.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry, creating a header-only file if none exists.
    ///
    /// Blank lines are skipped and rows without a timestamp or text are dropped.
    pub fn load(&self) -> AutopostResult<Vec<HistoryEntry>> {
        if self.needs_header()? {
            self.initialize()?;
            tracing::info!(path = %self.path.display(), "Created history file");
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let columns = Columns::from_headers(reader.headers()?);

        let mut entries = Vec::new();
        let mut dropped = 0usize;
        for record in reader.records() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable history row");
                    dropped += 1;
                    continue;
                }
            };
            if record.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            match columns.entry(&record) {
                Some(entry) => entries.push(entry),
                None => dropped += 1,
            }
        }

        tracing::debug!(
            path = %self.path.display(),
            loaded = entries.len(),
            dropped,
            "Loaded history"
        );
        Ok(entries)
    }

    /// Append one entry to the end of the file.
    pub fn append(&self, entry: &HistoryEntry) -> AutopostResult<()> {
        if self.needs_header()? {
            self.initialize()?;
        }

        let mut file = OpenOptions::new().read(true).append(true).open(&self.path)?;

        // A hand-edited file may lack the trailing newline.
        if file.metadata()?.len() > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::End(-1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                file.write_all(b"\n")?;
            }
        }

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .quote_style(QuoteStyle::Always)
            .from_writer(file);
        writer.write_record([
            entry.timestamp.as_str(),
            entry.posted_text.as_str(),
            entry.published_url.as_deref().unwrap_or(""),
            entry.topic.as_deref().unwrap_or(""),
        ])?;
        writer.flush()?;

        Ok(())
    }

    /// Missing and zero-length files both lack a header row.
    fn needs_header(&self) -> AutopostResult<bool> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() == 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(true),
            Err(e) => Err(e.into()),
        }
    }

    fn initialize(&self) -> AutopostResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .from_path(&self.path)?;
        writer.write_record(HEADER)?;
        writer.flush()?;
        Ok(())
    }
}

/// Column positions resolved from the header row.
struct Columns {
    timestamp: usize,
    posted_text: usize,
    published_url: usize,
    topic: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |name: &str, fallback: usize| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .unwrap_or(fallback)
        };
        Self {
            timestamp: find(HEADER[0], 0),
            posted_text: find(HEADER[1], 1),
            published_url: find(HEADER[2], 2),
            topic: find(HEADER[3], 3),
        }
    }

    fn entry(&self, record: &StringRecord) -> Option<HistoryEntry> {
        let optional = |idx: usize| {
            record
                .get(idx)
                .filter(|v| !v.trim().is_empty())
                .map(String::from)
        };

        let timestamp = optional(self.timestamp)?;
        let posted_text = optional(self.posted_text)?;

        Some(HistoryEntry {
            timestamp,
            posted_text,
            published_url: optional(self.published_url),
            topic: optional(self.topic),
        })
    }
}
