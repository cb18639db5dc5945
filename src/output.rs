//! Result types produced by the rename pipeline.
//!
//! Every type here derives `Serialize` so the CLI can dump a whole batch as
//! JSON with `--json`.

use crate::config::DocumentKind;
use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Placeholder written for any metadata field the oracle could not supply.
pub const NULL_FIELD: &str = "NULL";

/// The oracle's best-effort record, exactly as parsed from its JSON reply.
///
/// Fields are trimmed free text; none of them is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMetadata {
    pub author: String,
    pub title: String,
    pub year: String,
}

/// Metadata for one document.
///
/// `Fallback` replaces the `"NULL"` sentinel record: it is produced whenever
/// the oracle failed or answered with something unparseable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Metadata {
    Valid {
        author: String,
        title: String,
        year: String,
    },
    Fallback,
}

impl Metadata {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Metadata::Fallback)
    }

    /// `(author, title, year)`, with `"NULL"` in every slot for [`Metadata::Fallback`].
    pub fn fields(&self) -> (&str, &str, &str) {
        match self {
            Metadata::Valid {
                author,
                title,
                year,
            } => (author, title, year),
            Metadata::Fallback => (NULL_FIELD, NULL_FIELD, NULL_FIELD),
        }
    }
}

impl From<RawMetadata> for Metadata {
    fn from(raw: RawMetadata) -> Self {
        Metadata::Valid {
            author: raw.author,
            title: raw.title,
            year: raw.year,
        }
    }
}

/// Where a document was in its pipeline when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentStage {
    Extracting,
    Inferring,
    BuildingName,
    Moving,
}

/// Terminal state of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DocumentOutcome {
    /// The document now lives at `destination`.
    Moved { destination: PathBuf },
    /// A file already occupies the resolved name; the source was not touched.
    Skipped { existing: PathBuf },
    /// The document was left in place.
    Failed {
        stage: DocumentStage,
        error: DocumentError,
    },
}

impl DocumentOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, DocumentOutcome::Moved { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, DocumentOutcome::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, DocumentOutcome::Failed { .. })
    }
}

/// Everything the pipeline learned about one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    /// Path of the document as found in the source directory.
    pub source: PathBuf,
    pub kind: DocumentKind,
    /// `None` when extraction failed and the oracle was never asked.
    pub metadata: Option<Metadata>,
    /// Citation-formatted stem, before extension resolution.
    pub base_name: Option<String>,
    pub outcome: DocumentOutcome,
    pub duration_ms: u64,
}

/// Aggregate result of a directory run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// One report per matching file, in processing order.
    pub reports: Vec<DocumentReport>,
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Documents whose metadata came from the fallback record.
    pub fallbacks: usize,
    pub total_duration_ms: u64,
}

impl BatchSummary {
    /// Append a report and update the counters.
    pub fn record(&mut self, report: DocumentReport) {
        match report.outcome {
            DocumentOutcome::Moved { .. } => self.moved += 1,
            DocumentOutcome::Skipped { .. } => self.skipped += 1,
            DocumentOutcome::Failed { .. } => self.failed += 1,
        }
        if report.metadata.as_ref().is_some_and(Metadata::is_fallback) {
            self.fallbacks += 1;
        }
        self.reports.push(report);
    }

    pub fn total(&self) -> usize {
        self.reports.len()
    }

    /// `true` when every document reached a terminal outcome.
    ///
    /// Per-document failures do not make the run unsuccessful; only a fatal
    /// [`crate::error::RenameError`] does, and that never yields a summary.
    pub fn is_success(&self) -> bool {
        self.moved + self.skipped + self.failed == self.reports.len()
    }
}
