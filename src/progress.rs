//! Progress-callback trait for per-document rename events.
//!
//! Inject an [`Arc<dyn RenameProgressCallback>`] via
//! [`crate::config::RenameConfigBuilder::progress_callback`] to receive
//! events as the batch processes each document.
//!
//! # Example
//!
//! ```rust
//! use edgequake_bibrename::{DocumentReport, RenameConfig, RenameProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     moved: Arc<AtomicUsize>,
//! }
//!
//! impl RenameProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, _index: usize, _total: usize, report: &DocumentReport) {
//!         if report.outcome.is_moved() {
//!             self.moved.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { moved: Arc::new(AtomicUsize::new(0)) });
//! let config = RenameConfig::builder("inbox", "library")
//!     .progress_callback(counter as Arc<dyn RenameProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{BatchSummary, DocumentReport};
use std::path::Path;
use std::sync::Arc;

/// Called by the batch driver as it processes each document.
///
/// Documents are processed one at a time, so events arrive strictly in
/// order. All methods have default no-op implementations.
pub trait RenameProgressCallback: Send + Sync {
    /// Called once after the source directory has been scanned.
    fn on_batch_start(&self, total_documents: usize) {
        let _ = total_documents;
    }

    /// Called before text extraction starts for a document.
    ///
    /// # Arguments
    /// * `index`: 1-indexed position in the batch
    /// * `total`: number of documents in the batch
    /// * `path`: the document being processed
    fn on_document_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called when a document reaches a terminal state (moved, skipped or failed).
    fn on_document_complete(&self, index: usize, total: usize, report: &DocumentReport) {
        let _ = (index, total, report);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, summary: &BatchSummary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl RenameProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::RenameConfig`].
pub type ProgressCallback = Arc<dyn RenameProgressCallback>;
