//! Error types for the edgequake-bibrename library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`RenameError`] — **Fatal**: the batch cannot proceed at all (source
//!   directory missing, provider not configured, bad configuration).
//!   Returned as `Err(RenameError)` from [`crate::rename::rename_directory`].
//!
//! * [`DocumentError`] — **Non-fatal**: a single document failed (no
//!   readable text, move refused by the filesystem) but the rest of the
//!   batch is unaffected. Stored inside [`crate::output::DocumentOutcome`]
//!   so callers can aggregate per-document results.
//!
//! A third type, [`OracleError`], never leaves the pipeline: every oracle
//! failure is converted into [`crate::output::Metadata::Fallback`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-bibrename library.
#[derive(Debug, Error)]
pub enum RenameError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source directory does not exist.
    #[error("Source directory not found: '{path}'\nCheck the path exists and is a directory.")]
    SourceDirNotFound { path: PathBuf },

    /// Source directory exists but could not be listed.
    #[error("Failed to list source directory '{path}': {source}")]
    SourceDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document.
///
/// The document is left where it was; the batch continues with the next one.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentError {
    /// No usable text could be read from the start of the document.
    #[error("No text extracted from '{path}'")]
    NoText { path: PathBuf },

    /// The destination directory could not be created.
    #[error("Failed to create destination directory '{dir}': {detail}")]
    CreateDirFailed { dir: PathBuf, detail: String },

    /// The rename (or cross-device copy) was refused by the filesystem.
    #[error("Failed to move '{from}' -> '{to}': {detail}")]
    MoveFailed {
        from: PathBuf,
        to: PathBuf,
        detail: String,
    },
}

/// Failure of the metadata oracle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    /// Network, authentication, or provider error.
    #[error("oracle transport error: {0}")]
    Transport(String),

    /// The call did not return within the configured timeout.
    #[error("oracle call timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The response was not a JSON object with the expected keys.
    #[error("malformed oracle response: {0}")]
    Malformed(String),
}
