//! # edgequake-bibrename
//!
//! Rename PDF and Markdown documents to a bibliographic filename,
//! `<Author> <Year>--<Title>.<ext>`, using a language model to guess the
//! metadata from each document's opening text.
//!
//! The model only supplies a best-effort `{Author, Title, Year}` record.
//! Everything after that is deterministic: illegal characters are stripped,
//! author lists are split and normalised, an `et al.` citation is built for
//! multi-author works, and the file is moved into the destination directory
//! unless a file with that name is already there.
//!
//! ## Pipeline Overview
//!
//! ```text
//! document
//!  │
//!  ├─ 1. Extract   first page (PDF) or first N chars (Markdown)
//!  ├─ 2. Infer     one LLM call → {Author, Title, Year} or Fallback
//!  ├─ 3. Sanitize  drop \ / * ? : " < > |
//!  ├─ 4. Cite      "Doe 2021--Title", "Smith et al. 2020--Study", "NULL-2019-X"
//!  └─ 5. Move      append extension, skip on collision, rename
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_bibrename::{rename_directory, RenameConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let config = RenameConfig::builder("inbox", "library").build()?;
//!     let summary = rename_directory(&config).await?;
//!     eprintln!(
//!         "{} moved, {} skipped, {} failed",
//!         summary.moved, summary.skipped, summary.failed
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `bibrename` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod rename;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DocumentKind, KindSelection, RenameConfig, RenameConfigBuilder, DEFAULT_MODEL};
pub use error::{DocumentError, OracleError, RenameError};
pub use output::{
    BatchSummary, DocumentOutcome, DocumentReport, DocumentStage, Metadata, RawMetadata,
};
pub use pipeline::oracle::{LlmOracle, MetadataOracle};
pub use progress::{NoopProgressCallback, ProgressCallback, RenameProgressCallback};
pub use rename::{rename_directory, rename_directory_sync, rename_document, scan_directory};
