//! Pipeline stages for renaming one document.
//!
//! Each submodule implements exactly one step, so every rule can be tested
//! without touching the filesystem or a model.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ oracle ──▶ sanitize ──▶ authors ──▶ citation ──▶ resolve
//! (text)      (LLM)      (fields)     (split)     (base name)  (ext + move)
//! ```
//!
//! 1. [`extract`]: bounded leading text of a PDF or Markdown file
//! 2. [`oracle`]: the only stage with network I/O; never fails, falls
//!    back to [`crate::output::Metadata::Fallback`]
//! 3. [`sanitize`]: strip filesystem-illegal characters
//! 4. [`authors`]: split and normalise author names
//! 5. [`citation`]: `<Citation> <Year>--<Title>` or `NULL-<Year>-<Title>`
//! 6. [`resolve`]: extension resolution and the first-write-wins move

pub mod authors;
pub mod citation;
pub mod extract;
pub mod oracle;
pub mod resolve;
pub mod sanitize;
