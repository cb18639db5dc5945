//! Batch and per-document rename entry points.
//!
//! Documents are processed one at a time, in directory-listing order. Each
//! document runs its own small state machine:
//!
//! ```text
//! Extracting ──▶ Inferring ──▶ BuildingName ──▶ Moving ──▶ Moved | Skipped
//!     │                                           │
//!     └──────────────▶ Failed ◀───────────────────┘
//! ```
//!
//! Nothing that happens to one document stops the next one; only problems
//! with the batch itself (missing source directory, no provider) are fatal.

use crate::config::{DocumentKind, KindSelection, RenameConfig};
use crate::error::{DocumentError, RenameError};
use crate::output::{BatchSummary, DocumentOutcome, DocumentReport, DocumentStage, Metadata};
use crate::pipeline::oracle::{self, LlmOracle, MetadataOracle};
use crate::pipeline::resolve::{self, Placement};
use crate::pipeline::{citation, extract};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Rename every matching document in `config.source_dir`.
///
/// # Returns
/// `Ok(BatchSummary)` once every document has been attempted, even if some
/// failed (check `summary.failed`). An empty directory yields an empty summary.
///
/// # Errors
/// Returns `Err(RenameError)` only for fatal errors:
/// - Source directory missing or unreadable
/// - No LLM provider could be configured
pub async fn rename_directory(config: &RenameConfig) -> Result<BatchSummary, RenameError> {
    let total_start = Instant::now();
    info!(
        "Starting rename: '{}' -> '{}'",
        config.source_dir.display(),
        config.destination_dir.display()
    );

    // ── Step 1: Scan source directory ────────────────────────────────────
    let documents = scan_directory(&config.source_dir, config.kinds).await?;
    if documents.is_empty() {
        info!("No matching documents found in '{}'", config.source_dir.display());
        let summary = BatchSummary {
            total_duration_ms: total_start.elapsed().as_millis() as u64,
            ..Default::default()
        };
        if let Some(ref cb) = config.progress_callback {
            cb.on_batch_start(0);
            cb.on_batch_complete(&summary);
        }
        return Ok(summary);
    }
    info!("Found {} documents to process", documents.len());

    // ── Step 2: Get/create oracle ────────────────────────────────────────
    let oracle = resolve_oracle(config).await?;

    // ── Step 3: Process documents sequentially ───────────────────────────
    let total = documents.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut summary = BatchSummary::default();
    for (i, (path, kind)) in documents.iter().enumerate() {
        let index = i + 1;
        info!("Processing file {} of {}", index, total);
        if let Some(ref cb) = config.progress_callback {
            cb.on_document_start(index, total, path);
        }

        let report = rename_document(path, *kind, oracle.as_ref(), config).await;

        if let Some(ref cb) = config.progress_callback {
            cb.on_document_complete(index, total, &report);
        }
        summary.record(report);
    }

    summary.total_duration_ms = total_start.elapsed().as_millis() as u64;
    info!(
        "Rename complete: {} moved, {} skipped, {} failed, {}ms total",
        summary.moved, summary.skipped, summary.failed, summary.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(&summary);
    }

    Ok(summary)
}

/// Synchronous wrapper around [`rename_directory`].
///
/// Creates a temporary tokio runtime internally.
pub fn rename_directory_sync(config: &RenameConfig) -> Result<BatchSummary, RenameError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| RenameError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(rename_directory(config))
}

/// Run the full pipeline for a single document.
///
/// Always returns a report; per-document problems end up in
/// `report.outcome` rather than being propagated.
pub async fn rename_document(
    path: &Path,
    kind: DocumentKind,
    oracle: &dyn MetadataOracle,
    config: &RenameConfig,
) -> DocumentReport {
    let start = Instant::now();
    info!("Processing '{}'", path.display());

    let finish = |metadata: Option<Metadata>, base_name: Option<String>, outcome: DocumentOutcome| {
        DocumentReport {
            source: path.to_path_buf(),
            kind,
            metadata,
            base_name,
            outcome,
            duration_ms: start.elapsed().as_millis() as u64,
        }
    };

    // ── Extracting ───────────────────────────────────────────────────────
    debug!(stage = ?DocumentStage::Extracting, "{}", path.display());
    let snippet = extract::extract_leading_text(path, kind, config.max_chars).await;
    if snippet.trim().is_empty() {
        warn!("No text extracted from '{}'. Skipping.", path.display());
        return finish(
            None,
            None,
            DocumentOutcome::Failed {
                stage: DocumentStage::Extracting,
                error: DocumentError::NoText {
                    path: path.to_path_buf(),
                },
            },
        );
    }

    // ── Inferring ────────────────────────────────────────────────────────
    debug!(stage = ?DocumentStage::Inferring, "{}", path.display());
    let metadata = oracle::infer_metadata(oracle, &snippet, config.api_timeout_secs).await;
    info!("Inferred metadata: {:?}", metadata);

    // ── BuildingName ─────────────────────────────────────────────────────
    debug!(stage = ?DocumentStage::BuildingName, "{}", path.display());
    let base_name = citation::base_name_for(&metadata);
    let filename = resolve::resolve_filename(&base_name, kind.target_extension());

    // ── Moving ───────────────────────────────────────────────────────────
    debug!(stage = ?DocumentStage::Moving, "{} -> {}", path.display(), filename);
    let outcome = match resolve::move_into(path, &config.destination_dir, &filename).await {
        Ok(Placement::Moved(destination)) => {
            info!("Moved: '{}' -> '{}'", path.display(), destination.display());
            DocumentOutcome::Moved { destination }
        }
        Ok(Placement::Collision(existing)) => DocumentOutcome::Skipped { existing },
        Err(error) => {
            warn!("{}", error);
            DocumentOutcome::Failed {
                stage: DocumentStage::Moving,
                error,
            }
        }
    };

    finish(Some(metadata), Some(base_name), outcome)
}

/// List matching documents in `dir`, non-recursively, in listing order.
pub async fn scan_directory(
    dir: &Path,
    kinds: KindSelection,
) -> Result<Vec<(PathBuf, DocumentKind)>, RenameError> {
    let unreadable = |e: std::io::Error| RenameError::SourceDirUnreadable {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            RenameError::SourceDirNotFound {
                path: dir.to_path_buf(),
            }
        } else {
            unreadable(e)
        }
    })?;

    let mut documents = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(unreadable)? {
        let path = entry.path();
        let Some(kind) = DocumentKind::from_path(&path) else {
            continue;
        };
        if !kinds.accepts(kind) {
            continue;
        }
        // Follows symlinks, so a link to a regular file counts.
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => documents.push((path, kind)),
            Ok(_) => {}
            Err(e) => warn!("Cannot stat '{}': {}", path.display(), e),
        }
    }

    debug!("Scanned {} matching documents", documents.len());
    Ok(documents)
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the metadata oracle: a pre-built oracle wins, otherwise wrap
/// whichever LLM provider [`resolve_provider`] finds.
async fn resolve_oracle(config: &RenameConfig) -> Result<Arc<dyn MetadataOracle>, RenameError> {
    if let Some(ref oracle) = config.oracle {
        return Ok(Arc::clone(oracle));
    }
    let provider = resolve_provider(config)?;
    Ok(Arc::new(LlmOracle::new(provider, config)))
}

/// Instantiate a named provider with the given model.
fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, RenameError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        RenameError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`)
/// 2. **Named provider + model** (`config.provider_name`)
/// 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`)
/// 4. **OpenAI** when `OPENAI_API_KEY` is set
/// 5. **Full auto-detection** (`ProviderFactory::from_env`)
fn resolve_provider(config: &RenameConfig) -> Result<Arc<dyn LLMProvider>, RenameError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        return create_provider(name, config.model_or_default());
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", config.model_or_default());
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| RenameError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
