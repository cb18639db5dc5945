//! Configuration types for a rename batch.
//!
//! All batch behaviour is controlled through [`RenameConfig`], built via its
//! [`RenameConfigBuilder`]. The builder keeps the two required paths explicit
//! and lets callers rely on documented defaults for everything else.

use crate::error::RenameError;
use crate::pipeline::oracle::MetadataOracle;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Model used when neither the caller nor the environment names one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Configuration for a rename batch.
///
/// # Example
/// ```rust
/// use edgequake_bibrename::{KindSelection, RenameConfig};
///
/// let config = RenameConfig::builder("inbox", "library")
///     .kinds(KindSelection::Pdf)
///     .max_chars(2000)
///     .model("gpt-4o-mini")
///     .build()
///     .unwrap();
/// assert_eq!(config.max_chars, 2000);
/// ```
#[derive(Clone)]
pub struct RenameConfig {
    /// Directory scanned (non-recursively) for documents.
    pub source_dir: PathBuf,

    /// Directory the renamed documents are moved into. Created on demand.
    pub destination_dir: PathBuf,

    /// Which document kinds to pick up from the source directory. Default: all.
    pub kinds: KindSelection,

    /// Maximum characters of leading text handed to the oracle. Default: 3000.
    ///
    /// Title pages and front matter almost always fit in the first few
    /// thousand characters; sending more only costs tokens.
    pub max_chars: usize,

    /// LLM model identifier, e.g. "gpt-4o-mini". If None, uses [`DEFAULT_MODEL`].
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed LLM provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed oracle. Takes precedence over every provider setting.
    pub oracle: Option<Arc<dyn MetadataOracle>>,

    /// Sampling temperature for the oracle call. Default: 0.0.
    pub temperature: f32,

    /// Maximum tokens the oracle may generate. Default: 512.
    pub max_tokens: usize,

    /// Per-oracle-call timeout in seconds. Default: 60.
    pub api_timeout_secs: u64,

    /// Custom system prompt. If None, uses the built-in default.
    pub system_prompt: Option<String>,

    /// Optional progress callback invoked per document.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for RenameConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenameConfig")
            .field("source_dir", &self.source_dir)
            .field("destination_dir", &self.destination_dir)
            .field("kinds", &self.kinds)
            .field("max_chars", &self.max_chars)
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("oracle", &self.oracle.as_ref().map(|_| "<dyn MetadataOracle>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .finish()
    }
}

impl RenameConfig {
    /// Create a new builder. Both directories are required.
    pub fn builder(
        source_dir: impl Into<PathBuf>,
        destination_dir: impl Into<PathBuf>,
    ) -> RenameConfigBuilder {
        RenameConfigBuilder {
            config: Self {
                source_dir: source_dir.into(),
                destination_dir: destination_dir.into(),
                kinds: KindSelection::default(),
                max_chars: 3000,
                model: None,
                provider_name: None,
                provider: None,
                oracle: None,
                temperature: 0.0,
                max_tokens: 512,
                api_timeout_secs: 60,
                system_prompt: None,
                progress_callback: None,
            },
        }
    }

    /// The model that will be requested from the provider.
    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

/// Builder for [`RenameConfig`].
pub struct RenameConfigBuilder {
    config: RenameConfig,
}

impl RenameConfigBuilder {
    pub fn kinds(mut self, kinds: KindSelection) -> Self {
        self.config.kinds = kinds;
        self
    }

    pub fn max_chars(mut self, n: usize) -> Self {
        self.config.max_chars = n;
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn oracle(mut self, oracle: Arc<dyn MetadataOracle>) -> Self {
        self.config.oracle = Some(oracle);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenameConfig, RenameError> {
        let c = &self.config;
        if c.source_dir.as_os_str().is_empty() {
            return Err(RenameError::InvalidConfig(
                "source directory must not be empty".into(),
            ));
        }
        if c.destination_dir.as_os_str().is_empty() {
            return Err(RenameError::InvalidConfig(
                "destination directory must not be empty".into(),
            ));
        }
        if c.max_chars == 0 {
            return Err(RenameError::InvalidConfig("max_chars must be ≥ 1".into()));
        }
        if c.api_timeout_secs == 0 {
            return Err(RenameError::InvalidConfig(
                "API timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The document formats the renamer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Text comes from the first page.
    Pdf,
    /// Text comes from the first `max_chars` characters of the file.
    Markdown,
}

impl DocumentKind {
    /// Extension appended to the synthesised filename, dot included.
    pub fn target_extension(self) -> &'static str {
        match self {
            DocumentKind::Pdf => ".pdf",
            DocumentKind::Markdown => ".md",
        }
    }

    /// Source extensions recognised for this kind, without the dot.
    pub fn source_extensions(self) -> &'static [&'static str] {
        match self {
            DocumentKind::Pdf => &["pdf"],
            DocumentKind::Markdown => &["md", "markdown"],
        }
    }

    /// Classify a path by its extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        [DocumentKind::Pdf, DocumentKind::Markdown]
            .into_iter()
            .find(|kind| kind.source_extensions().contains(&ext.as_str()))
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => f.write_str("pdf"),
            DocumentKind::Markdown => f.write_str("markdown"),
        }
    }
}

/// Which document kinds a batch picks up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KindSelection {
    /// PDF files only.
    Pdf,
    /// Markdown files only.
    Markdown,
    /// Both PDF and Markdown files (default).
    #[default]
    All,
}

impl KindSelection {
    pub fn accepts(self, kind: DocumentKind) -> bool {
        match self {
            KindSelection::All => true,
            KindSelection::Pdf => kind == DocumentKind::Pdf,
            KindSelection::Markdown => kind == DocumentKind::Markdown,
        }
    }
}
