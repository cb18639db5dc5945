//! Metadata inference: ask a language model for `{Author, Title, Year}`.
//!
//! The oracle is the pipeline's only network call. It is bounded by an
//! explicit timeout, never retried, and never allowed to fail a document:
//! transport errors, timeouts and unparseable replies all collapse into
//! [`Metadata::Fallback`].
//!
//! [`MetadataOracle`] is the seam between the pipeline and the model. The
//! production implementation is [`LlmOracle`]; tests substitute a canned
//! responder.

use crate::config::RenameConfig;
use crate::error::OracleError;
use crate::output::{Metadata, RawMetadata, NULL_FIELD};
use crate::prompts::{metadata_request, DEFAULT_SYSTEM_PROMPT};
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Something that turns a text snippet into a raw model reply.
#[async_trait]
pub trait MetadataOracle: Send + Sync {
    /// Return the model's raw text reply for `snippet`.
    async fn complete(&self, snippet: &str) -> Result<String, OracleError>;
}

/// [`MetadataOracle`] backed by an edgequake-llm provider.
pub struct LlmOracle {
    provider: Arc<dyn LLMProvider>,
    system_prompt: String,
    options: CompletionOptions,
}

impl LlmOracle {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &RenameConfig) -> Self {
        Self {
            provider,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            options: build_options(config),
        }
    }
}

#[async_trait]
impl MetadataOracle for LlmOracle {
    async fn complete(&self, snippet: &str) -> Result<String, OracleError> {
        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user(metadata_request(snippet)),
        ];
        let response = self
            .provider
            .chat(&messages, Some(&self.options))
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        debug!(
            "Oracle: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

/// Build `CompletionOptions` from the rename config.
fn build_options(config: &RenameConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Ask `oracle` for metadata, substituting [`Metadata::Fallback`] on any failure.
pub async fn infer_metadata(
    oracle: &dyn MetadataOracle,
    snippet: &str,
    timeout_secs: u64,
) -> Metadata {
    let start = Instant::now();
    let reply = tokio::time::timeout(Duration::from_secs(timeout_secs), oracle.complete(snippet))
        .await
        .unwrap_or(Err(OracleError::Timeout { secs: timeout_secs }));

    let parsed = reply.and_then(|raw| {
        debug!("Oracle reply after {:?}: {}", start.elapsed(), raw);
        parse_response(&raw)
    });

    match parsed {
        Ok(raw) => raw.into(),
        Err(e) => {
            warn!("Metadata inference failed, using fallback record: {}", e);
            Metadata::Fallback
        }
    }
}

// ── Response parsing ─────────────────────────────────────────────────────────

static RE_CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"```(?:json)?").unwrap());

const AUTHOR_KEY: &str = "Author";
const TITLE_KEY: &str = "Title";
const YEAR_KEY: &str = "Year";

/// Remove code-fence markers anywhere in the reply.
pub fn strip_code_fences(reply: &str) -> String {
    RE_CODE_FENCE.replace_all(reply, "").trim().to_string()
}

/// Parse a model reply into a [`RawMetadata`].
///
/// The reply must be a JSON object carrying at least one of `Author`,
/// `Title`, `Year`. A missing or `null` key becomes `"NULL"`; numbers are
/// accepted as their decimal text; every value is trimmed.
pub fn parse_response(reply: &str) -> Result<RawMetadata, OracleError> {
    let cleaned = strip_code_fences(reply);
    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| OracleError::Malformed(e.to_string()))?;
    let Value::Object(obj) = value else {
        return Err(OracleError::Malformed("reply is not a JSON object".into()));
    };
    if ![AUTHOR_KEY, TITLE_KEY, YEAR_KEY]
        .iter()
        .any(|k| obj.contains_key(*k))
    {
        return Err(OracleError::Malformed(
            "reply has none of Author, Title, Year".into(),
        ));
    }

    Ok(RawMetadata {
        author: field(&obj, AUTHOR_KEY)?,
        title: field(&obj, TITLE_KEY)?,
        year: field(&obj, YEAR_KEY)?,
    })
}

fn field(obj: &Map<String, Value>, key: &str) -> Result<String, OracleError> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(NULL_FIELD.to_string()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(OracleError::Malformed(format!(
            "{key} is not a string: {other}"
        ))),
    }
}
