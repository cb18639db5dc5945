//! Prompts for LLM-based bibliographic metadata inference.
//!
//! Callers can override the system prompt via
//! [`crate::config::RenameConfig::system_prompt`]; the constants here are
//! used only when no override is provided.

/// Default system prompt for the metadata oracle.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts \
bibliographic metadata from the opening text of documents.";

/// Instruction placed before the document snippet in the user message.
pub const METADATA_INSTRUCTION: &str = r#"Extract the Author, Title, and Year of publication from the following text. Return ONLY valid JSON exactly in the following format without any additional text or markdown:

{
  "Author": "Author Name",
  "Title": "Title of the Work",
  "Year": "Year of Publication"
}

"#;

/// Build the user message carrying the leading text of a document.
pub fn metadata_request(snippet: &str) -> String {
    format!("{METADATA_INSTRUCTION}{snippet}")
}
