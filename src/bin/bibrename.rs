//! CLI binary for edgequake-bibrename.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `RenameConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_bibrename::{
    rename_directory, BatchSummary, DocumentOutcome, DocumentReport, KindSelection, RenameConfig,
    RenameProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar for the batch plus a log line per
/// document as it reaches its terminal state.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Renaming");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl RenameProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Found {total_documents} documents…"))
        ));
    }

    fn on_document_start(&self, _index: usize, _total: usize, path: &Path) {
        self.bar.set_message(file_name(path));
    }

    fn on_document_complete(&self, index: usize, total: usize, report: &DocumentReport) {
        let source = file_name(&report.source);
        let elapsed = dim(&format!("{:.1}s", report.duration_ms as f64 / 1000.0));
        let line = match &report.outcome {
            DocumentOutcome::Moved { destination } => format!(
                "  {} {:>3}/{:<3}  {}  →  {}  {}",
                green("✓"),
                index,
                total,
                dim(&source),
                file_name(destination),
                elapsed
            ),
            DocumentOutcome::Skipped { existing } => format!(
                "  {} {:>3}/{:<3}  {}  {}  {}",
                yellow("≡"),
                index,
                total,
                source,
                yellow(&format!("exists: {}", file_name(existing))),
                elapsed
            ),
            DocumentOutcome::Failed { error, .. } => format!(
                "  {} {:>3}/{:<3}  {}  {}  {}",
                red("✗"),
                index,
                total,
                source,
                red(&error.to_string()),
                elapsed
            ),
        };
        self.bar.println(line);
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _summary: &BatchSummary) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Rename every PDF and Markdown file in ./inbox into ./library
  bibrename inbox library

  # PDFs only, with a specific model
  bibrename --kind pdf --model gpt-4.1-mini inbox library

  # Use a local model through Ollama
  bibrename --provider ollama --model llama3.2 inbox library

  # Machine-readable batch report
  bibrename --json inbox library > report.json

NAMING:
  Single author      Jane Doe 2021--On Widgets.pdf
  Several authors    Smith et al. 2020--Study.pdf
  No author          NULL-2019-Untitled Notes.md

  A file whose name already exists in the destination is left where it is.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to the pdfium shared library used for PDF text
"#;

/// Rename PDF and Markdown documents to `<Author> <Year>--<Title>` using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "bibrename",
    version,
    about = "Rename PDF and Markdown documents to `<Author> <Year>--<Title>` using an LLM",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory containing the documents to rename (not recursed).
    #[arg(env = "BIBRENAME_SOURCE")]
    source: PathBuf,

    /// Directory the renamed documents are moved into. Created if missing.
    #[arg(env = "BIBRENAME_DESTINATION")]
    destination: PathBuf,

    /// Document kinds to process: pdf, markdown, all.
    #[arg(long, env = "BIBRENAME_KIND", value_enum, default_value = "all")]
    kind: KindArg,

    /// LLM model ID (default: gpt-4o-mini).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// Characters of leading text sent to the model.
    #[arg(long, env = "BIBRENAME_MAX_CHARS", default_value_t = 3000)]
    max_chars: usize,

    /// Max LLM output tokens per document.
    #[arg(long, env = "BIBRENAME_MAX_TOKENS", default_value_t = 512)]
    max_tokens: usize,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "BIBRENAME_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Per-document LLM call timeout in seconds.
    #[arg(long, env = "BIBRENAME_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "BIBRENAME_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Print the batch report as JSON on stdout.
    #[arg(long, env = "BIBRENAME_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "BIBRENAME_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "BIBRENAME_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "BIBRENAME_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum KindArg {
    Pdf,
    Markdown,
    All,
}

impl From<KindArg> for KindSelection {
    fn from(v: KindArg) -> Self {
        match v {
            KindArg::Pdf => KindSelection::Pdf,
            KindArg::Markdown => KindSelection::Markdown,
            KindArg::All => KindSelection::All,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar carries the per-document feedback, so INFO logs are
    // suppressed while it is shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli, show_progress).await?;

    // ── Run batch ────────────────────────────────────────────────────────
    let summary = rename_directory(&config).await.context("Rename failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialise report")?;
        println!("{json}");
    }

    if !cli.quiet {
        print_summary(&summary, &cli.destination);
    }

    Ok(())
}

/// Map CLI args to `RenameConfig`.
async fn build_config(cli: &Cli, show_progress: bool) -> Result<RenameConfig> {
    let mut builder = RenameConfig::builder(&cli.source, &cli.destination)
        .kinds(cli.kind.clone().into())
        .max_chars(cli.max_chars)
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider);
    }
    if show_progress {
        builder = builder.progress_callback(CliProgressCallback::new());
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(summary: &BatchSummary, destination: &Path) {
    if summary.total() == 0 {
        eprintln!("{} No matching documents found", cyan("◆"));
        return;
    }

    let mark = if summary.failed == 0 {
        green("✔")
    } else if summary.failed == summary.total() {
        red("✘")
    } else {
        cyan("⚠")
    };
    eprintln!(
        "{}  {} moved  {} skipped  {} failed  {}ms  →  {}",
        mark,
        bold(&summary.moved.to_string()),
        summary.skipped,
        summary.failed,
        summary.total_duration_ms,
        bold(&destination.display().to_string()),
    );
    if summary.fallbacks > 0 {
        eprintln!(
            "   {}",
            dim(&format!(
                "{} documents named from the NULL fallback record",
                summary.fallbacks
            ))
        );
    }
}
