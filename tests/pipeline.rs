//! Integration tests for edgequake-bibrename.
//!
//! Every test here runs against a scripted [`MetadataOracle`] and temporary
//! directories, so no network access or API key is needed. The PDF and
//! live-model tests at the bottom are gated behind `E2E_ENABLED`:
//!
//!   E2E_ENABLED=1 PDFIUM_LIB_PATH=/path/to/libpdfium cargo test --test pipeline -- --nocapture

use async_trait::async_trait;
use edgequake_bibrename::{
    rename_directory, rename_directory_sync, rename_document, BatchSummary, DocumentError,
    DocumentKind, DocumentOutcome, DocumentReport, DocumentStage, KindSelection, Metadata,
    MetadataOracle, OracleError, RenameConfig, RenameError, RenameProgressCallback,
};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

/// Replies chosen by a marker string found in the snippet.
struct ScriptedOracle {
    script: Vec<(&'static str, Result<String, OracleError>)>,
    calls: AtomicUsize,
}

impl ScriptedOracle {
    fn new(script: Vec<(&'static str, Result<String, OracleError>)>) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataOracle for ScriptedOracle {
    async fn complete(&self, snippet: &str) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .iter()
            .find(|(marker, _)| snippet.contains(marker))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| Err(OracleError::Transport("no scripted reply".into())))
    }
}

fn json_reply(author: &str, title: &str, year: &str) -> Result<String, OracleError> {
    Ok(serde_json::json!({ "Author": author, "Title": title, "Year": year }).to_string())
}

struct Dirs {
    _tmp: TempDir,
    source: PathBuf,
    dest: PathBuf,
}

fn dirs() -> Dirs {
    let tmp = TempDir::new().unwrap();
    let source = tmp.path().join("inbox");
    let dest = tmp.path().join("library");
    std::fs::create_dir(&source).unwrap();
    Dirs {
        _tmp: tmp,
        source,
        dest,
    }
}

fn config(d: &Dirs, oracle: Arc<ScriptedOracle>) -> RenameConfig {
    RenameConfig::builder(&d.source, &d.dest)
        .oracle(oracle)
        .api_timeout_secs(5)
        .build()
        .unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn report_for<'a>(summary: &'a BatchSummary, name: &str) -> &'a DocumentReport {
    summary
        .reports
        .iter()
        .find(|r| r.source.file_name().unwrap() == name)
        .unwrap_or_else(|| panic!("no report for {name}"))
}

// ── Single-document pipeline ─────────────────────────────────────────────────

#[tokio::test]
async fn single_author_markdown_is_moved_under_citation_name() {
    let d = dirs();
    let source = write(&d.source, "draft.md", "# On Widgets\n\nJane Doe, 2021\n");
    let oracle = ScriptedOracle::new(vec![("On Widgets", json_reply("Jane Doe", "On Widgets", "2021"))]);
    let cfg = config(&d, oracle.clone());

    let report = rename_document(&source, DocumentKind::Markdown, oracle.as_ref(), &cfg).await;

    let expected = d.dest.join("Jane Doe 2021--On Widgets.md");
    assert_eq!(
        report.outcome,
        DocumentOutcome::Moved {
            destination: expected.clone()
        }
    );
    assert_eq!(report.base_name.as_deref(), Some("Jane Doe 2021--On Widgets"));
    assert!(expected.exists());
    assert!(!source.exists());
    assert_eq!(oracle.calls(), 1);
}

#[tokio::test]
async fn last_first_author_is_reformatted() {
    let d = dirs();
    let source = write(&d.source, "a.md", "Doe, Jane. On Widgets. 2021.");
    let oracle = ScriptedOracle::new(vec![("Doe", json_reply("Doe, Jane", "On Widgets", "2021"))]);
    let cfg = config(&d, oracle.clone());

    let report = rename_document(&source, DocumentKind::Markdown, oracle.as_ref(), &cfg).await;
    assert!(report.outcome.is_moved());
    assert!(d.dest.join("Jane Doe 2021--On Widgets.md").exists());
}

#[tokio::test]
async fn multi_author_uses_et_al() {
    let d = dirs();
    let source = write(&d.source, "study.md", "Study\nSmith and Doe\n2020");
    let oracle = ScriptedOracle::new(vec![(
        "Study",
        json_reply("Smith, J. and Doe, A.", "Study", "2020"),
    )]);
    let cfg = config(&d, oracle.clone());

    rename_document(&source, DocumentKind::Markdown, oracle.as_ref(), &cfg).await;
    assert!(d.dest.join("Smith et al. 2020--Study.md").exists());
}

#[tokio::test]
async fn illegal_characters_are_stripped_from_every_field() {
    let d = dirs();
    let source = write(&d.source, "q.md", "Why? A/B testing");
    let oracle = ScriptedOracle::new(vec![(
        "Why",
        json_reply("Jane <Doe>", "Why? A/B Testing: A Primer", "\"2021\""),
    )]);
    let cfg = config(&d, oracle.clone());

    rename_document(&source, DocumentKind::Markdown, oracle.as_ref(), &cfg).await;
    assert!(d.dest.join("Jane Doe 2021--Why AB Testing A Primer.md").exists());
}

#[tokio::test]
async fn fenced_reply_is_accepted() {
    let d = dirs();
    let source = write(&d.source, "f.md", "Fenced reply text");
    let oracle = ScriptedOracle::new(vec![(
        "Fenced",
        Ok("```json\n{\"Author\": \"Ada Lovelace\", \"Title\": \"Notes\", \"Year\": \"1843\"}\n```".into()),
    )]);
    let cfg = config(&d, oracle.clone());

    rename_document(&source, DocumentKind::Markdown, oracle.as_ref(), &cfg).await;
    assert!(d.dest.join("Ada Lovelace 1843--Notes.md").exists());
}

#[tokio::test]
async fn oracle_failure_uses_null_fallback_name() {
    let d = dirs();
    let source = write(&d.source, "mystery.md", "Some untitled text");
    let oracle = ScriptedOracle::new(vec![]);
    let cfg = config(&d, oracle.clone());

    let report = rename_document(&source, DocumentKind::Markdown, oracle.as_ref(), &cfg).await;

    assert_eq!(report.metadata, Some(Metadata::Fallback));
    assert_eq!(report.base_name.as_deref(), Some("NULL-NULL-NULL"));
    assert!(d.dest.join("NULL-NULL-NULL.md").exists());
}

#[tokio::test]
async fn null_author_keeps_year_and_title() {
    let d = dirs();
    let source = write(&d.source, "x.md", "Anonymous pamphlet");
    let oracle = ScriptedOracle::new(vec![("Anonymous", json_reply("", "X", "2019"))]);
    let cfg = config(&d, oracle.clone());

    rename_document(&source, DocumentKind::Markdown, oracle.as_ref(), &cfg).await;
    assert!(d.dest.join("NULL-2019-X.md").exists());
}

#[tokio::test]
async fn empty_document_fails_without_calling_oracle() {
    let d = dirs();
    let source = write(&d.source, "blank.md", "   \n\t\n");
    let oracle = ScriptedOracle::new(vec![]);
    let cfg = config(&d, oracle.clone());

    let report = rename_document(&source, DocumentKind::Markdown, oracle.as_ref(), &cfg).await;

    assert_eq!(
        report.outcome,
        DocumentOutcome::Failed {
            stage: DocumentStage::Extracting,
            error: DocumentError::NoText {
                path: source.clone()
            },
        }
    );
    assert!(report.metadata.is_none());
    assert_eq!(oracle.calls(), 0);
    assert!(source.exists());
    assert!(!d.dest.exists(), "destination must not be created");
}

#[tokio::test]
async fn collision_is_skipped_and_source_untouched() {
    let d = dirs();
    std::fs::create_dir(&d.dest).unwrap();
    write(&d.dest, "Jane Doe 2021--On Widgets.md", "first copy");
    let source = write(&d.source, "dup.md", "On Widgets, second copy");
    let oracle = ScriptedOracle::new(vec![("On Widgets", json_reply("Jane Doe", "On Widgets", "2021"))]);
    let cfg = config(&d, oracle.clone());

    let report = rename_document(&source, DocumentKind::Markdown, oracle.as_ref(), &cfg).await;

    assert_eq!(
        report.outcome,
        DocumentOutcome::Skipped {
            existing: d.dest.join("Jane Doe 2021--On Widgets.md")
        }
    );
    assert_eq!(
        std::fs::read_to_string(&source).unwrap(),
        "On Widgets, second copy"
    );
    assert_eq!(
        std::fs::read_to_string(d.dest.join("Jane Doe 2021--On Widgets.md")).unwrap(),
        "first copy"
    );
}

#[tokio::test]
async fn title_ending_in_extension_is_not_doubled() {
    let d = dirs();
    let source = write(&d.source, "readme.md", "Readme text");
    let oracle = ScriptedOracle::new(vec![("Readme", json_reply("Jane Doe", "README.MD", "2020"))]);
    let cfg = config(&d, oracle.clone());

    rename_document(&source, DocumentKind::Markdown, oracle.as_ref(), &cfg).await;
    assert!(d.dest.join("Jane Doe 2020--README.MD").exists());
}

#[tokio::test]
async fn snippet_is_capped_at_max_chars() {
    struct Recording(Mutex<Vec<String>>);

    #[async_trait]
    impl MetadataOracle for Recording {
        async fn complete(&self, snippet: &str) -> Result<String, OracleError> {
            self.0.lock().unwrap().push(snippet.to_string());
            json_reply("A", "B", "C")
        }
    }

    let d = dirs();
    let source = write(&d.source, "long.md", &"x".repeat(10_000));
    let oracle = Arc::new(Recording(Mutex::new(Vec::new())));
    let cfg = RenameConfig::builder(&d.source, &d.dest)
        .oracle(oracle.clone())
        .max_chars(50)
        .build()
        .unwrap();

    rename_document(&source, DocumentKind::Markdown, oracle.as_ref(), &cfg).await;
    let seen = oracle.0.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].chars().count(), 50);
}

// ── Batch driver ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_continues_past_failures() {
    let d = dirs();
    write(&d.source, "good.md", "Good paper");
    write(&d.source, "empty.md", "");
    write(&d.source, "other.markdown", "Other paper");
    write(&d.source, "ignored.txt", "Good paper");
    let oracle = ScriptedOracle::new(vec![
        ("Good", json_reply("Jane Doe", "Good", "2020")),
        ("Other", json_reply("John Roe; Ann Poe", "Other", "2019")),
    ]);
    let cfg = config(&d, oracle.clone());

    let summary = rename_directory(&cfg).await.unwrap();

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.moved, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.skipped, 0);
    assert!(report_for(&summary, "empty.md").outcome.is_failed());
    assert!(d.dest.join("Jane Doe 2020--Good.md").exists());
    assert!(d.dest.join("Roe et al. 2019--Other.md").exists());
    assert!(d.source.join("empty.md").exists());
    assert!(d.source.join("ignored.txt").exists());
}

#[tokio::test]
async fn batch_continues_past_move_failure() {
    let d = dirs();
    write(&d.source, "long.md", "Overlong title");
    write(&d.source, "good.md", "Good paper");
    let long_title = "W".repeat(300);
    let oracle = ScriptedOracle::new(vec![
        ("Overlong", json_reply("Jane Doe", &long_title, "2020")),
        ("Good", json_reply("Jane Doe", "Good", "2020")),
    ]);
    let cfg = config(&d, oracle.clone());

    let summary = rename_directory(&cfg).await.unwrap();

    assert_eq!(summary.total(), 2);
    assert_eq!((summary.moved, summary.failed), (1, 1));
    assert!(summary.is_success());
    assert!(matches!(
        report_for(&summary, "long.md").outcome,
        DocumentOutcome::Failed {
            stage: DocumentStage::Moving,
            error: DocumentError::MoveFailed { .. },
        }
    ));
    assert!(report_for(&summary, "good.md").outcome.is_moved());
    assert!(d.source.join("long.md").exists());
    assert!(d.dest.join("Jane Doe 2020--Good.md").exists());
}

#[tokio::test]
async fn first_write_wins_within_a_batch() {
    let d = dirs();
    write(&d.source, "one.md", "Same paper, copy one");
    write(&d.source, "two.md", "Same paper, copy two");
    let oracle = ScriptedOracle::new(vec![("Same paper", json_reply("Jane Doe", "Same", "2020"))]);
    let cfg = config(&d, oracle.clone());

    let summary = rename_directory(&cfg).await.unwrap();

    assert_eq!((summary.moved, summary.skipped), (1, 1));
    let remaining: Vec<_> = std::fs::read_dir(&d.source).unwrap().collect();
    assert_eq!(remaining.len(), 1, "the skipped copy stays in the source");
    let moved: Vec<_> = std::fs::read_dir(&d.dest).unwrap().collect();
    assert_eq!(moved.len(), 1);
}

#[tokio::test]
async fn kind_selection_limits_batch() {
    let d = dirs();
    write(&d.source, "notes.md", "Notes");
    write(&d.source, "paper.pdf", "not really a pdf");
    let oracle = ScriptedOracle::new(vec![("Notes", json_reply("A", "Notes", "2000"))]);
    let cfg = RenameConfig::builder(&d.source, &d.dest)
        .oracle(oracle.clone())
        .kinds(KindSelection::Markdown)
        .build()
        .unwrap();

    let summary = rename_directory(&cfg).await.unwrap();
    assert_eq!(summary.total(), 1);
    assert_eq!(summary.reports[0].kind, DocumentKind::Markdown);
    assert!(d.source.join("paper.pdf").exists());
}

#[tokio::test]
async fn fallbacks_are_counted() {
    let d = dirs();
    write(&d.source, "a.md", "alpha");
    let oracle = ScriptedOracle::new(vec![("alpha", Ok("not json".into()))]);
    let cfg = config(&d, oracle.clone());

    let summary = rename_directory(&cfg).await.unwrap();
    assert_eq!(summary.fallbacks, 1);
    assert_eq!(summary.moved, 1);
    assert!(d.dest.join("NULL-NULL-NULL.md").exists());
}

#[tokio::test]
async fn empty_source_dir_is_empty_summary() {
    let d = dirs();
    let oracle = ScriptedOracle::new(vec![]);
    let summary = rename_directory(&config(&d, oracle.clone())).await.unwrap();
    assert_eq!(summary.total(), 0);
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn missing_source_dir_is_fatal() {
    let d = dirs();
    let oracle = ScriptedOracle::new(vec![]);
    let cfg = RenameConfig::builder(d.source.join("nope"), &d.dest)
        .oracle(oracle)
        .build()
        .unwrap();

    let err = rename_directory(&cfg).await.unwrap_err();
    assert!(matches!(err, RenameError::SourceDirNotFound { .. }));
}

#[tokio::test]
async fn progress_callbacks_fire_in_order() {
    #[derive(Default)]
    struct Events(Mutex<Vec<String>>);

    impl RenameProgressCallback for Events {
        fn on_batch_start(&self, total: usize) {
            self.0.lock().unwrap().push(format!("start {total}"));
        }
        fn on_document_start(&self, index: usize, total: usize, _path: &Path) {
            self.0.lock().unwrap().push(format!("doc {index}/{total}"));
        }
        fn on_document_complete(&self, index: usize, _total: usize, report: &DocumentReport) {
            let tag = if report.outcome.is_moved() { "moved" } else { "other" };
            self.0.lock().unwrap().push(format!("done {index} {tag}"));
        }
        fn on_batch_complete(&self, summary: &BatchSummary) {
            self.0.lock().unwrap().push(format!("end {}", summary.moved));
        }
    }

    let d = dirs();
    write(&d.source, "a.md", "alpha");
    let events = Arc::new(Events::default());
    let oracle = ScriptedOracle::new(vec![("alpha", json_reply("A", "Alpha", "2001"))]);
    let cfg = RenameConfig::builder(&d.source, &d.dest)
        .oracle(oracle)
        .progress_callback(events.clone())
        .build()
        .unwrap();

    rename_directory(&cfg).await.unwrap();

    assert_eq!(
        *events.0.lock().unwrap(),
        vec!["start 1", "doc 1/1", "done 1 moved", "end 1"]
    );
}

#[test]
fn sync_wrapper_runs_batch() {
    let d = dirs();
    write(&d.source, "s.md", "sync text");
    let oracle = ScriptedOracle::new(vec![("sync", json_reply("Jane Doe", "Sync", "2022"))]);
    let summary = rename_directory_sync(&config(&d, oracle)).unwrap();
    assert_eq!(summary.moved, 1);
    assert!(d.dest.join("Jane Doe 2022--Sync.md").exists());
}

#[tokio::test]
async fn summary_serialises_to_json() {
    let d = dirs();
    write(&d.source, "a.md", "alpha");
    let oracle = ScriptedOracle::new(vec![("alpha", json_reply("A", "Alpha", "2001"))]);
    let summary = rename_directory(&config(&d, oracle)).await.unwrap();

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["moved"], 1);
    assert_eq!(json["reports"][0]["outcome"]["outcome"], "moved");
    assert_eq!(json["reports"][0]["metadata"]["status"], "valid");
}

// ── Gated: real PDF extraction and live model ────────────────────────────────

/// Skip unless E2E_ENABLED is set.
macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    };
}

/// Route library logs to the test output; `RUST_LOG` overrides the level.
fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("edgequake_bibrename=debug")),
        )
        .with_test_writer()
        .try_init();
}

/// A one-page PDF whose only text is `line`.
fn tiny_pdf(line: &str) -> Vec<u8> {
    let content = format!("BT /F1 18 Tf 72 720 Td ({line}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
         /Resources << /Font << /F1 5 0 R >> >> /Contents 4 0 R >>"
            .to_string(),
        format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut pdf = b"%PDF-1.4\n".to_vec();
    let mut offsets = Vec::new();
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", i + 1).as_bytes());
    }
    let xref_at = pdf.len();
    pdf.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for off in offsets {
        pdf.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
    }
    pdf.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
            objects.len() + 1
        )
        .as_bytes(),
    );
    pdf
}

#[tokio::test]
async fn e2e_pdf_end_to_end_with_scripted_oracle() {
    e2e_skip_unless_enabled!();
    init_logs();

    let d = dirs();
    let source = d.source.join("scan0001.pdf");
    std::fs::write(&source, tiny_pdf("On Widgets by Jane Doe 2021")).unwrap();
    let oracle = ScriptedOracle::new(vec![("Widgets", json_reply("Jane Doe", "On Widgets", "2021"))]);
    let cfg = config(&d, oracle.clone());

    let summary = rename_directory(&cfg).await.unwrap();

    assert_eq!(summary.moved, 1, "report: {:?}", summary.reports);
    assert!(d.dest.join("Jane Doe 2021--On Widgets.pdf").exists());
    assert!(!source.exists());
}

#[tokio::test]
async fn e2e_live_model_names_markdown() {
    e2e_skip_unless_enabled!();
    init_logs();
    if std::env::var("OPENAI_API_KEY").is_err() {
        println!("SKIP: OPENAI_API_KEY not set");
        return;
    }

    let d = dirs();
    write(
        &d.source,
        "paper.md",
        "# Attention Is All You Need\n\nAshish Vaswani, Noam Shazeer, Niki Parmar\n\nNeurIPS 2017\n",
    );
    let cfg = RenameConfig::builder(&d.source, &d.dest).build().unwrap();

    let summary = rename_directory(&cfg).await.unwrap();
    assert_eq!(summary.moved, 1, "report: {:?}", summary.reports);
    let name = std::fs::read_dir(&d.dest)
        .unwrap()
        .next()
        .unwrap()
        .unwrap()
        .file_name();
    println!("Live model named the file: {:?}", name);
    assert!(name.to_string_lossy().ends_with(".md"));
}
