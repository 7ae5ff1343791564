/*!
 * Run reporting.
 *
 * Every paragraph the pipeline selects ends up as exactly one entry in the
 * report: a change, a failure, or a skip, keyed by the chapter path and the
 * node's locator. The report is written whether or not the translated EPUB
 * itself is persisted.
 */

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::classifier::SkipReason;

/// A paragraph that was successfully rewritten
#[derive(Debug, Clone, Serialize)]
pub struct NodeChange {
    pub chapter_path: String,
    pub node_path: String,
    /// Preview of the source text
    pub before: String,
    /// Preview of the translated text
    pub after: String,
}

/// A paragraph that failed after its retry budget
#[derive(Debug, Clone, Serialize)]
pub struct NodeFailure {
    pub chapter_path: String,
    pub node_path: String,
    /// Preview of the source text
    pub text: String,
    pub error_type: String,
    pub message: String,
    pub attempts: u32,
}

/// A paragraph excluded from translation
#[derive(Debug, Clone, Serialize)]
pub struct NodeSkip {
    pub chapter_path: String,
    pub node_path: String,
    pub reason: SkipReason,
}

/// Per-chapter outcome lists, in document order
#[derive(Debug, Clone, Serialize)]
pub struct ChapterReport {
    pub chapter_path: String,
    pub changes: Vec<NodeChange>,
    pub failures: Vec<NodeFailure>,
    pub skips: Vec<NodeSkip>,
}

/// Aggregate counters across all chapters
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RunTotals {
    pub chapters: usize,
    pub changed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// The full structured report for one run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: String,
    pub input_path: String,
    pub output_path: String,
    pub report_path: String,
    pub model: String,
    pub source_lang: String,
    pub target_lang: String,
    pub temperature: f32,
    pub retries: u32,
    pub abort_on_error: bool,
    pub output_written: bool,
    pub totals: RunTotals,
    pub chapters: Vec<ChapterReport>,
}

impl RunReport {
    /// Recompute the aggregate counters from the chapter lists
    pub fn compute_totals(chapters: &[ChapterReport]) -> RunTotals {
        RunTotals {
            chapters: chapters.len(),
            changed: chapters.iter().map(|c| c.changes.len()).sum(),
            failed: chapters.iter().map(|c| c.failures.len()).sum(),
            skipped: chapters.iter().map(|c| c.skips.len()).sum(),
        }
    }
}

/// How the run ended, for the caller and the process exit code
#[derive(Debug, Clone, Copy)]
pub struct RunResult {
    pub output_written: bool,
    pub failures: usize,
    pub exit_code: i32,
}

/// Write the report as pretty-printed JSON, creating parent directories
pub fn write_report(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create report directory: {}", parent.display()))?;
        }
    }
    let payload = serde_json::to_string_pretty(report)?;
    fs::write(path, payload)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}
