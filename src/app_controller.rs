use anyhow::Result;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::app_config::Config;
use crate::chapter::ChapterPipeline;
use crate::epub;
use crate::providers::Translator;
use crate::report::{self, ChapterReport, RunReport, RunResult};

/// Main application controller for book translation.
///
/// Dispatches the chapter pipeline across all chapters of a book on a bounded
/// worker pool, reassembles the results in the book's original chapter order
/// regardless of completion order, and decides whether the rewritten book is
/// persisted. Chapters are fully independent: each gets its own document tree
/// and rolling context, and writes its rewritten bytes into a disjoint key of
/// the book's item map.
pub struct Controller {
    config: Config,
}

impl Controller {
    /// Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the main workflow: load, translate every chapter, persist, report.
    ///
    /// Container read/write failures abort the run and propagate; paragraph
    /// failures never do — they are collected into the report, and with
    /// `abort_on_error` set they only withhold persistence of the rewritten
    /// book (exit code 2) while the report is still written.
    pub async fn run(
        &self,
        translator: &dyn Translator,
        input_path: &Path,
        output_path: &Path,
        report_path: &Path,
    ) -> Result<RunResult> {
        info!("Loading EPUB | path={}", input_path.display());
        let book = epub::load_book(input_path)?;

        let total = book.chapters.len();
        let workers = self.config.translation.workers;
        info!("Loaded EPUB | chapters={} workers={}", total, workers);

        let progress_bar = ProgressBar::new(total as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chapters {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let semaphore = Arc::new(Semaphore::new(workers));
        let pipeline = ChapterPipeline::new(translator, &self.config);

        // Chapters are translated concurrently on a bounded pool; within each
        // chapter, paragraphs stay sequential so the rolling context window
        // can feed each successive request.
        let mut results: Vec<(usize, Vec<u8>, ChapterReport)> =
            stream::iter(book.chapters.iter().enumerate())
                .map(|(index, chapter)| {
                    let semaphore = semaphore.clone();
                    let pipeline = &pipeline;
                    let progress_bar = &progress_bar;
                    async move {
                        let _permit = semaphore
                            .acquire()
                            .await
                            .expect("semaphore is never closed");
                        info!(
                            "Translating chapter {}/{} | path={}",
                            index + 1,
                            total,
                            chapter.path
                        );
                        let (bytes, chapter_report) = pipeline.translate_chapter(chapter).await;
                        debug!(
                            "Chapter completed | path={} changed={} failed={} skipped={}",
                            chapter.path,
                            chapter_report.changes.len(),
                            chapter_report.failures.len(),
                            chapter_report.skips.len()
                        );
                        progress_bar.inc(1);
                        (index, bytes, chapter_report)
                    }
                })
                .buffer_unordered(workers.max(1))
                .collect()
                .await;
        progress_bar.finish_and_clear();

        // Reassemble in input order regardless of completion order.
        results.sort_by_key(|(index, _, _)| *index);

        let mut updated_items = book.items.clone();
        let mut chapter_reports = Vec::with_capacity(results.len());
        for (index, bytes, chapter_report) in results {
            updated_items.insert(book.chapters[index].path.clone(), bytes);
            chapter_reports.push(chapter_report);
        }

        let totals = RunReport::compute_totals(&chapter_reports);
        let failures = totals.failed;

        let mut output_written = true;
        let mut exit_code = 0;

        if self.config.translation.abort_on_error && failures > 0 {
            output_written = false;
            exit_code = 2;
            info!("Aborting EPUB write due to failures | failures={}", failures);
        } else {
            info!("Writing translated EPUB | path={}", output_path.display());
            epub::save_book(
                &epub::Book {
                    items: updated_items,
                    chapters: book.chapters,
                },
                output_path,
            )?;
        }

        let run_report = RunReport {
            generated_at: Utc::now().to_rfc3339(),
            input_path: input_path.display().to_string(),
            output_path: output_path.display().to_string(),
            report_path: report_path.display().to_string(),
            model: self.config.translation.model.clone(),
            source_lang: self.config.source_language.clone(),
            target_lang: self.config.target_language.clone(),
            temperature: self.config.translation.temperature,
            retries: self.config.translation.retries,
            abort_on_error: self.config.translation.abort_on_error,
            output_written,
            totals,
            chapters: chapter_reports,
        };
        report::write_report(&run_report, report_path)?;

        info!(
            "Run completed | changed={} failed={} skipped={} output_written={}",
            totals.changed, totals.failed, totals.skipped, output_written
        );

        Ok(RunResult {
            output_written,
            failures,
            exit_code,
        })
    }
}
