/*!
 * Chapter translation pipeline.
 *
 * One chapter is one unit of work: parse, walk the paragraphs in document
 * order, and for each one classify → extract → translate-with-retry →
 * sanitize → redistribute, recording exactly one outcome per paragraph.
 * Paragraphs are processed strictly sequentially because a rolling window of
 * recent translations feeds each successive request — that window is what
 * keeps terminology and tone consistent inside a chapter.
 */

use log::debug;
use std::collections::VecDeque;

use crate::app_config::Config;
use crate::classifier::{SkipReason, classify};
use crate::document::Document;
use crate::epub::ChapterDocument;
use crate::providers::{TranslationRequest, Translator};
use crate::report::{ChapterReport, NodeChange, NodeFailure, NodeSkip};
use crate::retry::translate_with_retry;
use crate::sanitizer::Sanitizer;
use crate::text_slots::replace_node_text;

/// Character budget for before/after previews in the report
const PREVIEW_CHARS: usize = 200;

/// Whitespace-normalize and truncate text for report previews and context
/// excerpts; a truncated result ends with an ellipsis
pub fn preview(text: &str, max_chars: usize) -> String {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() <= max_chars {
        return cleaned;
    }
    let mut out: String = cleaned.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Bounded FIFO of the most recent successfully translated paragraph texts.
///
/// Scoped to one chapter: created fresh per chapter and owned exclusively by
/// its pipeline invocation. Capacity 0 disables the window.
#[derive(Debug)]
pub struct RollingContext {
    entries: VecDeque<String>,
    capacity: usize,
}

impl RollingContext {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a translation, evicting the oldest entry at capacity
    pub fn push(&mut self, text: String) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(text);
    }

    /// The window contents, oldest first, newline-joined
    pub fn joined(&self) -> String {
        self.entries
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Translates the paragraphs of one chapter
pub struct ChapterPipeline<'a> {
    translator: &'a dyn Translator,
    config: &'a Config,
    sanitizer: Sanitizer,
}

impl<'a> ChapterPipeline<'a> {
    pub fn new(translator: &'a dyn Translator, config: &'a Config) -> Self {
        Self {
            translator,
            config,
            sanitizer: Sanitizer::new(&config.translation.prompt_echo_markers),
        }
    }

    /// Translate one chapter, returning the rewritten bytes and the outcome
    /// of every selected paragraph.
    ///
    /// Never fails: malformed markup degrades to a best-effort tree, and
    /// translation failures are recorded per paragraph instead of aborting
    /// the chapter.
    pub async fn translate_chapter(&self, chapter: &ChapterDocument) -> (Vec<u8>, ChapterReport) {
        let mut doc = Document::parse(&chapter.bytes);

        // Short excerpt of the whole chapter; kept small to reduce model
        // confusion and context echo.
        let chapter_context = preview(
            &doc.normalized_text(),
            self.config.translation.chapter_context_chars,
        );

        let mut report = ChapterReport {
            chapter_path: chapter.path.clone(),
            changes: Vec::new(),
            failures: Vec::new(),
            skips: Vec::new(),
        };

        let mut recent = RollingContext::new(self.config.translation.context_paragraphs);

        for node in doc.paragraphs() {
            let node_path = doc.node_path(node);

            if let Some(reason) = classify(&doc, node, &self.config.protection) {
                report.skips.push(NodeSkip {
                    chapter_path: chapter.path.clone(),
                    node_path,
                    reason,
                });
                continue;
            }

            let before = doc.collect_text(node).trim().to_string();
            if before.is_empty() {
                report.skips.push(NodeSkip {
                    chapter_path: chapter.path.clone(),
                    node_path,
                    reason: SkipReason::Empty,
                });
                continue;
            }

            let request = TranslationRequest {
                source_lang: self.config.source_language.clone(),
                target_lang: self.config.target_language.clone(),
                model: self.config.translation.model.clone(),
                temperature: self.config.translation.temperature,
                chapter_context: chapter_context.clone(),
                text: before.clone(),
                prior_translations: recent.joined(),
            };

            match translate_with_retry(self.translator, &request, self.config.translation.retries)
                .await
            {
                Ok(raw) => {
                    let translated = self.sanitizer.clean(&raw, &before);
                    replace_node_text(&mut doc, node, &translated);
                    debug!(
                        "Translated node | chapter={} node={}",
                        chapter.path, node_path
                    );
                    report.changes.push(NodeChange {
                        chapter_path: chapter.path.clone(),
                        node_path,
                        before: preview(&before, PREVIEW_CHARS),
                        after: preview(&translated, PREVIEW_CHARS),
                    });
                    recent.push(translated);
                }
                Err(failure) => {
                    debug!(
                        "Paragraph failed | chapter={} node={} attempts={} error={}",
                        chapter.path, node_path, failure.attempts, failure.error
                    );
                    report.failures.push(NodeFailure {
                        chapter_path: chapter.path.clone(),
                        node_path,
                        text: preview(&before, PREVIEW_CHARS),
                        error_type: failure.error.kind().to_string(),
                        message: failure.error.to_string(),
                        attempts: failure.attempts,
                    });
                }
            }
        }

        (doc.to_bytes(), report)
    }
}
