/*!
 * # epubtrans - EPUB translation with local AI models
 *
 * A Rust library for translating the paragraph text of EPUB books while
 * leaving markup structure, inline styling, and all non-paragraph content
 * untouched.
 *
 * ## Features
 *
 * - Rewrites paragraph prose in place, preserving inline tags and attributes
 * - Protected-region classification (code blocks, metadata, links, footnotes)
 * - Per-paragraph retry with exponential backoff on transient backend errors
 * - Response sanitization against quoting and leaked-prompt echoes
 * - Rolling per-chapter context window for consistent terminology
 * - Concurrent chapter processing with deterministic report ordering
 * - Structured JSON run reports
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `epub`: EPUB container load/save
 * - `document`: Chapter document tree (parse, locators, serialize)
 * - `classifier`: Protected-region classification
 * - `text_slots`: Text extraction and proportional redistribution
 * - `sanitizer`: Backend response cleanup
 * - `retry`: Retry/backoff discipline
 * - `chapter`: Per-chapter translation pipeline
 * - `app_controller`: Book-level orchestration
 * - `providers`: Translation backend clients (Ollama)
 * - `report`: Structured run reports
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod chapter;
pub mod classifier;
pub mod document;
pub mod epub;
pub mod errors;
pub mod providers;
pub mod report;
pub mod retry;
pub mod sanitizer;
pub mod text_slots;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use classifier::SkipReason;
pub use errors::{AppError, EpubError, TranslationError};
pub use providers::{TranslationRequest, TranslationResponse, Translator};
pub use report::{RunReport, RunResult};
