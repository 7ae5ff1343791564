/*!
 * Error types for the epubtrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Errors raised by the translation backend for a single paragraph.
///
/// The two variants drive the retry loop: `Retryable` failures are transient
/// (network trouble, server-side 5xx, malformed or empty responses) and worth
/// another attempt after a backoff; `NonRetryable` failures are client-side
/// rejections that will not get better by asking again.
#[derive(Error, Debug, Clone)]
pub enum TranslationError {
    /// Transient failure, eligible for backoff-and-retry
    #[error("retryable translation error: {0}")]
    Retryable(String),

    /// Permanent failure, stops the retry loop immediately
    #[error("non-retryable translation error: {0}")]
    NonRetryable(String),
}

impl TranslationError {
    /// Stable identifier used as the `error_type` field of failure reports
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Retryable(_) => "retryable",
            Self::NonRetryable(_) => "non_retryable",
        }
    }
}

/// Errors that can occur while reading or writing the EPUB container.
///
/// Both variants are fatal: they abort the whole run and propagate to the caller,
/// unlike per-paragraph translation errors which are recovered locally.
#[derive(Error, Debug)]
pub enum EpubError {
    /// Error reading or unpacking the input archive
    #[error("failed to read EPUB: {0}")]
    Read(String),

    /// Error packing or writing the output archive
    #[error("failed to write EPUB: {0}")]
    Write(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid configuration rejected before any work starts
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// Error from the EPUB container
    #[error("EPUB error: {0}")]
    Epub(#[from] EpubError),

    /// Error from the translation backend
    #[error("translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error writing the run report
    #[error("report error: {0}")]
    Report(String),

    /// Any other error
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}
