/*!
 * Retry discipline for translation calls.
 *
 * Every paragraph gets a bounded number of attempts against the backend.
 * Transient failures back off exponentially (capped) before the next attempt;
 * permanent failures stop the loop immediately regardless of the remaining
 * budget.
 */

use log::debug;
use std::time::Duration;

use crate::errors::TranslationError;
use crate::providers::{TranslationRequest, Translator};

/// Exhausted or short-circuited retry loop: the last error plus how many
/// attempts were actually made
#[derive(Debug)]
pub struct RetryFailure {
    pub attempts: u32,
    pub error: TranslationError,
}

/// Backoff before the attempt after `attempt` (counted from 0):
/// 0.25 s doubling per attempt, capped at 4 s
pub fn backoff_delay(attempt: u32) -> Duration {
    let millis = 250u64.saturating_mul(1u64 << attempt.min(6));
    Duration::from_millis(millis.min(4_000))
}

/// Run a translation request with up to `retries + 1` attempts.
///
/// Returns the raw translated text on the first success. Retryable errors
/// sleep [`backoff_delay`] and try again while budget remains; a non-retryable
/// error fails immediately with the attempts made so far.
pub async fn translate_with_retry(
    translator: &dyn Translator,
    request: &TranslationRequest,
    retries: u32,
) -> Result<String, RetryFailure> {
    let mut last_error = None;

    for attempt in 0..=retries {
        match translator.translate(request).await {
            Ok(response) => return Ok(response.translated_text),
            Err(error @ TranslationError::Retryable(_)) => {
                debug!(
                    "Retryable translation error | attempt={}/{} error={}",
                    attempt + 1,
                    retries + 1,
                    error
                );
                last_error = Some(error);
                if attempt < retries {
                    tokio::time::sleep(backoff_delay(attempt)).await;
                }
            }
            Err(error @ TranslationError::NonRetryable(_)) => {
                debug!(
                    "Non-retryable translation error | attempt={} error={}",
                    attempt + 1,
                    error
                );
                return Err(RetryFailure {
                    attempts: attempt + 1,
                    error,
                });
            }
        }
    }

    Err(RetryFailure {
        attempts: retries + 1,
        error: last_error
            .unwrap_or_else(|| TranslationError::Retryable("unknown error".to_string())),
    })
}
