/*!
 * Tests for retry/backoff discipline
 */

use std::time::Duration;

use epubtrans::errors::TranslationError;
use epubtrans::providers::TranslationRequest;
use epubtrans::retry::{backoff_delay, translate_with_retry};

use crate::common::mock_translators::{
    AlwaysNonRetryableTranslator, AlwaysRetryableTranslator, EchoTranslator, FlakyTranslator,
};

fn request() -> TranslationRequest {
    TranslationRequest {
        source_lang: "en".to_string(),
        target_lang: "it".to_string(),
        model: "test-model".to_string(),
        temperature: 0.2,
        chapter_context: String::new(),
        text: "Hello world".to_string(),
        prior_translations: String::new(),
    }
}

#[test]
fn test_backoffDelay_shouldDoubleFromQuarterSecond() {
    assert_eq!(backoff_delay(0), Duration::from_millis(250));
    assert_eq!(backoff_delay(1), Duration::from_millis(500));
    assert_eq!(backoff_delay(2), Duration::from_millis(1000));
    assert_eq!(backoff_delay(3), Duration::from_millis(2000));
}

#[test]
fn test_backoffDelay_shouldCapAtFourSeconds() {
    assert_eq!(backoff_delay(4), Duration::from_secs(4));
    assert_eq!(backoff_delay(5), Duration::from_secs(4));
    assert_eq!(backoff_delay(30), Duration::from_secs(4));
}

#[test]
fn test_translateWithRetry_firstAttemptSucceeds_shouldNotRetry() {
    let translator = EchoTranslator::new("Ciao mondo");
    let result = tokio_test::block_on(translate_with_retry(&translator, &request(), 3));
    assert_eq!(result.unwrap(), "Ciao mondo");
    assert_eq!(translator.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_translateWithRetry_alwaysRetryable_shouldExhaustBudget() {
    let translator = AlwaysRetryableTranslator::new();
    let failure = translate_with_retry(&translator, &request(), 2)
        .await
        .unwrap_err();
    assert_eq!(failure.attempts, 3);
    assert_eq!(translator.call_count(), 3);
    assert!(matches!(failure.error, TranslationError::Retryable(_)));
}

#[tokio::test(start_paused = true)]
async fn test_translateWithRetry_zeroRetries_shouldAttemptOnce() {
    let translator = AlwaysRetryableTranslator::new();
    let failure = translate_with_retry(&translator, &request(), 0)
        .await
        .unwrap_err();
    assert_eq!(failure.attempts, 1);
    assert_eq!(translator.call_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_translateWithRetry_nonRetryable_shouldShortCircuit() {
    let translator = AlwaysNonRetryableTranslator::new();
    let failure = translate_with_retry(&translator, &request(), 5)
        .await
        .unwrap_err();
    assert_eq!(failure.attempts, 1);
    assert_eq!(translator.call_count(), 1);
    assert!(matches!(failure.error, TranslationError::NonRetryable(_)));
    assert_eq!(failure.error.kind(), "non_retryable");
}

#[tokio::test(start_paused = true)]
async fn test_translateWithRetry_flakyBackend_shouldSucceedWithinBudget() {
    let translator = FlakyTranslator::new(2, "Ciao mondo");
    let result = translate_with_retry(&translator, &request(), 3).await;
    assert_eq!(result.unwrap(), "Ciao mondo");
    assert_eq!(translator.call_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_translateWithRetry_flakyBeyondBudget_shouldFail() {
    let translator = FlakyTranslator::new(3, "Ciao mondo");
    let failure = translate_with_retry(&translator, &request(), 1)
        .await
        .unwrap_err();
    assert_eq!(failure.attempts, 2);
    assert_eq!(translator.call_count(), 2);
}
