/*!
 * Translation backend interface.
 *
 * The pipeline treats the backend as an untrusted, sometimes-failing black
 * box behind the [`Translator`] trait; failures come back pre-classified as
 * retryable or not so the retry loop never inspects transport details.
 * Currently one implementation exists:
 * - `ollama`: local Ollama HTTP server
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::TranslationError;

/// Everything the backend needs to translate one paragraph
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Source language code
    pub source_lang: String,
    /// Target language code
    pub target_lang: String,
    /// Model identifier
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Bounded excerpt of the whole chapter, for tone and terminology
    pub chapter_context: String,
    /// The paragraph text to translate
    pub text: String,
    /// Recent translations from the same chapter, newline-joined; empty when
    /// the rolling window is disabled or still empty
    pub prior_translations: String,
}

/// The backend's answer for one paragraph
#[derive(Debug, Clone)]
pub struct TranslationResponse {
    pub translated_text: String,
}

/// Common trait for translation backends
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Translate one paragraph, classifying any failure as retryable or not
    async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResponse, TranslationError>;
}

/// Build the full prompt for a request.
///
/// The section headers here must stay in sync with the sanitizer's echo
/// markers: models regularly quote them back, and the sanitizer keys on the
/// exact phrases to cut the leak out of the response.
pub fn build_prompt(request: &TranslationRequest) -> String {
    let mut prompt = format!(
        "You are a professional book translator.\n\
         Translate from {} to {}.\n\
         Preserve meaning, tone, and punctuation.\n\
         Return ONLY the translated text, no quotes, no explanations.\n\n",
        request.source_lang, request.target_lang
    );

    if !request.prior_translations.is_empty() {
        prompt.push_str(&format!(
            "PREVIOUS TRANSLATIONS (for consistency):\n{}\n\n",
            request.prior_translations
        ));
    }

    prompt.push_str(&format!(
        "CHAPTER CONTEXT (for tone/terminology):\n{}\n\n\
         TEXT TO TRANSLATE:\n{}\n",
        request.chapter_context, request.text
    ));

    prompt
}

pub mod ollama;
