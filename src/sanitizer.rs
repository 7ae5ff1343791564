/*!
 * Response sanitization.
 *
 * The translation backend is instructed to return only translated text, but
 * models routinely wrap the answer in quotes or echo chunks of the prompt
 * back ("TEXT TO TRANSLATE: ..."). This module strips one quoting layer,
 * drops everything up to the last leaked prompt marker, and flags responses
 * whose length is wildly out of proportion to the source paragraph.
 */

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

/// Prompt section headers the model may echo, in every language the prompt
/// templates have shipped in. The list is policy: pass a custom set to
/// [`Sanitizer::new`] when prompts use different headers.
pub const DEFAULT_ECHO_MARKERS: &[&str] = &[
    "TEXT TO TRANSLATE",
    "CHAPTER CONTEXT",
    "PREVIOUS TRANSLATIONS",
    "TESTO DA TRADURRE",
    "CONTESTO DEL CAPITOLO",
    "TRADUZIONI PRECEDENTI",
];

/// Paired quote styles stripped when they wrap the whole response
const QUOTE_PAIRS: &[(char, char)] = &[('"', '"'), ('\'', '\''), ('“', '”'), ('‘', '’')];

/// A response exceeding this many times the source length is reported as a
/// possible context leak (but kept: oversized output is surfaced, never
/// silently truncated)
const LENGTH_RATIO_LIMIT: f64 = 3.0;

static DEFAULT_MARKER_RE: Lazy<Regex> = Lazy::new(|| marker_regex(DEFAULT_ECHO_MARKERS));

fn marker_regex<S: AsRef<str>>(markers: &[S]) -> Regex {
    let alternatives: Vec<String> = markers
        .iter()
        .map(|m| regex::escape(m.as_ref()))
        .collect();
    // (?is): case-insensitive, and matching across line breaks.
    Regex::new(&format!("(?is)(?:{})", alternatives.join("|")))
        .expect("marker alternation is a valid regex")
}

/// Cleans raw backend responses against quoting and prompt-echo contamination
#[derive(Debug, Clone)]
pub struct Sanitizer {
    marker_re: Regex,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self {
            marker_re: DEFAULT_MARKER_RE.clone(),
        }
    }
}

impl Sanitizer {
    /// Build a sanitizer for a custom prompt-marker set.
    ///
    /// Blank markers are ignored; an effectively empty set falls back to
    /// [`DEFAULT_ECHO_MARKERS`] so marker stripping never degenerates into
    /// matching everywhere.
    pub fn new<S: AsRef<str>>(markers: &[S]) -> Self {
        let filtered: Vec<&str> = markers
            .iter()
            .map(AsRef::as_ref)
            .filter(|m| !m.trim().is_empty())
            .collect();
        if filtered.is_empty() {
            return Self::default();
        }
        Self {
            marker_re: marker_regex(&filtered),
        }
    }

    /// Clean a raw response against the source paragraph it translates.
    ///
    /// Trims whitespace, strips exactly one wrapping quote pair, then keeps
    /// only what follows the last leaked prompt marker — unless nothing
    /// follows it, in which case the text is left unchanged rather than
    /// returned empty. A cleaned-to-source length ratio above 3.0 is logged
    /// as a warning and the text kept unmodified.
    pub fn clean(&self, raw: &str, original: &str) -> String {
        let mut cleaned = raw.trim().to_string();

        cleaned = strip_quote_layer(&cleaned);

        if let Some(last) = self.marker_re.find_iter(&cleaned).last() {
            let remainder = cleaned[last.end()..]
                .trim_start_matches(|c: char| c == ':' || c.is_whitespace());
            if !remainder.is_empty() {
                let stripped = cleaned.chars().count() - remainder.chars().count();
                warn!(
                    "Stripped leaked prompt content from response | marker={} stripped_chars={}",
                    last.as_str(),
                    stripped
                );
                cleaned = remainder.to_string();
            }
        }

        let original_len = original.chars().count();
        if original_len > 0 {
            let ratio = cleaned.chars().count() as f64 / original_len as f64;
            if ratio > LENGTH_RATIO_LIMIT {
                warn!(
                    "Response length ratio {:.1} suggests a possible context leak | response_chars={} source_chars={}",
                    ratio,
                    cleaned.chars().count(),
                    original_len
                );
            }
        }

        cleaned
    }
}

/// Strip exactly one layer of matching wrapping quotes, then re-trim
fn strip_quote_layer(text: &str) -> String {
    let mut chars = text.chars();
    let (first, last) = match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) => (first, last),
        _ => return text.to_string(),
    };
    for &(open, close) in QUOTE_PAIRS {
        if first == open && last == close {
            let inner: String = text
                .chars()
                .skip(1)
                .take(text.chars().count() - 2)
                .collect();
            return inner.trim().to_string();
        }
    }
    text.to_string()
}
