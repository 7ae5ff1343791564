use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Protected-region policy for chapter documents
    #[serde(default)]
    pub protection: ProtectionPolicy,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            protection: ProtectionPolicy::default(),
            log_level: LogLevel::default(),
        }
    }
}

/// Settings for the translation backend and the per-chapter pipeline
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Model name (e.g., "llama3.2:3b", "mistral")
    #[serde(default = "default_model")]
    pub model: String,

    /// Ollama service endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Sampling temperature passed to the model
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Retries per paragraph on transient failures (attempts = retries + 1)
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Number of chapters translated concurrently
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Rolling window of recent paragraph translations fed back as context
    /// for consistent tone/terminology; 0 disables the window
    #[serde(default = "default_context_paragraphs")]
    pub context_paragraphs: usize,

    /// Character budget for the whole-chapter context excerpt
    #[serde(default = "default_chapter_context_chars")]
    pub chapter_context_chars: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Prompt section headers the sanitizer strips when the model echoes
    /// them back; localizable to match the prompt language
    #[serde(default = "default_prompt_echo_markers")]
    pub prompt_echo_markers: Vec<String>,

    /// When set, a run with any failed paragraph does not write the
    /// translated EPUB (the report is still written)
    #[serde(default)]
    pub abort_on_error: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
            temperature: default_temperature(),
            retries: default_retries(),
            workers: default_workers(),
            context_paragraphs: default_context_paragraphs(),
            chapter_context_chars: default_chapter_context_chars(),
            timeout_secs: default_timeout_secs(),
            prompt_echo_markers: default_prompt_echo_markers(),
            abort_on_error: false,
        }
    }
}

/// Which document regions are protected from translation.
///
/// The tag and attribute sets are policy, not fixed logic: readers disagree on
/// whether link and footnote regions should be translated, so both are
/// swappable here without touching the traversal in the classifier.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProtectionPolicy {
    /// Treat anchor elements as protected regions
    #[serde(default = "default_protect_links")]
    pub protect_links: bool,

    /// Tags whose content is code-like and must not be rewritten
    #[serde(default = "default_code_tags")]
    pub code_tags: Vec<String>,

    /// Tags that hold document metadata rather than prose
    #[serde(default = "default_metadata_tags")]
    pub metadata_tags: Vec<String>,

    /// Substrings of class names that mark footnote apparatus
    #[serde(default = "default_footnote_class_keywords")]
    pub footnote_class_keywords: Vec<String>,
}

impl Default for ProtectionPolicy {
    fn default() -> Self {
        Self {
            protect_links: default_protect_links(),
            code_tags: default_code_tags(),
            metadata_tags: default_metadata_tags(),
            footnote_class_keywords: default_footnote_class_keywords(),
        }
    }
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's level filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "it".to_string()
}

fn default_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_retries() -> u32 {
    3
}

fn default_workers() -> usize {
    1
}

fn default_context_paragraphs() -> usize {
    3
}

fn default_chapter_context_chars() -> usize {
    500
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_prompt_echo_markers() -> Vec<String> {
    crate::sanitizer::DEFAULT_ECHO_MARKERS
        .iter()
        .map(|m| m.to_string())
        .collect()
}

fn default_protect_links() -> bool {
    true
}

fn default_code_tags() -> Vec<String> {
    vec!["code".to_string(), "pre".to_string()]
}

fn default_metadata_tags() -> Vec<String> {
    vec![
        "head".to_string(),
        "title".to_string(),
        "style".to_string(),
        "script".to_string(),
    ]
}

fn default_footnote_class_keywords() -> Vec<String> {
    vec![
        "footnote".to_string(),
        "fn-".to_string(),
        "note-ref".to_string(),
    ]
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        let config: Config = serde_json::from_str(&content).with_context(|| {
            format!("Failed to parse config file: {}", path.as_ref().display())
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file, creating a default one if it doesn't exist
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            let config = Config::default();
            config.save_to_file(path.as_ref())?;
            Ok(config)
        }
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content).with_context(|| {
            format!("Failed to write config file: {}", path.as_ref().display())
        })?;
        Ok(())
    }

    /// Validate the configuration, rejecting out-of-range values before any work starts
    pub fn validate(&self) -> Result<()> {
        if self.source_language.trim().is_empty() {
            return Err(anyhow!("Source language cannot be empty"));
        }
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language cannot be empty"));
        }
        if self.translation.model.trim().is_empty() {
            return Err(anyhow!("Model name cannot be empty"));
        }
        if !(0.0..=2.0).contains(&self.translation.temperature) {
            return Err(anyhow!(
                "Temperature must be between 0.0 and 2.0, got {}",
                self.translation.temperature
            ));
        }
        if self.translation.retries > 10 {
            return Err(anyhow!(
                "Retries must be between 0 and 10, got {}",
                self.translation.retries
            ));
        }
        if self.translation.workers == 0 {
            return Err(anyhow!("Workers must be at least 1"));
        }
        if !(100..=5000).contains(&self.translation.chapter_context_chars) {
            return Err(anyhow!(
                "Chapter context budget must be between 100 and 5000 characters, got {}",
                self.translation.chapter_context_chars
            ));
        }
        Ok(())
    }
}
