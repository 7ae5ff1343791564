// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::Write;
use std::path::PathBuf;

use crate::app_config::{Config, LogLevel};
use app_controller::Controller;
use providers::ollama::Ollama;

mod app_config;
mod app_controller;
mod chapter;
mod classifier;
mod document;
mod epub;
mod errors;
mod providers;
mod report;
mod retry;
mod sanitizer;
mod text_slots;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate an EPUB using a local Ollama model (default command)
    Translate(TranslateArgs),

    /// Generate shell completions for epubtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct TranslateArgs {
    /// Input EPUB file to translate
    #[arg(value_name = "INPUT_EPUB")]
    input_path: Option<PathBuf>,

    /// Output EPUB path (default: <input>.<target-lang>.epub)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report file path (default: <output>.report.json)
    #[arg(long)]
    report_out: Option<PathBuf>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(long)]
    temperature: Option<f32>,

    /// Retries per paragraph on transient failures (0 - 10)
    #[arg(long)]
    retries: Option<u32>,

    /// Number of chapters translated concurrently
    #[arg(short, long)]
    workers: Option<usize>,

    /// Do not write the translated EPUB when any paragraph failed
    #[arg(long)]
    abort_on_error: bool,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// epubtrans - EPUB translation with local AI models
///
/// Translates the paragraph text of an EPUB with a local Ollama model while
/// preserving markup structure, inline styling, and all non-paragraph content.
#[derive(Parser, Debug)]
#[command(name = "epubtrans")]
#[command(version = "1.0.0")]
#[command(about = "AI-powered EPUB translation tool")]
#[command(long_about = "epubtrans rewrites the paragraph text of an EPUB into another language \
using a local Ollama model, leaving markup and non-paragraph content untouched.

EXAMPLES:
    epubtrans book.epub                          # Translate using default config
    epubtrans -s en -t it book.epub              # Translate from English to Italian
    epubtrans -m mistral -w 4 book.epub          # Specific model, 4 chapters in parallel
    epubtrans --abort-on-error book.epub         # Keep the original if anything failed
    epubtrans --log-level debug book.epub        # Verbose per-paragraph logging
    epubtrans completions bash > epubtrans.bash  # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
}

/// Custom logger implementation writing timestamped, colored lines to stderr
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn color_code(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[0m",
            Level::Debug => "\x1B[2m",
            Level::Trace => "\x1B[2m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                Self::color_code(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    let options = CommandLineOptions::parse();

    let args = match options.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            return;
        }
        Some(Commands::Translate(args)) => args,
        None => options.translate,
    };

    match run_translate(args).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run_translate(args: TranslateArgs) -> Result<i32> {
    let mut config = Config::from_file_or_default(&args.config_path)?;
    apply_overrides(&mut config, &args);

    // Init failure means a logger is already installed; keep going.
    let _ = CustomLogger::init(config.log_level.to_level_filter());

    let input_path = args
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("No input EPUB provided"))?;
    if !input_path.exists() {
        return Err(anyhow!("Input file does not exist: {}", input_path.display()));
    }

    let output_path = args.output.clone().unwrap_or_else(|| {
        let stem = input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "translated".to_string());
        input_path.with_file_name(format!("{}.{}.epub", stem, config.target_language))
    });
    let report_path = args.report_out.clone().unwrap_or_else(|| {
        PathBuf::from(format!("{}.report.json", output_path.display()))
    });

    let controller = Controller::with_config(config)?;
    let translator = Ollama::new(
        &controller.config().translation.endpoint,
        controller.config().translation.timeout_secs,
    );

    let result = controller
        .run(&translator, &input_path, &output_path, &report_path)
        .await?;

    info!("Report written: {}", report_path.display());
    println!(
        "{}",
        serde_json::json!({
            "output_written": result.output_written,
            "failures": result.failures,
        })
    );

    Ok(result.exit_code)
}

fn apply_overrides(config: &mut Config, args: &TranslateArgs) {
    if let Some(source) = &args.source_language {
        config.source_language = source.clone();
    }
    if let Some(target) = &args.target_language {
        config.target_language = target.clone();
    }
    if let Some(model) = &args.model {
        config.translation.model = model.clone();
    }
    if let Some(temperature) = args.temperature {
        config.translation.temperature = temperature;
    }
    if let Some(retries) = args.retries {
        config.translation.retries = retries;
    }
    if let Some(workers) = args.workers {
        config.translation.workers = workers;
    }
    if args.abort_on_error {
        config.translation.abort_on_error = true;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone().into();
    }
}
