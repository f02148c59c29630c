// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, warn};
use std::fs::File;
use std::io::{BufReader, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use crate::app_config::{Config, SpeechEngineKind};
use app_controller::{Controller, RunOptions, SessionInput};

mod app_config;
mod app_controller;
mod document_processor;
mod engines;
mod errors;
mod file_utils;
mod language_utils;
mod playback;

/// CLI Wrapper for SpeechEngineKind to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliEngineKind {
    Espeak,
    Native,
    Mock,
}

impl From<CliEngineKind> for SpeechEngineKind {
    fn from(cli_engine: CliEngineKind) -> Self {
        match cli_engine {
            CliEngineKind::Espeak => SpeechEngineKind::Espeak,
            CliEngineKind::Native => SpeechEngineKind::Native,
            CliEngineKind::Mock => SpeechEngineKind::Mock,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read a document or typed text aloud (default command)
    #[command(alias = "read")]
    Speak(SpeakArgs),

    /// Generate shell completions for readaloud
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct SpeakArgs {
    /// Document file to read aloud (.pdf, .docx or plain text)
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Text to speak instead of a document file
    #[arg(short, long)]
    text: Option<String>,

    /// Synthesis language code (e.g. 'en', 'fr', 'ar'); auto-detected if omitted
    #[arg(short, long)]
    language: Option<String>,

    /// Speech engine to use
    #[arg(short, long, value_enum)]
    engine: Option<CliEngineKind>,

    /// Speech rate multiplier (1.0 is normal speed)
    #[arg(short, long)]
    rate: Option<f32>,

    /// Start playback at this word index
    #[arg(short = 'w', long)]
    from_word: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Do not read playback commands from stdin
    #[arg(short, long)]
    no_input: bool,
}

/// readaloud - document-to-speech reader
///
/// Reads typed text or PDF/DOCX documents aloud through a speech synthesizer,
/// with automatic language detection and interactive playback control.
#[derive(Parser, Debug)]
#[command(name = "readaloud")]
#[command(version = "1.0.0")]
#[command(about = "Document-to-speech reader")]
#[command(long_about = "readaloud converts typed text or PDF/DOCX documents into speech using a
platform synthesizer, detecting the text language automatically.

EXAMPLES:
    readaloud report.pdf                      # Read a PDF aloud
    readaloud notes.docx -l fr                # Read a DOCX as French
    readaloud -t \"Hello there\"                # Speak typed text
    readaloud report.pdf -w 42                # Start from word 42
    readaloud -e mock report.pdf              # Dry run without audio
    echo \"Hello\" | readaloud                  # Speak piped text
    readaloud completions bash > readaloud.bash

INTERACTIVE COMMANDS (while running):
    s          speak / stop toggle
    p          pause / resume toggle
    <n>        restart playback from word n
    o <path>   open another document
    l <code>   set the language (or 'l auto')
    d          show document info
    q          quit

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

SUPPORTED ENGINES:
    espeak  - espeak-ng synthesizer subprocess (default)
    native  - OS speech service (requires the native-tts build feature)
    mock    - silent scripted engine for dry runs")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Document file to read aloud (.pdf, .docx or plain text)
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Text to speak instead of a document file
    #[arg(short, long)]
    text: Option<String>,

    /// Synthesis language code (e.g. 'en', 'fr', 'ar'); auto-detected if omitted
    #[arg(short, long)]
    language: Option<String>,

    /// Speech engine to use
    #[arg(short, long, value_enum)]
    engine: Option<CliEngineKind>,

    /// Speech rate multiplier (1.0 is normal speed)
    #[arg(short, long)]
    rate: Option<f32>,

    /// Start playback at this word index
    #[arg(short = 'w', long)]
    from_word: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Do not read playback commands from stdin
    #[arg(short, long)]
    no_input: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Marker for log level
    fn get_marker_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "error:",
            Level::Warn => "warn:",
            Level::Info => "",
            Level::Debug => "debug:",
            Level::Trace => "trace:",
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
            let marker = Self::get_marker_for_level(record.level());

            let mut stderr = std::io::stderr();
            let color = match record.level() {
                Level::Error => "\x1B[1;31m",
                Level::Warn => "\x1B[1;33m",
                Level::Info => "\x1B[1;32m",
                Level::Debug => "\x1B[1;36m",
                Level::Trace => "\x1B[1;35m",
            };
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                color,
                now,
                marker,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "readaloud", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Speak(args)) => run_speak(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let speak_args = SpeakArgs {
                input_path: cli.input_path,
                text: cli.text,
                language: cli.language,
                engine: cli.engine,
                rate: cli.rate,
                from_word: cli.from_word,
                config_path: cli.config_path,
                log_level: cli.log_level,
                no_input: cli.no_input,
            };
            run_speak(speak_args).await
        }
    }
}

async fn run_speak(options: SpeakArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(to_level_filter(&config_log_level));
    }

    // Load or create configuration
    let config_path = resolve_config_path(&options.config_path);
    let config = if config_path.exists() {
        // Load existing configuration
        let file = File::open(&config_path)
            .context(format!("Failed to open config file: {:?}", config_path))?;

        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {:?}", config_path))?;

        // Override config with CLI options if provided
        if let Some(engine) = &options.engine {
            config.speech.engine = engine.clone().into();
        }

        if let Some(language) = &options.language {
            config.language = language.clone();
        }

        if let Some(rate) = options.rate {
            config.speech.rate = rate;
        }

        // Update log level in config if specified via command line
        if let Some(log_level) = &options.log_level {
            config.log_level = log_level.clone().into();
        }

        config
    } else {
        // Create default configuration if not exists
        warn!(
            "Config file not found at '{}', creating default config.",
            options.config_path
        );

        let mut config = Config::default();

        if let Some(engine) = &options.engine {
            config.speech.engine = engine.clone().into();
        }
        if let Some(language) = &options.language {
            config.language = language.clone();
        }
        if let Some(rate) = options.rate {
            config.speech.rate = rate;
        }
        if let Some(log_level) = &options.log_level {
            config.log_level = log_level.clone().into();
        }

        // Save default config
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(&options.config_path, config_json).context(format!(
            "Failed to write default config to file: {}",
            options.config_path
        ))?;

        config
    };

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(to_level_filter(&config.log_level));
    }

    // Create controller
    let controller = Controller::with_config(config)?;

    // Resolve the session input: file, typed text, or piped stdin
    let stdin_is_tty = std::io::stdin().is_terminal();
    let (input, input_from_stdin) = if let Some(path) = options.input_path {
        if !path.exists() {
            return Err(anyhow!("Input path does not exist: {:?}", path));
        }
        (SessionInput::File(path), false)
    } else if let Some(text) = options.text {
        (SessionInput::Text(text), false)
    } else if !stdin_is_tty {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read text from stdin")?;
        (SessionInput::Text(text), true)
    } else {
        return Err(anyhow!(
            "No input: pass a document path, --text, or pipe text on stdin"
        ));
    };

    // Interactive control needs a terminal that is not already the text source
    let run_options = RunOptions {
        interactive: stdin_is_tty && !input_from_stdin && !options.no_input,
        from_word: options.from_word,
    };

    controller.run(input, run_options).await
}

// Map the config log level onto the log crate's filter
fn to_level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

// Prefer the given path; fall back to the user config directory when the
// local file is absent but a previously saved one exists there
fn resolve_config_path(config_path: &str) -> PathBuf {
    let local = Path::new(config_path);
    if local.exists() {
        return local.to_path_buf();
    }
    if let Some(config_dir) = dirs::config_dir() {
        let fallback = config_dir.join("readaloud").join("conf.json");
        if fallback.exists() {
            return fallback;
        }
    }
    local.to_path_buf()
}
