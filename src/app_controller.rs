// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use tokio::io::AsyncBufReadExt;
use tokio::sync::mpsc;

use crate::app_config::Config;
use crate::document_processor::{DocumentText, cap_words};
use crate::engines;
use crate::errors::{EngineError, ExtractionError};
use crate::language_utils::{self, SynthLocale};
use crate::playback::{PlaybackController, PlaybackState, PlaybackUpdate, SpeakOutcome};

// @module: Application controller for read-aloud sessions

/// Where the session's initial text comes from
#[derive(Debug, Clone)]
pub enum SessionInput {
    /// Extract text from a document file
    File(PathBuf),
    /// Use the given text directly
    Text(String),
}

/// Options for a controller run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Read playback commands from stdin
    pub interactive: bool,
    /// Start playback at this word index instead of the beginning
    pub from_word: Option<usize>,
}

/// Main application controller for read-aloud playback
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with the mock engine
    pub fn new_for_test() -> Result<Self> {
        let mut config = Config::default();
        config.speech.engine = crate::app_config::SpeechEngineKind::Mock;
        Self::with_config(config)
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        self.config.validate().is_ok()
    }

    /// Build a reading session over the configured engine
    pub fn build_session(&self) -> Result<ReadingSession> {
        let settings = self
            .config
            .get_engine_settings()
            .ok_or_else(|| anyhow!("No settings for engine: {}", self.config.speech.engine))?;

        let (events_tx, events_rx) = engines::event_channel();
        let engine = engines::create_engine(self.config.speech.engine, settings, events_tx)
            .context("Failed to create speech engine")?;
        let playback = PlaybackController::new(engine, events_rx, self.config.speech.rate);

        ReadingSession::new(self.config.clone(), playback)
    }

    /// Run a read-aloud session over the given input
    pub async fn run(&self, input: SessionInput, options: RunOptions) -> Result<()> {
        let mut session = self.build_session()?;

        // The one user-visible error path for a missing synthesizer
        if let Err(e) = session.playback.probe().await {
            error!("Speech synthesis is not available: {}", e);
            return Err(e.into());
        }

        match input {
            SessionInput::File(path) => session
                .load_file(&path)
                .with_context(|| format!("Failed to load document: {:?}", path))?,
            SessionInput::Text(text) => session.load_text(&text),
        }

        if session.document.is_empty() {
            warn!("Document contains no speakable text");
            return Ok(());
        }

        info!(
            "Loaded {} - {} - language: {} ({})",
            session.document,
            session.word_count_display(),
            session.locale.code(),
            session.locale.name()
        );
        if session.is_truncated() {
            warn!(
                "Document exceeds the {}-word utterance cap; speaking the first {} words",
                self.config.speech.max_words, self.config.speech.max_words
            );
        }

        let progress = session.make_progress_bar();

        match options.from_word {
            Some(index) => session.speak_from(index).await?,
            None => {
                session.speak().await?;
            }
        }

        // Document loads finish on this channel, tagged with their generation
        let (loads_tx, mut loads_rx) = mpsc::unbounded_channel::<LoadResult>();
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = options.interactive;

        loop {
            tokio::select! {
                update = session.playback.next_update() => {
                    match update {
                        Some(update) => {
                            let finished = session.render_update(&progress, update);
                            if finished && !stdin_open {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                Some(load) = loads_rx.recv() => {
                    session.finish_load(load);
                }
                line = lines.next_line(), if stdin_open => {
                    match line {
                        Ok(Some(line)) => {
                            if session.handle_command(line.trim(), &loads_tx).await? {
                                break;
                            }
                        }
                        // stdin closed: keep playing until the utterance ends
                        Ok(None) => {
                            stdin_open = false;
                            if !session.playback.is_active() {
                                break;
                            }
                        }
                        Err(e) => return Err(e).context("Failed to read command"),
                    }
                }
            }
        }

        session.playback.stop().await.ok();
        progress.finish_and_clear();
        Ok(())
    }
}

// Completed document load: generation tag plus the extraction outcome
struct LoadResult {
    generation: u64,
    path: PathBuf,
    outcome: Result<DocumentText, ExtractionError>,
}

/// One read-aloud session: a document, its locale and the playback slot
pub struct ReadingSession {
    config: Config,
    /// Current document text; replaced wholesale by loads
    document: DocumentText,
    /// Locale handed to the engine
    locale: SynthLocale,
    /// Manual language override; None means auto-detect on every load
    language_override: Option<SynthLocale>,
    /// Generation of the latest requested load; stale completions are dropped
    load_generation: u64,
    /// Playback controller over the configured engine
    pub playback: PlaybackController,
}

impl ReadingSession {
    /// Create an empty session
    pub fn new(config: Config, playback: PlaybackController) -> Result<Self> {
        let language_override = if config.language == "auto" {
            None
        } else {
            Some(language_utils::resolve_override(&config.language)?)
        };

        Ok(ReadingSession {
            config,
            document: DocumentText::from_text(""),
            locale: language_override.unwrap_or_default(),
            language_override,
            load_generation: 0,
            playback,
        })
    }

    /// The session's current document
    pub fn document(&self) -> &DocumentText {
        &self.document
    }

    /// The locale playback will use
    pub fn locale(&self) -> SynthLocale {
        self.locale
    }

    /// Replace the document with typed text
    pub fn load_text(&mut self, text: &str) {
        self.load_generation += 1;
        self.document = DocumentText::from_text(text);
        self.refresh_locale();
    }

    /// Replace the document with text extracted from a file
    ///
    /// On any extraction failure the current document and locale are left
    /// unchanged.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ExtractionError> {
        let document = DocumentText::extract_from_file(path)?;
        self.load_generation += 1;
        self.document = document;
        self.refresh_locale();
        Ok(())
    }

    /// Reserve a generation tag for an asynchronous load
    pub fn begin_load(&mut self) -> u64 {
        self.load_generation += 1;
        self.load_generation
    }

    /// Apply an asynchronously loaded document, unless it went stale
    ///
    /// Returns false when a newer load or text replacement has superseded
    /// this generation; the stale result is discarded.
    pub fn apply_load(&mut self, generation: u64, document: DocumentText) -> bool {
        if generation != self.load_generation {
            return false;
        }
        self.document = document;
        self.refresh_locale();
        true
    }

    /// Set or clear the manual language override ("auto" clears it)
    pub fn set_language(&mut self, code: &str) -> Result<()> {
        if code.eq_ignore_ascii_case("auto") {
            self.language_override = None;
        } else {
            self.language_override = Some(language_utils::resolve_override(code)?);
        }
        self.refresh_locale();
        Ok(())
    }

    /// Word count display in the form "12 / 225"
    pub fn word_count_display(&self) -> String {
        format!(
            "{} / {}",
            self.document.word_count(),
            self.config.speech.max_words
        )
    }

    /// Whether the cap will truncate the spoken text
    pub fn is_truncated(&self) -> bool {
        self.document.word_count() > self.config.speech.max_words
    }

    /// The text playback submits for a full-document utterance
    ///
    /// The utterance cap is an application-layer concern: the document keeps
    /// its full text, only the spoken span is limited.
    pub fn utterance_text(&self) -> &str {
        self.document.prefix_words(self.config.speech.max_words)
    }

    /// Speak the document, or stop if playback is already active
    pub async fn speak(&mut self) -> Result<SpeakOutcome, EngineError> {
        if self.document.is_empty() {
            debug!("Ignoring speak request for empty document");
            return Ok(SpeakOutcome::Stopped);
        }
        let text = self.utterance_text().to_string();
        self.playback.speak(&text, self.locale).await
    }

    /// Restart playback from the given document word
    pub async fn speak_from(&mut self, word_index: usize) -> Result<()> {
        let suffix = self
            .document
            .suffix_from(word_index)
            .ok_or_else(|| {
                anyhow!(
                    "Word index {} out of range ({} words)",
                    word_index,
                    self.document.word_count()
                )
            })?
            .to_string();
        let capped = cap_words(&suffix, self.config.speech.max_words).to_string();
        self.playback
            .speak_from(&capped, word_index, self.locale)
            .await?;
        Ok(())
    }

    /// Pause/resume toggle, delegated to the playback controller
    pub async fn toggle_pause(&mut self) -> Result<PlaybackState, EngineError> {
        self.playback.toggle_pause().await
    }

    // Re-run detection over the current text, unless manually overridden.
    // No confidence threshold and no hysteresis; blank text keeps the
    // previous locale.
    fn refresh_locale(&mut self) {
        if let Some(locale) = self.language_override {
            self.locale = locale;
            return;
        }
        if let Some(locale) = language_utils::detect_locale(self.document.text()) {
            if locale != self.locale {
                debug!("Detected language changed to {}", locale.code());
            }
            self.locale = locale;
        }
    }

    // Progress bar standing in for spoken-word highlighting
    fn make_progress_bar(&self) -> ProgressBar {
        let total = self
            .document
            .word_count()
            .min(self.config.speech.max_words);
        let progress = ProgressBar::new(total as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner} [{bar:40}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(template_result);
        progress
    }

    // Fold a playback update into the display; returns true when playback
    // came to rest
    fn render_update(&mut self, progress: &ProgressBar, update: PlaybackUpdate) -> bool {
        match update {
            PlaybackUpdate::Started => {
                progress.set_position(0);
                progress.set_message("");
                false
            }
            PlaybackUpdate::Word { index, word } => {
                progress.set_position((index + 1) as u64);
                progress.set_message(word);
                false
            }
            PlaybackUpdate::Finished => {
                progress.set_message("done");
                true
            }
            PlaybackUpdate::Stopped => {
                progress.set_message("stopped");
                true
            }
            PlaybackUpdate::Failed { message } => {
                error!("Playback failed: {}", message);
                true
            }
        }
    }

    // Handle one interactive command; returns true to quit the session
    async fn handle_command(
        &mut self,
        command: &str,
        loads: &mpsc::UnboundedSender<LoadResult>,
    ) -> Result<bool> {
        let mut parts = command.splitn(2, char::is_whitespace);
        let head = parts.next().unwrap_or_default();
        let rest = parts.next().unwrap_or_default().trim();

        match head {
            "" => {}
            "q" | "quit" => {
                self.playback.stop().await.ok();
                return Ok(true);
            }
            "s" | "speak" => match self.speak().await {
                Ok(SpeakOutcome::Started) => info!("Speaking ({})", self.locale.code()),
                Ok(SpeakOutcome::Stopped) => info!("Stopped"),
                Err(e) => error!("Could not speak: {}", e),
            },
            "p" | "pause" => match self.toggle_pause().await {
                Ok(state) => info!("Playback {}", state),
                Err(EngineError::Unsupported { feature }) => {
                    warn!("The selected engine does not support {}", feature);
                }
                Err(e) => error!("Could not toggle pause: {}", e),
            },
            "o" | "open" => {
                if rest.is_empty() {
                    warn!("Usage: o <path>");
                } else {
                    self.spawn_load(PathBuf::from(rest), loads);
                }
            }
            "l" | "lang" => {
                if rest.is_empty() {
                    info!("Language: {} ({})", self.locale.code(), self.locale.name());
                } else {
                    match self.set_language(rest) {
                        Ok(()) => info!("Language set to {}", self.locale.code()),
                        Err(e) => error!("{}", e),
                    }
                }
            }
            "d" | "doc" => {
                info!("{} - {}", self.document, self.word_count_display());
            }
            _ => match head.parse::<usize>() {
                // A bare word index restarts playback from that word
                Ok(index) => {
                    if let Err(e) = self.speak_from(index).await {
                        error!("{}", e);
                    }
                }
                Err(_) => {
                    warn!(
                        "Unknown command: {} (s=speak/stop, p=pause, <n>=from word, o=open, l=lang, d=doc, q=quit)",
                        head
                    );
                }
            },
        }

        Ok(false)
    }

    // Kick off an asynchronous document load tagged with a fresh generation
    fn spawn_load(&mut self, path: PathBuf, loads: &mpsc::UnboundedSender<LoadResult>) {
        let generation = self.begin_load();
        let loads = loads.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = DocumentText::extract_from_file(&path);
            let _ = loads.send(LoadResult {
                generation,
                path,
                outcome,
            });
        });
    }

    // Fold a completed load back into the session
    fn finish_load(&mut self, load: LoadResult) {
        match load.outcome {
            Ok(document) => {
                if self.apply_load(load.generation, document) {
                    info!(
                        "Loaded {} - {} - language: {}",
                        self.document,
                        self.word_count_display(),
                        self.locale.code()
                    );
                } else {
                    debug!("Discarding stale load of {:?}", load.path);
                }
            }
            Err(e) => {
                // The unsupported-type alert analog; document state unchanged
                error!("{}", e);
            }
        }
    }
}
