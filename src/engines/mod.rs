/*!
 * Speech engine backends.
 *
 * This module contains the engine seam and its implementations:
 * - espeak: spawns the espeak-ng binary (default backend)
 * - native: the operating system speech service, behind the `native-tts` feature
 * - mock: scripted in-process engine for tests and dry runs
 */

use async_trait::async_trait;
use std::fmt::Debug;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use uuid::Uuid;

use crate::app_config::{EngineSettings, SpeechEngineKind};
use crate::errors::EngineError;
use crate::language_utils::SynthLocale;

/// Identifier of a single utterance submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId(Uuid);

impl UtteranceId {
    /// Mint a fresh utterance id
    pub fn new() -> Self {
        UtteranceId(Uuid::new_v4())
    }
}

impl Default for UtteranceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One invocation of a speech engine over a span of text
#[derive(Debug, Clone)]
pub struct Utterance {
    /// Utterance id, echoed in engine events
    pub id: UtteranceId,
    /// The text to speak
    pub text: String,
    /// Synthesis locale
    pub locale: SynthLocale,
    /// Rate multiplier, 1.0 is the engine's normal rate
    pub rate: f32,
}

impl Utterance {
    /// Create an utterance with a fresh id
    pub fn new<S: Into<String>>(text: S, locale: SynthLocale, rate: f32) -> Self {
        Utterance {
            id: UtteranceId::new(),
            text: text.into(),
            locale,
            rate,
        }
    }
}

/// Events emitted by an engine while processing an utterance
///
/// Boundary events carry a byte offset into the utterance text; mapping the
/// offset back to a word index is the playback controller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The engine started speaking the utterance
    Started { utterance: UtteranceId },
    /// The engine crossed a word boundary at the given byte offset
    WordBoundary { utterance: UtteranceId, char_offset: usize },
    /// The utterance played to completion
    Finished { utterance: UtteranceId },
    /// The utterance was cancelled
    Stopped { utterance: UtteranceId },
    /// The engine gave up on the utterance
    Failed { utterance: UtteranceId, message: String },
}

/// Capability flags reported by a backend
///
/// Callers check these before relying on an operation; unsupported calls
/// return `EngineError::Unsupported`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineFeatures {
    /// Can cancel an in-flight utterance
    pub stop: bool,
    /// Can pause and resume an in-flight utterance
    pub pause: bool,
    /// Honors the utterance rate multiplier
    pub rate: bool,
    /// Emits word-boundary events during playback
    pub word_boundaries: bool,
}

/// Sending half of the engine event channel
pub type EventSender = UnboundedSender<EngineEvent>;

/// Receiving half of the engine event channel
pub type EventReceiver = UnboundedReceiver<EngineEvent>;

/// Create the event channel shared by an engine and its consumer
pub fn event_channel() -> (EventSender, EventReceiver) {
    unbounded_channel()
}

/// Common trait for all speech engine backends
///
/// This trait defines the interface that all engine implementations must follow,
/// allowing them to be used interchangeably by the playback controller. The
/// caller is responsible for cancelling before starting: backends may assume
/// at most one active utterance.
#[async_trait]
pub trait SpeechEngine: Send + Debug {
    /// Capabilities of this backend
    fn features(&self) -> EngineFeatures;

    /// Check that the backend is usable
    ///
    /// # Returns
    /// * `Result<(), EngineError>` - Ok if the engine can speak, or an error
    async fn probe(&mut self) -> Result<(), EngineError>;

    /// Submit an utterance for playback
    ///
    /// Progress is reported asynchronously on the event channel.
    async fn speak(&mut self, utterance: &Utterance) -> Result<(), EngineError>;

    /// Cancel the active utterance, if any
    async fn stop(&mut self) -> Result<(), EngineError>;

    /// Pause the active utterance
    async fn pause(&mut self) -> Result<(), EngineError>;

    /// Resume a paused utterance
    async fn resume(&mut self) -> Result<(), EngineError>;
}

/// Build the configured engine backend, wired to the given event sender
pub fn create_engine(
    kind: SpeechEngineKind,
    settings: &EngineSettings,
    events: EventSender,
) -> Result<Box<dyn SpeechEngine>, EngineError> {
    match kind {
        SpeechEngineKind::Espeak => Ok(Box::new(espeak::EspeakEngine::new(
            settings.command.clone(),
            events,
        ))),
        #[cfg(feature = "native-tts")]
        SpeechEngineKind::Native => Ok(Box::new(native::NativeEngine::new(
            settings.voice.clone(),
            events,
        )?)),
        #[cfg(not(feature = "native-tts"))]
        SpeechEngineKind::Native => Err(EngineError::Unavailable(
            "built without the native-tts feature".to_string(),
        )),
        SpeechEngineKind::Mock => Ok(Box::new(
            mock::MockEngine::working(events).with_word_millis(settings.word_millis),
        )),
    }
}

pub mod espeak;
pub mod mock;
#[cfg(feature = "native-tts")]
pub mod native;
