use log::{debug, warn};

use crate::document_processor::split_words;
use crate::engines::{EngineEvent, EventReceiver, SpeechEngine, Utterance, UtteranceId};
use crate::errors::EngineError;
use crate::language_utils::SynthLocale;
use crate::playback::PlaybackState;
use crate::playback::highlight::HighlightTracker;

// @module: Playback controller

// @struct: Utterance currently owned by the controller
#[derive(Debug)]
struct ActiveUtterance {
    id: UtteranceId,
    tracker: HighlightTracker,
}

/// Outcome of a speak request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakOutcome {
    /// A new utterance was started
    Started,
    /// Playback was already active and has been stopped instead
    Stopped,
}

/// State change derived from an engine event, for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackUpdate {
    /// The engine confirmed playback started
    Started,
    /// The spoken word moved; index is document-absolute
    Word { index: usize, word: String },
    /// The utterance played to completion
    Finished,
    /// The utterance was cancelled
    Stopped,
    /// The engine failed mid-utterance
    Failed { message: String },
}

/// Controller for the single utterance slot
///
/// Holds the playback state machine and enforces the one-active-utterance
/// invariant: every start cancels whatever was playing first. Engine events
/// arrive on the channel handed over at construction; events from utterances
/// that are no longer current are dropped.
pub struct PlaybackController {
    engine: Box<dyn SpeechEngine>,
    events: EventReceiver,
    state: PlaybackState,
    rate: f32,
    active: Option<ActiveUtterance>,
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("rate", &self.rate)
            .finish()
    }
}

impl PlaybackController {
    /// Create a controller over an engine and its event channel
    pub fn new(engine: Box<dyn SpeechEngine>, events: EventReceiver, rate: f32) -> Self {
        PlaybackController {
            engine,
            events,
            state: PlaybackState::Idle,
            rate,
            active: None,
        }
    }

    /// Current playback state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Document-absolute index of the word being spoken, for highlighting
    pub fn current_word(&self) -> Option<usize> {
        self.active
            .as_ref()
            .and_then(|active| active.tracker.current_word())
    }

    /// Whether an utterance is active (speaking or paused)
    pub fn is_active(&self) -> bool {
        self.state != PlaybackState::Idle
    }

    /// Check that the engine is usable
    pub async fn probe(&mut self) -> Result<(), EngineError> {
        self.engine.probe().await
    }

    /// Speak a text, or stop if playback is already active
    ///
    /// Toggle semantics: a speak request while speaking or paused stops
    /// playback and does not start a new utterance.
    pub async fn speak(
        &mut self,
        text: &str,
        locale: SynthLocale,
    ) -> Result<SpeakOutcome, EngineError> {
        if self.is_active() {
            self.stop().await?;
            return Ok(SpeakOutcome::Stopped);
        }
        self.start_utterance(text, locale, 0).await?;
        Ok(SpeakOutcome::Started)
    }

    /// Restart playback from a document suffix
    ///
    /// `base_index` is the document word index the suffix starts at; boundary
    /// events are reported relative to the suffix and mapped back through it.
    /// Unlike `speak`, this always starts, cancelling any active utterance.
    pub async fn speak_from(
        &mut self,
        suffix: &str,
        base_index: usize,
        locale: SynthLocale,
    ) -> Result<(), EngineError> {
        self.start_utterance(suffix, locale, base_index).await
    }

    /// Pause if speaking, resume if paused
    ///
    /// Delegates directly to the engine; does nothing when idle. Backends
    /// without pause support surface `EngineError::Unsupported`.
    pub async fn toggle_pause(&mut self) -> Result<PlaybackState, EngineError> {
        match self.state {
            PlaybackState::Speaking => {
                self.engine.pause().await?;
                self.state = PlaybackState::Paused;
            }
            PlaybackState::Paused => {
                self.engine.resume().await?;
                self.state = PlaybackState::Speaking;
            }
            PlaybackState::Idle => {}
        }
        Ok(self.state)
    }

    /// Cancel the active utterance and return to idle
    pub async fn stop(&mut self) -> Result<(), EngineError> {
        self.engine.stop().await?;
        self.state = PlaybackState::Idle;
        self.active = None;
        Ok(())
    }

    /// Wait for the next engine event and fold it into the state machine
    ///
    /// Returns None when the engine side of the channel is gone.
    pub async fn next_update(&mut self) -> Option<PlaybackUpdate> {
        loop {
            let event = self.events.recv().await?;
            if let Some(update) = self.apply_event(event) {
                return Some(update);
            }
        }
    }

    /// Fold one engine event into the state machine
    ///
    /// Events for utterances that are no longer current (cancelled just
    /// before their events drained) produce no update.
    pub fn apply_event(&mut self, event: EngineEvent) -> Option<PlaybackUpdate> {
        let current_id = self.active.as_ref().map(|active| active.id);
        match event {
            EngineEvent::Started { utterance } if Some(utterance) == current_id => {
                Some(PlaybackUpdate::Started)
            }
            EngineEvent::WordBoundary {
                utterance,
                char_offset,
            } if Some(utterance) == current_id => {
                let active = self.active.as_mut()?;
                let index = active.tracker.on_boundary(char_offset)?;
                let word = active
                    .tracker
                    .current_word_text()
                    .unwrap_or_default()
                    .to_string();
                Some(PlaybackUpdate::Word { index, word })
            }
            EngineEvent::Finished { utterance } if Some(utterance) == current_id => {
                self.state = PlaybackState::Idle;
                self.active = None;
                Some(PlaybackUpdate::Finished)
            }
            EngineEvent::Stopped { utterance } if Some(utterance) == current_id => {
                self.state = PlaybackState::Idle;
                self.active = None;
                Some(PlaybackUpdate::Stopped)
            }
            EngineEvent::Failed { utterance, message } if Some(utterance) == current_id => {
                self.state = PlaybackState::Idle;
                self.active = None;
                Some(PlaybackUpdate::Failed { message })
            }
            other => {
                debug!("Dropping event for stale utterance: {:?}", other);
                None
            }
        }
    }

    // Cancel whatever is active, then submit a new utterance
    async fn start_utterance(
        &mut self,
        text: &str,
        locale: SynthLocale,
        base_index: usize,
    ) -> Result<(), EngineError> {
        // The engine permits only one active utterance
        self.engine.stop().await?;
        self.active = None;

        let utterance = Utterance::new(text, locale, self.rate);
        let tracker = HighlightTracker::new(split_words(text), base_index);
        self.active = Some(ActiveUtterance {
            id: utterance.id,
            tracker,
        });

        if let Err(e) = self.engine.speak(&utterance).await {
            warn!("Engine rejected utterance: {}", e);
            self.state = PlaybackState::Idle;
            self.active = None;
            return Err(e);
        }

        self.state = PlaybackState::Speaking;
        Ok(())
    }
}
