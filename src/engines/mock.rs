/*!
 * Mock speech engine for tests and dry runs.
 *
 * This module provides a scripted engine that simulates different behaviors:
 * - `MockEngine::working()` - Speaks silently, emitting timed word boundaries
 * - `MockEngine::no_pause()` - Like working, but without pause support
 * - `MockEngine::silent()` - Accepts utterances and never finishes them
 * - `MockEngine::failing()` - Always fails to speak
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::{Duration, sleep};

use crate::document_processor::split_words;
use crate::engines::{EngineEvent, EngineFeatures, EventSender, SpeechEngine, Utterance, UtteranceId};
use crate::errors::EngineError;

/// Behavior mode for the mock engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Plays every utterance, emitting a boundary event per word
    Working,
    /// Plays utterances but reports pause as unsupported
    NoPause,
    /// Accepts utterances and never completes them
    Silent,
    /// Always fails to speak
    Failing,
}

/// Scripted speech engine
///
/// Emits the full event sequence a platform engine would produce, with word
/// boundaries derived from the utterance's own word offsets, paced by a
/// configurable per-word delay. Doubles as the no-audio dry-run backend.
#[derive(Debug)]
pub struct MockEngine {
    /// Behavior mode
    behavior: MockBehavior,
    /// Delay between word boundaries
    word_millis: u64,
    /// Event channel to the playback controller
    events: EventSender,
    /// Currently playing utterance, shared with the pacing task
    active: Arc<Mutex<Option<UtteranceId>>>,
    /// Pause flag observed by the pacing task
    paused: Arc<AtomicBool>,
    /// Texts submitted for playback, for assertions
    spoken: Arc<Mutex<Vec<String>>>,
}

impl MockEngine {
    /// Create a mock engine with the specified behavior
    pub fn new(behavior: MockBehavior, events: EventSender) -> Self {
        MockEngine {
            behavior,
            word_millis: 5,
            events,
            active: Arc::new(Mutex::new(None)),
            paused: Arc::new(AtomicBool::new(false)),
            spoken: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock engine
    pub fn working(events: EventSender) -> Self {
        Self::new(MockBehavior::Working, events)
    }

    /// Create a working mock engine without pause support
    pub fn no_pause(events: EventSender) -> Self {
        Self::new(MockBehavior::NoPause, events)
    }

    /// Create a mock engine that never finishes an utterance
    pub fn silent(events: EventSender) -> Self {
        Self::new(MockBehavior::Silent, events)
    }

    /// Create a mock engine that always fails to speak
    pub fn failing(events: EventSender) -> Self {
        Self::new(MockBehavior::Failing, events)
    }

    /// Set the delay between word-boundary events
    pub fn with_word_millis(mut self, word_millis: u64) -> Self {
        self.word_millis = word_millis;
        self
    }

    /// Texts that were submitted for playback
    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken.lock().clone()
    }

    /// Whether an utterance is currently active
    pub fn is_active(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Whether the engine is currently paused
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

impl Clone for MockEngine {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            word_millis: self.word_millis,
            events: self.events.clone(),
            active: Arc::clone(&self.active),
            paused: Arc::clone(&self.paused),
            spoken: Arc::clone(&self.spoken),
        }
    }
}

#[async_trait]
impl SpeechEngine for MockEngine {
    fn features(&self) -> EngineFeatures {
        EngineFeatures {
            stop: true,
            pause: self.behavior != MockBehavior::NoPause,
            rate: true,
            word_boundaries: self.behavior == MockBehavior::Working,
        }
    }

    async fn probe(&mut self) -> Result<(), EngineError> {
        match self.behavior {
            MockBehavior::Failing => Err(EngineError::Unavailable(
                "simulated unavailable engine".to_string(),
            )),
            _ => Ok(()),
        }
    }

    async fn speak(&mut self, utterance: &Utterance) -> Result<(), EngineError> {
        if self.behavior == MockBehavior::Failing {
            return Err(EngineError::Synthesis("simulated engine failure".to_string()));
        }

        self.spoken.lock().push(utterance.text.clone());

        let id = utterance.id;
        *self.active.lock() = Some(id);
        self.paused.store(false, Ordering::SeqCst);
        let _ = self.events.send(EngineEvent::Started { utterance: id });

        if self.behavior == MockBehavior::Silent {
            return Ok(());
        }

        let words = split_words(&utterance.text);
        let active = Arc::clone(&self.active);
        let paused = Arc::clone(&self.paused);
        let events = self.events.clone();
        let word_millis = self.word_millis;

        tokio::spawn(async move {
            for span in words {
                // Hold position while paused, bail out once cancelled
                loop {
                    if *active.lock() != Some(id) {
                        return;
                    }
                    if !paused.load(Ordering::SeqCst) {
                        break;
                    }
                    sleep(Duration::from_millis(1)).await;
                }
                let _ = events.send(EngineEvent::WordBoundary {
                    utterance: id,
                    char_offset: span.start,
                });
                sleep(Duration::from_millis(word_millis)).await;
            }

            let finished = {
                let mut slot = active.lock();
                if *slot == Some(id) {
                    *slot = None;
                    true
                } else {
                    false
                }
            };
            if finished {
                let _ = events.send(EngineEvent::Finished { utterance: id });
            }
        });

        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EngineError> {
        if let Some(id) = self.active.lock().take() {
            let _ = self.events.send(EngineEvent::Stopped { utterance: id });
        }
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), EngineError> {
        if self.behavior == MockBehavior::NoPause {
            return Err(EngineError::Unsupported { feature: "pause" });
        }
        self.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), EngineError> {
        if self.behavior == MockBehavior::NoPause {
            return Err(EngineError::Unsupported { feature: "pause" });
        }
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }
}
