use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::time::{Duration, sleep};
use tts::Tts;

use crate::engines::{EngineEvent, EngineFeatures, EventSender, SpeechEngine, Utterance, UtteranceId};
use crate::errors::EngineError;

// @module: Native OS speech service backend (tts crate)

/// Speech engine backed by the operating system's speech service
///
/// Wraps the `tts` crate (speech-dispatcher on Linux, AVSpeech on macOS,
/// WinRT on Windows). Utterance lifecycle callbacks are forwarded onto the
/// event channel; platforms without callbacks fall back to polling
/// `is_speaking`. The service exposes no pause control and no word-boundary
/// notifications through this interface.
pub struct NativeEngine {
    tts: Tts,
    /// Preferred voice name fragment from configuration, may be empty
    preferred_voice: String,
    events: EventSender,
    /// Currently playing utterance, shared with the service callbacks
    current: Arc<Mutex<Option<UtteranceId>>>,
}

impl std::fmt::Debug for NativeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeEngine")
            .field("preferred_voice", &self.preferred_voice)
            .finish()
    }
}

impl NativeEngine {
    /// Connect to the platform speech service and register callbacks
    pub fn new(preferred_voice: String, events: EventSender) -> Result<Self, EngineError> {
        let mut tts = Tts::default().map_err(|e| EngineError::Unavailable(e.to_string()))?;
        let current = Arc::new(Mutex::new(None));

        let features = tts.supported_features();
        if features.utterance_callbacks {
            let tx = events.clone();
            let cell = Arc::clone(&current);
            tts.on_utterance_begin(Some(Box::new(move |_| {
                if let Some(id) = *cell.lock() {
                    let _ = tx.send(EngineEvent::Started { utterance: id });
                }
            })))
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;

            let tx = events.clone();
            let cell = Arc::clone(&current);
            tts.on_utterance_end(Some(Box::new(move |_| {
                if let Some(id) = cell.lock().take() {
                    let _ = tx.send(EngineEvent::Finished { utterance: id });
                }
            })))
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;

            let tx = events.clone();
            let cell = Arc::clone(&current);
            tts.on_utterance_stop(Some(Box::new(move |_| {
                if let Some(id) = cell.lock().take() {
                    let _ = tx.send(EngineEvent::Stopped { utterance: id });
                }
            })))
            .map_err(|e| EngineError::Unavailable(e.to_string()))?;
        }

        Ok(NativeEngine {
            tts,
            preferred_voice,
            events,
            current,
        })
    }

    // Pick a voice for the locale, preferring the configured name fragment
    fn select_voice(&mut self, locale_code: &str) {
        let voices = match self.tts.voices() {
            Ok(voices) => voices,
            Err(e) => {
                warn!("Could not list voices: {}", e);
                return;
            }
        };

        let matches_locale = |voice: &tts::Voice| {
            voice
                .language()
                .to_string()
                .to_lowercase()
                .starts_with(locale_code)
        };

        let chosen = voices
            .iter()
            .filter(|voice| matches_locale(voice))
            .find(|voice| {
                !self.preferred_voice.is_empty() && voice.name().contains(&self.preferred_voice)
            })
            .or_else(|| voices.iter().find(|voice| matches_locale(voice)));

        if let Some(voice) = chosen {
            debug!("Using voice {} for locale {}", voice.name(), locale_code);
            if let Err(e) = self.tts.set_voice(voice) {
                warn!("Could not set voice: {}", e);
            }
        } else {
            warn!("No voice available for locale {}", locale_code);
        }
    }
}

#[async_trait]
impl SpeechEngine for NativeEngine {
    fn features(&self) -> EngineFeatures {
        let features = self.tts.supported_features();
        EngineFeatures {
            stop: features.stop,
            pause: false,
            rate: features.rate,
            word_boundaries: false,
        }
    }

    async fn probe(&mut self) -> Result<(), EngineError> {
        self.tts
            .voices()
            .map(|_| ())
            .map_err(|e| EngineError::Unavailable(e.to_string()))
    }

    async fn speak(&mut self, utterance: &Utterance) -> Result<(), EngineError> {
        let features = self.tts.supported_features();

        if features.rate {
            let rate = self.tts.normal_rate() * utterance.rate;
            let rate = rate.clamp(self.tts.min_rate(), self.tts.max_rate());
            if let Err(e) = self.tts.set_rate(rate) {
                warn!("Could not set rate: {}", e);
            }
        }
        if features.voice {
            self.select_voice(utterance.locale.code());
        }

        let id = utterance.id;
        *self.current.lock() = Some(id);

        // interrupt=true keeps the platform side single-utterance as well
        self.tts
            .speak(&utterance.text, true)
            .map_err(|e| EngineError::Synthesis(e.to_string()))?;

        if !features.utterance_callbacks {
            let _ = self.events.send(EngineEvent::Started { utterance: id });
            if features.is_speaking {
                // No callbacks: poll the service for completion instead
                let mut tts = self.tts.clone();
                let events = self.events.clone();
                let cell = Arc::clone(&self.current);
                tokio::spawn(async move {
                    loop {
                        sleep(Duration::from_millis(100)).await;
                        if *cell.lock() != Some(id) {
                            return;
                        }
                        match tts.is_speaking() {
                            Ok(true) => {}
                            Ok(false) => {
                                let mut slot = cell.lock();
                                if *slot == Some(id) {
                                    *slot = None;
                                    drop(slot);
                                    let _ = events.send(EngineEvent::Finished { utterance: id });
                                }
                                return;
                            }
                            Err(_) => return,
                        }
                    }
                });
            }
        }

        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EngineError> {
        let had_callbacks = self.tts.supported_features().utterance_callbacks;
        self.tts
            .stop()
            .map_err(|e| EngineError::Synthesis(e.to_string()))?;
        if !had_callbacks {
            if let Some(id) = self.current.lock().take() {
                let _ = self.events.send(EngineEvent::Stopped { utterance: id });
            }
        }
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), EngineError> {
        Err(EngineError::Unsupported { feature: "pause" })
    }

    async fn resume(&mut self) -> Result<(), EngineError> {
        Err(EngineError::Unsupported { feature: "pause" })
    }
}
