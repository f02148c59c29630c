use async_trait::async_trait;
use log::{debug, warn};
use parking_lot::Mutex;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;

use crate::engines::{EngineEvent, EngineFeatures, EventSender, SpeechEngine, Utterance, UtteranceId};
use crate::errors::EngineError;

// @module: espeak-ng subprocess backend

// espeak-ng's default speaking rate in words per minute
const NORMAL_WPM: f32 = 175.0;
const MIN_WPM: u32 = 80;
const MAX_WPM: u32 = 450;

// @struct: Active child process bookkeeping
#[derive(Debug, Clone, Copy)]
struct ActiveChild {
    utterance: UtteranceId,
    pid: u32,
}

/// Speech engine backed by the espeak-ng command-line synthesizer
///
/// Each utterance spawns one espeak-ng process. Stop kills the process,
/// pause and resume suspend it with SIGSTOP/SIGCONT. The process plays audio
/// directly and reports no progress, so only lifecycle events are emitted.
#[derive(Debug)]
pub struct EspeakEngine {
    /// Binary to invoke
    command: String,
    /// Event channel to the playback controller
    events: EventSender,
    /// Currently playing utterance, shared with the wait task
    active: Arc<Mutex<Option<ActiveChild>>>,
}

impl EspeakEngine {
    /// Create an engine invoking the given binary ("espeak-ng" if empty)
    pub fn new(command: String, events: EventSender) -> Self {
        let command = if command.is_empty() {
            "espeak-ng".to_string()
        } else {
            command
        };
        EspeakEngine {
            command,
            events,
            active: Arc::new(Mutex::new(None)),
        }
    }

    /// Map a rate multiplier onto espeak's words-per-minute scale
    fn rate_to_wpm(rate: f32) -> u32 {
        let wpm = (NORMAL_WPM * rate).round() as u32;
        wpm.clamp(MIN_WPM, MAX_WPM)
    }

    // Kill the current child, if any, without emitting an event
    fn kill_active(&self) -> Option<ActiveChild> {
        let child = self.active.lock().take();
        if let Some(child) = child {
            signal_pid(child.pid, Signal::Terminate);
        }
        child
    }
}

#[async_trait]
impl SpeechEngine for EspeakEngine {
    fn features(&self) -> EngineFeatures {
        EngineFeatures {
            stop: true,
            pause: cfg!(unix),
            rate: true,
            word_boundaries: false,
        }
    }

    async fn probe(&mut self) -> Result<(), EngineError> {
        let output = Command::new(&self.command)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| EngineError::Unavailable(format!("{}: {}", self.command, e)))?;

        if output.success() {
            Ok(())
        } else {
            Err(EngineError::Unavailable(format!(
                "{} exited with {}",
                self.command, output
            )))
        }
    }

    async fn speak(&mut self, utterance: &Utterance) -> Result<(), EngineError> {
        // One active utterance at a time
        self.kill_active();

        let wpm = Self::rate_to_wpm(utterance.rate);
        debug!(
            "Spawning {} (voice {}, {} wpm) for utterance {}",
            self.command,
            utterance.locale.code(),
            wpm,
            utterance.id
        );

        let mut child = Command::new(&self.command)
            .arg("-v")
            .arg(utterance.locale.code())
            .arg("-s")
            .arg(wpm.to_string())
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::Synthesis(format!("{}: {}", self.command, e)))?;

        let pid = child
            .id()
            .ok_or_else(|| EngineError::Synthesis("child exited before start".to_string()))?;

        let id = utterance.id;
        *self.active.lock() = Some(ActiveChild { utterance: id, pid });

        let _ = self.events.send(EngineEvent::Started { utterance: id });

        // Wait for the child off to the side; a cancelled utterance has its
        // slot cleared by stop() before the kill, so no Finished fires.
        let active = Arc::clone(&self.active);
        let events = self.events.clone();
        tokio::spawn(async move {
            let status = child.wait().await;
            let still_current = {
                let mut slot = active.lock();
                match *slot {
                    Some(current) if current.utterance == id => {
                        *slot = None;
                        true
                    }
                    _ => false,
                }
            };
            if !still_current {
                return;
            }
            match status {
                Ok(status) if status.success() => {
                    let _ = events.send(EngineEvent::Finished { utterance: id });
                }
                Ok(status) => {
                    let _ = events.send(EngineEvent::Failed {
                        utterance: id,
                        message: format!("synthesizer exited with {}", status),
                    });
                }
                Err(e) => {
                    let _ = events.send(EngineEvent::Failed {
                        utterance: id,
                        message: e.to_string(),
                    });
                }
            }
        });

        Ok(())
    }

    async fn stop(&mut self) -> Result<(), EngineError> {
        if let Some(child) = self.kill_active() {
            let _ = self.events.send(EngineEvent::Stopped {
                utterance: child.utterance,
            });
        }
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), EngineError> {
        if !cfg!(unix) {
            return Err(EngineError::Unsupported { feature: "pause" });
        }
        if let Some(child) = *self.active.lock() {
            signal_pid(child.pid, Signal::Suspend);
        }
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), EngineError> {
        if !cfg!(unix) {
            return Err(EngineError::Unsupported { feature: "pause" });
        }
        if let Some(child) = *self.active.lock() {
            signal_pid(child.pid, Signal::Continue);
        }
        Ok(())
    }
}

enum Signal {
    Terminate,
    Suspend,
    Continue,
}

#[cfg(unix)]
fn signal_pid(pid: u32, signal: Signal) {
    let signum = match signal {
        Signal::Terminate => libc::SIGTERM,
        Signal::Suspend => libc::SIGSTOP,
        Signal::Continue => libc::SIGCONT,
    };
    // espeak-ng is our direct child; a failed signal means it already exited
    let rc = unsafe { libc::kill(pid as libc::pid_t, signum) };
    if rc != 0 {
        warn!("Failed to signal synthesizer process {}", pid);
    }
}

#[cfg(not(unix))]
fn signal_pid(_pid: u32, _signal: Signal) {}
