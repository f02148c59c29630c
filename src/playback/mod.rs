/*!
 * Speech playback control.
 *
 * This module owns the playback state machine and the spoken-word tracking:
 *
 * - `controller`: the playback controller (start/stop, pause/resume toggle,
 *   restart-from-word, cancel-before-start)
 * - `highlight`: mapping of engine boundary offsets back to word indices
 */

// Re-export main types for easier usage
pub use self::controller::{PlaybackController, PlaybackUpdate, SpeakOutcome};
pub use self::highlight::{HighlightTracker, word_at_offset};

pub mod controller;
pub mod highlight;

/// Playback state of the single utterance slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    /// Nothing is playing
    #[default]
    Idle,
    /// An utterance is playing
    Speaking,
    /// An utterance is paused
    Paused,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Speaking => "speaking",
            Self::Paused => "paused",
        };
        write!(f, "{}", label)
    }
}
