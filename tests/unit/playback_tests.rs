/*!
 * Tests for the playback controller and spoken-word tracking
 */

use readaloud::document_processor::split_words;
use readaloud::engines::mock::MockEngine;
use readaloud::engines::{SpeechEngine, event_channel};
use readaloud::errors::EngineError;
use readaloud::playback::{
    HighlightTracker, PlaybackController, PlaybackState, PlaybackUpdate, SpeakOutcome,
    word_at_offset,
};
use readaloud::language_utils::SynthLocale;

// Build a controller over a mock engine, returning an observer handle
fn mock_controller(
    make_engine: fn(readaloud::engines::EventSender) -> MockEngine,
) -> (PlaybackController, MockEngine) {
    let (tx, rx) = event_channel();
    let engine = make_engine(tx).with_word_millis(0);
    let observer = engine.clone();
    let controller = PlaybackController::new(Box::new(engine) as Box<dyn SpeechEngine>, rx, 1.0);
    (controller, observer)
}

// Drain updates until the utterance comes to rest, collecting them
async fn drain_updates(controller: &mut PlaybackController) -> Vec<PlaybackUpdate> {
    let mut updates = Vec::new();
    while let Some(update) = controller.next_update().await {
        let done = matches!(
            update,
            PlaybackUpdate::Finished | PlaybackUpdate::Stopped | PlaybackUpdate::Failed { .. }
        );
        updates.push(update);
        if done {
            break;
        }
    }
    updates
}

/// Test the boundary-offset rescan over word offsets
#[test]
fn test_word_at_offset_withVariousOffsets_shouldFindNearestWord() {
    let words = split_words("alpha beta gamma");
    // alpha: 0..5, beta: 6..10, gamma: 11..16

    // Exact word starts
    assert_eq!(word_at_offset(&words, 0), Some(0));
    assert_eq!(word_at_offset(&words, 6), Some(1));
    assert_eq!(word_at_offset(&words, 11), Some(2));

    // Offsets inside a word
    assert_eq!(word_at_offset(&words, 3), Some(0));
    assert_eq!(word_at_offset(&words, 8), Some(1));

    // Offset on the whitespace after a word resolves to that word
    assert_eq!(word_at_offset(&words, 5), Some(0));
    assert_eq!(word_at_offset(&words, 10), Some(1));

    // Past the end resolves to the last word
    assert_eq!(word_at_offset(&words, 100), Some(2));

    // Empty word array has no answer
    assert_eq!(word_at_offset(&[], 0), None);
}

/// Test offsets that precede the first word
#[test]
fn test_word_at_offset_withLeadingWhitespace_shouldPointAtFirstWord() {
    let words = split_words("   alpha beta");
    assert_eq!(word_at_offset(&words, 0), Some(0));
    assert_eq!(word_at_offset(&words, 3), Some(0));
}

/// Test absolute index mapping for suffix utterances
#[test]
fn test_highlightTracker_withBaseIndex_shouldReportAbsoluteIndices() {
    // Utterance is the suffix "gamma delta" of a four-word document
    let mut tracker = HighlightTracker::new(split_words("gamma delta"), 2);
    assert_eq!(tracker.current_word(), None);

    assert_eq!(tracker.on_boundary(0), Some(2));
    assert_eq!(tracker.current_word(), Some(2));
    assert_eq!(tracker.current_word_text(), Some("gamma"));

    assert_eq!(tracker.on_boundary(6), Some(3));
    assert_eq!(tracker.current_word_text(), Some("delta"));
}

/// Test that speaking from idle starts an utterance
#[tokio::test]
async fn test_speak_fromIdle_shouldStartUtterance() {
    let (mut controller, observer) = mock_controller(MockEngine::working);

    let outcome = controller.speak("hello world", SynthLocale::English).await.unwrap();
    assert_eq!(outcome, SpeakOutcome::Started);
    assert_eq!(controller.state(), PlaybackState::Speaking);
    assert_eq!(observer.spoken_texts(), vec!["hello world".to_string()]);

    let updates = drain_updates(&mut controller).await;
    assert_eq!(updates.first(), Some(&PlaybackUpdate::Started));
    assert_eq!(updates.last(), Some(&PlaybackUpdate::Finished));
    assert_eq!(controller.state(), PlaybackState::Idle);
}

/// Test that a speak request during playback stops instead of restarting
#[tokio::test]
async fn test_speak_whileSpeaking_shouldStopInsteadOfStarting() {
    let (mut controller, observer) = mock_controller(MockEngine::silent);

    controller.speak("first text", SynthLocale::English).await.unwrap();
    assert_eq!(controller.state(), PlaybackState::Speaking);

    let outcome = controller.speak("second text", SynthLocale::English).await.unwrap();
    assert_eq!(outcome, SpeakOutcome::Stopped);
    assert_eq!(controller.state(), PlaybackState::Idle);

    // The second text was never submitted to the engine
    assert_eq!(observer.spoken_texts(), vec!["first text".to_string()]);
}

/// Test that restart-from-word cancels and speaks the suffix
#[tokio::test]
async fn test_speakFrom_whileSpeaking_shouldRestartWithSuffix() {
    let (mut controller, observer) = mock_controller(MockEngine::working);

    controller
        .speak("alpha beta gamma delta", SynthLocale::English)
        .await
        .unwrap();

    controller
        .speak_from("gamma delta", 2, SynthLocale::English)
        .await
        .unwrap();
    assert_eq!(controller.state(), PlaybackState::Speaking);
    assert_eq!(
        observer.spoken_texts(),
        vec!["alpha beta gamma delta".to_string(), "gamma delta".to_string()]
    );

    // Boundary events map back to document-absolute word indices
    let updates = drain_updates(&mut controller).await;
    let word_indices: Vec<usize> = updates
        .iter()
        .filter_map(|update| match update {
            PlaybackUpdate::Word { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(word_indices, vec![2, 3]);
    assert!(updates.contains(&PlaybackUpdate::Word {
        index: 2,
        word: "gamma".to_string()
    }));
    assert_eq!(updates.last(), Some(&PlaybackUpdate::Finished));
}

/// Test pause/resume toggling against a supporting engine
#[tokio::test]
async fn test_togglePause_whileSpeaking_shouldPauseAndResume() {
    let (mut controller, observer) = mock_controller(MockEngine::silent);

    controller.speak("some long text", SynthLocale::English).await.unwrap();

    let state = controller.toggle_pause().await.unwrap();
    assert_eq!(state, PlaybackState::Paused);
    assert!(observer.is_paused());

    let state = controller.toggle_pause().await.unwrap();
    assert_eq!(state, PlaybackState::Speaking);
    assert!(!observer.is_paused());
}

/// Test that the pause toggle does nothing when idle
#[tokio::test]
async fn test_togglePause_whenIdle_shouldStayIdle() {
    let (mut controller, _observer) = mock_controller(MockEngine::working);

    let state = controller.toggle_pause().await.unwrap();
    assert_eq!(state, PlaybackState::Idle);
}

/// Test that missing pause support surfaces as Unsupported
#[tokio::test]
async fn test_togglePause_withoutEngineSupport_shouldReturnUnsupported() {
    let (mut controller, _observer) = mock_controller(MockEngine::no_pause);

    controller.speak("text", SynthLocale::English).await.unwrap();
    let result = controller.toggle_pause().await;
    assert!(matches!(result, Err(EngineError::Unsupported { .. })));
    // A failed pause leaves playback running
    assert_eq!(controller.state(), PlaybackState::Speaking);
}

/// Test stopping playback returns to idle and clears the word pointer
#[tokio::test]
async fn test_stop_whileSpeaking_shouldReturnToIdle() {
    let (mut controller, _observer) = mock_controller(MockEngine::silent);

    controller.speak("text to stop", SynthLocale::English).await.unwrap();
    controller.stop().await.unwrap();

    assert_eq!(controller.state(), PlaybackState::Idle);
    assert_eq!(controller.current_word(), None);
}

/// Test that an engine rejection leaves the controller idle
#[tokio::test]
async fn test_speak_withFailingEngine_shouldStayIdle() {
    let (mut controller, _observer) = mock_controller(MockEngine::failing);

    let result = controller.speak("text", SynthLocale::English).await;
    assert!(result.is_err());
    assert_eq!(controller.state(), PlaybackState::Idle);
}

/// Test that events from a cancelled utterance are dropped
#[tokio::test]
async fn test_staleUtteranceEvents_shouldProduceNoUpdates() {
    let (mut controller, _observer) = mock_controller(MockEngine::working);

    controller.speak("first utterance text", SynthLocale::English).await.unwrap();
    // Restart immediately; the first utterance's queued events are now stale
    controller
        .speak_from("second utterance text", 0, SynthLocale::English)
        .await
        .unwrap();

    let updates = drain_updates(&mut controller).await;
    // Exactly one Started survives (the second utterance's)
    let started = updates
        .iter()
        .filter(|update| matches!(update, PlaybackUpdate::Started))
        .count();
    assert_eq!(started, 1);
    assert_eq!(updates.last(), Some(&PlaybackUpdate::Finished));
}
