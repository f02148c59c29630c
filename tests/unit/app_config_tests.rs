/*!
 * Tests for application configuration
 */

use std::str::FromStr;
use readaloud::app_config::{Config, EngineSettings, LogLevel, SpeechEngineKind};

/// Test the default configuration values
#[test]
fn test_config_default_shouldUseExpectedValues() {
    let config = Config::default();

    assert_eq!(config.language, "auto");
    assert_eq!(config.speech.engine, SpeechEngineKind::Espeak);
    assert_eq!(config.speech.rate, 1.0);
    assert_eq!(config.speech.max_words, 225);
    assert_eq!(config.speech.available_engines.len(), 3);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test serialization round trip keeps the configuration intact
#[test]
fn test_config_serdeRoundTrip_shouldPreserveValues() {
    let mut config = Config::default();
    config.language = "fr".to_string();
    config.speech.engine = SpeechEngineKind::Mock;
    config.speech.rate = 1.5;

    let json = serde_json::to_string_pretty(&config).unwrap();
    let parsed: Config = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed.language, "fr");
    assert_eq!(parsed.speech.engine, SpeechEngineKind::Mock);
    assert_eq!(parsed.speech.rate, 1.5);
    assert_eq!(parsed.speech.max_words, 225);
}

/// Test partial config files are filled with defaults
#[test]
fn test_config_parsePartialJson_shouldFillDefaults() {
    let json = r#"{ "speech": { "engine": "mock" } }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.language, "auto");
    assert_eq!(config.speech.engine, SpeechEngineKind::Mock);
    assert_eq!(config.speech.rate, 1.0);
    assert_eq!(config.speech.max_words, 225);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test validation rejects out-of-range rates
#[test]
fn test_validate_withBadRate_shouldFail() {
    let mut config = Config::default();
    config.speech.rate = 0.1;
    assert!(config.validate().is_err());

    config.speech.rate = 9.0;
    assert!(config.validate().is_err());

    config.speech.rate = 2.0;
    assert!(config.validate().is_ok());
}

/// Test validation rejects unsupported language settings
#[test]
fn test_validate_withBadLanguage_shouldFail() {
    let mut config = Config::default();
    config.language = "xyz".to_string();
    assert!(config.validate().is_err());

    config.language = "de".to_string();
    assert!(config.validate().is_err());

    config.language = "fr".to_string();
    assert!(config.validate().is_ok());

    config.language = "auto".to_string();
    assert!(config.validate().is_ok());
}

/// Test validation rejects a zero word cap
#[test]
fn test_validate_withZeroMaxWords_shouldFail() {
    let mut config = Config::default();
    config.speech.max_words = 0;
    assert!(config.validate().is_err());
}

/// Test validation requires settings for the selected engine
#[test]
fn test_validate_withMissingEngineSettings_shouldFail() {
    let mut config = Config::default();
    config.speech.available_engines.retain(|settings| settings.engine_type != "espeak");
    assert!(config.validate().is_err());
}

/// Test engine settings lookup by selected engine
#[test]
fn test_get_engine_settings_shouldMatchSelectedEngine() {
    let mut config = Config::default();
    config.speech.engine = SpeechEngineKind::Mock;

    let settings = config.get_engine_settings().unwrap();
    assert_eq!(settings.engine_type, "mock");
}

/// Test engine settings defaults per engine kind
#[test]
fn test_engineSettings_new_shouldSetPerEngineDefaults() {
    let espeak = EngineSettings::new(SpeechEngineKind::Espeak);
    assert_eq!(espeak.engine_type, "espeak");
    assert_eq!(espeak.command, "espeak-ng");

    let native = EngineSettings::new(SpeechEngineKind::Native);
    assert_eq!(native.engine_type, "native");
    assert!(native.command.is_empty());

    let mock = EngineSettings::new(SpeechEngineKind::Mock);
    assert_eq!(mock.engine_type, "mock");
    assert_eq!(mock.word_millis, 150);
}

/// Test engine kind string conversions
#[test]
fn test_speechEngineKind_conversions_shouldRoundTrip() {
    assert_eq!(SpeechEngineKind::Espeak.to_string(), "espeak");
    assert_eq!(SpeechEngineKind::Native.to_string(), "native");
    assert_eq!(SpeechEngineKind::Mock.to_string(), "mock");

    assert_eq!(SpeechEngineKind::from_str("espeak").unwrap(), SpeechEngineKind::Espeak);
    assert_eq!(SpeechEngineKind::from_str("NATIVE").unwrap(), SpeechEngineKind::Native);
    assert!(SpeechEngineKind::from_str("browser").is_err());

    assert_eq!(SpeechEngineKind::Espeak.display_name(), "eSpeak NG");
}
