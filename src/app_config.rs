use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::default::Default;

use crate::language_utils;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Synthesis language code, or "auto" to detect from the text
    #[serde(default = "default_language")]
    pub language: String,

    /// Speech playback config
    pub speech: SpeechConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Speech engine type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpeechEngineKind {
    // @engine: espeak-ng subprocess
    #[default]
    Espeak,
    // @engine: OS speech service (requires the native-tts feature)
    Native,
    // @engine: Scripted no-audio engine
    Mock,
}

impl SpeechEngineKind {
    // @returns: Capitalized engine name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Espeak => "eSpeak NG",
            Self::Native => "Native",
            Self::Mock => "Mock",
        }
    }

    // @returns: Lowercase engine identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Espeak => "espeak".to_string(),
            Self::Native => "native".to_string(),
            Self::Mock => "mock".to_string(),
        }
    }
}

// Implement Display trait for SpeechEngineKind
impl std::fmt::Display for SpeechEngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

// Implement FromStr trait for SpeechEngineKind
impl std::str::FromStr for SpeechEngineKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "espeak" => Ok(Self::Espeak),
            "native" => Ok(Self::Native),
            "mock" => Ok(Self::Mock),
            _ => Err(anyhow!("Invalid engine type: {}", s)),
        }
    }
}

/// Per-engine settings wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EngineSettings {
    // @field: Engine type identifier
    #[serde(rename = "type")]
    pub engine_type: String,

    // @field: Synthesizer binary (espeak engine)
    #[serde(default = "String::new")]
    pub command: String,

    // @field: Preferred voice name fragment (native engine)
    #[serde(default = "String::new")]
    pub voice: String,

    // @field: Per-word pacing in milliseconds (mock engine)
    #[serde(default = "default_word_millis")]
    pub word_millis: u64,
}

impl EngineSettings {
    // @param engine_type: Engine enum
    // @returns: Engine settings with defaults
    pub fn new(engine_type: SpeechEngineKind) -> Self {
        match engine_type {
            SpeechEngineKind::Espeak => Self {
                engine_type: "espeak".to_string(),
                command: default_espeak_command(),
                voice: String::new(),
                word_millis: default_word_millis(),
            },
            SpeechEngineKind::Native => Self {
                engine_type: "native".to_string(),
                command: String::new(),
                voice: String::new(),
                word_millis: default_word_millis(),
            },
            SpeechEngineKind::Mock => Self {
                engine_type: "mock".to_string(),
                command: String::new(),
                voice: String::new(),
                word_millis: default_word_millis(),
            },
        }
    }
}

/// Speech playback configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SpeechConfig {
    /// Engine used for playback
    #[serde(default)]
    pub engine: SpeechEngineKind,

    /// Rate multiplier, 1.0 is the engine's normal speaking rate
    #[serde(default = "default_rate")]
    pub rate: f32,

    /// Maximum words spoken per utterance
    #[serde(default = "default_max_words")]
    pub max_words: usize,

    /// Settings for each available engine
    #[serde(default = "default_available_engines")]
    pub available_engines: Vec<EngineSettings>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            engine: SpeechEngineKind::default(),
            rate: default_rate(),
            max_words: default_max_words(),
            available_engines: default_available_engines(),
        }
    }
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

fn default_language() -> String {
    "auto".to_string()
}

fn default_rate() -> f32 {
    1.0
}

fn default_max_words() -> usize {
    225
}

fn default_word_millis() -> u64 {
    150
}

fn default_espeak_command() -> String {
    "espeak-ng".to_string()
}

fn default_available_engines() -> Vec<EngineSettings> {
    vec![
        EngineSettings::new(SpeechEngineKind::Espeak),
        EngineSettings::new(SpeechEngineKind::Native),
        EngineSettings::new(SpeechEngineKind::Mock),
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            speech: SpeechConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Settings for the currently selected engine
    pub fn get_engine_settings(&self) -> Option<&EngineSettings> {
        let engine_str = self.speech.engine.to_lowercase_string();
        self.speech
            .available_engines
            .iter()
            .find(|settings| settings.engine_type == engine_str)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.language != "auto" {
            language_utils::resolve_override(&self.language)
                .map_err(|e| anyhow!("Invalid language setting: {}", e))?;
        }

        if !(0.5..=3.0).contains(&self.speech.rate) {
            return Err(anyhow!(
                "Speech rate {} out of range (0.5 to 3.0)",
                self.speech.rate
            ));
        }

        if self.speech.max_words == 0 {
            return Err(anyhow!("max_words must be at least 1"));
        }

        if self.get_engine_settings().is_none() {
            return Err(anyhow!(
                "No settings entry for engine: {}",
                self.speech.engine
            ));
        }

        Ok(())
    }
}
