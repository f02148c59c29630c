use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Language utilities for detection and synthesis locale mapping
///
/// Detection runs a statistical trigram classifier (whatlang) over the
/// document text and yields an ISO 639-3 code. The detected code is mapped
/// through a small fixed table to the locale handed to the speech engine,
/// falling back to English when unmapped.
/// Synthesis locale accepted by the speech engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SynthLocale {
    /// English ("en")
    #[default]
    English,
    /// French ("fr")
    French,
    /// Arabic ("ar")
    Arabic,
}

// Detected ISO 639-3 code to synthesis locale. The classifier reports
// Arabic as the macrolanguage code "ara".
static LOCALE_TABLE: Lazy<HashMap<&'static str, SynthLocale>> = Lazy::new(|| {
    HashMap::from([
        ("eng", SynthLocale::English),
        ("fra", SynthLocale::French),
        ("ara", SynthLocale::Arabic),
    ])
});

impl SynthLocale {
    /// Two-letter locale tag passed to the engine
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
            Self::Arabic => "ar",
        }
    }

    /// Human-readable language name
    pub fn name(&self) -> &'static str {
        Language::from_639_1(self.code())
            .map(|lang| lang.to_name())
            .unwrap_or("Unknown")
    }

    /// All locales the synthesis layer supports
    pub fn all() -> [SynthLocale; 3] {
        [Self::English, Self::French, Self::Arabic]
    }
}

impl std::fmt::Display for SynthLocale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Run the language guesser over a text, returning the ISO 639-3 code
pub fn detect_language(text: &str) -> Option<&'static str> {
    whatlang::detect_lang(text).map(|lang| lang.code())
}

/// Map a detected ISO 639-3 code to a synthesis locale, defaulting to English
pub fn map_detected(code: &str) -> SynthLocale {
    LOCALE_TABLE.get(code).copied().unwrap_or_default()
}

/// Detect the synthesis locale for a text
///
/// Returns None for blank text so callers can keep their current locale,
/// mirroring detection that only fires on non-empty input. No confidence
/// threshold and no hysteresis: the result follows the classifier on every
/// call.
pub fn detect_locale(text: &str) -> Option<SynthLocale> {
    if text.trim().is_empty() {
        return None;
    }
    Some(detect_language(text).map(map_detected).unwrap_or_default())
}

/// Normalize a user-supplied language code to ISO 639-3 format
pub fn normalize_to_part3(code: &str) -> Result<String> {
    let normalized = code.trim().to_lowercase();

    match normalized.len() {
        2 => Language::from_639_1(&normalized)
            .map(|lang| lang.to_639_3().to_string())
            .ok_or_else(|| anyhow!("Invalid language code: {}", code)),
        3 if LOCALE_TABLE.contains_key(normalized.as_str()) => Ok(normalized),
        3 => Language::from_639_3(&normalized)
            .map(|lang| lang.to_639_3().to_string())
            .ok_or_else(|| anyhow!("Invalid language code: {}", code)),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Resolve a manual language override to a synthesis locale
///
/// Accepts ISO 639-1 ("en") and ISO 639-3 ("eng", "arb") forms. Codes that
/// normalize to a language outside the supported set are rejected rather
/// than silently defaulted, unlike detection.
pub fn resolve_override(code: &str) -> Result<SynthLocale> {
    let part3 = normalize_to_part3(code)?;

    // Standard Arabic ("arb") folds into the macrolanguage entry
    let part3 = if part3 == "arb" { "ara".to_string() } else { part3 };

    LOCALE_TABLE.get(part3.as_str()).copied().ok_or_else(|| {
        anyhow!(
            "Unsupported language: {} (supported: {})",
            code,
            SynthLocale::all()
                .iter()
                .map(|locale| locale.code())
                .collect::<Vec<_>>()
                .join(", ")
        )
    })
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part3(code)?;
    // Table entries go through the locale mapping so supported languages
    // always report the same name the session displays.
    if let Some(locale) = LOCALE_TABLE.get(normalized.as_str()) {
        return Ok(locale.name().to_string());
    }
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;
    Ok(lang.to_name().to_string())
}
