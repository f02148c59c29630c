/*!
 * Tests for language detection and locale mapping
 */

use readaloud::language_utils::{
    SynthLocale, detect_language, detect_locale, get_language_name, map_detected,
    normalize_to_part3, resolve_override,
};

const ENGLISH_TEXT: &str =
    "The quick brown fox jumps over the lazy dog and keeps running through the open field all day.";
const FRENCH_TEXT: &str =
    "Bonjour tout le monde, ceci est un texte d'exemple pour la lecture à haute voix en français.";
const ARABIC_TEXT: &str = "مرحبا بالعالم هذا نص تجريبي طويل للقراءة بصوت عال باللغة العربية الفصحى";

/// Test detection of the three supported languages
#[test]
fn test_detect_locale_withSupportedLanguages_shouldMapToLocales() {
    assert_eq!(detect_locale(ENGLISH_TEXT), Some(SynthLocale::English));
    assert_eq!(detect_locale(FRENCH_TEXT), Some(SynthLocale::French));
    assert_eq!(detect_locale(ARABIC_TEXT), Some(SynthLocale::Arabic));
}

/// Test that blank text yields no detection result
#[test]
fn test_detect_locale_withBlankText_shouldReturnNone() {
    assert_eq!(detect_locale(""), None);
    assert_eq!(detect_locale("   \n\t  "), None);
}

/// Test that detection always lands on a supported locale
#[test]
fn test_detect_locale_withUnsupportedLanguage_shouldDefaultToEnglish() {
    // Codes outside the fixed table fall back to English
    assert_eq!(map_detected("spa"), SynthLocale::English);
    assert_eq!(map_detected("deu"), SynthLocale::English);
    assert_eq!(map_detected("cmn"), SynthLocale::English);
    assert_eq!(map_detected("zzz"), SynthLocale::English);

    // Whatever the classifier finds, the mapped locale is one of the three
    let supported = SynthLocale::all();
    for text in [
        ENGLISH_TEXT,
        FRENCH_TEXT,
        ARABIC_TEXT,
        "El rápido zorro marrón salta sobre el perro perezoso en el campo verde cada mañana.",
    ] {
        let locale = detect_locale(text).unwrap();
        assert!(supported.contains(&locale));
    }
}

/// Test the fixed mapping table
#[test]
fn test_map_detected_withTableEntries_shouldMapExactly() {
    assert_eq!(map_detected("eng"), SynthLocale::English);
    assert_eq!(map_detected("fra"), SynthLocale::French);
    assert_eq!(map_detected("ara"), SynthLocale::Arabic);
}

/// Test that the classifier reports three-letter codes
#[test]
fn test_detect_language_shouldReturnThreeLetterCodes() {
    let code = detect_language(ENGLISH_TEXT).unwrap();
    assert_eq!(code.len(), 3);
    assert_eq!(code, "eng");
}

/// Test locale codes and names
#[test]
fn test_synthLocale_codesAndNames_shouldBeStable() {
    assert_eq!(SynthLocale::English.code(), "en");
    assert_eq!(SynthLocale::French.code(), "fr");
    assert_eq!(SynthLocale::Arabic.code(), "ar");
    assert_eq!(SynthLocale::English.name(), "English");
    assert_eq!(SynthLocale::French.name(), "French");
    assert_eq!(SynthLocale::Arabic.name(), "Arabic");
    assert_eq!(SynthLocale::default(), SynthLocale::English);
}

/// Test normalization of language codes to ISO 639-3
#[test]
fn test_normalize_to_part3_withValidCodes_shouldNormalizeCorrectly() {
    assert_eq!(normalize_to_part3("en").unwrap(), "eng");
    assert_eq!(normalize_to_part3("fr").unwrap(), "fra");
    assert_eq!(normalize_to_part3("eng").unwrap(), "eng");
    assert_eq!(normalize_to_part3("fra").unwrap(), "fra");
    assert_eq!(normalize_to_part3("ara").unwrap(), "ara");

    // Case insensitivity and whitespace
    assert_eq!(normalize_to_part3("EN").unwrap(), "eng");
    assert_eq!(normalize_to_part3(" en ").unwrap(), "eng");

    // Invalid codes
    assert!(normalize_to_part3("xyz").is_err());
    assert!(normalize_to_part3("123").is_err());
    assert!(normalize_to_part3("e").is_err());
    assert!(normalize_to_part3("").is_err());
}

/// Test resolution of manual language overrides
#[test]
fn test_resolve_override_withSupportedCodes_shouldResolve() {
    assert_eq!(resolve_override("en").unwrap(), SynthLocale::English);
    assert_eq!(resolve_override("eng").unwrap(), SynthLocale::English);
    assert_eq!(resolve_override("fr").unwrap(), SynthLocale::French);
    assert_eq!(resolve_override("fra").unwrap(), SynthLocale::French);
    assert_eq!(resolve_override("ar").unwrap(), SynthLocale::Arabic);
    assert_eq!(resolve_override("ara").unwrap(), SynthLocale::Arabic);
    assert_eq!(resolve_override("EN").unwrap(), SynthLocale::English);
}

/// Test that overrides outside the supported set are rejected
#[test]
fn test_resolve_override_withUnsupportedCodes_shouldFail() {
    assert!(resolve_override("de").is_err());
    assert!(resolve_override("spa").is_err());
    assert!(resolve_override("xyz").is_err());
    assert!(resolve_override("").is_err());
}

/// Test retrieval of language names from codes
#[test]
fn test_get_language_name_withValidCodes_shouldReturnCorrectName() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("eng").unwrap(), "English");
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("ara").unwrap(), "Arabic");

    // Invalid codes
    assert!(get_language_name("xyz").is_err());
}
