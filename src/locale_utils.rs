use anyhow::{Result, anyhow};
use isolang::Language;

/// Locale code utilities
///
/// Content stores and translation APIs speak ISO 639-1 (2-letter) codes,
/// optionally with a region subtag ("pt-BR"). These helpers validate such
/// codes, normalize them to the form providers expect, and resolve display
/// names.
/// Split a locale code into its language subtag, lowercased
fn language_subtag(code: &str) -> String {
    code.trim()
        .split(['-', '_'])
        .next()
        .unwrap_or("")
        .to_lowercase()
}

/// Validate that a locale code carries a real ISO 639 language subtag
pub fn validate_locale_code(code: &str) -> Result<()> {
    let subtag = language_subtag(code);

    let known = match subtag.len() {
        2 => Language::from_639_1(&subtag).is_some(),
        3 => Language::from_639_3(&subtag).is_some(),
        _ => false,
    };

    if known {
        Ok(())
    } else {
        Err(anyhow!("Invalid locale code: {}", code))
    }
}

/// Normalize a locale code to the 2-letter form providers expect,
/// dropping any region subtag. Falls back to the 3-letter form for
/// languages with no ISO 639-1 code.
pub fn normalize_locale(code: &str) -> Result<String> {
    let subtag = language_subtag(code);

    let language = match subtag.len() {
        2 => Language::from_639_1(&subtag),
        3 => Language::from_639_3(&subtag),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Cannot normalize invalid locale code: {}", code))?;

    Ok(language.to_639_1()
        .map(str::to_string)
        .unwrap_or_else(|| language.to_639_3().to_string()))
}

/// Check if two locale codes name the same language, region aside
pub fn locales_match(code1: &str, code2: &str) -> bool {
    match (normalize_locale(code1), normalize_locale(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English display name for a locale code
pub fn locale_display_name(code: &str) -> Result<String> {
    let subtag = language_subtag(code);

    let language = match subtag.len() {
        2 => Language::from_639_1(&subtag),
        3 => Language::from_639_3(&subtag),
        _ => None,
    }
    .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(language.to_name().to_string())
}
