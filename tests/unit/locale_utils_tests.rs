/*!
 * Tests for locale code utilities
 */

use locweave::locale_utils::{
    locale_display_name, locales_match, normalize_locale, validate_locale_code,
};

#[test]
fn test_validate_withTwoLetterCodes_shouldAccept() {
    assert!(validate_locale_code("en").is_ok());
    assert!(validate_locale_code("es").is_ok());
    assert!(validate_locale_code("ZH").is_ok());
}

#[test]
fn test_validate_withRegionSubtag_shouldAcceptLanguagePart() {
    assert!(validate_locale_code("pt-BR").is_ok());
    assert!(validate_locale_code("en_US").is_ok());
}

#[test]
fn test_validate_withThreeLetterCodes_shouldAccept() {
    assert!(validate_locale_code("deu").is_ok());
    assert!(validate_locale_code("fra").is_ok());
}

#[test]
fn test_validate_withGarbage_shouldReject() {
    assert!(validate_locale_code("").is_err());
    assert!(validate_locale_code("x").is_err());
    assert!(validate_locale_code("zz").is_err());
    assert!(validate_locale_code("123-AB").is_err());
}

#[test]
fn test_normalize_shouldPreferTwoLetterForm() {
    assert_eq!(normalize_locale("deu").unwrap(), "de");
    assert_eq!(normalize_locale("EN").unwrap(), "en");
    assert_eq!(normalize_locale("pt-BR").unwrap(), "pt");
}

#[test]
fn test_localesMatch_shouldIgnoreFormAndRegion() {
    assert!(locales_match("de", "deu"));
    assert!(locales_match("pt-BR", "pt"));
    assert!(!locales_match("de", "fr"));
    assert!(!locales_match("de", "nonsense"));
}

#[test]
fn test_displayName_shouldResolveEnglishName() {
    assert_eq!(locale_display_name("es").unwrap(), "Spanish");
    assert_eq!(locale_display_name("deu").unwrap(), "German");
    assert!(locale_display_name("zz").is_err());
}
