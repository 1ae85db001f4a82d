/// Localized strings
///
/// Page titles and bodies are stored either as a single plain string or as a
/// map of language code to translation. Both shapes are accepted on input and
/// stored as JSONB.
///
/// # Example
///
/// ```
/// use eventpages_shared::i18n::I18nString;
///
/// let title: I18nString = serde_json::from_str(r#"{"en": "Imprint", "de": "Impressum"}"#).unwrap();
/// assert_eq!(title.localize("de-formal", "en"), "Impressum");
/// assert_eq!(title.localize("fr", "en"), "Imprint");
/// ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A string with optional per-language translations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum I18nString {
    /// Single value used for every language
    Plain(String),

    /// Translations keyed by language code (e.g. "en", "de-formal")
    Localized(BTreeMap<String, String>),
}

impl Default for I18nString {
    fn default() -> Self {
        I18nString::Plain(String::new())
    }
}

impl From<&str> for I18nString {
    fn from(value: &str) -> Self {
        I18nString::Plain(value.to_string())
    }
}

impl From<String> for I18nString {
    fn from(value: String) -> Self {
        I18nString::Plain(value)
    }
}

impl I18nString {
    /// Resolves the text to show for `lang`
    ///
    /// Lookup order for translated values: exact language code, base
    /// language (`de` for `de-formal`), `fallback`, then the first non-empty
    /// translation.
    pub fn localize(&self, lang: &str, fallback: &str) -> &str {
        let map = match self {
            I18nString::Plain(value) => return value,
            I18nString::Localized(map) => map,
        };

        let lookup = |code: &str| {
            map.iter()
                .find(|(key, value)| key.eq_ignore_ascii_case(code) && !value.trim().is_empty())
                .map(|(_, value)| value.as_str())
        };

        let base = lang.split('-').next().unwrap_or(lang);

        lookup(lang)
            .or_else(|| lookup(base))
            .or_else(|| lookup(fallback))
            .or_else(|| {
                map.values()
                    .find(|value| !value.trim().is_empty())
                    .map(String::as_str)
            })
            .unwrap_or("")
    }

    /// Iterates over every stored translation
    pub fn translations(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            I18nString::Plain(value) => Box::new(std::iter::once(value.as_str())),
            I18nString::Localized(map) => Box::new(map.values().map(String::as_str)),
        }
    }

    /// True when no translation contains visible text
    pub fn is_blank(&self) -> bool {
        self.translations().all(|value| value.trim().is_empty())
    }

    /// Length in characters of the longest translation
    pub fn max_chars(&self) -> usize {
        self.translations()
            .map(|value| value.chars().count())
            .max()
            .unwrap_or(0)
    }
}

/// Picks the request language
///
/// An explicit `?lang=` wins. Otherwise the `Accept-Language` entry with the
/// highest quality is used (earliest on ties). Falls back to `default`.
pub fn negotiate_language(explicit: Option<&str>, accept_language: Option<&str>, default: &str) -> String {
    if let Some(lang) = explicit.map(str::trim).filter(|l| !l.is_empty()) {
        return lang.to_ascii_lowercase();
    }

    let mut best: Option<(&str, f32)> = None;

    for entry in accept_language.unwrap_or("").split(',') {
        let mut parts = entry.split(';');
        let tag = parts.next().unwrap_or("").trim();
        if tag.is_empty() || tag == "*" {
            continue;
        }

        let quality = parts
            .filter_map(|param| param.trim().strip_prefix("q="))
            .find_map(|q| q.parse::<f32>().ok())
            .unwrap_or(1.0);

        if quality <= 0.0 {
            continue;
        }

        if best.map_or(true, |(_, q)| quality > q) {
            best = Some((tag, quality));
        }
    }

    best.map(|(tag, _)| tag.to_ascii_lowercase())
        .unwrap_or_else(|| default.to_string())
}
