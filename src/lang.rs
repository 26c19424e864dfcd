//! Bilingual text handling.
//!
//! Every public-facing string in the archive is stored twice, once in English
//! and once in Georgian, and either half may be missing. This module owns the
//! two supported language codes and the rules for picking a display value.
//!
//! ## Fallback chains
//!
//! Which value a field shows when the requested language is empty is decided
//! per field when the schema is defined, not at render time:
//!
//! | Chain | Order | Used by |
//! |-------|-------|---------|
//! | [`Fallback::Strict`] | requested | photo titles, descriptions, dates, alt text |
//! | [`Fallback::Bilingual`] | requested → en → ka | theme/collection labels, person names |
//! | [`Fallback::PlacePrimary`] | requested → primary → titleKa | place titles |
//!
//! The same chain is expressed twice: [`Fallback::projection`] emits the GROQ
//! `coalesce(...)` used by the store, and [`LocalizedText::resolve`] applies it
//! to values already in memory.
//!
//! ## Availability
//!
//! [`LocalizedText::has_lang`] answers whether an item exists in a language at
//! all. It never falls back: an item titled only in Georgian is not available
//! in English even though its resolved display title is non-empty.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two supported interface languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    #[default]
    En,
    Ka,
}

impl Lang {
    pub const ALL: [Lang; 2] = [Lang::En, Lang::Ka];

    /// Normalize arbitrary input to a supported language.
    ///
    /// Trims and lowercases; anything other than `en` or `ka` (including an
    /// empty string) maps to the default, English.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "ka" => Lang::Ka,
            _ => Lang::En,
        }
    }

    /// Strict parse used by the router, where an unknown prefix is not a language.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "en" => Some(Lang::En),
            "ka" => Some(Lang::Ka),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ka => "ka",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A bilingual value as stored in the CMS (`localizedString` / `localizedText`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ka: Option<String>,
}

impl LocalizedText {
    pub fn new(en: Option<&str>, ka: Option<&str>) -> Self {
        Self {
            en: en.map(str::to_string),
            ka: ka.map(str::to_string),
        }
    }

    /// Raw value for one language, `None` when missing or blank.
    pub fn get(&self, lang: Lang) -> Option<&str> {
        let value = match lang {
            Lang::En => self.en.as_deref(),
            Lang::Ka => self.ka.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// Trimmed value for one language, empty string when missing.
    pub fn trimmed(&self, lang: Lang) -> &str {
        self.get(lang).map(str::trim).unwrap_or("")
    }

    /// Whether the value is blank in both languages.
    pub fn is_blank(&self) -> bool {
        self.get(Lang::En).is_none() && self.get(Lang::Ka).is_none()
    }

    /// Language-availability flag: non-empty in exactly the requested language.
    pub fn has_lang(&self, lang: Lang) -> bool {
        self.get(lang).is_some()
    }

    /// Resolve with a fallback chain. `primary` is only consulted by
    /// [`Fallback::PlacePrimary`], where it is the plain English title.
    pub fn resolve<'a>(&'a self, lang: Lang, chain: Fallback, primary: Option<&'a str>) -> Option<&'a str> {
        let non_blank = |v: Option<&'a str>| v.filter(|s| !s.trim().is_empty());
        match chain {
            Fallback::Strict => self.get(lang),
            Fallback::Bilingual => self
                .get(lang)
                .or_else(|| self.get(Lang::En))
                .or_else(|| self.get(Lang::Ka)),
            Fallback::PlacePrimary => self
                .get(lang)
                .or_else(|| non_blank(primary))
                .or_else(|| self.get(Lang::Ka)),
        }
    }
}

/// Per-field fallback chain, fixed when the field is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Requested language only.
    Strict,
    /// Requested language, then English, then Georgian.
    Bilingual,
    /// Requested language key, then the plain primary field, then `titleKa`.
    PlacePrimary,
}

impl Fallback {
    /// GROQ expression resolving `field` under this chain, against `$lang`.
    ///
    /// ```
    /// use photomuseum_bridge::lang::Fallback;
    /// assert_eq!(Fallback::Strict.projection("title"), "title[$lang]");
    /// assert_eq!(
    ///     Fallback::Bilingual.projection("name"),
    ///     "coalesce(name[$lang], name.en, name.ka)"
    /// );
    /// assert_eq!(
    ///     Fallback::PlacePrimary.projection("title"),
    ///     "coalesce(title[$lang], title, titleKa)"
    /// );
    /// ```
    pub fn projection(self, field: &str) -> String {
        match self {
            Fallback::Strict => format!("{field}[$lang]"),
            Fallback::Bilingual => format!("coalesce({field}[$lang], {field}.en, {field}.ka)"),
            Fallback::PlacePrimary => format!("coalesce({field}[$lang], {field}, {field}Ka)"),
        }
    }
}

/// GROQ predicate computing the availability flag for `field`.
pub fn has_lang_projection(field: &str) -> String {
    format!("defined({field}[$lang]) && string({field}[$lang]) != \"\"")
}
