//! Link building for rendered views.
//!
//! All public URLs follow `/{lang}/{kind}/{slug}`, with slugs encoded as a
//! single path component. Pagination and search state travel in the query
//! string; [`add_query_arg`] appends to whatever query a base URL already has.

use crate::lang::Lang;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped in a path component or query value: everything except
/// the RFC 3986 unreserved set.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Name of the query parameter carrying the pagination offset.
pub const OFFSET_PARAM: &str = "offset";

/// Percent-encode a single path component or query value.
pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, COMPONENT).to_string()
}

/// Append `key=value` to a URL, using `?` or `&` as appropriate.
pub fn add_query_arg(url: &str, key: &str, value: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{url}{sep}{}={}", encode_component(key), encode_component(value))
}

/// Build a query string from pairs, dropping empty values.
///
/// Returns an empty string (no `?`) when every value is empty.
pub fn query_string(pairs: &[(&str, &str)]) -> String {
    let parts: Vec<String> = pairs
        .iter()
        .filter(|(_, v)| !v.is_empty())
        .map(|(k, v)| format!("{}={}", encode_component(k), encode_component(v)))
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("?{}", parts.join("&"))
    }
}

/// Link builder bound to a site prefix and a language.
#[derive(Debug, Clone)]
pub struct Links {
    base_url: String,
    lang: Lang,
}

impl Links {
    pub fn new(base_url: &str, lang: Lang) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            lang,
        }
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    /// Language home, e.g. `/ka`.
    pub fn home(&self) -> String {
        format!("{}/{}", self.base_url, self.lang)
    }

    /// Index page for a section, e.g. `/en/themes`.
    pub fn index(&self, section: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.lang, section)
    }

    /// Detail page, e.g. `/en/theme/old-tbilisi`.
    pub fn detail(&self, kind: &str, slug: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.base_url,
            self.lang,
            kind,
            encode_component(slug)
        )
    }
}
