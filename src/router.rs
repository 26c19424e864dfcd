//! Request entry points: public URL routes, embeddable shortcodes, and the
//! [`Bridge`] that runs either one through resolve and render.
//!
//! ## Routes
//!
//! ```text
//! /                          → en home
//! /{lang}                    → home
//! /{lang}/themes             → theme index (same for photographers, places,
//!                              search, collections)
//! /{lang}/theme/{slug}       → theme detail (same for photographer, place,
//!                              collection, photo)
//! ```
//!
//! `{lang}` is `en` or `ka`. Anything else is not routed and renders the
//! not-found fragment. The query string carries `offset` (also accepted as
//! `pmsb_offset`), `limit`, and the search fields `q`, `theme`,
//! `photographer` and `place`.
//!
//! ## Shortcodes
//!
//! `[pmsb_theme lang="ka" slug="old-tbilisi" offset="0" limit="24"]` names a
//! page kind with a `pmsb_` prefix. Missing attributes fall back to the URL
//! the shortcode is embedded in.

use crate::client::ContentStore;
use crate::config::SiteConfig;
use crate::lang::Lang;
use crate::queries::SearchFilters;
use crate::render::{Renderer, document, wrap};
use crate::resolve::{PageKind, Request, Resolver};
use maud::{Markup, html};
use percent_encoding::percent_decode_str;
use std::collections::BTreeMap;
use thiserror::Error;

/// Prefix shared by every shortcode tag.
pub const SHORTCODE_PREFIX: &str = "pmsb_";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShortcodeError {
    #[error("not a shortcode: {0:?}")]
    Malformed(String),
    #[error("unknown shortcode tag: {0}")]
    UnknownTag(String),
    #[error("unterminated attribute value in {0:?}")]
    Unterminated(String),
}

// ============================================================================
// Routes
// ============================================================================

/// Route a URL path and raw query string. `None` means not found.
pub fn route(path: &str, query: &str) -> Option<Request> {
    let trimmed = path.trim_matches('/');
    let mut request = if trimmed.is_empty() {
        Request::new("en", PageKind::Home)
    } else {
        let segments: Vec<&str> = trimmed.split('/').collect();
        let lang = Lang::parse(segments[0])?.code();
        match segments[1..] {
            [] => Request::new(lang, PageKind::Home),
            [section] => match PageKind::parse(section)? {
                page if page.needs_slug() || page == PageKind::Home => return None,
                page => Request::new(lang, page),
            },
            [kind, slug] => match PageKind::parse(kind)? {
                page if page.needs_slug() && !slug.is_empty() => {
                    Request::new(lang, page).with_slug(&decode(slug, false))
                }
                _ => return None,
            },
            _ => return None,
        }
    };

    let args = parse_query(query);
    let get = |key: &str| args.get(key).map(String::as_str);
    request.offset = get("pmsb_offset").or_else(|| get("offset")).map_or(0, int_or_zero);
    request.limit = get("limit").and_then(parse_int);
    request.search = SearchFilters {
        q: get("q").unwrap_or_default().to_string(),
        theme: get("theme").unwrap_or_default().to_string(),
        photographer: get("photographer").unwrap_or_default().to_string(),
        place: get("place").unwrap_or_default().to_string(),
    };
    tracing::debug!(path, page = %request.page, slug = %request.slug, "routed");
    Some(request)
}

/// Route a request target such as `/ka/search?q=mtskheta`.
pub fn route_target(target: &str) -> Option<Request> {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    route(path, query)
}

/// Decode a query string into its last value per key.
pub fn parse_query(query: &str) -> BTreeMap<String, String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(key, true), decode(value, true))
        })
        .collect()
}

fn decode(raw: &str, form: bool) -> String {
    let raw = if form { raw.replace('+', " ") } else { raw.to_string() };
    percent_decode_str(&raw).decode_utf8_lossy().into_owned()
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Unparseable offsets start from the beginning.
fn int_or_zero(raw: &str) -> i64 {
    parse_int(raw).unwrap_or(0)
}

/// Fragment for paths no route matches.
pub fn not_found() -> Markup {
    wrap(html! { h1 { "Not found" } })
}

// ============================================================================
// Shortcodes
// ============================================================================

/// A parsed `[pmsb_* key="value" ...]` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcode {
    pub page: PageKind,
    pub attrs: BTreeMap<String, String>,
}

impl Shortcode {
    pub fn parse(tag: &str) -> Result<Self, ShortcodeError> {
        let inner = tag
            .trim()
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ShortcodeError::Malformed(tag.to_string()))?;

        let (name, mut rest) = inner
            .split_once(char::is_whitespace)
            .unwrap_or((inner, ""));
        let page = name
            .strip_prefix(SHORTCODE_PREFIX)
            .and_then(PageKind::parse)
            .ok_or_else(|| ShortcodeError::UnknownTag(name.to_string()))?;

        let mut attrs = BTreeMap::new();
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }
            let end = rest
                .find(|c: char| c == '=' || c.is_whitespace())
                .unwrap_or(rest.len());
            let (key, after) = rest.split_at(end);
            let Some(after) = after.strip_prefix('=') else {
                // Bare words without a value are ignored.
                rest = after;
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let after = after.trim_start();
            let (value, remaining) = match after.chars().next() {
                Some(quote @ ('"' | '\'')) => after[1..]
                    .split_once(quote)
                    .ok_or_else(|| ShortcodeError::Unterminated(tag.to_string()))?,
                _ => after.split_once(char::is_whitespace).unwrap_or((after, "")),
            };
            attrs.insert(key, value.to_string());
            rest = remaining;
        }

        Ok(Self { page, attrs })
    }

    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// Build a request. Attributes win for language, slug and limit; the
    /// enclosing URL's offset wins over the attribute when a context is given.
    pub fn to_request(&self, context: Option<&Request>) -> Request {
        let non_empty = |v: &&str| !v.trim().is_empty();
        let lang = self
            .attr("lang")
            .filter(non_empty)
            .map(str::to_string)
            .or_else(|| context.map(|c| c.lang.clone()))
            .unwrap_or_else(|| Lang::En.code().to_string());
        let slug = self
            .attr("slug")
            .filter(non_empty)
            .map(str::to_string)
            .or_else(|| context.map(|c| c.slug.clone()))
            .unwrap_or_default();
        let offset = match context {
            Some(c) if c.offset != 0 => c.offset,
            _ => self.attr("offset").map_or(0, int_or_zero),
        };
        let limit = self
            .attr("limit")
            .and_then(parse_int)
            .or_else(|| context.and_then(|c| c.limit));

        let fallback = context.map(|c| c.search.clone()).unwrap_or_default();
        let pick = |key: &str, default: &str| {
            self.attr(key)
                .map_or_else(|| default.to_string(), str::to_string)
        };
        let search = SearchFilters {
            q: pick("q", &fallback.q),
            theme: pick("theme", &fallback.theme),
            photographer: pick("photographer", &fallback.photographer),
            place: pick("place", &fallback.place),
        };

        Request {
            lang,
            page: self.page,
            slug,
            offset,
            limit,
            search,
        }
    }

    /// The shortcode a routed request is served through.
    pub fn for_request(request: &Request) -> String {
        let mut tag = format!("[{SHORTCODE_PREFIX}{} lang=\"{}\"", request.page, request.language());
        if request.page.needs_slug() {
            tag.push_str(&format!(" slug=\"{}\"", request.slug.replace('"', "")));
        }
        if request.page.is_paginated() {
            tag.push_str(&format!(" offset=\"{}\"", request.offset.max(0)));
            if let Some(limit) = request.limit {
                tag.push_str(&format!(" limit=\"{limit}\""));
            }
        }
        tag.push(']');
        tag
    }
}

// ============================================================================
// Bridge
// ============================================================================

/// A rendered page: its browser title and wrapped fragment.
#[derive(Debug)]
pub struct Page {
    pub title: String,
    pub lang: Lang,
    pub body: Markup,
}

impl Page {
    /// The page as a standalone HTML document.
    pub fn into_document(self) -> Markup {
        document(&self.title, self.lang, self.body)
    }
}

/// Resolves and renders requests against one store and site.
pub struct Bridge<S> {
    resolver: Resolver<S>,
    base_url: String,
    debug: bool,
}

impl<S: ContentStore> Bridge<S> {
    pub fn new(store: S, site: &SiteConfig) -> Self {
        Self {
            resolver: Resolver::new(store, site.default_limit),
            base_url: site.base_url.clone(),
            debug: site.debug,
        }
    }

    pub fn resolver(&self) -> &Resolver<S> {
        &self.resolver
    }

    pub fn render_request(&self, request: &Request) -> Page {
        let lang = request.language();
        let renderer = Renderer::new(&self.base_url, lang, self.debug);
        let outcome = self.resolver.resolve(request);
        if let Err(e) = &outcome {
            tracing::info!(page = %request.page, slug = %request.slug, error = %e, "view not rendered");
        }
        Page {
            title: renderer.title(&outcome),
            lang,
            body: renderer.render(&outcome),
        }
    }

    /// Route and render a URL; unrouted paths give the not-found fragment.
    pub fn render_path(&self, path: &str, query: &str) -> Page {
        match route(path, query) {
            Some(request) => self.render_request(&request),
            None => Page {
                title: "Not found".to_string(),
                lang: Lang::En,
                body: not_found(),
            },
        }
    }

    /// Render a shortcode embedded at `context` (the enclosing page's route).
    pub fn render_shortcode(&self, tag: &str, context: Option<&Request>) -> Result<Page, ShortcodeError> {
        let shortcode = Shortcode::parse(tag)?;
        Ok(self.render_request(&shortcode.to_request(context)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::QueryName;
    use crate::test_helpers::{StubStore, theme_json};

    // =========================================================================
    // Routes
    // =========================================================================

    #[test]
    fn root_and_language_homes() {
        let root = route("/", "").unwrap();
        assert_eq!((root.lang.as_str(), root.page), ("en", PageKind::Home));
        let ka = route("/ka/", "").unwrap();
        assert_eq!((ka.lang.as_str(), ka.page), ("ka", PageKind::Home));
    }

    #[test]
    fn index_and_detail_routes() {
        assert_eq!(route("/en/themes", "").unwrap().page, PageKind::Themes);
        assert_eq!(route("/ka/collections/", "").unwrap().page, PageKind::Collections);

        let photo = route("/ka/photo/sioni-street", "").unwrap();
        assert_eq!(photo.page, PageKind::Photo);
        assert_eq!(photo.slug, "sioni-street");
    }

    #[test]
    fn slug_is_percent_decoded() {
        let r = route("/ka/place/%E1%83%97%E1%83%91%E1%83%98%E1%83%9A%E1%83%98%E1%83%A1%E1%83%98", "").unwrap();
        assert_eq!(r.slug, "თბილისი");
    }

    #[test]
    fn unknown_routes_are_not_found() {
        assert!(route("/fr/themes", "").is_none());
        assert!(route("/en/eras", "").is_none());
        assert!(route("/en/theme", "").is_none());
        assert!(route("/en/themes/extra", "").is_none());
        assert!(route("/en/theme/a/b", "").is_none());
        assert!(route("/en/home", "").is_none());
        assert!(route("/EN/themes", "").is_none());
    }

    #[test]
    fn query_carries_window_and_search() {
        let r = route_target("/en/search?q=old+town&theme=bazaars&offset=48&limit=12").unwrap();
        assert_eq!(r.offset, 48);
        assert_eq!(r.limit, Some(12));
        assert_eq!(r.search.q, "old town");
        assert_eq!(r.search.theme, "bazaars");

        let legacy = route_target("/en/theme/x?pmsb_offset=24").unwrap();
        assert_eq!(legacy.offset, 24);

        let junk = route_target("/en/theme/x?offset=abc&limit=").unwrap();
        assert_eq!(junk.offset, 0);
        assert_eq!(junk.limit, None);
    }

    #[test]
    fn not_found_fragment() {
        let html = not_found().into_string();
        assert!(html.contains("<h1>Not found</h1>"));
        assert!(html.contains("pmsb-wrap"));
    }

    // =========================================================================
    // Shortcodes
    // =========================================================================

    #[test]
    fn parses_shortcode_attributes() {
        let sc = Shortcode::parse(r#"[pmsb_theme lang="ka" slug='old-tbilisi' offset=24 limit="12"]"#).unwrap();
        assert_eq!(sc.page, PageKind::Theme);
        assert_eq!(sc.attrs["lang"], "ka");
        assert_eq!(sc.attrs["slug"], "old-tbilisi");
        assert_eq!(sc.attrs["offset"], "24");

        let req = sc.to_request(None);
        assert_eq!(req.offset, 24);
        assert_eq!(req.limit, Some(12));
        assert_eq!(req.language(), Lang::Ka);
    }

    #[test]
    fn shortcode_errors() {
        assert!(matches!(Shortcode::parse("pmsb_home"), Err(ShortcodeError::Malformed(_))));
        assert!(matches!(Shortcode::parse("[]"), Err(ShortcodeError::Malformed(_))));
        assert_eq!(
            Shortcode::parse("[gallery ids=1]"),
            Err(ShortcodeError::UnknownTag("gallery".into()))
        );
        assert!(matches!(
            Shortcode::parse(r#"[pmsb_theme slug="open]"#),
            Err(ShortcodeError::Unterminated(_))
        ));
    }

    #[test]
    fn shortcode_falls_back_to_context() {
        let context = route_target("/ka/theme/bazaars?offset=48").unwrap();
        let req = Shortcode::parse("[pmsb_theme offset=\"0\"]").unwrap().to_request(Some(&context));
        assert_eq!(req.lang, "ka");
        assert_eq!(req.slug, "bazaars");
        assert_eq!(req.offset, 48);

        let bare = Shortcode::parse("[pmsb_home]").unwrap().to_request(None);
        assert_eq!(bare.language(), Lang::En);
    }

    #[test]
    fn shortcode_for_routed_request() {
        let r = route_target("/ka/collection/family?offset=24").unwrap();
        assert_eq!(
            Shortcode::for_request(&r),
            r#"[pmsb_collection lang="ka" slug="family" offset="24"]"#
        );
        let home = route("/", "").unwrap();
        assert_eq!(Shortcode::for_request(&home), r#"[pmsb_home lang="en"]"#);
    }

    // =========================================================================
    // Bridge
    // =========================================================================

    #[test]
    fn bridge_renders_routed_page() {
        let store = StubStore::new().with(QueryName::ThemeDetail, theme_json("t1", "bazaars", Some("Bazaars")));
        let bridge = Bridge::new(&store, &SiteConfig::default());
        let page = bridge.render_path("/en/theme/bazaars", "");
        assert_eq!(page.title, "Bazaars");
        let html = page.body.into_string();
        assert!(html.contains("<h1 class=\"pmsb-h1\">Bazaars</h1>"));
        assert!(html.contains("No photos found for this theme."));
    }

    #[test]
    fn bridge_unrouted_path_skips_store() {
        let store = StubStore::new();
        let bridge = Bridge::new(&store, &SiteConfig::default());
        let page = bridge.render_path("/de/themes", "");
        assert!(page.body.into_string().contains("Not found"));
        assert!(store.calls().is_empty());
    }

    #[test]
    fn bridge_document_wraps_page() {
        let store = StubStore::new();
        let bridge = Bridge::new(&store, &SiteConfig::default());
        let doc = bridge
            .render_shortcode(r#"[pmsb_themes lang="ka"]"#, None)
            .unwrap()
            .into_document()
            .into_string();
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<title>თემები</title>"));
    }
}
