//! # Photomuseum Bridge
//!
//! Bilingual (English / Georgian) pages for a photo archive whose records live
//! in a hosted content store. The store answers GROQ queries over HTTPS; the
//! bridge turns a URL or an embedded shortcode into the queries for one view,
//! caches the answers, and renders the view as a self-contained HTML fragment.
//!
//! # Architecture: Request → View → Markup
//!
//! ```text
//! 1. Route     /ka/theme/portraits?offset=24  →  Request
//! 2. Resolve   Request  →  View               (store queries, through the cache)
//! 3. Render    View     →  Markup             (maud, bilingual labels, pager)
//! ```
//!
//! Each stage is a plain function of its input. Resolution talks to the store
//! only through the [`client::ContentStore`] trait, so tests resolve views
//! against canned answers, and rendering never touches the network at all.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`router`] | URL routes, shortcodes, and the [`router::Bridge`] that runs a request end to end |
//! | [`resolve`] | Request validation, pagination windows, and the per-page query sequences |
//! | [`render`] | Maud templates for every view, notices, and the pager |
//! | [`queries`] | The GROQ query catalog and its parameters |
//! | [`client`] | HTTP store client and the [`client::ContentStore`] seam |
//! | [`cache`] | TTL cache with a generation token in every key |
//! | [`model`] | Query result shapes |
//! | [`hierarchy`] | Parent trails and sibling ordering for themes and collections |
//! | [`lang`] | Language codes and two-language text with fallback chains |
//! | [`i18n`] | Interface labels in both languages |
//! | [`links`] | Link building and query-string encoding |
//! | [`schema`] | Field rules and previews for exported CMS documents |
//! | [`config`] | `bridge.toml` loading, validation, and environment overrides |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Strict Language Filtering
//!
//! A page in one language lists only records that have text in that language.
//! Records are never shown half-translated; a detail page for a record with no
//! text in the requested language renders a "not available" notice instead.
//!
//! ## Generation-Scoped Cache
//!
//! Cache keys hash the query, its parameters, the store identity, and a
//! generation token. Advancing the token (`bust-cache`) invalidates every entry
//! at once without touching the entries themselves; they expire on their own.
//!
//! ## One Attempt, Sequential Queries
//!
//! Every store call is made once, in order. A failed call is not cached and
//! shows up as a notice in place of the listing it would have filled.

pub mod cache;
pub mod client;
pub mod config;
pub mod hierarchy;
pub mod i18n;
pub mod lang;
pub mod links;
pub mod model;
pub mod output;
pub mod queries;
pub mod render;
pub mod resolve;
pub mod router;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_helpers;
