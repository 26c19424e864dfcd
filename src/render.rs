//! HTML rendering for resolved views.
//!
//! Pure: a [`View`] (or the [`ViewError`] that replaced it) goes in, a maud
//! [`Markup`] fragment comes out. No store or cache access happens here.
//!
//! ## Markup
//!
//! Every fragment is wrapped in a `pmsb-wrap` container and styled by the
//! `pmsb-*` classes in `static/style.css`. Theme cards carry a JSON list of
//! image URLs in `data-images` for `static/slideshow.js`.
//!
//! ## Escaping
//!
//! All content text goes through maud's `(expr)` splices and is escaped. Only
//! the embedded stylesheet and script are emitted with [`PreEscaped`].

use crate::i18n::{collection_type_label, rights_label, sub_collection_count, t};
use crate::lang::Lang;
use crate::links::{OFFSET_PARAM, Links, add_query_arg, query_string};
use crate::model::{
    CollectionCard, ImageField, PhotoCard, PhotographerSummary, PlaceSummary, Ref, ThemeCard,
    life_years, text,
};
use crate::resolve::{
    Choice, CollectionContent, CollectionView, Crumb, HomeView, Listing, PageState, PhotoView,
    PhotographerView, PlaceView, SearchView, ThemeView, View, ViewError,
};
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/slideshow.js");

/// Characters of a theme description shown on its card.
pub const EXCERPT_CHARS: usize = 140;

const WRAP_STYLE: &str = "max-width:1100px;margin:0 auto;padding:24px 16px;";
const PAGER_STYLE: &str = "margin-top:18px;display:flex;gap:10px;flex-wrap:wrap";

/// Renders views for one language and site prefix.
#[derive(Debug, Clone)]
pub struct Renderer {
    lang: Lang,
    links: Links,
    debug: bool,
}

impl Renderer {
    pub fn new(base_url: &str, lang: Lang, debug: bool) -> Self {
        Self {
            lang,
            links: Links::new(base_url, lang),
            debug,
        }
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    fn t<'k>(&self, key: &'k str) -> &'k str {
        t(key, self.lang)
    }

    /// Render a resolution outcome as a wrapped fragment.
    pub fn render(&self, outcome: &Result<View, ViewError>) -> Markup {
        match outcome {
            Ok(view) => self.render_view(view),
            Err(e) => wrap(self.notice(e)),
        }
    }

    pub fn render_view(&self, view: &View) -> Markup {
        let body = match view {
            View::Home(home) => self.home(home),
            View::Themes(themes) => html! {
                h1.pmsb-h1 { (self.t("themes")) }
                (self.theme_grid(themes))
            },
            View::Theme(theme) => self.theme(theme),
            View::Photographers(items) => self.photographers(items),
            View::Photographer(view) => self.photographer(view),
            View::Places(items) => self.places(items),
            View::Place(view) => self.place(view),
            View::Search(search) => self.search(search),
            View::Collections(items) => html! {
                h1.pmsb-h1 { (self.t("collections")) }
                (self.collection_grid(items))
            },
            View::Collection(view) => self.collection(view),
            View::Photo(view) => self.photo(view),
        };
        wrap(body)
    }

    /// Browser title for a resolved page.
    pub fn title(&self, outcome: &Result<View, ViewError>) -> String {
        let label = |key: &str| self.t(key).to_string();
        match outcome {
            Err(_) => label("not_found"),
            Ok(View::Home(_)) => label("browse_archive"),
            Ok(View::Themes(_)) => label("themes"),
            Ok(View::Photographers(_)) => label("photographers"),
            Ok(View::Places(_)) => label("places"),
            Ok(View::Search(_)) => label("search"),
            Ok(View::Collections(_)) => label("collections"),
            Ok(View::Theme(v)) => text(&v.theme.title).unwrap_or_default().to_string(),
            Ok(View::Photographer(v)) => text(&v.photographer.name).unwrap_or_default().to_string(),
            Ok(View::Place(v)) => text(&v.place.title).unwrap_or_default().to_string(),
            Ok(View::Collection(v)) => text(&v.collection.title).unwrap_or_default().to_string(),
            Ok(View::Photo(v)) => text(&v.photo.title).unwrap_or_default().to_string(),
        }
    }

    // =========================================================================
    // Notices
    // =========================================================================

    /// Localized notice for a failed view or listing. HTTP detail only shows
    /// in debug mode.
    pub fn notice(&self, err: &ViewError) -> Markup {
        let key = match err {
            ViewError::Config(_) => "not_configured",
            ViewError::NotFound { .. } => "not_found",
            ViewError::LanguageUnavailable { .. } => "not_available_lang",
            ViewError::Transport(_) | ViewError::Http { .. } | ViewError::Payload { .. } => {
                "unavailable"
            }
        };
        let detail = match err {
            ViewError::Http { code, detail } => format!(
                "HTTP {code}\n{}",
                serde_json::to_string_pretty(detail).unwrap_or_default()
            ),
            other => other.to_string(),
        };
        html! {
            p.pmsb-muted.pmsb-notice { (self.t(key)) }
            @if self.debug {
                pre.pmsb-debug { (detail) }
            }
        }
    }

    fn listing<T>(&self, listing: &Listing<T>, empty_key: &str, grid: impl FnOnce(&[T]) -> Markup) -> Markup {
        match listing {
            Err(e) => self.notice(e),
            Ok(items) if items.is_empty() => html! { p.pmsb-muted { (self.t(empty_key)) } },
            Ok(items) => grid(items),
        }
    }

    // =========================================================================
    // Components
    // =========================================================================

    fn back_link(&self, href: &str, label: &str) -> Markup {
        html! {
            p.pmsb-muted { a href=(href) { "← " (label) } }
        }
    }

    fn trail(&self, kind: &str, crumbs: &[Crumb]) -> Markup {
        html! {
            @if !crumbs.is_empty() {
                nav.pmsb-trail {
                    @for (i, crumb) in crumbs.iter().enumerate() {
                        @if i > 0 { " › " }
                        a href=(self.links.detail(kind, &crumb.slug)) { (crumb.label) }
                    }
                }
            }
        }
    }

    /// Prev/Next links adjusting the offset on `base`.
    pub fn pager(&self, base: &str, page: &PageState) -> Markup {
        html! {
            div style=(PAGER_STYLE) {
                @if let Some(prev) = page.prev_offset() {
                    a.pmsb-btn href=(add_query_arg(base, OFFSET_PARAM, &prev.to_string())) {
                        (self.t("prev"))
                    }
                }
                @if let Some(next) = page.next_offset() {
                    a.pmsb-btn href=(add_query_arg(base, OFFSET_PARAM, &next.to_string())) {
                        (self.t("next"))
                    }
                }
            }
        }
    }

    /// A search select with a blank placeholder option first.
    pub fn select(&self, name: &str, current: &str, options: &[Choice], placeholder: &str) -> Markup {
        html! {
            select.pmsb-input name=(name) style="max-width:220px" {
                option value="" { (placeholder) }
                @for choice in options.iter().filter(|c| !c.value.is_empty() && !c.label.is_empty()) {
                    option value=(choice.value) selected[current == choice.value] { (choice.label) }
                }
            }
        }
    }

    fn kv_panel(&self, rows: &[(&str, Markup)]) -> Markup {
        html! {
            @if !rows.is_empty() {
                div.pmsb-card style="margin:14px 0" {
                    div.pmsb-pad {
                        div.pmsb-kv {
                            @for (key, value) in rows {
                                div.pmsb-k { (self.t(key)) }
                                div.pmsb-v { (value) }
                            }
                        }
                    }
                }
            }
        }
    }

    fn pills(&self, links: &[(String, &str)]) -> Markup {
        html! {
            @if !links.is_empty() {
                div.pmsb-row style="margin:14px 0 6px 0" {
                    @for (href, label) in links {
                        a.pmsb-pill href=(href) { (label) }
                    }
                }
            }
        }
    }

    fn ref_pill<'a>(&self, kind: &str, item: &'a Ref) -> Option<(String, &'a str)> {
        item.slug().map(|slug| (self.links.detail(kind, slug), item.label()))
    }

    pub fn theme_grid(&self, themes: &[ThemeCard]) -> Markup {
        let shown: Vec<&ThemeCard> = themes
            .iter()
            .filter(|t| t.is_available() && t.slug().is_some())
            .collect();
        if shown.is_empty() {
            return html! { p.pmsb-muted { (self.t("no_results")) } };
        }
        html! {
            div.pmsb-grid {
                @for theme in shown {
                    (self.theme_card(theme))
                }
            }
        }
    }

    fn theme_card(&self, theme: &ThemeCard) -> Markup {
        let href = self.links.detail("theme", theme.slug().unwrap_or_default());
        let images = theme.slideshow();
        let urls: Vec<&str> = images.iter().filter_map(|img| img.url()).collect();
        let data = serde_json::to_string(&urls).unwrap_or_else(|_| "[]".to_string());

        html! {
            div.pmsb-card.pmsb-theme-card data-images=(data) {
                @if let Some(first) = images.first() {
                    a.pmsb-card-link href=(href) target="_blank" rel="noopener" {
                        img.pmsb-img.pmsb-slideshow-img
                            src=(first.url().unwrap_or_default())
                            alt=(first.alt.as_deref().unwrap_or_default())
                            loading="lazy";
                        @if urls.len() > 1 {
                            div.pmsb-image-counter {
                                span.pmsb-current { "1" } "/" (urls.len())
                            }
                        }
                    }
                } @else {
                    a.pmsb-card-link.pmsb-no-image href=(href) target="_blank" rel="noopener" {
                        div.pmsb-placeholder { "📸" }
                    }
                }
                div.pmsb-pad {
                    div {
                        a href=(href) target="_blank" rel="noopener" {
                            strong { (theme.title.as_deref().unwrap_or_default()) }
                        }
                    }
                    @if let Some(desc) = text(&theme.description) {
                        div.pmsb-muted style="margin-top:6px" { (excerpt(desc, EXCERPT_CHARS)) }
                    }
                }
            }
        }
    }

    pub fn photo_grid(&self, photos: &[PhotoCard]) -> Markup {
        html! {
            div.pmsb-grid {
                @for photo in photos {
                    @if let Some(slug) = photo.slug() {
                        @let href = self.links.detail("photo", slug);
                        div.pmsb-card {
                            @if let Some(src) = photo.thumb_url() {
                                a href=(href) {
                                    img.pmsb-img
                                        src=(src)
                                        alt=(photo.thumb.as_ref().map(ImageField::alt).unwrap_or_default())
                                        loading="lazy";
                                }
                            }
                            div.pmsb-pad {
                                div { a href=(href) { strong { (photo.title()) } } }
                                @if let Some(date) = text(&photo.date_note) {
                                    div.pmsb-muted { (date) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    /// Photo grid with its pager, or the empty/failed notice.
    fn photo_section(&self, photos: &Listing<PhotoCard>, page: &PageState, base: &str, empty_key: &str) -> Markup {
        self.listing(photos, empty_key, |items| {
            html! {
                (self.photo_grid(items))
                (self.pager(base, page))
            }
        })
    }

    pub fn collection_grid(&self, cards: &[CollectionCard]) -> Markup {
        let shown: Vec<&CollectionCard> = cards
            .iter()
            .filter(|c| c.is_available() && text(&c.slug).is_some())
            .collect();
        if shown.is_empty() {
            return html! { p.pmsb-muted { (self.t("no_results")) } };
        }
        html! {
            div.pmsb-grid {
                @for card in shown {
                    (self.collection_card(card))
                }
            }
        }
    }

    fn collection_card(&self, card: &CollectionCard) -> Markup {
        let href = self.links.detail("collection", text(&card.slug).unwrap_or_default());
        let folder = if card.has_children() { "📁 " } else { "" };
        let badge = if card.is_original_grouping { "📦" } else { "🎨" };
        html! {
            div.pmsb-card {
                @if let Some(src) = card.cover_image.as_ref().and_then(ImageField::url) {
                    a href=(href) target="_blank" rel="noopener" {
                        img.pmsb-img src=(src) alt="" loading="lazy";
                    }
                }
                div.pmsb-pad {
                    div {
                        a href=(href) target="_blank" rel="noopener" {
                            strong { (folder) (badge) " " (card.title.as_deref().unwrap_or_default()) }
                        }
                    }
                    @if let Some(range) = text(&card.date_range_note) {
                        div.pmsb-muted { (range) }
                    }
                    @if let Some(owner) = text(&card.owner_or_collector) {
                        div.pmsb-muted { (owner) }
                    }
                    @if card.has_children() {
                        div.pmsb-muted { (sub_collection_count(card.child_count, self.lang)) }
                    } @else if card.photo_count > 0 {
                        div.pmsb-muted { (card.photo_count) " " (self.t("photos")) }
                    }
                }
            }
        }
    }

    // =========================================================================
    // Pages
    // =========================================================================

    fn home(&self, home: &HomeView) -> Markup {
        let themes = match &home.themes {
            Ok(themes) => self.theme_grid(themes),
            Err(e) => self.notice(e),
        };
        let recent = match &home.recent {
            Ok(items) if items.is_empty() => html! { p.pmsb-muted { "—" } },
            Ok(items) => self.photo_grid(items),
            Err(e) => self.notice(e),
        };
        html! {
            div.pmsb-hero {
                h1.pmsb-h1 { (self.t("browse_archive")) }
                form method="get" action=(self.links.index("search")) {
                    (self.search_row(""))
                }
                p.pmsb-muted style="margin:10px 0 0 0" { (self.t("browse_by")) }
                div.pmsb-row style="margin-top:10px" {
                    @for section in ["themes", "photographers", "places", "collections"] {
                        a.pmsb-pill href=(self.links.index(section)) { (self.t(section)) }
                    }
                }
            }
            h2.pmsb-h2 { (self.t("themes")) }
            (themes)
            h2.pmsb-h2 { (self.t("recently_added")) }
            (recent)
        }
    }

    /// Query input and submit button.
    fn search_row(&self, q: &str) -> Markup {
        html! {
            div.pmsb-row {
                input.pmsb-input type="text" name="q" value=(q)
                    placeholder=(self.t("search_placeholder"));
                button.pmsb-btn type="submit" { (self.t("search")) }
            }
        }
    }

    fn theme(&self, view: &ThemeView) -> Markup {
        let theme = &view.theme;
        let base = self.links.detail("theme", theme.slug.as_deref().unwrap_or_default());
        let children = match &view.children {
            Ok(children) => {
                let pills: Vec<(String, &str)> = children
                    .iter()
                    .filter_map(|c| {
                        let slug = text(&c.slug)?;
                        Some((self.links.detail("theme", slug), c.title.as_deref().unwrap_or_default()))
                    })
                    .collect();
                self.pills(&pills)
            }
            Err(e) => self.notice(e),
        };
        html! {
            (self.back_link(&self.links.index("themes"), self.t("all_themes")))
            (self.trail("theme", &view.trail))
            h1.pmsb-h1 { (theme.title.as_deref().unwrap_or_default()) }
            @if let Some(desc) = text(&theme.description) {
                p { (multiline(desc)) }
            }
            (children)
            h2.pmsb-h2 { (self.t("photos")) }
            (self.photo_section(&view.photos, &view.page, &base, "no_photos_theme"))
        }
    }

    fn photographers(&self, items: &[PhotographerSummary]) -> Markup {
        html! {
            h1.pmsb-h1 { (self.t("photographers")) }
            @if items.is_empty() {
                p.pmsb-muted { (self.t("no_results")) }
            } @else {
                div.pmsb-grid {
                    @for person in items {
                        @if let Some(slug) = text(&person.slug) {
                            @let href = self.links.detail("photographer", slug);
                            div.pmsb-card {
                                div.pmsb-pad {
                                    div { a href=(href) { strong { (person.name.as_deref().unwrap_or_default()) } } }
                                    @if let Some(years) = life_years(person.birth_year, person.death_year) {
                                        div.pmsb-muted { (years) }
                                    }
                                    @if person.photo_count > 0 {
                                        div.pmsb-muted { (person.photo_count) " " (self.t("photos")) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn photographer(&self, view: &PhotographerView) -> Markup {
        let person = &view.photographer;
        let base = self.links.detail("photographer", person.slug.as_deref().unwrap_or_default());
        html! {
            (self.back_link(&self.links.index("photographers"), self.t("all_photographers")))
            h1.pmsb-h1 { (person.name.as_deref().unwrap_or_default()) }
            @if let Some(years) = life_years(person.birth_year, person.death_year) {
                p.pmsb-muted { (years) }
            }
            @if let Some(bio) = text(&person.bio) {
                p { (multiline(bio)) }
            }
            h2.pmsb-h2 { (self.t("photos")) }
            (self.photo_section(&view.photos, &view.page, &base, "no_photos_photographer"))
        }
    }

    fn places(&self, items: &[PlaceSummary]) -> Markup {
        html! {
            h1.pmsb-h1 { (self.t("places")) }
            @if items.is_empty() {
                p.pmsb-muted { (self.t("no_results")) }
            } @else {
                div.pmsb-grid {
                    @for place in items {
                        @if let Some(slug) = text(&place.slug) {
                            @let href = self.links.detail("place", slug);
                            div.pmsb-card {
                                div.pmsb-pad {
                                    div { a href=(href) { strong { (place.title.as_deref().unwrap_or_default()) } } }
                                    @if let Some(sub) = text(&place.subtitle) {
                                        div.pmsb-muted { (sub) }
                                    }
                                    @if place.photo_count > 0 {
                                        div.pmsb-muted { (place.photo_count) " " (self.t("photos")) }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    fn place(&self, view: &PlaceView) -> Markup {
        let place = &view.place;
        let base = self.links.detail("place", place.slug.as_deref().unwrap_or_default());

        let mut rows: Vec<(&str, Markup)> = Vec::new();
        if let Some(kind) = text(&place.place_type) {
            rows.push(("type", html! { (kind) }));
        }
        if let Some(certainty) = text(&place.certainty) {
            rows.push(("certainty", html! { (certainty) }));
        }
        if let Some(parent) = &place.parent {
            if let Some(slug) = parent.slug() {
                rows.push((
                    "parent",
                    html! { a href=(self.links.detail("place", slug)) { (parent.label()) } },
                ));
            }
        }
        let alt_names = place.shown_alt_names();
        if !alt_names.is_empty() {
            rows.push(("alt_names", html! { (alt_names.join(", ")) }));
        }

        html! {
            (self.back_link(&self.links.index("places"), self.t("all_places")))
            h1.pmsb-h1 { (place.title.as_deref().unwrap_or_default()) }
            @if let Some(sub) = text(&place.subtitle) {
                p.pmsb-muted { (sub) }
            }
            (self.kv_panel(&rows))
            h2.pmsb-h2 { (self.t("photos")) }
            (self.photo_section(&view.photos, &view.page, &base, "no_photos_place"))
        }
    }

    fn search(&self, view: &SearchView) -> Markup {
        let f = &view.filters;
        let base = format!(
            "{}{}",
            self.links.index("search"),
            query_string(&[
                ("q", &f.q),
                ("theme", &f.theme),
                ("photographer", &f.photographer),
                ("place", &f.place),
            ])
        );
        let options = |listing: &Listing<Choice>| -> Vec<Choice> {
            listing.as_ref().map(Vec::clone).unwrap_or_default()
        };

        html! {
            h1.pmsb-h1 { (self.t("search")) }
            form.pmsb-hero method="get" action=(self.links.index("search")) {
                (self.search_row(&f.q))
                div.pmsb-row style="margin-top:10px" {
                    (self.select("theme", &f.theme, &options(&view.themes), self.t("themes")))
                    (self.select("photographer", &f.photographer, &options(&view.photographers), self.t("photographers")))
                    (self.select("place", &f.place, &options(&view.places), self.t("places")))
                }
            }
            (self.photo_section(&view.photos, &view.page, &base, "no_results"))
        }
    }

    fn collection(&self, view: &CollectionView) -> Markup {
        let c = &view.collection;
        let base = self.links.detail("collection", c.slug.as_deref().unwrap_or_default());

        let mut rows: Vec<(&str, Markup)> = Vec::new();
        if let Some(kind) = text(&c.collection_type) {
            rows.push(("type", html! { (collection_type_label(kind).unwrap_or(kind)) }));
        }
        if let Some(owner) = text(&c.owner_or_collector) {
            rows.push(("owner_collector", html! { (owner) }));
        }
        if let Some(range) = text(&c.date_range_note) {
            rows.push(("date_range", html! { (range) }));
        }
        if let Some(curator) = c.curated_by.as_ref().filter(|r| !r.label().is_empty()) {
            rows.push(("curated_by", html! { (curator.label()) }));
        }

        let content = match &view.content {
            CollectionContent::Children(children) => html! {
                h2.pmsb-h2 { (self.t("sub_collections")) }
                (self.collection_grid(children))
            },
            CollectionContent::Photos { photos, page } => html! {
                h2.pmsb-h2 { (self.t("photos")) }
                (self.photo_section(photos, page, &base, "no_photos_collection"))
            },
        };

        html! {
            (self.back_link(&self.links.index("collections"), self.t("all_collections")))
            (self.trail("collection", &view.trail))
            h1.pmsb-h1 { (c.title.as_deref().unwrap_or_default()) }
            (self.kv_panel(&rows))
            @if let Some(desc) = text(&c.description) {
                p { (multiline(desc)) }
            }
            (content)
        }
    }

    fn photo(&self, view: &PhotoView) -> Markup {
        let photo = &view.photo;
        let back = match photo.themes.first().and_then(|t| t.slug().map(|s| (s, t.label()))) {
            Some((slug, label)) => (self.links.detail("theme", slug), label),
            None => (self.links.home(), self.t("home")),
        };

        let mut pills = Vec::new();
        pills.extend(photo.photographer.as_ref().and_then(|p| self.ref_pill("photographer", p)));
        pills.extend(photo.places.iter().filter_map(|p| self.ref_pill("place", p)));
        pills.extend(photo.themes.iter().filter_map(|t| self.ref_pill("theme", t)));

        let mut rows: Vec<(&str, Markup)> = Vec::new();
        if let Some(date) = text(&photo.date_note) {
            rows.push(("date", html! { (date) }));
        }
        if let Some(person) = photo.photographer.as_ref().filter(|p| !p.label().is_empty()) {
            let value = match person.slug() {
                Some(slug) => html! { a href=(self.links.detail("photographer", slug)) { (person.label()) } },
                None => html! { (person.label()) },
            };
            rows.push(("photographer", value));
        }
        if let Some(collection) = photo.collection.as_ref() {
            if let Some(slug) = collection.slug() {
                rows.push((
                    "collection",
                    html! { a href=(self.links.detail("collection", slug)) { (collection.label()) } },
                ));
            }
        }
        if let Some(source) = text(&photo.source) {
            rows.push(("source", html! { (source) }));
        }
        if let Some(attribution) = text(&photo.attribution) {
            rows.push(("attribution", html! { (attribution) }));
        }
        if let Some(status) = text(&photo.rights_status) {
            rows.push(("rights", html! { (rights_label(status, self.lang).unwrap_or(status)) }));
        }

        let image = photo.image.as_ref();
        html! {
            (self.back_link(&back.0, back.1))
            h1.pmsb-h1 { (photo.title.as_deref().unwrap_or_default()) }
            @if let Some(src) = image.and_then(ImageField::url) {
                div.pmsb-card style="margin:16px 0" {
                    img.pmsb-img src=(src) alt=(image.map(ImageField::alt).unwrap_or_default());
                }
            }
            @if let Some(caption) = image.and_then(ImageField::caption) {
                p.pmsb-muted { (caption) }
            }
            @if let Some(desc) = text(&photo.public_description) {
                p { (multiline(desc)) }
            }
            (self.pills(&pills))
            hr style="margin:22px 0;border:none;border-top:1px solid #ddd";
            (self.kv_panel(&rows))
        }
    }
}

/// The page container every fragment is wrapped in.
pub fn wrap(content: Markup) -> Markup {
    html! {
        div.pmsb-wrap style=(WRAP_STYLE) {
            (content)
        }
    }
}

/// A full HTML page around a fragment, with the stylesheet and slideshow
/// script embedded.
pub fn document(title: &str, lang: Lang, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang.code()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
                script { (PreEscaped(JS)) }
            }
        }
    }
}

/// Escaped text with line breaks kept as `<br>`.
fn multiline(value: &str) -> Markup {
    html! {
        @for (i, line) in value.split('\n').enumerate() {
            @if i > 0 { br; }
            (line.trim_end_matches('\r'))
        }
    }
}

/// First `max` characters, with an ellipsis when anything was cut.
pub fn excerpt(value: &str, max: usize) -> String {
    let mut chars = value.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{head}…")
    } else {
        head
    }
}
