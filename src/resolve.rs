//! View resolution.
//!
//! Turns a navigational [`Request`] into a render-ready [`View`] by running the
//! catalog queries for that page, strictly one after another, against any
//! [`ContentStore`].
//!
//! ## Steps
//!
//! 1. Normalize the language.
//! 2. Fetch the primary entity by slug. Missing → [`ViewError::NotFound`].
//! 3. Themes, collections and photos that have no title in the requested
//!    language → [`ViewError::LanguageUnavailable`].
//! 4. Fetch secondary data: children, the breadcrumb trail, one window of
//!    photos, search options.
//! 5. Assemble the view with its [`PageState`].
//!
//! A failure fetching the primary entity (or an index page's only list) fails
//! the whole view. A failure in a secondary listing is kept inside the view as
//! a [`Listing`] error so the rest of the page still renders.
//!
//! ## Collections
//!
//! A collection with at least one child shows its children and never issues
//! the photo query.

use crate::client::{ContentStore, QueryError};
use crate::hierarchy::{Hierarchy, display_order};
use crate::lang::Lang;
use crate::model::{
    CollectionCard, CollectionDetail, FilterOption, PhotoCard, PhotoDetail, PhotographerDetail,
    PhotographerSummary, PlaceDetail, PlaceSummary, Ref, ThemeCard, ThemeChild, ThemeDetail,
    TreeNode,
};
use crate::queries::{self, Query, RECENT_COUNT, SearchFilters};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Smallest page size a request may ask for.
pub const MIN_LIMIT: u32 = 1;
/// Largest page size a request may ask for.
pub const MAX_LIMIT: u32 = 60;
/// Page size used when a request gives none.
pub const DEFAULT_LIMIT: u32 = 24;

#[derive(Error, Debug)]
pub enum ViewError {
    #[error("content store not configured: {0}")]
    Config(String),
    #[error("content store unavailable: {0}")]
    Transport(String),
    #[error("content store HTTP {code}")]
    Http { code: u16, detail: Value },
    #[error("{page} not found: {slug:?}")]
    NotFound { page: PageKind, slug: String },
    #[error("content not available in {lang}")]
    LanguageUnavailable { lang: Lang },
    #[error("unexpected {query} payload: {source}")]
    Payload {
        query: &'static str,
        source: serde_json::Error,
    },
}

impl From<QueryError> for ViewError {
    fn from(e: QueryError) -> Self {
        match e {
            QueryError::Config(message) => ViewError::Config(message),
            QueryError::Transport { message } => ViewError::Transport(message),
            QueryError::Http { code, detail } => ViewError::Http { code, detail },
        }
    }
}

/// A secondary list: its items, or why they could not be fetched.
pub type Listing<T> = Result<Vec<T>, ViewError>;

/// The content views a request can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageKind {
    #[default]
    Home,
    Themes,
    Theme,
    Photographers,
    Photographer,
    Places,
    Place,
    Search,
    Collections,
    Collection,
    Photo,
}

impl PageKind {
    pub const ALL: [PageKind; 11] = [
        PageKind::Home,
        PageKind::Themes,
        PageKind::Theme,
        PageKind::Photographers,
        PageKind::Photographer,
        PageKind::Places,
        PageKind::Place,
        PageKind::Search,
        PageKind::Collections,
        PageKind::Collection,
        PageKind::Photo,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == raw)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PageKind::Home => "home",
            PageKind::Themes => "themes",
            PageKind::Theme => "theme",
            PageKind::Photographers => "photographers",
            PageKind::Photographer => "photographer",
            PageKind::Places => "places",
            PageKind::Place => "place",
            PageKind::Search => "search",
            PageKind::Collections => "collections",
            PageKind::Collection => "collection",
            PageKind::Photo => "photo",
        }
    }

    /// Detail pages are addressed by slug.
    pub fn needs_slug(self) -> bool {
        matches!(
            self,
            PageKind::Theme
                | PageKind::Photographer
                | PageKind::Place
                | PageKind::Collection
                | PageKind::Photo
        )
    }

    /// Pages that show a windowed photo listing.
    pub fn is_paginated(self) -> bool {
        matches!(
            self,
            PageKind::Theme
                | PageKind::Photographer
                | PageKind::Place
                | PageKind::Collection
                | PageKind::Search
        )
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A navigational request, as received from the router or the CLI.
///
/// `lang`, `offset` and `limit` are taken as given and normalized during
/// resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    pub lang: String,
    pub page: PageKind,
    pub slug: String,
    pub offset: i64,
    pub limit: Option<i64>,
    pub search: SearchFilters,
}

impl Request {
    pub fn new(lang: &str, page: PageKind) -> Self {
        Self {
            lang: lang.to_string(),
            page,
            ..Self::default()
        }
    }

    pub fn with_slug(mut self, slug: &str) -> Self {
        self.slug = slug.to_string();
        self
    }

    pub fn with_window(mut self, offset: i64, limit: Option<i64>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }

    pub fn with_search(mut self, search: SearchFilters) -> Self {
        self.search = search;
        self
    }

    /// The normalized language.
    pub fn language(&self) -> Lang {
        Lang::normalize(&self.lang)
    }
}

/// A half-open `[offset, offset + limit)` slice of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u32,
    pub limit: u32,
}

impl Window {
    /// Clamp raw values: offset to ≥ 0, limit to [`MIN_LIMIT`]..=[`MAX_LIMIT`],
    /// `default_limit` when none is given.
    pub fn clamp(offset: i64, limit: Option<i64>, default_limit: u32) -> Self {
        let offset = offset.clamp(0, i64::from(u32::MAX)) as u32;
        let limit = limit
            .unwrap_or(i64::from(default_limit))
            .clamp(i64::from(MIN_LIMIT), i64::from(MAX_LIMIT)) as u32;
        Self { offset, limit }
    }
}

/// Pagination state of one rendered window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub offset: u32,
    pub limit: u32,
    /// A full window came back, so another one may follow.
    pub has_more: bool,
}

impl PageState {
    pub fn new(window: Window, returned: usize) -> Self {
        Self {
            offset: window.offset,
            limit: window.limit,
            has_more: returned == window.limit as usize,
        }
    }

    /// Offset of the previous window, when `offset - limit` is not negative.
    pub fn prev_offset(&self) -> Option<u32> {
        self.offset.checked_sub(self.limit)
    }

    pub fn next_offset(&self) -> Option<u32> {
        self.has_more.then(|| self.offset.saturating_add(self.limit))
    }
}

/// One step of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub slug: String,
    pub label: String,
}

/// One option of a search select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

#[derive(Debug)]
pub struct HomeView {
    pub themes: Listing<ThemeCard>,
    pub recent: Listing<PhotoCard>,
}

#[derive(Debug)]
pub struct ThemeView {
    pub theme: ThemeDetail,
    pub trail: Vec<Crumb>,
    pub children: Listing<ThemeChild>,
    pub photos: Listing<PhotoCard>,
    pub page: PageState,
}

#[derive(Debug)]
pub struct PhotographerView {
    pub photographer: PhotographerDetail,
    pub photos: Listing<PhotoCard>,
    pub page: PageState,
}

#[derive(Debug)]
pub struct PlaceView {
    pub place: PlaceDetail,
    pub photos: Listing<PhotoCard>,
    pub page: PageState,
}

#[derive(Debug)]
pub struct SearchView {
    pub filters: SearchFilters,
    pub photos: Listing<PhotoCard>,
    pub page: PageState,
    pub themes: Listing<Choice>,
    pub photographers: Listing<Choice>,
    pub places: Listing<Choice>,
}

#[derive(Debug)]
pub enum CollectionContent {
    /// Sub-collections shown instead of photos.
    Children(Vec<CollectionCard>),
    Photos {
        photos: Listing<PhotoCard>,
        page: PageState,
    },
}

#[derive(Debug)]
pub struct CollectionView {
    pub collection: CollectionDetail,
    pub trail: Vec<Crumb>,
    pub content: CollectionContent,
}

#[derive(Debug)]
pub struct PhotoView {
    pub photo: PhotoDetail,
}

/// A resolved page, ready for [`crate::render`].
#[derive(Debug)]
pub enum View {
    Home(HomeView),
    Themes(Vec<ThemeCard>),
    Theme(ThemeView),
    Photographers(Vec<PhotographerSummary>),
    Photographer(PhotographerView),
    Places(Vec<PlaceSummary>),
    Place(PlaceView),
    Search(SearchView),
    Collections(Vec<CollectionCard>),
    Collection(CollectionView),
    Photo(PhotoView),
}

impl View {
    pub fn page(&self) -> PageKind {
        match self {
            View::Home(_) => PageKind::Home,
            View::Themes(_) => PageKind::Themes,
            View::Theme(_) => PageKind::Theme,
            View::Photographers(_) => PageKind::Photographers,
            View::Photographer(_) => PageKind::Photographer,
            View::Places(_) => PageKind::Places,
            View::Place(_) => PageKind::Place,
            View::Search(_) => PageKind::Search,
            View::Collections(_) => PageKind::Collections,
            View::Collection(_) => PageKind::Collection,
            View::Photo(_) => PageKind::Photo,
        }
    }
}

/// Resolves requests against a content store.
pub struct Resolver<S> {
    store: S,
    default_limit: u32,
}

impl<S: ContentStore> Resolver<S> {
    pub fn new(store: S, default_limit: u32) -> Self {
        Self {
            store,
            default_limit: default_limit.clamp(MIN_LIMIT, MAX_LIMIT),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn resolve(&self, request: &Request) -> Result<View, ViewError> {
        let lang = request.language();
        let slug = request.slug.trim();
        let window = Window::clamp(request.offset, request.limit, self.default_limit);
        tracing::debug!(
            page = %request.page,
            %lang,
            slug,
            offset = window.offset,
            limit = window.limit,
            "resolving view"
        );

        if request.page.needs_slug() && slug.is_empty() {
            return Err(ViewError::NotFound {
                page: request.page,
                slug: String::new(),
            });
        }

        match request.page {
            PageKind::Home => Ok(self.home(lang)),
            PageKind::Themes => self.themes(lang),
            PageKind::Theme => self.theme(lang, slug, window),
            PageKind::Photographers => self.photographers(lang),
            PageKind::Photographer => self.photographer(lang, slug, window),
            PageKind::Places => self.places(lang),
            PageKind::Place => self.place(lang, slug, window),
            PageKind::Search => Ok(self.search(lang, &request.search, window)),
            PageKind::Collections => self.collections(lang),
            PageKind::Collection => self.collection(lang, slug, window),
            PageKind::Photo => self.photo(lang, slug),
        }
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    fn run(&self, query: &Query) -> Result<Value, ViewError> {
        self.store
            .query(&query.text, &query.params)
            .map_err(|e| {
                tracing::warn!(query = query.name.as_str(), error = %e, "query failed");
                ViewError::from(e)
            })
    }

    /// A `[0]` lookup: `null` means no match.
    fn fetch_one<T: DeserializeOwned>(&self, query: &Query) -> Result<Option<T>, ViewError> {
        match self.run(query)? {
            Value::Null => Ok(None),
            value => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| ViewError::Payload {
                    query: query.name.as_str(),
                    source,
                }),
        }
    }

    /// A listing: `null` means empty.
    fn fetch_list<T: DeserializeOwned>(&self, query: &Query) -> Listing<T> {
        match self.run(query)? {
            Value::Null => Ok(Vec::new()),
            value => serde_json::from_value(value).map_err(|source| ViewError::Payload {
                query: query.name.as_str(),
                source,
            }),
        }
    }

    fn photo_window(&self, query: &Query, window: Window) -> (Listing<PhotoCard>, PageState) {
        let photos = self.fetch_list::<PhotoCard>(query);
        let returned = photos.as_ref().map_or(0, Vec::len);
        let page = PageState::new(window, returned);
        let photos = photos.map(|items| items.into_iter().filter(|p| p.slug().is_some()).collect());
        (photos, page)
    }

    /// Breadcrumb trail from a tree query, falling back to the direct parent
    /// when the tree cannot be fetched.
    fn trail(&self, tree: &Query, id: &str, parent: Option<&Ref>) -> Vec<Crumb> {
        let Some(parent) = parent else {
            return Vec::new();
        };
        match self.fetch_list::<TreeNode>(tree) {
            Ok(nodes) => {
                let table = Hierarchy::from_nodes(nodes);
                table
                    .ancestors(id)
                    .into_iter()
                    .filter_map(|node| {
                        Some(Crumb {
                            slug: node.slug.clone().filter(|s| !s.trim().is_empty())?,
                            label: node.label().to_string(),
                        })
                    })
                    .collect()
            }
            Err(_) => parent
                .slug()
                .filter(|_| !parent.label().is_empty())
                .map(|slug| Crumb {
                    slug: slug.to_string(),
                    label: parent.label().to_string(),
                })
                .into_iter()
                .collect(),
        }
    }

    fn choices(&self, query: &Query) -> Listing<Choice> {
        self.fetch_list::<FilterOption>(query).map(|options| {
            options
                .iter()
                .filter_map(FilterOption::choice)
                .map(|(value, label)| Choice {
                    value: value.to_string(),
                    label: label.to_string(),
                })
                .collect()
        })
    }

    // =========================================================================
    // Views
    // =========================================================================

    fn home(&self, lang: Lang) -> View {
        let themes = self
            .fetch_list::<ThemeCard>(&queries::top_themes(lang))
            .map(listed_themes);
        let recent = self
            .fetch_list::<PhotoCard>(&queries::recent_photos(lang, RECENT_COUNT))
            .map(|items| items.into_iter().filter(|p| p.slug().is_some()).collect());
        View::Home(HomeView { themes, recent })
    }

    fn themes(&self, lang: Lang) -> Result<View, ViewError> {
        let themes = self.fetch_list::<ThemeCard>(&queries::top_themes(lang))?;
        Ok(View::Themes(listed_themes(themes)))
    }

    fn theme(&self, lang: Lang, slug: &str, window: Window) -> Result<View, ViewError> {
        let theme: ThemeDetail = self
            .fetch_one(&queries::theme_detail(lang, slug))?
            .ok_or_else(|| not_found(PageKind::Theme, slug))?;
        if !theme.is_available() {
            return Err(ViewError::LanguageUnavailable { lang });
        }

        let trail = self.trail(&queries::theme_tree(lang), &theme.id, theme.parent.as_ref());
        let children = self
            .fetch_list::<ThemeChild>(&queries::theme_children(lang, &theme.id))
            .map(|items| {
                items
                    .into_iter()
                    .filter(|c| c.is_available() && has_text(&c.slug))
                    .collect()
            });
        let (photos, page) = self.photo_window(
            &queries::photos_by_theme(lang, &theme.id, window.offset, window.limit),
            window,
        );

        Ok(View::Theme(ThemeView {
            theme,
            trail,
            children,
            photos,
            page,
        }))
    }

    fn photographers(&self, lang: Lang) -> Result<View, ViewError> {
        let items = self.fetch_list::<PhotographerSummary>(&queries::photographers_index(lang))?;
        Ok(View::Photographers(
            items.into_iter().filter(|p| has_text(&p.slug)).collect(),
        ))
    }

    fn photographer(&self, lang: Lang, slug: &str, window: Window) -> Result<View, ViewError> {
        let photographer: PhotographerDetail = self
            .fetch_one(&queries::photographer_detail(lang, slug))?
            .ok_or_else(|| not_found(PageKind::Photographer, slug))?;
        let (photos, page) = self.photo_window(
            &queries::photos_by_photographer(lang, &photographer.id, window.offset, window.limit),
            window,
        );
        Ok(View::Photographer(PhotographerView {
            photographer,
            photos,
            page,
        }))
    }

    fn places(&self, lang: Lang) -> Result<View, ViewError> {
        let items = self.fetch_list::<PlaceSummary>(&queries::places_index(lang))?;
        Ok(View::Places(
            items.into_iter().filter(|p| has_text(&p.slug)).collect(),
        ))
    }

    fn place(&self, lang: Lang, slug: &str, window: Window) -> Result<View, ViewError> {
        let place: PlaceDetail = self
            .fetch_one(&queries::place_detail(lang, slug))?
            .ok_or_else(|| not_found(PageKind::Place, slug))?;
        let (photos, page) = self.photo_window(
            &queries::photos_by_place(lang, &place.id, window.offset, window.limit),
            window,
        );
        Ok(View::Place(PlaceView {
            place,
            photos,
            page,
        }))
    }

    fn search(&self, lang: Lang, filters: &SearchFilters, window: Window) -> View {
        let filters = filters.normalized();
        let (photos, page) = self.photo_window(
            &queries::search_photos(lang, &filters, window.offset, window.limit),
            window,
        );
        let themes = self.choices(&queries::filter_themes(lang));
        let photographers = self.choices(&queries::filter_photographers(lang));
        let places = self.choices(&queries::filter_places(lang));
        View::Search(SearchView {
            filters,
            photos,
            page,
            themes,
            photographers,
            places,
        })
    }

    fn collections(&self, lang: Lang) -> Result<View, ViewError> {
        let items = self.fetch_list::<CollectionCard>(&queries::collections_index(lang))?;
        Ok(View::Collections(
            items
                .into_iter()
                .filter(|c| c.is_available() && has_text(&c.slug))
                .collect(),
        ))
    }

    fn collection(&self, lang: Lang, slug: &str, window: Window) -> Result<View, ViewError> {
        let mut collection: CollectionDetail = self
            .fetch_one(&queries::collection_detail(lang, slug))?
            .ok_or_else(|| not_found(PageKind::Collection, slug))?;
        if !collection.is_available() {
            return Err(ViewError::LanguageUnavailable { lang });
        }

        let trail = self.trail(
            &queries::collection_tree(lang),
            &collection.id,
            collection.parent.as_ref(),
        );

        let content = if collection.children.is_empty() {
            let (photos, page) = self.photo_window(
                &queries::collection_photos(lang, &collection.id, window.offset, window.limit),
                window,
            );
            CollectionContent::Photos { photos, page }
        } else {
            let mut children: Vec<CollectionCard> = std::mem::take(&mut collection.children)
                .into_iter()
                .filter(|c| c.is_available() && has_text(&c.slug))
                .collect();
            children.sort_by(|a, b| {
                display_order(
                    a.sort_order,
                    a.title.as_deref().unwrap_or(""),
                    b.sort_order,
                    b.title.as_deref().unwrap_or(""),
                )
            });
            CollectionContent::Children(children)
        };

        Ok(View::Collection(CollectionView {
            collection,
            trail,
            content,
        }))
    }

    fn photo(&self, lang: Lang, slug: &str) -> Result<View, ViewError> {
        let photo: PhotoDetail = self
            .fetch_one(&queries::photo_detail(lang, slug))?
            .ok_or_else(|| not_found(PageKind::Photo, slug))?;
        if !photo.is_available() {
            return Err(ViewError::LanguageUnavailable { lang });
        }
        Ok(View::Photo(PhotoView { photo }))
    }
}

fn not_found(page: PageKind, slug: &str) -> ViewError {
    ViewError::NotFound {
        page,
        slug: slug.to_string(),
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Theme cards shown in grids: available in the language and linkable.
fn listed_themes(themes: Vec<ThemeCard>) -> Vec<ThemeCard> {
    themes
        .into_iter()
        .filter(|t| t.is_available() && t.slug().is_some())
        .collect()
}
