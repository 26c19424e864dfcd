//! Query catalog.
//!
//! The fixed set of GROQ queries the bridge issues. Each entry is a
//! [`QueryName`] whose text is constant for the lifetime of the process; all
//! request-specific values (language, slug, ids, window) travel as parameters,
//! so a query text plus its params fully determines a result and can be used
//! as a cache key.
//!
//! Shared rules every entry follows:
//!
//! - drafts are excluded (`!(_id in path("drafts.**"))`);
//! - localized fields are resolved in the store through the per-field
//!   [`Fallback`] chain;
//! - photo listings only contain photos titled in the requested language, and
//!   every aggregate count obeys the same rule;
//! - photo listings are windowed with `[$offset...$offset+$limit]`.

use crate::client::Params;
use crate::lang::{Fallback, Lang, has_lang_projection};
use serde_json::{Value, json};

/// Photos fetched for the home page strip.
pub const RECENT_COUNT: u32 = 12;

/// Cover photos gathered for a theme card, on top of its own cover image.
pub const MAX_COVER_IMAGES: u32 = 5;

/// Options fetched for the theme and photographer search selects.
pub const FILTER_LIMIT: u32 = 200;

/// Options fetched for the place search select.
pub const PLACE_FILTER_LIMIT: u32 = 300;

const NOT_DRAFT: &str = r#"!(_id in path("drafts.**"))"#;

const ASSET: &str = "asset->{url,metadata{dimensions{width,height}}}";

/// Every query the bridge knows how to ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryName {
    RecentPhotos,
    TopThemes,
    ThemeDetail,
    ThemeChildren,
    ThemeTree,
    PhotosByTheme,
    PhotographersIndex,
    PhotographerDetail,
    PhotosByPhotographer,
    PlacesIndex,
    PlaceDetail,
    PhotosByPlace,
    FilterThemes,
    FilterPhotographers,
    FilterPlaces,
    SearchPhotos,
    CollectionsIndex,
    CollectionDetail,
    CollectionTree,
    CollectionPhotos,
    PhotoDetail,
}

impl QueryName {
    pub const ALL: [QueryName; 21] = [
        QueryName::RecentPhotos,
        QueryName::TopThemes,
        QueryName::ThemeDetail,
        QueryName::ThemeChildren,
        QueryName::ThemeTree,
        QueryName::PhotosByTheme,
        QueryName::PhotographersIndex,
        QueryName::PhotographerDetail,
        QueryName::PhotosByPhotographer,
        QueryName::PlacesIndex,
        QueryName::PlaceDetail,
        QueryName::PhotosByPlace,
        QueryName::FilterThemes,
        QueryName::FilterPhotographers,
        QueryName::FilterPlaces,
        QueryName::SearchPhotos,
        QueryName::CollectionsIndex,
        QueryName::CollectionDetail,
        QueryName::CollectionTree,
        QueryName::CollectionPhotos,
        QueryName::PhotoDetail,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QueryName::RecentPhotos => "recent_photos",
            QueryName::TopThemes => "top_themes",
            QueryName::ThemeDetail => "theme_detail",
            QueryName::ThemeChildren => "theme_children",
            QueryName::ThemeTree => "theme_tree",
            QueryName::PhotosByTheme => "photos_by_theme",
            QueryName::PhotographersIndex => "photographers_index",
            QueryName::PhotographerDetail => "photographer_detail",
            QueryName::PhotosByPhotographer => "photos_by_photographer",
            QueryName::PlacesIndex => "places_index",
            QueryName::PlaceDetail => "place_detail",
            QueryName::PhotosByPlace => "photos_by_place",
            QueryName::FilterThemes => "filter_themes",
            QueryName::FilterPhotographers => "filter_photographers",
            QueryName::FilterPlaces => "filter_places",
            QueryName::SearchPhotos => "search_photos",
            QueryName::CollectionsIndex => "collections_index",
            QueryName::CollectionDetail => "collection_detail",
            QueryName::CollectionTree => "collection_tree",
            QueryName::CollectionPhotos => "collection_photos",
            QueryName::PhotoDetail => "photo_detail",
        }
    }

    /// Look a catalog entry up by the text it sends.
    pub fn from_text(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.text() == text)
    }

    /// The GROQ text of this entry.
    pub fn text(self) -> String {
        let theme_label = Fallback::Bilingual.projection("title");
        let person_label = Fallback::Bilingual.projection("name");
        let place_label = Fallback::PlacePrimary.projection("title");
        let strict_title = Fallback::Strict.projection("title");
        let title_has_lang = has_lang_projection("title");
        let name_has_lang = has_lang_projection("name");

        match self {
            QueryName::RecentPhotos => format!(
                "*[{photos}] | order(_createdAt desc) [0...$count] {card}",
                photos = published_photos(),
                card = photo_card(),
            ),
            QueryName::TopThemes => format!(
                r#"*[_type=="theme" && !defined(parent) && {NOT_DRAFT}]
| order({theme_label} asc)
{{
  _id,
  "slug": slug.current,
  "title": {strict_title},
  "description": description[$lang],
  "hasLang": {title_has_lang},
  "coverImage": coverImage{{"url": asset->url, "alt": alt[$lang], "width": asset->metadata.dimensions.width, "height": asset->metadata.dimensions.height}},
  "coverImages": *[{photos} && (^._id in themeRefs[]._ref || ^._id in themeRefs[]->parent._ref)][0...{MAX_COVER_IMAGES}]{{"url": image.asset->url, "alt": image.alt[$lang], "width": image.asset->metadata.dimensions.width, "height": image.asset->metadata.dimensions.height}}
}}"#,
                photos = published_photos(),
            ),
            QueryName::ThemeDetail => format!(
                r#"*[_type=="theme" && slug.current == $slug && {NOT_DRAFT}][0]{{
  _id,
  "slug": slug.current,
  "title": {strict_title},
  "description": description[$lang],
  "parent": parent->{{_id, "slug": slug.current, "title": {strict_title}}},
  "hasLang": {title_has_lang}
}}"#
            ),
            QueryName::ThemeChildren => format!(
                r#"*[_type=="theme" && parent._ref == $themeId && {NOT_DRAFT}]
| order({theme_label} asc)
{{_id, "slug": slug.current, "title": {strict_title}, "hasLang": {title_has_lang}}}"#
            ),
            QueryName::ThemeTree => format!(
                r#"*[_type=="theme" && {NOT_DRAFT}]{{_id, "slug": slug.current, "title": {theme_label}, "parentId": parent._ref}}"#
            ),
            QueryName::PhotosByTheme => photo_page(
                "$themeId in themeRefs[]._ref || $themeId in themeRefs[]->parent._ref",
                "desc",
            ),
            QueryName::PhotographersIndex => format!(
                r#"*[_type=="photographer" && {NOT_DRAFT}]
| order({person_label} asc)
{{
  _id,
  "slug": slug.current,
  "name": {person_label},
  "birthYear": birthYear,
  "deathYear": deathYear,
  "hasLang": {name_has_lang},
  "photoCount": count(*[{photos} && photographerRef._ref == ^._id])
}}"#,
                photos = published_photos(),
            ),
            QueryName::PhotographerDetail => format!(
                r#"*[_type=="photographer" && slug.current == $slug && {NOT_DRAFT}][0]{{
  _id,
  "slug": slug.current,
  "name": {person_label},
  "bio": bio[$lang],
  "birthYear": birthYear,
  "deathYear": deathYear,
  "hasLang": {name_has_lang}
}}"#
            ),
            QueryName::PhotosByPhotographer => {
                photo_page("photographerRef._ref == $photographerId", "desc")
            }
            QueryName::PlacesIndex => format!(
                r#"*[_type=="place" && {NOT_DRAFT}]
| order({place_label} asc)
{{
  _id,
  "slug": slug.current,
  "title": {place_label},
  "subtitle": titleKa,
  "photoCount": count(*[{photos} && ^._id in placeRefs[]._ref])
}}"#,
                photos = published_photos(),
            ),
            QueryName::PlaceDetail => format!(
                r#"*[_type=="place" && slug.current == $slug && {NOT_DRAFT}][0]{{
  _id,
  "slug": slug.current,
  "title": {place_label},
  "subtitle": titleKa,
  "placeType": placeType,
  "certainty": certainty,
  "altNames": altNames,
  "parent": parent->{{_id, "slug": slug.current, "title": {place_label}}}
}}"#
            ),
            QueryName::PhotosByPlace => photo_page("$placeId in placeRefs[]._ref", "desc"),
            QueryName::FilterThemes => format!(
                r#"*[_type=="theme" && {NOT_DRAFT}] | order({theme_label} asc) [0...{FILTER_LIMIT}]
{{_id, "slug": slug.current, "title": {theme_label}, "hasLang": {title_has_lang}}}"#
            ),
            QueryName::FilterPhotographers => format!(
                r#"*[_type=="photographer" && {NOT_DRAFT}] | order({person_label} asc) [0...{FILTER_LIMIT}]
{{_id, "slug": slug.current, "title": {person_label}, "hasLang": {name_has_lang}}}"#
            ),
            QueryName::FilterPlaces => format!(
                r#"*[_type=="place" && {NOT_DRAFT}] | order({place_label} asc) [0...{PLACE_FILTER_LIMIT}]
{{_id, "slug": slug.current, "title": {place_label}}}"#
            ),
            QueryName::SearchPhotos => photo_page(
                r#"($q == "" || title[$lang] match $q + "*" || publicDescription[$lang] match $q + "*")
  && ($themeSlug == "" || references(*[_type=="theme" && slug.current == $themeSlug][0]._id))
  && ($photographerSlug == "" || photographerRef._ref == *[_type=="photographer" && slug.current == $photographerSlug][0]._id)
  && ($placeSlug == "" || *[_type=="place" && slug.current == $placeSlug][0]._id in placeRefs[]._ref)"#,
                "desc",
            ),
            QueryName::CollectionsIndex => format!(
                r#"*[_type=="collection" && !defined(parent) && {NOT_DRAFT}]
| order({theme_label} asc)
{card}"#,
                card = collection_card(),
            ),
            QueryName::CollectionDetail => format!(
                r#"*[_type=="collection" && slug.current == $slug && {NOT_DRAFT}][0]{{
  _id,
  "slug": slug.current,
  "title": {theme_label},
  "collectionType": collectionType,
  "isOriginalGrouping": isOriginalGrouping,
  "ownerOrCollector": ownerOrCollector[$lang],
  "dateRangeNote": dateRangeNote[$lang],
  "description": description[$lang],
  "coverImage": coverImage{{{ASSET}, "alt": alt[$lang]}},
  "hasLang": {title_has_lang},
  "curatedBy": curatedBy->{{_id, "slug": slug.current, "name": {person_label}}},
  "parent": parent->{{_id, "slug": slug.current, "title": {theme_label}}},
  "children": *[_type=="collection" && parent._ref == ^._id && {NOT_DRAFT}]
    | order(sortOrder asc, {theme_label} asc)
    {card}
}}"#,
                card = collection_card(),
            ),
            QueryName::CollectionTree => format!(
                r#"*[_type=="collection" && {NOT_DRAFT}]{{_id, "slug": slug.current, "title": {theme_label}, "parentId": parent._ref}}"#
            ),
            QueryName::CollectionPhotos => photo_page("collectionRef._ref == $collectionId", "asc"),
            QueryName::PhotoDetail => format!(
                r#"*[_type=="photo" && slug.current == $slug && {NOT_DRAFT}][0]{{
  _id,
  "slug": slug.current,
  "title": {strict_title},
  "publicDescription": publicDescription[$lang],
  "image": image{{{ASSET}, "alt": alt[$lang], "caption": caption[$lang]}},
  "photographer": photographerRef->{{_id, "slug": slug.current, "name": {person_label}}},
  "places": placeRefs[]->{{_id, "slug": slug.current, "title": {place_label}}},
  "themes": themeRefs[]->{{_id, "slug": slug.current, "title": {theme_label}}},
  "collection": collectionRef->{{_id, "slug": slug.current, "title": {theme_label}}},
  "dateNote": dateNote[$lang],
  "rightsStatus": rightsStatus,
  "attribution": attribution[$lang],
  "source": source[$lang],
  "hasLang": {title_has_lang}
}}"#
            ),
        }
    }
}

/// Filter for photos that exist in the requested language.
fn published_photos() -> String {
    format!(
        r#"_type=="photo" && {NOT_DRAFT} && {}"#,
        has_lang_projection("title")
    )
}

/// Projection shared by every photo grid.
fn photo_card() -> String {
    format!(
        r#"{{
  _id,
  "slug": slug.current,
  "title": {title},
  "thumb": image{{{ASSET}, "alt": {alt}, "caption": {caption}}},
  "dateNote": {date}
}}"#,
        title = Fallback::Strict.projection("title"),
        alt = Fallback::Strict.projection("alt"),
        caption = Fallback::Strict.projection("caption"),
        date = Fallback::Strict.projection("dateNote"),
    )
}

/// Projection shared by the collections index and a collection's children.
fn collection_card() -> String {
    format!(
        r#"{{
  _id,
  "slug": slug.current,
  "title": {label},
  "collectionType": collectionType,
  "isOriginalGrouping": isOriginalGrouping,
  "dateRangeNote": dateRangeNote[$lang],
  "ownerOrCollector": ownerOrCollector[$lang],
  "sortOrder": sortOrder,
  "coverImage": coverImage{{{ASSET}, "alt": alt[$lang]}},
  "hasLang": {has_lang},
  "childCount": count(*[_type=="collection" && parent._ref == ^._id && {NOT_DRAFT}]),
  "photoCount": count(*[{photos} && collectionRef._ref == ^._id])
}}"#,
        label = Fallback::Bilingual.projection("title"),
        has_lang = has_lang_projection("title"),
        photos = published_photos(),
    )
}

/// One window of a photo listing matching `condition`.
fn photo_page(condition: &str, direction: &str) -> String {
    format!(
        "*[{photos} && ({condition})]\n| order(_createdAt {direction})\n[$offset...$offset+$limit]\n{card}",
        photos = published_photos(),
        card = photo_card(),
    )
}

/// A catalog entry bound to its parameters, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub name: QueryName,
    pub text: String,
    pub params: Params,
}

impl Query {
    fn new(name: QueryName, lang: Lang) -> Self {
        let mut params = Params::new();
        params.insert("lang".into(), json!(lang.code()));
        Self {
            name,
            text: name.text(),
            params,
        }
    }

    fn with(mut self, key: &str, value: Value) -> Self {
        self.params.insert(key.to_string(), value);
        self
    }

    fn window(self, offset: u32, limit: u32) -> Self {
        self.with("offset", json!(offset)).with("limit", json!(limit))
    }
}

/// Optional search constraints. Empty strings mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub q: String,
    pub theme: String,
    pub photographer: String,
    pub place: String,
}

impl SearchFilters {
    /// Trimmed copy of every field.
    pub fn normalized(&self) -> Self {
        Self {
            q: self.q.trim().to_string(),
            theme: self.theme.trim().to_string(),
            photographer: self.photographer.trim().to_string(),
            place: self.place.trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        [&self.q, &self.theme, &self.photographer, &self.place]
            .iter()
            .all(|v| v.trim().is_empty())
    }
}

pub fn recent_photos(lang: Lang, count: u32) -> Query {
    Query::new(QueryName::RecentPhotos, lang).with("count", json!(count))
}

pub fn top_themes(lang: Lang) -> Query {
    Query::new(QueryName::TopThemes, lang)
}

pub fn theme_detail(lang: Lang, slug: &str) -> Query {
    Query::new(QueryName::ThemeDetail, lang).with("slug", json!(slug))
}

pub fn theme_children(lang: Lang, theme_id: &str) -> Query {
    Query::new(QueryName::ThemeChildren, lang).with("themeId", json!(theme_id))
}

pub fn theme_tree(lang: Lang) -> Query {
    Query::new(QueryName::ThemeTree, lang)
}

pub fn photos_by_theme(lang: Lang, theme_id: &str, offset: u32, limit: u32) -> Query {
    Query::new(QueryName::PhotosByTheme, lang)
        .with("themeId", json!(theme_id))
        .window(offset, limit)
}

pub fn photographers_index(lang: Lang) -> Query {
    Query::new(QueryName::PhotographersIndex, lang)
}

pub fn photographer_detail(lang: Lang, slug: &str) -> Query {
    Query::new(QueryName::PhotographerDetail, lang).with("slug", json!(slug))
}

pub fn photos_by_photographer(lang: Lang, photographer_id: &str, offset: u32, limit: u32) -> Query {
    Query::new(QueryName::PhotosByPhotographer, lang)
        .with("photographerId", json!(photographer_id))
        .window(offset, limit)
}

pub fn places_index(lang: Lang) -> Query {
    Query::new(QueryName::PlacesIndex, lang)
}

pub fn place_detail(lang: Lang, slug: &str) -> Query {
    Query::new(QueryName::PlaceDetail, lang).with("slug", json!(slug))
}

pub fn photos_by_place(lang: Lang, place_id: &str, offset: u32, limit: u32) -> Query {
    Query::new(QueryName::PhotosByPlace, lang)
        .with("placeId", json!(place_id))
        .window(offset, limit)
}

pub fn filter_themes(lang: Lang) -> Query {
    Query::new(QueryName::FilterThemes, lang)
}

pub fn filter_photographers(lang: Lang) -> Query {
    Query::new(QueryName::FilterPhotographers, lang)
}

pub fn filter_places(lang: Lang) -> Query {
    Query::new(QueryName::FilterPlaces, lang)
}

pub fn search_photos(lang: Lang, filters: &SearchFilters, offset: u32, limit: u32) -> Query {
    let f = filters.normalized();
    Query::new(QueryName::SearchPhotos, lang)
        .with("q", json!(f.q))
        .with("themeSlug", json!(f.theme))
        .with("photographerSlug", json!(f.photographer))
        .with("placeSlug", json!(f.place))
        .window(offset, limit)
}

pub fn collections_index(lang: Lang) -> Query {
    Query::new(QueryName::CollectionsIndex, lang)
}

pub fn collection_detail(lang: Lang, slug: &str) -> Query {
    Query::new(QueryName::CollectionDetail, lang).with("slug", json!(slug))
}

pub fn collection_tree(lang: Lang) -> Query {
    Query::new(QueryName::CollectionTree, lang)
}

pub fn collection_photos(lang: Lang, collection_id: &str, offset: u32, limit: u32) -> Query {
    Query::new(QueryName::CollectionPhotos, lang)
        .with("collectionId", json!(collection_id))
        .window(offset, limit)
}

pub fn photo_detail(lang: Lang, slug: &str) -> Query {
    Query::new(QueryName::PhotoDetail, lang).with("slug", json!(slug))
}
