//! Payload types returned by the query catalog.
//!
//! Every struct mirrors one projection in [`crate::queries`]: field names are
//! the projection's camelCase keys, and localized values arrive already
//! resolved to a single string. The store returns `null` for anything
//! missing, so every field tolerates both absence and an explicit `null`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize `null` as the type's default.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any JSON number (or numeric string) as `f64`. Other values read as absent
/// instead of failing the whole payload.
pub(crate) fn loose_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

/// Like [`loose_number`], truncated toward zero; out of range reads as absent.
pub(crate) fn loose_integer<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    Ok(loose_number(deserializer)?.and_then(|n| T::try_from(n.trunc() as i64).ok()))
}

/// Treat a missing or blank string as absent.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Dimensions {
    #[serde(deserialize_with = "loose_integer")]
    pub width: Option<u32>,
    #[serde(deserialize_with = "loose_integer")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AssetMetadata {
    pub dimensions: Option<Dimensions>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Asset {
    pub url: Option<String>,
    pub metadata: Option<AssetMetadata>,
}

/// An image field with its dereferenced asset (`image{asset->{...}, alt, caption}`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageField {
    pub asset: Option<Asset>,
    pub alt: Option<String>,
    pub caption: Option<String>,
}

impl ImageField {
    pub fn url(&self) -> Option<&str> {
        self.asset.as_ref().and_then(|a| non_blank(&a.url))
    }

    pub fn alt(&self) -> &str {
        non_blank(&self.alt).unwrap_or("")
    }

    pub fn caption(&self) -> Option<&str> {
        non_blank(&self.caption)
    }
}

/// A flattened image (`{"url": asset->url, "alt", "width", "height"}`), used
/// by theme cards.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlatImage {
    pub url: Option<String>,
    pub alt: Option<String>,
    #[serde(deserialize_with = "loose_integer")]
    pub width: Option<u32>,
    #[serde(deserialize_with = "loose_integer")]
    pub height: Option<u32>,
}

impl FlatImage {
    pub fn url(&self) -> Option<&str> {
        non_blank(&self.url)
    }
}

/// A dereferenced link target: id, slug and display label.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Ref {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    #[serde(alias = "name")]
    pub title: Option<String>,
}

impl Ref {
    pub fn slug(&self) -> Option<&str> {
        non_blank(&self.slug)
    }

    pub fn label(&self) -> &str {
        non_blank(&self.title).unwrap_or("")
    }
}

/// One card in a photo grid.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PhotoCard {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub thumb: Option<ImageField>,
    pub date_note: Option<String>,
}

impl PhotoCard {
    pub fn slug(&self) -> Option<&str> {
        non_blank(&self.slug)
    }

    pub fn title(&self) -> &str {
        non_blank(&self.title).unwrap_or("")
    }

    pub fn thumb_url(&self) -> Option<&str> {
        self.thumb.as_ref().and_then(ImageField::url)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeCard {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub has_lang: Option<bool>,
    pub cover_image: Option<FlatImage>,
    #[serde(deserialize_with = "null_default")]
    pub cover_images: Vec<FlatImage>,
}

impl ThemeCard {
    pub fn slug(&self) -> Option<&str> {
        non_blank(&self.slug)
    }

    /// Missing flag means available.
    pub fn is_available(&self) -> bool {
        self.has_lang.unwrap_or(true)
    }

    /// Slideshow images: the cover image first, then the cover photos, skipping
    /// any without a URL.
    pub fn slideshow(&self) -> Vec<&FlatImage> {
        self.cover_image
            .iter()
            .chain(self.cover_images.iter())
            .filter(|img| img.url().is_some())
            .collect()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub parent: Option<Ref>,
    pub has_lang: Option<bool>,
}

impl ThemeDetail {
    pub fn is_available(&self) -> bool {
        self.has_lang.unwrap_or(true)
    }
}

/// A child theme shown as a pill on its parent's page.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeChild {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub has_lang: Option<bool>,
}

impl ThemeChild {
    pub fn is_available(&self) -> bool {
        self.has_lang.unwrap_or(true)
    }
}

/// One row of a theme or collection tree (`theme_tree`, `collection_tree`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TreeNode {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub parent_id: Option<String>,
}

impl TreeNode {
    pub fn label(&self) -> &str {
        non_blank(&self.title).unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PhotographerSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    pub name: Option<String>,
    #[serde(deserialize_with = "loose_integer")]
    pub birth_year: Option<i32>,
    #[serde(deserialize_with = "loose_integer")]
    pub death_year: Option<i32>,
    pub has_lang: Option<bool>,
    #[serde(deserialize_with = "null_default")]
    pub photo_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PhotographerDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub bio: Option<String>,
    #[serde(deserialize_with = "loose_integer")]
    pub birth_year: Option<i32>,
    #[serde(deserialize_with = "loose_integer")]
    pub death_year: Option<i32>,
    pub has_lang: Option<bool>,
}

/// `birth–death`, either side omitted when unknown. `None` when both are.
pub fn life_years(birth: Option<i32>, death: Option<i32>) -> Option<String> {
    let years: Vec<String> = [birth, death]
        .into_iter()
        .flatten()
        .filter(|y| *y != 0)
        .map(|y| y.to_string())
        .collect();
    (!years.is_empty()).then(|| years.join("–"))
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaceSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub photo_count: u32,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaceDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub place_type: Option<String>,
    pub certainty: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub alt_names: Vec<String>,
    pub parent: Option<Ref>,
}

/// Alternative names shown on a place page.
pub const MAX_ALT_NAMES: usize = 20;

impl PlaceDetail {
    pub fn shown_alt_names(&self) -> Vec<&str> {
        self.alt_names
            .iter()
            .map(|n| n.trim())
            .filter(|n| !n.is_empty())
            .take(MAX_ALT_NAMES)
            .collect()
    }
}

/// One option of a search select.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterOption {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub has_lang: Option<bool>,
}

impl FilterOption {
    /// Slug and label, when the option is selectable in this language.
    pub fn choice(&self) -> Option<(&str, &str)> {
        if !self.has_lang.unwrap_or(true) {
            return None;
        }
        Some((non_blank(&self.slug)?, non_blank(&self.title)?))
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionCard {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub collection_type: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub is_original_grouping: bool,
    pub date_range_note: Option<String>,
    pub owner_or_collector: Option<String>,
    #[serde(deserialize_with = "loose_number")]
    pub sort_order: Option<f64>,
    pub cover_image: Option<ImageField>,
    pub has_lang: Option<bool>,
    #[serde(deserialize_with = "null_default")]
    pub child_count: u32,
    #[serde(deserialize_with = "null_default")]
    pub photo_count: u32,
}

impl CollectionCard {
    pub fn is_available(&self) -> bool {
        self.has_lang.unwrap_or(true)
    }

    pub fn has_children(&self) -> bool {
        self.child_count > 0
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub collection_type: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub is_original_grouping: bool,
    pub owner_or_collector: Option<String>,
    pub date_range_note: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<ImageField>,
    pub has_lang: Option<bool>,
    pub curated_by: Option<Ref>,
    pub parent: Option<Ref>,
    #[serde(deserialize_with = "null_default")]
    pub children: Vec<CollectionCard>,
}

impl CollectionDetail {
    pub fn is_available(&self) -> bool {
        self.has_lang.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PhotoDetail {
    #[serde(rename = "_id")]
    pub id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub public_description: Option<String>,
    pub image: Option<ImageField>,
    pub photographer: Option<Ref>,
    #[serde(deserialize_with = "null_default")]
    pub places: Vec<Ref>,
    #[serde(deserialize_with = "null_default")]
    pub themes: Vec<Ref>,
    pub collection: Option<Ref>,
    pub date_note: Option<String>,
    pub rights_status: Option<String>,
    pub attribution: Option<String>,
    pub source: Option<String>,
    pub has_lang: Option<bool>,
}

impl PhotoDetail {
    pub fn is_available(&self) -> bool {
        self.has_lang.unwrap_or(true)
    }
}

/// Read an optional string field, blank as `None`.
pub fn text(value: &Option<String>) -> Option<&str> {
    non_blank(value)
}
