//! Typed views of raw CMS documents, as exported from the store.
//!
//! Field names follow the stored camelCase keys. Everything is optional so a
//! half-filled draft still deserializes and can be checked field by field.
//! References may arrive bare (`{"_ref": ...}`) or dereferenced with the
//! fields a preview needs.

use crate::lang::LocalizedText;
use crate::model::null_default;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Slug {
    pub current: Option<String>,
}

impl Slug {
    pub fn is_set(&self) -> bool {
        self.current.as_deref().is_some_and(|s| !s.trim().is_empty())
    }
}

/// A reference, bare or dereferenced.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Linked {
    #[serde(rename = "_ref")]
    pub reference: Option<String>,
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub title: Option<LocalizedText>,
    pub name: Option<LocalizedText>,
}

impl Linked {
    /// Target id, whether bare (`_ref`) or dereferenced (`_id`).
    pub fn target(&self) -> Option<&str> {
        self.reference.as_deref().or(self.id.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImageDoc {
    pub asset: Option<Linked>,
    pub alt: Option<LocalizedText>,
    pub caption: Option<LocalizedText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: Option<LocalizedText>,
    pub slug: Option<Slug>,
    pub description: Option<LocalizedText>,
    pub notes: Option<String>,
    pub parent: Option<Linked>,
    #[serde(deserialize_with = "null_default")]
    pub synonyms: Vec<String>,
    pub cover_image: Option<ImageDoc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhotographerDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<LocalizedText>,
    #[serde(deserialize_with = "null_default")]
    pub is_unknown: bool,
    pub birth_year: Option<f64>,
    pub death_year: Option<f64>,
    pub bio: Option<LocalizedText>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CuratorDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<LocalizedText>,
    pub role: Option<LocalizedText>,
    pub bio: Option<LocalizedText>,
    pub years_active: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub is_founder: bool,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectionDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: Option<LocalizedText>,
    pub slug: Option<Slug>,
    pub parent: Option<Linked>,
    pub sort_order: Option<f64>,
    pub collection_type: Option<String>,
    pub is_original_grouping: Option<bool>,
    pub curated_by: Option<Linked>,
    #[serde(deserialize_with = "null_default")]
    pub sources: Vec<String>,
    pub acquisition_year: Option<f64>,
    pub acquisition_note: Option<LocalizedText>,
    pub owner_or_collector: Option<LocalizedText>,
    pub date_range_note: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub curatorial_notes: Option<String>,
    pub cover_image: Option<ImageDoc>,
}

impl CollectionDoc {
    /// Unset means original grouping, as new documents start out.
    pub fn original_grouping(&self) -> bool {
        self.is_original_grouping.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhotoDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: Option<LocalizedText>,
    pub slug: Option<Slug>,
    pub image: Option<ImageDoc>,
    pub public_description: Option<LocalizedText>,
    pub photographer_ref: Option<Linked>,
    pub collection_ref: Option<Linked>,
    pub date_note: Option<LocalizedText>,
    #[serde(deserialize_with = "null_default")]
    pub place_refs: Vec<Linked>,
    #[serde(deserialize_with = "null_default")]
    pub tag_refs: Vec<Linked>,
    #[serde(deserialize_with = "null_default")]
    pub theme_refs: Vec<Linked>,
    pub archival_description: Option<String>,
    pub curatorial_notes: Option<String>,
    pub rights_status: Option<String>,
    pub attribution: Option<LocalizedText>,
    pub source: Option<LocalizedText>,
    pub internal_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlaceDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: Option<String>,
    pub title_ka: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub alt_names: Vec<String>,
    pub place_type: Option<String>,
    pub parent: Option<Linked>,
    pub certainty: Option<String>,
    pub notes: Option<String>,
    pub slug: Option<Slug>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TagDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: Option<String>,
    pub title_ka: Option<String>,
    pub scope: Option<String>,
    #[serde(deserialize_with = "null_default")]
    pub alt_labels: Vec<String>,
    pub slug: Option<Slug>,
}
