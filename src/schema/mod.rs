//! CMS document model: field rules and list previews.
//!
//! The bridge only reads from the store, but the same documents are edited
//! elsewhere under a fixed set of rules. This module checks exported
//! documents against those rules so bad records surface before they render
//! as half-empty cards.
//!
//! Input is whatever the store's export produces: a single document, a JSON
//! array, or newline-delimited JSON. Documents of types the archive does not
//! define (assets, system records) are skipped.
//!
//! | Type | Required |
//! |------|----------|
//! | `photo` | title, slug, image, date note, rights status |
//! | `theme` | title, slug |
//! | `collection` | title, slug, collection type |
//! | `photographer` | name |
//! | `curator` | name |
//! | `place` | title, slug, place type, certainty |
//! | `tag` | title, slug, scope |

pub mod documents;
pub mod preview;
pub mod rules;

pub use preview::Preview;
pub use rules::{Violation, slugify};

use documents::{CollectionDoc, CuratorDoc, PhotoDoc, PhotographerDoc, PlaceDoc, TagDoc, ThemeDoc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("document has no _type")]
    MissingType,
    #[error("unknown document type: {0}")]
    UnknownType(String),
    #[error("malformed {doc_type} document: {source}")]
    Shape {
        doc_type: DocType,
        source: serde_json::Error,
    },
    #[error("unreadable export (line {line}): {source}")]
    Export {
        line: usize,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocType {
    Photo,
    Theme,
    Collection,
    Photographer,
    Curator,
    Place,
    Tag,
}

impl DocType {
    pub const ALL: [DocType; 7] = [
        DocType::Photo,
        DocType::Theme,
        DocType::Collection,
        DocType::Photographer,
        DocType::Curator,
        DocType::Place,
        DocType::Tag,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocType::Photo => "photo",
            DocType::Theme => "theme",
            DocType::Collection => "collection",
            DocType::Photographer => "photographer",
            DocType::Curator => "curator",
            DocType::Place => "place",
            DocType::Tag => "tag",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document deserialized into its typed form.
#[derive(Debug, Clone)]
pub enum Document {
    Photo(PhotoDoc),
    Theme(ThemeDoc),
    Collection(CollectionDoc),
    Photographer(PhotographerDoc),
    Curator(CuratorDoc),
    Place(PlaceDoc),
    Tag(TagDoc),
}

fn typed<T: DeserializeOwned>(doc_type: DocType, value: &Value) -> Result<T, ValidationError> {
    T::deserialize(value).map_err(|source| ValidationError::Shape { doc_type, source })
}

impl Document {
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or(ValidationError::NotAnObject)?;
        let raw_type = object
            .get("_type")
            .and_then(Value::as_str)
            .ok_or(ValidationError::MissingType)?;
        let doc_type =
            DocType::parse(raw_type).ok_or_else(|| ValidationError::UnknownType(raw_type.to_string()))?;

        Ok(match doc_type {
            DocType::Photo => Document::Photo(typed(doc_type, value)?),
            DocType::Theme => Document::Theme(typed(doc_type, value)?),
            DocType::Collection => Document::Collection(typed(doc_type, value)?),
            DocType::Photographer => Document::Photographer(typed(doc_type, value)?),
            DocType::Curator => Document::Curator(typed(doc_type, value)?),
            DocType::Place => Document::Place(typed(doc_type, value)?),
            DocType::Tag => Document::Tag(typed(doc_type, value)?),
        })
    }

    pub fn doc_type(&self) -> DocType {
        match self {
            Document::Photo(_) => DocType::Photo,
            Document::Theme(_) => DocType::Theme,
            Document::Collection(_) => DocType::Collection,
            Document::Photographer(_) => DocType::Photographer,
            Document::Curator(_) => DocType::Curator,
            Document::Place(_) => DocType::Place,
            Document::Tag(_) => DocType::Tag,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Document::Photo(d) => &d.id,
            Document::Theme(d) => &d.id,
            Document::Collection(d) => &d.id,
            Document::Photographer(d) => &d.id,
            Document::Curator(d) => &d.id,
            Document::Place(d) => &d.id,
            Document::Tag(d) => &d.id,
        }
    }

    pub fn validate(&self) -> Vec<Violation> {
        match self {
            Document::Photo(d) => rules::photo(d),
            Document::Theme(d) => rules::theme(d),
            Document::Collection(d) => rules::collection(d),
            Document::Photographer(d) => rules::photographer(d),
            Document::Curator(d) => rules::curator(d),
            Document::Place(d) => rules::place(d),
            Document::Tag(d) => rules::tag(d),
        }
    }

    pub fn preview(&self) -> Preview {
        match self {
            Document::Photo(d) => preview::photo(d),
            Document::Theme(d) => preview::theme(d),
            Document::Collection(d) => preview::collection(d),
            Document::Photographer(d) => preview::photographer(d),
            Document::Curator(d) => preview::curator(d),
            Document::Place(d) => preview::place(d),
            Document::Tag(d) => preview::tag(d),
        }
    }
}

/// Outcome of checking one document.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    pub id: String,
    pub doc_type: DocType,
    pub preview: Preview,
    pub violations: Vec<Violation>,
}

impl DocumentReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check a single raw document.
pub fn validate_document(value: &Value) -> Result<DocumentReport, ValidationError> {
    let doc = Document::from_value(value)?;
    Ok(DocumentReport {
        id: doc.id().to_string(),
        doc_type: doc.doc_type(),
        preview: doc.preview(),
        violations: doc.validate(),
    })
}

/// Split an export into raw documents.
///
/// Accepts one JSON value (an object or an array of objects) or, failing
/// that, one JSON value per non-blank line.
pub fn parse_export(text: &str) -> Result<Vec<Value>, ValidationError> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Ok(match value {
            Value::Array(items) => items,
            other => vec![other],
        });
    }
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| ValidationError::Export { line: i + 1, source })
        })
        .collect()
}

/// Check every archive document in an export. Unknown types are skipped.
pub fn validate_export(text: &str) -> Result<Vec<DocumentReport>, ValidationError> {
    let mut reports = Vec::new();
    for value in parse_export(text)? {
        match validate_document(&value) {
            Ok(report) => reports.push(report),
            Err(ValidationError::UnknownType(t)) => {
                tracing::debug!(doc_type = %t, "skipping document");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(reports)
}
