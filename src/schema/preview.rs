//! One-line list labels for documents, as an editor sees them.

use super::documents::{
    CollectionDoc, CuratorDoc, Linked, PhotoDoc, PhotographerDoc, PlaceDoc, TagDoc, ThemeDoc,
};
use crate::lang::{Fallback, Lang, LocalizedText};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl Preview {
    fn new(title: impl Into<String>, subtitle: Option<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.filter(|s| !s.is_empty()),
        }
    }
}

/// English first, then Georgian.
fn either(text: Option<&LocalizedText>) -> Option<&str> {
    text?.resolve(Lang::En, Fallback::Bilingual, None)
}

fn linked_title(link: Option<&Linked>) -> Option<&str> {
    let link = link?;
    either(link.title.as_ref()).or_else(|| either(link.name.as_ref()))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub fn collection_type_label(value: Option<&str>) -> &'static str {
    match value {
        Some("family_donation") => "Family Donation",
        Some("institutional_acquisition") => "Institutional",
        Some("photographer_estate") => "Photographer Estate",
        Some("organizational_archive") => "Organizational Archive",
        Some("curatorial_project") => "Curatorial Project",
        Some("technical_grouping") => "Technical Grouping",
        Some("parent_container") => "Parent Container",
        _ => "Other",
    }
}

pub fn theme(doc: &ThemeDoc) -> Preview {
    let title = either(doc.title.as_ref()).unwrap_or("Untitled theme");
    let parent = linked_title(doc.parent.as_ref()).map(|p| format!("Parent: {p}"));
    Preview::new(title, parent)
}

pub fn collection(doc: &CollectionDoc) -> Preview {
    let title = either(doc.title.as_ref()).unwrap_or("Untitled collection");
    let kind = doc.collection_type.as_deref();
    let folder = if kind == Some("parent_container") { "📁 " } else { "" };
    let (icon, provenance) = if doc.original_grouping() {
        ("📦", "Provenance")
    } else {
        ("🎨", "Curatorial")
    };

    let mut subtitle = format!("{provenance} • {}", collection_type_label(kind));
    if let Some(parent) = linked_title(doc.parent.as_ref()) {
        subtitle.push_str(&format!(" • Parent: {parent}"));
    }
    Preview::new(format!("{folder}{icon} {title}"), Some(subtitle))
}

pub fn photo(doc: &PhotoDoc) -> Preview {
    let title = either(doc.title.as_ref()).unwrap_or("Untitled photograph");
    let byline = linked_title(doc.photographer_ref.as_ref()).map(|name| format!("by {name}"));
    let date = doc
        .date_note
        .as_ref()
        .and_then(|d| d.get(Lang::En))
        .map(str::to_string);
    let parts: Vec<String> = byline.into_iter().chain(date).collect();
    Preview::new(title, Some(parts.join(" • ")))
}

pub fn photographer(doc: &PhotographerDoc) -> Preview {
    let title = either(doc.name.as_ref()).unwrap_or("Unnamed photographer");
    let subtitle = doc
        .is_unknown
        .then(|| "Unknown Photographer (system record)".to_string());
    Preview::new(title, subtitle)
}

pub fn curator(doc: &CuratorDoc) -> Preview {
    let name = either(doc.name.as_ref()).unwrap_or("Unnamed curator");
    let badge = if doc.is_founder { "⭐ " } else { "" };
    let role = either(doc.role.as_ref()).map(str::to_string);
    Preview::new(format!("{badge}{name}"), role)
}

pub fn place(doc: &PlaceDoc) -> Preview {
    labelled(doc.title.as_deref(), doc.place_type.as_deref(), doc.title_ka.as_deref())
}

pub fn tag(doc: &TagDoc) -> Preview {
    labelled(doc.title.as_deref(), doc.scope.as_deref(), doc.title_ka.as_deref())
}

/// `title (kind)` with the Georgian title underneath.
fn labelled(title: Option<&str>, kind: Option<&str>, ka: Option<&str>) -> Preview {
    let title = non_blank(title).unwrap_or("");
    let title = match non_blank(kind) {
        Some(kind) => format!("{title} ({kind})"),
        None => title.to_string(),
    };
    Preview::new(title.trim(), non_blank(ka).map(str::to_string))
}
