//! Field rules per document type.
//!
//! Localized fields are checked per language on trimmed text: a required
//! field needs a value in at least one language, and each language that has
//! one must fit the bounds on its own.

use super::documents::{
    CollectionDoc, CuratorDoc, ImageDoc, Linked, PhotoDoc, PhotographerDoc, PlaceDoc, Slug, TagDoc,
    ThemeDoc,
};
use crate::lang::{Lang, LocalizedText};
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

/// Longest generated slug.
pub const SLUG_MAX: usize = 96;

pub const COLLECTION_TYPES: &[&str] = &[
    "family_donation",
    "institutional_acquisition",
    "photographer_estate",
    "organizational_archive",
    "curatorial_project",
    "technical_grouping",
    "parent_container",
];

pub const RIGHTS_STATUSES: &[&str] = &[
    "public_domain",
    "museum_collection",
    "archive_holding",
    "restricted",
    "unknown",
];

pub const PLACE_TYPES: &[&str] = &[
    "country", "region", "city", "village", "district", "street", "building", "site", "landscape",
    "other",
];

pub const CERTAINTIES: &[&str] = &["exact", "approximate", "disputed", "unknown"];

pub const TAG_SCOPES: &[&str] = &[
    "subject",
    "technique",
    "format",
    "uniform",
    "architecture",
    "event",
    "other",
];

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Lowercase, trim, collapse every run of non letter/number characters to a
/// single `-`, strip leading and trailing dashes, cap at [`SLUG_MAX`].
pub fn slugify(input: &str) -> String {
    let lower = input.to_lowercase();
    let mut slug = String::new();
    let mut gap = false;
    for c in lower.trim().chars() {
        if c.is_alphanumeric() {
            if gap && !slug.is_empty() {
                slug.push('-');
            }
            gap = false;
            slug.push(c);
        } else {
            gap = true;
        }
    }
    slug.chars().take(SLUG_MAX).collect()
}

fn language_name(lang: Lang) -> &'static str {
    match lang {
        Lang::En => "English",
        Lang::Ka => "Georgian",
    }
}

fn capitalized(noun: &str) -> String {
    let mut chars = noun.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn len(value: &str) -> usize {
    value.chars().count()
}

#[derive(Debug, Default)]
struct Checker {
    violations: Vec<Violation>,
}

impl Checker {
    fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.violations.push(Violation {
            field: field.to_string(),
            message: message.into(),
        });
    }

    fn localized_required(&mut self, field: &str, value: Option<&LocalizedText>, noun: &str, min: usize, max: usize) {
        let value = value.cloned().unwrap_or_default();
        if value.is_blank() {
            self.fail(
                field,
                format!("{} is required in at least one language (EN or KA).", capitalized(noun)),
            );
            return;
        }
        for lang in Lang::ALL {
            let n = len(value.trimmed(lang));
            if n > 0 && (n < min || n > max) {
                self.fail(
                    field,
                    format!("{} {noun} must be {min}–{max} characters.", language_name(lang)),
                );
            }
        }
    }

    /// Required in one language, upper bound only.
    fn localized_required_max(&mut self, field: &str, value: Option<&LocalizedText>, noun: &str, max: usize) {
        if value.is_none_or(LocalizedText::is_blank) {
            self.fail(
                field,
                format!("{} is required in at least one language (EN or KA).", capitalized(noun)),
            );
            return;
        }
        self.localized_max(field, value, noun, max);
    }

    fn localized_max(&mut self, field: &str, value: Option<&LocalizedText>, noun: &str, max: usize) {
        let Some(value) = value else {
            return;
        };
        for lang in Lang::ALL {
            if len(value.trimmed(lang)) > max {
                self.fail(
                    field,
                    format!("{} {noun} must be {max} characters or fewer.", language_name(lang)),
                );
            }
        }
    }

    fn text_max(&mut self, field: &str, value: Option<&str>, max: usize) {
        if value.is_some_and(|v| len(v) > max) {
            self.fail(field, format!("Must be {max} characters or fewer."));
        }
    }

    fn string_bounds(&mut self, field: &str, value: Option<&str>, min: usize, max: usize) {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => self.fail(field, "Required."),
            Some(v) if len(v) < min => self.fail(field, format!("Must be at least {min} characters.")),
            Some(v) if len(v) > max => self.fail(field, format!("Must be {max} characters or fewer.")),
            Some(_) => {}
        }
    }

    fn integer(&mut self, field: &str, value: Option<f64>, min: i64, max: i64) -> Option<i64> {
        let value = value?;
        if value.fract() != 0.0 {
            self.fail(field, "Must be an integer.");
            return None;
        }
        let n = value as i64;
        if n < min || n > max {
            self.fail(field, format!("Must be between {min} and {max}."));
        }
        Some(n)
    }

    fn max_items(&mut self, field: &str, count: usize, max: usize) {
        if count > max {
            self.fail(field, format!("At most {max} items allowed."));
        }
    }

    fn unique<T: Eq + Hash>(&mut self, field: &str, items: impl IntoIterator<Item = T>) {
        let mut seen = HashSet::new();
        if !items.into_iter().all(|item| seen.insert(item)) {
            self.fail(field, "Items must be unique.");
        }
    }

    fn refs(&mut self, field: &str, refs: &[Linked], max: usize) {
        self.unique(field, refs.iter().filter_map(Linked::target));
        self.max_items(field, refs.len(), max);
    }

    fn slug(&mut self, slug: Option<&Slug>) {
        if !slug.is_some_and(Slug::is_set) {
            self.fail("slug", "Required.");
        }
    }

    fn one_of(&mut self, field: &str, value: Option<&str>, allowed: &[&str]) {
        match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => self.fail(field, "Required."),
            Some(v) if !allowed.contains(&v) => {
                self.fail(field, format!("Unknown value {v:?}."));
            }
            Some(_) => {}
        }
    }

    fn image_text(&mut self, field: &str, image: Option<&ImageDoc>, caption: bool) {
        let Some(image) = image else {
            return;
        };
        self.localized_max(&format!("{field}.alt"), image.alt.as_ref(), "alt text", 180);
        if caption {
            self.localized_max(&format!("{field}.caption"), image.caption.as_ref(), "caption", 200);
        }
    }

    fn finish(self) -> Vec<Violation> {
        self.violations
    }
}

pub fn theme(doc: &ThemeDoc) -> Vec<Violation> {
    let mut c = Checker::default();
    c.localized_required("title", doc.title.as_ref(), "title", 2, 120);
    c.slug(doc.slug.as_ref());
    c.localized_max("description", doc.description.as_ref(), "description", 2000);
    c.text_max("notes", doc.notes.as_deref(), 2000);
    c.max_items("synonyms", doc.synonyms.len(), 30);
    c.image_text("coverImage", doc.cover_image.as_ref(), false);
    c.finish()
}

pub fn photographer(doc: &PhotographerDoc) -> Vec<Violation> {
    let mut c = Checker::default();
    c.localized_required("name", doc.name.as_ref(), "name", 2, 120);
    let birth = c.integer("birthYear", doc.birth_year, 1700, 2100);
    let death = c.integer("deathYear", doc.death_year, 1700, 2100);
    if let (Some(birth), Some(death)) = (birth, death) {
        if death < birth {
            c.fail("deathYear", "Death year cannot be earlier than birth year.");
        }
    }
    c.localized_max("bio", doc.bio.as_ref(), "bio", 2000);
    c.text_max("notes", doc.notes.as_deref(), 2000);
    c.finish()
}

pub fn curator(doc: &CuratorDoc) -> Vec<Violation> {
    let mut c = Checker::default();
    c.localized_required("name", doc.name.as_ref(), "name", 2, 120);
    c.localized_max("role", doc.role.as_ref(), "role", 120);
    c.localized_max("bio", doc.bio.as_ref(), "bio", 2000);
    c.text_max("yearsActive", doc.years_active.as_deref(), 60);
    c.text_max("notes", doc.notes.as_deref(), 1000);
    c.finish()
}

pub fn collection(doc: &CollectionDoc) -> Vec<Violation> {
    let mut c = Checker::default();
    c.localized_required("title", doc.title.as_ref(), "title", 2, 140);
    c.slug(doc.slug.as_ref());

    let own_id = doc.id.trim_start_matches("drafts.");
    if !own_id.is_empty() && doc.parent.as_ref().and_then(Linked::target) == Some(own_id) {
        c.fail("parent", "A collection cannot be its own parent.");
    }
    c.integer("sortOrder", doc.sort_order, 0, 9999);
    c.one_of("collectionType", doc.collection_type.as_deref(), COLLECTION_TYPES);
    c.max_items("sources", doc.sources.len(), 20);
    c.integer("acquisitionYear", doc.acquisition_year, 1840, 2100);
    c.localized_max("dateRangeNote", doc.date_range_note.as_ref(), "date note", 120);
    c.localized_max("description", doc.description.as_ref(), "description", 2000);
    c.text_max("curatorialNotes", doc.curatorial_notes.as_deref(), 3000);
    c.finish()
}

pub fn photo(doc: &PhotoDoc) -> Vec<Violation> {
    let mut c = Checker::default();
    c.localized_required("title", doc.title.as_ref(), "title", 3, 120);
    c.slug(doc.slug.as_ref());
    if doc.image.as_ref().and_then(|i| i.asset.as_ref()).and_then(Linked::target).is_none() {
        c.fail("image", "Required.");
    }
    c.image_text("image", doc.image.as_ref(), true);
    c.localized_max(
        "publicDescription",
        doc.public_description.as_ref(),
        "public description",
        2000,
    );
    c.localized_required_max("dateNote", doc.date_note.as_ref(), "date", 120);
    c.refs("placeRefs", &doc.place_refs, 20);
    c.refs("tagRefs", &doc.tag_refs, 30);
    c.refs("themeRefs", &doc.theme_refs, 20);
    c.text_max("archivalDescription", doc.archival_description.as_deref(), 1200);
    c.text_max("curatorialNotes", doc.curatorial_notes.as_deref(), 2000);
    c.one_of("rightsStatus", doc.rights_status.as_deref(), RIGHTS_STATUSES);
    c.localized_max("attribution", doc.attribution.as_ref(), "attribution", 200);
    c.localized_max("source", doc.source.as_ref(), "source", 300);
    c.text_max("internalNotes", doc.internal_notes.as_deref(), 2000);
    c.finish()
}

pub fn place(doc: &PlaceDoc) -> Vec<Violation> {
    let mut c = Checker::default();
    c.string_bounds("title", doc.title.as_deref(), 2, 120);
    c.text_max("titleKa", doc.title_ka.as_deref(), 120);
    c.max_items("altNames", doc.alt_names.len(), 30);
    c.unique("altNames", doc.alt_names.iter());
    c.one_of("placeType", doc.place_type.as_deref(), PLACE_TYPES);
    c.one_of("certainty", doc.certainty.as_deref(), CERTAINTIES);
    c.text_max("notes", doc.notes.as_deref(), 2000);
    c.slug(doc.slug.as_ref());
    c.finish()
}

pub fn tag(doc: &TagDoc) -> Vec<Violation> {
    let mut c = Checker::default();
    c.string_bounds("title", doc.title.as_deref(), 2, 80);
    c.text_max("titleKa", doc.title_ka.as_deref(), 80);
    c.one_of("scope", doc.scope.as_deref(), TAG_SCOPES);
    c.max_items("altLabels", doc.alt_labels.len(), 20);
    c.unique("altLabels", doc.alt_labels.iter());
    c.slug(doc.slug.as_ref());
    c.finish()
}
