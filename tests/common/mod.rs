//! Canned archive shared by the integration tests.
//!
//! [`Archive`] answers catalog queries from fixed payloads. Photo listings are
//! served from one list of photos and sliced by the `offset`/`limit` params,
//! the way the store slices `[$offset...$offset + $limit]`.

#![allow(dead_code)]

use photomuseum_bridge::client::{ContentStore, Params, QueryError};
use photomuseum_bridge::queries::QueryName;
use serde_json::{Value, json};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

const PHOTO_LISTINGS: [QueryName; 5] = [
    QueryName::PhotosByTheme,
    QueryName::PhotosByPhotographer,
    QueryName::PhotosByPlace,
    QueryName::CollectionPhotos,
    QueryName::SearchPhotos,
];

#[derive(Default)]
pub struct Archive {
    answers: HashMap<QueryName, Value>,
    photos: Vec<Value>,
    down: Vec<QueryName>,
    calls: RefCell<Vec<(QueryName, Params)>>,
}

impl Archive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, name: QueryName, value: Value) -> Self {
        self.answers.insert(name, value);
        self
    }

    /// Photos served by every paginated listing.
    pub fn photos(mut self, count: usize) -> Self {
        self.photos = (0..count).map(photo).collect();
        self
    }

    /// Make `name` fail with HTTP 500.
    pub fn down(mut self, name: QueryName) -> Self {
        self.down.push(name);
        self
    }

    pub fn calls(&self) -> Vec<QueryName> {
        self.calls.borrow().iter().map(|(n, _)| *n).collect()
    }

    pub fn params_of(&self, name: QueryName) -> Params {
        self.calls
            .borrow()
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| p.clone())
            .unwrap_or_else(|| panic!("{} was never queried", name.as_str()))
    }

    fn window(&self, params: &Params) -> Value {
        let int = |key: &str| params.get(key).and_then(Value::as_u64).unwrap_or(0) as usize;
        let start = int("offset").min(self.photos.len());
        let end = (start + int("limit")).min(self.photos.len());
        Value::Array(self.photos[start..end].to_vec())
    }
}

impl ContentStore for Archive {
    fn query(&self, query: &str, params: &Params) -> Result<Value, QueryError> {
        let name = QueryName::from_text(query).unwrap_or_else(|| panic!("unknown query: {query}"));
        self.calls.borrow_mut().push((name, params.clone()));
        if self.down.contains(&name) {
            return Err(QueryError::Http {
                code: 500,
                detail: json!({"error": {"description": "backend exploded"}}),
            });
        }
        if PHOTO_LISTINGS.contains(&name) && !self.answers.contains_key(&name) {
            return Ok(self.window(params));
        }
        Ok(self.answers.get(&name).cloned().unwrap_or(Value::Null))
    }
}

/// Store that answers every query with the same value and counts calls.
pub struct Echo {
    value: Option<Value>,
    calls: Cell<u32>,
}

impl Echo {
    pub fn new(value: Value) -> Self {
        Self {
            value: Some(value),
            calls: Cell::new(0),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            value: None,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl ContentStore for Echo {
    fn query(&self, _query: &str, _params: &Params) -> Result<Value, QueryError> {
        self.calls.set(self.calls.get() + 1);
        self.value.clone().ok_or_else(|| QueryError::Transport {
            message: "connection refused".into(),
        })
    }
}

// ===========================================================================
// Payloads
// ===========================================================================

pub fn photo(i: usize) -> Value {
    json!({
        "_id": format!("p{i}"),
        "slug": format!("photo-{i}"),
        "title": format!("Photo {i}"),
        "thumb": {"asset": {"url": format!("https://cdn.example/p{i}.jpg")}},
        "dateNote": "1890s"
    })
}

pub fn theme(id: &str, slug: &str, title: Option<&str>) -> Value {
    json!({
        "_id": id,
        "slug": slug,
        "title": title,
        "description": "Street life in the old town.",
        "parent": null,
        "hasLang": title.is_some()
    })
}

pub fn photographer(id: &str, slug: &str, name: &str) -> Value {
    json!({
        "_id": id,
        "slug": slug,
        "name": name,
        "bio": null,
        "birthYear": 1846,
        "deathYear": 1916,
        "hasLang": true
    })
}

pub fn collection(id: &str, slug: &str, children: &[(&str, bool)]) -> Value {
    let children: Vec<Value> = children
        .iter()
        .enumerate()
        .map(|(i, (child, has_lang))| {
            json!({
                "_id": child,
                "slug": child,
                "title": format!("Collection {child}"),
                "sortOrder": 10 - i as i64,
                "isOriginalGrouping": true,
                "collectionType": "family_donation",
                "hasLang": has_lang,
                "childCount": 0,
                "photoCount": 3
            })
        })
        .collect();
    json!({
        "_id": id,
        "slug": slug,
        "title": format!("Collection {slug}"),
        "collectionType": "parent_container",
        "isOriginalGrouping": true,
        "hasLang": true,
        "children": children
    })
}
