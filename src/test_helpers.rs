//! Shared test utilities for the bridge test suite.
//!
//! Provides canned stores that stand in for the network, and small fixture
//! builders for store payloads.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let store = StubStore::new()
//!     .with(QueryName::ThemeDetail, theme_json("t1", "old-tbilisi", Some("Old Tbilisi")))
//!     .with(QueryName::PhotosByTheme, photo_cards(3));
//!
//! let view = Resolver::new(&store, 24).resolve(&request)?;
//! assert_eq!(store.calls(), vec![QueryName::ThemeDetail, /* ... */]);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use serde_json::{Value, json};

use crate::client::{ContentStore, Params, QueryError};
use crate::config::StoreIdentity;
use crate::queries::QueryName;

// =========================================================================
// Fixture values
// =========================================================================

pub fn identity() -> StoreIdentity {
    StoreIdentity {
        project_id: "abc123".into(),
        dataset: "production".into(),
        api_version: "2023-10-01".into(),
    }
}

/// Build query params from pairs.
pub fn params(pairs: &[(&str, Value)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// `n` photo cards with slugs `photo-0` .. `photo-{n-1}`.
pub fn photo_cards(n: usize) -> Value {
    Value::Array(
        (0..n)
            .map(|i| {
                json!({
                    "_id": format!("p{i}"),
                    "slug": format!("photo-{i}"),
                    "title": format!("Photo {i}"),
                    "thumb": {"asset": {"url": format!("https://cdn.example/p{i}.jpg")}, "alt": null},
                    "dateNote": "1890s"
                })
            })
            .collect(),
    )
}

/// Theme detail payload; `title: None` marks it unavailable in the language.
pub fn theme_json(id: &str, slug: &str, title: Option<&str>) -> Value {
    json!({
        "_id": id,
        "slug": slug,
        "title": title,
        "description": null,
        "parent": null,
        "hasLang": title.is_some()
    })
}

/// Collection card or detail payload with the given child ids.
pub fn collection_json(id: &str, slug: &str, children: &[&str]) -> Value {
    let children: Vec<Value> = children
        .iter()
        .map(|child| {
            json!({
                "_id": child,
                "slug": child,
                "title": format!("Collection {child}"),
                "isOriginalGrouping": true,
                "hasLang": true,
                "childCount": 0,
                "photoCount": 2
            })
        })
        .collect();
    json!({
        "_id": id,
        "slug": slug,
        "title": format!("Collection {slug}"),
        "collectionType": "family_donation",
        "isOriginalGrouping": true,
        "hasLang": true,
        "children": children
    })
}

// =========================================================================
// Stores
// =========================================================================

/// Store returning one fixed answer and counting calls.
pub struct CountingStore {
    response: Option<Value>,
    calls: Cell<u32>,
}

impl CountingStore {
    pub fn returning(value: Value) -> Self {
        Self {
            response: Some(value),
            calls: Cell::new(0),
        }
    }

    /// Every call fails with a transport error.
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.get()
    }
}

impl ContentStore for CountingStore {
    fn query(&self, _query: &str, _params: &Params) -> Result<Value, QueryError> {
        self.calls.set(self.calls.get() + 1);
        self.response.clone().ok_or_else(|| QueryError::Transport {
            message: "connection refused".into(),
        })
    }
}

/// Store answering per catalog entry, recording every call in order.
///
/// Entries without a registered answer return `null`, as the store does for
/// a `[0]` lookup that matched nothing.
#[derive(Default)]
pub struct StubStore {
    responses: HashMap<QueryName, Value>,
    failures: HashMap<QueryName, u16>,
    calls: RefCell<Vec<(QueryName, Params)>>,
}

impl StubStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: QueryName, value: Value) -> Self {
        self.responses.insert(name, value);
        self
    }

    /// Make `name` fail with an HTTP error carrying `code`.
    pub fn failing(mut self, name: QueryName, code: u16) -> Self {
        self.failures.insert(name, code);
        self
    }

    /// Catalog entries queried so far, in order.
    pub fn calls(&self) -> Vec<QueryName> {
        self.calls.borrow().iter().map(|(name, _)| *name).collect()
    }

    /// Params of the first call to `name`. Panics if it was never queried.
    pub fn params_of(&self, name: QueryName) -> Params {
        self.calls
            .borrow()
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| p.clone())
            .unwrap_or_else(|| panic!("{} was never queried", name.as_str()))
    }
}

impl ContentStore for StubStore {
    fn query(&self, query: &str, params: &Params) -> Result<Value, QueryError> {
        let name = QueryName::from_text(query)
            .unwrap_or_else(|| panic!("query is not in the catalog: {query}"));
        self.calls.borrow_mut().push((name, params.clone()));
        if let Some(&code) = self.failures.get(&name) {
            return Err(QueryError::Http {
                code,
                detail: json!({"error": {"description": "stub failure"}}),
            });
        }
        Ok(self.responses.get(&name).cloned().unwrap_or(Value::Null))
    }
}
