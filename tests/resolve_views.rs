//! View resolution against a canned archive: query sequences, pagination
//! windows, and the not-found / unavailable outcomes.

mod common;

use common::{Archive, collection, photographer, theme};
use photomuseum_bridge::queries::QueryName;
use photomuseum_bridge::resolve::{
    CollectionContent, PageKind, Request, Resolver, View, ViewError,
};
use serde_json::json;

fn theme_archive(photos: usize) -> Archive {
    Archive::new()
        .answer(QueryName::ThemeDetail, theme("t1", "bazaars", Some("Bazaars")))
        .answer(QueryName::ThemeChildren, json!([]))
        .photos(photos)
}

fn theme_page(archive: &Archive, offset: i64, limit: i64) -> (usize, u32, Option<u32>, Option<u32>) {
    let request = Request::new("en", PageKind::Theme)
        .with_slug("bazaars")
        .with_window(offset, Some(limit));
    let View::Theme(view) = Resolver::new(archive, 24).resolve(&request).unwrap() else {
        panic!("expected a theme view");
    };
    let shown = view.photos.as_ref().map_or(0, Vec::len);
    (shown, view.page.offset, view.page.prev_offset(), view.page.next_offset())
}

// ===========================================================================
// Pagination
// ===========================================================================

#[test]
fn five_photos_in_windows_of_two() {
    let archive = theme_archive(5);
    assert_eq!(theme_page(&archive, 0, 2), (2, 0, None, Some(2)));
    assert_eq!(theme_page(&archive, 2, 2), (2, 2, Some(0), Some(4)));
    assert_eq!(theme_page(&archive, 4, 2), (1, 4, Some(2), None));
}

#[test]
fn exact_multiple_offers_one_empty_page() {
    // A full window is the only signal that more may follow.
    let archive = theme_archive(4);
    assert_eq!(theme_page(&archive, 2, 2), (2, 2, Some(0), Some(4)));
    assert_eq!(theme_page(&archive, 4, 2), (0, 4, Some(2), None));
}

#[test]
fn window_is_clamped_before_querying() {
    let archive = theme_archive(100);
    let (shown, offset, prev, _) = theme_page(&archive, -10, 500);
    assert_eq!((shown, offset, prev), (60, 0, None));
    let params = archive.params_of(QueryName::PhotosByTheme);
    assert_eq!(params["offset"], json!(0));
    assert_eq!(params["limit"], json!(60));
}

#[test]
fn missing_limit_uses_default() {
    let archive = theme_archive(30);
    let request = Request::new("ka", PageKind::Theme).with_slug("bazaars");
    let View::Theme(view) = Resolver::new(&archive, 12).resolve(&request).unwrap() else {
        panic!("expected a theme view");
    };
    assert_eq!(view.page.limit, 12);
    assert_eq!(archive.params_of(QueryName::PhotosByTheme)["lang"], json!("ka"));
}

// ===========================================================================
// Collections
// ===========================================================================

#[test]
fn collection_with_children_skips_photo_query() {
    let archive = Archive::new()
        .answer(
            QueryName::CollectionDetail,
            collection("c1", "donations", &[("a", true), ("b", false), ("c", true)]),
        )
        .photos(3);
    let request = Request::new("en", PageKind::Collection).with_slug("donations");
    let View::Collection(view) = Resolver::new(&archive, 24).resolve(&request).unwrap() else {
        panic!("expected a collection view");
    };

    let CollectionContent::Children(children) = view.content else {
        panic!("expected sub-collections");
    };
    let slugs: Vec<_> = children.iter().filter_map(|c| c.slug.as_deref()).collect();
    // "b" has no English text. sortOrder counts down in the fixture.
    assert_eq!(slugs, vec!["c", "a"]);
    assert!(!archive.calls().contains(&QueryName::CollectionPhotos));
}

#[test]
fn children_hidden_in_language_still_suppress_photos() {
    let archive = Archive::new()
        .answer(QueryName::CollectionDetail, collection("c1", "donations", &[("a", false)]))
        .photos(3);
    let request = Request::new("en", PageKind::Collection).with_slug("donations");
    let View::Collection(view) = Resolver::new(&archive, 24).resolve(&request).unwrap() else {
        panic!("expected a collection view");
    };
    assert!(matches!(view.content, CollectionContent::Children(ref c) if c.is_empty()));
    assert_eq!(archive.calls(), vec![QueryName::CollectionDetail]);
}

#[test]
fn leaf_collection_lists_photos() {
    let archive = Archive::new()
        .answer(QueryName::CollectionDetail, collection("c2", "album", &[]))
        .photos(3);
    let request = Request::new("en", PageKind::Collection).with_slug("album");
    let View::Collection(view) = Resolver::new(&archive, 24).resolve(&request).unwrap() else {
        panic!("expected a collection view");
    };
    let CollectionContent::Photos { photos, page } = view.content else {
        panic!("expected photos");
    };
    assert_eq!(photos.unwrap().len(), 3);
    assert_eq!(page.next_offset(), None);
    assert_eq!(archive.params_of(QueryName::CollectionPhotos)["collectionId"], json!("c2"));
}

// ===========================================================================
// Outcomes
// ===========================================================================

#[test]
fn unknown_slug_is_not_found() {
    let archive = Archive::new();
    let request = Request::new("en", PageKind::Photographer).with_slug("nobody");
    let err = Resolver::new(&archive, 24).resolve(&request).unwrap_err();
    assert!(matches!(err, ViewError::NotFound { page: PageKind::Photographer, .. }));
    assert_eq!(archive.calls(), vec![QueryName::PhotographerDetail]);
}

#[test]
fn blank_slug_never_reaches_the_store() {
    let archive = Archive::new();
    let request = Request::new("en", PageKind::Theme).with_slug("   ");
    let err = Resolver::new(&archive, 24).resolve(&request).unwrap_err();
    assert!(matches!(err, ViewError::NotFound { .. }));
    assert!(archive.calls().is_empty());
}

#[test]
fn theme_without_text_in_language() {
    let archive = Archive::new().answer(QueryName::ThemeDetail, theme("t1", "bazaars", None));
    let request = Request::new("ka", PageKind::Theme).with_slug("bazaars");
    let err = Resolver::new(&archive, 24).resolve(&request).unwrap_err();
    assert!(matches!(err, ViewError::LanguageUnavailable { .. }));
    assert_eq!(archive.calls(), vec![QueryName::ThemeDetail]);
}

#[test]
fn failed_photo_listing_keeps_the_page() {
    let archive = Archive::new()
        .answer(QueryName::PhotographerDetail, photographer("pg1", "ermakov", "Dmitri Ermakov"))
        .down(QueryName::PhotosByPhotographer);
    let request = Request::new("en", PageKind::Photographer).with_slug("ermakov");
    let View::Photographer(view) = Resolver::new(&archive, 24).resolve(&request).unwrap() else {
        panic!("expected a photographer view");
    };
    assert_eq!(view.photographer.name.as_deref(), Some("Dmitri Ermakov"));
    assert!(matches!(view.photos, Err(ViewError::Http { code: 500, .. })));
    assert!(!view.page.has_more);
}

#[test]
fn unsupported_language_falls_back_to_english() {
    let archive = Archive::new().answer(QueryName::TopThemes, json!([]));
    let request = Request::new("fr", PageKind::Themes);
    Resolver::new(&archive, 24).resolve(&request).unwrap();
    assert_eq!(archive.params_of(QueryName::TopThemes)["lang"], json!("en"));
}

#[test]
fn loose_numbers_in_child_collections() {
    let mut detail = collection("c1", "family", &[("a", true), ("b", true), ("c", true)]);
    detail["children"][0]["sortOrder"] = json!(2.5);
    detail["children"][1]["sortOrder"] = json!(-1);
    detail["children"][2]["sortOrder"] = json!("soon");
    let archive = Archive::new().answer(QueryName::CollectionDetail, detail);
    let request = Request::new("en", PageKind::Collection).with_slug("family");
    let View::Collection(view) = Resolver::new(&archive, 24).resolve(&request).unwrap() else {
        panic!("expected a collection view");
    };
    let CollectionContent::Children(children) = view.content else {
        panic!("expected sub-collections");
    };
    let slugs: Vec<_> = children.iter().filter_map(|c| c.slug.as_deref()).collect();
    assert_eq!(slugs, vec!["b", "a", "c"]);
}

#[test]
fn fractional_life_years_still_resolve() {
    let mut detail = photographer("pg1", "ermakov", "Dmitri Ermakov");
    detail["birthYear"] = json!(1846.0);
    detail["deathYear"] = json!(1916.7);
    let archive = Archive::new().answer(QueryName::PhotographerDetail, detail).photos(1);
    let request = Request::new("en", PageKind::Photographer).with_slug("ermakov");
    let View::Photographer(view) = Resolver::new(&archive, 24).resolve(&request).unwrap() else {
        panic!("expected a photographer view");
    };
    assert_eq!(view.photographer.birth_year, Some(1846));
    assert_eq!(view.photographer.death_year, Some(1916));
}

// ===========================================================================
// Bilingual fallback
// ===========================================================================

#[test]
fn photographer_named_only_in_georgian_renders_in_english() {
    // What the store returns for name.ka only: the coalesce chain picks the
    // Georgian name and the availability flag is false.
    let mut detail = photographer("pg2", "takaishvili", "ექვთიმე თაყაიშვილი");
    detail["hasLang"] = json!(false);
    let archive = Archive::new().answer(QueryName::PhotographerDetail, detail).photos(2);
    let request = Request::new("en", PageKind::Photographer).with_slug("takaishvili");
    let View::Photographer(view) = Resolver::new(&archive, 24).resolve(&request).unwrap() else {
        panic!("expected a photographer view");
    };

    assert_eq!(view.photographer.name.as_deref(), Some("ექვთიმე თაყაიშვილი"));
    assert_eq!(view.photographer.has_lang, Some(false));
    assert_eq!(view.photos.map(|p| p.len()).ok(), Some(2));
    assert_eq!(archive.params_of(QueryName::PhotographerDetail)["lang"], json!("en"));
    assert!(
        QueryName::PhotographerDetail
            .text()
            .contains("coalesce(name[$lang], name.en, name.ka)")
    );
}

#[test]
fn place_without_georgian_title_uses_primary_title() {
    let archive = Archive::new()
        .answer(
            QueryName::PlaceDetail,
            json!({
                "_id": "pl1",
                "slug": "tbilisi",
                "title": "Tbilisi",
                "subtitle": null,
                "placeType": "city",
                "certainty": "exact",
                "altNames": ["Tiflis"],
                "parent": null
            }),
        )
        .photos(1);
    let request = Request::new("ka", PageKind::Place).with_slug("tbilisi");
    let View::Place(view) = Resolver::new(&archive, 24).resolve(&request).unwrap() else {
        panic!("expected a place view");
    };

    assert_eq!(view.place.title.as_deref(), Some("Tbilisi"));
    assert_eq!(view.place.shown_alt_names(), vec!["Tiflis"]);
    assert_eq!(archive.params_of(QueryName::PlaceDetail)["lang"], json!("ka"));
    assert!(
        QueryName::PlaceDetail
            .text()
            .contains(r#""title": coalesce(title[$lang], title, titleKa)"#)
    );
}
