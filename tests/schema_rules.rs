//! Exported CMS documents checked against the field rules.

use photomuseum_bridge::schema::{DocType, ValidationError, slugify, validate_export};

const EXPORT: &str = r#"{"_id":"ph-1","_type":"photo","title":{"en":"Sioni Cathedral","ka":"სიონის ტაძარი"},"slug":{"current":"sioni-cathedral"},"image":{"asset":{"_ref":"image-a1-800x600-jpg"},"alt":{"en":"Cathedral facade"}},"dateNote":{"en":"c. 1890s"},"rightsStatus":"public_domain","placeRefs":[{"_ref":"pl-1"}],"themeRefs":[{"_ref":"th-1"},{"_ref":"th-1"}]}
{"_id":"image-a1-800x600-jpg","_type":"sanity.imageAsset","url":"https://cdn.example/a1.jpg"}
{"_id":"th-1","_type":"theme","title":{"en":"Churches"},"slug":{"current":"churches"},"synonyms":null}
{"_id":"col-1","_type":"collection","title":{"en":"Family album"},"slug":{"current":"family-album"},"collectionType":"family_donation","parent":{"_ref":"col-1"},"acquisitionYear":1975}
{"_id":"pg-1","_type":"photographer","name":{"ka":"დიმიტრი ერმაკოვი"},"birthYear":1846,"deathYear":1916}
{"_id":"pl-1","_type":"place","title":"Tbilisi","titleKa":"თბილისი","placeType":"city","certainty":"approximate","slug":{"current":"tbilisi"}}
{"_id":"tg-1","_type":"tag","title":"Uniforms","scope":"clothing","slug":{"current":"uniforms"}}
"#;

#[test]
fn export_report() {
    let reports = validate_export(EXPORT).unwrap();
    let summary: Vec<(&str, DocType, usize)> = reports
        .iter()
        .map(|r| (r.id.as_str(), r.doc_type, r.violations.len()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("ph-1", DocType::Photo, 1),
            ("th-1", DocType::Theme, 0),
            ("col-1", DocType::Collection, 1),
            ("pg-1", DocType::Photographer, 0),
            ("pl-1", DocType::Place, 0),
            ("tg-1", DocType::Tag, 1),
        ]
    );

    assert_eq!(reports[0].violations[0].field, "themeRefs");
    assert_eq!(
        reports[2].violations[0].message,
        "A collection cannot be its own parent."
    );
    assert_eq!(reports[5].violations[0].field, "scope");
}

#[test]
fn previews_in_report() {
    let reports = validate_export(EXPORT).unwrap();
    let titles: Vec<&str> = reports.iter().map(|r| r.preview.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Sioni Cathedral",
            "Churches",
            "📦 Family album",
            "დიმიტრი ერმაკოვი",
            "Tbilisi (city)",
            "Uniforms (clothing)",
        ]
    );
    assert_eq!(
        reports[2].preview.subtitle.as_deref(),
        Some("Provenance • Family Donation")
    );
}

#[test]
fn malformed_line_is_reported_by_number() {
    let broken = format!("{EXPORT}{{\"_type\": \"tag\"\n");
    let err = validate_export(&broken).unwrap_err();
    assert!(matches!(err, ValidationError::Export { line: 8, .. }));
}

#[test]
fn slugs_from_titles() {
    assert_eq!(slugify("Sioni Cathedral (exterior)"), "sioni-cathedral-exterior");
    assert_eq!(slugify("  "), "");
}
