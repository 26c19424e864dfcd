//! CLI output formatting.
//!
//! Each command has a `format_*` function returning lines, and a `print_*`
//! wrapper that writes them to stdout. Format functions do no I/O.
//!
//! ## Route
//!
//! ```text
//! theme (ka)
//!     Slug: portraits
//!     Window: offset 24, limit 24
//!     Shortcode: [pmsb_theme lang="ka" slug="portraits" offset="24"]
//! ```
//!
//! ## Cache status
//!
//! ```text
//! Cache .pmsb-cache
//!     Generation: 1718000000
//!     TTL: 900s
//!     Entries: 12 live, 3 expired
//! ```
//!
//! ## Validate
//!
//! ```text
//! 001 photo Sioni Cathedral
//!     Id: ph-1
//!     dateNote: Date is required in at least one language (EN or KA).
//! 002 tag Uniforms (uniform) ok
//!
//! Checked 2 documents: 1 with problems, 1 violation
//! ```

use crate::cache::CacheStatus;
use crate::resolve::Request;
use crate::router::Shortcode;
use crate::schema::DocumentReport;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Route
// ============================================================================

/// Describe how a URL was routed, or that it was not.
pub fn format_route(target: &str, request: Option<&Request>) -> Vec<String> {
    let Some(request) = request else {
        return vec![format!("{target}: not routed")];
    };
    let mut lines = vec![format!("{} ({})", request.page, request.language())];
    let pad = indent(1);
    if !request.slug.is_empty() {
        lines.push(format!("{pad}Slug: {}", request.slug));
    }
    if request.page.is_paginated() {
        let limit = request
            .limit
            .map_or_else(|| "default".to_string(), |l| l.to_string());
        lines.push(format!("{pad}Window: offset {}, limit {limit}", request.offset));
    }
    let search = &request.search;
    for (label, value) in [
        ("Query", &search.q),
        ("Theme", &search.theme),
        ("Photographer", &search.photographer),
        ("Place", &search.place),
    ] {
        if !value.is_empty() {
            lines.push(format!("{pad}{label}: {value}"));
        }
    }
    lines.push(format!("{pad}Shortcode: {}", Shortcode::for_request(request)));
    lines
}

pub fn print_route(target: &str, request: Option<&Request>) {
    for line in format_route(target, request) {
        println!("{}", line);
    }
}

// ============================================================================
// Cache
// ============================================================================

pub fn format_cache_status(dir: &Path, ttl_secs: u64, status: &CacheStatus) -> Vec<String> {
    let pad = indent(1);
    vec![
        format!("Cache {}", dir.display()),
        format!("{pad}Generation: {}", status.generation),
        format!("{pad}TTL: {ttl_secs}s"),
        format!("{pad}Entries: {} live, {} expired", status.live, status.expired),
    ]
}

pub fn print_cache_status(dir: &Path, ttl_secs: u64, status: &CacheStatus) {
    for line in format_cache_status(dir, ttl_secs, status) {
        println!("{}", line);
    }
}

// ============================================================================
// Validate
// ============================================================================

/// One block per document; valid documents take a single line.
pub fn format_validation(reports: &[DocumentReport]) -> Vec<String> {
    let mut lines = Vec::new();
    let pad = indent(1);

    for (i, report) in reports.iter().enumerate() {
        let header = format!("{} {} {}", format_index(i + 1), report.doc_type, report.preview.title);
        if report.is_valid() {
            lines.push(format!("{header} ok"));
            continue;
        }
        lines.push(header);
        if !report.id.is_empty() {
            lines.push(format!("{pad}Id: {}", report.id));
        }
        for violation in &report.violations {
            lines.push(format!("{pad}{violation}"));
        }
    }

    let failing = reports.iter().filter(|r| !r.is_valid()).count();
    let violations: usize = reports.iter().map(|r| r.violations.len()).sum();
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Checked {}: {} with problems, {}",
        plural(reports.len(), "document"),
        failing,
        plural(violations, "violation")
    ));
    lines
}

pub fn print_validation(reports: &[DocumentReport]) {
    for line in format_validation(reports) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::PageKind;
    use crate::schema::validate_export;
    use std::path::PathBuf;

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn index_and_indent() {
        assert_eq!(format_index(7), "007");
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
        assert_eq!(plural(1, "document"), "1 document");
        assert_eq!(plural(0, "violation"), "0 violations");
    }

    // =========================================================================
    // Route
    // =========================================================================

    #[test]
    fn unrouted_target() {
        assert_eq!(format_route("/fr/", None), vec!["/fr/: not routed"]);
    }

    #[test]
    fn routed_theme() {
        let request = Request::new("ka", PageKind::Theme)
            .with_slug("portraits")
            .with_window(24, None);
        let lines = format_route("/ka/theme/portraits", Some(&request));
        assert_eq!(lines[0], "theme (ka)");
        assert_eq!(lines[1], "    Slug: portraits");
        assert_eq!(lines[2], "    Window: offset 24, limit default");
        assert!(lines[3].starts_with("    Shortcode: [pmsb_theme "));
    }

    #[test]
    fn unpaginated_page_has_no_window() {
        let request = Request::new("en", PageKind::Photographers);
        let lines = format_route("/en/photographers", Some(&request));
        assert!(!lines.iter().any(|l| l.contains("Window")));
    }

    // =========================================================================
    // Cache
    // =========================================================================

    #[test]
    fn cache_status_lines() {
        let status = CacheStatus {
            generation: "42".into(),
            live: 3,
            expired: 1,
        };
        let lines = format_cache_status(&PathBuf::from(".pmsb-cache"), 900, &status);
        assert_eq!(
            lines,
            vec![
                "Cache .pmsb-cache",
                "    Generation: 42",
                "    TTL: 900s",
                "    Entries: 3 live, 1 expired",
            ]
        );
    }

    // =========================================================================
    // Validate
    // =========================================================================

    #[test]
    fn validation_report() {
        let export = r#"[
            {"_type": "tag", "_id": "t1", "title": "Uniforms", "scope": "uniform", "slug": {"current": "uniforms"}},
            {"_type": "photographer", "_id": "pg1", "birthYear": 1900, "deathYear": 1890}
        ]"#;
        let reports = validate_export(export).unwrap();
        let lines = format_validation(&reports);
        assert_eq!(lines[0], "001 tag Uniforms (uniform) ok");
        assert_eq!(lines[1], "002 photographer Unnamed photographer");
        assert_eq!(lines[2], "    Id: pg1");
        assert!(lines[3].starts_with("    name: Name is required"));
        assert_eq!(lines[4], "    deathYear: Death year cannot be earlier than birth year.");
        assert_eq!(lines.last().unwrap(), "Checked 2 documents: 1 with problems, 2 violations");
    }

    #[test]
    fn empty_validation() {
        assert_eq!(format_validation(&[]), vec!["Checked 0 documents: 0 with problems, 0 violations"]);
    }
}
