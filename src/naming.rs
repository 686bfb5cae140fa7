//! File-stem conventions for content records.
//!
//! Entity files may carry an optional numeric prefix (`NNN-`) that only
//! controls their position on disk. The remainder of the stem is the default
//! slug when the record itself does not name one:
//!
//! - `010-hello-world.json` → slug `hello-world`
//! - `rust-notes.json` → slug `rust-notes`
//!
//! Slugs end up inside location fragments (`#/blog/<slug>`), so they are
//! restricted to a URL-safe alphabet and matched exactly, case included.

/// Result of splitting a stem like `010-hello-world`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStem {
    /// Numeric prefix if present (e.g., `10` from `010-hello-world`).
    pub position: Option<u32>,
    /// Stem without its numeric prefix. Empty for number-only stems.
    pub slug: String,
}

/// Split a file stem following the `NNN-slug` convention.
///
/// - `"010-hello-world"` → position=Some(10), slug="hello-world"
/// - `"007"` → position=Some(7), slug=""
/// - `"2024-recap"` → position=Some(2024), slug="recap"
/// - `"notes"` → position=None, slug="notes"
pub fn parse_stem(stem: &str) -> ParsedStem {
    if let Some((prefix, rest)) = stem.split_once('-')
        && let Ok(position) = prefix.parse::<u32>()
    {
        return ParsedStem {
            position: Some(position),
            slug: rest.to_string(),
        };
    }
    if let Ok(position) = stem.parse::<u32>() {
        return ParsedStem {
            position: Some(position),
            slug: String::new(),
        };
    }
    ParsedStem {
        position: None,
        slug: stem.to_string(),
    }
}

/// Whether `slug` can be placed in a location fragment verbatim.
///
/// Allowed: ASCII letters, digits, `-` and `_`. Must be non-empty.
pub fn is_url_safe(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Prefix shared by every view `<template>` id in the shell.
pub const VIEW_ID_PREFIX: &str = "view-";

/// Element ids the shell owns outside the view templates.
pub const SHELL_IDS: [&str; 3] = ["app", "toast", "route-table"];

/// Whether a document element id would shadow one the shell looks up.
///
/// Mounted headings live in the same document as the shell, so a heading
/// with one of these ids would be found in place of the shell element.
pub fn is_reserved_id(id: &str) -> bool {
    id.starts_with(VIEW_ID_PREFIX) || SHELL_IDS.contains(&id)
}

/// Human-readable title for a slug: dashes and underscores become spaces.
///
/// Used where only a slug is known, e.g. the generic post view for a slug
/// that has no record.
pub fn display_title(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
