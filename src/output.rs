//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (blog post, project) is its semantic identity, positional
//! index and title, with the record file shown as secondary context via an
//! indented `Source:` line. The output reads as a content inventory while
//! still letting users trace data back to specific files.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Blog
//! 001 React Performance (6 blocks)
//!     Source: blog/010-react-performance.json
//!     Category: FRONTEND
//!     Measuring before optimizing, with the profiler and...
//! 004 Draft Ideas (unlisted)
//!     Source: blog/040-draft-ideas.json
//!
//! Projects
//! 001 Folio (4 blocks)
//!     Source: projects/010-folio.json
//!
//! Config
//!     config.toml
//!     resume.md
//!     assets/
//! ```
//!
//! ## Build
//!
//! ```text
//! Home → #/
//! Blog → #/blog
//!     001 React Performance → #/blog/react-performance
//! Projects → #/projects
//!     001 Folio → #/project/folio
//! Resume → #/resume
//!
//! Generated 12 views, 3 assets
//! ```
//!
//! ## Resolve
//!
//! ```text
//! #/blog/nope → blog fallback "nope" (view-fallback)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::content::{ContentEntity, EntityKind};
use crate::generate::GenerateReport;
use crate::route::Route;
use crate::scan::{Registry, Site};

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional detail.
///
/// ```text
/// 001 React Performance (6 blocks)
/// 004 Draft Ideas (unlisted)
/// ```
fn entity_header(index: usize, entity: &ContentEntity) -> String {
    let detail = match (entity.active, entity.blocks.len()) {
        (false, _) => " (unlisted)".to_string(),
        (true, 0) => String::new(),
        (true, 1) => " (1 block)".to_string(),
        (true, n) => format!(" ({n} blocks)"),
    };
    format!("{} {}{}", format_index(index), entity.title, detail)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

// ============================================================================
// Check output
// ============================================================================

fn format_registry(lines: &mut Vec<String>, registry: &Registry) {
    lines.push(registry.kind().label().to_string());
    if registry.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, entity) in registry.entities().iter().enumerate() {
        lines.push(entity_header(i + 1, entity));
        if let Some(source) = &entity.source {
            lines.push(format!("{}Source: {}", indent(1), source.display()));
        }
        if !entity.category.is_empty() {
            lines.push(format!("{}Category: {}", indent(1), entity.category));
        }
        if let Some(link) = &entity.external_link {
            lines.push(format!("{}Links to: {}", indent(1), link));
        }
        if let Some(summary) = entity.summary() {
            let truncated = truncate_desc(summary.trim(), 60);
            if !truncated.is_empty() {
                lines.push(format!("{}{}", indent(1), truncated));
            }
        }
    }
}

/// Format the `check` command: the content inventory that a build would use.
pub fn format_check_output(site: &Site) -> Vec<String> {
    let mut lines = Vec::new();

    format_registry(&mut lines, &site.blogs);
    lines.push(String::new());
    format_registry(&mut lines, &site.projects);

    lines.push(String::new());
    lines.push("Config".to_string());
    lines.push(format!("{}config.toml", indent(1)));
    if site.resume.is_some() {
        lines.push(format!("{}resume.md", indent(1)));
    }
    if site.assets_dir.is_some() {
        lines.push(format!("{}assets/", indent(1)));
    }

    lines
}

/// Print check output to stdout.
pub fn print_check_output(site: &Site) {
    for line in format_check_output(site) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

fn section_line(report: &GenerateReport, label: &str, template_id: &str) -> Option<String> {
    report
        .views
        .iter()
        .find(|v| v.template_id == template_id)
        .map(|v| format!("{} \u{2192} {}", label, v.location))
}

fn entity_lines(lines: &mut Vec<String>, report: &GenerateReport, kind: EntityKind) {
    let entities = report.views.iter().filter(|v| v.kind == Some(kind));
    for (i, view) in entities.enumerate() {
        let marker = if view.listed { "" } else { " (unlisted)" };
        lines.push(format!(
            "{}{} {}{} \u{2192} {}",
            indent(1),
            format_index(i + 1),
            view.name,
            marker,
            view.location
        ));
    }
}

/// Format the `build` command: every view with its location.
pub fn format_build_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = Vec::new();

    lines.extend(section_line(report, "Home", "view-home"));
    lines.extend(section_line(report, "Blog", "view-blogs"));
    entity_lines(&mut lines, report, EntityKind::Blog);
    lines.extend(section_line(report, "Projects", "view-projects"));
    entity_lines(&mut lines, report, EntityKind::Project);
    lines.extend(section_line(report, "Resume", "view-resume"));

    lines.push(String::new());
    let assets = match report.assets_copied {
        1 => "1 asset".to_string(),
        n => format!("{n} assets"),
    };
    lines.push(format!("Generated {} views, {}", report.views.len(), assets));

    lines
}

/// Print build output to stdout.
pub fn print_build_output(report: &GenerateReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Resolve output
// ============================================================================

fn describe_route(route: &Route) -> String {
    match route {
        Route::Home => "home".to_string(),
        Route::BlogIndex => "blog index".to_string(),
        Route::ProjectIndex => "project index".to_string(),
        Route::Resume => "resume".to_string(),
        Route::BlogPost(slug) => format!("blog post \"{slug}\""),
        Route::BlogFallback(slug) => format!("blog fallback \"{slug}\""),
        Route::ProjectDetail(slug) => format!("project \"{slug}\""),
        Route::ExternalRedirectPending(info) => {
            let mut out = format!("development placeholder \"{}\"", info.name);
            if let Some(github) = &info.github {
                out.push_str(&format!(" github={github}"));
            }
            if let Some(demo) = &info.demo {
                out.push_str(&format!(" demo={demo}"));
            }
            out
        }
        Route::NotFound(slug) => format!("not found \"{slug}\""),
    }
}

/// Format the `resolve` command: which view a location shows.
pub fn format_resolve_output(location: &str, route: &Route, template_id: &str) -> Vec<String> {
    vec![format!(
        "{} \u{2192} {} ({})",
        location,
        describe_route(route),
        template_id
    )]
}

/// Print resolve output to stdout.
pub fn print_resolve_output(location: &str, route: &Route, template_id: &str) {
    for line in format_resolve_output(location, route, template_id) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
