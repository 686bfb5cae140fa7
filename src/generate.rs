//! Application shell generation.
//!
//! Takes a scanned [`Site`] and writes a single-page app: one `index.html`
//! holding every view as a `<template>`, a route table, and the script that
//! swaps views when the location fragment changes.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html          # Shell, templates, route table, styles, script
//! └── ...                 # Everything under content/assets/, copied as is
//! ```
//!
//! ## Templates
//!
//! | Template id | View |
//! |-------------|------|
//! | `view-home` | Home |
//! | `view-blogs`, `view-projects` | Indexes, every (category, page) pre-rendered |
//! | `view-resume` | Resume |
//! | `view-post-<slug>` | One per blog post, inactive ones included |
//! | `view-project-<slug>` | One per project |
//! | `view-fallback` | Generic post for unknown blog slugs |
//! | `view-development` | Development placeholder and unknown project slugs |
//!
//! ## Route Table
//!
//! A JSON object in `<script type="application/json" id="route-table">` with
//! the slugs of both registries and the title of each template. The shell
//! script resolves locations against it with the same rules as
//! [`crate::route::resolve`].
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles (colors injected from config)
//! - `static/site.js`: Router, TOC observer, filters, share and comments
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::config;
use crate::content::EntityKind;
use crate::highlight::HighlightError;
use crate::render::BlockRenderer;
use crate::route::{DevelopmentInfo, PREFIX, Route};
use crate::scan::Site;
use crate::toc::ObservationBand;
use crate::views::{self, ViewContext, ViewState};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Highlighting error: {0}")]
    Highlight(#[from] HighlightError),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/site.js");

/// One generated view, for the build report.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedView {
    pub template_id: String,
    pub location: String,
    /// Document title.
    pub title: String,
    /// Entity title for entity views, else the document title.
    pub name: String,
    /// Registry the view belongs to, for entity views.
    pub kind: Option<EntityKind>,
    pub listed: bool,
}

#[derive(Debug)]
pub struct GenerateReport {
    pub views: Vec<GeneratedView>,
    pub assets_copied: usize,
}

#[derive(Serialize)]
struct RouteTable<'a> {
    blogs: Vec<&'a str>,
    projects: Vec<&'a str>,
    default_project_name: &'static str,
    titles: BTreeMap<String, String>,
}

pub fn generate(site: &Site, output_dir: &Path) -> Result<GenerateReport, GenerateError> {
    let renderer = BlockRenderer::new(&site.config.code)?;
    let ctx = ViewContext::new(site, &renderer);

    // Generate CSS with colors from config
    let color_css = config::generate_color_css(&site.config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);

    fs::create_dir_all(output_dir)?;

    let views = collect_views(&ctx);
    let table = route_table(site, &views);
    let shell = render_shell(&ctx, &views, &table, &css)?;
    fs::write(output_dir.join("index.html"), shell.into_string())?;
    log::info!("wrote {} with {} views", output_dir.join("index.html").display(), views.len());

    let assets_copied = match &site.assets_dir {
        Some(assets) => copy_dir_recursive(assets, output_dir)?,
        None => 0,
    };

    Ok(GenerateReport {
        views: views.into_iter().map(|(view, _)| view).collect(),
        assets_copied,
    })
}

/// Every view of the site with its markup, in display order.
fn collect_views(ctx: &ViewContext) -> Vec<(GeneratedView, Markup)> {
    let mut out = Vec::new();
    let state = ViewState::default();
    let mut push = |route: Route, kind: Option<EntityKind>, listed: bool| {
        let markup = views::render_route(ctx, &route, &state);
        let title = views::page_title(ctx, &route);
        let name = match (&route, kind) {
            (Route::BlogPost(slug) | Route::ProjectDetail(slug), Some(kind)) => ctx
                .site
                .registry(kind)
                .get(slug)
                .map(|e| e.title.clone())
                .unwrap_or_else(|| title.clone()),
            _ => title.clone(),
        };
        let view = GeneratedView {
            template_id: views::template_id(&route),
            location: route.location(),
            title,
            name,
            kind,
            listed,
        };
        out.push((view, markup));
    };

    push(Route::Home, None, true);
    push(Route::BlogIndex, None, true);
    push(Route::ProjectIndex, None, true);
    push(Route::Resume, None, true);
    for post in ctx.site.blogs.entities() {
        push(Route::BlogPost(post.slug.clone()), Some(EntityKind::Blog), post.active);
    }
    for project in ctx.site.projects.entities() {
        push(
            Route::ProjectDetail(project.slug.clone()),
            Some(EntityKind::Project),
            project.active,
        );
    }
    push(Route::BlogFallback(String::new()), None, false);
    push(
        Route::ExternalRedirectPending(DevelopmentInfo {
            name: DevelopmentInfo::DEFAULT_NAME.to_string(),
            github: None,
            demo: None,
        }),
        None,
        false,
    );
    out
}

fn route_table<'a>(site: &'a Site, views: &[(GeneratedView, Markup)]) -> RouteTable<'a> {
    RouteTable {
        blogs: site.blogs.entities().iter().map(|e| e.slug.as_str()).collect(),
        projects: site.projects.entities().iter().map(|e| e.slug.as_str()).collect(),
        default_project_name: DevelopmentInfo::DEFAULT_NAME,
        titles: views
            .iter()
            .map(|(view, _)| (view.template_id.clone(), view.title.clone()))
            .collect(),
    }
}

/// Serialize for embedding in a `<script>` element.
fn script_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<usize> {
    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            fs::create_dir_all(&dst_path)?;
            copied += copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
            copied += 1;
        }
    }
    Ok(copied)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, band: ObservationBand, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body data-root-margin=(band.root_margin()) data-scroll-offset=(band.top_offset) {
                (content)
            }
        }
    }
}

/// Renders the site header with the section links
fn site_header(ctx: &ViewContext) -> Markup {
    let info = &ctx.site.config.site;
    html! {
        header.site-header {
            a.brand href=(PREFIX) { (info.title) }
            nav.site-nav {
                a href=(Route::Home.location()) data-section="home" { "Home" }
                a href=(Route::BlogIndex.location()) data-section="blog" { "Blog" }
                a href=(Route::ProjectIndex.location()) data-section="projects" { "Projects" }
                a href=(Route::Resume.location()) data-section="resume" { "Resume" }
            }
        }
    }
}

fn site_footer(ctx: &ViewContext) -> Markup {
    let info = &ctx.site.config.site;
    html! {
        footer.site-footer {
            @if !info.author.is_empty() {
                p { "© " (info.author) }
            }
        }
    }
}

fn render_shell(
    ctx: &ViewContext,
    views: &[(GeneratedView, Markup)],
    table: &RouteTable,
    css: &str,
) -> Result<Markup, serde_json::Error> {
    let table_json = script_json(table)?;
    let band = ObservationBand::from_config(&ctx.site.config.toc);
    let page_size = ctx.site.config.listing.page_size;
    let content = html! {
        (site_header(ctx))
        main #app data-page-size=(page_size) {
            // Without script the home view is what readers get.
            (views::render_route(ctx, &Route::Home, &ViewState::default()))
        }
        (site_footer(ctx))
        div #toast role="status" aria-live="polite" hidden {}
        @for (view, markup) in views {
            template id=(view.template_id) { (markup) }
        }
        script type="application/json" id="route-table" { (PreEscaped(table_json)) }
        script { (PreEscaped(JS)) }
    };
    Ok(base_document(&ctx.site.config.site.title, css, band, content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan;
    use crate::test_helpers::setup_fixtures;
    use tempfile::TempDir;

    fn build() -> (TempDir, TempDir, GenerateReport, String) {
        let content = setup_fixtures();
        let site = scan(content.path()).unwrap();
        let out = TempDir::new().unwrap();
        let report = generate(&site, out.path()).unwrap();
        let html = fs::read_to_string(out.path().join("index.html")).unwrap();
        (content, out, report, html)
    }

    #[test]
    fn shell_is_single_document() {
        let (_c, _o, _r, html) = build();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<main id="app""#));
        assert!(html.contains(r#"id="route-table""#));
    }

    #[test]
    fn every_entity_has_a_template() {
        let (content, _o, _r, html) = build();
        let site = scan(content.path()).unwrap();
        for post in site.blogs.entities() {
            assert!(html.contains(&format!(r#"<template id="view-post-{}">"#, post.slug)));
        }
        for project in site.projects.entities() {
            assert!(html.contains(&format!(r#"<template id="view-project-{}">"#, project.slug)));
        }
        assert!(html.contains(r#"<template id="view-fallback">"#));
        assert!(html.contains(r#"<template id="view-development">"#));
    }

    #[test]
    fn slugs_named_like_fixed_views_keep_ids_unique() {
        let content = setup_fixtures();
        for (rel, title) in [
            ("blog/900-fallback.json", "Fallback"),
            ("blog/901-index.json", "Index"),
            ("projects/900-index.json", "Index"),
            ("projects/901-projects.json", "Projects"),
        ] {
            fs::write(content.path().join(rel), format!(r#"{{"title": "{title}"}}"#)).unwrap();
        }
        let site = scan(content.path()).unwrap();
        let out = TempDir::new().unwrap();
        let report = generate(&site, out.path()).unwrap();
        let html = fs::read_to_string(out.path().join("index.html")).unwrap();

        for view in &report.views {
            let tag = format!(r#"<template id="{}">"#, view.template_id);
            assert_eq!(html.matches(&tag).count(), 1, "{}", view.template_id);
        }
        let fallback = report
            .views
            .iter()
            .find(|v| v.template_id == "view-fallback")
            .unwrap();
        assert_eq!(fallback.kind, None);
        assert!(html.contains(r#"<template id="view-post-fallback">"#));
        assert!(html.contains(r#"<template id="view-project-index">"#));
    }

    #[test]
    fn band_is_exposed_to_the_script() {
        let (_c, _o, _r, html) = build();
        assert!(html.contains(r#"data-root-margin="-100px 0px -80% 0px""#));
        assert!(html.contains(r#"data-scroll-offset="100""#));
    }

    #[test]
    fn colors_are_injected() {
        let (_c, _o, _r, html) = build();
        assert!(html.contains("--color-accent:"));
    }

    #[test]
    fn assets_are_copied() {
        let (_c, out, report, _html) = build();
        assert!(report.assets_copied >= 1);
        assert!(out.path().join("blogs/placeholder.svg").exists());
    }

    #[test]
    fn report_marks_unlisted_views() {
        let (_c, _o, report, _html) = build();
        let draft = report
            .views
            .iter()
            .find(|v| v.template_id == "view-post-draft-ideas")
            .unwrap();
        assert!(!draft.listed);
        assert_eq!(draft.location, "#/blog/draft-ideas");
    }

    #[test]
    fn script_json_escapes_closing_tags() {
        let json = script_json(&vec!["</script><script>alert(1)"]).unwrap();
        assert!(!json.contains("</"));
    }
}
