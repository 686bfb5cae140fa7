//! Page templates.
//!
//! One function per view, each returning the markup that goes inside the
//! shell's `<main>`. [`render_route`] picks the view for a resolved
//! [`Route`]. The shell and header live in [`crate::generate`].
//!
//! Views whose content depends on the location rather than on a record (the
//! generic post for an unknown blog slug and the development placeholder)
//! mark the parts that change with `data-slot`, so the shell script can fill
//! one pre-rendered template for any location.

use crate::comments::{self, CommentThread};
use crate::content::{ContentEntity, EntityKind};
use crate::listing::{self, PageItem, PageState, Placement};
use crate::naming;
use crate::render::{BlockRenderer, media_placeholder};
use crate::rich_text;
use crate::route::{DevelopmentInfo, Route, development_location};
use crate::scan::Site;
use crate::toc::{self, ObservationBand, TocEntry};
use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html as md_html};

pub const NO_POSTS: &str = "No posts found in this category.";
const HOME_CARDS: usize = 3;

/// Shared inputs of every view.
pub struct ViewContext<'a> {
    pub site: &'a Site,
    pub renderer: &'a BlockRenderer,
}

impl<'a> ViewContext<'a> {
    pub fn new(site: &'a Site, renderer: &'a BlockRenderer) -> Self {
        Self { site, renderer }
    }

    fn band(&self) -> ObservationBand {
        ObservationBand::from_config(&self.site.config.toc)
    }
}

/// Per-document UI state that changes what a view shows.
#[derive(Debug, Clone, Default)]
pub struct ViewState<'s> {
    pub active_section: Option<&'s str>,
    pub page: Option<&'s PageState>,
}

/// `id` of the shell `<template>` that holds the view for `route`.
///
/// Record views are `view-post-<slug>` and `view-project-<slug>`. The fixed
/// views use names that neither prefix can produce, so no slug can claim a
/// fixed view's id.
pub fn template_id(route: &Route) -> String {
    let prefix = naming::VIEW_ID_PREFIX;
    match route {
        Route::Home => format!("{prefix}home"),
        Route::BlogIndex => format!("{prefix}blogs"),
        Route::ProjectIndex => format!("{prefix}projects"),
        Route::Resume => format!("{prefix}resume"),
        Route::BlogPost(slug) => format!("{prefix}post-{slug}"),
        Route::BlogFallback(_) => format!("{prefix}fallback"),
        Route::ProjectDetail(slug) => format!("{prefix}project-{slug}"),
        Route::ExternalRedirectPending(_) | Route::NotFound(_) => format!("{prefix}development"),
    }
}

/// Document title for `route`.
pub fn page_title(ctx: &ViewContext, route: &Route) -> String {
    let site = &ctx.site.config.site.title;
    let entity_title = |kind: EntityKind, slug: &str| {
        ctx.site
            .registry(kind)
            .get(slug)
            .map(|e| e.title.clone())
            .unwrap_or_else(|| naming::display_title(slug))
    };
    match route {
        Route::Home => site.clone(),
        Route::BlogIndex => format!("Blog | {site}"),
        Route::ProjectIndex => format!("Projects | {site}"),
        Route::Resume => format!("Resume | {site}"),
        Route::BlogPost(slug) | Route::BlogFallback(slug) => {
            format!("{} | {site}", entity_title(EntityKind::Blog, slug))
        }
        Route::ProjectDetail(slug) => format!("{} | {site}", entity_title(EntityKind::Project, slug)),
        Route::ExternalRedirectPending(_) | Route::NotFound(_) => {
            format!("Still in Development | {site}")
        }
    }
}

/// The view for `route`.
pub fn render_route(ctx: &ViewContext, route: &Route, state: &ViewState) -> Markup {
    let page = state.page.cloned().unwrap_or_default();
    match route {
        Route::Home => home(ctx),
        Route::BlogIndex => index(ctx, EntityKind::Blog, &page),
        Route::ProjectIndex => index(ctx, EntityKind::Project, &page),
        Route::Resume => resume(ctx),
        Route::BlogPost(slug) => match ctx.site.blogs.get(slug) {
            Some(post) => blog_post(ctx, post, state.active_section),
            None => blog_fallback(ctx, slug),
        },
        Route::BlogFallback(slug) => blog_fallback(ctx, slug),
        Route::ProjectDetail(slug) => match ctx.site.projects.get(slug) {
            Some(project) => project_detail(ctx, project, state.active_section),
            None => not_found(slug),
        },
        Route::ExternalRedirectPending(info) => development(info),
        Route::NotFound(slug) => not_found(slug),
    }
}

// ============================================================================
// Shared pieces
// ============================================================================

fn page_header(label: &str, title: &str) -> Markup {
    html! {
        header.page-header {
            p.section-label { "// " (label) }
            h1 { (title) }
        }
    }
}

fn back_link(href: &str, text: &str) -> Markup {
    html! {
        a.back-link href=(href) { "← " (text) }
    }
}

fn hero_image(src: Option<&str>, alt: &str) -> Markup {
    html! {
        @match src {
            Some(src) => {
                img.hero-image src=(src) alt=(alt) loading="lazy" data-media;
            }
            None => { (media_placeholder()) }
        }
    }
}

/// Where a card's main link goes and whether it leaves the site.
fn card_target(kind: EntityKind, entity: &ContentEntity) -> (String, bool) {
    if let Some(external) = &entity.external_link {
        return (external.clone(), true);
    }
    match kind {
        EntityKind::Blog => (Route::entity_location(kind, &entity.slug), false),
        // A project without a body has nothing to show yet.
        EntityKind::Project if entity.blocks.is_empty() => (
            development_location(
                &entity.title,
                entity.github.as_deref(),
                entity.demo.as_deref(),
            ),
            false,
        ),
        EntityKind::Project => (Route::entity_location(kind, &entity.slug), false),
    }
}

fn blog_card(entity: &ContentEntity) -> Markup {
    let (href, external) = card_target(EntityKind::Blog, entity);
    html! {
        article.card.blog-card {
            div.card-media {
                (hero_image(entity.hero_image.as_deref(), &entity.title))
                @if !entity.category.is_empty() {
                    span.badge.category-badge { (entity.category) }
                }
            }
            div.card-body {
                h3 { (entity.title) }
                @if let Some(summary) = entity.summary() {
                    p.excerpt { (summary) }
                }
                div.card-meta {
                    @if let Some(author) = &entity.author {
                        span.author { (author) }
                    }
                    @if !entity.date.is_empty() {
                        span.date { (entity.date) }
                    }
                }
                a.button href=(href)
                    target=[external.then_some("_blank")]
                    rel=[external.then_some("noopener noreferrer")] {
                    "Read More →"
                }
            }
        }
    }
}

fn project_card(entity: &ContentEntity, position: usize) -> Markup {
    let (href, external) = card_target(EntityKind::Project, entity);
    let tags = if entity.technologies.is_empty() {
        &entity.tags
    } else {
        &entity.technologies
    };
    html! {
        article.card.project-card {
            div.card-media {
                (hero_image(entity.hero_image.as_deref(), &entity.title))
                @if !entity.category.is_empty() {
                    span.badge.category-badge { (entity.category) }
                }
                @if let Some(year) = &entity.year {
                    span.badge.year-badge { (year) }
                }
            }
            div.card-body {
                div.card-title {
                    h3 { (entity.title) }
                    span.card-number { (format!("{position:02}")) }
                }
                @if let Some(summary) = entity.summary() {
                    p.excerpt { (summary) }
                }
                (tag_list(tags, ""))
                div.card-actions {
                    a.button href=(href)
                        target=[external.then_some("_blank")]
                        rel=[external.then_some("noopener noreferrer")] {
                        "View Details"
                    }
                    @if let Some(github) = &entity.github {
                        a.button href=(github) target="_blank" rel="noopener noreferrer" { "Code" }
                    }
                    @if let Some(demo) = &entity.demo {
                        a.button href=(demo) target="_blank" rel="noopener noreferrer" { "Demo" }
                    }
                }
            }
        }
    }
}

fn card(kind: EntityKind, entity: &ContentEntity, position: usize) -> Markup {
    match kind {
        EntityKind::Blog => blog_card(entity),
        EntityKind::Project => project_card(entity, position),
    }
}

fn tag_list(tags: &[String], prefix: &str) -> Markup {
    html! {
        @if !tags.is_empty() {
            ul.tags {
                @for tag in tags {
                    li.tag { (prefix) (tag) }
                }
            }
        }
    }
}

/// Clickable index of a document's sections. `active` gets the highlight.
pub fn toc_nav(entries: &[TocEntry], band: ObservationBand, active: Option<&str>) -> Markup {
    html! {
        @if !entries.is_empty() {
            nav.toc aria-label="Table of contents"
                data-root-margin=(band.root_margin())
                data-scroll-offset=(band.top_offset) {
                p.section-label { "// CONTENTS" }
                ul {
                    @for entry in entries {
                        @let is_active = active == Some(entry.id.as_str());
                        li {
                            a.toc-link.active[is_active]
                                href={ "#" (entry.id) }
                                data-toc-id=(entry.id)
                                style={ "padding-left: " (entry.indent_px()) "px" } {
                                (entry.title)
                            }
                        }
                    }
                }
            }
        }
    }
}

fn document_body(ctx: &ViewContext, entity: &ContentEntity, active: Option<&str>) -> Markup {
    // Registries reject duplicate ids at load time.
    let entries = toc::derive_toc(&entity.blocks).unwrap_or_default();
    html! {
        div.document {
            aside.toc-column { (toc_nav(&entries, ctx.band(), active)) }
            article.document-body {
                (ctx.renderer.render(&entity.blocks))
            }
        }
    }
}

// ============================================================================
// Pages
// ============================================================================

pub fn home(ctx: &ViewContext) -> Markup {
    let info = &ctx.site.config.site;
    let section = |kind: EntityKind| {
        let listed = ctx.site.registry(kind).listed();
        let mut picks = listing::home_selection(&listed);
        if picks.is_empty() {
            picks = listing::sort_entities(&listed);
        }
        picks.truncate(HOME_CARDS);
        picks
    };
    let blogs = section(EntityKind::Blog);
    let projects = section(EntityKind::Project);
    html! {
        section.hero {
            @if let Some(avatar) = &info.author_avatar {
                img.avatar src=(avatar) alt=(info.author);
            }
            div.hero-text {
                h1 { (info.title) }
                @if !info.author.is_empty() {
                    p.hero-author { (info.author) }
                }
                @if !info.tagline.is_empty() {
                    p.tagline { (info.tagline) }
                }
                a.button href=(Route::Resume.location()) { "View Resume" }
            }
        }
        section.home-section {
            (page_header("WRITINGS", "Latest Articles"))
            div.card-grid {
                @for post in &blogs { (blog_card(post)) }
            }
            a.see-all href=(Route::BlogIndex.location()) { "View all articles →" }
        }
        section.home-section {
            (page_header("PORTFOLIO", "Featured Projects"))
            div.card-grid {
                @for (i, project) in projects.iter().enumerate() { (project_card(project, i + 1)) }
            }
            a.see-all href=(Route::ProjectIndex.location()) { "View all projects →" }
        }
    }
}

fn pagination_nav(category: &str, current: usize, total: usize) -> Markup {
    let Some(controls) = listing::pagination(current, total) else {
        return html! {};
    };
    html! {
        nav.pagination aria-label="Pagination" data-category=(category) {
            button.page-prev data-goto=[controls.previous] disabled[controls.previous.is_none()] {
                "← Previous"
            }
            @for item in &controls.items {
                @match item {
                    PageItem::Page { number, current } => {
                        button.page.current[*current] data-goto=(number)
                            aria-current=[current.then_some("page")] { (number) }
                    }
                    PageItem::Ellipsis => span.ellipsis { "..." },
                }
            }
            button.page-next data-goto=[controls.next] disabled[controls.next.is_none()] {
                "Next →"
            }
        }
    }
}

/// Blog or project index.
///
/// Every (category, page) combination is rendered; the one selected by
/// `state` is visible and the others carry `hidden` for the shell script to
/// toggle.
pub fn index(ctx: &ViewContext, kind: EntityKind, state: &PageState) -> Markup {
    let listed = ctx.site.registry(kind).listed();
    let page_size = ctx.site.config.listing.page_size;
    let categories = listing::categories(&listed);
    let featured = listing::featured(&listed, Placement::Index);
    let (label, title) = match kind {
        EntityKind::Blog => ("INSIGHTS", "Blog"),
        EntityKind::Project => ("PORTFOLIO", "Projects"),
    };

    // Clamp against what the selected category actually has.
    let selected = derive_for(&listed, state.selected_category(), state.current_page(), page_size);

    html! {
        section.index data-index=(kind.dir_name()) {
            (page_header(label, title))
            @match featured {
                Some(entity) => div.featured { (card(kind, entity, 1)) },
                None => p.empty { (NO_POSTS) },
            }
            div.category-filters role="group" aria-label="Categories" {
                @for category in &categories {
                    @let pressed = category == state.selected_category();
                    button.category.selected[pressed] data-category=(category)
                        aria-pressed=(if pressed { "true" } else { "false" }) { (category) }
                }
            }
            @for category in &categories {
                @let total = derive_for(&listed, category, 1, page_size).total_pages;
                @for page in 1..=total.max(1) {
                    @let view = derive_for(&listed, category, page, page_size);
                    @let shown = category == state.selected_category() && page == selected.current_page;
                    div.listing-page data-category=(category) data-page=(page) hidden[!shown] {
                        @if view.items.is_empty() {
                            p.empty { (NO_POSTS) }
                        } @else {
                            div.card-grid {
                                @for (i, entity) in view.items.iter().enumerate() {
                                    (card(kind, entity, (page - 1) * page_size + i + 1))
                                }
                            }
                        }
                        (pagination_nav(category, view.current_page, view.total_pages))
                    }
                }
            }
            @if !categories.iter().any(|c| c == state.selected_category()) {
                div.listing-page data-category=(state.selected_category()) data-page="1" {
                    p.empty { (NO_POSTS) }
                }
            }
        }
    }
}

fn derive_for<'a>(
    listed: &[&'a ContentEntity],
    category: &str,
    page: usize,
    page_size: usize,
) -> listing::PageView<'a> {
    listing::derive_page(listed, &PageState::with_page(category, page), page_size)
}

/// Markdown to HTML with raw HTML dropped.
pub fn markdown_to_html(markdown: &str) -> String {
    // One entry per open link or image: whether its tags were dropped.
    let mut unwrapped: Vec<bool> = Vec::new();
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .filter_map(move |event| match event {
            Event::Html(_) | Event::InlineHtml(_) => None,
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let safe = rich_text::safe_href(&dest_url);
                unwrapped.push(safe.is_none());
                safe.map(|dest| {
                    Event::Start(Tag::Link {
                        link_type,
                        dest_url: dest.into(),
                        title,
                        id,
                    })
                })
            }
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => {
                let safe = rich_text::safe_href(&dest_url);
                unwrapped.push(safe.is_none());
                safe.map(|dest| {
                    Event::Start(Tag::Image {
                        link_type,
                        dest_url: dest.into(),
                        title,
                        id,
                    })
                })
            }
            Event::End(end @ (TagEnd::Link | TagEnd::Image)) => {
                (!unwrapped.pop().unwrap_or(false)).then_some(Event::End(end))
            }
            other => Some(other),
        });
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

pub fn resume(ctx: &ViewContext) -> Markup {
    html! {
        section.resume {
            (page_header("PROFESSIONAL", "Resume"))
            @match &ctx.site.resume {
                Some(body) => article.resume-body { (PreEscaped(markdown_to_html(body))) },
                None => p.empty { "The resume is not available yet." },
            }
        }
    }
}

pub fn blog_post(ctx: &ViewContext, post: &ContentEntity, active: Option<&str>) -> Markup {
    let location = Route::BlogPost(post.slug.clone()).location();
    let info = &ctx.site.config.site;
    let avatar = post.author_avatar.as_ref().or(info.author_avatar.as_ref());
    let author = post.author.as_deref().unwrap_or(&info.author);
    html! {
        section.post {
            (back_link(&Route::BlogIndex.location(), "Back to Blog"))
            header.post-hero {
                @if let Some(src) = &post.hero_image {
                    img.hero-image src=(src) alt=(post.title) data-media;
                }
                div.post-info {
                    div.post-meta {
                        @if !post.category.is_empty() {
                            span.badge { (post.category) }
                        }
                        @if !post.date.is_empty() {
                            span.date { (post.date) }
                        }
                        @if let Some(read_time) = &post.read_time {
                            span.read-time { (read_time) }
                        }
                    }
                    h1 { (post.title) }
                    @if !author.is_empty() {
                        div.byline {
                            @if let Some(avatar) = avatar {
                                img.avatar src=(avatar) alt=(author);
                            }
                            p { span.section-label { "Written by" } " " (author) }
                        }
                    }
                    (tag_list(&post.tags, "#"))
                }
            }
            (document_body(ctx, post, active))
            (share_bar(ctx, &post.title, &location))
            (comments::render_container(&ctx.site.config.comments, &CommentThread::for_location(&location)))
        }
    }
}

fn share_bar(ctx: &ViewContext, title: &str, location: &str) -> Markup {
    let base = &ctx.site.config.site.base_url;
    html! {
        div.share data-title=(title) data-location=(location) data-base-url=(base) {
            p.section-label { "// SHARE THIS ARTICLE" }
            button.button data-share="x" { "X" }
            button.button data-share="linkedin" { "LinkedIn" }
            button.button data-share="copy" { "Copy Link" }
        }
    }
}

pub fn project_detail(ctx: &ViewContext, project: &ContentEntity, active: Option<&str>) -> Markup {
    html! {
        section.project {
            (back_link(&Route::ProjectIndex.location(), "Back to Projects"))
            header.post-hero {
                @if let Some(src) = &project.hero_image {
                    img.hero-image src=(src) alt=(project.title) data-media;
                }
                div.post-info {
                    div.post-meta {
                        @if !project.category.is_empty() {
                            span.badge { (project.category) }
                        }
                        @if let Some(year) = &project.year {
                            span.date { (year) }
                        }
                        @if let Some(duration) = &project.duration {
                            span.read-time { (duration) }
                        }
                    }
                    h1 { (project.title) }
                    (tag_list(&project.technologies, ""))
                    div.card-actions {
                        @if let Some(github) = &project.github {
                            a.button href=(github) target="_blank" rel="noopener noreferrer" { "View on GitHub" }
                        }
                        @if let Some(demo) = &project.demo {
                            a.button href=(demo) target="_blank" rel="noopener noreferrer" { "View Demo" }
                        }
                    }
                }
            }
            @if project.blocks.is_empty() {
                p.empty { "Details for this project are coming soon." }
            } @else {
                (document_body(ctx, project, active))
            }
        }
    }
}

/// Generic post view for a blog slug without a record.
pub fn blog_fallback(ctx: &ViewContext, slug: &str) -> Markup {
    let author = &ctx.site.config.site.author;
    html! {
        section.post.post-fallback {
            (back_link(&Route::BlogIndex.location(), "Back to Blog"))
            header.post-hero {
                div.post-info {
                    h1 data-slot="title" { (naming::display_title(slug)) }
                    @if !author.is_empty() {
                        div.byline { p { span.section-label { "Written by" } " " (author) } }
                    }
                }
            }
            article.document-body {
                p { "This article is still being written. Check back soon!" }
            }
        }
    }
}

/// "Still in development" placeholder for unpublished projects.
pub fn development(info: &DevelopmentInfo) -> Markup {
    let named = info.name != DevelopmentInfo::DEFAULT_NAME;
    html! {
        section.development {
            (back_link(&Route::ProjectIndex.location(), "Back to Projects"))
            div.development-box {
                h1 { "Still in Development" }
                p.lead { "This project is currently under active development. Check back soon for updates!" }
                div.development-project data-slot="project" hidden[!named] {
                    p.section-label { "// PROJECT" }
                    p.project-name data-slot="name" { (info.name) }
                }
                div.development-links {
                    p.section-label { "// RESOURCES" }
                    a.button data-slot="github" href=[info.github.as_deref()] hidden[info.github.is_none()]
                        target="_blank" rel="noopener noreferrer" { "View on GitHub" }
                    a.button data-slot="demo" href=[info.demo.as_deref()] hidden[info.demo.is_none()]
                        target="_blank" rel="noopener noreferrer" { "View Demo" }
                }
                p.info-box { "This project is actively being developed. Come back later to see the full version!" }
            }
        }
    }
}

/// Unknown project slug: the development placeholder named after the slug.
pub fn not_found(slug: &str) -> Markup {
    development(&DevelopmentInfo {
        name: naming::display_title(slug),
        github: None,
        demo: None,
    })
}
