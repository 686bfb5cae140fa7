//! Location fragment routing.
//!
//! The site is a single document; everything after `#/` in the location
//! picks the view. [`resolve`] is a pure function of the location and the two
//! registries and is re-run on every navigation, so the route is never
//! stored anywhere else.
//!
//! | Location | Route |
//! |----------|-------|
//! | `#/`, `#`, empty | [`Route::Home`] |
//! | `#/blog` | [`Route::BlogIndex`] |
//! | `#/blog/<slug>` | [`Route::BlogPost`], or [`Route::BlogFallback`] for an unknown slug |
//! | `#/projects` | [`Route::ProjectIndex`] |
//! | `#/project/<slug>` | [`Route::ProjectDetail`], or [`Route::NotFound`] for an unknown slug |
//! | `#/resume` | [`Route::Resume`] |
//! | `#/development?name=&github=&demo=` | [`Route::ExternalRedirectPending`] |
//! | anything else | [`Route::Home`] |
//!
//! A second `#` starts an in-document anchor (`#/blog/<slug>#<heading>`) and
//! does not take part in routing.
//!
//! The two unknown-slug outcomes differ on purpose: a blog slug without a
//! record still gets the generic post template, while a project slug
//! without one gets the "still in development" placeholder.

use crate::content::EntityKind;
use crate::scan::Registry;
use url::form_urlencoded;

pub const PREFIX: &str = "#/";

/// Parameters of the development placeholder for unpublished projects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevelopmentInfo {
    pub name: String,
    pub github: Option<String>,
    pub demo: Option<String>,
}

impl DevelopmentInfo {
    pub const DEFAULT_NAME: &'static str = "Project";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    BlogIndex,
    ProjectIndex,
    Resume,
    BlogPost(String),
    /// Generic post template for a blog slug with no record.
    BlogFallback(String),
    ProjectDetail(String),
    ExternalRedirectPending(DevelopmentInfo),
    /// A project slug with no record.
    NotFound(String),
}

impl Route {
    /// Canonical location for this route.
    pub fn location(&self) -> String {
        match self {
            Route::Home => PREFIX.to_string(),
            Route::BlogIndex => format!("{PREFIX}blog"),
            Route::ProjectIndex => format!("{PREFIX}projects"),
            Route::Resume => format!("{PREFIX}resume"),
            Route::BlogPost(slug) | Route::BlogFallback(slug) => format!("{PREFIX}blog/{slug}"),
            Route::ProjectDetail(slug) | Route::NotFound(slug) => {
                format!("{PREFIX}project/{slug}")
            }
            Route::ExternalRedirectPending(info) => {
                development_location(&info.name, info.github.as_deref(), info.demo.as_deref())
            }
        }
    }

    /// Location of this route scrolled to heading `id`.
    pub fn anchored_location(&self, id: &str) -> String {
        format!("{}#{id}", self.location())
    }

    /// Location of an entity's detail view.
    pub fn entity_location(kind: EntityKind, slug: &str) -> String {
        match kind {
            EntityKind::Blog => Route::BlogPost(slug.to_string()).location(),
            EntityKind::Project => Route::ProjectDetail(slug.to_string()).location(),
        }
    }

    /// The nav section this route belongs to, for highlighting the header.
    pub fn section(&self) -> Option<EntityKind> {
        match self {
            Route::BlogIndex | Route::BlogPost(_) | Route::BlogFallback(_) => Some(EntityKind::Blog),
            Route::ProjectIndex
            | Route::ProjectDetail(_)
            | Route::NotFound(_)
            | Route::ExternalRedirectPending(_) => Some(EntityKind::Project),
            Route::Home | Route::Resume => None,
        }
    }
}

/// Build a development placeholder location with percent-encoded parameters.
pub fn development_location(name: &str, github: Option<&str>, demo: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("name", name);
    if let Some(github) = github {
        query.append_pair("github", github);
    }
    if let Some(demo) = demo {
        query.append_pair("demo", demo);
    }
    format!("{PREFIX}development?{}", query.finish())
}

/// Map a raw location to a route.
///
/// Slug matching is exact and case-sensitive. A trailing `/` is ignored, so
/// `#/blog/` is the blog index.
pub fn resolve(location: &str, blogs: &Registry, projects: &Registry) -> Route {
    let remainder = location
        .strip_prefix(PREFIX)
        .or_else(|| location.strip_prefix('#'))
        .unwrap_or(location);
    let remainder = match remainder.split_once('#') {
        Some((before, _anchor)) => before,
        None => remainder,
    };
    let (path, query) = match remainder.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (remainder, None),
    };
    let path = path.trim_end_matches('/');

    if let Some(slug) = path.strip_prefix("project/") {
        return if projects.contains(slug) {
            Route::ProjectDetail(slug.to_string())
        } else {
            Route::NotFound(slug.to_string())
        };
    }
    if let Some(slug) = path.strip_prefix("blog/") {
        return if blogs.contains(slug) {
            Route::BlogPost(slug.to_string())
        } else {
            Route::BlogFallback(slug.to_string())
        };
    }

    match path {
        "blog" => Route::BlogIndex,
        "projects" => Route::ProjectIndex,
        "resume" => Route::Resume,
        "development" => Route::ExternalRedirectPending(parse_development(query.unwrap_or(""))),
        _ => Route::Home,
    }
}

fn parse_development(query: &str) -> DevelopmentInfo {
    let mut info = DevelopmentInfo {
        name: DevelopmentInfo::DEFAULT_NAME.to_string(),
        github: None,
        demo: None,
    };
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        if value.is_empty() {
            continue;
        }
        match key.as_ref() {
            "name" => info.name = value.into_owned(),
            "github" => info.github = Some(value.into_owned()),
            "demo" => info.demo = Some(value.into_owned()),
            _ => {}
        }
    }
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{entity, registry};

    fn registries() -> (Registry, Registry) {
        let blogs = registry(
            EntityKind::Blog,
            vec![entity("react-performance"), entity("pytorch-course")],
        );
        let mut hidden = entity("old-tool");
        hidden.active = false;
        let projects = registry(EntityKind::Project, vec![entity("folio"), hidden]);
        (blogs, projects)
    }

    fn r(location: &str) -> Route {
        let (blogs, projects) = registries();
        resolve(location, &blogs, &projects)
    }

    #[test]
    fn home_variants() {
        for location in ["", "#", "#/", "#/unknown", "#/blogs", "#/Blog"] {
            assert_eq!(r(location), Route::Home, "location {location:?}");
        }
    }

    #[test]
    fn literal_routes() {
        assert_eq!(r("#/blog"), Route::BlogIndex);
        assert_eq!(r("#/projects"), Route::ProjectIndex);
        assert_eq!(r("#/resume"), Route::Resume);
        assert_eq!(r("#/blog/"), Route::BlogIndex);
    }

    #[test]
    fn every_project_slug_round_trips() {
        let (blogs, projects) = registries();
        for entity in projects.entities() {
            let route = resolve(&format!("#/project/{}", entity.slug), &blogs, &projects);
            assert_eq!(route, Route::ProjectDetail(entity.slug.clone()));
            assert_eq!(resolve(&route.location(), &blogs, &projects), route);
        }
    }

    #[test]
    fn inactive_project_still_resolves() {
        assert_eq!(r("#/project/old-tool"), Route::ProjectDetail("old-tool".to_string()));
    }

    #[test]
    fn unknown_project_is_not_found() {
        assert_eq!(r("#/project/nope"), Route::NotFound("nope".to_string()));
    }

    #[test]
    fn unknown_blog_slug_is_fallback_never_not_found() {
        for slug in ["nope", "React-Performance", "react", "react-performance-x"] {
            assert_eq!(
                r(&format!("#/blog/{slug}")),
                Route::BlogFallback(slug.to_string())
            );
        }
    }

    #[test]
    fn registries_are_separate_namespaces() {
        assert_eq!(r("#/blog/folio"), Route::BlogFallback("folio".to_string()));
        assert_eq!(r("#/project/react-performance"), Route::NotFound("react-performance".to_string()));
    }

    #[test]
    fn known_blog_slug() {
        assert_eq!(r("#/blog/pytorch-course"), Route::BlogPost("pytorch-course".to_string()));
    }

    #[test]
    fn development_params_are_decoded() {
        let route = r("#/development?name=My%20Tool&github=https%3A%2F%2Fgithub.com%2Fme%2Ftool&demo=");
        assert_eq!(
            route,
            Route::ExternalRedirectPending(DevelopmentInfo {
                name: "My Tool".to_string(),
                github: Some("https://github.com/me/tool".to_string()),
                demo: None,
            })
        );
    }

    #[test]
    fn development_name_defaults() {
        assert_eq!(
            r("#/development"),
            Route::ExternalRedirectPending(DevelopmentInfo {
                name: "Project".to_string(),
                github: None,
                demo: None,
            })
        );
    }

    #[test]
    fn development_location_round_trips() {
        let info = DevelopmentInfo {
            name: "A & B?".to_string(),
            github: Some("https://github.com/x/y".to_string()),
            demo: Some("https://x.dev/#top".to_string()),
        };
        let route = Route::ExternalRedirectPending(info);
        let location = route.location();
        assert!(location.starts_with("#/development?name="));
        assert_eq!(r(&location), route);
    }

    #[test]
    fn anchor_does_not_change_route() {
        let route = Route::BlogPost("react-performance".to_string());
        let anchored = route.anchored_location("introduction");
        assert_eq!(anchored, "#/blog/react-performance#introduction");
        assert_eq!(r(&anchored), route);
        assert_eq!(r("#/#top"), Route::Home);
    }

    #[test]
    fn query_is_ignored_elsewhere() {
        assert_eq!(r("#/blog?page=2"), Route::BlogIndex);
    }

    #[test]
    fn sections() {
        assert_eq!(Route::BlogFallback("x".into()).section(), Some(EntityKind::Blog));
        assert_eq!(Route::NotFound("x".into()).section(), Some(EntityKind::Project));
        assert_eq!(Route::Resume.section(), None);
    }
}
