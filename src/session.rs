//! Runtime model of the single-page app.
//!
//! A [`Session`] is what the shell script does in the browser, expressed as
//! plain state transitions: a location change resolves a route and mounts a
//! document, observer reports move the active TOC entry, link clicks either
//! scroll within the document or navigate, and share actions produce toast
//! notifications. Everything runs on one thread, one event at a time.
//!
//! Each navigation bumps a generation counter. Events carry the generation
//! they were produced under; a report from a document that has since been
//! replaced is ignored, so the latest location always wins.

use crate::comments::{CommentMount, CommentThread, MountAction};
use crate::content::EntityKind;
use crate::highlight::HighlightError;
use crate::listing::{self, PageState};
use crate::observer::{ObserverHub, Subscription};
use crate::render::BlockRenderer;
use crate::route::{self, Route};
use crate::scan::Site;
use crate::share::{self, Clipboard, Notification, ShareTarget, WindowOpener};
use crate::toc::{
    self, Intersection, ObservationBand, ScrollOutcome, ScrollRequest, SectionNavigator, TocEntry,
};
use crate::views::{self, ViewContext, ViewState};
use maud::Markup;

/// What a click on a link inside the current document does.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkAction {
    /// In-document anchor: smooth scroll, route untouched.
    Scroll(ScrollRequest),
    /// Anchor to a heading this document does not have.
    Ignored,
    /// App location: the route was re-resolved.
    Navigate(Route),
    /// Anything else leaves the app.
    External(String),
}

/// The document currently on screen.
#[derive(Debug)]
pub struct MountedDocument {
    generation: u64,
    route: Route,
    navigator: Option<SectionNavigator>,
    subscription: Option<Subscription>,
    page: Option<PageState>,
}

impl MountedDocument {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn navigator(&self) -> Option<&SectionNavigator> {
        self.navigator.as_ref()
    }

    pub fn page(&self) -> Option<&PageState> {
        self.page.as_ref()
    }

    /// Hand the document its TOC entries. The observer subscription is
    /// created on first supply and replaced only when the id set changes.
    pub fn supply_toc(&mut self, hub: &ObserverHub, entries: &[TocEntry], band: ObservationBand) {
        match &mut self.navigator {
            Some(navigator) => {
                if navigator.replace_entries(entries) {
                    self.subscription = Some(hub.subscribe(navigator.ids().to_vec()));
                }
            }
            None => {
                let navigator = SectionNavigator::new(entries, band);
                self.subscription = Some(hub.subscribe(navigator.ids().to_vec()));
                self.navigator = Some(navigator);
            }
        }
    }
}

/// Notifications kept for display; older ones are dropped.
pub const NOTIFICATION_LIMIT: usize = 8;

pub struct Session<'a> {
    site: &'a Site,
    renderer: BlockRenderer,
    hub: ObserverHub,
    generation: u64,
    location: String,
    document: MountedDocument,
    comments: CommentMount,
    notifications: Vec<Notification>,
}

impl<'a> Session<'a> {
    /// Start at `location`.
    pub fn new(site: &'a Site, location: &str) -> Result<Self, HighlightError> {
        let renderer = BlockRenderer::new(&site.config.code)?;
        let hub = ObserverHub::new();
        let mut comments = CommentMount::new();
        let route = route::resolve(location, &site.blogs, &site.projects);
        let document = mount(site, &hub, &mut comments, route, 1);
        Ok(Self {
            site,
            renderer,
            hub,
            generation: 1,
            location: location.to_string(),
            document,
            comments,
            notifications: Vec::new(),
        })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Location as currently shown in the address bar.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn route(&self) -> &Route {
        &self.document.route
    }

    pub fn document(&self) -> &MountedDocument {
        &self.document
    }

    pub fn hub(&self) -> &ObserverHub {
        &self.hub
    }

    pub fn comments(&self) -> Option<&CommentThread> {
        self.comments.current()
    }

    /// Recent notifications, oldest first. At most [`NOTIFICATION_LIMIT`].
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Hand the pending notifications to the toast and clear them.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn active_section(&self) -> Option<&str> {
        self.document.navigator.as_ref().and_then(|n| n.active())
    }

    /// Location changed. Re-resolves from scratch and replaces the document.
    /// Returns the new generation.
    pub fn navigate(&mut self, location: &str) -> u64 {
        self.generation += 1;
        self.location = location.to_string();
        let route = route::resolve(location, &self.site.blogs, &self.site.projects);
        log::debug!("navigate {location} -> {route:?} (generation {})", self.generation);
        // The old document, and with it its observer subscription, goes first.
        self.document.subscription = None;
        self.document = mount(
            self.site,
            &self.hub,
            &mut self.comments,
            route,
            self.generation,
        );
        self.generation
    }

    /// A link in the current document was clicked. `document_top` is the
    /// target heading's offset from the document top, for anchors.
    pub fn click_link(&mut self, href: &str, document_top: f64) -> LinkAction {
        if href.starts_with(route::PREFIX) || href == "#" {
            self.navigate(href);
            return LinkAction::Navigate(self.document.route.clone());
        }
        if let Some(id) = href.strip_prefix('#') {
            let request = self
                .document
                .navigator
                .as_mut()
                .and_then(|n| n.scroll_to_section(id, document_top));
            return match request {
                Some(request) => {
                    self.location = self.document.route.anchored_location(id);
                    LinkAction::Scroll(request)
                }
                None => LinkAction::Ignored,
            };
        }
        LinkAction::External(href.to_string())
    }

    /// Observer reports produced under `generation`. Reports from an older
    /// document are dropped. Returns the new active id if it changed.
    pub fn on_intersections(&mut self, generation: u64, batch: &[Intersection]) -> Option<String> {
        if generation != self.generation {
            log::debug!(
                "dropping {} stale intersection reports (generation {generation}, current {})",
                batch.len(),
                self.generation
            );
            return None;
        }
        let subscription = self.document.subscription.as_ref()?.id();
        let mine: Vec<Intersection> = self
            .hub
            .dispatch(batch)
            .into_iter()
            .filter(|(id, _)| *id == subscription)
            .flat_map(|(_, reports)| reports)
            .collect();
        let navigator = self.document.navigator.as_mut()?;
        navigator.observe(&mine).map(str::to_string)
    }

    /// A smooth scroll came to rest.
    pub fn scroll_settled(&mut self, generation: u64, ticket: u64) -> ScrollOutcome {
        if generation != self.generation {
            return ScrollOutcome::Superseded;
        }
        match self.document.navigator.as_mut() {
            Some(navigator) => navigator.settle(ticket),
            None => ScrollOutcome::Superseded,
        }
    }

    /// Category filter clicked on an index page.
    pub fn select_category(&mut self, category: &str) {
        if let Some(page) = self.document.page.as_mut() {
            page.select_category(category);
        }
    }

    /// Page button clicked on an index page.
    pub fn go_to_page(&mut self, page_number: usize) {
        let Some(kind) = index_kind(&self.document.route) else {
            return;
        };
        let Some(page) = self.document.page.as_mut() else {
            return;
        };
        let listed = self.site.registry(kind).listed();
        let view = listing::derive_page(&listed, page, self.site.config.listing.page_size);
        page.go_to_page(page_number, view.total_pages);
    }

    pub fn copy_link(&mut self, clipboard: &mut impl Clipboard) -> &Notification {
        let location = self.document.route.location();
        let note = share::copy_link(clipboard, &self.site.config.site.base_url, &location);
        self.push(note)
    }

    pub fn share(&mut self, opener: &mut impl WindowOpener, target: ShareTarget) -> Option<&Notification> {
        let location = self.document.route.location();
        let title = views::page_title(&self.view_context(), &self.document.route);
        let note = share::share(
            opener,
            target,
            &title,
            &self.site.config.site.base_url,
            &location,
        )?;
        Some(self.push(note))
    }

    fn push(&mut self, note: Notification) -> &Notification {
        if self.notifications.len() >= NOTIFICATION_LIMIT {
            self.notifications.remove(0);
        }
        self.notifications.push(note);
        &self.notifications[self.notifications.len() - 1]
    }

    fn view_context(&self) -> ViewContext<'_> {
        ViewContext::new(self.site, &self.renderer)
    }

    /// Markup of the current document with its live UI state.
    pub fn render(&self) -> Markup {
        let state = ViewState {
            active_section: self.active_section(),
            page: self.document.page.as_ref(),
        };
        views::render_route(&self.view_context(), &self.document.route, &state)
    }
}

fn index_kind(route: &Route) -> Option<EntityKind> {
    match route {
        Route::BlogIndex => Some(EntityKind::Blog),
        Route::ProjectIndex => Some(EntityKind::Project),
        _ => None,
    }
}

fn mount(
    site: &Site,
    hub: &ObserverHub,
    comments: &mut CommentMount,
    route: Route,
    generation: u64,
) -> MountedDocument {
    let mut document = MountedDocument {
        generation,
        page: index_kind(&route).map(|_| PageState::new()),
        route,
        navigator: None,
        subscription: None,
    };

    let entity = match &document.route {
        Route::BlogPost(slug) => site.blogs.get(slug),
        Route::ProjectDetail(slug) => site.projects.get(slug),
        _ => None,
    };
    if let Some(entity) = entity {
        // Registries reject duplicate ids at load time.
        let entries = toc::derive_toc(&entity.blocks).unwrap_or_default();
        let band = ObservationBand::from_config(&site.config.toc);
        document.supply_toc(hub, &entries, band);
    }

    match &document.route {
        Route::BlogPost(_) if site.config.comments.enabled => {
            let thread = CommentThread::for_location(&document.route.location());
            if comments.sync(&thread) == MountAction::Keep {
                log::debug!("comment thread {} already attached", thread.identifier);
            }
        }
        _ => comments.detach(),
    }
    document
}
