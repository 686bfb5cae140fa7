//! Filtering, ordering and paging of entity listings.
//!
//! The blog and project indexes show a category filter, a featured entity and
//! a paged grid of cards. All of that is derived here from the listed
//! entities (see [`crate::scan::Registry::listed`]) and a small [`PageState`]
//! owned by the index view.
//!
//! Ordering is by `display_order` ascending with entities lacking one last;
//! the sort is stable, so ties keep registry order.

use crate::content::ContentEntity;

/// Category value that matches every entity.
pub const ALL_CATEGORIES: &str = "ALL";

/// Sort key for entities without an explicit display order.
pub const MISSING_ORDER: i64 = i64::MAX;

/// Filter and page selection of one index view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    selected_category: String,
    current_page: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            selected_category: ALL_CATEGORIES.to_string(),
            current_page: 1,
        }
    }
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(category: &str, page: usize) -> Self {
        Self {
            selected_category: category.to_string(),
            current_page: page.max(1),
        }
    }

    pub fn selected_category(&self) -> &str {
        &self.selected_category
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Switch category. Always returns to page 1, even when re-selecting
    /// the current category.
    pub fn select_category(&mut self, category: &str) {
        self.selected_category = category.to_string();
        self.current_page = 1;
    }

    /// Move to `page`, clamped to `1..=total_pages`.
    pub fn go_to_page(&mut self, page: usize, total_pages: usize) {
        self.current_page = page.clamp(1, total_pages.max(1));
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView<'a> {
    pub items: Vec<&'a ContentEntity>,
    pub total_pages: usize,
    /// Page actually shown after clamping.
    pub current_page: usize,
}

fn order_key(entity: &ContentEntity) -> i64 {
    entity.display_order.unwrap_or(MISSING_ORDER)
}

/// Stable sort by display order.
pub fn sort_entities<'a>(entities: &[&'a ContentEntity]) -> Vec<&'a ContentEntity> {
    let mut sorted = entities.to_vec();
    sorted.sort_by_key(|e| order_key(e));
    sorted
}

fn matches_category(entity: &ContentEntity, category: &str) -> bool {
    category == ALL_CATEGORIES || entity.category == category
}

/// Filter, sort and slice `entities` for `state`.
///
/// A page past the end is clamped to the last page, so a non-empty result
/// never renders as an empty page. No matching entities gives
/// `total_pages == 0` and no items.
pub fn derive_page<'a>(
    entities: &[&'a ContentEntity],
    state: &PageState,
    page_size: usize,
) -> PageView<'a> {
    let page_size = page_size.max(1);
    let filtered: Vec<&ContentEntity> = entities
        .iter()
        .copied()
        .filter(|e| matches_category(e, state.selected_category()))
        .collect();
    let sorted = sort_entities(&filtered);

    let total_pages = sorted.len().div_ceil(page_size);
    let current_page = state.current_page().clamp(1, total_pages.max(1));
    let start = (current_page - 1) * page_size;
    let items = sorted.into_iter().skip(start).take(page_size).collect();

    PageView {
        items,
        total_pages,
        current_page,
    }
}

/// `ALL` followed by each distinct category in first-seen order.
pub fn categories(entities: &[&ContentEntity]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for entity in entities {
        if !entity.category.is_empty() && !out.contains(&entity.category) {
            out.push(entity.category.clone());
        }
    }
    out
}

/// Where a featured entity is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Home,
    Index,
}

/// First sorted entity flagged for `placement`, else the first sorted entity.
///
/// `None` only for an empty collection.
pub fn featured<'a>(entities: &[&'a ContentEntity], placement: Placement) -> Option<&'a ContentEntity> {
    let sorted = sort_entities(entities);
    let flagged = |e: &&ContentEntity| match placement {
        Placement::Home => e.featured_on_home,
        Placement::Index => e.featured_on_index,
    };
    sorted
        .iter()
        .find(|e| flagged(e))
        .or_else(|| sorted.first())
        .copied()
}

/// All entities flagged for the home page, sorted.
pub fn home_selection<'a>(entities: &[&'a ContentEntity]) -> Vec<&'a ContentEntity> {
    sort_entities(entities)
        .into_iter()
        .filter(|e| e.featured_on_home)
        .collect()
}

/// One slot of the pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page { number: usize, current: bool },
    Ellipsis,
}

/// Pagination bar: previous/next targets plus the visible page slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationControls {
    pub previous: Option<usize>,
    pub next: Option<usize>,
    pub items: Vec<PageItem>,
}

/// Build the pagination bar, or `None` when there is at most one page.
///
/// First, last, current and its direct neighbours are shown; pages two away
/// from current become an ellipsis and the rest are omitted.
pub fn pagination(current: usize, total: usize) -> Option<PaginationControls> {
    if total <= 1 {
        return None;
    }
    let current = current.clamp(1, total);
    let mut items = Vec::new();
    for page in 1..=total {
        let near = page + 1 >= current && page <= current + 1;
        if page == 1 || page == total || near {
            items.push(PageItem::Page {
                number: page,
                current: page == current,
            });
        } else if page + 2 == current || page == current + 2 {
            items.push(PageItem::Ellipsis);
        }
    }
    Some(PaginationControls {
        previous: (current > 1).then(|| current - 1),
        next: (current < total).then(|| current + 1),
        items,
    })
}
