//! Table of contents and active-section tracking.
//!
//! [`derive_toc`] turns a document's headings into TOC entries. The
//! [`SectionNavigator`] is the per-document state machine behind the TOC:
//! it knows which heading is active, reacts to intersection reports from the
//! scroll observer, and issues scroll requests when an entry is clicked.
//!
//! ```text
//!                 intersection(id, entering band)
//!   ┌──────────┐ ───────────────────────────────▶ ┌────────┐
//!   │ inactive │                                  │ active │
//!   └──────────┘ ◀─────────────────────────────── └────────┘
//!                 another heading enters the band
//! ```
//!
//! Clicking an entry does not touch the active heading. It produces a
//! [`ScrollRequest`] with a ticket; a newer click supersedes it, and the
//! active heading only changes once the scroll has moved the target into the
//! observation band and the observer reports it.

use crate::config::TocConfig;
use crate::content::{ContentBlock, HeadingLevel};
use crate::naming;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TocError {
    #[error("duplicate heading id '{0}'")]
    DuplicateId(String),
    #[error("heading id '{0}' is reserved for the page shell")]
    ReservedId(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    pub id: String,
    pub title: String,
    pub level: HeadingLevel,
}

impl TocEntry {
    /// Left indentation of the entry in the TOC, in pixels.
    pub fn indent_px(&self) -> u32 {
        u32::from(self.level.number() - 2) * 12
    }
}

/// One entry per heading that carries an id, in document order.
///
/// Two headings sharing an id would make both the anchor and the TOC key
/// ambiguous, so that is an error. So is an id the shell uses for its own
/// elements (see [`naming::is_reserved_id`]).
pub fn derive_toc(blocks: &[ContentBlock]) -> Result<Vec<TocEntry>, TocError> {
    let mut entries: Vec<TocEntry> = Vec::new();
    for block in blocks {
        if let ContentBlock::Heading {
            level,
            id: Some(id),
            text,
        } = block
        {
            if naming::is_reserved_id(id) {
                return Err(TocError::ReservedId(id.clone()));
            }
            if entries.iter().any(|e| &e.id == id) {
                return Err(TocError::DuplicateId(id.clone()));
            }
            entries.push(TocEntry {
                id: id.clone(),
                title: text.plain_text(),
                level: *level,
            });
        }
    }
    Ok(entries)
}

/// The viewport region in which a heading counts as "in view".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationBand {
    /// Pixels below the viewport top where the band starts. Also where a
    /// heading lands after [`SectionNavigator::scroll_to_section`].
    pub top_offset: u32,
    /// Fraction of the viewport height, from the bottom, outside the band.
    pub bottom_ratio: f64,
}

impl Default for ObservationBand {
    fn default() -> Self {
        Self::from_config(&TocConfig::default())
    }
}

impl ObservationBand {
    pub fn from_config(config: &TocConfig) -> Self {
        Self {
            top_offset: config.scroll_offset,
            bottom_ratio: config.band_bottom_ratio,
        }
    }

    /// The band as an `IntersectionObserver` root margin.
    pub fn root_margin(&self) -> String {
        format!(
            "-{}px 0px -{}% 0px",
            self.top_offset,
            (self.bottom_ratio * 100.0).round() as u32
        )
    }

    /// Whether an element whose top edge is `top` pixels below the viewport
    /// top lies inside the band of a viewport `viewport_height` pixels tall.
    pub fn contains(&self, top: f64, viewport_height: f64) -> bool {
        let start = f64::from(self.top_offset);
        let end = viewport_height * (1.0 - self.bottom_ratio);
        top >= start && top < end
    }

    /// Document scroll position that puts an element at `document_top`
    /// exactly `top_offset` pixels below the viewport top.
    pub fn scroll_target(&self, document_top: f64) -> f64 {
        (document_top - f64::from(self.top_offset)).max(0.0)
    }
}

/// One observer report for one heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub id: String,
    pub is_intersecting: bool,
}

impl Intersection {
    pub fn entering(id: &str) -> Self {
        Self {
            id: id.to_string(),
            is_intersecting: true,
        }
    }

    pub fn leaving(id: &str) -> Self {
        Self {
            id: id.to_string(),
            is_intersecting: false,
        }
    }
}

/// A smooth scroll the view should start.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollRequest {
    pub ticket: u64,
    pub id: String,
    pub target_y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// The latest request finished.
    Settled,
    /// A newer request replaced this one; the report is ignored.
    Superseded,
}

/// Active-heading state for one mounted document.
#[derive(Debug)]
pub struct SectionNavigator {
    ids: Vec<String>,
    active: Option<usize>,
    band: ObservationBand,
    next_ticket: u64,
    pending: Option<ScrollRequest>,
}

impl SectionNavigator {
    pub fn new(entries: &[TocEntry], band: ObservationBand) -> Self {
        Self {
            ids: entries.iter().map(|e| e.id.clone()).collect(),
            active: None,
            band,
            next_ticket: 1,
            pending: None,
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn band(&self) -> ObservationBand {
        self.band
    }

    pub fn active(&self) -> Option<&str> {
        self.active.map(|i| self.ids[i].as_str())
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active() == Some(id)
    }

    /// Apply a batch of observer reports in order.
    ///
    /// Every heading entering the band becomes active, so the last entering
    /// heading of the batch wins. Reports for headings leaving the band and
    /// for unknown ids change nothing. Returns the new active id if it changed.
    pub fn observe(&mut self, batch: &[Intersection]) -> Option<&str> {
        let before = self.active;
        for report in batch.iter().filter(|r| r.is_intersecting) {
            match self.ids.iter().position(|id| *id == report.id) {
                Some(index) => self.active = Some(index),
                None => log::debug!("intersection for unknown heading '{}'", report.id),
            }
        }
        if self.active != before {
            self.active()
        } else {
            None
        }
    }

    /// Request a smooth scroll to heading `id`, whose top edge sits
    /// `document_top` pixels from the top of the document.
    ///
    /// Returns `None` for ids that are not in this document. The active
    /// heading is left as is.
    pub fn scroll_to_section(&mut self, id: &str, document_top: f64) -> Option<ScrollRequest> {
        if !self.ids.iter().any(|known| known == id) {
            log::debug!("scroll request for unknown heading '{id}'");
            return None;
        }
        let request = ScrollRequest {
            ticket: self.next_ticket,
            id: id.to_string(),
            target_y: self.band.scroll_target(document_top),
        };
        self.next_ticket += 1;
        if let Some(previous) = self.pending.replace(request.clone()) {
            log::debug!("scroll to '{}' superseded by '{id}'", previous.id);
        }
        Some(request)
    }

    /// The scroll currently in flight, if any.
    pub fn pending(&self) -> Option<&ScrollRequest> {
        self.pending.as_ref()
    }

    /// Report that the scroll for `ticket` has come to rest.
    pub fn settle(&mut self, ticket: u64) -> ScrollOutcome {
        match &self.pending {
            Some(request) if request.ticket == ticket => {
                self.pending = None;
                ScrollOutcome::Settled
            }
            _ => ScrollOutcome::Superseded,
        }
    }

    /// Swap in a new heading set. Returns `true` when the id set changed,
    /// in which case the active heading and any pending scroll are cleared
    /// and the caller must re-subscribe the observer.
    pub fn replace_entries(&mut self, entries: &[TocEntry]) -> bool {
        let ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
        if ids == self.ids {
            return false;
        }
        self.ids = ids;
        self.active = None;
        self.pending = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich_text::RichText;

    fn heading(level: u8, id: Option<&str>, text: &str) -> ContentBlock {
        ContentBlock::Heading {
            level: HeadingLevel::from_number(level).unwrap(),
            id: id.map(str::to_string),
            text: RichText::parse(text),
        }
    }

    fn paragraph(text: &str) -> ContentBlock {
        ContentBlock::Paragraph {
            text: RichText::parse(text),
        }
    }

    fn entries(ids: &[&str]) -> Vec<TocEntry> {
        ids.iter()
            .map(|id| TocEntry {
                id: id.to_string(),
                title: id.to_string(),
                level: HeadingLevel::H2,
            })
            .collect()
    }

    // =========================================================================
    // derive_toc
    // =========================================================================

    #[test]
    fn toc_is_id_carrying_headings_in_order() {
        let blocks = vec![
            heading(2, Some("intro"), "Introduction"),
            paragraph("p"),
            heading(3, None, "No anchor"),
            heading(3, Some("memo"), "<strong>Memo</strong>ization"),
            heading(4, Some("deep"), "Deep"),
        ];
        let toc = derive_toc(&blocks).unwrap();
        let ids: Vec<&str> = toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "memo", "deep"]);
        assert_eq!(toc[1].title, "Memoization");
        assert_eq!(toc[1].level, HeadingLevel::H3);
    }

    #[test]
    fn duplicate_heading_id_is_rejected() {
        let blocks = vec![heading(2, Some("a"), "A"), heading(3, Some("a"), "Again")];
        assert_eq!(derive_toc(&blocks), Err(TocError::DuplicateId("a".to_string())));
    }

    #[test]
    fn shell_ids_cannot_be_heading_ids() {
        let blocks = vec![heading(2, Some("view-home"), "Home")];
        assert_eq!(derive_toc(&blocks), Err(TocError::ReservedId("view-home".to_string())));
        let blocks = vec![heading(2, Some("toast"), "Toast")];
        assert_eq!(derive_toc(&blocks), Err(TocError::ReservedId("toast".to_string())));
    }

    #[test]
    fn no_headings_no_entries() {
        assert!(derive_toc(&[paragraph("x")]).unwrap().is_empty());
    }

    #[test]
    fn indent_by_level() {
        let toc = derive_toc(&[
            heading(2, Some("a"), "A"),
            heading(3, Some("b"), "B"),
            heading(4, Some("c"), "C"),
        ])
        .unwrap();
        let indents: Vec<u32> = toc.iter().map(TocEntry::indent_px).collect();
        assert_eq!(indents, vec![0, 12, 24]);
    }

    // =========================================================================
    // ObservationBand
    // =========================================================================

    #[test]
    fn default_band_root_margin() {
        assert_eq!(ObservationBand::default().root_margin(), "-100px 0px -80% 0px");
    }

    #[test]
    fn band_contains_near_top_only() {
        let band = ObservationBand::default();
        assert!(!band.contains(50.0, 1000.0));
        assert!(band.contains(100.0, 1000.0));
        assert!(band.contains(150.0, 1000.0));
        assert!(!band.contains(200.0, 1000.0));
        assert!(!band.contains(600.0, 1000.0));
    }

    #[test]
    fn scroll_target_keeps_offset_and_never_negative() {
        let band = ObservationBand::default();
        assert_eq!(band.scroll_target(1500.0), 1400.0);
        assert_eq!(band.scroll_target(40.0), 0.0);
    }

    // =========================================================================
    // SectionNavigator
    // =========================================================================

    #[test]
    fn nothing_active_before_first_report() {
        let nav = SectionNavigator::new(&entries(&["a", "b"]), ObservationBand::default());
        assert_eq!(nav.active(), None);
    }

    #[test]
    fn entering_heading_becomes_sole_active() {
        let mut nav = SectionNavigator::new(&entries(&["a", "b", "c"]), ObservationBand::default());
        assert_eq!(nav.observe(&[Intersection::entering("a")]), Some("a"));
        assert_eq!(nav.observe(&[Intersection::entering("b")]), Some("b"));
        assert!(nav.is_active("b"));
        assert!(!nav.is_active("a"));
    }

    #[test]
    fn leaving_reports_do_not_deactivate() {
        let mut nav = SectionNavigator::new(&entries(&["a", "b"]), ObservationBand::default());
        nav.observe(&[Intersection::entering("a")]);
        assert_eq!(nav.observe(&[Intersection::leaving("a")]), None);
        assert_eq!(nav.active(), Some("a"));
    }

    #[test]
    fn last_entering_in_batch_wins() {
        let mut nav = SectionNavigator::new(&entries(&["a", "b", "c"]), ObservationBand::default());
        let batch = [
            Intersection::entering("c"),
            Intersection::leaving("a"),
            Intersection::entering("b"),
        ];
        assert_eq!(nav.observe(&batch), Some("b"));
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut nav = SectionNavigator::new(&entries(&["a"]), ObservationBand::default());
        assert_eq!(nav.observe(&[Intersection::entering("zzz")]), None);
        assert_eq!(nav.active(), None);
        assert!(nav.scroll_to_section("zzz", 10.0).is_none());
    }

    #[test]
    fn scroll_request_does_not_change_active() {
        let mut nav = SectionNavigator::new(&entries(&["a", "b"]), ObservationBand::default());
        nav.observe(&[Intersection::entering("a")]);
        let req = nav.scroll_to_section("b", 2000.0).unwrap();
        assert_eq!(req.target_y, 1900.0);
        assert_eq!(nav.active(), Some("a"));
        // The observer fires once the scroll brings "b" into the band.
        nav.observe(&[Intersection::entering("b")]);
        assert_eq!(nav.settle(req.ticket), ScrollOutcome::Settled);
        assert_eq!(nav.active(), Some("b"));
        assert!(nav.pending().is_none());
    }

    #[test]
    fn rapid_clicks_last_target_wins() {
        let mut nav = SectionNavigator::new(&entries(&["a", "b", "c"]), ObservationBand::default());
        let first = nav.scroll_to_section("a", 500.0).unwrap();
        let second = nav.scroll_to_section("b", 900.0).unwrap();
        let third = nav.scroll_to_section("c", 1300.0).unwrap();
        assert!(first.ticket < second.ticket && second.ticket < third.ticket);
        assert_eq!(nav.pending().map(|r| r.id.as_str()), Some("c"));
        assert_eq!(nav.settle(first.ticket), ScrollOutcome::Superseded);
        assert_eq!(nav.settle(second.ticket), ScrollOutcome::Superseded);
        assert_eq!(nav.pending().map(|r| r.id.as_str()), Some("c"));
        assert_eq!(nav.settle(third.ticket), ScrollOutcome::Settled);
        assert_eq!(nav.settle(third.ticket), ScrollOutcome::Superseded);
    }

    #[test]
    fn replacing_entries_resets_only_on_change() {
        let mut nav = SectionNavigator::new(&entries(&["a", "b"]), ObservationBand::default());
        nav.observe(&[Intersection::entering("a")]);
        assert!(!nav.replace_entries(&entries(&["a", "b"])));
        assert_eq!(nav.active(), Some("a"));
        assert!(nav.replace_entries(&entries(&["x"])));
        assert_eq!(nav.active(), None);
        assert_eq!(nav.ids(), &["x".to_string()]);
    }
}
