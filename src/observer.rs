//! Ownership of scroll-observer subscriptions.
//!
//! The [`ObserverHub`] stands in for the browser's intersection observer:
//! documents subscribe with the heading ids they want watched and get back a
//! [`Subscription`]. Dropping the subscription detaches it, so a document that
//! unmounts takes its observer with it and no callbacks leak into the next
//! document. Reports dispatched through the hub only reach live subscriptions.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`), like the UI event
//! loop it models.

use crate::toc::Intersection;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Debug, Default)]
struct HubState {
    next_id: u64,
    live: BTreeMap<SubscriptionId, Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ObserverHub {
    state: Rc<RefCell<HubState>>,
}

impl ObserverHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching `ids`.
    pub fn subscribe(&self, ids: Vec<String>) -> Subscription {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        state.live.insert(id, ids);
        Subscription {
            id,
            hub: Rc::downgrade(&self.state),
        }
    }

    pub fn live_count(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn is_live(&self, id: SubscriptionId) -> bool {
        self.state.borrow().live.contains_key(&id)
    }

    /// Ids watched by a live subscription.
    pub fn watched(&self, id: SubscriptionId) -> Option<Vec<String>> {
        self.state.borrow().live.get(&id).cloned()
    }

    /// Split a batch of reports among live subscriptions. Reports for ids no
    /// live subscription watches are dropped.
    pub fn dispatch(&self, batch: &[Intersection]) -> Vec<(SubscriptionId, Vec<Intersection>)> {
        let state = self.state.borrow();
        state
            .live
            .iter()
            .filter_map(|(id, watched)| {
                let reports: Vec<Intersection> = batch
                    .iter()
                    .filter(|r| watched.contains(&r.id))
                    .cloned()
                    .collect();
                (!reports.is_empty()).then_some((*id, reports))
            })
            .collect()
    }
}

/// A live observer registration. Detaches on drop.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    hub: Weak<RefCell<HubState>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(state) = self.hub.upgrade() {
            state.borrow_mut().live.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn drop_detaches() {
        let hub = ObserverHub::new();
        let sub = hub.subscribe(ids(&["a"]));
        let id = sub.id();
        assert!(hub.is_live(id));
        drop(sub);
        assert!(!hub.is_live(id));
        assert_eq!(hub.live_count(), 0);
    }

    #[test]
    fn dispatch_only_reaches_watchers() {
        let hub = ObserverHub::new();
        let first = hub.subscribe(ids(&["a", "b"]));
        let second = hub.subscribe(ids(&["c"]));
        let routed = hub.dispatch(&[
            Intersection::entering("b"),
            Intersection::entering("c"),
            Intersection::entering("nobody"),
        ]);
        assert_eq!(
            routed,
            vec![
                (first.id(), vec![Intersection::entering("b")]),
                (second.id(), vec![Intersection::entering("c")]),
            ]
        );
    }

    #[test]
    fn dropped_subscription_gets_nothing() {
        let hub = ObserverHub::new();
        let sub = hub.subscribe(ids(&["a"]));
        drop(sub);
        assert!(hub.dispatch(&[Intersection::entering("a")]).is_empty());
    }

    #[test]
    fn subscription_outliving_hub_drops_cleanly() {
        let hub = ObserverHub::new();
        let sub = hub.subscribe(ids(&["a"]));
        drop(hub);
        drop(sub);
    }

    #[test]
    fn ids_are_never_reused() {
        let hub = ObserverHub::new();
        let a = hub.subscribe(vec![]).id();
        let b = hub.subscribe(vec![]).id();
        assert_ne!(a, b);
    }
}
