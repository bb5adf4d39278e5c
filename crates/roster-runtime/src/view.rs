//! Derived-view bookkeeping: freshness states and synchronous observers.

use serde::Serialize;
use std::fmt;

/// Identifies one derived view by position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ViewId {
    /// Total, owned and remaining numbers of character `i`.
    Character(usize),
    /// Required and remaining numbers of roster goal `i`.
    RosterGoal(usize),
    RosterStorage,
    MarketPrices,
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewId::Character(i) => write!(f, "character[{i}]"),
            ViewId::RosterGoal(i) => write!(f, "roster_goal[{i}]"),
            ViewId::RosterStorage => f.write_str("roster_storage"),
            ViewId::MarketPrices => f.write_str("market_prices"),
        }
    }
}

/// Stale → Recomputing → Fresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ViewStatus {
    Stale,
    Recomputing,
    Fresh,
}

/// A status transition of one view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ViewEvent {
    pub view: ViewId,
    pub status: ViewStatus,
}

/// Handle returned by a registration, used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&ViewEvent)>;

enum Filter {
    Invalidations(ViewId),
    Everything,
}

impl Filter {
    fn accepts(&self, event: &ViewEvent) -> bool {
        match self {
            Filter::Invalidations(view) => {
                event.view == *view && event.status == ViewStatus::Stale
            }
            Filter::Everything => true,
        }
    }
}

/// Registered callbacks, invoked synchronously in registration order.
#[derive(Default)]
pub struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Filter, Callback)>,
}

impl Observers {
    fn register(&mut self, filter: Filter, callback: Callback) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.push((id, filter, callback));
        id
    }

    /// Call `callback` whenever `view` becomes stale.
    pub fn on_invalidate(
        &mut self,
        view: ViewId,
        callback: impl FnMut(&ViewEvent) + 'static,
    ) -> SubscriptionId {
        self.register(Filter::Invalidations(view), Box::new(callback))
    }

    /// Call `callback` on every transition of every view.
    pub fn on_change(&mut self, callback: impl FnMut(&ViewEvent) + 'static) -> SubscriptionId {
        self.register(Filter::Everything, Box::new(callback))
    }

    /// Returns whether the registration existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _, _)| *sid != id);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn emit(&mut self, view: ViewId, status: ViewStatus) {
        let event = ViewEvent { view, status };
        for (_, filter, callback) in &mut self.entries {
            if filter.accepts(&event) {
                callback(&event);
            }
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("registered", &self.entries.len())
            .finish()
    }
}

/// A cached derived value and its freshness.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Cached<T> {
    pub(crate) status: ViewStatus,
    pub(crate) value: T,
}

impl<T> Cached<T> {
    pub(crate) fn fresh(value: T) -> Self {
        Self {
            status: ViewStatus::Fresh,
            value,
        }
    }

    pub(crate) fn is_fresh(&self) -> bool {
        self.status == ViewStatus::Fresh
    }
}
