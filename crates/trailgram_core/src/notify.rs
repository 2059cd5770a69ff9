//! Change notification for forest observers.
//!
//! # Responsibility
//! - Keep the set of "forest changed" listeners.
//! - Fan out one payload-less notification per successful mutation.
//!
//! # Invariants
//! - Listeners run in registration order.
//! - Subscription ids are never reused within one notifier.

use std::collections::BTreeMap;

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn Fn() + Send>;

/// Registry of forest-changed listeners.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: BTreeMap<SubscriptionId, Listener>,
    next_id: u64,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one listener.
    pub fn subscribe(&mut self, listener: impl Fn() + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, Box::new(listener));
        id
    }

    /// Removes one listener. Returns `false` for unknown ids.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Calls every listener once.
    pub fn notify(&self) {
        for listener in self.listeners.values() {
            listener();
        }
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
