//! Push subscriptions to committed collection changes

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crossbeam_channel::{Receiver, Sender};

/// Store collections that can be observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Jobs,
    Inventory,
    PurchaseQueue,
    Suppliers,
    Employees,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Jobs => write!(f, "jobs"),
            Collection::Inventory => write!(f, "inventory"),
            Collection::PurchaseQueue => write!(f, "purchase_queue"),
            Collection::Suppliers => write!(f, "suppliers"),
            Collection::Employees => write!(f, "employees"),
        }
    }
}

/// IDs written in one collection by one committed transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: Collection,
    pub ids: Vec<String>,
}

struct Subscriber {
    id: u64,
    collection: Collection,
    sender: Sender<ChangeEvent>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    // A panicking subscriber cannot corrupt the list; keep serving
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub(super) struct Watchers {
    registry: Arc<Mutex<Registry>>,
}

impl Watchers {
    pub(super) fn subscribe(&self, collection: Collection) -> (Subscription, Receiver<ChangeEvent>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.subscribers.push(Subscriber {
            id,
            collection,
            sender,
        });

        tracing::debug!(subscription = id, %collection, "Subscription opened");

        let handle = Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        };
        (handle, receiver)
    }

    pub(super) fn publish(&self, changes: BTreeMap<Collection, Vec<String>>) {
        if changes.is_empty() {
            return;
        }
        let mut registry = lock(&self.registry);
        for (collection, ids) in changes {
            let event = ChangeEvent { collection, ids };
            // Drop subscribers whose receiver has gone away
            registry.subscribers.retain(|s| {
                s.collection != collection || s.sender.send(event.clone()).is_ok()
            });
        }
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        lock(&self.registry).subscribers.len()
    }
}

/// Cancellation handle for a store subscription
///
/// The subscription ends when the handle is dropped or cancelled.
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// End the subscription now
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).subscribers.retain(|s| s.id != self.id);
            tracing::debug!(subscription = self.id, "Subscription closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_matching_subscribers_only() {
        let watchers = Watchers::default();
        let (_jobs_sub, jobs_rx) = watchers.subscribe(Collection::Jobs);
        let (_queue_sub, queue_rx) = watchers.subscribe(Collection::PurchaseQueue);

        let mut changes = BTreeMap::new();
        changes.insert(Collection::Jobs, vec!["JOB-1".to_string()]);
        watchers.publish(changes);

        let event = jobs_rx.try_recv().unwrap();
        assert_eq!(event.collection, Collection::Jobs);
        assert_eq!(event.ids, vec!["JOB-1".to_string()]);
        assert!(queue_rx.try_recv().is_err());
    }

    #[test]
    fn test_drop_cancels_subscription() {
        let watchers = Watchers::default();
        let (sub, rx) = watchers.subscribe(Collection::Inventory);
        assert_eq!(watchers.len(), 1);

        sub.cancel();
        assert_eq!(watchers.len(), 0);

        let mut changes = BTreeMap::new();
        changes.insert(Collection::Inventory, vec!["ITM-1".to_string()]);
        watchers.publish(changes);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_disconnected_receivers_are_pruned() {
        let watchers = Watchers::default();
        let (_sub, rx) = watchers.subscribe(Collection::Jobs);
        drop(rx);

        let mut changes = BTreeMap::new();
        changes.insert(Collection::Jobs, vec!["JOB-1".to_string()]);
        watchers.publish(changes);
        assert_eq!(watchers.len(), 0);
    }
}
