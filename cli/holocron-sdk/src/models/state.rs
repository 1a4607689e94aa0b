//! Observable state published by loaders and searches.
//!
//! A [Signal] is a typed cell that always holds the last published value.
//! Consumers either read it at any time or [subscribe](Signal::subscribe) to
//! be woken on every publish; dropping the [Subscription] unregisters it.
//! A consumer that falls behind observes the latest value, intermediate
//! values may be skipped.

use std::fmt::Debug;
use std::sync::Arc;

use holocron_catalog::Record;
use tokio::sync::watch;

/// Read only snapshot of an accumulated list.
pub type RecordList = Arc<Vec<Record>>;

/// A publish/subscribe cell holding the last published value.
pub struct Signal<T> {
    sender: Arc<watch::Sender<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<T: Debug> Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("value", &*self.sender.borrow())
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

impl<T> Signal<T> {
    pub fn new(initial: T) -> Self {
        Self {
            sender: Arc::new(watch::Sender::new(initial)),
        }
    }

    /// Run `f` on the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// Register for change notifications.
    ///
    /// The value current at the time of subscribing counts as seen.
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Replace the value and notify every subscriber.
    pub(crate) fn publish(&self, value: T) {
        self.sender.send_replace(value);
    }
}

impl<T: Clone> Signal<T> {
    /// The last published value.
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }
}

/// A registered observer of a [Signal].
#[derive(Debug)]
pub struct Subscription<T> {
    receiver: watch::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    pub fn get(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Whether a value was published since the last one this subscription saw.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the next publish and return the new value.
    ///
    /// Returns `None` once the signal and all its clones are gone.
    pub async fn changed(&mut self) -> Option<T> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait until the current or a future value satisfies `predicate`.
    pub async fn wait_for(&mut self, mut predicate: impl FnMut(&T) -> bool) -> Option<T> {
        let value = self.receiver.wait_for(|value| predicate(value)).await.ok()?;
        Some(value.clone())
    }
}

/// The signals a view layer renders from.
///
/// `get_item` and `get_count` read the published list snapshot, so they
/// always agree with the last value delivered to `list` subscribers.
#[derive(Debug, Clone)]
pub struct StateSurface {
    list: Signal<RecordList>,
    is_loading: Signal<bool>,
    has_error: Signal<bool>,
}

impl Default for StateSurface {
    fn default() -> Self {
        Self {
            list: Signal::new(Arc::new(Vec::new())),
            is_loading: Signal::new(false),
            has_error: Signal::new(false),
        }
    }
}

impl StateSurface {
    pub fn list(&self) -> &Signal<RecordList> {
        &self.list
    }

    pub fn is_loading(&self) -> &Signal<bool> {
        &self.is_loading
    }

    pub fn has_error(&self) -> &Signal<bool> {
        &self.has_error
    }

    pub fn get_item(&self, position: usize) -> Option<Record> {
        self.list.with(|list| list.get(position).cloned())
    }

    pub fn get_count(&self) -> usize {
        self.list.with(|list| list.len())
    }

    /// Wait until no fetch is in flight.
    pub async fn settled(&self) {
        let mut loading = self.is_loading.subscribe();
        loading.wait_for(|loading| !*loading).await;
    }

    pub(crate) fn publish_list(&self, records: &[Record]) {
        self.list.publish(Arc::new(records.to_vec()));
    }

    pub(crate) fn set_loading(&self, loading: bool) {
        self.is_loading.publish(loading);
    }

    pub(crate) fn set_error(&self, error: bool) {
        self.has_error.publish(error);
    }
}
