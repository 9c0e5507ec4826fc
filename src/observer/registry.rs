use crate::core::atomic::Locked;
use crate::observer::notify::{dispatch, TrackEvent, TrackObserver};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Stable identifier for one subscription, required to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

/// Holds weak references to subscribed observers and fans computed
/// outcomes out to every live one.
pub struct ObserverRegistry {
    observers: Locked<Vec<(ObserverHandle, Weak<dyn TrackObserver>)>>,
    // Serializes notification passes so one observer never sees the
    // callbacks of two concurrent events interleaved.
    notify_gate: Locked<()>,
    next_handle: AtomicU64,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self {
            observers: Locked::new(Vec::new()),
            notify_gate: Locked::new(()),
            next_handle: AtomicU64::new(0),
        }
    }

    /// Registers an observer without taking ownership: the registry keeps
    /// only a weak reference, so dropping the observer's last `Arc`
    /// effectively unsubscribes it.
    pub fn subscribe(&self, observer: Arc<dyn TrackObserver>) -> ObserverHandle {
        let handle = ObserverHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let weak = Arc::downgrade(&observer);
        self.observers.modify(|list| list.push((handle, weak)));
        handle
    }

    /// Removes the subscription for `handle`. Unknown handles are ignored.
    pub fn unsubscribe(&self, handle: ObserverHandle) {
        self.observers.modify(|list| list.retain(|(h, _)| *h != handle));
    }

    /// Number of live subscriptions (dropped observers not yet pruned are
    /// not counted).
    pub fn live_observers(&self) -> usize {
        self.observers
            .modify(|list| list.iter().filter(|(_, weak)| weak.strong_count() > 0).count())
    }

    /// Delivers one event to every observer subscribed at the moment the
    /// pass begins. The list is copied under the lock first, so concurrent
    /// subscribe/unsubscribe calls neither crash the pass nor join it
    /// retroactively. Dead observers are skipped and pruned afterwards.
    pub fn notify(&self, event: TrackEvent<'_>) {
        let pass: Vec<(ObserverHandle, Weak<dyn TrackObserver>)> = self.observers.get();

        let mut dead: Vec<ObserverHandle> = Vec::new();
        self.notify_gate.modify(|_| {
            for (handle, weak) in &pass {
                match weak.upgrade() {
                    Some(observer) => dispatch(observer.as_ref(), event),
                    None => dead.push(*handle),
                }
            }
        });

        if !dead.is_empty() {
            tracing::debug!("Pruning {} dropped observer(s)", dead.len());
            self.observers
                .modify(|list| list.retain(|(h, _)| !dead.contains(h)));
        }
    }
}

impl Default for ObserverRegistry {
    fn default() -> Self {
        Self::new()
    }
}
