//! Reactive Runtime
//!
//! The runtime is the central coordinator between observables and the
//! scopes that read them. It records which scope depends on which
//! observable, and at what granularity, and routes change notifications.
//!
//! # How It Works
//!
//! 1. A scope registers itself with the runtime when it is mounted.
//!
//! 2. When a scope reads an observable inside its reactive context, the
//!    runtime records the dependency together with a [`Tracking`] level.
//!
//! 3. When an observable changes, it reports a [`Change`]. The runtime:
//!    a. Finds the subscribers whose tracking level accepts that change
//!    b. Marks them dirty
//!    c. Leaves the actual re-render to the owner of the scope
//!
//! # Thread Safety
//!
//! The tracking context is thread-local, while the registry is global. An
//! observable written from another thread still marks its dependents dirty;
//! they are re-rendered when their renderer next flushes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use dashmap::DashMap;
use smallvec::SmallVec;

use super::context::ReactiveContext;
use super::subscriber::SubscriberId;

/// Unique identifier for an observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignalId(u64);

impl SignalId {
    /// Generate a new unique observable ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for SignalId {
    fn default() -> Self {
        Self::new()
    }
}

/// How much of an observable's change stream a read subscribes to.
///
/// Ordered from narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tracking {
    /// Only changes to the number of elements (the optimized shape).
    Length,
    /// Insertions, removals, replacements and reorders, but not mutation
    /// of an element's own value.
    Shape,
    /// Every change, including nested value mutation.
    Deep,
}

impl Tracking {
    /// Whether a subscriber at this level must hear about `change`.
    pub fn accepts(self, change: Change) -> bool {
        match self {
            Tracking::Deep => true,
            Tracking::Shape => matches!(change, Change::Length | Change::Order),
            Tracking::Length => change == Change::Length,
        }
    }

    /// The wider of two tracking levels.
    pub fn widen(self, other: Tracking) -> Tracking {
        self.max(other)
    }
}

/// What kind of change an observable went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    /// The number of elements changed.
    Length,
    /// Same length, but slots were reordered or replaced.
    Order,
    /// A value (or a nested element's value) was mutated in place.
    Value,
}

/// A trait for types that can be notified when dependencies change.
pub trait Reactive: Send + Sync {
    /// Get the subscriber ID for this reactive value.
    fn subscriber_id(&self) -> SubscriberId;

    /// Mark this reactive value as needing to run again.
    fn mark_dirty(&self);
}

/// Handle to a registered reactive value.
///
/// The handle keeps the reactive value alive. Dropping it unregisters the
/// value and clears its dependencies.
pub struct ReactiveHandle {
    subscriber_id: SubscriberId,
    _reactive: Arc<dyn Reactive>,
}

impl ReactiveHandle {
    /// The subscriber this handle registered.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }
}

impl std::fmt::Debug for ReactiveHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveHandle")
            .field("subscriber_id", &self.subscriber_id)
            .finish()
    }
}

impl Drop for ReactiveHandle {
    fn drop(&mut self) {
        Runtime::unregister(self.subscriber_id);
    }
}

type SubscriberList = SmallVec<[(SubscriberId, Tracking); 4]>;

// Maps subscriber IDs to weak references to avoid preventing cleanup.
static REGISTRY: OnceLock<DashMap<SubscriberId, Weak<dyn Reactive>>> = OnceLock::new();
static SIGNAL_SUBSCRIBERS: OnceLock<DashMap<SignalId, SubscriberList>> = OnceLock::new();
static SUBSCRIBER_SIGNALS: OnceLock<DashMap<SubscriberId, SmallVec<[SignalId; 4]>>> =
    OnceLock::new();

fn registry() -> &'static DashMap<SubscriberId, Weak<dyn Reactive>> {
    REGISTRY.get_or_init(DashMap::new)
}

fn signal_subscribers() -> &'static DashMap<SignalId, SubscriberList> {
    SIGNAL_SUBSCRIBERS.get_or_init(DashMap::new)
}

fn subscriber_signals() -> &'static DashMap<SubscriberId, SmallVec<[SignalId; 4]>> {
    SUBSCRIBER_SIGNALS.get_or_init(DashMap::new)
}

/// The global reactive runtime.
#[derive(Debug)]
pub struct Runtime;

impl Runtime {
    /// Register a reactive value with the runtime.
    ///
    /// Returns a handle that unregisters the value when dropped.
    pub fn register(reactive: Arc<dyn Reactive>) -> ReactiveHandle {
        let id = reactive.subscriber_id();
        registry().insert(id, Arc::downgrade(&reactive));

        ReactiveHandle {
            subscriber_id: id,
            _reactive: reactive,
        }
    }

    fn unregister(id: SubscriberId) {
        registry().remove(&id);
        Self::clear_dependencies(id);
    }

    /// Record a read of `signal` by the current subscriber, if any.
    ///
    /// Observables call this from every tracked read.
    pub fn track_read(signal: SignalId, tracking: Tracking) {
        if let Some(subscriber_id) = ReactiveContext::current_subscriber() {
            ReactiveContext::track_dependency(signal, tracking);
            Self::add_dependency(signal, subscriber_id, tracking);
        }
    }

    /// Record that a subscriber depends on an observable.
    ///
    /// A subscriber holds at most one subscription per observable; a second
    /// read widens the existing one.
    pub fn add_dependency(signal: SignalId, subscriber_id: SubscriberId, tracking: Tracking) {
        let inserted = {
            let mut subscribers = signal_subscribers().entry(signal).or_default();
            let position = subscribers.iter().position(|(id, _)| *id == subscriber_id);
            match position {
                Some(index) => {
                    let existing = &mut subscribers[index].1;
                    *existing = existing.widen(tracking);
                    false
                }
                None => {
                    subscribers.push((subscriber_id, tracking));
                    true
                }
            }
        };

        if inserted {
            subscriber_signals()
                .entry(subscriber_id)
                .or_default()
                .push(signal);
        }
    }

    /// Remove all dependencies for a subscriber.
    ///
    /// Called before re-running a scope to clear stale dependencies.
    pub fn clear_dependencies(subscriber_id: SubscriberId) {
        let Some((_, signals)) = subscriber_signals().remove(&subscriber_id) else {
            return;
        };

        for signal in signals {
            if let Some(mut subscribers) = signal_subscribers().get_mut(&signal) {
                subscribers.retain(|(id, _)| *id != subscriber_id);
            }
            signal_subscribers().remove_if(&signal, |_, subscribers| subscribers.is_empty());
        }
    }

    /// Notify the subscribers of `signal` whose tracking accepts `change`.
    ///
    /// Subscribers are marked dirty in the order they subscribed.
    pub fn notify_signal_change(signal: SignalId, change: Change) {
        let targets: SmallVec<[SubscriberId; 8]> = match signal_subscribers().get(&signal) {
            Some(subscribers) => subscribers
                .iter()
                .filter(|(_, tracking)| tracking.accepts(change))
                .map(|(id, _)| *id)
                .collect(),
            None => return,
        };

        for id in targets {
            let reactive = registry().get(&id).and_then(|weak| weak.upgrade());
            if let Some(reactive) = reactive {
                reactive.mark_dirty();
            }
        }
    }

    /// Number of subscribers currently attached to `signal`.
    pub fn subscriber_count(signal: SignalId) -> usize {
        signal_subscribers()
            .get(&signal)
            .map(|subscribers| subscribers.len())
            .unwrap_or(0)
    }

    /// Number of observables `subscriber_id` currently depends on.
    pub fn dependency_count(subscriber_id: SubscriberId) -> usize {
        subscriber_signals()
            .get(&subscriber_id)
            .map(|signals| signals.len())
            .unwrap_or(0)
    }

    /// Get the current subscriber being tracked, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        ReactiveContext::current_subscriber()
    }

    /// Check if we're inside a tracked reactive context.
    pub fn is_tracking() -> bool {
        ReactiveContext::is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct MockReactive {
        id: SubscriberId,
        dirty: AtomicUsize,
    }

    impl MockReactive {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                id: SubscriberId::new(),
                dirty: AtomicUsize::new(0),
            })
        }

        fn dirty_count(&self) -> usize {
            self.dirty.load(Ordering::SeqCst)
        }
    }

    impl Reactive for MockReactive {
        fn subscriber_id(&self) -> SubscriberId {
            self.id
        }

        fn mark_dirty(&self) {
            self.dirty.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn tracking_accepts_by_granularity() {
        assert!(Tracking::Deep.accepts(Change::Value));
        assert!(Tracking::Deep.accepts(Change::Order));
        assert!(Tracking::Shape.accepts(Change::Length));
        assert!(Tracking::Shape.accepts(Change::Order));
        assert!(!Tracking::Shape.accepts(Change::Value));
        assert!(Tracking::Length.accepts(Change::Length));
        assert!(!Tracking::Length.accepts(Change::Order));
        assert!(!Tracking::Length.accepts(Change::Value));
    }

    #[test]
    fn runtime_registers_and_unregisters() {
        let reactive = MockReactive::new();
        let id = reactive.id;

        let handle = Runtime::register(reactive);
        assert!(registry().contains_key(&id));

        drop(handle);
        assert!(!registry().contains_key(&id));
    }

    #[test]
    fn runtime_notifies_only_accepting_subscribers() {
        let shape = MockReactive::new();
        let length = MockReactive::new();
        let _shape_handle = Runtime::register(shape.clone());
        let _length_handle = Runtime::register(length.clone());

        let signal = SignalId::new();
        Runtime::add_dependency(signal, shape.id, Tracking::Shape);
        Runtime::add_dependency(signal, length.id, Tracking::Length);

        Runtime::notify_signal_change(signal, Change::Order);
        assert_eq!(shape.dirty_count(), 1);
        assert_eq!(length.dirty_count(), 0);

        Runtime::notify_signal_change(signal, Change::Length);
        assert_eq!(shape.dirty_count(), 2);
        assert_eq!(length.dirty_count(), 1);

        Runtime::notify_signal_change(signal, Change::Value);
        assert_eq!(shape.dirty_count(), 2);
        assert_eq!(length.dirty_count(), 1);
    }

    #[test]
    fn repeated_dependency_widens_instead_of_duplicating() {
        let reactive = MockReactive::new();
        let _handle = Runtime::register(reactive.clone());
        let signal = SignalId::new();

        Runtime::add_dependency(signal, reactive.id, Tracking::Length);
        Runtime::add_dependency(signal, reactive.id, Tracking::Deep);

        assert_eq!(Runtime::subscriber_count(signal), 1);
        assert_eq!(Runtime::dependency_count(reactive.id), 1);

        Runtime::notify_signal_change(signal, Change::Value);
        assert_eq!(reactive.dirty_count(), 1);
    }

    #[test]
    fn runtime_clears_dependencies() {
        let reactive = MockReactive::new();
        let id = reactive.id;
        let _handle = Runtime::register(reactive.clone());
        let signal = SignalId::new();

        Runtime::add_dependency(signal, id, Tracking::Deep);
        assert_eq!(Runtime::subscriber_count(signal), 1);

        Runtime::clear_dependencies(id);
        assert_eq!(Runtime::subscriber_count(signal), 0);
        assert_eq!(Runtime::dependency_count(id), 0);

        Runtime::notify_signal_change(signal, Change::Value);
        assert_eq!(reactive.dirty_count(), 0);
    }

    #[test]
    fn track_read_outside_context_is_ignored() {
        let signal = SignalId::new();
        Runtime::track_read(signal, Tracking::Deep);
        assert_eq!(Runtime::subscriber_count(signal), 0);
    }
}
