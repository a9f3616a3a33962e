//! Observable Implementation
//!
//! An [`Observable`] is the fundamental reactive value. It holds a value and
//! tells the runtime who read it and when it changed.
//!
//! # How Observables Work
//!
//! 1. When an observable is read within a tracked render scope, the scope is
//!    registered as a dependent through the [`Runtime`].
//!
//! 2. When the value changes, the runtime marks every dependent dirty.
//!
//! 3. Dirty scopes re-render on the renderer's next flush.
//!
//! # Identity
//!
//! Clones of an observable share the same value and the same ID. Two
//! observables compare equal only when they are the same observable; this is
//! the "same reference" test used by memoized list items.
//!
//! # Thread Safety
//!
//! The value is protected by a `parking_lot::RwLock`, so observables can be
//! written from any thread.

use std::fmt::{self, Debug};
use std::sync::Arc;

use parking_lot::RwLock;

use super::runtime::{Change, Runtime, SignalId, Tracking};

/// A reactive value of type `T`.
///
/// # Example
///
/// ```rust
/// use lattice_flow::reactive::Observable;
///
/// let count = Observable::new(0);
/// assert_eq!(count.get(), 0);
///
/// count.set(5);
/// count.update(|value| *value += 1);
/// assert_eq!(count.peek(), 6);
/// ```
pub struct Observable<T> {
    /// Unique identifier for this observable.
    id: SignalId,

    /// The current value.
    value: Arc<RwLock<T>>,

    /// The list this observable is an element of, if any. Mutations are
    /// reported to the list as well, so deep readers of the list see them.
    parent: Option<SignalId>,
}

impl<T> Observable<T> {
    /// Get the observable's unique ID.
    pub fn id(&self) -> SignalId {
        self.id
    }

    /// Whether two handles refer to the same observable.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl<T> Observable<T>
where
    T: Send + Sync + 'static,
{
    /// Create a new observable with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            id: SignalId::new(),
            value: Arc::new(RwLock::new(value)),
            parent: None,
        }
    }

    /// Create an element observable owned by the list `parent`.
    pub(crate) fn child_of(value: T, parent: SignalId) -> Self {
        Self {
            id: SignalId::new(),
            value: Arc::new(RwLock::new(value)),
            parent: Some(parent),
        }
    }

    /// Get the current value.
    ///
    /// If called within a tracked scope, this also subscribes the scope to
    /// every change of this observable.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Borrow the current value, tracking the read.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        Runtime::track_read(self.id, Tracking::Deep);
        f(&*self.value.read())
    }

    /// Get the current value without tracking dependencies.
    pub fn peek(&self) -> T
    where
        T: Clone,
    {
        self.peek_with(T::clone)
    }

    /// Borrow the current value without tracking dependencies.
    pub fn peek_with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&*self.value.read())
    }

    /// Set a new value and notify dependents.
    pub fn set(&self, value: T) {
        *self.value.write() = value;
        self.notify();
    }

    /// Mutate the value in place and notify dependents.
    ///
    /// The write lock is released before anyone is notified.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut *self.value.write());
        self.notify();
    }

    /// Get the number of scopes subscribed to this observable.
    pub fn subscriber_count(&self) -> usize {
        Runtime::subscriber_count(self.id)
    }

    fn notify(&self) {
        Runtime::notify_signal_change(self.id, Change::Value);
        if let Some(parent) = self.parent {
            Runtime::notify_signal_change(parent, Change::Value);
        }
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            value: Arc::clone(&self.value),
            parent: self.parent,
        }
    }
}

impl<T> PartialEq for Observable<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Observable<T> {}

impl<T> Debug for Observable<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("id", &self.id)
            .field("value", &*self.value.read())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{ReactiveContext, SubscriberId};

    #[test]
    fn observable_get_and_set() {
        let observable = Observable::new(0);
        assert_eq!(observable.get(), 0);

        observable.set(42);
        assert_eq!(observable.get(), 42);
    }

    #[test]
    fn observable_update_in_place() {
        let observable = Observable::new(vec![1, 2]);
        observable.update(|values| values.push(3));
        assert_eq!(observable.peek(), vec![1, 2, 3]);
    }

    #[test]
    fn observable_clone_shares_state() {
        let first = Observable::new(0);
        let second = first.clone();

        first.set(42);
        assert_eq!(second.get(), 42);
        assert!(first.ptr_eq(&second));
        assert_eq!(first, second);
    }

    #[test]
    fn distinct_observables_are_not_equal() {
        let first = Observable::new(1);
        let second = Observable::new(1);
        assert_ne!(first, second);
        assert!(!first.ptr_eq(&second));
    }

    #[test]
    fn tracked_read_registers_dependency() {
        let observable = Observable::new("a".to_string());
        let subscriber = SubscriberId::new();

        {
            let _ctx = ReactiveContext::enter(subscriber);
            assert_eq!(observable.with(|value| value.len()), 1);
        }
        assert_eq!(observable.subscriber_count(), 1);

        crate::reactive::Runtime::clear_dependencies(subscriber);
        assert_eq!(observable.subscriber_count(), 0);
    }

    #[test]
    fn peek_does_not_register_dependency() {
        let observable = Observable::new(7);
        let subscriber = SubscriberId::new();

        {
            let _ctx = ReactiveContext::enter(subscriber);
            assert_eq!(observable.peek(), 7);
        }
        assert_eq!(observable.subscriber_count(), 0);
    }
}
