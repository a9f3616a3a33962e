//! Observable Collections
//!
//! An [`ObservableList`] is an ordered sequence of slots. A slot is either a
//! hole (`None`) or an element held in its own child [`Observable`], so a
//! mutation of one element only notifies the scopes that read that element.
//!
//! The list itself reports structural changes at three granularities:
//!
//! | Operation                         | Change reported     |
//! |-----------------------------------|---------------------|
//! | push, insert, remove, clear       | [`Change::Length`]  |
//! | swap, move, replace, make hole    | [`Change::Order`]   |
//! | element `set`/`update`            | [`Change::Value`]   |
//!
//! Readers choose what they hear through [`Tracking`]: a `Shape` read sees
//! length and order changes, a `Length` read only length changes, and a
//! `Deep` read everything.

use std::fmt::{self, Debug};
use std::sync::Arc;

use parking_lot::RwLock;

use super::observable::Observable;
use super::runtime::{Change, Runtime, SignalId, Tracking};

/// A slot in an observable list.
pub type Slot<T> = Option<Observable<T>>;

/// An observable, ordered collection of elements.
///
/// # Example
///
/// ```rust
/// use lattice_flow::reactive::{ObservableList, Tracking};
///
/// let list = ObservableList::from_vec(vec!["a", "b"]);
/// list.push("c");
///
/// let slots = list.get(Tracking::Shape);
/// assert_eq!(slots.len(), 3);
/// ```
pub struct ObservableList<T> {
    id: SignalId,
    slots: Arc<RwLock<Vec<Slot<T>>>>,
}

impl<T> ObservableList<T> {
    /// Get the list's unique ID.
    pub fn id(&self) -> SignalId {
        self.id
    }
}

impl<T> ObservableList<T>
where
    T: Send + Sync + 'static,
{
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            id: SignalId::new(),
            slots: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Create a list with one element per value.
    pub fn from_vec(values: Vec<T>) -> Self {
        Self::from_sparse(values.into_iter().map(Some).collect())
    }

    /// Create a list that may contain holes.
    pub fn from_sparse(values: Vec<Option<T>>) -> Self {
        let list = Self::new();
        let slots = values
            .into_iter()
            .map(|value| value.map(|value| Observable::child_of(value, list.id)))
            .collect();
        *list.slots.write() = slots;
        list
    }

    /// Read the raw slots, subscribing the current scope at `tracking`.
    ///
    /// Element handles are returned as-is; reading an element's value is a
    /// separate, independently tracked read.
    pub fn get(&self, tracking: Tracking) -> Vec<Slot<T>> {
        Runtime::track_read(self.id, tracking);
        self.slots.read().clone()
    }

    /// Read the raw slots without tracking.
    pub fn peek(&self) -> Vec<Slot<T>> {
        self.slots.read().clone()
    }

    /// Number of slots, holes included. Tracks length changes only.
    pub fn len(&self) -> usize {
        Runtime::track_read(self.id, Tracking::Length);
        self.slots.read().len()
    }

    /// Whether the list has no slots. Tracks length changes only.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element handle at `index`, untracked.
    pub fn at(&self, index: usize) -> Option<Observable<T>> {
        self.slots.read().get(index).cloned().flatten()
    }

    /// Snapshot of every value, holes as `None`, tracked deeply.
    pub fn values(&self) -> Vec<Option<T>>
    where
        T: Clone,
    {
        Runtime::track_read(self.id, Tracking::Deep);
        self.slots
            .read()
            .iter()
            .map(|slot| slot.as_ref().map(Observable::peek))
            .collect()
    }

    /// Append an element.
    pub fn push(&self, value: T) -> Observable<T> {
        let element = Observable::child_of(value, self.id);
        self.slots.write().push(Some(element.clone()));
        self.notify(Change::Length);
        element
    }

    /// Append a hole.
    pub fn push_hole(&self) {
        self.slots.write().push(None);
        self.notify(Change::Length);
    }

    /// Insert an element at `index`, shifting later slots.
    ///
    /// Indices past the end append.
    pub fn insert(&self, index: usize, value: T) -> Observable<T> {
        let element = Observable::child_of(value, self.id);
        {
            let mut slots = self.slots.write();
            let index = index.min(slots.len());
            slots.insert(index, Some(element.clone()));
        }
        self.notify(Change::Length);
        element
    }

    /// Remove the slot at `index`, returning its element if it had one.
    pub fn remove(&self, index: usize) -> Option<Observable<T>> {
        let removed = {
            let mut slots = self.slots.write();
            if index >= slots.len() {
                return None;
            }
            slots.remove(index)
        };
        self.notify(Change::Length);
        removed
    }

    /// Replace the element at `index` with a new one.
    ///
    /// The slot gets a fresh observable, so anything keyed on the old element
    /// sees a new reference.
    pub fn replace(&self, index: usize, value: T) -> Option<Observable<T>> {
        let element = Observable::child_of(value, self.id);
        {
            let mut slots = self.slots.write();
            let slot = slots.get_mut(index)?;
            *slot = Some(element.clone());
        }
        self.notify(Change::Order);
        Some(element)
    }

    /// Turn the slot at `index` into a hole, keeping the length.
    pub fn clear_at(&self, index: usize) -> Option<Observable<T>> {
        let taken = {
            let mut slots = self.slots.write();
            slots.get_mut(index)?.take()
        };
        self.notify(Change::Order);
        taken
    }

    /// Swap two slots.
    pub fn swap(&self, a: usize, b: usize) {
        {
            let mut slots = self.slots.write();
            if a >= slots.len() || b >= slots.len() || a == b {
                return;
            }
            slots.swap(a, b);
        }
        self.notify(Change::Order);
    }

    /// Move the slot at `from` so that it ends up at `to`.
    pub fn move_to(&self, from: usize, to: usize) {
        {
            let mut slots = self.slots.write();
            if from >= slots.len() || to >= slots.len() || from == to {
                return;
            }
            let slot = slots.remove(from);
            slots.insert(to, slot);
        }
        self.notify(Change::Order);
    }

    /// Reverse the slot order.
    pub fn reverse(&self) {
        {
            let mut slots = self.slots.write();
            if slots.len() < 2 {
                return;
            }
            slots.reverse();
        }
        self.notify(Change::Order);
    }

    /// Replace every slot with fresh elements.
    ///
    /// Reports a length change when the length differs and an order change
    /// otherwise.
    pub fn set_all(&self, values: Vec<T>) {
        let fresh: Vec<Slot<T>> = values
            .into_iter()
            .map(|value| Some(Observable::child_of(value, self.id)))
            .collect();
        let next_len = fresh.len();
        let previous_len = std::mem::replace(&mut *self.slots.write(), fresh).len();
        let change = if previous_len == next_len {
            Change::Order
        } else {
            Change::Length
        };
        self.notify(change);
    }

    /// Remove every slot.
    pub fn clear(&self) {
        let had_slots = {
            let mut slots = self.slots.write();
            let had_slots = !slots.is_empty();
            slots.clear();
            had_slots
        };
        if had_slots {
            self.notify(Change::Length);
        }
    }

    /// Mutate the element at `index` in place.
    ///
    /// Only the element's own readers and deep readers of the list are
    /// notified. Returns `false` for holes and out-of-range indices.
    pub fn update_at(&self, index: usize, f: impl FnOnce(&mut T)) -> bool {
        match self.at(index) {
            Some(element) => {
                element.update(f);
                true
            }
            None => false,
        }
    }

    /// Get the number of scopes subscribed to the list itself.
    pub fn subscriber_count(&self) -> usize {
        Runtime::subscriber_count(self.id)
    }

    fn notify(&self, change: Change) {
        Runtime::notify_signal_change(self.id, change);
    }
}

impl<T> Default for ObservableList<T>
where
    T: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<T> PartialEq for ObservableList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Debug for ObservableList<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableList")
            .field("id", &self.id)
            .field("slots", &*self.slots.read())
            .finish()
    }
}
