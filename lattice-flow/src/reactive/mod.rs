//! Reactive Primitives
//!
//! This module implements the observable store the control-flow primitives
//! bind to, and the dependency tracking that connects the two.
//!
//! # Concepts
//!
//! ## Observables
//!
//! An [`Observable`] is a container for mutable state. When it is read
//! within a tracked render scope, the scope is registered as a dependent.
//! When the value changes, all dependents are marked dirty.
//!
//! ## Observable lists
//!
//! An [`ObservableList`] is an ordered collection whose elements are
//! observables themselves. Readers pick a [`Tracking`] granularity: the
//! whole change stream, only the list's shape, or only its length.
//!
//! ## Selectors
//!
//! A [`Selector`] is a value, an observable, or a function, resolved to a
//! current value with dependency tracking.
//!
//! # Implementation Notes
//!
//! The reactive system uses a thread-local tracking context to detect
//! dependencies automatically. When an observable is read, we check if there
//! is an active tracking context and, if so, register the dependency with
//! the global [`Runtime`].

mod context;
mod list;
mod observable;
mod runtime;
mod selector;
mod subscriber;

pub use context::{Dependencies, Dependency, ReactiveContext};
pub use list::{ObservableList, Slot};
pub use observable::Observable;
pub use runtime::{Change, Reactive, ReactiveHandle, Runtime, SignalId, Tracking};
pub use selector::Selector;
pub use subscriber::SubscriberId;
