//! Selectors
//!
//! A [`Selector`] is anything a control-flow primitive can read a current
//! value from: a plain value, an observable, or a zero-argument function.
//! Resolving it inside a render scope subscribes that scope to whatever was
//! read, so the scope re-renders when the value may have changed.

use std::fmt;
use std::rc::Rc;

use super::observable::Observable;

/// A value, an observable, or a function producing a value.
pub enum Selector<T> {
    /// A constant. Resolving it subscribes to nothing.
    Value(T),
    /// An observable, read with deep tracking.
    Observable(Observable<T>),
    /// A function. Every observable it reads is tracked.
    Func(Rc<dyn Fn() -> T>),
}

impl<T> Selector<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// A constant selector.
    pub fn value(value: T) -> Self {
        Selector::Value(value)
    }

    /// A selector reading an observable.
    pub fn observable(observable: &Observable<T>) -> Self {
        Selector::Observable(observable.clone())
    }

    /// A selector computed by `f`.
    pub fn func(f: impl Fn() -> T + 'static) -> Self {
        Selector::Func(Rc::new(f))
    }

    /// Evaluate the selector, registering the current scope as a dependent
    /// of whatever was read.
    ///
    /// Safe to call unconditionally on every render.
    pub fn resolve(&self) -> T {
        match self {
            Selector::Value(value) => value.clone(),
            Selector::Observable(observable) => observable.get(),
            Selector::Func(f) => f(),
        }
    }
}

impl<T> Clone for Selector<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            Selector::Value(value) => Selector::Value(value.clone()),
            Selector::Observable(observable) => Selector::Observable(observable.clone()),
            Selector::Func(f) => Selector::Func(Rc::clone(f)),
        }
    }
}

impl<T> From<Observable<T>> for Selector<T> {
    fn from(observable: Observable<T>) -> Self {
        Selector::Observable(observable)
    }
}

impl<T> From<&Observable<T>> for Selector<T> {
    fn from(observable: &Observable<T>) -> Self {
        Selector::Observable(observable.clone())
    }
}

impl<T> fmt::Debug for Selector<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Selector::Observable(observable) => {
                f.debug_tuple("Observable").field(&observable.id()).finish()
            }
            Selector::Func(_) => f.write_str("Func(..)"),
        }
    }
}
