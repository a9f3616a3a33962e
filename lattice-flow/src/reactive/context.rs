//! Reactive Context
//!
//! The reactive context tracks which render scope is currently running.
//! This enables automatic dependency tracking: when an observable is read,
//! the current scope is registered as a dependent at the granularity the
//! read asked for.
//!
//! # Implementation
//!
//! We use a thread-local stack to track the currently executing scope.
//! Rendering a scope pushes an entry; the guard pops it when dropped.
//!
//! An entry may also be *untracked*. Reads under an untracked entry register
//! nothing, even when a tracked entry sits lower in the stack. Control-flow
//! primitives use this to evaluate branch content without subscribing to it.

use std::cell::RefCell;

use smallvec::SmallVec;

use super::runtime::{SignalId, Tracking};
use super::SubscriberId;

/// A dependency recorded while a scope was rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dependency {
    /// The observable that was read.
    pub signal: SignalId,
    /// How much of the observable's change stream the read subscribed to.
    pub tracking: Tracking,
}

/// Dependencies collected for one scope. Most scopes read a handful of
/// observables, so these stay inline.
pub type Dependencies = SmallVec<[Dependency; 4]>;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<ContextEntry>> = const { RefCell::new(Vec::new()) };
}

#[derive(Debug, Clone)]
struct ContextEntry {
    /// `None` for untracked sections.
    subscriber_id: Option<SubscriberId>,
    dependencies: Dependencies,
}

/// Guard that pops the context when dropped.
///
/// This keeps the context stack balanced even if the computation panics.
#[derive(Debug)]
pub struct ReactiveContext {
    subscriber_id: Option<SubscriberId>,
}

impl ReactiveContext {
    /// Enter a new tracked context for the given subscriber.
    ///
    /// While this context is active, observable reads register the
    /// subscriber as a dependent.
    pub fn enter(subscriber_id: SubscriberId) -> Self {
        Self::push(Some(subscriber_id))
    }

    /// Enter a context in which reads are not tracked.
    pub fn enter_untracked() -> Self {
        Self::push(None)
    }

    fn push(subscriber_id: Option<SubscriberId>) -> Self {
        CONTEXT_STACK.with(|stack| {
            stack.borrow_mut().push(ContextEntry {
                subscriber_id,
                dependencies: Dependencies::new(),
            });
        });

        Self { subscriber_id }
    }

    /// Run `f` with dependency tracking suspended.
    pub fn untracked<R>(f: impl FnOnce() -> R) -> R {
        let _ctx = Self::enter_untracked();
        f()
    }

    /// Check if reads are currently being tracked.
    pub fn is_active() -> bool {
        Self::current_subscriber().is_some()
    }

    /// Get the current subscriber ID, if any.
    pub fn current_subscriber() -> Option<SubscriberId> {
        CONTEXT_STACK.with(|stack| stack.borrow().last().and_then(|entry| entry.subscriber_id))
    }

    /// Record a dependency on the given observable.
    ///
    /// Repeated reads of the same observable collapse into one entry holding
    /// the widest tracking requested.
    pub fn track_dependency(signal: SignalId, tracking: Tracking) {
        CONTEXT_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let Some(entry) = stack.last_mut() else {
                return;
            };
            if entry.subscriber_id.is_none() {
                return;
            }
            match entry.dependencies.iter().position(|dep| dep.signal == signal) {
                Some(index) => {
                    let existing = &mut entry.dependencies[index];
                    existing.tracking = existing.tracking.widen(tracking);
                }
                None => entry.dependencies.push(Dependency { signal, tracking }),
            }
        });
    }

    /// Get the dependencies collected in the current context.
    pub fn get_dependencies() -> Dependencies {
        CONTEXT_STACK.with(|stack| {
            stack
                .borrow()
                .last()
                .map(|entry| entry.dependencies.clone())
                .unwrap_or_default()
        })
    }
}

impl Drop for ReactiveContext {
    fn drop(&mut self) {
        CONTEXT_STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();

            if let Some(entry) = popped {
                debug_assert_eq!(
                    entry.subscriber_id, self.subscriber_id,
                    "ReactiveContext mismatch: expected {:?}, got {:?}",
                    self.subscriber_id, entry.subscriber_id
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_tracks_subscriber() {
        let id = SubscriberId::new();

        assert!(!ReactiveContext::is_active());
        assert!(ReactiveContext::current_subscriber().is_none());

        {
            let _ctx = ReactiveContext::enter(id);

            assert!(ReactiveContext::is_active());
            assert_eq!(ReactiveContext::current_subscriber(), Some(id));
        }

        assert!(!ReactiveContext::is_active());
        assert!(ReactiveContext::current_subscriber().is_none());
    }

    #[test]
    fn context_merges_repeated_reads() {
        let id = SubscriberId::new();
        let _ctx = ReactiveContext::enter(id);
        let a = SignalId::new();
        let b = SignalId::new();

        ReactiveContext::track_dependency(a, Tracking::Length);
        ReactiveContext::track_dependency(b, Tracking::Deep);
        ReactiveContext::track_dependency(a, Tracking::Shape);

        let deps = ReactiveContext::get_dependencies();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0], Dependency { signal: a, tracking: Tracking::Shape });
        assert_eq!(deps[1], Dependency { signal: b, tracking: Tracking::Deep });
    }

    #[test]
    fn untracked_section_hides_outer_subscriber() {
        let id = SubscriberId::new();
        let _ctx = ReactiveContext::enter(id);

        ReactiveContext::untracked(|| {
            assert!(!ReactiveContext::is_active());
            ReactiveContext::track_dependency(SignalId::new(), Tracking::Deep);
        });

        assert_eq!(ReactiveContext::current_subscriber(), Some(id));
        assert!(ReactiveContext::get_dependencies().is_empty());
    }

    #[test]
    fn nested_contexts() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();

        {
            let _ctx1 = ReactiveContext::enter(id1);
            assert_eq!(ReactiveContext::current_subscriber(), Some(id1));

            {
                let _ctx2 = ReactiveContext::enter(id2);
                assert_eq!(ReactiveContext::current_subscriber(), Some(id2));
            }

            assert_eq!(ReactiveContext::current_subscriber(), Some(id1));
        }

        assert!(ReactiveContext::current_subscriber().is_none());
    }
}
