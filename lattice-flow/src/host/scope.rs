//! Mounted scopes.
//!
//! A scope is one mounted component instance: its render function, hooks,
//! cached output, child scopes and subscriptions. Each scope is registered
//! with the reactive [`Runtime`](crate::reactive::Runtime) through a small
//! [`ScopeHandle`] that pushes the scope onto its renderer's dirty queue.

use std::any::Any;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;

use crate::reactive::{Dependencies, Reactive, ReactiveHandle, SubscriberId};
use crate::view::{ComponentType, Key, MemoPolicy, Node, RenderFn};

/// Identifier of a mounted scope.
///
/// Every scope is a subscriber of the reactive runtime, so the two share an
/// identifier space.
pub type ScopeId = SubscriberId;

/// Scopes marked dirty since the last flush, in notification order.
pub(crate) type DirtyQueue = Arc<Mutex<IndexSet<ScopeId>>>;

/// The runtime's view of a scope.
pub(crate) struct ScopeHandle {
    id: ScopeId,
    queue: DirtyQueue,
}

impl ScopeHandle {
    pub(crate) fn new(id: ScopeId, queue: DirtyQueue) -> Self {
        Self { id, queue }
    }
}

impl Reactive for ScopeHandle {
    fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    fn mark_dirty(&self) {
        self.queue.lock().insert(self.id);
    }
}

/// Where a child component sits in its parent's output.
///
/// Keyed children match by key, unkeyed children by their position among
/// unkeyed siblings of the same type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ChildSlot {
    Keyed(ComponentType, Key),
    Position(ComponentType, usize),
}

pub(crate) struct Scope {
    pub(crate) kind: ComponentType,
    pub(crate) key: Option<Key>,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) render: RenderFn,
    pub(crate) memo: MemoPolicy,
    pub(crate) hooks: Vec<Rc<dyn Any>>,
    pub(crate) output: Rc<Node>,
    pub(crate) children: IndexMap<ChildSlot, ScopeId>,
    pub(crate) dependencies: Dependencies,
    pub(crate) render_count: usize,
    pub(crate) _handle: ReactiveHandle,
}

impl Scope {
    /// Frozen scopes never render again once mounted.
    pub(crate) fn is_settled(&self) -> bool {
        self.memo.is_frozen() && self.render_count > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Runtime;

    #[test]
    fn handle_queues_its_scope_once() {
        let queue: DirtyQueue = Arc::default();
        let id = ScopeId::new();
        let _registered = Runtime::register(Arc::new(ScopeHandle::new(id, queue.clone())));
        let handle = ScopeHandle::new(id, queue.clone());

        handle.mark_dirty();
        handle.mark_dirty();

        let queued: Vec<_> = queue.lock().iter().copied().collect();
        assert_eq!(queued, vec![id]);
    }
}
