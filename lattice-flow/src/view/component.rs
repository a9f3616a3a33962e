//! Components
//!
//! A [`Component`] is a deferred render function plus what the host needs to
//! decide whether to run it: a [`ComponentType`] and optional [`Key`] for
//! matching against the previous render, and a [`MemoPolicy`] for deciding
//! whether an existing instance must render again.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use dashmap::DashMap;

use super::key::Key;
use super::node::Node;
use crate::error::Result;
use crate::host::Cx;

/// A render function for a component scope.
pub type RenderFn = Rc<dyn Fn(&mut Cx) -> Result<Node>>;

/// Identity of a component "kind".
///
/// Two components only match across renders when their types are equal. A
/// new type in the same position tears the old instance down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentType {
    id: u64,
    name: &'static str,
}

static TYPES: OnceLock<DashMap<TypeId, ComponentType>> = OnceLock::new();

impl ComponentType {
    /// A fresh type, distinct from every other.
    pub fn new(name: &'static str) -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self {
            id: COUNTER.fetch_add(1, Ordering::Relaxed),
            name,
        }
    }

    /// The type associated with the Rust type `M`.
    ///
    /// Always returns the same value for the same `M`, so a closure literal
    /// used as a render function keeps its type across renders.
    pub fn of<M: ?Sized + 'static>(name: &'static str) -> Self {
        let types = TYPES.get_or_init(DashMap::new);
        let kind = *types
            .entry(TypeId::of::<M>())
            .or_insert_with(|| Self::new(name));
        kind
    }

    /// The name given at creation, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Props that can be compared for memoization.
///
/// Implemented for every `PartialEq + 'static` type.
pub trait Props: Any {
    /// Whether `other` is the same type and equal to `self`.
    fn props_eq(&self, other: &dyn Props) -> bool;

    /// Upcast for downcasting.
    fn as_any(&self) -> &dyn Any;
}

impl<P> Props for P
where
    P: PartialEq + 'static,
{
    fn props_eq(&self, other: &dyn Props) -> bool {
        other
            .as_any()
            .downcast_ref::<P>()
            .is_some_and(|other| self == other)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// When a mounted component renders again.
#[derive(Clone)]
pub enum MemoPolicy {
    /// Every time its parent renders, and whenever its own reads change.
    Always,
    /// Only when its props differ from the previous render's props, or when
    /// its own reads change.
    Props(Rc<dyn Props>),
    /// Once, on mount. Never again, and its reads are not tracked.
    Frozen,
}

impl MemoPolicy {
    /// Whether a mounted instance rendered with `self` can skip a parent
    /// render that now asks for `next`.
    pub fn can_skip(&self, next: &MemoPolicy) -> bool {
        match (self, next) {
            (MemoPolicy::Frozen, _) => true,
            (MemoPolicy::Props(previous), MemoPolicy::Props(next)) => {
                previous.props_eq(next.as_ref())
            }
            _ => false,
        }
    }

    /// Whether this policy is [`MemoPolicy::Frozen`].
    pub fn is_frozen(&self) -> bool {
        matches!(self, MemoPolicy::Frozen)
    }
}

impl fmt::Debug for MemoPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemoPolicy::Always => f.write_str("Always"),
            MemoPolicy::Props(_) => f.write_str("Props(..)"),
            MemoPolicy::Frozen => f.write_str("Frozen"),
        }
    }
}

/// A component to be mounted as its own render scope.
///
/// # Example
///
/// ```rust
/// use lattice_flow::view::{el, Component};
///
/// let greeting = Component::new("Greeting", |_cx| Ok(el("p").text("hello").into()));
/// assert_eq!(greeting.kind().name(), "Greeting");
/// ```
#[derive(Clone)]
pub struct Component {
    kind: ComponentType,
    key: Option<Key>,
    render: RenderFn,
    memo: MemoPolicy,
}

impl Component {
    /// A component whose type is derived from the render closure's type.
    pub fn new<F>(name: &'static str, render: F) -> Self
    where
        F: Fn(&mut Cx) -> Result<Node> + 'static,
    {
        Self::of(ComponentType::of::<F>(name), render)
    }

    /// A component of an explicit type.
    pub fn of<F>(kind: ComponentType, render: F) -> Self
    where
        F: Fn(&mut Cx) -> Result<Node> + 'static,
    {
        Self {
            kind,
            key: None,
            render: Rc::new(render),
            memo: MemoPolicy::Always,
        }
    }

    /// Give the component a key, matched instead of its position.
    pub fn keyed(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Skip re-renders from the parent while `props` stays equal.
    pub fn memo<P>(mut self, props: P) -> Self
    where
        P: PartialEq + 'static,
    {
        self.memo = MemoPolicy::Props(Rc::new(props));
        self
    }

    /// Render once, then never again.
    pub fn frozen(mut self) -> Self {
        self.memo = MemoPolicy::Frozen;
        self
    }

    /// The component's type.
    pub fn kind(&self) -> ComponentType {
        self.kind
    }

    /// The component's key, if any.
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// The component's memo policy.
    pub fn memo_policy(&self) -> &MemoPolicy {
        &self.memo
    }

    pub(crate) fn into_parts(self) -> (ComponentType, Option<Key>, RenderFn, MemoPolicy) {
        (self.kind, self.key, self.render, self.memo)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("kind", &self.kind.name)
            .field("key", &self.key)
            .field("memo", &self.memo)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_type_is_stable_per_rust_type() {
        struct Marker;
        assert_eq!(ComponentType::of::<Marker>("A"), ComponentType::of::<Marker>("A"));
        assert_ne!(ComponentType::of::<Marker>("A"), ComponentType::of::<u8>("A"));
        assert_ne!(ComponentType::new("B"), ComponentType::new("B"));
    }

    #[test]
    fn same_closure_literal_keeps_its_type() {
        fn make(label: &'static str) -> Component {
            Component::new("Label", move |_cx| Ok(Node::Text(label.to_owned())))
        }
        assert_eq!(make("a").kind(), make("b").kind());
    }

    #[test]
    fn props_policy_compares_values() {
        let previous = MemoPolicy::Props(Rc::new(1_u32));
        assert!(previous.can_skip(&MemoPolicy::Props(Rc::new(1_u32))));
        assert!(!previous.can_skip(&MemoPolicy::Props(Rc::new(2_u32))));
        assert!(!previous.can_skip(&MemoPolicy::Props(Rc::new(1_i64))));
        assert!(!previous.can_skip(&MemoPolicy::Always));
    }

    #[test]
    fn frozen_always_skips() {
        assert!(MemoPolicy::Frozen.can_skip(&MemoPolicy::Always));
        assert!(!MemoPolicy::Always.can_skip(&MemoPolicy::Always));
    }
}
