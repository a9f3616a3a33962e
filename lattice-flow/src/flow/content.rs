//! Branch content for [`Show`](super::Show) and [`Switch`](super::Switch).

use std::fmt;
use std::rc::Rc;

use crate::error::Result;
use crate::reactive::ReactiveContext;
use crate::view::{Component, Element, Node};

/// What a branch renders: a prebuilt node, or a function producing one.
#[derive(Clone)]
pub enum Content {
    /// A node, cloned into the output each time the branch is chosen.
    Node(Node),
    /// A function called each time the branch is chosen.
    Render(Rc<dyn Fn() -> Result<Node>>),
}

impl Content {
    /// Content produced by `f`.
    pub fn render(f: impl Fn() -> Result<Node> + 'static) -> Self {
        Content::Render(Rc::new(f))
    }

    /// Produce the branch's node.
    ///
    /// Reads made by a render function are not tracked: they belong to the
    /// branch, not to the scope that picked it.
    pub(crate) fn evaluate(&self) -> Result<Node> {
        match self {
            Content::Node(node) => Ok(node.clone()),
            Content::Render(f) => ReactiveContext::untracked(|| f()),
        }
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Content::Render(_) => f.write_str("Render(..)"),
        }
    }
}

impl From<Node> for Content {
    fn from(node: Node) -> Self {
        Content::Node(node)
    }
}

impl From<Element> for Content {
    fn from(element: Element) -> Self {
        Content::Node(element.into())
    }
}

impl From<Component> for Content {
    fn from(component: Component) -> Self {
        Content::Node(component.into())
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Node(text.into())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Node(text.into())
    }
}
