//! View Nodes
//!
//! A [`Node`] describes what a render function wants on screen. Plain
//! elements and text are kept as-is; [`Component`] nodes are turned into
//! child scopes by the host renderer and replaced with [`Node::Mounted`]
//! references in the scope's cached output.

use std::fmt::Write as _;

use indexmap::IndexMap;

use super::component::Component;
use crate::host::ScopeId;

/// A description of rendered output.
#[derive(Debug, Clone, Default)]
pub enum Node {
    /// Nothing.
    #[default]
    Empty,
    /// A text node.
    Text(String),
    /// An element with attributes and children.
    Element(Element),
    /// An ordered sequence of nodes without a wrapper.
    Fragment(Vec<Node>),
    /// A component to mount as a child scope.
    Component(Component),
    /// A reference to an already mounted child scope.
    Mounted(Mount),
}

impl Node {
    /// Whether this node renders nothing at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Node::Empty => true,
            Node::Fragment(children) => children.iter().all(Node::is_empty),
            _ => false,
        }
    }

    /// Render this node as markup.
    ///
    /// Component and mounted nodes render nothing here; use
    /// [`Renderer::to_html`](crate::host::Renderer::to_html) for a mounted
    /// view.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Empty | Node::Component(_) | Node::Mounted(_) => {}
            Node::Text(text) => escape_into(text, out),
            Node::Fragment(children) => {
                for child in children {
                    child.write_html(out);
                }
            }
            Node::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attrs {
                    let _ = write!(out, " {}=\"", name);
                    escape_into(value, out);
                    out.push('"');
                }
                out.push('>');
                for child in &element.children {
                    child.write_html(out);
                }
                let _ = write!(out, "</{}>", element.tag);
            }
        }
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

/// An element node.
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attrs: IndexMap<String, String>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Append a child.
    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children.
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Append a text child.
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    /// The element's tag.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Look up an attribute.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// The element's children.
    pub fn child_nodes(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn with_children(&self, children: Vec<Node>) -> Self {
        Self {
            tag: self.tag.clone(),
            attrs: self.attrs.clone(),
            children,
        }
    }

    pub(crate) fn map_children<E>(
        self,
        f: impl FnMut(Node) -> Result<Node, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            tag: self.tag,
            attrs: self.attrs,
            children: self.children.into_iter().map(f).collect::<Result<_, E>>()?,
        })
    }
}

/// Reference from a scope's output to one of its mounted child scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mount(ScopeId);

impl Mount {
    pub(crate) fn new(scope: ScopeId) -> Self {
        Self(scope)
    }

    /// The mounted child scope.
    pub fn scope(&self) -> ScopeId {
        self.0
    }
}

/// Shorthand for [`Element::new`].
pub fn el(tag: impl Into<String>) -> Element {
    Element::new(tag)
}

/// Shorthand for a text node.
pub fn text(text: impl Into<String>) -> Node {
    Node::Text(text.into())
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<Component> for Node {
    fn from(component: Component) -> Self {
        Node::Component(component)
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_owned())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl From<Vec<Node>> for Node {
    fn from(children: Vec<Node>) -> Self {
        Node::Fragment(children)
    }
}

impl From<()> for Node {
    fn from(_: ()) -> Self {
        Node::Empty
    }
}
