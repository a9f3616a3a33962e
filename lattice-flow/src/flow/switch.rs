//! Branching on a selector value.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;

use super::content::Content;
use crate::error::Result;
use crate::host::Cx;
use crate::reactive::Selector;
use crate::view::{Component, ComponentType, Node};

/// Renders the branch whose key equals the selector's value.
///
/// Exactly one branch is rendered: the matching one, else the default, else
/// nothing. A matching branch that renders nothing does not fall through.
///
/// ```rust
/// use lattice_flow::flow::Switch;
/// use lattice_flow::host::Renderer;
/// use lattice_flow::reactive::Observable;
///
/// let tab = Observable::new("home");
///
/// let mut renderer = Renderer::new();
/// renderer
///     .mount(
///         Switch::on(&tab)
///             .case("home", "Home page")
///             .case("about", "About us")
///             .default("Not found")
///             .into(),
///     )
///     .unwrap();
/// assert_eq!(renderer.to_html(), "Home page");
///
/// tab.set("missing");
/// renderer.flush().unwrap();
/// assert_eq!(renderer.to_html(), "Not found");
/// ```
pub struct Switch<K> {
    value: Selector<K>,
    branches: IndexMap<K, Content>,
    default: Option<Content>,
}

impl<K> Switch<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Branch on `value`.
    pub fn on(value: impl Into<Selector<K>>) -> Self {
        Self {
            value: value.into(),
            branches: IndexMap::new(),
            default: None,
        }
    }

    /// Content rendered when the value equals `key`. A later case with the
    /// same key replaces the earlier one.
    pub fn case(mut self, key: K, content: impl Into<Content>) -> Self {
        self.branches.insert(key, content.into());
        self
    }

    /// Content rendered when no case matches.
    pub fn default(mut self, content: impl Into<Content>) -> Self {
        self.default = Some(content.into());
        self
    }

    /// Turn this into a mountable component.
    pub fn into_component(self) -> Component {
        Component::of(ComponentType::of::<Switch<K>>("Switch"), move |cx| self.render(cx))
    }

    fn render(&self, _cx: &mut Cx) -> Result<Node> {
        let key = self.value.resolve();
        match self.branches.get(&key).or(self.default.as_ref()) {
            Some(content) => content.evaluate(),
            None => Ok(Node::Empty),
        }
    }
}

impl<K> From<Switch<K>> for Component
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn from(switch: Switch<K>) -> Self {
        switch.into_component()
    }
}

impl<K> From<Switch<K>> for Node
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn from(switch: Switch<K>) -> Self {
        Node::Component(switch.into_component())
    }
}

impl<K: fmt::Debug> fmt::Debug for Switch<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Switch")
            .field("cases", &self.branches.keys().collect::<Vec<_>>())
            .field("default", &self.default.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Renderer;
    use crate::reactive::Observable;

    fn mount(value: &Observable<u8>) -> Renderer {
        let mut renderer = Renderer::new();
        renderer
            .mount(
                Switch::on(value)
                    .case(1, "one")
                    .case(2, Node::Empty)
                    .default("other")
                    .into(),
            )
            .unwrap();
        renderer
    }

    #[test]
    fn renders_exactly_one_branch() {
        let value = Observable::new(1);
        let mut renderer = mount(&value);
        assert_eq!(renderer.to_html(), "one");

        value.set(7);
        renderer.flush().unwrap();
        assert_eq!(renderer.to_html(), "other");
    }

    #[test]
    fn empty_match_does_not_fall_through() {
        let value = Observable::new(2);
        let renderer = mount(&value);
        assert_eq!(renderer.to_html(), "");
    }

    #[test]
    fn no_match_and_no_default_renders_nothing() {
        let mut renderer = Renderer::new();
        renderer
            .mount(Switch::on(Selector::value("x")).case("y", "why").into())
            .unwrap();
        assert_eq!(renderer.to_html(), "");
    }

    #[test]
    fn function_selectors_are_tracked() {
        let count = Observable::new(3_i32);
        let source = count.clone();
        let mut renderer = Renderer::new();
        renderer
            .mount(
                Switch::on(Selector::func(move || source.get() % 2 == 0))
                    .case(true, "even")
                    .case(false, "odd")
                    .into(),
            )
            .unwrap();
        assert_eq!(renderer.to_html(), "odd");

        count.set(4);
        renderer.flush().unwrap();
        assert_eq!(renderer.to_html(), "even");
    }
}
