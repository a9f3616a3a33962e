//! Scope boundaries: [`Computed`] and [`Memo`].

use std::fmt;

use crate::error::Result;
use crate::host::Cx;
use crate::view::{Component, Node};

/// A render function mounted as its own scope.
///
/// Its reads subscribe only this scope, so a change re-renders the computed
/// subtree without touching the parent. It also renders whenever its parent
/// does.
pub struct Computed {
    component: Component,
}

impl Computed {
    /// Mount `render` as its own scope.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&mut Cx) -> Result<Node> + 'static,
    {
        Self {
            component: Component::new("Computed", render),
        }
    }

    /// Turn this into a mountable component.
    pub fn into_component(self) -> Component {
        self.component
    }
}

/// A subtree rendered once, on mount, and never again.
///
/// Neither parent renders nor changes to values read inside trigger a new
/// render. Components inside the frozen output are separate scopes and keep
/// updating on their own.
///
/// ```rust
/// use lattice_flow::flow::Memo;
/// use lattice_flow::host::Renderer;
/// use lattice_flow::reactive::Observable;
/// use lattice_flow::view::text;
///
/// let title = Observable::new("first");
/// let source = title.clone();
///
/// let mut renderer = Renderer::new();
/// renderer.mount(Memo::new(move |_cx| Ok(text(source.get()))).into()).unwrap();
///
/// title.set("second");
/// renderer.flush().unwrap();
/// assert_eq!(renderer.to_html(), "first");
/// ```
pub struct Memo {
    component: Component,
}

impl Memo {
    /// Freeze the output of `render`.
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&mut Cx) -> Result<Node> + 'static,
    {
        Self {
            component: Component::new("Memo", render).frozen(),
        }
    }

    /// Turn this into a mountable component.
    pub fn into_component(self) -> Component {
        self.component
    }
}

macro_rules! scope_conversions {
    ($($ty:ident),*) => {
        $(
            impl From<$ty> for Component {
                fn from(scope: $ty) -> Self {
                    scope.into_component()
                }
            }

            impl From<$ty> for Node {
                fn from(scope: $ty) -> Self {
                    Node::Component(scope.into_component())
                }
            }

            impl fmt::Debug for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_tuple(stringify!($ty)).field(&self.component).finish()
                }
            }
        )*
    };
}

scope_conversions!(Computed, Memo);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Renderer;
    use crate::reactive::Observable;
    use crate::view::{el, text};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn computed_isolates_its_reads() {
        let count = Observable::new(1);
        let source = count.clone();
        let parent_renders = Rc::new(Cell::new(0));
        let seen = parent_renders.clone();

        let mut renderer = Renderer::new();
        renderer
            .mount(Component::new("Parent", move |_cx| {
                seen.set(seen.get() + 1);
                let source = source.clone();
                Ok(el("p")
                    .child(Computed::new(move |_cx| Ok(text(source.get().to_string()))))
                    .into())
            }))
            .unwrap();

        count.set(2);
        renderer.flush().unwrap();
        assert_eq!(renderer.to_html(), "<p>2</p>");
        assert_eq!(parent_renders.get(), 1);
    }

    #[test]
    fn memo_survives_parent_renders() {
        let tick = Observable::new(0);
        let source = tick.clone();
        let memo_renders = Rc::new(Cell::new(0));
        let seen = memo_renders.clone();

        let mut renderer = Renderer::new();
        renderer
            .mount(Component::new("Parent", move |_cx| {
                let value = source.get();
                let seen = seen.clone();
                Ok(Node::Fragment(vec![
                    text(value.to_string()),
                    Memo::new(move |_cx| {
                        seen.set(seen.get() + 1);
                        Ok(text(format!("@{}", value)))
                    })
                    .into(),
                ]))
            }))
            .unwrap();

        for next in 1..4 {
            tick.set(next);
            renderer.flush().unwrap();
        }
        assert_eq!(renderer.to_html(), "3@0");
        assert_eq!(memo_renders.get(), 1);
    }

    #[test]
    fn memo_holds_no_subscriptions() {
        let value = Observable::new(1);
        let source = value.clone();

        let mut renderer = Renderer::new();
        let root = renderer
            .mount(Memo::new(move |_cx| Ok(text(source.get().to_string()))).into())
            .unwrap();
        assert_eq!(renderer.subscriptions(root), 0);
        assert_eq!(value.subscriber_count(), 0);
    }
}
