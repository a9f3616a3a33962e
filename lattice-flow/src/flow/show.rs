//! Conditional rendering.

use std::fmt;
use std::rc::Rc;

use super::content::Content;
use crate::error::Result;
use crate::host::Cx;
use crate::reactive::Selector;
use crate::view::{Component, ComponentType, Node};

/// Truthiness of a selector value.
///
/// Zero, `NaN`, empty strings, `false` and `None` are falsy. Collections
/// are truthy even when empty.
pub trait Truthy {
    /// Whether the value counts as true.
    fn is_truthy(&self) -> bool;
}

impl Truthy for bool {
    fn is_truthy(&self) -> bool {
        *self
    }
}

impl<T: Truthy> Truthy for Option<T> {
    fn is_truthy(&self) -> bool {
        self.as_ref().is_some_and(Truthy::is_truthy)
    }
}

macro_rules! int_truthy {
    ($($ty:ty),*) => {
        $(
            impl Truthy for $ty {
                fn is_truthy(&self) -> bool {
                    *self != 0
                }
            }
        )*
    };
}

int_truthy!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Truthy for f32 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for f64 {
    fn is_truthy(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }
}

impl Truthy for String {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl Truthy for &'static str {
    fn is_truthy(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Truthy for Vec<T> {
    fn is_truthy(&self) -> bool {
        true
    }
}

impl Truthy for serde_json::Value {
    fn is_truthy(&self) -> bool {
        match self {
            serde_json::Value::Null => false,
            serde_json::Value::Bool(value) => *value,
            serde_json::Value::Number(number) => number.as_f64().is_some_and(|n| n.is_truthy()),
            serde_json::Value::String(value) => !value.is_empty(),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
        }
    }
}

/// Render function of a wrapper component. Receives the chosen branch.
pub type WrapFn = Rc<dyn Fn(&mut Cx, Node) -> Result<Node>>;

/// Renders `then` while a selector is truthy, `otherwise` when it is not.
///
/// Only the selector is tracked. A branch that reads observables should
/// mount its own component, which then re-renders on its own.
///
/// ```rust
/// use lattice_flow::flow::Show;
/// use lattice_flow::host::Renderer;
/// use lattice_flow::reactive::Observable;
///
/// let logged_in = Observable::new(false);
///
/// let mut renderer = Renderer::new();
/// renderer
///     .mount(Show::when(&logged_in).then("welcome back").otherwise("please sign in").into())
///     .unwrap();
/// assert_eq!(renderer.to_html(), "please sign in");
///
/// logged_in.set(true);
/// renderer.flush().unwrap();
/// assert_eq!(renderer.to_html(), "welcome back");
/// ```
pub struct Show<T> {
    when: Selector<T>,
    then: Content,
    otherwise: Option<Content>,
    wrap: Option<WrapFn>,
}

impl<T> Show<T>
where
    T: Truthy + Clone + Send + Sync + 'static,
{
    /// Show content while `when` is truthy.
    pub fn when(when: impl Into<Selector<T>>) -> Self {
        Self {
            when: when.into(),
            then: Content::Node(Node::Empty),
            otherwise: None,
            wrap: None,
        }
    }

    /// Content for a truthy selector.
    pub fn then(mut self, content: impl Into<Content>) -> Self {
        self.then = content.into();
        self
    }

    /// Content for a falsy selector. Without it, a falsy selector renders
    /// nothing.
    pub fn otherwise(mut self, content: impl Into<Content>) -> Self {
        self.otherwise = Some(content.into());
        self
    }

    /// Mount the chosen branch, even an empty one, as the single child of a
    /// wrapper component.
    pub fn wrap(mut self, wrap: impl Fn(&mut Cx, Node) -> Result<Node> + 'static) -> Self {
        self.wrap = Some(Rc::new(wrap));
        self
    }

    /// Turn this into a mountable component.
    pub fn into_component(self) -> Component {
        Component::of(ComponentType::of::<Show<T>>("Show"), move |cx| self.render(cx))
    }

    fn render(&self, cx: &mut Cx) -> Result<Node> {
        let wrap_kind = *cx.use_hook(|| ComponentType::new("ShowWrap"))?;

        let branch = if self.when.resolve().is_truthy() {
            Some(&self.then)
        } else {
            self.otherwise.as_ref()
        };
        let child = match branch {
            Some(content) => content.evaluate()?,
            None => Node::Empty,
        };

        match &self.wrap {
            Some(wrap) => {
                let wrap = Rc::clone(wrap);
                Ok(Component::of(wrap_kind, move |cx| wrap(cx, child.clone())).into())
            }
            None => Ok(child),
        }
    }
}

impl<T> From<Show<T>> for Component
where
    T: Truthy + Clone + Send + Sync + 'static,
{
    fn from(show: Show<T>) -> Self {
        show.into_component()
    }
}

impl<T> From<Show<T>> for Node
where
    T: Truthy + Clone + Send + Sync + 'static,
{
    fn from(show: Show<T>) -> Self {
        Node::Component(show.into_component())
    }
}

impl<T> fmt::Debug for Show<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Show")
            .field("then", &self.then)
            .field("otherwise", &self.otherwise)
            .field("wrapped", &self.wrap.is_some())
            .finish()
    }
}
