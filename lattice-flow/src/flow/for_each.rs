//! Keyed List Rendering
//!
//! [`For`] turns an [`ObservableList`] into one keyed child component per
//! element. It never diffs element values itself:
//!
//! 1. The `For` scope subscribes to the list's shape only (or only its
//!    length, when optimized). Mutating an element does not re-render it.
//!
//! 2. Each element becomes an item component keyed by the element's
//!    identity and memoized on [`ItemProps`]. When `For` does re-render,
//!    items whose key and element handle are unchanged are skipped.
//!
//! 3. An item component that reads its element subscribes to that element
//!    alone, so a mutation re-renders exactly one item.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::identity::{self, HasIdentity, IdField};
use crate::error::{RenderError, Result};
use crate::host::Cx;
use crate::reactive::{Observable, ObservableList, Tracking};
use crate::view::{Component, ComponentType, Key, Node};

/// Render function for one element, used by [`For::children`].
pub type ChildrenFn<T> = Rc<dyn Fn(&Observable<T>) -> Result<Node>>;

type ItemRenderFn<T> = Rc<dyn Fn(&mut Cx, &ItemProps<T>) -> Result<Node>>;

/// Props of an item component.
///
/// Two props are equal when their keys are equal and they hold the same
/// element handle. Element values are never compared.
pub struct ItemProps<T> {
    /// The element's identity.
    pub key: Key,
    /// The element.
    pub item: Observable<T>,
}

impl<T> Clone for ItemProps<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            item: self.item.clone(),
        }
    }
}

impl<T> PartialEq for ItemProps<T>
where
    T: Send + Sync + 'static,
{
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.item.ptr_eq(&other.item)
    }
}

impl<T> fmt::Debug for ItemProps<T>
where
    T: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemProps")
            .field("key", &self.key)
            .field("item", &self.item.id())
            .finish()
    }
}

/// A component rendered once per list element.
///
/// ```rust
/// use lattice_flow::flow::{For, ItemComponent, ItemProps};
/// use lattice_flow::host::Renderer;
/// use lattice_flow::reactive::ObservableList;
/// use lattice_flow::view::el;
///
/// let row = ItemComponent::new("Row", |_cx, props: &ItemProps<String>| {
///     Ok(el("li").text(props.item.get()).into())
/// });
/// let names = ObservableList::from_vec(vec!["ada".to_string(), "grace".to_string()]);
///
/// let mut renderer = Renderer::new();
/// renderer.mount(For::each(&names).item(row).into()).unwrap();
/// assert_eq!(renderer.to_html(), "<li>ada</li><li>grace</li>");
/// ```
pub struct ItemComponent<T> {
    kind: ComponentType,
    render: ItemRenderFn<T>,
}

impl<T> ItemComponent<T>
where
    T: Send + Sync + 'static,
{
    /// An item component whose type is derived from the render closure.
    pub fn new<F>(name: &'static str, render: F) -> Self
    where
        F: Fn(&mut Cx, &ItemProps<T>) -> Result<Node> + 'static,
    {
        Self {
            kind: ComponentType::of::<F>(name),
            render: Rc::new(render),
        }
    }

    /// An item component that forwards to whatever `cell` holds at the time
    /// the item renders.
    fn dispatch(kind: ComponentType, cell: Rc<RefCell<Option<ChildrenFn<T>>>>) -> Self {
        Self {
            kind,
            render: Rc::new(move |_cx: &mut Cx, props: &ItemProps<T>| {
                let children = cell.borrow().clone();
                match children {
                    Some(children) => children(&props.item),
                    None => Ok(Node::Empty),
                }
            }),
        }
    }

    fn instantiate(&self, props: ItemProps<T>) -> Component {
        let render = Rc::clone(&self.render);
        let key = props.key.clone();
        let memo = props.clone();
        Component::of(self.kind, move |cx| render(cx, &props))
            .keyed(key)
            .memo(memo)
    }
}

impl<T> Clone for ItemComponent<T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            render: Rc::clone(&self.render),
        }
    }
}

impl<T> fmt::Debug for ItemComponent<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemComponent")
            .field("kind", &self.kind)
            .finish()
    }
}

/// Renders one keyed item per element of a list.
///
/// Holes and falsy elements (see [`HasIdentity::is_present`]) are skipped,
/// and skipped elements keep their index. Keys come from the elements' `id`, `_id` or `__id`
/// field (see [`HasIdentity`]) or from [`For::key_by`], falling back to the
/// element's position.
///
/// When both [`For::item`] and [`For::children`] are set, `item` is used.
/// Rendering a non-empty list with neither is
/// [`RenderError::MissingItemRenderer`].
pub struct For<T> {
    each: Option<ObservableList<T>>,
    optimized: bool,
    item: Option<ItemComponent<T>>,
    children: Option<ChildrenFn<T>>,
    key_by: Option<Rc<dyn Fn(&T) -> Key>>,
}

impl<T> For<T>
where
    T: HasIdentity + Send + Sync + 'static,
{
    /// Render the elements of `list`.
    pub fn each(list: &ObservableList<T>) -> Self {
        Self::maybe(Some(list.clone()))
    }

    /// Render the elements of `list`, or nothing when there is no list.
    pub fn maybe(list: Option<ObservableList<T>>) -> Self {
        Self {
            each: list,
            optimized: false,
            item: None,
            children: None,
            key_by: None,
        }
    }

    /// Re-render only when the list's length changes.
    ///
    /// Replacing or reordering elements without changing the length is then
    /// not reflected until the next length change.
    pub fn optimized(mut self, optimized: bool) -> Self {
        self.optimized = optimized;
        self
    }

    /// The component rendered for each element.
    pub fn item(mut self, item: ItemComponent<T>) -> Self {
        self.item = Some(item);
        self
    }

    /// A render function for each element, wrapped in an item component.
    ///
    /// The newest function is used whenever an item renders, while item
    /// instances are kept across `For` renders.
    pub fn children(mut self, children: impl Fn(&Observable<T>) -> Result<Node> + 'static) -> Self {
        self.children = Some(Rc::new(children));
        self
    }

    /// Derive keys with `key` instead of probing identity fields.
    pub fn key_by(mut self, key: impl Fn(&T) -> Key + 'static) -> Self {
        self.key_by = Some(Rc::new(key));
        self
    }

    /// Turn this into a mountable component.
    pub fn into_component(self) -> Component {
        Component::of(ComponentType::of::<For<T>>("For"), move |cx| self.render(cx))
    }

    fn render(&self, cx: &mut Cx) -> Result<Node> {
        let latest = cx.use_ref(|| None::<ChildrenFn<T>>)?;
        let item_kind = *cx.use_hook(|| ComponentType::new("ForItem"))?;

        let Some(list) = &self.each else {
            return Ok(Node::Empty);
        };
        // Subscribe to the list shape, or only its length when optimized.
        let tracking = if self.optimized {
            Tracking::Length
        } else {
            Tracking::Shape
        };
        let slots = list.get(tracking);
        if slots.is_empty() {
            return Ok(Node::Empty);
        }

        // Pick the item renderer.
        let item = match (&self.item, &self.children) {
            (Some(item), children) => {
                if children.is_some() {
                    debug!(scope = %cx.scope(), "`For` has both `item` and `children`, using `item`");
                }
                item.clone()
            }
            (None, Some(children)) => {
                *latest.borrow_mut() = Some(Rc::clone(children));
                ItemComponent::dispatch(item_kind, latest)
            }
            (None, None) => return Err(RenderError::MissingItemRenderer),
        };

        let field = match self.key_by {
            Some(_) => None,
            None => identity::identity_field(&slots),
        };

        // One keyed item per present element.
        let items = slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let element = identity::present(slot)?;
                let props = ItemProps {
                    key: self.key_for(element, field, index),
                    item: element.clone(),
                };
                Some(Node::Component(item.instantiate(props)))
            })
            .collect();
        Ok(Node::Fragment(items))
    }

    fn key_for(&self, element: &Observable<T>, field: Option<IdField>, index: usize) -> Key {
        match &self.key_by {
            Some(key_by) => element.peek_with(|value| key_by(value)),
            None => identity::key_of(element, field, index),
        }
    }
}

impl<T> From<For<T>> for Component
where
    T: HasIdentity + Send + Sync + 'static,
{
    fn from(list: For<T>) -> Self {
        list.into_component()
    }
}

impl<T> From<For<T>> for Node
where
    T: HasIdentity + Send + Sync + 'static,
{
    fn from(list: For<T>) -> Self {
        Node::Component(list.into_component())
    }
}

impl<T> fmt::Debug for For<T>
where
    T: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("For")
            .field("each", &self.each.as_ref().map(ObservableList::id))
            .field("optimized", &self.optimized)
            .field("item", &self.item)
            .field("children", &self.children.is_some())
            .field("key_by", &self.key_by.is_some())
            .finish()
    }
}
