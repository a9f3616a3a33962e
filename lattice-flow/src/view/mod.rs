//! View Model
//!
//! The types render functions produce: [`Node`] trees made of elements,
//! text, fragments and [`Component`]s, plus the [`Key`]s that identify keyed
//! components across renders.

mod component;
mod key;
mod node;

pub use component::{Component, ComponentType, MemoPolicy, Props, RenderFn};
pub use key::Key;
pub use node::{el, text, Element, Mount, Node};
