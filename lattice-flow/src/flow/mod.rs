//! Control Flow
//!
//! Composition primitives built on the host renderer. Each one mounts as its
//! own scope and subscribes only to what it resolves itself:
//!
//! - [`Show`]: one of two branches, picked by a truthy selector
//! - [`Switch`]: one of many branches, picked by key
//! - [`Computed`] and [`Memo`]: scope boundaries, the latter rendered once
//! - [`For`]: keyed items for an observable list

mod content;
mod for_each;
mod identity;
mod memo;
mod show;
mod switch;

pub use content::Content;
pub use for_each::{ChildrenFn, For, ItemComponent, ItemProps};
pub use identity::{HasIdentity, IdField};
pub use memo::{Computed, Memo};
pub use show::{Show, Truthy, WrapFn};
pub use switch::Switch;
