//! Render context passed to component render functions.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use super::ScopeId;
use crate::error::{RenderError, Result};

/// Per-render access to the scope being rendered.
///
/// Hooks are matched by call order: the n-th `use_hook` call of a render
/// gets the value created by the n-th call of the first render. Call hooks
/// unconditionally, before any early return.
pub struct Cx {
    scope: ScopeId,
    hooks: Vec<Rc<dyn Any>>,
    cursor: usize,
    first_render: bool,
}

impl Cx {
    pub(crate) fn new(scope: ScopeId, hooks: Vec<Rc<dyn Any>>, first_render: bool) -> Self {
        Self {
            scope,
            hooks,
            cursor: 0,
            first_render,
        }
    }

    /// The scope being rendered.
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// Whether this is the scope's first render.
    pub fn is_first_render(&self) -> bool {
        self.first_render
    }

    /// A value that persists across renders of this scope.
    ///
    /// `init` runs only the first time this hook position is reached.
    pub fn use_hook<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Result<Rc<T>> {
        let index = self.cursor;
        self.cursor += 1;

        if let Some(existing) = self.hooks.get(index) {
            return Rc::clone(existing)
                .downcast::<T>()
                .map_err(|_| RenderError::HookMismatch {
                    scope: self.scope,
                    index,
                });
        }

        let value = Rc::new(init());
        self.hooks.push(Rc::clone(&value) as Rc<dyn Any>);
        Ok(value)
    }

    /// A mutable cell that persists across renders of this scope.
    pub fn use_ref<T: 'static>(&mut self, init: impl FnOnce() -> T) -> Result<Rc<RefCell<T>>> {
        self.use_hook(|| RefCell::new(init()))
    }

    pub(crate) fn into_hooks(self) -> Vec<Rc<dyn Any>> {
        self.hooks
    }
}

impl std::fmt::Debug for Cx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cx")
            .field("scope", &self.scope)
            .field("hooks", &self.hooks.len())
            .field("first_render", &self.first_render)
            .finish()
    }
}
