//! Renderer
//!
//! The renderer owns a tree of mounted scopes and keeps it in sync with the
//! observable store.
//!
//! # Rendering a Scope
//!
//! 1. Clear the scope's subscriptions and run its render function inside a
//!    tracked [`ReactiveContext`]. Reads made during the call become the new
//!    subscriptions.
//!
//! 2. Walk the returned [`Node`]. Each [`Component`] node is matched against
//!    the previous render's children by type and key (or position):
//!    - no match: mount a new child scope and render it
//!    - match whose [`MemoPolicy`] allows skipping: keep its cached output
//!    - otherwise: swap in the new render function and render it again
//!
//! 3. Unmount every previous child that was not matched.
//!
//! # Flushing
//!
//! Observable writes mark scopes dirty through the runtime. [`Renderer::flush`]
//! walks the tree depth-first in child order and re-renders the dirty scopes,
//! so a parent always renders before its children and list items render in
//! list order. A scope already rendered by its parent in the same pass is not
//! rendered twice.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use super::config::RendererConfig;
use super::cx::Cx;
use super::scope::{ChildSlot, DirtyQueue, Scope, ScopeHandle, ScopeId};
use crate::error::{RenderError, Result};
use crate::reactive::{Dependencies, ReactiveContext, Runtime};
use crate::view::{Component, ComponentType, Key, MemoPolicy, Mount, Node, RenderFn};

/// Mounts a component tree and re-renders the parts of it that go stale.
///
/// # Example
///
/// ```rust
/// use lattice_flow::host::Renderer;
/// use lattice_flow::reactive::Observable;
/// use lattice_flow::view::{el, Component};
///
/// let name = Observable::new("world".to_string());
/// let source = name.clone();
///
/// let mut renderer = Renderer::new();
/// renderer
///     .mount(Component::new("Hello", move |_cx| {
///         Ok(el("p").text(format!("hello {}", source.get())).into())
///     }))
///     .unwrap();
/// assert_eq!(renderer.to_html(), "<p>hello world</p>");
///
/// name.set("there".to_string());
/// renderer.flush().unwrap();
/// assert_eq!(renderer.to_html(), "<p>hello there</p>");
/// ```
pub struct Renderer {
    config: RendererConfig,
    scopes: HashMap<ScopeId, Scope>,
    root: Option<ScopeId>,
    queue: DirtyQueue,
    /// Scopes rendered during the current mount or flush pass.
    rendered: HashSet<ScopeId>,
    render_total: usize,
}

impl Renderer {
    /// Create a renderer with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RendererConfig::default())
    }

    /// Create a renderer with the given configuration.
    pub fn with_config(config: RendererConfig) -> Self {
        Self {
            config,
            scopes: HashMap::new(),
            root: None,
            queue: Arc::default(),
            rendered: HashSet::new(),
            render_total: 0,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Mount `root`, replacing whatever was mounted before.
    pub fn mount(&mut self, root: Component) -> Result<ScopeId> {
        self.unmount();
        self.rendered.clear();

        let (kind, key, render, memo) = root.into_parts();
        let id = self.mount_scope(None, kind, key, render, memo)?;
        self.root = Some(id);
        Ok(id)
    }

    /// Unmount everything.
    pub fn unmount(&mut self) {
        if let Some(root) = self.root.take() {
            self.unmount_scope(root);
        }
        self.queue.lock().clear();
    }

    /// Re-render every dirty scope until nothing is dirty.
    ///
    /// Returns the number of scope renders performed.
    pub fn flush(&mut self) -> Result<usize> {
        let root = self.root.ok_or(RenderError::NotMounted)?;
        let start = self.render_total;

        for pass in 0..self.config.max_flush_passes {
            let dirty: HashSet<ScopeId> = {
                let mut queue = self.queue.lock();
                queue
                    .drain(..)
                    .filter(|id| self.scopes.contains_key(id))
                    .collect()
            };
            if dirty.is_empty() {
                return Ok(self.render_total - start);
            }

            debug!(pass, dirty = dirty.len(), "flush pass");
            self.rendered.clear();
            self.flush_pass(root, &dirty)?;
        }

        if self.pending() > 0 {
            return Err(RenderError::RenderLoop {
                passes: self.config.max_flush_passes,
            });
        }
        Ok(self.render_total - start)
    }

    /// Number of mounted scopes waiting to re-render.
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .iter()
            .filter(|id| self.scopes.contains_key(id))
            .count()
    }

    fn flush_pass(&mut self, root: ScopeId, dirty: &HashSet<ScopeId>) -> Result<()> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(scope) = self.scopes.get(&id) else {
                continue;
            };
            if dirty.contains(&id) && !self.rendered.contains(&id) && !scope.is_settled() {
                self.render_scope(id)?;
            }
            if let Some(scope) = self.scopes.get(&id) {
                stack.extend(scope.children.values().rev().copied());
            }
        }
        Ok(())
    }

    fn mount_scope(
        &mut self,
        parent: Option<ScopeId>,
        kind: ComponentType,
        key: Option<Key>,
        render: RenderFn,
        memo: MemoPolicy,
    ) -> Result<ScopeId> {
        let id = ScopeId::new();
        let handle = Runtime::register(Arc::new(ScopeHandle::new(id, Arc::clone(&self.queue))));
        debug!(scope = %id, component = kind.name(), key = ?key, "mount");

        self.scopes.insert(
            id,
            Scope {
                kind,
                key,
                parent,
                render,
                memo,
                hooks: Vec::new(),
                output: Rc::new(Node::Empty),
                children: IndexMap::new(),
                dependencies: Dependencies::new(),
                render_count: 0,
                _handle: handle,
            },
        );

        if let Err(err) = self.render_scope(id) {
            self.unmount_scope(id);
            return Err(err);
        }
        Ok(id)
    }

    fn update_scope(&mut self, id: ScopeId, render: RenderFn, memo: MemoPolicy) -> Result<()> {
        let Some(scope) = self.scopes.get_mut(&id) else {
            return Ok(());
        };
        if scope.memo.can_skip(&memo) {
            trace!(scope = %id, component = scope.kind.name(), "memo skip");
            return Ok(());
        }
        scope.render = render;
        scope.memo = memo;
        self.render_scope(id)
    }

    fn unmount_scope(&mut self, id: ScopeId) {
        let Some(scope) = self.scopes.remove(&id) else {
            return;
        };
        debug!(scope = %id, component = scope.kind.name(), "unmount");
        for child in scope.children.into_values() {
            self.unmount_scope(child);
        }
    }

    fn render_scope(&mut self, id: ScopeId) -> Result<()> {
        let Some(scope) = self.scopes.get_mut(&id) else {
            return Ok(());
        };
        let render = Rc::clone(&scope.render);
        let hooks = std::mem::take(&mut scope.hooks);
        let first_render = scope.render_count == 0;
        let frozen = scope.memo.is_frozen();
        trace!(scope = %id, component = scope.kind.name(), "render");

        // Render with a fresh dependency set.
        Runtime::clear_dependencies(id);
        let mut cx = Cx::new(id, hooks, first_render);
        let (result, dependencies) = {
            let _ctx = ReactiveContext::enter(id);
            let result = render(&mut cx);
            (result, ReactiveContext::get_dependencies())
        };
        if frozen {
            Runtime::clear_dependencies(id);
        }
        self.rendered.insert(id);
        self.render_total += 1;

        let Some(scope) = self.scopes.get_mut(&id) else {
            return result.map(drop);
        };
        scope.hooks = cx.into_hooks();
        scope.render_count += 1;
        scope.dependencies = if frozen {
            Dependencies::new()
        } else {
            dependencies
        };
        let node = result?;

        // Match the new output against the current children.
        let before = scope.children.clone();
        let mut previous = std::mem::take(&mut scope.children);
        let mut next = IndexMap::new();
        let mut positions = HashMap::new();
        let node = match self.reconcile(id, node, &mut previous, &mut next, &mut positions) {
            Ok(node) => node,
            Err(err) => {
                // The old output stays: drop fresh mounts, restore its children.
                for (slot, child) in next {
                    if !before.contains_key(&slot) {
                        self.unmount_scope(child);
                    }
                }
                if let Some(scope) = self.scopes.get_mut(&id) {
                    scope.children = before;
                }
                return Err(err);
            }
        };

        // Unmatched children are gone.
        for stale in previous.into_values() {
            self.unmount_scope(stale);
        }
        let Some(scope) = self.scopes.get_mut(&id) else {
            return Ok(());
        };
        scope.children = next;
        scope.output = Rc::new(node);
        Ok(())
    }

    fn reconcile(
        &mut self,
        parent: ScopeId,
        node: Node,
        previous: &mut IndexMap<ChildSlot, ScopeId>,
        next: &mut IndexMap<ChildSlot, ScopeId>,
        positions: &mut HashMap<ComponentType, usize>,
    ) -> Result<Node> {
        match node {
            Node::Component(component) => {
                let (kind, key, render, memo) = component.into_parts();
                let slot = match &key {
                    Some(key) => ChildSlot::Keyed(kind, key.clone()),
                    None => {
                        let position = positions.entry(kind).or_insert(0);
                        let slot = ChildSlot::Position(kind, *position);
                        *position += 1;
                        slot
                    }
                };

                // First occurrence of a slot wins.
                if next.contains_key(&slot) {
                    if self.config.warn_on_duplicate_keys {
                        warn!(
                            parent = %parent,
                            component = kind.name(),
                            key = ?key,
                            "duplicate key, keeping the first occurrence"
                        );
                    }
                    return Ok(Node::Empty);
                }

                // Reuse the matching scope, else mount a new one.
                let child = match previous.shift_remove(&slot) {
                    Some(existing) => {
                        next.insert(slot, existing);
                        self.update_scope(existing, render, memo)?;
                        existing
                    }
                    None => {
                        let child = self.mount_scope(Some(parent), kind, key, render, memo)?;
                        next.insert(slot, child);
                        child
                    }
                };
                Ok(Node::Mounted(Mount::new(child)))
            }
            Node::Element(element) => Ok(Node::Element(element.map_children(|child| {
                self.reconcile(parent, child, previous, next, positions)
            })?)),
            Node::Fragment(children) => children
                .into_iter()
                .map(|child| self.reconcile(parent, child, previous, next, positions))
                .collect::<Result<Vec<_>>>()
                .map(Node::Fragment),
            other => Ok(other),
        }
    }

    fn materialize(&self, node: &Node) -> Node {
        match node {
            Node::Mounted(mount) => self
                .scopes
                .get(&mount.scope())
                .map(|scope| self.materialize(&scope.output))
                .unwrap_or_default(),
            Node::Element(element) => Node::Element(
                element.with_children(
                    element
                        .child_nodes()
                        .iter()
                        .map(|child| self.materialize(child))
                        .collect(),
                ),
            ),
            Node::Fragment(children) => {
                Node::Fragment(children.iter().map(|child| self.materialize(child)).collect())
            }
            other => other.clone(),
        }
    }

    /// The mounted view with every child scope inlined.
    pub fn tree(&self) -> Node {
        match self.root.and_then(|root| self.scopes.get(&root)) {
            Some(root) => self.materialize(&root.output),
            None => Node::Empty,
        }
    }

    /// Markup for the mounted view.
    pub fn to_html(&self) -> String {
        self.tree().to_html()
    }

    /// The root scope, if mounted.
    pub fn root(&self) -> Option<ScopeId> {
        self.root
    }

    /// The child scopes of `id`, in output order.
    pub fn children(&self, id: ScopeId) -> Vec<ScopeId> {
        self.scopes
            .get(&id)
            .map(|scope| scope.children.values().copied().collect())
            .unwrap_or_default()
    }

    /// The parent scope of `id`.
    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scopes.get(&id).and_then(|scope| scope.parent)
    }

    /// The key `id` was mounted with.
    pub fn key_of(&self, id: ScopeId) -> Option<Key> {
        self.scopes.get(&id).and_then(|scope| scope.key.clone())
    }

    /// The component name of `id`.
    pub fn name_of(&self, id: ScopeId) -> Option<&'static str> {
        self.scopes.get(&id).map(|scope| scope.kind.name())
    }

    /// The cached output of `id`, with child scopes as [`Node::Mounted`].
    ///
    /// The same `Rc` is returned until the scope renders again.
    pub fn output(&self, id: ScopeId) -> Option<Rc<Node>> {
        self.scopes.get(&id).map(|scope| Rc::clone(&scope.output))
    }

    /// How many times `id` has rendered.
    pub fn render_count(&self, id: ScopeId) -> usize {
        self.scopes
            .get(&id)
            .map(|scope| scope.render_count)
            .unwrap_or(0)
    }

    /// Number of observables `id` is subscribed to.
    pub fn subscriptions(&self, id: ScopeId) -> usize {
        self.scopes
            .get(&id)
            .map(|scope| scope.dependencies.len())
            .unwrap_or(0)
    }

    /// Whether `id` is currently mounted.
    pub fn is_mounted(&self, id: ScopeId) -> bool {
        self.scopes.contains_key(&id)
    }

    /// Number of mounted scopes.
    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Mounted scopes with the given component name, in tree order.
    pub fn find(&self, name: &str) -> Vec<ScopeId> {
        let mut found = Vec::new();
        let mut stack: Vec<ScopeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            let Some(scope) = self.scopes.get(&id) else {
                continue;
            };
            if scope.kind.name() == name {
                found.push(id);
            }
            stack.extend(scope.children.values().rev().copied());
        }
        found
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("root", &self.root)
            .field("scopes", &self.scopes.len())
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Observable;
    use crate::view::{el, text};
    use std::cell::Cell;

    fn counter() -> Rc<Cell<usize>> {
        Rc::new(Cell::new(0))
    }

    #[test]
    fn mount_renders_nested_components() {
        let mut renderer = Renderer::new();
        let root = renderer
            .mount(Component::new("App", |_cx| {
                Ok(el("div")
                    .child(Component::new("Title", |_cx| Ok(el("h1").text("hi").into())))
                    .into())
            }))
            .unwrap();

        assert_eq!(renderer.to_html(), "<div><h1>hi</h1></div>");
        assert_eq!(renderer.children(root).len(), 1);
        assert_eq!(renderer.name_of(root), Some("App"));
        assert_eq!(renderer.find("Title").len(), 1);
    }

    #[test]
    fn flush_without_mount_is_an_error() {
        let mut renderer = Renderer::new();
        assert!(matches!(renderer.flush(), Err(RenderError::NotMounted)));
    }

    #[test]
    fn only_dirty_child_re_renders() {
        let count = Observable::new(0);
        let source = count.clone();
        let parent_renders = counter();
        let parent_seen = parent_renders.clone();

        let mut renderer = Renderer::new();
        renderer
            .mount(Component::new("Parent", move |_cx| {
                parent_seen.set(parent_seen.get() + 1);
                let source = source.clone();
                Ok(el("div")
                    .child(Component::new("Count", move |_cx| {
                        Ok(text(source.get().to_string()))
                    }))
                    .into())
            }))
            .unwrap();

        count.set(5);
        assert_eq!(renderer.pending(), 1);
        assert_eq!(renderer.flush().unwrap(), 1);
        assert_eq!(renderer.to_html(), "<div>5</div>");
        assert_eq!(parent_renders.get(), 1);
    }

    #[test]
    fn parent_render_re_renders_unmemoized_children() {
        let count = Observable::new(0);
        let source = count.clone();
        let child_renders = counter();
        let child_seen = child_renders.clone();

        let mut renderer = Renderer::new();
        renderer
            .mount(Component::new("Parent", move |_cx| {
                let value = source.get();
                let seen = child_seen.clone();
                Ok(Node::Fragment(vec![
                    text(value.to_string()),
                    Component::new("Child", move |_cx| {
                        seen.set(seen.get() + 1);
                        Ok(Node::Empty)
                    })
                    .into(),
                ]))
            }))
            .unwrap();
        assert_eq!(child_renders.get(), 1);

        count.set(1);
        renderer.flush().unwrap();
        assert_eq!(child_renders.get(), 2);
    }

    #[test]
    fn memo_props_skip_equal_children() {
        let count = Observable::new(0);
        let source = count.clone();
        let child_renders = counter();
        let child_seen = child_renders.clone();

        let mut renderer = Renderer::new();
        renderer
            .mount(Component::new("Parent", move |_cx| {
                let value = source.get();
                let seen = child_seen.clone();
                Ok(Node::Fragment(vec![
                    text(value.to_string()),
                    Component::new("Child", move |_cx| {
                        seen.set(seen.get() + 1);
                        Ok(Node::Empty)
                    })
                    .memo(value / 10)
                    .into(),
                ]))
            }))
            .unwrap();

        count.set(3);
        renderer.flush().unwrap();
        assert_eq!(child_renders.get(), 1);

        count.set(12);
        renderer.flush().unwrap();
        assert_eq!(child_renders.get(), 2);
    }

    #[test]
    fn removed_children_are_unmounted() {
        let show = Observable::new(true);
        let source = show.clone();

        let mut renderer = Renderer::new();
        let root = renderer
            .mount(Component::new("Parent", move |_cx| {
                if source.get() {
                    Ok(Component::new("Child", |_cx| Ok(text("child"))).into())
                } else {
                    Ok(Node::Empty)
                }
            }))
            .unwrap();
        let child = renderer.children(root)[0];
        assert!(renderer.is_mounted(child));

        show.set(false);
        renderer.flush().unwrap();
        assert!(!renderer.is_mounted(child));
        assert_eq!(renderer.scope_count(), 1);
        assert_eq!(renderer.to_html(), "");
    }

    #[test]
    fn duplicate_keys_keep_first_occurrence() {
        let mut renderer = Renderer::new();
        let root = renderer
            .mount(Component::new("List", |_cx| {
                let item = |label: &'static str| {
                    Component::new("Item", move |_cx| Ok(text(label))).keyed("same")
                };
                Ok(Node::Fragment(vec![item("first").into(), item("second").into()]))
            }))
            .unwrap();

        assert_eq!(renderer.to_html(), "first");
        assert_eq!(renderer.children(root).len(), 1);
    }

    #[test]
    fn self_triggering_render_is_a_loop() {
        let count = Observable::new(0);
        let source = count.clone();

        let mut renderer = Renderer::with_config(RendererConfig {
            max_flush_passes: 4,
            ..RendererConfig::default()
        });
        renderer
            .mount(Component::new("Loop", move |_cx| {
                let value = source.get();
                source.set(value + 1);
                Ok(text(value.to_string()))
            }))
            .unwrap();

        let err = renderer.flush().unwrap_err();
        assert!(matches!(err, RenderError::RenderLoop { passes: 4 }));
    }

    #[test]
    fn render_errors_propagate_from_mount_and_flush() {
        let fail = Observable::new(false);
        let source = fail.clone();

        let mut renderer = Renderer::new();
        assert!(renderer
            .mount(Component::new("Broken", |_cx| Err(RenderError::component("boom"))))
            .is_err());
        assert!(renderer.root().is_none());
        assert_eq!(renderer.scope_count(), 0);

        renderer
            .mount(Component::new("Flaky", move |_cx| {
                if source.get() {
                    Err(RenderError::component("flaky"))
                } else {
                    Ok(text("ok"))
                }
            }))
            .unwrap();
        fail.set(true);
        let err = renderer.flush().unwrap_err();
        assert_eq!(err.to_string(), "component error: flaky");
        assert_eq!(renderer.to_html(), "ok");
    }

    #[test]
    fn failed_child_update_keeps_the_previous_output() {
        let tick = Observable::new(0);
        let fail = Observable::new(false);
        let (tick_source, fail_source) = (tick.clone(), fail.clone());

        let mut renderer = Renderer::new();
        let root = renderer
            .mount(Component::new("Parent", move |_cx| {
                tick_source.get();
                let broken = fail_source.peek();
                Ok(Node::Fragment(vec![
                    Component::new("A", move |_cx| {
                        if broken {
                            Err(RenderError::component("a failed"))
                        } else {
                            Ok(text("A"))
                        }
                    })
                    .into(),
                    Component::new("B", |_cx| Ok(text("B"))).into(),
                ]))
            }))
            .unwrap();
        assert_eq!(renderer.to_html(), "AB");

        fail.set(true);
        tick.set(1);
        assert!(renderer.flush().is_err());
        assert_eq!(renderer.to_html(), "AB");
        assert_eq!(renderer.children(root).len(), 2);
        assert_eq!(renderer.scope_count(), 3);
    }

    #[test]
    fn unmount_releases_subscriptions() {
        let value = Observable::new(1);
        let source = value.clone();

        let mut renderer = Renderer::new();
        let root = renderer
            .mount(Component::new("Reader", move |_cx| Ok(text(source.get().to_string()))))
            .unwrap();
        assert_eq!(renderer.subscriptions(root), 1);
        assert_eq!(value.subscriber_count(), 1);

        renderer.unmount();
        assert_eq!(value.subscriber_count(), 0);
        assert_eq!(renderer.to_html(), "");
    }
}
