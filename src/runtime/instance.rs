//! Mounted instances - render, update, event wiring, teardown.
//!
//! An [`Instance`] owns everything it acquired while mounting: signal
//! watchers, DOM event listeners, child instances, and its scoped style
//! element. Unmounting releases all of it, recursively, exactly once.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use futures::future::LocalBoxFuture;

use crate::dom::{ListenerHandle, NodeFlags, NodeRef};
use crate::error::Result;
use crate::signals::Unsubscribe;
use crate::types::{EVENT_PREFIX, PROP_PREFIX, STYLE_SCOPE_ATTR};

use super::component::{Component, HookContext, HookKind, PropValue, Props, Scope};
use super::core::CoreInner;

// =============================================================================
// Instance
// =============================================================================

/// A live component bound to a container element.
pub struct Instance {
    id: u64,
    /// Self-handle for watcher closures and 'static futures.
    weak_self: Weak<Instance>,
    container: NodeRef,
    definition: Rc<Component>,
    scope: Rc<Scope>,
    core: Weak<CoreInner>,
    watchers: RefCell<Vec<Unsubscribe>>,
    listeners: RefCell<Vec<ListenerHandle>>,
    children: RefCell<Vec<Rc<Instance>>>,
    style_element: RefCell<Option<NodeRef>>,
    /// Cleared at unmount; guards stale async renders - a template that
    /// resolves after its instance died must not touch the container.
    alive: Cell<bool>,
    unmount_started: Cell<bool>,
}

impl Instance {
    pub(crate) fn new(
        id: u64,
        container: NodeRef,
        definition: Rc<Component>,
        scope: Rc<Scope>,
        core: Weak<CoreInner>,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            id,
            weak_self: weak_self.clone(),
            container,
            definition,
            scope,
            core,
            watchers: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            children: RefCell::new(Vec::new()),
            style_element: RefCell::new(None),
            alive: Cell::new(true),
            unmount_started: Cell::new(false),
        })
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn container(&self) -> &NodeRef {
        &self.container
    }

    pub(crate) fn scope(&self) -> Rc<Scope> {
        self.scope.clone()
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive.get()
    }

    pub(crate) async fn fire_hook(&self, kind: HookKind) {
        if let Some(hook) = self.scope.hook(kind) {
            let context = HookContext {
                container: self.container.clone(),
                scope: self.scope.clone(),
            };
            hook(&context).resolve().await;
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Run the template and patch the output into the container.
    pub(crate) async fn render(&self) -> Result<()> {
        let html = (self.definition.template_fn())(&self.scope).resolve().await?;
        if !self.alive.get() {
            tracing::debug!(instance = self.id, "discarding stale render");
            return Ok(());
        }
        let Some(core) = self.core.upgrade() else {
            return Ok(());
        };
        core.renderer.patch(&self.container, &html)?;
        self.wire_events();
        Ok(())
    }

    /// Patch-only update: re-render, reconcile children, fire the
    /// updated hook. Setup, style injection, and the mount hooks do not
    /// run again.
    pub(crate) async fn update(&self) -> Result<()> {
        self.render().await?;
        if !self.alive.get() {
            return Ok(());
        }
        self.reconcile_children().await?;
        self.fire_hook(HookKind::Updated).await;
        Ok(())
    }

    /// Watch every signal the scope exposes; any change schedules an
    /// update through the signal's own batching.
    pub(crate) fn register_watchers(&self) {
        let mut watchers = self.watchers.borrow_mut();
        for watchable in self.scope.watch_list() {
            let weak = self.weak_self.clone();
            watchers.push(watchable.watch_change(Rc::new(move || {
                if let Some(instance) = weak.upgrade() {
                    instance.run_update();
                }
            })));
        }
    }

    /// Drive an update to completion. Runs inside the scheduler flush,
    /// which is outside the executor, so blocking here is sound.
    fn run_update(&self) {
        if !self.alive.get() {
            return;
        }
        let Some(instance) = self.weak_self.upgrade() else {
            return;
        };
        let result = futures::executor::block_on(async move { instance.update().await });
        if let Err(error) = result {
            tracing::error!(instance = self.id, %error, "re-render failed");
        }
    }

    // =========================================================================
    // Event wiring
    // =========================================================================

    /// Resolve `@event="method"` attributes against scope methods and
    /// strip them from the DOM.
    ///
    /// Wiring is additive: binding attributes only exist on nodes the
    /// last patch freshly created (the renderer never copies them onto
    /// patched nodes), so each pass wires exactly the new nodes.
    /// Listeners on surviving nodes stay attached - node identity is
    /// preserved, and stripping the attribute at wiring time is what
    /// prevents duplicates.
    fn wire_events(&self) {
        let mut handles = Vec::new();
        self.wire_node(&self.container, &mut handles, true);
        self.listeners.borrow_mut().extend(handles);
    }

    fn wire_node(&self, node: &NodeRef, handles: &mut Vec<ListenerHandle>, is_root: bool) {
        for name in node.attribute_names() {
            let Some(event) = name.strip_prefix(EVENT_PREFIX) else {
                continue;
            };
            let method_name = node.attribute(&name).unwrap_or_default();
            node.remove_attribute(&name);
            match self.scope.method_named(&method_name) {
                Some(method) => {
                    handles.push(node.add_listener(event, move |dom_event| method(dom_event)));
                }
                None => {
                    tracing::debug!(
                        instance = self.id,
                        method = %method_name,
                        "event binding references unknown method"
                    );
                }
            }
        }
        // A mounted child owns everything below its root; its bindings
        // are wired by the child instance against the child scope.
        if !is_root && node.has_flag(NodeFlags::COMPONENT_ROOT) {
            return;
        }
        for child in node.children() {
            self.wire_node(&child, handles, false);
        }
    }

    // =========================================================================
    // Scoped styles
    // =========================================================================

    /// Inject the definition's stylesheet as a `<style>` element tagged
    /// with a fresh per-instance marker. The marker makes the element
    /// invisible to the diff engine.
    pub(crate) fn inject_style(&self) {
        let Some(style) = self.definition.style_fn_ref() else {
            return;
        };
        let css = style(&self.scope);
        let element = NodeRef::element("style");
        element.set_attribute(STYLE_SCOPE_ATTR, &format!("c{}", self.id));
        element.append_child(&NodeRef::text(&css));
        let first = self.container.first_child();
        self.container.insert_before(&element, first.as_ref());
        *self.style_element.borrow_mut() = Some(element);
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Mount declared children onto matching rendered elements. Elements
    /// already serving as a child root, or sitting inside one, are left
    /// alone.
    pub(crate) fn mount_declared_children(&self) -> LocalBoxFuture<'static, Result<()>> {
        let Some(this) = self.weak_self.upgrade() else {
            return Box::pin(async { Ok(()) });
        };
        Box::pin(async move {
            let Some(core) = this.core.upgrade() else {
                return Ok(());
            };
            for spec in this.definition.child_specs().to_vec() {
                for element in this.container.query_selector_all(&spec.selector) {
                    if element.has_flag(NodeFlags::COMPONENT_ROOT)
                        || inside_owned_subtree(&this.container, &element)
                    {
                        continue;
                    }
                    let props = extract_props(&element);
                    element.insert_flag(NodeFlags::COMPONENT_ROOT);
                    let child = core
                        .clone()
                        .mount_instance(element, spec.component.clone(), props)
                        .await?;
                    this.children.borrow_mut().push(child);
                }
            }
            Ok(())
        })
    }

    /// After a re-render: drop child instances whose root element left
    /// the tree, then mount any placeholders that newly appeared.
    async fn reconcile_children(&self) -> Result<()> {
        let current: Vec<Rc<Instance>> = self.children.borrow_mut().drain(..).collect();
        let mut gone = Vec::new();
        for child in current {
            if self.container.contains(&child.container) {
                self.children.borrow_mut().push(child);
            } else {
                gone.push(child);
            }
        }
        for child in gone {
            child.unmount().await?;
        }
        self.mount_declared_children().await
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Release everything this instance acquired, recursively. Idempotent:
    /// the second call is a no-op and hooks fire once.
    pub(crate) fn unmount(&self) -> LocalBoxFuture<'static, Result<()>> {
        let Some(this) = self.weak_self.upgrade() else {
            return Box::pin(async { Ok(()) });
        };
        Box::pin(async move {
            if this.unmount_started.replace(true) {
                return Ok(());
            }
            this.alive.set(false);
            this.fire_hook(HookKind::BeforeUnmount).await;

            for watcher in this.watchers.borrow_mut().drain(..) {
                watcher.unsubscribe();
            }
            for listener in this.listeners.borrow_mut().drain(..) {
                listener.remove();
            }
            let children: Vec<Rc<Instance>> = this.children.borrow_mut().drain(..).collect();
            for child in children {
                child.unmount().await?;
            }
            if let Some(style) = this.style_element.borrow_mut().take() {
                style.remove();
            }
            // Convention: unmount clears the rendered content itself.
            this.container.clear_children();
            this.container.remove_flag(NodeFlags::COMPONENT_ROOT);
            if let Some(core) = this.core.upgrade() {
                core.mounted.borrow_mut().remove(&this.container.id());
            }

            this.fire_hook(HookKind::Unmounted).await;
            tracing::debug!(instance = this.id, "unmounted");
            Ok(())
        })
    }
}

/// True if `element` sits below a component root other than itself,
/// inside `container`.
fn inside_owned_subtree(container: &NodeRef, element: &NodeRef) -> bool {
    let mut current = element.parent();
    while let Some(node) = current {
        if node.ptr_eq(container) {
            return false;
        }
        if node.has_flag(NodeFlags::COMPONENT_ROOT) {
            return true;
        }
        current = node.parent();
    }
    false
}

/// Pull `:name="value"` attributes off a child root element into props,
/// stripping them from the DOM.
fn extract_props(element: &NodeRef) -> Props {
    let mut props = Props::new();
    for name in element.attribute_names() {
        if let Some(prop_name) = name.strip_prefix(PROP_PREFIX) {
            let value = element.attribute(&name).unwrap_or_default();
            props.insert(prop_name, PropValue::Text(value));
            element.remove_attribute(&name);
        }
    }
    props
}

// =============================================================================
// MountHandle
// =============================================================================

/// Handle to a mounted instance, returned by `Cinder::mount`.
pub struct MountHandle {
    instance: Rc<Instance>,
}

impl MountHandle {
    pub(crate) fn new(instance: Rc<Instance>) -> Self {
        Self { instance }
    }

    /// The instance's scope - signals, methods, state, emitter.
    pub fn scope(&self) -> Rc<Scope> {
        self.instance.scope()
    }

    /// The container element the instance rendered into.
    pub fn container(&self) -> NodeRef {
        self.instance.container().clone()
    }

    /// False once the instance has been unmounted.
    pub fn is_mounted(&self) -> bool {
        self.instance.is_alive()
    }

    /// Tear the instance down. Idempotent.
    pub async fn unmount(&self) -> Result<()> {
        self.instance.unmount().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_props_strips_prefixed_attributes() {
        let element = NodeRef::element("div");
        element.set_attribute(":title", "Hello");
        element.set_attribute(":count", "3");
        element.set_attribute("class", "plain");

        let props = extract_props(&element);
        assert_eq!(props.text("title").as_deref(), Some("Hello"));
        assert_eq!(props.text("count").as_deref(), Some("3"));
        assert_eq!(props.len(), 2);

        assert!(!element.has_attribute(":title"));
        assert!(!element.has_attribute(":count"));
        assert_eq!(element.attribute("class").as_deref(), Some("plain"));
    }

    #[test]
    fn test_inside_owned_subtree() {
        let container = NodeRef::element("div");
        let owned = NodeRef::element("section");
        owned.insert_flag(NodeFlags::COMPONENT_ROOT);
        let nested = NodeRef::element("span");
        container.append_child(&owned);
        owned.append_child(&nested);

        let free = NodeRef::element("span");
        container.append_child(&free);

        assert!(inside_owned_subtree(&container, &nested));
        assert!(!inside_owned_subtree(&container, &free));
        assert!(!inside_owned_subtree(&container, &owned));
    }
}
