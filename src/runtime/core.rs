//! Core object - registries, renderer, and the mount entry point.
//!
//! All registries are instance-scoped: two [`Cinder`] cores in one
//! process share nothing, which keeps tests hermetic and lets an
//! application embed independent UI roots.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use indexmap::IndexMap;

use crate::dom::NodeRef;
use crate::emitter::Emitter;
use crate::error::{Error, Result};
use crate::renderer::Renderer;

use super::component::{Component, ComponentRef, HookKind, Props, Scope};
use super::instance::{Instance, MountHandle};
use super::plugin::Plugin;

// =============================================================================
// Core
// =============================================================================

pub(crate) struct CoreInner {
    components: RefCell<HashMap<String, Rc<Component>>>,
    plugins: RefCell<IndexMap<String, Rc<dyn Plugin>>>,
    pub(crate) renderer: Renderer,
    /// Container node id -> live instance. Enforces "one instance per
    /// container": mounting over an occupied container unmounts the
    /// occupant first.
    pub(crate) mounted: RefCell<HashMap<u64, Rc<Instance>>>,
    next_instance_id: Cell<u64>,
}

/// The runtime core. Cheap to clone; clones share the same registries.
#[derive(Clone)]
pub struct Cinder {
    inner: Rc<CoreInner>,
}

impl Cinder {
    /// Create an empty core.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(CoreInner {
                components: RefCell::new(HashMap::new()),
                plugins: RefCell::new(IndexMap::new()),
                renderer: Renderer::new(),
                mounted: RefCell::new(HashMap::new()),
                next_instance_id: Cell::new(0),
            }),
        }
    }

    /// Register a component definition under `name`.
    pub fn component(&self, name: &str, definition: Component) -> &Self {
        self.inner
            .components
            .borrow_mut()
            .insert(name.to_string(), Rc::new(definition));
        self
    }

    /// True if a definition is registered under `name`.
    pub fn is_registered(&self, name: &str) -> bool {
        self.inner.components.borrow().contains_key(name)
    }

    /// Mount a component onto `container`.
    ///
    /// Resolves the reference (a registered name or a definition), tears
    /// down any instance already bound to the container, runs setup and
    /// the lifecycle sequence, renders, injects scoped style, mounts
    /// declared children, and registers re-render watchers. The future
    /// resolves only after the DOM has been patched at least once.
    ///
    /// Setup and template failures reject the future; they are never
    /// swallowed.
    pub fn mount(
        &self,
        container: &NodeRef,
        component: impl Into<ComponentRef>,
        props: Props,
    ) -> LocalBoxFuture<'static, Result<MountHandle>> {
        let inner = self.inner.clone();
        let container = container.clone();
        let reference = component.into();
        Box::pin(async move {
            let instance = inner.mount_instance(container, reference, props).await?;
            Ok(MountHandle::new(instance))
        })
    }

    /// Install a plugin. A name already in the registry is a no-op.
    pub fn use_plugin(&self, plugin: Rc<dyn Plugin>) -> Result<()> {
        let name = plugin.name().to_string();
        if self.inner.plugins.borrow().contains_key(&name) {
            tracing::debug!(plugin = %name, "plugin already installed; skipping");
            return Ok(());
        }
        plugin.install(self)?;
        self.inner.plugins.borrow_mut().insert(name, plugin);
        Ok(())
    }

    /// True if a plugin with `name` has been installed.
    pub fn has_plugin(&self, name: &str) -> bool {
        self.inner.plugins.borrow().contains_key(name)
    }

    /// The core's renderer, e.g. for plugins installing a patch hook.
    pub fn renderer(&self) -> &Renderer {
        &self.inner.renderer
    }

    /// The handle of the instance currently bound to `container`, if any.
    pub fn mounted_at(&self, container: &NodeRef) -> Option<MountHandle> {
        self.inner
            .mounted
            .borrow()
            .get(&container.id())
            .cloned()
            .map(MountHandle::new)
    }
}

impl Default for Cinder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Mount orchestration
// =============================================================================

impl CoreInner {
    fn resolve(&self, reference: &ComponentRef) -> Result<Rc<Component>> {
        match reference {
            ComponentRef::Definition(definition) => Ok(definition.clone()),
            ComponentRef::Name(name) => self
                .components
                .borrow()
                .get(name)
                .cloned()
                .ok_or_else(|| Error::ComponentNotRegistered { name: name.clone() }),
        }
    }

    fn next_instance_id(&self) -> u64 {
        let id = self.next_instance_id.get();
        self.next_instance_id.set(id + 1);
        id
    }

    /// The full mount sequence. Boxed so child mounts can recurse.
    pub(crate) fn mount_instance(
        self: Rc<Self>,
        container: NodeRef,
        reference: ComponentRef,
        props: Props,
    ) -> LocalBoxFuture<'static, Result<Rc<Instance>>> {
        Box::pin(async move {
            if !container.is_element() {
                return Err(Error::ContainerNotFound(format!(
                    "mount target must be an element, got {container:?}"
                )));
            }
            let definition = self.resolve(&reference)?;

            // One instance per container: replace means full teardown first.
            let previous = self.mounted.borrow().get(&container.id()).cloned();
            if let Some(previous) = previous {
                previous.unmount().await?;
            }

            let scope = Scope::new(props, Emitter::new());
            let instance = Instance::new(
                self.next_instance_id(),
                container.clone(),
                definition.clone(),
                scope.clone(),
                Rc::downgrade(&self),
            );

            if let Some(setup) = definition.setup_fn() {
                setup(&scope).resolve().await?;
            }
            instance.fire_hook(HookKind::BeforeMount).await;
            instance.render().await?;
            instance.inject_style();
            instance.mount_declared_children().await?;
            instance.register_watchers();
            self.mounted.borrow_mut().insert(container.id(), instance.clone());
            instance.fire_hook(HookKind::Mounted).await;
            tracing::debug!(instance = instance.id(), "mounted");

            Ok(instance)
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn container() -> NodeRef {
        NodeRef::element("div")
    }

    #[test]
    fn test_mount_renders_registered_component() {
        let app = Cinder::new();
        app.component("hello", Component::new(|_| "<p>Hello</p>".to_string()));

        let root = container();
        let handle = block_on(app.mount(&root, "hello", Props::new())).unwrap();

        assert_eq!(root.inner_html(), "<p>Hello</p>");
        assert!(handle.is_mounted());
        assert!(app.mounted_at(&root).is_some());
    }

    #[test]
    fn test_mount_unknown_name_fails_eagerly() {
        let app = Cinder::new();
        let root = container();

        let result = block_on(app.mount(&root, "missing", Props::new()));
        assert!(matches!(
            result,
            Err(Error::ComponentNotRegistered { name }) if name == "missing"
        ));
        // Nothing was rendered.
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn test_mount_rejects_non_element_container() {
        let app = Cinder::new();
        let text = NodeRef::text("nope");

        let result = block_on(app.mount(&text, Component::new(|_| String::new()), Props::new()));
        assert!(matches!(result, Err(Error::ContainerNotFound(_))));
    }

    #[test]
    fn test_remounting_container_replaces_instance() {
        let app = Cinder::new();
        let root = container();

        let first = block_on(app.mount(
            &root,
            Component::new(|_| "<p>first</p>".to_string()),
            Props::new(),
        ))
        .unwrap();
        assert!(first.is_mounted());

        let second = block_on(app.mount(
            &root,
            Component::new(|_| "<p>second</p>".to_string()),
            Props::new(),
        ))
        .unwrap();

        assert!(!first.is_mounted());
        assert!(second.is_mounted());
        assert_eq!(root.inner_html(), "<p>second</p>");
    }

    #[test]
    fn test_use_plugin_installs_once() {
        use std::cell::Cell;

        struct CountingPlugin {
            installs: Rc<Cell<u32>>,
        }

        impl Plugin for CountingPlugin {
            fn name(&self) -> &str {
                "counting"
            }

            fn install(&self, _app: &Cinder) -> Result<()> {
                self.installs.set(self.installs.get() + 1);
                Ok(())
            }
        }

        let app = Cinder::new();
        let installs = Rc::new(Cell::new(0));
        let plugin = Rc::new(CountingPlugin {
            installs: installs.clone(),
        });

        app.use_plugin(plugin.clone()).unwrap();
        app.use_plugin(plugin).unwrap();

        assert_eq!(installs.get(), 1);
        assert!(app.has_plugin("counting"));
        assert!(!app.has_plugin("other"));
    }
}
