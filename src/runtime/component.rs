//! Component definitions, props, and the setup scope.
//!
//! A definition is stateless - many instances may be mounted from one.
//! The [`Scope`] is what an instance's user code sees: a signal factory
//! wired into re-rendering, named methods for event bindings, lifecycle
//! hooks, the per-instance emitter, and the extracted props.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::dom::{Event, NodeRef};
use crate::emitter::Emitter;
use crate::error::{Error, Result};
use crate::signals::{Signal, Watchable};
use crate::types::MaybeAsync;

// =============================================================================
// Callback Types
// =============================================================================

/// Template function: scope in, HTML string out. May be async.
pub type TemplateFn = Rc<dyn Fn(&Scope) -> MaybeAsync<Result<String>>>;

/// Setup function: initializes the scope. May be async.
pub type SetupFn = Rc<dyn Fn(&Scope) -> MaybeAsync<Result<()>>>;

/// Style function: scope in, CSS text out.
pub type StyleFn = Rc<dyn Fn(&Scope) -> String>;

/// Lifecycle hook. May be async.
pub type HookFn = Rc<dyn Fn(&HookContext) -> MaybeAsync<()>>;

/// Named method invokable from an event binding.
pub type MethodFn = Rc<dyn Fn(&Event)>;

/// Context handed to lifecycle hooks.
pub struct HookContext {
    /// The instance's container element.
    pub container: NodeRef,
    /// The instance's scope.
    pub scope: Rc<Scope>,
}

/// The five lifecycle hook slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookKind {
    /// Before the first render is patched in.
    BeforeMount,
    /// After mount completed, children included.
    Mounted,
    /// After each re-render.
    Updated,
    /// Before teardown begins.
    BeforeUnmount,
    /// After teardown finished.
    Unmounted,
}

// =============================================================================
// Component Definition
// =============================================================================

/// Declared child component: elements matching `selector` inside the
/// rendered output get an instance of `component` mounted on them.
#[derive(Clone)]
pub struct ChildSpec {
    /// Simple selector (`tag`, `#id`, `.class`, compounds).
    pub selector: String,
    /// What to mount there.
    pub component: ComponentRef,
}

/// A component definition.
///
/// The template is required by construction - a definition without one
/// cannot exist, so mount never has to validate it.
pub struct Component {
    template: TemplateFn,
    setup: Option<SetupFn>,
    style: Option<StyleFn>,
    children: Vec<ChildSpec>,
}

impl Component {
    /// Define a component from a synchronous template.
    pub fn new(template: impl Fn(&Scope) -> String + 'static) -> Self {
        Self::from_template(Rc::new(move |scope| MaybeAsync::Ready(Ok(template(scope)))))
    }

    /// Define a component from a template that may be async or fallible.
    pub fn with_async_template(
        template: impl Fn(&Scope) -> MaybeAsync<Result<String>> + 'static,
    ) -> Self {
        Self::from_template(Rc::new(template))
    }

    fn from_template(template: TemplateFn) -> Self {
        Self {
            template,
            setup: None,
            style: None,
            children: Vec::new(),
        }
    }

    /// Attach a synchronous setup function.
    pub fn setup(mut self, setup: impl Fn(&Scope) -> Result<()> + 'static) -> Self {
        self.setup = Some(Rc::new(move |scope| MaybeAsync::Ready(setup(scope))));
        self
    }

    /// Attach a setup function that may be async.
    pub fn async_setup(
        mut self,
        setup: impl Fn(&Scope) -> MaybeAsync<Result<()>> + 'static,
    ) -> Self {
        self.setup = Some(Rc::new(setup));
        self
    }

    /// Attach a static scoped stylesheet.
    pub fn style(mut self, css: impl Into<String>) -> Self {
        let css = css.into();
        self.style = Some(Rc::new(move |_| css.clone()));
        self
    }

    /// Attach a stylesheet computed from the scope.
    pub fn style_fn(mut self, style: impl Fn(&Scope) -> String + 'static) -> Self {
        self.style = Some(Rc::new(style));
        self
    }

    /// Declare a nested child component.
    pub fn child(mut self, selector: &str, component: impl Into<ComponentRef>) -> Self {
        self.children.push(ChildSpec {
            selector: selector.to_string(),
            component: component.into(),
        });
        self
    }

    pub(crate) fn template_fn(&self) -> &TemplateFn {
        &self.template
    }

    pub(crate) fn setup_fn(&self) -> Option<&SetupFn> {
        self.setup.as_ref()
    }

    pub(crate) fn style_fn_ref(&self) -> Option<&StyleFn> {
        self.style.as_ref()
    }

    pub(crate) fn child_specs(&self) -> &[ChildSpec] {
        &self.children
    }
}

/// Reference to a component: a registered name or a definition.
#[derive(Clone)]
pub enum ComponentRef {
    /// Look up a definition registered with the core under this name.
    Name(String),
    /// Use the definition directly.
    Definition(Rc<Component>),
}

impl From<&str> for ComponentRef {
    fn from(name: &str) -> Self {
        ComponentRef::Name(name.to_string())
    }
}

impl From<String> for ComponentRef {
    fn from(name: String) -> Self {
        ComponentRef::Name(name)
    }
}

impl From<Component> for ComponentRef {
    fn from(definition: Component) -> Self {
        ComponentRef::Definition(Rc::new(definition))
    }
}

impl From<Rc<Component>> for ComponentRef {
    fn from(definition: Rc<Component>) -> Self {
        ComponentRef::Definition(definition)
    }
}

// =============================================================================
// Props
// =============================================================================

/// A prop value passed into a mount.
#[derive(Clone)]
pub enum PropValue {
    /// Attribute-extracted text.
    Text(String),
    /// A value shared by reference - typically a [`Signal`] handed from
    /// parent to child so mutations propagate across the boundary.
    Shared(Rc<dyn Any>),
}

/// Props for a mount, keyed by name in insertion order.
#[derive(Clone, Default)]
pub struct Props {
    values: IndexMap<String, PropValue>,
}

impl Props {
    /// No props.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form: add a text prop.
    pub fn with_text(mut self, name: &str, value: &str) -> Self {
        self.insert(name, PropValue::Text(value.to_string()));
        self
    }

    /// Builder form: add a shared by-reference prop.
    pub fn with_shared<T: 'static>(mut self, name: &str, value: T) -> Self {
        self.insert(name, PropValue::Shared(Rc::new(value)));
        self
    }

    /// Add a prop.
    pub fn insert(&mut self, name: &str, value: PropValue) {
        self.values.insert(name.to_string(), value);
    }

    /// Text prop value, if present.
    pub fn text(&self, name: &str) -> Option<String> {
        match self.values.get(name) {
            Some(PropValue::Text(value)) => Some(value.clone()),
            _ => None,
        }
    }

    /// Shared prop, downcast to its concrete type.
    pub fn shared<T: Clone + 'static>(&self, name: &str) -> Result<T> {
        match self.values.get(name) {
            Some(PropValue::Shared(value)) => {
                value
                    .downcast_ref::<T>()
                    .cloned()
                    .ok_or_else(|| Error::InvalidProp {
                        name: name.to_string(),
                        detail: "shared prop has a different type".into(),
                    })
            }
            Some(PropValue::Text(_)) => Err(Error::InvalidProp {
                name: name.to_string(),
                detail: "prop is text, not shared".into(),
            }),
            None => Err(Error::InvalidProp {
                name: name.to_string(),
                detail: "prop not provided".into(),
            }),
        }
    }

    /// Prop names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// Number of props.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no props were provided.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// =============================================================================
// Scope
// =============================================================================

#[derive(Default)]
struct HookSet {
    before_mount: Option<HookFn>,
    mounted: Option<HookFn>,
    updated: Option<HookFn>,
    before_unmount: Option<HookFn>,
    unmounted: Option<HookFn>,
}

/// The merged data/context of a mounted instance.
///
/// Setup functions populate it; templates, event bindings, and hooks
/// read from it. Every signal created through [`Scope::signal`] or
/// adopted through [`Scope::adopt`] is watched by the orchestrator, so
/// changing it schedules a re-render.
pub struct Scope {
    props: Props,
    emitter: Emitter,
    watched: RefCell<Vec<Rc<dyn Watchable>>>,
    methods: RefCell<HashMap<String, MethodFn>>,
    state: RefCell<HashMap<String, Rc<dyn Any>>>,
    hooks: RefCell<HookSet>,
}

impl Scope {
    pub(crate) fn new(props: Props, emitter: Emitter) -> Rc<Self> {
        Rc::new(Self {
            props,
            emitter,
            watched: RefCell::new(Vec::new()),
            methods: RefCell::new(HashMap::new()),
            state: RefCell::new(HashMap::new()),
            hooks: RefCell::new(HookSet::default()),
        })
    }

    /// Create a signal and register it for re-render watching.
    pub fn signal<T: Clone + 'static>(&self, value: T) -> Signal<T> {
        let signal = Signal::new(value);
        self.adopt(&signal);
        signal
    }

    /// Register an existing signal for re-render watching.
    ///
    /// Use this for signals shared in from a parent: the child watches
    /// the same cell rather than copying the value, so parent-driven
    /// mutations re-render the child too.
    pub fn adopt<T: Clone + 'static>(&self, signal: &Signal<T>) {
        self.watched.borrow_mut().push(Rc::new(signal.clone()));
    }

    /// The props this instance was mounted with.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// The per-instance event bus.
    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// Register a named method, targetable from event-binding attributes
    /// (`@click="name"`).
    pub fn method(&self, name: &str, method: impl Fn(&Event) + 'static) {
        self.methods
            .borrow_mut()
            .insert(name.to_string(), Rc::new(method));
    }

    /// Store a named value for later retrieval (e.g. from tests or event
    /// handlers outside the setup closure).
    pub fn set<T: 'static>(&self, key: &str, value: T) {
        self.state
            .borrow_mut()
            .insert(key.to_string(), Rc::new(value));
    }

    /// Retrieve a named value stored with [`Scope::set`].
    pub fn get<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        self.state
            .borrow()
            .get(key)
            .and_then(|value| value.downcast_ref::<T>().cloned())
    }

    // =========================================================================
    // Lifecycle hooks
    // =========================================================================

    /// Hook fired before the first render.
    pub fn on_before_mount(&self, hook: impl Fn(&HookContext) + 'static) {
        self.set_hook(HookKind::BeforeMount, sync_hook(hook));
    }

    /// Hook fired once mounting completed.
    pub fn on_mounted(&self, hook: impl Fn(&HookContext) + 'static) {
        self.set_hook(HookKind::Mounted, sync_hook(hook));
    }

    /// Hook fired after every re-render.
    pub fn on_updated(&self, hook: impl Fn(&HookContext) + 'static) {
        self.set_hook(HookKind::Updated, sync_hook(hook));
    }

    /// Hook fired before teardown.
    pub fn on_before_unmount(&self, hook: impl Fn(&HookContext) + 'static) {
        self.set_hook(HookKind::BeforeUnmount, sync_hook(hook));
    }

    /// Hook fired after teardown.
    pub fn on_unmounted(&self, hook: impl Fn(&HookContext) + 'static) {
        self.set_hook(HookKind::Unmounted, sync_hook(hook));
    }

    /// Install a hook in async-capable form, replacing any previous one.
    pub fn set_hook(&self, kind: HookKind, hook: HookFn) {
        let mut hooks = self.hooks.borrow_mut();
        let slot = match kind {
            HookKind::BeforeMount => &mut hooks.before_mount,
            HookKind::Mounted => &mut hooks.mounted,
            HookKind::Updated => &mut hooks.updated,
            HookKind::BeforeUnmount => &mut hooks.before_unmount,
            HookKind::Unmounted => &mut hooks.unmounted,
        };
        *slot = Some(hook);
    }

    pub(crate) fn hook(&self, kind: HookKind) -> Option<HookFn> {
        let hooks = self.hooks.borrow();
        match kind {
            HookKind::BeforeMount => hooks.before_mount.clone(),
            HookKind::Mounted => hooks.mounted.clone(),
            HookKind::Updated => hooks.updated.clone(),
            HookKind::BeforeUnmount => hooks.before_unmount.clone(),
            HookKind::Unmounted => hooks.unmounted.clone(),
        }
    }

    pub(crate) fn method_named(&self, name: &str) -> Option<MethodFn> {
        self.methods.borrow().get(name).cloned()
    }

    pub(crate) fn watch_list(&self) -> Vec<Rc<dyn Watchable>> {
        self.watched.borrow().clone()
    }
}

fn sync_hook(hook: impl Fn(&HookContext) + 'static) -> HookFn {
    Rc::new(move |context| {
        hook(context);
        MaybeAsync::Ready(())
    })
}

// =============================================================================
// Tests
// =============================================================================
