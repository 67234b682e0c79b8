//! Node tree - elements, text, comments.
//!
//! Nodes are reference-counted: [`NodeRef`] is a cheap clonable handle,
//! parents hold strong references to children and children hold weak
//! references back. Identity is pointer identity ([`NodeRef::ptr_eq`]),
//! which is what lets the diff engine prove it reused a node instead of
//! recreating it.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use bitflags::bitflags;
use indexmap::IndexMap;

// =============================================================================
// Flags
// =============================================================================

bitflags! {
    /// Out-of-band node markers the renderer consults.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// Root element of a mounted child component. The subtree below
        /// this node is owned by that child instance and is opaque to any
        /// ancestor's reconciliation pass.
        const COMPONENT_ROOT = 1 << 0;
    }
}

// =============================================================================
// Properties
// =============================================================================

/// A live DOM property value.
///
/// Properties are the renderer-facing side channel for attributes whose
/// string form and live form diverge (`value`, `checked`, ...). They are
/// deliberately not serialized - only attributes appear in HTML output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropertyValue {
    /// A string-valued property such as `value`.
    Text(String),
    /// A boolean property such as `checked` or `disabled`.
    Flag(bool),
}

// =============================================================================
// Events
// =============================================================================

/// An event dispatched to a node's listeners.
pub struct Event {
    /// Event name, e.g. `click`.
    pub name: String,
    /// The node the event was dispatched on.
    pub target: NodeRef,
    /// Optional event payload.
    pub payload: Option<Rc<dyn Any>>,
}

type ListenerCallback = Rc<dyn Fn(&Event)>;

struct ListenerEntry {
    id: u64,
    event: String,
    callback: ListenerCallback,
}

/// Removes a registered listener when asked.
///
/// Holds only a weak reference: a handle outliving its node is inert.
pub struct ListenerHandle {
    node: Weak<NodeData>,
    id: u64,
}

impl ListenerHandle {
    /// Detach the listener. Idempotent.
    pub fn remove(&self) {
        if let Some(node) = self.node.upgrade() {
            if let NodeKind::Element { listeners, .. } = &node.kind {
                listeners.borrow_mut().retain(|entry| entry.id != self.id);
            }
        }
    }
}

// =============================================================================
// Node
// =============================================================================

enum NodeKind {
    Element {
        tag: String,
        attributes: RefCell<IndexMap<String, String>>,
        properties: RefCell<IndexMap<String, PropertyValue>>,
        listeners: RefCell<Vec<ListenerEntry>>,
        next_listener_id: Cell<u64>,
    },
    Text(RefCell<String>),
    Comment(RefCell<String>),
}

struct NodeData {
    id: u64,
    kind: NodeKind,
    flags: Cell<NodeFlags>,
    parent: RefCell<Weak<NodeData>>,
    children: RefCell<Vec<NodeRef>>,
}

thread_local! {
    static NODE_ID_COUNTER: Cell<u64> = const { Cell::new(0) };
}

fn next_node_id() -> u64 {
    NODE_ID_COUNTER.with(|counter| {
        let id = counter.get();
        counter.set(id + 1);
        id
    })
}

/// Shared handle to a node.
#[derive(Clone)]
pub struct NodeRef(Rc<NodeData>);

impl NodeRef {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a detached element node. The tag is canonicalized to ASCII
    /// lowercase.
    pub fn element(tag: &str) -> Self {
        Self(Rc::new(NodeData {
            id: next_node_id(),
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                attributes: RefCell::new(IndexMap::new()),
                properties: RefCell::new(IndexMap::new()),
                listeners: RefCell::new(Vec::new()),
                next_listener_id: Cell::new(0),
            },
            flags: Cell::new(NodeFlags::empty()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        }))
    }

    /// Create a detached text node.
    pub fn text(content: &str) -> Self {
        Self(Rc::new(NodeData {
            id: next_node_id(),
            kind: NodeKind::Text(RefCell::new(content.to_string())),
            flags: Cell::new(NodeFlags::empty()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        }))
    }

    /// Create a detached comment node.
    pub fn comment(content: &str) -> Self {
        Self(Rc::new(NodeData {
            id: next_node_id(),
            kind: NodeKind::Comment(RefCell::new(content.to_string())),
            flags: Cell::new(NodeFlags::empty()),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        }))
    }

    // =========================================================================
    // Identity and kind
    // =========================================================================

    /// Process-unique node id.
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// True if both handles point at the same node.
    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// True for element nodes.
    pub fn is_element(&self) -> bool {
        matches!(self.0.kind, NodeKind::Element { .. })
    }

    /// True for text nodes.
    pub fn is_text(&self) -> bool {
        matches!(self.0.kind, NodeKind::Text(_))
    }

    /// True for comment nodes.
    pub fn is_comment(&self) -> bool {
        matches!(self.0.kind, NodeKind::Comment(_))
    }

    /// Element tag name, lowercase. `None` for non-elements.
    pub fn tag(&self) -> Option<&str> {
        match &self.0.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    // =========================================================================
    // Flags
    // =========================================================================

    /// Current flag set.
    pub fn flags(&self) -> NodeFlags {
        self.0.flags.get()
    }

    /// Set a flag.
    pub fn insert_flag(&self, flag: NodeFlags) {
        self.0.flags.set(self.0.flags.get() | flag);
    }

    /// Clear a flag.
    pub fn remove_flag(&self, flag: NodeFlags) {
        self.0.flags.set(self.0.flags.get() - flag);
    }

    /// True if the flag is set.
    pub fn has_flag(&self, flag: NodeFlags) -> bool {
        self.0.flags.get().contains(flag)
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Attribute value, if present. `None` for non-elements.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.kind {
            NodeKind::Element { attributes, .. } => attributes.borrow().get(name).cloned(),
            _ => None,
        }
    }

    /// True if the attribute is present.
    pub fn has_attribute(&self, name: &str) -> bool {
        match &self.0.kind {
            NodeKind::Element { attributes, .. } => attributes.borrow().contains_key(name),
            _ => false,
        }
    }

    /// Set an attribute. The name is canonicalized to ASCII lowercase.
    /// No-op on non-elements.
    pub fn set_attribute(&self, name: &str, value: &str) {
        if let NodeKind::Element { attributes, .. } = &self.0.kind {
            attributes
                .borrow_mut()
                .insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    /// Remove an attribute. No-op when absent.
    pub fn remove_attribute(&self, name: &str) {
        if let NodeKind::Element { attributes, .. } = &self.0.kind {
            attributes.borrow_mut().shift_remove(name);
        }
    }

    /// Attribute names in insertion order.
    pub fn attribute_names(&self) -> Vec<String> {
        match &self.0.kind {
            NodeKind::Element { attributes, .. } => {
                attributes.borrow().keys().cloned().collect()
            }
            _ => Vec::new(),
        }
    }

    /// Attribute name/value pairs in insertion order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        match &self.0.kind {
            NodeKind::Element { attributes, .. } => attributes
                .borrow()
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The `key` attribute, used for identity matching across renders.
    pub fn key(&self) -> Option<String> {
        self.attribute(crate::types::KEY_ATTR)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Live property value, if set.
    pub fn property(&self, name: &str) -> Option<PropertyValue> {
        match &self.0.kind {
            NodeKind::Element { properties, .. } => properties.borrow().get(name).cloned(),
            _ => None,
        }
    }

    /// Set a live property. No-op on non-elements.
    pub fn set_property(&self, name: &str, value: PropertyValue) {
        if let NodeKind::Element { properties, .. } = &self.0.kind {
            properties.borrow_mut().insert(name.to_string(), value);
        }
    }

    // =========================================================================
    // Text content
    // =========================================================================

    /// Text or comment content. `None` for elements.
    pub fn text_content(&self) -> Option<String> {
        match &self.0.kind {
            NodeKind::Text(content) | NodeKind::Comment(content) => {
                Some(content.borrow().clone())
            }
            _ => None,
        }
    }

    /// Replace text or comment content. No-op on elements.
    pub fn set_text_content(&self, new_content: &str) {
        if let NodeKind::Text(content) | NodeKind::Comment(content) = &self.0.kind {
            *content.borrow_mut() = new_content.to_string();
        }
    }

    // =========================================================================
    // Tree structure
    // =========================================================================

    /// Parent node, if attached.
    pub fn parent(&self) -> Option<NodeRef> {
        self.0.parent.borrow().upgrade().map(NodeRef)
    }

    /// Snapshot of the children list.
    pub fn children(&self) -> Vec<NodeRef> {
        self.0.children.borrow().clone()
    }

    /// Number of children.
    pub fn child_count(&self) -> usize {
        self.0.children.borrow().len()
    }

    /// First child, if any.
    pub fn first_child(&self) -> Option<NodeRef> {
        self.0.children.borrow().first().cloned()
    }

    /// Append `child` as the last child, detaching it from any previous
    /// parent first.
    pub fn append_child(&self, child: &NodeRef) {
        child.detach();
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child.clone());
    }

    /// Insert `child` before `reference` (or append when `reference` is
    /// `None`). Returns false if `reference` is not a child of `self`.
    pub fn insert_before(&self, child: &NodeRef, reference: Option<&NodeRef>) -> bool {
        let Some(reference) = reference else {
            self.append_child(child);
            return true;
        };
        if child.ptr_eq(reference) {
            return true;
        }
        child.detach();
        let index = {
            let children = self.0.children.borrow();
            children.iter().position(|node| node.ptr_eq(reference))
        };
        match index {
            Some(index) => {
                *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
                self.0.children.borrow_mut().insert(index, child.clone());
                true
            }
            None => false,
        }
    }

    /// Detach this node from its parent. Returns false if it was already
    /// detached.
    pub fn remove(&self) -> bool {
        self.detach()
    }

    /// Replace this node with `replacement` in the parent's child list.
    /// Returns false if this node has no parent.
    pub fn replace_with(&self, replacement: &NodeRef) -> bool {
        let Some(parent) = self.parent() else {
            return false;
        };
        if !parent.insert_before(replacement, Some(self)) {
            return false;
        }
        self.detach()
    }

    /// Remove all children.
    pub fn clear_children(&self) {
        let children = self.children();
        for child in children {
            child.detach();
        }
    }

    /// True if `other` is a descendant of (or identical to) this node.
    pub fn contains(&self, other: &NodeRef) -> bool {
        let mut current = Some(other.clone());
        while let Some(node) = current {
            if node.ptr_eq(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    fn detach(&self) -> bool {
        let Some(parent) = self.parent() else {
            return false;
        };
        parent
            .0
            .children
            .borrow_mut()
            .retain(|node| !node.ptr_eq(self));
        *self.0.parent.borrow_mut() = Weak::new();
        true
    }

    // =========================================================================
    // Cloning
    // =========================================================================

    /// Deep-copy this subtree into fresh detached nodes.
    ///
    /// Attributes, properties and text carry over; listeners and flags do
    /// not - a clone is new content with a new identity, not a mounted
    /// component root.
    pub fn deep_clone(&self) -> NodeRef {
        match &self.0.kind {
            NodeKind::Element { tag, attributes, properties, .. } => {
                let clone = NodeRef::element(tag);
                if let NodeKind::Element {
                    attributes: clone_attributes,
                    properties: clone_properties,
                    ..
                } = &clone.0.kind
                {
                    *clone_attributes.borrow_mut() = attributes.borrow().clone();
                    *clone_properties.borrow_mut() = properties.borrow().clone();
                }
                for child in self.children() {
                    clone.append_child(&child.deep_clone());
                }
                clone
            }
            NodeKind::Text(content) => NodeRef::text(&content.borrow()),
            NodeKind::Comment(content) => NodeRef::comment(&content.borrow()),
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Register an event listener. Returns a cleanup handle.
    ///
    /// Listeners only exist on elements; on other nodes this returns an
    /// inert handle.
    pub fn add_listener(
        &self,
        event: &str,
        callback: impl Fn(&Event) + 'static,
    ) -> ListenerHandle {
        if let NodeKind::Element { listeners, next_listener_id, .. } = &self.0.kind {
            let id = next_listener_id.get();
            next_listener_id.set(id + 1);
            listeners.borrow_mut().push(ListenerEntry {
                id,
                event: event.to_string(),
                callback: Rc::new(callback),
            });
            ListenerHandle {
                node: Rc::downgrade(&self.0),
                id,
            }
        } else {
            ListenerHandle {
                node: Weak::new(),
                id: 0,
            }
        }
    }

    /// Dispatch an event to this node's listeners, in registration order.
    /// There is no bubbling; dispatch targets exactly one node.
    pub fn dispatch(&self, event: &str, payload: Option<Rc<dyn Any>>) {
        let callbacks: Vec<ListenerCallback> = match &self.0.kind {
            NodeKind::Element { listeners, .. } => listeners
                .borrow()
                .iter()
                .filter(|entry| entry.event == event)
                .map(|entry| entry.callback.clone())
                .collect(),
            _ => return,
        };
        let event = Event {
            name: event.to_string(),
            target: self.clone(),
            payload,
        };
        for callback in callbacks {
            callback(&event);
        }
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        match &self.0.kind {
            NodeKind::Element { listeners, .. } => listeners
                .borrow()
                .iter()
                .filter(|entry| entry.event == event)
                .count(),
            _ => 0,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All descendant elements matching a simple selector, in document
    /// order. Supports `tag`, `#id`, `.class` and compounds of those
    /// (e.g. `li.item`). No combinators.
    pub fn query_selector_all(&self, selector: &str) -> Vec<NodeRef> {
        let Some(selector) = SimpleSelector::parse(selector) else {
            return Vec::new();
        };
        let mut matches = Vec::new();
        for child in self.children() {
            collect_matches(&child, &selector, &mut matches);
        }
        matches
    }

    /// First descendant element matching the selector.
    pub fn query_selector(&self, selector: &str) -> Option<NodeRef> {
        self.query_selector_all(selector).into_iter().next()
    }

    /// Serialized HTML of this node's children.
    pub fn inner_html(&self) -> String {
        super::serialize::inner_html(self)
    }

    /// Serialized HTML of this node including itself.
    pub fn outer_html(&self) -> String {
        super::serialize::outer_html(self)
    }
}

impl std::fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0.kind {
            NodeKind::Element { tag, .. } => {
                write!(f, "<{} #{} children={}>", tag, self.0.id, self.child_count())
            }
            NodeKind::Text(content) => write!(f, "#text({:?})", content.borrow()),
            NodeKind::Comment(content) => write!(f, "#comment({:?})", content.borrow()),
        }
    }
}

fn collect_matches(node: &NodeRef, selector: &SimpleSelector, matches: &mut Vec<NodeRef>) {
    if selector.matches(node) {
        matches.push(node.clone());
    }
    for child in node.children() {
        collect_matches(&child, selector, matches);
    }
}

// =============================================================================
// Simple selectors
// =============================================================================

/// A single compound selector: optional tag plus `#id`/`.class` parts.
struct SimpleSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl SimpleSelector {
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || input.contains(char::is_whitespace) {
            return None;
        }
        let mut selector = SimpleSelector {
            tag: None,
            id: None,
            classes: Vec::new(),
        };
        let mut rest = input;
        if !rest.starts_with(['#', '.']) {
            let end = rest.find(['#', '.']).unwrap_or(rest.len());
            selector.tag = Some(rest[..end].to_ascii_lowercase());
            rest = &rest[end..];
        }
        while !rest.is_empty() {
            let marker = rest.as_bytes()[0];
            rest = &rest[1..];
            let end = rest.find(['#', '.']).unwrap_or(rest.len());
            let part = &rest[..end];
            if part.is_empty() {
                return None;
            }
            match marker {
                b'#' => selector.id = Some(part.to_string()),
                b'.' => selector.classes.push(part.to_string()),
                _ => return None,
            }
            rest = &rest[end..];
        }
        Some(selector)
    }

    fn matches(&self, node: &NodeRef) -> bool {
        let Some(tag) = node.tag() else {
            return false;
        };
        if let Some(expected) = &self.tag {
            if tag != expected {
                return false;
            }
        }
        if let Some(expected) = &self.id {
            if node.attribute("id").as_deref() != Some(expected.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = node.attribute("class").unwrap_or_default();
            let classes: Vec<&str> = class_attr.split_whitespace().collect();
            for expected in &self.classes {
                if !classes.contains(&expected.as_str()) {
                    return false;
                }
            }
        }
        true
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_element_construction() {
        let div = NodeRef::element("DIV");
        assert!(div.is_element());
        assert_eq!(div.tag(), Some("div"));
        assert_eq!(div.child_count(), 0);
        assert!(div.parent().is_none());
    }

    #[test]
    fn test_node_ids_are_unique() {
        let a = NodeRef::element("div");
        let b = NodeRef::element("div");
        assert_ne!(a.id(), b.id());
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_append_and_reparent() {
        let a = NodeRef::element("div");
        let b = NodeRef::element("div");
        let child = NodeRef::text("hi");

        a.append_child(&child);
        assert_eq!(a.child_count(), 1);
        assert!(child.parent().unwrap().ptr_eq(&a));

        // Appending elsewhere detaches from the old parent.
        b.append_child(&child);
        assert_eq!(a.child_count(), 0);
        assert!(child.parent().unwrap().ptr_eq(&b));
    }

    #[test]
    fn test_insert_before() {
        let parent = NodeRef::element("ul");
        let first = NodeRef::element("li");
        let second = NodeRef::element("li");
        parent.append_child(&second);
        assert!(parent.insert_before(&first, Some(&second)));

        let children = parent.children();
        assert!(children[0].ptr_eq(&first));
        assert!(children[1].ptr_eq(&second));

        // Unknown reference node fails.
        let orphan = NodeRef::element("li");
        let other = NodeRef::element("li");
        assert!(!parent.insert_before(&other, Some(&orphan)));
    }

    #[test]
    fn test_insert_before_relocates_existing_child() {
        let parent = NodeRef::element("ul");
        let a = NodeRef::element("li");
        let b = NodeRef::element("li");
        parent.append_child(&a);
        parent.append_child(&b);

        assert!(parent.insert_before(&b, Some(&a)));
        let children = parent.children();
        assert!(children[0].ptr_eq(&b));
        assert!(children[1].ptr_eq(&a));
        assert_eq!(parent.child_count(), 2);
    }

    #[test]
    fn test_replace_with() {
        let parent = NodeRef::element("div");
        let old = NodeRef::element("span");
        let new = NodeRef::element("p");
        parent.append_child(&old);

        assert!(old.replace_with(&new));
        assert_eq!(parent.child_count(), 1);
        assert!(parent.children()[0].ptr_eq(&new));
        assert!(old.parent().is_none());

        // A detached node has nothing to replace.
        assert!(!old.replace_with(&NodeRef::element("i")));
    }

    #[test]
    fn test_contains() {
        let root = NodeRef::element("div");
        let middle = NodeRef::element("section");
        let leaf = NodeRef::text("deep");
        root.append_child(&middle);
        middle.append_child(&leaf);

        assert!(root.contains(&leaf));
        assert!(root.contains(&root));
        assert!(!middle.contains(&root));
    }

    #[test]
    fn test_attributes_preserve_insertion_order() {
        let el = NodeRef::element("input");
        el.set_attribute("type", "text");
        el.set_attribute("NAME", "email");
        el.set_attribute("placeholder", "you@example.com");

        assert_eq!(el.attribute("name").as_deref(), Some("email"));
        assert_eq!(
            el.attribute_names(),
            vec!["type".to_string(), "name".to_string(), "placeholder".to_string()]
        );

        el.remove_attribute("name");
        assert!(!el.has_attribute("name"));
        assert_eq!(
            el.attribute_names(),
            vec!["type".to_string(), "placeholder".to_string()]
        );
    }

    #[test]
    fn test_properties_are_separate_from_attributes() {
        let input = NodeRef::element("input");
        input.set_attribute("value", "initial");
        input.set_property("value", PropertyValue::Text("typed".into()));

        assert_eq!(input.attribute("value").as_deref(), Some("initial"));
        assert_eq!(
            input.property("value"),
            Some(PropertyValue::Text("typed".into()))
        );
    }

    #[test]
    fn test_text_content() {
        let text = NodeRef::text("hello");
        assert_eq!(text.text_content().as_deref(), Some("hello"));

        text.set_text_content("goodbye");
        assert_eq!(text.text_content().as_deref(), Some("goodbye"));

        let el = NodeRef::element("div");
        assert!(el.text_content().is_none());
    }

    #[test]
    fn test_deep_clone_copies_content_not_identity() {
        let el = NodeRef::element("div");
        el.set_attribute("class", "card");
        el.insert_flag(NodeFlags::COMPONENT_ROOT);
        el.append_child(&NodeRef::text("body"));

        let clone = el.deep_clone();
        assert!(!clone.ptr_eq(&el));
        assert_eq!(clone.attribute("class").as_deref(), Some("card"));
        assert_eq!(clone.child_count(), 1);
        assert_eq!(clone.children()[0].text_content().as_deref(), Some("body"));
        // Flags mark runtime ownership and never survive a clone.
        assert!(!clone.has_flag(NodeFlags::COMPONENT_ROOT));
    }

    #[test]
    fn test_listeners_dispatch_and_remove() {
        let button = NodeRef::element("button");
        let clicks = Rc::new(Cell::new(0));

        let clicks_clone = clicks.clone();
        let handle = button.add_listener("click", move |_| {
            clicks_clone.set(clicks_clone.get() + 1);
        });

        button.dispatch("click", None);
        button.dispatch("keydown", None);
        assert_eq!(clicks.get(), 1);

        handle.remove();
        button.dispatch("click", None);
        assert_eq!(clicks.get(), 1);
        assert_eq!(button.listener_count("click"), 0);
    }

    #[test]
    fn test_event_target_is_dispatching_node() {
        let button = NodeRef::element("button");
        let saw_target = Rc::new(Cell::new(false));

        let button_clone = button.clone();
        let saw = saw_target.clone();
        let _handle = button.add_listener("click", move |event| {
            saw.set(event.target.ptr_eq(&button_clone));
        });

        button.dispatch("click", None);
        assert!(saw_target.get());
    }

    #[test]
    fn test_query_selector_all() {
        let root = NodeRef::element("div");
        let list = NodeRef::element("ul");
        root.append_child(&list);
        for class in ["item", "item selected", "other"] {
            let li = NodeRef::element("li");
            li.set_attribute("class", class);
            list.append_child(&li);
        }
        let footer = NodeRef::element("footer");
        footer.set_attribute("id", "end");
        root.append_child(&footer);

        assert_eq!(root.query_selector_all("li").len(), 3);
        assert_eq!(root.query_selector_all("li.item").len(), 2);
        assert_eq!(root.query_selector_all(".selected").len(), 1);
        assert!(root.query_selector("#end").unwrap().ptr_eq(&footer));
        assert!(root.query_selector("span").is_none());
    }

    #[test]
    fn test_flags() {
        let el = NodeRef::element("div");
        assert!(!el.has_flag(NodeFlags::COMPONENT_ROOT));

        el.insert_flag(NodeFlags::COMPONENT_ROOT);
        assert!(el.has_flag(NodeFlags::COMPONENT_ROOT));

        el.remove_flag(NodeFlags::COMPONENT_ROOT);
        assert!(!el.has_flag(NodeFlags::COMPONENT_ROOT));
    }

    #[test]
    fn test_clear_children() {
        let parent = NodeRef::element("div");
        let a = NodeRef::text("a");
        let b = NodeRef::text("b");
        parent.append_child(&a);
        parent.append_child(&b);

        parent.clear_children();
        assert_eq!(parent.child_count(), 0);
        assert!(a.parent().is_none());
        assert!(b.parent().is_none());
    }
}
