//! Keyed in-place diff/patch.
//!
//! [`Renderer::patch`] reconciles a live container against newly rendered
//! HTML. Node identity survives wherever possible: keyed elements are
//! relocated instead of recreated, unkeyed same-kind nodes are patched in
//! position, and equality checks on text and attributes keep no-op
//! renders free of DOM writes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::dom::{parser, NodeFlags, NodeRef};
use crate::error::{Error, Result};
use crate::types::{EVENT_PREFIX, STYLE_SCOPE_ATTR};

use super::properties;

/// Plugin override for element patching.
///
/// Called with `(old, new)` before the default element patch. Returning
/// `true` marks the node fully handled: the renderer skips its own
/// attribute sync and child recursion for that node.
pub type PatchHook = Rc<dyn Fn(&NodeRef, &NodeRef) -> bool>;

/// Stateless diff/patch engine.
///
/// "Stateless" with one deliberate exception: a scratch element is kept
/// and reused as the parse target for every [`Renderer::patch`] call, so
/// rendering does not allocate a fresh parser context each frame.
pub struct Renderer {
    scratch: NodeRef,
    patch_hook: RefCell<Option<PatchHook>>,
}

impl Renderer {
    /// Create a renderer with a fresh scratch element.
    pub fn new() -> Self {
        Self {
            scratch: NodeRef::element("div"),
            patch_hook: RefCell::new(None),
        }
    }

    /// Install a plugin patch hook, replacing any previous one.
    pub fn set_patch_hook(&self, hook: PatchHook) {
        *self.patch_hook.borrow_mut() = Some(hook);
    }

    /// Remove the plugin patch hook.
    pub fn clear_patch_hook(&self) {
        *self.patch_hook.borrow_mut() = None;
    }

    /// Reconcile `container`'s children against `new_html`.
    ///
    /// An empty string clears all children (scoped styles excepted).
    /// Fails with [`Error::InvalidArgument`] before touching anything if
    /// `container` is not an element; structural failures mid-walk are
    /// wrapped as [`Error::PatchFailure`].
    pub fn patch(&self, container: &NodeRef, new_html: &str) -> Result<()> {
        if !container.is_element() {
            return Err(Error::InvalidArgument(format!(
                "patch target must be an element, got {container:?}"
            )));
        }
        parser::parse_into(&self.scratch, new_html);
        self.diff(container, &self.scratch)
    }

    // =========================================================================
    // Tree diff
    // =========================================================================

    /// Reconcile the direct children of `old_parent` against those of
    /// `new_parent`, recursing through matched elements.
    fn diff(&self, old_parent: &NodeRef, new_parent: &NodeRef) -> Result<()> {
        // Keyed lookup over the old side; enables reorder without rebuild.
        let mut old_keyed: HashMap<String, NodeRef> = HashMap::new();
        for child in old_parent.children() {
            if is_scoped_style(&child) {
                continue;
            }
            if let Some(key) = child.key() {
                old_keyed.insert(key, child);
            }
        }

        let new_children = new_parent.children();
        for (index, new_child) in new_children.iter().enumerate() {
            let old_child = nth_diffable_child(old_parent, index);
            let keyed_match = new_child
                .key()
                .and_then(|key| old_keyed.get(&key).cloned());

            match (keyed_match, old_child) {
                // Keyed match somewhere in the old tree: move it into
                // position (identity preserved), then patch in place.
                (Some(matched), Some(old_child)) => {
                    if !matched.ptr_eq(&old_child)
                        && !old_parent.insert_before(&matched, Some(&old_child))
                    {
                        return Err(Error::PatchFailure(format!(
                            "failed to relocate keyed node {matched:?}"
                        )));
                    }
                    self.patch_node(&matched, new_child)?;
                }
                (Some(matched), None) => {
                    old_parent.append_child(&matched);
                    self.patch_node(&matched, new_child)?;
                }
                // Positional match.
                (None, Some(old_child)) => {
                    if same_node(&old_child, new_child) {
                        self.patch_node(&old_child, new_child)?;
                    } else if !old_child.replace_with(&new_child.deep_clone()) {
                        return Err(Error::PatchFailure(format!(
                            "failed to replace {old_child:?}"
                        )));
                    }
                }
                // New-side surplus.
                (None, None) => {
                    old_parent.append_child(&new_child.deep_clone());
                }
            }
        }

        // Old-side surplus. Scoped styles are invisible to the index walk
        // and are never removed here - they belong to the style injector.
        while let Some(extra) = nth_diffable_child(old_parent, new_children.len()) {
            extra.remove();
        }

        Ok(())
    }

    /// Patch a single matched node pair.
    fn patch_node(&self, old: &NodeRef, new: &NodeRef) -> Result<()> {
        // A mounted child component owns this subtree; its own watcher
        // re-renders it. Opaque to this pass.
        if old.has_flag(NodeFlags::COMPONENT_ROOT) {
            return Ok(());
        }

        if !same_node(old, new) {
            if !old.replace_with(&new.deep_clone()) {
                return Err(Error::PatchFailure(format!("failed to replace {old:?}")));
            }
            return Ok(());
        }

        if old.is_text() || old.is_comment() {
            let new_content = new.text_content().unwrap_or_default();
            // Only write on actual change.
            if old.text_content().unwrap_or_default() != new_content {
                old.set_text_content(&new_content);
            }
            return Ok(());
        }

        let hook = self.patch_hook.borrow().clone();
        if let Some(hook) = hook {
            if hook(old, new) {
                return Ok(());
            }
        }

        sync_attributes(old, new);
        self.diff(old, new)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Attribute sync
// =============================================================================

/// Bring `old`'s attributes in line with `new`'s.
///
/// Additions and updates run before removals, and a given attribute is
/// touched by exactly one branch per pass. Event-binding attributes are
/// never touched in either direction - they belong to the orchestrator's
/// event wiring, not the DOM.
fn sync_attributes(old: &NodeRef, new: &NodeRef) {
    for (name, value) in new.attributes() {
        if name.starts_with(EVENT_PREFIX) {
            continue;
        }
        if old.attribute(&name).as_deref() == Some(value.as_str()) {
            continue;
        }
        old.set_attribute(&name, &value);
        properties::apply_property(old, &name, &value);
    }

    for name in old.attribute_names() {
        if name.starts_with(EVENT_PREFIX) {
            continue;
        }
        if new.has_attribute(&name) {
            continue;
        }
        old.remove_attribute(&name);
        properties::clear_property(old, &name);
    }
}

// =============================================================================
// Node identity
// =============================================================================

/// Two nodes are "the same node" for patch purposes if they share node
/// type and tag name, and - when either carries a `key` - equal keys.
fn same_node(old: &NodeRef, new: &NodeRef) -> bool {
    if old.is_text() {
        return new.is_text();
    }
    if old.is_comment() {
        return new.is_comment();
    }
    new.is_element() && old.tag() == new.tag() && old.key() == new.key()
}

/// True for `<style>` elements owned by a mounted instance's style
/// injector.
fn is_scoped_style(node: &NodeRef) -> bool {
    node.tag() == Some("style") && node.has_attribute(STYLE_SCOPE_ATTR)
}

/// The `index`-th child that participates in diffing (scoped styles are
/// skipped). Reads the live list, so relocations are observed.
fn nth_diffable_child(parent: &NodeRef, index: usize) -> Option<NodeRef> {
    parent
        .children()
        .into_iter()
        .filter(|child| !is_scoped_style(child))
        .nth(index)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::PropertyValue;
    use std::cell::Cell;

    fn container() -> NodeRef {
        NodeRef::element("div")
    }

    #[test]
    fn test_patch_rejects_non_element_container() {
        let renderer = Renderer::new();
        let text = NodeRef::text("not an element");

        let result = renderer.patch(&text, "<p>x</p>");
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_patch_populates_empty_container() {
        let renderer = Renderer::new();
        let root = container();

        renderer.patch(&root, "<h1>Title</h1><p>Body</p>").unwrap();
        assert_eq!(root.inner_html(), "<h1>Title</h1><p>Body</p>");
    }

    #[test]
    fn test_patch_empty_html_clears_children() {
        let renderer = Renderer::new();
        let root = container();

        renderer.patch(&root, "<p>one</p><p>two</p>").unwrap();
        renderer.patch(&root, "").unwrap();
        assert_eq!(root.child_count(), 0);
    }

    #[test]
    fn test_patch_matches_fresh_render() {
        let renderer = Renderer::new();
        let root = container();
        let a = "<ul><li>one</li><li>two</li></ul>";
        let b = "<ul><li>one</li><li>three</li><li>four</li></ul>";

        renderer.patch(&root, a).unwrap();
        renderer.patch(&root, b).unwrap();

        let fresh = container();
        renderer.patch(&fresh, b).unwrap();
        assert_eq!(root.inner_html(), fresh.inner_html());
    }

    #[test]
    fn test_identical_render_reuses_nodes() {
        let renderer = Renderer::new();
        let root = container();
        let html = "<p class=\"a\">same</p>";

        renderer.patch(&root, html).unwrap();
        let p_before = root.children()[0].clone();
        let text_before = p_before.children()[0].clone();

        renderer.patch(&root, html).unwrap();
        assert!(root.children()[0].ptr_eq(&p_before));
        assert!(p_before.children()[0].ptr_eq(&text_before));
    }

    #[test]
    fn test_text_updated_in_place() {
        let renderer = Renderer::new();
        let root = container();

        renderer.patch(&root, "<p>old</p>").unwrap();
        let text_node = root.children()[0].children()[0].clone();

        renderer.patch(&root, "<p>new</p>").unwrap();
        assert!(root.children()[0].children()[0].ptr_eq(&text_node));
        assert_eq!(text_node.text_content().as_deref(), Some("new"));
    }

    #[test]
    fn test_tag_change_replaces_node() {
        let renderer = Renderer::new();
        let root = container();

        renderer.patch(&root, "<span>x</span>").unwrap();
        let span = root.children()[0].clone();

        renderer.patch(&root, "<p>x</p>").unwrap();
        assert!(!root.children()[0].ptr_eq(&span));
        assert_eq!(root.children()[0].tag(), Some("p"));
        assert!(span.parent().is_none());
    }

    #[test]
    fn test_keyed_swap_preserves_node_identity() {
        let renderer = Renderer::new();
        let root = container();

        renderer
            .patch(&root, "<li key=\"a\">A</li><li key=\"b\">B</li>")
            .unwrap();
        let node_a = root.children()[0].clone();
        let node_b = root.children()[1].clone();

        renderer
            .patch(&root, "<li key=\"b\">B</li><li key=\"a\">A</li>")
            .unwrap();

        // Same node objects, reordered - not destroyed and recreated.
        assert!(root.children()[0].ptr_eq(&node_b));
        assert!(root.children()[1].ptr_eq(&node_a));
    }

    #[test]
    fn test_keyed_insertion_reuses_existing_nodes() {
        let renderer = Renderer::new();
        let root = container();

        renderer
            .patch(&root, "<li key=\"a\">A</li><li key=\"c\">C</li>")
            .unwrap();
        let node_a = root.children()[0].clone();
        let node_c = root.children()[1].clone();

        renderer
            .patch(
                &root,
                "<li key=\"a\">A</li><li key=\"b\">B</li><li key=\"c\">C</li>",
            )
            .unwrap();

        let children = root.children();
        assert_eq!(children.len(), 3);
        assert!(children[0].ptr_eq(&node_a));
        assert_eq!(children[1].key().as_deref(), Some("b"));
        assert!(children[2].ptr_eq(&node_c));
    }

    #[test]
    fn test_keyed_removal_drops_only_missing_key() {
        let renderer = Renderer::new();
        let root = container();

        renderer
            .patch(&root, "<li key=\"a\">A</li><li key=\"b\">B</li><li key=\"c\">C</li>")
            .unwrap();
        let node_c = root.children()[2].clone();

        renderer
            .patch(&root, "<li key=\"a\">A</li><li key=\"c\">C</li>")
            .unwrap();

        let children = root.children();
        assert_eq!(children.len(), 2);
        assert!(children[1].ptr_eq(&node_c));
    }

    #[test]
    fn test_attribute_sync() {
        let renderer = Renderer::new();
        let root = container();

        renderer
            .patch(&root, "<div id=\"x\" class=\"old\" data-stale=\"1\"></div>")
            .unwrap();
        renderer
            .patch(&root, "<div id=\"x\" class=\"new\" title=\"added\"></div>")
            .unwrap();

        let div = root.children()[0].clone();
        assert_eq!(div.attribute("class").as_deref(), Some("new"));
        assert_eq!(div.attribute("title").as_deref(), Some("added"));
        assert!(!div.has_attribute("data-stale"));
    }

    #[test]
    fn test_value_attribute_mirrors_property() {
        let renderer = Renderer::new();
        let root = container();

        renderer.patch(&root, "<input value=\"draft\">").unwrap();
        let input = root.children()[0].clone();
        assert_eq!(
            input.property("value"),
            Some(PropertyValue::Text("draft".into()))
        );

        renderer.patch(&root, "<input checked>").unwrap();
        assert_eq!(input.property("checked"), Some(PropertyValue::Flag(true)));
        assert_eq!(
            input.property("value"),
            Some(PropertyValue::Text(String::new()))
        );
    }

    #[test]
    fn test_event_attributes_are_never_touched() {
        let renderer = Renderer::new();
        let root = container();

        renderer.patch(&root, "<button @click=\"go\">Go</button>").unwrap();
        let button = root.children()[0].clone();
        // The renderer leaves the parsed binding attribute for the
        // orchestrator; it neither strips nor re-applies it.
        assert_eq!(button.attribute("@click").as_deref(), Some("go"));

        button.remove_attribute("@click");
        renderer.patch(&root, "<button @click=\"go\">Go</button>").unwrap();
        assert!(!button.has_attribute("@click"));
    }

    #[test]
    fn test_scoped_style_survives_rerender() {
        let renderer = Renderer::new();
        let root = container();

        renderer.patch(&root, "<p>content</p>").unwrap();
        let style = NodeRef::element("style");
        style.set_attribute(STYLE_SCOPE_ATTR, "c1");
        style.append_child(&NodeRef::text("p { color: red; }"));
        root.insert_before(&style, root.children().first());

        // New tree has no style tag at all.
        renderer.patch(&root, "<p>updated</p><p>more</p>").unwrap();

        let children = root.children();
        assert!(children.iter().any(|node| node.ptr_eq(&style)));
        assert_eq!(
            root.query_selector_all("p")
                .iter()
                .map(|p| p.inner_html())
                .collect::<Vec<_>>(),
            vec!["updated".to_string(), "more".to_string()]
        );

        renderer.patch(&root, "").unwrap();
        assert_eq!(root.child_count(), 1);
        assert!(root.children()[0].ptr_eq(&style));
    }

    #[test]
    fn test_component_root_subtree_is_opaque() {
        let renderer = Renderer::new();
        let root = container();

        renderer.patch(&root, "<div class=\"child\"></div>").unwrap();
        let child_root = root.children()[0].clone();
        child_root.insert_flag(NodeFlags::COMPONENT_ROOT);

        // Simulate the child instance rendering its own content.
        child_root.append_child(&NodeRef::text("child content"));
        let before = child_root.outer_html();

        // Parent re-render: placeholder is empty and attributes differ.
        renderer
            .patch(&root, "<div class=\"child\" data-x=\"1\"></div>")
            .unwrap();

        assert!(root.children()[0].ptr_eq(&child_root));
        assert_eq!(child_root.outer_html(), before);
    }

    #[test]
    fn test_patch_hook_overrides_element_patch() {
        let renderer = Renderer::new();
        let root = container();
        renderer.patch(&root, "<p class=\"a\">x</p>").unwrap();

        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        renderer.set_patch_hook(Rc::new(move |old, _new| {
            calls_clone.set(calls_clone.get() + 1);
            // Claim the node: default attribute sync must not run.
            old.is_element()
        }));

        renderer.patch(&root, "<p class=\"b\">x</p>").unwrap();
        assert!(calls.get() >= 1);
        assert_eq!(
            root.children()[0].attribute("class").as_deref(),
            Some("a")
        );

        renderer.clear_patch_hook();
        renderer.patch(&root, "<p class=\"b\">x</p>").unwrap();
        assert_eq!(
            root.children()[0].attribute("class").as_deref(),
            Some("b")
        );
    }

    #[test]
    fn test_nested_structures_diff_recursively() {
        let renderer = Renderer::new();
        let root = container();

        renderer
            .patch(&root, "<div><ul><li>a</li></ul></div>")
            .unwrap();
        let ul = root.query_selector("ul").unwrap();

        renderer
            .patch(&root, "<div><ul><li>a</li><li>b</li></ul></div>")
            .unwrap();

        assert!(root.query_selector("ul").unwrap().ptr_eq(&ul));
        assert_eq!(ul.child_count(), 2);
    }
}
