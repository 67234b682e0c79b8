//! HTML serialization.
//!
//! Renders node trees back to HTML. Attribute order is preserved,
//! attribute values are always double-quoted, and text is escaped with
//! the references the parser decodes - parse/serialize round-trips are
//! stable for everything the renderer produces.

use super::node::NodeRef;

/// Serialize a node's children.
pub fn inner_html(node: &NodeRef) -> String {
    let mut out = String::new();
    for child in node.children() {
        write_node(&mut out, &child);
    }
    out
}

/// Serialize a node including itself.
pub fn outer_html(node: &NodeRef) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &NodeRef) {
    if let Some(tag) = node.tag() {
        out.push('<');
        out.push_str(tag);
        for (name, value) in node.attributes() {
            out.push(' ');
            out.push_str(&name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(&value));
            out.push('"');
        }
        out.push('>');
        if is_void(tag) {
            return;
        }
        let raw_text = is_raw_text(tag);
        for child in node.children() {
            if raw_text {
                // Style/script content is raw; escaping would corrupt it.
                if let Some(text) = child.text_content() {
                    out.push_str(&text);
                }
            } else {
                write_node(out, &child);
            }
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    } else if node.is_comment() {
        out.push_str("<!--");
        out.push_str(&node.text_content().unwrap_or_default());
        out.push_str("-->");
    } else if let Some(text) = node.text_content() {
        out.push_str(&escape_text(&text));
    }
}

fn is_void(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link"
            | "meta" | "param" | "source" | "track" | "wbr"
    )
}

fn is_raw_text(tag: &str) -> bool {
    matches!(tag, "style" | "script")
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
    out
}
