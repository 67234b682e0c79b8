//! HTML fragment tokenizer.
//!
//! Parses template output into detached node trees. The grammar is the
//! pragmatic subset templates actually produce: elements with quoted,
//! unquoted and bare attributes, text, comments, void elements,
//! self-closing syntax, and raw-text `<style>`/`<script>` content.
//!
//! Parsing is tolerant, the way browsers are: an unmatched close tag is
//! ignored, unclosed elements close at end of input, and a stray `<`
//! becomes text. Tag and attribute names are canonicalized to ASCII
//! lowercase. Duplicate attributes keep the first occurrence.

use super::node::NodeRef;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta",
    "param", "source", "track", "wbr",
];

/// Elements whose content is raw text up to the matching close tag.
const RAW_TEXT_ELEMENTS: &[&str] = &["style", "script"];

/// Parse an HTML fragment into a list of detached top-level nodes.
pub fn parse_fragment(html: &str) -> Vec<NodeRef> {
    Parser::new(html).run()
}

/// Replace `parent`'s children with the parsed fragment.
pub fn parse_into(parent: &NodeRef, html: &str) {
    parent.clear_children();
    for node in parse_fragment(html) {
        parent.append_child(&node);
    }
}

// =============================================================================
// Parser
// =============================================================================

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn run(mut self) -> Vec<NodeRef> {
        let mut roots: Vec<NodeRef> = Vec::new();
        let mut stack: Vec<NodeRef> = Vec::new();

        while self.pos < self.input.len() {
            if self.starts_with("<!--") {
                let comment = self.consume_comment();
                append(&mut roots, &stack, comment);
            } else if self.starts_with("</") {
                self.consume_close_tag(&mut stack);
            } else if self.starts_with("<!") {
                // Doctype or processing noise; skip to '>'.
                self.skip_past(b'>');
            } else if self.at_open_tag() {
                self.consume_open_tag(&mut roots, &mut stack);
            } else {
                let text = self.consume_text();
                if !text.text_content().unwrap_or_default().is_empty() {
                    append(&mut roots, &stack, text);
                }
            }
        }

        roots
    }

    // =========================================================================
    // Token consumers
    // =========================================================================

    fn consume_comment(&mut self) -> NodeRef {
        self.pos += 4; // past "<!--"
        let start = self.pos;
        let end = self.input[self.pos..]
            .find("-->")
            .map(|offset| self.pos + offset)
            .unwrap_or(self.input.len());
        let content = &self.input[start..end];
        self.pos = (end + 3).min(self.input.len());
        NodeRef::comment(content)
    }

    fn consume_close_tag(&mut self, stack: &mut Vec<NodeRef>) {
        self.pos += 2; // past "</"
        let name = self.read_name();
        self.skip_past(b'>');
        if name.is_empty() {
            return;
        }
        // Pop to the nearest matching open element; ignore stray closes.
        if let Some(index) = stack
            .iter()
            .rposition(|node| node.tag() == Some(name.as_str()))
        {
            stack.truncate(index);
        }
    }

    fn consume_open_tag(&mut self, roots: &mut Vec<NodeRef>, stack: &mut Vec<NodeRef>) {
        self.pos += 1; // past '<'
        let name = self.read_name();
        let element = NodeRef::element(&name);

        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some(b'>') => {
                    self.pos += 1;
                    break;
                }
                Some(b'/') if self.peek_at(1) == Some(b'>') => {
                    self.pos += 2;
                    self_closing = true;
                    break;
                }
                Some(b'/') => {
                    self.pos += 1;
                }
                _ => {
                    let (attr_name, attr_value) = self.read_attribute();
                    if !attr_name.is_empty() && !element.has_attribute(&attr_name) {
                        element.set_attribute(&attr_name, &attr_value);
                    }
                }
            }
        }

        append(roots, stack, element.clone());

        let tag = element.tag().unwrap_or_default().to_string();
        if self_closing || VOID_ELEMENTS.contains(&tag.as_str()) {
            return;
        }
        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            let raw = self.consume_raw_text(&tag);
            if !raw.is_empty() {
                element.append_child(&NodeRef::text(&raw));
            }
            return;
        }
        stack.push(element);
    }

    /// Raw text up to `</tag`, consuming the close tag as well.
    fn consume_raw_text(&mut self, tag: &str) -> String {
        let close = format!("</{tag}");
        let rest = &self.input[self.pos..];
        let end = rest
            .to_ascii_lowercase()
            .find(&close)
            .unwrap_or(rest.len());
        let raw = rest[..end].to_string();
        self.pos += end;
        if self.pos < self.input.len() {
            self.pos += close.len();
            self.skip_past(b'>');
        }
        raw
    }

    fn consume_text(&mut self) -> NodeRef {
        let start = self.pos;
        // Always consume the first byte: a '<' that did not start a
        // recognized construct is literal text.
        self.pos += 1;
        while self.pos < self.input.len() && self.peek() != Some(b'<') {
            self.pos += 1;
        }
        NodeRef::text(&decode_entities(&self.input[start..self.pos]))
    }

    // =========================================================================
    // Attribute scanning
    // =========================================================================

    fn read_attribute(&mut self) -> (String, String) {
        let name = self.read_attr_name();
        self.skip_whitespace();
        if self.peek() != Some(b'=') {
            return (name, String::new());
        }
        self.pos += 1;
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.pos < self.input.len() && self.peek() != Some(quote) {
                    self.pos += 1;
                }
                let raw = &self.input[start..self.pos];
                if self.pos < self.input.len() {
                    self.pos += 1; // closing quote
                }
                decode_entities(raw)
            }
            _ => {
                let start = self.pos;
                while let Some(byte) = self.peek() {
                    if byte.is_ascii_whitespace() || byte == b'>' {
                        break;
                    }
                    self.pos += 1;
                }
                decode_entities(&self.input[start..self.pos])
            }
        };
        (name, value)
    }

    /// Tag names: ASCII alphanumerics and '-'.
    fn read_name(&mut self) -> String {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_alphanumeric() || byte == b'-' {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_ascii_lowercase()
    }

    /// Attribute names additionally allow the prop/event convention
    /// prefixes and namespace-ish punctuation.
    fn read_attr_name(&mut self) -> String {
        let start = self.pos;
        while let Some(byte) = self.peek() {
            if byte.is_ascii_whitespace() || matches!(byte, b'=' | b'>' | b'/' | b'"' | b'\'') {
                break;
            }
            self.pos += 1;
        }
        self.input[start..self.pos].to_ascii_lowercase()
    }

    // =========================================================================
    // Cursor helpers
    // =========================================================================

    fn at_open_tag(&self) -> bool {
        self.peek() == Some(b'<')
            && self
                .peek_at(1)
                .map(|byte| byte.is_ascii_alphabetic())
                .unwrap_or(false)
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.input[self.pos..].starts_with(prefix)
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input.as_bytes().get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while self
            .peek()
            .map(|byte| byte.is_ascii_whitespace())
            .unwrap_or(false)
        {
            self.pos += 1;
        }
    }

    fn skip_past(&mut self, byte: u8) {
        while self.pos < self.input.len() {
            let current = self.input.as_bytes()[self.pos];
            self.pos += 1;
            if current == byte {
                break;
            }
        }
    }
}

fn append(roots: &mut Vec<NodeRef>, stack: &[NodeRef], node: NodeRef) {
    match stack.last() {
        Some(parent) => parent.append_child(&node),
        None => roots.push(node),
    }
}

// =============================================================================
// Entities
// =============================================================================

/// Decode the named and numeric character references the serializer can
/// produce. Unknown references stay literal.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let end = match rest.find(';') {
            Some(end) if end <= 10 => end,
            _ => {
                out.push('&');
                rest = &rest[1..];
                continue;
            }
        };
        let entity = &rest[1..end];
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{a0}'),
            _ => decode_numeric_entity(entity),
        };
        match decoded {
            Some(ch) => {
                out.push(ch);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = if let Some(hex) = digits.strip_prefix(['x', 'X']) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        digits.parse().ok()?
    };
    char::from_u32(code)
}

// =============================================================================
// Tests
// =============================================================================
