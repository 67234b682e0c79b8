//! In-process document tree - the DOM the renderer operates on.
//!
//! The runtime does not target a browser; it owns a lightweight document
//! tree with the handful of semantics the diff engine relies on:
//!
//! - stable node identity ([`NodeRef`] handles compare by pointer),
//! - explicit, deterministic child ordering,
//! - insertion-ordered attributes plus a separate property side channel
//!   (`value`, `checked`, ... behave like live DOM properties, not
//!   attribute strings),
//! - per-node event listeners with explicit cleanup handles,
//! - canonical ASCII-lowercase element and attribute names.
//!
//! [`parser`] turns HTML fragments into detached subtrees; [`serialize`]
//! renders subtrees back to HTML for inspection and tests.

pub mod node;
pub mod parser;
pub mod serialize;

pub use node::{Event, ListenerHandle, NodeFlags, NodeRef, PropertyValue};
pub use parser::{parse_fragment, parse_into};
pub use serialize::{inner_html, outer_html};
