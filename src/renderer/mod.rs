//! Renderer - DOM diff/patch engine.
//!
//! The renderer compares a container's live children against a freshly
//! parsed subtree and applies the minimal set of in-place mutations.
//! There is no virtual-DOM intermediate: both sides of the comparison
//! are real node trees, and unchanged text and attributes short-circuit
//! so an identical render touches nothing.
//!
//! # Algorithm
//!
//! 1. Parse the new HTML into a reusable scratch element.
//! 2. Walk the children lists by index, relocating keyed matches,
//!    patching same-kind nodes in place, replacing mismatches.
//! 3. Recurse into matched elements: sync attributes, then children.
//! 4. Remove old-side surplus - except protected scoped-style nodes.
//!
//! Nodes flagged as mounted-component roots are matched positionally but
//! never descended into; their subtrees belong to the child instance.

pub mod patch;
pub mod properties;

pub use patch::{PatchHook, Renderer};
pub use properties::{property_kind, PropertyKind};
