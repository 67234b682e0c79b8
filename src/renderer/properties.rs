//! Attribute -> property mirroring table.
//!
//! A handful of attributes have a corresponding live DOM property whose
//! semantics differ from the string attribute form: setting the `value`
//! attribute of an input must also update what the input displays, and
//! boolean properties are driven by attribute presence, not value. The
//! mapping is an explicit table rather than runtime introspection, so
//! behavior is predictable and the set is easy to audit.

use crate::dom::{NodeRef, PropertyValue};

/// How an attribute maps onto a live DOM property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropertyKind {
    /// String-valued property mirroring the attribute text (`value`).
    Value,
    /// Boolean property driven by attribute presence (`checked`, ...).
    Flag,
}

/// Property mapping for `attribute`, if it has one.
pub fn property_kind(attribute: &str) -> Option<PropertyKind> {
    match attribute {
        "value" => Some(PropertyKind::Value),
        "checked" | "disabled" | "selected" | "readonly" | "multiple" => {
            Some(PropertyKind::Flag)
        }
        _ => None,
    }
}

/// Mirror an attribute write onto the element's property side channel.
pub fn apply_property(element: &NodeRef, attribute: &str, value: &str) {
    match property_kind(attribute) {
        Some(PropertyKind::Value) => {
            element.set_property(attribute, PropertyValue::Text(value.to_string()));
        }
        Some(PropertyKind::Flag) => {
            element.set_property(attribute, PropertyValue::Flag(true));
        }
        None => {}
    }
}

/// Mirror an attribute removal onto the property side channel.
pub fn clear_property(element: &NodeRef, attribute: &str) {
    match property_kind(attribute) {
        Some(PropertyKind::Value) => {
            element.set_property(attribute, PropertyValue::Text(String::new()));
        }
        Some(PropertyKind::Flag) => {
            element.set_property(attribute, PropertyValue::Flag(false));
        }
        None => {}
    }
}
