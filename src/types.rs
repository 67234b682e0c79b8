//! Core types for cinder-ui.
//!
//! These types define the foundation that everything builds on.
//! They flow between the renderer and the mount orchestrator and pin down
//! the attribute conventions both sides agree on.

use futures::future::LocalBoxFuture;

// =============================================================================
// Attribute Conventions
// =============================================================================

/// Attribute prefix that declares a prop on a child component element.
///
/// `:label="Save"` becomes the child's `label` prop. Prop attributes are
/// extracted and stripped from the DOM when the child mounts - they never
/// appear in the final tree.
pub const PROP_PREFIX: &str = ":";

/// Attribute prefix that declares an event binding.
///
/// `@click="increment"` wires the element's `click` event to the scope
/// method named `increment`. Event attributes are resolved by the mount
/// orchestrator and stripped from the DOM; the renderer never touches them.
pub const EVENT_PREFIX: &str = "@";

/// Attribute carrying a mounted instance's scoped-style marker.
///
/// `<style>` elements tagged with this attribute are owned by the style
/// injection routine and are invisible to the diff engine - they survive
/// every re-render until their instance unmounts.
pub const STYLE_SCOPE_ATTR: &str = "data-style-scope";

/// Attribute used to match element nodes across renders regardless of
/// position. Two elements are "the same node" only if their keys agree.
pub const KEY_ATTR: &str = "key";

// =============================================================================
// MaybeAsync - uniform sync/async results
// =============================================================================

/// A value that is either immediately available or still resolving.
///
/// Setup functions, template functions, and lifecycle hooks may all be
/// synchronous or asynchronous. Wrapping synchronous results in
/// [`MaybeAsync::Ready`] keeps the mount path async-uniform: callers
/// `resolve().await` without caring which kind they got.
pub enum MaybeAsync<T> {
    /// The value is already available.
    Ready(T),
    /// The value is still being produced.
    Deferred(LocalBoxFuture<'static, T>),
}

impl<T> MaybeAsync<T> {
    /// Wrap an immediately available value.
    pub fn ready(value: T) -> Self {
        MaybeAsync::Ready(value)
    }

    /// Wrap a future producing the value.
    pub fn deferred(future: LocalBoxFuture<'static, T>) -> Self {
        MaybeAsync::Deferred(future)
    }

    /// Resolve to the value, awaiting if necessary.
    pub async fn resolve(self) -> T {
        match self {
            MaybeAsync::Ready(value) => value,
            MaybeAsync::Deferred(future) => future.await,
        }
    }

    /// True if the value is already available.
    pub fn is_ready(&self) -> bool {
        matches!(self, MaybeAsync::Ready(_))
    }
}

impl<T> From<T> for MaybeAsync<T> {
    fn from(value: T) -> Self {
        MaybeAsync::Ready(value)
    }
}
