//! Error taxonomy for the runtime.
//!
//! Structural errors (bad container, unknown component) are detected before
//! any DOM mutation happens, so a failed call never leaves a half-patched
//! tree behind. Failures inside user code follow two policies:
//!
//! - setup and template failures propagate to the mount caller unchanged,
//! - signal watcher panics are isolated per callback and reported through
//!   `tracing` - one failing reactive consumer cannot break the others.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the renderer and the mount orchestrator.
#[derive(Debug, Error)]
pub enum Error {
    /// The renderer was called with an unusable argument, e.g. a patch
    /// target that is not an element node.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An unexpected DOM failure occurred mid-patch, wrapped with context
    /// so callers can detect a failed render and retry or fall back.
    #[error("patch failed: {0}")]
    PatchFailure(String),

    /// The mount target does not resolve to an element node.
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    /// No component definition is registered under the requested name.
    #[error("component not registered: {name:?}")]
    ComponentNotRegistered {
        /// The name that failed to resolve.
        name: String,
    },

    /// A prop was missing or carried a different type than the one the
    /// consumer asked for.
    #[error("invalid prop {name:?}: {detail}")]
    InvalidProp {
        /// The prop name the consumer asked for.
        name: String,
        /// What went wrong.
        detail: String,
    },

    /// A setup function failed. Propagated to the mount caller, never
    /// swallowed.
    #[error("setup failed: {0}")]
    SetupFailed(String),

    /// A template function failed. Propagated to the mount caller, never
    /// swallowed.
    #[error("template failed: {0}")]
    TemplateFailed(String),
}
