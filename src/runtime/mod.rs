//! Runtime - component definitions, scopes, and mount orchestration.
//!
//! A [`Component`] is a stateless definition: a template function plus
//! optional setup, style, and declared children. [`Cinder`] is the core
//! object owning the registries and the renderer; [`Cinder::mount`]
//! binds a definition to a container element and returns a
//! [`MountHandle`] for the live instance.
//!
//! Re-renders are patch-only: a signal exposed on the instance's
//! [`Scope`] changes, the template runs again, and the renderer
//! reconciles the output in place. Setup, templates, and lifecycle
//! hooks may all be synchronous or asynchronous.

pub mod component;
pub mod core;
pub mod instance;
pub mod plugin;

pub use component::{
    ChildSpec, Component, ComponentRef, HookContext, HookFn, HookKind, MethodFn, PropValue,
    Props, Scope, SetupFn, StyleFn, TemplateFn,
};
pub use self::core::Cinder;
pub use instance::MountHandle;
pub use plugin::Plugin;
