//! # cinder-ui
//!
//! Reactive HTML UI Runtime for Rust.
//!
//! Components render HTML strings from signal-backed state, and a keyed
//! diff engine reconciles the output against a live document tree in
//! place - no virtual-DOM intermediate representation.
//!
//! ## Architecture
//!
//! The pipeline is signal-driven end to end:
//! ```text
//! Signal write → batched flush → template re-run → parse → diff/patch → updated hook
//! ```
//!
//! - writes to a [`Signal`] coalesce per turn; watchers observe only the
//!   final value at the [`signals::flush`] checkpoint,
//! - re-renders are patch-only: node identity, scoped `<style>` elements
//!   and mounted child subtrees all survive,
//! - mounting is async-uniform: synchronous and asynchronous setup and
//!   template functions take the same path through [`Cinder::mount`].
//!
//! ## Modules
//!
//! - [`signals`] - Signal cells, watchers, microtask scheduler
//! - [`dom`] - In-process document tree, HTML parser, serializer
//! - [`renderer`] - Keyed in-place diff/patch engine
//! - [`runtime`] - Component definitions, scopes, mount orchestration
//! - [`emitter`] - Per-instance publish/subscribe bus
//!
//! ## Example
//!
//! ```ignore
//! use cinder_ui::{signals, Cinder, Component, NodeRef, Props, Signal};
//!
//! let app = Cinder::new();
//! app.component(
//!     "counter",
//!     Component::new(|scope| {
//!         let count: Signal<i32> = scope.get("count").unwrap();
//!         format!("<button @click=\"increment\">{}</button>", count.get())
//!     })
//!     .setup(|scope| {
//!         let count = scope.signal(0);
//!         scope.set("count", count.clone());
//!         scope.method("increment", move |_| count.update(|n| n + 1));
//!         Ok(())
//!     }),
//! );
//!
//! let body = NodeRef::element("body");
//! let handle = futures::executor::block_on(app.mount(&body, "counter", Props::new()))?;
//!
//! body.query_selector("button").unwrap().dispatch("click", None);
//! signals::flush();
//! assert_eq!(body.inner_html(), "<button>1</button>");
//! # Ok::<(), cinder_ui::Error>(())
//! ```

pub mod dom;
pub mod emitter;
pub mod error;
pub mod renderer;
pub mod runtime;
pub mod signals;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use error::{Error, Result};

pub use signals::{signal, Signal, Unsubscribe, Watchable};

pub use dom::{Event, ListenerHandle, NodeFlags, NodeRef, PropertyValue};

pub use renderer::{PatchHook, PropertyKind, Renderer};

pub use runtime::{
    ChildSpec, Cinder, Component, ComponentRef, HookContext, HookKind, MountHandle, Plugin,
    PropValue, Props, Scope,
};

pub use emitter::{Emitter, EmitterHandle};
