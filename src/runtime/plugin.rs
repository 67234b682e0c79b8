//! Plugin surface.
//!
//! A plugin extends a core instance at install time: it may register
//! components, swap the renderer's patch hook, or stash capabilities for
//! setup scopes. Installation happens once per plugin name; repeat
//! installs are no-ops.

use crate::error::Result;

use super::core::Cinder;

/// A core extension installed with `Cinder::use_plugin`.
pub trait Plugin {
    /// Unique plugin name. The registry is keyed by it.
    fn name(&self) -> &str;

    /// Extend the core. Called at most once per name per core.
    fn install(&self, app: &Cinder) -> Result<()>;
}
