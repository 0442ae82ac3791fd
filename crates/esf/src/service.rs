//! 🏨 The hosting-framework contract: two lifecycle hooks, nothing more.
//!
//! A host (a service container, a CLI, a test) calls `initialise` once before use and
//! `destroy` when it wants the service to let go of its resources. What "resources" means
//! is up to the service. For `SearchFacade` it means the cached engine client.

use anyhow::Result;

/// 🏨 Lifecycle hooks invoked by whatever is hosting the service.
pub trait Service {
    /// 🌅 Called before first use. May do nothing. Many do.
    fn initialise(&mut self) -> Result<()>;

    /// 🌇 Release held resources. The service must still work afterwards,
    /// rebuilding whatever it dropped on the next call.
    fn destroy(&mut self);
}
