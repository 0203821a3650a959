//! Status display sink abstraction.
//!
//! The sink accepts a [`RenderedStatus`] and keeps exactly one persistent
//! entry visible in the host's status area, replacing it in place on every
//! post. The production implementation talks to the freedesktop notification
//! service; tests substitute counting mocks.

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::render::RenderedStatus;

mod desktop;
pub use desktop::DesktopSink;

/// Sink for the persistent volume status display.
#[async_trait]
pub trait StatusSink: Send + Sync {
    /// Posts or updates the status entry.
    ///
    /// Implementations must key the entry by a fixed identity so repeated
    /// posts update the existing display rather than accumulating
    /// duplicates.
    ///
    /// # Errors
    ///
    /// [`NotifyError::PermissionDenied`] when the host refuses to display
    /// notifications at all; [`NotifyError::Delivery`] for transient
    /// failures of a single post.
    async fn post(&self, status: &RenderedStatus) -> Result<(), NotifyError>;
}
