//! Freedesktop notification sink.
//!
//! Posts a silent, resident, low-urgency notification carrying the rendered
//! icon as raw image data. The notification id returned by the server on the
//! first post is replayed on every later post, so the entry updates in place
//! and never stacks.

use async_trait::async_trait;
use notify_rust::{Hint, Image, Notification, Timeout, Urgency};
use parking_lot::Mutex;

use crate::error::NotifyError;
use crate::render::RenderedStatus;

use super::StatusSink;

/// Status sink backed by the desktop notification service.
pub struct DesktopSink {
    app_name: String,
    replace_id: Mutex<Option<u32>>,
}

impl DesktopSink {
    /// Creates a sink posting under the given application name.
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            replace_id: Mutex::new(None),
        }
    }
}

#[async_trait]
impl StatusSink for DesktopSink {
    async fn post(&self, status: &RenderedStatus) -> Result<(), NotifyError> {
        let image = Image::from_rgba(
            status.icon.width as i32,
            status.icon.height as i32,
            status.icon.rgba.clone(),
        )
        .map_err(|e| NotifyError::Delivery(format!("icon rejected: {e}")))?;

        let mut notification = Notification::new();
        notification
            .appname(&self.app_name)
            .summary(&status.title)
            .body(&status.body)
            .image_data(image)
            .urgency(Urgency::Low)
            .hint(Hint::Resident(true))
            .hint(Hint::SuppressSound(true))
            .timeout(Timeout::Never);

        if let Some(id) = *self.replace_id.lock() {
            notification.id(id);
        }

        let handle = notification.show_async().await.map_err(map_show_error)?;
        *self.replace_id.lock() = Some(handle.id());
        Ok(())
    }
}

/// Classifies a failed post. A bus-level refusal means the host will never
/// accept our notifications this session; everything else is transient.
fn map_show_error(err: notify_rust::error::Error) -> NotifyError {
    let text = err.to_string();
    if text.contains("AccessDenied") || text.contains("NotAuthorized") {
        NotifyError::PermissionDenied
    } else {
        NotifyError::Delivery(text)
    }
}
