//! Volume source abstraction and mixer backends.
//!
//! A [`VolumeSource`] answers on-demand queries for a stream's level and
//! maximum. Change events arrive on an `mpsc` channel handed out by the
//! backend's `watch` method together with a [`Subscription`] guard; dropping
//! the guard tears the watcher down on every exit path.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::AudioError;
use crate::render::VolumeReading;

pub use crate::events::{AudioStream, VolumeEvent};

mod wpctl;
pub use wpctl::WpctlSource;

#[cfg(feature = "alsa")]
mod alsa;
#[cfg(feature = "alsa")]
pub use alsa::AlsaSource;

/// Capacity of the volume-change event channel.
///
/// Events carry no payload worth preserving under pressure; if the consumer
/// falls behind, the next poll cycle produces a fresh one anyway.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Query interface for a logical audio stream's volume.
#[async_trait]
pub trait VolumeSource: Send + Sync {
    /// Reads the current level and maximum for the given stream.
    async fn read(&self, stream: AudioStream) -> Result<VolumeReading, AudioError>;
}

/// Guard for an active volume-change subscription.
///
/// Dropping the guard cancels the watcher task. Cancellation is best-effort
/// and silent: a watcher that has already stopped is not an error, matching
/// the unregister-and-ignore cleanup the display's lifecycle calls for.
pub struct Subscription {
    token: CancellationToken,
}

impl Subscription {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Cancels the watcher explicitly, ahead of drop.
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_the_guard_cancels_the_token() {
        let token = CancellationToken::new();
        let watcher_side = token.clone();
        let subscription = Subscription::new(token);
        assert!(!watcher_side.is_cancelled());
        drop(subscription);
        assert!(watcher_side.is_cancelled());
    }

    #[test]
    fn explicit_cancel_is_idempotent_with_drop() {
        let token = CancellationToken::new();
        let watcher_side = token.clone();
        let subscription = Subscription::new(token);
        subscription.cancel();
        assert!(watcher_side.is_cancelled());
        drop(subscription);
        assert!(watcher_side.is_cancelled());
    }
}
