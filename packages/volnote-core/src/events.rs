//! Volume-change events delivered by the mixer watchers.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Logical audio streams the host mixer distinguishes.
///
/// Only [`AudioStream::Media`] drives the status display; events for other
/// streams are filtered out by the service loop before any re-render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AudioStream {
    /// Music/media playback volume.
    Media,
    /// Notification sounds.
    Notification,
    /// Alarm volume.
    Alarm,
}

/// A single volume-change event.
///
/// Carries only the changed stream's identity; the current level is always
/// re-queried from the source, so a stale event can never display a stale
/// reading.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VolumeEvent {
    /// The stream whose level changed.
    pub stream: AudioStream,
    /// Unix timestamp in milliseconds.
    pub timestamp: u64,
}

impl VolumeEvent {
    /// Creates an event for the given stream, stamped with the current time.
    pub fn now(stream: AudioStream) -> Self {
        Self {
            stream,
            timestamp: now_millis(),
        }
    }
}

/// Returns the current Unix timestamp in milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_carries_stream_identity() {
        let event = VolumeEvent::now(AudioStream::Alarm);
        assert_eq!(event.stream, AudioStream::Alarm);
        assert!(event.timestamp > 0);
    }
}
