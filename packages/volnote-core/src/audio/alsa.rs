//! ALSA mixer volume backend.
//!
//! Reads the raw playback range of a simple mixer element (`Master` by
//! default), so the reading reflects the card's native step scale rather
//! than a percentage. Mixer handles are not `Send`, so every query opens a
//! short-lived handle inside `spawn_blocking`.

use std::sync::Arc;
use std::time::Duration;

use alsa::mixer::{Mixer, SelemChannelId, SelemId};
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::AudioError;
use crate::events::{AudioStream, VolumeEvent};
use crate::render::VolumeReading;

use super::{Subscription, VolumeSource, EVENT_CHANNEL_CAPACITY};

/// Volume source backed by an ALSA simple mixer element.
pub struct AlsaSource {
    device: String,
    control: String,
    poll_interval: Duration,
}

impl AlsaSource {
    /// Creates a source for the given device (`default`) and simple control
    /// (`Master`).
    pub fn new(
        device: impl Into<String>,
        control: impl Into<String>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            device: device.into(),
            control: control.into(),
            poll_interval,
        }
    }

    /// Starts the change watcher. Events flow until the returned
    /// [`Subscription`] is dropped or the receiver is closed.
    pub fn watch(self: &Arc<Self>) -> (mpsc::Receiver<VolumeEvent>, Subscription) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let token = CancellationToken::new();
        let source = Arc::clone(self);
        let cancelled = token.clone();

        tokio::task::spawn_blocking(move || {
            let mut last: Option<VolumeReading> = None;
            while !cancelled.is_cancelled() {
                match read_raw(&source.device, &source.control) {
                    Ok(reading) => {
                        if last != Some(reading) {
                            let had_baseline = last.replace(reading).is_some();
                            if had_baseline
                                && tx
                                    .blocking_send(VolumeEvent::now(AudioStream::Media))
                                    .is_err()
                            {
                                break;
                            }
                        }
                    }
                    Err(e) => log::debug!("alsa poll failed: {e}"),
                }
                std::thread::sleep(source.poll_interval);
            }
            log::debug!("alsa watcher stopped");
        });

        (rx, Subscription::new(token))
    }
}

#[async_trait]
impl VolumeSource for AlsaSource {
    async fn read(&self, _stream: AudioStream) -> Result<VolumeReading, AudioError> {
        let device = self.device.clone();
        let control = self.control.clone();
        tokio::task::spawn_blocking(move || read_raw(&device, &control))
            .await
            .map_err(|e| AudioError::Backend(format!("mixer task failed: {e}")))?
    }
}

fn read_raw(device: &str, control: &str) -> Result<VolumeReading, AudioError> {
    let mixer =
        Mixer::new(device, false).map_err(|e| AudioError::Unavailable(e.to_string()))?;
    let selem = mixer
        .find_selem(&SelemId::new(control, 0))
        .ok_or_else(|| AudioError::Backend(format!("mixer control not found: {control}")))?;

    let (min, max) = selem.get_playback_volume_range();
    if max <= min {
        return Err(AudioError::Backend(format!(
            "degenerate volume range {min}..{max} on {control}"
        )));
    }
    let raw = selem
        .get_playback_volume(SelemChannelId::FrontLeft)
        .map_err(|e| AudioError::Backend(e.to_string()))?;

    Ok(VolumeReading {
        current: (raw - min).max(0) as u32,
        maximum: (max - min) as u32,
    })
}
