//! PipeWire/WirePlumber volume backend driven by the `wpctl` CLI.
//!
//! WirePlumber has no stable library protocol this crate could speak
//! directly, but `wpctl get-volume` is a supported interface and is cheap to
//! poll. The watcher polls the default sink and emits an event only when the
//! raw reading moves, which mirrors how a host volume broadcast behaves.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::error::AudioError;
use crate::events::{AudioStream, VolumeEvent};
use crate::render::VolumeReading;

use super::{Subscription, VolumeSource, EVENT_CHANNEL_CAPACITY};

/// WirePlumber reports volume on a unit scale; expose it as 0-100 steps so
/// the percentage math lines up with the other backends.
const WPCTL_SCALE: u32 = 100;

/// Volume source backed by the `wpctl` command-line tool.
pub struct WpctlSource {
    target: String,
    poll_interval: Duration,
}

impl WpctlSource {
    /// Creates a source polling the given wpctl object id
    /// (`@DEFAULT_AUDIO_SINK@` for the media stream).
    pub fn new(target: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            target: target.into(),
            poll_interval,
        }
    }

    /// Probes whether `wpctl` is present and answering. Used by backend
    /// capability detection at bootstrap.
    pub async fn available() -> bool {
        Command::new("wpctl")
            .arg("--version")
            .output()
            .await
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    async fn query(&self) -> Result<VolumeReading, AudioError> {
        let output = Command::new("wpctl")
            .args(["get-volume", &self.target])
            .output()
            .await
            .map_err(|e| AudioError::Unavailable(format!("wpctl: {e}")))?;

        if !output.status.success() {
            return Err(AudioError::Backend(format!(
                "wpctl get-volume {}: {}",
                self.target,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_get_volume(&String::from_utf8_lossy(&output.stdout))
    }

    /// Starts the change watcher. Events flow until the returned
    /// [`Subscription`] is dropped or the receiver is closed.
    pub fn watch(self: &Arc<Self>) -> (mpsc::Receiver<VolumeEvent>, Subscription) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let token = CancellationToken::new();
        let source = Arc::clone(self);
        let cancelled = token.clone();

        tokio::spawn(async move {
            let mut last: Option<VolumeReading> = None;
            let mut ticker = tokio::time::interval(source.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                match source.query().await {
                    Ok(reading) => {
                        if last != Some(reading) {
                            let had_baseline = last.replace(reading).is_some();
                            // The first reading establishes the baseline; the
                            // startup display already covers it.
                            if had_baseline
                                && tx.send(VolumeEvent::now(AudioStream::Media)).await.is_err()
                            {
                                break;
                            }
                        }
                    }
                    Err(e) => log::debug!("volume poll failed: {e}"),
                }
            }
            log::debug!("wpctl watcher stopped");
        });

        (rx, Subscription::new(token))
    }
}

#[async_trait]
impl VolumeSource for WpctlSource {
    async fn read(&self, _stream: AudioStream) -> Result<VolumeReading, AudioError> {
        // wpctl only addresses the default sink, which carries media audio.
        self.query().await
    }
}

/// Parses `wpctl get-volume` output, e.g. `Volume: 0.45` or
/// `Volume: 0.45 [MUTED]`.
fn parse_get_volume(text: &str) -> Result<VolumeReading, AudioError> {
    let rest = text
        .trim()
        .strip_prefix("Volume:")
        .ok_or_else(|| AudioError::Parse(text.trim().to_string()))?;
    let value = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| AudioError::Parse(text.trim().to_string()))?;
    let volume: f32 = value
        .parse()
        .map_err(|_| AudioError::Parse(text.trim().to_string()))?;

    // PipeWire allows boosting past 1.0; clamp so the invariant
    // current <= maximum holds at this boundary.
    let current = (volume * WPCTL_SCALE as f32)
        .round()
        .clamp(0.0, WPCTL_SCALE as f32) as u32;
    Ok(VolumeReading {
        current,
        maximum: WPCTL_SCALE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_volume() {
        let reading = parse_get_volume("Volume: 0.45\n").unwrap();
        assert_eq!(reading.current, 45);
        assert_eq!(reading.maximum, 100);
    }

    #[test]
    fn parses_muted_suffix() {
        let reading = parse_get_volume("Volume: 0.45 [MUTED]\n").unwrap();
        assert_eq!(reading.current, 45);
    }

    #[test]
    fn clamps_boosted_volume() {
        let reading = parse_get_volume("Volume: 1.50\n").unwrap();
        assert_eq!(reading.current, 100);
    }

    #[test]
    fn zero_volume_reads_as_zero() {
        let reading = parse_get_volume("Volume: 0.00\n").unwrap();
        assert_eq!(reading.current, 0);
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(
            parse_get_volume("no sink\n"),
            Err(AudioError::Parse(_))
        ));
        assert!(matches!(
            parse_get_volume("Volume: high\n"),
            Err(AudioError::Parse(_))
        ));
        assert!(matches!(parse_get_volume(""), Err(AudioError::Parse(_))));
    }
}
