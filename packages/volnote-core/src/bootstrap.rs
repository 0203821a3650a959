//! Service bootstrap and dependency wiring.
//!
//! The composition root: the single place where the volume backend is
//! resolved, the sink is constructed and the service is wired together.
//! Backend capability detection happens exactly once here; the chosen
//! backend is fixed for the life of the process and never re-branched per
//! event.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::audio::{Subscription, VolumeSource, WpctlSource};
use crate::error::{VolnoteError, VolnoteResult};
use crate::events::VolumeEvent;
use crate::notify::DesktopSink;
use crate::render::StatusStyle;
use crate::service::VolumeStatusService;

#[cfg(feature = "alsa")]
use crate::audio::AlsaSource;

/// Application name presented to the notification service.
const APP_NAME: &str = "volnote";

/// Which mixer backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Detect once at startup: wpctl if present, otherwise ALSA when
    /// compiled in.
    #[default]
    Auto,
    /// PipeWire/WirePlumber via the `wpctl` CLI.
    Wpctl,
    /// Native ALSA mixer (requires the `alsa` cargo feature).
    Alsa,
}

/// Configuration for the volume status service.
///
/// All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cosmetic parameters for the rendered status.
    pub style: StatusStyle,
    /// Mixer backend selection.
    pub backend: BackendKind,
    /// Watcher poll interval in milliseconds.
    pub poll_interval_ms: u64,
    /// wpctl object to watch (the media/default sink).
    pub wpctl_target: String,
    /// ALSA device name (only used by the ALSA backend).
    pub alsa_device: String,
    /// ALSA simple control name (only used by the ALSA backend).
    pub alsa_control: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            style: StatusStyle::default(),
            backend: BackendKind::Auto,
            poll_interval_ms: 250,
            wpctl_target: "@DEFAULT_AUDIO_SINK@".to_string(),
            alsa_device: "default".to_string(),
            alsa_control: "Master".to_string(),
        }
    }
}

/// Container for the wired service, its event feed and the watcher guard.
pub struct BootstrappedService {
    /// The ready-to-run service loop.
    pub service: Arc<VolumeStatusService>,
    /// Volume-change events feeding [`VolumeStatusService::run`].
    pub events: mpsc::Receiver<VolumeEvent>,
    /// Guard keeping the watcher alive; dropping it unsubscribes.
    pub subscription: Subscription,
}

/// The backend actually chosen for this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResolvedBackend {
    Wpctl,
    #[cfg(feature = "alsa")]
    Alsa,
}

/// Wires the service together.
///
/// # Errors
///
/// Returns [`VolnoteError::Configuration`] when the requested backend is not
/// usable (wpctl missing, ALSA support not compiled in).
pub async fn bootstrap(config: &Config) -> VolnoteResult<BootstrappedService> {
    let backend = resolve_backend(config).await?;
    log::info!("volume backend: {backend:?}");

    let poll_interval = Duration::from_millis(config.poll_interval_ms.max(50));
    let (source, events, subscription): (
        Arc<dyn VolumeSource>,
        mpsc::Receiver<VolumeEvent>,
        Subscription,
    ) = match backend {
        ResolvedBackend::Wpctl => {
            let source = Arc::new(WpctlSource::new(config.wpctl_target.clone(), poll_interval));
            let (events, subscription) = source.watch();
            (source, events, subscription)
        }
        #[cfg(feature = "alsa")]
        ResolvedBackend::Alsa => {
            let source = Arc::new(AlsaSource::new(
                config.alsa_device.clone(),
                config.alsa_control.clone(),
                poll_interval,
            ));
            let (events, subscription) = source.watch();
            (source, events, subscription)
        }
    };

    let sink = Arc::new(DesktopSink::new(APP_NAME));
    let service = Arc::new(VolumeStatusService::new(
        source,
        sink,
        config.style.clone(),
    ));

    Ok(BootstrappedService {
        service,
        events,
        subscription,
    })
}

async fn resolve_backend(config: &Config) -> VolnoteResult<ResolvedBackend> {
    match config.backend {
        BackendKind::Wpctl => Ok(ResolvedBackend::Wpctl),

        #[cfg(feature = "alsa")]
        BackendKind::Alsa => Ok(ResolvedBackend::Alsa),

        #[cfg(not(feature = "alsa"))]
        BackendKind::Alsa => Err(VolnoteError::Configuration(
            "alsa backend requested but this build lacks the `alsa` feature".into(),
        )),

        BackendKind::Auto => {
            if WpctlSource::available().await {
                return Ok(ResolvedBackend::Wpctl);
            }
            #[cfg(feature = "alsa")]
            {
                log::info!("wpctl not found, falling back to the alsa backend");
                Ok(ResolvedBackend::Alsa)
            }
            #[cfg(not(feature = "alsa"))]
            Err(VolnoteError::Configuration(
                "no usable volume backend: wpctl not found and alsa support not compiled in"
                    .into(),
            ))
        }
    }
}
