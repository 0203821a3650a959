//! Volnote Core - library behind the volnote volume status daemon.
//!
//! This crate renders the current media-stream volume as a small square icon
//! and keeps a persistent desktop notification showing it, refreshing the
//! display whenever the system volume changes.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`render`]: The volume-to-icon renderer (the one piece of real logic)
//! - [`audio`]: Volume source abstraction and mixer backends
//! - [`notify`]: Status display sink abstraction and the desktop implementation
//! - [`service`]: The serial event loop tying source, renderer and sink together
//! - [`bootstrap`]: Composition root that wires everything once at startup
//! - [`error`]: Centralized error types
//!
//! # Abstraction Traits
//!
//! Two traits decouple the service loop from the host environment:
//!
//! - [`VolumeSource`](audio::VolumeSource): Reading a stream's level and maximum
//! - [`StatusSink`](notify::StatusSink): Posting the persistent status entry
//!
//! Both have production implementations in this crate and are mocked in tests.

#![warn(clippy::all)]

pub mod audio;
pub mod bootstrap;
pub mod error;
pub mod events;
pub mod notify;
pub mod render;
pub mod service;

// Re-export commonly used types at the crate root
pub use audio::{Subscription, VolumeSource, WpctlSource};
pub use bootstrap::{bootstrap, BackendKind, BootstrappedService, Config};
pub use error::{
    AudioError, ErrorCode, NotifyError, RenderError, VolnoteError, VolnoteResult,
};
pub use events::{now_millis, AudioStream, VolumeEvent};
pub use notify::{DesktopSink, StatusSink};
pub use render::{render_status, IconBitmap, RenderedStatus, Rgb, StatusStyle, VolumeReading};
pub use service::VolumeStatusService;

#[cfg(feature = "alsa")]
pub use audio::AlsaSource;
