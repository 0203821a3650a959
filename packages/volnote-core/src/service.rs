//! The volume status service loop.
//!
//! A single serial loop: each volume-change event for the media stream
//! triggers a fresh read, a full re-render and a re-post, with no caching or
//! diffing against the previous display. Events for other streams are
//! dropped before any work happens.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::audio::VolumeSource;
use crate::error::NotifyError;
use crate::events::{AudioStream, VolumeEvent};
use crate::notify::StatusSink;
use crate::render::{render_status, StatusStyle};

/// Drives the read-render-post cycle.
///
/// Built once at startup with its collaborators passed in explicitly; holds
/// no mutable state beyond the permission-suppression latch.
pub struct VolumeStatusService {
    source: Arc<dyn VolumeSource>,
    sink: Arc<dyn StatusSink>,
    style: StatusStyle,
    /// Set once the host denies notification permission; never cleared
    /// within a process lifetime.
    suppressed: AtomicBool,
}

impl VolumeStatusService {
    /// Creates the service with its collaborators.
    pub fn new(
        source: Arc<dyn VolumeSource>,
        sink: Arc<dyn StatusSink>,
        style: StatusStyle,
    ) -> Self {
        Self {
            source,
            sink,
            style,
            suppressed: AtomicBool::new(false),
        }
    }

    /// Runs the event loop until the event channel closes.
    ///
    /// Posts the initial display before consuming events, so the status
    /// entry appears as soon as the service starts.
    pub async fn run(&self, mut events: mpsc::Receiver<VolumeEvent>) {
        self.refresh().await;

        while let Some(event) = events.recv().await {
            if event.stream != AudioStream::Media {
                log::trace!("ignoring volume event for {:?}", event.stream);
                continue;
            }
            self.refresh().await;
        }

        log::debug!("volume event channel closed, service loop exiting");
    }

    /// One read-render-post cycle. Every failure degrades to "no visible
    /// update this cycle"; nothing here is retried.
    async fn refresh(&self) {
        if self.suppressed.load(Ordering::Relaxed) {
            return;
        }

        let reading = match self.source.read(AudioStream::Media).await {
            Ok(reading) => reading,
            Err(e) => {
                log::warn!("volume read failed, skipping update: {e}");
                return;
            }
        };

        let status = match render_status(&reading, &self.style) {
            Ok(status) => status,
            Err(e) => {
                log::warn!("render failed, skipping update: {e}");
                return;
            }
        };

        match self.sink.post(&status).await {
            Ok(()) => log::debug!("volume display updated to {}%", status.percentage),
            Err(NotifyError::PermissionDenied) => {
                log::warn!("notification permission denied; suppressing all further display updates");
                self.suppressed.store(true, Ordering::Relaxed);
            }
            Err(e) => log::warn!("notification update failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    use crate::error::AudioError;
    use crate::render::{RenderedStatus, VolumeReading};

    /// Mock source returning a fixed reading.
    struct FixedSource {
        reading: Mutex<Result<VolumeReading, ()>>,
        reads: AtomicUsize,
    }

    impl FixedSource {
        fn new(current: u32, maximum: u32) -> Self {
            Self {
                reading: Mutex::new(Ok(VolumeReading { current, maximum })),
                reads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl VolumeSource for FixedSource {
        async fn read(&self, _stream: AudioStream) -> Result<VolumeReading, AudioError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let reading = *self.reading.lock();
            reading.map_err(|_| AudioError::Backend("simulated failure".into()))
        }
    }

    /// Mock sink recording every post.
    struct RecordingSink {
        posts: AtomicUsize,
        last: Mutex<Option<RenderedStatus>>,
        deny: bool,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                posts: AtomicUsize::new(0),
                last: Mutex::new(None),
                deny: false,
            }
        }

        fn denying() -> Self {
            Self {
                deny: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl StatusSink for RecordingSink {
        async fn post(&self, status: &RenderedStatus) -> Result<(), NotifyError> {
            if self.deny {
                return Err(NotifyError::PermissionDenied);
            }
            self.posts.fetch_add(1, Ordering::SeqCst);
            *self.last.lock() = Some(status.clone());
            Ok(())
        }
    }

    fn service(
        source: Arc<FixedSource>,
        sink: Arc<RecordingSink>,
    ) -> VolumeStatusService {
        VolumeStatusService::new(source, sink, StatusStyle::default())
    }

    #[tokio::test]
    async fn startup_posts_the_initial_display() {
        let source = Arc::new(FixedSource::new(7, 15));
        let sink = Arc::new(RecordingSink::new());
        let svc = service(Arc::clone(&source), Arc::clone(&sink));

        let (tx, rx) = mpsc::channel(4);
        drop(tx);
        svc.run(rx).await;

        assert_eq!(sink.posts.load(Ordering::SeqCst), 1);
        let status = sink.last.lock().clone().unwrap();
        assert_eq!(status.percentage, 46);
        assert_eq!(status.body, "Current volume: 46%");
        assert_eq!(status.title, "Media Volume");
    }

    #[tokio::test]
    async fn media_events_trigger_a_full_recompute() {
        let source = Arc::new(FixedSource::new(15, 15));
        let sink = Arc::new(RecordingSink::new());
        let svc = service(Arc::clone(&source), Arc::clone(&sink));

        let (tx, rx) = mpsc::channel(4);
        // Two identical events still cause two redisplays: no diffing.
        tx.send(VolumeEvent::now(AudioStream::Media)).await.unwrap();
        tx.send(VolumeEvent::now(AudioStream::Media)).await.unwrap();
        drop(tx);
        svc.run(rx).await;

        assert_eq!(sink.posts.load(Ordering::SeqCst), 3);
        let status = sink.last.lock().clone().unwrap();
        assert_eq!(status.body, "Current volume: 100%");
    }

    #[tokio::test]
    async fn non_media_events_are_filtered_before_any_work() {
        let source = Arc::new(FixedSource::new(7, 15));
        let sink = Arc::new(RecordingSink::new());
        let svc = service(Arc::clone(&source), Arc::clone(&sink));

        let (tx, rx) = mpsc::channel(4);
        tx.send(VolumeEvent::now(AudioStream::Alarm)).await.unwrap();
        tx.send(VolumeEvent::now(AudioStream::Notification))
            .await
            .unwrap();
        drop(tx);
        svc.run(rx).await;

        // Only the startup refresh reads and posts.
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
        assert_eq!(sink.posts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_maximum_skips_the_post_without_crashing() {
        let source = Arc::new(FixedSource::new(5, 0));
        let sink = Arc::new(RecordingSink::new());
        let svc = service(Arc::clone(&source), Arc::clone(&sink));

        let (tx, rx) = mpsc::channel(4);
        tx.send(VolumeEvent::now(AudioStream::Media)).await.unwrap();
        drop(tx);
        svc.run(rx).await;

        assert_eq!(sink.posts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn read_failures_skip_the_cycle() {
        let source = Arc::new(FixedSource::new(7, 15));
        *source.reading.lock() = Err(());
        let sink = Arc::new(RecordingSink::new());
        let svc = service(Arc::clone(&source), Arc::clone(&sink));

        let (tx, rx) = mpsc::channel(4);
        tx.send(VolumeEvent::now(AudioStream::Media)).await.unwrap();
        drop(tx);
        svc.run(rx).await;

        assert_eq!(sink.posts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn permission_denial_suppresses_every_later_attempt() {
        let source = Arc::new(FixedSource::new(7, 15));
        let sink = Arc::new(RecordingSink::denying());
        let svc = service(Arc::clone(&source), Arc::clone(&sink));

        let (tx, rx) = mpsc::channel(4);
        tx.send(VolumeEvent::now(AudioStream::Media)).await.unwrap();
        tx.send(VolumeEvent::now(AudioStream::Media)).await.unwrap();
        drop(tx);
        svc.run(rx).await;

        // The startup post was denied; later events never reach the source
        // or the sink again.
        assert_eq!(source.reads.load(Ordering::SeqCst), 1);
        assert_eq!(sink.posts.load(Ordering::SeqCst), 0);
    }
}
