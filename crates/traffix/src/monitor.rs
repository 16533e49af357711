//! Periodic live-feed analysis.
//!
//! [`FeedMonitor`] pulls a frame from a [`FrameSource`] on every tick, sends it
//! to a [`FrameAnalyzer`] and feeds the result into the registry and the
//! [`LiveTracker`]. The analyzer stands in for the external recognition
//! service: frame in, structured analysis out. Failed frames are logged and
//! skipped; nothing is retried.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::error::Result;
use crate::ingest::{process_frame, FrameAnalysis, FrameOptions};
use crate::registry::VehicleRegistry;
use crate::tracker::LiveTracker;

/// Shortest tick interval a monitor will use.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// A captured still from the camera feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Position of the frame in its feed, starting at 0.
    pub sequence: u64,
    /// When the frame was captured.
    pub captured_at: DateTime<Utc>,
    /// MIME type of `data`.
    pub mime_type: String,
    /// Encoded image bytes.
    pub data: Vec<u8>,
}

impl Frame {
    /// Create a JPEG frame captured now.
    #[must_use]
    pub fn jpeg(sequence: u64, data: Vec<u8>) -> Self {
        Self {
            sequence,
            captured_at: Utc::now(),
            mime_type: "image/jpeg".to_string(),
            data,
        }
    }
}

/// Something that produces frames, such as a camera.
pub trait FrameSource: Send {
    /// Next frame, or `None` when the feed has ended.
    fn next_frame(&mut self) -> Option<Frame>;
}

/// The external service that reads plates from a frame.
#[async_trait::async_trait]
pub trait FrameAnalyzer: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Analyze one frame.
    ///
    /// `Ok(None)` means the service returned nothing usable for this frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the service call fails.
    async fn analyze(&self, frame: &Frame) -> Result<Option<FrameAnalysis>>;
}

/// A fixed number of empty frames, for replaying recorded analyses.
#[derive(Debug, Clone)]
pub struct SyntheticFrames {
    next: u64,
    total: u64,
}

impl SyntheticFrames {
    /// Yield `total` empty frames.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self { next: 0, total }
    }
}

impl FrameSource for SyntheticFrames {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.next >= self.total {
            return None;
        }
        let frame = Frame::jpeg(self.next, Vec::new());
        self.next += 1;
        Some(frame)
    }
}

/// Plays back previously recorded analyses in order, ignoring frame content.
#[derive(Debug, Default)]
pub struct ReplayAnalyzer {
    analyses: Mutex<VecDeque<FrameAnalysis>>,
}

impl ReplayAnalyzer {
    /// Create an analyzer that returns `analyses` one per frame.
    #[must_use]
    pub fn new(analyses: Vec<FrameAnalysis>) -> Self {
        Self {
            analyses: Mutex::new(analyses.into()),
        }
    }

    /// Number of analyses not yet returned.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.analyses.lock().len()
    }
}

#[async_trait::async_trait]
impl FrameAnalyzer for ReplayAnalyzer {
    fn name(&self) -> &'static str {
        "replay"
    }

    async fn analyze(&self, _frame: &Frame) -> Result<Option<FrameAnalysis>> {
        Ok(self.analyses.lock().pop_front())
    }
}

/// A cloneable handle used to stop a running [`FeedMonitor`].
#[derive(Debug, Clone, Default)]
pub struct MonitorHandle {
    stop_signal: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl MonitorHandle {
    /// Create a new monitor handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal the monitor to stop.
    pub fn stop(&self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    /// Check if the stop signal has been sent.
    #[must_use]
    pub fn should_stop(&self) -> bool {
        self.stop_signal.load(Ordering::SeqCst)
    }

    async fn stopped(&self) {
        if self.should_stop() {
            return;
        }
        self.wake.notified().await;
    }
}

/// Result of a monitor run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct FeedSummary {
    /// Frames whose analysis was applied.
    pub analyzed: u64,
    /// Frames for which the analyzer returned nothing.
    pub empty: u64,
    /// Frames for which the analyzer failed.
    pub failed: u64,
}

/// Drives the live feed against a shared registry.
#[derive(Debug)]
pub struct FeedMonitor {
    registry: Arc<VehicleRegistry>,
    tracker: Arc<Mutex<LiveTracker>>,
    options: FrameOptions,
    interval: Duration,
    handle: MonitorHandle,
}

impl FeedMonitor {
    /// Create a monitor using the feed settings from configuration.
    #[must_use]
    pub fn new(registry: Arc<VehicleRegistry>, config: &FeedConfig) -> Self {
        Self {
            registry,
            tracker: Arc::new(Mutex::new(LiveTracker::new(config.recent_capacity))),
            options: FrameOptions::from(config),
            interval: config.frame_interval().max(MIN_INTERVAL),
            handle: MonitorHandle::new(),
        }
    }

    /// Override the tick interval. Values below one millisecond are raised
    /// to one millisecond.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    /// Time between ticks.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Handle for stopping this monitor from another task.
    #[must_use]
    pub fn handle(&self) -> MonitorHandle {
        self.handle.clone()
    }

    /// Shared tracking panel state.
    #[must_use]
    pub fn tracker(&self) -> Arc<Mutex<LiveTracker>> {
        Arc::clone(&self.tracker)
    }

    /// Run until the source is exhausted or the handle is stopped.
    pub async fn run<S, A>(&self, mut source: S, analyzer: &A) -> FeedSummary
    where
        S: FrameSource,
        A: FrameAnalyzer + ?Sized,
    {
        let mut summary = FeedSummary::default();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            analyzer = analyzer.name(),
            interval_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
            "Live feed started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = self.handle.stopped() => {}
            }
            if self.handle.should_stop() {
                info!("Live feed stop requested");
                break;
            }

            let Some(frame) = source.next_frame() else {
                info!("Live feed source exhausted");
                break;
            };

            match analyzer.analyze(&frame).await {
                Ok(Some(analysis)) => {
                    let outcome = process_frame(&self.registry, &analysis, &self.options);
                    self.tracker.lock().record(outcome);
                    summary.analyzed += 1;
                }
                Ok(None) => {
                    debug!(sequence = frame.sequence, "No analysis for frame");
                    summary.empty += 1;
                }
                Err(e) => {
                    warn!(sequence = frame.sequence, "Frame analysis failed: {e}");
                    summary.failed += 1;
                }
            }
        }

        info!(
            analyzed = summary.analyzed,
            empty = summary.empty,
            failed = summary.failed,
            "Live feed finished"
        );
        summary
    }
}
