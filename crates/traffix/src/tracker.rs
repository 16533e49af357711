//! State behind the live-feed tracking panel.

use std::collections::VecDeque;

use serde::Serialize;

use crate::ingest::{DetectedVehicle, FrameOutcome};

/// Running counters for the live feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    /// Vehicles counted across all frames.
    pub flow: u64,
    /// Violations reported across all frames.
    pub violations: u64,
    /// Frames recorded.
    pub frames: u64,
}

/// Most recent detections, newest first, bounded by capacity.
#[derive(Debug, Clone)]
pub struct LiveTracker {
    recent: VecDeque<DetectedVehicle>,
    capacity: usize,
    stats: FeedStats,
}

impl LiveTracker {
    /// Create a tracker holding at most `capacity` detections.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            recent: VecDeque::with_capacity(capacity),
            capacity,
            stats: FeedStats::default(),
        }
    }

    /// Record a processed frame.
    ///
    /// The frame's detections go in front of older ones, keeping their own
    /// order, and the oldest entries beyond capacity are dropped.
    pub fn record(&mut self, outcome: FrameOutcome) {
        for detection in outcome.detections.into_iter().rev() {
            self.recent.push_front(detection);
        }
        self.recent.truncate(self.capacity);

        self.stats.flow += outcome.flow;
        self.stats.violations += outcome.violations;
        self.stats.frames += 1;
    }

    /// Detections currently shown, newest first.
    pub fn recent(&self) -> impl Iterator<Item = &DetectedVehicle> {
        self.recent.iter()
    }

    /// Number of detections currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recent.len()
    }

    /// Check if no detections are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    /// Running counters.
    #[must_use]
    pub fn stats(&self) -> FeedStats {
        self.stats
    }

    /// Maximum number of detections held.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
