//! `traffix` - Vehicle registry and violation ledger
//!
//! This library holds the registry of known vehicles and their fines, and
//! the handlers that feed it with plate detections from live camera frames
//! and analyzed video clips.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod monitor;
pub mod registry;
pub mod seed;
pub mod tracker;
pub mod vehicle;

pub use config::Config;
pub use error::{Error, Result};
pub use ingest::{process_frame, process_video, FineSchedule, FrameAnalysis, VideoDetection};
pub use logging::init_logging;
pub use monitor::{FeedMonitor, FrameAnalyzer, FrameSource, MonitorHandle};
pub use registry::{RegistryStats, VehicleRegistry};
pub use tracker::LiveTracker;
pub use vehicle::{FineRecord, FineStatus, VehicleRecord};
