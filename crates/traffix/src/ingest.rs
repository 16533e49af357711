//! Producers that feed detection results into the registry.
//!
//! Two kinds of payload come back from the external analysis service:
//!
//! - a [`FrameAnalysis`] for one live-feed frame, handled by [`process_frame`];
//! - a list of [`VideoDetection`]s for an uploaded clip, handled by
//!   [`process_video`], which also issues fines.
//!
//! Payloads are trusted as-is beyond their JSON shape.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{FeedConfig, FinesConfig};
use crate::error::{Error, Result};
use crate::registry::VehicleRegistry;
use crate::vehicle::{FineRecord, UNKNOWN_VEHICLE_TYPE};

/// Violation name that is charged at the speeding rate.
const SPEEDING: &str = "Speeding";

/// Length of generated detection ids.
const DETECTION_ID_LEN: usize = 9;

/// Analysis result for a single live-feed frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameAnalysis {
    /// Plates read from the frame, in the order reported.
    pub detected_plates: Vec<String>,
    /// Safety violations spotted in the frame.
    #[serde(default)]
    pub violations: Vec<FrameViolation>,
    /// Number of vehicles counted in the frame.
    pub count: u32,
}

/// A violation reported for one plate in a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameViolation {
    /// The offending plate.
    pub plate: String,
    /// Free-text explanation.
    #[serde(default)]
    pub reason: String,
}

/// How a live-feed detection relates to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    /// The plate was already registered.
    Tracked,
    /// The plate was not registered when it was seen.
    Violating,
    /// The detection has been dealt with.
    Processed,
}

impl std::fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tracked => write!(f, "tracked"),
            Self::Violating => write!(f, "violating"),
            Self::Processed => write!(f, "processed"),
        }
    }
}

/// One plate sighting shown in the live tracking panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedVehicle {
    /// Short random identifier.
    pub id: String,
    /// The plate that was read.
    pub plate_number: String,
    /// When the frame was processed.
    pub timestamp: DateTime<Utc>,
    /// Registry relationship at the time of the sighting.
    pub status: TrackingStatus,
    /// Recognition confidence.
    pub confidence: f32,
    /// Camera location, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl DetectedVehicle {
    fn new(plate_number: &str, status: TrackingStatus, confidence: f32) -> Self {
        let id = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(DETECTION_ID_LEN)
            .map(char::from)
            .collect();

        Self {
            id,
            plate_number: plate_number.to_string(),
            timestamp: Utc::now(),
            status,
            confidence,
            location: None,
        }
    }
}

/// Knobs for [`process_frame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOptions {
    /// Register plates that are not yet known.
    pub auto_register: bool,
    /// Confidence attached to every detection.
    pub confidence: f32,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self::from(&FeedConfig::default())
    }
}

impl From<&FeedConfig> for FrameOptions {
    fn from(config: &FeedConfig) -> Self {
        Self {
            auto_register: config.auto_register,
            confidence: config.default_confidence,
        }
    }
}

/// What one frame contributed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    /// Detections in payload order.
    pub detections: Vec<DetectedVehicle>,
    /// Vehicles counted in the frame.
    pub flow: u64,
    /// Violations reported in the frame.
    pub violations: u64,
}

/// Apply one live-feed analysis to the registry.
///
/// A plate is `Tracked` if it was registered before this frame and
/// `Violating` otherwise. With `auto_register` set, unseen plates are
/// registered as [`UNKNOWN_VEHICLE_TYPE`] so later frames track them.
pub fn process_frame(
    registry: &VehicleRegistry,
    analysis: &FrameAnalysis,
    options: &FrameOptions,
) -> FrameOutcome {
    // Plates this frame registered stay `Violating` if they repeat.
    let mut registered_here = HashSet::new();
    let detections = analysis
        .detected_plates
        .iter()
        .map(|plate| {
            let known = if options.auto_register {
                if registry.register_if_new(plate, UNKNOWN_VEHICLE_TYPE) {
                    registered_here.insert(plate.as_str());
                    false
                } else {
                    !registered_here.contains(plate.as_str())
                }
            } else {
                registry.contains(plate)
            };

            let status = if known {
                TrackingStatus::Tracked
            } else {
                TrackingStatus::Violating
            };
            DetectedVehicle::new(plate, status, options.confidence)
        })
        .collect::<Vec<_>>();

    debug!(
        plates = detections.len(),
        count = analysis.count,
        violations = analysis.violations.len(),
        "Processed frame analysis"
    );

    FrameOutcome {
        detections,
        flow: u64::from(analysis.count),
        violations: u64::try_from(analysis.violations.len()).unwrap_or(u64::MAX),
    }
}

/// One vehicle found in an uploaded clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDetection {
    /// Row identifier from the analysis service.
    pub id: String,
    /// Offset into the clip, e.g. `00:45`.
    pub timestamp: String,
    /// The plate that was read.
    pub plate: String,
    /// Vehicle classification.
    #[serde(rename = "type")]
    pub vehicle_type: String,
    /// Recognition confidence.
    pub confidence: f32,
    /// Violation committed, if any.
    #[serde(default)]
    pub violation: Option<String>,
    /// Measured speed as reported.
    #[serde(default)]
    pub speed: String,
}

/// Amounts and location used when issuing fines from video analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FineSchedule {
    /// Amount for speeding.
    pub speeding_amount: u64,
    /// Amount for anything else.
    pub default_amount: u64,
    /// Location written on issued fines.
    pub location: String,
}

impl Default for FineSchedule {
    fn default() -> Self {
        Self::from(&FinesConfig::default())
    }
}

impl From<&FinesConfig> for FineSchedule {
    fn from(config: &FinesConfig) -> Self {
        Self {
            speeding_amount: config.speeding_amount,
            default_amount: config.default_amount,
            location: config.location.clone(),
        }
    }
}

impl FineSchedule {
    /// Amount charged for a violation.
    #[must_use]
    pub fn amount_for(&self, violation: &str) -> u64 {
        if violation.eq_ignore_ascii_case(SPEEDING) {
            self.speeding_amount
        } else {
            self.default_amount
        }
    }
}

/// A fine issued by [`process_video`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FineNotice {
    /// Plate the fine was issued to.
    pub plate: String,
    /// The fine as recorded.
    pub fine: FineRecord,
}

impl std::fmt::Display for FineNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Fine of {} issued to {} for {}. Records updated.",
            self.fine.amount, self.plate, self.fine.violation_type
        )
    }
}

/// Apply a batch of video detections to the registry.
///
/// Every plate is registered if new. Each detection carrying a violation
/// gets a pending fine appended, and a notice is returned for it.
pub fn process_video(
    registry: &VehicleRegistry,
    detections: &[VideoDetection],
    schedule: &FineSchedule,
) -> Vec<FineNotice> {
    let mut notices = Vec::new();

    for detection in detections {
        registry.register_if_new(&detection.plate, &detection.vehicle_type);

        let Some(violation) = detection.violation.as_deref() else {
            continue;
        };

        let fine = FineRecord::pending(
            violation,
            schedule.amount_for(violation),
            schedule.location.clone(),
        );
        if registry.append_fine(&detection.plate, fine.clone()) {
            let notice = FineNotice {
                plate: detection.plate.clone(),
                fine,
            };
            info!("{notice}");
            notices.push(notice);
        }
    }

    notices
}

/// Read a [`FrameAnalysis`] from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid payload.
pub fn load_frame_analysis(path: impl AsRef<Path>) -> Result<FrameAnalysis> {
    load_json(path.as_ref())
}

/// Read a sequence of recorded [`FrameAnalysis`] payloads from a JSON array.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid payload.
pub fn load_frame_analyses(path: impl AsRef<Path>) -> Result<Vec<FrameAnalysis>> {
    load_json(path.as_ref())
}

/// Read a list of [`VideoDetection`]s from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid payload.
pub fn load_video_detections(path: impl AsRef<Path>) -> Result<Vec<VideoDetection>> {
    load_json(path.as_ref())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).map_err(|source| Error::PayloadRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::vehicle::FineStatus;

    fn detection(plate: &str, vehicle_type: &str, violation: Option<&str>) -> VideoDetection {
        VideoDetection {
            id: "1".to_string(),
            timestamp: "00:04".to_string(),
            plate: plate.to_string(),
            vehicle_type: vehicle_type.to_string(),
            confidence: 0.98,
            violation: violation.map(str::to_string),
            speed: "42 km/h".to_string(),
        }
    }

    fn frame(plates: &[&str], count: u32) -> FrameAnalysis {
        FrameAnalysis {
            detected_plates: plates.iter().map(|p| (*p).to_string()).collect(),
            violations: Vec::new(),
            count,
        }
    }

    #[test]
    fn test_frame_analysis_deserialize() {
        let json = r#"{
            "detectedPlates": ["ABC-1234", "NEW-1"],
            "violations": [{"plate": "NEW-1", "reason": "Tailgating"}],
            "count": 4
        }"#;
        let analysis: FrameAnalysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.detected_plates, vec!["ABC-1234", "NEW-1"]);
        assert_eq!(analysis.violations[0].reason, "Tailgating");
        assert_eq!(analysis.count, 4);
    }

    #[test]
    fn test_frame_analysis_violations_optional() {
        let json = r#"{"detectedPlates": [], "count": 0}"#;
        let analysis: FrameAnalysis = serde_json::from_str(json).unwrap();
        assert!(analysis.violations.is_empty());
    }

    #[test]
    fn test_process_frame_classifies_and_registers() {
        let registry = VehicleRegistry::seeded();
        let analysis = FrameAnalysis {
            detected_plates: vec!["ABC-1234".to_string(), "NEW-1".to_string()],
            violations: vec![FrameViolation {
                plate: "NEW-1".to_string(),
                reason: "Unsafe distance".to_string(),
            }],
            count: 5,
        };

        let outcome = process_frame(&registry, &analysis, &FrameOptions::default());

        assert_eq!(outcome.detections.len(), 2);
        assert_eq!(outcome.detections[0].plate_number, "ABC-1234");
        assert_eq!(outcome.detections[0].status, TrackingStatus::Tracked);
        assert_eq!(outcome.detections[1].status, TrackingStatus::Violating);
        assert_eq!(outcome.flow, 5);
        assert_eq!(outcome.violations, 1);

        let registered = registry.find("NEW-1").unwrap();
        assert_eq!(registered.vehicle_type, UNKNOWN_VEHICLE_TYPE);

        // Seen again, it is now tracked
        let again = process_frame(&registry, &frame(&["NEW-1"], 1), &FrameOptions::default());
        assert_eq!(again.detections[0].status, TrackingStatus::Tracked);
    }

    #[test]
    fn test_process_frame_repeated_plate_uses_pre_frame_state() {
        let registry = VehicleRegistry::new();
        let outcome = process_frame(
            &registry,
            &frame(&["NEW-1", "NEW-1"], 2),
            &FrameOptions::default(),
        );

        let statuses: Vec<_> = outcome.detections.iter().map(|d| d.status).collect();
        assert_eq!(statuses, [TrackingStatus::Violating, TrackingStatus::Violating]);
        assert_eq!(registry.len(), 1);

        let seeded = VehicleRegistry::seeded();
        let outcome = process_frame(
            &seeded,
            &frame(&["ABC-1234", "ABC-1234"], 2),
            &FrameOptions::default(),
        );
        assert!(outcome
            .detections
            .iter()
            .all(|d| d.status == TrackingStatus::Tracked));
    }

    #[test]
    fn test_process_frame_without_auto_register() {
        let registry = VehicleRegistry::seeded();
        let options = FrameOptions {
            auto_register: false,
            confidence: 0.5,
        };

        let outcome = process_frame(&registry, &frame(&["NEW-1"], 1), &options);

        assert_eq!(outcome.detections[0].status, TrackingStatus::Violating);
        assert!((outcome.detections[0].confidence - 0.5).abs() < f32::EPSILON);
        assert!(registry.find("NEW-1").is_none());
    }

    #[test]
    fn test_detection_ids() {
        let registry = VehicleRegistry::new();
        let outcome = process_frame(&registry, &frame(&["A", "B"], 2), &FrameOptions::default());
        for detection in &outcome.detections {
            assert_eq!(detection.id.len(), DETECTION_ID_LEN);
            assert!(detection.id.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_fine_schedule_amounts() {
        let schedule = FineSchedule::default();
        assert_eq!(schedule.amount_for("Speeding"), 150);
        assert_eq!(schedule.amount_for("speeding"), 150);
        assert_eq!(schedule.amount_for("Red Light Jump"), 100);
    }

    #[test]
    fn test_process_video_issues_fines() {
        let registry = VehicleRegistry::seeded();
        let detections = vec![
            detection("MH-12-DE-4532", "SUV", Some("Red Light Jump")),
            detection("DL-3C-AS-1102", "Sedan", None),
            detection("ABC-1234", "SUV", Some("Speeding")),
            detection("KA-05-NB-2231", "Compact", None),
        ];

        let notices = process_video(&registry, &detections, &FineSchedule::default());

        assert_eq!(notices.len(), 2);
        assert_eq!(
            notices[0].to_string(),
            "Fine of 100 issued to MH-12-DE-4532 for Red Light Jump. Records updated."
        );
        assert_eq!(notices[1].fine.amount, 150);

        let raj = registry.find("MH-12-DE-4532").unwrap();
        assert_eq!(raj.history.len(), 1);
        assert_eq!(raj.history[0].status, FineStatus::Pending);
        assert_eq!(raj.history[0].location, "Intersection A4-Forensic");

        assert_eq!(registry.total_fines("ABC-1234"), Some(650));
        assert_eq!(registry.find("DL-3C-AS-1102").unwrap().history.len(), 1);

        let compact = registry.find("KA-05-NB-2231").unwrap();
        assert_eq!(compact.vehicle_type, "Compact");
        assert!(compact.history.is_empty());
    }

    #[test]
    fn test_process_video_registers_then_fines_unknown_plate() {
        let registry = VehicleRegistry::new();
        let notices = process_video(
            &registry,
            &[detection("XY-000", "Bike", Some("Speeding"))],
            &FineSchedule::default(),
        );

        assert_eq!(notices.len(), 1);
        assert_eq!(registry.find("XY-000").unwrap().vehicle_type, "Bike");
        assert_eq!(registry.total_fines("XY-000"), Some(150));
    }

    #[test]
    fn test_video_detection_deserialize_null_violation() {
        let json = r#"[{"id": "2", "timestamp": "00:12", "plate": "DL-3C-AS-1102",
            "type": "Sedan", "confidence": 0.94, "violation": null, "speed": "38 km/h"}]"#;
        let detections: Vec<VideoDetection> = serde_json::from_str(json).unwrap();
        assert_eq!(detections[0].vehicle_type, "Sedan");
        assert!(detections[0].violation.is_none());
    }

    #[test]
    fn test_load_frame_analysis_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"detectedPlates": ["ABC-1234"], "count": 1}}"#).unwrap();

        let analysis = load_frame_analysis(file.path()).unwrap();
        assert_eq!(analysis.detected_plates, vec!["ABC-1234"]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_video_detections("/nonexistent/video.json").unwrap_err();
        assert!(matches!(err, Error::PayloadRead { .. }));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = load_frame_analyses(file.path()).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
