//! Vehicle and fine records.
//!
//! These are the values held by the [`VehicleRegistry`](crate::VehicleRegistry).
//! Callers only ever see owned copies; the registry is the single place
//! where histories grow.

use chrono::{Local, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Vehicle type given to plates registered without a classification.
pub const UNKNOWN_VEHICLE_TYPE: &str = "Unknown";

/// Owner name placed on auto-registered vehicles.
pub const PLACEHOLDER_OWNER: &str = "Unregistered Owner";

/// Payment state of a fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FineStatus {
    /// The fine has been settled.
    Paid,
    /// The fine is still outstanding.
    Pending,
}

impl std::fmt::Display for FineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paid => write!(f, "paid"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// A single citation issued against a vehicle.
///
/// `amount` carries no currency; it is whatever unit the issuing schedule uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FineRecord {
    /// Identifier, unique within one vehicle's history by convention only.
    pub id: String,
    /// Date the fine was issued.
    pub date: String,
    /// Where the violation happened.
    pub location: String,
    /// Kind of violation, e.g. "Speeding".
    #[serde(rename = "type")]
    pub violation_type: String,
    /// Fine value.
    pub amount: u64,
    /// Payment state.
    pub status: FineStatus,
}

impl FineRecord {
    /// Issue a pending fine dated today with a freshly generated id.
    #[must_use]
    pub fn pending(
        violation_type: impl Into<String>,
        amount: u64,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: Self::generate_id(),
            date: Local::now().date_naive().to_string(),
            location: location.into(),
            violation_type: violation_type.into(),
            amount,
            status: FineStatus::Pending,
        }
    }

    /// Generate a fine id of the form `F-<n>` with `n` below 10000.
    ///
    /// Ids are random, so two fines may collide.
    #[must_use]
    pub fn generate_id() -> String {
        format!("F-{}", rand::thread_rng().gen_range(0..10_000))
    }

    /// Check if the fine is still outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == FineStatus::Pending
    }
}

/// A registered vehicle and its fine history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    /// Registry key. Compared exactly, without case or whitespace folding.
    pub plate_number: String,
    /// Owner display name.
    pub owner_name: String,
    /// Owner email, may be empty.
    pub email: String,
    /// Owner phone, may be empty.
    pub phone: String,
    /// Free-form classification, e.g. "SUV" or "Bike".
    pub vehicle_type: String,
    /// Date the record was created.
    pub registration_date: NaiveDate,
    /// Fines in issuance order.
    pub history: Vec<FineRecord>,
}

impl VehicleRecord {
    /// Create a record for a plate seen in the field with no owner details.
    #[must_use]
    pub fn unregistered(
        plate_number: impl Into<String>,
        vehicle_type: impl Into<String>,
        registration_date: NaiveDate,
    ) -> Self {
        Self {
            plate_number: plate_number.into(),
            owner_name: PLACEHOLDER_OWNER.to_string(),
            email: String::new(),
            phone: String::new(),
            vehicle_type: vehicle_type.into(),
            registration_date,
            history: Vec::new(),
        }
    }

    /// Sum of every fine amount in the history, saturating at `u64::MAX`.
    #[must_use]
    pub fn total_fines(&self) -> u64 {
        saturating_sum(self.history.iter().map(|fine| fine.amount))
    }

    /// Sum of the pending fine amounts.
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        let pending = self
            .history
            .iter()
            .filter(|fine| fine.is_pending())
            .map(|fine| fine.amount);
        saturating_sum(pending)
    }

    /// Number of fines on record.
    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.history.len()
    }

    /// Case-insensitive substring match on plate or owner.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.plate_number.to_lowercase().contains(needle)
            || self.owner_name.to_lowercase().contains(needle)
    }
}

/// Add amounts without wrapping.
fn saturating_sum(amounts: impl IntoIterator<Item = u64>) -> u64 {
    amounts.into_iter().fold(0, u64::saturating_add)
}
