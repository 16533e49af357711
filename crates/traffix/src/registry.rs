//! In-memory vehicle registry and violation ledger.
//!
//! The registry owns every [`VehicleRecord`] behind one mutex. Each operation
//! takes the lock once and finishes its whole read-check-write sequence before
//! releasing it, so concurrent producers can never register the same plate
//! twice. Reads hand back owned snapshots; the backing collection is never
//! exposed.

use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::vehicle::{FineRecord, VehicleRecord, UNKNOWN_VEHICLE_TYPE};

/// Process-wide store of vehicles and their fines.
///
/// Share it as `Arc<VehicleRegistry>`; every method takes `&self`.
#[derive(Debug, Default)]
pub struct VehicleRegistry {
    /// Records in insertion order.
    vehicles: Mutex<Vec<VehicleRecord>>,
}

impl VehicleRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the demo vehicles.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            vehicles: Mutex::new(crate::seed::demo_vehicles()),
        }
    }

    /// Create a registry as configured, seeded or empty.
    #[must_use]
    pub fn from_config(config: &RegistryConfig) -> Self {
        if config.seed_demo_data {
            Self::seeded()
        } else {
            Self::new()
        }
    }

    /// Create a registry from an initial record set, keeping its order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicatePlate`] if two records share a plate.
    pub fn from_records(records: Vec<VehicleRecord>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.plate_number.as_str()) {
                return Err(Error::DuplicatePlate {
                    plate: record.plate_number.clone(),
                });
            }
        }

        Ok(Self {
            vehicles: Mutex::new(records),
        })
    }

    /// Look up a vehicle by its exact plate.
    #[must_use]
    pub fn find(&self, plate_number: &str) -> Option<VehicleRecord> {
        self.vehicles
            .lock()
            .iter()
            .find(|v| v.plate_number == plate_number)
            .cloned()
    }

    /// Check whether a plate is registered.
    #[must_use]
    pub fn contains(&self, plate_number: &str) -> bool {
        self.vehicles
            .lock()
            .iter()
            .any(|v| v.plate_number == plate_number)
    }

    /// Vehicles whose plate or owner name contains `query`, ignoring case.
    ///
    /// Registry order is preserved. An empty query matches everything.
    #[must_use]
    pub fn filter(&self, query: &str) -> Vec<VehicleRecord> {
        let needle = query.to_lowercase();
        self.vehicles
            .lock()
            .iter()
            .filter(|v| v.matches_lowercase(&needle))
            .cloned()
            .collect()
    }

    /// Register a plate that has not been seen before.
    ///
    /// Returns `true` if a record was created. An existing plate is left
    /// untouched, including its vehicle type, and `false` is returned.
    pub fn register_if_new(&self, plate_number: &str, vehicle_type: &str) -> bool {
        self.register_on(plate_number, vehicle_type, Local::now().date_naive())
    }

    /// Register a plate with the [`UNKNOWN_VEHICLE_TYPE`] classification.
    pub fn register_plate(&self, plate_number: &str) -> bool {
        self.register_if_new(plate_number, UNKNOWN_VEHICLE_TYPE)
    }

    fn register_on(&self, plate_number: &str, vehicle_type: &str, date: NaiveDate) -> bool {
        let mut vehicles = self.vehicles.lock();
        if vehicles.iter().any(|v| v.plate_number == plate_number) {
            return false;
        }

        vehicles.push(VehicleRecord::unregistered(plate_number, vehicle_type, date));
        info!(plate = plate_number, vehicle_type, "Registered new vehicle");
        true
    }

    /// Append a fine to a vehicle's history.
    ///
    /// Returns `false`, changing nothing, if the plate is not registered.
    /// Fine ids are not checked for duplicates.
    pub fn append_fine(&self, plate_number: &str, fine: FineRecord) -> bool {
        let mut vehicles = self.vehicles.lock();
        let Some(vehicle) = vehicles.iter_mut().find(|v| v.plate_number == plate_number) else {
            debug!(plate = plate_number, "Fine not recorded, plate is not registered");
            return false;
        };

        debug!(
            plate = plate_number,
            fine_id = %fine.id,
            amount = fine.amount,
            "Recorded fine"
        );
        vehicle.history.push(fine);
        true
    }

    /// Remove a vehicle together with its history.
    ///
    /// Returns `false` if the plate was not registered.
    pub fn delete(&self, plate_number: &str) -> bool {
        let mut vehicles = self.vehicles.lock();
        let Some(index) = vehicles.iter().position(|v| v.plate_number == plate_number) else {
            return false;
        };

        let removed = vehicles.remove(index);
        info!(
            plate = plate_number,
            fines = removed.history.len(),
            "Deleted vehicle"
        );
        true
    }

    /// Aggregate fine total for a plate, or `None` if it is not registered.
    #[must_use]
    pub fn total_fines(&self, plate_number: &str) -> Option<u64> {
        self.vehicles
            .lock()
            .iter()
            .find(|v| v.plate_number == plate_number)
            .map(VehicleRecord::total_fines)
    }

    /// Snapshot of every record in registry order.
    #[must_use]
    pub fn records(&self) -> Vec<VehicleRecord> {
        self.vehicles.lock().clone()
    }

    /// Number of registered vehicles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vehicles.lock().len()
    }

    /// Check if no vehicles are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vehicles.lock().is_empty()
    }

    /// Summary counts across the registry.
    #[must_use]
    pub fn stats(&self) -> RegistryStats {
        let vehicles = self.vehicles.lock();
        let mut stats = RegistryStats {
            vehicles: vehicles.len(),
            ..RegistryStats::default()
        };

        for fine in vehicles.iter().flat_map(|v| v.history.iter()) {
            stats.fines += 1;
            stats.total_amount = stats.total_amount.saturating_add(fine.amount);
            if fine.is_pending() {
                stats.pending_fines += 1;
                stats.outstanding_amount = stats.outstanding_amount.saturating_add(fine.amount);
            }
        }
        stats
    }
}

/// Statistics about the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct RegistryStats {
    /// Number of registered vehicles.
    pub vehicles: usize,
    /// Number of fines across all histories.
    pub fines: usize,
    /// Number of fines still pending.
    pub pending_fines: usize,
    /// Sum of all fine amounts.
    pub total_amount: u64,
    /// Sum of pending fine amounts.
    pub outstanding_amount: u64,
}
