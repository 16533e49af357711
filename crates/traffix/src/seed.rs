//! Demo vehicles loaded into the registry at startup.

use chrono::NaiveDate;

use crate::vehicle::{FineRecord, FineStatus, VehicleRecord};

/// The fixed set of demo vehicles, in display order.
#[must_use]
pub fn demo_vehicles() -> Vec<VehicleRecord> {
    vec![
        VehicleRecord {
            plate_number: "ABC-1234".to_string(),
            owner_name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            phone: "+123456789".to_string(),
            vehicle_type: "SUV".to_string(),
            registration_date: date(2021, 5, 12),
            history: vec![paid_fine(
                "F-101",
                "2023-10-15",
                "Main St Crossing",
                "Speeding",
                500,
            )],
        },
        VehicleRecord {
            plate_number: "MH-12-DE-4532".to_string(),
            owner_name: "Raj Malhotra".to_string(),
            email: "raj.m@citymail.com".to_string(),
            phone: "+91 9876543210".to_string(),
            vehicle_type: "SUV".to_string(),
            registration_date: date(2022, 1, 20),
            history: Vec::new(),
        },
        VehicleRecord {
            plate_number: "DL-3C-AS-1102".to_string(),
            owner_name: "Sarah Smith".to_string(),
            email: "sarah.s@gmail.com".to_string(),
            phone: "+1 445566778".to_string(),
            vehicle_type: "Sedan".to_string(),
            registration_date: date(2020, 11, 5),
            history: vec![paid_fine(
                "F-202",
                "2023-12-01",
                "Highway 101",
                "Illegal Parking",
                300,
            )],
        },
    ]
}

fn paid_fine(id: &str, date: &str, location: &str, violation_type: &str, amount: u64) -> FineRecord {
    FineRecord {
        id: id.to_string(),
        date: date.to_string(),
        location: location.to_string(),
        violation_type: violation_type.to_string(),
        amount,
        status: FineStatus::Paid,
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    // Literal dates above are all valid
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
