// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{BloodBankCandidate, DonorCandidate};
use lifeline_domain::{
    BloodBankProfile, BloodGroup, Coordinates, DonorProfile, SosRequest, SosStatus, Urgency,
    User, UserRole,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

/// Reference point for all fixtures: central Bengaluru.
pub const ORIGIN_LAT: f64 = 12.9716;
pub const ORIGIN_LON: f64 = 77.5946;

/// Kilometres per degree of latitude on the Haversine sphere.
pub const KM_PER_DEGREE: f64 = 111.194_9;

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-03-01 12:00 UTC)
}

pub fn origin() -> Coordinates {
    Coordinates::new(ORIGIN_LAT, ORIGIN_LON).unwrap()
}

/// A point `km` kilometres due north of the origin.
pub fn north_of_origin(km: f64) -> Coordinates {
    Coordinates::new(ORIGIN_LAT + km / KM_PER_DEGREE, ORIGIN_LON).unwrap()
}

pub fn create_test_request(id: i64, group: BloodGroup, urgency: Urgency, km: f64) -> SosRequest {
    let now: OffsetDateTime = test_now();
    SosRequest {
        id,
        patient_id: String::from("patient-1"),
        blood_group: group,
        units_needed: 1,
        urgency,
        hospital_name: String::from("City Hospital"),
        hospital_address: String::from("1 Main Road"),
        location: north_of_origin(km),
        contact_person: String::from("Asha"),
        contact_phone: String::from("+91 90000 00000"),
        medical_notes: None,
        status: SosStatus::Active,
        response_count: 0,
        created_at: now,
        updated_at: now,
        expires_at: now + Duration::hours(24),
        fulfilled_at: None,
        idempotency_key: None,
    }
}

pub fn create_test_user(id: &str, role: UserRole, location: Option<Coordinates>) -> User {
    User {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@example.org"),
        phone: Some(String::from("+91 98000 00000")),
        role,
        location,
        address: None,
        is_verified: false,
    }
}

pub fn create_test_donor(id: &str, group: BloodGroup, km: f64) -> DonorCandidate {
    DonorCandidate {
        profile: DonorProfile::new(id, group, 30, 70.0, None, test_now()).unwrap(),
        user: create_test_user(id, UserRole::Donor, Some(north_of_origin(km))),
    }
}

pub fn create_test_blood_bank(id: &str, km: f64, verified: bool) -> BloodBankCandidate {
    let now: OffsetDateTime = test_now();
    BloodBankCandidate {
        profile: BloodBankProfile {
            user_id: id.to_string(),
            organization_name: format!("Bank {id}"),
            license_number: format!("LIC-{id}"),
            operating_hours: Some(String::from("24x7")),
            contact_person: String::from("Ravi"),
            contact_phone: String::from("+91 80000 00000"),
            website: None,
            is_verified: verified,
            created_at: now,
            updated_at: now,
        },
        user: create_test_user(id, UserRole::BloodBank, Some(north_of_origin(km))),
    }
}
