// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod sos_request_tests;

use lifeline_domain::{
    BloodGroup, Coordinates, NewSosRequest, SosRequestDraft, User, UserRole,
};
use time::OffsetDateTime;
use time::macros::datetime;

use crate::SqlitePersistence;

pub const PATIENT_ID: &str = "patient-1";
pub const DONOR_ID: &str = "donor-1";
pub const OTHER_DONOR_ID: &str = "donor-2";

pub const fn test_now() -> OffsetDateTime {
    datetime!(2026-03-01 12:00 UTC)
}

pub fn create_test_user(id: &str, role: UserRole) -> User {
    User {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@example.org"),
        phone: Some(String::from("+91-9000000000")),
        role,
        location: Some(Coordinates::new(12.9716, 77.5946).unwrap()),
        address: None,
        is_verified: true,
    }
}

pub fn create_test_draft() -> SosRequestDraft {
    SosRequestDraft {
        blood_group: Some(BloodGroup::OPositive.as_str().to_string()),
        units_needed: 2,
        urgency: Some(String::from("critical")),
        hospital_name: String::from("City Hospital"),
        hospital_address: String::from("1 MG Road"),
        latitude: Some(12.9716),
        longitude: Some(77.5946),
        contact_person: String::from("Asha"),
        contact_phone: String::from("+91-9000000001"),
        medical_notes: None,
        idempotency_key: None,
    }
}

pub fn create_new_request(patient_id: &str, now: OffsetDateTime) -> NewSosRequest {
    NewSosRequest::from_draft(patient_id, create_test_draft(), now).unwrap()
}

/// Persistence with one patient and two donor users already stored.
pub fn setup_persistence() -> SqlitePersistence {
    let mut persistence: SqlitePersistence = SqlitePersistence::new_in_memory().unwrap();
    persistence
        .upsert_user(&create_test_user(PATIENT_ID, UserRole::Patient), test_now())
        .unwrap();
    persistence
        .upsert_user(&create_test_user(DONOR_ID, UserRole::Donor), test_now())
        .unwrap();
    persistence
        .upsert_user(&create_test_user(OTHER_DONOR_ID, UserRole::Donor), test_now())
        .unwrap();
    persistence
}
