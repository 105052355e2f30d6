// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use lifeline_domain::UserRole;
use lifeline_persistence::SqlitePersistence;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{
    AuthenticatedActor, CreateSosRequest, DonorProfileRequest, SosRequestResponse,
    SyncUserRequest, create_sos_request, save_donor_profile, sync_user,
};

pub const ORIGIN_LATITUDE: f64 = 12.9716;
pub const ORIGIN_LONGITUDE: f64 = 77.5946;

/// Kilometres per degree of latitude on the Haversine sphere.
pub const KM_PER_DEGREE: f64 = 111.194_926_644_558_73;

pub const fn test_now() -> OffsetDateTime {
    datetime!(2026-03-01 12:00 UTC)
}

pub fn north_of_origin(km: f64) -> f64 {
    ORIGIN_LATITUDE + km / KM_PER_DEGREE
}

pub fn create_actor(user_id: &str, role: UserRole) -> AuthenticatedActor {
    AuthenticatedActor::new(user_id.to_string(), role)
}

pub fn create_test_patient() -> AuthenticatedActor {
    create_actor("patient-1", UserRole::Patient)
}

pub fn create_other_patient() -> AuthenticatedActor {
    create_actor("patient-2", UserRole::Patient)
}

pub fn create_test_donor() -> AuthenticatedActor {
    create_actor("donor-1", UserRole::Donor)
}

pub fn create_other_donor() -> AuthenticatedActor {
    create_actor("donor-2", UserRole::Donor)
}

pub fn create_test_blood_bank() -> AuthenticatedActor {
    create_actor("bank-1", UserRole::BloodBank)
}

pub fn create_test_admin() -> AuthenticatedActor {
    create_actor("admin-1", UserRole::Admin)
}

pub fn create_sync_request(name: &str) -> SyncUserRequest {
    SyncUserRequest {
        name: name.to_string(),
        email: format!("{}@example.org", name.to_lowercase().replace(' ', ".")),
        phone: Some(String::from("+91-9000000000")),
        latitude: Some(ORIGIN_LATITUDE),
        longitude: Some(ORIGIN_LONGITUDE),
        address: Some(String::from("MG Road, Bengaluru")),
    }
}

pub fn create_valid_sos_request() -> CreateSosRequest {
    CreateSosRequest {
        blood_group: Some(String::from("O+")),
        units_needed: 2,
        urgency: Some(String::from("urgent")),
        hospital_name: String::from("City Hospital"),
        hospital_address: String::from("1 Hospital Road"),
        latitude: Some(ORIGIN_LATITUDE),
        longitude: Some(ORIGIN_LONGITUDE),
        contact_person: String::from("Asha"),
        contact_phone: String::from("+91-9000000001"),
        medical_notes: None,
        idempotency_key: None,
    }
}

pub fn create_donor_profile_request(blood_group: &str) -> DonorProfileRequest {
    DonorProfileRequest {
        blood_group: Some(blood_group.to_string()),
        age: 30,
        weight_kg: 70.0,
        last_donation_at: None,
        notifications_enabled: None,
    }
}

/// Persistence with every test actor synced at the origin and both donors
/// registered as eligible O- donors.
pub fn setup_test_persistence() -> SqlitePersistence {
    let mut persistence: SqlitePersistence = SqlitePersistence::new_in_memory().unwrap();
    for (actor, name) in [
        (create_test_patient(), "Patient One"),
        (create_other_patient(), "Patient Two"),
        (create_test_donor(), "Donor One"),
        (create_other_donor(), "Donor Two"),
        (create_test_blood_bank(), "Bank One"),
        (create_test_admin(), "Admin One"),
    ] {
        sync_user(&mut persistence, &actor, create_sync_request(name), test_now()).unwrap();
    }
    for donor in [create_test_donor(), create_other_donor()] {
        save_donor_profile(
            &mut persistence,
            &donor,
            create_donor_profile_request("O-"),
            test_now(),
        )
        .unwrap();
    }
    persistence
}

pub fn create_test_sos(persistence: &mut SqlitePersistence) -> SosRequestResponse {
    create_sos_request(
        persistence,
        &create_test_patient(),
        create_valid_sos_request(),
        test_now(),
    )
    .unwrap()
}
