// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use lifeline_persistence::SqlitePersistence;
use time::Duration;

use crate::tests::helpers::{
    create_donor_profile_request, create_other_donor, create_sync_request,
    create_test_admin, create_test_blood_bank, create_test_donor, create_test_patient,
    setup_test_persistence, test_now,
};
use crate::{
    ApiError, AvailabilityRequest, BloodBankProfileRequest,
    BloodBankProfileResponse, DonorProfileRequest, DonorProfileResponse, RecordDonationRequest,
    SyncUserRequest, UserResponse, VerifyBloodBankRequest, get_blood_bank_profile,
    get_donor_profile, record_donation, save_blood_bank_profile, save_donor_profile,
    set_availability, sync_user, verify_blood_bank,
};

fn create_blood_bank_request() -> BloodBankProfileRequest {
    BloodBankProfileRequest {
        organization_name: String::from("Red Cross Bengaluru"),
        license_number: String::from("KA-BB-0042"),
        operating_hours: Some(String::from("24x7")),
        contact_person: String::from("Dr. Rao"),
        contact_phone: String::from("+91-8000000000"),
        website: None,
    }
}

// ============================================================================
// Users
// ============================================================================

#[test]
fn test_sync_user_takes_role_from_actor() {
    let mut persistence: SqlitePersistence = SqlitePersistence::new_in_memory().unwrap();

    let user: UserResponse = sync_user(
        &mut persistence,
        &create_test_patient(),
        create_sync_request("Patient One"),
        test_now(),
    )
    .unwrap();

    assert_eq!(user.user_id, "patient-1");
    assert_eq!(user.role, "patient");
    assert!(!user.is_verified);
    assert!(user.latitude.is_some());
}

#[test]
fn test_sync_user_updates_existing_record() {
    let mut persistence: SqlitePersistence = setup_test_persistence();
    let mut request: SyncUserRequest = create_sync_request("Patient One");
    request.name = String::from("Patient Renamed");

    let user: UserResponse =
        sync_user(&mut persistence, &create_test_patient(), request, test_now()).unwrap();

    assert_eq!(user.name, "Patient Renamed");
}

#[test]
fn test_sync_user_requires_both_coordinates() {
    let mut persistence: SqlitePersistence = SqlitePersistence::new_in_memory().unwrap();
    let mut request: SyncUserRequest = create_sync_request("Patient One");
    request.longitude = None;

    let result: Result<UserResponse, ApiError> =
        sync_user(&mut persistence, &create_test_patient(), request, test_now());

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "location"
    ));
}

#[test]
fn test_sync_user_rejects_blank_name() {
    let mut persistence: SqlitePersistence = SqlitePersistence::new_in_memory().unwrap();
    let mut request: SyncUserRequest = create_sync_request("Patient One");
    request.name = String::from("   ");

    let result: Result<UserResponse, ApiError> =
        sync_user(&mut persistence, &create_test_patient(), request, test_now());

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "name"
    ));
}

// ============================================================================
// Donor profiles
// ============================================================================

#[test]
fn test_new_donor_is_eligible_and_available() {
    let mut persistence: SqlitePersistence = setup_test_persistence();

    let profile: DonorProfileResponse =
        get_donor_profile(&mut persistence, &create_test_donor(), test_now()).unwrap();

    assert_eq!(profile.blood_group, "O-");
    assert!(profile.is_eligible);
    assert!(profile.is_available);
    assert!(profile.notifications_enabled);
    assert_eq!(profile.time_eligibility.days_remaining, 0);
    assert_eq!(profile.stats.donation_count, 0);
    assert_eq!(profile.stats.lives_saved, 0);
    assert_eq!(profile.stats.level, "New Donor");
}

#[test]
fn test_recent_donation_makes_donor_unavailable() {
    let mut persistence: SqlitePersistence = setup_test_persistence();
    let mut request: DonorProfileRequest = create_donor_profile_request("A+");
    request.last_donation_at = Some(String::from("2026-02-19T12:00:00Z"));

    let profile: DonorProfileResponse =
        save_donor_profile(&mut persistence, &create_test_donor(), request, test_now()).unwrap();

    assert_eq!(profile.blood_group, "A+");
    assert!(!profile.is_eligible);
    assert!(!profile.is_available);
    assert!(!profile.time_eligibility.is_eligible);
    assert_eq!(profile.time_eligibility.days_remaining, 46);
    assert_eq!(
        profile.time_eligibility.next_eligible_date.as_deref(),
        Some("2026-04-16T12:00:00Z")
    );
}

#[test]
fn test_underweight_donor_is_medically_ineligible() {
    let mut persistence: SqlitePersistence = setup_test_persistence();
    let mut request: DonorProfileRequest = create_donor_profile_request("B+");
    request.weight_kg = 45.0;

    let profile: DonorProfileResponse =
        save_donor_profile(&mut persistence, &create_test_donor(), request, test_now()).unwrap();

    assert!(!profile.medical_eligibility.is_eligible);
    assert_eq!(profile.medical_eligibility.reasons.len(), 1);
    assert!(!profile.is_available);
}

#[test]
fn test_donor_profile_requires_blood_group() {
    let mut persistence: SqlitePersistence = setup_test_persistence();
    let mut request: DonorProfileRequest = create_donor_profile_request("O-");
    request.blood_group = None;

    let result: Result<DonorProfileResponse, ApiError> =
        save_donor_profile(&mut persistence, &create_test_donor(), request, test_now());

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "blood_group"
    ));
}

#[test]
fn test_donor_profile_rejects_future_last_donation() {
    let mut persistence: SqlitePersistence = setup_test_persistence();
    let mut request: DonorProfileRequest = create_donor_profile_request("O-");
    request.last_donation_at = Some(String::from("2026-03-05T00:00:00Z"));

    let result: Result<DonorProfileResponse, ApiError> =
        save_donor_profile(&mut persistence, &create_test_donor(), request, test_now());

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "last_donation_at"
    ));
}

#[test]
fn test_patient_cannot_save_donor_profile() {
    let mut persistence: SqlitePersistence = setup_test_persistence();

    let result: Result<DonorProfileResponse, ApiError> = save_donor_profile(
        &mut persistence,
        &create_test_patient(),
        create_donor_profile_request("O-"),
        test_now(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_ineligible_donor_cannot_become_available() {
    let mut persistence: SqlitePersistence = setup_test_persistence();
    let mut request: DonorProfileRequest = create_donor_profile_request("O-");
    request.last_donation_at = Some(String::from("2026-02-19T12:00:00Z"));
    save_donor_profile(&mut persistence, &create_test_donor(), request, test_now()).unwrap();

    let result: Result<DonorProfileResponse, ApiError> = set_availability(
        &mut persistence,
        &create_test_donor(),
        &AvailabilityRequest { is_available: true },
        test_now(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidState { ref rule, .. }) if rule == "donor_eligibility"
    ));
}

#[test]
fn test_donor_toggles_availability() {
    let mut persistence: SqlitePersistence = setup_test_persistence();

    let off: DonorProfileResponse = set_availability(
        &mut persistence,
        &create_test_donor(),
        &AvailabilityRequest {
            is_available: false,
        },
        test_now(),
    )
    .unwrap();
    assert!(!off.is_available);

    let on: DonorProfileResponse = set_availability(
        &mut persistence,
        &create_test_donor(),
        &AvailabilityRequest { is_available: true },
        test_now(),
    )
    .unwrap();
    assert!(on.is_available);
}

#[test]
fn test_donor_records_own_donation() {
    let mut persistence: SqlitePersistence = setup_test_persistence();

    let profile: DonorProfileResponse = record_donation(
        &mut persistence,
        &create_test_donor(),
        RecordDonationRequest::default(),
        test_now(),
    )
    .unwrap();

    assert_eq!(profile.stats.donation_count, 1);
    assert_eq!(profile.stats.lives_saved, 3);
    assert_eq!(profile.last_donation_at.as_deref(), Some("2026-03-01T12:00:00Z"));
    assert!(!profile.is_available);
    assert!(!profile.is_eligible);
    assert_eq!(profile.time_eligibility.days_remaining, 56);
}

#[test]
fn test_donor_cannot_record_for_someone_else() {
    let mut persistence: SqlitePersistence = setup_test_persistence();

    let result: Result<DonorProfileResponse, ApiError> = record_donation(
        &mut persistence,
        &create_test_donor(),
        RecordDonationRequest {
            donor_id: Some(create_other_donor().user_id),
            donated_at: None,
        },
        test_now(),
    );

    assert!(matches!(result, Err(ApiError::Forbidden { .. })));
}

#[test]
fn test_blood_bank_must_name_donor() {
    let mut persistence: SqlitePersistence = setup_test_persistence();

    let result: Result<DonorProfileResponse, ApiError> = record_donation(
        &mut persistence,
        &create_test_blood_bank(),
        RecordDonationRequest::default(),
        test_now(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "donor_id"
    ));
}

#[test]
fn test_blood_bank_records_donation_at_given_time() {
    let mut persistence: SqlitePersistence = setup_test_persistence();

    let profile: DonorProfileResponse = record_donation(
        &mut persistence,
        &create_test_blood_bank(),
        RecordDonationRequest {
            donor_id: Some(String::from("donor-2")),
            donated_at: Some(String::from("2026-02-28T09:30:00Z")),
        },
        test_now(),
    )
    .unwrap();

    assert_eq!(profile.user_id, "donor-2");
    assert_eq!(profile.last_donation_at.as_deref(), Some("2026-02-28T09:30:00Z"));
}

#[test]
fn test_backfilled_donation_does_not_reset_interval() {
    let mut persistence: SqlitePersistence = setup_test_persistence();
    record_donation(
        &mut persistence,
        &create_test_donor(),
        RecordDonationRequest::default(),
        test_now(),
    )
    .unwrap();

    let profile: DonorProfileResponse = record_donation(
        &mut persistence,
        &create_test_blood_bank(),
        RecordDonationRequest {
            donor_id: Some(String::from("donor-1")),
            donated_at: Some(String::from("2025-11-21T12:00:00Z")),
        },
        test_now(),
    )
    .unwrap();
    assert_eq!(profile.stats.donation_count, 2);
    assert_eq!(profile.last_donation_at.as_deref(), Some("2026-03-01T12:00:00Z"));
    assert!(!profile.is_eligible);

    let result: Result<DonorProfileResponse, ApiError> = set_availability(
        &mut persistence,
        &create_test_donor(),
        &AvailabilityRequest { is_available: true },
        test_now(),
    );
    assert!(matches!(result, Err(ApiError::InvalidState { .. })));
}

#[test]
fn test_profile_save_with_older_last_donation_keeps_stored_date() {
    let mut persistence: SqlitePersistence = setup_test_persistence();
    record_donation(
        &mut persistence,
        &create_test_donor(),
        RecordDonationRequest::default(),
        test_now(),
    )
    .unwrap();

    let mut request: DonorProfileRequest = create_donor_profile_request("O-");
    request.last_donation_at = Some(String::from("2025-06-01T00:00:00Z"));
    let profile: DonorProfileResponse =
        save_donor_profile(&mut persistence, &create_test_donor(), request, test_now()).unwrap();

    assert_eq!(profile.last_donation_at.as_deref(), Some("2026-03-01T12:00:00Z"));
    assert!(!profile.is_eligible);
    assert!(!profile.is_available);
}

#[test]
fn test_patient_cannot_record_donation() {
    let mut persistence: SqlitePersistence = setup_test_persistence();

    let result: Result<DonorProfileResponse, ApiError> = record_donation(
        &mut persistence,
        &create_test_patient(),
        RecordDonationRequest {
            donor_id: Some(String::from("donor-1")),
            donated_at: None,
        },
        test_now(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_future_donation_is_rejected() {
    let mut persistence: SqlitePersistence = setup_test_persistence();

    let result: Result<DonorProfileResponse, ApiError> = record_donation(
        &mut persistence,
        &create_test_donor(),
        RecordDonationRequest {
            donor_id: None,
            donated_at: Some(String::from("2026-03-02T00:00:00Z")),
        },
        test_now(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "donated_at"
    ));
}

#[test]
fn test_donor_becomes_eligible_again_after_interval() {
    let mut persistence: SqlitePersistence = setup_test_persistence();
    record_donation(
        &mut persistence,
        &create_test_donor(),
        RecordDonationRequest::default(),
        test_now(),
    )
    .unwrap();

    let profile: DonorProfileResponse = set_availability(
        &mut persistence,
        &create_test_donor(),
        &AvailabilityRequest { is_available: true },
        test_now() + Duration::days(56),
    )
    .unwrap();

    assert!(profile.is_available);
    assert!(profile.is_eligible);
}

// ============================================================================
// Blood banks
// ============================================================================

#[test]
fn test_blood_bank_profile_starts_unverified() {
    let mut persistence: SqlitePersistence = setup_test_persistence();

    let saved: BloodBankProfileResponse = save_blood_bank_profile(
        &mut persistence,
        &create_test_blood_bank(),
        create_blood_bank_request(),
        test_now(),
    )
    .unwrap();

    assert!(!saved.is_verified);
    let loaded: BloodBankProfileResponse =
        get_blood_bank_profile(&mut persistence, &create_test_blood_bank()).unwrap();
    assert_eq!(loaded.organization_name, "Red Cross Bengaluru");
}

#[test]
fn test_blood_bank_profile_requires_organization_name() {
    let mut persistence: SqlitePersistence = setup_test_persistence();
    let mut request: BloodBankProfileRequest = create_blood_bank_request();
    request.organization_name = String::new();

    let result: Result<BloodBankProfileResponse, ApiError> = save_blood_bank_profile(
        &mut persistence,
        &create_test_blood_bank(),
        request,
        test_now(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "organization_name"
    ));
}

#[test]
fn test_only_admin_verifies_blood_bank() {
    let mut persistence: SqlitePersistence = setup_test_persistence();
    save_blood_bank_profile(
        &mut persistence,
        &create_test_blood_bank(),
        create_blood_bank_request(),
        test_now(),
    )
    .unwrap();
    let verify: VerifyBloodBankRequest = VerifyBloodBankRequest { is_verified: true };

    let denied: Result<BloodBankProfileResponse, ApiError> = verify_blood_bank(
        &mut persistence,
        &create_test_blood_bank(),
        "bank-1",
        &verify,
        test_now(),
    );
    assert!(matches!(denied, Err(ApiError::Unauthorized { .. })));

    let verified: BloodBankProfileResponse = verify_blood_bank(
        &mut persistence,
        &create_test_admin(),
        "bank-1",
        &verify,
        test_now(),
    )
    .unwrap();
    assert!(verified.is_verified);
}

#[test]
fn test_resaving_profile_keeps_verification() {
    let mut persistence: SqlitePersistence = setup_test_persistence();
    save_blood_bank_profile(
        &mut persistence,
        &create_test_blood_bank(),
        create_blood_bank_request(),
        test_now(),
    )
    .unwrap();
    verify_blood_bank(
        &mut persistence,
        &create_test_admin(),
        "bank-1",
        &VerifyBloodBankRequest { is_verified: true },
        test_now(),
    )
    .unwrap();

    let mut request: BloodBankProfileRequest = create_blood_bank_request();
    request.operating_hours = Some(String::from("08:00-20:00"));
    let resaved: BloodBankProfileResponse = save_blood_bank_profile(
        &mut persistence,
        &create_test_blood_bank(),
        request,
        test_now() + Duration::hours(1),
    )
    .unwrap();

    assert!(resaved.is_verified);
    assert_eq!(resaved.created_at, "2026-03-01T12:00:00Z");
    assert_eq!(resaved.operating_hours.as_deref(), Some("08:00-20:00"));
}

#[test]
fn test_verifying_unknown_blood_bank_is_not_found() {
    let mut persistence: SqlitePersistence = setup_test_persistence();

    let result: Result<BloodBankProfileResponse, ApiError> = verify_blood_bank(
        &mut persistence,
        &create_test_admin(),
        "bank-9",
        &VerifyBloodBankRequest { is_verified: true },
        test_now(),
    );

    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}
