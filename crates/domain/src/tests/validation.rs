// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BloodGroup, DomainError, MAX_ACTIVE_REQUESTS_PER_PATIENT, NewSosRequest, SosRequestDraft,
    Urgency, check_active_request_cap, validate_units_needed,
};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

fn create_test_draft() -> SosRequestDraft {
    SosRequestDraft {
        blood_group: Some(String::from("B+")),
        units_needed: 2,
        urgency: Some(String::from("Critical")),
        hospital_name: String::from("City Hospital"),
        hospital_address: String::from("1 Main Road"),
        latitude: Some(12.97),
        longitude: Some(77.59),
        contact_person: String::from("Asha"),
        contact_phone: String::from("+91 98450 00000"),
        medical_notes: Some(String::from("  ")),
        idempotency_key: None,
    }
}

#[test]
fn test_valid_draft_produces_request() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let request: NewSosRequest =
        NewSosRequest::from_draft("patient-1", create_test_draft(), now).unwrap();

    assert_eq!(request.patient_id, "patient-1");
    assert_eq!(request.blood_group, BloodGroup::BPositive);
    assert_eq!(request.units_needed, 2);
    assert_eq!(request.urgency, Urgency::Critical);
    assert_eq!(request.expires_at, now + Duration::hours(24));
    assert_eq!(request.medical_notes, None);
}

#[test]
fn test_missing_blood_group_is_reported_first() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let draft: SosRequestDraft = SosRequestDraft {
        blood_group: None,
        units_needed: 0,
        ..create_test_draft()
    };
    let result: Result<NewSosRequest, DomainError> =
        NewSosRequest::from_draft("patient-1", draft, now);
    assert!(matches!(result, Err(DomainError::MissingBloodGroup)));
}

#[test]
fn test_unknown_blood_group_is_rejected() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let draft: SosRequestDraft = SosRequestDraft {
        blood_group: Some(String::from("C+")),
        ..create_test_draft()
    };
    let result: Result<NewSosRequest, DomainError> =
        NewSosRequest::from_draft("patient-1", draft, now);
    assert!(matches!(result, Err(DomainError::InvalidBloodGroup(_))));
}

#[test]
fn test_units_bounds() {
    assert!(matches!(
        validate_units_needed(0),
        Err(DomainError::InvalidUnits { units: 0 })
    ));
    assert!(matches!(
        validate_units_needed(11),
        Err(DomainError::InvalidUnits { units: 11 })
    ));
    assert_eq!(validate_units_needed(1).unwrap(), 1);
    assert_eq!(validate_units_needed(10).unwrap(), 10);
}

#[test]
fn test_blank_hospital_is_rejected() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let draft: SosRequestDraft = SosRequestDraft {
        hospital_name: String::from("   "),
        ..create_test_draft()
    };
    let result: Result<NewSosRequest, DomainError> =
        NewSosRequest::from_draft("patient-1", draft, now);
    assert!(matches!(
        result,
        Err(DomainError::BlankField {
            field: "hospital_name"
        })
    ));
}

#[test]
fn test_missing_coordinates_are_rejected() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let draft: SosRequestDraft = SosRequestDraft {
        longitude: None,
        ..create_test_draft()
    };
    let result: Result<NewSosRequest, DomainError> =
        NewSosRequest::from_draft("patient-1", draft, now);
    assert!(matches!(result, Err(DomainError::MissingCoordinates)));
}

#[test]
fn test_missing_urgency_defaults_to_normal() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let draft: SosRequestDraft = SosRequestDraft {
        urgency: None,
        ..create_test_draft()
    };
    let request: NewSosRequest = NewSosRequest::from_draft("patient-1", draft, now).unwrap();
    assert_eq!(request.urgency, Urgency::Normal);
}

#[test]
fn test_active_request_cap() {
    assert!(check_active_request_cap(0).is_ok());
    assert!(check_active_request_cap(MAX_ACTIVE_REQUESTS_PER_PATIENT - 1).is_ok());
    assert!(matches!(
        check_active_request_cap(MAX_ACTIVE_REQUESTS_PER_PATIENT),
        Err(DomainError::ActiveRequestCapReached {
            active: 3,
            limit: 3
        })
    ));
}
