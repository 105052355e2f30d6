// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use lifeline_domain::{NewSosRequest, SosRequest, SosStatus};
use time::Duration;

use super::{DONOR_ID, PATIENT_ID, create_new_request, setup_persistence, test_now};
use crate::{PersistenceError, SqlitePersistence, SweepReport};

#[test]
fn test_insert_returns_stored_request() {
    let mut persistence: SqlitePersistence = setup_persistence();

    let request: SosRequest = persistence
        .insert_sos_request(&create_new_request(PATIENT_ID, test_now()))
        .unwrap();

    assert_eq!(request.patient_id, PATIENT_ID);
    assert_eq!(request.status, SosStatus::Active);
    assert_eq!(request.response_count, 0);
    assert_eq!(request.expires_at, test_now() + Duration::hours(24));
    assert_eq!(
        persistence.get_sos_request(request.id).unwrap(),
        Some(request)
    );
}

#[test]
fn test_fourth_active_request_is_rejected() {
    let mut persistence: SqlitePersistence = setup_persistence();
    for _ in 0..3 {
        persistence
            .insert_sos_request(&create_new_request(PATIENT_ID, test_now()))
            .unwrap();
    }

    let result: Result<SosRequest, PersistenceError> =
        persistence.insert_sos_request(&create_new_request(PATIENT_ID, test_now()));

    assert!(matches!(
        result,
        Err(PersistenceError::ActiveRequestCapReached { ref patient_id }) if patient_id == PATIENT_ID
    ));
    assert_eq!(persistence.count_active_sos_requests(PATIENT_ID).unwrap(), 3);
}

#[test]
fn test_closed_requests_do_not_count_toward_cap() {
    let mut persistence: SqlitePersistence = setup_persistence();
    let first: SosRequest = persistence
        .insert_sos_request(&create_new_request(PATIENT_ID, test_now()))
        .unwrap();
    persistence
        .insert_sos_request(&create_new_request(PATIENT_ID, test_now()))
        .unwrap();
    persistence
        .insert_sos_request(&create_new_request(PATIENT_ID, test_now()))
        .unwrap();
    persistence
        .set_sos_status(first.id, SosStatus::Fulfilled, test_now())
        .unwrap();

    let result: Result<SosRequest, PersistenceError> =
        persistence.insert_sos_request(&create_new_request(PATIENT_ID, test_now()));

    assert!(result.is_ok());
    assert_eq!(persistence.count_active_sos_requests(PATIENT_ID).unwrap(), 3);
}

#[test]
fn test_reused_idempotency_key_is_rejected() {
    let mut persistence: SqlitePersistence = setup_persistence();
    let mut request: NewSosRequest = create_new_request(PATIENT_ID, test_now());
    request.idempotency_key = Some(String::from("retry-1"));
    let stored: SosRequest = persistence.insert_sos_request(&request).unwrap();

    let result: Result<SosRequest, PersistenceError> = persistence.insert_sos_request(&request);

    assert!(matches!(
        result,
        Err(PersistenceError::DuplicateIdempotencyKey(ref key)) if key == "retry-1"
    ));
    assert_eq!(
        persistence
            .find_sos_request_by_idempotency_key(PATIENT_ID, "retry-1")
            .unwrap(),
        Some(stored)
    );
}

#[test]
fn test_list_by_patient_is_newest_first() {
    let mut persistence: SqlitePersistence = setup_persistence();
    let older: SosRequest = persistence
        .insert_sos_request(&create_new_request(PATIENT_ID, test_now()))
        .unwrap();
    let newer: SosRequest = persistence
        .insert_sos_request(&create_new_request(
            PATIENT_ID,
            test_now() + Duration::minutes(5),
        ))
        .unwrap();

    let listed: Vec<SosRequest> = persistence.list_sos_requests_by_patient(PATIENT_ID).unwrap();
    let ids: Vec<i64> = listed.iter().map(|r| r.id).collect();

    assert_eq!(ids, vec![newer.id, older.id]);
    assert!(persistence
        .list_sos_requests_by_patient(DONOR_ID)
        .unwrap()
        .is_empty());
}

#[test]
fn test_fulfil_stamps_time_and_is_final() {
    let mut persistence: SqlitePersistence = setup_persistence();
    let request: SosRequest = persistence
        .insert_sos_request(&create_new_request(PATIENT_ID, test_now()))
        .unwrap();
    let later = test_now() + Duration::hours(2);

    let fulfilled: SosRequest = persistence
        .set_sos_status(request.id, SosStatus::Fulfilled, later)
        .unwrap();
    assert_eq!(fulfilled.status, SosStatus::Fulfilled);
    assert_eq!(fulfilled.fulfilled_at, Some(later));

    let again: Result<SosRequest, PersistenceError> =
        persistence.set_sos_status(request.id, SosStatus::Cancelled, later);
    assert!(matches!(
        again,
        Err(PersistenceError::RequestNotActive { ref status, .. }) if status == "fulfilled"
    ));
}

#[test]
fn test_status_change_on_missing_request_is_not_found() {
    let mut persistence: SqlitePersistence = setup_persistence();

    let result: Result<SosRequest, PersistenceError> =
        persistence.set_sos_status(999, SosStatus::Cancelled, test_now());

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_delete_only_without_responses() {
    let mut persistence: SqlitePersistence = setup_persistence();
    let untouched: SosRequest = persistence
        .insert_sos_request(&create_new_request(PATIENT_ID, test_now()))
        .unwrap();
    let answered: SosRequest = persistence
        .insert_sos_request(&create_new_request(PATIENT_ID, test_now()))
        .unwrap();
    persistence
        .respond(answered.id, DONOR_ID, None, test_now())
        .unwrap();

    persistence.delete_sos_request(untouched.id).unwrap();
    assert!(persistence.get_sos_request(untouched.id).unwrap().is_none());

    let result: Result<(), PersistenceError> = persistence.delete_sos_request(answered.id);
    assert!(matches!(
        result,
        Err(PersistenceError::RequestHasResponses { sos_request_id }) if sos_request_id == answered.id
    ));

    let missing: Result<(), PersistenceError> = persistence.delete_sos_request(untouched.id);
    assert!(matches!(missing, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_expire_sweep_cancels_only_expired_and_is_idempotent() {
    let mut persistence: SqlitePersistence = setup_persistence();
    let stale: SosRequest = persistence
        .insert_sos_request(&create_new_request(PATIENT_ID, test_now()))
        .unwrap();
    let fresh: SosRequest = persistence
        .insert_sos_request(&create_new_request(
            PATIENT_ID,
            test_now() + Duration::hours(20),
        ))
        .unwrap();
    let sweep_at = test_now() + Duration::hours(25);

    let report: SweepReport = persistence.expire_sweep(sweep_at).unwrap();
    assert_eq!(report.processed, 1);
    assert!(report.failed_ids.is_empty());

    let stale_now: SosRequest = persistence.get_sos_request(stale.id).unwrap().unwrap();
    assert_eq!(stale_now.status, SosStatus::Cancelled);
    assert_eq!(stale_now.fulfilled_at, None);
    let fresh_now: SosRequest = persistence.get_sos_request(fresh.id).unwrap().unwrap();
    assert_eq!(fresh_now.status, SosStatus::Active);

    let second: SweepReport = persistence.expire_sweep(sweep_at).unwrap();
    assert_eq!(second, SweepReport::default());
}

#[test]
fn test_sweep_before_expiry_does_nothing() {
    let mut persistence: SqlitePersistence = setup_persistence();
    persistence
        .insert_sos_request(&create_new_request(PATIENT_ID, test_now()))
        .unwrap();

    let report: SweepReport = persistence
        .expire_sweep(test_now() + Duration::hours(24))
        .unwrap();

    assert_eq!(report.processed, 0);
}

#[test]
fn test_list_active_excludes_closed_requests() {
    let mut persistence: SqlitePersistence = setup_persistence();
    let open: SosRequest = persistence
        .insert_sos_request(&create_new_request(PATIENT_ID, test_now()))
        .unwrap();
    let closed: SosRequest = persistence
        .insert_sos_request(&create_new_request(PATIENT_ID, test_now()))
        .unwrap();
    persistence
        .set_sos_status(closed.id, SosStatus::Cancelled, test_now())
        .unwrap();

    let active: Vec<SosRequest> = persistence.list_active_sos_requests().unwrap();

    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, open.id);
}
