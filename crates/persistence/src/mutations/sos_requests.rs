// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SOS request lifecycle writes.

use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel::SqliteConnection;
use lifeline_domain::{NewSosRequest, SosRequest, SosStatus};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::{SweepReport, timestamp_text};
use crate::diesel_schema::sos_requests;
use crate::error::{PersistenceError, is_unique_violation};
use crate::queries::sos_requests::{get_sos_request, list_expired_active_ids};

/// Inserts a validated SOS request and returns the stored row.
///
/// The active-request cap is enforced by the database on insert, so two
/// concurrent inserts for the same patient cannot both pass it.
///
/// # Errors
///
/// - `PersistenceError::ActiveRequestCapReached` if the patient already has
///   the maximum number of active requests
/// - `PersistenceError::DuplicateIdempotencyKey` if the key was used before
/// - `PersistenceError::ReferenceMissing` if the patient user does not exist
pub fn insert_sos_request(
    conn: &mut SqliteConnection,
    request: &NewSosRequest,
) -> Result<SosRequest, PersistenceError> {
    let created_at: String = timestamp_text(request.created_at)?;
    let expires_at: String = timestamp_text(request.expires_at)?;

    diesel::insert_into(sos_requests::table)
        .values((
            sos_requests::patient_id.eq(&request.patient_id),
            sos_requests::blood_group.eq(request.blood_group.as_str()),
            sos_requests::units_needed.eq(i32::from(request.units_needed)),
            sos_requests::urgency.eq(request.urgency.as_str()),
            sos_requests::hospital_name.eq(&request.hospital_name),
            sos_requests::hospital_address.eq(&request.hospital_address),
            sos_requests::latitude.eq(request.location.latitude()),
            sos_requests::longitude.eq(request.location.longitude()),
            sos_requests::contact_person.eq(&request.contact_person),
            sos_requests::contact_phone.eq(&request.contact_phone),
            sos_requests::medical_notes.eq(request.medical_notes.as_deref()),
            sos_requests::status.eq(SosStatus::Active.as_str()),
            sos_requests::response_count.eq(0),
            sos_requests::created_at.eq(&created_at),
            sos_requests::updated_at.eq(&created_at),
            sos_requests::expires_at.eq(&expires_at),
            sos_requests::idempotency_key.eq(request.idempotency_key.as_deref()),
        ))
        .execute(conn)
        .map_err(|e| insert_error(e, request))?;

    let sos_request_id: i64 = get_last_insert_rowid(conn)?;
    info!(
        sos_request_id,
        patient_id = %request.patient_id,
        blood_group = %request.blood_group,
        urgency = %request.urgency,
        "Created SOS request"
    );

    get_sos_request(conn, sos_request_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("SOS request {sos_request_id}")))
}

fn insert_error(err: DieselError, request: &NewSosRequest) -> PersistenceError {
    if is_unique_violation(&err) {
        return PersistenceError::DuplicateIdempotencyKey(
            request.idempotency_key.clone().unwrap_or_default(),
        );
    }
    match PersistenceError::from(err) {
        PersistenceError::ActiveRequestCapReached { .. } => {
            PersistenceError::ActiveRequestCapReached {
                patient_id: request.patient_id.clone(),
            }
        }
        other => other,
    }
}

/// Moves an active request to `new_status`, stamping `fulfilled_at` when
/// it is fulfilled.
///
/// Callers validate the transition first; this only applies it if the
/// request is still active.
///
/// # Errors
///
/// - `PersistenceError::NotFound` if the request does not exist
/// - `PersistenceError::RequestNotActive` if it has already left `active`
pub fn set_sos_status(
    conn: &mut SqliteConnection,
    sos_request_id: i64,
    new_status: SosStatus,
    now: OffsetDateTime,
) -> Result<SosRequest, PersistenceError> {
    let now_text: String = timestamp_text(now)?;
    let fulfilled_at: Option<&str> =
        (new_status == SosStatus::Fulfilled).then_some(now_text.as_str());

    let updated: usize = diesel::update(
        sos_requests::table
            .filter(sos_requests::sos_request_id.eq(sos_request_id))
            .filter(sos_requests::status.eq(SosStatus::Active.as_str())),
    )
    .set((
        sos_requests::status.eq(new_status.as_str()),
        sos_requests::updated_at.eq(&now_text),
        sos_requests::fulfilled_at.eq(fulfilled_at),
    ))
    .execute(conn)?;

    let current: SosRequest = get_sos_request(conn, sos_request_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("SOS request {sos_request_id}")))?;

    if updated == 0 {
        return Err(PersistenceError::RequestNotActive {
            sos_request_id,
            status: current.status.to_string(),
        });
    }

    info!(sos_request_id, status = %new_status, "Updated SOS request status");
    Ok(current)
}

/// Deletes a request that nobody has responded to.
///
/// # Errors
///
/// - `PersistenceError::NotFound` if the request does not exist
/// - `PersistenceError::RequestHasResponses` if any donor has responded
pub fn delete_sos_request(
    conn: &mut SqliteConnection,
    sos_request_id: i64,
) -> Result<(), PersistenceError> {
    let deleted: usize = diesel::delete(
        sos_requests::table
            .filter(sos_requests::sos_request_id.eq(sos_request_id))
            .filter(sos_requests::response_count.eq(0)),
    )
    .execute(conn)?;

    if deleted == 0 {
        return match get_sos_request(conn, sos_request_id)? {
            None => Err(PersistenceError::NotFound(format!(
                "SOS request {sos_request_id}"
            ))),
            Some(_) => Err(PersistenceError::RequestHasResponses { sos_request_id }),
        };
    }

    info!(sos_request_id, "Deleted SOS request");
    Ok(())
}

/// Cancels every active request whose expiry is before `now`.
///
/// Each request is updated on its own; a failure is logged and recorded
/// in the report without stopping the sweep. Running it twice with the
/// same `now` processes nothing the second time.
///
/// # Errors
///
/// Returns an error only if the candidate list cannot be read.
pub fn expire_sweep(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<SweepReport, PersistenceError> {
    let now_text: String = timestamp_text(now)?;
    let candidates: Vec<i64> = list_expired_active_ids(conn, &now_text)?;
    let mut report: SweepReport = SweepReport::default();

    for sos_request_id in candidates {
        let result: Result<usize, DieselError> = diesel::update(
            sos_requests::table
                .filter(sos_requests::sos_request_id.eq(sos_request_id))
                .filter(sos_requests::status.eq(SosStatus::Active.as_str()))
                .filter(sos_requests::expires_at.lt(&now_text)),
        )
        .set((
            sos_requests::status.eq(SosStatus::Cancelled.as_str()),
            sos_requests::updated_at.eq(&now_text),
        ))
        .execute(conn);

        match result {
            Ok(0) => debug!(sos_request_id, "SOS request left active before sweep"),
            Ok(_) => report.processed += 1,
            Err(e) => {
                warn!(sos_request_id, error = %e, "Failed to expire SOS request");
                report.failed_ids.push(sos_request_id);
            }
        }
    }

    if report.processed > 0 || !report.failed_ids.is_empty() {
        info!(
            processed = report.processed,
            failed = report.failed_ids.len(),
            "Expiry sweep finished"
        );
    }
    Ok(report)
}
