// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SOS request queries.
//!
//! Listings are newest first; `sos_request_id` breaks ties between rows
//! created within the same second.

use diesel::prelude::*;
use diesel::SqliteConnection;
use lifeline_domain::{SosRequest, SosStatus};
use num_traits::ToPrimitive;
use tracing::debug;

use crate::data_models::{SosRequestRow, convert_rows};
use crate::diesel_schema::sos_requests;
use crate::error::PersistenceError;

/// Maximum number of rows returned by [`list_active`].
pub const ACTIVE_LIST_LIMIT: i64 = 100;

/// Retrieves an SOS request by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
/// Returns `Ok(None)` if the request does not exist.
pub fn get_sos_request(
    conn: &mut SqliteConnection,
    sos_request_id: i64,
) -> Result<Option<SosRequest>, PersistenceError> {
    let row: Option<SosRequestRow> = sos_requests::table
        .filter(sos_requests::sos_request_id.eq(sos_request_id))
        .select(SosRequestRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_sos_request: {e}")))?;

    row.map(SosRequest::try_from).transpose()
}

/// Lists every request created by a patient, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_by_patient(
    conn: &mut SqliteConnection,
    patient_id: &str,
) -> Result<Vec<SosRequest>, PersistenceError> {
    let rows: Vec<SosRequestRow> = sos_requests::table
        .filter(sos_requests::patient_id.eq(patient_id))
        .order((
            sos_requests::created_at.desc(),
            sos_requests::sos_request_id.desc(),
        ))
        .select(SosRequestRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_by_patient: {e}")))?;

    convert_rows(rows)
}

/// Lists active requests, newest first, capped at [`ACTIVE_LIST_LIMIT`].
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_active(conn: &mut SqliteConnection) -> Result<Vec<SosRequest>, PersistenceError> {
    let rows: Vec<SosRequestRow> = sos_requests::table
        .filter(sos_requests::status.eq(SosStatus::Active.as_str()))
        .order((
            sos_requests::created_at.desc(),
            sos_requests::sos_request_id.desc(),
        ))
        .limit(ACTIVE_LIST_LIMIT)
        .select(SosRequestRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_active: {e}")))?;

    debug!(count = rows.len(), "Loaded active SOS requests");

    convert_rows(rows)
}

/// Counts a patient's active requests.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_active_for_patient(
    conn: &mut SqliteConnection,
    patient_id: &str,
) -> Result<usize, PersistenceError> {
    let count: i64 = sos_requests::table
        .filter(sos_requests::patient_id.eq(patient_id))
        .filter(sos_requests::status.eq(SosStatus::Active.as_str()))
        .count()
        .get_result(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("count_active_for_patient: {e}")))?;

    count
        .to_usize()
        .ok_or_else(|| PersistenceError::QueryFailed(format!("invalid count {count}")))
}

/// Finds a patient's request by idempotency key.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn find_by_idempotency_key(
    conn: &mut SqliteConnection,
    patient_id: &str,
    idempotency_key: &str,
) -> Result<Option<SosRequest>, PersistenceError> {
    let row: Option<SosRequestRow> = sos_requests::table
        .filter(sos_requests::patient_id.eq(patient_id))
        .filter(sos_requests::idempotency_key.eq(idempotency_key))
        .select(SosRequestRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("find_by_idempotency_key: {e}")))?;

    row.map(SosRequest::try_from).transpose()
}

/// Lists ids of active requests whose expiry is strictly before `now`.
///
/// `now` must be in the canonical stored timestamp form.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_expired_active_ids(
    conn: &mut SqliteConnection,
    now: &str,
) -> Result<Vec<i64>, PersistenceError> {
    sos_requests::table
        .filter(sos_requests::status.eq(SosStatus::Active.as_str()))
        .filter(sos_requests::expires_at.lt(now))
        .order(sos_requests::sos_request_id.asc())
        .select(sos_requests::sos_request_id)
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_expired_active_ids: {e}")))
}
