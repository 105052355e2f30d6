// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SOS response queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use lifeline_domain::{SosResponse, User};

use crate::data_models::{SosResponseRow, UserRow, convert_rows};
use crate::diesel_schema::{sos_responses, users};
use crate::error::PersistenceError;

/// Retrieves a response by id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
/// Returns `Ok(None)` if the response does not exist.
pub fn get_response(
    conn: &mut SqliteConnection,
    sos_response_id: i64,
) -> Result<Option<SosResponse>, PersistenceError> {
    let row: Option<SosResponseRow> = sos_responses::table
        .filter(sos_responses::sos_response_id.eq(sos_response_id))
        .select(SosResponseRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_response: {e}")))?;

    row.map(SosResponse::try_from).transpose()
}

/// Retrieves a donor's response to a request.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn get_for_request_and_donor(
    conn: &mut SqliteConnection,
    sos_request_id: i64,
    donor_id: &str,
) -> Result<Option<SosResponse>, PersistenceError> {
    let row: Option<SosResponseRow> = sos_responses::table
        .filter(sos_responses::sos_request_id.eq(sos_request_id))
        .filter(sos_responses::donor_id.eq(donor_id))
        .select(SosResponseRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_for_request_and_donor: {e}")))?;

    row.map(SosResponse::try_from).transpose()
}

/// Returns true if the donor has responded to the request.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn has_responded(
    conn: &mut SqliteConnection,
    sos_request_id: i64,
    donor_id: &str,
) -> Result<bool, PersistenceError> {
    diesel::select(diesel::dsl::exists(
        sos_responses::table
            .filter(sos_responses::sos_request_id.eq(sos_request_id))
            .filter(sos_responses::donor_id.eq(donor_id)),
    ))
    .get_result(conn)
    .map_err(|e| PersistenceError::QueryFailed(format!("has_responded: {e}")))
}

/// Lists the responses to a request with each donor's user record,
/// newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_by_request(
    conn: &mut SqliteConnection,
    sos_request_id: i64,
) -> Result<Vec<(SosResponse, User)>, PersistenceError> {
    let rows: Vec<(SosResponseRow, UserRow)> = sos_responses::table
        .inner_join(users::table.on(users::user_id.eq(sos_responses::donor_id)))
        .filter(sos_responses::sos_request_id.eq(sos_request_id))
        .order((
            sos_responses::responded_at.desc(),
            sos_responses::sos_response_id.desc(),
        ))
        .select((SosResponseRow::as_select(), UserRow::as_select()))
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_by_request: {e}")))?;

    rows.into_iter()
        .map(|(response, user)| Ok((SosResponse::try_from(response)?, User::try_from(user)?)))
        .collect()
}

/// Lists a donor's responses, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_by_donor(
    conn: &mut SqliteConnection,
    donor_id: &str,
) -> Result<Vec<SosResponse>, PersistenceError> {
    let rows: Vec<SosResponseRow> = sos_responses::table
        .filter(sos_responses::donor_id.eq(donor_id))
        .order((
            sos_responses::responded_at.desc(),
            sos_responses::sos_response_id.desc(),
        ))
        .select(SosResponseRow::as_select())
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_by_donor: {e}")))?;

    convert_rows(rows)
}
