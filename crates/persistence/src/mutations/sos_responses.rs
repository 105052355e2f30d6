// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SOS response writes.

use diesel::prelude::*;
use diesel::SqliteConnection;
use lifeline_domain::{ResponseStatus, SosResponse, SosStatus};
use time::OffsetDateTime;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::data_models::timestamp_text;
use crate::diesel_schema::{sos_requests, sos_responses};
use crate::error::{PersistenceError, is_unique_violation};
use crate::queries::sos_requests::get_sos_request;
use crate::queries::sos_responses::{get_response, has_responded};

/// Records a donor's response to an active request.
///
/// The duplicate check, the `response_count` increment and the insert run
/// in one immediate transaction, so the count always equals the number of
/// responses ever accepted.
///
/// # Errors
///
/// - `PersistenceError::DuplicateResponse` if the donor already responded
/// - `PersistenceError::NotFound` if the request does not exist
/// - `PersistenceError::RequestNotActive` if the request is not active
pub fn respond(
    conn: &mut SqliteConnection,
    sos_request_id: i64,
    donor_id: &str,
    message: Option<&str>,
    now: OffsetDateTime,
) -> Result<SosResponse, PersistenceError> {
    let now_text: String = timestamp_text(now)?;
    let duplicate = || PersistenceError::DuplicateResponse {
        sos_request_id,
        donor_id: donor_id.to_string(),
    };

    let response: SosResponse = conn.immediate_transaction(|conn| {
        if has_responded(conn, sos_request_id, donor_id)? {
            return Err(duplicate());
        }

        let incremented: usize = diesel::update(
            sos_requests::table
                .filter(sos_requests::sos_request_id.eq(sos_request_id))
                .filter(sos_requests::status.eq(SosStatus::Active.as_str())),
        )
        .set((
            sos_requests::response_count.eq(sos_requests::response_count + 1),
            sos_requests::updated_at.eq(&now_text),
        ))
        .execute(conn)?;

        if incremented == 0 {
            return match get_sos_request(conn, sos_request_id)? {
                None => Err(PersistenceError::NotFound(format!(
                    "SOS request {sos_request_id}"
                ))),
                Some(request) => Err(PersistenceError::RequestNotActive {
                    sos_request_id,
                    status: request.status.to_string(),
                }),
            };
        }

        diesel::insert_into(sos_responses::table)
            .values((
                sos_responses::sos_request_id.eq(sos_request_id),
                sos_responses::donor_id.eq(donor_id),
                sos_responses::status.eq(ResponseStatus::Interested.as_str()),
                sos_responses::message.eq(message),
                sos_responses::responded_at.eq(&now_text),
                sos_responses::updated_at.eq(&now_text),
            ))
            .execute(conn)
            .map_err(|e| {
                if is_unique_violation(&e) {
                    duplicate()
                } else {
                    PersistenceError::from(e)
                }
            })?;

        let sos_response_id: i64 = get_last_insert_rowid(conn)?;
        get_response(conn, sos_response_id)?
            .ok_or_else(|| PersistenceError::NotFound(format!("SOS response {sos_response_id}")))
    })?;

    info!(
        sos_response_id = response.id,
        sos_request_id,
        donor_id,
        "Recorded SOS response"
    );
    Ok(response)
}

/// Moves a response from `from` to `to` if it is still in `from`.
///
/// Confirming stamps `confirmed_at`; completing stamps `completed_at`.
///
/// # Errors
///
/// - `PersistenceError::NotFound` if the response does not exist
/// - `PersistenceError::ConcurrentModification` if its status is no longer
///   `from`
pub fn update_response_status(
    conn: &mut SqliteConnection,
    sos_response_id: i64,
    from: ResponseStatus,
    to: ResponseStatus,
    now: OffsetDateTime,
) -> Result<SosResponse, PersistenceError> {
    let now_text: String = timestamp_text(now)?;
    let target = sos_responses::table
        .filter(sos_responses::sos_response_id.eq(sos_response_id))
        .filter(sos_responses::status.eq(from.as_str()));

    let updated: usize = match to {
        ResponseStatus::Confirmed => diesel::update(target)
            .set((
                sos_responses::status.eq(to.as_str()),
                sos_responses::confirmed_at.eq(&now_text),
                sos_responses::updated_at.eq(&now_text),
            ))
            .execute(conn)?,
        ResponseStatus::Completed => diesel::update(target)
            .set((
                sos_responses::status.eq(to.as_str()),
                sos_responses::completed_at.eq(&now_text),
                sos_responses::updated_at.eq(&now_text),
            ))
            .execute(conn)?,
        ResponseStatus::Interested | ResponseStatus::Declined => diesel::update(target)
            .set((
                sos_responses::status.eq(to.as_str()),
                sos_responses::updated_at.eq(&now_text),
            ))
            .execute(conn)?,
    };

    let current: SosResponse = get_response(conn, sos_response_id)?
        .ok_or_else(|| PersistenceError::NotFound(format!("SOS response {sos_response_id}")))?;

    if updated == 0 {
        return Err(PersistenceError::ConcurrentModification(format!(
            "SOS response {sos_response_id} is {}, expected {from}",
            current.status
        )));
    }

    info!(sos_response_id, from = %from, to = %to, "Updated SOS response status");
    Ok(current)
}

/// Withdraws a donor's own response.
///
/// Confirmed and completed responses are kept. The request's
/// `response_count` is not decremented.
///
/// # Errors
///
/// - `PersistenceError::NotFound` if the response does not exist
/// - `PersistenceError::ResponseNotOwned` if another donor owns it
/// - `PersistenceError::ResponseLocked` if it is confirmed or completed
pub fn delete_response(
    conn: &mut SqliteConnection,
    sos_response_id: i64,
    donor_id: &str,
) -> Result<(), PersistenceError> {
    conn.immediate_transaction(|conn| {
        let response: SosResponse = get_response(conn, sos_response_id)?.ok_or_else(|| {
            PersistenceError::NotFound(format!("SOS response {sos_response_id}"))
        })?;

        if !response.is_owned_by(donor_id) {
            return Err(PersistenceError::ResponseNotOwned { sos_response_id });
        }
        if !response.status.is_withdrawable() {
            return Err(PersistenceError::ResponseLocked {
                sos_response_id,
                status: response.status.to_string(),
            });
        }

        diesel::delete(
            sos_responses::table
                .filter(sos_responses::sos_response_id.eq(sos_response_id))
                .filter(sos_responses::status.eq(response.status.as_str())),
        )
        .execute(conn)?;
        Ok(())
    })?;

    info!(sos_response_id, donor_id, "Withdrew SOS response");
    Ok(())
}
