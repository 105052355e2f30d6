// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SOS request and response operations.
//!
//! Every operation takes the authenticated actor and the current time
//! explicitly. Authorization is checked before any write.

use lifeline::{ContactAccess, request_contact_access, responder_contact_access};
use lifeline_domain::{
    DomainError, DonorProfile, NewSosRequest, ResponseStatus, SosRequest, SosRequestDraft,
    SosResponse, SosStatus, User, UserRole, check_active_request_cap, optional_text,
};
use lifeline_persistence::{PersistenceError, SqlitePersistence, SweepReport};
use std::str::FromStr;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::profiles::load_donor_profile;
use crate::request_response::{
    CreateSosRequest, RespondRequest, ResponseListResponse, SosRequestListResponse,
    SosRequestResponse, SosResponseInfo, SweepResponse, UpdateResponseStatusRequest,
};
use crate::views::{response_view, sos_request_view};

/// Loads a request or fails with `ResourceNotFound`.
pub(crate) fn load_sos_request(
    persistence: &mut SqlitePersistence,
    sos_request_id: i64,
) -> Result<SosRequest, ApiError> {
    persistence
        .get_sos_request(sos_request_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("SOS request"),
            message: format!("SOS request {sos_request_id} does not exist"),
        })
}

/// Loads the caller's user record or fails with `ResourceNotFound`.
pub(crate) fn load_actor_user(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
) -> Result<User, ApiError> {
    persistence
        .get_user(&actor.user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("User"),
            message: format!("User {} has not been synced", actor.user_id),
        })
}

/// Decides contact disclosure on `request` for `actor`.
pub(crate) fn contact_access_for(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: &SosRequest,
) -> Result<ContactAccess, ApiError> {
    let has_responded: bool = actor.role == UserRole::Donor
        && persistence
            .has_responded(request.id, &actor.user_id)
            .map_err(translate_persistence_error)?;
    Ok(request_contact_access(
        request,
        &actor.user_id,
        actor.role,
        has_responded,
    ))
}

// ============================================================================
// SOS requests
// ============================================================================

/// Raises a new SOS request for the calling patient.
///
/// A repeated call with an idempotency key already used by this patient
/// returns the original request unchanged.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not a patient
/// - The patient's user record has not been synced
/// - Any field fails validation
/// - The patient already has the maximum number of active requests
pub fn create_sos_request(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: CreateSosRequest,
    now: OffsetDateTime,
) -> Result<SosRequestResponse, ApiError> {
    AuthorizationService::authorize_create_sos(actor)?;
    load_actor_user(persistence, actor)?;

    let idempotency_key: Option<String> = optional_text(request.idempotency_key.as_deref());
    if let Some(existing) = find_by_idempotency_key(persistence, actor, idempotency_key.as_deref())? {
        info!(
            sos_request_id = existing.id,
            patient_id = %actor.user_id,
            "Returning existing SOS request for repeated idempotency key"
        );
        return sos_request_view(existing, ContactAccess::Owner, None, now);
    }

    let draft: SosRequestDraft = SosRequestDraft {
        blood_group: request.blood_group,
        units_needed: request.units_needed,
        urgency: request.urgency,
        hospital_name: request.hospital_name,
        hospital_address: request.hospital_address,
        latitude: request.latitude,
        longitude: request.longitude,
        contact_person: request.contact_person,
        contact_phone: request.contact_phone,
        medical_notes: request.medical_notes,
        idempotency_key,
    };
    let new_request: NewSosRequest =
        NewSosRequest::from_draft(&actor.user_id, draft, now).map_err(translate_domain_error)?;

    let active: usize = persistence
        .count_active_sos_requests(&actor.user_id)
        .map_err(translate_persistence_error)?;
    check_active_request_cap(active).map_err(translate_domain_error)?;

    let stored: SosRequest = match persistence.insert_sos_request(&new_request) {
        Ok(stored) => stored,
        Err(PersistenceError::DuplicateIdempotencyKey(key)) => {
            // Lost a race with a concurrent retry carrying the same key.
            find_by_idempotency_key(persistence, actor, Some(&key))?.ok_or_else(|| {
                ApiError::Internal {
                    message: format!("Idempotency key '{key}' conflicted but no request was found"),
                }
            })?
        }
        Err(e) => return Err(translate_persistence_error(e)),
    };

    sos_request_view(stored, ContactAccess::Owner, None, now)
}

fn find_by_idempotency_key(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    idempotency_key: Option<&str>,
) -> Result<Option<SosRequest>, ApiError> {
    let Some(key) = idempotency_key else {
        return Ok(None);
    };
    persistence
        .find_sos_request_by_idempotency_key(&actor.user_id, key)
        .map_err(translate_persistence_error)
}

/// Returns one request. Contact details are included only for the
/// patient, admins, and donors who have responded.
///
/// # Errors
///
/// Returns an error if the request does not exist.
pub fn get_sos_request(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sos_request_id: i64,
    now: OffsetDateTime,
) -> Result<SosRequestResponse, ApiError> {
    let request: SosRequest = load_sos_request(persistence, sos_request_id)?;
    let access: ContactAccess = contact_access_for(persistence, actor, &request)?;
    debug!(sos_request_id, viewer = %actor.user_id, ?access, "Viewing SOS request");
    sos_request_view(request, access, None, now)
}

/// Lists the caller's own requests, newest first.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn list_my_sos_requests(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<SosRequestListResponse, ApiError> {
    let requests: Vec<SosRequest> = persistence
        .list_sos_requests_by_patient(&actor.user_id)
        .map_err(translate_persistence_error)?;
    let requests: Vec<SosRequestResponse> = requests
        .into_iter()
        .map(|request| sos_request_view(request, ContactAccess::Owner, None, now))
        .collect::<Result<_, _>>()?;
    Ok(SosRequestListResponse { requests })
}

/// Lists every active request, newest first. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the store cannot be read.
pub fn list_active_sos_requests(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<SosRequestListResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "list_active_sos_requests")?;
    let requests: Vec<SosRequest> = persistence
        .list_active_sos_requests()
        .map_err(translate_persistence_error)?;
    let requests: Vec<SosRequestResponse> = requests
        .into_iter()
        .map(|request| sos_request_view(request, ContactAccess::Admin, None, now))
        .collect::<Result<_, _>>()?;
    Ok(SosRequestListResponse { requests })
}

/// Marks the caller's request fulfilled.
///
/// # Errors
///
/// Returns an error if the request does not exist, belongs to someone
/// else, or is no longer active.
pub fn fulfill_sos_request(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sos_request_id: i64,
    now: OffsetDateTime,
) -> Result<SosRequestResponse, ApiError> {
    transition_sos_request(persistence, actor, sos_request_id, SosStatus::Fulfilled, now)
}

/// Cancels the caller's request.
///
/// # Errors
///
/// Returns an error if the request does not exist, belongs to someone
/// else, or is no longer active.
pub fn cancel_sos_request(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sos_request_id: i64,
    now: OffsetDateTime,
) -> Result<SosRequestResponse, ApiError> {
    transition_sos_request(persistence, actor, sos_request_id, SosStatus::Cancelled, now)
}

fn transition_sos_request(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sos_request_id: i64,
    new_status: SosStatus,
    now: OffsetDateTime,
) -> Result<SosRequestResponse, ApiError> {
    let request: SosRequest = load_sos_request(persistence, sos_request_id)?;
    AuthorizationService::authorize_request_owner(actor, &request, "update_sos_status")?;
    request
        .status
        .validate_transition(new_status)
        .map_err(translate_domain_error)?;

    let updated: SosRequest = persistence
        .set_sos_status(sos_request_id, new_status, now)
        .map_err(translate_persistence_error)?;
    sos_request_view(updated, ContactAccess::Owner, None, now)
}

/// Deletes the caller's request while nobody has responded to it.
///
/// # Errors
///
/// Returns an error if the request does not exist, belongs to someone
/// else, or already has responses.
pub fn delete_sos_request(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sos_request_id: i64,
) -> Result<(), ApiError> {
    let request: SosRequest = load_sos_request(persistence, sos_request_id)?;
    AuthorizationService::authorize_request_owner(actor, &request, "delete_sos_request")?;
    if !request.is_deletable() {
        return Err(ApiError::InvalidState {
            rule: String::from("request_deletable"),
            message: format!(
                "SOS request {sos_request_id} has {} responses and cannot be deleted",
                request.response_count
            ),
        });
    }
    persistence
        .delete_sos_request(sos_request_id)
        .map_err(translate_persistence_error)
}

/// Cancels every active request past its expiry. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the sweep cannot start.
pub fn run_expiry_sweep(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<SweepResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "run_expiry_sweep")?;
    let report: SweepReport = persistence
        .expire_sweep(now)
        .map_err(translate_persistence_error)?;
    if !report.failed_ids.is_empty() {
        warn!(failed_ids = ?report.failed_ids, "Expiry sweep left requests active");
    }
    Ok(SweepResponse {
        processed: report.processed,
        failed_ids: report.failed_ids,
    })
}

// ============================================================================
// SOS responses
// ============================================================================

/// Records the calling donor's response to a request.
///
/// The donor must have a profile and currently satisfy every eligibility
/// rule. A request past its expiry time is treated as closed even before
/// the sweep has cancelled it.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not a donor, or has no donor profile
/// - The donor is not eligible
/// - The request does not exist, is not active, or has expired
/// - The donor has already responded
pub fn respond_to_sos(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sos_request_id: i64,
    request: RespondRequest,
    now: OffsetDateTime,
) -> Result<SosResponseInfo, ApiError> {
    AuthorizationService::authorize_donor(actor, "respond_to_sos")?;
    let profile: DonorProfile = load_donor_profile(persistence, &actor.user_id)?;
    let reasons: Vec<String> = profile.ineligibility_reasons(now);
    if !reasons.is_empty() {
        return Err(translate_domain_error(DomainError::DonorNotEligible {
            reasons,
        }));
    }

    let sos_request: SosRequest = load_sos_request(persistence, sos_request_id)?;
    if sos_request.is_active() && sos_request.is_expired(now) {
        return Err(ApiError::InvalidState {
            rule: String::from("request_active"),
            message: format!("SOS request {sos_request_id} has expired"),
        });
    }

    let message: Option<String> = optional_text(request.message.as_deref());
    let response: SosResponse = persistence
        .respond(sos_request_id, &actor.user_id, message.as_deref(), now)
        .map_err(translate_persistence_error)?;

    let donor: Option<User> = persistence
        .get_user(&actor.user_id)
        .map_err(translate_persistence_error)?;
    response_view(response, donor)
}

/// Lists the responses to a request with donor contact details. Patient
/// and admin only.
///
/// # Errors
///
/// Returns an error if the request does not exist or the caller may not
/// manage it.
pub fn list_responses_for_sos(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sos_request_id: i64,
) -> Result<ResponseListResponse, ApiError> {
    let request: SosRequest = load_sos_request(persistence, sos_request_id)?;
    if !responder_contact_access(&request, &actor.user_id, actor.role).is_granted() {
        return Err(ApiError::Forbidden {
            action: String::from("list_responses"),
            message: format!("SOS request {sos_request_id} belongs to another patient"),
        });
    }

    let rows: Vec<(SosResponse, User)> = persistence
        .list_responses_for_request(sos_request_id)
        .map_err(translate_persistence_error)?;
    let responses: Vec<SosResponseInfo> = rows
        .into_iter()
        .map(|(response, donor)| response_view(response, Some(donor)))
        .collect::<Result<_, _>>()?;
    Ok(ResponseListResponse { responses })
}

/// Returns the caller's response to a request.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the caller has not responded.
pub fn get_my_response_for_sos(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sos_request_id: i64,
) -> Result<SosResponseInfo, ApiError> {
    let response: SosResponse = persistence
        .get_response_for_donor(sos_request_id, &actor.user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("SOS response"),
            message: format!("No response to SOS request {sos_request_id}"),
        })?;
    response_view(response, None)
}

/// Lists the caller's responses, newest first.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn list_my_responses(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
) -> Result<ResponseListResponse, ApiError> {
    let responses: Vec<SosResponseInfo> = persistence
        .list_responses_for_donor(&actor.user_id)
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|response| response_view(response, None))
        .collect::<Result<_, _>>()?;
    Ok(ResponseListResponse { responses })
}

/// Moves a response to a new status. Patient of the request or admin.
///
/// # Errors
///
/// Returns an error if the status is unknown, the response or request does
/// not exist, the caller may not manage the request, or the transition is
/// not allowed.
pub fn update_response_status(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sos_response_id: i64,
    request: &UpdateResponseStatusRequest,
    now: OffsetDateTime,
) -> Result<SosResponseInfo, ApiError> {
    let new_status: ResponseStatus =
        ResponseStatus::from_str(request.status.trim()).map_err(translate_domain_error)?;
    let response: SosResponse = persistence
        .get_response(sos_response_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("SOS response"),
            message: format!("SOS response {sos_response_id} does not exist"),
        })?;
    let sos_request: SosRequest = load_sos_request(persistence, response.sos_request_id)?;
    AuthorizationService::authorize_request_manager(actor, &sos_request, "update_response_status")?;

    response
        .status
        .validate_transition(new_status)
        .map_err(translate_domain_error)?;

    let updated: SosResponse = persistence
        .update_response_status(sos_response_id, response.status, new_status, now)
        .map_err(translate_persistence_error)?;
    let donor: Option<User> = persistence
        .get_user(&updated.donor_id)
        .map_err(translate_persistence_error)?;
    response_view(updated, donor)
}

/// Withdraws the caller's own response while it is neither confirmed nor
/// completed.
///
/// # Errors
///
/// Returns an error if the response does not exist, belongs to another
/// donor, or is locked.
pub fn withdraw_response(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sos_response_id: i64,
) -> Result<(), ApiError> {
    persistence
        .delete_response(sos_response_id, &actor.user_id)
        .map_err(translate_persistence_error)
}
