// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Proximity search operations.

use lifeline::{
    BloodBankCandidate, BloodBankMatch, ContactAccess, DEFAULT_BLOOD_BANK_RADIUS_KM,
    DEFAULT_RADIUS_KM, DonorCandidate, DonorMatch, RequestMatch, find_blood_banks_near,
    find_donors_for_request, find_requests_for_donor,
};
use lifeline_domain::{BloodBankProfile, Coordinates, DonorProfile, SosRequest, User};
use lifeline_persistence::SqlitePersistence;
use time::OffsetDateTime;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::handlers::{contact_access_for, load_actor_user, load_sos_request};
use crate::profiles::load_donor_profile;
use crate::request_response::{
    BloodBankMatchInfo, BloodBankMatchListResponse, DonorMatchInfo, DonorMatchListResponse,
    NearbyQuery, SosRequestListResponse, SosRequestResponse,
};
use crate::views::sos_request_view;

/// Uses the query's coordinates when given, else the caller's stored
/// location.
fn resolve_origin(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    query: &NearbyQuery,
) -> Result<Coordinates, ApiError> {
    if query.latitude.is_some() || query.longitude.is_some() {
        return Coordinates::from_parts(query.latitude, query.longitude)
            .map_err(translate_domain_error);
    }
    load_actor_user(persistence, actor)?
        .location
        .ok_or_else(|| ApiError::InvalidInput {
            field: String::from("location"),
            message: String::from("No coordinates supplied and no stored location"),
        })
}

/// Finds active requests the calling donor can serve, most urgent first,
/// then nearest.
///
/// # Errors
///
/// Returns an error if the actor is not a donor, has no profile, has no
/// usable location, or the radius is invalid.
pub fn find_nearby_requests(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    query: &NearbyQuery,
    now: OffsetDateTime,
) -> Result<SosRequestListResponse, ApiError> {
    AuthorizationService::authorize_donor(actor, "find_nearby_requests")?;
    let profile: DonorProfile = load_donor_profile(persistence, &actor.user_id)?;
    let origin: Coordinates = resolve_origin(persistence, actor, query)?;
    let radius_km: f64 = query.radius_km.unwrap_or(DEFAULT_RADIUS_KM);

    let active: Vec<SosRequest> = persistence
        .list_active_sos_requests()
        .map_err(translate_persistence_error)?;
    let matches: Vec<RequestMatch> =
        find_requests_for_donor(&origin, profile.blood_group, radius_km, active)
            .map_err(translate_core_error)?;

    let mut requests: Vec<SosRequestResponse> = Vec::with_capacity(matches.len());
    for matched in matches {
        let access: ContactAccess = contact_access_for(persistence, actor, &matched.request)?;
        requests.push(sos_request_view(
            matched.request,
            access,
            Some(matched.distance_km),
            now,
        )?);
    }
    Ok(SosRequestListResponse { requests })
}

/// Finds available compatible donors near a request, nearest first.
/// Patient of the request or admin.
///
/// Donor contact details are not included; they are disclosed only once a
/// donor responds.
///
/// # Errors
///
/// Returns an error if the request does not exist, the caller may not
/// manage it, or the radius is invalid.
pub fn find_donors_for_sos(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    sos_request_id: i64,
    query: &NearbyQuery,
) -> Result<DonorMatchListResponse, ApiError> {
    let request: SosRequest = load_sos_request(persistence, sos_request_id)?;
    AuthorizationService::authorize_request_manager(actor, &request, "find_donors_for_sos")?;
    let radius_km: f64 = query.radius_km.unwrap_or(DEFAULT_RADIUS_KM);

    let candidates: Vec<DonorCandidate> = persistence
        .list_available_donors()
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|(profile, user)| DonorCandidate { profile, user })
        .collect();
    let matches: Vec<DonorMatch> =
        find_donors_for_request(&request.location, request.blood_group, radius_km, candidates)
            .map_err(translate_core_error)?;

    let donors: Vec<DonorMatchInfo> = matches
        .into_iter()
        .map(|matched| {
            let profile: DonorProfile = matched.candidate.profile;
            let user: User = matched.candidate.user;
            DonorMatchInfo {
                donor_id: user.id,
                name: user.name,
                blood_group: profile.blood_group.as_str().to_string(),
                donation_count: profile.donation_count,
                level: profile.stats().level.label().to_string(),
                distance_km: matched.distance_km,
            }
        })
        .collect();
    Ok(DonorMatchListResponse { donors })
}

/// Finds blood banks near the caller, nearest first.
///
/// # Errors
///
/// Returns an error if no usable location is available or the radius is
/// invalid.
pub fn find_nearby_blood_banks(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    query: &NearbyQuery,
) -> Result<BloodBankMatchListResponse, ApiError> {
    let origin: Coordinates = resolve_origin(persistence, actor, query)?;
    let radius_km: f64 = query.radius_km.unwrap_or(DEFAULT_BLOOD_BANK_RADIUS_KM);
    let verified_only: bool = query.verified_only.unwrap_or(false);

    let candidates: Vec<BloodBankCandidate> = persistence
        .list_blood_banks()
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|(profile, user)| BloodBankCandidate { profile, user })
        .collect();
    let matches: Vec<BloodBankMatch> =
        find_blood_banks_near(&origin, radius_km, verified_only, candidates)
            .map_err(translate_core_error)?;

    let blood_banks: Vec<BloodBankMatchInfo> = matches
        .into_iter()
        .filter_map(|matched| {
            let location: Coordinates = matched.candidate.user.location?;
            let profile: BloodBankProfile = matched.candidate.profile;
            Some(BloodBankMatchInfo {
                user_id: profile.user_id,
                organization_name: profile.organization_name,
                operating_hours: profile.operating_hours,
                contact_phone: profile.contact_phone,
                website: profile.website,
                address: matched.candidate.user.address,
                latitude: location.latitude(),
                longitude: location.longitude(),
                is_verified: profile.is_verified,
                distance_km: matched.distance_km,
            })
        })
        .collect();
    Ok(BloodBankMatchListResponse { blood_banks })
}
