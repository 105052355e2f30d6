// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Proximity matching between donors, SOS requests and blood banks.
//!
//! Every matcher takes its candidate set as input and performs no I/O.
//! Candidates are filtered by blood group compatibility and by
//! great-circle distance, then sorted.

use crate::error::CoreError;
use lifeline_domain::{
    BloodBankProfile, BloodGroup, Coordinates, DonorProfile, SosRequest, User,
    compatible_recipients_for, is_compatible, validate_radius,
};
use std::cmp::Ordering;
use tracing::debug;

/// Default search radius for donor and request matching, in kilometres.
pub const DEFAULT_RADIUS_KM: f64 = 25.0;

/// Default search radius for nearby blood banks, in kilometres.
pub const DEFAULT_BLOOD_BANK_RADIUS_KM: f64 = 50.0;

/// Largest accepted search radius, in kilometres.
pub const MAX_RADIUS_KM: f64 = 500.0;

/// An SOS request within reach of a donor.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestMatch {
    pub request: SosRequest,
    pub distance_km: f64,
}

/// A donor profile with the reference data needed to match it.
#[derive(Debug, Clone, PartialEq)]
pub struct DonorCandidate {
    pub profile: DonorProfile,
    pub user: User,
}

/// A donor within reach of an SOS request.
#[derive(Debug, Clone, PartialEq)]
pub struct DonorMatch {
    pub candidate: DonorCandidate,
    pub distance_km: f64,
}

/// A blood bank profile with the reference data needed to match it.
#[derive(Debug, Clone, PartialEq)]
pub struct BloodBankCandidate {
    pub profile: BloodBankProfile,
    pub user: User,
}

/// A blood bank within reach of a location.
#[derive(Debug, Clone, PartialEq)]
pub struct BloodBankMatch {
    pub candidate: BloodBankCandidate,
    pub distance_km: f64,
}

/// Finds active SOS requests a donor can serve.
///
/// Keeps requests whose blood group can receive from `donor_group` and
/// whose location lies within `radius_km` of the donor. Results are sorted
/// by urgency (critical first), then by distance.
///
/// # Errors
///
/// Returns an error if the radius is not a positive distance up to
/// [`MAX_RADIUS_KM`].
pub fn find_requests_for_donor(
    donor_location: &Coordinates,
    donor_group: BloodGroup,
    radius_km: f64,
    active_requests: Vec<SosRequest>,
) -> Result<Vec<RequestMatch>, CoreError> {
    let radius_km: f64 = validate_radius(radius_km, MAX_RADIUS_KM)?;
    let recipients: &[BloodGroup] = compatible_recipients_for(donor_group);
    let considered: usize = active_requests.len();

    let mut matches: Vec<RequestMatch> = active_requests
        .into_iter()
        .filter(|request| request.is_active() && recipients.contains(&request.blood_group))
        .filter_map(|request| {
            let distance_km: f64 = donor_location.distance_to(&request.location);
            (distance_km <= radius_km).then_some(RequestMatch {
                request,
                distance_km,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        a.request
            .urgency
            .rank()
            .cmp(&b.request.urgency.rank())
            .then_with(|| a.distance_km.total_cmp(&b.distance_km))
            .then_with(|| b.request.created_at.cmp(&a.request.created_at))
    });

    debug!(
        donor_group = %donor_group,
        radius_km,
        considered,
        matched = matches.len(),
        "Matched SOS requests for donor"
    );

    Ok(matches)
}

/// Finds available donors who can give to a request.
///
/// Donors must be available, have a known location, carry a blood group
/// compatible with `request_group`, and be within `radius_km`. Results are
/// nearest first.
///
/// # Errors
///
/// Returns an error if the radius is not a positive distance up to
/// [`MAX_RADIUS_KM`].
pub fn find_donors_for_request(
    request_location: &Coordinates,
    request_group: BloodGroup,
    radius_km: f64,
    candidates: Vec<DonorCandidate>,
) -> Result<Vec<DonorMatch>, CoreError> {
    let radius_km: f64 = validate_radius(radius_km, MAX_RADIUS_KM)?;
    let considered: usize = candidates.len();

    let mut matches: Vec<DonorMatch> = candidates
        .into_iter()
        .filter(|candidate| {
            candidate.profile.is_available
                && is_compatible(candidate.profile.blood_group, request_group)
        })
        .filter_map(|candidate| {
            let location: Coordinates = candidate.user.location?;
            let distance_km: f64 = request_location.distance_to(&location);
            (distance_km <= radius_km).then_some(DonorMatch {
                candidate,
                distance_km,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        by_distance_then_id(
            a.distance_km,
            b.distance_km,
            &a.candidate.user.id,
            &b.candidate.user.id,
        )
    });

    debug!(
        request_group = %request_group,
        radius_km,
        considered,
        matched = matches.len(),
        "Matched donors for SOS request"
    );

    Ok(matches)
}

/// Finds blood banks near a location, nearest first.
///
/// Blood banks without a known location are skipped. When
/// `verified_only` is set, unverified blood banks are skipped too.
///
/// # Errors
///
/// Returns an error if the radius is not a positive distance up to
/// [`MAX_RADIUS_KM`].
pub fn find_blood_banks_near(
    location: &Coordinates,
    radius_km: f64,
    verified_only: bool,
    candidates: Vec<BloodBankCandidate>,
) -> Result<Vec<BloodBankMatch>, CoreError> {
    let radius_km: f64 = validate_radius(radius_km, MAX_RADIUS_KM)?;

    let mut matches: Vec<BloodBankMatch> = candidates
        .into_iter()
        .filter(|candidate| !verified_only || candidate.profile.is_verified)
        .filter_map(|candidate| {
            let bank_location: Coordinates = candidate.user.location?;
            let distance_km: f64 = location.distance_to(&bank_location);
            (distance_km <= radius_km).then_some(BloodBankMatch {
                candidate,
                distance_km,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        by_distance_then_id(
            a.distance_km,
            b.distance_km,
            &a.candidate.user.id,
            &b.candidate.user.id,
        )
    });

    Ok(matches)
}

fn by_distance_then_id(a_km: f64, b_km: f64, a_id: &str, b_id: &str) -> Ordering {
    a_km.total_cmp(&b_km).then_with(|| a_id.cmp(b_id))
}
