// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User sync, donor profile and blood bank profile operations.

use lifeline_domain::{
    BloodBankProfile, BloodGroup, Coordinates, DomainError, DonorProfile, User, UserRole,
    optional_text, parse_optional_timestamp, validate_blood_bank_profile,
    validate_donor_measurements, validate_user_fields,
};
use lifeline_persistence::{PersistenceError, SqlitePersistence};
use std::str::FromStr;
use time::OffsetDateTime;
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::handlers::load_actor_user;
use crate::request_response::{
    AvailabilityRequest, BloodBankProfileRequest, BloodBankProfileResponse, DonorProfileRequest,
    DonorProfileResponse, RecordDonationRequest, SyncUserRequest, UserResponse,
    VerifyBloodBankRequest,
};
use crate::views::{blood_bank_view, donor_profile_view, user_view};

/// Loads a donor profile or fails with `ResourceNotFound`.
pub(crate) fn load_donor_profile(
    persistence: &mut SqlitePersistence,
    user_id: &str,
) -> Result<DonorProfile, ApiError> {
    persistence
        .get_donor_profile(user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Donor profile"),
            message: format!("User {user_id} has no donor profile"),
        })
}

fn load_blood_bank_profile(
    persistence: &mut SqlitePersistence,
    user_id: &str,
) -> Result<BloodBankProfile, ApiError> {
    persistence
        .get_blood_bank_profile(user_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Blood bank profile"),
            message: format!("User {user_id} has no blood bank profile"),
        })
}

/// Rejects timestamps later than `now`.
fn not_in_future(
    field: &str,
    value: Option<OffsetDateTime>,
    now: OffsetDateTime,
) -> Result<Option<OffsetDateTime>, ApiError> {
    match value {
        Some(at) if at > now => Err(ApiError::InvalidInput {
            field: field.to_string(),
            message: String::from("Date must not be in the future"),
        }),
        other => Ok(other),
    }
}

// ============================================================================
// Users
// ============================================================================

/// Stores the caller's identity-provider data.
///
/// The role always comes from the identity assertion, never from the body.
/// A location is stored only when both coordinates are supplied.
///
/// # Errors
///
/// Returns an error if a required field is blank or the location is
/// incomplete or out of range.
pub fn sync_user(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: SyncUserRequest,
    now: OffsetDateTime,
) -> Result<UserResponse, ApiError> {
    let location: Option<Coordinates> = match (request.latitude, request.longitude) {
        (None, None) => None,
        (latitude, longitude) => Some(
            Coordinates::from_parts(latitude, longitude).map_err(translate_domain_error)?,
        ),
    };
    let user: User = User {
        id: actor.user_id.clone(),
        name: request.name.trim().to_string(),
        email: request.email.trim().to_string(),
        phone: optional_text(request.phone.as_deref()),
        role: actor.role,
        location,
        address: optional_text(request.address.as_deref()),
        is_verified: false,
    };
    validate_user_fields(&user).map_err(translate_domain_error)?;

    persistence
        .upsert_user(&user, now)
        .map_err(translate_persistence_error)?;
    info!(user_id = %user.id, role = %user.role, "Synced user");

    load_actor_user(persistence, actor).map(user_view)
}

// ============================================================================
// Donor profiles
// ============================================================================

/// Returns the caller's donor profile with eligibility and stats.
///
/// # Errors
///
/// Returns an error if the actor is not a donor or has no profile.
pub fn get_donor_profile(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    now: OffsetDateTime,
) -> Result<DonorProfileResponse, ApiError> {
    AuthorizationService::authorize_donor(actor, "get_donor_profile")?;
    let profile: DonorProfile = load_donor_profile(persistence, &actor.user_id)?;
    donor_profile_view(profile, now)
}

/// Creates or updates the caller's donor profile.
///
/// Eligibility is re-evaluated on every save; an ineligible donor is
/// stored as unavailable. `last_donation_at` only moves forward; an
/// omitted or older value keeps the stored one.
/// The donation count is never changed here.
///
/// # Errors
///
/// Returns an error if the actor is not a donor, has not been synced, or
/// any field is invalid.
pub fn save_donor_profile(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: DonorProfileRequest,
    now: OffsetDateTime,
) -> Result<DonorProfileResponse, ApiError> {
    AuthorizationService::authorize_donor(actor, "save_donor_profile")?;
    load_actor_user(persistence, actor)?;

    let blood_group: BloodGroup = match request.blood_group.as_deref().map(str::trim) {
        None | Some("") => return Err(translate_domain_error(DomainError::MissingBloodGroup)),
        Some(label) => BloodGroup::from_str(label).map_err(translate_domain_error)?,
    };
    validate_donor_measurements(request.age, request.weight_kg).map_err(translate_domain_error)?;
    let last_donation_at: Option<OffsetDateTime> = not_in_future(
        "last_donation_at",
        parse_optional_timestamp(request.last_donation_at.as_deref())
            .map_err(translate_domain_error)?,
        now,
    )?;

    let existing: Option<DonorProfile> = persistence
        .get_donor_profile(&actor.user_id)
        .map_err(translate_persistence_error)?;

    let profile: DonorProfile = match existing {
        Some(mut profile) => {
            profile.blood_group = blood_group;
            profile.age = request.age;
            profile.weight_kg = request.weight_kg;
            profile.last_donation_at = profile.last_donation_at.max(last_donation_at);
            if let Some(enabled) = request.notifications_enabled {
                profile.notifications_enabled = enabled;
            }
            profile.updated_at = now;
            profile.refresh_eligibility(now);
            profile
        }
        None => {
            let mut profile: DonorProfile = DonorProfile::new(
                &actor.user_id,
                blood_group,
                request.age,
                request.weight_kg,
                last_donation_at,
                now,
            )
            .map_err(translate_domain_error)?;
            if let Some(enabled) = request.notifications_enabled {
                profile.notifications_enabled = enabled;
            }
            profile
        }
    };

    persistence
        .save_donor_profile(&profile)
        .map_err(translate_persistence_error)?;
    info!(
        user_id = %profile.user_id,
        blood_group = %profile.blood_group,
        is_eligible = profile.is_eligible,
        "Saved donor profile"
    );
    donor_profile_view(profile, now)
}

/// Sets the caller's availability.
///
/// # Errors
///
/// Returns `ApiError::InvalidState` when asked to become available while
/// any eligibility rule fails.
pub fn set_availability(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: &AvailabilityRequest,
    now: OffsetDateTime,
) -> Result<DonorProfileResponse, ApiError> {
    AuthorizationService::authorize_donor(actor, "set_availability")?;
    let mut profile: DonorProfile = load_donor_profile(persistence, &actor.user_id)?;
    profile
        .set_availability(request.is_available, now)
        .map_err(translate_domain_error)?;
    persistence
        .save_donor_profile(&profile)
        .map_err(translate_persistence_error)?;
    info!(
        user_id = %profile.user_id,
        is_available = profile.is_available,
        "Updated donor availability"
    );
    donor_profile_view(profile, now)
}

/// Records a completed donation.
///
/// Donors record their own; blood banks and admins must name the donor.
/// The donation time defaults to `now`.
///
/// # Errors
///
/// Returns an error if the caller may not record for that donor, the donor
/// has no profile, or the donation time is invalid.
pub fn record_donation(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: RecordDonationRequest,
    now: OffsetDateTime,
) -> Result<DonorProfileResponse, ApiError> {
    AuthorizationService::authorize_record_donation(actor)?;

    let named: Option<String> = optional_text(request.donor_id.as_deref());
    let donor_id: String = match (actor.role, named) {
        (UserRole::Donor, None) => actor.user_id.clone(),
        (UserRole::Donor, Some(id)) if id == actor.user_id => id,
        (UserRole::Donor, Some(_)) => {
            return Err(ApiError::Forbidden {
                action: String::from("record_donation"),
                message: String::from("Donors may only record their own donations"),
            });
        }
        (_, Some(id)) => id,
        (_, None) => {
            return Err(ApiError::InvalidInput {
                field: String::from("donor_id"),
                message: String::from("donor_id is required"),
            });
        }
    };

    let donated_at: OffsetDateTime = not_in_future(
        "donated_at",
        parse_optional_timestamp(request.donated_at.as_deref()).map_err(translate_domain_error)?,
        now,
    )?
    .unwrap_or(now);

    let mut profile: DonorProfile = load_donor_profile(persistence, &donor_id)?;
    profile
        .record_donation(donated_at, now)
        .map_err(translate_domain_error)?;
    persistence
        .save_donor_profile(&profile)
        .map_err(translate_persistence_error)?;
    info!(
        donor_id = %profile.user_id,
        recorded_by = %actor.user_id,
        donation_count = profile.donation_count,
        "Recorded donation"
    );
    donor_profile_view(profile, now)
}

// ============================================================================
// Blood banks
// ============================================================================

/// Returns the caller's blood bank profile.
///
/// # Errors
///
/// Returns an error if the actor is not a blood bank or has no profile.
pub fn get_blood_bank_profile(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
) -> Result<BloodBankProfileResponse, ApiError> {
    AuthorizationService::authorize_blood_bank(actor, "get_blood_bank_profile")?;
    blood_bank_view(load_blood_bank_profile(persistence, &actor.user_id)?)
}

/// Creates or updates the caller's blood bank profile.
///
/// The verification flag is never changed by the blood bank itself.
///
/// # Errors
///
/// Returns an error if the actor is not a blood bank, has not been synced,
/// or a required field is blank.
pub fn save_blood_bank_profile(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    request: BloodBankProfileRequest,
    now: OffsetDateTime,
) -> Result<BloodBankProfileResponse, ApiError> {
    AuthorizationService::authorize_blood_bank(actor, "save_blood_bank_profile")?;
    load_actor_user(persistence, actor)?;

    let existing: Option<BloodBankProfile> = persistence
        .get_blood_bank_profile(&actor.user_id)
        .map_err(translate_persistence_error)?;
    let (is_verified, created_at): (bool, OffsetDateTime) =
        existing.map_or((false, now), |p| (p.is_verified, p.created_at));

    let profile: BloodBankProfile = BloodBankProfile {
        user_id: actor.user_id.clone(),
        organization_name: request.organization_name.trim().to_string(),
        license_number: request.license_number.trim().to_string(),
        operating_hours: optional_text(request.operating_hours.as_deref()),
        contact_person: request.contact_person.trim().to_string(),
        contact_phone: request.contact_phone.trim().to_string(),
        website: optional_text(request.website.as_deref()),
        is_verified,
        created_at,
        updated_at: now,
    };
    validate_blood_bank_profile(&profile).map_err(translate_domain_error)?;

    persistence
        .save_blood_bank_profile(&profile)
        .map_err(translate_persistence_error)?;
    info!(user_id = %profile.user_id, "Saved blood bank profile");
    blood_bank_view(profile)
}

/// Sets a blood bank's verification flag. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the blood bank does
/// not exist.
pub fn verify_blood_bank(
    persistence: &mut SqlitePersistence,
    actor: &AuthenticatedActor,
    blood_bank_id: &str,
    request: &VerifyBloodBankRequest,
    now: OffsetDateTime,
) -> Result<BloodBankProfileResponse, ApiError> {
    AuthorizationService::authorize_admin(actor, "verify_blood_bank")?;
    persistence
        .set_blood_bank_verified(blood_bank_id, request.is_verified, now)
        .map_err(|e| match e {
            PersistenceError::NotFound(_) => ApiError::ResourceNotFound {
                resource_type: String::from("Blood bank profile"),
                message: format!("User {blood_bank_id} has no blood bank profile"),
            },
            other => translate_persistence_error(other),
        })?;
    blood_bank_view(load_blood_bank_profile(persistence, blood_bank_id)?)
}
