// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversions from domain values into response DTOs.

use lifeline::ContactAccess;
use lifeline_domain::{
    BloodBankProfile, DonorProfile, DonorStats, MedicalEligibility, SosRequest, SosResponse,
    TimeEligibility, User, format_timestamp,
};
use time::OffsetDateTime;

use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{
    BloodBankProfileResponse, DonorProfileResponse, DonorStatsInfo, MedicalEligibilityInfo,
    SosRequestResponse, SosResponseInfo, TimeEligibilityInfo, UserResponse,
};

pub(crate) fn timestamp(value: OffsetDateTime) -> Result<String, ApiError> {
    format_timestamp(value).map_err(translate_domain_error)
}

pub(crate) fn optional_timestamp(value: Option<OffsetDateTime>) -> Result<Option<String>, ApiError> {
    value.map(timestamp).transpose()
}

pub(crate) fn user_view(user: User) -> UserResponse {
    UserResponse {
        role: user.role.as_str().to_string(),
        latitude: user.location.map(|c| c.latitude()),
        longitude: user.location.map(|c| c.longitude()),
        user_id: user.id,
        name: user.name,
        email: user.email,
        phone: user.phone,
        address: user.address,
        is_verified: user.is_verified,
    }
}

pub(crate) fn sos_request_view(
    request: SosRequest,
    access: ContactAccess,
    distance_km: Option<f64>,
    now: OffsetDateTime,
) -> Result<SosRequestResponse, ApiError> {
    let disclosed: bool = access.is_granted();
    Ok(SosRequestResponse {
        sos_request_id: request.id,
        blood_group: request.blood_group.as_str().to_string(),
        units_needed: request.units_needed,
        urgency: request.urgency.as_str().to_string(),
        latitude: request.location.latitude(),
        longitude: request.location.longitude(),
        contact_disclosed: disclosed,
        status: request.status.as_str().to_string(),
        response_count: request.response_count,
        created_at: timestamp(request.created_at)?,
        updated_at: timestamp(request.updated_at)?,
        expires_at: timestamp(request.expires_at)?,
        fulfilled_at: optional_timestamp(request.fulfilled_at)?,
        is_expired: request.is_expired(now),
        distance_km,
        contact_person: disclosed.then_some(request.contact_person),
        contact_phone: disclosed.then_some(request.contact_phone),
        patient_id: request.patient_id,
        hospital_name: request.hospital_name,
        hospital_address: request.hospital_address,
        medical_notes: request.medical_notes,
    })
}

/// `donor` is the responding donor's user record when their contact
/// details may be shown.
pub(crate) fn response_view(
    response: SosResponse,
    donor: Option<User>,
) -> Result<SosResponseInfo, ApiError> {
    let (donor_name, donor_phone): (Option<String>, Option<String>) =
        donor.map_or((None, None), |user| (Some(user.name), user.phone));
    Ok(SosResponseInfo {
        sos_response_id: response.id,
        sos_request_id: response.sos_request_id,
        status: response.status.as_str().to_string(),
        responded_at: timestamp(response.responded_at)?,
        confirmed_at: optional_timestamp(response.confirmed_at)?,
        completed_at: optional_timestamp(response.completed_at)?,
        donor_id: response.donor_id,
        message: response.message,
        donor_name,
        donor_phone,
    })
}

pub(crate) fn donor_profile_view(
    profile: DonorProfile,
    now: OffsetDateTime,
) -> Result<DonorProfileResponse, ApiError> {
    let time: TimeEligibility = profile.time_eligibility(now);
    let medical: MedicalEligibility = profile.medical_eligibility();
    let stats: DonorStats = profile.stats();
    Ok(DonorProfileResponse {
        blood_group: profile.blood_group.as_str().to_string(),
        last_donation_at: optional_timestamp(profile.last_donation_at)?,
        is_available: profile.is_available,
        is_eligible: time.is_eligible && medical.is_eligible,
        age: profile.age,
        weight_kg: profile.weight_kg,
        notifications_enabled: profile.notifications_enabled,
        time_eligibility: TimeEligibilityInfo {
            is_eligible: time.is_eligible,
            next_eligible_date: optional_timestamp(time.next_eligible_date)?,
            days_remaining: time.days_remaining,
        },
        medical_eligibility: MedicalEligibilityInfo {
            is_eligible: medical.is_eligible,
            reasons: medical.reasons,
        },
        stats: DonorStatsInfo {
            donation_count: profile.donation_count,
            lives_saved: stats.lives_saved,
            level: stats.level.label().to_string(),
            next_milestone: stats.next_milestone,
            donations_until_next: stats.donations_until_next,
        },
        created_at: timestamp(profile.created_at)?,
        updated_at: timestamp(profile.updated_at)?,
        user_id: profile.user_id,
    })
}

pub(crate) fn blood_bank_view(profile: BloodBankProfile) -> Result<BloodBankProfileResponse, ApiError> {
    Ok(BloodBankProfileResponse {
        created_at: timestamp(profile.created_at)?,
        updated_at: timestamp(profile.updated_at)?,
        user_id: profile.user_id,
        organization_name: profile.organization_name,
        license_number: profile.license_number,
        operating_hours: profile.operating_hours,
        contact_person: profile.contact_person,
        contact_phone: profile.contact_phone,
        website: profile.website,
        is_verified: profile.is_verified,
    })
}
