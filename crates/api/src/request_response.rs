// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Timestamps cross the boundary as RFC 3339 strings in UTC. Contact
//! fields are `None` whenever the caller may not see them.

use serde::{Deserialize, Serialize};

// ============================================================================
// Users
// ============================================================================

/// API request to sync the caller's user record from the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncUserRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
}

/// API response describing a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub is_verified: bool,
}

// ============================================================================
// SOS requests
// ============================================================================

/// API request to raise an SOS request.
///
/// Fields are optional at the wire level so that a missing value produces a
/// field-specific validation error rather than a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateSosRequest {
    pub blood_group: Option<String>,
    pub units_needed: i64,
    pub urgency: Option<String>,
    pub hospital_name: String,
    pub hospital_address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub contact_person: String,
    pub contact_phone: String,
    pub medical_notes: Option<String>,
    /// Client-chosen key; retrying with the same key returns the original
    /// request instead of creating another.
    pub idempotency_key: Option<String>,
}

/// API response describing an SOS request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SosRequestResponse {
    pub sos_request_id: i64,
    pub patient_id: String,
    pub blood_group: String,
    pub units_needed: u8,
    pub urgency: String,
    pub hospital_name: String,
    pub hospital_address: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Present only when contact details are disclosed to the caller.
    pub contact_person: Option<String>,
    /// Present only when contact details are disclosed to the caller.
    pub contact_phone: Option<String>,
    pub contact_disclosed: bool,
    pub medical_notes: Option<String>,
    pub status: String,
    pub response_count: u32,
    pub created_at: String,
    pub updated_at: String,
    pub expires_at: String,
    pub fulfilled_at: Option<String>,
    pub is_expired: bool,
    /// Distance from the caller, for proximity searches.
    pub distance_km: Option<f64>,
}

/// API response listing SOS requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SosRequestListResponse {
    pub requests: Vec<SosRequestResponse>,
}

/// API response for an expiry sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepResponse {
    pub processed: usize,
    pub failed_ids: Vec<i64>,
}

// ============================================================================
// SOS responses
// ============================================================================

/// API request to respond to an SOS request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RespondRequest {
    pub message: Option<String>,
}

/// API request to move a response to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponseStatusRequest {
    pub status: String,
}

/// API response describing a donor's response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SosResponseInfo {
    pub sos_response_id: i64,
    pub sos_request_id: i64,
    pub donor_id: String,
    pub status: String,
    pub message: Option<String>,
    pub responded_at: String,
    pub confirmed_at: Option<String>,
    pub completed_at: Option<String>,
    /// Present only when donor contact details are disclosed to the caller.
    pub donor_name: Option<String>,
    /// Present only when donor contact details are disclosed to the caller.
    pub donor_phone: Option<String>,
}

/// API response listing donor responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseListResponse {
    pub responses: Vec<SosResponseInfo>,
}

// ============================================================================
// Matching
// ============================================================================

/// Query parameters for proximity searches.
///
/// When the coordinates are absent the caller's stored location is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NearbyQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub verified_only: Option<bool>,
}

/// A donor who can serve an SOS request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorMatchInfo {
    pub donor_id: String,
    pub name: String,
    pub blood_group: String,
    pub donation_count: u32,
    pub level: String,
    pub distance_km: f64,
}

/// API response listing donors for a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorMatchListResponse {
    pub donors: Vec<DonorMatchInfo>,
}

/// A blood bank near the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodBankMatchInfo {
    pub user_id: String,
    pub organization_name: String,
    pub operating_hours: Option<String>,
    pub contact_phone: String,
    pub website: Option<String>,
    pub address: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub is_verified: bool,
    pub distance_km: f64,
}

/// API response listing blood banks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodBankMatchListResponse {
    pub blood_banks: Vec<BloodBankMatchInfo>,
}

// ============================================================================
// Donor profiles
// ============================================================================

/// API request to create or update the caller's donor profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DonorProfileRequest {
    pub blood_group: Option<String>,
    pub age: u32,
    pub weight_kg: f64,
    pub last_donation_at: Option<String>,
    pub notifications_enabled: Option<bool>,
}

/// Time-based eligibility as reported to the donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEligibilityInfo {
    pub is_eligible: bool,
    pub next_eligible_date: Option<String>,
    pub days_remaining: i64,
}

/// Medical eligibility as reported to the donor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalEligibilityInfo {
    pub is_eligible: bool,
    pub reasons: Vec<String>,
}

/// Donation history summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorStatsInfo {
    pub donation_count: u32,
    pub lives_saved: u64,
    pub level: String,
    pub next_milestone: u32,
    pub donations_until_next: u32,
}

/// API response describing a donor profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorProfileResponse {
    pub user_id: String,
    pub blood_group: String,
    pub last_donation_at: Option<String>,
    pub is_available: bool,
    pub is_eligible: bool,
    pub age: u32,
    pub weight_kg: f64,
    pub notifications_enabled: bool,
    pub time_eligibility: TimeEligibilityInfo,
    pub medical_eligibility: MedicalEligibilityInfo,
    pub stats: DonorStatsInfo,
    pub created_at: String,
    pub updated_at: String,
}

/// API request to toggle availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub is_available: bool,
}

/// API request to record a donation.
///
/// Donors record their own donations and leave `donor_id` empty; blood
/// banks and admins name the donor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordDonationRequest {
    pub donor_id: Option<String>,
    pub donated_at: Option<String>,
}

// ============================================================================
// Blood banks
// ============================================================================

/// API request to create or update the caller's blood bank profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloodBankProfileRequest {
    pub organization_name: String,
    pub license_number: String,
    pub operating_hours: Option<String>,
    pub contact_person: String,
    pub contact_phone: String,
    pub website: Option<String>,
}

/// API response describing a blood bank profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BloodBankProfileResponse {
    pub user_id: String,
    pub organization_name: String,
    pub license_number: String,
    pub operating_hours: Option<String>,
    pub contact_person: String,
    pub contact_phone: String,
    pub website: Option<String>,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// API request to set a blood bank's verification flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyBloodBankRequest {
    pub is_verified: bool,
}

// ============================================================================
// Geocoding
// ============================================================================

/// Query for forward geocoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeQuery {
    pub address: String,
}

/// Query for reverse geocoding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverseGeocodeQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A geocoded location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: Option<String>,
}

/// A reverse-geocoded address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseGeocodeResponse {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}
