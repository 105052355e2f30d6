// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::blood_group::BloodGroup;
use crate::eligibility::{
    DONATION_INTERVAL_DAYS, DonorStats, MedicalEligibility, TimeEligibility,
    check_medical_eligibility, check_time_eligibility, compute_stats,
};
use crate::error::DomainError;
use crate::geo::Coordinates;
use crate::status::{ResponseStatus, SosStatus};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Role of an authenticated user, as supplied by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Patient,
    Donor,
    BloodBank,
    Admin,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Donor => "donor",
            Self::BloodBank => "blood_bank",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for UserRole {
    type Err = DomainError;

    /// Parses a role label. Accepts `blood-bank` as a spelling of
    /// `blood_bank`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patient" => Ok(Self::Patient),
            "donor" => Ok(Self::Donor),
            "blood_bank" | "blood-bank" => Ok(Self::BloodBank),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidUserRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How urgently blood is needed. Lower rank sorts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Critical,
    Urgent,
    #[default]
    Normal,
}

impl Urgency {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Urgent => "urgent",
            Self::Normal => "normal",
        }
    }

    /// Sort rank: critical 0, urgent 1, normal 2.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::Urgent => 1,
            Self::Normal => 2,
        }
    }
}

impl FromStr for Urgency {
    type Err = DomainError;

    /// Parses an urgency label case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "urgent" => Ok(Self::Urgent),
            "normal" => Ok(Self::Normal),
            _ => Err(DomainError::InvalidUrgency(s.to_string())),
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference data for an authenticated user.
///
/// The id is the identity provider's opaque identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub location: Option<Coordinates>,
    pub address: Option<String>,
    pub is_verified: bool,
}

/// Donor-specific profile, one per donor user.
///
/// `is_eligible` is a cached value; it is refreshed whenever the profile is
/// saved and cleared when a donation is recorded. `is_available` can only
/// be true while the donor is eligible.
#[derive(Debug, Clone, PartialEq)]
pub struct DonorProfile {
    pub user_id: String,
    pub blood_group: BloodGroup,
    pub last_donation_at: Option<OffsetDateTime>,
    pub donation_count: u32,
    pub is_available: bool,
    pub is_eligible: bool,
    pub age: u32,
    pub weight_kg: f64,
    pub notifications_enabled: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl DonorProfile {
    /// Creates a new donor profile.
    ///
    /// Eligibility is evaluated immediately. The donor starts available if
    /// they are eligible.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDonorProfile` if the age or weight is
    /// unusable.
    pub fn new(
        user_id: &str,
        blood_group: BloodGroup,
        age: u32,
        weight_kg: f64,
        last_donation_at: Option<OffsetDateTime>,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        crate::validation::validate_donor_measurements(age, weight_kg)?;

        let mut profile: Self = Self {
            user_id: user_id.to_string(),
            blood_group,
            last_donation_at,
            donation_count: 0,
            is_available: true,
            is_eligible: false,
            age,
            weight_kg,
            notifications_enabled: true,
            created_at: now,
            updated_at: now,
        };
        profile.refresh_eligibility(now);
        Ok(profile)
    }

    #[must_use]
    pub fn time_eligibility(&self, now: OffsetDateTime) -> TimeEligibility {
        check_time_eligibility(self.last_donation_at, now, DONATION_INTERVAL_DAYS)
    }

    #[must_use]
    pub fn medical_eligibility(&self) -> MedicalEligibility {
        check_medical_eligibility(self.age, self.weight_kg)
    }

    /// Collects every reason the donor cannot donate at `now`.
    #[must_use]
    pub fn ineligibility_reasons(&self, now: OffsetDateTime) -> Vec<String> {
        let mut reasons: Vec<String> = Vec::new();
        let time: TimeEligibility = self.time_eligibility(now);
        if !time.is_eligible {
            reasons.push(format!(
                "Next donation possible in {} days",
                time.days_remaining
            ));
        }
        reasons.extend(self.medical_eligibility().reasons);
        reasons
    }

    /// Recomputes the cached eligibility flag. An ineligible donor is
    /// also made unavailable. Returns the new eligibility.
    pub fn refresh_eligibility(&mut self, now: OffsetDateTime) -> bool {
        self.is_eligible = self.ineligibility_reasons(now).is_empty();
        if !self.is_eligible {
            self.is_available = false;
        }
        self.is_eligible
    }

    /// Sets the availability flag.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DonorNotEligible` when asked to become
    /// available while any eligibility rule fails.
    pub fn set_availability(
        &mut self,
        available: bool,
        now: OffsetDateTime,
    ) -> Result<(), DomainError> {
        if available {
            let reasons: Vec<String> = self.ineligibility_reasons(now);
            if !reasons.is_empty() {
                return Err(DomainError::DonorNotEligible { reasons });
            }
            self.is_eligible = true;
        }
        self.is_available = available;
        self.updated_at = now;
        Ok(())
    }

    /// Records a completed donation made at `donated_at`.
    ///
    /// A backfilled donation older than the stored one only bumps the
    /// count; `last_donation_at` never moves backwards. Eligibility is then
    /// re-evaluated at `now`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DonationCountOverflow` if the counter cannot
    /// be incremented.
    pub fn record_donation(
        &mut self,
        donated_at: OffsetDateTime,
        now: OffsetDateTime,
    ) -> Result<(), DomainError> {
        self.donation_count = self
            .donation_count
            .checked_add(1)
            .ok_or(DomainError::DonationCountOverflow)?;
        self.last_donation_at = self.last_donation_at.max(Some(donated_at));
        self.refresh_eligibility(now);
        self.updated_at = now;
        Ok(())
    }

    #[must_use]
    pub fn stats(&self) -> DonorStats {
        compute_stats(self.donation_count)
    }
}

/// Blood bank organisation profile, one per blood bank user.
///
/// `is_verified` is controlled by administrators only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloodBankProfile {
    pub user_id: String,
    pub organization_name: String,
    pub license_number: String,
    pub operating_hours: Option<String>,
    pub contact_person: String,
    pub contact_phone: String,
    pub website: Option<String>,
    pub is_verified: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// A persisted SOS request.
#[derive(Debug, Clone, PartialEq)]
pub struct SosRequest {
    pub id: i64,
    pub patient_id: String,
    pub blood_group: BloodGroup,
    pub units_needed: u8,
    pub urgency: Urgency,
    pub hospital_name: String,
    pub hospital_address: String,
    pub location: Coordinates,
    pub contact_person: String,
    pub contact_phone: String,
    pub medical_notes: Option<String>,
    pub status: SosStatus,
    pub response_count: u32,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub fulfilled_at: Option<OffsetDateTime>,
    pub idempotency_key: Option<String>,
}

impl SosRequest {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == SosStatus::Active
    }

    /// True once the request has passed its expiry time, whatever its
    /// stored status.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at < now
    }

    /// A request may be deleted only before anyone has responded.
    #[must_use]
    pub const fn is_deletable(&self) -> bool {
        self.response_count == 0
    }

    #[must_use]
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.patient_id == user_id
    }
}

/// A donor's response to an SOS request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SosResponse {
    pub id: i64,
    pub sos_request_id: i64,
    pub donor_id: String,
    pub status: ResponseStatus,
    pub message: Option<String>,
    pub responded_at: OffsetDateTime,
    pub confirmed_at: Option<OffsetDateTime>,
    pub completed_at: Option<OffsetDateTime>,
    pub updated_at: OffsetDateTime,
}

impl SosResponse {
    #[must_use]
    pub fn is_owned_by(&self, donor_id: &str) -> bool {
        self.donor_id == donor_id
    }
}
