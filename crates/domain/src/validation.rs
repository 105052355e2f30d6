// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::blood_group::BloodGroup;
use crate::error::DomainError;
use crate::geo::Coordinates;
use crate::types::{BloodBankProfile, Urgency, User};
use std::str::FromStr;
use time::{Duration, OffsetDateTime};

/// Maximum number of simultaneously active SOS requests per patient.
pub const MAX_ACTIVE_REQUESTS_PER_PATIENT: usize = 3;

/// Hours after creation at which an SOS request expires.
pub const SOS_EXPIRY_HOURS: i64 = 24;

/// Accepted range for `units_needed`.
pub const MIN_UNITS_NEEDED: i64 = 1;
pub const MAX_UNITS_NEEDED: i64 = 10;

/// Upper bound for a plausible donor age.
const MAX_PLAUSIBLE_AGE: u32 = 120;

/// Unvalidated SOS request input, as received from a caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SosRequestDraft {
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
    pub idempotency_key: Option<String>,
}

/// A validated SOS request ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSosRequest {
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
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub idempotency_key: Option<String>,
}

impl NewSosRequest {
    /// Validates a draft for `patient_id` created at `now`.
    ///
    /// Checks run in a fixed order so the first reported problem is stable:
    /// blood group, units, urgency, hospital, contact, coordinates.
    /// Urgency defaults to normal when absent. Expiry is `now + 24h`.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure.
    pub fn from_draft(
        patient_id: &str,
        draft: SosRequestDraft,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        let blood_group: BloodGroup = match draft.blood_group.as_deref().map(str::trim) {
            None | Some("") => return Err(DomainError::MissingBloodGroup),
            Some(label) => BloodGroup::from_str(label)?,
        };
        let units_needed: u8 = validate_units_needed(draft.units_needed)?;
        let urgency: Urgency = match draft.urgency.as_deref().map(str::trim) {
            None | Some("") => Urgency::default(),
            Some(label) => Urgency::from_str(label)?,
        };
        let hospital_name: String = require_text("hospital_name", &draft.hospital_name)?;
        let hospital_address: String =
            require_text("hospital_address", &draft.hospital_address)?;
        let contact_person: String = require_text("contact_person", &draft.contact_person)?;
        let contact_phone: String = require_text("contact_phone", &draft.contact_phone)?;
        let location: Coordinates = Coordinates::from_parts(draft.latitude, draft.longitude)?;

        let expires_at: OffsetDateTime = now
            .checked_add(Duration::hours(SOS_EXPIRY_HOURS))
            .ok_or_else(|| DomainError::DateArithmeticOverflow {
                operation: String::from("computing SOS expiry"),
            })?;

        Ok(Self {
            patient_id: patient_id.to_string(),
            blood_group,
            units_needed,
            urgency,
            hospital_name,
            hospital_address,
            location,
            contact_person,
            contact_phone,
            medical_notes: optional_text(draft.medical_notes.as_deref()),
            created_at: now,
            expires_at,
            idempotency_key: optional_text(draft.idempotency_key.as_deref()),
        })
    }
}

/// Validates the number of units requested.
///
/// # Errors
///
/// Returns `DomainError::InvalidUnits` outside 1..=10.
pub fn validate_units_needed(units: i64) -> Result<u8, DomainError> {
    if !(MIN_UNITS_NEEDED..=MAX_UNITS_NEEDED).contains(&units) {
        return Err(DomainError::InvalidUnits { units });
    }
    u8::try_from(units).map_err(|_| DomainError::InvalidUnits { units })
}

/// Trims a required text field.
///
/// # Errors
///
/// Returns `DomainError::BlankField` if nothing is left after trimming.
pub fn require_text(field: &'static str, value: &str) -> Result<String, DomainError> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::BlankField { field });
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field, mapping blank values to `None`.
#[must_use]
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Enforces the per-patient active request cap.
///
/// # Errors
///
/// Returns `DomainError::ActiveRequestCapReached` when `active` is already
/// at or above the cap.
pub const fn check_active_request_cap(active: usize) -> Result<(), DomainError> {
    if active >= MAX_ACTIVE_REQUESTS_PER_PATIENT {
        return Err(DomainError::ActiveRequestCapReached {
            active,
            limit: MAX_ACTIVE_REQUESTS_PER_PATIENT,
        });
    }
    Ok(())
}

/// Validates donor age and weight before eligibility is evaluated.
///
/// Ages and weights that fail the medical rules are accepted here; this
/// only rejects values that cannot describe a person.
///
/// # Errors
///
/// Returns `DomainError::InvalidDonorProfile` for a zero or implausible
/// age, or a weight that is not a positive finite number.
pub fn validate_donor_measurements(age: u32, weight_kg: f64) -> Result<(), DomainError> {
    if age == 0 || age > MAX_PLAUSIBLE_AGE {
        return Err(DomainError::InvalidDonorProfile(format!(
            "age {age} is not plausible"
        )));
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(DomainError::InvalidDonorProfile(format!(
            "weight {weight_kg} must be a positive number of kilograms"
        )));
    }
    Ok(())
}

/// Validates user reference data.
///
/// # Errors
///
/// Returns `DomainError::BlankField` if the id, name or email is blank.
pub fn validate_user_fields(user: &User) -> Result<(), DomainError> {
    require_text("id", &user.id)?;
    require_text("name", &user.name)?;
    require_text("email", &user.email)?;
    Ok(())
}

/// Validates a blood bank profile's required fields.
///
/// # Errors
///
/// Returns `DomainError::BlankField` for the first blank required field.
pub fn validate_blood_bank_profile(profile: &BloodBankProfile) -> Result<(), DomainError> {
    require_text("organization_name", &profile.organization_name)?;
    require_text("license_number", &profile.license_number)?;
    require_text("contact_person", &profile.contact_person)?;
    require_text("contact_phone", &profile.contact_phone)?;
    Ok(())
}
