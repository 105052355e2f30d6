// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod blood_group;
mod compatibility;
mod eligibility;
mod error;
mod geo;
mod status;
mod timestamp;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use blood_group::BloodGroup;
pub use compatibility::{
    compatible_donors_for, compatible_donors_for_label, compatible_recipients_for,
    compatible_recipients_for_label, is_compatible, is_compatible_label,
};
pub use eligibility::{
    DONATION_INTERVAL_DAYS, DonorLevel, DonorStats, LIVES_PER_DONATION, MAX_DONOR_AGE,
    MIN_DONOR_AGE, MIN_DONOR_WEIGHT_KG, MedicalEligibility, TimeEligibility,
    check_medical_eligibility, check_time_eligibility, compute_stats,
};
pub use error::DomainError;
pub use geo::{Coordinates, EARTH_RADIUS_KM, degrees_to_radians, distance_km, validate_radius};
pub use status::{ResponseStatus, SosStatus};
pub use timestamp::{format_timestamp, parse_optional_timestamp, parse_timestamp};

// Re-export public types
pub use types::{
    BloodBankProfile, DonorProfile, SosRequest, SosResponse, Urgency, User, UserRole,
};
pub use validation::{
    MAX_ACTIVE_REQUESTS_PER_PATIENT, MAX_UNITS_NEEDED, MIN_UNITS_NEEDED, NewSosRequest,
    SOS_EXPIRY_HOURS, SosRequestDraft, check_active_request_cap, optional_text, require_text,
    validate_blood_bank_profile, validate_donor_measurements, validate_units_needed,
    validate_user_fields,
};
