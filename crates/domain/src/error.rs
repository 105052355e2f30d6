// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The blood group was not supplied.
    MissingBloodGroup,
    /// The blood group label is not one of the eight ABO/Rh groups.
    InvalidBloodGroup(String),
    /// Units needed is outside the accepted range.
    InvalidUnits {
        /// The rejected value.
        units: i64,
    },
    /// A required text field is empty or whitespace.
    BlankField {
        /// The name of the blank field.
        field: &'static str,
    },
    /// Latitude or longitude was not supplied.
    MissingCoordinates,
    /// Latitude or longitude is out of range or not finite.
    InvalidCoordinates(String),
    /// Search radius is not a positive finite distance.
    InvalidRadius(String),
    /// Urgency label is not recognised.
    InvalidUrgency(String),
    /// SOS request status label is not recognised.
    InvalidSosStatus(String),
    /// SOS response status label is not recognised.
    InvalidResponseStatus(String),
    /// User role label is not recognised.
    InvalidUserRole(String),
    /// A status transition is not permitted by the lifecycle rules.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition was refused.
        reason: String,
    },
    /// The patient already has the maximum number of active requests.
    ActiveRequestCapReached {
        /// The number of requests currently active.
        active: usize,
        /// The configured maximum.
        limit: usize,
    },
    /// Donor profile values are unusable (e.g. a non-finite weight).
    InvalidDonorProfile(String),
    /// The donor does not currently satisfy the eligibility rules.
    DonorNotEligible {
        /// Human-readable reasons, one per failed rule.
        reasons: Vec<String>,
    },
    /// Donation counter would overflow.
    DonationCountOverflow,
    /// Date arithmetic overflow.
    DateArithmeticOverflow {
        /// Description of the operation that failed.
        operation: String,
    },
    /// Failed to parse a timestamp string.
    DateParseError {
        /// The invalid date string.
        date_string: String,
        /// The parsing error message.
        error: String,
    },
    /// Failed to format a timestamp.
    DateFormatError(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBloodGroup => write!(f, "Blood group is required"),
            Self::InvalidBloodGroup(label) => write!(f, "Invalid blood group: '{label}'"),
            Self::InvalidUnits { units } => {
                write!(f, "Invalid units needed: {units}. Must be between 1 and 10")
            }
            Self::BlankField { field } => write!(f, "Field '{field}' cannot be blank"),
            Self::MissingCoordinates => {
                write!(f, "Latitude and longitude are required")
            }
            Self::InvalidCoordinates(msg) => write!(f, "Invalid coordinates: {msg}"),
            Self::InvalidRadius(msg) => write!(f, "Invalid radius: {msg}"),
            Self::InvalidUrgency(label) => write!(f, "Invalid urgency: '{label}'"),
            Self::InvalidSosStatus(label) => write!(f, "Invalid SOS status: '{label}'"),
            Self::InvalidResponseStatus(label) => {
                write!(f, "Invalid response status: '{label}'")
            }
            Self::InvalidUserRole(label) => write!(f, "Invalid user role: '{label}'"),
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Cannot transition from '{from}' to '{to}': {reason}")
            }
            Self::ActiveRequestCapReached { active, limit } => {
                write!(
                    f,
                    "Maximum {limit} active SOS requests allowed ({active} active). Please cancel or fulfill existing requests"
                )
            }
            Self::InvalidDonorProfile(msg) => write!(f, "Invalid donor profile: {msg}"),
            Self::DonorNotEligible { reasons } => {
                write!(f, "Donor is not eligible: {}", reasons.join("; "))
            }
            Self::DonationCountOverflow => write!(f, "Donation count overflow"),
            Self::DateArithmeticOverflow { operation } => {
                write!(f, "Date arithmetic overflow while {operation}")
            }
            Self::DateParseError { date_string, error } => {
                write!(f, "Failed to parse date '{date_string}': {error}")
            }
            Self::DateFormatError(msg) => write!(f, "Failed to format date: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
