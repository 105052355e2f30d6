// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use lifeline::CoreError;
use lifeline_domain::DomainError;
use lifeline_persistence::PersistenceError;

use crate::geocoding::GeocodeError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed: the actor's role may not perform the action.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// Authorization failed: the actor does not own the resource.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// Why access was refused.
        reason: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::Forbidden { action, reason } => {
                write!(f, "Forbidden: '{action}': {reason}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain and persistence errors and represent the
/// API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor's role may not perform the action.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The actor does not own the resource.
    Forbidden {
        /// The action that was attempted.
        action: String,
        /// Why access was refused.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// The operation is not allowed in the resource's current state.
    InvalidState {
        /// The rule that refused the operation.
        rule: String,
        /// A human-readable description.
        message: String,
    },
    /// A per-user limit has been reached.
    CapacityExceeded {
        /// A human-readable description.
        message: String,
    },
    /// The operation would create a duplicate.
    Duplicate {
        /// A human-readable description.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A dependency (database lock, geocoder) failed or timed out.
    Upstream {
        /// The dependency that failed.
        service: String,
        /// A human-readable description.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// True if retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream { .. })
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::Forbidden { action, message } => write!(f, "Forbidden: '{action}': {message}"),
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::InvalidState { rule, message } => {
                write!(f, "Operation not allowed ({rule}): {message}")
            }
            Self::CapacityExceeded { message } => write!(f, "Capacity exceeded: {message}"),
            Self::Duplicate { message } => write!(f, "Duplicate: {message}"),
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Upstream { service, message } => {
                write!(f, "Upstream {service} error: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
            AuthError::Forbidden { action, reason } => Self::Forbidden {
                action,
                message: reason,
            },
        }
    }
}

fn invalid(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::MissingBloodGroup => {
            invalid("blood_group", String::from("Blood group is required"))
        }
        DomainError::InvalidBloodGroup(label) => invalid(
            "blood_group",
            format!("'{label}' is not one of A+, A-, B+, B-, AB+, AB-, O+, O-"),
        ),
        DomainError::InvalidUnits { units } => invalid(
            "units_needed",
            format!("Units needed must be between 1 and 10, got {units}"),
        ),
        DomainError::BlankField { field } => invalid(field, format!("{field} must not be blank")),
        DomainError::MissingCoordinates => invalid(
            "location",
            String::from("Latitude and longitude are required"),
        ),
        DomainError::InvalidCoordinates(msg) => invalid("location", msg),
        DomainError::InvalidRadius(msg) => invalid("radius_km", msg),
        DomainError::InvalidUrgency(label) => invalid(
            "urgency",
            format!("'{label}' is not one of critical, urgent, normal"),
        ),
        DomainError::InvalidSosStatus(label) | DomainError::InvalidResponseStatus(label) => {
            invalid("status", format!("'{label}' is not a recognised status"))
        }
        DomainError::InvalidUserRole(label) => {
            invalid("role", format!("'{label}' is not a recognised role"))
        }
        DomainError::InvalidStatusTransition { from, to, reason } => ApiError::InvalidState {
            rule: String::from("status_transition"),
            message: format!("Cannot move from {from} to {to}: {reason}"),
        },
        DomainError::ActiveRequestCapReached { active, limit } => ApiError::CapacityExceeded {
            message: format!(
                "You already have {active} active SOS requests; the limit is {limit}"
            ),
        },
        DomainError::InvalidDonorProfile(msg) => invalid("donor_profile", msg),
        DomainError::DonorNotEligible { reasons } => ApiError::InvalidState {
            rule: String::from("donor_eligibility"),
            message: format!("Donor is not eligible: {}", reasons.join("; ")),
        },
        DomainError::DonationCountOverflow => ApiError::InvalidState {
            rule: String::from("donation_count"),
            message: String::from("Donation count cannot be increased further"),
        },
        DomainError::DateArithmeticOverflow { operation } => invalid(
            "date",
            format!("Date arithmetic overflow while {operation}"),
        ),
        DomainError::DateParseError { date_string, error } => invalid(
            "date",
            format!("Failed to parse date '{date_string}': {error}"),
        ),
        DomainError::DateFormatError(msg) => ApiError::Internal {
            message: format!("Failed to format timestamp: {msg}"),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message: msg,
        },
        PersistenceError::ReferenceMissing(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("User"),
            message: format!("Referenced user does not exist ({msg})"),
        },
        PersistenceError::DuplicateResponse {
            sos_request_id,
            donor_id,
        } => ApiError::Duplicate {
            message: format!(
                "Donor {donor_id} has already responded to SOS request {sos_request_id}"
            ),
        },
        PersistenceError::DuplicateIdempotencyKey(key) => ApiError::Duplicate {
            message: format!("Idempotency key '{key}' has already been used"),
        },
        PersistenceError::ActiveRequestCapReached { patient_id } => ApiError::CapacityExceeded {
            message: format!(
                "Patient {patient_id} already has the maximum number of active SOS requests"
            ),
        },
        PersistenceError::RequestNotActive {
            sos_request_id,
            status,
        } => ApiError::InvalidState {
            rule: String::from("request_active"),
            message: format!("SOS request {sos_request_id} is {status}"),
        },
        PersistenceError::RequestHasResponses { sos_request_id } => ApiError::InvalidState {
            rule: String::from("request_deletable"),
            message: format!(
                "SOS request {sos_request_id} has responses and cannot be deleted"
            ),
        },
        PersistenceError::ResponseNotOwned { sos_response_id } => ApiError::Forbidden {
            action: String::from("withdraw_response"),
            message: format!("SOS response {sos_response_id} belongs to another donor"),
        },
        PersistenceError::ResponseLocked {
            sos_response_id,
            status,
        } => ApiError::InvalidState {
            rule: String::from("response_withdrawable"),
            message: format!("SOS response {sos_response_id} is {status}"),
        },
        PersistenceError::ConcurrentModification(msg) => ApiError::InvalidState {
            rule: String::from("concurrent_modification"),
            message: msg,
        },
        PersistenceError::Busy(msg) => ApiError::Upstream {
            service: String::from("database"),
            message: msg,
        },
        err @ (PersistenceError::DatabaseError(_)
        | PersistenceError::DatabaseConnectionFailed(_)
        | PersistenceError::MigrationFailed(_)
        | PersistenceError::QueryFailed(_)
        | PersistenceError::InitializationError(_)
        | PersistenceError::ForeignKeyEnforcementNotEnabled
        | PersistenceError::CorruptRecord(_)) => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}

/// Translates a geocoder error into an API error.
#[must_use]
pub fn translate_geocode_error(err: GeocodeError) -> ApiError {
    match err {
        GeocodeError::NotFound { query } => ApiError::ResourceNotFound {
            resource_type: String::from("Location"),
            message: format!("No match for '{query}'"),
        },
        other @ (GeocodeError::Timeout { .. }
        | GeocodeError::Transport(_)
        | GeocodeError::InvalidResponse(_)) => ApiError::Upstream {
            service: String::from("geocoder"),
            message: other.to_string(),
        },
    }
}
