// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Message raised by the `sos_requests_active_cap` trigger.
pub(crate) const ACTIVE_CAP_TRIGGER_MESSAGE: &str = "active_request_cap_reached";

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// The requested resource was not found.
    NotFound(String),
    /// A referenced row (user, request) does not exist.
    ReferenceMissing(String),
    /// The donor has already responded to this request.
    DuplicateResponse { sos_request_id: i64, donor_id: String },
    /// A request with the same idempotency key already exists for the patient.
    DuplicateIdempotencyKey(String),
    /// The store-side active request cap rejected an insert.
    ActiveRequestCapReached { patient_id: String },
    /// The request is not in the `active` state.
    RequestNotActive { sos_request_id: i64, status: String },
    /// The request has responses and cannot be deleted.
    RequestHasResponses { sos_request_id: i64 },
    /// The response belongs to a different donor.
    ResponseNotOwned { sos_response_id: i64 },
    /// The response is confirmed or completed and cannot be withdrawn.
    ResponseLocked { sos_response_id: i64, status: String },
    /// A conditional update found the row in an unexpected state.
    ConcurrentModification(String),
    /// The database was locked for longer than the busy timeout.
    Busy(String),
    /// A stored row could not be converted into a domain value.
    CorruptRecord(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
            Self::ReferenceMissing(msg) => write!(f, "Referenced record missing: {msg}"),
            Self::DuplicateResponse {
                sos_request_id,
                donor_id,
            } => write!(
                f,
                "Donor {donor_id} has already responded to SOS request {sos_request_id}"
            ),
            Self::DuplicateIdempotencyKey(key) => {
                write!(f, "Idempotency key '{key}' has already been used")
            }
            Self::ActiveRequestCapReached { patient_id } => {
                write!(
                    f,
                    "Patient {patient_id} already has the maximum number of active SOS requests"
                )
            }
            Self::RequestNotActive {
                sos_request_id,
                status,
            } => write!(f, "SOS request {sos_request_id} is {status}, not active"),
            Self::RequestHasResponses { sos_request_id } => write!(
                f,
                "SOS request {sos_request_id} has responses and cannot be deleted"
            ),
            Self::ResponseNotOwned { sos_response_id } => write!(
                f,
                "SOS response {sos_response_id} belongs to another donor"
            ),
            Self::ResponseLocked {
                sos_response_id,
                status,
            } => write!(
                f,
                "SOS response {sos_response_id} is {status} and cannot be withdrawn"
            ),
            Self::ConcurrentModification(msg) => write!(f, "Concurrent modification: {msg}"),
            Self::Busy(msg) => write!(f, "Database busy: {msg}"),
            Self::CorruptRecord(msg) => write!(f, "Corrupt record: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<DieselError> for PersistenceError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound("Record not found".to_string()),
            DieselError::DatabaseError(kind, info) => {
                let message: String = info.message().to_string();
                match kind {
                    DatabaseErrorKind::ForeignKeyViolation => Self::ReferenceMissing(message),
                    _ if message.contains(ACTIVE_CAP_TRIGGER_MESSAGE) => {
                        Self::ActiveRequestCapReached {
                            patient_id: String::new(),
                        }
                    }
                    _ if is_busy_message(&message) => Self::Busy(message),
                    _ => Self::DatabaseError(message),
                }
            }
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

fn is_busy_message(message: &str) -> bool {
    message.contains("database is locked") || message.contains("database is busy")
}

/// Returns true if `err` is a unique-constraint violation.
pub(crate) const fn is_unique_violation(err: &DieselError) -> bool {
    matches!(
        err,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}
