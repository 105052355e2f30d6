// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the Lifeline SOS service.
//!
//! This crate stores users, donor and blood bank profiles, SOS requests and
//! their responses in `SQLite` via Diesel.
//!
//! ## Consistency
//!
//! - The per-patient active request cap is enforced by a `BEFORE INSERT`
//!   trigger, so it holds under concurrent creates.
//! - One response per donor per request is a unique index.
//! - `response_count` is incremented in the same immediate transaction that
//!   inserts the response.
//! - Status changes are conditional updates on the expected current state.
//!
//! ## Testing
//!
//! - `Persistence::new_in_memory()` gives every caller an isolated shared
//!   in-memory database with migrations applied
//! - Tests never touch the filesystem

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
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use lifeline_domain::{
    BloodBankProfile, DonorProfile, NewSosRequest, ResponseStatus, SosRequest, SosResponse,
    SosStatus, User,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use backend::sqlite::DEFAULT_BUSY_TIMEOUT_MS;
pub use data_models::SweepReport;
pub use error::PersistenceError;
pub use queries::sos_requests::ACTIVE_LIST_LIMIT;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Type alias for callers that name the backend explicitly.
pub type SqlitePersistence = Persistence;

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection =
            backend::sqlite::initialize_database(&shared_memory_url, DEFAULT_BUSY_TIMEOUT_MS)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    /// * `busy_timeout_ms` - How long a statement waits on a locked database
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(
        path: P,
        busy_timeout_ms: u32,
    ) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection =
            backend::sqlite::initialize_database(path_str, busy_timeout_ms)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::sqlite::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Users & Profiles
    // ========================================================================

    /// Inserts or refreshes a user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub fn upsert_user(&mut self, user: &User, now: OffsetDateTime) -> Result<(), PersistenceError> {
        mutations::users::upsert_user(&mut self.conn, user, now)
    }

    /// Retrieves a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_user(&mut self, user_id: &str) -> Result<Option<User>, PersistenceError> {
        queries::users::get_user(&mut self.conn, user_id)
    }

    /// Inserts or replaces a donor profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the statement fails.
    pub fn save_donor_profile(&mut self, profile: &DonorProfile) -> Result<(), PersistenceError> {
        mutations::profiles::save_donor_profile(&mut self.conn, profile)
    }

    /// Retrieves a donor profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_donor_profile(
        &mut self,
        user_id: &str,
    ) -> Result<Option<DonorProfile>, PersistenceError> {
        queries::profiles::get_donor_profile(&mut self.conn, user_id)
    }

    /// Lists available donors with their user records.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_available_donors(&mut self) -> Result<Vec<(DonorProfile, User)>, PersistenceError> {
        queries::profiles::list_available_donors(&mut self.conn)
    }

    /// Inserts or replaces a blood bank profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the user does not exist or the statement fails.
    pub fn save_blood_bank_profile(
        &mut self,
        profile: &BloodBankProfile,
    ) -> Result<(), PersistenceError> {
        mutations::profiles::save_blood_bank_profile(&mut self.conn, profile)
    }

    /// Retrieves a blood bank profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_blood_bank_profile(
        &mut self,
        user_id: &str,
    ) -> Result<Option<BloodBankProfile>, PersistenceError> {
        queries::profiles::get_blood_bank_profile(&mut self.conn, user_id)
    }

    /// Lists every blood bank with its user record.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_blood_banks(&mut self) -> Result<Vec<(BloodBankProfile, User)>, PersistenceError> {
        queries::profiles::list_blood_banks(&mut self.conn)
    }

    /// Sets a blood bank's verification flag.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if there is no such blood bank.
    pub fn set_blood_bank_verified(
        &mut self,
        user_id: &str,
        verified: bool,
        now: OffsetDateTime,
    ) -> Result<(), PersistenceError> {
        mutations::profiles::set_blood_bank_verified(&mut self.conn, user_id, verified, now)
    }

    // ========================================================================
    // SOS Requests
    // ========================================================================

    /// Inserts a validated SOS request.
    ///
    /// # Errors
    ///
    /// Returns an error if the cap is reached, the idempotency key was
    /// already used, or the statement fails.
    pub fn insert_sos_request(
        &mut self,
        request: &NewSosRequest,
    ) -> Result<SosRequest, PersistenceError> {
        mutations::sos_requests::insert_sos_request(&mut self.conn, request)
    }

    /// Retrieves an SOS request.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_sos_request(
        &mut self,
        sos_request_id: i64,
    ) -> Result<Option<SosRequest>, PersistenceError> {
        queries::sos_requests::get_sos_request(&mut self.conn, sos_request_id)
    }

    /// Lists a patient's requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_sos_requests_by_patient(
        &mut self,
        patient_id: &str,
    ) -> Result<Vec<SosRequest>, PersistenceError> {
        queries::sos_requests::list_by_patient(&mut self.conn, patient_id)
    }

    /// Lists active requests, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_active_sos_requests(&mut self) -> Result<Vec<SosRequest>, PersistenceError> {
        queries::sos_requests::list_active(&mut self.conn)
    }

    /// Counts a patient's active requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_active_sos_requests(&mut self, patient_id: &str) -> Result<usize, PersistenceError> {
        queries::sos_requests::count_active_for_patient(&mut self.conn, patient_id)
    }

    /// Finds a patient's request by idempotency key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_sos_request_by_idempotency_key(
        &mut self,
        patient_id: &str,
        idempotency_key: &str,
    ) -> Result<Option<SosRequest>, PersistenceError> {
        queries::sos_requests::find_by_idempotency_key(&mut self.conn, patient_id, idempotency_key)
    }

    /// Moves an active request to a terminal status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is missing or no longer active.
    pub fn set_sos_status(
        &mut self,
        sos_request_id: i64,
        new_status: SosStatus,
        now: OffsetDateTime,
    ) -> Result<SosRequest, PersistenceError> {
        mutations::sos_requests::set_sos_status(&mut self.conn, sos_request_id, new_status, now)
    }

    /// Deletes a request with no responses.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is missing or has responses.
    pub fn delete_sos_request(&mut self, sos_request_id: i64) -> Result<(), PersistenceError> {
        mutations::sos_requests::delete_sos_request(&mut self.conn, sos_request_id)
    }

    /// Cancels active requests that expired before `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the candidate list cannot be read.
    pub fn expire_sweep(&mut self, now: OffsetDateTime) -> Result<SweepReport, PersistenceError> {
        mutations::sos_requests::expire_sweep(&mut self.conn, now)
    }

    // ========================================================================
    // SOS Responses
    // ========================================================================

    /// Records a donor's response to an active request.
    ///
    /// # Errors
    ///
    /// Returns an error if the donor already responded or the request is
    /// missing or inactive.
    pub fn respond(
        &mut self,
        sos_request_id: i64,
        donor_id: &str,
        message: Option<&str>,
        now: OffsetDateTime,
    ) -> Result<SosResponse, PersistenceError> {
        mutations::sos_responses::respond(&mut self.conn, sos_request_id, donor_id, message, now)
    }

    /// Retrieves a response.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_response(
        &mut self,
        sos_response_id: i64,
    ) -> Result<Option<SosResponse>, PersistenceError> {
        queries::sos_responses::get_response(&mut self.conn, sos_response_id)
    }

    /// Retrieves a donor's response to a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_response_for_donor(
        &mut self,
        sos_request_id: i64,
        donor_id: &str,
    ) -> Result<Option<SosResponse>, PersistenceError> {
        queries::sos_responses::get_for_request_and_donor(&mut self.conn, sos_request_id, donor_id)
    }

    /// Returns true if the donor has responded to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn has_responded(
        &mut self,
        sos_request_id: i64,
        donor_id: &str,
    ) -> Result<bool, PersistenceError> {
        queries::sos_responses::has_responded(&mut self.conn, sos_request_id, donor_id)
    }

    /// Lists a request's responses with donor user records, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_responses_for_request(
        &mut self,
        sos_request_id: i64,
    ) -> Result<Vec<(SosResponse, User)>, PersistenceError> {
        queries::sos_responses::list_by_request(&mut self.conn, sos_request_id)
    }

    /// Lists a donor's responses, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_responses_for_donor(
        &mut self,
        donor_id: &str,
    ) -> Result<Vec<SosResponse>, PersistenceError> {
        queries::sos_responses::list_by_donor(&mut self.conn, donor_id)
    }

    /// Moves a response from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns an error if the response is missing or its status changed.
    pub fn update_response_status(
        &mut self,
        sos_response_id: i64,
        from: ResponseStatus,
        to: ResponseStatus,
        now: OffsetDateTime,
    ) -> Result<SosResponse, PersistenceError> {
        mutations::sos_responses::update_response_status(
            &mut self.conn,
            sos_response_id,
            from,
            to,
            now,
        )
    }

    /// Withdraws a donor's own response.
    ///
    /// # Errors
    ///
    /// Returns an error if the response is missing, not owned, or locked.
    pub fn delete_response(
        &mut self,
        sos_response_id: i64,
        donor_id: &str,
    ) -> Result<(), PersistenceError> {
        mutations::sos_responses::delete_response(&mut self.conn, sos_response_id, donor_id)
    }
}
