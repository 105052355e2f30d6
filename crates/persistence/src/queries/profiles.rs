// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Donor and blood bank profile queries.

use diesel::prelude::*;
use diesel::SqliteConnection;
use lifeline_domain::{BloodBankProfile, DonorProfile, User};
use tracing::debug;

use crate::data_models::{BloodBankRow, DonorRow, UserRow};
use crate::diesel_schema::{blood_banks, donors, users};
use crate::error::PersistenceError;

/// Retrieves the donor profile for a user.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
/// Returns `Ok(None)` if the user has no donor profile.
pub fn get_donor_profile(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Option<DonorProfile>, PersistenceError> {
    let row: Option<DonorRow> = donors::table
        .filter(donors::user_id.eq(user_id))
        .select(DonorRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_donor_profile: {e}")))?;

    row.map(DonorProfile::try_from).transpose()
}

/// Lists available donors together with their user records.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_available_donors(
    conn: &mut SqliteConnection,
) -> Result<Vec<(DonorProfile, User)>, PersistenceError> {
    let rows: Vec<(DonorRow, UserRow)> = donors::table
        .inner_join(users::table)
        .filter(donors::is_available.eq(1))
        .order(donors::user_id.asc())
        .select((DonorRow::as_select(), UserRow::as_select()))
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_available_donors: {e}")))?;

    debug!(count = rows.len(), "Loaded available donors");

    rows.into_iter()
        .map(|(donor, user)| Ok((DonorProfile::try_from(donor)?, User::try_from(user)?)))
        .collect()
}

/// Retrieves the blood bank profile for a user.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
/// Returns `Ok(None)` if the user has no blood bank profile.
pub fn get_blood_bank_profile(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> Result<Option<BloodBankProfile>, PersistenceError> {
    let row: Option<BloodBankRow> = blood_banks::table
        .filter(blood_banks::user_id.eq(user_id))
        .select(BloodBankRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_blood_bank_profile: {e}")))?;

    row.map(BloodBankProfile::try_from).transpose()
}

/// Lists every blood bank together with its user record.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_blood_banks(
    conn: &mut SqliteConnection,
) -> Result<Vec<(BloodBankProfile, User)>, PersistenceError> {
    let rows: Vec<(BloodBankRow, UserRow)> = blood_banks::table
        .inner_join(users::table)
        .order(blood_banks::user_id.asc())
        .select((BloodBankRow::as_select(), UserRow::as_select()))
        .load(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_blood_banks: {e}")))?;

    rows.into_iter()
        .map(|(bank, user)| Ok((BloodBankProfile::try_from(bank)?, User::try_from(user)?)))
        .collect()
}
