// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use lifeline_domain::User;
use tracing::debug;

use crate::data_models::UserRow;
use crate::diesel_schema::users;
use crate::error::PersistenceError;

/// Retrieves a user by identity-provider id.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
/// Returns `Ok(None)` if the user is not found.
pub fn get_user(conn: &mut SqliteConnection, user_id: &str) -> Result<Option<User>, PersistenceError> {
    debug!(user_id, "Looking up user");

    let row: Option<UserRow> = users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_user: {e}")))?;

    row.map(User::try_from).transpose()
}
