// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::SqliteConnection;
use lifeline_domain::User;
use time::OffsetDateTime;
use tracing::debug;

use crate::data_models::{flag, timestamp_text};
use crate::diesel_schema::users;
use crate::error::PersistenceError;

/// Inserts or refreshes a user record from the identity provider.
///
/// `is_verified` is only written on first insert.
///
/// # Errors
///
/// Returns an error if the statement fails.
pub fn upsert_user(
    conn: &mut SqliteConnection,
    user: &User,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let now_text: String = timestamp_text(now)?;
    let latitude: Option<f64> = user.location.map(|c| c.latitude());
    let longitude: Option<f64> = user.location.map(|c| c.longitude());

    diesel::insert_into(users::table)
        .values((
            users::user_id.eq(&user.id),
            users::name.eq(&user.name),
            users::email.eq(&user.email),
            users::phone.eq(user.phone.as_deref()),
            users::role.eq(user.role.as_str()),
            users::latitude.eq(latitude),
            users::longitude.eq(longitude),
            users::address.eq(user.address.as_deref()),
            users::is_verified.eq(flag(user.is_verified)),
            users::created_at.eq(&now_text),
            users::updated_at.eq(&now_text),
        ))
        .on_conflict(users::user_id)
        .do_update()
        .set((
            users::name.eq(&user.name),
            users::email.eq(&user.email),
            users::phone.eq(user.phone.as_deref()),
            users::role.eq(user.role.as_str()),
            users::latitude.eq(latitude),
            users::longitude.eq(longitude),
            users::address.eq(user.address.as_deref()),
            users::updated_at.eq(&now_text),
        ))
        .execute(conn)?;

    debug!(user_id = %user.id, role = %user.role, "Upserted user");
    Ok(())
}
