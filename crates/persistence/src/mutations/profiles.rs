// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Donor and blood bank profile writes.

use diesel::prelude::*;
use diesel::SqliteConnection;
use lifeline_domain::{BloodBankProfile, DonorProfile};
use num_traits::ToPrimitive;
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::data_models::{flag, optional_timestamp_text, timestamp_text};
use crate::diesel_schema::{blood_banks, donors};
use crate::error::PersistenceError;

/// Inserts or replaces a donor profile. `created_at` is kept on update.
///
/// # Errors
///
/// Returns `PersistenceError::ReferenceMissing` if the user does not exist,
/// or another error if the statement fails.
pub fn save_donor_profile(
    conn: &mut SqliteConnection,
    profile: &DonorProfile,
) -> Result<(), PersistenceError> {
    let last_donation_at: Option<String> = optional_timestamp_text(profile.last_donation_at)?;
    let created_at: String = timestamp_text(profile.created_at)?;
    let updated_at: String = timestamp_text(profile.updated_at)?;
    let donation_count: i32 = profile.donation_count.to_i32().ok_or_else(|| {
        PersistenceError::QueryFailed(format!(
            "donation_count {} out of range",
            profile.donation_count
        ))
    })?;
    let age: i32 = profile
        .age
        .to_i32()
        .ok_or_else(|| PersistenceError::QueryFailed(format!("age {} out of range", profile.age)))?;

    diesel::insert_into(donors::table)
        .values((
            donors::user_id.eq(&profile.user_id),
            donors::blood_group.eq(profile.blood_group.as_str()),
            donors::last_donation_at.eq(last_donation_at.as_deref()),
            donors::donation_count.eq(donation_count),
            donors::is_available.eq(flag(profile.is_available)),
            donors::is_eligible.eq(flag(profile.is_eligible)),
            donors::age.eq(age),
            donors::weight_kg.eq(profile.weight_kg),
            donors::notifications_enabled.eq(flag(profile.notifications_enabled)),
            donors::created_at.eq(&created_at),
            donors::updated_at.eq(&updated_at),
        ))
        .on_conflict(donors::user_id)
        .do_update()
        .set((
            donors::blood_group.eq(profile.blood_group.as_str()),
            donors::last_donation_at.eq(last_donation_at.as_deref()),
            donors::donation_count.eq(donation_count),
            donors::is_available.eq(flag(profile.is_available)),
            donors::is_eligible.eq(flag(profile.is_eligible)),
            donors::age.eq(age),
            donors::weight_kg.eq(profile.weight_kg),
            donors::notifications_enabled.eq(flag(profile.notifications_enabled)),
            donors::updated_at.eq(&updated_at),
        ))
        .execute(conn)?;

    debug!(
        user_id = %profile.user_id,
        blood_group = %profile.blood_group,
        is_available = profile.is_available,
        "Saved donor profile"
    );
    Ok(())
}

/// Inserts or replaces a blood bank profile.
///
/// The verification flag is written on first insert only; see
/// [`set_blood_bank_verified`].
///
/// # Errors
///
/// Returns `PersistenceError::ReferenceMissing` if the user does not exist,
/// or another error if the statement fails.
pub fn save_blood_bank_profile(
    conn: &mut SqliteConnection,
    profile: &BloodBankProfile,
) -> Result<(), PersistenceError> {
    let created_at: String = timestamp_text(profile.created_at)?;
    let updated_at: String = timestamp_text(profile.updated_at)?;

    diesel::insert_into(blood_banks::table)
        .values((
            blood_banks::user_id.eq(&profile.user_id),
            blood_banks::organization_name.eq(&profile.organization_name),
            blood_banks::license_number.eq(&profile.license_number),
            blood_banks::operating_hours.eq(profile.operating_hours.as_deref()),
            blood_banks::contact_person.eq(&profile.contact_person),
            blood_banks::contact_phone.eq(&profile.contact_phone),
            blood_banks::website.eq(profile.website.as_deref()),
            blood_banks::is_verified.eq(flag(profile.is_verified)),
            blood_banks::created_at.eq(&created_at),
            blood_banks::updated_at.eq(&updated_at),
        ))
        .on_conflict(blood_banks::user_id)
        .do_update()
        .set((
            blood_banks::organization_name.eq(&profile.organization_name),
            blood_banks::license_number.eq(&profile.license_number),
            blood_banks::operating_hours.eq(profile.operating_hours.as_deref()),
            blood_banks::contact_person.eq(&profile.contact_person),
            blood_banks::contact_phone.eq(&profile.contact_phone),
            blood_banks::website.eq(profile.website.as_deref()),
            blood_banks::updated_at.eq(&updated_at),
        ))
        .execute(conn)?;

    debug!(user_id = %profile.user_id, "Saved blood bank profile");
    Ok(())
}

/// Sets the verification flag on a blood bank.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if there is no such blood bank.
pub fn set_blood_bank_verified(
    conn: &mut SqliteConnection,
    user_id: &str,
    verified: bool,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let now_text: String = timestamp_text(now)?;
    let updated: usize = diesel::update(blood_banks::table.filter(blood_banks::user_id.eq(user_id)))
        .set((
            blood_banks::is_verified.eq(flag(verified)),
            blood_banks::updated_at.eq(&now_text),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "blood bank {user_id}"
        )));
    }

    info!(user_id, verified, "Updated blood bank verification");
    Ok(())
}
