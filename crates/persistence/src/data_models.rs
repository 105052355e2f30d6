// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversion into domain values.
//!
//! Rows are validated here, at the store boundary: an unparseable status,
//! blood group or timestamp surfaces as `PersistenceError::CorruptRecord`.

use diesel::prelude::*;
use lifeline_domain::{
    BloodBankProfile, BloodGroup, Coordinates, DonorProfile, ResponseStatus, SosRequest,
    SosResponse, SosStatus, Urgency, User, UserRole, format_timestamp, parse_optional_timestamp,
    parse_timestamp,
};
use num_traits::ToPrimitive;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::diesel_schema::{blood_banks, donors, sos_requests, sos_responses, users};
use crate::error::PersistenceError;

/// Outcome of an expiry sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Requests moved from active to cancelled.
    pub processed: usize,
    /// Requests that could not be updated.
    pub failed_ids: Vec<i64>,
}

/// Formats a timestamp for storage.
pub(crate) fn timestamp_text(timestamp: OffsetDateTime) -> Result<String, PersistenceError> {
    format_timestamp(timestamp)
        .map_err(|e| PersistenceError::QueryFailed(format!("timestamp: {e}")))
}

pub(crate) fn optional_timestamp_text(
    timestamp: Option<OffsetDateTime>,
) -> Result<Option<String>, PersistenceError> {
    timestamp.map(timestamp_text).transpose()
}

pub(crate) fn flag(value: bool) -> i32 {
    i32::from(value)
}

fn corrupt(table: &str, key: &str, detail: impl std::fmt::Display) -> PersistenceError {
    PersistenceError::CorruptRecord(format!("{table} {key}: {detail}"))
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
pub(crate) struct UserRow {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub is_verified: i32,
}

impl TryFrom<UserRow> for User {
    type Error = PersistenceError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: UserRole =
            UserRole::from_str(&row.role).map_err(|e| corrupt("users", &row.user_id, e))?;
        let location: Option<Coordinates> = match (row.latitude, row.longitude) {
            (Some(latitude), Some(longitude)) => Some(
                Coordinates::new(latitude, longitude)
                    .map_err(|e| corrupt("users", &row.user_id, e))?,
            ),
            _ => None,
        };
        Ok(Self {
            id: row.user_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            role,
            location,
            address: row.address,
            is_verified: row.is_verified != 0,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = donors)]
pub(crate) struct DonorRow {
    pub user_id: String,
    pub blood_group: String,
    pub last_donation_at: Option<String>,
    pub donation_count: i32,
    pub is_available: i32,
    pub is_eligible: i32,
    pub age: i32,
    pub weight_kg: f64,
    pub notifications_enabled: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<DonorRow> for DonorProfile {
    type Error = PersistenceError;

    fn try_from(row: DonorRow) -> Result<Self, Self::Error> {
        let key: &str = &row.user_id;
        Ok(Self {
            blood_group: BloodGroup::from_str(&row.blood_group)
                .map_err(|e| corrupt("donors", key, e))?,
            last_donation_at: parse_optional_timestamp(row.last_donation_at.as_deref())
                .map_err(|e| corrupt("donors", key, e))?,
            donation_count: row
                .donation_count
                .to_u32()
                .ok_or_else(|| corrupt("donors", key, "negative donation_count"))?,
            is_available: row.is_available != 0,
            is_eligible: row.is_eligible != 0,
            age: row
                .age
                .to_u32()
                .ok_or_else(|| corrupt("donors", key, "negative age"))?,
            weight_kg: row.weight_kg,
            notifications_enabled: row.notifications_enabled != 0,
            created_at: parse_timestamp(&row.created_at).map_err(|e| corrupt("donors", key, e))?,
            updated_at: parse_timestamp(&row.updated_at).map_err(|e| corrupt("donors", key, e))?,
            user_id: row.user_id,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = blood_banks)]
pub(crate) struct BloodBankRow {
    pub user_id: String,
    pub organization_name: String,
    pub license_number: String,
    pub operating_hours: Option<String>,
    pub contact_person: String,
    pub contact_phone: String,
    pub website: Option<String>,
    pub is_verified: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<BloodBankRow> for BloodBankProfile {
    type Error = PersistenceError;

    fn try_from(row: BloodBankRow) -> Result<Self, Self::Error> {
        let bad = |e: lifeline_domain::DomainError| corrupt("blood_banks", &row.user_id, e);
        let created_at: OffsetDateTime = parse_timestamp(&row.created_at).map_err(bad)?;
        let updated_at: OffsetDateTime = parse_timestamp(&row.updated_at).map_err(bad)?;
        Ok(Self {
            user_id: row.user_id,
            organization_name: row.organization_name,
            license_number: row.license_number,
            operating_hours: row.operating_hours,
            contact_person: row.contact_person,
            contact_phone: row.contact_phone,
            website: row.website,
            is_verified: row.is_verified != 0,
            created_at,
            updated_at,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = sos_requests)]
pub(crate) struct SosRequestRow {
    pub sos_request_id: i64,
    pub patient_id: String,
    pub blood_group: String,
    pub units_needed: i32,
    pub urgency: String,
    pub hospital_name: String,
    pub hospital_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub contact_person: String,
    pub contact_phone: String,
    pub medical_notes: Option<String>,
    pub status: String,
    pub response_count: i32,
    pub created_at: String,
    pub updated_at: String,
    pub expires_at: String,
    pub fulfilled_at: Option<String>,
    pub idempotency_key: Option<String>,
}

impl TryFrom<SosRequestRow> for SosRequest {
    type Error = PersistenceError;

    fn try_from(row: SosRequestRow) -> Result<Self, Self::Error> {
        let key: String = row.sos_request_id.to_string();
        let bad = |e: lifeline_domain::DomainError| corrupt("sos_requests", &key, e);
        Ok(Self {
            id: row.sos_request_id,
            blood_group: BloodGroup::from_str(&row.blood_group).map_err(bad)?,
            units_needed: row
                .units_needed
                .to_u8()
                .ok_or_else(|| corrupt("sos_requests", &key, "units_needed out of range"))?,
            urgency: Urgency::from_str(&row.urgency).map_err(bad)?,
            location: Coordinates::new(row.latitude, row.longitude).map_err(bad)?,
            status: SosStatus::from_str(&row.status).map_err(bad)?,
            response_count: row
                .response_count
                .to_u32()
                .ok_or_else(|| corrupt("sos_requests", &key, "negative response_count"))?,
            created_at: parse_timestamp(&row.created_at).map_err(bad)?,
            updated_at: parse_timestamp(&row.updated_at).map_err(bad)?,
            expires_at: parse_timestamp(&row.expires_at).map_err(bad)?,
            fulfilled_at: parse_optional_timestamp(row.fulfilled_at.as_deref()).map_err(bad)?,
            patient_id: row.patient_id,
            hospital_name: row.hospital_name,
            hospital_address: row.hospital_address,
            contact_person: row.contact_person,
            contact_phone: row.contact_phone,
            medical_notes: row.medical_notes,
            idempotency_key: row.idempotency_key,
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = sos_responses)]
pub(crate) struct SosResponseRow {
    pub sos_response_id: i64,
    pub sos_request_id: i64,
    pub donor_id: String,
    pub status: String,
    pub message: Option<String>,
    pub responded_at: String,
    pub confirmed_at: Option<String>,
    pub completed_at: Option<String>,
    pub updated_at: String,
}

impl TryFrom<SosResponseRow> for SosResponse {
    type Error = PersistenceError;

    fn try_from(row: SosResponseRow) -> Result<Self, Self::Error> {
        let key: String = row.sos_response_id.to_string();
        let bad = |e: lifeline_domain::DomainError| corrupt("sos_responses", &key, e);
        Ok(Self {
            id: row.sos_response_id,
            sos_request_id: row.sos_request_id,
            status: ResponseStatus::from_str(&row.status).map_err(bad)?,
            responded_at: parse_timestamp(&row.responded_at).map_err(bad)?,
            confirmed_at: parse_optional_timestamp(row.confirmed_at.as_deref()).map_err(bad)?,
            completed_at: parse_optional_timestamp(row.completed_at.as_deref()).map_err(bad)?,
            updated_at: parse_timestamp(&row.updated_at).map_err(bad)?,
            donor_id: row.donor_id,
            message: row.message,
        })
    }
}

/// Converts a batch of rows, failing on the first corrupt row.
pub(crate) fn convert_rows<R, T>(rows: Vec<R>) -> Result<Vec<T>, PersistenceError>
where
    T: TryFrom<R, Error = PersistenceError>,
{
    rows.into_iter().map(T::try_from).collect()
}
