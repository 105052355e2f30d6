// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    BloodGroup, DomainError, DonorLevel, DonorProfile, Urgency, UserRole, format_timestamp,
    parse_timestamp,
};
use std::str::FromStr;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

fn create_test_donor(now: OffsetDateTime) -> DonorProfile {
    DonorProfile::new("donor-1", BloodGroup::OPositive, 30, 70.0, None, now).unwrap()
}

#[test]
fn test_urgency_parse_is_case_insensitive() {
    assert_eq!(Urgency::from_str("CRITICAL").unwrap(), Urgency::Critical);
    assert_eq!(Urgency::from_str(" Urgent ").unwrap(), Urgency::Urgent);
    assert!(matches!(
        Urgency::from_str("whenever"),
        Err(DomainError::InvalidUrgency(_))
    ));
}

#[test]
fn test_urgency_rank_orders_critical_first() {
    assert!(Urgency::Critical.rank() < Urgency::Urgent.rank());
    assert!(Urgency::Urgent.rank() < Urgency::Normal.rank());
    assert_eq!(Urgency::default(), Urgency::Normal);
}

#[test]
fn test_user_role_parse() {
    assert_eq!(UserRole::from_str("blood-bank").unwrap(), UserRole::BloodBank);
    assert_eq!(UserRole::from_str("blood_bank").unwrap(), UserRole::BloodBank);
    assert_eq!(UserRole::from_str("Admin").unwrap(), UserRole::Admin);
    assert!(UserRole::from_str("nurse").is_err());
}

#[test]
fn test_new_eligible_donor_starts_available() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let donor: DonorProfile = create_test_donor(now);
    assert!(donor.is_eligible);
    assert!(donor.is_available);
    assert_eq!(donor.donation_count, 0);
}

#[test]
fn test_new_underage_donor_is_unavailable() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let donor: DonorProfile =
        DonorProfile::new("donor-2", BloodGroup::ANegative, 16, 55.0, None, now).unwrap();
    assert!(!donor.is_eligible);
    assert!(!donor.is_available);
}

#[test]
fn test_new_donor_rejects_impossible_weight() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let result: Result<DonorProfile, DomainError> =
        DonorProfile::new("donor-3", BloodGroup::BPositive, 30, -1.0, None, now);
    assert!(matches!(result, Err(DomainError::InvalidDonorProfile(_))));
}

#[test]
fn test_record_donation_clears_eligibility_and_availability() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let mut donor: DonorProfile = create_test_donor(now);

    donor.record_donation(now, now).unwrap();

    assert_eq!(donor.donation_count, 1);
    assert_eq!(donor.last_donation_at, Some(now));
    assert!(!donor.is_eligible);
    assert!(!donor.is_available);
    assert_eq!(donor.stats().level, DonorLevel::NewDonor);
}

#[test]
fn test_backfilled_donation_keeps_latest_date() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let mut donor: DonorProfile = create_test_donor(now);
    donor.record_donation(now, now).unwrap();

    let older: OffsetDateTime = now - Duration::days(100);
    donor.record_donation(older, now).unwrap();

    assert_eq!(donor.donation_count, 2);
    assert_eq!(donor.last_donation_at, Some(now));
    assert!(!donor.is_eligible);
    assert!(donor.set_availability(true, now).is_err());
}

#[test]
fn test_old_first_donation_leaves_donor_eligible() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let mut donor: DonorProfile = create_test_donor(now);

    donor.record_donation(now - Duration::days(90), now).unwrap();

    assert_eq!(donor.donation_count, 1);
    assert!(donor.is_eligible);
}

#[test]
fn test_record_donation_overflow() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let mut donor: DonorProfile = create_test_donor(now);
    donor.donation_count = u32::MAX;
    assert!(matches!(
        donor.record_donation(now, now),
        Err(DomainError::DonationCountOverflow)
    ));
    assert_eq!(donor.donation_count, u32::MAX);
}

#[test]
fn test_availability_requires_elapsed_interval() {
    let donated: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let mut donor: DonorProfile = create_test_donor(donated);
    donor.record_donation(donated, donated).unwrap();

    let too_soon: OffsetDateTime = donated + Duration::days(55);
    let result: Result<(), DomainError> = donor.set_availability(true, too_soon);
    match result {
        Err(DomainError::DonorNotEligible { reasons }) => {
            assert_eq!(reasons, vec![String::from("Next donation possible in 1 days")]);
        }
        other => panic!("expected DonorNotEligible, got {other:?}"),
    }
    assert!(!donor.is_available);

    let later: OffsetDateTime = donated + Duration::days(56);
    donor.set_availability(true, later).unwrap();
    assert!(donor.is_available);
    assert!(donor.is_eligible);
}

#[test]
fn test_turning_availability_off_always_succeeds() {
    let now: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);
    let mut donor: DonorProfile =
        DonorProfile::new("donor-4", BloodGroup::AbNegative, 70, 80.0, None, now).unwrap();
    assert!(donor.set_availability(false, now).is_ok());
    assert!(!donor.is_available);
}

#[test]
fn test_refresh_eligibility_after_interval() {
    let donated: OffsetDateTime = datetime!(2026-01-01 08:00 UTC);
    let mut donor: DonorProfile = create_test_donor(donated);
    donor.record_donation(donated, donated).unwrap();

    assert!(donor.refresh_eligibility(donated + Duration::days(60)));
    assert!(!donor.is_available);
}

#[test]
fn test_timestamp_format_is_fixed_width_utc() {
    let ts: OffsetDateTime = datetime!(2026-03-01 12:34:56.789 +05:30);
    let formatted: String = format_timestamp(ts).unwrap();
    assert_eq!(formatted, "2026-03-01T07:04:56Z");
    assert_eq!(
        parse_timestamp(&formatted).unwrap(),
        datetime!(2026-03-01 07:04:56 UTC)
    );
}

#[test]
fn test_timestamp_parse_rejects_garbage() {
    assert!(matches!(
        parse_timestamp("yesterday"),
        Err(DomainError::DateParseError { .. })
    ));
}
