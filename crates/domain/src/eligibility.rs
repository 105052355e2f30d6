// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Donor eligibility rules and donation statistics.
//!
//! Eligibility has two independent parts:
//!
//! - time based: a minimum interval (56 days) between whole-blood
//!   donations;
//! - medical: age between 18 and 65 inclusive and weight of at least 50 kg.
//!
//! All functions here are pure; the caller supplies `now`.

use time::{Duration, OffsetDateTime};

/// Minimum number of days between two donations.
pub const DONATION_INTERVAL_DAYS: i64 = 56;

/// Minimum donor age in years (inclusive).
pub const MIN_DONOR_AGE: u32 = 18;

/// Maximum donor age in years (inclusive).
pub const MAX_DONOR_AGE: u32 = 65;

/// Minimum donor weight in kilograms (inclusive).
pub const MIN_DONOR_WEIGHT_KG: f64 = 50.0;

/// Lives a single donation may save.
pub const LIVES_PER_DONATION: u64 = 3;

const SECONDS_PER_DAY: i64 = 86_400;

/// Result of the time-based eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeEligibility {
    pub is_eligible: bool,
    /// Set only while the donor is still waiting.
    pub next_eligible_date: Option<OffsetDateTime>,
    /// Zero once eligible.
    pub days_remaining: i64,
}

/// Result of the medical eligibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicalEligibility {
    pub is_eligible: bool,
    /// One entry per violated rule, empty when eligible.
    pub reasons: Vec<String>,
}

/// Checks whether enough whole days have passed since the last donation.
///
/// A donor who has never donated is immediately eligible. Days are
/// counted with floor division over elapsed seconds.
#[must_use]
pub fn check_time_eligibility(
    last_donation: Option<OffsetDateTime>,
    now: OffsetDateTime,
    interval_days: i64,
) -> TimeEligibility {
    let Some(last_donation) = last_donation else {
        return TimeEligibility {
            is_eligible: true,
            next_eligible_date: None,
            days_remaining: 0,
        };
    };

    let days_since: i64 = (now - last_donation)
        .whole_seconds()
        .div_euclid(SECONDS_PER_DAY);

    if days_since >= interval_days {
        return TimeEligibility {
            is_eligible: true,
            next_eligible_date: None,
            days_remaining: 0,
        };
    }

    TimeEligibility {
        is_eligible: false,
        next_eligible_date: Some(last_donation.saturating_add(Duration::days(interval_days))),
        days_remaining: interval_days - days_since,
    }
}

/// Checks the age and weight rules.
#[must_use]
pub fn check_medical_eligibility(age: u32, weight_kg: f64) -> MedicalEligibility {
    let mut reasons: Vec<String> = Vec::new();

    if age < MIN_DONOR_AGE {
        reasons.push(format!("Minimum age is {MIN_DONOR_AGE} years"));
    }
    if age > MAX_DONOR_AGE {
        reasons.push(format!("Maximum age is {MAX_DONOR_AGE} years"));
    }
    if weight_kg.is_nan() || weight_kg < MIN_DONOR_WEIGHT_KG {
        reasons.push(format!("Minimum weight is {MIN_DONOR_WEIGHT_KG} kg"));
    }

    MedicalEligibility {
        is_eligible: reasons.is_empty(),
        reasons,
    }
}

/// Donor recognition tiers, keyed on cumulative donation count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DonorLevel {
    NewDonor,
    ActiveDonor,
    RegularDonor,
    ChampionDonor,
    HeroDonor,
}

impl DonorLevel {
    /// Resolves the level for a donation count.
    #[must_use]
    pub const fn for_count(donation_count: u32) -> Self {
        match donation_count {
            0..5 => Self::NewDonor,
            5..10 => Self::ActiveDonor,
            10..25 => Self::RegularDonor,
            25..50 => Self::ChampionDonor,
            _ => Self::HeroDonor,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NewDonor => "New Donor",
            Self::ActiveDonor => "Active Donor",
            Self::RegularDonor => "Regular Donor",
            Self::ChampionDonor => "Champion Donor",
            Self::HeroDonor => "Hero Donor",
        }
    }

    /// Donation count at which the next recognition is reached.
    #[must_use]
    pub const fn next_milestone(&self) -> u32 {
        match self {
            Self::NewDonor => 5,
            Self::ActiveDonor => 10,
            Self::RegularDonor => 25,
            Self::ChampionDonor => 50,
            Self::HeroDonor => 100,
        }
    }
}

/// Summary statistics shown to a donor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DonorStats {
    pub lives_saved: u64,
    pub level: DonorLevel,
    pub next_milestone: u32,
    pub donations_until_next: u32,
}

/// Computes donor statistics from the cumulative donation count.
#[must_use]
pub fn compute_stats(donation_count: u32) -> DonorStats {
    let level: DonorLevel = DonorLevel::for_count(donation_count);
    let next_milestone: u32 = level.next_milestone();
    DonorStats {
        lives_saved: u64::from(donation_count) * LIVES_PER_DONATION,
        level,
        next_milestone,
        donations_until_next: next_milestone.saturating_sub(donation_count),
    }
}
