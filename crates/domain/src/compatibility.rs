// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! ABO/Rh donor-recipient compatibility.
//!
//! The matrix is static: `O-` donates to every group, `AB+` receives from
//! every group, an Rh-negative donor may give to both Rh signs of a
//! compatible ABO type, and an Rh-positive donor only to Rh-positive.
//!
//! The `*_label` variants accept raw strings from loosely-typed callers and
//! fail soft: an unknown label matches nothing.

use crate::blood_group::BloodGroup;
use std::str::FromStr;

use BloodGroup::{
    ANegative, APositive, AbNegative, AbPositive, BNegative, BPositive, ONegative, OPositive,
};

/// Returns the blood groups that can donate to `recipient`.
#[must_use]
pub const fn compatible_donors_for(recipient: BloodGroup) -> &'static [BloodGroup] {
    match recipient {
        ONegative => &[ONegative],
        OPositive => &[ONegative, OPositive],
        ANegative => &[ONegative, ANegative],
        APositive => &[ONegative, OPositive, ANegative, APositive],
        BNegative => &[ONegative, BNegative],
        BPositive => &[ONegative, OPositive, BNegative, BPositive],
        AbNegative => &[ONegative, ANegative, BNegative, AbNegative],
        AbPositive => &[
            ONegative, OPositive, ANegative, APositive, BNegative, BPositive, AbNegative,
            AbPositive,
        ],
    }
}

/// Returns the blood groups that can receive from `donor`.
#[must_use]
pub const fn compatible_recipients_for(donor: BloodGroup) -> &'static [BloodGroup] {
    match donor {
        ONegative => &[
            ONegative, OPositive, ANegative, APositive, BNegative, BPositive, AbNegative,
            AbPositive,
        ],
        OPositive => &[OPositive, APositive, BPositive, AbPositive],
        ANegative => &[ANegative, APositive, AbNegative, AbPositive],
        APositive => &[APositive, AbPositive],
        BNegative => &[BNegative, BPositive, AbNegative, AbPositive],
        BPositive => &[BPositive, AbPositive],
        AbNegative => &[AbNegative, AbPositive],
        AbPositive => &[AbPositive],
    }
}

/// Returns true if blood from `donor` may be given to `recipient`.
#[must_use]
pub fn is_compatible(donor: BloodGroup, recipient: BloodGroup) -> bool {
    compatible_donors_for(recipient).contains(&donor)
}

/// Label-level variant of [`compatible_donors_for`].
///
/// Returns an empty list for an unrecognised label.
#[must_use]
pub fn compatible_donors_for_label(recipient: &str) -> Vec<BloodGroup> {
    BloodGroup::from_str(recipient)
        .map(|group| compatible_donors_for(group).to_vec())
        .unwrap_or_default()
}

/// Label-level variant of [`compatible_recipients_for`].
///
/// Returns an empty list for an unrecognised label.
#[must_use]
pub fn compatible_recipients_for_label(donor: &str) -> Vec<BloodGroup> {
    BloodGroup::from_str(donor)
        .map(|group| compatible_recipients_for(group).to_vec())
        .unwrap_or_default()
}

/// Label-level variant of [`is_compatible`].
///
/// Returns false when either label is unrecognised.
#[must_use]
pub fn is_compatible_label(donor: &str, recipient: &str) -> bool {
    match (BloodGroup::from_str(donor), BloodGroup::from_str(recipient)) {
        (Ok(donor), Ok(recipient)) => is_compatible(donor, recipient),
        _ => false,
    }
}
