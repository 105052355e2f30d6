// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the eight ABO/Rh blood groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodGroup {
    /// Every blood group, in display order.
    pub const ALL: [Self; 8] = [
        Self::APositive,
        Self::ANegative,
        Self::BPositive,
        Self::BNegative,
        Self::AbPositive,
        Self::AbNegative,
        Self::OPositive,
        Self::ONegative,
    ];

    /// Returns the canonical label used for persistence and serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }

    /// Returns true for Rh-negative groups.
    #[must_use]
    pub const fn is_rh_negative(&self) -> bool {
        matches!(
            self,
            Self::ANegative | Self::BNegative | Self::AbNegative | Self::ONegative
        )
    }
}

impl FromStr for BloodGroup {
    type Err = DomainError;

    /// Parses a blood group label.
    ///
    /// Accepts surrounding whitespace, lowercase letters and the Unicode
    /// minus sign (`U+2212`) in place of `-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s.trim().replace('\u{2212}', "-").to_uppercase();
        match normalized.as_str() {
            "A+" => Ok(Self::APositive),
            "A-" => Ok(Self::ANegative),
            "B+" => Ok(Self::BPositive),
            "B-" => Ok(Self::BNegative),
            "AB+" => Ok(Self::AbPositive),
            "AB-" => Ok(Self::AbNegative),
            "O+" => Ok(Self::OPositive),
            "O-" => Ok(Self::ONegative),
            _ => Err(DomainError::InvalidBloodGroup(s.to_string())),
        }
    }
}

impl std::fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
