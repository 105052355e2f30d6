// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! SOS request and response lifecycle states.
//!
//! A request starts `active` and moves once to `fulfilled` or `cancelled`.
//! Expiry is not a separate state: the sweep cancels expired requests.
//!
//! A response starts `interested`. The patient may confirm or decline it,
//! and either party's workflow may mark it completed. `declined` and
//! `completed` are terminal.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of an SOS request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SosStatus {
    /// Open and visible to matching donors.
    Active,
    /// The patient received the blood they needed.
    Fulfilled,
    /// Withdrawn by the patient or expired by the sweep.
    Cancelled,
}

impl SosStatus {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Fulfilled => "fulfilled",
            Self::Cancelled => "cancelled",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "active" => Ok(Self::Active),
            "fulfilled" => Ok(Self::Fulfilled),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidSosStatus(s.to_string())),
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Fulfilled | Self::Cancelled)
    }

    /// Validates a transition from this status to `new_status`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` unless the request is
    /// active and the target is fulfilled or cancelled.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "request is no longer active".to_string(),
            });
        }

        if matches!(new_status, Self::Fulfilled | Self::Cancelled) {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "request is already active".to_string(),
            })
        }
    }
}

impl FromStr for SosStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for SosStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle state of a donor's response to an SOS request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// The donor offered to help.
    Interested,
    /// The patient accepted the offer.
    Confirmed,
    /// The offer was turned down.
    Declined,
    /// The donation took place.
    Completed,
}

impl ResponseStatus {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Interested => "interested",
            Self::Confirmed => "confirmed",
            Self::Declined => "declined",
            Self::Completed => "completed",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interested" => Ok(Self::Interested),
            "confirmed" => Ok(Self::Confirmed),
            "declined" => Ok(Self::Declined),
            "completed" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidResponseStatus(s.to_string())),
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Completed)
    }

    /// Returns true if the donor may still withdraw a response in this
    /// state.
    #[must_use]
    pub const fn is_withdrawable(&self) -> bool {
        !matches!(self, Self::Confirmed | Self::Completed)
    }

    /// Validates a transition from this status to `new_status`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidStatusTransition` if the transition is
    /// not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        let valid: bool = match self {
            Self::Interested => matches!(
                new_status,
                Self::Confirmed | Self::Declined | Self::Completed
            ),
            Self::Confirmed => matches!(new_status, Self::Completed | Self::Declined),
            Self::Declined | Self::Completed => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by response lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for ResponseStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
