// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! Identity comes from an upstream identity provider; this crate only sees
//! the resulting `{user_id, role}` pair.

use lifeline_domain::{SosRequest, UserRole};
use std::str::FromStr;

use crate::error::AuthError;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The identity-provider user id.
    pub user_id: String,
    /// The role asserted by the identity provider.
    pub role: UserRole,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    #[must_use]
    pub const fn new(user_id: String, role: UserRole) -> Self {
        Self { user_id, role }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Builds an actor from the identity provider's assertions.
///
/// # Errors
///
/// Returns `AuthError::AuthenticationFailed` if the id is missing or blank,
/// or the role is missing or unrecognised.
pub fn authenticate(
    user_id: Option<&str>,
    role: Option<&str>,
) -> Result<AuthenticatedActor, AuthError> {
    let user_id: &str = user_id.map(str::trim).unwrap_or_default();
    if user_id.is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("User id is missing"),
        });
    }
    let role: UserRole = role
        .ok_or_else(|| AuthError::AuthenticationFailed {
            reason: String::from("User role is missing"),
        })
        .and_then(|label| {
            UserRole::from_str(label.trim()).map_err(|e| AuthError::AuthenticationFailed {
                reason: e.to_string(),
            })
        })?;
    Ok(AuthenticatedActor::new(user_id.to_string(), role))
}

/// Authorization service for enforcing role and ownership rules.
pub struct AuthorizationService;

impl AuthorizationService {
    fn require_role(
        actor: &AuthenticatedActor,
        action: &str,
        allowed: &[UserRole],
    ) -> Result<(), AuthError> {
        if allowed.contains(&actor.role) {
            return Ok(());
        }
        let required_role: String = allowed
            .iter()
            .map(UserRole::as_str)
            .collect::<Vec<&str>>()
            .join(" or ");
        Err(AuthError::Unauthorized {
            action: action.to_string(),
            required_role,
        })
    }

    /// Only patients may raise SOS requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a patient.
    pub fn authorize_create_sos(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_role(actor, "create_sos_request", &[UserRole::Patient])
    }

    /// Donor-only actions: responding, availability, donor profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a donor.
    pub fn authorize_donor(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        Self::require_role(actor, action, &[UserRole::Donor])
    }

    /// Blood-bank-only actions.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not a blood bank.
    pub fn authorize_blood_bank(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        Self::require_role(actor, action, &[UserRole::BloodBank])
    }

    /// Administrator-only actions.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn authorize_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        Self::require_role(actor, action, &[UserRole::Admin])
    }

    /// Donations are recorded by the donor, a blood bank, or an admin.
    ///
    /// # Errors
    ///
    /// Returns an error for patients.
    pub fn authorize_record_donation(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_role(
            actor,
            "record_donation",
            &[UserRole::Donor, UserRole::BloodBank, UserRole::Admin],
        )
    }

    /// Mutations of a request are reserved to its patient.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` if the actor does not own the request.
    pub fn authorize_request_owner(
        actor: &AuthenticatedActor,
        request: &SosRequest,
        action: &str,
    ) -> Result<(), AuthError> {
        if request.is_owned_by(&actor.user_id) {
            return Ok(());
        }
        Err(AuthError::Forbidden {
            action: action.to_string(),
            reason: format!("SOS request {} belongs to another patient", request.id),
        })
    }

    /// Request management reads are open to the patient and to admins.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Forbidden` for anyone else.
    pub fn authorize_request_manager(
        actor: &AuthenticatedActor,
        request: &SosRequest,
        action: &str,
    ) -> Result<(), AuthError> {
        if actor.is_admin() {
            return Ok(());
        }
        Self::authorize_request_owner(actor, request, action)
    }
}
