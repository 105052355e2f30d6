// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Reciprocal contact disclosure.
//!
//! A request's contact person and phone are shown to its patient, to
//! administrators, and to donors who have responded to it. A responding
//! donor's name and phone are shown to the request's patient and to
//! administrators.

use lifeline_domain::{SosRequest, UserRole};

/// Why a viewer may (or may not) see the contact details of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactAccess {
    Owner,
    Admin,
    Responder,
    Hidden,
}

impl ContactAccess {
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        !matches!(self, Self::Hidden)
    }
}

/// Decides whether `viewer_id` may see the contact details on `request`.
///
/// `has_responded` must reflect whether a response record exists for this
/// viewer and request.
#[must_use]
pub fn request_contact_access(
    request: &SosRequest,
    viewer_id: &str,
    viewer_role: UserRole,
    has_responded: bool,
) -> ContactAccess {
    if request.is_owned_by(viewer_id) {
        ContactAccess::Owner
    } else if viewer_role == UserRole::Admin {
        ContactAccess::Admin
    } else if has_responded {
        ContactAccess::Responder
    } else {
        ContactAccess::Hidden
    }
}

/// Decides whether `viewer_id` may see the contact details of donors who
/// responded to `request`.
#[must_use]
pub fn responder_contact_access(
    request: &SosRequest,
    viewer_id: &str,
    viewer_role: UserRole,
) -> ContactAccess {
    if request.is_owned_by(viewer_id) {
        ContactAccess::Owner
    } else if viewer_role == UserRole::Admin {
        ContactAccess::Admin
    } else {
        ContactAccess::Hidden
    }
}
