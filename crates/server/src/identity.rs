// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Identity extraction at the server boundary.
//!
//! The upstream identity proxy authenticates the caller and forwards the
//! result as two headers. This module turns them into an
//! [`AuthenticatedActor`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use lifeline_api::{AuthError, AuthenticatedActor, authenticate};
use tracing::{debug, warn};

use crate::{AppState, error_body};

/// Header carrying the identity provider's user id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Header carrying the identity provider's role.
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn my_handler(Identity(actor): Identity) -> Result<Json<Response>, HttpError> {
///     // actor: AuthenticatedActor
/// }
/// ```
///
/// # Errors
///
/// Rejects with HTTP 401 if either header is missing, not valid text, or
/// names an unknown role.
pub struct Identity(pub AuthenticatedActor);

fn header_text<'a>(parts: &'a Parts, name: &'static str) -> Result<Option<&'a str>, IdentityError> {
    parts
        .headers
        .get(name)
        .map(|value| {
            value.to_str().map_err(|_| {
                warn!(header = name, "Identity header is not valid text");
                IdentityError::InvalidHeader(name)
            })
        })
        .transpose()
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = IdentityError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id: Option<&str> = header_text(parts, USER_ID_HEADER)?;
        let role: Option<&str> = header_text(parts, USER_ROLE_HEADER)?;

        let actor: AuthenticatedActor = authenticate(user_id, role).map_err(|e| {
            debug!(error = %e, "Identity headers rejected");
            IdentityError::Rejected(e)
        })?;

        debug!(user_id = %actor.user_id, role = %actor.role, "Identity accepted");
        Ok(Self(actor))
    }
}

/// Identity extraction errors, returned as HTTP 401.
#[derive(Debug)]
pub enum IdentityError {
    /// A header was present but not valid text.
    InvalidHeader(&'static str),
    /// The headers were missing or named an unknown role.
    Rejected(AuthError),
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::InvalidHeader(name) => format!("Header {name} is not valid text"),
            Self::Rejected(err) => err.to_string(),
        };
        (StatusCode::UNAUTHORIZED, error_body(message)).into_response()
    }
}
