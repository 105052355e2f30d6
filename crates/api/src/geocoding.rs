// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Geocoder boundary: input validation, result shaping and errors.
//!
//! The HTTP client lives in the server; everything here is synchronous and
//! independent of the provider.

use lifeline_domain::{Coordinates, optional_text};
use thiserror::Error;

use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{GeocodeQuery, GeocodeResponse, ReverseGeocodeQuery};

/// Longest address accepted for forward geocoding.
pub const MAX_ADDRESS_LENGTH: usize = 512;

/// Geocoder failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// The provider had no result.
    #[error("no location found for '{query}'")]
    NotFound { query: String },

    /// The provider did not answer in time.
    #[error("geocoder did not answer within {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// The request could not be sent or the provider returned an error status.
    #[error("geocoder request failed: {0}")]
    Transport(String),

    /// The provider answered with something unusable.
    #[error("geocoder returned an unexpected response: {0}")]
    InvalidResponse(String),
}

/// Validates a forward geocoding query and returns the trimmed address.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` for a blank or overlong address.
pub fn validate_geocode_query(query: &GeocodeQuery) -> Result<String, ApiError> {
    let address: String =
        optional_text(Some(&query.address)).ok_or_else(|| ApiError::InvalidInput {
            field: String::from("address"),
            message: String::from("Address must not be blank"),
        })?;
    if address.len() > MAX_ADDRESS_LENGTH {
        return Err(ApiError::InvalidInput {
            field: String::from("address"),
            message: format!("Address must be at most {MAX_ADDRESS_LENGTH} bytes"),
        });
    }
    Ok(address)
}

/// Validates a reverse geocoding query.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if either coordinate is missing or out
/// of range.
pub fn validate_reverse_geocode_query(
    query: &ReverseGeocodeQuery,
) -> Result<Coordinates, ApiError> {
    Coordinates::from_parts(query.latitude, query.longitude).map_err(translate_domain_error)
}

/// Builds a geocode result from the provider's textual coordinates.
///
/// # Errors
///
/// Returns `GeocodeError::InvalidResponse` if the coordinates do not parse
/// or are out of range.
pub fn parse_geocode_result(
    latitude: &str,
    longitude: &str,
    display_name: Option<String>,
) -> Result<GeocodeResponse, GeocodeError> {
    let parse = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .map_err(|e| GeocodeError::InvalidResponse(format!("coordinate '{value}': {e}")))
    };
    let coordinates: Coordinates = Coordinates::new(parse(latitude)?, parse(longitude)?)
        .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))?;
    Ok(GeocodeResponse {
        latitude: coordinates.latitude(),
        longitude: coordinates.longitude(),
        display_name,
    })
}
