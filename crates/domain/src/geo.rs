// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Great-circle distance and coordinate validation.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the Haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Converts degrees to radians.
#[must_use]
pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * (std::f64::consts::PI / 180.0)
}

/// Great-circle distance between two points in kilometres.
///
/// Uses the Haversine formula and rounds the result to two decimal places.
#[must_use]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat: f64 = degrees_to_radians(lat2 - lat1);
    let d_lon: f64 = degrees_to_radians(lon2 - lon1);

    let a: f64 = ((d_lat / 2.0).sin().powi(2)
        + degrees_to_radians(lat1).cos()
            * degrees_to_radians(lat2).cos()
            * (d_lon / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c: f64 = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (EARTH_RADIUS_KM * c * 100.0).round() / 100.0
}

/// A validated latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    /// Creates validated coordinates.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinates` if either value is not
    /// finite, the latitude is outside [-90, 90] or the longitude is
    /// outside [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(DomainError::InvalidCoordinates(format!(
                "latitude {latitude} must be between -90 and 90"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidCoordinates(format!(
                "longitude {longitude} must be between -180 and 180"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Builds coordinates from two optional values, as stored records and
    /// request payloads carry them.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MissingCoordinates` if either value is absent,
    /// or the errors of [`Coordinates::new`].
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Result<Self, DomainError> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Self::new(latitude, longitude),
            _ => Err(DomainError::MissingCoordinates),
        }
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Distance to `other` in kilometres, rounded to two decimals.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        distance_km(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }
}

/// Validates a search radius in kilometres.
///
/// # Errors
///
/// Returns `DomainError::InvalidRadius` if the radius is not finite, not
/// positive, or larger than `max_km`.
pub fn validate_radius(radius_km: f64, max_km: f64) -> Result<f64, DomainError> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(DomainError::InvalidRadius(format!(
            "{radius_km} must be a positive distance in kilometres"
        )));
    }
    if radius_km > max_km {
        return Err(DomainError::InvalidRadius(format!(
            "{radius_km} exceeds the maximum of {max_km} km"
        )));
    }
    Ok(radius_km)
}
