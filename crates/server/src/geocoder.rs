// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP client for a Nominatim-compatible geocoding service.
//!
//! Every call is bounded by the configured timeout. Failures surface as
//! [`GeocodeError`] and are translated at the handler.

use lifeline_api::{GeocodeError, GeocodeResponse, ReverseGeocodeResponse, parse_geocode_result};
use lifeline_domain::Coordinates;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Sent with every request; Nominatim's usage policy requires one.
const USER_AGENT: &str = concat!("lifeline-server/", env!("CARGO_PKG_VERSION"));

/// One entry of a `search` answer.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

/// A `reverse` answer. Nominatim reports misses with an `error` field.
#[derive(Debug, Deserialize)]
struct ReverseHit {
    error: Option<String>,
    address: Option<ReverseAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseAddress {
    road: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    postcode: Option<String>,
}

impl From<ReverseAddress> for ReverseGeocodeResponse {
    fn from(address: ReverseAddress) -> Self {
        Self {
            street: address.road.or(address.suburb),
            city: address.city.or(address.town).or(address.village),
            state: address.state,
            pincode: address.postcode,
        }
    }
}

/// Geocoder client shared by all handlers.
#[derive(Debug, Clone)]
pub struct GeocoderClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl GeocoderClient {
    /// Creates a client for `base_url`, e.g. `https://nominatim.openstreetmap.org`.
    ///
    /// # Errors
    ///
    /// Returns `GeocodeError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let http: reqwest::Client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, GeocodeError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url: String = format!("{}/{path}", self.base_url);
        let call = async {
            let response: reqwest::Response = self
                .http
                .get(&url)
                .query(query)
                .send()
                .await
                .and_then(reqwest::Response::error_for_status)
                .map_err(|e| GeocodeError::Transport(e.to_string()))?;
            response
                .json::<T>()
                .await
                .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))
        };

        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.inspect_err(|e| warn!(%url, error = %e, "Geocoder call failed")),
            Err(_) => {
                warn!(%url, timeout_ms = self.timeout_ms(), "Geocoder call timed out");
                Err(GeocodeError::Timeout {
                    after_ms: self.timeout_ms(),
                })
            }
        }
    }

    /// Resolves an address to coordinates.
    ///
    /// # Errors
    ///
    /// Returns `GeocodeError::NotFound` when the provider has no match, or
    /// a transport, timeout or response error.
    pub async fn geocode(&self, address: &str) -> Result<GeocodeResponse, GeocodeError> {
        let hits: Vec<SearchHit> = self
            .get_json(
                "search",
                &[
                    ("q", address.to_string()),
                    ("format", String::from("json")),
                    ("limit", String::from("1")),
                ],
            )
            .await?;
        let hit: SearchHit = hits.into_iter().next().ok_or_else(|| GeocodeError::NotFound {
            query: address.to_string(),
        })?;
        debug!(address, lat = %hit.lat, lon = %hit.lon, "Geocoded address");
        parse_geocode_result(&hit.lat, &hit.lon, hit.display_name)
    }

    /// Resolves coordinates to a postal address.
    ///
    /// # Errors
    ///
    /// Returns `GeocodeError::NotFound` when the provider has no address
    /// for the point, or a transport, timeout or response error.
    pub async fn reverse(
        &self,
        location: Coordinates,
    ) -> Result<ReverseGeocodeResponse, GeocodeError> {
        let hit: ReverseHit = self
            .get_json(
                "reverse",
                &[
                    ("lat", location.latitude().to_string()),
                    ("lon", location.longitude().to_string()),
                    ("format", String::from("json")),
                ],
            )
            .await?;
        let query: String = format!("{},{}", location.latitude(), location.longitude());
        if let Some(reason) = hit.error {
            debug!(%query, %reason, "Reverse geocoder had no match");
            return Err(GeocodeError::NotFound { query });
        }
        hit.address
            .map(ReverseGeocodeResponse::from)
            .ok_or(GeocodeError::NotFound { query })
    }
}
