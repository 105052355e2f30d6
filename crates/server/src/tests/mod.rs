// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use lifeline_persistence::SqlitePersistence;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower::ServiceExt;

use crate::geocoder::GeocoderClient;
use crate::identity::{USER_ID_HEADER, USER_ROLE_HEADER};
use crate::{AppState, build_router};

pub const ORIGIN_LATITUDE: f64 = 12.9716;
pub const ORIGIN_LONGITUDE: f64 = 77.5946;

pub const PATIENT: (&str, &str) = ("patient-1", "patient");
pub const DONOR: (&str, &str) = ("donor-1", "donor");
pub const ADMIN: (&str, &str) = ("admin-1", "admin");
pub const BLOOD_BANK: (&str, &str) = ("bank-1", "blood_bank");

/// Nothing listens on the discard port, so geocoder calls fail fast.
const UNREACHABLE_GEOCODER: &str = "http://127.0.0.1:9";

/// Helper to create test app state with in-memory persistence.
pub fn create_test_app_state() -> AppState {
    let persistence: SqlitePersistence =
        SqlitePersistence::new_in_memory().expect("Failed to create in-memory persistence");
    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        store_timeout: Duration::from_millis(200),
        geocoder: GeocoderClient::new(UNREACHABLE_GEOCODER, Duration::from_millis(500)).unwrap(),
    }
}

pub fn create_test_router() -> Router {
    build_router(create_test_app_state())
}

/// Sends one request and returns the status and decoded JSON body
/// (`Value::Null` for an empty body).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    identity: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((user_id, role)) = identity {
        builder = builder
            .header(USER_ID_HEADER, user_id)
            .header(USER_ROLE_HEADER, role);
    }
    let request: Request<Body> = match body {
        Some(json_body) => builder
            .header("content-type", "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status: StatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn sync(app: &Router, identity: (&str, &str), name: &str) {
    let (status, _) = send(
        app,
        "PUT",
        "/users/me",
        Some(identity),
        Some(json!({
            "name": name,
            "email": format!("{}@example.org", identity.0),
            "phone": "+91-9000000000",
            "latitude": ORIGIN_LATITUDE,
            "longitude": ORIGIN_LONGITUDE,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

pub async fn register_donor(app: &Router) {
    sync(app, DONOR, "Donor One").await;
    let (status, _) = send(
        app,
        "PUT",
        "/donor/profile",
        Some(DONOR),
        Some(json!({ "blood_group": "O-", "age": 30, "weight_kg": 70.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

pub fn sos_body() -> Value {
    json!({
        "blood_group": "B+",
        "units_needed": 2,
        "urgency": "Critical",
        "hospital_name": "City Hospital",
        "hospital_address": "1 Hospital Road",
        "latitude": ORIGIN_LATITUDE,
        "longitude": ORIGIN_LONGITUDE,
        "contact_person": "Asha",
        "contact_phone": "+91-9000000001",
    })
}

/// Creates a request as the test patient and returns its id.
pub async fn create_sos(app: &Router) -> i64 {
    let (status, body) = send(app, "POST", "/sos", Some(PATIENT), Some(sos_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    body["sos_request_id"].as_i64().unwrap()
}
