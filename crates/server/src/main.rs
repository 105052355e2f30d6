// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod geocoder;
mod identity;

#[cfg(test)]
mod tests;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use clap::Parser;
use lifeline_api::{
    ApiError, AvailabilityRequest, BloodBankMatchListResponse, BloodBankProfileRequest,
    BloodBankProfileResponse, CreateSosRequest, DonorMatchListResponse, DonorProfileRequest,
    DonorProfileResponse, GeocodeQuery, GeocodeResponse, NearbyQuery, RecordDonationRequest,
    RespondRequest, ResponseListResponse, ReverseGeocodeQuery, ReverseGeocodeResponse,
    SosRequestListResponse, SosRequestResponse, SosResponseInfo, SweepResponse, SyncUserRequest,
    UpdateResponseStatusRequest, UserResponse, VerifyBloodBankRequest, translate_geocode_error,
    validate_geocode_query, validate_reverse_geocode_query,
};
use lifeline_domain::Coordinates;
use lifeline_persistence::{DEFAULT_BUSY_TIMEOUT_MS, SqlitePersistence, SweepReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::geocoder::GeocoderClient;
use crate::identity::Identity;

/// Lifeline Server - HTTP server for the Lifeline SOS service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "LIFELINE_DATABASE")]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(long, env = "LIFELINE_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to bind the server to
    #[arg(short, long, env = "LIFELINE_PORT", default_value_t = 3000)]
    port: u16,

    /// Seconds between expiry sweeps; 0 disables the background sweep
    #[arg(long, env = "LIFELINE_SWEEP_INTERVAL_SECS", default_value_t = 300)]
    sweep_interval_secs: u64,

    /// Base URL of the Nominatim-compatible geocoder
    #[arg(
        long,
        env = "LIFELINE_GEOCODER_URL",
        default_value = "https://nominatim.openstreetmap.org"
    )]
    geocoder_url: String,

    /// Geocoder request timeout in milliseconds
    #[arg(long, env = "LIFELINE_GEOCODER_TIMEOUT_MS", default_value_t = 5000)]
    geocoder_timeout_ms: u64,

    /// How long a write waits for the database lock, in milliseconds
    #[arg(long, env = "LIFELINE_BUSY_TIMEOUT_MS", default_value_t = DEFAULT_BUSY_TIMEOUT_MS)]
    busy_timeout_ms: u32,

    /// How long a request waits for its turn at the store, in milliseconds
    #[arg(long, env = "LIFELINE_STORE_TIMEOUT_MS", default_value_t = 10_000)]
    store_timeout_ms: u64,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The persistence layer. Each operation runs to completion under the lock.
    persistence: Arc<Mutex<SqlitePersistence>>,
    /// Upper bound on waiting for the persistence lock.
    store_timeout: Duration,
    geocoder: GeocoderClient,
}

impl AppState {
    async fn store(&self) -> Result<MutexGuard<'_, SqlitePersistence>, ApiError> {
        lock_store(&self.persistence, self.store_timeout).await
    }
}

/// Waits at most `limit` for the store lock.
async fn lock_store(
    persistence: &Mutex<SqlitePersistence>,
    limit: Duration,
) -> Result<MutexGuard<'_, SqlitePersistence>, ApiError> {
    tokio::time::timeout(limit, persistence.lock())
        .await
        .map_err(|_| ApiError::Upstream {
            service: String::from("store"),
            message: format!("store busy for more than {} ms", limit.as_millis()),
        })
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

fn error_body(message: String) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: true,
        message,
    })
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, error_body(self.message)).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } | ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidState { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::CapacityExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Duplicate { .. } => StatusCode::CONFLICT,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Upstream { .. } => {
                warn!(error = %err, "Upstream failure");
                StatusCode::BAD_GATEWAY
            }
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

// ============================================================================
// Users
// ============================================================================

/// Handler for PUT `/users/me`.
async fn handle_sync_user(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Json(req): Json<SyncUserRequest>,
) -> Result<Json<UserResponse>, HttpError> {
    info!(user_id = %actor.user_id, role = %actor.role, "Handling sync_user request");
    let mut persistence = app_state.store().await?;
    let response: UserResponse = lifeline_api::sync_user(&mut persistence, &actor, req, now())?;
    Ok(Json(response))
}

// ============================================================================
// SOS requests
// ============================================================================

/// Handler for POST `/sos`.
async fn handle_create_sos(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Json(req): Json<CreateSosRequest>,
) -> Result<(StatusCode, Json<SosRequestResponse>), HttpError> {
    info!(patient_id = %actor.user_id, "Handling create_sos request");
    let mut persistence = app_state.store().await?;
    let response: SosRequestResponse =
        lifeline_api::create_sos_request(&mut persistence, &actor, req, now())?;
    drop(persistence);

    info!(
        sos_request_id = response.sos_request_id,
        blood_group = %response.blood_group,
        urgency = %response.urgency,
        "Created SOS request"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/sos/mine`.
async fn handle_list_my_sos(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
) -> Result<Json<SosRequestListResponse>, HttpError> {
    let mut persistence = app_state.store().await?;
    let response: SosRequestListResponse =
        lifeline_api::list_my_sos_requests(&mut persistence, &actor, now())?;
    Ok(Json(response))
}

/// Handler for GET `/sos/active`.
async fn handle_list_active_sos(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
) -> Result<Json<SosRequestListResponse>, HttpError> {
    let mut persistence = app_state.store().await?;
    let response: SosRequestListResponse =
        lifeline_api::list_active_sos_requests(&mut persistence, &actor, now())?;
    Ok(Json(response))
}

/// Handler for GET `/sos/nearby`.
async fn handle_find_nearby_sos(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<SosRequestListResponse>, HttpError> {
    let mut persistence = app_state.store().await?;
    let response: SosRequestListResponse =
        lifeline_api::find_nearby_requests(&mut persistence, &actor, &query, now())?;
    Ok(Json(response))
}

/// Handler for POST `/sos/expire`.
async fn handle_run_expiry_sweep(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
) -> Result<Json<SweepResponse>, HttpError> {
    info!(admin = %actor.user_id, "Handling run_expiry_sweep request");
    let mut persistence = app_state.store().await?;
    let response: SweepResponse = lifeline_api::run_expiry_sweep(&mut persistence, &actor, now())?;
    Ok(Json(response))
}

/// Handler for GET `/sos/{id}`.
async fn handle_get_sos(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(sos_request_id): Path<i64>,
) -> Result<Json<SosRequestResponse>, HttpError> {
    let mut persistence = app_state.store().await?;
    let response: SosRequestResponse =
        lifeline_api::get_sos_request(&mut persistence, &actor, sos_request_id, now())?;
    Ok(Json(response))
}

/// Handler for DELETE `/sos/{id}`.
async fn handle_delete_sos(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(sos_request_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    info!(sos_request_id, patient_id = %actor.user_id, "Handling delete_sos request");
    let mut persistence = app_state.store().await?;
    lifeline_api::delete_sos_request(&mut persistence, &actor, sos_request_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST `/sos/{id}/fulfill`.
async fn handle_fulfill_sos(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(sos_request_id): Path<i64>,
) -> Result<Json<SosRequestResponse>, HttpError> {
    info!(sos_request_id, patient_id = %actor.user_id, "Handling fulfill_sos request");
    let mut persistence = app_state.store().await?;
    let response: SosRequestResponse =
        lifeline_api::fulfill_sos_request(&mut persistence, &actor, sos_request_id, now())?;
    Ok(Json(response))
}

/// Handler for POST `/sos/{id}/cancel`.
async fn handle_cancel_sos(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(sos_request_id): Path<i64>,
) -> Result<Json<SosRequestResponse>, HttpError> {
    info!(sos_request_id, patient_id = %actor.user_id, "Handling cancel_sos request");
    let mut persistence = app_state.store().await?;
    let response: SosRequestResponse =
        lifeline_api::cancel_sos_request(&mut persistence, &actor, sos_request_id, now())?;
    Ok(Json(response))
}

/// Handler for GET `/sos/{id}/donors`.
async fn handle_find_donors_for_sos(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(sos_request_id): Path<i64>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<DonorMatchListResponse>, HttpError> {
    let mut persistence = app_state.store().await?;
    let response: DonorMatchListResponse =
        lifeline_api::find_donors_for_sos(&mut persistence, &actor, sos_request_id, &query)?;
    Ok(Json(response))
}

// ============================================================================
// SOS responses
// ============================================================================

/// Handler for POST `/sos/{id}/responses`.
async fn handle_respond_to_sos(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(sos_request_id): Path<i64>,
    Json(req): Json<RespondRequest>,
) -> Result<(StatusCode, Json<SosResponseInfo>), HttpError> {
    info!(sos_request_id, donor_id = %actor.user_id, "Handling respond_to_sos request");
    let mut persistence = app_state.store().await?;
    let response: SosResponseInfo =
        lifeline_api::respond_to_sos(&mut persistence, &actor, sos_request_id, req, now())?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/sos/{id}/responses`.
async fn handle_list_responses_for_sos(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(sos_request_id): Path<i64>,
) -> Result<Json<ResponseListResponse>, HttpError> {
    let mut persistence = app_state.store().await?;
    let response: ResponseListResponse =
        lifeline_api::list_responses_for_sos(&mut persistence, &actor, sos_request_id)?;
    Ok(Json(response))
}

/// Handler for GET `/sos/{id}/responses/mine`.
async fn handle_get_my_response_for_sos(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(sos_request_id): Path<i64>,
) -> Result<Json<SosResponseInfo>, HttpError> {
    let mut persistence = app_state.store().await?;
    let response: SosResponseInfo =
        lifeline_api::get_my_response_for_sos(&mut persistence, &actor, sos_request_id)?;
    Ok(Json(response))
}

/// Handler for GET `/responses/mine`.
async fn handle_list_my_responses(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
) -> Result<Json<ResponseListResponse>, HttpError> {
    let mut persistence = app_state.store().await?;
    let response: ResponseListResponse = lifeline_api::list_my_responses(&mut persistence, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/responses/{id}/status`.
async fn handle_update_response_status(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(sos_response_id): Path<i64>,
    Json(req): Json<UpdateResponseStatusRequest>,
) -> Result<Json<SosResponseInfo>, HttpError> {
    info!(
        sos_response_id,
        actor_id = %actor.user_id,
        status = %req.status,
        "Handling update_response_status request"
    );
    let mut persistence = app_state.store().await?;
    let response: SosResponseInfo = lifeline_api::update_response_status(
        &mut persistence,
        &actor,
        sos_response_id,
        &req,
        now(),
    )?;
    Ok(Json(response))
}

/// Handler for DELETE `/responses/{id}`.
async fn handle_withdraw_response(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(sos_response_id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    info!(sos_response_id, donor_id = %actor.user_id, "Handling withdraw_response request");
    let mut persistence = app_state.store().await?;
    lifeline_api::withdraw_response(&mut persistence, &actor, sos_response_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Donor profiles
// ============================================================================

/// Handler for GET `/donor/profile`.
async fn handle_get_donor_profile(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
) -> Result<Json<DonorProfileResponse>, HttpError> {
    let mut persistence = app_state.store().await?;
    let response: DonorProfileResponse =
        lifeline_api::get_donor_profile(&mut persistence, &actor, now())?;
    Ok(Json(response))
}

/// Handler for PUT `/donor/profile`.
async fn handle_save_donor_profile(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Json(req): Json<DonorProfileRequest>,
) -> Result<Json<DonorProfileResponse>, HttpError> {
    info!(donor_id = %actor.user_id, "Handling save_donor_profile request");
    let mut persistence = app_state.store().await?;
    let response: DonorProfileResponse =
        lifeline_api::save_donor_profile(&mut persistence, &actor, req, now())?;
    Ok(Json(response))
}

/// Handler for POST `/donor/availability`.
async fn handle_set_availability(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<DonorProfileResponse>, HttpError> {
    let mut persistence = app_state.store().await?;
    let response: DonorProfileResponse =
        lifeline_api::set_availability(&mut persistence, &actor, &req, now())?;
    Ok(Json(response))
}

/// Handler for POST `/donor/donations`.
async fn handle_record_donation(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Json(req): Json<RecordDonationRequest>,
) -> Result<Json<DonorProfileResponse>, HttpError> {
    info!(recorded_by = %actor.user_id, "Handling record_donation request");
    let mut persistence = app_state.store().await?;
    let response: DonorProfileResponse =
        lifeline_api::record_donation(&mut persistence, &actor, req, now())?;
    Ok(Json(response))
}

// ============================================================================
// Blood banks
// ============================================================================

/// Handler for GET `/blood_bank/profile`.
async fn handle_get_blood_bank_profile(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
) -> Result<Json<BloodBankProfileResponse>, HttpError> {
    let mut persistence = app_state.store().await?;
    let response: BloodBankProfileResponse =
        lifeline_api::get_blood_bank_profile(&mut persistence, &actor)?;
    Ok(Json(response))
}

/// Handler for PUT `/blood_bank/profile`.
async fn handle_save_blood_bank_profile(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Json(req): Json<BloodBankProfileRequest>,
) -> Result<Json<BloodBankProfileResponse>, HttpError> {
    info!(blood_bank_id = %actor.user_id, "Handling save_blood_bank_profile request");
    let mut persistence = app_state.store().await?;
    let response: BloodBankProfileResponse =
        lifeline_api::save_blood_bank_profile(&mut persistence, &actor, req, now())?;
    Ok(Json(response))
}

/// Handler for POST `/blood_banks/{id}/verify`.
async fn handle_verify_blood_bank(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Path(blood_bank_id): Path<String>,
    Json(req): Json<VerifyBloodBankRequest>,
) -> Result<Json<BloodBankProfileResponse>, HttpError> {
    info!(
        admin = %actor.user_id,
        %blood_bank_id,
        is_verified = req.is_verified,
        "Handling verify_blood_bank request"
    );
    let mut persistence = app_state.store().await?;
    let response: BloodBankProfileResponse =
        lifeline_api::verify_blood_bank(&mut persistence, &actor, &blood_bank_id, &req, now())?;
    Ok(Json(response))
}

/// Handler for GET `/blood_banks/nearby`.
async fn handle_find_nearby_blood_banks(
    AxumState(app_state): AxumState<AppState>,
    Identity(actor): Identity,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<BloodBankMatchListResponse>, HttpError> {
    let mut persistence = app_state.store().await?;
    let response: BloodBankMatchListResponse =
        lifeline_api::find_nearby_blood_banks(&mut persistence, &actor, &query)?;
    Ok(Json(response))
}

// ============================================================================
// Geocoding
// ============================================================================

/// Handler for GET `/geocode`.
///
/// The database lock is not held while the geocoder is called.
async fn handle_geocode(
    AxumState(app_state): AxumState<AppState>,
    Identity(_actor): Identity,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<GeocodeResponse>, HttpError> {
    let address: String = validate_geocode_query(&query)?;
    let response: GeocodeResponse = app_state
        .geocoder
        .geocode(&address)
        .await
        .map_err(translate_geocode_error)?;
    Ok(Json(response))
}

/// Handler for GET `/reverse_geocode`.
async fn handle_reverse_geocode(
    AxumState(app_state): AxumState<AppState>,
    Identity(_actor): Identity,
    Query(query): Query<ReverseGeocodeQuery>,
) -> Result<Json<ReverseGeocodeResponse>, HttpError> {
    let location: Coordinates = validate_reverse_geocode_query(&query)?;
    let response: ReverseGeocodeResponse = app_state
        .geocoder
        .reverse(location)
        .await
        .map_err(translate_geocode_error)?;
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/users/me", put(handle_sync_user))
        .route("/sos", post(handle_create_sos))
        .route("/sos/mine", get(handle_list_my_sos))
        .route("/sos/active", get(handle_list_active_sos))
        .route("/sos/nearby", get(handle_find_nearby_sos))
        .route("/sos/expire", post(handle_run_expiry_sweep))
        .route("/sos/{id}", get(handle_get_sos).delete(handle_delete_sos))
        .route("/sos/{id}/fulfill", post(handle_fulfill_sos))
        .route("/sos/{id}/cancel", post(handle_cancel_sos))
        .route("/sos/{id}/donors", get(handle_find_donors_for_sos))
        .route(
            "/sos/{id}/responses",
            post(handle_respond_to_sos).get(handle_list_responses_for_sos),
        )
        .route(
            "/sos/{id}/responses/mine",
            get(handle_get_my_response_for_sos),
        )
        .route("/responses/mine", get(handle_list_my_responses))
        .route("/responses/{id}", delete(handle_withdraw_response))
        .route("/responses/{id}/status", post(handle_update_response_status))
        .route(
            "/donor/profile",
            get(handle_get_donor_profile).put(handle_save_donor_profile),
        )
        .route("/donor/availability", post(handle_set_availability))
        .route("/donor/donations", post(handle_record_donation))
        .route(
            "/blood_bank/profile",
            get(handle_get_blood_bank_profile).put(handle_save_blood_bank_profile),
        )
        .route("/blood_banks/nearby", get(handle_find_nearby_blood_banks))
        .route("/blood_banks/{id}/verify", post(handle_verify_blood_bank))
        .route("/geocode", get(handle_geocode))
        .route("/reverse_geocode", get(handle_reverse_geocode))
        .with_state(app_state)
}

/// Runs one expiry sweep and logs the outcome.
async fn sweep_once(persistence: &Mutex<SqlitePersistence>, store_timeout: Duration) {
    let mut persistence = match lock_store(persistence, store_timeout).await {
        Ok(guard) => guard,
        Err(e) => {
            warn!(error = %e, "Skipping expiry sweep");
            return;
        }
    };
    match persistence.expire_sweep(now()) {
        Ok(report) => log_sweep(&report),
        Err(e) => error!(error = %e, "Expiry sweep failed"),
    }
}

fn log_sweep(report: &SweepReport) {
    if !report.failed_ids.is_empty() {
        warn!(
            processed = report.processed,
            failed_ids = ?report.failed_ids,
            "Expiry sweep left requests active"
        );
    } else if report.processed > 0 {
        info!(processed = report.processed, "Expiry sweep cancelled requests");
    }
}

/// Spawns the periodic expiry sweep.
fn spawn_expiry_sweep(
    persistence: Arc<Mutex<SqlitePersistence>>,
    every: Duration,
    store_timeout: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker: tokio::time::Interval = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sweep_once(&persistence, store_timeout).await;
        }
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Lifeline Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: SqlitePersistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        SqlitePersistence::new_with_file(db_path, args.busy_timeout_ms)?
    } else {
        info!("Using in-memory database");
        SqlitePersistence::new_in_memory()?
    };
    persistence.verify_foreign_key_enforcement()?;

    let geocoder: GeocoderClient = GeocoderClient::new(
        &args.geocoder_url,
        Duration::from_millis(args.geocoder_timeout_ms),
    )?;
    info!(url = %args.geocoder_url, timeout_ms = args.geocoder_timeout_ms, "Geocoder configured");

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        store_timeout: Duration::from_millis(args.store_timeout_ms),
        geocoder,
    };

    if args.sweep_interval_secs == 0 {
        info!("Background expiry sweep disabled");
    } else {
        info!(interval_secs = args.sweep_interval_secs, "Starting background expiry sweep");
        spawn_expiry_sweep(
            Arc::clone(&app_state.persistence),
            Duration::from_secs(args.sweep_interval_secs),
            app_state.store_timeout,
        );
    }

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
