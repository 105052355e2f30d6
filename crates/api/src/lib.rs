// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the Lifeline SOS service.
//!
//! Operations here take an authenticated actor, a persistence handle and
//! the current time, enforce authorization and validation, and return
//! transport-neutral DTOs. Layer errors are translated into [`ApiError`].

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod geocoding;
mod handlers;
mod matching;
mod profiles;
mod request_response;
mod views;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, authenticate};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_geocode_error,
    translate_persistence_error,
};
pub use geocoding::{
    GeocodeError, MAX_ADDRESS_LENGTH, parse_geocode_result, validate_geocode_query,
    validate_reverse_geocode_query,
};
pub use handlers::{
    cancel_sos_request, create_sos_request, delete_sos_request, fulfill_sos_request,
    get_my_response_for_sos, get_sos_request, list_active_sos_requests, list_my_responses,
    list_my_sos_requests, list_responses_for_sos, respond_to_sos, run_expiry_sweep,
    update_response_status, withdraw_response,
};
pub use matching::{find_donors_for_sos, find_nearby_blood_banks, find_nearby_requests};
pub use profiles::{
    get_blood_bank_profile, get_donor_profile, record_donation, save_blood_bank_profile,
    save_donor_profile, set_availability, sync_user, verify_blood_bank,
};
pub use request_response::{
    AvailabilityRequest, BloodBankMatchInfo, BloodBankMatchListResponse, BloodBankProfileRequest,
    BloodBankProfileResponse, CreateSosRequest, DonorMatchInfo, DonorMatchListResponse,
    DonorProfileRequest, DonorProfileResponse, DonorStatsInfo, GeocodeQuery, GeocodeResponse,
    MedicalEligibilityInfo, NearbyQuery, RecordDonationRequest, RespondRequest,
    ResponseListResponse, ReverseGeocodeQuery, ReverseGeocodeResponse, SosRequestListResponse,
    SosRequestResponse, SosResponseInfo, SweepResponse, SyncUserRequest, TimeEligibilityInfo,
    UpdateResponseStatusRequest, UserResponse, VerifyBloodBankRequest,
};
