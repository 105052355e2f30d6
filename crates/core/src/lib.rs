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
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod disclosure;
mod error;
mod matching;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use disclosure::{ContactAccess, request_contact_access, responder_contact_access};
pub use error::CoreError;
pub use matching::{
    BloodBankCandidate, BloodBankMatch, DEFAULT_BLOOD_BANK_RADIUS_KM, DEFAULT_RADIUS_KM,
    DonorCandidate, DonorMatch, MAX_RADIUS_KM, RequestMatch, find_blood_banks_near,
    find_donors_for_request, find_requests_for_donor,
};
