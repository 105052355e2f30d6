// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! ## Module Organization
//!
//! - `users`: user reference data
//! - `profiles`: donor and blood bank profiles, with their users
//! - `sos_requests`: SOS request lookups and listings
//! - `sos_responses`: SOS response lookups and listings

pub mod profiles;
pub mod sos_requests;
pub mod sos_responses;
pub mod users;
