// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write operations.
//!
//! State changes on SOS requests and responses are conditional updates:
//! the `WHERE` clause carries the expected current state, and a zero row
//! count is resolved into a precise error by re-reading the row.

pub mod profiles;
pub mod sos_requests;
pub mod sos_responses;
pub mod users;
