// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Canonical timestamp text encoding.
//!
//! Stored timestamps are RFC 3339 in UTC with whole seconds, so every
//! value has the same width and lexicographic order matches time order.
//! Range filters such as `expires_at < now` rely on this.

use crate::error::DomainError;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

/// Formats a timestamp in the canonical stored form.
///
/// # Errors
///
/// Returns `DomainError::DateFormatError` if the timestamp cannot be
/// represented.
pub fn format_timestamp(timestamp: OffsetDateTime) -> Result<String, DomainError> {
    let normalized: OffsetDateTime = timestamp
        .to_offset(UtcOffset::UTC)
        .replace_nanosecond(0)
        .map_err(|e| DomainError::DateFormatError(e.to_string()))?;
    normalized
        .format(&Rfc3339)
        .map_err(|e| DomainError::DateFormatError(e.to_string()))
}

/// Parses an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if the string is not valid RFC 3339.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|e| DomainError::DateParseError {
        date_string: value.to_string(),
        error: e.to_string(),
    })
}

/// Parses an optional stored timestamp.
///
/// # Errors
///
/// Returns `DomainError::DateParseError` if a present value is invalid.
pub fn parse_optional_timestamp(
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, DomainError> {
    value.map(parse_timestamp).transpose()
}
