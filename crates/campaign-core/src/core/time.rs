// crates/campaign-core/src/core/time.rs
// ============================================================================
// Module: Campaign Time Values
// Description: Timestamp parsing for authored literals and submitted answers.
// Purpose: Keep one definition of the accepted date-time text forms.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Authored timestamp literals (defaults and condition values) use the
//! strict local form `yyyy-MM-ddTHH:mm:ss`. Submitted answers are more
//! lenient: fractional seconds, an RFC 3339 offset, or a bare date are also
//! accepted. Offsets are normalized to UTC and bare dates to midnight so
//! every parsed value orders chronologically against every other.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Date;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::Time;
use time::UtcOffset;
use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

// ============================================================================
// SECTION: Formats
// ============================================================================

/// `yyyy-MM-ddTHH:mm:ss`.
const LOCAL_SECONDS: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// `yyyy-MM-ddTHH:mm:ss.SSS` with any number of fractional digits.
const LOCAL_FRACTIONAL: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");

/// `yyyy-MM-dd`.
const DATE_ONLY: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses an authored timestamp literal in the strict local form.
#[must_use]
pub fn parse_authored_timestamp(text: &str) -> Option<PrimitiveDateTime> {
    PrimitiveDateTime::parse(text, LOCAL_SECONDS).ok()
}

/// Parses a submitted timestamp in any accepted form.
#[must_use]
pub fn parse_response_timestamp(text: &str) -> Option<PrimitiveDateTime> {
    if let Some(value) = parse_authored_timestamp(text) {
        return Some(value);
    }
    if let Ok(value) = PrimitiveDateTime::parse(text, LOCAL_FRACTIONAL) {
        return Some(value);
    }
    if let Ok(value) = OffsetDateTime::parse(text, &Rfc3339) {
        let utc = value.to_offset(UtcOffset::UTC);
        return Some(PrimitiveDateTime::new(utc.date(), utc.time()));
    }
    Date::parse(text, DATE_ONLY).ok().map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT))
}
