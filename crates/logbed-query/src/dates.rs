//! Calendar date handling for queries.
//!
//! Dates arrive as `mm/dd/yyyy` strings and a query's end date is
//! inclusive: the range `[start, end]` in days becomes the half-open
//! nanosecond range `[start 00:00, (end + 1 day) 00:00)` so the entirety
//! of the end date is captured.

use chrono::NaiveDate;
use logbed_store::SortKeyRange;

use crate::error::{QueryError, Result};

/// Accepted date format.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Parse a `mm/dd/yyyy` date string.
pub fn parse_mdy(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|e| {
        QueryError::InvalidInput(format!(
            "invalid date '{}': expected mm/dd/yyyy ({})",
            input, e
        ))
    })
}

/// Nanosecond bounds for the inclusive calendar range `[start, end]`.
pub fn range_bounds(start: NaiveDate, end_inclusive: NaiveDate) -> Result<SortKeyRange> {
    if end_inclusive < start {
        return Err(QueryError::InvalidInput(format!(
            "end date {} is before start date {}",
            end_inclusive, start
        )));
    }
    let end = end_inclusive
        .succ_opt()
        .ok_or_else(|| QueryError::InvalidInput("end date out of range".to_string()))?;
    Ok(SortKeyRange::new(
        midnight_nanos(start)?,
        midnight_nanos(end)?,
    ))
}

/// UTC midnight of `date` in nanoseconds since epoch.
fn midnight_nanos(date: NaiveDate) -> Result<i64> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|dt| dt.and_utc().timestamp_nanos_opt())
        .ok_or_else(|| QueryError::InvalidInput(format!("date {} out of range", date)))
}
