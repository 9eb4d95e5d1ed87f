//! Turns whatever the timestamp column holds into a millisecond `Datetime` column.

use crate::error::AirQualityError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use polars::prelude::*;

const DATETIME_FORMATS: [&str; 7] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

pub(crate) const TIMESTAMP_DTYPE: DataType = DataType::Datetime(TimeUnit::Milliseconds, None);

/// Parses a timestamp string.
///
/// Timestamps with an offset keep their local wall-clock time, so hour-of-day
/// views follow the clock the sensor reported in. A bare date resolves to midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = raw.parse::<DateTime<FixedOffset>>() {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    for format in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Coerces a timestamp column to `Datetime(ms)`.
///
/// Datetime and date columns are cast; string columns are parsed row by row and
/// rows that fail to parse become null.
pub(crate) fn coerce_timestamp_column(column: &Column) -> Result<Column, AirQualityError> {
    match column.dtype() {
        DataType::Datetime(_, _) | DataType::Date => Ok(column.cast(&TIMESTAMP_DTYPE)?),
        DataType::String => {
            let millis: Vec<Option<i64>> = column
                .str()?
                .into_iter()
                .map(|raw| {
                    raw.and_then(parse_timestamp)
                        .map(|dt| dt.and_utc().timestamp_millis())
                })
                .collect();
            let series = Series::new(column.name().clone(), millis);
            Ok(series.cast(&TIMESTAMP_DTYPE)?.into_column())
        }
        other => Err(AirQualityError::UnsupportedTimestamp {
            column: column.name().to_string(),
            dtype: other.to_string(),
        }),
    }
}

/// Reads a `Datetime` column back into chrono values, keeping nulls in place.
pub(crate) fn timestamps(column: &Column) -> PolarsResult<Vec<Option<NaiveDateTime>>> {
    let millis = column.cast(&DataType::Int64)?;
    Ok(millis
        .i64()?
        .into_iter()
        .map(|ms| ms.and_then(naive_from_millis))
        .collect())
}

/// Earliest and latest instant of a `Datetime` column, ignoring nulls.
pub(crate) fn timestamp_extent(
    column: &Column,
) -> PolarsResult<Option<(NaiveDateTime, NaiveDateTime)>> {
    let millis = column.cast(&DataType::Int64)?;
    let ca = millis.i64()?;
    let min = ca.min().and_then(naive_from_millis);
    let max = ca.max().and_then(naive_from_millis);
    Ok(min.zip(max))
}

fn naive_from_millis(ms: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(ms).map(|dt| dt.naive_utc())
}
