pub mod loader;
pub mod prediction_table;
pub mod reading_table;
pub mod timestamp;

use crate::error::AirQualityError;
use polars::prelude::*;

/// Casts a column to `f64`; values that do not parse as numbers become null.
///
/// Text is trimmed first, so cells written as `" 10"` still parse.
pub(crate) fn coerce_numeric(column: &Column) -> PolarsResult<Column> {
    match column.dtype() {
        DataType::String => {
            let trimmed: Vec<Option<&str>> = column
                .str()?
                .into_iter()
                .map(|value| value.map(str::trim))
                .collect();
            let series = Series::new(column.name().clone(), trimmed);
            Ok(series.cast(&DataType::Float64)?.into_column())
        }
        _ => column.cast(&DataType::Float64),
    }
}

pub(crate) fn has_column(frame: &DataFrame, name: &str) -> bool {
    frame.get_column_index(name).is_some()
}

pub(crate) fn require_column(frame: &DataFrame, name: &str) -> Result<(), AirQualityError> {
    if has_column(frame, name) {
        Ok(())
    } else {
        Err(AirQualityError::Schema {
            column: name.to_string(),
        })
    }
}

/// The configured pollutant columns present in `frame`, in configured order.
pub(crate) fn present_pollutants(frame: &DataFrame, configured: &[String]) -> Vec<String> {
    configured
        .iter()
        .filter(|name| has_column(frame, name))
        .cloned()
        .collect()
}

/// Returns a copy of `frame` with the given columns cast to `f64`.
pub(crate) fn with_numeric_columns(
    frame: &DataFrame,
    columns: &[String],
) -> PolarsResult<DataFrame> {
    let mut coerced = frame.clone();
    for name in columns {
        let numeric = coerce_numeric(frame.column(name)?)?;
        coerced.with_column(numeric)?;
    }
    Ok(coerced)
}
