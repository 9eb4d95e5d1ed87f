use crate::error::AirQualityError;
use log::{info, warn};
use polars::prelude::*;
use std::path::Path;

/// Reads a comma-separated file with a header row into a `DataFrame`.
///
/// Every column is read as text. Sensor exports mix numbers with markers like
/// `n/a` or empty cells, so types are resolved later by the coercion step rather
/// than by schema inference.
pub fn read_csv(path: &Path) -> Result<DataFrame, AirQualityError> {
    let to_error = |source: PolarsError| AirQualityError::CsvRead {
        path: path.to_path_buf(),
        source,
    };

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(to_error)?
        .finish()
        .map_err(to_error)?;

    if df.height() == 0 {
        warn!("CSV table {} contains a header but no rows", path.display());
    }
    info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}
