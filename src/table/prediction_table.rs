use crate::config::AnalysisConfig;
use crate::error::AirQualityError;
use crate::table::loader::read_csv;
use crate::table::{present_pollutants, with_numeric_columns};
use polars::prelude::*;
use std::path::Path;

/// Read-only handle over a table of measurements and model predictions.
///
/// Unlike [`crate::ReadingTable`], rows are used in their natural order and are never
/// re-sorted or dropped.
#[derive(Debug, Clone)]
pub struct PredictionTable {
    frame: DataFrame,
}

impl PredictionTable {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Loads a prediction table from a CSV file with a header row.
    ///
    /// # Errors
    ///
    /// Returns [`AirQualityError::CsvRead`] if the file cannot be read or parsed.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, AirQualityError> {
        Ok(Self::new(read_csv(path.as_ref())?))
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Configured prediction pollutants present in this table.
    pub fn pollutants(&self, config: &AnalysisConfig) -> Vec<String> {
        present_pollutants(&self.frame, &config.prediction_pollutants)
    }

    /// Copy of the table with every configured pollutant column cast to `f64`.
    pub(crate) fn coerced(&self, config: &AnalysisConfig) -> PolarsResult<DataFrame> {
        with_numeric_columns(&self.frame, &self.pollutants(config))
    }

    pub(crate) fn check_pollutant(
        &self,
        pollutant: &str,
        config: &AnalysisConfig,
    ) -> Result<(), AirQualityError> {
        if self.frame.height() == 0 {
            return Err(AirQualityError::EmptyTable);
        }
        let known = self.pollutants(config);
        if known.is_empty() {
            return Err(AirQualityError::Schema {
                column: config
                    .prediction_pollutants
                    .first()
                    .cloned()
                    .unwrap_or_else(|| pollutant.to_string()),
            });
        }
        if !known.iter().any(|p| p == pollutant) {
            return Err(AirQualityError::invalid(
                "pollutant",
                format!("'{}' is not one of {:?}", pollutant, known),
            ));
        }
        Ok(())
    }
}

impl From<DataFrame> for PredictionTable {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}
