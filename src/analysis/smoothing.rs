use crate::analysis::AnalysisEngine;
use crate::error::AirQualityError;
use crate::table::prediction_table::PredictionTable;
use crate::table::require_column;
use crate::table::timestamp::{coerce_timestamp_column, timestamps};
use crate::types::analysis::{SmoothedPoint, SmoothedSeries};
use log::debug;
use polars::prelude::*;

const VALUE_COLUMN: &str = "value";
const SMOOTHED_COLUMN: &str = "smoothed";

impl AnalysisEngine<'_> {
    /// Rolling mean of `pollutant` over `window` rows, in the table's row order.
    ///
    /// Partial windows at the start are averaged over the rows available so far,
    /// so the output has one point per input row and starts with the first value.
    /// Missing values are skipped inside a window; a window holding only missing
    /// values smooths to `None`.
    ///
    /// # Errors
    ///
    /// * [`AirQualityError::InvalidSelection`] if `window` is outside the configured
    ///   bounds or `pollutant` is not a prediction pollutant of the table.
    /// * [`AirQualityError::Schema`] if the timestamp column is missing.
    /// * [`AirQualityError::EmptyTable`] if the table has no rows.
    pub fn smooth(
        &self,
        table: &PredictionTable,
        pollutant: &str,
        window: usize,
    ) -> Result<SmoothedSeries, AirQualityError> {
        self.config.validate_window(window)?;
        table.check_pollutant(pollutant, self.config)?;
        require_column(table.frame(), &self.config.timestamp_column)?;

        let smoothed = table
            .coerced(self.config)?
            .lazy()
            .select([
                col(pollutant).alias(VALUE_COLUMN),
                col(pollutant)
                    .rolling_mean(RollingOptionsFixedWindow {
                        window_size: window,
                        min_periods: 1,
                        ..Default::default()
                    })
                    .alias(SMOOTHED_COLUMN),
            ])
            .collect()?;

        let stamps = timestamps(&coerce_timestamp_column(
            table.frame().column(&self.config.timestamp_column)?,
        )?)?;
        let values = smoothed.column(VALUE_COLUMN)?.f64()?;
        let means = smoothed.column(SMOOTHED_COLUMN)?.cast(&DataType::Float64)?;

        let points: Vec<SmoothedPoint> = stamps
            .into_iter()
            .zip(values.into_iter())
            .zip(means.f64()?.into_iter())
            .map(|((timestamp, value), smoothed)| SmoothedPoint {
                timestamp,
                value,
                smoothed,
            })
            .collect();

        debug!(
            "Smoothed {} rows of {} with a window of {}",
            points.len(),
            pollutant,
            window
        );

        Ok(SmoothedSeries {
            pollutant: pollutant.to_string(),
            window,
            points,
        })
    }
}
