use crate::analysis::AnalysisEngine;
use crate::error::AirQualityError;
use crate::table::prediction_table::PredictionTable;
use crate::types::analysis::SummaryStatistics;
use polars::prelude::*;

impl AnalysisEngine<'_> {
    /// Count, mean, sample standard deviation, min, quartiles and max of
    /// `pollutant`, ignoring missing values.
    ///
    /// Quartiles interpolate linearly between the closest ranks. Statistics that
    /// are undefined for the available values (all of them with no values, `std`
    /// with a single value) are `None`.
    ///
    /// # Errors
    ///
    /// * [`AirQualityError::InvalidSelection`] if `pollutant` is not a prediction
    ///   pollutant of the table.
    /// * [`AirQualityError::EmptyTable`] if the table has no rows.
    pub fn summary(
        &self,
        table: &PredictionTable,
        pollutant: &str,
    ) -> Result<SummaryStatistics, AirQualityError> {
        table.check_pollutant(pollutant, self.config)?;

        let stats = table
            .coerced(self.config)?
            .lazy()
            .select([
                col(pollutant).count().cast(DataType::UInt32).alias("count"),
                col(pollutant).mean().alias("mean"),
                col(pollutant).std(1).alias("std"),
                col(pollutant).min().alias("min"),
                col(pollutant)
                    .quantile(lit(0.25), QuantileMethod::Linear)
                    .alias("q25"),
                col(pollutant)
                    .quantile(lit(0.5), QuantileMethod::Linear)
                    .alias("median"),
                col(pollutant)
                    .quantile(lit(0.75), QuantileMethod::Linear)
                    .alias("q75"),
                col(pollutant).max().alias("max"),
            ])
            .collect()?;

        let stat = |name: &str| -> PolarsResult<Option<f64>> {
            let value = stats.column(name)?.cast(&DataType::Float64)?.f64()?.get(0);
            Ok(value.filter(|v| v.is_finite()))
        };

        Ok(SummaryStatistics {
            pollutant: pollutant.to_string(),
            count: stats.column("count")?.u32()?.get(0).unwrap_or(0),
            mean: stat("mean")?,
            std: stat("std")?,
            min: stat("min")?,
            q25: stat("q25")?,
            median: stat("median")?,
            q75: stat("q75")?,
            max: stat("max")?,
        })
    }

    /// Summary statistics for every prediction pollutant present in the table.
    pub fn summaries(
        &self,
        table: &PredictionTable,
    ) -> Result<Vec<SummaryStatistics>, AirQualityError> {
        table
            .pollutants(self.config)
            .iter()
            .map(|pollutant| self.summary(table, pollutant))
            .collect()
    }
}
