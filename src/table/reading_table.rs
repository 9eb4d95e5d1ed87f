use crate::config::AnalysisConfig;
use crate::error::AirQualityError;
use crate::table::loader::read_csv;
use crate::table::timestamp::{coerce_timestamp_column, timestamp_extent};
use crate::table::{present_pollutants, require_column, with_numeric_columns};
use crate::types::period::DayRange;
use crate::types::selection::{Selection, SiteScope};
use log::warn;
use polars::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;

/// Read-only handle over a table of pollutant readings keyed by timestamp and site.
///
/// The handle is cheap to clone and is never modified by any analysis: every
/// operation works on its own coerced copy of the data.
#[derive(Debug, Clone)]
pub struct ReadingTable {
    frame: DataFrame,
}

/// A reading table with a parsed timestamp column and numeric pollutant columns.
pub(crate) struct PreparedReadings {
    pub frame: DataFrame,
    pub dropped_timestamps: usize,
}

impl ReadingTable {
    pub fn new(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Loads a reading table from a CSV file with a header row.
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

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Configured pollutant columns present in this table, in configured order.
    pub fn pollutants(&self, config: &AnalysisConfig) -> Vec<String> {
        present_pollutants(&self.frame, &config.pollutants)
    }

    /// Sorted distinct site names, skipping rows without a site.
    ///
    /// # Errors
    ///
    /// Returns [`AirQualityError::Schema`] if the site column is missing.
    pub fn sites(&self, config: &AnalysisConfig) -> Result<Vec<String>, AirQualityError> {
        require_column(&self.frame, &config.site_column)?;
        let site_column = self.frame.column(&config.site_column)?;
        let sites = site_column.cast(&DataType::String)?;
        let distinct: BTreeSet<String> = sites
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        Ok(distinct.into_iter().collect())
    }

    /// First and last calendar day with a parseable timestamp, `None` when no
    /// timestamp parses.
    pub fn date_extent(
        &self,
        config: &AnalysisConfig,
    ) -> Result<Option<DayRange>, AirQualityError> {
        require_column(&self.frame, &config.timestamp_column)?;
        let column = coerce_timestamp_column(self.frame.column(&config.timestamp_column)?)?;
        let Some((min, max)) = timestamp_extent(&column)? else {
            return Ok(None);
        };
        Ok(Some(DayRange::new(min.date(), max.date())))
    }

    /// A selection spanning the whole date extent of the table.
    ///
    /// # Errors
    ///
    /// Returns [`AirQualityError::EmptyTable`] if no timestamp in the table parses.
    pub fn full_selection(
        &self,
        pollutant: impl Into<String>,
        site_scope: SiteScope,
        config: &AnalysisConfig,
    ) -> Result<Selection, AirQualityError> {
        let extent = self
            .date_extent(config)?
            .ok_or(AirQualityError::EmptyTable)?;
        Ok(Selection::builder()
            .pollutant(pollutant)
            .site_scope(site_scope)
            .date_from(extent.start)
            .date_to(extent.end)
            .build())
    }

    /// Copies the table with a `Datetime(ms)` timestamp column and `f64` pollutant
    /// columns. Rows whose timestamp does not parse are dropped and counted.
    pub(crate) fn prepare(
        &self,
        config: &AnalysisConfig,
    ) -> Result<PreparedReadings, AirQualityError> {
        require_column(&self.frame, &config.timestamp_column)?;
        let pollutants = self.pollutants(config);
        let mut frame = with_numeric_columns(&self.frame, &pollutants)?;

        let timestamp = coerce_timestamp_column(self.frame.column(&config.timestamp_column)?)?;
        let dropped_timestamps = timestamp.null_count();
        frame.with_column(timestamp)?;

        if dropped_timestamps > 0 {
            warn!(
                "Dropping {} rows without a parseable '{}' value",
                dropped_timestamps, config.timestamp_column
            );
            frame = frame
                .lazy()
                .filter(col(config.timestamp_column.as_str()).is_not_null())
                .collect()?;
        }

        Ok(PreparedReadings {
            frame,
            dropped_timestamps,
        })
    }
}

impl From<DataFrame> for ReadingTable {
    fn from(frame: DataFrame) -> Self {
        Self::new(frame)
    }
}
