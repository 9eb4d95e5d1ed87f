//! Analyses over a [`PredictionTable`]: rolling-mean smoothing, a Pearson
//! correlation matrix and summary statistics.
//!
//! Unlike the pattern views, nothing here filters or re-sorts rows. Each analysis
//! works on a copy of the table in its natural row order, with the columns it reads
//! coerced to `f64`.
//!
//! [`PredictionTable`]: crate::PredictionTable

pub mod correlation;
pub mod smoothing;
pub mod summary;

use crate::config::AnalysisConfig;

/// Runs analyses over prediction tables using one configuration.
///
/// # Examples
///
/// ```
/// use airsense::{AnalysisConfig, AnalysisEngine, PredictionTable};
/// use polars::prelude::*;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let table = PredictionTable::new(df!(
///     "date" => ["2021-01-01 00:00", "2021-01-01 01:00", "2021-01-01 02:00"],
///     "no2" => [30.0, 20.0, 10.0],
///     "o3" => [5.0, 15.0, 25.0],
/// )?);
/// let config = AnalysisConfig::default();
/// let engine = AnalysisEngine::new(&config);
///
/// let smoothed = engine.smooth(&table, "no2", 2)?;
/// assert_eq!(smoothed.smoothed_values(), vec![Some(30.0), Some(25.0), Some(15.0)]);
///
/// let matrix = engine.correlation_matrix(&table)?;
/// assert_eq!(matrix.get("no2", "o3"), Some(-1.0));
/// # Ok(())
/// # }
/// ```
pub struct AnalysisEngine<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> AnalysisEngine<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        self.config
    }
}
