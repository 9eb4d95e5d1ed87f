//! Column naming and limits shared by the resolver, the pattern aggregator and the
//! analysis engine.
//!
//! The defaults match the tables the dashboard is fed with: a reading table with a
//! `date` timestamp, a `site` identifier and `nox`/`no2`/`o3` concentrations, and a
//! prediction table with `date`, `no2`, `o3` plus the `true_nox`/`pred_nox` model
//! columns.

use crate::error::AirQualityError;
use bon::Builder;
use serde::{Deserialize, Serialize};

/// Configuration for every analysis in the crate.
///
/// Build one with [`AnalysisConfig::builder()`], or deserialize it from JSON with
/// [`AnalysisConfig::from_json`]. Missing JSON fields fall back to the defaults.
///
/// # Examples
///
/// ```
/// use airsense::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .site_column("station")
///     .pollutants(vec!["no2".to_string(), "pm25".to_string()])
///     .build();
///
/// assert_eq!(config.timestamp_column, "date");
/// assert_eq!(config.site_column, "station");
/// assert_eq!(config.max_window, 20);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Name of the timestamp column in both table kinds.
    #[builder(into, default = "date".to_string())]
    pub timestamp_column: String,

    /// Name of the monitoring site column in the reading table.
    #[builder(into, default = "site".to_string())]
    pub site_column: String,

    /// Pollutant columns of the reading table, in the order they are offered.
    #[builder(default = vec!["nox".to_string(), "no2".to_string(), "o3".to_string()])]
    pub pollutants: Vec<String>,

    /// Pollutant columns of the prediction table that can be smoothed and summarised.
    #[builder(default = vec!["no2".to_string(), "o3".to_string()])]
    pub prediction_pollutants: Vec<String>,

    /// Identifier and label columns left out of the correlation matrix.
    #[builder(default = vec![
        "date".to_string(),
        "true_nox".to_string(),
        "pred_nox".to_string(),
    ])]
    pub correlation_exclude: Vec<String>,

    /// Smallest accepted smoothing window.
    #[builder(default = 1)]
    pub min_window: usize,

    /// Largest accepted smoothing window.
    #[builder(default = 20)]
    pub max_window: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig::builder().build()
    }
}

impl AnalysisConfig {
    /// Reads a configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`AirQualityError::ConfigParse`] if the document is not valid JSON or a
    /// field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, AirQualityError> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn validate_window(&self, window: usize) -> Result<(), AirQualityError> {
        if window < self.min_window || window > self.max_window {
            return Err(AirQualityError::invalid(
                "window",
                format!(
                    "smoothing window {} is outside [{}, {}]",
                    window, self.min_window, self.max_window
                ),
            ));
        }
        Ok(())
    }
}
