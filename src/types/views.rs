//! Derived views handed to the rendering layer.
//!
//! Every view is a plain, ordered, serializable table. Calendar dimensions are kept
//! dense where the chart needs a complete axis: the seasonal cycle always has twelve
//! points per series and the hour-by-month grid always has 24 x 12 cells.

use crate::types::month::{hour_label, month_abbreviation, month_abbreviations, DAY_HOURS};
use crate::types::selection::SiteScope;
use serde::Serialize;
use std::fmt;

/// Mean concentration for one hour of the day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiurnalPoint {
    /// Set only when the view compares all sites.
    pub site: Option<String>,
    pub hour: u32,
    pub mean: f64,
    /// Number of readings behind `mean`.
    pub count: u32,
}

/// Average value by hour of day. Hours without readings are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiurnalCycle {
    pub pollutant: String,
    pub points: Vec<DiurnalPoint>,
}

impl DiurnalCycle {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of the per-hour reading counts.
    pub fn total_count(&self) -> u64 {
        self.points.iter().map(|p| p.count as u64).sum()
    }
}

/// Mean concentration for one calendar month; `mean` is `None` when no reading fell
/// into that month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalPoint {
    pub month: u32,
    pub month_name: &'static str,
    pub mean: Option<f64>,
    pub count: u32,
}

impl SeasonalPoint {
    pub(crate) fn missing(month: u32) -> Self {
        Self {
            month,
            month_name: month_abbreviation(month).unwrap_or_default(),
            mean: None,
            count: 0,
        }
    }
}

/// Twelve seasonal points, January to December, for one site (or for the single
/// selected site).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalSeries {
    pub site: String,
    pub points: Vec<SeasonalPoint>,
}

impl SeasonalSeries {
    pub fn get(&self, month: u32) -> Option<&SeasonalPoint> {
        self.points.iter().find(|p| p.month == month)
    }

    pub fn months_with_data(&self) -> Vec<u32> {
        self.points
            .iter()
            .filter(|p| p.mean.is_some())
            .map(|p| p.month)
            .collect()
    }
}

/// Average value by calendar month, one series per site in scope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalCycle {
    pub pollutant: String,
    pub series: Vec<SeasonalSeries>,
}

impl SeasonalCycle {
    pub fn series_for(&self, site: &str) -> Option<&SeasonalSeries> {
        self.series.iter().find(|s| s.site == site)
    }

    /// True when no month of any series has data.
    pub fn is_all_missing(&self) -> bool {
        self.series
            .iter()
            .all(|s| s.points.iter().all(|p| p.mean.is_none()))
    }
}

/// Dense hour-of-day by month grid of mean concentrations.
///
/// Rows are hours `0..24`, columns are months January to December. Cells without
/// readings are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourMonthGrid {
    pub pollutant: String,
    /// Site the grid was computed for, `None` when it pools all sites.
    pub site: Option<String>,
    pub cells: [[Option<f64>; 12]; 24],
}

impl HourMonthGrid {
    pub(crate) fn empty(pollutant: &str, site: Option<String>) -> Self {
        Self {
            pollutant: pollutant.to_string(),
            site,
            cells: [[None; 12]; 24],
        }
    }

    /// Cell for `hour` (0-23) and `month` (1-12).
    pub fn get(&self, hour: u32, month: u32) -> Option<f64> {
        let row = self.cells.get(hour as usize)?;
        let column = (month as usize).checked_sub(1)?;
        row.get(column).copied().flatten()
    }

    pub(crate) fn set(&mut self, hour: u32, month: u32, value: f64) {
        if let (Some(row), Some(column)) = (
            self.cells.get_mut(hour as usize),
            (month as usize).checked_sub(1),
        ) {
            if let Some(cell) = row.get_mut(column) {
                *cell = Some(value);
            }
        }
    }

    pub fn row_labels(&self) -> Vec<String> {
        DAY_HOURS.map(hour_label).collect()
    }

    pub fn column_labels(&self) -> [&'static str; 12] {
        month_abbreviations()
    }

    pub fn filled_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    pub fn is_all_missing(&self) -> bool {
        self.filled_cells() == 0
    }
}

/// The three pattern views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ViewKind {
    Diurnal,
    Seasonal,
    HourMonthGrid,
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewKind::Diurnal => write!(f, "diurnal cycle"),
            ViewKind::Seasonal => write!(f, "seasonal cycle"),
            ViewKind::HourMonthGrid => write!(f, "mean by hour & month"),
        }
    }
}

/// Non-fatal conditions found while computing views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ViewWarning {
    /// The view has no data (date range excludes everything, or the pollutant is
    /// entirely missing).
    EmptyResult { view: ViewKind },
    /// Rows dropped because their timestamp could not be parsed.
    UnparsedTimestamps { rows: usize },
}

/// All pattern views for one selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternViews {
    pub site_scope: SiteScope,
    pub diurnal: DiurnalCycle,
    pub seasonal: SeasonalCycle,
    pub grid: HourMonthGrid,
    pub warnings: Vec<ViewWarning>,
}

impl PatternViews {
    /// Chart title for a view, e.g. `"NO2 diurnal cycle - compare sites"`.
    pub fn title_for(&self, view: ViewKind) -> String {
        let scope = match (view, &self.site_scope) {
            (ViewKind::HourMonthGrid, _) => self
                .grid
                .site
                .clone()
                .unwrap_or_else(|| SiteScope::AllSites.to_string()),
            (_, SiteScope::AllSites) => "compare sites".to_string(),
            (_, SiteScope::Site(name)) => name.clone(),
        };
        let pollutant = self.diurnal.pollutant.to_uppercase();
        format!("{} {} - {}", pollutant, view, scope)
    }

    pub fn has_empty_result(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, ViewWarning::EmptyResult { .. }))
    }
}
