//! Diurnal, seasonal and hour-by-month views over a resolved reading table.
//!
//! Each view is a group-by-mean of the selected pollutant. The calendar dimensions
//! are then reindexed explicitly: seasonal series onto January..December and the
//! grid onto 24 hours x 12 months, so charts always get a complete axis.

use crate::config::AnalysisConfig;
use crate::error::AirQualityError;
use crate::filtering::{HOUR_COLUMN, MONTH_COLUMN};
use crate::resolver::{resolve, ResolvedTable};
use crate::table::reading_table::ReadingTable;
use crate::types::month::CALENDAR_MONTHS;
use crate::types::selection::{HeatmapScope, Selection, SiteScope};
use crate::types::views::{
    DiurnalCycle, DiurnalPoint, HourMonthGrid, PatternViews, SeasonalCycle, SeasonalPoint,
    SeasonalSeries, ViewKind, ViewWarning,
};
use bon::bon;
use log::warn;
use polars::prelude::*;
use std::collections::HashMap;

const MEAN_COLUMN: &str = "mean";
const COUNT_COLUMN: &str = "count";

/// Computes pattern views for selections over a reading table.
///
/// # Examples
///
/// ```
/// use airsense::{AnalysisConfig, HeatmapScope, PatternAggregator, ReadingTable, SiteScope};
/// use polars::prelude::*;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let table = ReadingTable::new(df!(
///     "date" => ["2020-01-01 05:00:00", "2020-01-01 05:00:00", "2020-06-15 14:00:00"],
///     "site" => ["MY1", "KC1", "MY1"],
///     "no2" => [10.0, 20.0, 30.0],
/// )?);
/// let config = AnalysisConfig::default();
/// let selection = table.full_selection("no2", SiteScope::AllSites, &config)?;
///
/// let views = PatternAggregator::new(&config)
///     .views()
///     .table(&table)
///     .selection(&selection)
///     .heatmap_scope(HeatmapScope::Site("MY1".to_string()))
///     .call()?;
///
/// assert_eq!(views.diurnal.points.len(), 3);
/// assert_eq!(views.seasonal.series.len(), 2);
/// assert_eq!(views.grid.get(14, 6), Some(30.0));
/// # Ok(())
/// # }
/// ```
pub struct PatternAggregator<'a> {
    config: &'a AnalysisConfig,
}

/// One row of a grouped mean, keyed by an optional site and an hour or month.
struct GroupMean {
    site: Option<String>,
    key: u32,
    mean: f64,
    count: u32,
}

#[bon]
impl<'a> PatternAggregator<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Average concentration by hour of day.
    ///
    /// Grouped by `hour`, or by `(site, hour)` when the selection compares all
    /// sites. Points are ordered by site, then hour; hours without readings are
    /// omitted, so a series may have fewer than 24 points.
    pub fn diurnal_cycle(
        &self,
        resolved: &ResolvedTable,
    ) -> Result<DiurnalCycle, AirQualityError> {
        let points = self
            .group_means(resolved, HOUR_COLUMN, resolved.site_scope().is_all_sites())?
            .into_iter()
            .map(|g| DiurnalPoint {
                site: g.site,
                hour: g.key,
                mean: g.mean,
                count: g.count,
            })
            .collect();
        Ok(DiurnalCycle {
            pollutant: resolved.pollutant().to_string(),
            points,
        })
    }

    /// Average concentration by calendar month.
    ///
    /// One series per site in scope, each with exactly twelve points in calendar
    /// order. Months without readings are present with `mean: None`.
    pub fn seasonal_cycle(
        &self,
        resolved: &ResolvedTable,
    ) -> Result<SeasonalCycle, AirQualityError> {
        let all_sites = resolved.site_scope().is_all_sites();
        let mut by_site: HashMap<Option<String>, [Option<(f64, u32)>; 12]> = HashMap::new();
        for g in self.group_means(resolved, MONTH_COLUMN, all_sites)? {
            let Some(slot) = (g.key as usize).checked_sub(1).filter(|i| *i < 12) else {
                continue;
            };
            by_site.entry(g.site).or_insert([None; 12])[slot] = Some((g.mean, g.count));
        }

        let series = resolved
            .sites()
            .iter()
            .map(|site| {
                let key = all_sites.then(|| site.clone());
                let months = by_site.get(&key).copied().unwrap_or([None; 12]);
                SeasonalSeries {
                    site: site.clone(),
                    points: reindex_months(&months),
                }
            })
            .collect();

        Ok(SeasonalCycle {
            pollutant: resolved.pollutant().to_string(),
            series,
        })
    }

    /// Mean concentration for every (hour, month) pair, pooled across the sites in
    /// `resolved`, as a dense 24 x 12 grid.
    pub fn hour_month_grid(
        &self,
        resolved: &ResolvedTable,
    ) -> Result<HourMonthGrid, AirQualityError> {
        let site = match resolved.site_scope() {
            SiteScope::Site(name) => Some(name.clone()),
            SiteScope::AllSites => None,
        };
        let mut grid = HourMonthGrid::empty(resolved.pollutant(), site);

        let grouped = resolved
            .frame()
            .clone()
            .lazy()
            .group_by([col(HOUR_COLUMN), col(MONTH_COLUMN)])
            .agg([col(resolved.pollutant()).mean().alias(MEAN_COLUMN)])
            .collect()?;

        let hours = grouped.column(HOUR_COLUMN)?.cast(&DataType::Int32)?;
        let months = grouped.column(MONTH_COLUMN)?.cast(&DataType::Int32)?;
        let means = grouped.column(MEAN_COLUMN)?.cast(&DataType::Float64)?;
        for ((hour, month), mean) in hours
            .i32()?
            .into_iter()
            .zip(months.i32()?.into_iter())
            .zip(means.f64()?.into_iter())
        {
            if let (Some(hour), Some(month), Some(mean)) = (hour, month, mean) {
                grid.set(hour as u32, month as u32, mean);
            }
        }
        Ok(grid)
    }

    /// Resolves the heatmap's own selection and computes its grid.
    ///
    /// [`HeatmapScope::Site`] runs the same pollutant and day range through the
    /// resolver again for that one site, independent of the main site scope.
    pub fn heatmap(
        &self,
        table: &ReadingTable,
        selection: &Selection,
        scope: &HeatmapScope,
    ) -> Result<HourMonthGrid, AirQualityError> {
        let resolved = match scope {
            HeatmapScope::CurrentSelection => resolve(table, selection, self.config)?,
            HeatmapScope::Site(site) => {
                resolve(table, &selection.with_site(site.as_str()), self.config)?
            }
        };
        self.hour_month_grid(&resolved)
    }

    /// Computes the diurnal cycle, seasonal cycle and heatmap for one selection.
    ///
    /// Empty views are reported as [`ViewWarning::EmptyResult`] rather than errors.
    ///
    /// # Optional Builder Methods
    ///
    /// * `.heatmap_scope(HeatmapScope)`: scope of the heatmap, defaults to
    ///   [`HeatmapScope::CurrentSelection`].
    #[builder]
    pub fn views(
        &self,
        table: &ReadingTable,
        selection: &Selection,
        heatmap_scope: Option<HeatmapScope>,
    ) -> Result<PatternViews, AirQualityError> {
        let resolved = resolve(table, selection, self.config)?;
        let diurnal = self.diurnal_cycle(&resolved)?;
        let seasonal = self.seasonal_cycle(&resolved)?;
        let grid = match heatmap_scope.unwrap_or_default() {
            HeatmapScope::CurrentSelection => self.hour_month_grid(&resolved)?,
            scope => self.heatmap(table, selection, &scope)?,
        };

        let mut warnings = Vec::new();
        if resolved.dropped_timestamps() > 0 {
            warnings.push(ViewWarning::UnparsedTimestamps {
                rows: resolved.dropped_timestamps(),
            });
        }
        for (view, empty) in [
            (ViewKind::Diurnal, diurnal.is_empty()),
            (ViewKind::Seasonal, seasonal.is_all_missing()),
            (ViewKind::HourMonthGrid, grid.is_all_missing()),
        ] {
            if empty {
                warn!(
                    "No {} data for {} at {}",
                    view, selection.pollutant, selection.site_scope
                );
                warnings.push(ViewWarning::EmptyResult { view });
            }
        }

        Ok(PatternViews {
            site_scope: selection.site_scope.clone(),
            diurnal,
            seasonal,
            grid,
            warnings,
        })
    }

    fn group_means(
        &self,
        resolved: &ResolvedTable,
        key: &str,
        by_site: bool,
    ) -> Result<Vec<GroupMean>, AirQualityError> {
        let site_column = self.config.site_column.as_str();
        let keys: Vec<Expr> = if by_site {
            vec![col(site_column), col(key)]
        } else {
            vec![col(key)]
        };

        let pollutant = resolved.pollutant();
        let grouped = resolved
            .frame()
            .clone()
            .lazy()
            .group_by(keys.clone())
            .agg([
                col(pollutant).mean().alias(MEAN_COLUMN),
                col(pollutant)
                    .count()
                    .cast(DataType::UInt32)
                    .alias(COUNT_COLUMN),
            ])
            .sort_by_exprs(keys, SortMultipleOptions::default())
            .collect()?;

        let sites: Vec<Option<String>> = if by_site {
            let sites = grouped.column(site_column)?.cast(&DataType::String)?;
            sites
                .str()?
                .into_iter()
                .map(|s| s.map(str::to_string))
                .collect()
        } else {
            vec![None; grouped.height()]
        };
        let keys = grouped.column(key)?.cast(&DataType::Int32)?;
        let means = grouped.column(MEAN_COLUMN)?.cast(&DataType::Float64)?;
        let counts = grouped.column(COUNT_COLUMN)?;

        let rows = sites
            .into_iter()
            .zip(keys.i32()?.into_iter())
            .zip(means.f64()?.into_iter())
            .zip(counts.u32()?.into_iter())
            .filter_map(|(((site, key), mean), count)| {
                Some(GroupMean {
                    site,
                    key: u32::try_from(key?).ok()?,
                    mean: mean?,
                    count: count.unwrap_or(0),
                })
            })
            .collect();
        Ok(rows)
    }
}

/// Lays grouped monthly means out on the fixed January..December axis.
fn reindex_months(months: &[Option<(f64, u32)>; 12]) -> Vec<SeasonalPoint> {
    CALENDAR_MONTHS
        .iter()
        .zip(months.iter())
        .map(|(&month, value)| match value {
            Some((mean, count)) => SeasonalPoint {
                mean: Some(*mean),
                count: *count,
                ..SeasonalPoint::missing(month)
            },
            None => SeasonalPoint::missing(month),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn example_table() -> ReadingTable {
        ReadingTable::new(
            df!(
                "date" => ["2020-01-01T05:00:00", "2020-01-01T05:00:00", "2020-06-15T14:00:00"],
                "site" => ["siteA", "siteB", "siteA"],
                "no2" => [10.0, 20.0, 30.0],
            )
            .unwrap(),
        )
    }

    fn year_selection(scope: SiteScope) -> Selection {
        Selection::builder()
            .pollutant("no2")
            .site_scope(scope)
            .date_from(day(2020, 1, 1))
            .date_to(day(2020, 12, 31))
            .build()
    }

    fn busy_table() -> ReadingTable {
        let mut dates = Vec::new();
        let mut sites = Vec::new();
        let mut values = Vec::new();
        for (i, month) in [1u32, 1, 3, 3, 3, 7, 11].iter().enumerate() {
            for site in ["MY1", "KC1"] {
                let stamp = format!("2021-{:02}-{:02} {:02}:15:00", month, i + 1, (i * 5) % 24);
                dates.push(stamp);
                sites.push(site.to_string());
                values.push(if site == "MY1" {
                    (i as f64) * 2.0
                } else {
                    100.0 + i as f64
                });
            }
        }
        let frame = df!(
            "date" => dates,
            "site" => sites,
            "no2" => values,
        )
        .unwrap();
        ReadingTable::new(frame)
    }

    #[test]
    fn test_example_diurnal_groups_by_site() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let resolved = resolve(
            &example_table(),
            &year_selection(SiteScope::AllSites),
            &config,
        )?;
        let diurnal = PatternAggregator::new(&config).diurnal_cycle(&resolved)?;

        let points: Vec<(Option<&str>, u32, f64)> = diurnal
            .points
            .iter()
            .map(|p| (p.site.as_deref(), p.hour, p.mean))
            .collect();
        assert_eq!(
            points,
            vec![
                (Some("siteA"), 5, 10.0),
                (Some("siteA"), 14, 30.0),
                (Some("siteB"), 5, 20.0),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_example_seasonal_has_twelve_months() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let resolved = resolve(
            &example_table(),
            &year_selection(SiteScope::AllSites),
            &config,
        )?;
        let seasonal = PatternAggregator::new(&config).seasonal_cycle(&resolved)?;

        assert_eq!(seasonal.series.len(), 2);
        for series in &seasonal.series {
            assert_eq!(series.points.len(), 12);
            let months: Vec<u32> = series.points.iter().map(|p| p.month).collect();
            assert_eq!(months, CALENDAR_MONTHS.to_vec());
        }
        let site_a = seasonal.series_for("siteA").unwrap();
        assert_eq!(site_a.months_with_data(), vec![1, 6]);
        assert_eq!(site_a.get(6).unwrap().mean, Some(30.0));
        assert_eq!(site_a.get(6).unwrap().month_name, "Jun");
        assert_eq!(
            seasonal.series_for("siteB").unwrap().months_with_data(),
            vec![1]
        );
        Ok(())
    }

    #[test]
    fn test_single_site_diurnal_has_no_site_key() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let resolved = resolve(
            &example_table(),
            &year_selection(SiteScope::site("siteA")),
            &config,
        )?;
        let diurnal = PatternAggregator::new(&config).diurnal_cycle(&resolved)?;

        assert_eq!(diurnal.points.len(), 2);
        assert!(diurnal.points.iter().all(|p| p.site.is_none()));
        assert_eq!(diurnal.points[0].hour, 5);
        assert_eq!(diurnal.points[1].hour, 14);
        Ok(())
    }

    #[test]
    fn test_diurnal_counts_add_up_to_rows() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let aggregator = PatternAggregator::new(&config);
        for scope in [SiteScope::AllSites, SiteScope::site("MY1")] {
            let selection = Selection::builder()
                .pollutant("no2")
                .site_scope(scope)
                .date_from(day(2021, 1, 1))
                .date_to(day(2021, 12, 31))
                .build();
            let resolved = resolve(&busy_table(), &selection, &config)?;
            let diurnal = aggregator.diurnal_cycle(&resolved)?;
            let non_missing = resolved.height() - resolved.frame().column("no2")?.null_count();
            assert_eq!(diurnal.total_count(), non_missing as u64);
            assert!(diurnal.points.windows(2).all(|w| {
                (w[0].site.as_deref(), w[0].hour) < (w[1].site.as_deref(), w[1].hour)
            }));
        }
        Ok(())
    }

    #[test]
    fn test_grid_is_dense_and_pools_sites() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let resolved = resolve(
            &example_table(),
            &year_selection(SiteScope::AllSites),
            &config,
        )?;
        let grid = PatternAggregator::new(&config).hour_month_grid(&resolved)?;

        assert_eq!(grid.cells.len(), 24);
        assert!(grid.cells.iter().all(|row| row.len() == 12));
        assert_eq!(grid.get(5, 1), Some(15.0));
        assert_eq!(grid.get(14, 6), Some(30.0));
        assert_eq!(grid.filled_cells(), 2);
        assert_eq!(grid.site, None);
        Ok(())
    }

    #[test]
    fn test_heatmap_site_override() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let aggregator = PatternAggregator::new(&config);
        let selection = year_selection(SiteScope::AllSites);

        let grid = aggregator.heatmap(
            &example_table(),
            &selection,
            &HeatmapScope::Site("siteB".to_string()),
        )?;
        assert_eq!(grid.site.as_deref(), Some("siteB"));
        assert_eq!(grid.get(5, 1), Some(20.0));
        assert_eq!(grid.get(14, 6), None);
        Ok(())
    }

    #[test]
    fn test_views_report_empty_results() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let table = ReadingTable::new(
            df!(
                "date" => ["2020-01-01 05:00:00", "2020-02-01 06:00:00"],
                "site" => ["A", "A"],
                "no2" => ["n/a", "-"],
                "o3" => [1.0, 2.0],
            )
            .unwrap(),
        );
        let views = PatternAggregator::new(&config)
            .views()
            .table(&table)
            .selection(&year_selection(SiteScope::site("A")))
            .call()?;

        assert!(views.diurnal.is_empty());
        assert_eq!(views.seasonal.series.len(), 1);
        assert_eq!(views.seasonal.series[0].points.len(), 12);
        assert!(views.seasonal.is_all_missing());
        assert!(views.grid.is_all_missing());
        assert_eq!(views.warnings.len(), 3);
        assert!(views.has_empty_result());
        Ok(())
    }

    #[test]
    fn test_views_outside_data_range_are_empty() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let selection = Selection::builder()
            .pollutant("no2")
            .site_scope(SiteScope::AllSites)
            .date_from(day(2021, 1, 1))
            .date_to(day(2021, 6, 30))
            .build();
        let views = PatternAggregator::new(&config)
            .views()
            .table(&example_table())
            .selection(&selection)
            .call()?;

        assert!(views.diurnal.is_empty());
        assert_eq!(views.seasonal.series.len(), 2);
        assert!(views.seasonal.series.iter().all(|s| s.points.len() == 12));
        assert!(views.seasonal.is_all_missing());
        assert!(views.grid.is_all_missing());
        assert_eq!(
            views.warnings,
            vec![
                ViewWarning::EmptyResult {
                    view: ViewKind::Diurnal,
                },
                ViewWarning::EmptyResult {
                    view: ViewKind::Seasonal,
                },
                ViewWarning::EmptyResult {
                    view: ViewKind::HourMonthGrid,
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_views_with_data_have_no_warnings() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let views = PatternAggregator::new(&config)
            .views()
            .table(&example_table())
            .selection(&year_selection(SiteScope::AllSites))
            .call()?;
        assert!(views.warnings.is_empty());
        assert_eq!(views.grid.filled_cells(), 2);
        Ok(())
    }

    #[test]
    fn test_offset_readings_use_local_hour_and_month() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let table = ReadingTable::new(
            df!(
                "date" => ["2020-06-15T14:00:00+01:00", "2020-06-30T23:30:00+01:00"],
                "site" => ["A", "A"],
                "no2" => [5.0, 7.0],
            )
            .unwrap(),
        );
        let resolved = resolve(&table, &year_selection(SiteScope::site("A")), &config)?;
        let aggregator = PatternAggregator::new(&config);

        let hours: Vec<u32> = aggregator
            .diurnal_cycle(&resolved)?
            .points
            .iter()
            .map(|p| p.hour)
            .collect();
        assert_eq!(hours, vec![14, 23]);
        let seasonal = aggregator.seasonal_cycle(&resolved)?;
        assert_eq!(seasonal.series[0].months_with_data(), vec![6]);
        Ok(())
    }

    #[test]
    fn test_reindex_months_fills_gaps() {
        let mut months = [None; 12];
        months[2] = Some((4.5, 3));
        let points = reindex_months(&months);

        assert_eq!(points.len(), 12);
        assert_eq!(points[0].month_name, "Jan");
        assert_eq!(points[0].mean, None);
        assert_eq!(points[2].mean, Some(4.5));
        assert_eq!(points[2].count, 3);
        assert_eq!(points[2].month_name, "Mar");
    }
}
