//! Turns a raw reading table plus a [`Selection`] into the filtered, time-feature
//! augmented table the pattern views are computed from.

use crate::config::AnalysisConfig;
use crate::error::AirQualityError;
use crate::filtering::ReadingFrameFilterExt;
use crate::table::reading_table::ReadingTable;
use crate::table::require_column;
use crate::table::timestamp::timestamp_extent;
use crate::types::period::DayRange;
use crate::types::selection::{Selection, SiteScope};
use log::{debug, info};
use polars::prelude::*;

/// Readings matching a selection, sorted by timestamp, with `hour` and `month`
/// columns attached.
#[derive(Debug, Clone)]
pub struct ResolvedTable {
    frame: DataFrame,
    pollutant: String,
    site_scope: SiteScope,
    /// Sites the selection covers, sorted. A single entry for [`SiteScope::Site`].
    sites: Vec<String>,
    days: DayRange,
    dropped_timestamps: usize,
}

impl ResolvedTable {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    pub fn pollutant(&self) -> &str {
        &self.pollutant
    }

    pub fn site_scope(&self) -> &SiteScope {
        &self.site_scope
    }

    pub fn sites(&self) -> &[String] {
        &self.sites
    }

    /// Day range actually applied, after clamping to the table's extent.
    pub fn days(&self) -> DayRange {
        self.days
    }

    /// Rows of the input table dropped because their timestamp did not parse.
    pub fn dropped_timestamps(&self) -> usize {
        self.dropped_timestamps
    }
}

/// Applies `selection` to `table`.
///
/// Steps, in order: validate the selection, coerce timestamps and pollutant columns,
/// restrict to the site scope, keep the selected days (clamped to the table's
/// extent), drop rows missing the selected pollutant, derive `hour`/`month`, and
/// sort by timestamp. `table` itself is never modified.
///
/// # Errors
///
/// * [`AirQualityError::EmptyTable`] if `table` has no rows.
/// * [`AirQualityError::Schema`] if the timestamp or site column is missing, or no
///   configured pollutant column exists.
/// * [`AirQualityError::InvalidSelection`] for an unknown pollutant or site, or
///   `date_from > date_to`.
pub fn resolve(
    table: &ReadingTable,
    selection: &Selection,
    config: &AnalysisConfig,
) -> Result<ResolvedTable, AirQualityError> {
    if table.is_empty() {
        return Err(AirQualityError::EmptyTable);
    }
    require_column(table.frame(), &config.timestamp_column)?;
    require_column(table.frame(), &config.site_column)?;

    let pollutants = table.pollutants(config);
    if pollutants.is_empty() {
        return Err(AirQualityError::Schema {
            column: config
                .pollutants
                .first()
                .cloned()
                .unwrap_or_else(|| selection.pollutant.clone()),
        });
    }
    if !pollutants.contains(&selection.pollutant) {
        return Err(AirQualityError::invalid(
            "pollutant",
            format!("'{}' is not one of {:?}", selection.pollutant, pollutants),
        ));
    }
    if selection.date_from > selection.date_to {
        return Err(AirQualityError::invalid(
            "date_range",
            format!(
                "date_from {} is after date_to {}",
                selection.date_from, selection.date_to
            ),
        ));
    }

    let table_sites = table.sites(config)?;
    let sites = match &selection.site_scope {
        SiteScope::Site(name) => {
            if !table_sites.contains(name) {
                return Err(AirQualityError::invalid(
                    "site",
                    format!("no readings for site '{}'", name),
                ));
            }
            vec![name.clone()]
        }
        SiteScope::AllSites => table_sites,
    };

    let prepared = table.prepare(config)?;
    let timestamp = config.timestamp_column.as_str();

    let requested = selection.days();
    let days = match timestamp_extent(prepared.frame.column(timestamp)?)? {
        Some((min, max)) => {
            let clamped = requested.clamp_to(&DayRange::new(min.date(), max.date()));
            if clamped != requested {
                debug!(
                    "Clamped date range {} - {} to {} - {}",
                    requested.start, requested.end, clamped.start, clamped.end
                );
            }
            clamped
        }
        None => requested,
    };

    let frame = prepared
        .frame
        .lazy()
        .filter_site(&config.site_column, &selection.site_scope)
        .filter_days(timestamp, days)
        .drop_missing(&selection.pollutant)
        .with_time_features(timestamp)
        .sort_by_exprs(
            [col(timestamp)],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .collect()?;

    info!(
        "Resolved {} of {} rows for {} at {} ({} - {})",
        frame.height(),
        table.height(),
        selection.pollutant,
        selection.site_scope,
        days.start,
        days.end
    );

    Ok(ResolvedTable {
        frame,
        pollutant: selection.pollutant.clone(),
        site_scope: selection.site_scope.clone(),
        sites,
        days,
        dropped_timestamps: prepared.dropped_timestamps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table() -> ReadingTable {
        ReadingTable::new(
            df!(
                "date" => [
                    "2020-06-15 14:00:00",
                    "2020-01-01 05:00:00",
                    "2020-01-01 05:00:00",
                    "2020-01-01 23:59:59",
                    "2020-01-02 00:00:00",
                    "broken",
                    "2020-03-10 08:00:00",
                    "2020-02-01 12:00:00",
                ],
                "site" => [
                    Some("A"), Some("A"), Some("B"), Some("B"),
                    Some("A"), Some("A"), None, Some("B"),
                ],
                "no2" => [
                    Some("30"), Some("10"), Some("20"), Some("7"),
                    Some("5"), Some("1"), Some("9"), Some("n/a"),
                ],
                "o3" => [
                    Some("1"), None, Some("2"), Some("3"),
                    Some("4"), Some("5"), Some("6"), Some("8"),
                ],
            )
            .unwrap(),
        )
    }

    fn selection(scope: SiteScope, from: NaiveDate, to: NaiveDate) -> Selection {
        Selection::builder()
            .pollutant("no2")
            .site_scope(scope)
            .date_from(from)
            .date_to(to)
            .build()
    }

    #[test]
    fn test_resolve_all_sites() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let resolved = resolve(
            &table(),
            &selection(SiteScope::AllSites, day(2020, 1, 1), day(2020, 12, 31)),
            &config,
        )?;

        // the unparsed row, the site-less row and the n/a row are gone
        assert_eq!(resolved.height(), 5);
        assert_eq!(resolved.dropped_timestamps(), 1);
        assert_eq!(resolved.sites(), ["A".to_string(), "B".to_string()]);
        assert_eq!(resolved.frame().column("no2")?.dtype(), &DataType::Float64);
        assert!(resolved.frame().column("hour").is_ok());
        assert!(resolved.frame().column("month").is_ok());
        Ok(())
    }

    #[test]
    fn test_resolve_sorts_by_timestamp() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let resolved = resolve(
            &table(),
            &selection(SiteScope::site("A"), day(2020, 1, 1), day(2020, 12, 31)),
            &config,
        )?;
        let values: Vec<Option<f64>> = resolved.frame().column("no2")?.f64()?.into_iter().collect();
        assert_eq!(values, vec![Some(10.0), Some(5.0), Some(30.0)]);
        Ok(())
    }

    #[test]
    fn test_single_day_range_includes_whole_day() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let resolved = resolve(
            &table(),
            &selection(SiteScope::AllSites, day(2020, 1, 1), day(2020, 1, 1)),
            &config,
        )?;
        let o3 = resolved.frame().column("o3")?;
        // both 05:00 rows and the 23:59:59 row, but not midnight of 2020-01-02
        assert_eq!(resolved.height(), 3);
        assert_eq!(o3.null_count(), 1);
        Ok(())
    }

    #[test]
    fn test_widening_range_never_shrinks_result() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let table = table();
        let ranges = [
            (day(2020, 1, 1), day(2020, 1, 1)),
            (day(2020, 1, 1), day(2020, 1, 2)),
            (day(2020, 1, 1), day(2020, 3, 31)),
            (day(2019, 1, 1), day(2021, 1, 1)),
        ];
        let mut previous = 0;
        for (from, to) in ranges {
            let range = selection(SiteScope::AllSites, from, to);
            let height = resolve(&table, &range, &config)?.height();
            assert!(height >= previous, "{} - {} shrank", from, to);
            previous = height;
        }
        Ok(())
    }

    #[test]
    fn test_resolve_does_not_mutate_input() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let table = table();
        let before = table.frame().clone();
        resolve(
            &table,
            &selection(SiteScope::AllSites, day(2020, 1, 1), day(2020, 12, 31)),
            &config,
        )?;
        assert!(table.frame().equals_missing(&before));
        assert_eq!(table.frame().column("no2")?.dtype(), &DataType::String);
        Ok(())
    }

    #[test]
    fn test_range_outside_data_is_empty_not_error() -> Result<(), AirQualityError> {
        let config = AnalysisConfig::default();
        let resolved = resolve(
            &table(),
            &selection(SiteScope::AllSites, day(2018, 1, 1), day(2018, 12, 31)),
            &config,
        )?;
        assert!(resolved.is_empty());
        assert!(resolved.days().is_empty());
        Ok(())
    }

    #[test]
    fn test_invalid_selections() {
        let config = AnalysisConfig::default();
        let table = table();

        let unknown_site = selection(SiteScope::site("Z"), day(2020, 1, 1), day(2020, 2, 1));
        assert!(matches!(
            resolve(&table, &unknown_site, &config),
            Err(AirQualityError::InvalidSelection { field: "site", .. })
        ));

        let reversed = selection(SiteScope::AllSites, day(2020, 2, 1), day(2020, 1, 1));
        assert!(matches!(
            resolve(&table, &reversed, &config),
            Err(AirQualityError::InvalidSelection { field: "date_range", .. })
        ));

        let mut unknown_pollutant =
            selection(SiteScope::AllSites, day(2020, 1, 1), day(2020, 2, 1));
        unknown_pollutant.pollutant = "pm25".to_string();
        assert!(matches!(
            resolve(&table, &unknown_pollutant, &config),
            Err(AirQualityError::InvalidSelection { field: "pollutant", .. })
        ));
    }

    #[test]
    fn test_schema_and_empty_errors() {
        let config = AnalysisConfig::default();
        let any_selection = selection(SiteScope::AllSites, day(2020, 1, 1), day(2020, 2, 1));

        let no_site = ReadingTable::new(df!("date" => ["2020-01-01"], "no2" => [1.0]).unwrap());
        match resolve(&no_site, &any_selection, &config) {
            Err(AirQualityError::Schema { column }) => assert_eq!(column, "site"),
            other => panic!("expected schema error, got {:?}", other),
        }

        let no_pollutants =
            ReadingTable::new(df!("date" => ["2020-01-01"], "site" => ["A"]).unwrap());
        assert!(matches!(
            resolve(&no_pollutants, &any_selection, &config),
            Err(AirQualityError::Schema { .. })
        ));

        let empty = ReadingTable::new(
            DataFrame::new(vec![
                Column::new("date".into(), Vec::<String>::new()),
                Column::new("site".into(), Vec::<String>::new()),
                Column::new("no2".into(), Vec::<f64>::new()),
            ])
            .unwrap(),
        );
        assert!(matches!(
            resolve(&empty, &any_selection, &config),
            Err(AirQualityError::EmptyTable)
        ));
    }
}
