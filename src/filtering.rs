use crate::types::period::DayRange;
use crate::types::selection::SiteScope;
use polars::prelude::{col, lit, DataType, LazyFrame};

/// Name of the derived hour-of-day column (0-23).
pub const HOUR_COLUMN: &str = "hour";
/// Name of the derived calendar month column (1-12).
pub const MONTH_COLUMN: &str = "month";

pub trait ReadingFrameFilterExt {
    /// Keeps rows whose timestamp falls on one of the days in `days`.
    ///
    /// The upper bound is midnight after `days.end` (exclusive), so readings late
    /// on the last day are kept. Assumes `timestamp_column` is a `Datetime` column.
    fn filter_days(self, timestamp_column: &str, days: DayRange) -> LazyFrame;

    /// Restricts rows to one site, or to rows that have a site at all for
    /// [`SiteScope::AllSites`].
    fn filter_site(self, site_column: &str, scope: &SiteScope) -> LazyFrame;

    /// Drops rows where `column` is null.
    fn drop_missing(self, column: &str) -> LazyFrame;

    /// Adds `hour` and `month` columns derived from the timestamp. The timestamp
    /// column itself is left as is.
    fn with_time_features(self, timestamp_column: &str) -> LazyFrame;
}

impl ReadingFrameFilterExt for LazyFrame {
    fn filter_days(self, timestamp_column: &str, days: DayRange) -> LazyFrame {
        let after_start = col(timestamp_column).gt_eq(lit(days.start_datetime()));
        match days.end_exclusive() {
            Some(end) => {
                let before_end = col(timestamp_column).lt(lit(end));
                self.filter(after_start.and(before_end))
            }
            None => self.filter(after_start),
        }
    }

    fn filter_site(self, site_column: &str, scope: &SiteScope) -> LazyFrame {
        match scope {
            SiteScope::Site(name) => self.filter(col(site_column).eq(lit(name.as_str()))),
            SiteScope::AllSites => self.filter(col(site_column).is_not_null()),
        }
    }

    fn drop_missing(self, column: &str) -> LazyFrame {
        self.filter(col(column).is_not_null())
    }

    fn with_time_features(self, timestamp_column: &str) -> LazyFrame {
        self.with_columns([
            col(timestamp_column)
                .dt()
                .hour()
                .cast(DataType::Int32)
                .alias(HOUR_COLUMN),
            col(timestamp_column)
                .dt()
                .month()
                .cast(DataType::Int32)
                .alias(MONTH_COLUMN),
        ])
    }
}
