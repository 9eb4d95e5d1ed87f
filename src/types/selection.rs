use crate::types::period::DayRange;
use bon::Builder;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which monitoring sites a view covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SiteScope {
    /// Only readings from the named site.
    Site(String),
    /// Every site, kept apart by grouping on the site column.
    AllSites,
}

impl SiteScope {
    pub fn site(name: impl Into<String>) -> Self {
        SiteScope::Site(name.into())
    }

    pub fn is_all_sites(&self) -> bool {
        matches!(self, SiteScope::AllSites)
    }
}

impl fmt::Display for SiteScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiteScope::Site(name) => write!(f, "{}", name),
            SiteScope::AllSites => write!(f, "All sites"),
        }
    }
}

/// Scope of the hour-by-month heatmap.
///
/// The heatmap can follow the main selection or be pinned to one site while the
/// other views compare all sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HeatmapScope {
    #[default]
    CurrentSelection,
    Site(String),
}

/// The active query: one pollutant, a site scope and an inclusive day range.
///
/// # Examples
///
/// ```
/// use airsense::{Selection, SiteScope};
/// use chrono::NaiveDate;
///
/// let selection = Selection::builder()
///     .pollutant("no2")
///     .site_scope(SiteScope::AllSites)
///     .date_from(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
///     .date_to(NaiveDate::from_ymd_opt(2020, 12, 31).unwrap())
///     .build();
///
/// assert_eq!(selection.pollutant, "no2");
/// assert!(selection.site_scope.is_all_sites());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Builder)]
pub struct Selection {
    #[builder(into)]
    pub pollutant: String,
    pub site_scope: SiteScope,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

impl Selection {
    pub fn days(&self) -> DayRange {
        DayRange::new(self.date_from, self.date_to)
    }

    /// The same query restricted to a single site.
    pub fn with_site(&self, site: impl Into<String>) -> Selection {
        Selection {
            site_scope: SiteScope::Site(site.into()),
            ..self.clone()
        }
    }
}
