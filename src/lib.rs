mod analysis;
mod config;
mod error;
mod filtering;
mod patterns;
mod resolver;
mod table;
mod types;

pub use config::AnalysisConfig;
pub use error::AirQualityError;

pub use table::loader::read_csv;
pub use table::prediction_table::PredictionTable;
pub use table::reading_table::ReadingTable;
pub use table::timestamp::parse_timestamp;

pub use filtering::{ReadingFrameFilterExt, HOUR_COLUMN, MONTH_COLUMN};
pub use resolver::{resolve, ResolvedTable};

pub use analysis::AnalysisEngine;
pub use patterns::PatternAggregator;

pub use types::analysis::*;
pub use types::month::*;
pub use types::period::DayRange;
pub use types::selection::*;
pub use types::views::*;
