use chrono::NaiveDateTime;
use serde::Serialize;

/// One row of a smoothed series, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmoothedPoint {
    /// Parsed timestamp of the row, `None` if it could not be parsed.
    pub timestamp: Option<NaiveDateTime>,
    pub value: Option<f64>,
    pub smoothed: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SmoothedSeries {
    pub pollutant: String,
    pub window: usize,
    pub points: Vec<SmoothedPoint>,
}

impl SmoothedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn smoothed_values(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.smoothed).collect()
    }
}

/// Descriptive statistics of a pollutant column, ignoring missing values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    pub pollutant: String,
    pub count: u32,
    pub mean: Option<f64>,
    /// Sample standard deviation (one degree of freedom).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Square, symmetric matrix of Pearson coefficients.
///
/// A cell is `None` when the coefficient is undefined, for example because one of
/// the columns is constant over the paired rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    pub fn size(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    pub fn is_symmetric(&self) -> bool {
        let cell = |i: usize, j: usize| self.values[i][j];
        let n = self.size();
        (0..n).all(|i| (0..n).all(|j| cell(i, j) == cell(j, i)))
    }
}
