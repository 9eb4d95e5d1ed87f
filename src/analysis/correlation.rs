use crate::analysis::AnalysisEngine;
use crate::error::AirQualityError;
use crate::table::coerce_numeric;
use crate::table::prediction_table::PredictionTable;
use crate::types::analysis::CorrelationMatrix;
use log::debug;
use polars::prelude::*;

impl AnalysisEngine<'_> {
    /// Pearson correlation between every pair of numeric columns.
    ///
    /// Every text or numeric column except the timestamp and the configured excluded
    /// columns is coerced to numbers. Columns left with no values at all, such as
    /// site labels, are dropped. Each coefficient uses only the rows where both
    /// columns have a value.
    ///
    /// # Errors
    ///
    /// Returns [`AirQualityError::EmptyTable`] if the table has no rows.
    pub fn correlation_matrix(
        &self,
        table: &PredictionTable,
    ) -> Result<CorrelationMatrix, AirQualityError> {
        if table.height() == 0 {
            return Err(AirQualityError::EmptyTable);
        }
        let mut columns = Vec::new();
        let mut data = Vec::new();
        for column in table.frame().get_columns() {
            let name = column.name().as_str();
            if name == self.config.timestamp_column
                || self.config.correlation_exclude.iter().any(|c| c == name)
            {
                continue;
            }
            let dtype = column.dtype();
            if !(dtype.is_float() || dtype.is_integer() || dtype == &DataType::String) {
                continue;
            }
            let values: Vec<Option<f64>> = coerce_numeric(column)?
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect();
            if values.iter().all(Option::is_none) {
                debug!("No values in '{}', leaving it out of the matrix", name);
                continue;
            }
            columns.push(name.to_string());
            data.push(values);
        }

        let size = columns.len();
        let mut values = vec![vec![None; size]; size];
        for i in 0..size {
            values[i][i] = has_variance(&data[i]).then_some(1.0);
            for j in (i + 1)..size {
                let r = pearson(&data[i], &data[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        debug!("Correlation matrix over {:?}", columns);
        Ok(CorrelationMatrix { columns, values })
    }
}

/// Pearson coefficient over the rows where both `x` and `y` are present.
///
/// `None` with fewer than two such rows, or when either side is constant over them.
pub(crate) fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(a, _)| a).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, b)| b).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom <= f64::EPSILON {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

fn has_variance(values: &[Option<f64>]) -> bool {
    let mut present = values.iter().flatten();
    match present.next() {
        Some(first) => present.any(|v| v != first),
        None => false,
    }
}
