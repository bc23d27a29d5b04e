//! Descriptive views over a `Dataset`: describe table, Pearson
//! correlation matrix and single-column histogram with a smoothed density.
//! All of them are pure functions of the dataset.

use std::io::Write;

use polars::functions::pearson_corr_f;
use polars::prelude::{
    ChunkAgg, ChunkQuantile, ChunkVar, DataFrame, DataType, Float64Chunked,
    NamedFrom, PolarsResult, QuantileInterpolOptions, Series,
};
use serde::Serialize;

use crate::dataset::{Dataset, HistogramOptions};
use crate::error::{PredictorError, Result};
use crate::stats;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStatistics {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub q50: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStatistics {
    fn from_series(series: &Series) -> Result<Self> {
        let floats = series.cast(&DataType::Float64)?;
        let ca = floats.f64()?;
        Ok(ColumnStatistics {
            column: series.name().to_string(),
            count: ca.len() - ca.null_count(),
            mean: ca.mean(),
            std: ca.std(1),
            min: ca.min(),
            q25: ca.quantile(0.25, QuantileInterpolOptions::Linear)?,
            q50: ca.quantile(0.5, QuantileInterpolOptions::Linear)?,
            q75: ca.quantile(0.75, QuantileInterpolOptions::Linear)?,
            max: ca.max(),
        })
    }

    fn values(&self) -> [Option<f64>; 8] {
        [
            // usize -> f64 is exact for any realistic row count
            Some(self.count as f64),
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max,
        ]
    }
}

const STATISTIC_NAMES: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Per-column statistics, in dataset column order.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub columns: Vec<ColumnStatistics>,
}

impl Summary {
    pub fn get(&self, column: &str) -> Option<&ColumnStatistics> {
        self.columns.iter().find(|c| c.column == column)
    }

    /// Statistics as rows, one column per dataset column.
    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let mut columns = vec![Series::new("statistic", STATISTIC_NAMES.to_vec())];
        for stats in &self.columns {
            columns.push(Series::new(&stats.column, stats.values().to_vec()));
        }
        DataFrame::new(columns)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for stats in &self.columns {
            wtr.serialize(stats)
                .map_err(|e| PredictorError::Data(e.to_string()))?;
        }
        wtr.flush().map_err(|e| PredictorError::Data(e.to_string()))
    }
}

pub fn describe(dataset: &Dataset) -> Result<Summary> {
    let columns = dataset
        .numeric_columns()
        .into_iter()
        .map(ColumnStatistics::from_series)
        .collect::<Result<Vec<_>>>()?;
    Ok(Summary { columns })
}

/// Square Pearson matrix; `values[i][j]` pairs `columns[i]` with `columns[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        let mut columns = vec![Series::new("column", self.columns.clone())];
        for (j, name) in self.columns.iter().enumerate() {
            let col: Vec<f64> = self.values.iter().map(|row| row[j]).collect();
            columns.push(Series::new(name, col));
        }
        DataFrame::new(columns)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        let to_data = |e: csv::Error| PredictorError::Data(e.to_string());

        let mut header = vec![String::new()];
        header.extend(self.columns.iter().cloned());
        wtr.write_record(&header).map_err(to_data)?;
        for (name, row) in self.columns.iter().zip(self.values.iter()) {
            let mut record = vec![name.clone()];
            record.extend(row.iter().map(|v| v.to_string()));
            wtr.write_record(&record).map_err(to_data)?;
        }
        wtr.flush().map_err(|e| PredictorError::Data(e.to_string()))
    }
}

/* Pearson correlation over every numeric column, each pair using the rows
where both cells are finite. The diagonal is pinned to 1.0 and the lower
triangle mirrors the upper one. Pairs without spread come out as NaN. */
pub fn correlation_matrix(dataset: &Dataset) -> Result<CorrelationMatrix> {
    let numeric = dataset.numeric_columns();
    let columns: Vec<String> = numeric.iter().map(|s| s.name().to_string()).collect();
    let data = columns
        .iter()
        .map(|c| dataset.numeric_values(c))
        .collect::<Result<Vec<_>>>()?;

    let n = columns.len();
    let mut values = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let r = pairwise_pearson(&data[i], &data[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    Ok(CorrelationMatrix { columns, values })
}

fn pairwise_pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let (x, y): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b.iter())
        .filter_map(|(a, b)| match (*a, *b) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((a, b)),
            _ => None,
        })
        .unzip();
    if x.len() < 2 {
        return f64::NAN;
    }
    let x = Float64Chunked::from_vec("x", x);
    let y = Float64Chunked::from_vec("y", y);
    match pearson_corr_f(&x, &y, 1) {
        Some(r) if r.is_finite() => r.clamp(-1.0, 1.0),
        _ => f64::NAN,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<HistogramBin>,
    /// (x, density) pairs of the kernel density estimate.
    pub density: Vec<(f64, f64)>,
}

impl Histogram {
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

pub fn histogram(dataset: &Dataset, column: &str, options: HistogramOptions) -> Result<Histogram> {
    let values: Vec<f64> = dataset
        .numeric_values(column)?
        .into_iter()
        .flatten()
        .collect();
    let bins = stats::equal_width_bins(&values, options.bins.max(1))
        .into_iter()
        .map(|(lower, upper, count)| HistogramBin {
            lower,
            upper,
            count,
        })
        .collect();
    Ok(Histogram {
        column: column.to_string(),
        bins,
        density: stats::gaussian_kde(&values, options.density_points),
    })
}
