use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use polars::prelude::*;
use polars_io::parquet::ParquetReader;

use crate::cache::{LoadOnce, LoadState};
use crate::error::{PredictorError, Result};
use crate::records::{FeatureRecord, HOUSE_AGE};
use crate::summary::{self, CorrelationMatrix, Histogram, Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Csv,
    Parquet,
}

impl DatasetFormat {
    pub fn infer(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(DatasetFormat::Csv),
            "parquet" => Some(DatasetFormat::Parquet),
            _ => None,
        }
    }
}

pub fn read_parquet<P: AsRef<Path>>(path: P) -> PolarsResult<DataFrame> {
    let file = File::open(path)?;

    ParquetReader::new(file).finish()
}

pub fn read_csv<P: AsRef<Path>>(path: P) -> PolarsResult<DataFrame> {
    let file = File::open(path)?;

    CsvReader::new(file).has_header(true).finish()
}

/* Casts the known transaction columns to their declared dtypes, so an
integer-looking column such as house age still comes back as float. */
fn apply_raw_schema(mut df: DataFrame) -> PolarsResult<DataFrame> {
    let schema = FeatureRecord::raw_schema();
    let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
    for name in names {
        if let Some(dtype) = schema.get(&name) {
            let casted = df.column(&name)?.cast(dtype)?;
            df.with_column(casted)?;
        }
    }
    Ok(df)
}

/// Historical transactions, read once and never mutated.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
}

impl Dataset {
    pub fn new(frame: DataFrame) -> Self {
        Dataset { frame }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let frame = match DatasetFormat::infer(path) {
            Some(DatasetFormat::Csv) => read_csv(path),
            Some(DatasetFormat::Parquet) => read_parquet(path),
            None => return Err(PredictorError::artifact(path, "unsupported dataset format")),
        }
        .and_then(apply_raw_schema)
        .map_err(|e| PredictorError::artifact(path, e))?;
        Ok(Dataset::new(frame))
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn preview(&self, rows: usize) -> DataFrame {
        self.frame.head(Some(rows))
    }

    pub fn numeric_columns(&self) -> Vec<&Series> {
        self.frame
            .get_columns()
            .iter()
            .filter(|s| s.dtype().is_numeric())
            .collect()
    }

    /// Values of one numeric column as f64, nulls kept in place.
    pub fn numeric_values(&self, column: &str) -> Result<Vec<Option<f64>>> {
        let series = self
            .frame
            .column(column)
            .map_err(|_| PredictorError::ColumnNotFound {
                column: column.to_string(),
            })?;
        if !series.dtype().is_numeric() {
            return Err(PredictorError::ColumnNotFound {
                column: column.to_string(),
            });
        }
        let floats = series.cast(&DataType::Float64)?;
        let values = floats.f64()?.into_iter().collect();
        Ok(values)
    }
}

pub trait DatasetSource: Send + Sync {
    fn location(&self) -> PathBuf;
    fn load(&self) -> Result<Dataset>;
}

pub struct FileDatasetSource {
    path: PathBuf,
}

impl FileDatasetSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileDatasetSource { path: path.into() }
    }
}

impl DatasetSource for FileDatasetSource {
    fn location(&self) -> PathBuf {
        self.path.clone()
    }

    fn load(&self) -> Result<Dataset> {
        Dataset::from_path(&self.path)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramOptions {
    pub bins: usize,
    pub density_points: usize,
}

impl Default for HistogramOptions {
    fn default() -> Self {
        HistogramOptions {
            bins: 20,
            density_points: 100,
        }
    }
}

/// Read-only exploration views over the lazily loaded dataset.
pub struct DatasetView {
    source: Arc<dyn DatasetSource>,
    dataset: LoadOnce<Dataset>,
    histogram: HistogramOptions,
}

impl DatasetView {
    pub fn new(source: Arc<dyn DatasetSource>, histogram: HistogramOptions) -> Self {
        DatasetView {
            source,
            dataset: LoadOnce::new("dataset"),
            histogram,
        }
    }

    pub fn from_path<P: Into<PathBuf>>(path: P, histogram: HistogramOptions) -> Self {
        Self::new(Arc::new(FileDatasetSource::new(path)), histogram)
    }

    pub async fn load_dataset(&self) -> Result<Arc<Dataset>> {
        let source = Arc::clone(&self.source);
        self.dataset
            .get_or_load(|| async move {
                let location = source.location();
                let start_time = Instant::now();
                let dataset = tokio::task::spawn_blocking(move || source.load())
                    .await
                    .map_err(|e| PredictorError::artifact(location.clone(), e))??;
                log::info!(
                    "loaded {} rows from {:?} in {:?}",
                    dataset.height(),
                    location,
                    start_time.elapsed()
                );
                Ok(dataset)
            })
            .await
    }

    pub async fn preview(&self, rows: usize) -> Result<DataFrame> {
        Ok(self.load_dataset().await?.preview(rows))
    }

    pub async fn describe(&self) -> Result<Summary> {
        summary::describe(&*self.load_dataset().await?)
    }

    pub async fn correlation_matrix(&self) -> Result<CorrelationMatrix> {
        summary::correlation_matrix(&*self.load_dataset().await?)
    }

    pub async fn histogram(&self, column: &str) -> Result<Histogram> {
        let dataset = self.load_dataset().await?;
        summary::histogram(&dataset, column, self.histogram)
    }

    pub async fn house_age_histogram(&self) -> Result<Histogram> {
        self.histogram(HOUSE_AGE).await
    }

    pub fn state(&self) -> LoadState {
        self.dataset.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{CONVENIENCE_STORES, ROW_INDEX, TARGET};
    use crate::testing::CountingSource;
    use polars_io::parquet::ParquetWriter;
    use std::io::Write;

    const SAMPLE: &str = "No,X1 transaction date,X2 house age,X3 distance to the nearest MRT station,X4 number of convenience stores,X5 latitude,X6 longitude,Y house price of unit area
1,2012.917,32,84.87882,10,24.98298,121.54024,37.9
2,2012.917,19.5,306.5947,9,24.98034,121.53951,42.2
3,2013.583,13.3,561.9845,5,24.98746,121.54391,47.3
4,2013.500,13.3,561.9845,5,24.98746,121.54391,54.8
5,2012.833,5,390.5684,5,24.97937,121.54245,43.1
";

    fn write_sample(dir: &Path) -> PathBuf {
        let path = dir.join("Real_Estate.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        path
    }

    #[test]
    fn csv_columns_follow_raw_schema() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = Dataset::from_path(write_sample(dir.path())).unwrap();
        assert_eq!(dataset.height(), 5);
        let frame = dataset.frame();
        assert_eq!(frame.column(HOUSE_AGE).unwrap().dtype(), &DataType::Float64);
        assert_eq!(frame.column(CONVENIENCE_STORES).unwrap().dtype(), &DataType::Int64);
        assert_eq!(frame.column(TARGET).unwrap().dtype(), &DataType::Float64);
        assert_eq!(dataset.preview(2).height(), 2);
    }

    #[test]
    fn parquet_columns_follow_raw_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Real_Estate.parquet");
        let mut frame = df!(
            ROW_INDEX => &[1i32, 2, 3],
            HOUSE_AGE => &[32i32, 19, 13],
            CONVENIENCE_STORES => &[10i32, 9, 5],
            TARGET => &[37.9, 42.2, 47.3]
        )
        .unwrap();
        ParquetWriter::new(File::create(&path).unwrap())
            .finish(&mut frame)
            .unwrap();

        let dataset = Dataset::from_path(&path).unwrap();
        assert_eq!(dataset.height(), 3);
        let frame = dataset.frame();
        assert_eq!(frame.column(HOUSE_AGE).unwrap().dtype(), &DataType::Float64);
        assert_eq!(frame.column(CONVENIENCE_STORES).unwrap().dtype(), &DataType::Int64);
        assert_eq!(frame.column(ROW_INDEX).unwrap().dtype(), &DataType::Int64);
        assert_eq!(
            dataset.numeric_values(HOUSE_AGE).unwrap(),
            vec![Some(32.0), Some(19.0), Some(13.0)]
        );
    }

    #[test]
    fn unknown_extension_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Real_Estate.xlsx");
        std::fs::write(&path, b"not a table").unwrap();
        assert!(matches!(
            Dataset::from_path(&path),
            Err(PredictorError::ArtifactLoad { .. })
        ));
    }

    #[test]
    fn non_numeric_column_is_not_found() {
        let frame = df!(
            "label" => &["a", "b"],
            "value" => &[1.0, 2.0]
        )
        .unwrap();
        let dataset = Dataset::new(frame);
        assert_eq!(dataset.numeric_columns().len(), 1);
        assert_eq!(
            dataset.numeric_values("label"),
            Err(PredictorError::ColumnNotFound {
                column: "label".to_string()
            })
        );
        assert!(dataset.numeric_values("missing").is_err());
        assert_eq!(dataset.numeric_values("value").unwrap(), vec![Some(1.0), Some(2.0)]);
    }

    #[tokio::test]
    async fn dataset_is_read_once() {
        let source = CountingSource::new(df!("X2 house age" => &[1.0, 2.0, 3.0]).unwrap());
        let view = DatasetView::new(source.clone(), HistogramOptions::default());

        view.describe().await.unwrap();
        view.correlation_matrix().await.unwrap();
        view.house_age_histogram().await.unwrap();
        view.preview(1).await.unwrap();

        assert_eq!(source.reads(), 1);
        assert_eq!(view.state(), LoadState::Loaded);
    }

    #[tokio::test]
    async fn missing_dataset_fails_every_view() {
        let dir = tempfile::tempdir().unwrap();
        let view = DatasetView::from_path(dir.path().join("absent.csv"), HistogramOptions::default());
        assert!(matches!(
            view.describe().await,
            Err(PredictorError::ArtifactLoad { .. })
        ));
        assert!(view.house_age_histogram().await.is_err());
        assert_eq!(view.state(), LoadState::Failed);
    }
}
