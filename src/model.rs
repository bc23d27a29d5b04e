use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::cache::{LoadOnce, LoadState};
use crate::error::{PredictorError, Result};
use crate::records::{FeatureRecord, FEATURE_COLUMNS, TARGET};

pub type ForestRegressor = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Anything that maps one feature row to one price.
pub trait Regressor: Send + Sync {
    fn predict_row(&self, row: &[f64]) -> Result<f64>;
}

impl Regressor for ForestRegressor {
    fn predict_row(&self, row: &[f64]) -> Result<f64> {
        // a single row, so the layout flag does not matter
        let x = DenseMatrix::new(1, row.len(), row.to_vec(), false);
        let y = self
            .predict(&x)
            .map_err(|e| PredictorError::Inference(e.to_string()))?;
        y.first()
            .copied()
            .ok_or_else(|| PredictorError::Inference("model returned no output".to_string()))
    }
}

/// On-disk model: the fitted forest plus the columns it was fitted on.
#[derive(Serialize, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub target: String,
    pub model: ForestRegressor,
}

impl ModelArtifact {
    pub fn new(model: ForestRegressor) -> Self {
        ModelArtifact {
            feature_names: FeatureRecord::column_names(),
            target: TARGET.to_string(),
            model,
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| PredictorError::artifact(path, e))?;
        serde_json::to_writer(BufWriter::new(file), self)
            .map_err(|e| PredictorError::artifact(path, e))
    }

    pub fn into_handle(self) -> Result<ModelHandle> {
        ModelHandle::new(self.feature_names, Box::new(self.model))
    }
}

/// A loaded model whose input columns have been checked against
/// `FEATURE_COLUMNS`.
pub struct ModelHandle {
    regressor: Box<dyn Regressor>,
}

impl ModelHandle {
    pub fn new(feature_names: Vec<String>, regressor: Box<dyn Regressor>) -> Result<Self> {
        if feature_names.iter().map(String::as_str).ne(FEATURE_COLUMNS.iter().copied()) {
            return Err(PredictorError::ShapeMismatch {
                expected: FeatureRecord::column_names(),
                actual: feature_names,
            });
        }
        Ok(ModelHandle { regressor })
    }

    pub fn predict(&self, record: &FeatureRecord) -> Result<f64> {
        self.regressor.predict_row(&record.to_row())
    }
}

pub trait ModelLoader: Send + Sync {
    fn location(&self) -> PathBuf;
    fn load(&self) -> Result<ModelHandle>;
}

pub struct FileModelLoader {
    path: PathBuf,
}

impl FileModelLoader {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileModelLoader { path: path.into() }
    }
}

impl ModelLoader for FileModelLoader {
    fn location(&self) -> PathBuf {
        self.path.clone()
    }

    fn load(&self) -> Result<ModelHandle> {
        let file = File::open(&self.path).map_err(|e| PredictorError::artifact(&self.path, e))?;
        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| PredictorError::artifact(&self.path, e))?;
        artifact.into_handle()
    }
}

/// Lazily loads the model once and answers price queries with it.
pub struct PredictionService {
    loader: Arc<dyn ModelLoader>,
    model: LoadOnce<ModelHandle>,
}

impl PredictionService {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        PredictionService {
            loader,
            model: LoadOnce::new("model"),
        }
    }

    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(Arc::new(FileModelLoader::new(path)))
    }

    pub async fn ensure_loaded(&self) -> Result<Arc<ModelHandle>> {
        let loader = Arc::clone(&self.loader);
        self.model
            .get_or_load(|| async move {
                let location = loader.location();
                let start_time = Instant::now();
                let handle = tokio::task::spawn_blocking(move || loader.load())
                    .await
                    .map_err(|e| PredictorError::artifact(location.clone(), e))??;
                log::info!(
                    "loaded model from {:?} in {:?}",
                    location,
                    start_time.elapsed()
                );
                Ok(handle)
            })
            .await
    }

    pub async fn predict(&self, record: &FeatureRecord) -> Result<f64> {
        let model = self.ensure_loaded().await?;
        log::debug!("predicting for {:?}", record);
        model.predict(record)
    }

    pub fn state(&self) -> LoadState {
        self.model.state()
    }
}

pub fn format_prediction(price: f64) -> String {
    format!("Estimated Price per Unit Area: {:.2}", price)
}
