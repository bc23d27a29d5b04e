use crate::config::AppConfig;
use crate::dataset::DatasetView;
use crate::error::Result;
use crate::model::{format_prediction, PredictionService};
use crate::records::FeatureRecord;

/// Owns the configuration and both load-once views for the life of the
/// process. Built once at startup and shared by reference.
pub struct AppContext {
    config: AppConfig,
    predictions: PredictionService,
    dataset: DatasetView,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let predictions = PredictionService::from_path(config.model_path.clone());
        let dataset = DatasetView::from_path(config.dataset_path.clone(), config.histogram_options());
        AppContext {
            config,
            predictions,
            dataset,
        }
    }

    pub fn with_parts(config: AppConfig, predictions: PredictionService, dataset: DatasetView) -> Self {
        AppContext {
            config,
            predictions,
            dataset,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn predictions(&self) -> &PredictionService {
        &self.predictions
    }

    pub fn dataset(&self) -> &DatasetView {
        &self.dataset
    }

    /// Builds the record, runs the model and renders the result line.
    pub async fn estimate(&self, record: &FeatureRecord) -> Result<String> {
        let price = self.predictions.predict(record).await?;
        Ok(format_prediction(price))
    }
}
