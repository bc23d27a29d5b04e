use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dataset::HistogramOptions;
use crate::error::{PredictorError, Result};

static MODEL_FILE_NAME: &str = "real_estate_model.json";
static DATASET_FILE_NAME: &str = "Real_Estate.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub dataset_path: PathBuf,
    pub histogram_bins: usize,
    pub density_points: usize,
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            model_path: PathBuf::from(MODEL_FILE_NAME),
            dataset_path: PathBuf::from(DATASET_FILE_NAME),
            histogram_bins: 20,
            density_points: 100,
            preview_rows: 10,
        }
    }
}

impl AppConfig {
    /// Reads a JSON config file; keys it leaves out keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| PredictorError::Config(format!("{}: {}", path.display(), e)))?;
        let config: AppConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| PredictorError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.histogram_bins == 0 {
            return Err(PredictorError::Config(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn histogram_options(&self) -> HistogramOptions {
        HistogramOptions {
            bins: self.histogram_bins,
            density_points: self.density_points,
        }
    }
}
