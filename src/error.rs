use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors surfaced by the prediction and dataset views.
///
/// Every variant carries owned strings so a failed one-time load can be
/// cloned out to each caller that waited on it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictorError {
    #[error("could not load artifact {path:?}: {reason}")]
    ArtifactLoad { path: PathBuf, reason: String },
    #[error("column {column:?} not found or not numeric")]
    ColumnNotFound { column: String },
    #[error("feature shape mismatch: model expects {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[error("model inference failed: {0}")]
    Inference(String),
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfDomain {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("dataset operation failed: {0}")]
    Data(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("{0} load was aborted before it finished")]
    LoadAborted(String),
    #[error("could not write output: {0}")]
    Output(String),
}

impl PredictorError {
    pub fn artifact<P: Into<PathBuf>, E: ToString>(path: P, reason: E) -> Self {
        PredictorError::ArtifactLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<PolarsError> for PredictorError {
    fn from(e: PolarsError) -> Self {
        PredictorError::Data(e.to_string())
    }
}

impl From<std::io::Error> for PredictorError {
    fn from(e: std::io::Error) -> Self {
        PredictorError::Output(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PredictorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_error_names_the_path() {
        let err = PredictorError::artifact("missing.json", "No such file or directory");
        let msg = err.to_string();
        assert!(msg.contains("missing.json"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn polars_errors_become_data_errors() {
        let err: PredictorError = PolarsError::ComputeError("boom".into()).into();
        assert!(matches!(err, PredictorError::Data(ref m) if m.contains("boom")));
    }

    #[test]
    fn shape_mismatch_lists_both_sides() {
        let err = PredictorError::ShapeMismatch {
            expected: vec!["a".into(), "b".into()],
            actual: vec!["b".into(), "a".into()],
        };
        assert!(err.to_string().contains("expects [\"a\", \"b\"]"));
    }
}
