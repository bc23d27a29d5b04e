use std::path::{Path, PathBuf};

use real_estate_price::model::ForestRegressor;
use real_estate_price::records::{FEATURE_COLUMNS, HOUSE_AGE, TARGET};
use real_estate_price::{AppConfig, AppContext, Dataset, FeatureRecord, ModelArtifact, PredictorError};
use smartcore::ensemble::random_forest_regressor::RandomForestRegressorParameters;
use smartcore::linalg::basic::matrix::DenseMatrix;

const ROWS: usize = 60;

fn write_transactions(dir: &Path) -> PathBuf {
    let path = dir.join("Real_Estate.csv");
    let mut wtr = csv::Writer::from_path(&path).unwrap();
    let mut header = vec!["No"];
    header.extend_from_slice(&FEATURE_COLUMNS);
    header.push(TARGET);
    wtr.write_record(&header).unwrap();

    for i in 0..ROWS {
        let t = i as f64;
        let date = 2012.667 + (i % 12) as f64 / 12.0;
        let age = (i * 7 % 43) as f64 + 0.5;
        let distance = 23.4 + 97.0 * t;
        let stores = i % 11;
        let latitude = 24.93 + (i % 9) as f64 * 0.007;
        let longitude = 121.47 + (i % 13) as f64 * 0.006;
        let price = 58.0 - 0.25 * age - 0.006 * distance + 1.1 * stores as f64;
        // every seventh row is missing its house age
        let age_field = if i % 7 == 3 { String::new() } else { age.to_string() };
        wtr.write_record(&[
            (i + 1).to_string(),
            date.to_string(),
            age_field,
            distance.to_string(),
            stores.to_string(),
            latitude.to_string(),
            longitude.to_string(),
            price.to_string(),
        ])
        .unwrap();
    }
    wtr.flush().unwrap();
    path
}

fn fit_and_save(dataset: &Dataset, path: &Path) {
    let columns: Vec<Vec<Option<f64>>> = FEATURE_COLUMNS
        .iter()
        .map(|c| dataset.numeric_values(c).unwrap())
        .collect();
    let target = dataset.numeric_values(TARGET).unwrap();

    let mut values = Vec::new();
    let mut y = Vec::new();
    for row in 0..dataset.height() {
        let features: Option<Vec<f64>> = columns.iter().map(|c| c[row]).collect();
        if let (Some(features), Some(price)) = (features, target[row]) {
            values.extend(features);
            y.push(price);
        }
    }
    let x = DenseMatrix::new(y.len(), FEATURE_COLUMNS.len(), values, false);
    let forest = ForestRegressor::fit(&x, &y, RandomForestRegressorParameters::default()).unwrap();
    ModelArtifact::new(forest).save(path).unwrap();
}

fn context_in(dir: &Path, with_model: bool) -> AppContext {
    let dataset_path = write_transactions(dir);
    let model_path = dir.join("real_estate_model.json");
    if with_model {
        fit_and_save(&Dataset::from_path(&dataset_path).unwrap(), &model_path);
    }
    AppContext::new(AppConfig {
        model_path,
        dataset_path,
        histogram_bins: 8,
        ..AppConfig::default()
    })
}

#[tokio::test]
async fn estimate_renders_two_decimals() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(dir.path(), true);

    let record = FeatureRecord::build(2013.25, 10.0, 300.0, 2, 24.9670, 121.5400);
    let line = ctx.estimate(&record).await.unwrap();
    let price = line
        .strip_prefix("Estimated Price per Unit Area: ")
        .expect("prefix");
    assert_eq!(price.split('.').nth(1).map(str::len), Some(2));

    // same record, same cached model, same answer
    assert_eq!(ctx.estimate(&record).await.unwrap(), line);
}

#[tokio::test]
async fn dataset_views_work_without_a_model() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(dir.path(), false);

    let record = FeatureRecord::build(2013.25, 10.0, 300.0, 2, 24.9670, 121.5400);
    assert!(matches!(
        ctx.estimate(&record).await,
        Err(PredictorError::ArtifactLoad { .. })
    ));

    let summary = ctx.dataset().describe().await.unwrap();
    let age = summary.get(HOUSE_AGE).unwrap();
    let missing = (0..ROWS).filter(|i| i % 7 == 3).count();
    assert_eq!(age.count, ROWS - missing);

    let hist = ctx.dataset().house_age_histogram().await.unwrap();
    assert_eq!(hist.bins.len(), 8);
    assert_eq!(hist.total(), age.count);
    assert!(!hist.density.is_empty());

    let matrix = ctx.dataset().correlation_matrix().await.unwrap();
    assert_eq!(matrix.columns.len(), 8);
    for (i, row) in matrix.values.iter().enumerate() {
        assert_eq!(row[i], 1.0);
    }

    assert!(matches!(
        ctx.dataset().histogram("nonexistent_column").await,
        Err(PredictorError::ColumnNotFound { .. })
    ));
    assert!(ctx.dataset().describe().await.is_ok());
    assert_eq!(ctx.dataset().preview(5).await.unwrap().height(), 5);
}
