//! In-memory model and dataset doubles shared by the unit tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use polars::prelude::DataFrame;

use crate::dataset::{Dataset, DatasetSource};
use crate::error::Result;
use crate::model::{ModelHandle, ModelLoader, Regressor};
use crate::records::FeatureRecord;

pub struct FixedPrice(pub f64);

impl Regressor for FixedPrice {
    fn predict_row(&self, _row: &[f64]) -> Result<f64> {
        Ok(self.0)
    }
}

pub struct CountingLoader {
    reads: AtomicUsize,
    price: f64,
}

impl CountingLoader {
    pub fn new(price: f64) -> Arc<Self> {
        Arc::new(CountingLoader {
            reads: AtomicUsize::new(0),
            price,
        })
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl ModelLoader for CountingLoader {
    fn location(&self) -> PathBuf {
        PathBuf::from("memory")
    }

    fn load(&self) -> Result<ModelHandle> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        ModelHandle::new(FeatureRecord::column_names(), Box::new(FixedPrice(self.price)))
    }
}

pub struct CountingSource {
    reads: AtomicUsize,
    frame: DataFrame,
}

impl CountingSource {
    pub fn new(frame: DataFrame) -> Arc<Self> {
        Arc::new(CountingSource {
            reads: AtomicUsize::new(0),
            frame,
        })
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl DatasetSource for CountingSource {
    fn location(&self) -> PathBuf {
        PathBuf::from("memory")
    }

    fn load(&self) -> Result<Dataset> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(Dataset::new(self.frame.clone()))
    }
}

pub fn scenario_record() -> FeatureRecord {
    FeatureRecord::build(2013.25, 10.0, 300.0, 2, 24.9670, 121.5400)
}
