use lazy_static::lazy_static;
use polars::prelude::{DataFrame, DataType, Field, NamedFrom, PolarsResult, Schema, Series};
use serde::{Deserialize, Serialize};

use crate::error::{PredictorError, Result};

pub const TRANSACTION_DATE: &str = "X1 transaction date";
pub const HOUSE_AGE: &str = "X2 house age";
pub const DISTANCE_TO_TRANSIT: &str = "X3 distance to the nearest MRT station";
pub const CONVENIENCE_STORES: &str = "X4 number of convenience stores";
pub const LATITUDE: &str = "X5 latitude";
pub const LONGITUDE: &str = "X6 longitude";
pub const TARGET: &str = "Y house price of unit area";
pub const ROW_INDEX: &str = "No";

/// Model input columns, in the order the regressor was fitted with.
pub const FEATURE_COLUMNS: [&str; 6] = [
    TRANSACTION_DATE,
    HOUSE_AGE,
    DISTANCE_TO_TRANSIT,
    CONVENIENCE_STORES,
    LATITUDE,
    LONGITUDE,
];

lazy_static! {
    static ref RAW_SCHEMA: Schema = Schema::from_iter(vec![
        Field::new(ROW_INDEX, DataType::Int64),
        Field::new(TRANSACTION_DATE, DataType::Float64),
        Field::new(HOUSE_AGE, DataType::Float64),
        Field::new(DISTANCE_TO_TRANSIT, DataType::Float64),
        Field::new(CONVENIENCE_STORES, DataType::Int64),
        Field::new(LATITUDE, DataType::Float64),
        Field::new(LONGITUDE, DataType::Float64),
        Field::new(TARGET, DataType::Float64),
    ]);
}

/// One row of model input. Field order mirrors `FEATURE_COLUMNS`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub transaction_date: f64,
    pub house_age: f64,
    pub distance_to_transit: f64,
    pub convenience_store_count: u32,
    pub latitude: f64,
    pub longitude: f64,
}

impl FeatureRecord {
    pub fn build(
        transaction_date: f64,
        house_age: f64,
        distance_to_transit: f64,
        convenience_store_count: u32,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        FeatureRecord {
            transaction_date,
            house_age,
            distance_to_transit,
            convenience_store_count,
            latitude,
            longitude,
        }
    }

    /// Column dtypes of the historical transactions file. Columns absent
    /// from the file are ignored by the reader.
    pub fn raw_schema() -> Schema {
        RAW_SCHEMA.clone()
    }

    pub fn column_names() -> Vec<String> {
        FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    pub fn to_row(&self) -> [f64; 6] {
        [
            self.transaction_date,
            self.house_age,
            self.distance_to_transit,
            f64::from(self.convenience_store_count),
            self.latitude,
            self.longitude,
        ]
    }

    pub fn to_frame(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Series::new(TRANSACTION_DATE, &[self.transaction_date]),
            Series::new(HOUSE_AGE, &[self.house_age]),
            Series::new(DISTANCE_TO_TRANSIT, &[self.distance_to_transit]),
            Series::new(CONVENIENCE_STORES, &[self.convenience_store_count]),
            Series::new(LATITUDE, &[self.latitude]),
            Series::new(LONGITUDE, &[self.longitude]),
        ])
    }

    /* Range checks the input form enforces before a record is built.
    Latitude and longitude are free-form. */
    pub fn check_domains(&self) -> Result<()> {
        let bounded = [
            ("transaction_date", self.transaction_date, 2012.0, 2015.0),
            ("house_age", self.house_age, 0.0, 50.0),
            ("distance_to_transit", self.distance_to_transit, 0.0, 10000.0),
            (
                "convenience_store_count",
                f64::from(self.convenience_store_count),
                0.0,
                10.0,
            ),
        ];
        for (field, value, min, max) in bounded {
            if !(min..=max).contains(&value) {
                return Err(PredictorError::OutOfDomain {
                    field,
                    value,
                    min,
                    max,
                });
            }
        }
        for (field, value) in [("latitude", self.latitude), ("longitude", self.longitude)] {
            if !value.is_finite() {
                return Err(PredictorError::OutOfDomain {
                    field,
                    value,
                    min: f64::MIN,
                    max: f64::MAX,
                });
            }
        }
        Ok(())
    }
}

/// Encodes a transaction month the way the training data does:
/// `year + (month - 1) / 12`, so August 2013 becomes 2013.583.
pub fn encode_transaction_date(year: i32, month: u32) -> Result<f64> {
    if !(1..=12).contains(&month) {
        return Err(PredictorError::OutOfDomain {
            field: "transaction_month",
            value: f64::from(month),
            min: 1.0,
            max: 12.0,
        });
    }
    Ok(f64::from(year) + f64::from(month - 1) / 12.0)
}
