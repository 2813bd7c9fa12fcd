//! Shared fixtures for integration tests: a small slice of NYC yellow taxi trips.

#![allow(dead_code)]

use assay::core::{Batch, Expectation, ExpectationSuite, Value};
use std::path::Path;

pub const SUITE_NAME: &str = "yellowtaxi_suite";

/// Eight trips with a null vendor id, two out-of-range passenger counts and a
/// null passenger count.
pub const TAXI_CSV: &str = "\
vendor_id,passenger_count,trip_distance,store_and_fwd_flag,payment_type
1,1,1.5,N,1
2,1,2.6,N,1
2,3,0.0,N,2
1,7,8.2,Y,1
,2,1.1,N,2
2,,4.0,N,1
1,0,0.9,N,3
2,9,12.4,N,1
";

/// The taxi trips as an in-memory batch.
pub fn taxi_batch() -> Batch {
    Batch::builder()
        .column(
            "vendor_id",
            vec![
                Value::Int(1),
                Value::Int(2),
                Value::Int(2),
                Value::Int(1),
                Value::Null,
                Value::Int(2),
                Value::Int(1),
                Value::Int(2),
            ],
        )
        .column(
            "passenger_count",
            vec![
                Value::Int(1),
                Value::Int(1),
                Value::Int(3),
                Value::Int(7),
                Value::Int(2),
                Value::Null,
                Value::Int(0),
                Value::Int(9),
            ],
        )
        .column(
            "store_and_fwd_flag",
            vec!["N", "N", "N", "Y", "N", "N", "N", "N"],
        )
        .build()
        .unwrap()
}

/// not-null on `vendor_id` and in-range `[0, 6]` on `passenger_count`.
pub fn taxi_suite() -> ExpectationSuite {
    ExpectationSuite::builder(SUITE_NAME)
        .description("Basic checks on yellow taxi trips")
        .expect(Expectation::not_null("vendor_id"))
        .try_expect(Expectation::in_range("passenger_count", Some(0.0), Some(6.0)))
        .unwrap()
        .build()
}

/// Writes the taxi CSV to `dir/data/yellow_tripdata_sample.csv` and returns its path.
pub fn write_taxi_csv(dir: &Path) -> std::path::PathBuf {
    let data_dir = dir.join("data");
    std::fs::create_dir_all(&data_dir).unwrap();
    let path = data_dir.join("yellow_tripdata_sample.csv");
    std::fs::write(&path, TAXI_CSV).unwrap();
    path
}
