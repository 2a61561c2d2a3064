#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use impact_wrapped::{database::setup_database, import::RawRow};
use sea_orm::DatabaseConnection;

pub async fn test_db() -> DatabaseConnection {
    setup_database("sqlite::memory:")
        .await
        .expect("in-memory database")
}

pub fn raw(pairs: &[(&str, &str)]) -> RawRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<BTreeMap<_, _>>()
}

pub fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}
