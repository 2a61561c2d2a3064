use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const FISCAL_YEAR_START_MONTH: u32 = 7;

/// A July 1 to June 30 accounting period, named by the calendar year it ends in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiscalYear(pub i32);

impl FiscalYear {
    pub fn containing(date: NaiveDate) -> Self {
        if date.month() >= FISCAL_YEAR_START_MONTH {
            FiscalYear(date.year() + 1)
        } else {
            FiscalYear(date.year())
        }
    }

    pub fn start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0 - 1, FISCAL_YEAR_START_MONTH, 1)
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn end(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.0, 6, 30).unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        FiscalYear::containing(date) == *self
    }

    pub fn label(&self) -> String {
        format!("FY{}", self.0)
    }
}

/// Anything dated and valued that can be bucketed into fiscal years.
pub trait Dated {
    fn date(&self) -> NaiveDateTime;
    fn value(&self) -> f64;
}

impl Dated for crate::entities::donation::Model {
    fn date(&self) -> NaiveDateTime {
        self.timestamp
    }

    fn value(&self) -> f64 {
        self.amount
    }
}

impl Dated for crate::entities::volunteer_shift::Model {
    fn date(&self) -> NaiveDateTime {
        self.shift_date
    }

    fn value(&self) -> f64 {
        self.hours
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalYearSummary {
    pub fiscal_year: FiscalYear,
    pub label: String,
    pub total: f64,
    pub count: usize,
}

/// Groups records by fiscal year, newest year first.
pub fn summarize_by_fiscal_year<T: Dated>(records: &[T]) -> Vec<FiscalYearSummary> {
    let mut buckets: BTreeMap<FiscalYear, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = buckets
            .entry(FiscalYear::containing(record.date().date()))
            .or_insert((0.0, 0));
        entry.0 += record.value();
        entry.1 += 1;
    }

    buckets
        .into_iter()
        .rev()
        .map(|(fiscal_year, (total, count))| FiscalYearSummary {
            fiscal_year,
            label: fiscal_year.label(),
            total: (total * 100.0).round() / 100.0,
            count,
        })
        .collect()
}

pub fn total_for_fiscal_year<T: Dated>(records: &[T], fiscal_year: FiscalYear) -> f64 {
    records
        .iter()
        .filter(|record| fiscal_year.contains(record.date().date()))
        .map(|record| record.value())
        .sum()
}
