use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sampling frequency of an upstream series.
///
/// Maps to the upstream `frequency` query code and decides how a date is
/// rendered as a period label (the coarse join key a display layer groups by).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Annual,
    Quarterly,
    Monthly,
    Weekly,
}

impl Frequency {
    /// Upstream query code (`frequency=a|q|m|w`).
    pub fn as_code(self) -> &'static str {
        match self {
            Frequency::Annual => "a",
            Frequency::Quarterly => "q",
            Frequency::Monthly => "m",
            Frequency::Weekly => "w",
        }
    }

    /// Period label for an observation date at this frequency,
    /// e.g. `2023`, `2023Q1`, `2023-01`, `2023-01-16`.
    pub fn period_label(self, date: NaiveDate) -> String {
        match self {
            Frequency::Annual => date.format("%Y").to_string(),
            Frequency::Quarterly => format!("{}Q{}", date.year(), date.month0() / 3 + 1),
            Frequency::Monthly => date.format("%Y-%m").to_string(),
            Frequency::Weekly => date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// One sample of one series. Only finite values become observations; upstream
/// "no data" sentinels are dropped during fetch and never reach this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub period_label: String,
    pub value: f64,
}

impl Observation {
    pub fn new(date: NaiveDate, frequency: Frequency, value: f64) -> Self {
        Self {
            date,
            period_label: frequency.period_label(date),
            value,
        }
    }
}

/// A request for one series, by catalog slug.
///
/// `frequency` falls back to the catalog default for the series, `start` to
/// the fetcher's configured default epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesRequest {
    pub series: String,
    pub frequency: Option<Frequency>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl SeriesRequest {
    pub fn new(series: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            frequency: None,
            start: None,
            end: None,
        }
    }
}

/// One joined row: every requested role matched this period, within the
/// panel's tolerance. Partial joins are never emitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedRecord {
    pub date: NaiveDate,
    pub period_label: String,
    /// Role name -> scaled series value.
    pub values: BTreeMap<String, f64>,
    /// Derived-field name -> value. A field is simply absent when its inputs
    /// are insufficient (e.g. not enough history for a lookback).
    pub derived: BTreeMap<String, f64>,
    /// Classification tags, in rule declaration order.
    pub flags: Vec<String>,
}

impl AlignedRecord {
    /// Looks a key up in `values` first, then `derived`.
    pub fn field(&self, key: &str) -> Option<f64> {
        self.values
            .get(key)
            .or_else(|| self.derived.get(key))
            .copied()
    }

    pub fn has_flag(&self, tag: &str) -> bool {
        self.flags.iter().any(|f| f == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn period_labels_follow_frequency() {
        let d = date(2023, 8, 16);
        assert_eq!(Frequency::Annual.period_label(d), "2023");
        assert_eq!(Frequency::Quarterly.period_label(d), "2023Q3");
        assert_eq!(Frequency::Monthly.period_label(d), "2023-08");
        assert_eq!(Frequency::Weekly.period_label(d), "2023-08-16");
    }

    #[test]
    fn quarter_boundaries() {
        assert_eq!(Frequency::Quarterly.period_label(date(2023, 1, 1)), "2023Q1");
        assert_eq!(Frequency::Quarterly.period_label(date(2023, 3, 31)), "2023Q1");
        assert_eq!(Frequency::Quarterly.period_label(date(2023, 4, 1)), "2023Q2");
        assert_eq!(Frequency::Quarterly.period_label(date(2023, 12, 1)), "2023Q4");
    }

    #[test]
    fn field_lookup_prefers_values() {
        let mut record = AlignedRecord {
            date: date(2023, 1, 1),
            period_label: "2023-01".to_string(),
            values: BTreeMap::new(),
            derived: BTreeMap::new(),
            flags: Vec::new(),
        };
        record.values.insert("rate".to_string(), 4.0);
        record.derived.insert("rate_yoy".to_string(), -2.5);

        assert_eq!(record.field("rate"), Some(4.0));
        assert_eq!(record.field("rate_yoy"), Some(-2.5));
        assert_eq!(record.field("missing"), None);
    }
}
