use std::collections::HashMap;

use crate::models::{AlignedRecord, Observation};

/// The fixed vocabulary of derived fields a panel can declare.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedField {
    /// `values[numerator] / values[denominator]`; absent when the
    /// denominator is zero.
    Ratio {
        name: String,
        numerator: String,
        denominator: String,
    },
    /// Percent change of a role's value versus the aligned record `lookback`
    /// positions earlier. Absent on the first `lookback` records and when
    /// the earlier value is zero.
    Growth {
        name: String,
        role: String,
        lookback: usize,
    },
    /// Arithmetic mean of the last `window` raw observations of a role
    /// ending at the record's date. Computed from the raw per-series
    /// sequence, so periods dropped by the join don't bend the window.
    MovingAverage {
        name: String,
        role: String,
        window: usize,
    },
}

impl DerivedField {
    pub fn ratio(name: impl Into<String>, numerator: impl Into<String>, denominator: impl Into<String>) -> Self {
        DerivedField::Ratio {
            name: name.into(),
            numerator: numerator.into(),
            denominator: denominator.into(),
        }
    }

    pub fn growth(name: impl Into<String>, role: impl Into<String>, lookback: usize) -> Self {
        DerivedField::Growth {
            name: name.into(),
            role: role.into(),
            lookback,
        }
    }

    pub fn moving_average(name: impl Into<String>, role: impl Into<String>, window: usize) -> Self {
        DerivedField::MovingAverage {
            name: name.into(),
            role: role.into(),
            window,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DerivedField::Ratio { name, .. }
            | DerivedField::Growth { name, .. }
            | DerivedField::MovingAverage { name, .. } => name,
        }
    }

    /// Role names this field reads, for configuration-time validation.
    pub fn referenced_roles(&self) -> Vec<&str> {
        match self {
            DerivedField::Ratio { numerator, denominator, .. } => vec![numerator, denominator],
            DerivedField::Growth { role, .. } | DerivedField::MovingAverage { role, .. } => {
                vec![role]
            }
        }
    }
}

/// Computes every configured field over the aligned records. Fields with
/// insufficient inputs are left absent, never zero-padded.
pub fn apply(
    records: &mut [AlignedRecord],
    fields: &[DerivedField],
    raw: &HashMap<String, Vec<Observation>>,
) {
    for field in fields {
        match field {
            DerivedField::Ratio { name, numerator, denominator } => {
                for record in records.iter_mut() {
                    let (Some(num), Some(den)) =
                        (record.values.get(numerator), record.values.get(denominator))
                    else {
                        continue;
                    };
                    if *den != 0.0 {
                        let value = num / den;
                        record.derived.insert(name.clone(), value);
                    }
                }
            }
            DerivedField::Growth { name, role, lookback } => {
                if *lookback == 0 {
                    continue;
                }
                let values: Vec<Option<f64>> =
                    records.iter().map(|r| r.values.get(role).copied()).collect();
                for i in *lookback..records.len() {
                    let (Some(current), Some(previous)) = (values[i], values[i - lookback]) else {
                        continue;
                    };
                    if previous != 0.0 {
                        let pct = (current - previous) / previous * 100.0;
                        records[i].derived.insert(name.clone(), pct);
                    }
                }
            }
            DerivedField::MovingAverage { name, role, window } => {
                if *window == 0 {
                    continue;
                }
                let Some(obs) = raw.get(role) else {
                    continue;
                };
                for record in records.iter_mut() {
                    let end = obs.partition_point(|o| o.date <= record.date);
                    if end >= *window {
                        let slice = &obs[end - window..end];
                        let mean = slice.iter().map(|o| o.value).sum::<f64>() / *window as f64;
                        record.derived.insert(name.clone(), mean);
                    }
                }
            }
        }
    }
}
