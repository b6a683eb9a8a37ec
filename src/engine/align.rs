use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::models::{AlignedRecord, Observation};
use crate::panel::PanelSpec;

/// Joins the panel's series by date, driven by the base role's sequence.
///
/// For each base observation, every other role is probed for an exact date
/// match, or the nearest observation within `tolerance_days` when non-zero.
/// A period where any role has no match is skipped entirely; partial records
/// are never emitted. Role scale factors are applied here.
///
/// Series are expected sorted by date ascending (the pipeline sorts after
/// fetch).
pub fn align(panel: &PanelSpec, series: &HashMap<String, Vec<Observation>>) -> Vec<AlignedRecord> {
    let Some(base_role) = panel.roles.iter().find(|r| r.name == panel.base_role) else {
        return Vec::new();
    };
    let Some(base) = series.get(&base_role.name) else {
        return Vec::new();
    };

    let others: Vec<_> = panel
        .roles
        .iter()
        .filter(|r| r.name != panel.base_role)
        .map(|role| (role, series.get(&role.name).map(Vec::as_slice).unwrap_or(&[])))
        .collect();

    let mut out = Vec::new();
    'base: for obs in base {
        let mut values = BTreeMap::new();
        values.insert(base_role.name.clone(), obs.value * base_role.scale);

        for (role, role_obs) in &others {
            match nearest_within(role_obs, obs.date, panel.tolerance_days) {
                Some(value) => {
                    values.insert(role.name.clone(), value * role.scale);
                }
                None => continue 'base,
            }
        }

        out.push(AlignedRecord {
            date: obs.date,
            period_label: obs.period_label.clone(),
            values,
            derived: BTreeMap::new(),
            flags: Vec::new(),
        });
    }

    out
}

/// Value of the observation closest to `target`, provided it lies within
/// `tolerance_days`. Zero tolerance means exact match only.
fn nearest_within(obs: &[Observation], target: NaiveDate, tolerance_days: i64) -> Option<f64> {
    if obs.is_empty() {
        return None;
    }

    let idx = obs.partition_point(|o| o.date < target);

    let mut best: Option<(i64, f64)> = None;
    for candidate in [idx.checked_sub(1), Some(idx)].into_iter().flatten() {
        if let Some(o) = obs.get(candidate) {
            let distance = (o.date - target).num_days().abs();
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, o.value));
            }
        }
    }

    best.and_then(|(distance, value)| (distance <= tolerance_days).then_some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Frequency;
    use crate::panel::SeriesRole;

    fn obs(y: i32, m: u32, d: u32, value: f64) -> Observation {
        let date = NaiveDate::from_ymd_opt(y, m, d).unwrap();
        Observation::new(date, Frequency::Monthly, value)
    }

    fn two_role_panel(tolerance_days: i64) -> PanelSpec {
        PanelSpec::new("test", "base")
            .role(SeriesRole::new("base", "unemployment_rate"))
            .role(SeriesRole::new("other", "job_openings"))
            .tolerance_days(tolerance_days)
    }

    fn series_map(pairs: Vec<(&str, Vec<Observation>)>) -> HashMap<String, Vec<Observation>> {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn matching_dates_produce_one_record() {
        let panel = two_role_panel(0);
        let series = series_map(vec![
            ("base", vec![obs(2023, 1, 1, 100.0)]),
            ("other", vec![obs(2023, 1, 1, 50.0)]),
        ]);

        let records = align(&panel, &series);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].values["base"], 100.0);
        assert_eq!(records[0].values["other"], 50.0);
        assert_eq!(records[0].period_label, "2023-01");
    }

    #[test]
    fn unmatched_period_is_dropped_entirely() {
        let panel = two_role_panel(0);
        let series = series_map(vec![
            ("base", vec![obs(2023, 1, 1, 100.0), obs(2023, 2, 1, 101.0)]),
            ("other", vec![obs(2023, 1, 1, 50.0)]),
        ]);

        let records = align(&panel, &series);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
    }

    #[test]
    fn tolerance_window_joins_nearest() {
        let panel = two_role_panel(30);
        // Weekly-style claim dates probed from a monthly base date.
        let series = series_map(vec![
            ("base", vec![obs(2023, 1, 1, 3.4)]),
            (
                "other",
                vec![obs(2022, 12, 10, 210.0), obs(2023, 1, 7, 220.0), obs(2023, 2, 18, 230.0)],
            ),
        ]);

        let records = align(&panel, &series);
        assert_eq!(records.len(), 1);
        // 2023-01-07 is 6 days away, nearer than 2022-12-10 (22 days).
        assert_eq!(records[0].values["other"], 220.0);
    }

    #[test]
    fn tolerance_is_a_hard_limit() {
        let panel = two_role_panel(5);
        let series = series_map(vec![
            ("base", vec![obs(2023, 1, 1, 3.4)]),
            ("other", vec![obs(2023, 1, 20, 220.0)]),
        ]);

        assert!(align(&panel, &series).is_empty());
    }

    #[test]
    fn scale_factors_apply_to_joined_values() {
        let panel = PanelSpec::new("test", "base")
            .role(SeriesRole::new("base", "unemployment_rate"))
            .role(SeriesRole::new("other", "job_openings").with_scale(0.001));
        let series = series_map(vec![
            ("base", vec![obs(2023, 1, 1, 3.4)]),
            ("other", vec![obs(2023, 1, 1, 10_500.0)]),
        ]);

        let records = align(&panel, &series);
        assert_eq!(records[0].values["other"], 10.5);
    }

    #[test]
    fn align_is_idempotent() {
        let panel = two_role_panel(15);
        let series = series_map(vec![
            ("base", vec![obs(2023, 1, 1, 1.0), obs(2023, 2, 1, 2.0)]),
            ("other", vec![obs(2023, 1, 5, 3.0), obs(2023, 2, 3, 4.0)]),
        ]);

        assert_eq!(align(&panel, &series), align(&panel, &series));
    }

    #[test]
    fn missing_role_series_yields_no_records() {
        let panel = two_role_panel(0);
        let series = series_map(vec![("base", vec![obs(2023, 1, 1, 1.0)])]);
        assert!(align(&panel, &series).is_empty());
    }
}
