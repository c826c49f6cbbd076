use chrono::{Duration, NaiveDate};

use crate::config::CycleConfig;
use crate::models::CycleRecord;

/// Predicted end of a stored cycle, falling back to the stored length and
/// finally the default when a legacy record carries no prediction.
pub fn effective_cycle_end(record: &CycleRecord, config: &CycleConfig) -> NaiveDate {
    record.predicted_cycle_end.unwrap_or_else(|| {
        let length = record
            .cycle_length
            .map(i64::from)
            .unwrap_or(config.default_cycle_length);
        record.cycle_start_date + Duration::days(length)
    })
}

/// Decide whether a candidate episode belongs to an already stored cycle.
///
/// Any one of these makes the candidate part of the existing cycle:
/// - a candidate day falls inside the cycle's predicted span,
/// - a candidate day lies within `close_day_threshold` days of a logged
///   period day (slightly offset spotting logs),
/// - the candidate start is closer to the cycle's last period day than the
///   minimum cycle length, in either direction; two bleeding episodes that
///   near each other cannot be distinct cycles.
pub fn should_merge(
    candidate: &[NaiveDate],
    record: &CycleRecord,
    config: &CycleConfig,
) -> bool {
    let Some(&candidate_start) = candidate.first() else {
        return false;
    };

    let span = record.cycle_start_date..=effective_cycle_end(record, config);
    if candidate.iter().any(|day| span.contains(day)) {
        return true;
    }

    let near = |a: NaiveDate, b: NaiveDate| {
        a.signed_duration_since(b).num_days().abs() <= config.close_day_threshold
    };
    if record
        .period_days
        .iter()
        .any(|existing| candidate.iter().any(|day| near(*existing, *day)))
    {
        return true;
    }

    if let Some(last_day) = record.last_period_day() {
        let gap = candidate_start.signed_duration_since(last_day).num_days().abs();
        if gap < config.min_cycle_length {
            return true;
        }
    }

    false
}

/// Union of the candidate days and every absorbed record's period days,
/// deduplicated and sorted ascending.
pub fn merged_period_days(
    candidate: &[NaiveDate],
    absorbed: &[&CycleRecord],
) -> Vec<NaiveDate> {
    let mut days: Vec<NaiveDate> = candidate.to_vec();
    for record in absorbed {
        days.extend_from_slice(&record.period_days);
    }
    days.sort_unstable();
    days.dedup();
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction;
    use chrono::Utc;
    use uuid::Uuid;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(start: &str, period_days: &[&str], length: i32) -> CycleRecord {
        let cfg = CycleConfig::default();
        let start = d(start);
        let p = prediction::predict(start, length as i64, &cfg);
        let now = Utc::now();
        CycleRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            cycle_start_date: start,
            period_days: period_days.iter().map(|s| d(s)).collect(),
            cycle_length: Some(length),
            predicted_cycle_end: Some(p.cycle_end),
            predicted_ovulation_date: Some(p.ovulation_date),
            predicted_fertile_start: Some(p.fertile_start),
            predicted_fertile_end: Some(p.fertile_end),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn day_inside_predicted_span_merges() {
        let existing = record("2024-06-01", &["2024-06-01", "2024-06-02"], 28);
        assert!(should_merge(&[d("2024-06-15")], &existing, &CycleConfig::default()));
    }

    #[test]
    fn day_on_predicted_end_merges() {
        let existing = record("2024-06-01", &["2024-06-01"], 28);
        // Span is inclusive of the predicted end, 2024-06-29.
        assert!(should_merge(&[d("2024-06-29")], &existing, &CycleConfig::default()));
    }

    #[test]
    fn nearby_spotting_log_merges() {
        let existing = record("2024-06-01", &["2024-06-01", "2024-06-02"], 28);
        // 2024-06-05 is 3 days after the last logged day.
        assert!(should_merge(&[d("2024-06-05")], &existing, &CycleConfig::default()));
    }

    #[test]
    fn start_too_close_to_last_period_day_merges() {
        let existing = record("2024-06-01", &["2024-06-01", "2024-06-05"], 28);
        // 15 days after the last period day: under the minimum cycle
        // length, so not a distinct cycle, even though 2024-06-20 is
        // checked against more than the predicted window.
        assert!(should_merge(&[d("2024-06-20")], &existing, &CycleConfig::default()));
    }

    #[test]
    fn backfilled_episode_just_before_cycle_merges() {
        let existing = record("2024-06-01", &["2024-06-01", "2024-06-02"], 28);
        assert!(should_merge(&[d("2024-05-20")], &existing, &CycleConfig::default()));
    }

    #[test]
    fn distant_episode_does_not_merge() {
        let existing = record("2024-06-01", &["2024-06-01", "2024-06-02"], 28);
        assert!(!should_merge(&[d("2024-07-05")], &existing, &CycleConfig::default()));
    }

    #[test]
    fn legacy_record_without_prediction_uses_default_span() {
        let mut existing = record("2024-06-01", &["2024-06-01"], 28);
        existing.cycle_length = None;
        existing.predicted_cycle_end = None;
        assert_eq!(
            effective_cycle_end(&existing, &CycleConfig::default()),
            d("2024-06-29")
        );
    }

    #[test]
    fn merged_days_are_sorted_and_deduplicated() {
        let a = record("2024-06-01", &["2024-06-01", "2024-06-03"], 28);
        let merged = merged_period_days(&[d("2024-06-03"), d("2024-06-04")], &[&a]);
        assert_eq!(
            merged,
            vec![d("2024-06-01"), d("2024-06-03"), d("2024-06-04")]
        );
    }
}
