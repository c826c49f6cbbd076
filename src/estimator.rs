use chrono::NaiveDate;

use crate::config::CycleConfig;
use crate::models::CycleRecord;

/// Weighted average over values listed most-recent-first.
///
/// Only as many values as there are weights are considered. When fewer
/// values than weights are present the used weights are renormalized so
/// they still sum to one.
pub fn weighted_recent_average(values: &[f64], weights: &[f64]) -> Option<f64> {
    let n = values.len().min(weights.len());
    if n == 0 {
        return None;
    }
    let weight_sum: f64 = weights[..n].iter().sum();
    let weighted: f64 = values[..n]
        .iter()
        .zip(&weights[..n])
        .map(|(v, w)| v * w)
        .sum();
    Some(weighted / weight_sum)
}

/// Estimate the cycle length for a cycle starting at `reference_start`.
///
/// The estimate comes from the user's start-to-start gaps, weighted toward
/// the most recent ones so the estimate adapts when a pattern shifts.
/// Gaps outside the plausible range are discarded; they are usually the
/// product of sparse logging rather than real physiology. When no usable
/// gap exists the stored lengths of past cycles stand in, and with no
/// history at all the default applies. The result is always clamped to the
/// plausible range.
pub fn estimate_cycle_length(
    reference_start: NaiveDate,
    other_cycles: &[CycleRecord],
    config: &CycleConfig,
) -> i64 {
    if other_cycles.is_empty() {
        return config.default_cycle_length;
    }

    // Start-date sequence including the reference cycle, newest first.
    let mut starts: Vec<NaiveDate> = other_cycles.iter().map(|c| c.cycle_start_date).collect();
    starts.push(reference_start);
    starts.sort_unstable();
    starts.dedup();
    starts.reverse();

    let gaps: Vec<f64> = starts
        .windows(2)
        .map(|w| w[0].signed_duration_since(w[1]).num_days())
        .filter(|gap| config.is_plausible_gap(*gap))
        .map(|gap| gap as f64)
        .collect();

    if let Some(avg) = weighted_recent_average(&gaps, &config.recency_weights) {
        return config.clamp_length(avg.round() as i64);
    }

    // No usable gap: fall back to the lengths stored on past cycles,
    // newest cycle first, skipping records that never got one.
    let mut by_recency: Vec<&CycleRecord> = other_cycles.iter().collect();
    by_recency.sort_unstable_by_key(|c| std::cmp::Reverse(c.cycle_start_date));
    let stored: Vec<f64> = by_recency
        .iter()
        .filter_map(|c| c.cycle_length)
        .map(|len| len as f64)
        .collect();

    match weighted_recent_average(&stored, &config.recency_weights) {
        Some(avg) => config.clamp_length(avg.round() as i64),
        None => config.default_cycle_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn cycle(start: &str, length: Option<i32>) -> CycleRecord {
        let now: DateTime<Utc> = Utc::now();
        CycleRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            cycle_start_date: d(start),
            period_days: vec![d(start)],
            cycle_length: length,
            predicted_cycle_end: None,
            predicted_ovulation_date: None,
            predicted_fertile_start: None,
            predicted_fertile_end: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn no_history_returns_default() {
        let len = estimate_cycle_length(d("2024-06-01"), &[], &CycleConfig::default());
        assert_eq!(len, 28);
    }

    #[test]
    fn single_plausible_gap_is_used_directly() {
        let others = vec![cycle("2024-05-02", None)];
        let len = estimate_cycle_length(d("2024-06-01"), &others, &CycleConfig::default());
        assert_eq!(len, 30);
    }

    #[test]
    fn recent_gaps_weigh_more_than_old_ones() {
        // Starts 30 days apart most recently, 28 before that.
        let others = vec![
            cycle("2024-05-02", None),
            cycle("2024-04-04", None),
            cycle("2024-03-07", None),
            cycle("2024-02-08", None),
            cycle("2024-01-11", None),
            cycle("2023-12-14", None),
        ];
        let reference = d("2024-06-01"); // 30 days after 2024-05-02
        let weighted =
            estimate_cycle_length(reference, &others, &CycleConfig::default()) as f64;

        // Gaps newest-first: [30, 28, 28, 28, 28, 28]. Flat mean is 28.33;
        // the recency-weighted estimate must sit closer to 30.
        let flat: f64 = (30.0 + 28.0 * 5.0) / 6.0;
        assert!((30.0 - weighted).abs() < (30.0 - flat).abs());
        assert_eq!(weighted, 29.0); // 0.30*30 + 0.70*28 = 28.6 -> 29
    }

    #[test]
    fn renormalizes_when_fewer_than_six_gaps() {
        let values = vec![30.0, 28.0];
        let avg = weighted_recent_average(&values, &CycleConfig::default().recency_weights)
            .unwrap();
        // (0.30*30 + 0.25*28) / 0.55
        assert!((avg - 29.09).abs() < 0.01);
    }

    #[test]
    fn implausible_gaps_are_discarded() {
        // 60-day gap: filtered out, leaving only the 28-day one.
        let others = vec![cycle("2024-05-04", None), cycle("2024-03-05", None)];
        let len = estimate_cycle_length(d("2024-06-01"), &others, &CycleConfig::default());
        assert_eq!(len, 28);
    }

    #[test]
    fn falls_back_to_stored_lengths_and_clamps_high() {
        // Only gap is 60 days (implausible), so the stored length of 50
        // drives the estimate and gets clamped to the maximum.
        let others = vec![cycle("2024-04-02", Some(50))];
        let len = estimate_cycle_length(d("2024-06-01"), &others, &CycleConfig::default());
        assert_eq!(len, 45);
    }

    #[test]
    fn falls_back_to_stored_lengths_and_clamps_low() {
        let others = vec![cycle("2024-04-02", Some(10))];
        let len = estimate_cycle_length(d("2024-06-01"), &others, &CycleConfig::default());
        assert_eq!(len, 21);
    }

    #[test]
    fn no_gap_and_no_stored_length_returns_default() {
        let others = vec![cycle("2024-04-02", None)];
        let len = estimate_cycle_length(d("2024-06-01"), &others, &CycleConfig::default());
        assert_eq!(len, 28);
    }
}
