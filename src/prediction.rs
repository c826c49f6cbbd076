use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::config::CycleConfig;

/// Forward-looking dates derived from a cycle start and length.
///
/// Always computed as one unit; no field is ever updated on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Predictions {
    pub cycle_end: NaiveDate,
    pub ovulation_date: NaiveDate,
    pub fertile_start: NaiveDate,
    pub fertile_end: NaiveDate,
    pub pms_start: NaiveDate,
    pub pms_end: NaiveDate,
}

/// Derive all predicted dates for a cycle.
///
/// Ovulation is placed a fixed luteal phase before the predicted cycle end;
/// the fertile window surrounds it and the PMS window precedes the end.
pub fn predict(start: NaiveDate, cycle_length: i64, config: &CycleConfig) -> Predictions {
    let ovulation_offset = cycle_length - config.luteal_phase_days;
    let ovulation_date = start + Duration::days(ovulation_offset);

    Predictions {
        cycle_end: start + Duration::days(cycle_length),
        ovulation_date,
        fertile_start: ovulation_date - Duration::days(config.fertile_days_before_ovulation),
        fertile_end: ovulation_date + Duration::days(config.fertile_days_after_ovulation),
        pms_start: start + Duration::days(cycle_length - config.pms_window_days),
        pms_end: start + Duration::days(cycle_length - 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn standard_28_day_cycle() {
        let p = predict(d("2024-06-01"), 28, &CycleConfig::default());
        assert_eq!(p.cycle_end, d("2024-06-29"));
        assert_eq!(p.ovulation_date, d("2024-06-15"));
        assert_eq!(p.fertile_start, d("2024-06-10"));
        assert_eq!(p.fertile_end, d("2024-06-16"));
        assert_eq!(p.pms_start, d("2024-06-22"));
        assert_eq!(p.pms_end, d("2024-06-28"));
    }

    #[test]
    fn short_cycle_shifts_everything_earlier() {
        let p = predict(d("2024-06-01"), 21, &CycleConfig::default());
        assert_eq!(p.cycle_end, d("2024-06-22"));
        assert_eq!(p.ovulation_date, d("2024-06-08"));
        assert_eq!(p.fertile_start, d("2024-06-03"));
        assert_eq!(p.fertile_end, d("2024-06-09"));
    }

    #[test]
    fn windows_track_the_cycle_length() {
        let cfg = CycleConfig::default();
        let short = predict(d("2024-06-01"), 24, &cfg);
        let long = predict(d("2024-06-01"), 35, &cfg);
        assert_eq!(
            long.ovulation_date.signed_duration_since(short.ovulation_date),
            Duration::days(11)
        );
    }
}
