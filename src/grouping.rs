use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::config::CycleConfig;
use crate::error::{Error, Result};

/// Parse one reported period day.
///
/// Accepts an ISO 8601 calendar date, with or without a trailing time part
/// (clients sometimes send full timestamps; the time-of-day is discarded).
pub fn parse_period_day(raw: &str) -> Result<NaiveDate> {
    let date_part = raw.split('T').next().unwrap_or(raw).trim();
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| Error::InvalidDate(raw.to_string()))
}

/// Split a flat list of reported period days into bleeding episodes.
///
/// Input order does not matter: days are parsed, checked against `today`,
/// deduplicated and sorted before grouping. Within the sorted sequence a
/// new group starts whenever the gap to the previous day exceeds
/// `max_gap_within_period`, so spotting or a missed log inside one episode
/// does not split it in two.
pub fn group_period_days(
    raw_days: &[String],
    today: NaiveDate,
    config: &CycleConfig,
) -> Result<Vec<Vec<NaiveDate>>> {
    let mut days = BTreeSet::new();
    for raw in raw_days {
        let day = parse_period_day(raw)?;
        if day > today {
            return Err(Error::FutureDate(day));
        }
        days.insert(day);
    }

    let mut groups: Vec<Vec<NaiveDate>> = Vec::new();
    let mut current: Vec<NaiveDate> = Vec::new();

    for day in days {
        let gap = current
            .last()
            .map(|prev| day.signed_duration_since(*prev).num_days());
        match gap {
            Some(g) if g > config.max_gap_within_period => {
                groups.push(std::mem::take(&mut current));
                current.push(day);
            }
            _ => current.push(day),
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn strings(days: &[&str]) -> Vec<String> {
        days.iter().map(|s| s.to_string()).collect()
    }

    const TODAY: &str = "2024-07-01";

    #[test]
    fn consecutive_days_form_one_group() {
        let groups = group_period_days(
            &strings(&["2024-06-01", "2024-06-02", "2024-06-03"]),
            d(TODAY),
            &CycleConfig::default(),
        )
        .unwrap();
        assert_eq!(groups, vec![vec![d("2024-06-01"), d("2024-06-02"), d("2024-06-03")]]);
    }

    #[test]
    fn wide_gap_splits_groups() {
        let groups = group_period_days(
            &strings(&["2024-06-01", "2024-06-10"]),
            d(TODAY),
            &CycleConfig::default(),
        )
        .unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], vec![d("2024-06-01")]);
        assert_eq!(groups[1], vec![d("2024-06-10")]);
    }

    #[test]
    fn gap_exactly_at_threshold_stays_in_group() {
        let cfg = CycleConfig::default();
        let same = group_period_days(
            &strings(&["2024-06-01", "2024-06-04"]),
            d(TODAY),
            &cfg,
        )
        .unwrap();
        assert_eq!(same.len(), 1);

        let split = group_period_days(
            &strings(&["2024-06-01", "2024-06-05"]),
            d(TODAY),
            &cfg,
        )
        .unwrap();
        assert_eq!(split.len(), 2);
    }

    #[test]
    fn grouping_ignores_input_order_and_duplicates() {
        let cfg = CycleConfig::default();
        let shuffled = group_period_days(
            &strings(&["2024-06-03", "2024-06-01", "2024-06-02", "2024-06-01"]),
            d(TODAY),
            &cfg,
        )
        .unwrap();
        let sorted = group_period_days(
            &strings(&["2024-06-01", "2024-06-02", "2024-06-03"]),
            d(TODAY),
            &cfg,
        )
        .unwrap();
        assert_eq!(shuffled, sorted);
    }

    #[test]
    fn total_days_preserved_across_groups() {
        let groups = group_period_days(
            &strings(&["2024-05-01", "2024-05-02", "2024-06-01", "2024-06-02", "2024-06-03"]),
            d(TODAY),
            &CycleConfig::default(),
        )
        .unwrap();
        let total: usize = groups.iter().map(|g| g.len()).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn future_date_rejected() {
        let err = group_period_days(
            &strings(&["2024-07-02"]),
            d(TODAY),
            &CycleConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::FutureDate(day) if day == d("2024-07-02")));
    }

    #[test]
    fn today_itself_is_allowed() {
        let groups = group_period_days(
            &strings(&[TODAY]),
            d(TODAY),
            &CycleConfig::default(),
        )
        .unwrap();
        assert_eq!(groups, vec![vec![d(TODAY)]]);
    }

    #[test]
    fn unparseable_date_rejected() {
        let err = group_period_days(
            &strings(&["not-a-date"]),
            d(TODAY),
            &CycleConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDate(_)));
    }

    #[test]
    fn timestamp_suffix_is_discarded() {
        assert_eq!(parse_period_day("2024-06-01T00:00:00Z").unwrap(), d("2024-06-01"));
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let groups =
            group_period_days(&[], d(TODAY), &CycleConfig::default()).unwrap();
        assert!(groups.is_empty());
    }
}
