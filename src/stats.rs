use chrono::NaiveDate;

use crate::config::CycleConfig;
use crate::merge::effective_cycle_end;
use crate::models::{
    CyclePhase, CycleRecord, CycleStatistics, CycleSummaryEntry, PeriodStatistics,
    PregnancyChance, Regularity, TodayStatus, Trend,
};

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divide by N).
fn std_deviation(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

fn classify_regularity(lengths: &[f64], max_std_dev: f64) -> Regularity {
    if lengths.len() < 2 {
        return Regularity::InsufficientData;
    }
    if std_deviation(lengths) <= max_std_dev {
        Regularity::Regular
    } else {
        Regularity::Irregular
    }
}

/// Trend over the last lengths used, given oldest-first.
///
/// Compares the newest against the oldest value; a difference of at most
/// one day counts as stable.
fn classify_trend(lengths_chronological: &[i64]) -> Trend {
    let (Some(oldest), Some(newest)) =
        (lengths_chronological.first(), lengths_chronological.last())
    else {
        return Trend::Stable;
    };
    let diff = newest - oldest;
    if diff.abs() <= 1 {
        Trend::Stable
    } else if diff > 0 {
        Trend::Lengthening
    } else {
        Trend::Shortening
    }
}

/// Per-cycle lengths, newest cycle first.
///
/// Lengths are the plausible start-to-start gaps, each attributed to the
/// newer cycle of its pair. When no gap survives the plausibility filter
/// the lengths stored on the records stand in instead, skipping legacy
/// records that never got one.
fn cycle_lengths_newest_first(
    cycles_desc: &[CycleRecord],
    config: &CycleConfig,
) -> Vec<CycleSummaryEntry> {
    let gap_entries: Vec<CycleSummaryEntry> = cycles_desc
        .windows(2)
        .filter_map(|pair| {
            let gap = pair[0]
                .cycle_start_date
                .signed_duration_since(pair[1].cycle_start_date)
                .num_days();
            config.is_plausible_gap(gap).then(|| CycleSummaryEntry {
                start_date: pair[0].cycle_start_date,
                length: gap,
            })
        })
        .collect();

    if !gap_entries.is_empty() {
        return gap_entries;
    }

    cycles_desc
        .iter()
        .filter_map(|c| {
            c.cycle_length.map(|len| CycleSummaryEntry {
                start_date: c.cycle_start_date,
                length: i64::from(len),
            })
        })
        .collect()
}

/// Aggregate cycle-length statistics over a user's stored cycles.
///
/// `cycles_desc` must be sorted by start date descending. Returns `None`
/// when the user has no cycles at all.
pub fn cycle_statistics(
    cycles_desc: &[CycleRecord],
    config: &CycleConfig,
) -> Option<CycleStatistics> {
    if cycles_desc.is_empty() {
        return None;
    }

    let entries = cycle_lengths_newest_first(cycles_desc, config);
    let lengths: Vec<f64> = entries.iter().map(|e| e.length as f64).collect();

    let mut last_6: Vec<CycleSummaryEntry> = entries.iter().take(6).cloned().collect();
    last_6.reverse(); // chronological
    let trend_lengths: Vec<i64> = last_6.iter().map(|e| e.length).collect();

    Some(CycleStatistics {
        average_cycle_length: (mean(&lengths) * 10.0).round() / 10.0,
        shortest_cycle: entries.iter().map(|e| e.length).min().unwrap_or(0),
        longest_cycle: entries.iter().map(|e| e.length).max().unwrap_or(0),
        cycle_regularity: classify_regularity(&lengths, 3.0),
        trend: classify_trend(&trend_lengths),
        last_6_cycles: last_6,
        total_cycles_tracked: cycles_desc.len(),
    })
}

/// Aggregate bleeding-episode statistics: the same shape as
/// [`cycle_statistics`] applied to the number of period days per cycle.
pub fn period_statistics(
    cycles_desc: &[CycleRecord],
    _config: &CycleConfig,
) -> Option<PeriodStatistics> {
    if cycles_desc.is_empty() {
        return None;
    }

    let entries: Vec<CycleSummaryEntry> = cycles_desc
        .iter()
        .map(|c| CycleSummaryEntry {
            start_date: c.cycle_start_date,
            length: c.period_days.len() as i64,
        })
        .collect();
    let lengths: Vec<f64> = entries.iter().map(|e| e.length as f64).collect();

    let mut last_6: Vec<CycleSummaryEntry> = entries.iter().take(6).cloned().collect();
    last_6.reverse();

    Some(PeriodStatistics {
        average_period_length: (mean(&lengths) * 10.0).round() / 10.0,
        shortest_period: entries.iter().map(|e| e.length).min().unwrap_or(0),
        longest_period: entries.iter().map(|e| e.length).max().unwrap_or(0),
        period_regularity: classify_regularity(&lengths, 1.0),
        last_6_periods: last_6,
        total_periods_tracked: cycles_desc.len(),
    })
}

fn recommendations(
    is_period_day: bool,
    is_fertile: bool,
    is_ovulation: bool,
    is_pms: bool,
) -> Vec<String> {
    let mut out = Vec::new();
    if is_period_day {
        out.push("Stay hydrated and rest well".to_string());
        out.push("Use appropriate menstrual products".to_string());
        out.push("Consider light exercise like walking".to_string());
    }
    if is_fertile {
        out.push("This is your fertile window".to_string());
        if is_ovulation {
            out.push("Peak fertility day - highest chance of conception".to_string());
        }
        out.push("Track basal body temperature if trying to conceive".to_string());
    }
    if is_pms {
        out.push("PMS symptoms may appear - prioritize sleep and balanced meals".to_string());
    }
    if !is_period_day && !is_fertile {
        out.push("Regular daily activities".to_string());
        out.push("Good time for intense workouts".to_string());
    }
    out
}

/// Report where `today` falls for this user.
///
/// The active cycle is the one whose predicted span contains `today`.
/// Phase boundaries come from that cycle's own predictions, so a short or
/// long cycle shifts its fertile window accordingly.
pub fn today_status(
    cycles: &[CycleRecord],
    today: NaiveDate,
    config: &CycleConfig,
) -> TodayStatus {
    let active = cycles.iter().find(|c| {
        c.cycle_start_date <= today && today <= effective_cycle_end(c, config)
    });

    let Some(cycle) = active else {
        return TodayStatus {
            date: today,
            has_active_cycle: false,
            cycle_id: None,
            is_period_day: false,
            is_fertile_day: false,
            is_ovulation_day: false,
            is_pms_day: false,
            day_in_cycle: None,
            cycle_phase: None,
            pregnancy_chance: PregnancyChance::Low,
            recommendations: recommendations(false, false, false, false),
        };
    };

    let length = cycle
        .cycle_length
        .map(i64::from)
        .unwrap_or(config.default_cycle_length);
    let predicted = crate::prediction::predict(cycle.cycle_start_date, length, config);

    let is_period_day = cycle.period_days.contains(&today);
    let fertile_start = cycle.predicted_fertile_start.unwrap_or(predicted.fertile_start);
    let fertile_end = cycle.predicted_fertile_end.unwrap_or(predicted.fertile_end);
    let ovulation = cycle
        .predicted_ovulation_date
        .unwrap_or(predicted.ovulation_date);

    let is_fertile_day = fertile_start <= today && today <= fertile_end;
    let is_ovulation_day = today == ovulation;
    let is_pms_day = predicted.pms_start <= today && today <= predicted.pms_end;

    let day_in_cycle = if is_period_day {
        cycle
            .period_days
            .iter()
            .position(|d| *d == today)
            .map(|i| i as i64 + 1)
    } else {
        Some(today.signed_duration_since(cycle.cycle_start_date).num_days() + 1)
    };

    let cycle_phase = if is_period_day {
        CyclePhase::Menstrual
    } else if is_fertile_day {
        CyclePhase::Fertile
    } else if today > fertile_end {
        CyclePhase::Luteal
    } else {
        CyclePhase::Follicular
    };

    let pregnancy_chance = if is_ovulation_day {
        PregnancyChance::High
    } else if is_fertile_day {
        PregnancyChance::Medium
    } else {
        PregnancyChance::Low
    };

    TodayStatus {
        date: today,
        has_active_cycle: true,
        cycle_id: Some(cycle.id),
        is_period_day,
        is_fertile_day,
        is_ovulation_day,
        is_pms_day,
        day_in_cycle,
        cycle_phase: Some(cycle_phase),
        pregnancy_chance,
        recommendations: recommendations(
            is_period_day,
            is_fertile_day,
            is_ovulation_day,
            is_pms_day,
        ),
    }
}
