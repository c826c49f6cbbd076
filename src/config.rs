/// Tuning knobs for the cycle engine.
///
/// All thresholds are expressed in whole days. Deployments that want
/// different physiology bounds construct one of these instead of editing
/// constants; tests construct one with fixed values.
#[derive(Debug, Clone)]
pub struct CycleConfig {
    /// Shortest physiologically plausible cycle, inclusive.
    pub min_cycle_length: i64,
    /// Longest physiologically plausible cycle, inclusive.
    pub max_cycle_length: i64,
    /// Estimate used when a user has no usable history.
    pub default_cycle_length: i64,
    /// Largest gap between two reported days that still counts as one
    /// bleeding episode. A gap of `max_gap_within_period + 1` or more
    /// starts a new group.
    pub max_gap_within_period: i64,
    /// Two period days at most this far apart are considered part of the
    /// same episode when deciding whether to merge into a stored cycle.
    pub close_day_threshold: i64,
    /// Fixed luteal phase length used to place ovulation.
    pub luteal_phase_days: i64,
    /// Fertile window opens this many days before ovulation.
    pub fertile_days_before_ovulation: i64,
    /// Fertile window closes this many days after ovulation.
    pub fertile_days_after_ovulation: i64,
    /// PMS window covers the last `pms_window_days` before the predicted
    /// cycle end.
    pub pms_window_days: i64,
    /// Recency weights for the length estimator, most recent gap first.
    pub recency_weights: [f64; 6],
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            min_cycle_length: 21,
            max_cycle_length: 45,
            default_cycle_length: 28,
            max_gap_within_period: 3,
            close_day_threshold: 3,
            luteal_phase_days: 14,
            fertile_days_before_ovulation: 5,
            fertile_days_after_ovulation: 1,
            pms_window_days: 7,
            recency_weights: [0.30, 0.25, 0.20, 0.15, 0.10, 0.05],
        }
    }
}

impl CycleConfig {
    /// Clamp a computed length into the plausible range.
    pub fn clamp_length(&self, length: i64) -> i64 {
        length.clamp(self.min_cycle_length, self.max_cycle_length)
    }

    /// Whether a start-to-start gap is usable for estimation.
    pub fn is_plausible_gap(&self, gap: i64) -> bool {
        (self.min_cycle_length..=self.max_cycle_length).contains(&gap)
    }
}
