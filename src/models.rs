use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One stored menstrual cycle for one user.
///
/// `period_days` is kept sorted ascending with no duplicate calendar day,
/// and `cycle_start_date` always equals its first entry. The predicted
/// dates are only ever written together with the `cycle_length` that
/// produced them; records imported from older data may carry none of them.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CycleRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cycle_start_date: NaiveDate,
    pub period_days: Vec<NaiveDate>,
    pub cycle_length: Option<i32>,
    pub predicted_cycle_end: Option<NaiveDate>,
    pub predicted_ovulation_date: Option<NaiveDate>,
    pub predicted_fertile_start: Option<NaiveDate>,
    pub predicted_fertile_end: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CycleRecord {
    /// Last reported bleeding day of this cycle.
    ///
    /// `period_days` is never empty for a persisted record, but the
    /// accessor stays total so callers don't have to assume that.
    pub fn last_period_day(&self) -> Option<NaiveDate> {
        self.period_days.last().copied()
    }
}

/// Insert payload for a new cycle; the store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewCycleRecord {
    pub user_id: Uuid,
    pub cycle_start_date: NaiveDate,
    pub period_days: Vec<NaiveDate>,
    pub cycle_length: Option<i32>,
    pub predictions: Option<crate::prediction::Predictions>,
}

/// Fields a merge or recompute may rewrite on an existing record.
#[derive(Debug, Clone)]
pub struct CycleChanges {
    pub cycle_start_date: NaiveDate,
    pub period_days: Vec<NaiveDate>,
    pub cycle_length: Option<i32>,
    pub predictions: Option<crate::prediction::Predictions>,
}

/// Result of one `submit_period_days` call.
#[derive(Debug, Serialize)]
pub struct SubmitOutcome {
    pub processed_cycle_count: usize,
    pub cycle_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    Menstrual,
    Follicular,
    Fertile,
    Luteal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PregnancyChance {
    Low,
    Medium,
    High,
}

/// Where "today" falls within the user's active cycle, if any.
#[derive(Debug, Serialize)]
pub struct TodayStatus {
    pub date: NaiveDate,
    pub has_active_cycle: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_id: Option<Uuid>,
    pub is_period_day: bool,
    pub is_fertile_day: bool,
    pub is_ovulation_day: bool,
    pub is_pms_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_in_cycle: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle_phase: Option<CyclePhase>,
    pub pregnancy_chance: PregnancyChance,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Regularity {
    Regular,
    Irregular,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Stable,
    Lengthening,
    Shortening,
}

/// One entry of the `last_6_cycles` listing, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleSummaryEntry {
    pub start_date: NaiveDate,
    pub length: i64,
}

#[derive(Debug, Serialize)]
pub struct CycleStatistics {
    pub average_cycle_length: f64,
    pub shortest_cycle: i64,
    pub longest_cycle: i64,
    pub cycle_regularity: Regularity,
    pub trend: Trend,
    pub last_6_cycles: Vec<CycleSummaryEntry>,
    pub total_cycles_tracked: usize,
}

#[derive(Debug, Serialize)]
pub struct PeriodStatistics {
    pub average_period_length: f64,
    pub shortest_period: i64,
    pub longest_period: i64,
    pub period_regularity: Regularity,
    pub last_6_periods: Vec<CycleSummaryEntry>,
    pub total_periods_tracked: usize,
}

/// Outcome of removing a single period day.
#[derive(Debug, Serialize)]
pub struct PeriodDayDeletion {
    pub deleted_date: NaiveDate,
    pub cycle_id: Uuid,
    pub cycle_deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_period_days: Option<Vec<NaiveDate>>,
}
