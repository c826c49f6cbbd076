use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::config::CycleConfig;
use crate::error::{Error, Result};
use crate::models::{
    CycleChanges, CycleRecord, CycleStatistics, NewCycleRecord, PeriodDayDeletion,
    PeriodStatistics, SubmitOutcome, TodayStatus,
};
use crate::store::{month_bounds, CycleStore};
use crate::{estimator, grouping, merge, prediction, stats};

/// The cycle engine: grouping, merge resolution, estimation and reporting
/// over a [`CycleStore`] backend.
#[derive(Clone)]
pub struct CycleService<S> {
    store: S,
    config: CycleConfig,
}

impl<S: CycleStore> CycleService<S> {
    pub fn new(store: S, config: CycleConfig) -> Self {
        Self { store, config }
    }

    /// Calendar day used for future-date checks and "today" reports.
    /// One consistent reference everywhere: the UTC civil date.
    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Ingest reported period days: group into episodes, then merge each
    /// episode into stored cycles or create new ones.
    ///
    /// Groups are processed one at a time against the current store state,
    /// so a later group can land in a cycle an earlier group just touched.
    pub async fn submit_period_days(
        &self,
        user_id: Uuid,
        raw_days: &[String],
    ) -> Result<SubmitOutcome> {
        let groups = grouping::group_period_days(raw_days, Self::today(), &self.config)?;

        let mut cycle_ids: Vec<Uuid> = Vec::new();
        for group in groups {
            let id = self.resolve_group(user_id, group).await?;
            if !cycle_ids.contains(&id) {
                cycle_ids.push(id);
            }
        }

        Ok(SubmitOutcome {
            processed_cycle_count: cycle_ids.len(),
            cycle_ids,
        })
    }

    /// Merge one episode into the user's stored cycles, or persist it as a
    /// new cycle. Returns the id of the record the episode ended up in.
    async fn resolve_group(&self, user_id: Uuid, group: Vec<NaiveDate>) -> Result<Uuid> {
        let existing = self.store.find_by_user(user_id).await?;

        let (absorbed, unrelated): (Vec<&CycleRecord>, Vec<&CycleRecord>) = existing
            .iter()
            .partition(|record| merge::should_merge(&group, record, &self.config));

        if absorbed.is_empty() {
            let start = group[0];
            let unrelated: Vec<CycleRecord> = unrelated.into_iter().cloned().collect();
            let length = estimator::estimate_cycle_length(start, &unrelated, &self.config);
            let record = self
                .store
                .insert(NewCycleRecord {
                    user_id,
                    cycle_start_date: start,
                    period_days: group,
                    cycle_length: Some(length as i32),
                    predictions: Some(prediction::predict(start, length, &self.config)),
                })
                .await?;
            tracing::info!(user_id = %user_id, cycle_id = %record.id, start = %start, "created cycle");
            return Ok(record.id);
        }

        let days = merge::merged_period_days(&group, &absorbed);
        let start = days[0];
        let unrelated: Vec<CycleRecord> = unrelated.into_iter().cloned().collect();
        let length = estimator::estimate_cycle_length(start, &unrelated, &self.config);

        // The earliest absorbed record survives and takes the merged data;
        // the update lands before the absorbed duplicates are deleted so a
        // failure mid-merge never loses period days.
        let survivor = absorbed
            .iter()
            .min_by_key(|r| r.cycle_start_date)
            .copied()
            .expect("absorbed is non-empty");

        let updated = self
            .store
            .update(
                survivor.id,
                CycleChanges {
                    cycle_start_date: start,
                    period_days: days,
                    cycle_length: Some(length as i32),
                    predictions: Some(prediction::predict(start, length, &self.config)),
                },
            )
            .await?;

        for record in &absorbed {
            if record.id != survivor.id {
                self.store.delete(record.id).await?;
            }
        }
        tracing::info!(
            user_id = %user_id,
            cycle_id = %updated.id,
            absorbed = absorbed.len(),
            "merged period days into cycle"
        );
        Ok(updated.id)
    }

    /// All cycles for the user, newest first.
    pub async fn get_cycles(&self, user_id: Uuid) -> Result<Vec<CycleRecord>> {
        self.store.find_by_user(user_id).await
    }

    /// Cycles starting within the given calendar month.
    pub async fn get_cycles_for_month(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<CycleRecord>> {
        let (from, to) = month_bounds(year, month)
            .ok_or_else(|| Error::InvalidDate(format!("{year}-{month}")))?;
        self.store.find_by_month(user_id, from, to).await
    }

    pub async fn get_today_status(&self, user_id: Uuid) -> Result<TodayStatus> {
        let cycles = self.store.find_by_user(user_id).await?;
        Ok(stats::today_status(&cycles, Self::today(), &self.config))
    }

    pub async fn get_cycle_statistics(&self, user_id: Uuid) -> Result<CycleStatistics> {
        let cycles = self.store.find_by_user(user_id).await?;
        stats::cycle_statistics(&cycles, &self.config).ok_or(Error::NoCycles(user_id))
    }

    pub async fn get_period_statistics(&self, user_id: Uuid) -> Result<PeriodStatistics> {
        let cycles = self.store.find_by_user(user_id).await?;
        stats::period_statistics(&cycles, &self.config).ok_or(Error::NoCycles(user_id))
    }

    /// Remove one period day. Deletes the whole cycle when it was the last
    /// day; otherwise the cycle start, length and predictions are
    /// recomputed from the reduced set.
    pub async fn delete_period_day(
        &self,
        user_id: Uuid,
        raw_date: &str,
    ) -> Result<PeriodDayDeletion> {
        let date = grouping::parse_period_day(raw_date)?;
        let cycles = self.store.find_by_user(user_id).await?;
        let owner = cycles
            .iter()
            .find(|c| c.period_days.contains(&date))
            .ok_or(Error::PeriodDayNotFound(date))?;

        let mut days = owner.period_days.clone();
        days.retain(|d| *d != date);

        if days.is_empty() {
            self.store.delete(owner.id).await?;
            tracing::info!(user_id = %user_id, cycle_id = %owner.id, "removed last period day, cycle deleted");
            return Ok(PeriodDayDeletion {
                deleted_date: date,
                cycle_id: owner.id,
                cycle_deleted: true,
                remaining_period_days: None,
            });
        }

        let start = days[0];
        let others: Vec<CycleRecord> = cycles
            .iter()
            .filter(|c| c.id != owner.id)
            .cloned()
            .collect();
        let length = estimator::estimate_cycle_length(start, &others, &self.config);
        let updated = self
            .store
            .update(
                owner.id,
                CycleChanges {
                    cycle_start_date: start,
                    period_days: days,
                    cycle_length: Some(length as i32),
                    predictions: Some(prediction::predict(start, length, &self.config)),
                },
            )
            .await?;

        Ok(PeriodDayDeletion {
            deleted_date: date,
            cycle_id: updated.id,
            cycle_deleted: false,
            remaining_period_days: Some(updated.period_days),
        })
    }

    /// Ownership-checked hard delete of one cycle.
    pub async fn delete_cycle(&self, user_id: Uuid, cycle_id: Uuid) -> Result<()> {
        let record = self
            .store
            .find_by_id(cycle_id)
            .await?
            .ok_or(Error::CycleNotFound(cycle_id))?;
        if record.user_id != user_id {
            return Err(Error::Ownership { user_id, cycle_id });
        }
        self.store.delete(cycle_id).await
    }
}
