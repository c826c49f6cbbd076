//! The `CycleStore` trait and its backends.
//!
//! The service layer depends on this abstraction, not on a concrete
//! backend: `PgCycleStore` backs the server, `MemoryCycleStore` backs
//! tests and local experiments.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{CycleChanges, CycleRecord, NewCycleRecord};

/// Persistence operations the cycle engine needs.
///
/// All methods return `Send` futures so the trait is usable from tokio
/// tasks and axum handlers.
pub trait CycleStore: Send + Sync {
    /// All cycles for a user, sorted by start date descending.
    fn find_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<CycleRecord>>> + Send + '_;

    /// Cycles whose start date falls in the given month, newest first.
    fn find_by_month(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> impl Future<Output = Result<Vec<CycleRecord>>> + Send + '_;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<CycleRecord>>> + Send + '_;

    fn insert(
        &self,
        record: NewCycleRecord,
    ) -> impl Future<Output = Result<CycleRecord>> + Send + '_;

    fn update(
        &self,
        id: Uuid,
        changes: CycleChanges,
    ) -> impl Future<Output = Result<CycleRecord>> + Send + '_;

    fn delete(&self, id: Uuid) -> impl Future<Output = Result<()>> + Send + '_;
}

/// First and one-past-last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let from = NaiveDate::from_ymd_opt(year, month, 1)?;
    let to = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((from, to))
}

// ─── Postgres backend ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PgCycleStore {
    pool: PgPool,
}

impl PgCycleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, user_id, cycle_start_date, period_days, cycle_length, \
     predicted_cycle_end, predicted_ovulation_date, predicted_fertile_start, \
     predicted_fertile_end, created_at, updated_at";

impl CycleStore for PgCycleStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<CycleRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM menstrual_cycles \
             WHERE user_id = $1 ORDER BY cycle_start_date DESC"
        );
        let rows = sqlx::query_as::<_, CycleRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_month(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CycleRecord>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM menstrual_cycles \
             WHERE user_id = $1 AND cycle_start_date >= $2 AND cycle_start_date < $3 \
             ORDER BY cycle_start_date DESC"
        );
        let rows = sqlx::query_as::<_, CycleRecord>(&sql)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CycleRecord>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM menstrual_cycles WHERE id = $1");
        let row = sqlx::query_as::<_, CycleRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert(&self, record: NewCycleRecord) -> Result<CycleRecord> {
        let p = record.predictions;
        let sql = format!(
            "INSERT INTO menstrual_cycles \
             (id, user_id, cycle_start_date, period_days, cycle_length, \
              predicted_cycle_end, predicted_ovulation_date, \
              predicted_fertile_start, predicted_fertile_end, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, now(), now()) \
             RETURNING {SELECT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CycleRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(record.user_id)
            .bind(record.cycle_start_date)
            .bind(&record.period_days)
            .bind(record.cycle_length)
            .bind(p.map(|p| p.cycle_end))
            .bind(p.map(|p| p.ovulation_date))
            .bind(p.map(|p| p.fertile_start))
            .bind(p.map(|p| p.fertile_end))
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, changes: CycleChanges) -> Result<CycleRecord> {
        let p = changes.predictions;
        let sql = format!(
            "UPDATE menstrual_cycles SET \
             cycle_start_date = $2, period_days = $3, cycle_length = $4, \
             predicted_cycle_end = $5, predicted_ovulation_date = $6, \
             predicted_fertile_start = $7, predicted_fertile_end = $8, \
             updated_at = now() \
             WHERE id = $1 RETURNING {SELECT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CycleRecord>(&sql)
            .bind(id)
            .bind(changes.cycle_start_date)
            .bind(&changes.period_days)
            .bind(changes.cycle_length)
            .bind(p.map(|p| p.cycle_end))
            .bind(p.map(|p| p.ovulation_date))
            .bind(p.map(|p| p.fertile_start))
            .bind(p.map(|p| p.fertile_end))
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or(Error::CycleNotFound(id))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM menstrual_cycles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::CycleNotFound(id));
        }
        Ok(())
    }
}

// ─── In-memory backend ───────────────────────────────────────────────────────

/// Hash-map backed store. Cheap to clone; clones share the same records.
#[derive(Clone, Default)]
pub struct MemoryCycleStore {
    records: Arc<Mutex<HashMap<Uuid, CycleRecord>>>,
}

impl MemoryCycleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn apply_predictions(record: &mut CycleRecord, changes: &CycleChanges) {
        record.predicted_cycle_end = changes.predictions.map(|p| p.cycle_end);
        record.predicted_ovulation_date = changes.predictions.map(|p| p.ovulation_date);
        record.predicted_fertile_start = changes.predictions.map(|p| p.fertile_start);
        record.predicted_fertile_end = changes.predictions.map(|p| p.fertile_end);
    }
}

impl CycleStore for MemoryCycleStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<CycleRecord>> {
        let records = self.records.lock().unwrap();
        let mut cycles: Vec<CycleRecord> = records
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        cycles.sort_unstable_by_key(|c| std::cmp::Reverse(c.cycle_start_date));
        Ok(cycles)
    }

    async fn find_by_month(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CycleRecord>> {
        let cycles = self.find_by_user(user_id).await?;
        Ok(cycles
            .into_iter()
            .filter(|c| from <= c.cycle_start_date && c.cycle_start_date < to)
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<CycleRecord>> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn insert(&self, record: NewCycleRecord) -> Result<CycleRecord> {
        let now = Utc::now();
        let p = record.predictions;
        let cycle = CycleRecord {
            id: Uuid::new_v4(),
            user_id: record.user_id,
            cycle_start_date: record.cycle_start_date,
            period_days: record.period_days,
            cycle_length: record.cycle_length,
            predicted_cycle_end: p.map(|p| p.cycle_end),
            predicted_ovulation_date: p.map(|p| p.ovulation_date),
            predicted_fertile_start: p.map(|p| p.fertile_start),
            predicted_fertile_end: p.map(|p| p.fertile_end),
            created_at: now,
            updated_at: now,
        };
        self.records
            .lock()
            .unwrap()
            .insert(cycle.id, cycle.clone());
        Ok(cycle)
    }

    async fn update(&self, id: Uuid, changes: CycleChanges) -> Result<CycleRecord> {
        let mut records = self.records.lock().unwrap();
        let record = records.get_mut(&id).ok_or(Error::CycleNotFound(id))?;
        record.cycle_start_date = changes.cycle_start_date;
        record.period_days = changes.period_days.clone();
        record.cycle_length = changes.cycle_length;
        Self::apply_predictions(record, &changes);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::CycleNotFound(id))
    }
}
