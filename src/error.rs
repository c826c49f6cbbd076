use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    #[error("period day {0} is in the future")]
    FutureDate(NaiveDate),

    #[error("no cycle data found for user {0}")]
    NoCycles(Uuid),

    #[error("cycle not found: {0}")]
    CycleNotFound(Uuid),

    #[error("no cycle contains period day {0}")]
    PeriodDayNotFound(NaiveDate),

    #[error("cycle {cycle_id} does not belong to user {user_id}")]
    Ownership { user_id: Uuid, cycle_id: Uuid },

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
