//! Persistence seam for both attendance tables.
//!
//! Each method maps to exactly one SQL statement. Handlers only talk to
//! `dyn AttendanceStore`, so tests can swap the MySQL pool for memory.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::attendance::{TrainerAttendance, WorkoutAttendance};

#[cfg(test)]
pub mod memory;
pub mod mysql;

pub use mysql::MySqlStore;

pub type StoreResult<T> = Result<T, sqlx::Error>;

/// InnoDB picked this statement as a deadlock victim (SQLSTATE `40001`,
/// MySQL error 1213). The statement was rolled back and may be retried.
pub fn is_deadlock(err: &sqlx::Error) -> bool {
    let sqlx::Error::Database(db_err) = err else {
        return false;
    };

    db_err.code().as_deref() == Some("40001")
        || db_err
            .try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>()
            .is_some_and(|e| e.number() == 1213)
}

/// Optional predicates for the workout attendance listing, ANDed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkoutAttendanceFilter {
    pub member_ids: Option<Vec<i64>>,
    pub date: Option<NaiveDate>,
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// All trainer sessions with trainer names, newest check-in first.
    async fn list_trainer_attendance(&self) -> StoreResult<Vec<TrainerAttendance>>;

    async fn list_trainer_attendance_by_trainer(
        &self,
        trainer_id: i64,
    ) -> StoreResult<Vec<TrainerAttendance>>;

    /// Opens a session and returns its `attendance_id`.
    async fn check_in_trainer(&self, trainer_id: i64) -> StoreResult<i64>;

    /// Closes an open session. Returns the number of rows touched, which is 0
    /// when the session is unknown or already closed.
    async fn check_out_trainer(&self, attendance_id: i64) -> StoreResult<u64>;

    async fn list_workout_attendance(
        &self,
        filter: &WorkoutAttendanceFilter,
    ) -> StoreResult<Vec<WorkoutAttendance>>;

    async fn list_workout_attendance_by_member(
        &self,
        member_id: i64,
    ) -> StoreResult<Vec<WorkoutAttendance>>;

    async fn create_workout_attendance(
        &self,
        member_id: i64,
        workout_id: i64,
        date: NaiveDate,
    ) -> StoreResult<i64>;

    async fn update_workout_attendance(
        &self,
        record_id: i64,
        workout_id: i64,
        date: NaiveDate,
    ) -> StoreResult<u64>;

    async fn delete_workout_attendance(&self, record_id: i64) -> StoreResult<u64>;

    /// Inserts `(member_id, workout_id, date)` unless that exact triple is
    /// already recorded, checking and inserting in one statement.
    ///
    /// Returns the new `record_id`, or `None` if a record already existed.
    /// On MySQL this only excludes duplicates under REPEATABLE READ (or
    /// stricter); a concurrent duplicate may come back as a deadlock error,
    /// see [`is_deadlock`].
    async fn complete_workout(
        &self,
        member_id: i64,
        workout_id: i64,
        date: NaiveDate,
    ) -> StoreResult<Option<i64>>;
}
