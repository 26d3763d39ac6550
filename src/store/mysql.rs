use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;
use tracing::debug;

use super::{AttendanceStore, StoreResult, WorkoutAttendanceFilter};
use crate::model::attendance::{TrainerAttendance, WorkoutAttendance};
use crate::utils::db_utils::{SqlValue, WhereClause};

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn list_trainer_attendance(&self) -> StoreResult<Vec<TrainerAttendance>> {
        sqlx::query_as::<_, TrainerAttendance>(
            r#"
            SELECT ta.attendance_id, ta.trainer_id, ta.check_in, ta.check_out,
                   t.name AS trainer_name
            FROM trainer_attendance ta
            JOIN trainers t ON ta.trainer_id = t.trainer_id
            ORDER BY ta.check_in DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn list_trainer_attendance_by_trainer(
        &self,
        trainer_id: i64,
    ) -> StoreResult<Vec<TrainerAttendance>> {
        sqlx::query_as::<_, TrainerAttendance>(
            r#"
            SELECT attendance_id, trainer_id, check_in, check_out
            FROM trainer_attendance
            WHERE trainer_id = ?
            ORDER BY check_in DESC
            "#,
        )
        .bind(trainer_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn check_in_trainer(&self, trainer_id: i64) -> StoreResult<i64> {
        let result = sqlx::query("INSERT INTO trainer_attendance (trainer_id) VALUES (?)")
            .bind(trainer_id)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_id() as i64)
    }

    async fn check_out_trainer(&self, attendance_id: i64) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE trainer_attendance
            SET check_out = CURRENT_TIMESTAMP
            WHERE attendance_id = ?
            AND check_out IS NULL
            "#,
        )
        .bind(attendance_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn list_workout_attendance(
        &self,
        filter: &WorkoutAttendanceFilter,
    ) -> StoreResult<Vec<WorkoutAttendance>> {
        let mut clause = WhereClause::new();
        if let Some(ids) = &filter.member_ids {
            clause.is_in("wa.member_id", ids.iter().copied().map(SqlValue::I64));
        }
        if let Some(date) = filter.date {
            clause.eq("wa.date", SqlValue::Date(date));
        }

        let sql = format!(
            r#"
            SELECT wa.record_id, wa.member_id, wa.workout_id, wa.date,
                   m.name AS member_name, w.name AS workout_name
            FROM workout_attendance wa
            JOIN members m ON wa.member_id = m.member_id
            JOIN workouts w ON wa.workout_id = w.workout_id
            {}
            ORDER BY wa.date DESC
            "#,
            clause.sql()
        );
        debug!(binds = clause.values().len(), "Listing workout attendance");

        clause
            .bind_all(sqlx::query_as::<_, WorkoutAttendance>(&sql))
            .fetch_all(&self.pool)
            .await
    }

    async fn list_workout_attendance_by_member(
        &self,
        member_id: i64,
    ) -> StoreResult<Vec<WorkoutAttendance>> {
        sqlx::query_as::<_, WorkoutAttendance>(
            r#"
            SELECT wa.record_id, wa.member_id, wa.workout_id, wa.date,
                   w.name AS workout_name
            FROM workout_attendance wa
            JOIN workouts w ON wa.workout_id = w.workout_id
            WHERE wa.member_id = ?
            ORDER BY wa.date DESC
            "#,
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn create_workout_attendance(
        &self,
        member_id: i64,
        workout_id: i64,
        date: NaiveDate,
    ) -> StoreResult<i64> {
        let result = sqlx::query(
            "INSERT INTO workout_attendance (member_id, workout_id, date) VALUES (?, ?, ?)",
        )
        .bind(member_id)
        .bind(workout_id)
        .bind(date)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    async fn update_workout_attendance(
        &self,
        record_id: i64,
        workout_id: i64,
        date: NaiveDate,
    ) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE workout_attendance SET workout_id = ?, date = ? WHERE record_id = ?",
        )
        .bind(workout_id)
        .bind(date)
        .bind(record_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_workout_attendance(&self, record_id: i64) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM workout_attendance WHERE record_id = ?")
            .bind(record_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn complete_workout(
        &self,
        member_id: i64,
        workout_id: i64,
        date: NaiveDate,
    ) -> StoreResult<Option<i64>> {
        // Under REPEATABLE READ the NOT EXISTS scan holds shared next-key
        // locks: a concurrent duplicate waits, or is rolled back with 1213.
        // READ COMMITTED reads without locks and can insert twice.
        let result = sqlx::query(
            r#"
            INSERT INTO workout_attendance (member_id, workout_id, date)
            SELECT ?, ?, ? FROM DUAL
            WHERE NOT EXISTS (
                SELECT 1 FROM workout_attendance
                WHERE member_id = ? AND workout_id = ? AND date = ?
            )
            "#,
        )
        .bind(member_id)
        .bind(workout_id)
        .bind(date)
        .bind(member_id)
        .bind(workout_id)
        .bind(date)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(result.last_insert_id() as i64))
    }
}
