//! `MemoryStore`: an `AttendanceStore` test double that keeps rows in memory.
//!
//! Joins behave like the MySQL inner joins: a row whose trainer, member or
//! workout has no registered name is left out of the joined listings.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use sqlx::error::{DatabaseError, ErrorKind};

use super::{AttendanceStore, StoreResult, WorkoutAttendanceFilter};
use crate::model::attendance::{TrainerAttendance, WorkoutAttendance};

#[derive(Default)]
struct Tables {
    trainers: HashMap<i64, String>,
    members: HashMap<i64, String>,
    workouts: HashMap<i64, String>,
    trainer_attendance: Vec<TrainerAttendance>,
    workout_attendance: Vec<WorkoutAttendance>,
    next_attendance_id: i64,
    next_record_id: i64,
}

/// What InnoDB reports when it rolls back a deadlock victim.
#[derive(Debug)]
struct Deadlock;

impl fmt::Display for Deadlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for Deadlock {}

impl DatabaseError for Deadlock {
    fn message(&self) -> &str {
        "Deadlock found when trying to get lock; try restarting transaction"
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed("40001"))
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
    pending_deadlocks: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_trainer(self, trainer_id: i64, name: &str) -> Self {
        self.tables
            .lock()
            .unwrap()
            .trainers
            .insert(trainer_id, name.to_string());
        self
    }

    pub fn with_member(self, member_id: i64, name: &str) -> Self {
        self.tables
            .lock()
            .unwrap()
            .members
            .insert(member_id, name.to_string());
        self
    }

    pub fn with_workout(self, workout_id: i64, name: &str) -> Self {
        self.tables
            .lock()
            .unwrap()
            .workouts
            .insert(workout_id, name.to_string());
        self
    }

    /// Every subsequent call fails the way a dropped connection would.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// The next `count` completions are rolled back as deadlock victims
    /// before touching any row.
    pub fn deadlock_next_completions(&self, count: usize) {
        self.pending_deadlocks.store(count, Ordering::SeqCst);
    }

    /// Inserts a trainer session with an explicit check-in time.
    pub fn seed_trainer_session(&self, trainer_id: i64, check_in: NaiveDateTime) -> i64 {
        let mut tables = self.tables.lock().unwrap();
        tables.next_attendance_id += 1;
        let attendance_id = tables.next_attendance_id;
        tables.trainer_attendance.push(TrainerAttendance {
            attendance_id,
            trainer_id,
            check_in,
            check_out: None,
            trainer_name: None,
        });
        attendance_id
    }

    pub fn trainer_session(&self, attendance_id: i64) -> Option<TrainerAttendance> {
        self.tables
            .lock()
            .unwrap()
            .trainer_attendance
            .iter()
            .find(|r| r.attendance_id == attendance_id)
            .cloned()
    }

    pub fn workout_records(&self) -> Vec<WorkoutAttendance> {
        self.tables.lock().unwrap().workout_attendance.clone()
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut);
        }
        Ok(())
    }

    fn insert_workout(tables: &mut Tables, member_id: i64, workout_id: i64, date: NaiveDate) -> i64 {
        tables.next_record_id += 1;
        let record_id = tables.next_record_id;
        tables.workout_attendance.push(WorkoutAttendance {
            record_id,
            member_id,
            workout_id,
            date,
            member_name: None,
            workout_name: None,
        });
        record_id
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn list_trainer_attendance(&self) -> StoreResult<Vec<TrainerAttendance>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();

        let mut rows: Vec<TrainerAttendance> = tables
            .trainer_attendance
            .iter()
            .filter_map(|r| {
                let name = tables.trainers.get(&r.trainer_id)?;
                Some(TrainerAttendance {
                    trainer_name: Some(name.clone()),
                    ..r.clone()
                })
            })
            .collect();
        rows.sort_by(|a, b| b.check_in.cmp(&a.check_in));
        Ok(rows)
    }

    async fn list_trainer_attendance_by_trainer(
        &self,
        trainer_id: i64,
    ) -> StoreResult<Vec<TrainerAttendance>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();

        let mut rows: Vec<TrainerAttendance> = tables
            .trainer_attendance
            .iter()
            .filter(|r| r.trainer_id == trainer_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.check_in.cmp(&a.check_in));
        Ok(rows)
    }

    async fn check_in_trainer(&self, trainer_id: i64) -> StoreResult<i64> {
        self.check()?;
        Ok(self.seed_trainer_session(trainer_id, Utc::now().naive_utc()))
    }

    async fn check_out_trainer(&self, attendance_id: i64) -> StoreResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();

        let open = tables
            .trainer_attendance
            .iter_mut()
            .find(|r| r.attendance_id == attendance_id && r.check_out.is_none());
        match open {
            Some(record) => {
                record.check_out = Some(Utc::now().naive_utc());
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn list_workout_attendance(
        &self,
        filter: &WorkoutAttendanceFilter,
    ) -> StoreResult<Vec<WorkoutAttendance>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();

        let mut rows: Vec<WorkoutAttendance> = tables
            .workout_attendance
            .iter()
            .filter(|r| {
                filter
                    .member_ids
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&r.member_id))
            })
            .filter(|r| filter.date.is_none_or(|d| r.date == d))
            .filter_map(|r| {
                let member = tables.members.get(&r.member_id)?;
                let workout = tables.workouts.get(&r.workout_id)?;
                Some(WorkoutAttendance {
                    member_name: Some(member.clone()),
                    workout_name: Some(workout.clone()),
                    ..r.clone()
                })
            })
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn list_workout_attendance_by_member(
        &self,
        member_id: i64,
    ) -> StoreResult<Vec<WorkoutAttendance>> {
        self.check()?;
        let tables = self.tables.lock().unwrap();

        let mut rows: Vec<WorkoutAttendance> = tables
            .workout_attendance
            .iter()
            .filter(|r| r.member_id == member_id)
            .filter_map(|r| {
                let workout = tables.workouts.get(&r.workout_id)?;
                Some(WorkoutAttendance {
                    workout_name: Some(workout.clone()),
                    ..r.clone()
                })
            })
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(rows)
    }

    async fn create_workout_attendance(
        &self,
        member_id: i64,
        workout_id: i64,
        date: NaiveDate,
    ) -> StoreResult<i64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(Self::insert_workout(&mut tables, member_id, workout_id, date))
    }

    async fn update_workout_attendance(
        &self,
        record_id: i64,
        workout_id: i64,
        date: NaiveDate,
    ) -> StoreResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();

        let mut affected = 0;
        for record in tables
            .workout_attendance
            .iter_mut()
            .filter(|r| r.record_id == record_id)
        {
            record.workout_id = workout_id;
            record.date = date;
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_workout_attendance(&self, record_id: i64) -> StoreResult<u64> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();

        let before = tables.workout_attendance.len();
        tables.workout_attendance.retain(|r| r.record_id != record_id);
        Ok((before - tables.workout_attendance.len()) as u64)
    }

    async fn complete_workout(
        &self,
        member_id: i64,
        workout_id: i64,
        date: NaiveDate,
    ) -> StoreResult<Option<i64>> {
        self.check()?;
        let deadlocked = self
            .pending_deadlocks
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if deadlocked {
            return Err(sqlx::Error::Database(Box::new(Deadlock)));
        }

        let mut tables = self.tables.lock().unwrap();

        let exists = tables
            .workout_attendance
            .iter()
            .any(|r| r.member_id == member_id && r.workout_id == workout_id && r.date == date);
        if exists {
            return Ok(None);
        }
        Ok(Some(Self::insert_workout(&mut tables, member_id, workout_id, date)))
    }
}
