use actix_web::{Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, error, info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::store::{AttendanceStore, WorkoutAttendanceFilter, is_deadlock};
use crate::utils::db_utils::parse_id_list;
use crate::utils::response::{self, ApiError};

const FETCH_FAILED: &str = "Error fetching workout attendance";
const FETCH_MEMBER_FAILED: &str = "Error fetching member workout attendance";
const CREATE_FAILED: &str = "Error recording workout attendance";
const UPDATE_FAILED: &str = "Error updating workout attendance";
const DELETE_FAILED: &str = "Error deleting workout attendance";
const COMPLETE_FAILED: &str = "Error recording workout completion";

const ALREADY_COMPLETED: &str = "Workout already marked as completed for today.";

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WorkoutAttendanceQuery {
    /// Comma separated member IDs
    #[serde(rename = "memberIds")]
    #[param(example = "3,4")]
    pub member_ids: Option<String>,
    /// Exact date, `YYYY-MM-DD`
    #[param(example = "2024-01-01")]
    pub date: Option<String>,
}

impl WorkoutAttendanceQuery {
    /// Empty parameters count as absent; anything unparsable is rejected.
    fn to_filter(&self) -> Result<WorkoutAttendanceFilter, ApiError> {
        let member_ids = match self.member_ids.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                parse_id_list(raw).map_err(|_| ApiError::bad_request("Invalid memberIds filter"))?,
            ),
            _ => None,
        };

        let date = match self.date.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| ApiError::bad_request("Invalid date filter"))?,
            ),
            _ => None,
        };

        Ok(WorkoutAttendanceFilter { member_ids, date })
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateWorkoutAttendance {
    #[schema(example = 5)]
    pub member_id: i64,
    #[schema(example = 7)]
    pub workout_id: i64,
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateWorkoutAttendance {
    #[schema(example = 8)]
    pub workout_id: i64,
    #[schema(example = "2024-01-02", format = "date", value_type = String)]
    pub date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct CompleteWorkout {
    #[schema(example = 5)]
    pub member_id: i64,
    #[schema(example = 7)]
    pub workout_id: i64,
}

/// Workout attendance, optionally filtered by members and/or date
#[utoipa::path(
    get,
    path = "/api/workout-attendance",
    params(WorkoutAttendanceQuery),
    responses(
        (status = 200, description = "Matching records, newest date first", body = Object, example = json!({
            "success": true,
            "data": [{
                "record_id": 40,
                "member_id": 5,
                "workout_id": 7,
                "date": "2024-01-01",
                "member_name": "Sam Lee",
                "workout_name": "Leg Day"
            }]
        })),
        (status = 400, description = "Malformed filter", body = Object, example = json!({
            "success": false,
            "message": "Invalid memberIds filter"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Workout Attendance"
)]
pub async fn list(
    store: web::Data<dyn AttendanceStore>,
    query: web::Query<WorkoutAttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    let filter = query.to_filter()?;

    let records = store.list_workout_attendance(&filter).await.map_err(|e| {
        error!(error = %e, ?filter, "Failed to fetch workout attendance");
        ApiError::internal(FETCH_FAILED)
    })?;

    Ok(response::data(records))
}

/// Workout attendance of one member
#[utoipa::path(
    get,
    path = "/api/workout-attendance/member/{member_id}",
    params(
        ("member_id" = i64, Path, description = "Member ID")
    ),
    responses(
        (status = 200, description = "Records of the member with workout names, newest first", body = Object),
        (status = 500, description = "Internal server error")
    ),
    tag = "Workout Attendance"
)]
pub async fn list_by_member(
    store: web::Data<dyn AttendanceStore>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let member_id = path.into_inner();

    let records = store
        .list_workout_attendance_by_member(member_id)
        .await
        .map_err(|e| {
            error!(error = %e, member_id, "Failed to fetch member workout attendance");
            ApiError::internal(FETCH_MEMBER_FAILED)
        })?;

    Ok(response::data(records))
}

/// Record workout attendance. Duplicates are accepted.
#[utoipa::path(
    post,
    path = "/api/workout-attendance",
    request_body = CreateWorkoutAttendance,
    responses(
        (status = 201, description = "Record created", body = Object, example = json!({
            "success": true,
            "message": "Workout attendance recorded successfully",
            "recordId": 40
        })),
        (status = 400, description = "Malformed request body"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Workout Attendance"
)]
pub async fn create(
    store: web::Data<dyn AttendanceStore>,
    payload: web::Json<CreateWorkoutAttendance>,
) -> actix_web::Result<impl Responder> {
    let CreateWorkoutAttendance {
        member_id,
        workout_id,
        date,
    } = payload.into_inner();

    let record_id = store
        .create_workout_attendance(member_id, workout_id, date)
        .await
        .map_err(|e| {
            error!(error = %e, member_id, workout_id, %date, "Failed to record workout attendance");
            ApiError::internal(CREATE_FAILED)
        })?;

    Ok(response::created(
        "Workout attendance recorded successfully",
        "recordId",
        record_id,
    ))
}

/// Replace workout and date of a record
#[utoipa::path(
    put,
    path = "/api/workout-attendance/{id}",
    params(
        ("id" = i64, Path, description = "Record ID")
    ),
    request_body = UpdateWorkoutAttendance,
    responses(
        (status = 200, description = "Updated (also when no record matched)", body = Object, example = json!({
            "success": true,
            "message": "Workout attendance updated successfully"
        })),
        (status = 400, description = "Malformed request"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Workout Attendance"
)]
pub async fn update(
    store: web::Data<dyn AttendanceStore>,
    path: web::Path<i64>,
    payload: web::Json<UpdateWorkoutAttendance>,
) -> actix_web::Result<impl Responder> {
    let record_id = path.into_inner();

    let affected = store
        .update_workout_attendance(record_id, payload.workout_id, payload.date)
        .await
        .map_err(|e| {
            error!(error = %e, record_id, "Failed to update workout attendance");
            ApiError::internal(UPDATE_FAILED)
        })?;

    debug!(record_id, affected, "Workout attendance updated");

    Ok(response::message("Workout attendance updated successfully"))
}

/// Delete a record
#[utoipa::path(
    delete,
    path = "/api/workout-attendance/{id}",
    params(
        ("id" = i64, Path, description = "Record ID")
    ),
    responses(
        (status = 200, description = "Deleted (also when no record matched)", body = Object, example = json!({
            "success": true,
            "message": "Workout attendance deleted successfully"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Workout Attendance"
)]
pub async fn delete(
    store: web::Data<dyn AttendanceStore>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let record_id = path.into_inner();

    let affected = store
        .delete_workout_attendance(record_id)
        .await
        .map_err(|e| {
            error!(error = %e, record_id, "Failed to delete workout attendance");
            ApiError::internal(DELETE_FAILED)
        })?;

    debug!(record_id, affected, "Workout attendance deleted");

    Ok(response::message("Workout attendance deleted successfully"))
}

/// Mark today's workout as completed, at most once per member, workout and day
#[utoipa::path(
    post,
    path = "/api/workout-attendance/complete",
    request_body = CompleteWorkout,
    responses(
        (status = 201, description = "Completion recorded", body = Object, example = json!({
            "success": true,
            "message": "Workout marked as completed",
            "recordId": 41
        })),
        (status = 200, description = "Already completed today", body = Object, example = json!({
            "success": false,
            "message": "Workout already marked as completed for today."
        })),
        (status = 400, description = "Malformed request body"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Workout Attendance"
)]
pub async fn complete(
    store: web::Data<dyn AttendanceStore>,
    payload: web::Json<CompleteWorkout>,
) -> actix_web::Result<impl Responder> {
    let CompleteWorkout {
        member_id,
        workout_id,
    } = payload.into_inner();
    let today = Utc::now().date_naive();

    // A deadlock means a concurrent completion of the same workout held the
    // lock; the single retry then finds its row.
    let inserted = match store.complete_workout(member_id, workout_id, today).await {
        Err(e) if is_deadlock(&e) => {
            warn!(error = %e, member_id, workout_id, "Workout completion deadlocked, retrying");
            store.complete_workout(member_id, workout_id, today).await
        }
        other => other,
    }
    .map_err(|e| {
        error!(error = %e, member_id, workout_id, "Failed to record workout completion");
        ApiError::internal(COMPLETE_FAILED)
    })?;

    match inserted {
        Some(record_id) => {
            info!(member_id, workout_id, record_id, "Workout completed");
            Ok(response::created(
                "Workout marked as completed",
                "recordId",
                record_id,
            ))
        }
        None => Ok(response::declined(ALREADY_COMPLETED)),
    }
}
