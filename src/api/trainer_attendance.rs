use actix_web::{Responder, web};
use serde::Deserialize;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::model::attendance::TrainerAttendance;
use crate::store::AttendanceStore;
use crate::utils::response::{self, ApiError};

const FETCH_FAILED: &str = "Error fetching trainer attendance";
const CHECK_IN_FAILED: &str = "Error recording trainer check-in";
const CHECK_OUT_FAILED: &str = "Error recording trainer check-out";

#[derive(Deserialize, ToSchema)]
pub struct CheckIn {
    #[schema(example = 3)]
    pub trainer_id: i64,
}

/// All trainer attendance records
#[utoipa::path(
    get,
    path = "/api/trainer-attendance",
    responses(
        (status = 200, description = "Every session, newest check-in first", body = Object, example = json!({
            "success": true,
            "data": [{
                "attendance_id": 12,
                "trainer_id": 3,
                "check_in": "2024-01-01T08:00:00",
                "check_out": null,
                "trainer_name": "Alex Morgan"
            }]
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "success": false,
            "message": "Error fetching trainer attendance"
        }))
    ),
    tag = "Trainer Attendance"
)]
pub async fn list_all(
    store: web::Data<dyn AttendanceStore>,
) -> actix_web::Result<impl Responder> {
    let records: Vec<TrainerAttendance> =
        store.list_trainer_attendance().await.map_err(|e| {
            error!(error = %e, "Failed to fetch trainer attendance");
            ApiError::internal(FETCH_FAILED)
        })?;

    Ok(response::data(records))
}

/// Attendance of a single trainer
#[utoipa::path(
    get,
    path = "/api/trainer-attendance/trainer/{trainer_id}",
    params(
        ("trainer_id" = i64, Path, description = "Trainer ID")
    ),
    responses(
        (status = 200, description = "Sessions of the trainer, newest first; empty for unknown trainers", body = Object),
        (status = 500, description = "Internal server error")
    ),
    tag = "Trainer Attendance"
)]
pub async fn list_by_trainer(
    store: web::Data<dyn AttendanceStore>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let trainer_id = path.into_inner();

    let records = store
        .list_trainer_attendance_by_trainer(trainer_id)
        .await
        .map_err(|e| {
            error!(error = %e, trainer_id, "Failed to fetch trainer attendance");
            ApiError::internal(FETCH_FAILED)
        })?;

    Ok(response::data(records))
}

/// Check-in endpoint
///
/// Does not look for an already open session; a trainer may hold several.
#[utoipa::path(
    post,
    path = "/api/trainer-attendance/check-in",
    request_body = CheckIn,
    responses(
        (status = 201, description = "Check-in recorded", body = Object, example = json!({
            "success": true,
            "message": "Check-in recorded successfully",
            "attendanceId": 12
        })),
        (status = 400, description = "Malformed request body"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Trainer Attendance"
)]
pub async fn check_in(
    store: web::Data<dyn AttendanceStore>,
    payload: web::Json<CheckIn>,
) -> actix_web::Result<impl Responder> {
    let trainer_id = payload.trainer_id;

    let attendance_id = store.check_in_trainer(trainer_id).await.map_err(|e| {
        error!(error = %e, trainer_id, "Trainer check-in failed");
        ApiError::internal(CHECK_IN_FAILED)
    })?;

    Ok(response::created(
        "Check-in recorded successfully",
        "attendanceId",
        attendance_id,
    ))
}

/// Check-out endpoint
///
/// Only an open session is closed. Unknown or already closed sessions are
/// still reported as success.
#[utoipa::path(
    put,
    path = "/api/trainer-attendance/check-out/{attendance_id}",
    params(
        ("attendance_id" = i64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Check-out recorded", body = Object, example = json!({
            "success": true,
            "message": "Check-out recorded successfully"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Trainer Attendance"
)]
pub async fn check_out(
    store: web::Data<dyn AttendanceStore>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let attendance_id = path.into_inner();

    let affected = store.check_out_trainer(attendance_id).await.map_err(|e| {
        error!(error = %e, attendance_id, "Trainer check-out failed");
        ApiError::internal(CHECK_OUT_FAILED)
    })?;

    debug!(attendance_id, affected, "Trainer check-out");

    Ok(response::message("Check-out recorded successfully"))
}
