use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "attendance_id": 12,
        "trainer_id": 3,
        "check_in": "2024-01-01T08:00:00",
        "check_out": null,
        "trainer_name": "Alex Morgan"
    })
)]
pub struct TrainerAttendance {
    #[schema(example = 12)]
    pub attendance_id: i64,

    #[schema(example = 3)]
    pub trainer_id: i64,

    #[schema(example = "2024-01-01T08:00:00", format = "date-time", value_type = String)]
    pub check_in: NaiveDateTime,

    #[schema(example = "2024-01-01T17:00:00", format = "date-time", value_type = String, nullable = true)]
    pub check_out: Option<NaiveDateTime>,

    /// Only present on the full listing
    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trainer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "record_id": 40,
        "member_id": 5,
        "workout_id": 7,
        "date": "2024-01-01",
        "member_name": "Sam Lee",
        "workout_name": "Leg Day"
    })
)]
pub struct WorkoutAttendance {
    #[schema(example = 40)]
    pub record_id: i64,

    #[schema(example = 5)]
    pub member_id: i64,

    #[schema(example = 7)]
    pub workout_id: i64,

    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,

    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,

    #[sqlx(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_name: Option<String>,
}
