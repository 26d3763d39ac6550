use crate::api::trainer_attendance::CheckIn;
use crate::api::workout_attendance::{
    CompleteWorkout, CreateWorkoutAttendance, UpdateWorkoutAttendance,
};
use crate::model::attendance::{TrainerAttendance, WorkoutAttendance};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gym Attendance API",
        version = "0.1.0",
        description = r#"
## Gym Attendance

Trainer check-in/check-out and member workout attendance for a gym.

### Key Features
- **Trainer Attendance**
  - Check in, check out, list sessions overall or per trainer
- **Workout Attendance**
  - Record, edit, delete and list workouts per member and date
  - Mark today's workout as completed, at most once per day

### Response Format
Every response is a JSON envelope:
`{ "success": bool, "message"?: string, "data"?: ... }`.
Creations also carry the new id (`attendanceId` or `recordId`).

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::trainer_attendance::list_all,
        crate::api::trainer_attendance::list_by_trainer,
        crate::api::trainer_attendance::check_in,
        crate::api::trainer_attendance::check_out,

        crate::api::workout_attendance::list,
        crate::api::workout_attendance::list_by_member,
        crate::api::workout_attendance::create,
        crate::api::workout_attendance::update,
        crate::api::workout_attendance::delete,
        crate::api::workout_attendance::complete
    ),
    components(
        schemas(
            TrainerAttendance,
            WorkoutAttendance,
            CheckIn,
            CreateWorkoutAttendance,
            UpdateWorkoutAttendance,
            CompleteWorkout
        )
    ),
    tags(
        (name = "Trainer Attendance", description = "Trainer check-in/check-out APIs"),
        (name = "Workout Attendance", description = "Member workout attendance APIs"),
    )
)]
pub struct ApiDoc;
