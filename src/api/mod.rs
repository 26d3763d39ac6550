pub mod trainer_attendance;
pub mod workout_attendance;
