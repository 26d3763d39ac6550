use crate::api::{trainer_attendance, workout_attendance};
use crate::utils::response::ApiError;
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware,
};
use actix_web::{ResponseError, error, web};

/// Per-IP limiter settings. The config owns the shared limiter state, so every
/// worker's `Governor` built from it draws on the same budget.
pub fn build_limiter(requests_per_min: u32) -> GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default()
}

/// Malformed bodies, paths and queries answer 400 inside the usual envelope.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected request body");
        let message = format!("Invalid request body: {err}");
        error::InternalError::from_response(
            err,
            ApiError::bad_request(message).error_response(),
        )
        .into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected path parameter");
        error::InternalError::from_response(
            err,
            ApiError::bad_request("Invalid path parameter").error_response(),
        )
        .into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected query string");
        error::InternalError::from_response(
            err,
            ApiError::bad_request("Invalid query string").error_response(),
        )
        .into()
    }));
}

pub fn configure(
    cfg: &mut web::ServiceConfig,
    api_prefix: &str,
    limiter: &GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>,
) {
    extractor_configs(cfg);

    cfg.service(
        web::scope(api_prefix)
            .wrap(Governor::new(limiter)) // rate limiting
            .service(
                web::scope("/trainer-attendance")
                    // /trainer-attendance
                    .service(
                        web::resource("").route(web::get().to(trainer_attendance::list_all)),
                    )
                    // /trainer-attendance/trainer/{trainer_id}
                    .service(
                        web::resource("/trainer/{trainer_id}")
                            .route(web::get().to(trainer_attendance::list_by_trainer)),
                    )
                    // /trainer-attendance/check-in
                    .service(
                        web::resource("/check-in")
                            .route(web::post().to(trainer_attendance::check_in)),
                    )
                    // /trainer-attendance/check-out/{attendance_id}
                    .service(
                        web::resource("/check-out/{attendance_id}")
                            .route(web::put().to(trainer_attendance::check_out)),
                    ),
            )
            .service(
                web::scope("/workout-attendance")
                    // /workout-attendance
                    .service(
                        web::resource("")
                            .route(web::get().to(workout_attendance::list))
                            .route(web::post().to(workout_attendance::create)),
                    )
                    // /workout-attendance/complete (before /{id})
                    .service(
                        web::resource("/complete")
                            .route(web::post().to(workout_attendance::complete)),
                    )
                    // /workout-attendance/member/{member_id}
                    .service(
                        web::resource("/member/{member_id}")
                            .route(web::get().to(workout_attendance::list_by_member)),
                    )
                    // /workout-attendance/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::put().to(workout_attendance::update))
                            .route(web::delete().to(workout_attendance::delete)),
                    ),
            ),
    );
}
