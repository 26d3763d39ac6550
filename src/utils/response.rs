//! JSON envelope shared by every endpoint:
//! `{ "success": bool, "message"?: string, "data"?: ..., <extra>? }`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// 200 with a `data` payload.
pub fn data<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "data": data
    }))
}

/// 200 with a message only.
pub fn message(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": message
    }))
}

/// 201 carrying the generated identity under `id_field`.
pub fn created(message: &str, id_field: &str, id: i64) -> HttpResponse {
    let mut body = json!({
        "success": true,
        "message": message
    });
    body[id_field] = json!(id);

    HttpResponse::Created().json(body)
}

/// 200 with `success: false`: the request was understood but nothing was done.
pub fn declined(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": false,
        "message": message
    }))
}

/// Failure envelope. Details stay in the server log.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(json!({
            "success": false,
            "message": self.message
        }))
    }
}
