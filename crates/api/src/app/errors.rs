use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use boardkeep_infra::JobError;

/// `{ "error": code, "message": message }` with `status`.
pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn job_error_status(err: &JobError) -> StatusCode {
    match err {
        JobError::UserNotFound(_) => StatusCode::NOT_FOUND,
        JobError::Store(_) | JobError::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{ "ok": false, "error": message }` for the presence endpoints.
pub fn presence_error_to_response(err: &JobError) -> axum::response::Response {
    (
        job_error_status(err),
        axum::Json(json!({
            "ok": false,
            "error": err.to_string(),
        })),
    )
        .into_response()
}
