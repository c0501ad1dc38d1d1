//! `POST /functions/*`: the maintenance jobs as HTTP-invocable functions.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use boardkeep_auth::authorize_maintenance;
use boardkeep_infra::jobs::{ids_from_request, PresenceReport};
use boardkeep_infra::JobError;

use crate::app::errors::{json_error, presence_error_to_response};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/cleanupInvitations", post(cleanup_invitations))
        .route("/updateUserPresence", post(update_user_presence))
        .route("/updateUsersPresence", post(update_users_presence))
        .route("/countParticipants", post(count_participants))
}

async fn cleanup_invitations(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
) -> Response {
    let caller = principal.map(|Extension(p)| p.to_principal());
    if let Err(e) = authorize_maintenance(caller.as_ref()) {
        let principal = caller.as_ref().map(|p| p.principal_id.to_string());
        warn!(job = "cleanupInvitations", principal = ?principal, error = %e, "caller rejected");
        return json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string());
    }

    match services.expirer.run(Utc::now()).await {
        Ok(summary) => Json(json!({ "cleaned": summary.cleaned })).into_response(),
        Err(e) => {
            error!(job = "cleanupInvitations", error = %e, "invitation sweep failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "job_failed", e.to_string())
        }
    }
}

async fn update_user_presence(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let Some(username) = services.presence_targets.user.as_deref() else {
        let err = JobError::Misconfigured("PRESENCE_USER is not set".into());
        error!(job = "updateUserPresence", error = %err, "no presence user configured");
        return presence_error_to_response(&err);
    };

    match services.presence.touch_user(username, Utc::now()).await {
        Ok(user) => Json(json!({
            "ok": true,
            "id": user.id,
            "username": user.username,
            "last_seen": user.last_seen,
        }))
        .into_response(),
        Err(e) => {
            if !matches!(e, JobError::UserNotFound(_)) {
                error!(job = "updateUserPresence", error = %e, "presence update failed");
            }
            presence_error_to_response(&e)
        }
    }
}

#[derive(Serialize)]
struct PresenceResponse {
    ok: bool,
    #[serde(flatten)]
    report: PresenceReport,
}

async fn update_users_presence(Extension(services): Extension<Arc<AppServices>>) -> Response {
    let targets = &services.presence_targets.targets;

    match services.presence.touch_users(targets, Utc::now()).await {
        Ok(report) => Json(PresenceResponse { ok: true, report }).into_response(),
        Err(e) => {
            error!(job = "updateUsersPresence", error = %e, "presence sweep failed");
            presence_error_to_response(&e)
        }
    }
}

/// Body is `{ "ids": [...] }`; anything unreadable counts nothing.
async fn count_participants(Extension(services): Extension<Arc<AppServices>>, body: Bytes) -> Response {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let ids = ids_from_request(&body);

    let counts = services.counter.count(&ids).await;
    Json(json!({ "counts": counts })).into_response()
}
