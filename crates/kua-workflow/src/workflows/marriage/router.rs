use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::admin::{AdminOperations, CreateUserRequest, SendNotificationRequest};
use super::auth::CallableError;
use super::domain::{ApplicationId, MarriageApplication, UserId};
use super::handlers::ApplicationEventHandlers;
use super::notification::NotificationGateway;
use super::repository::{IdentityProvider, LogStore, UserDirectory};

/// Header carrying the uid the fronting identity layer has already verified.
pub const CALLER_UID_HEADER: &str = "x-caller-uid";

/// Before/after pair delivered for an update event.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationChange {
    pub before: MarriageApplication,
    pub after: MarriageApplication,
}

impl IntoResponse for CallableError {
    fn into_response(self) -> Response {
        let status = match self {
            CallableError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            CallableError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            CallableError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            CallableError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = json!({
            "error": {
                "status": self.kind(),
                "message": self.to_string(),
            }
        });
        (status, Json(payload)).into_response()
    }
}

/// Webhook endpoints a change feed calls for `marriageApplications` writes.
pub fn trigger_router<U, L, N>(handlers: Arc<ApplicationEventHandlers<U, L, N>>) -> Router
where
    U: UserDirectory + 'static,
    L: LogStore + 'static,
    N: NotificationGateway + 'static,
{
    Router::new()
        .route(
            "/api/v1/triggers/marriage-applications/:application_id/created",
            post(created_handler::<U, L, N>),
        )
        .route(
            "/api/v1/triggers/marriage-applications/:application_id/updated",
            post(updated_handler::<U, L, N>),
        )
        .with_state(handlers)
}

/// Callable endpoints for the privileged admin operations.
pub fn callable_router<U, L, I, N>(admin: Arc<AdminOperations<U, L, I, N>>) -> Router
where
    U: UserDirectory + 'static,
    L: LogStore + 'static,
    I: IdentityProvider + 'static,
    N: NotificationGateway + 'static,
{
    Router::new()
        .route(
            "/api/v1/callable/createUser",
            post(create_user_handler::<U, L, I, N>),
        )
        .route(
            "/api/v1/callable/sendNotification",
            post(send_notification_handler::<U, L, I, N>),
        )
        .with_state(admin)
}

/// Both routers merged, as mounted by the service binary.
pub fn marriage_router<U, L, I, N>(
    handlers: Arc<ApplicationEventHandlers<U, L, N>>,
    admin: Arc<AdminOperations<U, L, I, N>>,
) -> Router
where
    U: UserDirectory + 'static,
    L: LogStore + 'static,
    I: IdentityProvider + 'static,
    N: NotificationGateway + 'static,
{
    trigger_router(handlers).merge(callable_router(admin))
}

pub(crate) fn caller_from_headers(headers: &HeaderMap) -> Option<UserId> {
    headers
        .get(CALLER_UID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|uid| !uid.is_empty())
        .map(|uid| UserId(uid.to_string()))
}

pub(crate) async fn created_handler<U, L, N>(
    State(handlers): State<Arc<ApplicationEventHandlers<U, L, N>>>,
    Path(application_id): Path<String>,
    Json(application): Json<MarriageApplication>,
) -> Response
where
    U: UserDirectory + 'static,
    L: LogStore + 'static,
    N: NotificationGateway + 'static,
{
    let id = ApplicationId(application_id);
    let outcome = handlers.on_created(&id, &application).await;
    // Failures are answered with 200 so the feed does not redeliver and resend.
    (StatusCode::OK, Json(outcome)).into_response()
}

pub(crate) async fn updated_handler<U, L, N>(
    State(handlers): State<Arc<ApplicationEventHandlers<U, L, N>>>,
    Path(application_id): Path<String>,
    Json(change): Json<ApplicationChange>,
) -> Response
where
    U: UserDirectory + 'static,
    L: LogStore + 'static,
    N: NotificationGateway + 'static,
{
    let id = ApplicationId(application_id);
    let outcome = handlers
        .on_status_changed(&id, &change.before, &change.after)
        .await;
    (StatusCode::OK, Json(outcome)).into_response()
}

pub(crate) async fn create_user_handler<U, L, I, N>(
    State(admin): State<Arc<AdminOperations<U, L, I, N>>>,
    headers: HeaderMap,
    Json(request): Json<CreateUserRequest>,
) -> Response
where
    U: UserDirectory + 'static,
    L: LogStore + 'static,
    I: IdentityProvider + 'static,
    N: NotificationGateway + 'static,
{
    let caller = caller_from_headers(&headers);
    match admin.create_user(caller.as_ref(), request).await {
        Ok(created) => (StatusCode::OK, Json(created)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn send_notification_handler<U, L, I, N>(
    State(admin): State<Arc<AdminOperations<U, L, I, N>>>,
    headers: HeaderMap,
    Json(request): Json<SendNotificationRequest>,
) -> Response
where
    U: UserDirectory + 'static,
    L: LogStore + 'static,
    I: IdentityProvider + 'static,
    N: NotificationGateway + 'static,
{
    let caller = caller_from_headers(&headers);
    match admin.send_notification(caller.as_ref(), request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => err.into_response(),
    }
}
