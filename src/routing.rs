//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;

use crate::{
    AppState, endpoints,
    member::{get_member_endpoint, list_members_endpoint, register_member_endpoint},
    statistics::get_statistics_endpoint,
    transaction::{apply_transaction_endpoint, get_history_endpoint},
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_service_banner))
        .route(
            endpoints::MEMBERS,
            post(register_member_endpoint).get(list_members_endpoint),
        )
        .route(endpoints::MEMBER, get(get_member_endpoint))
        .route(endpoints::TRANSACTIONS, post(apply_transaction_endpoint))
        .route(endpoints::TRANSACTION_HISTORY, get(get_history_endpoint))
        .route(endpoints::STATISTICS, get(get_statistics_endpoint))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Report that the service is up and point the caller at the API routes.
async fn get_service_banner() -> Response {
    (
        StatusCode::OK,
        "Memberbank API is running! Use endpoints like /api/members/{tag}",
    )
        .into_response()
}

/// The JSON 404 response for unknown routes.
async fn get_404_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NotFound",
            "message": "The requested resource could not be found.",
        })),
    )
        .into_response()
}
