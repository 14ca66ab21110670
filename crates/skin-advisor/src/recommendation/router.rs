use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::intake::IntakeError;
use super::service::{
    AnalysisRequest, ApiResponse, RecommendationRequest, RecommendationService,
};

/// Router builder exposing the recommendation endpoints.
pub fn recommendation_router(service: Arc<RecommendationService>) -> Router {
    Router::new()
        .route("/api/v1/recommendations", post(recommend_handler))
        .route("/api/v1/analysis", post(analysis_handler))
        .with_state(service)
}

pub(crate) async fn recommend_handler(
    State(service): State<Arc<RecommendationService>>,
    request: Result<axum::Json<RecommendationRequest>, JsonRejection>,
) -> Response {
    let axum::Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(&rejection),
    };
    let report = service.recommend(&request);
    let payload = ApiResponse::ok(report, service.meta());
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn analysis_handler(
    State(service): State<Arc<RecommendationService>>,
    request: Result<axum::Json<AnalysisRequest>, JsonRejection>,
) -> Response {
    let axum::Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return rejection_response(&rejection),
    };
    match service.analyze(&request) {
        Ok(report) => {
            let payload = ApiResponse::ok(report, service.meta());
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => intake_error_response(&error),
    }
}

pub(crate) fn intake_error_response(error: &IntakeError) -> Response {
    bad_request(error.code(), error.to_string())
}

/// Undecodable bodies get the same envelope as intake failures.
fn rejection_response(rejection: &JsonRejection) -> Response {
    bad_request("INVALID_REQUEST", rejection.body_text())
}

fn bad_request(code: &str, message: String) -> Response {
    let payload = json!({
        "success": false,
        "error": {
            "code": code,
            "message": message,
        },
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}
