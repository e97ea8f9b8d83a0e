//! Liveness endpoints.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct TestResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: &'static str,
}

/// `GET /`
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok",
        message: "Smart Health API Running",
    })
}

/// `GET /test`
pub async fn test_route() -> Json<TestResponse> {
    Json(TestResponse {
        status: "success",
        message: "Test route is working",
        timestamp: "2024",
    })
}
