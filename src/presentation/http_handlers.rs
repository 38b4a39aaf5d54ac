use axum::{Json, Router, routing::get};
use serde::Serialize;

use super::{AppState, routes};

/// Full HTTP surface: liveness probe plus the `/posts` resource routes.
pub(crate) fn routes(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .merge(routes::router(state.clone()))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthzResponse {
    status: &'static str,
    service: &'static str,
}

async fn health_handler() -> Json<HealthzResponse> {
    Json(HealthzResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
    })
}

#[cfg(test)]
mod tests {
    use super::health_handler;

    #[tokio::test]
    async fn healthz_identifies_the_service() {
        let body = health_handler().await.0;
        assert_eq!(body.status, "ok");
        assert_eq!(body.service, "post-server");
    }
}
