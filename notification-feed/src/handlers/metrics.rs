use axum::{http::StatusCode, response::IntoResponse};
use service_core::observability::render_metrics;

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        render_metrics(),
    )
}

#[cfg(test)]
mod tests {
    use crate::services::InMemoryStore;
    use crate::startup::{build_router, AppState};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    #[tokio::test]
    async fn metrics_are_exposed_as_plain_text() {
        let app = build_router(AppState::new(Arc::new(InMemoryStore::new())));

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(content_type.starts_with("text/plain"));
    }
}
