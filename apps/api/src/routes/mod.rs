pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::matching::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/match", post(handlers::handle_match))
        .route("/match/summary", post(handlers::handle_match_summary))
        .fallback(not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::llm_client::LlmError;
    use crate::matching::matcher::tests::{StubProvider, STUB_RESPONSE};
    use crate::matching::matcher::Matcher;

    fn app_with(stub: Arc<StubProvider>) -> Router {
        let config = Config::from_source(|key| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            _ => None,
        })
        .unwrap();
        let matcher = Matcher::new(stub, config.llm.clone());
        build_router(AppState {
            matcher: Arc::new(matcher),
            config,
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn python_request() -> Value {
        json!({
            "cv_data": {"skills": ["Python"]},
            "job_description": {"requirements": ["Python programming"]}
        })
    }

    #[tokio::test]
    async fn test_health_returns_ok() {
        let app = app_with(Arc::new(StubProvider::replying(STUB_RESPONSE)));
        let request = Request::get("/health").body(Body::empty()).unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "CV Matching API");
    }

    #[tokio::test]
    async fn test_root_lists_endpoints() {
        let app = app_with(Arc::new(StubProvider::replying(STUB_RESPONSE)));
        let (status, body) = send(app, Request::get("/").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoints"]["match"], "/match");
        assert_eq!(body["model"], "gpt-4");
    }

    #[tokio::test]
    async fn test_match_returns_report() {
        let stub = Arc::new(StubProvider::replying(STUB_RESPONSE));
        let app = app_with(stub.clone());

        let (status, body) = send(app, post_json("/match", python_request())).await;

        assert_eq!(status, StatusCode::OK);
        let score = body["analysis"]["overall_analysis"]["compatibility_score"]
            .as_u64()
            .unwrap();
        assert!(score <= 100);
        assert_eq!(body["model_used"], "gpt-4");
        assert!(body["processing_time"].as_f64().is_some());
        assert_eq!(
            body["analysis"]["matched_requirements"][0]["match_strength"],
            "high"
        );
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_match_with_empty_cv_is_422_without_provider_call() {
        let stub = Arc::new(StubProvider::replying(STUB_RESPONSE));
        let app = app_with(stub.clone());
        let request = json!({"cv_data": {}, "job_description": {"requirements": ["X"]}});

        let (status, body) = send(app, post_json("/match", request)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["side"], "cv");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_match_with_missing_job_is_422() {
        let app = app_with(Arc::new(StubProvider::replying(STUB_RESPONSE)));
        let request = json!({"cv_data": {"skills": ["Rust"]}});

        let (status, body) = send(app, post_json("/match", request)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["side"], "job");
    }

    #[tokio::test]
    async fn test_invalid_json_body_is_400() {
        let app = app_with(Arc::new(StubProvider::replying(STUB_RESPONSE)));
        let request = Request::builder()
            .method("POST")
            .uri("/match")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_provider_timeout_is_504() {
        let stub = Arc::new(StubProvider::failing(|| LlmError::Timeout { seconds: 60 }));
        let (status, body) = send(app_with(stub), post_json("/match", python_request())).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(body["error"]["code"], "TIMEOUT_ERROR");
    }

    #[tokio::test]
    async fn test_provider_auth_failure_is_502() {
        let stub = Arc::new(StubProvider::failing(|| LlmError::Authentication {
            status: 401,
            message: "invalid key".to_string(),
        }));
        let (status, body) = send(app_with(stub), post_json("/match", python_request())).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "AUTHENTICATION_ERROR");
    }

    #[tokio::test]
    async fn test_unparsable_provider_output_is_500() {
        let stub = Arc::new(StubProvider::replying("Sorry, I can't produce JSON today."));
        let (status, body) = send(app_with(stub), post_json("/match", python_request())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "MALFORMED_RESPONSE");
        assert_eq!(body["error"]["fragment"], "Sorry, I can't produce JSON today.");
    }

    #[tokio::test]
    async fn test_summary_respects_top_query() {
        let app = app_with(Arc::new(StubProvider::replying(STUB_RESPONSE)));

        let (status, body) = send(app, post_json("/match/summary?top=1", python_request())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overall_analysis"]["compatibility_score"], 72);
        assert_eq!(body["top_matched"].as_array().unwrap().len(), 1);
        assert_eq!(body["top_missing"][0]["importance"], "critical");
        assert_eq!(body["total_missing"], 2);
        assert_eq!(body["high_strength_matches"], 1);
    }

    #[tokio::test]
    async fn test_summary_with_invalid_top_is_400_json() {
        let stub = Arc::new(StubProvider::replying(STUB_RESPONSE));
        let app = app_with(stub.clone());

        let (status, body) =
            send(app, post_json("/match/summary?top=abc", python_request())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_REQUEST");
        assert!(body["error"]["message"].as_str().unwrap().contains("query"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_numeric_job_scalars_are_accepted() {
        let app = app_with(Arc::new(StubProvider::replying(STUB_RESPONSE)));
        let request = json!({
            "cv_data": {"skills": ["Python"]},
            "job_description": {"title": "Data Analyst", "salary_range": 90000}
        });

        let (status, _) = send(app, post_json("/match", request)).await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404_json() {
        let app = app_with(Arc::new(StubProvider::replying(STUB_RESPONSE)));
        let (status, body) = send(app, Request::get("/nope").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
