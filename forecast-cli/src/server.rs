//! Local chat proxy: `POST /api/gpt` with `{"prompt": ...}`.
//!
//! Replies `{"answer": ...}` on success and `{"error": "Failed"}` otherwise.
//! Upstream failures map to 502, upstream timeouts to 504, local setup
//! problems to 500.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use forecast_core::{ChatBackend, ChatError};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

const GENERIC_FAILURE: &str = "Failed";

#[derive(Clone)]
struct AppState {
    chat: Arc<dyn ChatBackend>,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
struct ProxyError {
    status: StatusCode,
    message: String,
}

impl ProxyError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }
}

impl From<ChatError> for ProxyError {
    fn from(err: ChatError) -> Self {
        let status = match &err {
            ChatError::MissingApiKey | ChatError::Client(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ChatError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ChatError::Network(_)
            | ChatError::Status { .. }
            | ChatError::Parse(_)
            | ChatError::EmptyAnswer => StatusCode::BAD_GATEWAY,
        };
        error!(error = %err, status = status.as_u16(), "chat proxy failed");
        Self { status, message: GENERIC_FAILURE.to_string() }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

pub fn router(chat: Arc<dyn ChatBackend>) -> Router {
    Router::new().route("/api/gpt", post(ask)).with_state(AppState { chat })
}

#[instrument(skip_all)]
async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ProxyError> {
    let Json(request) = payload.map_err(|rejection| ProxyError::bad_request(rejection.body_text()))?;

    if request.prompt.trim().is_empty() {
        return Err(ProxyError::bad_request("Prompt cannot be empty"));
    }

    let answer = state.chat.ask(&request.prompt).await?;
    Ok(Json(AskResponse { answer }))
}

pub async fn serve(addr: SocketAddr, chat: Arc<dyn ChatBackend>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind chat proxy to {addr}"))?;

    info!(%addr, "chat proxy listening on POST /api/gpt");

    axum::serve(listener, router(chat))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Chat proxy server failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
    };
    use forecast_core::{ChatClient, ChatConfig};
    use tower::ServiceExt;
    use wiremock::{Mock, MockServer, ResponseTemplate, matchers::path};

    /// Backend that never reaches the network.
    #[derive(Debug)]
    enum Stub {
        Answer(&'static str),
        Fail(fn() -> ChatError),
    }

    #[async_trait]
    impl ChatBackend for Stub {
        async fn ask(&self, _prompt: &str) -> Result<String, ChatError> {
            match self {
                Stub::Answer(text) => Ok((*text).to_string()),
                Stub::Fail(make) => Err(make()),
            }
        }
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/gpt")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn call(app: Router, body: &str) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(post_json(body)).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn answer_is_returned_with_200() {
        let app = router(Arc::new(Stub::Answer("맑음")));

        let (status, body) = call(app, r#"{"prompt": "날씨 어때?"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({"answer": "맑음"}));
    }

    #[tokio::test]
    async fn empty_prompt_is_bad_request() {
        let app = router(Arc::new(Stub::Answer("unused")));

        let (status, body) = call(app, r#"{"prompt": "   "}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn malformed_json_keeps_error_shape() {
        let app = router(Arc::new(Stub::Answer("unused")));

        let (status, body) = call(app, "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn upstream_failure_maps_to_bad_gateway() {
        let app = router(Arc::new(Stub::Fail(|| ChatError::EmptyAnswer)));

        let (status, body) = call(app, r#"{"prompt": "hi"}"#).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, serde_json::json!({"error": "Failed"}));
    }

    #[tokio::test]
    async fn upstream_timeout_maps_to_gateway_timeout() {
        let app = router(Arc::new(Stub::Fail(|| ChatError::Timeout)));

        let (status, _) = call(app, r#"{"prompt": "hi"}"#).await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn local_setup_problem_maps_to_internal_error() {
        let app = router(Arc::new(Stub::Fail(|| ChatError::MissingApiKey)));

        let (status, body) = call(app, r#"{"prompt": "hi"}"#).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed");
    }

    #[tokio::test]
    async fn proxies_to_real_client() {
        let upstream = MockServer::start().await;
        Mock::given(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&upstream)
            .await;

        let config = ChatConfig { base_url: upstream.uri(), ..Default::default() };
        let client = ChatClient::new("sk-test".into(), config).unwrap();

        let (status, body) = call(router(Arc::new(client)), r#"{"prompt": "hi"}"#).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, serde_json::json!({"error": "Failed"}));
    }
}
