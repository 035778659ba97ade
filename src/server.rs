use crate::config::RelayConfig;
use crate::logging::SharedLogger;
use crate::relay::{self, Credential, RelayOutcome};
use crate::translate::openai_types::ChatErrorResponse;
use crate::translate::request::parse_inbound;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: RelayConfig,
    pub client: reqwest::Client,
    pub logger: SharedLogger,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/v1/chat/completions",
            post(handle_chat).options(handle_preflight),
        )
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Attach the CORS trio. Every response carries these, not just preflights.
fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    response
}

async fn handle_preflight() -> Response {
    with_cors(StatusCode::NO_CONTENT.into_response())
}

async fn handle_chat(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let req = match parse_inbound(&body) {
        Ok(r) => r,
        Err(e) => {
            state
                .logger
                .error("server", format!("Failed to parse request: {e}"));
            let err = ChatErrorResponse::invalid_request(e.to_string());
            return with_cors((StatusCode::BAD_REQUEST, Json(err)).into_response());
        }
    };

    state.logger.info(
        "server",
        format!(
            "Request: model={} messages={}",
            req.model.as_deref().unwrap_or("(default)"),
            req.messages.len()
        ),
    );

    let credential = Credential::from_headers(&headers);

    match relay::relay_chat(&req, &credential, &state.config, &state.client, &state.logger).await {
        Ok(RelayOutcome::Stream(frames)) => {
            let response = Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/event-stream")
                .header(header::CACHE_CONTROL, "no-cache")
                .body(Body::from_stream(frames))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response());
            with_cors(response)
        }
        Ok(RelayOutcome::UpstreamError { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            let response = Response::builder()
                .status(status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response());
            with_cors(response)
        }
        Err(e) => {
            state.logger.error("server", format!("Relay error: {e}"));
            let err = ChatErrorResponse::api_error(format!("Relay error: {e}"));
            with_cors((StatusCode::BAD_GATEWAY, Json(err)).into_response())
        }
    }
}

async fn handle_health() -> Response {
    let body = Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }));
    with_cors(body.into_response())
}
