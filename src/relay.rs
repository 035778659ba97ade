//! Outbound leg of the relay: issues the upstream call and drives the SSE
//! re-framer over the response body, one line at a time.

use crate::config::RelayConfig;
use crate::error::{RelayError, Result};
use crate::logging::SharedLogger;
use crate::translate::openai_types::ChatCompletionRequest;
use crate::translate::request::openai_to_anthropic;
use crate::translate::streaming::{Emission, StreamTranslator};

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

/// Bearer credential lifted from the inbound Authorization header.
///
/// Opaque at the boundary: the relay never parses or validates it, the
/// upstream vendor rejects bad credentials itself. An absent header becomes
/// an empty token. Single-request lifetime.
#[derive(Debug, Clone)]
pub struct Credential(String);

impl Credential {
    pub fn from_headers(headers: &axum::http::HeaderMap) -> Self {
        let token = headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).to_string())
            .unwrap_or_default();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Downstream frames already in wire format (`data: <json>\n\n`).
pub type FrameStream =
    Pin<Box<dyn Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send>>;

/// Outcome of opening the outbound call.
pub enum RelayOutcome {
    /// Upstream accepted; re-framed events flow until a terminal frame or
    /// upstream close.
    Stream(FrameStream),
    /// Upstream failed before any streaming began; the status and body are
    /// mirrored verbatim to the caller.
    UpstreamError { status: u16, body: Bytes },
}

/// Forward one translated request upstream.
pub async fn relay_chat(
    req: &ChatCompletionRequest,
    credential: &Credential,
    config: &RelayConfig,
    client: &reqwest::Client,
    logger: &SharedLogger,
) -> Result<RelayOutcome> {
    let outbound = openai_to_anthropic(req, &config.defaults);

    logger.info(
        "relay",
        format!(
            "POST {} model={} messages={}",
            config.upstream.url,
            outbound.model,
            outbound.messages.len()
        ),
    );

    let response = client
        .post(&config.upstream.url)
        .header("Content-Type", "application/json")
        .header("x-api-key", credential.as_str())
        .header("anthropic-version", &config.upstream.api_version)
        .json(&outbound)
        .send()
        .await
        .map_err(|e| RelayError::upstream(format!("Request failed: {e}")))?;

    let status = response.status().as_u16();

    if !response.status().is_success() {
        // Single attempt, no translation: mirror the upstream error bytes.
        let body = response
            .bytes()
            .await
            .map_err(|e| RelayError::upstream(format!("Failed to read error body: {e}")))?;

        logger.warn(
            "relay",
            format!("Upstream error status={} body_len={}", status, body.len()),
        );

        return Ok(RelayOutcome::UpstreamError { status, body });
    }

    logger.debug("relay", format!("Upstream accepted status={status}"));

    let frames = reframe_stream(response.bytes_stream(), logger.clone());
    Ok(RelayOutcome::Stream(Box::pin(frames)))
}

/// Re-frame an upstream SSE byte stream into downstream frames.
///
/// Buffers at most one partial line; each produced frame is yielded as soon
/// as its line completes, preserving upstream delta order.
fn reframe_stream(
    byte_stream: impl Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Send + 'static,
    logger: SharedLogger,
) -> impl Stream<Item = std::result::Result<Bytes, std::io::Error>> + Send + 'static {
    async_stream::stream! {
        let mut translator = StreamTranslator::new();
        let mut buffer = String::new();

        tokio::pin!(byte_stream);

        'read: while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(c) => c,
                Err(e) => {
                    // A broken upstream socket mid-stream is an end-of-stream,
                    // not an application error.
                    logger.warn("stream", format!("Upstream closed mid-stream: {e}"));
                    break;
                }
            };

            buffer.push_str(&String::from_utf8_lossy(&chunk));

            // Process complete lines
            while let Some(newline_pos) = buffer.find('\n') {
                let line = buffer[..newline_pos].to_string();
                buffer = buffer[newline_pos + 1..].to_string();

                match translator.process_line(&line) {
                    Some(Emission::Chunk(chunk)) => {
                        if let Ok(json) = serde_json::to_string(&chunk) {
                            yield Ok(Bytes::from(format!("data: {json}\n\n")));
                        }
                    }
                    Some(Emission::Done) => {
                        yield Ok(Bytes::from_static(b"data: [DONE]\n\n"));
                        break 'read;
                    }
                    None => {}
                }
            }
        }

        if !translator.is_done() {
            logger.info("stream", "Upstream ended without a terminal event");
        }

        logger.info("stream", "Stream completed");
    }
}
