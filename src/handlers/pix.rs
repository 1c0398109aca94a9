use axum::{
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::PixError;
use crate::services::PixService;

pub async fn create_pix(
    State(service): State<Arc<PixService>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("pix_create", %request_id);

    async move {
        let payload = match parse_body(&body) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Invalid PIX request: {}", e);
                return e.into_response();
            }
        };

        let client_ip = client_ip(&headers, connect_info.map(|ConnectInfo(addr)| addr));
        info!("Received PIX request");

        match service.create_pix(&payload, client_ip).await {
            Ok(result) => (StatusCode::OK, Json(result)).into_response(),
            Err(e) if e.is_client_error() => {
                warn!("Rejected PIX request: {}", e);
                e.into_response()
            }
            Err(e) => {
                error!("Failed to create PIX: {}", e);
                e.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

// Empty body behaves like `{}`.
fn parse_body(body: &[u8]) -> Result<Value, PixError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body).map_err(|e| PixError::MalformedBody(e.to_string()))
}

/// First `X-Forwarded-For` hop, else the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(ToString::to_string)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}
