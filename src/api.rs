//! HTTP API: the pairing endpoint and a health check.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use wapair_core::config::ServerConfig;
use wapair_core::pairing::{PairingParams, PairingRequest};

use crate::gateway::{PairingGateway, PairingReply};
use crate::shutdown::Shutdown;

/// How long in-flight requests may take to finish once shutdown starts.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    gateway: Arc<PairingGateway>,
}

impl ApiState {
    pub fn new(gateway: Arc<PairingGateway>) -> Self {
        Self { gateway }
    }
}

/// `GET /?number=&pairingCode=&mobile=`: start a pairing session.
///
/// In pairing-code mode the response carries `{"code": "XXXX-XXXX"}`. In QR
/// mode the QR code is printed on the server terminal and the request stays
/// open until the session ends.
async fn pair(State(state): State<ApiState>, Query(params): Query<PairingParams>) -> Response {
    let request = PairingRequest::from_params(&params);
    info!(
        "pairing request ({})",
        if request.is_pairing_code() {
            "pairing code"
        } else {
            "QR"
        }
    );

    match state.gateway.begin(request).await {
        Ok(PairingReply::Code(code)) => Json(json!({ "code": code })).into_response(),
        Ok(PairingReply::Rejected(rejection)) => {
            (StatusCode::BAD_REQUEST, rejection.message()).into_response()
        }
        Ok(PairingReply::Busy) => (
            StatusCode::CONFLICT,
            "A pairing session is already in progress",
        )
            .into_response(),
        Ok(PairingReply::Failed) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
        Err(_) => StatusCode::NO_CONTENT.into_response(),
    }
}

/// `GET /health`: liveness and whether a session is running.
async fn health(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "session": if state.gateway.is_active() { "active" } else { "idle" },
    }))
}

/// Build the axum router with shared state.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(pair))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve until `shutdown` fires, then drain and return the exit code.
pub async fn serve(
    config: &ServerConfig,
    gateway: Arc<PairingGateway>,
    shutdown: Shutdown,
) -> anyhow::Result<i32> {
    let app = build_router(ApiState::new(gateway));
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind to {addr}: {e}"))?;
    info!("pairing server listening on {addr}");

    let graceful = shutdown.clone();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            graceful.wait().await;
            info!("server draining");
        })
        .into_future();

    let deadline = shutdown.clone();
    let drain_deadline = async move {
        deadline.wait().await;
        tokio::time::sleep(DRAIN_TIMEOUT).await;
    };

    tokio::select! {
        res = server => {
            if let Err(e) = res {
                error!("server error: {e}");
            }
        }
        _ = drain_deadline => warn!("drain timed out after {}s", DRAIN_TIMEOUT.as_secs()),
    }

    Ok(shutdown.exit_code().unwrap_or(0))
}
