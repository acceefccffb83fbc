//! HTTP surface for the conversation pipeline.
//!
//! ## Endpoints
//!
//! - `POST /chat` — one user turn; body `{"question": "..."}`, response
//!   `{"messages": [...]}` with ordered playback bundles.
//! - `GET /healthz` — liveness probe.
//!
//! Whole-request failures map to a status code plus a generic error body;
//! internal diagnostics stay in the logs.

use crate::error::{ConverseError, Result};
use crate::pipeline::{ConversationRequest, PipelineCoordinator};
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Shared state for axum handlers.
#[derive(Clone)]
struct AppState {
    coordinator: Arc<PipelineCoordinator>,
}

/// Generic error body returned to the UI.
#[derive(Debug, serde::Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// HTTP server for the conversation pipeline.
pub struct ConversationServer {
    /// The address the server is listening on.
    addr: SocketAddr,
    /// Handle to the background server task.
    handle: JoinHandle<()>,
}

impl ConversationServer {
    /// Start the server.
    ///
    /// Binds to `bind_addr` (use port `0` for auto-assign) and begins
    /// serving in a background tokio task.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(bind_addr: &str, coordinator: Arc<PipelineCoordinator>) -> Result<Self> {
        let state = AppState { coordinator };

        let app = Router::new()
            .route("/chat", post(handle_chat))
            .route("/healthz", get(handle_healthz))
            .with_state(state);

        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|e| ConverseError::Config(format!("server bind failed: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| ConverseError::Config(format!("failed to get local addr: {e}")))?;

        info!("conversation server listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("conversation server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run until the server task exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the server task panics.
    pub async fn join(self) -> Result<()> {
        self.handle
            .await
            .map_err(|e| ConverseError::Config(format!("server task failed: {e}")))
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

async fn handle_healthz() -> StatusCode {
    StatusCode::OK
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ConversationRequest>,
) -> axum::response::Response {
    match state.coordinator.converse(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!(kind = e.kind(), error = %e, "turn failed");
            let status = match e {
                ConverseError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                Json(ErrorBody {
                    error: "couldn't process that",
                }),
            )
                .into_response()
        }
    }
}
