use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, timeout::TimeoutLayer};
use tracing::{error, info, warn};

use crate::error::{ErrorBody, SummaryError};
use crate::model::{SourceSelection, SummaryResult};
use crate::orchestrator::SummaryOrchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<SummaryOrchestrator>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(orchestrator: SummaryOrchestrator, request_timeout: Duration) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            request_timeout,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let request_timeout = state.request_timeout;
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/generate-news-summary", post(generate_news_summary))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::very_permissive())
}

/// Request body. Either `topic` or `topics` may be sent; only one topic is
/// summarized per request.
#[derive(Debug, Deserialize)]
pub struct NewsRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub source_type: SourceSelection,
}

impl NewsRequest {
    /// `topic` wins over `topics`; of `topics` only the first is honored.
    pub fn first_topic(&self) -> &str {
        self.topic
            .as_deref()
            .or_else(|| self.topics.first().map(String::as_str))
            .unwrap_or_default()
    }
}

async fn generate_news_summary(
    State(state): State<AppState>,
    Json(req): Json<NewsRequest>,
) -> Result<Json<SummaryResult>, SummaryError> {
    if req.topics.len() > 1 {
        info!(target: "api", ignored = req.topics.len() - 1, "extra topics ignored");
    }

    match state
        .orchestrator
        .generate(req.first_topic(), req.source_type)
        .await
    {
        Ok(res) => Ok(Json(res)),
        Err(e @ SummaryError::InvalidInput(_)) => {
            warn!(target: "api", error = %e, "rejected request");
            Err(e)
        }
        Err(e) => {
            error!(target: "api", error = ?e, "summary request failed");
            Err(e)
        }
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    error!(target: "api", panic = %detail, "handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::internal())).into_response()
}
