use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::assessment::ShipmentContext;
use crate::config::ScoutConfig;
use crate::dispatch::{panic_message, ScoutDispatcher};
use crate::engine::{Assessor, MISSING_FIELDS_MSG};
use crate::error::AssessError;
use crate::history::History;
use crate::metrics::Metrics;
use crate::registry::SourceRegistry;
use crate::scout;

#[derive(Clone)]
pub struct AppState {
    pub assessor: Arc<Assessor>,
    pub history: Arc<History>,
}

impl AppState {
    pub fn new(assessor: Assessor) -> Self {
        let history = Arc::clone(assessor.history());
        Self {
            assessor: Arc::new(assessor),
            history,
        }
    }

    /// Scout config + source registry from their default locations (env overrides honored).
    pub fn from_env() -> anyhow::Result<Self> {
        let cfg = ScoutConfig::load_default()?;
        let registry = SourceRegistry::load_default()?;
        let client = scout::build_client(&cfg)?;
        info!(
            target: "api",
            client = client.name(),
            origins = registry.supported_origins().len(),
            carriers = registry.supported_carriers().len(),
            timeout_secs = cfg.timeout_secs,
            "assessment service configured"
        );
        let dispatcher = ScoutDispatcher::new(client).with_timeout(cfg.timeout());
        Ok(Self::new(Assessor::new(Arc::new(registry), dispatcher)))
    }
}

pub fn router(state: AppState) -> Router {
    router_with_metrics(state, None)
}

pub fn router_with_metrics(state: AppState, metrics: Option<&Metrics>) -> Router {
    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/logistics/risk-assessment", post(risk_assessment))
        .route("/api/logistics/sources", get(list_sources))
        .route("/debug/history", get(debug_history))
        .with_state(state);

    let app = match metrics {
        Some(m) => app.merge(m.router()),
        None => app,
    };
    with_service_layers(app)
}

/// CORS plus panic containment: a handler panic becomes 500 `{ error }`.
pub fn with_service_layers(app: Router) -> Router {
    app.layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::very_permissive())
}

fn panic_response(payload: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let err = AssessError::Internal(panic_message(payload));
    error!(target: "api", error = %err, "request handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

/// Request body; every field optional so "missing" and "blank" get the same 400.
#[derive(Debug, Default, Deserialize)]
pub struct AssessRequest {
    #[serde(default)]
    pub origin_port: Option<String>,
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

impl AssessRequest {
    pub fn into_context(self) -> Result<ShipmentContext, AssessError> {
        let origin = self.origin_port.filter(|s| !s.trim().is_empty());
        let carrier = self.carrier.filter(|s| !s.trim().is_empty());
        match (origin, carrier) {
            (Some(o), Some(c)) => Ok(ShipmentContext {
                origin_port: o,
                carrier: c,
                mode: self.mode,
            }),
            _ => Err(AssessError::Validation(MISSING_FIELDS_MSG.to_string())),
        }
    }
}

async fn risk_assessment(
    State(state): State<AppState>,
    body: Result<Json<AssessRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(b) => b,
        Err(rej) => {
            warn!(target: "api", error = %rej.body_text(), "rejected request body");
            return error_response(StatusCode::BAD_REQUEST, rej.body_text());
        }
    };

    let ctx = match req.into_context() {
        Ok(c) => c,
        Err(e) => return assess_error_response(e),
    };

    match state.assessor.assess(&ctx).await {
        Ok(assessment) => (StatusCode::OK, Json(assessment)).into_response(),
        Err(e) => assess_error_response(e),
    }
}

fn assess_error_response(e: AssessError) -> Response {
    match e {
        AssessError::Validation(msg) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": msg,
                "example": {
                    "origin_port": "Port of Los Angeles",
                    "carrier": "Maersk",
                    "mode": "Sea"
                }
            })),
        )
            .into_response(),
        AssessError::Internal(_) => {
            warn!(target: "api", error = %e, "assessment failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

fn error_response(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(json!({ "error": msg.into() }))).into_response()
}

#[derive(serde::Serialize)]
struct SourcesOut {
    supported_origins: Vec<String>,
    supported_carriers: Vec<String>,
}

async fn list_sources(State(state): State<AppState>) -> Json<SourcesOut> {
    let reg = state.assessor.registry();
    Json(SourcesOut {
        supported_origins: reg.supported_origins(),
        supported_carriers: reg.supported_carriers(),
    })
}

#[derive(Deserialize)]
struct HistoryQuery {
    limit: Option<usize>,
}

async fn debug_history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Json<Vec<crate::history::HistoryEntry>> {
    Json(state.history.snapshot_last_n(q.limit.unwrap_or(10)))
}
