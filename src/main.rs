//! Delay Risk Scout: Binary Entrypoint
//! Boots the Axum HTTP server: scout config, source registry, metrics, routes.

use delay_risk_scout::{api, metrics::Metrics, AppState};
use shuttle_axum::ShuttleAxum;
use tracing::warn;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    delay_risk_scout::init_tracing();

    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            warn!(target: "api", error = %e, "prometheus recorder not installed; /metrics disabled");
            None
        }
    };

    let state = AppState::from_env()?;
    let router = api::router_with_metrics(state, metrics.as_ref());

    Ok(router.into())
}
