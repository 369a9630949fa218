// tests/metrics.rs
//
// Installs the process-wide Prometheus recorder, so this file must stay its own test binary.

use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use delay_risk_scout::api::{self, AppState};
use delay_risk_scout::dispatch::ScoutDispatcher;
use delay_risk_scout::metrics::Metrics;
use delay_risk_scout::registry::SourceRegistry;
use delay_risk_scout::scout::{FixtureScout, Script};
use delay_risk_scout::{Assessor, ShipmentContext};

#[tokio::test]
async fn metrics_endpoint_contains_expected_series() {
    let metrics = Metrics::init().expect("install recorder");

    let scout = FixtureScout::all_clear()
        .with_script("https://www.msc.com/en/newsroom/customer-advisories", Script::Hang);
    let assessor = Assessor::new(
        Arc::new(SourceRegistry::default_seed()),
        ScoutDispatcher::new(Arc::new(scout)).with_timeout(std::time::Duration::from_millis(50)),
    );
    assessor
        .assess(&ShipmentContext::new("Shanghai", "MSC"))
        .await
        .expect("assessment");
    assessor
        .assess(&ShipmentContext::new("Nowhere", "Nobody"))
        .await
        .expect("no-sources report");

    let app = api::router_with_metrics(AppState::new(assessor), Some(&metrics));
    let resp = app
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "scout_dispatched_total",
        "scout_timeouts_total",
        "scout_duration_ms",
        "assessments_total",
        "assessments_no_sources_total",
        "assessment_duration_ms",
    ] {
        assert!(
            text.contains(needle),
            "metrics output should contain '{needle}', got:\n{text}"
        );
    }
    assert!(text.contains("delay_risk=\"LOW\""), "label missing:\n{text}");
}
