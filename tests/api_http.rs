// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - POST /api/logistics/risk-assessment (400s, no-sources 200, success 200)
// - GET /api/logistics/sources
// - GET /debug/history

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use delay_risk_scout::api::{self, AppState};
use delay_risk_scout::assessment::{Category, Severity};
use delay_risk_scout::dispatch::ScoutDispatcher;
use delay_risk_scout::registry::SourceRegistry;
use delay_risk_scout::scout::{FixtureScout, Script};
use delay_risk_scout::Assessor;

const BODY_LIMIT: usize = 1024 * 1024;

fn test_state() -> AppState {
    let scout = FixtureScout::all_clear().with_script(
        "https://www.maersk.com/news/advisories",
        Script::signals(&[(
            "Union strike vote scheduled",
            Severity::Medium,
            Category::Quote,
        )]),
    );
    let assessor = Assessor::new(
        Arc::new(SourceRegistry::default_seed()),
        ScoutDispatcher::new(Arc::new(scout)),
    );
    AppState::new(assessor)
}

fn test_router() -> Router {
    api::router(test_state())
}

fn post_assess(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/logistics/risk-assessment")
        .header("content-type", "application/json")
        .body(body.into())
        .expect("build POST")
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn health_returns_ok() {
    let resp = test_router()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), "ok");
}

#[tokio::test]
async fn missing_carrier_is_400_with_example() {
    let resp = test_router()
        .oneshot(post_assess(json!({ "origin_port": "Shanghai" }).to_string()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let v = read_json(resp).await;
    assert_eq!(v["error"], "Missing required fields: origin_port, carrier");
    assert_eq!(v["example"]["origin_port"], "Port of Los Angeles");
    assert_eq!(v["example"]["carrier"], "Maersk");
    assert_eq!(v["example"]["mode"], "Sea");
}

#[tokio::test]
async fn blank_origin_is_400() {
    let resp = test_router()
        .oneshot(post_assess(
            json!({ "origin_port": "  ", "carrier": "MSC" }).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_400_with_error_field() {
    let resp = test_router()
        .oneshot(post_assess("{ not json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let v = read_json(resp).await;
    assert!(v["error"].is_string());
}

#[tokio::test]
async fn unknown_context_is_200_with_supported_keys() {
    let resp = test_router()
        .oneshot(post_assess(
            json!({ "origin_port": "Rotterdam", "carrier": "Evergreen" }).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["error"], "No intelligent sources found for this context.");
    assert_eq!(v["supported_origins"], json!(["Port of Los Angeles", "Shanghai"]));
    assert_eq!(v["supported_carriers"], json!(["MSC", "Maersk"]));
}

#[tokio::test]
async fn assessment_response_has_expected_shape() {
    let resp = test_router()
        .oneshot(post_assess(
            json!({ "origin_port": "Port of Los Angeles", "carrier": "Maersk", "mode": "Sea" })
                .to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    assert_eq!(v["shipment_context"]["origin_port"], "Port of Los Angeles");
    assert_eq!(v["shipment_context"]["mode"], "Sea");
    assert_eq!(v["risk_assessment"]["delay_risk"], "MEDIUM");
    assert_eq!(v["risk_assessment"]["primary_cause"], "LABOR");
    assert!(v["risk_assessment"]["confidence"].as_f64().unwrap() > 0.8);

    let signals = v["signals_detected"].as_array().expect("signals array");
    assert_eq!(signals.len(), 3);
    for s in signals {
        for key in ["source", "signal", "date", "severity"] {
            assert!(s.get(key).is_some(), "signal missing '{key}': {s}");
        }
    }
    assert_eq!(
        v["recommended_action"],
        "Monitor closely. Minor disruptions reported."
    );
}

#[tokio::test]
async fn sources_listing_is_sorted() {
    let resp = test_router()
        .oneshot(
            Request::get("/api/logistics/sources")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert_eq!(v["supported_origins"], json!(["Port of Los Angeles", "Shanghai"]));
    assert_eq!(v["supported_carriers"], json!(["MSC", "Maersk"]));
}

#[tokio::test]
async fn history_records_completed_assessments_only() {
    let app = test_router();

    for body in [
        json!({ "origin_port": "Shanghai", "carrier": "MSC" }),
        json!({ "origin_port": "Rotterdam", "carrier": "Evergreen" }),
        json!({ "origin_port": "Port of Los Angeles", "carrier": "Maersk" }),
    ] {
        let resp = app
            .clone()
            .oneshot(post_assess(body.to_string()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .oneshot(Request::get("/debug/history?limit=5").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    let rows = v.as_array().expect("history array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["origin_port"], "Shanghai");
    assert_eq!(rows[0]["sources"], 2);
    assert_eq!(rows[1]["carrier"], "Maersk");
    assert_eq!(rows[1]["delay_risk"], "MEDIUM");
    assert_eq!(rows[1]["sources"], 3);
}
