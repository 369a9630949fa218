// src/lib.rs
// Public library surface for the binary, the demo bin and integration tests.

pub mod api;
pub mod assessment;
pub mod config;
pub mod decoder;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod history;
pub mod metrics;
pub mod registry;
pub mod scout;
pub mod synth;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::assessment::{Assessment, AssessmentResult, ShipmentContext};
pub use crate::engine::Assessor;
pub use crate::error::{AssessError, ScoutError};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const DEFAULT_LOG_FILTER: &str = "delay_risk_scout=info,scout=info,dispatch=info,engine=info,api=info,warn";

/// Install a compact stderr subscriber. `RUST_LOG` overrides the default filter.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}
