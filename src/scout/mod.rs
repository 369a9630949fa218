// src/scout/mod.rs
//! Seam to the external scouting agent.
//!
//! A scout is started with a target identifier and a natural-language goal and
//! answers with a stream of text chunks (see `decoder` for the framing).

pub mod fixture;
pub mod http;

use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;
use tokio_util::sync::CancellationToken;

use crate::config::ScoutConfig;
use crate::error::ScoutError;

pub use fixture::{FixtureScout, Script};
pub use http::HttpScoutClient;

/// Incremental response body of one scout run.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, ScoutError>> + Send>>;

#[async_trait::async_trait]
pub trait ScoutClient: Send + Sync {
    /// Start a scout run. Implementations should stop work once `cancel` fires.
    async fn launch(
        &self,
        target: &str,
        goal: &str,
        cancel: CancellationToken,
    ) -> Result<ChunkStream, ScoutError>;

    /// Client name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynScout = Arc<dyn ScoutClient>;

/// Factory: build a client according to config and environment variables.
///
/// * If `SCOUT_TEST_MODE=mock`, returns a fixture scout reporting normal operations.
/// * Else builds the HTTP client for the configured endpoint.
pub fn build_client(config: &ScoutConfig) -> anyhow::Result<DynScout> {
    if std::env::var("SCOUT_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        tracing::info!(target: "scout", "SCOUT_TEST_MODE=mock, using fixture scout");
        return Ok(Arc::new(FixtureScout::all_clear()));
    }
    Ok(Arc::new(HttpScoutClient::new(config)?))
}
