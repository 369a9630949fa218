//! # Scout Dispatcher
//! Fans out one independent task per source and collects exactly one outcome
//! per source, in input order.
//!
//! Each task races (launch + decode) against its own time budget. When the
//! budget runs out the task's cancellation token is fired before the slot is
//! finalized, so the scout client and the stream reader stop promptly. All
//! tokens are children of a per-batch token that is cancelled when the batch
//! finishes or is dropped. Nothing here is retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::assessment::{Findings, ScoutOutcome};
use crate::config::scout::DEFAULT_TIMEOUT_SECS;
use crate::decoder;
use crate::error::ScoutError;
use crate::metrics::ensure_metrics_described;
use crate::registry::Source;
use crate::scout::DynScout;

pub struct ScoutDispatcher {
    scout: DynScout,
    timeout: Duration,
}

impl ScoutDispatcher {
    pub fn new(scout: DynScout) -> Self {
        Self {
            scout,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Never fails: every per-source problem becomes that source's outcome.
    pub async fn dispatch_all(&self, sources: &[Source]) -> Vec<ScoutOutcome> {
        ensure_metrics_described();

        let batch = CancellationToken::new();
        let _batch_guard = batch.clone().drop_guard();

        let handles: Vec<_> = sources
            .iter()
            .map(|src| {
                tokio::spawn(scout_one(
                    Arc::clone(&self.scout),
                    src.clone(),
                    batch.child_token(),
                    self.timeout,
                ))
            })
            .collect();

        let joined = futures::future::join_all(handles).await;

        joined
            .into_iter()
            .zip(sources)
            .map(|(res, src)| match res {
                Ok(outcome) => outcome,
                Err(e) => {
                    let msg = if e.is_panic() {
                        panic_message(e.into_panic())
                    } else {
                        e.to_string()
                    };
                    warn!(target: "dispatch", source = %src.name, error = %msg, "scout task aborted");
                    counter!("scout_failures_total").increment(1);
                    ScoutOutcome::failed(&src.name, &ScoutError::TaskPanicked(msg))
                }
            })
            .collect()
    }
}

/// Runs one source to completion or until `budget` expires. On expiry `cancel`
/// is fired before the outcome is returned.
pub(crate) async fn scout_one(
    scout: DynScout,
    source: Source,
    cancel: CancellationToken,
    budget: Duration,
) -> ScoutOutcome {
    let t0 = Instant::now();
    counter!("scout_dispatched_total").increment(1);
    info!(target: "dispatch", source = %source.name, client = scout.name(), "scouting");

    let goal = mission_goal(&source.url);
    let run = async {
        let stream = scout.launch(&source.url, &goal, cancel.clone()).await?;
        let payload = decoder::decode(stream, &cancel)
            .await?
            .ok_or(ScoutError::NoPayload)?;
        Findings::from_payload(payload)
    };

    let result = match tokio::time::timeout(budget, run).await {
        Ok(r) => r,
        Err(_) => {
            cancel.cancel();
            counter!("scout_timeouts_total").increment(1);
            Err(ScoutError::TimedOut)
        }
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("scout_duration_ms").record(ms);

    match result {
        Ok(findings) => {
            debug!(
                target: "dispatch",
                source = %source.name,
                signals = findings.signals.as_ref().map_or(0, Vec::len),
                elapsed_ms = ms as u64,
                "scout finished"
            );
            ScoutOutcome::found(source.name, findings)
        }
        // The agent answered, just not with an object: nothing to report.
        Err(ScoutError::MalformedPayload(preview)) => {
            warn!(target: "dispatch", source = %source.name, payload = %preview, "final_result is not an object");
            ScoutOutcome::empty(source.name)
        }
        Err(e) => {
            warn!(target: "dispatch", source = %source.name, error = %e, elapsed_ms = ms as u64, "scout failed");
            if e != ScoutError::TimedOut {
                counter!("scout_failures_total").increment(1);
            }
            ScoutOutcome::failed(source.name, &e)
        }
    }
}

pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic".to_string()
    }
}

/// Extraction goal handed to the scout for one target.
pub fn mission_goal(url: &str) -> String {
    format!(
        r#"
### MISSION: OPERATIONAL INTELLIGENCE EXTRACTION
TARGET URL: {url}

You are a logistics intelligence scout. Extract concrete operational intelligence from this page.

### INSTRUCTIONS:
1. Capture specific METRICS (e.g. "Wait time: 3 days", "Anchored vessels: 12", "Gate turn time: 45 min", "Advisory #2024-05").
2. Capture DIRECT QUOTES from headers or alerts describing the situation.
3. Capture DATES of upcoming disruptions (strikes, holidays, maintenance).
4. If operations are normal, capture the text that says so (e.g. "All terminals open", "No delays reported").
5. Be specific. "Congestion" is not useful. "Congestion: 5 day delay" is.

### REQUIRED OUTPUT (JSON ONLY):
{{
  "scan_status": "completed",
  "operational_status": "NORMAL" | "DISRUPTED" | "UNKNOWN",
  "signals": [
    {{
      "summary": "Detailed finding with numbers or quotes where available",
      "severity": "LOW" | "MEDIUM" | "HIGH",
      "date": "YYYY-MM-DD",
      "category": "METRIC" | "QUOTE" | "STATUS"
    }}
  ]
}}
"#
    )
}
